use crate::models::FarmType;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget, Wrap},
};

pub struct FarmTypeScreen {
    pub selected_index: usize,
    pub chosen: Option<FarmType>,
    /// Farm type can no longer change without a restart.
    pub locked: bool,
}

impl FarmTypeScreen {
    pub fn new(selected_index: usize) -> Self {
        Self {
            selected_index,
            chosen: None,
            locked: false,
        }
    }

    pub fn with_choice(mut self, chosen: Option<FarmType>, locked: bool) -> Self {
        self.chosen = chosen;
        self.locked = locked;
        self
    }
}

impl Widget for FarmTypeScreen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(7),    // Options
                Constraint::Length(4), // Description
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Təsərrüfat növü", Theme::title()),
            Span::styled(" - fəaliyyət sahənizi seçin", Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        self.render_options(chunks[1], buf);
        self.render_description(chunks[2], buf);

        let nav = Line::from(vec![
            Span::styled("[↑↓]", Theme::nav_key()),
            Span::styled("Seç ", Theme::nav_label()),
            Span::styled("[Enter]", Theme::nav_key()),
            Span::styled("Davam ", Theme::nav_label()),
            Span::styled("[x]", Theme::nav_key()),
            Span::styled("Yenidən başla ", Theme::nav_label()),
            Span::styled("[q]", Theme::nav_key()),
            Span::styled("Çıxış", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[3], buf);
    }
}

impl FarmTypeScreen {
    fn render_options(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Növlər")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused());

        let inner = block.inner(area);
        block.render(area, buf);

        let items: Vec<ListItem> = FarmType::all()
            .iter()
            .enumerate()
            .map(|(i, farm_type)| {
                let style = if i == self.selected_index {
                    Theme::selected()
                } else if self.locked && self.chosen != Some(*farm_type) {
                    Theme::dim()
                } else {
                    Style::default()
                };

                let marker = if self.chosen == Some(*farm_type) {
                    "● "
                } else {
                    "○ "
                };

                ListItem::new(Line::from(vec![
                    Span::styled(marker, Theme::highlight()),
                    Span::raw(farm_type.name_az()),
                    Span::styled(format!("  {}", farm_type.name_en()), Theme::dim()),
                ]))
                .style(style)
            })
            .collect();

        List::new(items).render(inner, buf);
    }

    fn render_description(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let farm_type = FarmType::all()
            .get(self.selected_index)
            .copied()
            .unwrap_or(FarmType::Wheat);

        let mut lines = vec![Line::from(Span::styled(
            farm_type.description_az(),
            Theme::normal(),
        ))];
        if self.locked {
            lines.push(Line::from(Span::styled(
                "Təsərrüfat növünü dəyişmək üçün yenidən başlayın [x]",
                Theme::warning(),
            )));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
