use crate::models::{RecommendationAction, RecommendationResponse, Urgency};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct ResultsScreen<'a> {
    pub response: &'a RecommendationResponse,
    pub scroll: u16,
}

impl<'a> ResultsScreen<'a> {
    pub fn new(response: &'a RecommendationResponse) -> Self {
        Self {
            response,
            scroll: 0,
        }
    }

    pub fn with_scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }
}

/// Sections in display order. Low and info share the last one.
pub fn sections(response: &RecommendationResponse) -> Vec<(&'static str, Vec<&RecommendationAction>)> {
    let mut sections = Vec::new();
    let mut other = Vec::new();

    for (urgency, actions) in response.buckets() {
        match urgency {
            Urgency::Critical => sections.push(("Kritik xəbərdarlıqlar", actions.iter().collect())),
            Urgency::High => sections.push(("Yüksək prioritet", actions.iter().collect())),
            Urgency::Medium => sections.push(("Orta prioritet", actions.iter().collect())),
            Urgency::Low | Urgency::Info => other.extend(actions.iter()),
        }
    }
    sections.push(("Digər tövsiyələr", other));

    sections.retain(|(_, actions)| !actions.is_empty());
    sections
}

impl Widget for ResultsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(4), // Summary
                Constraint::Min(8),    // Schedule + actions
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let r = self.response;
        let date = r
            .response_date
            .map(|d| d.format("%d.%m.%Y").to_string())
            .unwrap_or_default();
        let title = Line::from(vec![
            Span::styled("Tövsiyələr", Theme::title()),
            Span::styled(
                format!(
                    " - {} · {} · {} tövsiyə {}",
                    r.farm_type.name_az(),
                    r.region.name_az(),
                    r.total_recommendations,
                    date
                ),
                Theme::dim(),
            ),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        let summary = Paragraph::new(Span::styled(r.summary_az.as_str(), Theme::normal()))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("Xülasə")
                    .borders(Borders::ALL)
                    .border_style(Theme::border()),
            );
        summary.render(chunks[1], buf);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(chunks[2]);

        self.render_schedule(body[0], buf);
        self.render_actions(body[1], buf);

        let nav = Line::from(vec![
            Span::styled("[↑↓]", Theme::nav_key()),
            Span::styled("Sürüşdür ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Geri ", Theme::nav_label()),
            Span::styled("[x]", Theme::nav_key()),
            Span::styled("Yeni analiz ", Theme::nav_label()),
            Span::styled("[q]", Theme::nav_key()),
            Span::styled("Çıxış", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[3], buf);
    }
}

impl ResultsScreen<'_> {
    fn render_schedule(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Gündəlik plan")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let lines: Vec<Line> = if self.response.daily_schedule.is_empty() {
            vec![Line::from(Span::styled("Plan yoxdur", Theme::dim()))]
        } else {
            self.response
                .daily_schedule
                .iter()
                .map(|item| {
                    Line::from(vec![
                        Span::styled(format!("{:<6}", item.time_slot), Theme::highlight()),
                        Span::styled(item.task_az.as_str(), Theme::normal()),
                    ])
                })
                .collect()
        };

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
    }

    fn render_actions(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Tədbirlər")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused());

        let mut lines = Vec::new();
        if self.response.is_empty() {
            lines.push(Line::from(Span::styled(
                "Hazırda tədbir tələb olunmur",
                Theme::success(),
            )));
        }

        for (heading, actions) in sections(self.response) {
            lines.push(Line::from(Span::styled(heading, Theme::header())));
            for action in actions {
                let color = action.urgency.color();
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{} ", action.urgency.symbol()),
                        Style::default().fg(color),
                    ),
                    Span::styled(
                        action.name_az.as_str(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  [{}]", action.urgency.label_az()), Theme::dim()),
                ]));
                lines.push(Line::from(Span::styled(
                    format!("  {}", action.message_az),
                    Theme::normal(),
                )));
                if let Some(ref timing) = action.timing_az {
                    lines.push(Line::from(Span::styled(format!("  ⏱ {}", timing), Theme::dim())));
                }
            }
            lines.push(Line::default());
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(block)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> RecommendationResponse {
        serde_json::from_str(json).unwrap()
    }

    fn action(id: &str, urgency: &str) -> String {
        format!(
            r#"{{"rule_id":"{}","name_az":"{}","urgency":"{}","message_az":"m"}}"#,
            id, id, urgency
        )
    }

    #[test]
    fn low_and_info_are_merged_after_tiers() {
        let json = format!(
            r#"{{"farm_type":"wheat","region":"aran",
                "critical_alerts":[{}],"low_priority":[{}],"info":[{}]}}"#,
            action("C1", "critical"),
            action("L1", "low"),
            action("I1", "info")
        );
        let r = response(&json);
        let sections = sections(&r);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].0, "Kritik xəbərdarlıqlar");
        let ids: Vec<&str> = sections[1].1.iter().map(|a| a.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["L1", "I1"]);
    }

    #[test]
    fn empty_response_has_no_sections() {
        let r = response(r#"{"farm_type":"mixed","region":"lankaran"}"#);
        assert!(sections(&r).is_empty());
    }
}
