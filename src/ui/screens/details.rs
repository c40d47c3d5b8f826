use crate::logic::WizardState;
use crate::models::FarmType;
use crate::ui::components::{FieldView, FormGrid};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsField {
    CropType,
    Stage,
    DaysSinceIrrigation,
    DaysSinceFertilization,
    GrowingType,
    AnimalType,
    Count,
    Hygiene,
    DaysSinceVetCheck,
    Vaccination,
    DaysSinceDeworming,
    Ventilation,
    Water,
}

const CROP_FIELDS: &[DetailsField] = &[
    DetailsField::CropType,
    DetailsField::Stage,
    DetailsField::DaysSinceIrrigation,
    DetailsField::DaysSinceFertilization,
    DetailsField::GrowingType,
];

const LIVESTOCK_FIELDS: &[DetailsField] = &[
    DetailsField::AnimalType,
    DetailsField::Count,
    DetailsField::Hygiene,
    DetailsField::DaysSinceVetCheck,
    DetailsField::Vaccination,
    DetailsField::DaysSinceDeworming,
    DetailsField::Ventilation,
    DetailsField::Water,
];

impl DetailsField {
    pub fn for_farm(farm_type: Option<FarmType>) -> &'static [DetailsField] {
        match farm_type {
            Some(ft) if ft.requires_crop_context() => CROP_FIELDS,
            Some(ft) if ft.requires_livestock_context() => LIVESTOCK_FIELDS,
            _ => &[],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DetailsField::CropType => "Bitki növü",
            DetailsField::Stage => "İnkişaf mərhələsi",
            DetailsField::DaysSinceIrrigation => "Son suvarmadan (gün)",
            DetailsField::DaysSinceFertilization => "Son gübrələmədən (gün)",
            DetailsField::GrowingType => "Becərmə",
            DetailsField::AnimalType => "Heyvan növü",
            DetailsField::Count => "Say",
            DetailsField::Hygiene => "Tövlə gigiyenası (1-10)",
            DetailsField::DaysSinceVetCheck => "Son baytar yoxlamasından (gün)",
            DetailsField::Vaccination => "Peyvənd statusu",
            DetailsField::DaysSinceDeworming => "Son dehelmintizasiyadan (gün)",
            DetailsField::Ventilation => "Ventilyasiya",
            DetailsField::Water => "Su təminatı",
        }
    }
}

pub struct DetailsScreen<'a> {
    pub state: &'a WizardState,
    pub focused_field: DetailsField,
    pub edit_buffer: Option<&'a str>,
}

impl<'a> DetailsScreen<'a> {
    pub fn new(state: &'a WizardState) -> Self {
        Self {
            state,
            focused_field: DetailsField::CropType,
            edit_buffer: None,
        }
    }

    pub fn with_focus(mut self, field: DetailsField) -> Self {
        self.focused_field = field;
        self
    }

    pub fn editing(mut self, editing: bool, buffer: &'a str) -> Self {
        self.edit_buffer = editing.then_some(buffer);
        self
    }

    fn field_view(&self, field: DetailsField) -> FieldView {
        let crop = &self.state.crop;
        let herd = &self.state.livestock;
        let label = field.label();
        match field {
            DetailsField::CropType => FieldView::select(
                label,
                crop.crop_type.map(|c| c.name_az()).unwrap_or("Seçin"),
            ),
            DetailsField::Stage => {
                let value = match (crop.crop_type, crop.stage.as_deref()) {
                    (Some(c), Some(stage)) => c.stage_name_az(stage).to_string(),
                    (Some(_), None) => "Seçin".to_string(),
                    (None, _) => "-".to_string(),
                };
                FieldView::select(label, value).disabled(crop.crop_type.is_none())
            }
            DetailsField::DaysSinceIrrigation => {
                FieldView::input(label, crop.days_since_irrigation.to_string())
            }
            DetailsField::DaysSinceFertilization => {
                FieldView::input(label, crop.days_since_fertilization.to_string())
            }
            DetailsField::GrowingType => FieldView::select(label, crop.growing_type.label_az()),
            DetailsField::AnimalType => FieldView::select(label, herd.animal_type.name_az()),
            DetailsField::Count => FieldView::input(label, herd.count.to_string()),
            DetailsField::Hygiene => FieldView::input(label, herd.barn_hygiene_score.to_string()),
            DetailsField::DaysSinceVetCheck => {
                FieldView::input(label, herd.days_since_vet_check.to_string())
            }
            DetailsField::Vaccination => {
                FieldView::select(label, herd.vaccination_status.label_az())
            }
            DetailsField::DaysSinceDeworming => {
                FieldView::input(label, herd.days_since_deworming.to_string())
            }
            DetailsField::Ventilation => FieldView::select(label, herd.ventilation_quality.clone()),
            DetailsField::Water => FieldView::select(label, herd.water_availability.clone()),
        }
    }
}

impl Widget for DetailsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(1), // Validation / transport error
                Constraint::Min(8),    // Form
                Constraint::Length(3), // Summary of earlier steps
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let farm_name = self
            .state
            .farm_type
            .map(|ft| ft.name_az())
            .unwrap_or("-");
        let title = Line::from(vec![
            Span::styled("Təfərrüatlar", Theme::title()),
            Span::styled(format!(" - {}", farm_name), Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        self.render_messages(chunks[1], buf);

        let fields = DetailsField::for_farm(self.state.farm_type);
        if fields.is_empty() {
            let note = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Qarışıq təsərrüfat üçün əlavə məlumat tələb olunmur.",
                    Theme::normal(),
                )),
                Line::from(Span::styled(
                    "Tövsiyələr hava və torpaq məlumatlarına əsasən hazırlanacaq.",
                    Theme::dim(),
                )),
            ])
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border()),
            );
            note.render(chunks[2], buf);
        } else {
            let views: Vec<FieldView> = fields.iter().map(|f| self.field_view(*f)).collect();
            let focused = fields
                .iter()
                .position(|f| *f == self.focused_field)
                .unwrap_or(0);
            let form_area = Rect {
                height: FormGrid::height(views.len(), 2).min(chunks[2].height),
                ..chunks[2]
            };
            FormGrid::new(&views)
                .columns(2)
                .focused(focused)
                .editing(self.edit_buffer)
                .render(form_area, buf);
        }

        self.render_summary(chunks[3], buf);

        let submitting = self.state.submitting.is_some();
        let submit_style = if submitting {
            Theme::dim()
        } else {
            Theme::nav_key()
        };
        let nav = Line::from(vec![
            Span::styled("[↑↓]", Theme::nav_key()),
            Span::styled("Sahə ", Theme::nav_label()),
            Span::styled("[←→]", Theme::nav_key()),
            Span::styled("Dəyiş ", Theme::nav_label()),
            Span::styled("[Enter]", Theme::nav_key()),
            Span::styled("Daxil et ", Theme::nav_label()),
            Span::styled("[n]", submit_style),
            Span::styled(
                if submitting { "Göndərilir... " } else { "Tövsiyə al " },
                Theme::nav_label(),
            ),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Geri", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[4], buf);
    }
}

impl DetailsScreen<'_> {
    fn render_messages(&self, area: Rect, buf: &mut Buffer) {
        let line = if let Some(ref error) = self.state.error {
            Line::from(vec![
                Span::styled("✗ ", Theme::error()),
                Span::styled(error.as_str(), Theme::error()),
            ])
        } else if let Some(ref message) = self.state.validation_error {
            Line::from(Span::styled(message.as_str(), Theme::warning()))
        } else {
            Line::default()
        };
        Paragraph::new(line).render(area, buf);
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let s = self.state;
        let block = Block::default()
            .title("Xülasə")
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let line = Line::from(vec![
            Span::styled(s.region.name_az(), Theme::highlight()),
            Span::styled(
                format!(
                    "  {:.0}°C  {:.0}%  {:.1} mm  {:.0} km/saat",
                    s.weather.temperature,
                    s.weather.humidity,
                    s.weather.rainfall_last_24h,
                    s.weather.wind_speed
                ),
                Theme::normal(),
            ),
            Span::styled(
                if s.weather.frost_warning { "  ❄ şaxta" } else { "" },
                Theme::warning(),
            ),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}
