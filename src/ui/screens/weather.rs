use crate::logic::WizardState;
use crate::models::{FarmType, WeatherMode};
use crate::ui::components::{
    humidity_gauge, soil_moisture_gauge, temperature_gauge, FieldView, FormGrid,
};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherField {
    Mode,
    Region,
    Temperature,
    Humidity,
    Rainfall24h,
    Rainfall7d,
    Forecast48h,
    ForecastAmount,
    WindSpeed,
    Frost,
    SoilMoisture,
}

const WITH_SOIL: &[WeatherField] = &[
    WeatherField::Mode,
    WeatherField::Region,
    WeatherField::Temperature,
    WeatherField::Humidity,
    WeatherField::Rainfall24h,
    WeatherField::Rainfall7d,
    WeatherField::Forecast48h,
    WeatherField::ForecastAmount,
    WeatherField::WindSpeed,
    WeatherField::Frost,
    WeatherField::SoilMoisture,
];

impl WeatherField {
    /// Livestock farms send no soil data, so they get no soil field.
    pub fn for_farm(farm_type: Option<FarmType>) -> &'static [WeatherField] {
        match farm_type {
            Some(ft) if !ft.includes_soil() => &WITH_SOIL[..WITH_SOIL.len() - 1],
            _ => WITH_SOIL,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeatherField::Mode => "Rejim",
            WeatherField::Region => "Region",
            WeatherField::Temperature => "Temperatur (°C)",
            WeatherField::Humidity => "Rütubət (%)",
            WeatherField::Rainfall24h => "Yağış, 24 saat (mm)",
            WeatherField::Rainfall7d => "Yağış, 7 gün (mm)",
            WeatherField::Forecast48h => "48 saatda yağış gözlənilir",
            WeatherField::ForecastAmount => "Gözlənilən yağış (mm)",
            WeatherField::WindSpeed => "Külək (km/saat)",
            WeatherField::Frost => "Şaxta xəbərdarlığı",
            WeatherField::SoilMoisture => "Torpaq nəmliyi (%)",
        }
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Bəli"
    } else {
        "Xeyr"
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

pub struct WeatherScreen<'a> {
    pub state: &'a WizardState,
    pub focused_field: WeatherField,
    pub edit_buffer: Option<&'a str>,
}

impl<'a> WeatherScreen<'a> {
    pub fn new(state: &'a WizardState) -> Self {
        Self {
            state,
            focused_field: WeatherField::Mode,
            edit_buffer: None,
        }
    }

    pub fn with_focus(mut self, field: WeatherField) -> Self {
        self.focused_field = field;
        self
    }

    pub fn editing(mut self, editing: bool, buffer: &'a str) -> Self {
        self.edit_buffer = editing.then_some(buffer);
        self
    }

    fn field_view(&self, field: WeatherField) -> FieldView {
        let s = self.state;
        let w = &s.weather;
        let resolving = s.resolving.is_some();
        match field {
            WeatherField::Mode => {
                let value = if resolving {
                    format!("{} (yüklənir...)", s.weather_mode.as_str())
                } else {
                    s.weather_mode.as_str().to_string()
                };
                FieldView::select(field.label(), value).disabled(resolving)
            }
            WeatherField::Region => FieldView::select(field.label(), s.region.name_az()),
            WeatherField::Temperature => FieldView::input(field.label(), format_number(w.temperature)),
            WeatherField::Humidity => FieldView::input(field.label(), format_number(w.humidity)),
            WeatherField::Rainfall24h => {
                FieldView::input(field.label(), format_number(w.rainfall_last_24h))
            }
            WeatherField::Rainfall7d => {
                FieldView::input(field.label(), format_number(w.rainfall_last_7days))
            }
            WeatherField::Forecast48h => {
                FieldView::select(field.label(), yes_no(w.rainfall_forecast_48h))
            }
            WeatherField::ForecastAmount => {
                FieldView::input(field.label(), format_number(w.rainfall_forecast_amount_mm))
            }
            WeatherField::WindSpeed => FieldView::input(field.label(), format_number(w.wind_speed)),
            WeatherField::Frost => FieldView::select(field.label(), yes_no(w.frost_warning)),
            WeatherField::SoilMoisture => {
                FieldView::input(field.label(), format_number(s.soil.soil_moisture))
            }
        }
    }
}

impl Widget for WeatherScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(1), // Location or notice
                Constraint::Min(12),   // Form + gauges
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Hava şəraiti", Theme::title()),
            Span::styled(format!(" - {}", self.state.weather_mode.as_str()), Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        self.render_banner(chunks[1], buf);

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[2]);

        let fields = WeatherField::for_farm(self.state.farm_type);
        let views: Vec<FieldView> = fields.iter().map(|f| self.field_view(*f)).collect();
        let focused = fields
            .iter()
            .position(|f| *f == self.focused_field)
            .unwrap_or(0);
        let form_height = FormGrid::height(views.len(), 2);
        let form_area = Rect {
            height: form_height.min(content[0].height),
            ..content[0]
        };
        FormGrid::new(&views)
            .columns(2)
            .focused(focused)
            .editing(self.edit_buffer)
            .render(form_area, buf);

        self.render_gauges(content[1], buf);

        let busy = self.state.resolving.is_some();
        let key_style = if busy { Theme::dim() } else { Theme::nav_key() };
        let nav = Line::from(vec![
            Span::styled("[↑↓]", Theme::nav_key()),
            Span::styled("Sahə ", Theme::nav_label()),
            Span::styled("[←→]", Theme::nav_key()),
            Span::styled("Dəyiş ", Theme::nav_label()),
            Span::styled("[Enter]", Theme::nav_key()),
            Span::styled("Daxil et ", Theme::nav_label()),
            Span::styled("[m]", key_style),
            Span::styled("Rejim ", Theme::nav_label()),
            Span::styled("[r]", key_style),
            Span::styled("Yenilə ", Theme::nav_label()),
            Span::styled("[n]", key_style),
            Span::styled("Növbəti ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Geri", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[3], buf);
    }
}

impl WeatherScreen<'_> {
    fn render_banner(&self, area: Rect, buf: &mut Buffer) {
        let s = self.state;
        let line = if let Some(ref notice) = s.notice {
            Line::from(vec![
                Span::styled("⚠ ", Theme::warning()),
                Span::styled(notice.as_str(), Theme::warning()),
                Span::styled("  [d]", Theme::nav_key()),
                Span::styled("Bağla", Theme::nav_label()),
            ])
        } else if s.resolving.is_some() {
            Line::from(Span::styled("Məkan təyin edilir...", Theme::dim()))
        } else if let (WeatherMode::Auto, Some(location)) = (s.weather_mode, s.location_display()) {
            Line::from(vec![
                Span::styled("📍 ", Theme::normal()),
                Span::styled(location, Theme::highlight()),
            ])
        } else {
            Line::from(Span::styled(
                "Dəyərləri əl ilə daxil edin",
                Theme::dim(),
            ))
        };
        Paragraph::new(line)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }

    fn render_gauges(&self, area: Rect, buf: &mut Buffer) {
        let s = self.state;
        let show_soil = s.farm_type.map(|ft| ft.includes_soil()).unwrap_or(true);

        let mut constraints = vec![Constraint::Length(4), Constraint::Length(4)];
        if show_soil {
            constraints.push(Constraint::Length(4));
        }
        constraints.push(Constraint::Min(0));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        temperature_gauge("Temperatur", Some(s.weather.temperature)).render(rows[0], buf);
        humidity_gauge("Rütubət", Some(s.weather.humidity)).render(rows[1], buf);
        if show_soil {
            soil_moisture_gauge("Torpaq nəmliyi", Some(s.soil.soil_moisture)).render(rows[2], buf);
        }

        if s.weather.frost_warning {
            let frost_area = rows[rows.len() - 1];
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Theme::TEMP_FROST));
            let inner = block.inner(frost_area);
            if frost_area.height >= 3 {
                block.render(frost_area, buf);
                Paragraph::new(Span::styled(
                    "❄ Şaxta riski",
                    Style::default().fg(Theme::temp_color(s.weather.temperature)),
                ))
                .render(inner, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn livestock_has_no_soil_field() {
        let fields = WeatherField::for_farm(Some(FarmType::Livestock));
        assert!(!fields.contains(&WeatherField::SoilMoisture));
        assert!(WeatherField::for_farm(Some(FarmType::Mixed)).contains(&WeatherField::SoilMoisture));
        assert!(WeatherField::for_farm(None).contains(&WeatherField::SoilMoisture));
    }

    #[test]
    fn numbers_drop_trailing_zero() {
        assert_eq!(format_number(25.0), "25");
        assert_eq!(format_number(0.3), "0.3");
        assert_eq!(format_number(-3.0), "-3");
    }
}
