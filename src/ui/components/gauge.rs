use crate::models::{MAX_TEMPERATURE_C, MIN_TEMPERATURE_C};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct GaugeWidget<'a> {
    title: &'a str,
    value: Option<f64>,
    unit: &'a str,
    min: f64,
    max: f64,
    thresholds: Vec<(f64, Color)>,
    precision: usize,
}

impl<'a> GaugeWidget<'a> {
    pub fn new(title: &'a str, value: Option<f64>, unit: &'a str) -> Self {
        Self {
            title,
            value,
            unit,
            min: 0.0,
            max: 100.0,
            thresholds: Vec::new(),
            precision: 0,
        }
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn thresholds(mut self, thresholds: Vec<(f64, Color)>) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn color_for(&self, value: f64) -> Color {
        self.thresholds
            .iter()
            .rev()
            .find(|(threshold, _)| value >= *threshold)
            .map(|(_, color)| *color)
            .unwrap_or(Theme::FG)
    }

    fn ratio(&self, value: f64) -> f64 {
        if self.max <= self.min {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

impl Widget for GaugeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 10 {
            return;
        }

        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let Some(value) = self.value else {
            Paragraph::new(Span::styled("—", Theme::dim())).render(inner, buf);
            return;
        };

        let color = self.color_for(value);
        let value_str = format!("{:.prec$}{}", value, self.unit, prec = self.precision);
        Paragraph::new(Line::from(Span::styled(value_str, Style::default().fg(color))))
            .render(inner, buf);

        if inner.height >= 2 {
            let y = inner.y + 1;
            let filled = (inner.width as f64 * self.ratio(value)) as u16;
            for x in inner.x..inner.x + inner.width {
                let ch = if x < inner.x + filled { '█' } else { '░' };
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

pub fn temperature_gauge(title: &str, value: Option<f64>) -> GaugeWidget<'_> {
    GaugeWidget::new(title, value, "°C")
        .range(MIN_TEMPERATURE_C, MAX_TEMPERATURE_C)
        .thresholds(vec![
            (MIN_TEMPERATURE_C, Theme::TEMP_FROST),
            (0.0, Theme::TEMP_COOL),
            (10.0, Theme::TEMP_MILD),
            (22.0, Theme::TEMP_WARM),
            (32.0, Theme::TEMP_HOT),
        ])
}

pub fn humidity_gauge(title: &str, value: Option<f64>) -> GaugeWidget<'_> {
    GaugeWidget::new(title, value, "%")
        .range(0.0, 100.0)
        .thresholds(vec![
            (0.0, Theme::SUCCESS),
            (80.0, Theme::WARNING),
            (90.0, Theme::ERROR),
        ])
}

pub fn soil_moisture_gauge(title: &str, value: Option<f64>) -> GaugeWidget<'_> {
    GaugeWidget::new(title, value, "%")
        .range(0.0, 100.0)
        .thresholds(vec![
            (0.0, Theme::MOISTURE_DRY),
            (30.0, Theme::MOISTURE_OK),
            (70.0, Theme::MOISTURE_WET),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_colors_follow_thresholds() {
        let gauge = temperature_gauge("T", Some(-5.0));
        assert_eq!(gauge.color_for(-5.0), Theme::TEMP_FROST);
        assert_eq!(gauge.color_for(15.0), Theme::TEMP_MILD);
        assert_eq!(gauge.color_for(40.0), Theme::TEMP_HOT);
    }

    #[test]
    fn ratio_is_clamped() {
        let gauge = humidity_gauge("H", None);
        assert_eq!(gauge.ratio(150.0), 1.0);
        assert_eq!(gauge.ratio(-10.0), 0.0);
        assert_eq!(gauge.ratio(50.0), 0.5);
    }
}
