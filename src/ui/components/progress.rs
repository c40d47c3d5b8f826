use crate::logic::WizardStep;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// One-line step header: completed steps, the current one, then the rest.
pub struct StepProgress {
    current: WizardStep,
    busy: bool,
}

impl StepProgress {
    pub fn new(current: WizardStep) -> Self {
        Self {
            current,
            busy: false,
        }
    }

    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }
}

impl Widget for StepProgress {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled("Yonca ", Theme::title())];

        for (i, step) in WizardStep::all().iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ─ ", Theme::dim()));
            }
            let style = if *step == self.current {
                Theme::highlight()
            } else if step.number() < self.current.number() {
                Theme::success()
            } else {
                Theme::dim()
            };
            let marker = if step.number() < self.current.number() {
                "✓".to_string()
            } else {
                step.number().to_string()
            };
            spans.push(Span::styled(format!("{} {}", marker, step.title_az()), style));
        }

        if self.busy {
            spans.push(Span::styled("  ⟳", Theme::warning()));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
