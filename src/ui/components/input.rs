use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct InputWidget<'a> {
    label: &'a str,
    value: &'a str,
    focused: bool,
    editing: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(label: &'a str, value: &'a str) -> Self {
        Self {
            label,
            value,
            focused: false,
            editing: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let block = Block::default()
            .title(self.label)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.editing {
            Line::from(vec![
                Span::styled(self.value, Theme::highlight()),
                Span::styled(" ", Theme::selected()),
            ])
        } else if self.focused {
            Line::from(Span::styled(self.value, Theme::selected()))
        } else {
            Line::from(Span::styled(self.value, Theme::normal()))
        };

        Paragraph::new(line).render(inner, buf);
    }
}

/// A value cycled with ←/→ rather than typed.
pub struct SelectWidget<'a> {
    label: &'a str,
    value: &'a str,
    focused: bool,
    disabled: bool,
}

impl<'a> SelectWidget<'a> {
    pub fn new(label: &'a str, value: &'a str) -> Self {
        Self {
            label,
            value,
            focused: false,
            disabled: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

impl Widget for SelectWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let block = Block::default()
            .title(self.label)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        let display = if self.focused && !self.disabled {
            format!("< {} >", self.value)
        } else {
            self.value.to_string()
        };

        let style = if self.disabled {
            Theme::dim()
        } else if self.focused {
            Theme::highlight()
        } else {
            Theme::normal()
        };

        Paragraph::new(Span::styled(display, style)).render(inner, buf);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Input,
    Select,
}

/// One rendered form cell.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
    pub disabled: bool,
}

impl FieldView {
    pub fn input(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            kind: FieldKind::Input,
            disabled: false,
        }
    }

    pub fn select(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            kind: FieldKind::Select,
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Lays fields out in rows of three-line boxes, `columns` per row.
pub struct FormGrid<'a> {
    fields: &'a [FieldView],
    focused: usize,
    edit_buffer: Option<&'a str>,
    columns: usize,
}

impl<'a> FormGrid<'a> {
    pub fn new(fields: &'a [FieldView]) -> Self {
        Self {
            fields,
            focused: 0,
            edit_buffer: None,
            columns: 2,
        }
    }

    pub fn focused(mut self, index: usize) -> Self {
        self.focused = index;
        self
    }

    pub fn editing(mut self, buffer: Option<&'a str>) -> Self {
        self.edit_buffer = buffer;
        self
    }

    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    pub fn height(fields: usize, columns: usize) -> u16 {
        (fields.div_ceil(columns.max(1)) * 3) as u16
    }
}

impl Widget for FormGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows: Vec<&[FieldView]> = self.fields.chunks(self.columns).collect();
        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(rows.iter().map(|_| Constraint::Length(3)))
            .split(area);

        let column_constraints: Vec<Constraint> = (0..self.columns)
            .map(|_| Constraint::Ratio(1, self.columns as u32))
            .collect();

        for (row_index, row) in rows.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(column_constraints.clone())
                .split(row_areas[row_index]);

            for (col_index, field) in row.iter().enumerate() {
                let index = row_index * self.columns + col_index;
                let focused = index == self.focused;
                let cell = cells[col_index];

                match field.kind {
                    FieldKind::Input => {
                        let editing = focused && self.edit_buffer.is_some();
                        let value = match (editing, self.edit_buffer) {
                            (true, Some(buffer)) => buffer,
                            _ => field.value.as_str(),
                        };
                        InputWidget::new(field.label, value)
                            .focused(focused)
                            .editing(editing)
                            .render(cell, buf);
                    }
                    FieldKind::Select => {
                        SelectWidget::new(field.label, &field.value)
                            .focused(focused)
                            .disabled(field.disabled)
                            .render(cell, buf);
                    }
                }
            }
        }
    }
}
