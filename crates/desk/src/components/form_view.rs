//! Accordion rendering of a [`FormEngine`].
//!
//! Focus walks a flat list of items built from the open section: field
//! rows, custom table entries and the submit button for form sections;
//! data rows and the add/save buttons for table sections.
use color_eyre::Result;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent};
use grid::{
    FieldSpec, FormEngine, FormSection, Section, TableSection, form::ControlKind, options,
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use serde_json::Value;
use tracing::debug;
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    action::Action,
    components::Component,
    tui::{EventResponse, Frame},
};

const CELL_WIDTH: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Item {
    Header(usize),
    Field(usize, usize),
    Entry(usize, usize),
    Submit(usize),
    Row(usize, usize),
    AddRow(usize),
    Save(usize),
}

pub struct FormView {
    title: String,
    engine: FormEngine,
    focus: usize,
    /// Column of the focused table row.
    column: usize,
    editing: Option<Input>,
    scroll: u16,
}

impl FormView {
    pub fn new(title: impl Into<String>, engine: FormEngine) -> Self {
        Self {
            title: title.into(),
            engine,
            focus: 0,
            column: 0,
            editing: None,
            scroll: 0,
        }
    }

    pub fn engine(&self) -> &FormEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut FormEngine {
        &mut self.engine
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    fn items(&self) -> Vec<Item> {
        let mut items = Vec::new();
        for (idx, section) in self.engine.sections().iter().enumerate() {
            items.push(Item::Header(idx));
            if !self.engine.is_expanded(idx) {
                continue;
            }
            match section {
                Section::Form(form) => {
                    items.extend(
                        form.fields()
                            .iter()
                            .enumerate()
                            .filter(|(_, f)| !f.disabled)
                            .map(|(fi, _)| Item::Field(idx, fi)),
                    );
                    items.push(Item::Submit(idx));
                    if let Some(table) = form.custom_table() {
                        items.extend((0..table.entries().len()).map(|k| Item::Entry(idx, k)));
                    }
                }
                Section::Table(table) => {
                    items.extend((0..table.rows().len()).map(|r| Item::Row(idx, r)));
                    if table.has_dynamic_rows() {
                        items.push(Item::AddRow(idx));
                    }
                    items.push(Item::Save(idx));
                }
            }
        }
        items
    }

    fn focused(&self) -> Option<Item> {
        self.items().get(self.focus).copied()
    }

    fn clamp_focus(&mut self) {
        let len = self.items().len();
        self.focus = self.focus.min(len.saturating_sub(1));
    }

    fn form_section(&mut self, idx: usize) -> Option<&mut FormSection> {
        self.engine.form_mut(idx).ok()
    }

    fn table_section(&mut self, idx: usize) -> Option<&mut TableSection> {
        self.engine.table_mut(idx).ok()
    }

    fn column_key(&self, idx: usize) -> Option<String> {
        let table = self.engine.table(idx).ok()?;
        table
            .columns()
            .get(self.column)
            .map(|c| c.accessor_key.clone())
    }

    fn start_editing(&mut self, item: Item) {
        let current = match item {
            Item::Field(s, f) => self.engine.form(s).ok().and_then(|form| {
                let name = &form.fields().get(f)?.name;
                Some(form.value(name).unwrap_or("").to_string())
            }),
            Item::Row(s, r) => {
                let key = self.column_key(s);
                self.engine.table(s).ok().and_then(|t| {
                    let row = t.rows().get(r)?;
                    Some(row.cell_text(&key?))
                })
            }
            _ => None,
        };
        if let Some(current) = current {
            self.editing = Some(Input::new(current));
        }
    }

    fn commit_edit(&mut self, item: Item, text: String) {
        match item {
            Item::Field(s, f) => {
                if let Some(form) = self.form_section(s) {
                    if let Some(name) = form.fields().get(f).map(|f| f.name.clone()) {
                        if let Err(err) = form.set_value(&name, text) {
                            debug!(field = %name, error = %err, "field not updated");
                        }
                    }
                }
            }
            Item::Row(s, r) => {
                let Some(key) = self.column_key(s) else {
                    return;
                };
                if let Some(table) = self.table_section(s) {
                    let value = match table.editor_for(&key) {
                        Some(editor) => editor.to_json(&text),
                        None => Value::String(text),
                    };
                    if let Some(row_id) = table.rows().get(r).map(|row| row.id.clone()) {
                        if let Err(err) = table.set_cell(&row_id, &key, value) {
                            debug!(field = %key, error = %err, "cell not updated");
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Step a select/radio field or a select-edited cell.
    fn cycle(&mut self, item: Item, dir: i32) {
        match item {
            Item::Field(s, f) => {
                let Some(form) = self.form_section(s) else {
                    return;
                };
                let Some(field) = form.fields().get(f) else {
                    return;
                };
                let name = field.name.clone();
                let next = match field.kind.options() {
                    Some(opts) => options::cycle(opts, form.value(&name).unwrap_or(""), dir).to_string(),
                    None => return,
                };
                if let Err(err) = form.set_value(&name, next) {
                    debug!(field = %name, error = %err, "option not changed");
                }
            }
            Item::Row(s, r) => {
                let Some(key) = self.column_key(s) else {
                    return;
                };
                let Some(table) = self.table_section(s) else {
                    return;
                };
                let Some(row) = table.rows().get(r) else {
                    return;
                };
                let row_id = row.id.clone();
                let current = row.cell_text(&key);
                let next = match table.editor_for(&key).and_then(|e| e.kind.options()) {
                    Some(opts) => options::cycle(opts, &current, dir).to_string(),
                    None => return,
                };
                if let Err(err) = table.set_cell(&row_id, &key, next) {
                    debug!(field = %key, error = %err, "cell option not changed");
                }
            }
            _ => {}
        }
    }

    fn field_control(&self, item: Item) -> Option<(ControlKind, bool)> {
        match item {
            Item::Field(s, f) => {
                let field = self.engine.form(s).ok()?.fields().get(f)?;
                Some((field.kind.control(), field.kind.has_plus_action()))
            }
            Item::Row(s, _) => {
                let key = self.column_key(s)?;
                let editor = self.engine.table(s).ok()?.editor_for(&key)?;
                Some((editor.kind.control(), false))
            }
            _ => None,
        }
    }

    fn activate(&mut self, item: Item) {
        match item {
            Item::Header(s) => {
                if let Err(err) = self.engine.toggle(s) {
                    debug!(section = s, error = %err, "section not toggled");
                }
                self.focus = self
                    .items()
                    .iter()
                    .position(|i| *i == Item::Header(s))
                    .unwrap_or(0);
            }
            Item::Field(..) | Item::Row(..) => match self.field_control(item) {
                Some((ControlKind::Dropdown | ControlKind::RadioGroup, _)) => self.cycle(item, 1),
                Some((ControlKind::Toggle, _)) => self.toggle_checkbox(item),
                _ => self.start_editing(item),
            },
            Item::Entry(s, k) => {
                if let Some(form) = self.form_section(s) {
                    if let Err(err) = form.edit_entry(k) {
                        debug!(section = s, entry = k, error = %err, "entry not loaded");
                    }
                }
            }
            Item::Submit(s) => {
                if let Some(form) = self.form_section(s) {
                    form.submit();
                }
            }
            Item::AddRow(s) => {
                if let Some(table) = self.table_section(s) {
                    if let Err(err) = table.add_row() {
                        debug!(section = s, error = %err, "row not added");
                    }
                }
            }
            Item::Save(s) => {
                if let Some(table) = self.table_section(s) {
                    table.save();
                }
            }
        }
    }

    fn toggle_checkbox(&mut self, item: Item) {
        let Item::Field(s, f) = item else {
            return;
        };
        let Some(form) = self.form_section(s) else {
            return;
        };
        let Some(name) = form.fields().get(f).map(|f| f.name.clone()) else {
            return;
        };
        let next = if form.value(&name) == Some("true") {
            "false"
        } else {
            "true"
        };
        if let Err(err) = form.set_value(&name, next) {
            debug!(field = %name, error = %err, "option not changed");
        }
    }

    fn delete(&mut self, item: Item) {
        match item {
            Item::Entry(s, k) => {
                if let Some(form) = self.form_section(s) {
                    if let Err(err) = form.delete_entry(k) {
                        debug!(section = s, entry = k, error = %err, "entry not deleted");
                    }
                }
            }
            Item::Row(s, r) => {
                if let Some(table) = self.table_section(s) {
                    if let Some(id) = table.rows().get(r).map(|row| row.id.clone()) {
                        if let Err(err) = table.delete_row(&id) {
                            debug!(row = %id, error = %err, "row not deleted");
                        }
                    }
                }
                self.clamp_focus();
            }
            _ => {}
        }
    }

    fn plus(&mut self, item: Item) {
        let Item::Field(s, f) = item else {
            return;
        };
        if let Some(form) = self.form_section(s) {
            if let Some(name) = form.fields().get(f).map(|f| f.name.clone()) {
                if let Err(err) = form.press_plus(&name) {
                    debug!(field = %name, error = %err, "no option to add");
                }
            }
        }
    }

    fn handle_editing(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.editing = None,
            KeyCode::Enter => {
                let Some(input) = self.editing.take() else {
                    return;
                };
                if let Some(item) = self.focused() {
                    self.commit_edit(item, input.value().to_string());
                }
            }
            _ => {
                if let Some(input) = self.editing.as_mut() {
                    input.handle_event(&CrosstermEvent::Key(key));
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.editing.is_some() {
            self.handle_editing(key);
            return true;
        }
        let len = self.items().len();
        let Some(item) = self.focused() else {
            return false;
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
                self.focus = self.focus.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                if self.focus + 1 < len {
                    self.focus += 1;
                }
            }
            KeyCode::Left | KeyCode::Right => {
                let dir = if key.code == KeyCode::Left { -1 } else { 1 };
                match item {
                    Item::Row(s, _) => {
                        let cols = self.engine.table(s).map(|t| t.columns().len()).unwrap_or(0);
                        let next = (self.column as i32 + dir).clamp(0, cols.saturating_sub(1) as i32);
                        self.column = next as usize;
                    }
                    _ => self.cycle(item, dir),
                }
            }
            KeyCode::Char(',') | KeyCode::Char('.') if matches!(item, Item::Row(..)) => {
                let dir = if key.code == KeyCode::Char(',') { -1 } else { 1 };
                self.cycle(item, dir);
            }
            KeyCode::Enter => self.activate(item),
            KeyCode::Char(' ') if matches!(item, Item::Field(..)) => self.toggle_checkbox(item),
            KeyCode::Char('+') => self.plus(item),
            KeyCode::Char('e') if matches!(item, Item::Entry(..)) => self.activate(item),
            KeyCode::Char('d') | KeyCode::Delete => self.delete(item),
            _ => return false,
        }
        true
    }

    pub fn hints(&self) -> Vec<(&'static str, &'static str)> {
        if self.editing.is_some() {
            return vec![("Enter", "Apply"), ("Esc", "Cancel")];
        }
        match self.focused() {
            Some(Item::Header(_)) => vec![("↑/↓", "Move"), ("Enter", "Open/close")],
            Some(Item::Field(..)) => vec![
                ("Enter", "Edit"),
                ("←/→", "Option"),
                ("Space", "Toggle"),
                ("+", "Add option"),
            ],
            Some(Item::Entry(..)) => vec![("e", "Edit entry"), ("d", "Delete entry")],
            Some(Item::Row(..)) => vec![
                ("←/→", "Column"),
                ("Enter", "Edit cell"),
                (",/.", "Option"),
                ("d", "Delete row"),
            ],
            _ => vec![("↑/↓", "Move"), ("Enter", "Press")],
        }
    }

    fn field_value(&self, field: &FieldSpec, raw: &str) -> Span<'static> {
        let dim = Style::default().fg(Color::DarkGray);
        if raw.is_empty() {
            if let Some(placeholder) = &field.placeholder {
                return Span::styled(placeholder.clone(), dim);
            }
        }
        let text = match field.kind.control() {
            ControlKind::SecretInput => "•".repeat(raw.chars().count()),
            ControlKind::Toggle => if raw == "true" { "[x]" } else { "[ ]" }.to_string(),
            ControlKind::Dropdown => {
                let label = field
                    .kind
                    .options()
                    .map(|o| options::label_for(o, raw).to_string())
                    .unwrap_or_default();
                let plus = if field.kind.has_plus_action() { " [+]" } else { "" };
                format!("‹ {label} ›{plus}")
            }
            ControlKind::RadioGroup => field
                .kind
                .options()
                .unwrap_or(&[])
                .iter()
                .map(|o| {
                    let mark = if o.value == raw { "(•)" } else { "( )" };
                    format!("{mark} {}", o.label)
                })
                .collect::<Vec<_>>()
                .join("  "),
            ControlKind::MultiLineInput => match raw.lines().count() {
                0 | 1 => raw.to_string(),
                _ => format!("{}…", raw.lines().next().unwrap_or("")),
            },
            ControlKind::DatePicker if raw.is_empty() => return Span::styled("YYYY-MM-DD", dim),
            ControlKind::FilePicker if raw.is_empty() => return Span::styled("(no file)", dim),
            _ => raw.to_string(),
        };
        let unit = field
            .unit_options
            .first()
            .map(|u| format!(" {}", u.label))
            .unwrap_or_default();
        Span::raw(format!("{text}{unit}"))
    }

    /// Lines of the whole accordion and the line index of each item.
    fn lines(&self) -> (Vec<Line<'static>>, Vec<usize>) {
        let focus = self.focused();
        let focus_style = Style::default().fg(Color::Black).bg(Color::White);
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut positions = Vec::new();

        for (idx, section) in self.engine.sections().iter().enumerate() {
            let open = self.engine.is_expanded(idx);
            positions.push(lines.len());
            let marker = if open { "▾" } else { "▸" };
            let style = if focus == Some(Item::Header(idx)) {
                focus_style.bold()
            } else {
                Style::default().bold()
            };
            lines.push(Line::from(Span::styled(
                format!("{marker} {}", section.title()),
                style,
            )));
            if !open {
                continue;
            }
            match section {
                Section::Form(form) => self.form_lines(idx, form, &mut lines, &mut positions),
                Section::Table(table) => self.table_lines(idx, table, &mut lines, &mut positions),
            }
            lines.push(Line::raw(""));
        }
        (lines, positions)
    }

    fn form_lines(
        &self,
        idx: usize,
        form: &FormSection,
        lines: &mut Vec<Line<'static>>,
        positions: &mut Vec<usize>,
    ) {
        let focus = self.focused();
        let label_width = form
            .fields()
            .iter()
            .map(|f| f.label.chars().count() + 1)
            .max()
            .unwrap_or(0);

        for (fi, field) in form.fields().iter().enumerate() {
            let focused = focus == Some(Item::Field(idx, fi));
            if !field.disabled {
                positions.push(lines.len());
            }
            let mark = if field.is_required() { "*" } else { "" };
            let label = format!("  {:<label_width$} ", format!("{}{mark}", field.label));
            let label_style = if focused {
                Style::default().add_modifier(Modifier::BOLD)
            } else if field.disabled {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            let raw = form.value(&field.name).unwrap_or("");
            let value = match (&self.editing, focused) {
                (Some(input), true) => Span::styled(
                    format!("{}▏", input.value()),
                    Style::default().fg(Color::Black).bg(Color::White),
                ),
                (None, true) => {
                    let span = self.field_value(field, raw);
                    let content = span.content.to_string();
                    Span::styled(content, Style::default().fg(Color::Black).bg(Color::White))
                }
                _ => self.field_value(field, raw),
            };
            lines.push(Line::from(vec![Span::styled(label, label_style), value]));
            if let Some(err) = form.form().field_error(&field.name) {
                lines.push(Line::from(Span::styled(
                    format!("  {:<label_width$}  ✗ {err}", ""),
                    Style::default().fg(Color::Red),
                )));
            }
        }

        positions.push(lines.len());
        let submit_style = if focus == Some(Item::Submit(idx)) {
            Style::default().fg(Color::Black).bg(Color::White).bold()
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("[ Submit ]", submit_style),
        ]));

        if let Some(table) = form.custom_table() {
            let header: String = table
                .columns
                .iter()
                .map(|c| pad(&c.header))
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(Line::from(Span::styled(
                format!("    {header}"),
                Style::default().bold().fg(Color::Gray),
            )));
            if table.entries().is_empty() {
                lines.push(Line::from(Span::styled(
                    "    (no entries)",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            for k in 0..table.entries().len() {
                positions.push(lines.len());
                let cells: String = table
                    .columns
                    .iter()
                    .map(|c| pad(&table.cell_text(k, &c.accessor_key)))
                    .collect::<Vec<_>>()
                    .join(" ");
                let style = if focus == Some(Item::Entry(idx, k)) {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(cells, style),
                    Span::styled("  e:edit d:delete", Style::default().fg(Color::DarkGray)),
                ]));
            }
        }
    }

    fn table_lines(
        &self,
        idx: usize,
        table: &TableSection,
        lines: &mut Vec<Line<'static>>,
        positions: &mut Vec<usize>,
    ) {
        let focus = self.focused();
        let header: String = table
            .columns()
            .iter()
            .map(|c| pad(&c.header))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(Line::from(Span::styled(
            format!("  {header}"),
            Style::default().bold().fg(Color::Gray),
        )));
        if table.rows().is_empty() {
            lines.push(Line::from(Span::styled(
                "  (no rows)",
                Style::default().fg(Color::DarkGray),
            )));
        }

        for (r, row) in table.rows().iter().enumerate() {
            positions.push(lines.len());
            let row_focused = focus == Some(Item::Row(idx, r));
            let mut spans = vec![Span::raw("  ")];
            for (c, column) in table.columns().iter().enumerate() {
                let cell_focused = row_focused && c == self.column;
                let text = match (&self.editing, cell_focused) {
                    (Some(input), true) => format!("{}▏", input.value()),
                    _ => row.cell_text(&column.accessor_key),
                };
                let style = if cell_focused {
                    Style::default().fg(Color::Black).bg(Color::White)
                } else if row_focused {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                spans.push(Span::styled(pad(&text), style));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }

        let button = |label: &'static str, item: Item| {
            if focus == Some(item) {
                Span::styled(label, Style::default().fg(Color::Black).bg(Color::White).bold())
            } else {
                Span::styled(label, Style::default().fg(Color::White))
            }
        };
        if table.has_dynamic_rows() {
            positions.push(lines.len());
            lines.push(Line::from(vec![
                Span::raw("  "),
                button("[ + Add row ]", Item::AddRow(idx)),
            ]));
        }
        positions.push(lines.len());
        lines.push(Line::from(vec![Span::raw("  "), button("[ Save ]", Item::Save(idx))]));
    }
}

fn pad(text: &str) -> String {
    let mut out: String = text.chars().take(CELL_WIDTH).collect();
    let len = out.chars().count();
    out.push_str(&" ".repeat(CELL_WIDTH - len));
    out
}

impl Component for FormView {
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        Ok(self
            .handle_key(key)
            .then_some(EventResponse::Stop(Action::Render)))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let (lines, positions) = self.lines();
        let line = positions.get(self.focus).copied().unwrap_or(0) as u16;
        let height = inner.height.max(1);
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
        f.render_widget(
            Paragraph::new(Text::from(lines)).scroll((self.scroll, 0)),
            inner,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use grid::{ColumnSpec, CustomTable, FieldKind, Fields, MappingConfig, MappingRule, SelectOption};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(view: &mut FormView, codes: &[KeyCode]) {
        for code in codes {
            view.handle_key_events(key(*code)).unwrap();
        }
    }

    fn type_text(view: &mut FormView, text: &str) {
        for c in text.chars() {
            view.handle_key_events(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn vas() -> TableSection {
        let catalog: Vec<Fields> = [("VAS001", "Insurance", 150), ("VAS002", "Fumigation", 80)]
            .into_iter()
            .map(|(id, name, rate)| {
                let mut row = Fields::new();
                row.insert("vasId".into(), json!(id));
                row.insert("vasName".into(), json!(name));
                row.insert("rate".into(), json!(rate));
                row
            })
            .collect();
        let mut default_row = Fields::new();
        default_row.insert("vasId".into(), json!(""));
        TableSection::new(
            "VAS Charges",
            vec![
                ColumnSpec::new("vasId", "VAS"),
                ColumnSpec::new("vasName", "Name"),
                ColumnSpec::new("rate", "Rate"),
            ],
        )
        .dynamic_rows(default_row)
        .with_table_schema(vec![FieldSpec::new(
            "vasId",
            "VAS",
            FieldKind::Select {
                options: vec![SelectOption::new("VAS001", "VAS001"), SelectOption::new("VAS002", "VAS002")],
                plus_action: false,
            },
        )])
        .with_mapping(MappingConfig::new().with(
            "vasId",
            MappingRule {
                key_field: "vasId".into(),
                data: catalog,
                mapped_fields: vec!["vasName".into(), "rate".into()],
            },
        ))
    }

    fn view(submitted: Arc<Mutex<Vec<String>>>) -> FormView {
        let details = FormSection::new(
            "Details",
            vec![
                FieldSpec::new("origin", "Origin", FieldKind::Text).required(),
                FieldSpec::new("hazardous", "Hazardous", FieldKind::Checkbox),
            ],
        )
        .unwrap()
        .on_submit(move |v| submitted.lock().unwrap().push(v["origin"].clone()))
        .with_custom_table(CustomTable::new(vec![ColumnSpec::new("origin", "Origin")]));
        FormView::new(
            "New booking",
            FormEngine::new(vec![Section::Form(details), Section::Table(vas())]),
        )
    }

    #[test]
    fn submit_is_gated_until_required_field_is_filled() {
        let submitted = Arc::new(Mutex::new(Vec::new()));
        let mut view = view(submitted.clone());

        // header, origin, hazardous, submit
        press(&mut view, &[KeyCode::Down, KeyCode::Down, KeyCode::Char(' ')]);
        assert_eq!(view.engine().form(0).unwrap().value("hazardous"), Some("true"));
        press(&mut view, &[KeyCode::Down, KeyCode::Enter]);
        assert!(submitted.lock().unwrap().is_empty());
        assert_eq!(
            view.engine().form(0).unwrap().form().field_error("origin"),
            Some("Origin is required")
        );

        press(&mut view, &[KeyCode::Up, KeyCode::Up, KeyCode::Enter]);
        assert!(view.is_editing());
        type_text(&mut view, "Hamburg");
        press(&mut view, &[KeyCode::Enter, KeyCode::Down, KeyCode::Down, KeyCode::Enter]);
        assert_eq!(*submitted.lock().unwrap(), vec!["Hamburg".to_string()]);
    }

    #[test]
    fn table_rows_are_added_and_mapped() {
        let mut view = view(Arc::new(Mutex::new(Vec::new())));
        press(&mut view, &[KeyCode::Enter, KeyCode::Down, KeyCode::Enter]);
        assert!(view.engine().is_expanded(1));

        // items: header0, header1, add row, save
        press(&mut view, &[KeyCode::Down, KeyCode::Enter]);
        assert_eq!(view.engine().table(1).unwrap().rows().len(), 1);

        // focus stays on the new row; its first column is a select
        press(&mut view, &[KeyCode::Enter]);
        let row = &view.engine().table(1).unwrap().rows()[0];
        assert_eq!(row.cell_text("vasId"), "VAS001");
        assert_eq!(row.cell_text("vasName"), "Insurance");
        assert_eq!(row.cell_text("rate"), "150");

        press(&mut view, &[KeyCode::Char('d')]);
        assert!(view.engine().table(1).unwrap().rows().is_empty());
    }

    #[test]
    fn refused_plus_leaves_the_field_alone() {
        let submitted = Arc::new(Mutex::new(Vec::new()));
        let mut view = view(submitted.clone());

        // origin has no "+" action, so the engine refuses it
        press(&mut view, &[KeyCode::Down]);
        assert!(view.handle_key_events(key(KeyCode::Char('+'))).unwrap().is_some());
        let form = view.engine().form(0).unwrap();
        assert_eq!(form.value("origin").unwrap_or(""), "");
        assert_eq!(form.form().field_error("origin"), None);

        press(&mut view, &[KeyCode::Enter]);
        type_text(&mut view, "Bremen");
        press(&mut view, &[KeyCode::Enter, KeyCode::Down, KeyCode::Down, KeyCode::Enter]);
        assert_eq!(*submitted.lock().unwrap(), vec!["Bremen".to_string()]);
    }

    #[test]
    fn draws_open_section_and_errors() {
        use ratatui::{Terminal, backend::TestBackend};

        let mut view = view(Arc::new(Mutex::new(Vec::new())));
        view.engine_mut().form_mut(0).unwrap().submit();
        let mut terminal = Terminal::new(TestBackend::new(70, 16)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                view.draw(f, area).unwrap();
            })
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        let screen: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(screen.contains("▾ Details"));
        assert!(screen.contains("▸ VAS Charges"));
        assert!(screen.contains("Origin is required"));
        assert!(screen.contains("(no entries)"));
    }
}
