//! New booking: an accordion with the booking details form, a containers
//! form that collects entries into its custom table, and an editable VAS
//! charges table filled in from a rate catalog.
use color_eyre::Result;
use crossterm::event::KeyEvent;
use grid::{
    ColumnSpec, CustomTable, FieldKind, FieldSpec, Fields, FormEngine, FormSection, FormValues,
    MappingConfig, MappingRule, Rule, Section, SelectOption, TableSection, options::options,
};
use ratatui::layout::Rect;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::{
    action::{Action, PopupResult},
    components::{
        Component, PopupComponent, form_view::FormView, popups::InputPopup, render_backdrop,
    },
    pages::Page,
    tui::{EventResponse, Frame},
};

const DETAILS: usize = 0;
const CONTAINERS: usize = 1;
const VAS: usize = 2;

const CUSTOMERS: [&str; 3] = ["Acme Logistics", "Globex Shipping", "Initech Freight"];

/// Rate card the VAS table looks charges up in.
fn vas_catalog() -> Vec<Fields> {
    [
        ("VAS001", "Insurance", 150.0),
        ("VAS002", "Fumigation", 80.0),
        ("VAS003", "Customs clearance", 220.0),
        ("VAS004", "Cold storage", 95.5),
    ]
    .into_iter()
    .filter_map(|(id, name, rate)| {
        json!({ "vasId": id, "vasName": name, "rate": rate })
            .as_object()
            .cloned()
    })
    .collect()
}

fn send(tx: &Option<UnboundedSender<Action>>, action: Action) {
    if let Some(tx) = tx {
        tx.send(action).ok();
    }
}

struct PendingOption {
    section: usize,
    field: String,
    popup: InputPopup,
}

pub struct FormPage {
    key: String,
    title: String,
    tx: Option<UnboundedSender<Action>>,
    view: Option<FormView>,
    /// Custom table entry being edited; the next containers submit
    /// replaces it instead of appending.
    editing_entry: Option<usize>,
    pending_option: Option<PendingOption>,
}

impl FormPage {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            tx: None,
            view: None,
            editing_entry: None,
            pending_option: None,
        }
    }

    pub fn engine(&self) -> Option<&FormEngine> {
        self.view.as_ref().map(FormView::engine)
    }

    pub fn engine_mut(&mut self) -> Option<&mut FormEngine> {
        self.view.as_mut().map(FormView::engine_mut)
    }

    pub fn editing_entry(&self) -> Option<usize> {
        self.editing_entry
    }

    pub fn adding_option(&self) -> bool {
        self.pending_option.is_some()
    }

    fn details(&self) -> Result<FormSection> {
        let tx = self.tx.clone();
        let plus_tx = self.tx.clone();
        let section = FormSection::new(
            "Booking Details",
            vec![
                FieldSpec::new(
                    "customer",
                    "Customer",
                    FieldKind::Select {
                        options: options(CUSTOMERS),
                        plus_action: true,
                    },
                )
                .required(),
                FieldSpec::new("bookingDate", "Booking date", FieldKind::Date).required(),
                FieldSpec::new("origin", "Origin", FieldKind::Text)
                    .placeholder("Port or city")
                    .required(),
                FieldSpec::new("destination", "Destination", FieldKind::Text)
                    .placeholder("Port or city")
                    .required(),
                FieldSpec::new(
                    "incoterm",
                    "Incoterm",
                    FieldKind::Radio {
                        options: options(["EXW", "FOB", "CIF", "DAP"]),
                    },
                )
                .default_value("FOB"),
                FieldSpec::new("hazardous", "Hazardous", FieldKind::Checkbox),
                FieldSpec::new("weight", "Gross weight", FieldKind::Number)
                    .unit_options(["kg"])
                    .rule(Rule::Numeric)
                    .validator(|raw| match raw.parse::<f64>() {
                        Ok(w) if w > 0.0 => Ok(()),
                        Ok(_) => Err("Gross weight must be positive".into()),
                        Err(_) => Ok(()),
                    }),
                FieldSpec::new("notes", "Notes", FieldKind::Textarea).rule(Rule::MaxLength(200)),
            ],
        )?
        .on_submit(move |values| {
            send(
                &tx,
                Action::FormSubmitted {
                    section: DETAILS,
                    values: values.clone(),
                },
            )
        })
        .on_plus(move |field| {
            send(
                &plus_tx,
                Action::AddOption {
                    section: DETAILS,
                    field: field.to_string(),
                },
            )
        });
        Ok(section)
    }

    fn containers(&self) -> Result<FormSection> {
        let tx = self.tx.clone();
        let edit_tx = self.tx.clone();
        let delete_tx = self.tx.clone();
        let table = CustomTable::new(vec![
            ColumnSpec::new("containerNo", "Container"),
            ColumnSpec::new("size", "Size"),
            ColumnSpec::new("sealNo", "Seal"),
        ])
        .on_edit(move |_entry, index| {
            send(
                &edit_tx,
                Action::EntryEdited {
                    section: CONTAINERS,
                    index,
                },
            )
        })
        .on_delete(move |entry| {
            send(
                &delete_tx,
                Action::EntryDeleted {
                    section: CONTAINERS,
                    entry: entry.clone(),
                },
            )
        });

        let section = FormSection::new(
            "Containers",
            vec![
                FieldSpec::new("containerNo", "Container no.", FieldKind::Text)
                    .placeholder("ABCU1234567")
                    .required()
                    .rule(Rule::Pattern {
                        regex: r"^[A-Z]{4}\d{7}$".into(),
                        message: "Use 4 capital letters and 7 digits".into(),
                    }),
                FieldSpec::new(
                    "size",
                    "Size",
                    FieldKind::Select {
                        options: options(["20ft", "40ft", "40ft HC"]),
                        plus_action: false,
                    },
                )
                .required(),
                FieldSpec::new("sealNo", "Seal no.", FieldKind::Text),
            ],
        )?
        .on_submit(move |values| {
            send(
                &tx,
                Action::FormSubmitted {
                    section: CONTAINERS,
                    values: values.clone(),
                },
            )
        })
        .with_custom_table(table);
        Ok(section)
    }

    fn vas(&self) -> TableSection {
        let tx = self.tx.clone();
        let ids: Vec<SelectOption> = vas_catalog()
            .iter()
            .filter_map(|row| row.get("vasId").and_then(Value::as_str))
            .map(SelectOption::from)
            .collect();
        let default_row = json!({ "vasId": "", "vasName": "", "rate": null })
            .as_object()
            .cloned()
            .unwrap_or_default();

        TableSection::new(
            "VAS Charges",
            vec![
                ColumnSpec::new("vasId", "VAS"),
                ColumnSpec::new("vasName", "Service"),
                ColumnSpec::new("rate", "Rate"),
            ],
        )
        .dynamic_rows(default_row)
        .with_table_schema(vec![
            FieldSpec::new(
                "vasId",
                "VAS",
                FieldKind::Select {
                    options: ids,
                    plus_action: false,
                },
            ),
            FieldSpec::new("rate", "Rate", FieldKind::Number),
        ])
        .with_mapping(MappingConfig::new().with(
            "vasId",
            MappingRule {
                key_field: "vasId".into(),
                data: vas_catalog(),
                mapped_fields: vec!["vasName".into(), "rate".into()],
            },
        ))
        .on_save(move |rows| {
            send(
                &tx,
                Action::TableSaved {
                    section: VAS,
                    rows: rows.len(),
                },
            )
        })
    }

    fn build(&self) -> Result<FormView> {
        let engine = FormEngine::new(vec![
            Section::Form(self.details()?),
            Section::Form(self.containers()?),
            Section::Table(self.vas()),
        ]);
        Ok(FormView::new(self.title.clone(), engine))
    }

    fn submitted(&mut self, section: usize, values: FormValues) -> Result<Option<Action>> {
        match section {
            DETAILS => {
                let customer = values.get("customer").cloned().unwrap_or_default();
                let route = format!(
                    "{} → {}",
                    values.get("origin").map(String::as_str).unwrap_or(""),
                    values.get("destination").map(String::as_str).unwrap_or("")
                );
                info!(page = %self.key, customer = %customer, "booking submitted");
                Ok(Some(Action::Notify(format!(
                    "Booking for {customer} recorded ({route})."
                ))))
            }
            CONTAINERS => {
                let editing = self.editing_entry.take();
                let Some(engine) = self.engine_mut() else {
                    return Ok(None);
                };
                let form = engine.form_mut(CONTAINERS)?;
                let entry = form.to_fields();
                if let Some(table) = form.custom_table_mut() {
                    match editing {
                        Some(index) if index < table.entries().len() => {
                            let mut entries = table.entries().to_vec();
                            entries[index] = entry;
                            table.set_entries(entries);
                            debug!(index, "container entry replaced");
                        }
                        _ => table.push_entry(entry),
                    }
                }
                form.form_mut().reset(&FormValues::new());
                Ok(Some(Action::Render))
            }
            _ => Ok(None),
        }
    }

    fn entry_deleted(&mut self, section: usize, entry: &Fields) -> Result<Option<Action>> {
        let Some(engine) = self.engine_mut() else {
            return Ok(None);
        };
        let form = engine.form_mut(section)?;
        let Some(table) = form.custom_table_mut() else {
            return Ok(None);
        };
        let Some(pos) = table.entries().iter().position(|e| e == entry) else {
            return Ok(None);
        };
        table.remove_entry(pos);
        self.editing_entry = match self.editing_entry {
            Some(i) if i == pos => None,
            Some(i) if i > pos => Some(i - 1),
            other => other,
        };
        Ok(Some(Action::Render))
    }

    fn add_option(&mut self, value: String) -> Result<()> {
        let Some(pending) = self.pending_option.take() else {
            return Ok(());
        };
        if let Some(engine) = self.engine_mut() {
            let form = engine.form_mut(pending.section)?;
            form.push_option(&pending.field, SelectOption::new(value.clone(), value.clone()))?;
            form.set_value(&pending.field, value)?;
            info!(field = %pending.field, "option added");
        }
        Ok(())
    }
}

impl Page for FormPage {
    fn key(&self) -> &str {
        &self.key
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.tx = Some(tx);
        Ok(())
    }

    /// Every visit starts from a blank form.
    fn on_enter(&mut self) -> Result<()> {
        info!(page = %self.key, "enter");
        self.view = Some(self.build()?);
        self.editing_entry = None;
        self.pending_option = None;
        Ok(())
    }

    fn on_exit(&mut self) -> Result<()> {
        info!(page = %self.key, "exit");
        self.pending_option = None;
        Ok(())
    }

    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        if let Some(pending) = self.pending_option.as_mut() {
            match pending.popup.on_key(key) {
                Some(PopupResult::Entered(value)) => self.add_option(value)?,
                Some(_) => self.pending_option = None,
                None => {}
            }
            return Ok(Some(EventResponse::Stop(Action::Render)));
        }
        match self.view.as_mut() {
            Some(view) => view.handle_key_events(key),
            None => Ok(None),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::FormSubmitted { section, values } => self.submitted(section, values),
            Action::EntryEdited { index, .. } => {
                self.editing_entry = Some(index);
                Ok(Some(Action::Render))
            }
            Action::EntryDeleted { section, entry } => self.entry_deleted(section, &entry),
            Action::TableSaved { rows, .. } => Ok(Some(Action::Notify(format!(
                "{rows} VAS charge(s) saved."
            )))),
            Action::AddOption { section, field } => {
                let label = self
                    .engine()
                    .and_then(|e| e.form(section).ok())
                    .and_then(|form| form.field(&field))
                    .map(|f| f.label.clone())
                    .unwrap_or_else(|| field.clone());
                let popup = InputPopup::new(format!("New {}", label.to_lowercase()), "Name")
                    .validator(|v| {
                        if v.is_empty() {
                            Err("Name is required".into())
                        } else {
                            Ok(())
                        }
                    });
                self.pending_option = Some(PendingOption {
                    section,
                    field,
                    popup,
                });
                Ok(Some(Action::Render))
            }
            _ => Ok(None),
        }
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        if let Some(view) = self.view.as_mut() {
            view.draw(f, area)?;
        }
        if let Some(pending) = self.pending_option.as_mut() {
            render_backdrop(f, area);
            pending.popup.draw(f, area)?;
        }
        Ok(())
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        if self.pending_option.is_some() {
            return vec![("Enter", "Add"), ("Esc", "Cancel")];
        }
        self.view.as_ref().map(FormView::hints).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn page() -> (FormPage, UnboundedReceiver<Action>) {
        let mut page = FormPage::new("bookings.new", "New booking");
        let (tx, rx) = mpsc::unbounded_channel();
        page.register_action_handler(tx).unwrap();
        page.on_enter().unwrap();
        (page, rx)
    }

    fn pump(page: &mut FormPage, rx: &mut UnboundedReceiver<Action>) -> Vec<Action> {
        let mut out = Vec::new();
        while let Ok(action) = rx.try_recv() {
            if let Some(next) = page.update(action).unwrap() {
                out.push(next);
            }
        }
        out
    }

    fn containers(page: &mut FormPage) -> &mut FormSection {
        page.engine_mut().unwrap().form_mut(CONTAINERS).unwrap()
    }

    fn entries(page: &FormPage) -> Vec<Fields> {
        page.engine()
            .unwrap()
            .form(CONTAINERS)
            .unwrap()
            .custom_table()
            .unwrap()
            .entries()
            .to_vec()
    }

    #[test]
    fn details_submit_is_gated() {
        let (mut page, mut rx) = page();
        let details = page.engine_mut().unwrap().form_mut(DETAILS).unwrap();
        details.submit();
        assert!(pump(&mut page, &mut rx).is_empty());

        let details = page.engine_mut().unwrap().form_mut(DETAILS).unwrap();
        for (name, value) in [
            ("customer", "Globex Shipping"),
            ("bookingDate", "2024-05-02"),
            ("origin", "Hamburg"),
            ("destination", "Shanghai"),
            ("weight", "1200"),
        ] {
            details.set_value(name, value).unwrap();
        }
        details.submit();
        assert_eq!(
            pump(&mut page, &mut rx),
            vec![Action::Notify(
                "Booking for Globex Shipping recorded (Hamburg → Shanghai).".into()
            )]
        );
    }

    #[test]
    fn container_entries_append_edit_and_delete() {
        let (mut page, mut rx) = page();
        page.engine_mut().unwrap().expand(CONTAINERS).unwrap();

        let form = containers(&mut page);
        form.set_value("containerNo", "msc1").unwrap();
        form.set_value("size", "40ft").unwrap();
        form.submit();
        assert!(pump(&mut page, &mut rx).is_empty());
        assert_eq!(
            containers(&mut page).form().field_error("containerNo"),
            Some("Use 4 capital letters and 7 digits")
        );

        let form = containers(&mut page);
        form.set_value("containerNo", "MSCU1234567").unwrap();
        form.submit();
        pump(&mut page, &mut rx);
        assert_eq!(entries(&page).len(), 1);
        assert_eq!(containers(&mut page).value("containerNo"), Some(""));

        containers(&mut page).edit_entry(0).unwrap();
        pump(&mut page, &mut rx);
        assert_eq!(page.editing_entry(), Some(0));
        assert_eq!(containers(&mut page).value("size"), Some("40ft"));
        containers(&mut page).set_value("sealNo", "SL-77").unwrap();
        containers(&mut page).submit();
        pump(&mut page, &mut rx);
        let list = entries(&page);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["sealNo"], json!("SL-77"));
        assert_eq!(page.editing_entry(), None);

        containers(&mut page).delete_entry(0).unwrap();
        pump(&mut page, &mut rx);
        assert!(entries(&page).is_empty());
    }

    #[test]
    fn plus_action_adds_customer() {
        let (mut page, mut rx) = page();
        page.engine_mut()
            .unwrap()
            .form_mut(DETAILS)
            .unwrap()
            .press_plus("customer")
            .unwrap();
        pump(&mut page, &mut rx);
        assert!(page.adding_option());

        for c in "Umbrella Corp".chars() {
            page.handle_key_events(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .unwrap();
        }
        page.handle_key_events(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        assert!(!page.adding_option());

        let details = page.engine().unwrap().form(DETAILS).unwrap();
        assert_eq!(details.value("customer"), Some("Umbrella Corp"));
        let field = details.field("customer").unwrap();
        assert_eq!(field.kind.options().unwrap().len(), 4);
    }

    #[test]
    fn vas_rows_map_from_catalog() {
        let (mut page, mut rx) = page();
        let table = page.engine_mut().unwrap().table_mut(VAS).unwrap();
        let id = table.add_row().unwrap().id.clone();
        table.set_cell(&id, "vasId", "VAS001").unwrap();
        assert_eq!(table.rows()[0].cell_text("vasName"), "Insurance");
        assert_eq!(table.rows()[0].cell_text("rate"), "150.0");

        table.set_cell(&id, "vasId", "VAS999").unwrap();
        assert_eq!(table.rows()[0].cell_text("vasName"), "");

        table.save();
        assert_eq!(
            pump(&mut page, &mut rx),
            vec![Action::Notify("1 VAS charge(s) saved.".into())]
        );
    }
}
