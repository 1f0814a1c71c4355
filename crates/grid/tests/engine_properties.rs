use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use grid::{
    ActionKey, ColumnSpec, CustomTable, FieldKind, FieldSpec, Fields, FilterBar, FilterFieldSpec,
    FormEngine, FormSection, ListView, MappingConfig, MappingRule, RowRecord, SchemaError,
    Section, SubmitOutcome, TabSet, TableData, TableSection, assign_ids, with_ids,
};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn objects(value: Value) -> Vec<Fields> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn bookings() -> Vec<RowRecord> {
    with_ids(objects(json!([
        { "id": "BK-1", "customer": "Acme", "status": "A" },
        { "id": "BK-2", "customer": "Globex", "status": "B" },
        { "id": "BK-3", "customer": "Initech", "status": "B" }
    ])))
}

#[test]
fn row_identity_preserves_length_and_distinctness() {
    for n in [0usize, 1, 7, 64] {
        let raw: Vec<Fields> = (0..n)
            .map(|i| {
                let mut f = Fields::new();
                if i % 3 == 0 {
                    f.insert("id".into(), json!(format!("src-{i}")));
                }
                f.insert("n".into(), json!(i));
                f
            })
            .collect();
        let rows = with_ids(raw);
        assert_eq!(rows.len(), n);
        let ids: HashSet<_> = rows.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids.len(), n);
        assert!(rows.iter().all(|r| !r.id.is_empty()));
    }

    let mut unavailable = || -> Option<String> { None };
    let rows = assign_ids(objects(json!([{}, {}])), &mut unavailable);
    assert_eq!(rows[0].id, "row-0");
    assert_eq!(rows[1].id, "row-1");
}

#[test]
fn mapping_fills_and_clears_vas_name() {
    let mapping = MappingConfig::new().with(
        "vasId",
        MappingRule {
            key_field: "vasId".into(),
            data: objects(json!([{ "vasId": "VAS001", "vasName": "Insurance" }])),
            mapped_fields: vec!["vasName".into()],
        },
    );
    let mut table = TableSection::new(
        "VAS Charges",
        vec![ColumnSpec::new("vasId", "VAS"), ColumnSpec::new("vasName", "Name")],
    )
    .dynamic_rows(Fields::new())
    .with_mapping(mapping);

    let id = table.add_row().unwrap().id.clone();
    table.set_cell(&id, "vasId", "VAS001").unwrap();
    assert_eq!(table.rows()[0].cell_text("vasName"), "Insurance");
    table.set_cell(&id, "vasId", "VAS404").unwrap();
    assert_eq!(table.rows()[0].cell_text("vasName"), "");
}

#[test]
fn disabled_actions_are_neither_rendered_nor_dispatched() {
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let sink = dispatched.clone();
    let mut view = ListView::new(vec![ColumnSpec::new("customer", "Customer")], bookings())
        .with_actions(["edit", "view"].into_iter().collect(), move |key, row| {
            sink.lock().unwrap().push((key.clone(), row.id.clone()))
        });

    let row = view.rows()[0].clone();
    assert!(!view.actions_for(&row).contains(&&ActionKey::Delete));
    assert_eq!(view.click_action(&ActionKey::Delete, "BK-1"), Ok(false));
    assert_eq!(view.click_action(&ActionKey::View, "BK-1"), Ok(true));
    assert_eq!(
        *dispatched.lock().unwrap(),
        vec![(ActionKey::View, "BK-1".to_string())]
    );
}

#[test]
fn filter_search_reaches_handler_once_without_filtering() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let bar = FilterBar::new(vec![
        FilterFieldSpec::text("customer", "Customer"),
        FilterFieldSpec::select("status", "Status", ["A", "B"]),
    ])
    .on_search(move |values| sink.lock().unwrap().push(values.clone()));
    let mut view =
        ListView::new(vec![ColumnSpec::new("customer", "Customer")], bookings()).with_filter_bar(bar);

    view.filter_bar_mut().unwrap().set_value("status", "B").unwrap();
    view.search();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].get("status").map(String::as_str), Some("B"));
    assert_eq!(calls[0].get("customer").map(String::as_str), Some(""));
    assert_eq!(view.rows().len(), 3);
}

#[test]
fn invalid_sections_never_submit_and_sections_stay_independent() {
    let submitted = Arc::new(Mutex::new(0));
    let sink = submitted.clone();
    let details = FormSection::new(
        "Booking Details",
        vec![
            FieldSpec::new("customer", "Customer", FieldKind::Text).required(),
            FieldSpec::new("weight", "Weight", FieldKind::Number),
        ],
    )
    .unwrap()
    .on_submit(move |_| *sink.lock().unwrap() += 1);
    let notes = FormSection::new(
        "Notes",
        vec![FieldSpec::new("remark", "Remark", FieldKind::Textarea)],
    )
    .unwrap();
    let mut engine = FormEngine::new(vec![Section::Form(details), Section::Form(notes)]);

    engine.form_mut(0).unwrap().set_value("weight", "lots").unwrap();
    match engine.form_mut(0).unwrap().submit() {
        SubmitOutcome::Invalid(result) => {
            assert!(result.error("customer").is_some());
            assert!(result.error("weight").is_some());
        }
        other => panic!("expected invalid, got {other:?}"),
    }
    assert_eq!(*submitted.lock().unwrap(), 0);

    assert!(matches!(
        engine.form_mut(1).unwrap().submit(),
        SubmitOutcome::Submitted(_)
    ));
    assert_eq!(*submitted.lock().unwrap(), 0);

    let form = engine.form_mut(0).unwrap();
    form.set_value("customer", "Acme").unwrap();
    form.set_value("weight", "12").unwrap();
    assert!(matches!(form.submit(), SubmitOutcome::Submitted(_)));
    assert_eq!(*submitted.lock().unwrap(), 1);
}

#[test]
fn editing_an_entry_restores_its_values() {
    let mut section = FormSection::new(
        "Container",
        vec![
            FieldSpec::new("containerNo", "Container No", FieldKind::Text),
            FieldSpec::new("size", "Size", FieldKind::Select {
                options: grid::options::options(["20ft", "40ft"]),
                plus_action: false,
            }),
            FieldSpec::new("reefer", "Reefer", FieldKind::Checkbox),
        ],
    )
    .unwrap()
    .with_custom_table(CustomTable::new(vec![ColumnSpec::new("containerNo", "Container No")]));

    let mut entry = Fields::new();
    entry.insert("containerNo".into(), json!("MSCU1234567"));
    entry.insert("size".into(), json!("40ft"));
    entry.insert("reefer".into(), json!(true));
    entry.insert("sealNo".into(), json!("S-9"));
    section.custom_table_mut().unwrap().push_entry(entry.clone());

    section.set_value("containerNo", "scratch").unwrap();
    section.edit_entry(0).unwrap();

    let shown = section.to_fields();
    for name in ["containerNo", "size", "reefer"] {
        assert_eq!(shown.get(name), entry.get(name), "field {name}");
    }
    assert_eq!(shown.get("sealNo"), None);
}

#[test]
fn tab_switch_rebinds_without_touching_other_tabs() {
    let mut data = IndexMap::new();
    data.insert(
        "open".to_string(),
        TableData::new(vec![ColumnSpec::new("invoice", "Invoice")], with_ids(objects(json!([
            { "id": "INV-1", "invoice": "INV-1" },
            { "id": "INV-2", "invoice": "INV-2" }
        ])))),
    );
    data.insert(
        "paid".to_string(),
        TableData::new(vec![ColumnSpec::new("receipt", "Receipt")], with_ids(objects(json!([
            { "id": "RC-1", "receipt": "RC-1" }
        ])))),
    );
    let mut labels = IndexMap::new();
    labels.insert("open".to_string(), "Open".to_string());
    labels.insert("paid".to_string(), "Paid".to_string());

    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = changes.clone();
    let mut view = ListView::from_tabs(TabSet::new(data, labels))
        .on_tab_change(move |key| sink.lock().unwrap().push(key.to_string()));

    assert_eq!(view.rows().len(), 2);
    view.remove_row("INV-1");
    view.switch_tab("paid").unwrap();
    assert_eq!(view.columns()[0].accessor_key, "receipt");
    assert_eq!(view.rows().len(), 1);

    let tabs = view.tabs().unwrap();
    assert_eq!(tabs.active(), "paid");
    assert_eq!(tabs.data("open").map(|d| d.rows.len()), Some(1));
    assert_eq!(tabs.data("paid").map(|d| d.rows.len()), Some(1));

    // the deleted invoice stays gone
    view.switch_tab("open").unwrap();
    let ids: Vec<&str> = view.rows().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["INV-2"]);
    assert_eq!(
        view.switch_tab("void"),
        Err(SchemaError::UnknownTab("void".into()))
    );
    assert_eq!(*changes.lock().unwrap(), vec!["paid".to_string(), "open".to_string()]);
}

#[test]
fn empty_inputs_render_no_grid() {
    assert!(ListView::new(vec![], bookings()).is_empty());
    assert!(ListView::new(vec![ColumnSpec::new("customer", "Customer")], vec![]).is_empty());
    assert!(TableData::default().is_empty());
}
