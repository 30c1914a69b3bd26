//! Unit tests for catalogs and the form binding

use serde_json::json;

use crate::catalog::{Catalog, FormField, JsonField, PlanBinding};
use crate::config::EditorConfig;
use crate::editor::PointerEvent;
use crate::geometry::StageRect;
use crate::plan::MachineType;

#[test]
fn test_catalog_from_reference_data() {
    let catalog = Catalog::from_reference_data(&json!([
        { "id": 1, "name": "Salón principal" },
        { "id": "VIP", "name": "Sala VIP" },
        { "name": "missing id" },
    ]));
    assert_eq!(catalog.zone_types().len(), 2);
    assert_eq!(catalog.zone_type_name("1"), "Salón principal");
    assert_eq!(catalog.zone_type_name("VIP"), "Sala VIP");
    assert_eq!(catalog.zone_type_name("TERRAZA"), "TERRAZA");
}

#[test]
fn test_catalog_rejects_non_list() {
    let catalog = Catalog::from_reference_data(&json!({ "id": 1 }));
    assert!(catalog.zone_types().is_empty());
}

#[test]
fn test_machine_type_labels() {
    let catalog = Catalog::default();
    let names: Vec<&str> = catalog
        .machine_types()
        .iter()
        .map(|t| catalog.machine_type_name(*t))
        .collect();
    assert_eq!(names, vec!["Tragamonedas", "Ruleta", "Blackjack", "Poker"]);
}

#[test]
fn test_binding_writes_on_commit_only() {
    let mut binding = PlanBinding::new(JsonField::default());
    let mut editor = binding.open_editor(&EditorConfig::default());
    assert!(editor.plan().is_empty());

    let effects = editor.add_machine(MachineType::Ruleta);
    assert!(binding.apply(&editor, &effects));
    assert_eq!(binding.field().revision, 1);

    // grab and move: intermediate frames do not persist
    let stage = StageRect::default();
    let effects = editor.on_pointer_down(&PointerEvent::new(100.0, 100.0, stage));
    assert!(!binding.apply(&editor, &effects));
    let effects = editor.on_pointer_move(&PointerEvent::new(300.0, 300.0, stage));
    assert!(!binding.apply(&editor, &effects));
    assert_eq!(binding.stored_plan().machines[0].x, 60.0);

    let effects = editor.on_pointer_up(&PointerEvent::new(300.0, 300.0, stage));
    assert!(binding.apply(&editor, &effects));
    assert_eq!(binding.stored_plan().machines[0].x, 260.0);
    assert_eq!(binding.field().revision, 2);
}

#[test]
fn test_binding_reopens_stored_plan() {
    let mut binding = PlanBinding::new(JsonField::default());
    let mut editor = binding.open_editor(&EditorConfig::default());
    let effects = editor.add_zone("VIP");
    binding.apply(&editor, &effects);

    let field = binding.into_field();
    assert!(field.value().is_some());

    let reopened = PlanBinding::new(field).open_editor(&EditorConfig::default());
    assert_eq!(reopened.plan(), editor.plan());
}

#[test]
fn test_binding_accepts_string_payload() {
    let stored = json!(r#"{"machines":[{"id":2,"type":"Poker","x":61,"y":79}]}"#);
    let binding = PlanBinding::new(JsonField::new(Some(stored)));
    let editor = binding.open_editor(&EditorConfig::default());
    let m = editor.plan().machine(2).unwrap();
    assert_eq!((m.x, m.y), (60.0, 80.0));
}
