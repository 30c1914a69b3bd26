//! Unit tests for the plan codec

use serde_json::json;

use crate::codec::{decode_str, decode_strict, deserialize, serialize, CodecError};
use crate::plan::{DoorKind, MachineStatus, MachineType, Plan, Stage};

fn sample_plan() -> Plan {
    let stage = Stage::default();
    let mut plan = Plan::new();
    plan.add_machine(MachineType::Ruleta, &stage);
    plan.add_machine(MachineType::Poker, &stage);
    plan.add_zone("VIP", &stage);
    plan.place_door(DoorKind::Entrada, crate::geometry::Point::new(503.0, 287.0), &stage);
    plan.rotate_machine(2, 95);
    plan.set_status(1, MachineStatus::Mantenimiento);
    plan
}

#[test]
fn test_serialize_shape() {
    let value = serialize(&sample_plan());
    assert!(value["machines"].is_array());
    assert!(value["zones"].is_array());
    assert!(value["salida"].is_null());
    assert_eq!(value["entrada"]["x"], json!(500.0));

    let machine = &value["machines"][0];
    assert_eq!(machine["type"], "Ruleta");
    assert_eq!(machine["status"], "Mantenimiento");
    assert_eq!(machine["serial"], "RUL-00001");
    assert_eq!(value["zones"][0]["type"], "VIP");
}

#[test]
fn test_round_trip() {
    let plan = sample_plan();
    let decoded = deserialize(&serialize(&plan));
    assert_eq!(decoded, plan);
}

#[test]
fn test_round_trip_through_string() {
    let plan = sample_plan();
    let text = serde_json::to_string(&serialize(&plan)).unwrap();
    assert_eq!(deserialize(&json!(text)), plan);
    assert_eq!(decode_str(&text), plan);
}

#[test]
fn test_missing_fields_get_defaults() {
    let plan = deserialize(&json!({
        "machines": [{ "id": 4 }],
        "zones": [{ "id": 2, "x": "35" }],
    }));

    let m = &plan.machines[0];
    assert_eq!(m.id, 4);
    assert_eq!(m.machine_type, MachineType::Tragamonedas);
    assert_eq!(m.status, MachineStatus::Activa);
    assert_eq!((m.w, m.h), (180.0, 130.0));
    assert_eq!((m.x, m.y, m.r), (0.0, 0.0, 0));
    assert_eq!(m.serial, "TRG-00004");
    assert_eq!(m.name, "Tragamonedas 4");

    let z = &plan.zones[0];
    assert_eq!((z.x, z.w, z.h), (40.0, 260.0, 160.0));
    assert_eq!(z.zone_type, "GENERAL");
    assert!(plan.entrada.is_none() && plan.salida.is_none());
}

#[test]
fn test_hand_edited_values_are_coerced() {
    let plan = deserialize(&json!({
        "machines": [{
            "id": "7", "type": "Blackjack", "status": "Roto",
            "x": 123.4, "y": -50, "w": 100, "h": 177, "r": -725
        }],
        "zones": [{ "id": 1, "type": 3, "w": 12, "h": "abc" }],
        "entrada": { "x": 14, "y": "22", "r": 361 },
    }));

    let m = &plan.machines[0];
    assert_eq!(m.id, 7);
    assert_eq!(m.machine_type, MachineType::Blackjack);
    assert_eq!(m.status, MachineStatus::Activa);
    assert_eq!((m.x, m.y), (120.0, 0.0));
    assert_eq!((m.w, m.h), (180.0, 180.0));
    assert_eq!(m.r, 355);

    let z = &plan.zones[0];
    assert_eq!(z.zone_type, "3");
    assert_eq!((z.w, z.h), (140.0, 160.0));

    let door = plan.entrada.unwrap();
    assert_eq!((door.x, door.y, door.r), (10.0, 20.0, 1));
}

#[test]
fn test_non_array_collections_become_empty() {
    let plan = deserialize(&json!({
        "machines": { "id": 1 },
        "zones": "nope",
        "entrada": [1, 2],
        "salida": { "x": "left", "y": 10 },
    }));
    assert!(plan.is_empty());
}

#[test]
fn test_garbage_input_never_fails() {
    assert!(deserialize(&json!(42)).is_empty());
    assert!(deserialize(&json!(null)).is_empty());
    assert!(deserialize(&json!("{ not json")).is_empty());
    assert!(deserialize(&json!([1, 2, 3])).is_empty());
    assert!(decode_str("").is_empty());
}

#[test]
fn test_duplicate_and_missing_ids_are_reassigned() {
    let plan = deserialize(&json!({
        "machines": [
            { "id": 3, "type": "Ruleta" },
            { "id": 3, "type": "Poker" },
            { "type": "Blackjack" },
        ],
    }));
    let ids: Vec<u32> = plan.machines.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![3, 4, 5]);
    assert_eq!(plan.machines[2].serial, "BJK-00005");
    assert_eq!(plan.machines[2].label, 5);
}

#[test]
fn test_strict_decode_reports_bad_json() {
    let err = decode_strict("{ machines: ").unwrap_err();
    assert!(matches!(err, CodecError::Json(_)));
    assert!(decode_strict(r#"{"machines": []}"#).unwrap().is_empty());
}

#[test]
fn test_ids_at_u32_max_do_not_collide() {
    let plan = deserialize(&json!({
        "machines": [
            { "id": 4294967295u64, "type": "Ruleta" },
            { "id": 4294967295u64, "type": "Poker" },
            { "type": "Blackjack" },
        ],
        "zones": [{ "id": 4294967295u64 }, {}],
    }));
    let ids: Vec<u32> = plan.machines.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![u32::MAX, 1, 2]);
    let zone_ids: Vec<u32> = plan.zones.iter().map(|z| z.id).collect();
    assert_eq!(zone_ids, vec![u32::MAX, 1]);
}
