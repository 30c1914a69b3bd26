//! Unit tests for the plan data structures

use crate::geometry::{rect_overlap, Point};
use crate::plan::{
    next_id, within_stage, DoorKind, MachineItem, MachineStatus, MachineType, Plan, Stage,
    MACHINE_MIN_W, ZONE_MIN_H,
};

#[test]
fn test_next_id() {
    assert_eq!(next_id(Vec::<u32>::new()), 1);
    assert_eq!(next_id(vec![3, 1, 7]), 8);
}

#[test]
fn test_machine_new_defaults() {
    let m = MachineItem::new(12, MachineType::Blackjack);
    assert_eq!(m.label, 12);
    assert_eq!(m.name, "Blackjack 12");
    assert_eq!(m.serial, "BJK-00012");
    assert_eq!(m.image, "machines/blackjack.png");
    assert_eq!(m.status, MachineStatus::Activa);
    assert_eq!((m.w, m.h, m.r), (180.0, 130.0, 0));
}

#[test]
fn test_machine_type_from_label() {
    assert_eq!(MachineType::from_label(" ruleta "), Some(MachineType::Ruleta));
    assert_eq!(MachineType::from_label("Bingo"), None);
}

#[test]
fn test_add_machine_default_slot() {
    let mut plan = Plan::new();
    let m = plan.add_machine(MachineType::Ruleta, &Stage::default());
    assert_eq!(m.id, 1);
    assert_eq!((m.x, m.y), (60.0, 80.0));
}

#[test]
fn test_repeated_adds_fan_out_without_overlap() {
    let stage = Stage::default();
    let mut plan = Plan::new();
    for _ in 0..5 {
        plan.add_machine(MachineType::Tragamonedas, &stage);
    }
    for (i, a) in plan.machines.iter().enumerate() {
        assert!(within_stage(&a.rect(), &stage));
        for b in &plan.machines[i + 1..] {
            assert!(!rect_overlap(&a.rect(), &b.rect()), "{} overlaps {}", a.id, b.id);
        }
    }
}

#[test]
fn test_crowded_add_keeps_last_candidate() {
    let stage = Stage::default();
    let mut plan = Plan::new();
    for _ in 0..5 {
        plan.add_machine(MachineType::Tragamonedas, &stage);
    }
    // slot (160, 60) is boxed in by the first five; the search gives up at radius 140
    let sixth = plan.add_machine(MachineType::Tragamonedas, &stage);
    assert_eq!((sixth.x, sixth.y), (20.0, 0.0));
    assert!(plan.machines[..5]
        .iter()
        .any(|m| rect_overlap(&m.rect(), &sixth.rect())));
}

#[test]
fn test_ids_follow_current_max() {
    let stage = Stage::default();
    let mut plan = Plan::new();
    plan.add_machine(MachineType::Poker, &stage);
    plan.add_machine(MachineType::Poker, &stage);
    plan.add_machine(MachineType::Poker, &stage);
    assert!(plan.remove_machine(2));
    assert_eq!(plan.add_machine(MachineType::Poker, &stage).id, 4);

    // removing the max lets the next add take its id again
    assert!(plan.remove_machine(4));
    assert_eq!(plan.add_machine(MachineType::Poker, &stage).id, 4);
    assert!(!plan.remove_machine(99));
}

#[test]
fn test_zone_ids_are_separate() {
    let stage = Stage::default();
    let mut plan = Plan::new();
    plan.add_machine(MachineType::Poker, &stage);
    plan.add_machine(MachineType::Poker, &stage);
    let zone = plan.add_zone("SALON", &stage);
    assert_eq!(zone.id, 1);
    assert_eq!((zone.w, zone.h), (260.0, 160.0));
    assert!(plan.remove_zone(1));
    assert!(plan.zones.is_empty());
}

#[test]
fn test_place_door_once() {
    let stage = Stage::default();
    let mut plan = Plan::new();
    assert!(plan.place_door(DoorKind::Entrada, Point::new(503.0, 287.0), &stage));
    assert!(!plan.place_door(DoorKind::Entrada, Point::new(0.0, 0.0), &stage));
    assert!(plan.place_door(DoorKind::Salida, Point::new(-40.0, 9999.0), &stage));

    assert_eq!(plan.entrada.map(|d| (d.x, d.y)), Some((500.0, 290.0)));
    assert_eq!(plan.salida.map(|d| (d.x, d.y)), Some((0.0, 660.0)));

    assert!(plan.remove_door(DoorKind::Entrada));
    assert!(!plan.remove_door(DoorKind::Entrada));
}

#[test]
fn test_rename_and_status() {
    let mut plan = Plan::new();
    plan.add_machine(MachineType::Ruleta, &Stage::default());
    assert!(!plan.rename(1, " \t"));
    assert!(plan.rename(1, "Ruleta francesa"));
    assert!(!plan.rename(2, "nobody"));
    assert_eq!(plan.machine(1).unwrap().name, "Ruleta francesa");

    assert!(plan.set_status(1, MachineStatus::Mantenimiento));
    assert_eq!(plan.machine(1).unwrap().status, MachineStatus::Mantenimiento);
}

#[test]
fn test_rotation_wraps() {
    let stage = Stage::default();
    let mut plan = Plan::new();
    plan.add_machine(MachineType::Ruleta, &stage);
    plan.place_door(DoorKind::Salida, Point::new(10.0, 10.0), &stage);

    plan.rotate_machine(1, -10);
    assert_eq!(plan.machine(1).unwrap().r, 350);
    plan.rotate_machine(1, 730);
    assert_eq!(plan.machine(1).unwrap().r, 0);

    plan.rotate_door(DoorKind::Salida, 370);
    assert_eq!(plan.salida.unwrap().r, 10);
    assert!(!plan.rotate_door(DoorKind::Entrada, 5));
}

#[test]
fn test_normalize_pulls_entities_back_on_stage() {
    let stage = Stage::default();
    let mut plan = Plan::new();
    plan.add_machine(MachineType::Ruleta, &stage);
    plan.add_zone("SALON", &stage);
    plan.machines[0].x = 5000.0;
    plan.machines[0].w = 95.0;
    plan.zones[0].y = 9999.0;
    plan.zones[0].h = 12.0;

    plan.normalize(&stage);
    let m = &plan.machines[0];
    assert_eq!((m.x, m.w), (1010.0, 180.0));
    let z = &plan.zones[0];
    assert_eq!((z.y, z.h), (620.0, 90.0));
}

#[test]
fn test_clear() {
    let stage = Stage::default();
    let mut plan = Plan::new();
    plan.add_machine(MachineType::Ruleta, &stage);
    plan.add_zone("SALON", &stage);
    plan.place_door(DoorKind::Entrada, Point::new(100.0, 100.0), &stage);
    plan.clear();
    assert!(plan.is_empty());
}

#[test]
fn test_normalize_caps_oversized_entities_to_stage() {
    let stage = Stage::default();
    let mut plan = Plan::new();
    plan.add_machine(MachineType::Ruleta, &stage);
    plan.add_zone("SALON", &stage);
    plan.machines[0].w = 4000.0;
    plan.machines[0].h = 9000.0;
    plan.zones[0].x = 50.0;
    plan.zones[0].w = 5000.0;

    plan.normalize(&stage);
    let m = &plan.machines[0];
    assert_eq!((m.x, m.y, m.w, m.h), (0.0, 0.0, 1190.0, 710.0));
    assert!(within_stage(&m.rect(), &stage));
    let z = &plan.zones[0];
    assert_eq!((z.x, z.w), (0.0, 1190.0));
    assert!(within_stage(&z.rect(), &stage));
}

#[test]
fn test_size_floor_wins_on_tiny_stage() {
    let stage = Stage::new(100.0, 100.0, 10.0);
    assert_eq!(stage.fit_width(500.0, MACHINE_MIN_W), MACHINE_MIN_W);
    assert_eq!(stage.fit_height(12.0, ZONE_MIN_H), ZONE_MIN_H);
}

#[test]
fn test_next_id_after_max_takes_smallest_free() {
    assert_eq!(next_id(vec![u32::MAX]), 1);
    assert_eq!(next_id(vec![u32::MAX, 1, 3]), 2);
    assert_eq!(next_id(vec![u32::MAX - 1]), u32::MAX);
}

#[test]
fn test_add_after_max_id_stays_unique() {
    let stage = Stage::default();
    let mut plan = Plan::new();
    plan.machines.push(MachineItem::new(u32::MAX, MachineType::Poker));
    let added = plan.add_machine(MachineType::Ruleta, &stage);
    assert_eq!(added.id, 1);
    assert_ne!(plan.machines[0].id, plan.machines[1].id);
}
