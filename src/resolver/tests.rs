//! Unit tests for the overlap resolver

use crate::geometry::{rect_overlap, Rect};
use crate::plan::{on_grid, Stage};
use crate::resolver::resolve;

fn machine_at(x: f64, y: f64) -> Rect {
    Rect::new(x, y, 180.0, 130.0)
}

#[test]
fn test_free_candidate_is_kept() {
    let stage = Stage::default();
    let others = vec![machine_at(600.0, 400.0)];
    let result = resolve(machine_at(60.0, 80.0), &others, &stage);
    assert!(result.clear);
    assert_eq!(result.rect, machine_at(60.0, 80.0));
}

#[test]
fn test_touching_edges_need_no_move() {
    let stage = Stage::default();
    let others = vec![machine_at(60.0, 80.0)];
    let result = resolve(machine_at(240.0, 80.0), &others, &stage);
    assert!(result.clear);
    assert_eq!(result.rect.x, 240.0);
}

#[test]
fn test_relocates_to_nearest_clear_offset() {
    let stage = Stage::default();
    let others = vec![machine_at(60.0, 80.0)];
    // Needs +110 on y (or +160 on x); the southward move at radius 110 wins.
    let result = resolve(machine_at(80.0, 100.0), &others, &stage);
    assert!(result.clear);
    assert_eq!(result.rect, machine_at(80.0, 210.0));
}

#[test]
fn test_result_does_not_overlap_when_clear() {
    let stage = Stage::default();
    let others = vec![
        machine_at(300.0, 300.0),
        machine_at(480.0, 300.0),
        machine_at(300.0, 430.0),
    ];
    let result = resolve(machine_at(350.0, 350.0), &others, &stage);
    assert!(result.clear);
    assert!(others.iter().all(|o| !rect_overlap(&result.rect, o)));
    assert!(on_grid(result.rect.x) && on_grid(result.rect.y));
}

#[test]
fn test_exhausted_search_falls_back_to_last_candidate() {
    // Stage exactly one machine wide and tall: every candidate clamps back onto the blocker.
    let stage = Stage::new(190.0, 140.0, 10.0);
    let others = vec![machine_at(0.0, 0.0)];
    let result = resolve(machine_at(0.0, 0.0), &others, &stage);
    assert!(!result.clear);
    assert_eq!(result.rect, machine_at(0.0, 0.0));
    assert!(rect_overlap(&result.rect, &others[0]));
}

#[test]
fn test_candidates_stay_on_stage() {
    let stage = Stage::default();
    let others = vec![machine_at(0.0, 0.0)];
    let result = resolve(machine_at(0.0, 0.0), &others, &stage);
    assert!(result.clear);
    assert!(result.rect.x >= 0.0 && result.rect.y >= 0.0);
    assert!(result.rect.right() <= stage.width);
    assert!(result.rect.bottom() <= stage.height);
}
