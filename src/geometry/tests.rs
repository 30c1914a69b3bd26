//! Unit tests for the geometry helpers

use crate::geometry::*;

#[test]
fn test_clamp_basic() {
    assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
    assert_eq!(clamp(-3.0, 0.0, 10.0), 0.0);
    assert_eq!(clamp(42.0, 0.0, 10.0), 10.0);
}

#[test]
fn test_clamp_inverted_bounds_pins_to_min() {
    assert_eq!(clamp(50.0, 0.0, -20.0), 0.0);
}

#[test]
fn test_snap_rounds_to_grid() {
    assert_eq!(snap(503.0), 500.0);
    assert_eq!(snap(287.0), 290.0);
    assert_eq!(snap(305.0), 310.0);
    assert_eq!(snap(-4.0), 0.0);
    assert_eq!(snap_down(305.0), 300.0);
    assert_eq!(snap_up(301.0), 310.0);
}

#[test]
fn test_snap_within_stays_on_grid() {
    // max of 1015 is not a grid line; result must not exceed it
    assert_eq!(snap_within(1013.0, 0.0, 1015.0), 1010.0);
    assert_eq!(snap_within(-7.0, 0.0, 1015.0), 0.0);
}

#[test]
fn test_normalize_rotation() {
    assert_eq!(normalize_rotation(0), 0);
    assert_eq!(normalize_rotation(360), 0);
    assert_eq!(normalize_rotation(725), 5);
    assert_eq!(normalize_rotation(-3), 357);
    assert_eq!(normalize_rotation(-720), 0);
}

#[test]
fn test_rect_overlap_strict() {
    let a = Rect::new(0.0, 0.0, 100.0, 100.0);
    let touching = Rect::new(100.0, 0.0, 50.0, 50.0);
    let inside = Rect::new(99.0, 99.0, 10.0, 10.0);
    let apart = Rect::new(0.0, 150.0, 10.0, 10.0);

    assert!(!rect_overlap(&a, &touching));
    assert!(rect_overlap(&a, &inside));
    assert!(rect_overlap(&inside, &a));
    assert!(!rect_overlap(&a, &apart));
}

#[test]
fn test_to_logical_divides_by_zoom() {
    let stage = StageRect { left: 100.0, top: 50.0 };
    let p = to_logical(Point::new(300.0, 250.0), stage, 2.0);
    assert_eq!(p, Point::new(100.0, 100.0));
}

#[test]
fn test_guide_threshold() {
    assert_eq!(guide_for(203.0, 4.0), Some(200.0));
    assert_eq!(guide_for(196.0, 4.0), Some(200.0));
    assert_eq!(guide_for(205.0, 4.0), None);
}
