use super::*;
use crate::{graphics::Point, path::BBox};
use assert_approx_eq::assert_approx_eq;
use test_case::test_case;

const RED: Option<Rgb> = Some(Rgb::new(1.0, 0.0, 0.0));
const BLUE: Option<Rgb> = Some(Rgb::new(0.0, 0.0, 1.0));

/// Closed rectangle path with fill color.
fn rect(x: f64, y: f64, w: f64, h: f64, fill: Option<Rgb>) -> PaintedObject {
    let segments = vec![
        PathSegment::MoveTo(Point::new(x, y)),
        PathSegment::LineTo(Point::new(x + w, y)),
        PathSegment::LineTo(Point::new(x + w, y + h)),
        PathSegment::LineTo(Point::new(x, y + h)),
        PathSegment::ClosePath,
    ];
    PaintedObject {
        bbox: bbox(&segments).unwrap(),
        segments,
        fill,
        stroke: None,
        stroke_width_mm: 0.35,
    }
}

#[test]
fn merge_two_near_rects() {
    let a = rect(0.0, 0.0, 10.0, 10.0, RED);
    let b = rect(15.0, 0.0, 10.0, 10.0, RED);
    let r = merge_by_style_and_proximity(&[a.clone(), b.clone()], DEFAULT_PROXIMITY_THRESHOLD_MM);
    assert_eq!(r.len(), 1);
    let m = &r[0];
    assert_eq!(m.segments.len(), a.segments.len() + b.segments.len());
    assert_eq!(&m.segments[..5], &a.segments[..]);
    assert_eq!(&m.segments[5..], &b.segments[..]);
    assert_eq!(m.bbox, a.bbox.union(&b.bbox));
    assert_eq!(m.fill, RED);
    assert_eq!(m.stroke, None);
    assert_eq!(m.stroke_width_mm, 0.35);
}

#[test]
fn chain_merged_transitively() {
    // neighbours 40mm apart, first and last 160mm apart
    let objects: Vec<_> = (0..5)
        .map(|i| rect(i as f64 * 40.0, 0.0, 10.0, 10.0, RED))
        .collect();
    assert!(!is_near(&objects[0], &objects[4], DEFAULT_PROXIMITY_THRESHOLD_MM));
    let r = merge_by_style_and_proximity(&objects, DEFAULT_PROXIMITY_THRESHOLD_MM);
    assert_eq!(r.len(), 1);
    assert_eq!(r[0].segments.len(), 25);
    assert_approx_eq!(r[0].bbox.w, 170.0);
}

#[test]
fn chain_discovered_out_of_order() {
    // the middle object links the two ends, it is discovered last
    let objects = vec![
        rect(0.0, 0.0, 10.0, 10.0, RED),
        rect(80.0, 0.0, 10.0, 10.0, RED),
        rect(40.0, 0.0, 10.0, 10.0, RED),
    ];
    let r = merge_by_style_and_proximity(&objects, DEFAULT_PROXIMITY_THRESHOLD_MM);
    assert_eq!(r.len(), 1);
    // discovery order: seed, the middle one, then the far end
    assert_eq!(r[0].segments[5..10], objects[2].segments[..]);
    assert_eq!(r[0].segments[10..], objects[1].segments[..]);
}

#[test]
fn different_fill_never_merged() {
    let a = rect(0.0, 0.0, 10.0, 10.0, RED);
    let b = rect(0.0, 0.0, 10.0, 10.0, BLUE);
    let r = merge_by_style_and_proximity(&[a.clone(), b.clone()], DEFAULT_PROXIMITY_THRESHOLD_MM);
    assert_eq!(r, vec![a, b]);
}

#[test]
fn style_groups_in_first_appearance_order() {
    let objects = vec![
        rect(0.0, 0.0, 1.0, 1.0, BLUE),
        rect(0.0, 0.0, 1.0, 1.0, RED),
        rect(2.0, 0.0, 1.0, 1.0, BLUE),
    ];
    let r = merge_by_style_and_proximity(&objects, DEFAULT_PROXIMITY_THRESHOLD_MM);
    assert_eq!(r.len(), 2);
    assert_eq!(r[0].fill, BLUE);
    assert_eq!(r[0].segments.len(), 10);
    assert_eq!(r[1].fill, RED);
}

#[test]
fn far_objects_kept_apart() {
    let objects = vec![
        rect(0.0, 0.0, 10.0, 10.0, RED),
        rect(200.0, 0.0, 10.0, 10.0, RED),
        rect(20.0, 0.0, 10.0, 10.0, RED),
    ];
    let r = merge_by_style_and_proximity(&objects, DEFAULT_PROXIMITY_THRESHOLD_MM);
    assert_eq!(r.len(), 2);
    assert_eq!(r[0].segments.len(), 10);
    assert_eq!(r[1], objects[1]);
}

#[test_case(49.9 => 1; "below threshold")]
#[test_case(50.0 => 2; "at threshold")]
#[test_case(50.1 => 2; "above threshold")]
fn threshold_is_strict(distance: f64) -> usize {
    let objects = vec![
        rect(0.0, 0.0, 10.0, 10.0, RED),
        rect(distance, 0.0, 10.0, 10.0, RED),
    ];
    merge_by_style_and_proximity(&objects, 50.0).len()
}

#[test]
fn custom_threshold() {
    let objects = vec![
        rect(0.0, 0.0, 10.0, 10.0, RED),
        rect(15.0, 0.0, 10.0, 10.0, RED),
    ];
    assert_eq!(merge_by_style_and_proximity(&objects, 10.0).len(), 2);
    assert_eq!(merge_by_style_and_proximity(&objects, 20.0).len(), 1);
}

#[test]
fn style_rounded_to_hundredth() {
    let a = rect(0.0, 0.0, 1.0, 1.0, Some(Rgb::new(0.501, 0.0, 0.0)));
    let b = rect(2.0, 0.0, 1.0, 1.0, Some(Rgb::new(0.499, 0.0, 0.0)));
    assert_eq!(StyleKey::of(&a), StyleKey::of(&b));
    let r = merge_by_style_and_proximity(&[a.clone(), b], DEFAULT_PROXIMITY_THRESHOLD_MM);
    assert_eq!(r.len(), 1);
    assert_eq!(r[0].fill, a.fill, "style of the first member");

    let mut c = a.clone();
    c.stroke_width_mm = 0.5;
    assert_ne!(StyleKey::of(&a), StyleKey::of(&c));
    let mut d = a.clone();
    d.stroke = Some(Rgb::BLACK);
    assert_ne!(StyleKey::of(&a), StyleKey::of(&d));
}

#[test]
fn empty_selection() {
    assert!(merge_by_style_and_proximity(&[], DEFAULT_PROXIMITY_THRESHOLD_MM).is_empty());
}

#[test]
fn objects_without_segments_skipped() {
    let empty = PaintedObject {
        segments: vec![],
        fill: RED,
        stroke: None,
        stroke_width_mm: 0.35,
        bbox: BBox::default(),
    };
    let a = rect(0.0, 0.0, 1.0, 1.0, RED);
    let r = merge_by_style_and_proximity(
        &[empty.clone(), a.clone()],
        DEFAULT_PROXIMITY_THRESHOLD_MM,
    );
    assert_eq!(r, vec![a]);
    assert!(merge_by_style_and_proximity(&[empty], DEFAULT_PROXIMITY_THRESHOLD_MM).is_empty());
}

#[test]
fn single_object_unchanged() {
    let a = rect(3.0, 4.0, 5.0, 6.0, RED);
    assert_eq!(
        merge_by_style_and_proximity(std::slice::from_ref(&a), DEFAULT_PROXIMITY_THRESHOLD_MM),
        vec![a]
    );
}
