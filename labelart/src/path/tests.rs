use super::*;
use assert_approx_eq::assert_approx_eq;

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

#[test]
fn bbox_of_lines() {
    let segments = [
        PathSegment::MoveTo(p(1.0, 2.0)),
        PathSegment::LineTo(p(5.0, -1.0)),
        PathSegment::LineTo(p(3.0, 7.0)),
        PathSegment::ClosePath,
    ];
    assert_eq!(bbox(&segments), Some(BBox::new(1.0, -1.0, 4.0, 8.0)));
}

#[test]
fn bbox_includes_control_points() {
    let segments = [
        PathSegment::MoveTo(p(0.0, 0.0)),
        PathSegment::CurveTo {
            ctrl1: p(0.0, 10.0),
            ctrl2: p(10.0, 10.0),
            to: p(10.0, 0.0),
        },
    ];
    // visible curve peaks at y = 7.5, box goes to the control points
    assert_eq!(bbox(&segments), Some(BBox::new(0.0, 0.0, 10.0, 10.0)));
}

#[test]
fn bbox_single_point() {
    assert_eq!(
        bbox(&[PathSegment::MoveTo(p(3.0, 4.0))]),
        Some(BBox::new(3.0, 4.0, 0.0, 0.0))
    );
}

#[test]
fn bbox_without_points() {
    assert_eq!(bbox(&[]), None);
    assert_eq!(bbox(&[PathSegment::ClosePath]), None);
}

#[test]
fn bbox_contains_every_anchor() {
    let segments = [
        PathSegment::MoveTo(p(0.1, 0.7)),
        PathSegment::LineTo(p(0.3, 0.2)),
        PathSegment::CurveTo {
            ctrl1: p(-3.3, 1.1),
            ctrl2: p(2.9, 0.35),
            to: p(0.7, 8.1),
        },
        PathSegment::ClosePath,
    ];
    let b = bbox(&segments).unwrap();
    for s in &segments {
        for pt in s.points() {
            assert!(b.contains(pt), "{:?} not in {:?}", pt, b);
        }
    }
}

#[test]
fn bbox_helpers() {
    let b = BBox::new(1.0, 2.0, 4.0, 6.0);
    assert_eq!(b.right(), 5.0);
    assert_eq!(b.bottom(), 8.0);
    assert_eq!(b.center(), p(3.0, 5.0));
    assert!(b.contains(p(1.0, 8.0)));
    assert!(!b.contains(p(0.5, 3.0)));

    let u = b.union(&BBox::new(-1.0, 3.0, 1.0, 10.0));
    assert_approx_eq!(u.x, -1.0);
    assert_approx_eq!(u.y, 2.0);
    assert_approx_eq!(u.w, 6.0);
    assert_approx_eq!(u.h, 11.0);
}

#[test]
fn segment_points() {
    let c = PathSegment::CurveTo {
        ctrl1: p(1.0, 2.0),
        ctrl2: p(3.0, 4.0),
        to: p(5.0, 6.0),
    };
    assert_eq!(
        c.points().collect::<Vec<_>>(),
        vec![p(1.0, 2.0), p(3.0, 4.0), p(5.0, 6.0)]
    );
    assert_eq!(c.end_point(), Some(p(5.0, 6.0)));
    assert_eq!(PathSegment::ClosePath.points().count(), 0);
    assert_eq!(PathSegment::ClosePath.end_point(), None);
}

#[test]
fn builder_tracks_current_point() {
    let mut b = PathBuilder::new();
    assert!(b.is_empty());
    assert_eq!(b.current_point(), None);

    b.move_to(p(1.0, 1.0));
    b.line_to(p(2.0, 1.0));
    assert_eq!(b.current_point(), Some(p(2.0, 1.0)));
    b.curve_to(p(3.0, 1.0), p(3.0, 2.0), p(3.0, 3.0));
    assert_eq!(b.current_point(), Some(p(3.0, 3.0)));
    b.close();
    assert_eq!(b.current_point(), Some(p(1.0, 1.0)), "close returns to subpath start");
    assert_eq!(b.segments().len(), 4);
}

#[test]
fn builder_take_resets() {
    let mut b = PathBuilder::new();
    b.move_to(p(1.0, 1.0));
    b.line_to(p(2.0, 1.0));
    let taken = b.take();
    assert_eq!(taken.len(), 2);
    assert!(b.is_empty());
    assert_eq!(b.current_point(), None);

    b.move_to(p(5.0, 5.0));
    b.clear();
    assert!(b.is_empty());
}
