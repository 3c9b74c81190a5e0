use sweepline::data::{LineSegment, Point};
use sweepline::find_intersections;

fn seg(a: (f64, f64), b: (f64, f64)) -> LineSegment {
  LineSegment::new(a.into(), b.into())
}

fn points_of(segments: &[LineSegment]) -> Vec<Point> {
  find_intersections(segments).expect("sweep failed")
}

fn assert_points(segments: &[LineSegment], expected: &[(f64, f64)]) {
  let points = points_of(segments);
  assert_eq!(points.len(), expected.len(), "got {points:?}");
  for &(x, y) in expected {
    let want = Point::new(x, y);
    assert!(points.contains(&want), "missing {want}, got {points:?}");
  }
}

#[test]
fn two_crossing_diagonals() {
  let segments = vec![seg((0.0, 1.0), (1.0, 0.0)), seg((-1.0, -1.0), (2.0, 2.0))];
  assert_eq!(points_of(&segments), vec![Point::new(0.5, 0.5)]);
}

#[test]
fn three_segments_three_intersections() {
  let segments = vec![
    seg((0.0, 1.0), (1.5, -0.5)),
    seg((-1.0, -1.0), (2.0, 2.0)),
    seg((-2.0, -0.75), (3.0, 0.5)),
  ];
  assert_points(
    &segments,
    &[(-1.0 / 3.0, -1.0 / 3.0), (0.5, 0.5), (1.0, 0.0)],
  );
}

#[test]
fn right_endpoint_is_the_intersection() {
  let segments = vec![seg((-0.5, -0.5), (0.5, 0.5)), seg((0.0, 1.0), (1.0, 0.0))];
  assert_eq!(points_of(&segments), vec![Point::new(0.5, 0.5)]);
}

#[test]
fn left_endpoint_is_the_intersection() {
  let segments = vec![seg((-0.5, -0.5), (1.0, 1.0)), seg((0.5, 0.5), (1.0, 0.0))];
  assert_eq!(points_of(&segments), vec![Point::new(0.5, 0.5)]);
}

#[test]
fn four_segments_through_a_common_point() {
  let segments = vec![
    seg((1.0, 2.0), (3.0, 0.0)),
    seg((1.0, 1.0), (3.0, -1.0)),
    seg((1.0, 0.0), (3.0, 2.0)),
    seg((1.0, -1.0), (3.0, 1.0)),
  ];
  assert_points(
    &segments,
    &[(1.5, 0.5), (2.0, 1.0), (2.0, 0.0), (2.5, 0.5)],
  );
}

#[test]
fn coincident_endpoints_forming_an_angle() {
  let segments = vec![seg((0.0, 0.0), (1.0, 1.0)), seg((1.0, 1.0), (2.0, 0.0))];
  assert_eq!(points_of(&segments), vec![Point::new(1.0, 1.0)]);
}

#[test]
fn every_reported_point_is_sound_and_unique() {
  let segments = vec![
    seg((0.0, 0.0), (6.0, 3.0)),
    seg((0.0, 3.0), (6.0, 0.0)),
    seg((1.0, -1.0), (5.0, 4.0)),
    seg((0.0, 2.0), (6.0, 2.0)),
    seg((3.0, -2.0), (3.0, 4.0)),
  ];
  let points = points_of(&segments);
  assert!(!points.is_empty());
  for (i, a) in points.iter().enumerate() {
    // Exact-equality uniqueness.
    for b in &points[..i] {
      assert!(
        a.x.to_bits() != b.x.to_bits() || a.y.to_bits() != b.y.to_bits(),
        "{a} reported twice"
      );
    }
    // Soundness: on at least two input segments.
    let supporting = segments
      .iter()
      .filter(|s| s.is_in_line_segment(*a))
      .count();
    assert!(supporting >= 2, "{a} lies on {supporting} segments");
  }
}
