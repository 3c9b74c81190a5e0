use std::collections::HashSet;

use ordered_float::OrderedFloat;

use crate::data::{LineSegment, Point};

/// $O(n^2)$ Finds all line segment intersection points.
///
/// Tests every pair and applies the same exact-equality deduplication as
/// the sweep, making it a drop-in oracle for it on small inputs.
pub fn segment_intersections(segments: &[LineSegment]) -> Vec<Point> {
  let mut seen = HashSet::new();
  let mut points = Vec::new();
  for (a, b) in pairs(segments) {
    if let Some(point) = a.cross_point(b) {
      if seen.insert((OrderedFloat(point.x), OrderedFloat(point.y))) {
        points.push(point);
      }
    }
  }
  points
}

fn pairs<E>(slice: &[E]) -> impl Iterator<Item = (&E, &E)> {
  let n = slice.len();
  (0..n).flat_map(move |a| (0..a).map(move |b| (&slice[a], &slice[b])))
}
