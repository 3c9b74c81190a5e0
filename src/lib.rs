//! All pairwise intersection points of a set of planar line segments,
//! computed with the Bentley–Ottmann sweep-line algorithm in
//! `O((n + k) log n)` time for `n` segments and `k` intersections.
//!
//! The interesting machinery lives in two places: a generic 2-3 search
//! tree ([`data::two_three_tree`]) whose ordering is supplied by a
//! per-tree comparator object, and the sweep driver
//! ([`algorithms::intersection::sweep_line`]) that runs an event queue
//! and a status structure on top of that tree. The status tree's
//! comparator reads the current sweep-line x-coordinate through a shared
//! cell, so the same balanced tree stays ordered while the geometric key
//! of every stored segment changes underneath it.
//!
//! ```rust
//! use sweepline::data::{LineSegment, Point};
//! use sweepline::find_intersections;
//!
//! let segments = vec![
//!   LineSegment::new(Point::new(0.0, 1.0), Point::new(1.0, 0.0)),
//!   LineSegment::new(Point::new(-1.0, -1.0), Point::new(2.0, 2.0)),
//! ];
//! let points = find_intersections(&segments).unwrap();
//! assert_eq!(points, vec![Point::new(0.5, 0.5)]);
//! ```

pub mod algorithms;
pub mod data;

#[doc(inline)]
pub use algorithms::intersection::sweep_line::find_intersections;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  /// The segment has no well-defined coordinate at the queried value:
  /// the line is parallel to the queried axis, or the value falls outside
  /// the segment's bounding box.
  Unevaluable,
  /// Two status entries tie at the sweep line and neither side can be
  /// evaluated next to it.
  Incomparable,
  SegmentNotInStatus,
  MissingCrossPartner,
  /// The two segments of a CROSS event still compare equal past the
  /// intersection.
  CrossOrderUnresolved,
  BrokenTree,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::Unevaluable => write!(f, "segment has no coordinate at the queried value"),
      Error::Incomparable => write!(f, "segments cannot be ordered at the current sweep line"),
      Error::SegmentNotInStatus => write!(f, "event segment missing from the status structure"),
      Error::MissingCrossPartner => write!(f, "cross event without a second segment"),
      Error::CrossOrderUnresolved => write!(f, "segments still tie past their intersection"),
      Error::BrokenTree => write!(f, "2-3 tree invariant violated"),
    }
  }
}

impl std::error::Error for Error {}
