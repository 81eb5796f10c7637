// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Safe-polygon geometry for hover close grace.
//!
//! When the pointer leaves the reference toward the floating element, the
//! hover behavior keeps the element open while the pointer stays inside a
//! triangular region spanning from the exit point to the floating element's
//! facing edge. Leaving the region closes.

use kurbo::{Point, Rect};

/// Which side of the reference the floating element sits on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Side {
    /// Above the reference.
    Top,
    /// To the right of the reference.
    Right,
    /// Below the reference.
    #[default]
    Bottom,
    /// To the left of the reference.
    Left,
}

/// Tuning for the safe polygon.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SafePolygonConfig {
    /// Extra padding, in pixels, applied around the floating element and
    /// the polygon base.
    pub buffer: f64,
    /// While open from hover, suppress pointer events document-wide so
    /// content under the polygon cannot steal the pointer. The host counts
    /// suppression tickets across sessions.
    pub block_pointer_events: bool,
}

impl Default for SafePolygonConfig {
    fn default() -> Self {
        Self {
            buffer: 0.5,
            block_pointer_events: false,
        }
    }
}

/// The active grace region after the pointer left the reference.
///
/// The pointer is "safe" while inside the reference, the (buffered)
/// floating bounds, or the triangle from the exit point to the floating
/// element's facing edge.
#[derive(Clone, Debug, PartialEq)]
pub struct SafePolygon {
    points: [Point; 3],
    reference: Rect,
    floating: Rect,
}

impl SafePolygon {
    /// Builds the region for a pointer that exited the reference at
    /// `cursor`, with the floating element on `side` of the reference.
    #[must_use]
    pub fn new(reference: Rect, floating: Rect, side: Side, cursor: Point, buffer: f64) -> Self {
        let f = floating.inflate(buffer, buffer);
        // The floating edge facing the reference, as the triangle base.
        let (a, b) = match side {
            Side::Top => (Point::new(f.x0, f.y1), Point::new(f.x1, f.y1)),
            Side::Bottom => (Point::new(f.x0, f.y0), Point::new(f.x1, f.y0)),
            Side::Left => (Point::new(f.x1, f.y0), Point::new(f.x1, f.y1)),
            Side::Right => (Point::new(f.x0, f.y0), Point::new(f.x0, f.y1)),
        };
        Self {
            points: [cursor, a, b],
            reference,
            floating: f,
        }
    }

    /// Whether `point` is still inside the grace region.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.reference.contains(point)
            || self.floating.contains(point)
            || point_in_polygon(&self.points, point)
    }
}

/// Ray-cast point-in-polygon test.
fn point_in_polygon(points: &[Point], p: Point) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
