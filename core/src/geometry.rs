//! Planar geometry, path following and target ordering helpers.

use std::cmp::Ordering;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Reports whether `point` lies within `radius` of `center`, boundary inclusive.
///
/// Negative or non-finite radii never contain anything.
#[must_use]
pub fn within_radius(center: Vec2, point: Vec2, radius: f32) -> bool {
    if !radius.is_finite() || radius < 0.0 {
        return false;
    }
    center.distance_squared(point) <= radius * radius
}

/// Shortest distance between `point` and the segment running from `start` to `end`.
#[must_use]
pub fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let span = end - start;
    let length_sq = span.length_squared();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(span) / length_sq).clamp(0.0, 1.0);
    point.distance(start + span * t)
}

/// Axis-aligned playfield rectangle anchored at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Width of the playfield in world units.
    pub width: f32,
    /// Height of the playfield in world units.
    pub height: f32,
}

impl Bounds {
    /// Creates a new playfield rectangle.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Reports whether the point lies on or inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }
}

/// Polyline that enemies walk from the first waypoint to the last.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    waypoints: Vec<Vec2>,
    lengths: Vec<f32>,
}

/// Result of walking an enemy forward along a [`Path`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathAdvance {
    /// The walker is still on the path.
    Moving {
        /// Index of the segment now being walked.
        segment: usize,
        /// Distance travelled along that segment.
        progress: f32,
        /// World position matching the new location.
        position: Vec2,
    },
    /// The walker moved past the final waypoint.
    Exited,
}

impl Path {
    /// Builds a path from its waypoints, caching segment lengths.
    #[must_use]
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        let lengths: Vec<f32> = waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .collect();
        Self { waypoints, lengths }
    }

    /// Number of walkable segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.lengths.len()
    }

    /// Length of the segment at `segment`, zero when out of range.
    #[must_use]
    pub fn segment_length(&self, segment: usize) -> f32 {
        self.lengths.get(segment).copied().unwrap_or(0.0)
    }

    /// First waypoint, where spawns enter.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.waypoints.first().copied().unwrap_or(Vec2::ZERO)
    }

    /// World position for a `(segment, progress)` location.
    #[must_use]
    pub fn position_at(&self, segment: usize, progress: f32) -> Vec2 {
        let Some(&from) = self.waypoints.get(segment) else {
            return self.waypoints.last().copied().unwrap_or(Vec2::ZERO);
        };
        let Some(&to) = self.waypoints.get(segment + 1) else {
            return from;
        };
        let length = self.segment_length(segment);
        if length <= f32::EPSILON {
            return from;
        }
        from.lerp(to, (progress / length).clamp(0.0, 1.0))
    }

    /// Walks forward by `distance`, carrying any remainder across waypoints.
    ///
    /// Distance is conserved at segment boundaries: the walker snaps to each
    /// waypoint it reaches and spends the leftover on the next segment.
    #[must_use]
    pub fn advance(&self, segment: usize, progress: f32, distance: f32) -> PathAdvance {
        let mut segment = segment;
        let mut remaining = progress + distance.max(0.0);
        loop {
            if segment >= self.segment_count() {
                return PathAdvance::Exited;
            }
            let length = self.segment_length(segment);
            if remaining <= length {
                return PathAdvance::Moving {
                    segment,
                    progress: remaining,
                    position: self.position_at(segment, remaining),
                };
            }
            remaining -= length;
            segment += 1;
        }
    }

    /// Walks backward by `distance`, stopping at the first waypoint.
    #[must_use]
    pub fn retreat(&self, segment: usize, progress: f32, distance: f32) -> (usize, f32) {
        let mut segment = segment.min(self.segment_count().saturating_sub(1));
        let mut remaining = progress - distance.max(0.0);
        while remaining < 0.0 {
            if segment == 0 {
                return (0, 0.0);
            }
            segment -= 1;
            remaining += self.segment_length(segment);
        }
        (segment, remaining)
    }

    /// Total distance walked from the start to the provided location.
    #[must_use]
    pub fn distance_travelled(&self, segment: usize, progress: f32) -> f32 {
        let walked: f32 = self.lengths.iter().take(segment).sum();
        walked + progress
    }
}

/// Ordering policy a tower applies to the enemies it can reach.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetPriority {
    /// Furthest along the path first.
    #[default]
    First,
    /// Highest current health first.
    Strongest,
    /// Lowest current health first.
    Weakest,
}

/// Compares two path locations so that the one further along sorts first.
#[must_use]
pub fn compare_path_rank(a: (usize, f32), b: (usize, f32)) -> Ordering {
    b.0.cmp(&a.0).then_with(|| b.1.total_cmp(&a.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_path() -> Path {
        Path::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 50.0),
            Vec2::new(200.0, 50.0),
        ])
    }

    #[test]
    fn advance_carries_remainder_across_waypoints() {
        let path = l_path();
        match path.advance(0, 90.0, 30.0) {
            PathAdvance::Moving {
                segment,
                progress,
                position,
            } => {
                assert_eq!(segment, 1);
                assert!((progress - 20.0).abs() < 1e-4);
                assert!(position.distance(Vec2::new(100.0, 20.0)) < 1e-4);
            }
            PathAdvance::Exited => panic!("walker should still be on the path"),
        }
    }

    #[test]
    fn advance_crosses_multiple_waypoints_in_one_step() {
        let path = l_path();
        let before = path.distance_travelled(0, 10.0);
        let PathAdvance::Moving {
            segment, progress, ..
        } = path.advance(0, 10.0, 160.0)
        else {
            panic!("walker should still be on the path");
        };
        assert_eq!(segment, 2);
        let after = path.distance_travelled(segment, progress);
        assert!((after - before - 160.0).abs() < 1e-3);
    }

    #[test]
    fn advance_past_last_waypoint_exits() {
        let path = l_path();
        assert_eq!(path.advance(2, 99.0, 5.0), PathAdvance::Exited);
    }

    #[test]
    fn retreat_stops_at_path_start() {
        let path = l_path();
        assert_eq!(path.retreat(1, 10.0, 500.0), (0, 0.0));
        let (segment, progress) = path.retreat(1, 10.0, 30.0);
        assert_eq!(segment, 0);
        assert!((progress - 80.0).abs() < 1e-4);
    }

    #[test]
    fn path_rank_prefers_later_segments_then_progress() {
        assert_eq!(compare_path_rank((2, 1.0), (1, 90.0)), Ordering::Less);
        assert_eq!(compare_path_rank((1, 10.0), (1, 40.0)), Ordering::Greater);
    }

    #[test]
    fn radius_checks_are_boundary_inclusive() {
        assert!(within_radius(Vec2::ZERO, Vec2::new(3.0, 4.0), 5.0));
        assert!(!within_radius(Vec2::ZERO, Vec2::new(3.0, 4.0), 4.99));
        assert!(!within_radius(Vec2::ZERO, Vec2::ZERO, f32::NAN));
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let d = distance_to_segment(Vec2::new(-3.0, 4.0), Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-4);
        let d = distance_to_segment(Vec2::new(5.0, 2.0), Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!((d - 2.0).abs() < 1e-4);
    }
}
