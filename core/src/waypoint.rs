//! Tagged waypoints and the front-consumed paths built from them.

use std::collections::{vec_deque, VecDeque};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Role a waypoint plays along a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaypointKind {
    /// Airborne point; landing gear is retracted while flying towards it.
    Air,
    /// Point on the runway or a taxiway.
    Ground,
    /// Terminal gate where the aircraft stops to be serviced.
    Terminal,
}

/// A 3D position tagged with the role it plays along a path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    position: Vec3,
    kind: WaypointKind,
}

impl Waypoint {
    /// Creates a waypoint of the provided kind.
    #[must_use]
    pub const fn new(position: Vec3, kind: WaypointKind) -> Self {
        Self { position, kind }
    }

    /// Creates an airborne waypoint.
    #[must_use]
    pub const fn air(position: Vec3) -> Self {
        Self::new(position, WaypointKind::Air)
    }

    /// Creates a ground waypoint.
    #[must_use]
    pub const fn ground(position: Vec3) -> Self {
        Self::new(position, WaypointKind::Ground)
    }

    /// Creates a terminal waypoint.
    #[must_use]
    pub const fn terminal(position: Vec3) -> Self {
        Self::new(position, WaypointKind::Terminal)
    }

    /// Location of the waypoint in airport coordinates.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Role of the waypoint.
    #[must_use]
    pub const fn kind(&self) -> WaypointKind {
        self.kind
    }

    /// Ground and terminal waypoints both sit on the ground.
    #[must_use]
    pub const fn is_on_ground(&self) -> bool {
        !matches!(self.kind, WaypointKind::Air)
    }

    /// Reports whether reaching this waypoint means arriving at a gate.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.kind, WaypointKind::Terminal)
    }
}

/// Ordered queue of waypoints, consumed from the front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    waypoints: VecDeque<Waypoint>,
}

impl Path {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next waypoint to fly towards, if any.
    #[must_use]
    pub fn front(&self) -> Option<&Waypoint> {
        self.waypoints.front()
    }

    /// Waypoint following the front one, if any.
    #[must_use]
    pub fn second(&self) -> Option<&Waypoint> {
        self.waypoints.get(1)
    }

    /// Final waypoint of the path, if any.
    #[must_use]
    pub fn back(&self) -> Option<&Waypoint> {
        self.waypoints.back()
    }

    /// Removes and returns the front waypoint.
    pub fn pop_front(&mut self) -> Option<Waypoint> {
        self.waypoints.pop_front()
    }

    /// Inserts a waypoint ahead of every queued one.
    pub fn push_front(&mut self, waypoint: Waypoint) {
        self.waypoints.push_front(waypoint);
    }

    /// Appends a waypoint behind every queued one.
    pub fn push_back(&mut self, waypoint: Waypoint) {
        self.waypoints.push_back(waypoint);
    }

    /// Number of queued waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the path has been fully consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Iterates over the queued waypoints from front to back.
    pub fn iter(&self) -> vec_deque::Iter<'_, Waypoint> {
        self.waypoints.iter()
    }
}

impl FromIterator<Waypoint> for Path {
    fn from_iter<I: IntoIterator<Item = Waypoint>>(iter: I) -> Self {
        Self {
            waypoints: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Waypoint>> for Path {
    fn from(waypoints: Vec<Waypoint>) -> Self {
        Self {
            waypoints: waypoints.into(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Waypoint;
    type IntoIter = vec_deque::Iter<'a, Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.waypoints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_waypoints_count_as_ground() {
        assert!(Waypoint::terminal(Vec3::ZERO).is_on_ground());
        assert!(Waypoint::ground(Vec3::ZERO).is_on_ground());
        assert!(!Waypoint::air(Vec3::ZERO).is_on_ground());
    }

    #[test]
    fn path_is_consumed_from_the_front() {
        let mut path: Path = vec![
            Waypoint::air(Vec3::X),
            Waypoint::ground(Vec3::Y),
        ]
        .into();
        path.push_front(Waypoint::air(Vec3::Z));

        assert_eq!(path.len(), 3);
        assert_eq!(path.pop_front().map(|wp| wp.position()), Some(Vec3::Z));
        assert_eq!(path.front().map(|wp| wp.position()), Some(Vec3::X));
        assert_eq!(path.back().map(|wp| wp.kind()), Some(WaypointKind::Ground));
    }

    #[test]
    fn empty_path_has_no_target() {
        let mut path = Path::new();
        assert!(path.front().is_none());
        assert!(path.second().is_none());
        assert!(path.pop_front().is_none());
    }
}
