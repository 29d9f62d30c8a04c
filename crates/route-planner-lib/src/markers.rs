//! Ordered waypoint markers
//!
//! Markers keep insertion order, which is also the routing order. Each marker
//! gets a [`MarkerId`] from a per-manager counter at creation time, so removal
//! and drag updates address a marker by id rather than by position in the list.

use crate::LatLng;

/// Stable identifier of a placed marker. Never reused within a manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(u64);

impl MarkerId {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A draggable waypoint handle on the map
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub position: LatLng,
}

#[derive(Debug, Default)]
pub struct MarkerManager {
    markers: Vec<Marker>,
    next_id: u64,
}

impl MarkerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a marker at `position` and return its id
    pub fn add(&mut self, position: LatLng) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.markers.push(Marker { id, position });
        id
    }

    /// Remove the first marker with the given id.
    ///
    /// Returns `false` when no such marker exists.
    pub fn remove(&mut self, id: MarkerId) -> bool {
        match self.markers.iter().position(|m| m.id == id) {
            Some(index) => {
                self.markers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Update the position of a marker after it has been dragged
    pub fn move_to(&mut self, id: MarkerId, position: LatLng) -> bool {
        match self.markers.iter_mut().find(|m| m.id == id) {
            Some(marker) => {
                marker.position = position;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    #[inline]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Marker positions in route order
    pub fn waypoints(&self) -> Vec<LatLng> {
        self.markers.iter().map(|m| m.position).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(i: u32) -> LatLng {
        LatLng::new(51.0 + i as f64 * 0.01, 4.0 + i as f64 * 0.01)
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut manager = MarkerManager::new();
        for i in 0..5 {
            manager.add(coord(i));
        }
        assert_eq!(manager.len(), 5);
        assert_eq!(manager.waypoints(), (0..5).map(coord).collect::<Vec<_>>());
    }

    #[test]
    fn test_remove_keeps_relative_order() {
        let mut manager = MarkerManager::new();
        let ids: Vec<_> = (0..4).map(|i| manager.add(coord(i))).collect();

        assert!(manager.remove(ids[1]));
        assert_eq!(manager.waypoints(), vec![coord(0), coord(2), coord(3)]);

        // Removing twice is a no-op
        assert!(!manager.remove(ids[1]));
        assert_eq!(manager.len(), 3);
    }

    #[test]
    fn test_same_position_markers_are_distinct() {
        let mut manager = MarkerManager::new();
        let first = manager.add(coord(0));
        let second = manager.add(coord(0));
        assert_ne!(first, second);

        manager.remove(second);
        assert_eq!(manager.markers()[0].id, first);
    }

    #[test]
    fn test_ids_are_not_reused_after_clear() {
        let mut manager = MarkerManager::new();
        let first = manager.add(coord(0));
        manager.clear();
        assert!(manager.is_empty());
        let second = manager.add(coord(0));
        assert!(second > first);
    }

    #[test]
    fn test_move_to_updates_position() {
        let mut manager = MarkerManager::new();
        let id = manager.add(coord(0));
        assert!(manager.move_to(id, coord(7)));
        assert_eq!(manager.markers()[0].position, coord(7));
        assert!(!manager.move_to(MarkerId(999), coord(1)));
    }
}
