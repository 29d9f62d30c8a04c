//! Saved-route snapshots and their persistence
//!
//! The whole list is stored as one JSON array under [`SAVED_ROUTES_KEY`] and
//! rewritten on every mutation. Entries are addressed by index; deleting an
//! entry shifts the ones after it.

use crate::LatLng;
use crate::storage::{StorageBackend, StorageError, load_json_backend, save_json_backend};
use serde::{Deserialize, Serialize};

/// Storage key holding the JSON-encoded saved-route list
pub const SAVED_ROUTES_KEY: &str = "savedRoutes";

/// A named snapshot of waypoints and the route totals at save time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRoute {
    /// Missing in records written before routes had names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub waypoints: Vec<LatLng>,
    /// Meters
    pub distance: f64,
    /// Seconds
    pub estimated_time: f64,
}

impl SavedRoute {
    /// Name to show in lists; unnamed routes use their position
    pub fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Route {}", index + 1),
        }
    }
}

pub struct SavedRouteStore {
    routes: Vec<SavedRoute>,
    backend: Box<dyn StorageBackend>,
}

impl SavedRouteStore {
    /// Open the store, loading whatever list `backend` holds.
    ///
    /// Missing, unreadable or malformed data yields an empty list.
    pub fn load(backend: Box<dyn StorageBackend>) -> Self {
        let routes = match load_json_backend::<Vec<SavedRoute>>(backend.as_ref(), SAVED_ROUTES_KEY)
        {
            Ok(Some(routes)) => {
                tracing::info!("Loaded {} saved routes", routes.len());
                routes
            }
            Ok(None) => {
                tracing::info!("No saved routes found, starting fresh");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable saved routes: {}", e);
                Vec::new()
            }
        };
        Self { routes, backend }
    }

    #[inline]
    pub fn routes(&self) -> &[SavedRoute] {
        &self.routes
    }

    pub fn get(&self, index: usize) -> Option<&SavedRoute> {
        self.routes.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Append a snapshot and persist the list. Returns the new entry's index.
    ///
    /// The in-memory list keeps the entry even if persisting fails.
    pub fn push(&mut self, route: SavedRoute) -> (usize, Result<(), StorageError>) {
        self.routes.push(route);
        (self.routes.len() - 1, self.save_to_storage())
    }

    /// Remove the entry at `index` and persist the list
    pub fn remove(&mut self, index: usize) -> Option<(SavedRoute, Result<(), StorageError>)> {
        if index >= self.routes.len() {
            return None;
        }
        let removed = self.routes.remove(index);
        Some((removed, self.save_to_storage()))
    }

    /// Overwrite the persisted list with the in-memory one
    pub fn save_to_storage(&self) -> Result<(), StorageError> {
        save_json_backend(self.backend.as_ref(), SAVED_ROUTES_KEY, &self.routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    /// Backend shared between two stores, to observe what was persisted
    struct Shared(Arc<MemoryStorage>);

    impl StorageBackend for Shared {
        fn set_string(&self, key: &str, value: &str) -> crate::StorageResult<()> {
            self.0.set_string(key, value)
        }
        fn get_string(&self, key: &str) -> crate::StorageResult<Option<String>> {
            self.0.get_string(key)
        }
        fn remove(&self, key: &str) -> crate::StorageResult<()> {
            self.0.remove(key)
        }
    }

    fn route(name: &str) -> SavedRoute {
        SavedRoute {
            name: Some(name.to_string()),
            waypoints: vec![LatLng::new(51.53, 4.27), LatLng::new(51.54, 4.28)],
            distance: 1200.0,
            estimated_time: 840.0,
        }
    }

    #[test]
    fn test_record_shape() {
        let json = serde_json::to_value(route("Morning Run")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Morning Run",
                "waypoints": [{"lat": 51.53, "lng": 4.27}, {"lat": 51.54, "lng": 4.28}],
                "distance": 1200.0,
                "estimatedTime": 840.0
            })
        );
    }

    #[test]
    fn test_unnamed_records_load() {
        let json = r#"[{"waypoints": [{"lat": 1.0, "lng": 2.0}], "distance": 5.0, "estimatedTime": 6.0}]"#;
        let routes: Vec<SavedRoute> = serde_json::from_str(json).unwrap();
        assert_eq!(routes[0].name, None);
        assert_eq!(routes[0].display_name(0), "Route 1");
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let store = SavedRouteStore::load(Box::new(MemoryStorage::new()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_data_loads_empty() {
        let backend = MemoryStorage::new();
        backend.set_string(SAVED_ROUTES_KEY, "[{\"oops\"").unwrap();
        let store = SavedRouteStore::load(Box::new(backend));
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_shifts_and_persists() {
        let shared = Arc::new(MemoryStorage::new());
        let mut store = SavedRouteStore::load(Box::new(Shared(shared.clone())));
        for name in ["a", "b", "c"] {
            let (_, saved) = store.push(route(name));
            saved.unwrap();
        }

        let (removed, saved) = store.remove(1).unwrap();
        saved.unwrap();
        assert_eq!(removed.name.as_deref(), Some("b"));
        assert_eq!(store.get(1).and_then(|r| r.name.as_deref()), Some("c"));
        assert!(store.remove(5).is_none());

        let reloaded = SavedRouteStore::load(Box::new(Shared(shared)));
        assert_eq!(reloaded.routes(), store.routes());
    }
}
