use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{CelestialObject, EntityId, Owned, UserId};

/// Stored map record. Members are not stored here; they are every
/// celestial object whose `map_id` points at this map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Map {
    pub id: EntityId,
    pub name: String,
    pub owner_id: UserId,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Map {
    pub fn new(draft: MapDraft, owner_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            name: draft.name,
            owner_id,
            is_public: draft.is_public,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn apply(&mut self, draft: MapDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.is_public = draft.is_public;
        self.modified_at = now;
    }
}

impl Owned for Map {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }

    fn is_public(&self) -> bool {
        self.is_public
    }
}

/// Create/update payload for a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDraft {
    pub name: String,
    #[serde(default)]
    pub is_public: bool,
    /// Owner claimed by the caller; only checked on update
    #[serde(default)]
    pub owner_id: Option<UserId>,
}

/// A map together with the members the viewer is allowed to see
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    #[serde(flatten)]
    pub map: Map,
    pub celestial_objects: Vec<CelestialObject>,
}

impl MapView {
    /// Prune members for a viewer who does not own the map: only public
    /// objects and objects the viewer owns remain.
    pub fn for_viewer(map: Map, members: Vec<CelestialObject>, viewer: Option<UserId>) -> Self {
        let celestial_objects = if viewer.is_some_and(|v| map.is_owned_by(v)) {
            members
        } else {
            members.into_iter().filter(|o| o.is_visible_to(viewer)).collect()
        };
        Self { map, celestial_objects }
    }

    pub fn contains(&self, object_id: EntityId) -> bool {
        self.celestial_objects.iter().any(|o| o.id == object_id)
    }
}
