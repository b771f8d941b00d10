use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::database::models::{
    CelestialObject, EntityId, Map, MapDraft, MapView, Owned, UserId,
};
use crate::database::page::{Page, PageRequest};
use crate::database::store::{CelestialObjectStore, MapStore};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validation::{title_case, validate_map};

/// Ownership and visibility rules for maps and map membership.
///
/// Membership is never stored on the map: a map's celestial objects are the
/// objects whose `map_id` points at it.
#[derive(Clone)]
pub struct MapService {
    maps: Arc<dyn MapStore>,
    objects: Arc<dyn CelestialObjectStore>,
}

impl MapService {
    pub fn new(maps: Arc<dyn MapStore>, objects: Arc<dyn CelestialObjectStore>) -> Self {
        Self { maps, objects }
    }

    async fn view(&self, map: Map, viewer: Option<UserId>) -> ServiceResult<MapView> {
        let members = self.objects.list_by_map(map.id).await?;
        Ok(MapView::for_viewer(map, members, viewer))
    }

    async fn views(&self, maps: Vec<Map>, viewer: Option<UserId>) -> ServiceResult<Vec<MapView>> {
        try_join_all(maps.into_iter().map(|map| self.view(map, viewer))).await
    }

    /// `Ok(None)` when absent; non-owners only see public members and their own
    pub async fn fetch(&self, id: EntityId, requesting_user: Option<UserId>) -> ServiceResult<Option<MapView>> {
        let Some(map) = self.maps.get_by_id(id).await? else {
            return Ok(None);
        };
        if !map.is_visible_to(requesting_user) {
            warn!("User {:?} denied read of private map {}", requesting_user, id);
            return Err(ServiceError::forbidden("You do not have access to this map"));
        }
        Ok(Some(self.view(map, requesting_user).await?))
    }

    pub async fn list_own(&self, owner_id: UserId, page: PageRequest) -> ServiceResult<Page<MapView>> {
        let (maps, total) = futures::try_join!(
            self.maps.list_by_owner(owner_id, page),
            self.maps.count_by_owner(owner_id),
        )?;
        let items = self.views(maps, Some(owner_id)).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn list_public(&self, page: PageRequest, requesting_user: Option<UserId>) -> ServiceResult<Page<MapView>> {
        let (maps, total) = futures::try_join!(
            self.maps.list_public(page),
            self.maps.count_public(),
        )?;
        let items = self.views(maps, requesting_user).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn count_own(&self, owner_id: UserId) -> ServiceResult<i64> {
        Ok(self.maps.count_by_owner(owner_id).await?)
    }

    pub async fn count_public(&self) -> ServiceResult<i64> {
        Ok(self.maps.count_public().await?)
    }

    pub async fn create(&self, mut draft: MapDraft, owner_id: UserId, now: DateTime<Utc>) -> ServiceResult<MapView> {
        draft.name = title_case(&draft.name);
        validate_map(&draft)?;

        let map = self.maps.add(&Map::new(draft, owner_id, now)).await?;
        info!("Created map {} '{}' for user {}", map.id, map.name, owner_id);
        Ok(MapView::for_viewer(map, Vec::new(), Some(owner_id)))
    }

    /// The declared owner in the payload defaults to the requester; both must
    /// match the stored owner.
    pub async fn update(
        &self,
        id: EntityId,
        mut draft: MapDraft,
        requesting_user: UserId,
        now: DateTime<Utc>,
    ) -> ServiceResult<MapView> {
        let mut map = self
            .maps
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("map"))?;

        let declared_owner = draft.owner_id.unwrap_or(requesting_user);
        if !map.is_owned_by(declared_owner) || !map.is_owned_by(requesting_user) {
            warn!("User {} denied update of map {}", requesting_user, id);
            return Err(ServiceError::forbidden("Only the owner may update this map"));
        }

        draft.name = title_case(&draft.name);
        validate_map(&draft)?;
        map.apply(draft, now);
        if !self.maps.update(id, &map).await? {
            return Err(ServiceError::NotFound("map"));
        }
        info!("Updated map {} for user {}", id, requesting_user);
        self.view(map, Some(requesting_user)).await
    }

    /// Members are unlinked, not deleted
    pub async fn delete(&self, id: EntityId, requesting_user: UserId) -> ServiceResult<()> {
        let map = self
            .maps
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("map"))?;
        if !map.is_owned_by(requesting_user) {
            warn!("User {} denied delete of map {}", requesting_user, id);
            return Err(ServiceError::forbidden("Only the owner may delete this map"));
        }
        if !self.maps.remove(id).await? {
            return Err(ServiceError::NotFound("map"));
        }
        info!("Deleted map {} for user {}", id, requesting_user);
        Ok(())
    }

    /// Object lookup failures are reported before map lookup failures
    async fn load_pair(
        &self,
        map_id: EntityId,
        object_id: EntityId,
        requesting_user: UserId,
    ) -> ServiceResult<(Map, CelestialObject)> {
        let object = self
            .objects
            .get_by_id(object_id)
            .await?
            .ok_or(ServiceError::NotFound("celestial object"))?;
        let map = self
            .maps
            .get_by_id(map_id)
            .await?
            .ok_or(ServiceError::NotFound("map"))?;

        if !object.is_owned_by(requesting_user) || !map.is_owned_by(requesting_user) {
            warn!(
                "User {} denied linkage change between map {} and celestial object {}",
                requesting_user, map_id, object_id
            );
            return Err(ServiceError::forbidden(
                "You must own both the map and the celestial object",
            ));
        }
        Ok((map, object))
    }

    /// Unlinked -> Linked
    pub async fn link_celestial_object(
        &self,
        map_id: EntityId,
        object_id: EntityId,
        requesting_user: UserId,
        now: DateTime<Utc>,
    ) -> ServiceResult<MapView> {
        let (map, mut object) = self.load_pair(map_id, object_id, requesting_user).await?;
        if object.is_linked() {
            return Err(ServiceError::AlreadyLinked { object_id });
        }

        object.map_id = Some(map.id);
        object.modified_at = now;
        if !self.objects.update(object_id, &object).await? {
            return Err(ServiceError::NotFound("celestial object"));
        }
        info!("Linked celestial object {} to map {}", object_id, map_id);
        self.view(map, Some(requesting_user)).await
    }

    /// Linked -> Unlinked; the position goes with the linkage
    pub async fn unlink_celestial_object(
        &self,
        map_id: EntityId,
        object_id: EntityId,
        requesting_user: UserId,
        now: DateTime<Utc>,
    ) -> ServiceResult<MapView> {
        let (map, mut object) = self.load_pair(map_id, object_id, requesting_user).await?;
        if !object.is_linked_to(map.id) {
            return Err(ServiceError::NotLinked { map_id, object_id });
        }

        object.map_id = None;
        object.position = None;
        object.modified_at = now;
        if !self.objects.update(object_id, &object).await? {
            return Err(ServiceError::NotFound("celestial object"));
        }
        info!("Unlinked celestial object {} from map {}", object_id, map_id);
        self.view(map, Some(requesting_user)).await
    }
}
