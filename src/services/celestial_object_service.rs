use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::database::models::{
    CelestialObject, CelestialObjectDraft, EntityId, Owned, UserId,
};
use crate::database::page::{Page, PageRequest};
use crate::database::store::CelestialObjectStore;
use crate::services::error::{ServiceError, ServiceResult, ValidationError};
use crate::services::validation::{
    title_case, validate_celestial_fields, validate_celestial_object, validate_position,
};

/// Ownership and visibility rules for stars and planets
#[derive(Clone)]
pub struct CelestialObjectService {
    objects: Arc<dyn CelestialObjectStore>,
    enforce_update_ownership: bool,
}

impl CelestialObjectService {
    pub fn new(objects: Arc<dyn CelestialObjectStore>) -> Self {
        Self {
            objects,
            enforce_update_ownership: false,
        }
    }

    /// Require the requester to own an object before updating it
    pub fn with_update_ownership(mut self, enforce: bool) -> Self {
        self.enforce_update_ownership = enforce;
        self
    }

    /// `Ok(None)` when absent, `Forbidden` when private to someone else
    pub async fn fetch(
        &self,
        id: EntityId,
        requesting_user: Option<UserId>,
    ) -> ServiceResult<Option<CelestialObject>> {
        let Some(object) = self.objects.get_by_id(id).await? else {
            return Ok(None);
        };
        if !object.is_visible_to(requesting_user) {
            warn!(
                "User {:?} denied read of private celestial object {}",
                requesting_user, id
            );
            return Err(ServiceError::forbidden(
                "You do not have access to this celestial object",
            ));
        }
        Ok(Some(object))
    }

    pub async fn list_own(&self, owner_id: UserId, page: PageRequest) -> ServiceResult<Page<CelestialObject>> {
        let (items, total) = futures::try_join!(
            self.objects.list_by_owner(owner_id, page),
            self.objects.count_by_owner(owner_id),
        )?;
        Ok(Page::new(items, page, total))
    }

    pub async fn list_public(&self, page: PageRequest) -> ServiceResult<Page<CelestialObject>> {
        let (items, total) = futures::try_join!(
            self.objects.list_public(page),
            self.objects.count_public(),
        )?;
        Ok(Page::new(items, page, total))
    }

    pub async fn count_own(&self, owner_id: UserId) -> ServiceResult<i64> {
        Ok(self.objects.count_by_owner(owner_id).await?)
    }

    pub async fn count_public(&self) -> ServiceResult<i64> {
        Ok(self.objects.count_public().await?)
    }

    /// Validate and persist a new object owned by `owner_id`.
    ///
    /// New objects are always unlinked; joining a map goes through
    /// [`crate::services::MapService::link_celestial_object`].
    pub async fn create(
        &self,
        mut draft: CelestialObjectDraft,
        owner_id: UserId,
        now: DateTime<Utc>,
    ) -> ServiceResult<CelestialObject> {
        draft.name = title_case(&draft.name);
        validate_celestial_object(&draft, draft.map_id)?;
        if draft.position.is_some() {
            debug!("Dropping position on new celestial object '{}' until it is linked", draft.name);
        }

        let object = self
            .objects
            .add(&CelestialObject::new(draft, owner_id, now))
            .await?;
        info!(
            "Created {} {} '{}' for user {}",
            object.kind.tag(),
            object.id,
            object.name,
            owner_id
        );
        Ok(object)
    }

    /// Replace the mutable fields of an existing object
    pub async fn update(
        &self,
        id: EntityId,
        mut draft: CelestialObjectDraft,
        requesting_user: UserId,
        now: DateTime<Utc>,
    ) -> ServiceResult<CelestialObject> {
        draft.name = title_case(&draft.name);
        validate_celestial_fields(&draft)?;

        let mut object = self
            .objects
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("celestial object"))?;

        if self.enforce_update_ownership && !object.is_owned_by(requesting_user) {
            warn!("User {} denied update of celestial object {}", requesting_user, id);
            return Err(ServiceError::forbidden(
                "Only the owner may update this celestial object",
            ));
        }
        if !object.kind.same_variant(&draft.kind) {
            return Err(ValidationError::new(
                "type",
                format!("cannot change a {} into a {}", object.kind.tag(), draft.kind.tag()),
            )
            .into());
        }
        validate_position(&draft, object.map_id)?;

        object.apply(draft, now);
        if !self.objects.update(id, &object).await? {
            return Err(ServiceError::NotFound("celestial object"));
        }
        info!("Updated celestial object {} for user {}", id, requesting_user);
        Ok(object)
    }

    pub async fn delete(&self, id: EntityId, requesting_user: UserId) -> ServiceResult<()> {
        let object = self
            .objects
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("celestial object"))?;
        if !object.is_owned_by(requesting_user) {
            warn!("User {} denied delete of celestial object {}", requesting_user, id);
            return Err(ServiceError::forbidden(
                "Only the owner may delete this celestial object",
            ));
        }
        if !self.objects.remove(id).await? {
            return Err(ServiceError::NotFound("celestial object"));
        }
        info!("Deleted celestial object {} for user {}", id, requesting_user);
        Ok(())
    }
}
