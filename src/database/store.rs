//! Persistence gateway contracts consumed by the service layer.
//!
//! Absent rows are reported as `Ok(None)` / `Ok(false)`, never as errors.

use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{CelestialObject, EntityId, Map, NewUser, User, UserId};
use crate::database::page::PageRequest;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint rejected the write
    #[error("store conflict: {0}")]
    Conflict(String),

    #[error("store query failed: {0}")]
    Query(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CelestialObjectStore: Send + Sync {
    async fn get_by_id(&self, id: EntityId) -> StoreResult<Option<CelestialObject>>;

    async fn list_by_owner(&self, owner_id: UserId, page: PageRequest) -> StoreResult<Vec<CelestialObject>>;

    async fn list_public(&self, page: PageRequest) -> StoreResult<Vec<CelestialObject>>;

    /// Every object linked to the map, in id order
    async fn list_by_map(&self, map_id: EntityId) -> StoreResult<Vec<CelestialObject>>;

    async fn count_by_owner(&self, owner_id: UserId) -> StoreResult<i64>;

    async fn count_public(&self) -> StoreResult<i64>;

    /// Insert and return the stored object with its assigned id
    async fn add(&self, object: &CelestialObject) -> StoreResult<CelestialObject>;

    /// Replace the stored row; `false` when no row has this id
    async fn update(&self, id: EntityId, object: &CelestialObject) -> StoreResult<bool>;

    async fn remove(&self, id: EntityId) -> StoreResult<bool>;
}

#[async_trait]
pub trait MapStore: Send + Sync {
    async fn get_by_id(&self, id: EntityId) -> StoreResult<Option<Map>>;

    async fn list_by_owner(&self, owner_id: UserId, page: PageRequest) -> StoreResult<Vec<Map>>;

    async fn list_public(&self, page: PageRequest) -> StoreResult<Vec<Map>>;

    async fn count_by_owner(&self, owner_id: UserId) -> StoreResult<i64>;

    async fn count_public(&self) -> StoreResult<i64>;

    async fn add(&self, map: &Map) -> StoreResult<Map>;

    async fn update(&self, id: EntityId, map: &Map) -> StoreResult<bool>;

    async fn remove(&self, id: EntityId) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn get_by_refresh_token(&self, token_hash: &str) -> StoreResult<Option<User>>;

    async fn add(&self, user: &NewUser) -> StoreResult<User>;

    async fn update(&self, id: UserId, user: &User) -> StoreResult<bool>;

    /// Removes the user together with the maps and objects they own
    async fn remove(&self, id: UserId) -> StoreResult<bool>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;
}

