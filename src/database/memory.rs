//! In-process store used by tests and `DATABASE_BACKEND=memory`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::database::models::{CelestialObject, EntityId, Map, NewUser, User, UserId};
use crate::database::page::PageRequest;
use crate::database::store::{
    CelestialObjectStore, MapStore, StoreError, StoreHealth, StoreResult, UserStore,
};

#[derive(Default)]
struct Tables {
    objects: BTreeMap<EntityId, CelestialObject>,
    maps: BTreeMap<EntityId, Map>,
    users: BTreeMap<UserId, User>,
    next_object_id: EntityId,
    next_map_id: EntityId,
    next_user_id: UserId,
}

impl Tables {
    fn unlink_members(&mut self, map_id: EntityId) {
        for object in self.objects.values_mut().filter(|o| o.map_id == Some(map_id)) {
            object.map_id = None;
            object.position = None;
        }
    }
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage: every call fails with `StoreError::Unavailable`
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store offline".to_string()))
        }
    }
}

fn paginate<T: Clone>(rows: impl Iterator<Item = T>, page: PageRequest) -> Vec<T> {
    rows.skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

#[async_trait]
impl CelestialObjectStore for MemoryStore {
    async fn get_by_id(&self, id: EntityId) -> StoreResult<Option<CelestialObject>> {
        self.check_available()?;
        Ok(self.tables.read().await.objects.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: UserId, page: PageRequest) -> StoreResult<Vec<CelestialObject>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(paginate(
            tables.objects.values().filter(|o| o.owner_id == owner_id).cloned(),
            page,
        ))
    }

    async fn list_public(&self, page: PageRequest) -> StoreResult<Vec<CelestialObject>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(paginate(tables.objects.values().filter(|o| o.is_public).cloned(), page))
    }

    async fn list_by_map(&self, map_id: EntityId) -> StoreResult<Vec<CelestialObject>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .objects
            .values()
            .filter(|o| o.map_id == Some(map_id))
            .cloned()
            .collect())
    }

    async fn count_by_owner(&self, owner_id: UserId) -> StoreResult<i64> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.objects.values().filter(|o| o.owner_id == owner_id).count() as i64)
    }

    async fn count_public(&self) -> StoreResult<i64> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.objects.values().filter(|o| o.is_public).count() as i64)
    }

    async fn add(&self, object: &CelestialObject) -> StoreResult<CelestialObject> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables.next_object_id += 1;
        let mut stored = object.clone();
        stored.id = tables.next_object_id;
        tables.objects.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: EntityId, object: &CelestialObject) -> StoreResult<bool> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        match tables.objects.get_mut(&id) {
            Some(existing) => {
                *existing = CelestialObject { id, ..object.clone() };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: EntityId) -> StoreResult<bool> {
        self.check_available()?;
        Ok(self.tables.write().await.objects.remove(&id).is_some())
    }
}

#[async_trait]
impl MapStore for MemoryStore {
    async fn get_by_id(&self, id: EntityId) -> StoreResult<Option<Map>> {
        self.check_available()?;
        Ok(self.tables.read().await.maps.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: UserId, page: PageRequest) -> StoreResult<Vec<Map>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(paginate(
            tables.maps.values().filter(|m| m.owner_id == owner_id).cloned(),
            page,
        ))
    }

    async fn list_public(&self, page: PageRequest) -> StoreResult<Vec<Map>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(paginate(tables.maps.values().filter(|m| m.is_public).cloned(), page))
    }

    async fn count_by_owner(&self, owner_id: UserId) -> StoreResult<i64> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.maps.values().filter(|m| m.owner_id == owner_id).count() as i64)
    }

    async fn count_public(&self) -> StoreResult<i64> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.maps.values().filter(|m| m.is_public).count() as i64)
    }

    async fn add(&self, map: &Map) -> StoreResult<Map> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables.next_map_id += 1;
        let mut stored = map.clone();
        stored.id = tables.next_map_id;
        tables.maps.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: EntityId, map: &Map) -> StoreResult<bool> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        match tables.maps.get_mut(&id) {
            Some(existing) => {
                *existing = Map { id, ..map.clone() };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: EntityId) -> StoreResult<bool> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.maps.remove(&id).is_none() {
            return Ok(false);
        }
        // mirrors ON DELETE SET NULL on the postgres schema
        tables.unlink_members(id);
        Ok(true)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        self.check_available()?;
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_by_refresh_token(&self, token_hash: &str) -> StoreResult<Option<User>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.refresh_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn add(&self, user: &NewUser) -> StoreResult<User> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email '{}' already registered", user.email)));
        }
        tables.next_user_id += 1;
        let stored = User {
            id: tables.next_user_id,
            email: user.email.clone(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            refresh_token_hash: None,
            refresh_token_expires_at: None,
            created_at: user.created_at,
            modified_at: user.created_at,
        };
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: UserId, user: &User) -> StoreResult<bool> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.id != id && u.email == user.email) {
            return Err(StoreError::Conflict(format!("email '{}' already registered", user.email)));
        }
        match tables.users.get_mut(&id) {
            Some(existing) => {
                *existing = User { id, ..user.clone() };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: UserId) -> StoreResult<bool> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned_maps: Vec<EntityId> = tables
            .maps
            .values()
            .filter(|m| m.owner_id == id)
            .map(|m| m.id)
            .collect();
        for map_id in owned_maps {
            tables.maps.remove(&map_id);
            tables.unlink_members(map_id);
        }
        tables.objects.retain(|_, o| o.owner_id != id);
        Ok(true)
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }
}
