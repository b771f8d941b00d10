use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::auth::{JwtError, JwtKeys};
use crate::config::AppConfig;
use crate::database::store::{CelestialObjectStore, MapStore, StoreHealth, UserStore};
use crate::services::{
    CelestialObjectService, Clock, MapService, SpaceImageService, SpaceImageSource, UserService,
};

/// Everything a handler needs, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub celestial_objects: CelestialObjectService,
    pub maps: MapService,
    pub users: UserService,
    pub space_images: Arc<SpaceImageService>,
    pub health: Arc<dyn StoreHealth>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wire every service onto one store implementation
    pub fn new<S>(
        config: AppConfig,
        store: Arc<S>,
        images: Arc<dyn SpaceImageSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, JwtError>
    where
        S: CelestialObjectStore + MapStore + UserStore + StoreHealth + 'static,
    {
        let keys = Arc::new(JwtKeys::from_config(&config.security)?);
        let refresh_lifetime = Duration::days(config.security.refresh_token_expiry_days);

        Ok(Self {
            celestial_objects: CelestialObjectService::new(store.clone())
                .with_update_ownership(config.security.enforce_object_update_ownership),
            maps: MapService::new(store.clone(), store.clone()),
            users: UserService::new(store.clone(), keys, refresh_lifetime),
            space_images: Arc::new(SpaceImageService::new(images)),
            health: store,
            clock,
            config: Arc::new(config),
        })
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn jwt(&self) -> &JwtKeys {
        self.users.keys()
    }
}
