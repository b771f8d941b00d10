use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::services::error::{ServiceError, ServiceResult};

/// One "picture of the day" entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceImage {
    pub date: NaiveDate,
    pub title: String,
    pub explanation: String,
    pub url: String,
    #[serde(default)]
    pub hdurl: Option<String>,
    pub media_type: String,
    #[serde(default)]
    pub copyright: Option<String>,
}

#[derive(Debug, Error)]
pub enum SpaceImageError {
    #[error("invalid space image API url: {0}")]
    InvalidUrl(String),

    #[error("space image request failed: {0}")]
    Request(String),

    #[error("space image API returned status {0}")]
    Status(u16),

    #[error("space image response could not be decoded: {0}")]
    Decode(String),
}

/// Upstream provider of the daily image
#[async_trait]
pub trait SpaceImageSource: Send + Sync {
    async fn fetch(&self, date: NaiveDate) -> Result<SpaceImage, SpaceImageError>;
}

/// Cache-aside read-through: one upstream call per UTC day
pub struct SpaceImageService {
    source: Arc<dyn SpaceImageSource>,
    /// Keyed by the UTC date the image was requested for
    cache: RwLock<Option<(NaiveDate, SpaceImage)>>,
}

impl SpaceImageService {
    pub fn new(source: Arc<dyn SpaceImageSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(None),
        }
    }

    pub async fn image_of_the_day(&self, now: DateTime<Utc>) -> ServiceResult<SpaceImage> {
        let today = now.date_naive();

        if let Some(image) = self.cached(today).await {
            debug!("Space image cache hit for {}", today);
            return Ok(image);
        }

        let mut cache = self.cache.write().await;
        // another request may have filled it while we waited for the lock
        if let Some((_, image)) = cache.as_ref().filter(|(date, _)| *date == today) {
            return Ok(image.clone());
        }

        let image = self.source.fetch(today).await.map_err(|e| {
            error!("Space image fetch for {} failed: {}", today, e);
            ServiceError::Upstream(e.to_string())
        })?;
        info!("Cached space image '{}' for {}", image.title, today);

        *cache = Some((today, image.clone()));
        Ok(image)
    }

    async fn cached(&self, date: NaiveDate) -> Option<SpaceImage> {
        self.cache
            .read()
            .await
            .as_ref()
            .filter(|(cached_for, _)| *cached_for == date)
            .map(|(_, image)| image.clone())
    }
}
