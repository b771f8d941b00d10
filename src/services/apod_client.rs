//! reqwest client for a NASA APOD style endpoint:
//! `GET {api_url}?api_key=...&date=YYYY-MM-DD`

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::debug;

use crate::config::SpaceImageConfig;
use crate::services::space_image_service::{SpaceImage, SpaceImageError, SpaceImageSource};

pub struct ApodClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl ApodClient {
    pub fn new(config: &SpaceImageConfig) -> Result<Self, SpaceImageError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SpaceImageError::Request(e.to_string()))?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn request_url(&self, date: NaiveDate) -> Result<url::Url, SpaceImageError> {
        let date = date.format("%Y-%m-%d").to_string();
        url::Url::parse_with_params(
            &self.api_url,
            &[("api_key", self.api_key.as_str()), ("date", date.as_str())],
        )
        .map_err(|e| SpaceImageError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl SpaceImageSource for ApodClient {
    async fn fetch(&self, date: NaiveDate) -> Result<SpaceImage, SpaceImageError> {
        let url = self.request_url(date)?;
        debug!("Requesting space image for {}", date);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SpaceImageError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpaceImageError::Status(status.as_u16()));
        }

        response
            .json::<SpaceImage>()
            .await
            .map_err(|e| SpaceImageError::Decode(e.to_string()))
    }
}
