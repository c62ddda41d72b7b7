use reqwest::multipart::{Form, Part};
use reqwest::Client;
use shared::domain::SiteConfig;

use crate::error::StoreError;
use crate::upload::FilePayload;

/// Typed client for the single site-theme configuration. The hero image is
/// the one upload site here; it is a single-file multipart PUT and the
/// server responds with the updated config.
pub struct SiteConfigClient {
    http: Client,
    base_url: String,
}

impl SiteConfigClient {
    pub(crate) fn new(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    fn url(&self, tail: &str) -> String {
        format!("{}/api/site-config{tail}", self.base_url)
    }

    pub async fn get(&self) -> Result<SiteConfig, StoreError> {
        let response = StoreError::check(self.http.get(self.url("")).send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn update(&self, config: &SiteConfig) -> Result<SiteConfig, StoreError> {
        let response =
            StoreError::check(self.http.put(self.url("")).json(config).send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn upload_hero_image(&self, file: &FilePayload) -> Result<SiteConfig, StoreError> {
        let part = Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
        let part = match &file.mime_type {
            Some(mime) => part.mime_str(mime)?,
            None => part,
        };
        let form = Form::new().part("file", part);
        let response = StoreError::check(
            self.http
                .put(self.url("/hero-image"))
                .multipart(form)
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    pub async fn delete_hero_image(&self) -> Result<SiteConfig, StoreError> {
        let response =
            StoreError::check(self.http.delete(self.url("/hero-image")).send().await?).await?;
        Ok(response.json().await?)
    }
}
