use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{DeployResponse, PreviewResponse, PreviewSummaryResponse};

use crate::error::StoreError;

/// Two-stage publish workflow: generate a preview build, inspect its
/// summary, then deploy to production. The generation and hosting side is an
/// external collaborator; the console only triggers and reads it.
#[async_trait]
pub trait PublishService: Send + Sync {
    async fn generate_preview(&self) -> Result<PreviewResponse, StoreError>;
    async fn deploy(&self) -> Result<DeployResponse, StoreError>;
    async fn preview_summary(&self) -> Result<PreviewSummaryResponse, StoreError>;
}

pub struct HttpPublishService {
    http: Client,
    base_url: String,
}

impl HttpPublishService {
    pub(crate) fn new(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    fn url(&self, tail: &str) -> String {
        format!("{}/api/publish{tail}", self.base_url)
    }
}

#[async_trait]
impl PublishService for HttpPublishService {
    async fn generate_preview(&self) -> Result<PreviewResponse, StoreError> {
        let response = StoreError::check(self.http.post(self.url("/preview")).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn deploy(&self) -> Result<DeployResponse, StoreError> {
        let response = StoreError::check(self.http.post(self.url("/deploy")).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn preview_summary(&self) -> Result<PreviewSummaryResponse, StoreError> {
        let response =
            StoreError::check(self.http.get(self.url("/preview-summary")).send().await?).await?;
        Ok(response.json().await?)
    }
}
