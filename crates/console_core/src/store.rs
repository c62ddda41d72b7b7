use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::domain::{
    Issue, IssueId, Page, PageId, PortfolioItem, PortfolioItemId, Series, SeriesId,
};
use shared::protocol::{IssueDraft, PortfolioDraft, SeriesDraft};

use crate::error::StoreError;
use crate::upload::FilePayload;

/// An entity participating in an ordered collection: stable identifier plus
/// an integer rank within its parent scope.
pub trait OrderedItem: Clone + Send + Sync + 'static {
    /// `None` only before first persistence; persisted items always carry an id.
    fn item_id(&self) -> Option<i64>;
    fn rank(&self) -> i32;
}

impl OrderedItem for Series {
    fn item_id(&self) -> Option<i64> {
        self.id.map(|SeriesId(id)| id)
    }

    fn rank(&self) -> i32 {
        self.sort_order
    }
}

impl OrderedItem for Issue {
    fn item_id(&self) -> Option<i64> {
        self.id.map(|IssueId(id)| id)
    }

    fn rank(&self) -> i32 {
        self.issue_number
    }
}

impl OrderedItem for Page {
    fn item_id(&self) -> Option<i64> {
        self.id.map(|id| id.0)
    }

    fn rank(&self) -> i32 {
        self.page_number
    }
}

impl OrderedItem for PortfolioItem {
    fn item_id(&self) -> Option<i64> {
        self.id.map(|PortfolioItemId(id)| id)
    }

    fn rank(&self) -> i32 {
        self.sort_order
    }
}

/// Authoritative read/write access to one ordered collection. A store value
/// is already scoped to its parent (a page store knows its series and
/// issue), so nested collections need no parent parameters here.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    type Item: OrderedItem;

    async fn list(&self) -> Result<Vec<Self::Item>, StoreError>;

    /// Persists a new canonical order. The request always carries the full
    /// ordered id list of the scope; the response is the server's final
    /// order, which the caller must treat as authoritative.
    async fn reorder(&self, ordered_ids: &[i64]) -> Result<Vec<Self::Item>, StoreError>;
}

/// A collection whose items are created by uploading a file.
#[async_trait]
pub trait UploadStore: CollectionStore {
    async fn upload(&self, file: &FilePayload) -> Result<Self::Item, StoreError>;
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    let response = StoreError::check(response).await?;
    Ok(response.json().await?)
}

async fn expect_no_content(response: reqwest::Response) -> Result<(), StoreError> {
    StoreError::check(response).await?;
    Ok(())
}

fn image_part(file: &FilePayload) -> Result<Part, StoreError> {
    let part = Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
    let part = match &file.mime_type {
        Some(mime) => part.mime_str(mime)?,
        None => part,
    };
    Ok(part)
}

/// Factory for stores and clients scoped to one backend instance. Cloning is
/// cheap; the underlying HTTP client is shared.
#[derive(Clone)]
pub struct ConsoleApi {
    http: Client,
    base_url: String,
}

impl ConsoleApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn series(&self) -> SeriesStore {
        SeriesStore {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
        }
    }

    pub fn issues(&self, series_id: SeriesId) -> IssueStore {
        IssueStore {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            series_id,
        }
    }

    pub fn pages(&self, series_id: SeriesId, issue_id: IssueId) -> PageStore {
        PageStore {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            series_id,
            issue_id,
        }
    }

    pub fn portfolio(&self) -> PortfolioStore {
        PortfolioStore {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
        }
    }

    pub fn site_config(&self) -> crate::site::SiteConfigClient {
        crate::site::SiteConfigClient::new(self.http.clone(), self.base_url.clone())
    }

    pub fn publish(&self) -> crate::publish::HttpPublishService {
        crate::publish::HttpPublishService::new(self.http.clone(), self.base_url.clone())
    }
}

pub struct SeriesStore {
    http: Client,
    base_url: String,
}

impl SeriesStore {
    fn url(&self, tail: &str) -> String {
        format!("{}/api/webcomic/series{tail}", self.base_url)
    }

    pub async fn get(&self, id: SeriesId) -> Result<Series, StoreError> {
        decode(self.http.get(self.url(&format!("/{}", id.0))).send().await?).await
    }

    pub async fn create(&self, draft: &SeriesDraft) -> Result<Series, StoreError> {
        decode(self.http.post(self.url("")).json(draft).send().await?).await
    }

    pub async fn update(&self, id: SeriesId, draft: &SeriesDraft) -> Result<Series, StoreError> {
        decode(
            self.http
                .put(self.url(&format!("/{}", id.0)))
                .json(draft)
                .send()
                .await?,
        )
        .await
    }

    pub async fn delete(&self, id: SeriesId) -> Result<(), StoreError> {
        expect_no_content(self.http.delete(self.url(&format!("/{}", id.0))).send().await?).await
    }
}

#[async_trait]
impl CollectionStore for SeriesStore {
    type Item = Series;

    async fn list(&self) -> Result<Vec<Series>, StoreError> {
        decode(self.http.get(self.url("")).send().await?).await
    }

    async fn reorder(&self, ordered_ids: &[i64]) -> Result<Vec<Series>, StoreError> {
        decode(
            self.http
                .put(self.url("/reorder"))
                .json(&ordered_ids)
                .send()
                .await?,
        )
        .await
    }
}

pub struct IssueStore {
    http: Client,
    base_url: String,
    series_id: SeriesId,
}

impl IssueStore {
    fn url(&self, tail: &str) -> String {
        format!(
            "{}/api/webcomic/series/{}/issues{tail}",
            self.base_url, self.series_id.0
        )
    }

    pub async fn get(&self, id: IssueId) -> Result<Issue, StoreError> {
        decode(self.http.get(self.url(&format!("/{}", id.0))).send().await?).await
    }

    pub async fn create(&self, draft: &IssueDraft) -> Result<Issue, StoreError> {
        decode(self.http.post(self.url("")).json(draft).send().await?).await
    }

    pub async fn update(&self, id: IssueId, draft: &IssueDraft) -> Result<Issue, StoreError> {
        decode(
            self.http
                .put(self.url(&format!("/{}", id.0)))
                .json(draft)
                .send()
                .await?,
        )
        .await
    }

    pub async fn delete(&self, id: IssueId) -> Result<(), StoreError> {
        expect_no_content(self.http.delete(self.url(&format!("/{}", id.0))).send().await?).await
    }
}

#[async_trait]
impl CollectionStore for IssueStore {
    type Item = Issue;

    async fn list(&self) -> Result<Vec<Issue>, StoreError> {
        decode(self.http.get(self.url("")).send().await?).await
    }

    async fn reorder(&self, ordered_ids: &[i64]) -> Result<Vec<Issue>, StoreError> {
        decode(
            self.http
                .put(self.url("/reorder"))
                .json(&ordered_ids)
                .send()
                .await?,
        )
        .await
    }
}

pub struct PageStore {
    http: Client,
    base_url: String,
    series_id: SeriesId,
    issue_id: IssueId,
}

impl PageStore {
    fn url(&self, tail: &str) -> String {
        format!(
            "{}/api/webcomic/series/{}/issues/{}/pages{tail}",
            self.base_url, self.series_id.0, self.issue_id.0
        )
    }

    pub async fn delete(&self, id: PageId) -> Result<(), StoreError> {
        expect_no_content(self.http.delete(self.url(&format!("/{}", id.0))).send().await?).await
    }
}

#[async_trait]
impl CollectionStore for PageStore {
    type Item = Page;

    async fn list(&self) -> Result<Vec<Page>, StoreError> {
        decode(self.http.get(self.url("")).send().await?).await
    }

    async fn reorder(&self, ordered_ids: &[i64]) -> Result<Vec<Page>, StoreError> {
        decode(
            self.http
                .put(self.url("/reorder"))
                .json(&ordered_ids)
                .send()
                .await?,
        )
        .await
    }
}

#[async_trait]
impl UploadStore for PageStore {
    async fn upload(&self, file: &FilePayload) -> Result<Page, StoreError> {
        let form = Form::new().part("file", image_part(file)?);
        decode(self.http.post(self.url("")).multipart(form).send().await?).await
    }
}

pub struct PortfolioStore {
    http: Client,
    base_url: String,
}

impl PortfolioStore {
    fn url(&self, tail: &str) -> String {
        format!("{}/api/portfolio{tail}", self.base_url)
    }

    pub async fn get(&self, id: PortfolioItemId) -> Result<PortfolioItem, StoreError> {
        decode(self.http.get(self.url(&format!("/{}", id.0))).send().await?).await
    }

    /// Creates a portfolio item from an image plus its metadata, as one
    /// multipart request.
    pub async fn create(
        &self,
        file: &FilePayload,
        draft: &PortfolioDraft,
    ) -> Result<PortfolioItem, StoreError> {
        let mut form = Form::new()
            .part("file", image_part(file)?)
            .text("title", draft.title.clone());
        if let Some(description) = &draft.description {
            form = form.text("description", description.clone());
        }
        if let Some(category) = &draft.category {
            form = form.text("category", category.clone());
        }
        decode(self.http.post(self.url("")).multipart(form).send().await?).await
    }

    pub async fn update(
        &self,
        id: PortfolioItemId,
        draft: &PortfolioDraft,
    ) -> Result<PortfolioItem, StoreError> {
        decode(
            self.http
                .put(self.url(&format!("/{}", id.0)))
                .json(draft)
                .send()
                .await?,
        )
        .await
    }

    /// Replaces the image on an existing item, keeping its metadata.
    pub async fn update_image(
        &self,
        id: PortfolioItemId,
        file: &FilePayload,
    ) -> Result<PortfolioItem, StoreError> {
        let form = Form::new().part("file", image_part(file)?);
        decode(
            self.http
                .put(self.url(&format!("/{}/image", id.0)))
                .multipart(form)
                .send()
                .await?,
        )
        .await
    }

    pub async fn delete(&self, id: PortfolioItemId) -> Result<(), StoreError> {
        expect_no_content(self.http.delete(self.url(&format!("/{}", id.0))).send().await?).await
    }
}

#[async_trait]
impl CollectionStore for PortfolioStore {
    type Item = PortfolioItem;

    async fn list(&self) -> Result<Vec<PortfolioItem>, StoreError> {
        decode(self.http.get(self.url("")).send().await?).await
    }

    async fn reorder(&self, ordered_ids: &[i64]) -> Result<Vec<PortfolioItem>, StoreError> {
        decode(
            self.http
                .put(self.url("/reorder"))
                .json(&ordered_ids)
                .send()
                .await?,
        )
        .await
    }
}
