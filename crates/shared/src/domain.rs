use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(SeriesId);
id_newtype!(IssueId);
id_newtype!(PageId);
id_newtype!(PortfolioItemId);

/// A webcomic series. Top-level ordered collection, ranked by `sort_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    /// Absent only before first persistence.
    pub id: Option<SeriesId>,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub cover_image_url: Option<String>,
    pub sort_order: i32,
    pub active: bool,
}

/// An issue within a series, ranked by `issue_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: Option<IssueId>,
    pub series_id: SeriesId,
    pub issue_number: i32,
    pub title: String,
    pub cover_image_url: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub published: bool,
}

/// A single page image within an issue, ranked by `page_number`.
///
/// Thumbnail and optimized variants are produced server-side; the client
/// only ever reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: Option<PageId>,
    pub issue_id: IssueId,
    pub page_number: i32,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub optimized_url: Option<String>,
}

/// A portfolio gallery entry. Top-level ordered collection, ranked by
/// `sort_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: Option<PortfolioItemId>,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub optimized_url: Option<String>,
    pub category: Option<String>,
    pub sort_order: i32,
}

/// The single site-wide theme configuration row.
///
/// `social_links` stays the raw JSON string the backend stores; the console
/// core never edits individual links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub id: Option<i64>,
    pub site_name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub heading_font: String,
    pub body_font: String,
    pub hero_image_url: Option<String>,
    pub about_text: Option<String>,
    pub bigcartel_url: Option<String>,
    pub social_links: Option<String>,
}
