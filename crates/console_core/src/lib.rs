//! Client-side core of the studio administrative console.
//!
//! Two engines cover every reorderable list and every upload site in the
//! console: [`collection::CollectionController`] applies moves optimistically
//! and reconciles with the server's authoritative order, and
//! [`upload::UploadPipeline`] runs resilient sequential file batches. Both
//! are parameterized over the remote-store traits in [`store`], with
//! concrete HTTP stores for the series, issue, page and portfolio
//! collections.

pub mod collection;
pub mod error;
pub mod publish;
pub mod site;
pub mod store;
pub mod upload;

pub use collection::{CollectionController, CollectionEvent, MoveDirection, MoveOutcome};
pub use error::StoreError;
pub use publish::{HttpPublishService, PublishService};
pub use site::SiteConfigClient;
pub use store::{
    CollectionStore, ConsoleApi, IssueStore, OrderedItem, PageStore, PortfolioStore, SeriesStore,
    UploadStore,
};
pub use upload::{
    BatchProgress, BatchReport, FilePayload, UploadEvent, UploadOutcome, UploadPipeline,
};

#[cfg(test)]
#[path = "tests/collection_tests.rs"]
mod collection_tests;

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod upload_tests;

#[cfg(test)]
#[path = "tests/http_store_tests.rs"]
mod http_store_tests;
