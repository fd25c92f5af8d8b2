pub mod bangumi;

use async_trait::async_trait;

use crate::domain::SubjectId;
pub use bangumi::{BangumiClient, CatalogError, SearchPage, Subject, SubjectQuery};

/// Read access to the upstream anime catalog.
///
/// The collector and refresher only talk to the catalog through this trait so
/// the fetch loops can run against an in-memory catalog in tests.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetches one page of subjects matching `query`.
    async fn search_subjects(
        &self,
        query: &SubjectQuery,
        limit: u32,
        offset: u32,
    ) -> Result<SearchPage, CatalogError>;

    /// Fetches full detail for one subject.
    async fn get_subject(&self, id: SubjectId) -> Result<Subject, CatalogError>;
}
