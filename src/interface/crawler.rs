use crate::{EnrichedRepository, StdResult};

/// A trait for retrieving GitHub repositories and associated metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RepositoryCrawler: Sync + Send {
    /// Crawl the GitHub API for the top repositories and enrich them.
    async fn crawl(&self, total_repositories: u32) -> StdResult<Vec<EnrichedRepository>>;
}
