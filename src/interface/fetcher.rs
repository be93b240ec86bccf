use crate::{Repository, SearchQuery, StdResult};

/// A trait for fetching repository data from the API.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RepositoryFetcher: Sync + Send {
    /// Fetches the top repositories matching the query, ranked by stars in descending order.
    async fn fetch_repositories(
        &self,
        total_repositories: u32,
        query: &SearchQuery,
    ) -> StdResult<Vec<Repository>>;

    /// Fetches the topics of a repository.
    async fn fetch_topics(&self, repository: &Repository) -> StdResult<Vec<String>>;

    /// Fetches the README of a repository, if it has one.
    async fn fetch_readme(&self, repository: &Repository) -> StdResult<Option<String>>;
}
