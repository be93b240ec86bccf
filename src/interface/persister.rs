use crate::{RepositoryOutputFormat, StdResult};

/// A trait for persisting repository data to a storage medium.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RepositoryPersister: Sync + Send {
    /// Persists the repository data to a storage medium, returning the number of records written.
    async fn persist(&self, data: &[RepositoryOutputFormat]) -> StdResult<u32>;
}
