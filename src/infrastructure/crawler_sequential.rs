use std::sync::Arc;

use anyhow::anyhow;
use log::info;

use crate::{EnrichedRepository, RepositoryCrawler, RepositoryFetcher, SearchQuery, StdResult};

/// A sequential crawler, enriching each repository fully before moving to the next one.
pub struct SequentialCrawler {
    fetcher: Arc<dyn RepositoryFetcher>,
    query: SearchQuery,
}

impl SequentialCrawler {
    /// Creates a new `SequentialCrawler` instance with the given fetcher and search query.
    pub fn new(fetcher: Arc<dyn RepositoryFetcher>, query: SearchQuery) -> Self {
        Self { fetcher, query }
    }
}

#[async_trait::async_trait]
impl RepositoryCrawler for SequentialCrawler {
    async fn crawl(&self, total_repositories: u32) -> StdResult<Vec<EnrichedRepository>> {
        if total_repositories == 0 {
            return Err(anyhow!(
                "Not enough repositories to crawl, at least one repository is required"
            ));
        }

        info!("Crawling {total_repositories} repositories with {}", self.query);
        let repositories = self
            .fetcher
            .fetch_repositories(total_repositories, &self.query)
            .await?;

        let mut enriched_repositories = Vec::with_capacity(repositories.len());
        for (index, repository) in repositories.into_iter().enumerate() {
            let topics = self.fetcher.fetch_topics(&repository).await?;
            let readme_text = self.fetcher.fetch_readme(&repository).await?;
            info!(
                "Enriched repositories: done={}/{total_repositories}",
                index + 1
            );
            enriched_repositories.push(EnrichedRepository::new(repository, topics, readme_text));
        }

        Ok(enriched_repositories)
    }
}
