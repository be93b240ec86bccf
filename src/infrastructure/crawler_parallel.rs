use std::sync::Arc;

use anyhow::anyhow;
use log::{info, warn};

use crate::{
    EnrichedRepository, Repository, RepositoryCrawler, RepositoryFetcher, SearchQuery, StdResult,
};

/// A crawler running the topics and README enrichments as two concurrent passes.
///
/// Each pass walks the ranked repositories sequentially. The results are associated back to
/// their repository by position, so the output keeps the ranking order whatever the completion
/// order of the passes.
pub struct PhaseParallelCrawler {
    fetcher: Arc<dyn RepositoryFetcher>,
    query: SearchQuery,
}

impl PhaseParallelCrawler {
    /// Creates a new `PhaseParallelCrawler` instance with the given fetcher and search query.
    pub fn new(fetcher: Arc<dyn RepositoryFetcher>, query: SearchQuery) -> Self {
        Self { fetcher, query }
    }
}

async fn fetch_all_topics(
    fetcher: Arc<dyn RepositoryFetcher>,
    repositories: Arc<Vec<Repository>>,
) -> StdResult<Vec<Vec<String>>> {
    let mut topics = Vec::with_capacity(repositories.len());
    for repository in repositories.iter() {
        topics.push(fetcher.fetch_topics(repository).await?);
    }
    info!("Fetched topics of {} repositories", topics.len());

    Ok(topics)
}

async fn fetch_all_readmes(
    fetcher: Arc<dyn RepositoryFetcher>,
    repositories: Arc<Vec<Repository>>,
) -> StdResult<Vec<Option<String>>> {
    let mut readmes = Vec::with_capacity(repositories.len());
    for repository in repositories.iter() {
        readmes.push(fetcher.fetch_readme(repository).await?);
    }
    info!("Fetched READMEs of {} repositories", readmes.len());

    Ok(readmes)
}

#[async_trait::async_trait]
impl RepositoryCrawler for PhaseParallelCrawler {
    async fn crawl(&self, total_repositories: u32) -> StdResult<Vec<EnrichedRepository>> {
        if total_repositories == 0 {
            return Err(anyhow!(
                "Not enough repositories to crawl, at least one repository is required"
            ));
        }

        info!("Crawling {total_repositories} repositories with {}", self.query);
        let repositories = Arc::new(
            self.fetcher
                .fetch_repositories(total_repositories, &self.query)
                .await?,
        );

        let topics_handle = tokio::spawn(fetch_all_topics(
            Arc::clone(&self.fetcher),
            Arc::clone(&repositories),
        ));
        let readmes_handle = tokio::spawn(fetch_all_readmes(
            Arc::clone(&self.fetcher),
            Arc::clone(&repositories),
        ));
        warn!(
            "Started topics and README passes over {} repositories",
            repositories.len()
        );
        let (topics, readmes) = tokio::join!(topics_handle, readmes_handle);
        let topics = topics??;
        let readmes = readmes??;

        Ok(Arc::unwrap_or_clone(repositories)
            .into_iter()
            .zip(topics)
            .zip(readmes)
            .map(|((repository, topics), readme_text)| {
                EnrichedRepository::new(repository, topics, readme_text)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::{sync::Mutex, time::sleep};

    use crate::MockRepositoryFetcher;

    use super::*;

    /// A fetcher whose enrichments complete after a delay depending on the repository.
    struct DelayedFetcher {
        repositories: Vec<Repository>,
        completions: Mutex<Vec<String>>,
    }

    impl DelayedFetcher {
        fn new(total_repositories: u32) -> Self {
            Self {
                repositories: (0..total_repositories)
                    .map(|index| {
                        Repository::new("org-1", &format!("repository-{index}"), 100 - index)
                    })
                    .collect(),
                completions: Mutex::new(vec![]),
            }
        }

        fn rank(repository: &Repository) -> u64 {
            u64::from(100 - repository.total_stars().0)
        }
    }

    #[async_trait::async_trait]
    impl RepositoryFetcher for DelayedFetcher {
        async fn fetch_repositories(
            &self,
            total_repositories: u32,
            _query: &SearchQuery,
        ) -> StdResult<Vec<Repository>> {
            Ok(self
                .repositories
                .iter()
                .take(total_repositories as usize)
                .cloned()
                .collect())
        }

        async fn fetch_topics(&self, repository: &Repository) -> StdResult<Vec<String>> {
            // Topics of the best ranked repositories are the slowest
            sleep(Duration::from_millis(50 * (4 - Self::rank(repository)))).await;
            self.completions
                .lock()
                .await
                .push(format!("topics:{}", repository.full_name()));

            Ok(vec![format!("topic-of-{}", repository.repository_name())])
        }

        async fn fetch_readme(&self, repository: &Repository) -> StdResult<Option<String>> {
            sleep(Duration::from_millis(1)).await;
            self.completions
                .lock()
                .await
                .push(format!("readme:{}", repository.full_name()));

            Ok(Some(format!("README of {}", repository.repository_name())))
        }
    }

    #[tokio::test]
    async fn crawler_fails_if_no_repository_requested() {
        let fetcher = MockRepositoryFetcher::new();
        let crawler = PhaseParallelCrawler::new(Arc::new(fetcher), SearchQuery::default());

        crawler
            .crawl(0)
            .await
            .expect_err("Crawler should fail if no repository is requested");
    }

    #[tokio::test]
    async fn crawler_keeps_ranking_order_whatever_the_completion_order() {
        let fetcher = Arc::new(DelayedFetcher::new(4));
        let crawler = PhaseParallelCrawler::new(fetcher.clone(), SearchQuery::default());

        let enriched_repositories = crawler.crawl(4).await.unwrap();

        let completions = fetcher.completions.lock().await.clone();
        let first_topics_completion = completions
            .iter()
            .position(|completion| completion == "topics:org-1/repository-0")
            .unwrap();
        let last_readme_completion = completions
            .iter()
            .position(|completion| completion == "readme:org-1/repository-3")
            .unwrap();
        assert!(last_readme_completion < first_topics_completion);
        assert_eq!(
            (0..4)
                .map(|index| EnrichedRepository::new(
                    Repository::new("org-1", &format!("repository-{index}"), 100 - index),
                    vec![format!("topic-of-repository-{index}")],
                    Some(format!("README of repository-{index}")),
                ))
                .collect::<Vec<_>>(),
            enriched_repositories
        );
    }

    #[tokio::test]
    async fn crawler_fails_if_search_fails_before_any_enrichment() {
        let fetcher = {
            let mut fetcher = MockRepositoryFetcher::new();
            fetcher
                .expect_fetch_repositories()
                .returning(|_, _| Err(anyhow!("Remote error: status=500")))
                .times(1);
            fetcher.expect_fetch_topics().never();
            fetcher.expect_fetch_readme().never();

            fetcher
        };
        let crawler = PhaseParallelCrawler::new(Arc::new(fetcher), SearchQuery::default());

        crawler
            .crawl(3)
            .await
            .expect_err("Crawler should fail if search fails");
    }

    #[tokio::test]
    async fn crawler_fails_if_one_pass_fails() {
        let fetcher = {
            let mut fetcher = MockRepositoryFetcher::new();
            fetcher
                .expect_fetch_repositories()
                .returning(|_, _| {
                    Ok(vec![
                        Repository::new("org-1", "repository-1", 20),
                        Repository::new("org-1", "repository-2", 10),
                    ])
                })
                .times(1);
            fetcher
                .expect_fetch_topics()
                .returning(|_| Err(anyhow!("Remote error: status=404")));
            fetcher.expect_fetch_readme().returning(|_| Ok(None));

            fetcher
        };
        let crawler = PhaseParallelCrawler::new(Arc::new(fetcher), SearchQuery::default());

        crawler
            .crawl(2)
            .await
            .expect_err("Crawler should fail if the topics pass fails");
    }
}
