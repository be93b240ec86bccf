use std::{collections::HashSet, sync::Arc};

use anyhow::{Context, anyhow};
use log::{debug, info, warn};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::{
    FetcherConfig, FetcherError, GitTreeResponse, HttpRequest, HttpResponse, HttpTransport,
    Repository, RepositoryFetcher, ResultPage, SEARCH_ORDER, SEARCH_SORT, SearchQuery, StdResult,
    TopicsResponse,
};

/// The media type required by the topics endpoint.
const TOPICS_MEDIA_TYPE: &str = "application/vnd.github.mercy-preview+json";

/// The number of consecutive search pages without any new repository after which the search is
/// considered exhausted.
const MAX_CONSECUTIVE_EMPTY_PAGES: u32 = 2;

/// Fetches repository data from the GitHub REST API.
pub struct RestFetcher {
    /// The transport used for every request, expected to enforce the rate limit.
    transport: Arc<dyn HttpTransport>,

    config: FetcherConfig,
}

impl RestFetcher {
    /// Creates a new `RestFetcher` instance sending its requests through the given transport.
    pub fn new(transport: Arc<dyn HttpTransport>, config: FetcherConfig) -> Self {
        Self { transport, config }
    }

    fn build_request(&self, url: &str) -> HttpRequest {
        HttpRequest::get(url)
            .with_optional_header("Authorization", self.config.authorization().as_deref())
    }

    fn build_search_request(&self, query: &SearchQuery, page: u32) -> StdResult<HttpRequest> {
        let mut params = vec![
            ("q", query.filter().to_string()),
            ("sort", SEARCH_SORT.to_string()),
            ("order", SEARCH_ORDER.to_string()),
            ("page", page.to_string()),
        ];
        if let Some(per_page) = self.config.per_page {
            params.push(("per_page", per_page.to_string()));
        }
        let url = Url::parse_with_params(
            &format!("{}/search/repositories", self.config.api_url),
            &params,
        )
        .with_context(|| format!("Invalid API URL: {}", self.config.api_url))?;

        Ok(self.build_request(url.as_str()))
    }

    fn build_readme_url(&self, repository: &Repository, path: &str) -> StdResult<Url> {
        let mut url = Url::parse(&self.config.raw_content_url).with_context(|| {
            format!("Invalid raw content URL: {}", self.config.raw_content_url)
        })?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Invalid raw content URL: {}", self.config.raw_content_url))?
            .pop_if_empty()
            .extend(repository.full_name().split('/'))
            .extend(repository.default_branch().split('/'))
            .extend(path.split('/'));

        Ok(url)
    }

    /// Executes a request, an unsuccessful response is a remote error.
    async fn execute(&self, request: &HttpRequest) -> StdResult<HttpResponse> {
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(FetcherError::Remote {
                url: request.url().to_string(),
                status: response.status(),
                body: response.text(),
            }
            .into());
        }

        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: &HttpRequest) -> StdResult<T> {
        self.execute(request)
            .await?
            .json::<T>()
            .with_context(|| format!("Unexpected response for request: {request}"))
    }

    async fn fetch_page(&self, query: &SearchQuery, page: u32) -> StdResult<ResultPage> {
        let request = self.build_search_request(query, page)?;

        self.fetch_json(&request).await
    }
}

#[async_trait::async_trait]
impl RepositoryFetcher for RestFetcher {
    async fn fetch_repositories(
        &self,
        total_repositories: u32,
        query: &SearchQuery,
    ) -> StdResult<Vec<Repository>> {
        let total_repositories = total_repositories as usize;
        let mut repositories: Vec<Repository> = Vec::new();
        let mut full_names = HashSet::new();
        let mut consecutive_empty_pages = 0;
        let mut page = 1;

        while repositories.len() < total_repositories {
            info!(
                "Fetching page {page} of repositories (currently have {})",
                repositories.len()
            );
            let result_page = self.fetch_page(query, page).await?;
            if result_page.incomplete_results {
                warn!("Search results of page {page} are incomplete");
            }
            let total_before_page = repositories.len();
            repositories.reserve(result_page.items.len());
            for repository in result_page.items {
                if full_names.insert(repository.full_name().to_string()) {
                    debug!("Fetched {repository}");
                    repositories.push(repository);
                } else {
                    debug!("Skipped duplicate {repository}");
                }
            }
            if repositories.len() == total_before_page {
                consecutive_empty_pages += 1;
                if consecutive_empty_pages >= MAX_CONSECUTIVE_EMPTY_PAGES {
                    warn!(
                        "Search exhausted after page {page}: expected {total_repositories} repositories, found {} (total_count={})",
                        repositories.len(),
                        result_page.total_count
                    );
                    break;
                }
            } else {
                consecutive_empty_pages = 0;
            }
            page += 1;
        }

        repositories.sort_by(|a, b| b.total_stars().cmp(a.total_stars()));
        repositories.truncate(total_repositories);

        Ok(repositories)
    }

    async fn fetch_topics(&self, repository: &Repository) -> StdResult<Vec<String>> {
        let request = self
            .build_request(&format!("{}/topics", repository.url()))
            .with_header("Accept", TOPICS_MEDIA_TYPE);

        info!("Fetching topics for {}", repository.full_name());
        let topics: TopicsResponse = self.fetch_json(&request).await?;

        Ok(topics.names)
    }

    async fn fetch_readme(&self, repository: &Repository) -> StdResult<Option<String>> {
        let tree_request = self.build_request(&repository.default_branch_tree_url());

        info!("Fetching git tree for {}", repository.full_name());
        let tree: GitTreeResponse = self.fetch_json(&tree_request).await?;
        let Some(readme) = tree.find_readme() else {
            info!("{} does not have a README", repository.full_name());
            return Ok(None);
        };

        let readme_url = self.build_readme_url(repository, &readme.path)?;
        let readme_request = self.build_request(readme_url.as_str());

        info!("Fetching README for {}", repository.full_name());
        let response = self.execute(&readme_request).await?;

        Ok(Some(response.text()))
    }
}
