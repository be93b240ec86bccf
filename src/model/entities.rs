use std::{fmt::Display, ops::Deref};

use serde::{Deserialize, Serialize};

use super::GITHUB_API_ENDPOINT;

/// The placeholder of the reference in a tree URL template.
const TREE_SHA_PLACEHOLDER: &str = "{/sha}";

/// The name of a repository.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(pub String);

impl Deref for RepositoryName {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for RepositoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The number of stars a repository has.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StarsCounter(pub u32);

impl Deref for StarsCounter {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for StarsCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The owner of a repository.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    /// The login of the user or organization.
    pub login: String,
}

/// Metadata of a GitHub repository, as listed by the search endpoint.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// The name of the repository.
    name: RepositoryName,

    /// The `owner/name` identifier of the repository.
    full_name: String,

    /// The owner of the repository.
    owner: Owner,

    /// The description, absent when the owner did not write one.
    #[serde(default)]
    description: Option<String>,

    /// The URL of the repository API resource.
    url: String,

    /// The URL template of the repository file tree.
    trees_url: String,

    /// The number of stars the repository has.
    #[serde(rename = "stargazers_count")]
    total_stars: StarsCounter,

    /// The name of the default branch.
    default_branch: String,
}

impl Repository {
    /// Creates a new `Repository` instance hosted on the GitHub API, on a `main` branch.
    pub fn new(owner_login: &str, repository_name: &str, total_stars: u32) -> Self {
        let full_name = format!("{owner_login}/{repository_name}");
        let mut repository = Self {
            name: RepositoryName(repository_name.to_string()),
            full_name,
            owner: Owner {
                login: owner_login.to_string(),
            },
            description: None,
            url: String::new(),
            trees_url: String::new(),
            total_stars: StarsCounter(total_stars),
            default_branch: "main".to_string(),
        };
        repository.set_api_url(GITHUB_API_ENDPOINT);

        repository
    }

    /// Points the resource URLs of the repository to another API root.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.set_api_url(api_url);
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Sets the default branch.
    pub fn with_default_branch(mut self, default_branch: &str) -> Self {
        self.default_branch = default_branch.to_string();
        self
    }

    fn set_api_url(&mut self, api_url: &str) {
        self.url = format!(
            "{}/repos/{}",
            api_url.trim_end_matches('/'),
            self.full_name
        );
        self.trees_url = format!("{}/git/trees{TREE_SHA_PLACEHOLDER}", self.url);
    }

    /// Retrieves the repository name.
    pub fn repository_name(&self) -> &RepositoryName {
        &self.name
    }

    /// Retrieves the `owner/name` identifier.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Retrieves the owner login.
    pub fn owner_login(&self) -> &str {
        &self.owner.login
    }

    /// Retrieves the description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Retrieves the URL of the repository API resource.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Retrieves the total stars of the repository.
    pub fn total_stars(&self) -> &StarsCounter {
        &self.total_stars
    }

    /// Retrieves the default branch.
    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    /// Builds the URL of the file tree at the default branch.
    pub fn default_branch_tree_url(&self) -> String {
        self.trees_url
            .replace(TREE_SHA_PLACEHOLDER, &format!("/{}", self.default_branch))
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Repository: {}, Stars: {}",
            self.full_name, self.total_stars
        )
    }
}

/// A repository with its topics and README.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRepository {
    /// The repository metadata.
    pub repository: Repository,

    /// The topics, possibly empty.
    pub topics: Vec<String>,

    /// The README text, absent when the tree has no README file.
    pub readme_text: Option<String>,
}

impl EnrichedRepository {
    /// Creates a new `EnrichedRepository` instance.
    pub fn new(repository: Repository, topics: Vec<String>, readme_text: Option<String>) -> Self {
        Self {
            repository,
            topics,
            readme_text,
        }
    }
}

/// A record of the collected dataset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOutputFormat {
    /// The login of the repository owner.
    pub user: String,

    /// The description and README, separated by a space.
    pub text: String,

    /// The topics.
    pub tags: Vec<String>,

    /// The coarse label, filled in after collection.
    #[serde(default)]
    pub super_label: Option<String>,

    /// The fine label, filled in after collection.
    #[serde(default)]
    pub sub_label: Option<String>,

    /// The repository name split into words.
    pub repo_name_seg: String,

    /// The `owner/name` identifier.
    pub repo_name: String,
}

impl From<&EnrichedRepository> for RepositoryOutputFormat {
    fn from(enriched: &EnrichedRepository) -> Self {
        let repository = &enriched.repository;
        let text = [repository.description(), enriched.readme_text.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            user: repository.owner_login().to_string(),
            text,
            tags: enriched.topics.clone(),
            super_label: None,
            sub_label: None,
            repo_name_seg: segment_repository_name(repository.repository_name()),
            repo_name: repository.full_name().to_string(),
        }
    }
}

/// Replaces every character that is not an ASCII letter or digit with a space.
fn segment_repository_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn search_item() -> serde_json::Value {
        json!({
            "id": 1,
            "name": "repository-1",
            "full_name": "org-1/repository-1",
            "owner": { "login": "org-1", "id": 2 },
            "description": null,
            "url": "https://api.github.com/repos/org-1/repository-1",
            "trees_url": "https://api.github.com/repos/org-1/repository-1/git/trees{/sha}",
            "stargazers_count": 42,
            "default_branch": "develop"
        })
    }

    #[test]
    fn deserialize_search_item() {
        let repository: Repository = serde_json::from_value(search_item()).unwrap();

        assert_eq!(
            Repository::new("org-1", "repository-1", 42).with_default_branch("develop"),
            repository
        );
        assert_eq!(
            "https://api.github.com/repos/org-1/repository-1/git/trees/develop",
            repository.default_branch_tree_url()
        );
    }

    #[test]
    fn deserialize_search_item_fails_on_missing_field() {
        let mut item = search_item();
        item.as_object_mut().unwrap().remove("default_branch");

        serde_json::from_value::<Repository>(item).expect_err("Expected a missing field error");
    }

    #[test]
    fn output_format_joins_description_and_readme() {
        let enriched = EnrichedRepository::new(
            Repository::new("org-1", "my_repo.rs-2", 10).with_description("A crate."),
            vec!["rust".to_string()],
            Some("# Title".to_string()),
        );

        let output = RepositoryOutputFormat::from(&enriched);

        assert_eq!(
            RepositoryOutputFormat {
                user: "org-1".to_string(),
                text: "A crate. # Title".to_string(),
                tags: vec!["rust".to_string()],
                super_label: None,
                sub_label: None,
                repo_name_seg: "my repo rs 2".to_string(),
                repo_name: "org-1/my_repo.rs-2".to_string(),
            },
            output
        );
    }

    #[test]
    fn output_format_without_description_nor_readme() {
        let enriched =
            EnrichedRepository::new(Repository::new("org-1", "repository-1", 10), vec![], None);

        let output = RepositoryOutputFormat::from(&enriched);

        assert_eq!("", output.text);
        assert!(output.tags.is_empty());
    }
}
