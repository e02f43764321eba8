/// Remote store for the static translation dataset.
/// Files are read from raw.githubusercontent.com as whole JSON documents.
use crate::client::{ApiResult, HttpClient};
use serde_json::Value;
use std::time::Duration;

const GITHUB_RAW: &str = "https://raw.githubusercontent.com";
pub const DATA_OWNER: &str = "lukhed";
pub const DATA_REPO: &str = "lukhed_sports_league_data";
pub const DATA_BRANCH: &str = "main";

/// Anything that can hand back a JSON document for a repository-relative path.
pub trait DatasetSource {
    fn fetch(&self, path: &str) -> ApiResult<Value>;
}

/// Read-only view of a GitHub repository addressed by owner/repo/branch.
#[derive(Debug, Clone)]
pub struct GithubDataset {
    http: HttpClient,
    base_url: String,
    owner: String,
    repo: String,
    branch: String,
}

impl Default for GithubDataset {
    fn default() -> Self {
        Self {
            // The dataset fetch is not retried.
            http: HttpClient::new().with_retry(1, Duration::ZERO),
            base_url: GITHUB_RAW.to_owned(),
            owner: DATA_OWNER.to_owned(),
            repo: DATA_REPO.to_owned(),
            branch: DATA_BRANCH.to_owned(),
        }
    }
}

impl GithubDataset {
    pub fn new(owner: &str, repo: &str) -> Self {
        Self {
            owner: owner.to_owned(),
            repo: repo.to_owned(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_owned();
        self
    }

    pub fn file_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.base_url,
            self.owner,
            self.repo,
            self.branch,
            path.trim_start_matches('/')
        )
    }
}

impl DatasetSource for GithubDataset {
    fn fetch(&self, path: &str) -> ApiResult<Value> {
        self.http.get_json(&self.file_url(path), &[])
    }
}
