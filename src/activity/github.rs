use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{ActivityEntry, ActivityError, ActivityKind, ActivitySource};
use crate::config::GithubConfig;

const USER_AGENT: &str = concat!("folio-api/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct CommitItem {
    html_url: Option<String>,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    name: Option<String>,
    date: DateTime<Utc>,
}

/// Recent commits of one repository through the GitHub REST API
pub struct CommitHistorySource {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    per_page: usize,
}

impl CommitHistorySource {
    pub fn new(api_base: &str, repository: &str, token: Option<String>, per_page: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/repos/{}/commits", api_base.trim_end_matches('/'), repository),
            token,
            per_page,
        }
    }

    /// `None` when no repository is configured
    pub fn from_config(github: &GithubConfig, per_page: usize) -> Option<Self> {
        github
            .repository
            .as_deref()
            .map(|repo| Self::new(&github.api_base, repo, github.token.clone(), per_page))
    }
}

fn entries_from_commits(commits: Vec<CommitItem>) -> Vec<ActivityEntry> {
    commits
        .into_iter()
        .filter_map(|item| {
            let author = item.commit.author?;
            let headline = item.commit.message.lines().next().unwrap_or_default().to_string();
            let description = match author.name {
                Some(name) => format!("Committed by {}", name),
                None => "Commit".to_string(),
            };
            let mut entry = ActivityEntry::new(ActivityKind::Commit, headline, description, author.date);
            entry.link = item.html_url;
            Some(entry)
        })
        .collect()
}

#[async_trait]
impl ActivitySource for CommitHistorySource {
    fn name(&self) -> &str {
        "github commits"
    }

    async fn fetch(&self) -> Result<Vec<ActivityEntry>, ActivityError> {
        let mut request = self
            .client
            .get(&self.url)
            .query(&[("per_page", self.per_page)])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ActivityError::Status {
                source_name: self.name().to_string(),
                status: response.status().as_u16(),
            });
        }

        let commits: Vec<CommitItem> = response.json().await?;
        Ok(entries_from_commits(commits))
    }
}
