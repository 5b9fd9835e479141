//! Collaborator traits for the summarizer endpoint

use async_trait::async_trait;

use super::entity::{GithubRepo, RepoSummary};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Source of repository README contents
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReadmeFetcher: Send + Sync {
    /// Fetch the README, `Ok(None)` when the repository has none we can reach
    async fn fetch_readme(&self, repo: &GithubRepo) -> Result<Option<String>, DomainError>;
}

/// Produces a structured summary from README text
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RepoSummarizer: Send + Sync {
    async fn summarize(&self, readme: &str) -> Result<RepoSummary, DomainError>;
}
