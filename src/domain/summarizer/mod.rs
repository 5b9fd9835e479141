//! Repository summarization domain
//!
//! The downstream work behind the rate-limited summarizer endpoint:
//! locating a GitHub repository, fetching its README and condensing it.

mod entity;
mod ports;

pub use entity::{GithubRepo, RepoSummary};
pub use ports::{ReadmeFetcher, RepoSummarizer};

#[cfg(test)]
pub use ports::{MockReadmeFetcher, MockRepoSummarizer};
