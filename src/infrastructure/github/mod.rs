//! GitHub integration

mod readme_fetcher;

pub use readme_fetcher::{GithubReadmeFetcher, DEFAULT_GITHUB_RAW_BASE_URL};
