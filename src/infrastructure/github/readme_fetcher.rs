//! README retrieval from raw.githubusercontent.com

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::summarizer::{GithubRepo, ReadmeFetcher};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

pub const DEFAULT_GITHUB_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";

/// Branches probed for a README, in order
const BRANCHES: [&str; 2] = ["main", "master"];

/// Fetches `README.md` from the default branch of a public repository
#[derive(Debug)]
pub struct GithubReadmeFetcher<C: HttpClientTrait> {
    client: C,
    base_url: String,
}

impl<C: HttpClientTrait> GithubReadmeFetcher<C> {
    pub fn new(client: C) -> Self {
        Self::with_base_url(client, DEFAULT_GITHUB_RAW_BASE_URL)
    }

    pub fn with_base_url(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn readme_url(&self, repo: &GithubRepo, branch: &str) -> String {
        format!(
            "{}/{}/{}/{}/README.md",
            self.base_url,
            repo.owner(),
            repo.name(),
            branch
        )
    }
}

#[async_trait]
impl<C: HttpClientTrait> ReadmeFetcher for GithubReadmeFetcher<C> {
    async fn fetch_readme(&self, repo: &GithubRepo) -> Result<Option<String>, DomainError> {
        for branch in BRANCHES {
            let url = self.readme_url(repo, branch);

            match self.client.get_text(&url).await {
                Ok(Some(readme)) => {
                    debug!(repo = %repo, branch, "Fetched README");
                    return Ok(Some(readme));
                }
                Ok(None) => debug!(repo = %repo, branch, "No README on branch"),
                Err(e) => warn!(repo = %repo, branch, error = %e, "README fetch failed"),
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use crate::infrastructure::http_client::HttpClient;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repo() -> GithubRepo {
        GithubRepo::new("octo", "hello")
    }

    #[tokio::test]
    async fn test_fetch_from_main() {
        let client = MockHttpClient::new().with_document(
            "https://raw.githubusercontent.com/octo/hello/main/README.md",
            "# Hello",
        );
        let fetcher = GithubReadmeFetcher::new(client);

        let readme = fetcher.fetch_readme(&repo()).await.unwrap();
        assert_eq!(readme.as_deref(), Some("# Hello"));
    }

    #[tokio::test]
    async fn test_falls_back_to_master() {
        let client = MockHttpClient::new().with_document(
            "https://raw.githubusercontent.com/octo/hello/master/README.md",
            "# Legacy",
        );
        let fetcher = GithubReadmeFetcher::new(client);

        let readme = fetcher.fetch_readme(&repo()).await.unwrap();
        assert_eq!(readme.as_deref(), Some("# Legacy"));
    }

    #[tokio::test]
    async fn test_network_error_tries_next_branch() {
        let client = MockHttpClient::new()
            .with_error(
                "https://raw.githubusercontent.com/octo/hello/main/README.md",
                "connection reset",
            )
            .with_document(
                "https://raw.githubusercontent.com/octo/hello/master/README.md",
                "# Recovered",
            );
        let fetcher = GithubReadmeFetcher::new(client);

        let readme = fetcher.fetch_readme(&repo()).await.unwrap();
        assert_eq!(readme.as_deref(), Some("# Recovered"));
    }

    #[tokio::test]
    async fn test_missing_readme() {
        let fetcher = GithubReadmeFetcher::new(MockHttpClient::new());
        assert!(fetcher.fetch_readme(&repo()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_against_http_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/octo/hello/main/README.md"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/octo/hello/master/README.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# From master"))
            .mount(&server)
            .await;

        let fetcher = GithubReadmeFetcher::with_base_url(HttpClient::new(), format!("{}/", server.uri()));

        let readme = fetcher.fetch_readme(&repo()).await.unwrap();
        assert_eq!(readme.as_deref(), Some("# From master"));
    }
}
