//! GitHub repository summarizer endpoint

use axum::extract::Request;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::state::AppState;
use crate::api::types::{parse_json_body, ApiError};
use crate::domain::{Admission, GithubRepo};

const README_NOT_FOUND: &str = "Could not fetch README.md from repository";

/// Request body for `POST /api/github-summarizer`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub github_url: String,
}

/// Successful summary; `usage` and `limit` are added by the rate-limit wrapper
#[derive(Debug, Clone, Serialize)]
pub struct SummarizeResponse {
    pub success: bool,
    pub message: String,
    pub readme: String,
    pub summary: String,
    pub cool_facts: Vec<String>,
}

/// POST /api/github-summarizer
pub async fn summarize_repository(
    state: AppState,
    request: Request,
    admission: Admission,
) -> Result<SummarizeResponse, ApiError> {
    let body: SummarizeRequest = parse_json_body(request).await.map_err(|e| {
        debug!(error = %e, "Malformed summarizer request");
        ApiError::bad_request("Invalid request")
    })?;

    let repo = GithubRepo::parse_url(&body.github_url).ok_or_else(|| {
        debug!(url = %body.github_url, "Not a GitHub repository URL");
        ApiError::not_found(README_NOT_FOUND)
    })?;

    let readme = state
        .readme_fetcher
        .fetch_readme(&repo)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            debug!(repo = %repo, "No README found");
            ApiError::not_found(README_NOT_FOUND)
        })?;

    let summary = state.summarizer.summarize(&readme).await.map_err(|e| {
        warn!(repo = %repo, error = %e, "Summarization failed");
        ApiError::from(e)
    })?;

    info!(
        repo = %repo,
        key_id = %admission.key_id,
        facts = summary.cool_facts.len(),
        "Repository summarized"
    );

    Ok(SummarizeResponse {
        success: true,
        message: "Repository summarized successfully".to_string(),
        readme,
        summary: summary.summary,
        cool_facts: summary.cool_facts,
    })
}
