//! This module holds functionality specific to using Github's REST API.
//!
//! In the root module, we just implement the RestApiClient trait.
//! In other (private) submodules we implement behavior specific to Github's REST API.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};

use crate::{
    Repository,
    client::{Comment, RestApiClient},
    error::ClientError,
};
mod serde_structs;
use serde_structs::ThreadComment;
mod specific_api;

/// The number of comments requested per page when listing comments.
const PER_PAGE: &str = "100";

/// A structure to work with Github REST API.
pub struct GithubApiClient {
    /// The HTTP request client to be used for all REST API calls.
    client: Client,

    /// The base URL of the REST API (eg. the value of `GITHUB_API_URL`).
    api_url: Url,
}

// implement the RestApiClient trait for the GithubApiClient
#[async_trait]
impl RestApiClient for GithubApiClient {
    /// This prints a line to indicate the beginning of a related group of [`log`] statements.
    ///
    /// For apps' [`log`] implementations, this function's [`log::info`] output needs to have
    /// no prefixed data.
    /// Such behavior can be identified by the log target `"CI_LOG_GROUPING"`.
    /// See [`ActionsLogger`](crate::logger::ActionsLogger).
    fn start_log_group(&self, name: &str) {
        log::info!(target: "CI_LOG_GROUPING", "::group::{name}");
    }

    /// This prints a line to indicate the ending of a related group of [`log`] statements.
    fn end_log_group(&self) {
        log::info!(target: "CI_LOG_GROUPING", "::endgroup::");
    }

    async fn list_comments(
        &self,
        repo: &Repository,
        issue_number: u64,
    ) -> Result<Vec<Comment>, ClientError> {
        let url = self.issue_comments_url(repo, issue_number)?;
        let mut comments_url = Some(Url::parse_with_params(
            url.as_str(),
            &[("per_page", PER_PAGE), ("page", "1")],
        )?);
        let mut comments = vec![];
        while let Some(ref endpoint) = comments_url {
            let request =
                Self::make_api_request(&self.client, endpoint.as_str(), Method::GET, None, None)?;
            let response = self
                .send("get list of existing comments", request)
                .await?;
            comments_url = Self::try_next_page(response.headers());
            let payload = serde_json::from_str::<Vec<ThreadComment>>(
                &response
                    .text()
                    .await
                    .map_err(|e| ClientError::Request(e).add_request_context("read comments"))?,
            )
            .map_err(|e| ClientError::json("deserialize list of existing comments", e))?;
            comments.extend(payload.into_iter().map(Comment::from));
        }
        log::debug!(
            "Found {} existing comment(s) on {repo}#{issue_number}",
            comments.len()
        );
        Ok(comments)
    }

    async fn create_comment(
        &self,
        repo: &Repository,
        issue_number: u64,
        body: &str,
    ) -> Result<Comment, ClientError> {
        let url = self.issue_comments_url(repo, issue_number)?;
        self.send_comment(url, Method::POST, body, "post comment")
            .await
    }

    async fn update_comment(
        &self,
        repo: &Repository,
        comment_id: u64,
        body: &str,
    ) -> Result<Comment, ClientError> {
        let url = self.api_url.join(
            format!(
                "repos/{}/{}/issues/comments/{comment_id}",
                repo.owner, repo.name
            )
            .as_str(),
        )?;
        self.send_comment(url, Method::PATCH, body, "update comment")
            .await
    }
}
