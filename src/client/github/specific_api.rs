//! This submodule implements functionality exclusively specific to Github's REST API.

use super::{
    GithubApiClient,
    serde_structs::{CommentPayload, ThreadComment},
};
use crate::{
    Repository,
    client::{Comment, RestApiClient, USER_AGENT, check_response, make_headers},
    error::ClientError,
};
use reqwest::{
    Client, Method, Request, Response, Url,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};

impl GithubApiClient {
    /// Instantiate a [`GithubApiClient`] object.
    ///
    /// The `api_url` is the REST API's base URL (eg. `https://api.github.com/`).
    /// Requests are sent without authentication if `token` is [`None`].
    pub fn new(api_url: Url, token: Option<&str>) -> Result<Self, ClientError> {
        Ok(GithubApiClient {
            client: Client::builder()
                .default_headers(make_headers(token)?)
                .user_agent(USER_AGENT)
                .build()?,
            api_url,
        })
    }

    /// The endpoint that lists (and creates) an issue's comments.
    pub(super) fn issue_comments_url(
        &self,
        repo: &Repository,
        issue_number: u64,
    ) -> Result<Url, ClientError> {
        Ok(self.api_url.join(
            format!(
                "repos/{}/{}/issues/{issue_number}/comments",
                repo.owner, repo.name
            )
            .as_str(),
        )?)
    }

    /// Execute a request and reject any non-success response.
    pub(super) async fn send(&self, task: &str, request: Request) -> Result<Response, ClientError> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ClientError::Request(e).add_request_context(task))?;
        check_response(response, task).await
    }

    /// Send a comment body with the given `method` and decode the resulting comment.
    pub(super) async fn send_comment(
        &self,
        url: Url,
        method: Method,
        body: &str,
        task: &str,
    ) -> Result<Comment, ClientError> {
        let payload = serde_json::to_string(&CommentPayload { body })
            .map_err(|e| ClientError::json("serialize comment payload", e))?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let request =
            Self::make_api_request(&self.client, url, method, Some(payload), Some(headers))?;
        let response = self.send(task, request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Request(e).add_request_context(task))?;
        let comment = serde_json::from_str::<ThreadComment>(&text)
            .map_err(|e| ClientError::json("deserialize posted comment", e))?;
        log::debug!(
            "Comment id {} is authored by {} ({})",
            comment.id,
            comment.user.login,
            comment.user.id,
        );
        Ok(Comment::from(comment))
    }
}
