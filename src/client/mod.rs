//! A module to contain traits and structs that describe the issue tracker's comment API.
use crate::{Repository, error::ClientError};
use async_trait::async_trait;
use reqwest::{
    Client, IntoUrl, Method, Request, Response, Url,
    header::{HeaderMap, HeaderValue},
};
use serde::Deserialize;

mod github;
pub use github::GithubApiClient;

/// The User-Agent header value included in all HTTP requests.
pub static USER_AGENT: &str = concat!(env!("CARGO_CRATE_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The kind of account that authored a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorKind {
    /// A bot or service identity (eg. `github-actions[bot]`).
    Bot,
    /// Any other account.
    Human,
}

/// A comment on an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// The comment's ID number.
    pub id: u64,
    /// Who wrote the comment.
    pub author_kind: AuthorKind,
    /// The comment's Markdown content.
    pub body: String,
    /// A link to the comment in the web UI.
    pub html_url: String,
}

/// A custom trait that templates the issue-comment operations of a Git server's REST API.
#[async_trait]
pub trait RestApiClient: Send + Sync {
    /// This prints a line to indicate the beginning of a related group of log statements.
    fn start_log_group(&self, name: &str);

    /// This prints a line to indicate the ending of a related group of log statements.
    fn end_log_group(&self);

    /// Get every comment on the given issue, in the order the server returns them.
    async fn list_comments(
        &self,
        repo: &Repository,
        issue_number: u64,
    ) -> Result<Vec<Comment>, ClientError>;

    /// Post a new comment on the given issue.
    async fn create_comment(
        &self,
        repo: &Repository,
        issue_number: u64,
        body: &str,
    ) -> Result<Comment, ClientError>;

    /// Replace the body of an existing comment.
    async fn update_comment(
        &self,
        repo: &Repository,
        comment_id: u64,
        body: &str,
    ) -> Result<Comment, ClientError>;

    /// Construct a HTTP request to be sent.
    ///
    /// ```ignore
    /// let request = Self::make_api_request(
    ///     &self.client,
    ///     "https://example.com",
    ///     Method::GET,
    ///     None,
    ///     None,
    /// )?;
    /// let response = self.client.execute(request).await?;
    /// ```
    fn make_api_request(
        client: &Client,
        url: impl IntoUrl,
        method: Method,
        data: Option<String>,
        headers: Option<HeaderMap>,
    ) -> Result<Request, ClientError>
    where
        Self: Sized,
    {
        let mut req = client.request(method, url);
        if let Some(h) = headers {
            req = req.headers(h);
        }
        if let Some(d) = data {
            req = req.body(d);
        }
        req.build().map_err(ClientError::Request)
    }

    /// Gets the URL for the next page from the headers in a paginated response.
    ///
    /// Returns [`None`] if current response is the last page.
    fn try_next_page(headers: &HeaderMap) -> Option<Url>
    where
        Self: Sized,
    {
        if let Some(links) = headers.get("link")
            && let Ok(pg_str) = links.to_str()
        {
            let pages = pg_str.split(", ");
            for page in pages {
                if page.ends_with("; rel=\"next\"") {
                    if let Some(link) = page.split_once(">;") {
                        let url = link.0.trim_start_matches("<").to_string();
                        if let Ok(next) = Url::parse(&url) {
                            return Some(next);
                        } else {
                            log::debug!("Failed to parse next page link from response header");
                        }
                    } else {
                        log::debug!("Response header link for pagination is malformed");
                    }
                }
            }
        }
        None
    }
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Turn a non-success response into a [`ClientError::Status`].
///
/// The error carries the `message` field of the server's JSON error
/// document, or the raw response text if there is no such document.
pub(crate) async fn check_response(
    response: Response,
    task: &str,
) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response
        .text()
        .await
        .map_err(|e| ClientError::Request(e).add_request_context(task))?;
    let message = serde_json::from_str::<ErrorMessage>(&text)
        .map(|e| e.message)
        .unwrap_or(text);
    log::debug!("Failed to {task} ({status}): {message}");
    Err(ClientError::Status {
        task: task.to_string(),
        status,
        message,
    })
}

/// Build the default headers attached to every request.
///
/// If an authentication `token` is given, then it is sent as a sensitive `Authorization` header.
pub(crate) fn make_headers(token: Option<&str>) -> Result<HeaderMap<HeaderValue>, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "Accept",
        HeaderValue::from_str("application/vnd.github.raw+json")?,
    );
    if let Some(token) = token {
        let mut val = HeaderValue::from_str(format!("token {token}").as_str())?;
        val.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, val);
    } else {
        log::warn!(
            "No GitHub token was given! Permission to post comments may be unsatisfied."
        );
    }
    Ok(headers)
}
