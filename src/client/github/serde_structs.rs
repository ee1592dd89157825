//! This submodule declares data structures used to
//! deserialize (and serialize) JSON payload data.

use serde::{Deserialize, Serialize};

use crate::client::{AuthorKind, Comment};

/// A structure for deserializing a comment from a response's json.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ThreadComment {
    /// The comment's ID number.
    pub id: u64,
    /// The comment's body.
    ///
    /// GitHub omits this for some comment kinds.
    #[serde(default)]
    pub body: Option<String>,
    /// The comment's author.
    pub user: User,
    #[serde(default)]
    pub html_url: String,
}

/// A structure for deserializing a comment's author from a response's json.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct User {
    pub login: String,
    pub id: u64,
    /// The account type: `User`, `Organization`, or `Bot`.
    #[serde(rename = "type")]
    pub account_type: String,
}

impl From<ThreadComment> for Comment {
    fn from(comment: ThreadComment) -> Self {
        Self {
            id: comment.id,
            author_kind: if comment.user.account_type == "Bot" {
                AuthorKind::Bot
            } else {
                AuthorKind::Human
            },
            body: comment.body.unwrap_or_default(),
            html_url: comment.html_url,
        }
    }
}

/// The payload used to create or update a comment.
#[derive(Debug, Serialize)]
pub struct CommentPayload<'a> {
    pub body: &'a str,
}
