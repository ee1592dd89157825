//! Create-or-update of the single bot comment that belongs to an identifier.
use std::fmt::Display;

use crate::{
    Context, MessageBuilder,
    client::{AuthorKind, Comment, RestApiClient},
    error::{InputError, UpsertError},
};

/// What [`upsert_comment()`] did to the issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    /// No previous bot comment matched; a new one was posted.
    Created,
    /// A previous bot comment was overwritten.
    Updated,
}

impl Display for UpsertAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
        }
    }
}

/// A reference to the comment that was created or updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRef {
    pub id: u64,
    pub html_url: String,
    pub action: UpsertAction,
}

/// Find the bot comment that carries `marker`.
///
/// Comments are scanned in the given order and the first match wins.
/// GitHub lists issue comments oldest first, so the oldest match is the canonical one.
pub fn find_bot_comment<'a>(comments: &'a [Comment], marker: &str) -> Option<&'a Comment> {
    comments
        .iter()
        .find(|c| c.author_kind == AuthorKind::Bot && c.body.contains(marker))
}

/// Post the message rendered for `identifier`, or overwrite the bot comment posted for it before.
///
/// A blank `identifier` fails with [`InputError::Missing`] before any request is sent.
/// Otherwise, this lists the comments on [`Context::issue_number`] once, then either
/// updates the first matching bot comment or creates a new comment.
///
/// Concurrent runs against the same issue are not serialized; two runs that both
/// list comments before either posts will each create a comment.
pub async fn upsert_comment<C, M>(
    client: &C,
    identifier: &str,
    context: &Context,
    builder: &M,
) -> Result<CommentRef, UpsertError>
where
    C: RestApiClient + ?Sized,
    M: MessageBuilder + ?Sized,
{
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(InputError::Missing(builder.input_name().to_string()).into());
    }
    let marker = builder.marker(identifier);
    let body = builder.mark_comment(identifier, context);

    let comments = client
        .list_comments(&context.repo, context.issue_number)
        .await?;
    let comment = match find_bot_comment(&comments, &marker) {
        Some(existing) => {
            log::info!("Updating existing comment {}", existing.id);
            let comment = client
                .update_comment(&context.repo, existing.id, &body)
                .await?;
            CommentRef {
                id: comment.id,
                html_url: comment.html_url,
                action: UpsertAction::Updated,
            }
        }
        None => {
            log::info!("No previous comment matched {marker:?}; creating a new one");
            let comment = client
                .create_comment(&context.repo, context.issue_number, &body)
                .await?;
            CommentRef {
                id: comment.id,
                html_url: comment.html_url,
                action: UpsertAction::Created,
            }
        }
    };
    log::info!("Comment {} {}: {}", comment.id, comment.action, comment.html_url);
    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::find_bot_comment;
    use crate::{
        Greeting, MessageBuilder,
        client::{AuthorKind, Comment},
    };

    fn comment(id: u64, author_kind: AuthorKind, body: &str) -> Comment {
        Comment {
            id,
            author_kind,
            body: body.to_string(),
            html_url: String::new(),
        }
    }

    #[test]
    fn first_bot_match_wins() {
        let marker = "Terraform Plan For `staging`";
        let comments = [
            comment(1, AuthorKind::Human, "Terraform Plan For `staging` looks off"),
            comment(2, AuthorKind::Bot, "Terraform Plan For `prod`"),
            comment(3, AuthorKind::Bot, "### Terraform Plan For `staging`\n..."),
            comment(4, AuthorKind::Bot, "### Terraform Plan For `staging`\n..."),
        ];
        assert_eq!(find_bot_comment(&comments, marker).map(|c| c.id), Some(3));
    }

    #[test]
    fn no_match() {
        let marker = "Terraform Plan For `staging`";
        let comments = [
            comment(1, AuthorKind::Human, "### Terraform Plan For `staging`"),
            comment(2, AuthorKind::Bot, "### Terraform Plan For `staging-eu`"),
        ];
        assert!(find_bot_comment(&comments, marker).is_none());
        assert!(find_bot_comment(&[], marker).is_none());
    }

    #[test]
    fn greeting_prefix_does_not_match() {
        let comments = [comment(
            1,
            AuthorKind::Bot,
            "<!-- tf-plan-comment:foo bar -->\nThanks for contributing! foo bar",
        )];
        assert!(find_bot_comment(&comments, &Greeting.marker("foo")).is_none());
        assert_eq!(
            find_bot_comment(&comments, &Greeting.marker("foo bar")).map(|c| c.id),
            Some(1)
        );
    }
}
