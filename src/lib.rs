#![doc = include_str!("../README.md")]
pub mod client;
pub mod context;
pub mod error;
pub mod logger;
mod message;
mod output_variable;
mod upsert;

pub use client::{AuthorKind, Comment, GithubApiClient, RestApiClient};
pub use context::{Context, Repository};
pub use error::{ClientError, InputError, UpsertError};
pub use message::{Greeting, MAX_COMMENT_LENGTH, MessageBuilder, TerraformReport};
pub use output_variable::{OutputVariable, write_output_variables, write_output_variables_to};
pub use upsert::{CommentRef, UpsertAction, find_bot_comment, upsert_comment};
