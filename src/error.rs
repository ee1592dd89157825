//! Error types used across the tf-plan-comment crate.
use reqwest::StatusCode;
use thiserror::Error;

/// The possible errors emitted when validating an [`OutputVariable`](crate::OutputVariable).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OutputVariableError {
    /// The output variable's name is empty.
    #[error("The output variable's name is empty")]
    NameIsEmpty,
    /// The output variable's name starts with a number.
    #[error("The output variable's name starts with a number: '{0}'")]
    NameStartsWithNumber(String),
    /// The output variable's value spans multiple lines.
    #[error("The output variable's value spans multiple lines: '{0}'")]
    MultilineValue(String),
}

/// The reasons writing output variables can fail.
#[derive(Debug, Error)]
pub enum WriteOutputError {
    /// A variable failed [`OutputVariable::validate()`](crate::OutputVariable::validate).
    #[error("OutputVariable is malformed: {0}")]
    Malformed(#[from] OutputVariableError),

    /// Errors related to standard I/O.
    #[error("Failed to {task}: {source}")]
    Io {
        task: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Errors detected before any request is sent to the issue tracker.
#[derive(Debug, Error)]
pub enum InputError {
    /// A required input was not supplied (or was blank).
    #[error("Input required and not supplied: {0}")]
    Missing(String),

    /// Error emitted when failing to read environment variable
    #[error("Failed to get env var '{name}': {source}")]
    EnvVar {
        name: String,
        #[source]
        source: std::env::VarError,
    },

    /// Errors related to standard I/O.
    #[error("Failed to {task}: {source}")]
    Io {
        task: String,
        #[source]
        source: std::io::Error,
    },

    /// Error emitted when deserializing the event payload.
    #[error("Failed to {task}: {source}")]
    Json {
        task: String,
        #[source]
        source: serde_json::Error,
    },

    /// The repository slug is not in `owner/name` form.
    #[error("Repository is not in 'owner/name' form: '{0}'")]
    InvalidRepository(String),

    /// The issue number input is not a positive integer.
    #[error("Issue number is not a positive integer: '{0}'")]
    InvalidIssueNumber(String),

    /// The event payload does not describe an issue or pull request.
    #[error("Could not determine an issue or pull request number for this event")]
    NoIssueNumber,

    /// The API base URL could not be parsed.
    #[error("Failed to parse URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl InputError {
    /// Helper function to create an [`Self::EnvVar`] error with variable name and source error.
    pub fn env_var(name: &str, source: std::env::VarError) -> Self {
        Self::EnvVar {
            name: name.to_string(),
            source,
        }
    }

    /// Helper function to create an [`Self::Io`] error with task context.
    pub fn io(task: &str, source: std::io::Error) -> Self {
        Self::Io {
            task: task.to_string(),
            source,
        }
    }

    /// Helper function to create a [`Self::Json`] error with task context.
    pub fn json(task: &str, source: serde_json::Error) -> Self {
        Self::Json {
            task: task.to_string(),
            source,
        }
    }
}

/// The possible error emitted by the REST client API
#[derive(Debug, Error)]
pub enum ClientError {
    /// Error related to making HTTP requests
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// Error related to making HTTP requests, with additional context about the request that caused the error.
    #[error("Failed to {task}: {source}")]
    RequestContext {
        task: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Failed to {task}: {status}: {message}")]
    Status {
        task: String,
        status: StatusCode,
        message: String,
    },

    /// Error emitted when creating header value fails.
    #[error("Tried to create a header value from invalid string data")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    /// Error emitted when parsing a URL fails.
    #[error("Failed to parse URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Error emitted when deserializing/serializing request/response JSON data.
    #[error("Failed to {task}: {source}")]
    Json {
        task: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Builder function to add context to [`Self::Request`] errors.
    ///
    /// Returns a [`Self::RequestContext`] error if `self` is a [`Self::Request`] error.
    /// Otherwise, returns `self` unchanged.
    pub fn add_request_context(self, task: &str) -> Self {
        match self {
            Self::Request(e) => Self::RequestContext {
                task: task.to_string(),
                source: e,
            },
            _ => self,
        }
    }

    /// Helper function to create a [`Self::Json`] error with task context.
    pub fn json(task: &str, source: serde_json::Error) -> Self {
        Self::Json {
            task: task.to_string(),
            source,
        }
    }

    /// The HTTP status reported by the server, if the failure came with one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) | Self::RequestContext { source: e, .. } => e.status(),
            _ => None,
        }
    }
}

/// The error returned by [`upsert_comment()`](crate::upsert_comment).
#[derive(Debug, Error)]
pub enum UpsertError {
    /// Failure detected before touching the issue tracker.
    #[error(transparent)]
    Input(#[from] InputError),

    /// Failure while listing, creating, or updating comments.
    #[error(transparent)]
    Api(#[from] ClientError),
}

impl UpsertError {
    /// A one-line description of when the failure happened.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Input(_) => "Error occurred before trying to add pull request comment",
            Self::Api(_) => "Error occurred while trying to add pull request comment",
        }
    }
}
