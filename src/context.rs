//! The immutable run metadata supplied by the CI runner.

use std::{env, fmt::Display, fs};

use reqwest::Url;
use serde::Serialize;

use crate::error::InputError;

type EventPayloadType = serde_json::Map<String, serde_json::Value>;

const DEFAULT_API_URL: &str = "https://api.github.com";

/// A repository's owner and name, as parsed from an `owner/name` slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    /// Parse a `owner/name` slug (the format of `GITHUB_REPOSITORY`).
    pub fn parse(slug: &str) -> Result<Self, InputError> {
        match slug.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(InputError::InvalidRepository(slug.to_string())),
        }
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Metadata about the workflow run that triggered this step.
///
/// Built once at start-up and never mutated afterward.
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    /// The repository being worked on.
    pub repo: Repository,

    /// The issue (or pull request) that receives the comment.
    pub issue_number: u64,

    /// The login of the user that triggered the workflow.
    pub actor: String,

    /// The name of the webhook event that triggered the workflow.
    pub event_name: String,

    /// The name of the workflow.
    pub workflow: String,

    /// The commit SHA that triggered the workflow.
    pub sha: String,

    /// The git ref that triggered the workflow.
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// The base URL of the REST API.
    pub api_url: Url,
}

impl Context {
    /// Build a [`Context`] from the `GITHUB_*` environment variables.
    ///
    /// `issue_number` takes precedence over any number found in the event payload.
    pub fn from_env(issue_number: Option<u64>) -> Result<Self, InputError> {
        Self::from_vars(|name| env::var(name).ok(), issue_number)
    }

    /// Build a [`Context`] from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F, issue_number: Option<u64>) -> Result<Self, InputError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| InputError::env_var(name, env::VarError::NotPresent))
        };

        let repo = Repository::parse(&required("GITHUB_REPOSITORY")?)?;
        let issue_number = match issue_number {
            Some(number) => number,
            None => {
                // the payload file can be overwritten/removed in CI runners
                let payload_path = required("GITHUB_EVENT_PATH")?;
                let file_buf = fs::read_to_string(&payload_path).map_err(|e| {
                    InputError::io(&format!("read event payload from {payload_path}"), e)
                })?;
                let payload = serde_json::from_str::<EventPayloadType>(&file_buf)
                    .map_err(|e| InputError::json("deserialize event payload", e))?;
                issue_number_from_payload(&payload).ok_or(InputError::NoIssueNumber)?
            }
        };
        let api_url = var("GITHUB_API_URL").unwrap_or(DEFAULT_API_URL.to_string());

        Ok(Self {
            repo,
            issue_number,
            actor: var("GITHUB_ACTOR").unwrap_or_default(),
            event_name: var("GITHUB_EVENT_NAME").unwrap_or(String::from("unknown")),
            workflow: var("GITHUB_WORKFLOW").unwrap_or_default(),
            sha: var("GITHUB_SHA").unwrap_or_default(),
            git_ref: var("GITHUB_REF").unwrap_or_default(),
            api_url: parse_api_url(&api_url)?,
        })
    }
}

/// Parse the API base URL, making sure relative joins keep any path prefix
/// (as used by GitHub Enterprise's `https://host/api/v3`).
pub(crate) fn parse_api_url(raw: &str) -> Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}

/// Find the issue number the way the event kinds nest it:
/// `issue.number`, then `pull_request.number`, then a top-level `number`.
fn issue_number_from_payload(payload: &EventPayloadType) -> Option<u64> {
    ["issue", "pull_request"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(|v| v.get("number")))
        .or_else(|| payload.get("number"))
        .and_then(|v| v.as_u64())
}

#[cfg(test)]
mod tests {
    use super::{Context, Repository, issue_number_from_payload, parse_api_url};
    use crate::error::InputError;
    use std::{collections::HashMap, io::Write};
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn repo_slug() {
        let repo = Repository::parse("octo/infra").unwrap();
        assert_eq!(repo.owner, "octo");
        assert_eq!(repo.name, "infra");
        assert_eq!(repo.to_string(), "octo/infra");
        for bad in ["", "octo", "/infra", "octo/", "a/b/c"] {
            assert!(matches!(
                Repository::parse(bad),
                Err(InputError::InvalidRepository(_))
            ));
        }
    }

    #[test]
    fn payload_number_lookup() {
        let issue: super::EventPayloadType =
            serde_json::from_str(r#"{"number": 1, "issue": {"number": 3}}"#).unwrap();
        assert_eq!(issue_number_from_payload(&issue), Some(3));
        let pr: super::EventPayloadType =
            serde_json::from_str(r#"{"number": 5, "pull_request": {"number": 5}}"#).unwrap();
        assert_eq!(issue_number_from_payload(&pr), Some(5));
        let push: super::EventPayloadType =
            serde_json::from_str(r#"{"ref": "refs/heads/main"}"#).unwrap();
        assert_eq!(issue_number_from_payload(&push), None);
    }

    #[test]
    fn from_event_payload() {
        let mut payload = NamedTempFile::new().unwrap();
        payload
            .write_all(br#"{"pull_request": {"number": 42}}"#)
            .unwrap();
        let env = vars(&[
            ("GITHUB_REPOSITORY", "octo/infra"),
            ("GITHUB_EVENT_PATH", payload.path().to_str().unwrap()),
            ("GITHUB_ACTOR", "hubot"),
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_WORKFLOW", "terraform"),
            ("GITHUB_API_URL", ""),
        ]);
        let ctx = Context::from_vars(|name| env.get(name).cloned(), None).unwrap();
        assert_eq!(ctx.issue_number, 42);
        assert_eq!(ctx.actor, "hubot");
        assert_eq!(ctx.event_name, "pull_request");
        assert_eq!(ctx.workflow, "terraform");
        assert_eq!(ctx.api_url.as_str(), "https://api.github.com/");
    }

    #[test]
    fn explicit_issue_number_skips_payload() {
        let env = vars(&[("GITHUB_REPOSITORY", "octo/infra")]);
        let ctx = Context::from_vars(|name| env.get(name).cloned(), Some(9)).unwrap();
        assert_eq!(ctx.issue_number, 9);
        assert_eq!(ctx.event_name, "unknown");
    }

    #[test]
    fn missing_environment() {
        let env = vars(&[]);
        assert!(matches!(
            Context::from_vars(|name| env.get(name).cloned(), Some(1)),
            Err(InputError::EnvVar { name, .. }) if name == "GITHUB_REPOSITORY"
        ));

        let env = vars(&[
            ("GITHUB_REPOSITORY", "octo/infra"),
            ("GITHUB_EVENT_PATH", "not-a-file.json"),
        ]);
        assert!(matches!(
            Context::from_vars(|name| env.get(name).cloned(), None),
            Err(InputError::Io { .. })
        ));
    }

    #[test]
    fn push_event_has_no_number() {
        let mut payload = NamedTempFile::new().unwrap();
        payload.write_all(br#"{"ref": "refs/heads/main"}"#).unwrap();
        let env = vars(&[
            ("GITHUB_REPOSITORY", "octo/infra"),
            ("GITHUB_EVENT_PATH", payload.path().to_str().unwrap()),
        ]);
        assert!(matches!(
            Context::from_vars(|name| env.get(name).cloned(), None),
            Err(InputError::NoIssueNumber)
        ));
    }

    #[test]
    fn enterprise_api_url_keeps_prefix() {
        let url = parse_api_url("https://ghe.example.com/api/v3").unwrap();
        assert_eq!(
            url.join("repos/o/r").unwrap().as_str(),
            "https://ghe.example.com/api/v3/repos/o/r"
        );
    }
}
