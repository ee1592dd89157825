use log::LevelFilter;
use tf_plan_comment::{Context, Repository, logger};

pub fn logger_init() {
    logger::init(LevelFilter::Debug);
}

#[allow(dead_code)]
pub fn context(api_url: &str) -> Context {
    Context {
        repo: Repository {
            owner: "octo".to_string(),
            name: "infra".to_string(),
        },
        issue_number: 22,
        actor: "hubot".to_string(),
        event_name: "pull_request".to_string(),
        workflow: "terraform".to_string(),
        sha: "deadbeef".to_string(),
        git_ref: "refs/pull/22/merge".to_string(),
        api_url: api_url.parse().unwrap(),
    }
}
