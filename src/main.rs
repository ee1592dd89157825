use std::process::ExitCode;

use clap::Parser;
use tf_plan_comment::{
    Context, GithubApiClient, Greeting, InputError, MessageBuilder, OutputVariable,
    RestApiClient, TerraformReport, UpsertError, logger, upsert_comment, write_output_variables,
};

#[derive(Debug, Parser)]
#[command(
    name = "tf-plan-comment",
    about = "Post or update a Terraform plan summary comment on a Pull Request",
    version
)]
struct Cli {
    #[arg(
        long,
        env = "INPUT_NAME",
        help = "Identifier of the Terraform configuration (eg. an environment name)"
    )]
    name: Option<String>,

    #[arg(
        long = "message-body",
        env = "INPUT_MESSAGE_BODY",
        help = "Post a plain 'Thanks for contributing!' comment with this text instead of a plan report"
    )]
    message_body: Option<String>,

    #[arg(
        long = "github-token",
        env = "INPUT_GITHUB_TOKEN",
        hide_env_values = true,
        help = "Token used to authenticate. Falls back to the GITHUB_TOKEN environment variable"
    )]
    github_token: Option<String>,

    #[arg(long = "fmt-outcome", env = "INPUT_FMT_OUTCOME")]
    fmt_outcome: Option<String>,

    #[arg(long = "init-outcome", env = "INPUT_INIT_OUTCOME")]
    init_outcome: Option<String>,

    #[arg(long = "validate-outcome", env = "INPUT_VALIDATE_OUTCOME")]
    validate_outcome: Option<String>,

    #[arg(long = "validate-output", env = "INPUT_VALIDATE_OUTPUT")]
    validate_output: Option<String>,

    #[arg(long = "plan-outcome", env = "INPUT_PLAN_OUTCOME")]
    plan_outcome: Option<String>,

    #[arg(
        long,
        env = "INPUT_PLAN",
        help = "The plan text. Falls back to the PLAN environment variable"
    )]
    plan: Option<String>,

    #[arg(long = "working-directory", env = "INPUT_WORKING_DIRECTORY")]
    working_directory: Option<String>,

    #[arg(
        long = "issue-number",
        env = "INPUT_ISSUE_NUMBER",
        help = "Comment on this issue instead of the one named by the event payload"
    )]
    issue_number: Option<String>,
}

/// Actions sets every declared-but-unset input to an empty string.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The explicit input wins over the `GITHUB_TOKEN` environment variable.
fn github_token(cli_token: Option<String>, env_token: Option<String>) -> Option<String> {
    non_empty(cli_token).or_else(|| non_empty(env_token))
}

fn parse_issue_number(raw: Option<String>) -> Result<Option<u64>, InputError> {
    non_empty(raw)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| InputError::InvalidIssueNumber(raw.clone()))
        })
        .transpose()
}

/// Pick the message from the inputs: `name` selects the Terraform report,
/// otherwise `message_body` selects the greeting.
///
/// `plan_env` is the value of the `PLAN` environment variable, used when no plan input is given.
fn select_builder(
    cli: &Cli,
    plan_env: Option<String>,
) -> Result<(String, Box<dyn MessageBuilder>), InputError> {
    match (non_empty(cli.name.clone()), non_empty(cli.message_body.clone())) {
        (Some(name), _) => {
            log::info!("Input passed for plan comment name: {name}");
            let report = TerraformReport {
                fmt_outcome: non_empty(cli.fmt_outcome.clone()),
                init_outcome: non_empty(cli.init_outcome.clone()),
                validate_outcome: non_empty(cli.validate_outcome.clone()),
                validate_output: non_empty(cli.validate_output.clone()).unwrap_or_default(),
                plan_outcome: non_empty(cli.plan_outcome.clone()),
                plan: non_empty(cli.plan.clone())
                    .or_else(|| non_empty(plan_env))
                    .unwrap_or_default(),
                working_directory: non_empty(cli.working_directory.clone())
                    .unwrap_or(String::from(".")),
            };
            Ok((name, Box::new(report) as Box<dyn MessageBuilder>))
        }
        (None, Some(body)) => {
            log::info!("Input passed for pull request message body: {body}");
            Ok((body, Box::new(Greeting) as Box<dyn MessageBuilder>))
        }
        (None, None) => Err(InputError::Missing(String::from("name or message_body"))),
    }
}

async fn run(cli: Cli) -> Result<(), UpsertError> {
    // fail on missing inputs before the environment is even inspected
    let (identifier, builder) = select_builder(&cli, std::env::var("PLAN").ok())?;
    let issue_number = parse_issue_number(cli.issue_number.clone())?;
    let context = Context::from_env(issue_number)?;
    let token = github_token(cli.github_token, std::env::var("GITHUB_TOKEN").ok());
    let client = GithubApiClient::new(context.api_url.clone(), token.as_deref())?;

    client.start_log_group("Logging github context");
    match serde_json::to_string_pretty(&context) {
        Ok(json) => log::info!("{json}"),
        Err(e) => log::debug!("Failed to serialize github context: {e}"),
    }
    client.end_log_group();
    log::info!("Actor:  {}", context.actor);
    log::info!("Action: {}", context.event_name);
    log::info!("Workflow: {}", context.workflow);

    let comment = upsert_comment(&client, &identifier, &context, builder.as_ref()).await?;
    if let Err(e) = write_output_variables(&OutputVariable::from_comment(&comment)) {
        log::warn!("{e}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    logger::init(logger::level_from_env());
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e.stage());
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, github_token, parse_issue_number, select_builder};
    use clap::{CommandFactory, Parser};
    use tf_plan_comment::{Context, InputError, MessageBuilder, Repository};

    fn parse_args(args: &[&str]) -> Cli {
        let argv = std::iter::once("tf-plan-comment").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn name_selects_report() {
        let cli = parse_args(&["--name", "staging", "--message-body", "Welcome aboard."]);
        let (identifier, builder) = select_builder(&cli, None).unwrap();
        assert_eq!(identifier, "staging");
        assert_eq!(builder.input_name(), "name");
        assert_eq!(builder.marker(&identifier), "Terraform Plan For `staging`");
    }

    #[test]
    fn message_body_selects_greeting() {
        let cli = parse_args(&["--message-body", "Welcome aboard."]);
        let (identifier, builder) = select_builder(&cli, None).unwrap();
        assert_eq!(identifier, "Welcome aboard.");
        assert_eq!(builder.input_name(), "message_body");
    }

    #[test]
    fn empty_inputs_are_absent() {
        let cli = parse_args(&["--name", "  ", "--message-body", "Welcome aboard."]);
        let (_, builder) = select_builder(&cli, None).unwrap();
        assert_eq!(builder.input_name(), "message_body");

        let cli = parse_args(&["--name", "", "--message-body", ""]);
        let err = select_builder(&cli, None).err().unwrap();
        assert!(matches!(&err, InputError::Missing(name) if name == "name or message_body"));
        assert_eq!(
            err.to_string(),
            "Input required and not supplied: name or message_body"
        );
    }

    #[test]
    fn plan_env_fallback() {
        let context = Context {
            repo: Repository {
                owner: "octo".to_string(),
                name: "infra".to_string(),
            },
            issue_number: 1,
            actor: "hubot".to_string(),
            event_name: "pull_request".to_string(),
            workflow: "terraform".to_string(),
            sha: "deadbeef".to_string(),
            git_ref: "refs/pull/1/merge".to_string(),
            api_url: reqwest::Url::parse("https://api.github.com/").unwrap(),
        };

        let (id, builder) =
            select_builder(&parse_args(&["--name", "dev"]), Some("from env".into())).unwrap();
        let body = builder.mark_comment(&id, &context);
        assert!(body.contains("```\n\nfrom env\n```"));
        assert!(body.contains("Working Directory: `.`"));

        let (id, builder) = select_builder(
            &parse_args(&["--name", "dev", "--plan", "from input"]),
            Some("from env".into()),
        )
        .unwrap();
        let body = builder.mark_comment(&id, &context);
        assert!(body.contains("from input"));
        assert!(!body.contains("from env"));

        let (id, builder) = select_builder(
            &parse_args(&["--name", "dev", "--plan", ""]),
            Some("from env".into()),
        )
        .unwrap();
        assert!(builder.mark_comment(&id, &context).contains("from env"));
    }

    #[test]
    fn token_precedence() {
        assert_eq!(
            github_token(Some("input".into()), Some("env".into())).as_deref(),
            Some("input")
        );
        assert_eq!(
            github_token(Some(" ".into()), Some("env".into())).as_deref(),
            Some("env")
        );
        assert_eq!(github_token(None, Some("env".into())).as_deref(), Some("env"));
        assert_eq!(github_token(None, Some(String::new())), None);
        assert_eq!(github_token(None, None), None);
    }

    #[test]
    fn issue_number() {
        assert_eq!(parse_issue_number(None).unwrap(), None);
        assert_eq!(parse_issue_number(Some(String::new())).unwrap(), None);
        assert_eq!(parse_issue_number(Some(" 42 ".into())).unwrap(), Some(42));
        let err = parse_issue_number(Some("#42".into())).unwrap_err();
        assert!(matches!(&err, InputError::InvalidIssueNumber(raw) if raw == "#42"));
    }
}
