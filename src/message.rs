//! Pure rendering of the comment bodies posted by this step.
use crate::Context;

/// The maximum number of characters GitHub accepts in a comment body.
pub const MAX_COMMENT_LENGTH: usize = 65536;

const TRUNCATED_NOTICE: &str = "... (output truncated to fit the comment size limit)\n";

/// Builds a comment body, and the marker that identifies it later, from an identifier.
///
/// Implementations should be pure: the same identifier and [`Context`]
/// shall always render the same text.
pub trait MessageBuilder {
    /// The name of the input that supplies the identifier.
    ///
    /// This is only used to describe a missing identifier.
    fn input_name(&self) -> &'static str;

    /// The stable substring used to recognize a previously posted comment.
    fn marker(&self, identifier: &str) -> String;

    /// Render the full comment body.
    ///
    /// The result should contain [`Self::marker()`]. If it does not,
    /// [`MessageBuilder::mark_comment()`] prepends the marker.
    fn render(&self, identifier: &str, context: &Context) -> String;

    /// Render the body and make sure it carries the marker.
    fn mark_comment(&self, identifier: &str, context: &Context) -> String {
        let marker = self.marker(identifier);
        let body = self.render(identifier, context);
        if !body.contains(&marker) {
            return format!("{marker}\n{body}");
        }
        body
    }
}

/// The Markdown report of a Terraform fmt/init/validate/plan run.
///
/// Every outcome is the `outcome` of the matching workflow step
/// (`success`, `failure`, `cancelled`, or `skipped`).
#[derive(Debug, Default, Clone)]
pub struct TerraformReport {
    pub fmt_outcome: Option<String>,
    pub init_outcome: Option<String>,
    pub validate_outcome: Option<String>,
    pub validate_output: String,
    pub plan_outcome: Option<String>,
    /// The plan text. It is reproduced verbatim, minus any truncation.
    pub plan: String,
    pub working_directory: String,
}

impl TerraformReport {
    fn outcome(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or("skipped")
    }

    fn template(
        &self,
        identifier: &str,
        context: &Context,
        validate_output: &str,
        plan: &str,
    ) -> String {
        format!(
            "### {marker}

#### Terraform Format and Style 🖌`{fmt}`
#### Terraform Initialization ⚙️`{init}`
#### Terraform Validation 🤖`{validate}`
<details><summary>Validation Output</summary>

```\n
{validate_output}
```

</details>

#### Terraform Plan 📖`{plan_outcome}`

<details><summary>Show Plan</summary>

```\n
{plan}
```

</details>

*Pusher: @{actor}, Action: `{event}`, Working Directory: `{dir}`, Workflow: `{workflow}`*",
            marker = self.marker(identifier),
            fmt = Self::outcome(&self.fmt_outcome),
            init = Self::outcome(&self.init_outcome),
            validate = Self::outcome(&self.validate_outcome),
            plan_outcome = Self::outcome(&self.plan_outcome),
            actor = context.actor,
            event = context.event_name,
            dir = self.working_directory,
            workflow = context.workflow,
        )
    }
}

impl MessageBuilder for TerraformReport {
    fn input_name(&self) -> &'static str {
        "name"
    }

    fn marker(&self, identifier: &str) -> String {
        format!("Terraform Plan For `{identifier}`")
    }

    fn render(&self, identifier: &str, context: &Context) -> String {
        let frame_len = self.template(identifier, context, "", "").chars().count();
        let budget = MAX_COMMENT_LENGTH.saturating_sub(frame_len);
        // the validate output may take at least half of the budget, the plan gets the rest
        let plan_len = self.plan.chars().count();
        let validate_budget = budget.saturating_sub(plan_len).max(budget / 2);
        let validate_output = truncate_head(&self.validate_output, validate_budget);
        let plan_budget = budget - validate_output.chars().count();
        let plan = truncate_head(&self.plan, plan_budget);
        let body = self.template(identifier, context, &validate_output, &plan);
        if frame_len > MAX_COMMENT_LENGTH {
            // the marker leads the body, so cutting the tail keeps it recognizable
            return body.chars().take(MAX_COMMENT_LENGTH).collect();
        }
        body
    }
}

/// The plain "thank you" comment posted for contributions.
///
/// The whole message body serves as the identifier. It is also embedded in a
/// hidden HTML comment, so that one body never matches a comment posted for a longer one.
#[derive(Debug, Default, Clone, Copy)]
pub struct Greeting;

impl MessageBuilder for Greeting {
    fn input_name(&self) -> &'static str {
        "message_body"
    }

    fn marker(&self, identifier: &str) -> String {
        format!("<!-- tf-plan-comment:{identifier} -->")
    }

    fn render(&self, identifier: &str, _context: &Context) -> String {
        format!(
            "{}\nThanks for contributing! {identifier}",
            self.marker(identifier)
        )
    }
}

/// Drop leading characters of `text` so that it fits in `max_chars`.
///
/// The tail is kept because Terraform prints its change summary last.
/// If not even the truncation notice fits, nothing is kept.
fn truncate_head(text: &str, max_chars: usize) -> String {
    let len = text.chars().count();
    if len <= max_chars {
        return text.to_string();
    }
    let notice_len = TRUNCATED_NOTICE.chars().count();
    if max_chars < notice_len {
        return String::new();
    }
    let keep = max_chars - notice_len;
    let tail: String = text.chars().skip(len - keep).collect();
    format!("{TRUNCATED_NOTICE}{tail}")
}
