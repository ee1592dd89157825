use std::{
    env,
    fmt::Display,
    fs::OpenOptions,
    io::Write,
    path::Path,
};

use crate::{
    CommentRef,
    error::{OutputVariableError, WriteOutputError},
};

/// A type to represent a step output variable.
///
/// This is akin to the key/value pairs used in most
/// config file formats but with some limitations:
///
/// - Both [OutputVariable::name] and [OutputVariable::value] must be UTF-8 encoded.
/// - The [OutputVariable::value] cannot span multiple lines.
#[derive(Debug, Clone)]
pub struct OutputVariable {
    /// The output variable's name.
    pub name: String,

    /// The output variable's value.
    pub value: String,
}

impl OutputVariable {
    /// Validate that the output variable is well-formed.
    pub fn validate(&self) -> Result<(), OutputVariableError> {
        if self.name.is_empty() {
            return Err(OutputVariableError::NameIsEmpty);
        }
        if self.name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(OutputVariableError::NameStartsWithNumber(self.name.clone()));
        }
        if self.value.contains('\n') {
            return Err(OutputVariableError::MultilineValue(self.value.clone()));
        }
        Ok(())
    }

    /// The output variables that describe an upserted comment.
    pub fn from_comment(comment: &CommentRef) -> [Self; 2] {
        [
            Self {
                name: "comment_id".to_string(),
                value: comment.id.to_string(),
            },
            Self {
                name: "comment_action".to_string(),
                value: comment.action.to_string(),
            },
        ]
    }
}

impl Display for OutputVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Append the given `vars` to the file at `path`.
///
/// Every variable is validated before anything is written.
pub fn write_output_variables_to(
    path: &Path,
    vars: &[OutputVariable],
) -> Result<(), WriteOutputError> {
    for out_var in vars {
        out_var.validate()?;
    }
    let mut out_file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|source| WriteOutputError::Io {
            task: "open GITHUB_OUTPUT file",
            source,
        })?;
    for out_var in vars {
        writeln!(&mut out_file, "{out_var}").map_err(|source| WriteOutputError::Io {
            task: "write to GITHUB_OUTPUT file",
            source,
        })?;
    }
    Ok(())
}

/// Append the given `vars` to the file named by the `GITHUB_OUTPUT` environment variable.
///
/// Outside of a CI runner (where `GITHUB_OUTPUT` is unset) this only logs the variables.
pub fn write_output_variables(vars: &[OutputVariable]) -> Result<(), WriteOutputError> {
    if vars.is_empty() {
        return Ok(());
    }
    match env::var("GITHUB_OUTPUT") {
        Ok(gh_out) if !gh_out.is_empty() => write_output_variables_to(Path::new(&gh_out), vars),
        _ => {
            for out_var in vars {
                log::debug!("GITHUB_OUTPUT is not set; skipped output variable {out_var}");
            }
            Ok(())
        }
    }
}
