//! Execute bizspec commands against source text

use super::{CliError, token_table};
use crate::{RunOptions, output, parse_source, run_source, tokenize_source};

/// What to do with the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// List the tokens
    Tokens,
    /// Print the program tree
    Parse,
    /// Run every test and print the report
    Run {
        /// Report a failing expression against its test and continue
        keep_going: bool,
    },
    /// Only validate syntax
    Check,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Options for a command
#[derive(Debug, Clone)]
pub struct CommandOptions {
    pub command: Command,
    /// BizSpec source text
    pub source: String,
    pub format: OutputFormat,
}

/// Result of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Text to print on stdout
    pub output: String,
    /// False when a run had failing tests
    pub success: bool,
}

impl Execution {
    fn ok(output: String) -> Self {
        Execution {
            output,
            success: true,
        }
    }
}

fn json_text(value: &serde_json::Value) -> Result<String, CliError> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

/// Execute a bizspec command
pub fn execute(options: &CommandOptions) -> Result<Execution, CliError> {
    let source = &options.source;

    match options.command {
        Command::Tokens => {
            let tokens = tokenize_source(source)?;
            let output = match options.format {
                OutputFormat::Text => {
                    format!("{}\nTokens: {}\n", token_table(&tokens), tokens.len())
                }
                OutputFormat::Json => json_text(&output::tokens_to_json(&tokens))?,
            };
            Ok(Execution::ok(output))
        }
        Command::Parse => {
            let program = parse_source(source)?;
            let output = match options.format {
                OutputFormat::Text => output::render_tree(&program),
                OutputFormat::Json => json_text(&output::node_to_json(&program))?,
            };
            Ok(Execution::ok(output))
        }
        Command::Run { keep_going } => {
            let run_options = RunOptions {
                isolate_failures: keep_going,
            };
            let report = run_source(source, run_options)?;
            let output = match options.format {
                OutputFormat::Text => report.to_string(),
                OutputFormat::Json => json_text(&output::report_to_json(&report))?,
            };
            Ok(Execution {
                output,
                success: report.all_passed(),
            })
        }
        Command::Check => {
            parse_source(source)?;
            Ok(Execution::ok("Syntax is valid\n".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(command: Command, source: &str) -> CommandOptions {
        CommandOptions {
            command,
            source: source.to_string(),
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn check_reports_parse_errors() {
        let err = execute(&options(Command::Check, "test \"t\" {\n")).unwrap_err();
        assert!(err.to_string().contains("expected '}'"));
    }

    #[test]
    fn run_marks_failures() {
        let source = "test \"t\" {\n expect 1 == 2\n}\n";
        let result = execute(&options(Command::Run { keep_going: false }, source)).unwrap();
        assert!(!result.success);
        assert!(result.output.contains("Summary: 0 PASS, 1 FAIL"));
    }
}
