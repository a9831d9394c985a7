use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tagquery::{
    Expression, ExpressionParser, QueryConfig, Renderer, TagListParser, matches_with,
    referenced_tags,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Query configuration file (YAML or TOML)
    #[arg(short, long, env = "TAGQUERY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Evaluate an expression against a set of tags
    Match {
        expression: String,

        /// Tags of the item, comma-separated
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Print the canonical form of an expression
    Render { expression: String },
    /// Print the tag names an expression refers to
    Tags { expression: String },
    /// Split a space-separated tag list
    List { input: String },
}

/// What a command printed and whether it counts as success.
pub struct Outcome {
    pub lines: Vec<String>,
    pub success: bool,
}

impl Outcome {
    fn ok(lines: Vec<String>) -> Self {
        Outcome {
            lines,
            success: true,
        }
    }
}

pub fn load_config(cli: &Cli) -> Result<QueryConfig> {
    match &cli.config {
        Some(path) => QueryConfig::load(path),
        None => Ok(QueryConfig::default()),
    }
}

fn parse(config: &QueryConfig, expression: &str) -> Result<Expression> {
    ExpressionParser::new(config.parser)
        .parse(expression)
        .with_context(|| format!("Query: Failed to parse {expression:?}"))
}

pub fn run(command: &Command, config: &QueryConfig) -> Result<Outcome> {
    match command {
        Command::Match { expression, tags } => {
            let expr = parse(config, expression)?;
            let matched = matches_with(&expr, tags, config.matching);
            tracing::info!("{} tags, match: {}", tags.len(), matched);
            Ok(Outcome {
                lines: vec![matched.to_string()],
                success: matched,
            })
        }
        Command::Render { expression } => {
            let expr = parse(config, expression)?;
            Ok(Outcome::ok(vec![Renderer::new(&config.parser).render(&expr)]))
        }
        Command::Tags { expression } => {
            let expr = parse(config, expression)?;
            Ok(Outcome::ok(referenced_tags(&expr)))
        }
        Command::List { input } => {
            let tags = TagListParser::new(config.parser)
                .parse_as_vec(input)
                .with_context(|| format!("Query: Failed to parse tag list {input:?}"))?;
            Ok(Outcome::ok(tags))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_default(command: Command) -> Outcome {
        run(&command, &QueryConfig::default()).unwrap()
    }

    #[test]
    fn test_match_command() {
        let outcome = run_default(Command::Match {
            expression: "a AND NOT b".into(),
            tags: vec!["a".into()],
        });
        assert!(outcome.success);
        assert_eq!(outcome.lines, vec!["true"]);

        let outcome = run_default(Command::Match {
            expression: "a AND NOT b".into(),
            tags: vec!["a".into(), "b".into()],
        });
        assert!(!outcome.success);
        assert_eq!(outcome.lines, vec!["false"]);
    }

    #[test]
    fn test_render_command() {
        let outcome = run_default(Command::Render {
            expression: "a and (b or c)".into(),
        });
        assert_eq!(outcome.lines, vec!["a AND (b OR c)"]);
    }

    #[test]
    fn test_tags_command() {
        let outcome = run_default(Command::Tags {
            expression: "b OR a* OR NOT a".into(),
        });
        assert_eq!(outcome.lines, vec!["a", "b"]);
    }

    #[test]
    fn test_list_command() {
        let outcome = run_default(Command::List {
            input: "x 'y z'".into(),
        });
        assert_eq!(outcome.lines, vec!["x", "y z"]);
    }

    #[test]
    fn test_parse_failure_has_context() {
        let err = run(
            &Command::Render {
                expression: "a AND".into(),
            },
            &QueryConfig::default(),
        )
        .err()
        .unwrap();
        assert!(err.to_string().starts_with("Query: Failed to parse"));
        assert!(format!("{err:#}").contains("column 5: unexpected token"));
    }
}
