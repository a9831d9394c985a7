use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lexer and parser settings shared by every parser built from them.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ParserOptions {
    /// Character standing for "any run of characters" inside a tag.
    pub wildcard: char,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { wildcard: '*' }
    }
}

impl ParserOptions {
    /// Reject markers the lexer already gives another meaning.
    pub fn validate(&self) -> anyhow::Result<()> {
        let c = self.wildcard;
        if c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\'' | '\\') {
            bail!("invalid wildcard marker: {c:?}");
        }
        Ok(())
    }
}

/// Evaluation settings for the matcher.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct MatchOptions {
    /// Compare tags exactly; otherwise compare lowercased forms.
    pub case_sensitive: bool,
    /// Result of evaluating an empty expression.
    pub empty_matches_all: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            empty_matches_all: true,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    #[serde(default)]
    pub parser: ParserOptions,
    #[serde(default)]
    pub matching: MatchOptions,
}

impl QueryConfig {
    /// Load from a YAML or TOML file, chosen by extension.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()
            .with_context(|| format!("Config: Failed to read {}", path.display()))?;
        let config: QueryConfig = settings.try_deserialize()?;
        config.parser.validate()?;
        Ok(config)
    }
}
