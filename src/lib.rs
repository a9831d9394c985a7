//! Parse and evaluate boolean tag queries such as
//! `urgent AND (bug* OR regression) AND NOT closed`.
//!
//! ```
//! use tagquery::{matches, parse_expression};
//!
//! let query = parse_expression("urgent AND (bug* OR regression) AND NOT closed").unwrap();
//! assert!(matches(&query, &["urgent", "bugfix"]));
//! assert!(!matches(&query, &["urgent", "bugfix", "closed"]));
//! ```

pub mod config;
pub mod dsl;

pub use config::{MatchOptions, ParserOptions, QueryConfig};
pub use dsl::*;
