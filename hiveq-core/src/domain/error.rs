// hiveq-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    // --- CONFIGURATION ---
    #[error("Missing required config keys in {path}: {}", .keys.join(", "))]
    #[diagnostic(
        code(hiveq::config::missing_keys),
        help("Add the missing keys to the selected profile.")
    )]
    MissingKeys { path: String, keys: Vec<String> },

    #[error("Tag '{tag}' not found in {path}. Available tags: {}", format_tags(.available))]
    #[diagnostic(code(hiveq::config::unknown_tag))]
    UnknownTag {
        tag: String,
        path: String,
        available: Vec<String>,
    },

    #[error("Tag '{tag}' in {path} must map to a table of settings")]
    #[diagnostic(code(hiveq::config::invalid_tag))]
    InvalidTagSection { tag: String, path: String },

    #[error("{path} contains tagged profiles but no --tag was given. Available tags: {}", format_tags(.available))]
    #[diagnostic(
        code(hiveq::config::tag_required),
        help("Pick one profile with --tag <NAME>.")
    )]
    TagRequired { path: String, available: Vec<String> },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(hiveq::config::invalid))]
    InvalidConfig(String),

    // --- QUERY SOURCE ---
    #[error("Query file not found: {0}")]
    #[diagnostic(code(hiveq::query::file_missing))]
    QueryFileNotFound(String),

    #[error("Query file is empty: {0}")]
    #[diagnostic(code(hiveq::query::file_empty))]
    EmptyQueryFile(String),

    #[error("No query provided")]
    #[diagnostic(
        code(hiveq::query::missing),
        help("Pass --query, --query-file, set 'query'/'query_file' in the config, or type the SQL on stdin.")
    )]
    NoQuery,
}

fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "(none)".to_string()
    } else {
        tags.join(", ")
    }
}
