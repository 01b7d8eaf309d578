// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config problems as miette diagnostics.
//!
//! Every section defaults each field, so loading fails only on a misspelled
//! key, a value of the wrong type or a file figment cannot read. Validation
//! adds its own messages on top.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a known key needs before it is offered as the fix.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// `key` is not declared in `section` (empty for the top level).
    #[error("unknown configuration key `{}`", dotted(.section, .key))]
    #[diagnostic(code(revline::config::unknown_key), help("{hint}"))]
    UnknownKey {
        section: String,
        key: String,
        suggestion: Option<String>,
        hint: String,
        #[label("not a Revline setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(revline::config::invalid_type), help("use {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("{message}")]
    #[diagnostic(code(revline::config::validation))]
    Validation { message: String },

    /// Syntax errors and anything else figment cannot map onto the model.
    #[error("could not read configuration: {0}")]
    #[diagnostic(
        code(revline::config::unreadable),
        help("check revline.toml syntax and REVLINE_* variables")
    )]
    Unreadable(String),
}

fn dotted(section: &str, key: &str) -> String {
    if section.is_empty() {
        key.to_string()
    } else {
        format!("{section}.{key}")
    }
}

impl ConfigError {
    /// Splits a figment error into one diagnostic per problem.
    ///
    /// `sources` are `(path, content)` pairs of the files that were read; a
    /// misspelled key found in one of them gets a labelled span.
    pub fn from_figment(err: figment::Error, sources: &[(String, String)]) -> Vec<ConfigError> {
        err.into_iter()
            .map(|error| {
                let section = error.path.join(".");
                match &error.kind {
                    Kind::UnknownField(key, known) => {
                        let suggestion = suggest_key(key, known);
                        let hint = match &suggestion {
                            Some(s) => format!("did you mean `{s}`? known keys: {}", known.join(", ")),
                            None => format!("known keys: {}", known.join(", ")),
                        };
                        let (span, src) = match locate(&error, sources, key) {
                            Some((span, src)) => (Some(span), Some(src)),
                            None => (None, None),
                        };
                        ConfigError::UnknownKey {
                            section,
                            key: key.clone(),
                            suggestion,
                            hint,
                            span,
                            src,
                        }
                    }
                    Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                        key: section,
                        found: found.to_string(),
                        expected: expected.clone(),
                    },
                    _ => ConfigError::Unreadable(error.to_string()),
                }
            })
            .collect()
    }
}

/// Span of `key` in the file the error came from, if that file was read.
fn locate(
    error: &figment::Error,
    sources: &[(String, String)],
    key: &str,
) -> Option<(SourceSpan, NamedSource<String>)> {
    let figment::Source::File(file) = error.metadata.as_ref()?.source.as_ref()? else {
        return None;
    };
    let file = file.display().to_string();
    let (name, content) = sources.iter().find(|(name, _)| *name == file)?;
    let offset = key_offset(content, &error.path, key)?;
    Some((
        SourceSpan::new(offset.into(), key.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `key` inside the `[section]` named by the first path element.
///
/// Top-level keys (empty path) are searched from the start of the file.
pub fn key_offset(content: &str, path: &[String], key: &str) -> Option<usize> {
    let start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        if let Some(after) = line.trim_start().strip_prefix(key)
            && after.trim_start().starts_with('=')
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// Closest known key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
