//! Minimal `.env` file syntax, as understood by Docker Compose `env_file`.
//!
//! One `KEY=VALUE` per line, blank lines and `#` comments ignored, an
//! optional leading `export`, values optionally wrapped in matching single or
//! double quotes. Single-quoted values are literal, double-quoted ones accept
//! the `\\`, `\"` and `\n` escapes.

use super::DeploymentError;

/// Parse `.env` content into ordered `(key, value)` pairs.
pub fn parse(content: &str) -> Result<Vec<(String, String)>, DeploymentError> {
    let mut vars = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            return Err(DeploymentError::Syntax {
                line: index + 1,
                reason: "expected KEY=VALUE".to_owned(),
            });
        };
        let key = key.trim();
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DeploymentError::Syntax {
                line: index + 1,
                reason: format!("invalid variable name {key:?}"),
            });
        }
        vars.push((key.to_owned(), unquote(value.trim())));
    }
    Ok(vars)
}

fn unquote(value: &str) -> String {
    let quoted_with =
        |quote: char| value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote);
    if quoted_with('\'') {
        value[1..value.len() - 1].to_owned()
    } else if quoted_with('"') {
        unescape(&value[1..value.len() - 1])
    } else {
        value.to_owned()
    }
}

fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some(escaped @ ('\\' | '"')) => unescaped.push(escaped),
            // unknown escapes are kept as written
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

/// Quote a value if Compose would otherwise misread it.
///
/// Single quotes when the value holds neither a single quote nor a newline,
/// double quotes with escapes otherwise.
pub fn quote(value: &str) -> String {
    let needs_quotes = value.starts_with('\'')
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\\'));
    if !needs_quotes {
        return value.to_owned();
    }
    if !value.contains(['\'', '\n']) {
        return format!("'{value}'");
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str(r"\\"),
            '"' => quoted.push_str(r#"\""#),
            '\n' => quoted.push_str(r"\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
