/*!
shared.rs - helpers shared by the subcommands.

  - validate_text / validate_limit / parse_post_ref: local checks that run
    before a client is resolved
  - Output: stdout sink that knows whether to print human text or JSON
*/

use std::io::{self, Write};

use crate::cmd::format::StyleOptions;
use crate::error::{CliError, CliResult};
use crate::remote::PostRef;

/// Maximum post length, in characters.
pub const MAX_POST_CHARS: usize = 300;
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/* ---- Validation ---- */

/// `kind` names the text in messages ("Post", "Reply").
pub fn validate_text(kind: &str, text: &str) -> CliResult<()> {
    if text.trim().is_empty() {
        return Err(CliError::Validation(format!("{kind} text is empty")));
    }
    let len = text.chars().count();
    if len > MAX_POST_CHARS {
        return Err(CliError::Validation(format!(
            "{kind} too long ({len} chars, max {MAX_POST_CHARS})"
        )));
    }
    Ok(())
}

pub fn validate_limit(limit: u32) -> CliResult<()> {
    if limit == 0 || limit > MAX_LIMIT {
        return Err(CliError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT} (got {limit})"
        )));
    }
    Ok(())
}

pub fn parse_post_ref(raw: &str) -> CliResult<PostRef> {
    Ok(PostRef::parse(raw)?)
}

/* ---- Output ---- */

pub struct Output<W: Write> {
    out: W,
    json: bool,
    style: StyleOptions,
}

impl Output<io::Stdout> {
    pub fn stdout(json: bool) -> Self {
        Self::new(io::stdout(), json, StyleOptions::detect())
    }
}

impl<W: Write> Output<W> {
    pub fn new(out: W, json: bool, style: StyleOptions) -> Self {
        Self { out, json, style }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn style(&self) -> &StyleOptions {
        &self.style
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> CliResult<()> {
        writeln!(self.out, "{}", text.as_ref())?;
        Ok(())
    }

    pub fn blank(&mut self) -> CliResult<()> {
        self.line("")
    }

    /// Pretty-print one JSON document.
    pub fn json(&mut self, value: &serde_json::Value) -> CliResult<()> {
        let rendered = serde_json::to_string_pretty(value)?;
        self.line(rendered)
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
