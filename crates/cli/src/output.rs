// Output format auto-detection for the CLI.
//
// TTY → human-readable text. Piped/redirected → structured JSON.
// `--json` forces JSON output regardless of terminal.

use std::io::{self, IsTerminal, Write};

use bookmemory_client::config::{ConfigError, API_URL_ENV, SESSION_ENV};
use bookmemory_client::error::ApiError;
use bookmemory_common::types::Bookmark;
use serde::Serialize;

use crate::context::Reported;

const ANSI_RED: &str = "\x1b[31m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    /// JSON if `--json` was passed or stdout is not a TTY.
    pub fn detect(json_flag: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        Self::detect_from_terminal(io::stdout().is_terminal())
    }

    pub fn detect_from_terminal(is_tty: bool) -> Self {
        if is_tty {
            Self::Human
        } else {
            Self::Json
        }
    }
}

/// Write a value to stdout in the selected format.
pub fn print_output<T, F>(format: OutputFormat, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    write_output(&mut io::stdout().lock(), format, value, human_fn)
}

pub fn write_output<W, T, F>(
    writer: &mut W,
    format: OutputFormat,
    value: &T,
    human_fn: F,
) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Human => writeln!(writer, "{}", human_fn(value)),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, value).map_err(io::Error::other)?;
            writeln!(writer)
        }
    }
}

/// Write an error to stderr in the selected format.
pub fn print_error(format: OutputFormat, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    match format {
        OutputFormat::Human => {
            let line = render_human_error(message, io::stderr().is_terminal());
            let _ = writeln!(err, "{line}");
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({ "error": { "code": code, "message": message } });
            let _ = serde_json::to_writer(&mut err, &obj);
            let _ = writeln!(err);
        }
    }
}

/// Print a mapped, actionable error for a command failure. Failures the
/// notifier already printed are not repeated.
pub fn print_anyhow_error(format: OutputFormat, error: &anyhow::Error) {
    if error.downcast_ref::<Reported>().is_some() {
        return;
    }
    let (code, message) = actionable_error(error);
    print_error(format, code, &message);
}

fn actionable_error(error: &anyhow::Error) -> (&'static str, String) {
    let message = format!("{error:#}");
    for cause in error.chain() {
        if cause.downcast_ref::<ConfigError>().is_some() {
            return ("CONFIG_ERROR", message);
        }
        let Some(api_err) = cause.downcast_ref::<ApiError>() else {
            continue;
        };
        return match api_err {
            err if err.is_unauthorized() => (
                "AUTH_REQUIRED",
                format!("Not signed in. Set {SESSION_ENV} to your session cookie."),
            ),
            ApiError::Network(_) => (
                "NETWORK_ERROR",
                format!("Could not reach the bookmark service. Check {API_URL_ENV}. ({message})"),
            ),
            err if err.is_not_found() => ("NOT_FOUND", api_err.user_message()),
            ApiError::InvalidArgument(_) => ("INVALID_ARGUMENT", api_err.user_message()),
            _ => ("REQUEST_FAILED", api_err.user_message()),
        };
    }
    ("ERROR", message)
}

fn render_human_error(message: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{ANSI_RED}error:{ANSI_RESET} {message}")
    } else {
        format!("error: {message}")
    }
}

/// One bookmark as a two-line listing entry.
pub fn bookmark_line(bookmark: &Bookmark) -> String {
    let mut line = format!("{}  {}", bookmark.id, bookmark.title);
    if !bookmark.tags.is_empty() {
        line.push_str(&format!("  [{}]", bookmark.tags.join(", ")));
    }
    if let Some(url) = bookmark.url.as_deref().filter(|url| !url.is_empty()) {
        line.push_str(&format!("\n    {url}"));
    }
    if let Some(snippet) = bookmark.snippet.as_deref().filter(|s| !s.is_empty()) {
        let snippet = if io::stdout().is_terminal() {
            format!("{ANSI_DIM}{snippet}{ANSI_RESET}")
        } else {
            snippet.to_string()
        };
        line.push_str(&format!("\n    {snippet}"));
    }
    line
}

pub fn bookmark_list(bookmarks: &[Bookmark]) -> String {
    bookmarks.iter().map(bookmark_line).collect::<Vec<_>>().join("\n")
}
