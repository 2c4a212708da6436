//! Injected sink for transport errors.
//!
//! Remote failures are always traced with `tracing::warn!`. When configured,
//! they are also appended to a sink as CSV rows (`timestamp,method,status,url`)
//! or text lines (`[timestamp] METHOD url -> status`).

use chrono::{DateTime, SecondsFormat, Utc};
use pacvars_core::PacError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// Where error records go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogSink {
    #[default]
    None,
    Stderr,
    File(PathBuf),
}

impl FromStr for LogSink {
    type Err = PacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(LogSink::None),
            "stderr" => Ok(LogSink::Stderr),
            other => match other.strip_prefix("file:") {
                Some(path) if !path.is_empty() => Ok(LogSink::File(PathBuf::from(path))),
                _ => Err(PacError::Config(format!(
                    "Unknown log sink '{}' (expected none, stderr or file:<path>)",
                    other
                ))),
            },
        }
    }
}

impl TryFrom<String> for LogSink {
    type Error = PacError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LogSink> for String {
    fn from(sink: LogSink) -> Self {
        sink.to_string()
    }
}

impl fmt::Display for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSink::None => f.write_str("none"),
            LogSink::Stderr => f.write_str("stderr"),
            LogSink::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

/// Record format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Csv,
    #[default]
    Text,
}

impl FromStr for LogFormat {
    type Err = PacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(LogFormat::Csv),
            "text" => Ok(LogFormat::Text),
            other => Err(PacError::Config(format!(
                "Unknown log format '{}' (expected csv or text)",
                other
            ))),
        }
    }
}

/// Error log configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub sink: LogSink,
    pub format: LogFormat,
}

/// Writes remote failures to the configured sink.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    config: LogConfig,
}

impl ErrorLog {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Report a failure. Only `RemoteError` reaches the sink.
    pub fn report(&self, error: &PacError) {
        warn!(error = %error, "Controller request failed");

        let PacError::RemoteError {
            status,
            method,
            url,
        } = error
        else {
            return;
        };
        let line = self.format_line(Utc::now(), method, *status, url);

        match &self.config.sink {
            LogSink::None => {}
            LogSink::Stderr => eprintln!("{}", line),
            LogSink::File(path) => {
                let written = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .and_then(|mut file| writeln!(file, "{}", line));
                if let Err(e) = written {
                    warn!(path = %path.display(), "Failed to write error log: {}", e);
                }
            }
        }
    }

    pub fn format_line(&self, at: DateTime<Utc>, method: &str, status: u16, url: &str) -> String {
        let at = at.to_rfc3339_opts(SecondsFormat::Millis, true);
        match self.config.format {
            LogFormat::Csv => format!("{},{},{},{}", at, method, status, csv_field(url)),
            LogFormat::Text => format!("[{}] {} {} -> {}", at, method, url, status),
        }
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
