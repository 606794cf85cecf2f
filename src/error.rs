//! Error types for pagewalk
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for pagewalk
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Definition or runtime configuration problem
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A `${VAR}` reference named an unset environment variable
    #[error("Environment variable '{variable}' is not set")]
    MissingEnvVar { variable: String },

    /// A definition field holds a value that cannot work
    #[error("Invalid value for '{field}': {message}")]
    InvalidDefinition { field: String, message: String },

    /// Definition file is not valid YAML
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON (de)serialization failure outside page decoding
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The source answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The HTTP deadline passed; fatal, unlike a DOM wait expiry
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// A URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A WebDriver command failed mid-session
    #[error("Browser command failed: {0}")]
    Browser(#[from] fantoccini::error::CmdError),

    /// The WebDriver session could not be established
    #[error("Browser session failed: {message}")]
    BrowserSession { message: String },

    // ============================================================================
    // Decode Errors
    // ============================================================================
    /// A page body could not be decoded into items
    #[error("Failed to decode page: {message}")]
    Parse { message: String },

    /// A JSONPath expression was invalid
    #[error("JSONPath error: {message}")]
    JsonPath { message: String },

    // ============================================================================
    // Wait Errors
    // ============================================================================
    /// A bounded DOM wait expired without the expected change
    #[error("Wait timed out after {waited_ms}ms")]
    WaitTimeout { waited_ms: u64 },

    // ============================================================================
    // Output Errors
    // ============================================================================
    /// A sink could not persist the result
    #[error("Output error: {message}")]
    Output { message: String },

    /// CSV serialization failure
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Free-form error with context attached
    #[error("{0}")]
    Other(String),

    /// Wrapped error from a caller-supplied component
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing environment variable error
    pub fn missing_env(variable: impl Into<String>) -> Self {
        Self::MissingEnvVar {
            variable: variable.into(),
        }
    }

    /// Create an invalid definition error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a JSONPath error
    pub fn json_path(message: impl Into<String>) -> Self {
        Self::JsonPath {
            message: message.into(),
        }
    }

    /// Create a wait timeout error
    pub fn wait_timeout(waited_ms: u64) -> Self {
        Self::WaitTimeout { waited_ms }
    }

    /// Create a browser session error
    pub fn browser_session(message: impl Into<String>) -> Self {
        Self::BrowserSession {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error came from the transport or the remote end
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::HttpStatus { .. }
                | Error::Timeout { .. }
                | Error::Browser(_)
                | Error::BrowserSession { .. }
        )
    }

    /// Check if this error is a bounded-wait expiry.
    ///
    /// For DOM-driven sources this is an exhaustion signal, not a failure:
    /// a load trigger that produces nothing within the wait window is
    /// indistinguishable from "no more content to load".
    pub fn is_wait_timeout(&self) -> bool {
        matches!(self, Error::WaitTimeout { .. })
    }
}

/// Result type alias for pagewalk
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_env("API_TOKEN");
        assert_eq!(
            err.to_string(),
            "Environment variable 'API_TOKEN' is not set"
        );

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::wait_timeout(5000);
        assert_eq!(err.to_string(), "Wait timed out after 5000ms");
    }

    #[test]
    fn test_is_fetch() {
        assert!(Error::http_status(500, "").is_fetch());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_fetch());
        assert!(Error::browser_session("webdriver gone").is_fetch());

        assert!(!Error::parse("bad body").is_fetch());
        assert!(!Error::config("test").is_fetch());
        assert!(!Error::wait_timeout(100).is_fetch());
    }

    #[test]
    fn test_is_wait_timeout() {
        assert!(Error::wait_timeout(2000).is_wait_timeout());
        assert!(!Error::Timeout { timeout_ms: 2000 }.is_wait_timeout());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
