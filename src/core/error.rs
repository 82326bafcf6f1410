//! Error handling for tplinc
//!
//! Two layers of error types:
//! - [`CompileError`] - the typed failure of one compilation, carrying the
//!   discriminated [`CompileErrorKind`], the offending reference or
//!   expression, and the file that referred to it
//! - [`TplincError`] and [`ErrorContext`] - CLI-level errors wrapped with
//!   user-facing details and suggestions
//!
//! Every compile error is fatal: the first one raised anywhere in the include
//! tree aborts the whole compilation and no partial output is produced.
//!
//! Use [`user_friendly_error`] to turn any [`anyhow::Error`] coming out of the
//! CLI into a colored report.
//!
//! ```rust,no_run
//! use tplinc_cli::core::user_friendly_error;
//!
//! let error = anyhow::anyhow!("Something went wrong");
//! user_friendly_error(error).display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::file_error::FileOperationError;
use crate::condition::ConditionError;

/// Discriminant of a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileErrorKind {
    /// A reference could not be mapped to a file
    Unresolved,
    /// A file appears on its own ancestor path
    Circular,
    /// A resolved file could not be read
    ReadFailure,
    /// A directive condition failed to parse or uses an unsupported construct
    ConditionParseFailure,
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unresolved => "unresolved reference",
            Self::Circular => "circular dependency",
            Self::ReadFailure => "read failure",
            Self::ConditionParseFailure => "condition parse failure",
        };
        f.write_str(name)
    }
}

/// Failure of a single compilation.
#[derive(Error, Debug)]
pub enum CompileError {
    /// A directive's reference does not name an existing file.
    #[error("Could not resolve '{reference}' included from {}", referrer.display())]
    UnresolvedReference {
        /// The reference as written in the directive
        reference: String,
        /// The file containing the directive
        referrer: PathBuf,
        /// Close matches offered by the host, best first
        suggestions: Vec<String>,
    },

    /// A resolved location is already on the path from the root.
    #[error(
        "Circular dependency: '{reference}' included from {} leads back to {}",
        referrer.display(),
        location.display()
    )]
    CircularDependency {
        /// The reference that closes the cycle
        reference: String,
        /// The file that re-introduced the location
        referrer: PathBuf,
        /// The location that was reached twice
        location: PathBuf,
        /// Root-to-node path ending with `location`
        chain: Vec<PathBuf>,
    },

    /// A resolved file could not be read.
    #[error("Could not read {} included from {}", location.display(), referrer.display())]
    ReadFailure {
        /// The resolved location
        location: PathBuf,
        /// The file containing the directive
        referrer: PathBuf,
        /// The underlying read failure
        #[source]
        source: FileOperationError,
    },

    /// A directive's condition is not a supported expression.
    #[error("Invalid condition '{expression}' on include of '{reference}' in {}", referrer.display())]
    ConditionParse {
        /// The raw condition text
        expression: String,
        /// The reference the condition guards
        reference: String,
        /// The file containing the directive
        referrer: PathBuf,
        /// What is wrong with the expression
        #[source]
        source: ConditionError,
    },
}

impl CompileError {
    /// The discriminated kind of this error.
    pub fn kind(&self) -> CompileErrorKind {
        match self {
            Self::UnresolvedReference {
                ..
            } => CompileErrorKind::Unresolved,
            Self::CircularDependency {
                ..
            } => CompileErrorKind::Circular,
            Self::ReadFailure {
                ..
            } => CompileErrorKind::ReadFailure,
            Self::ConditionParse {
                ..
            } => CompileErrorKind::ConditionParseFailure,
        }
    }

    /// The file whose directive caused the error.
    pub fn referrer(&self) -> &Path {
        match self {
            Self::UnresolvedReference {
                referrer,
                ..
            }
            | Self::CircularDependency {
                referrer,
                ..
            }
            | Self::ReadFailure {
                referrer,
                ..
            }
            | Self::ConditionParse {
                referrer,
                ..
            } => referrer,
        }
    }
}

/// Errors surfaced by the command-line layer.
#[derive(Error, Debug)]
pub enum TplincError {
    /// A compilation failed
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// An explicitly requested configuration file does not exist
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was requested
        path: String,
    },

    /// The configuration file is not valid TOML or has unknown keys
    #[error("Invalid configuration file {file}: {reason}")]
    ConfigParseError {
        /// The configuration file
        file: String,
        /// Parser message
        reason: String,
    },

    /// The configuration parsed but holds an unusable value
    #[error("Invalid configuration value in {file}: {reason}")]
    InvalidConfig {
        /// The configuration file
        file: String,
        /// What is wrong
        reason: String,
    },

    /// The options record passed to `render` is not usable
    #[error("Invalid render options: {reason}")]
    InvalidOptions {
        /// What is wrong
        reason: String,
    },

    /// A file operation failed outside of a compilation
    #[error(transparent)]
    FileOperation(#[from] FileOperationError),

    /// Anything else
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// An error with optional details and a suggestion, for CLI display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: TplincError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error with no suggestion or details.
    #[must_use]
    pub const fn new(error: TplincError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error (shown in green).
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error (shown in yellow).
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details, and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions.
///
/// Recognizes [`CompileError`], [`TplincError`], [`FileOperationError`],
/// TOML and JSON parse errors; anything else is reported with its full
/// cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<CompileError>() {
        Ok(compile_error) => return compile_error_context(compile_error),
        Err(error) => error,
    };

    let error = match error.downcast::<TplincError>() {
        Ok(TplincError::Compile(compile_error)) => return compile_error_context(compile_error),
        Ok(tplinc_error) => return tplinc_error_context(tplinc_error),
        Err(error) => error,
    };

    let error = match error.downcast::<FileOperationError>() {
        Ok(file_error) => {
            let details = file_error.user_message();
            return ErrorContext::new(TplincError::FileOperation(file_error)).with_details(details);
        }
        Err(error) => error,
    };

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(TplincError::ConfigParseError {
            file: crate::constants::CONFIG_FILE_NAME.to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax and that only [resolve] and [output] keys are used");
    }

    if let Some(json_error) = error.downcast_ref::<serde_json::Error>() {
        return ErrorContext::new(TplincError::InvalidOptions {
            reason: json_error.to_string(),
        })
        .with_suggestion("Render options must be a JSON object, e.g. --options '{\"debug\": true}'");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(TplincError::Other {
        message,
    })
}

fn compile_error_context(error: CompileError) -> ErrorContext {
    match &error {
        CompileError::UnresolvedReference {
            suggestions,
            ..
        } => {
            let suggestion = if suggestions.is_empty() {
                "Check the path in the #include line, or add its directory to [resolve] paths in tplinc.toml".to_string()
            } else {
                format!("Did you mean {}?", quoted_list(suggestions))
            };
            ErrorContext::new(TplincError::Compile(error))
                .with_suggestion(suggestion)
                .with_details("References resolve against the including file's directory, then against the configured search paths")
        }

        CompileError::CircularDependency {
            chain,
            ..
        } => {
            let details = format!(
                "Include chain: {}",
                chain.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> ")
            );
            ErrorContext::new(TplincError::Compile(error))
                .with_details(details)
                .with_suggestion("Remove one of the #include lines in the chain; a template cannot include itself directly or indirectly")
        }

        CompileError::ReadFailure {
            source,
            ..
        } => {
            let details = source.user_message();
            ErrorContext::new(TplincError::Compile(error)).with_details(details)
        }

        CompileError::ConditionParse {
            source,
            ..
        } => {
            let details = source.to_string();
            ErrorContext::new(TplincError::Compile(error))
                .with_details(details)
                .with_suggestion("Conditions may use identifiers, literals, parentheses, and unary, arithmetic, comparison, bitwise and logical operators; calls and member access are not allowed")
        }
    }
}

fn tplinc_error_context(error: TplincError) -> ErrorContext {
    match &error {
        TplincError::ConfigNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Pass an existing file to --config or unset TPLINC_CONFIG"),
        TplincError::ConfigParseError {
            file,
            ..
        } => {
            let suggestion = format!(
                "Check the TOML syntax in {file}. Allowed tables are [resolve] (paths, extensions) and [output] (format, options-ident)"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        TplincError::InvalidOptions {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Render options must be a JSON object, e.g. --options '{\"debug\": true}'"),
        TplincError::FileOperation(file_error) => {
            let details = file_error.user_message();
            ErrorContext::new(error).with_details(details)
        }
        _ => ErrorContext::new(error),
    }
}

fn quoted_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => format!("'{only}'"),
        [init @ .., last] => format!(
            "{} or '{last}'",
            init.iter().map(|i| format!("'{i}'")).collect::<Vec<_>>().join(", ")
        ),
    }
}
