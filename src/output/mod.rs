//! Output assembly.
//!
//! Wraps a flattened template body in the parameterized function that the
//! runtime calls with an options record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Shape of the emitted artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// ``module.exports = (options) => `BODY` ``
    #[default]
    #[serde(rename = "commonjs")]
    #[value(name = "commonjs", alias = "cjs")]
    CommonJs,
    /// ``export default (options) => `BODY` ``
    #[serde(rename = "esm")]
    #[value(name = "esm")]
    EsModule,
    /// ``(options) => `BODY` ``
    Function,
    /// The template body alone
    Body,
}

impl OutputFormat {
    /// Wrap `body` using `options_ident` as the parameter name.
    pub fn assemble(self, body: &str, options_ident: &str) -> String {
        match self {
            Self::CommonJs => format!("module.exports = ({options_ident}) => `{body}`"),
            Self::EsModule => format!("export default ({options_ident}) => `{body}`"),
            Self::Function => format!("({options_ident}) => `{body}`"),
            Self::Body => body.to_string(),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CommonJs => "commonjs",
            Self::EsModule => "esm",
            Self::Function => "function",
            Self::Body => "body",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "commonjs" | "cjs" => Ok(Self::CommonJs),
            "esm" => Ok(Self::EsModule),
            "function" => Ok(Self::Function),
            "body" => Ok(Self::Body),
            other => Err(format!(
                "unknown output format '{other}' (expected commonjs, esm, function or body)"
            )),
        }
    }
}

/// Whether `ident` can name the options parameter.
pub fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
