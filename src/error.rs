//! Error types shared by the configuration layer and the engine bindings.
//!
//! Decision functions never fail: every input maps to a disposition. Errors
//! only exist at the two edges of the program: building the policy at
//! startup ([`ConfigError`], fatal) and handing a URI to the operating
//! system ([`LaunchError`], reported and otherwise ignored).

use std::io;
use std::path::PathBuf;

use crate::config::LanguageKind;

/// Raised while assembling the startup configuration. Fatal: the process
/// reports it and exits before any window is created.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown type of permission request '{0}' supplied to --permit.")]
    UnknownPermission(String),

    #[error("Can't set more than {limit} {kind} languages.")]
    TooManyLanguages { kind: LanguageKind, limit: usize },

    #[error("Invalid {kind} language tag '{tag}'.")]
    InvalidLanguageTag { kind: LanguageKind, tag: String },

    #[error("Invalid URL '{input}': {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The operating system could not open a URI in its default application.
#[derive(Debug, thiserror::Error)]
#[error("Could not launch URI {uri}: {source}")]
pub struct LaunchError {
    pub uri: String,
    #[source]
    pub source: io::Error,
}
