//! Command-line options and startup resolution.
//!
//! Options mirror the config file's `[policy]` section and are appended
//! after it, so both sources share the same per-list budget.

use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::config::{Config, LanguageKind, PolicyConfiguration, WindowConfig};
use crate::error::ConfigError;

/// webwrap: wrap a browser engine view around a URL.
#[derive(Parser, Debug, Default)]
#[command(name = "webwrap", version, about)]
pub struct Args {
    /// Permit a certain type of request (geolocation, notification, audio, video).
    #[arg(short = 'p', long = "permit", value_name = "REQUEST")]
    pub permit: Vec<String>,

    /// Add spell checker language.
    #[arg(short = 's', long = "spell", value_name = "LANG")]
    pub spell: Vec<String>,

    /// Add preferred language.
    #[arg(short = 'l', long = "lang", value_name = "LANG")]
    pub lang: Vec<String>,

    /// The wrapped URL.
    #[arg(short = 'u', long, value_name = "URL")]
    pub url: Option<String>,

    /// Config file path override.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

pub fn parse() -> Args {
    Args::parse()
}

/// Everything the shell needs before it opens a window.
#[derive(Debug, Clone)]
pub struct Startup {
    pub url: Url,
    pub title: String,
    pub window: WindowConfig,
    pub policy: PolicyConfiguration,
}

impl Startup {
    pub fn resolve(args: Args, file: Config) -> Result<Self, ConfigError> {
        let mut builder = PolicyConfiguration::builder();

        for token in file.policy.permit.iter().chain(&args.permit) {
            builder.permit(token)?;
        }
        for tag in file.policy.languages.iter().chain(&args.lang) {
            builder.language(LanguageKind::Preferred, tag)?;
        }
        for tag in file.policy.spell.iter().chain(&args.spell) {
            builder.language(LanguageKind::SpellCheck, tag)?;
        }

        let url = normalize_url(args.url.as_deref().unwrap_or(&file.general.url))?;

        Ok(Self {
            url,
            title: file.general.title,
            window: file.window,
            policy: builder.build(),
        })
    }
}

/// Parses a URL, adding `https://` when the input has no usable scheme
/// (`wikipedia.org`, `localhost:8080`).
pub fn normalize_url(input: &str) -> Result<Url, ConfigError> {
    if let Ok(url) = Url::parse(input)
        && (url.has_host() || matches!(url.scheme(), "about" | "data" | "file"))
    {
        return Ok(url);
    }

    Url::parse(&format!("https://{input}")).map_err(|source| ConfigError::InvalidUrl {
        input: input.to_string(),
        source,
    })
}
