//! Startup configuration: the immutable policy and the optional TOML file.
//!
//! [`PolicyConfiguration`] is the only state the decision modules read. It is
//! assembled once by [`PolicyBuilder`] (fed by the config file, then the
//! command line) and never mutated afterwards; the shell shares it as an
//! `Rc<PolicyConfiguration>` for the lifetime of the process.
//!
//! ## Config file search order
//!
//! 1. `--config <PATH>` on the command line (must exist)
//! 2. `WEBWRAP_CONFIG` environment variable
//! 3. Next to the executable (`<exe_dir>/config.toml`)
//! 4. Platform config directory (`%APPDATA%\webwrap\config.toml` on Windows,
//!    `$XDG_CONFIG_HOME/webwrap/config.toml` elsewhere)
//! 5. Current working directory (`./config.toml`)
//! 6. No file found → `Config::default()`

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Maximum number of tags in each language list.
pub const MAX_LANGUAGES: usize = 7;

// ─────────────────────────────────────────────────────────────────────────────
// Permissions
// ─────────────────────────────────────────────────────────────────────────────

/// A privileged capability the operator can grant with `--permit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Geolocation,
    Notification,
    Audio,
    Video,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::Geolocation,
        Permission::Notification,
        Permission::Audio,
        Permission::Video,
    ];

    /// Command-line token for this permission.
    pub fn token(self) -> &'static str {
        match self {
            Permission::Geolocation => "geolocation",
            Permission::Notification => "notification",
            Permission::Audio => "audio",
            Permission::Video => "video",
        }
    }
}

impl FromStr for Permission {
    type Err = ConfigError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.token() == token)
            .ok_or_else(|| ConfigError::UnknownPermission(token.to_string()))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The four independent grants. Everything starts denied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Grants {
    geolocation: bool,
    notification: bool,
    audio: bool,
    video: bool,
}

impl Grants {
    pub fn is_granted(&self, permission: Permission) -> bool {
        match permission {
            Permission::Geolocation => self.geolocation,
            Permission::Notification => self.notification,
            Permission::Audio => self.audio,
            Permission::Video => self.video,
        }
    }

    fn grant(&mut self, permission: Permission) {
        match permission {
            Permission::Geolocation => self.geolocation = true,
            Permission::Notification => self.notification = true,
            Permission::Audio => self.audio = true,
            Permission::Video => self.video = true,
        }
    }

    /// Granted permissions, in declaration order.
    pub fn granted(&self) -> impl Iterator<Item = Permission> + '_ {
        Permission::ALL
            .into_iter()
            .filter(|p| self.is_granted(*p))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Languages
// ─────────────────────────────────────────────────────────────────────────────

/// Which of the two language lists a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageKind {
    /// `--lang`: languages advertised to web content.
    Preferred,
    /// `--spell`: spell-checker dictionaries.
    SpellCheck,
}

impl fmt::Display for LanguageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageKind::Preferred => f.write_str("preferred"),
            LanguageKind::SpellCheck => f.write_str("spell-check"),
        }
    }
}

/// Ordered list of at most [`MAX_LANGUAGES`] tags. Empty means "engine default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Languages(Vec<String>);

impl Languages {
    fn push(&mut self, kind: LanguageKind, tag: &str) -> Result<(), ConfigError> {
        let tag = tag.trim();
        let well_formed = !tag.is_empty()
            && tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !well_formed {
            return Err(ConfigError::InvalidLanguageTag {
                kind,
                tag: tag.to_string(),
            });
        }
        if self.0.len() == MAX_LANGUAGES {
            return Err(ConfigError::TooManyLanguages {
                kind,
                limit: MAX_LANGUAGES,
            });
        }
        self.0.push(tag.to_string());
        Ok(())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PolicyConfiguration
// ─────────────────────────────────────────────────────────────────────────────

/// Operator-supplied policy, fixed for the process lifetime.
///
/// Only [`PolicyBuilder`] can produce one, so every instance has already
/// passed validation: no unknown permission, no list longer than
/// [`MAX_LANGUAGES`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyConfiguration {
    grants: Grants,
    preferred_languages: Languages,
    spellcheck_languages: Languages,
}

impl PolicyConfiguration {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    pub fn grants(&self) -> &Grants {
        &self.grants
    }

    pub fn is_granted(&self, permission: Permission) -> bool {
        self.grants.is_granted(permission)
    }

    pub fn preferred_languages(&self) -> &Languages {
        &self.preferred_languages
    }

    pub fn spellcheck_languages(&self) -> &Languages {
        &self.spellcheck_languages
    }

    /// Spell checking is switched on as soon as one dictionary is configured.
    pub fn spell_checking_enabled(&self) -> bool {
        !self.spellcheck_languages.is_empty()
    }
}

/// Accumulates `--permit`, `--lang` and `--spell` values, validating each one.
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    config: PolicyConfiguration,
}

impl PolicyBuilder {
    /// Grants the permission named by a command-line token.
    pub fn permit(&mut self, token: &str) -> Result<&mut Self, ConfigError> {
        let permission = token.parse::<Permission>()?;
        self.config.grants.grant(permission);
        Ok(self)
    }

    pub fn grant(&mut self, permission: Permission) -> &mut Self {
        self.config.grants.grant(permission);
        self
    }

    pub fn language(&mut self, kind: LanguageKind, tag: &str) -> Result<&mut Self, ConfigError> {
        let list = match kind {
            LanguageKind::Preferred => &mut self.config.preferred_languages,
            LanguageKind::SpellCheck => &mut self.config.spellcheck_languages,
        };
        list.push(kind, tag)?;
        Ok(self)
    }

    pub fn build(self) -> PolicyConfiguration {
        self.config
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config file
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub window: WindowConfig,
    pub policy: PolicySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Page loaded when `--url` is not given.
    pub url: String,
    /// Window title until the page provides one.
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

/// Same vocabulary as the command line; CLI values are appended after these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySection {
    pub permit: Vec<String>,
    pub languages: Vec<String>,
    pub spell: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            url: "https://example.com".to_string(),
            title: "webwrap".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl Config {
    /// Loads the config file. `explicit` comes from `--config` and must exist;
    /// otherwise the standard locations are searched and a missing file means
    /// defaults. A file that exists but cannot be read or parsed is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match find_config_path() {
                Some(path) => path,
                None => {
                    info!("No config file found, using defaults");
                    return Ok(Config::default());
                }
            },
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Searches for a config file in the standard locations.
fn find_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("WEBWRAP_CONFIG") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
        debug!(path = %p.display(), "WEBWRAP_CONFIG does not point to a file");
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    if let Some(dir) = platform_config_dir() {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    let p = PathBuf::from("config.toml");
    p.is_file().then_some(p)
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join("webwrap"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .or_else(|| std::env::var("HOME").ok().map(|h| format!("{h}/.config")))
            .map(|dir| PathBuf::from(dir).join("webwrap"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_denies_everything() {
        let policy = PolicyConfiguration::default();
        for permission in Permission::ALL {
            assert!(!policy.is_granted(permission), "{permission} should be denied");
        }
        assert!(policy.preferred_languages().is_empty());
        assert!(policy.spellcheck_languages().is_empty());
        assert!(!policy.spell_checking_enabled());
    }

    #[test]
    fn test_permit_tokens() {
        let mut builder = PolicyConfiguration::builder();
        builder.permit("geolocation").unwrap();
        builder.permit("video").unwrap();
        let policy = builder.build();

        assert!(policy.is_granted(Permission::Geolocation));
        assert!(!policy.is_granted(Permission::Notification));
        assert!(!policy.is_granted(Permission::Audio));
        assert!(policy.is_granted(Permission::Video));
        assert_eq!(
            policy.grants().granted().collect::<Vec<_>>(),
            vec![Permission::Geolocation, Permission::Video]
        );
    }

    #[test]
    fn test_permit_is_idempotent() {
        let mut builder = PolicyConfiguration::builder();
        builder.permit("audio").unwrap().permit("audio").unwrap();
        assert_eq!(builder.build().grants().granted().count(), 1);
    }

    #[test]
    fn test_unknown_permission_rejected() {
        let mut builder = PolicyConfiguration::builder();
        let err = builder.permit("camera").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPermission(ref t) if t == "camera"));
    }

    #[test]
    fn test_permission_tokens_are_case_sensitive() {
        assert!("Geolocation".parse::<Permission>().is_err());
        assert_eq!("notification".parse::<Permission>().unwrap(), Permission::Notification);
    }

    #[test]
    fn test_seven_languages_accepted_eighth_rejected() {
        let mut builder = PolicyConfiguration::builder();
        for tag in ["en", "fr", "de", "es", "it", "nl", "pt"] {
            builder.language(LanguageKind::Preferred, tag).unwrap();
        }
        let err = builder.language(LanguageKind::Preferred, "sv").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooManyLanguages {
                kind: LanguageKind::Preferred,
                limit: MAX_LANGUAGES
            }
        ));

        // The other list has its own budget.
        builder.language(LanguageKind::SpellCheck, "en_US").unwrap();
        let policy = builder.build();
        assert_eq!(policy.preferred_languages().len(), MAX_LANGUAGES);
        assert_eq!(policy.spellcheck_languages().as_slice(), ["en_US"]);
        assert!(policy.spell_checking_enabled());
    }

    #[test]
    fn test_language_order_preserved() {
        let mut builder = PolicyConfiguration::builder();
        builder
            .language(LanguageKind::Preferred, "fr-CA")
            .unwrap()
            .language(LanguageKind::Preferred, "en-US")
            .unwrap();
        let policy = builder.build();
        assert_eq!(policy.preferred_languages().as_slice(), ["fr-CA", "en-US"]);
    }

    #[test]
    fn test_malformed_language_tag_rejected() {
        let mut builder = PolicyConfiguration::builder();
        for bad in ["", "   ", "en US", "en;q=0.5"] {
            assert!(
                matches!(
                    builder.language(LanguageKind::SpellCheck, bad),
                    Err(ConfigError::InvalidLanguageTag { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
        assert!(builder.build().spellcheck_languages().is_empty());
    }

    #[test]
    fn test_empty_toml_returns_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.general.url, "https://example.com");
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert!(config.policy.permit.is_empty());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
[window]
width = 1024

[policy]
permit = ["notification"]
spell = ["en_GB"]
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.policy.permit, ["notification"]);
        assert!(config.policy.languages.is_empty());
        assert_eq!(config.policy.spell, ["en_GB"]);
    }

    #[test]
    fn test_unknown_policy_key_rejected() {
        let toml = r#"
[policy]
permitt = ["audio"]
"#;
        assert!(Config::parse(toml).is_err());
    }

    #[test]
    fn test_load_missing_explicit_path_is_error() {
        let err = Config::load(Some(Path::new("/nonexistent/webwrap/config.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_explicit_file() {
        let path = std::env::temp_dir().join(format!("webwrap-config-{}.toml", std::process::id()));
        fs::write(&path, "[general]\nurl = \"https://servo.org\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.general.url, "https://servo.org");
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let path =
            std::env::temp_dir().join(format!("webwrap-invalid-{}.toml", std::process::id()));
        fs::write(&path, "[window\nwidth = ").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
