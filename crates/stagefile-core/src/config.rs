//! Session configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::path;

/// What to do when an operation would overwrite an existing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OnConflict {
    /// Ask once per conflicting item.
    #[default]
    Ask,
    /// Always overwrite.
    Overwrite,
    /// Always skip the conflicting item.
    Skip,
}

/// Configuration for a file manager session.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SessionConfig {
    /// Directory the session starts in.
    #[builder(default = "path::ROOT.to_string()")]
    #[serde(default = "default_initial_directory")]
    pub initial_directory: String,

    /// Include entries whose name starts with a dot.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub show_hidden: bool,

    /// Default conflict handling for the presentation layer.
    #[builder(default)]
    #[serde(default)]
    pub on_conflict: OnConflict,

    /// Refuse to mark a new batch while one is still pending.
    #[builder(default = "false")]
    #[serde(default)]
    pub reject_remark_while_pending: bool,

    /// Yield to the host once before running a mutating command.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub yield_before_commit: bool,
}

fn default_true() -> bool {
    true
}

fn default_initial_directory() -> String {
    path::ROOT.to_string()
}

impl SessionConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref dir) = self.initial_directory {
            if !path::is_absolute(dir) {
                return Err(format!("Initial directory must be absolute: {dir}"));
            }
        }
        Ok(())
    }
}

impl SessionConfig {
    /// Create a new session config builder.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Create a config starting in the given directory.
    pub fn new(initial_directory: impl Into<String>) -> Self {
        Self {
            initial_directory: initial_directory.into(),
            show_hidden: true,
            on_conflict: OnConflict::Ask,
            reject_remark_while_pending: false,
            yield_before_commit: true,
        }
    }

    /// Check if an entry should be left out of listings.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.show_hidden && name.starts_with('.')
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(path::ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SessionConfig::builder()
            .initial_directory("/saves")
            .on_conflict(OnConflict::Overwrite)
            .reject_remark_while_pending(true)
            .build()
            .unwrap();

        assert_eq!(config.initial_directory, "/saves");
        assert_eq!(config.on_conflict, OnConflict::Overwrite);
        assert!(config.reject_remark_while_pending);
        assert!(config.show_hidden);
        assert!(config.yield_before_commit);
    }

    #[test]
    fn test_config_builder_rejects_relative_start() {
        let result = SessionConfig::builder().initial_directory("saves").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_should_skip_hidden() {
        let mut config = SessionConfig::default();
        assert!(!config.should_skip_hidden(".config"));

        config.show_hidden = false;
        assert!(config.should_skip_hidden(".config"));
        assert!(!config.should_skip_hidden("config"));
    }

    #[test]
    fn test_on_conflict_parse() {
        assert_eq!("skip".parse::<OnConflict>().unwrap(), OnConflict::Skip);
        assert_eq!(OnConflict::Ask.to_string(), "ask");
        assert!("maybe".parse::<OnConflict>().is_err());
    }
}
