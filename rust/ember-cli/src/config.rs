//! Configuration file parsing for `ember.toml`.
//!
//! Searches the current directory then its ancestors, falling back to
//! `~/.config/ember/ember.toml` if no project-level file is found.

use std::path::{Path, PathBuf};

use ember_vm::config::MAX_STACK_CAPACITY;
use ember_vm::VmConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "ember.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid toml in '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("[vm] stack_capacity must be at least 1")]
    ZeroStackCapacity,
    #[error("[vm] stack_capacity {found} exceeds the limit of {limit}")]
    StackCapacityTooLarge { found: usize, limit: usize },
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct EmberConfig {
    #[serde(default)]
    pub vm: VmSection,
    #[serde(default)]
    pub repl: ReplSection,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VmSection {
    #[serde(default = "default_stack_capacity")]
    pub stack_capacity: usize,
}

impl Default for VmSection {
    fn default() -> Self {
        Self {
            stack_capacity: default_stack_capacity(),
        }
    }
}

fn default_stack_capacity() -> usize {
    ember_vm::config::DEFAULT_STACK_CAPACITY
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReplSection {
    /// History file; relative paths and `~/` resolve under HOME
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<String>,
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

impl Default for ReplSection {
    fn default() -> Self {
        Self {
            history_file: None,
            prompt: default_prompt(),
        }
    }
}

fn default_prompt() -> String {
    "ember>".to_string()
}

impl EmberConfig {
    /// Load the config named on the command line, or discover one. Returns
    /// the path that was used, if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Option<PathBuf>, Self), ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let cwd = std::env::current_dir().ok();
                discover(cwd.as_deref(), home_dir().as_deref())
            }
        };
        match path {
            Some(path) => {
                let cfg = Self::load_from(&path)?;
                Ok((Some(path), cfg))
            }
            None => Ok((None, Self::default())),
        }
    }

    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML string directly.
    pub fn from_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let found = self.vm.stack_capacity;
        if found == 0 {
            return Err(ConfigError::ZeroStackCapacity);
        }
        if found > MAX_STACK_CAPACITY {
            return Err(ConfigError::StackCapacityTooLarge {
                found,
                limit: MAX_STACK_CAPACITY,
            });
        }
        Ok(())
    }

    pub fn vm_config(&self) -> VmConfig {
        VmConfig::new().with_stack_capacity(self.vm.stack_capacity)
    }

    /// Generate a default `ember.toml` template.
    pub fn default_template() -> &'static str {
        r#"# Ember configuration

[vm]
# Maximum number of values on the operand stack
stack_capacity = 256

[repl]
prompt = "ember>"
# history_file = "~/.ember/repl_history"
"#
    }
}

/// Find `ember.toml` in `start` or an ancestor, then under
/// `<home>/.config/ember/`.
pub fn discover(start: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    if let Some(start) = start {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    let global = home?.join(".config").join("ember").join(CONFIG_FILE);
    global.is_file().then_some(global)
}

pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
