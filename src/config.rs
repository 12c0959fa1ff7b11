//! Runtime configuration loaded from JSON

use crate::context::ContextOptions;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How leaked results found at teardown are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakPolicy {
    Ignore,
    #[default]
    Warn,
    /// Treat any leak as a failed run
    Fail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Track results that are still shared when the context is torn down
    #[serde(default)]
    pub track_allocated_objects: bool,

    #[serde(default)]
    pub leak_policy: LeakPolicy,
}

impl RuntimeConfig {
    pub fn context_options(&self) -> ContextOptions {
        ContextOptions {
            track_allocated_objects: self.track_allocated_objects,
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: RuntimeConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        // Leaks can only be reported when allocations are tracked
        if self.leak_policy == LeakPolicy::Fail && !self.track_allocated_objects {
            return Err(Error::Config {
                message: "leak_policy \"fail\" requires track_allocated_objects".to_string(),
            });
        }
        Ok(())
    }
}
