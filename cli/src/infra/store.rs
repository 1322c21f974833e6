//! Infrastructure implementation of the `LocalModuleStore` port.
//!
//! `JsonModuleStore` keeps every application module in one JSON document,
//! rewritten atomically (temp file + rename) on each change.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::application::ports::LocalModuleStore;
use crate::domain::ApplicationModule;

/// Environment variable overriding the module store location.
pub const MODULES_ENV: &str = "CFDEPLOY_MODULES";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ModulesFile {
    #[serde(default)]
    modules: BTreeMap<String, ApplicationModule>,
}

/// Module store backed by `~/.cfdeploy/modules.json`.
pub struct JsonModuleStore {
    path: PathBuf,
}

impl JsonModuleStore {
    /// Store at `CFDEPLOY_MODULES`, or `~/.cfdeploy/modules.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        if let Ok(val) = std::env::var(MODULES_ENV) {
            return Ok(Self::with_path(PathBuf::from(val)));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_path(home.join(".cfdeploy").join("modules.json")))
    }

    /// Create a store with an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn load(&self) -> Result<ModulesFile> {
        if !self.path.exists() {
            return Ok(ModulesFile::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading module store {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing module store {}", self.path.display()))
    }

    fn write(&self, file: &ModulesFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(file).context("serializing modules")?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("finalizing module store {}", self.path.display()))?;
        Ok(())
    }

    /// Every stored module, ordered by local id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn modules(&self) -> Result<Vec<ApplicationModule>> {
        Ok(self.load()?.modules.into_values().collect())
    }
}

impl LocalModuleStore for JsonModuleStore {
    fn cloud_module(&self, local_id: &str) -> Result<Option<ApplicationModule>> {
        Ok(self.load()?.modules.remove(local_id))
    }

    fn existing_cloud_module(&self, app_name: &str) -> Result<Option<ApplicationModule>> {
        Ok(self
            .load()?
            .modules
            .into_values()
            .find(|m| m.deployed_name == app_name))
    }

    fn save_module(&self, module: &ApplicationModule) -> Result<()> {
        let mut file = self.load()?;
        file.modules
            .insert(module.local_id.clone(), module.clone());
        self.write(&file)
    }

    fn remove_module(&self, local_id: &str) -> Result<()> {
        let mut file = self.load()?;
        if file.modules.remove(local_id).is_some() {
            self.write(&file)?;
        }
        Ok(())
    }
}
