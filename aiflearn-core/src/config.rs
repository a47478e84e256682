//! Configuration for aiflearn-core.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> environment -> explicit overrides. Besides the core
//! settings, the configuration can carry named parameter tables used to build
//! transformers:
//!
//! ```toml
//! [provenance]
//! max_lineage_depth = 16
//!
//! [transformers.Reweighing]
//! unprivileged_groups = ["female"]
//! privileged_groups = ["male"]
//! ```

use crate::params::ParamRecord;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub provenance: ProvenanceConfig,
    /// Parameter tables keyed by transformer type name.
    #[serde(default)]
    pub transformers: BTreeMap<String, ParamRecord>,
}

impl CoreConfig {
    /// Parameters configured for `transformer`, empty when none are set.
    ///
    /// Table names match ASCII case-insensitively, because tables set through
    /// the environment arrive lowercased (`AIFLEARN_TRANSFORMERS__REWEIGHING__..`
    /// lands under `reweighing`). An exact match wins over a folded one.
    pub fn params_for(&self, transformer: &str) -> Arc<ParamRecord> {
        let record = self.transformers.get(transformer).or_else(|| {
            self.transformers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(transformer))
                .map(|(_, record)| record)
        });
        Arc::new(record.cloned().unwrap_or_default())
    }
}

/// Provenance inspection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceConfig {
    /// Deepest ancestor visited when walking lineage.
    #[serde(default = "default_max_lineage_depth")]
    pub max_lineage_depth: usize,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            max_lineage_depth: default_max_lineage_depth(),
        }
    }
}

fn default_max_lineage_depth() -> usize {
    64
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `AIFLEARN_`, nested with `__`)
/// 3. Workspace-local config (`.aiflearn/config.toml`)
/// 4. User config (`~/.config/aiflearn/config.toml`)
/// 5. Built-in defaults
///
/// Layers merge key by key. `[transformers.<Name>]` tables from different
/// layers are unioned, and a parameter set in a higher layer replaces only that
/// parameter. `overrides` is serialized whole, so its `provenance` values always
/// win, while its `transformers` entries are added on top of the loaded tables
/// rather than replacing them; an empty map leaves them untouched.
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&CoreConfig>,
) -> Result<CoreConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(CoreConfig::default()));

    if let Some(config_dir) = directories::ProjectDirs::from("org", "aiflearn", "aiflearn") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            debug!(path = %user_config.display(), "Merging user config");
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".aiflearn").join("config.toml");
        if ws_config.exists() {
            debug!(path = %ws_config.display(), "Merging workspace config");
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // AIFLEARN_PROVENANCE__MAX_LINEAGE_DEPTH, etc.
    figment = figment.merge(Env::prefixed("AIFLEARN_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}
