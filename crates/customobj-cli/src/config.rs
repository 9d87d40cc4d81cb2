use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use customobj_reconcile::{DesiredObject, ReconcilerConfig, ValueDecoding};
use serde::{Deserialize, Serialize};

/// Contents of `customobj.toml`: where things live and what to declare.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// File backing the object store.
    pub store_path: PathBuf,
    /// File holding reconciled local state.
    pub state_path: PathBuf,
    pub value_decoding: ValueDecoding,
    #[serde(rename = "object")]
    pub objects: Vec<ObjectDecl>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(".customobj/store.json"),
            state_path: PathBuf::from(".customobj/state.json"),
            value_decoding: ValueDecoding::default(),
            objects: Vec::new(),
        }
    }
}

/// One declared custom object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDecl {
    /// Local resource name, unique within the manifest.
    pub name: String,
    pub container: String,
    pub key: String,
    /// Raw JSON text.
    pub value: String,
}

impl CliConfig {
    /// Load from `path`. A missing file yields the defaults and an empty
    /// manifest. Relative paths in the file resolve against its directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str::<CliConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            CliConfig::default()
        };

        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.store_path = resolve(base, &config.store_path);
            config.state_path = resolve(base, &config.state_path);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject duplicate names and invalid declarations.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for decl in &self.objects {
            if !seen.insert(decl.name.as_str()) {
                bail!("duplicate object name: {}", decl.name);
            }
            decl.desired()
                .validate()
                .with_context(|| format!("object {}", decl.name))?;
        }
        Ok(())
    }

    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            value_decoding: self.value_decoding,
        }
    }

    /// Declared objects by name.
    pub fn manifest(&self) -> BTreeMap<String, DesiredObject> {
        self.objects
            .iter()
            .map(|decl| (decl.name.clone(), decl.desired()))
            .collect()
    }
}

impl ObjectDecl {
    pub fn desired(&self) -> DesiredObject {
        DesiredObject::new(&self.container, &self.key, &self.value)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
