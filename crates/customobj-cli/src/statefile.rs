//! Persisted local state: one [`ResourceData`] per declared name.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use customobj_reconcile::ResourceData;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    pub resources: BTreeMap<String, ResourceData>,
}

impl StateFile {
    /// Load from `path`; a missing file is an empty state.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading state {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing state {}", path.display()))
    }

    /// Write atomically to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.write_all(b"\n")?;
        tmp.persist(path)
            .with_context(|| format!("writing state {}", path.display()))?;
        Ok(())
    }
}
