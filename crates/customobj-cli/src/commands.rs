use std::collections::BTreeMap;

use anyhow::{bail, Context};
use colored::Colorize;
use customobj_reconcile::schema::{self, FieldKind};
use customobj_reconcile::{guard, DesiredObject, Reconciler, ResourceData};
use customobj_store::{FileRemoteStore, RemoteStore};
use customobj_types::values_equivalent;
use serde::Serialize;

use crate::cli::*;
use crate::config::CliConfig;
use crate::statefile::StateFile;

/// What happened to one named resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Created,
    Updated,
    /// Moved to a new container or key.
    Replaced,
    Unchanged,
    Deleted,
    Refreshed,
    /// No remote object to act on.
    Vanished,
    Imported,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Change {
    pub name: String,
    pub action: Action,
    pub identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl Change {
    fn new(name: &str, data: &ResourceData, action: Action) -> Self {
        Self {
            name: name.to_string(),
            action,
            identity: format!("{}/{}", data.container, data.key),
            version: data.version.map(|v| v.get()),
        }
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(&cli.config)?;
    let format = cli.format;

    match cli.command {
        Command::Apply(args) => with_store(&config, format, |rec, state| {
            apply(rec, &config.manifest(), state, args.keep_orphans)
        }),
        Command::Refresh => with_store(&config, format, |rec, state| refresh(rec, state)),
        Command::Destroy(args) => with_store(&config, format, |rec, state| {
            destroy(rec, state, args.name.as_deref())
        }),
        Command::Import(args) => with_store(&config, format, |rec, state| {
            import(rec, &config.manifest(), state, &args.name, &args.id)
        }),
        Command::Show(args) => cmd_show(&config, args, format),
        Command::Schema => cmd_schema(format),
    }
}

/// Open the store and state, run `op`, and save state whether or not it
/// succeeded. Writes that landed before a failure stay recorded.
fn with_store<F>(config: &CliConfig, format: OutputFormat, op: F) -> anyhow::Result<()>
where
    F: FnOnce(&Reconciler<FileRemoteStore>, &mut StateFile) -> anyhow::Result<Vec<Change>>,
{
    let store = FileRemoteStore::open(&config.store_path)
        .with_context(|| format!("opening store {}", config.store_path.display()))?;
    let reconciler = Reconciler::with_config(store, config.reconciler_config(), guard::global());
    let mut state = StateFile::load(&config.state_path)?;

    let result = op(&reconciler, &mut state);
    state.save(&config.state_path)?;
    report(&result?, format)
}

/// Drive the store toward `manifest`, one named resource at a time.
pub fn apply<S: RemoteStore>(
    reconciler: &Reconciler<S>,
    manifest: &BTreeMap<String, DesiredObject>,
    state: &mut StateFile,
    keep_orphans: bool,
) -> anyhow::Result<Vec<Change>> {
    let mut changes = Vec::new();

    for (name, desired) in manifest {
        let data = state
            .resources
            .entry(name.clone())
            .or_insert_with(|| ResourceData::new(desired.clone()));

        if !data.is_absent() {
            reconciler
                .read(data)
                .with_context(|| format!("refreshing {name}"))?;
        }

        let action = if data.is_absent() {
            data.declare(desired.clone());
            reconciler
                .create(data)
                .with_context(|| format!("creating {name}"))?;
            Action::Created
        } else {
            let value_changed = !values_equivalent(&data.value, &desired.value);
            data.declare(desired.clone());
            let action = if data.identity_changed() {
                Action::Replaced
            } else if value_changed {
                Action::Updated
            } else {
                Action::Unchanged
            };
            if action != Action::Unchanged {
                reconciler
                    .update(data)
                    .with_context(|| format!("updating {name}"))?;
            }
            action
        };
        changes.push(Change::new(name, data, action));
    }

    if !keep_orphans {
        let orphans: Vec<String> = state
            .resources
            .keys()
            .filter(|name| !manifest.contains_key(*name))
            .cloned()
            .collect();
        for name in orphans {
            let Some(data) = state.resources.get_mut(&name) else {
                continue;
            };
            if !data.is_absent() {
                reconciler
                    .read(data)
                    .with_context(|| format!("refreshing {name}"))?;
            }
            let action = if data.is_absent() {
                Action::Vanished
            } else {
                reconciler
                    .delete(data)
                    .with_context(|| format!("deleting {name}"))?;
                Action::Deleted
            };
            changes.push(Change::new(&name, data, action));
            state.resources.remove(&name);
        }
    }

    Ok(changes)
}

/// Re-read every resource that has a remote id.
pub fn refresh<S: RemoteStore>(
    reconciler: &Reconciler<S>,
    state: &mut StateFile,
) -> anyhow::Result<Vec<Change>> {
    let mut changes = Vec::new();
    for (name, data) in state.resources.iter_mut() {
        if data.is_absent() {
            continue;
        }
        reconciler
            .read(data)
            .with_context(|| format!("refreshing {name}"))?;
        let action = if data.is_absent() {
            Action::Vanished
        } else {
            Action::Refreshed
        };
        changes.push(Change::new(name, data, action));
    }
    Ok(changes)
}

/// Delete `name`, or every resource when no name is given, and drop it
/// from state.
pub fn destroy<S: RemoteStore>(
    reconciler: &Reconciler<S>,
    state: &mut StateFile,
    name: Option<&str>,
) -> anyhow::Result<Vec<Change>> {
    let names: Vec<String> = match name {
        Some(name) if state.resources.contains_key(name) => vec![name.to_string()],
        Some(name) => bail!("no resource named {name} in state"),
        None => state.resources.keys().cloned().collect(),
    };

    let mut changes = Vec::new();
    for name in names {
        let Some(data) = state.resources.get_mut(&name) else {
            continue;
        };
        let action = if data.is_absent() {
            Action::Vanished
        } else {
            reconciler
                .delete(data)
                .with_context(|| format!("deleting {name}"))?;
            Action::Deleted
        };
        changes.push(Change::new(&name, data, action));
        state.resources.remove(&name);
    }
    Ok(changes)
}

/// Adopt the remote object `id` under the declared `name`.
pub fn import<S: RemoteStore>(
    reconciler: &Reconciler<S>,
    manifest: &BTreeMap<String, DesiredObject>,
    state: &mut StateFile,
    name: &str,
    id: &str,
) -> anyhow::Result<Vec<Change>> {
    let Some(desired) = manifest.get(name) else {
        bail!("{name} is not declared in the manifest");
    };
    if state.resources.get(name).is_some_and(|data| !data.is_absent()) {
        bail!("{name} is already managed");
    }

    let data = reconciler
        .import(id, desired.clone())
        .with_context(|| format!("importing {name}"))?;
    let change = Change::new(name, &data, Action::Imported);
    state.resources.insert(name.to_string(), data);
    Ok(vec![change])
}

fn report(changes: &[Change], format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(changes)?);
        return Ok(());
    }
    if changes.is_empty() {
        println!("Nothing to do.");
    }
    for change in changes {
        let label = match change.action {
            Action::Created => "created".green(),
            Action::Updated => "updated".yellow(),
            Action::Replaced => "replaced".yellow().bold(),
            Action::Unchanged => "unchanged".dimmed(),
            Action::Deleted => "deleted".red(),
            Action::Refreshed => "refreshed".cyan(),
            Action::Vanished => "vanished".red().dimmed(),
            Action::Imported => "imported".blue(),
        };
        match change.version {
            Some(v) => println!(
                "  {:<10} {} ({}, v{})",
                label,
                change.name.bold(),
                change.identity,
                v
            ),
            None => println!("  {:<10} {} ({})", label, change.name.bold(), change.identity),
        }
    }
    Ok(())
}

fn cmd_show(config: &CliConfig, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let state = StateFile::load(&config.state_path)?;
    let selected: BTreeMap<&String, &ResourceData> = match &args.name {
        Some(name) => match state.resources.get_key_value(name) {
            Some(entry) => BTreeMap::from([entry]),
            None => bail!("no resource named {name} in state"),
        },
        None => state.resources.iter().collect(),
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }
    if selected.is_empty() {
        println!("No resources in state.");
    }
    for (name, data) in selected {
        println!("{} {}/{}", name.bold(), data.container, data.key.yellow());
        match (&data.id, data.version) {
            (Some(id), Some(version)) => println!("  id: {}  version: {}", id.as_str().cyan(), version),
            _ => println!("  {}", "not created".dimmed()),
        }
        println!("  value: {}", data.value);
    }
    Ok(())
}

#[derive(Serialize)]
struct SchemaDoc {
    description: &'static str,
    fields: &'static [schema::FieldSchema],
}

fn cmd_schema(format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let doc = SchemaDoc {
            description: schema::RESOURCE_DESCRIPTION,
            fields: schema::FIELDS,
        };
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }
    println!("{}\n", schema::RESOURCE_DESCRIPTION);
    for field in schema::FIELDS {
        let kind = match field.kind {
            FieldKind::Required => "required".green(),
            FieldKind::Computed => "computed".cyan(),
        };
        println!("  {:<10} {:<9} {}", field.name.bold(), kind, field.description);
    }
    Ok(())
}
