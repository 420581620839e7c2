#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for authoring altars and rehearsing rituals.

mod rehearsal;

use std::path::PathBuf;

use altars_core::{location, AltarName, BlockLocation, ItemDescriptor, KnownWorlds};
use altars_host::Engine;
use altars_store::{
    load_settings, DefinitionStore, Edit, Editor, Grants, ItemTarget, PedestalTarget,
    SettingsReport,
};
use altars_world::{query, World};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rehearsal::StageSpawner;

const REHEARSAL_SEED: u64 = 0x0a17_a125;

/// Author altar definitions and rehearse rituals without a game server.
#[derive(Debug, Parser)]
#[command(name = "altars", version)]
struct Cli {
    /// Altar definition file.
    #[arg(long, global = true, default_value = "altars.toml")]
    data: PathBuf,

    /// Configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Name of a loaded world; repeat for several.
    #[arg(long = "world", global = true, default_value = "world")]
    worlds: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an empty altar.
    Create {
        /// Name of the new altar.
        name: String,
    },
    /// Delete an altar.
    Delete {
        /// Altar to delete.
        name: String,
    },
    /// List stored altars.
    List {
        /// Print the altars as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Change an altar.
    Edit {
        /// Altar to change.
        name: String,
        #[command(subcommand)]
        action: EditAction,
    },
    /// Load everything and report problems and unmet requirements.
    Check,
    /// Run a headless ritual from placement to summon.
    Rehearse {
        /// Altar to rehearse.
        name: String,
        /// Treat named bosses as known to the host.
        #[arg(long)]
        boss_known: bool,
    },
}

#[derive(Debug, Subcommand)]
enum EditAction {
    /// Replace a setting.
    #[command(subcommand)]
    Set(SetTarget),
    /// Add a part.
    #[command(subcommand)]
    Add(AddTarget),
    /// Remove parts.
    #[command(subcommand)]
    Remove(RemoveTarget),
}

#[derive(Debug, Subcommand)]
enum SetTarget {
    /// Center block, as `world,x,y,z`.
    Center {
        /// Encoded location.
        location: String,
    },
    /// Boss summoned on completion.
    Mob {
        /// Boss name, `DefaultBoss` for the fallback.
        name: String,
    },
}

#[derive(Debug, Subcommand)]
enum AddTarget {
    /// Item that activates the altar.
    Itemcenter {
        /// Material name.
        material: String,
        /// Custom display name.
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Pedestal block, as `world,x,y,z`.
    Pedestal {
        /// Encoded location.
        location: String,
    },
    /// Required item entry.
    Item {
        /// Material name.
        material: String,
        /// Units required.
        #[arg(allow_negative_numbers = true)]
        amount: i64,
        /// Custom display name.
        #[arg(long)]
        display_name: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum RemoveTarget {
    /// One pedestal, or `all`.
    Pedestal {
        /// Encoded location or `all`.
        target: String,
    },
    /// Required entries matching an item, or `all`.
    Item {
        /// Material name or `all`.
        target: String,
        /// Custom display name of the item to match.
        #[arg(long)]
        display_name: Option<String>,
    },
}

/// Everything loaded from disk for one invocation.
struct Session {
    store: DefinitionStore,
    report: SettingsReport,
    worlds: KnownWorlds,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let store = DefinitionStore::open(&cli.data)
            .with_context(|| format!("failed to open {}", cli.data.display()))?;
        let report = load_settings(&cli.config)
            .with_context(|| format!("failed to load {}", cli.config.display()))?;
        let worlds = cli.worlds.iter().cloned().collect();
        Ok(Self {
            store,
            report,
            worlds,
        })
    }

    fn editor(&self) -> Editor {
        Editor::new(Grants::all())
            .with_worlds(self.worlds.clone())
            .with_max_pedestal_radius(self.report.settings.altar.max_pedestal_radius)
    }

    fn engine(&self, spawner: StageSpawner) -> Engine<StageSpawner> {
        let mut engine = Engine::new(spawner, REHEARSAL_SEED);
        let _ = engine.reload(self.report.clone(), self.store.records(), self.worlds.clone());
        engine
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Create { name } => author(&cli, Edit::Create { name: name.clone() }),
        Command::Delete { name } => author(&cli, Edit::Delete { name: name.clone() }),
        Command::List { json } => list(&cli, *json),
        Command::Edit { name, action } => {
            let worlds: KnownWorlds = cli.worlds.iter().cloned().collect();
            let edit = edit_for(name, action, &worlds)?;
            author(&cli, edit)
        }
        Command::Check => check(&cli),
        Command::Rehearse { name, boss_known } => {
            let session = Session::open(&cli)?;
            let mut engine = session.engine(StageSpawner::new(*boss_known));
            let outcome = rehearsal::rehearse(&mut engine, &AltarName::new(name.as_str()))?;
            println!("{outcome}");
            Ok(())
        }
    }
}

fn author(cli: &Cli, edit: Edit) -> Result<()> {
    let mut session = Session::open(cli)?;
    let editor = session.editor();
    let mut engine = session.engine(StageSpawner::new(false));
    let (change, _) = engine
        .apply_edit(&mut session.store, &editor, edit)
        .context("edit failed")?;
    println!("{change}");
    print_diagnostics(engine.world());
    Ok(())
}

fn edit_for(name: &str, action: &EditAction, worlds: &KnownWorlds) -> Result<Edit> {
    let name = name.to_owned();
    let edit = match action {
        EditAction::Set(SetTarget::Center { location }) => Edit::SetCenter {
            name,
            location: parse_location(location, worlds)?,
        },
        EditAction::Set(SetTarget::Mob { name: boss }) => Edit::SetBoss {
            name,
            boss: boss.clone(),
        },
        EditAction::Add(AddTarget::Itemcenter {
            material,
            display_name,
        }) => Edit::SetCentralItem {
            name,
            item: item(material, display_name.as_deref()),
        },
        EditAction::Add(AddTarget::Pedestal { location }) => Edit::AddPedestal {
            name,
            location: parse_location(location, worlds)?,
        },
        EditAction::Add(AddTarget::Item {
            material,
            amount,
            display_name,
        }) => Edit::AddRequiredItem {
            name,
            item: item(material, display_name.as_deref()),
            amount: *amount,
        },
        EditAction::Remove(RemoveTarget::Pedestal { target }) => Edit::RemovePedestal {
            name,
            target: if target.eq_ignore_ascii_case("all") {
                PedestalTarget::All
            } else {
                PedestalTarget::One(parse_location(target, worlds)?)
            },
        },
        EditAction::Remove(RemoveTarget::Item {
            target,
            display_name,
        }) => Edit::RemoveRequiredItem {
            name,
            target: if target.eq_ignore_ascii_case("all") {
                ItemTarget::All
            } else {
                ItemTarget::Matching(item(target, display_name.as_deref()))
            },
        },
    };
    Ok(edit)
}

fn parse_location(text: &str, worlds: &KnownWorlds) -> Result<BlockLocation> {
    location::decode(Some(text), worlds).with_context(|| {
        format!("'{text}' is not a location in a loaded world (expected world,x,y,z)")
    })
}

fn item(material: &str, display_name: Option<&str>) -> ItemDescriptor {
    let item = ItemDescriptor::new(material);
    match display_name {
        Some(name) => item.with_display_name(name),
        None => item,
    }
}

#[derive(Debug, Serialize)]
struct AltarListing {
    name: String,
    boss: String,
    center: Option<String>,
    pedestals: Vec<String>,
    required: Vec<RequiredListing>,
}

#[derive(Debug, Serialize)]
struct RequiredListing {
    item: String,
    amount: i64,
}

fn list(cli: &Cli, json: bool) -> Result<()> {
    let session = Session::open(cli)?;
    let catalog = session.store.catalog();
    let names = session.editor().list(catalog)?;

    if json {
        let listings: Vec<AltarListing> = catalog
            .records()
            .into_iter()
            .filter(|record| names.contains(&record.name.as_str()))
            .map(|record| AltarListing {
                name: record.name.to_string(),
                boss: record
                    .boss_name
                    .unwrap_or_else(|| altars_core::DEFAULT_BOSS_NAME.to_owned()),
                center: record.center,
                pedestals: record.pedestal_locations,
                required: record
                    .required_items
                    .into_iter()
                    .filter_map(Result::ok)
                    .map(|(item, amount)| RequiredListing {
                        item: item.label(),
                        amount,
                    })
                    .collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    println!("Altars in {}:", session.store.path().display());
    if names.is_empty() {
        println!("  (none)");
    }
    for name in names {
        println!("  - {name}");
    }
    Ok(())
}

fn check(cli: &Cli) -> Result<()> {
    let session = Session::open(cli)?;
    let engine = session.engine(StageSpawner::new(false));
    let world = engine.world();

    for altar in query::altars(world) {
        let Some(center) = altar.center() else {
            println!("{}: dormant (no center)", altar.name());
            continue;
        };
        println!(
            "{}: center {center}, {} pedestal(s), summons {}",
            altar.name(),
            altar.pedestals().len(),
            altar.boss().label()
        );
        if altar.central_item().is_none() {
            println!("  no central item; the altar cannot be activated");
        }
        for shortfall in query::shortfalls(world, altar) {
            println!(
                "  needs {} x {} ({} placed)",
                shortfall.missing(),
                shortfall.item().label(),
                shortfall.placed()
            );
        }
    }
    print_diagnostics(world);
    Ok(())
}

fn print_diagnostics(world: &World) {
    let diagnostics = query::diagnostics(world);
    let Some(summary) = diagnostics.summary() else {
        return;
    };
    println!("Problems found: {summary}");
    for diagnostic in diagnostics.entries() {
        println!("  [{}] {}", diagnostic.category(), diagnostic.message());
    }
}
