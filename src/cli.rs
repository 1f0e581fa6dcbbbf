//! Command-line interface for par-connect.
//!
//! This module handles CLI argument parsing and the read-side subcommands
//! that inspect the profile store: listing, chain resolution, launch
//! planning, and `.rdp` artifact export.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::connector::{launch, rdp_file};
use crate::profile::storage::{YamlStore, profiles_path};
use crate::profile::store::ProfileStore;
use crate::profile::types::{Profile, ProfileCollection};

/// par-connect - remote connection profile manager
#[derive(Parser)]
#[command(name = "par-connect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Profiles file to operate on (default: the user config directory)
    #[arg(long, value_name = "FILE", global = true)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all profiles in display order
    List {
        /// Emit machine-readable JSON instead of the table
        #[arg(long)]
        json: bool,
    },

    /// Show the prerequisite chain of a profile, outermost first
    Chain {
        /// Profile name (case-insensitive)
        name: String,
    },

    /// Resolve the ordered launch plan for a profile
    Plan {
        /// Profile name (case-insensitive)
        name: String,

        /// Emit machine-readable JSON instead of the table
        #[arg(long)]
        json: bool,
    },

    /// Render the .rdp artifact for an RDP profile
    ExportRdp {
        /// Profile name (case-insensitive)
        name: String,

        /// Override the endpoint host (e.g., a forwarded localhost)
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Override the endpoint port (e.g., a forwarded local port)
        #[arg(long, value_name = "PORT")]
        port: Option<u16>,

        /// Write to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

/// Process CLI arguments and run the selected subcommand
pub fn run(cli: Cli) -> Result<()> {
    let path = cli.file.unwrap_or_else(profiles_path);
    let store = YamlStore::open(&path)
        .with_context(|| format!("Failed to open profile store at {path:?}"))?;
    let collection = ProfileCollection::from_profiles(store.all());

    match cli.command {
        Commands::List { json } => list(&collection, json),
        Commands::Chain { name } => chain(&collection, &name),
        Commands::Plan { name, json } => plan(&collection, &name, json),
        Commands::ExportRdp {
            name,
            host,
            port,
            out,
        } => export_rdp(&collection, &name, host.as_deref(), port, out.as_deref()),
    }
}

fn find<'a>(collection: &'a ProfileCollection, name: &str) -> Result<&'a Profile> {
    collection
        .find_by_name(name)
        .with_context(|| format!("No profile named '{name}'"))
}

fn describe(profile: &Profile) -> String {
    let id = profile
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let endpoint = format!("{}:{}", profile.host, profile.effective_port());
    let prerequisite = profile
        .required_connection_id
        .map(|id| format!("  requires #{id}"))
        .unwrap_or_default();
    format!(
        "#{id:<4} {:<28} {endpoint}{prerequisite}",
        profile.display_label()
    )
}

fn list(collection: &ProfileCollection, json: bool) -> Result<()> {
    if json {
        let profiles = collection.to_vec();
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }
    if collection.is_empty() {
        println!("No profiles configured.");
        return Ok(());
    }
    for profile in collection.profiles_ordered() {
        println!("{}", describe(profile));
    }
    Ok(())
}

fn chain(collection: &ProfileCollection, name: &str) -> Result<()> {
    let profile = find(collection, name)?;
    let chain = collection.chain(profile.key)?;
    for (i, step) in chain.iter().enumerate() {
        println!("{}. {}", i + 1, describe(step));
    }
    Ok(())
}

fn plan(collection: &ProfileCollection, name: &str, json: bool) -> Result<()> {
    let profile = find(collection, name)?;
    let Some(id) = profile.id else {
        bail!("Profile '{name}' has not been committed yet and cannot be launched");
    };
    let steps = launch::resolve_launch_plan(collection, id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&steps)?);
        return Ok(());
    }
    for (i, step) in steps.iter().enumerate() {
        println!(
            "{}. {} -> {}",
            i + 1,
            step.profile.display_label(),
            step.endpoint
        );
    }
    Ok(())
}

fn export_rdp(
    collection: &ProfileCollection,
    name: &str,
    host: Option<&str>,
    port: Option<u16>,
    out: Option<&std::path::Path>,
) -> Result<()> {
    let profile = find(collection, name)?;
    match out {
        Some(path) => {
            rdp_file::save_as(profile, path, host, port)?;
            println!("Wrote {path:?}");
        }
        None => {
            let contents = rdp_file::render(profile, host, port)?;
            print!("{contents}");
        }
    }
    Ok(())
}
