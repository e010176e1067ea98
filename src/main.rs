use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use itertools::Itertools;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use wotstyles::catalog::{Catalog, DisplayNames};
use wotstyles::game_constants::{Region, tier_roman};
use wotstyles::package::{self, PackageEntry};

/// Build World of Tanks style mod packages from vehicle definitions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Root directory of the vehicle definition tree, e.g.
    /// `source/res/scripts/item_defs/vehicles`
    #[clap(short, long)]
    vehicles: PathBuf,

    /// Path to the display-names table
    #[clap(short, long, default_value = "source/display_names.json")]
    display_names: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the vehicle catalog
    List,
    /// Build a style package from a selections file
    Pack {
        /// JSON array of `{vehicle, style, camo, paint}` selections
        #[clap(short, long)]
        selections: PathBuf,

        /// Output package path
        #[clap(short, long, default_value = package::DEFAULT_PACKAGE_NAME)]
        output: PathBuf,
    },
}

/// One row of the selections file.
#[derive(Debug, Deserialize)]
struct Selection {
    vehicle: String,
    style: String,
    #[serde(default)]
    camo: BTreeSet<Region>,
    #[serde(default)]
    paint: BTreeSet<Region>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let names =
        DisplayNames::load(&args.display_names).wrap_err("Failed to load display names table")?;
    let catalog =
        Catalog::load(&args.vehicles, &names).wrap_err("Failed to build vehicle catalog")?;

    match args.command {
        Command::List => list(&catalog),
        Command::Pack { selections, output } => pack(&catalog, &selections, &output)?,
    }

    Ok(())
}

fn list(catalog: &Catalog) {
    for vehicle in catalog.vehicles() {
        println!(
            "{} {} {} -- {} [{}]",
            vehicle.nation,
            tier_roman(vehicle.tier).unwrap_or("?"),
            vehicle.class,
            vehicle.display_name,
            vehicle.key,
        );
        for style in &vehicle.styles {
            println!("    style {}: {}", style.id, style.name);
        }
        println!(
            "    camo: [{}]  paint: [{}]",
            vehicle.camo_regions.iter().map(|r| r.name()).join(", "),
            vehicle.paint_regions.iter().map(|r| r.name()).join(", "),
        );
    }
}

fn pack(catalog: &Catalog, selections: &Path, output: &Path) -> Result<()> {
    let raw = fs::read_to_string(selections).wrap_err("Failed to read selections file")?;
    let selections: Vec<Selection> =
        serde_json::from_str(&raw).wrap_err("Malformed selections file")?;

    let mut entries = Vec::with_capacity(selections.len());
    for selection in &selections {
        let (destinations, content) = catalog
            .transform(
                &selection.vehicle,
                &selection.style,
                &selection.camo,
                &selection.paint,
            )
            .wrap_err_with(|| format!("Failed to style {}", selection.vehicle))?;
        entries.push(PackageEntry {
            destinations,
            content,
        });
    }

    let file = fs::File::create(output)
        .wrap_err_with(|| format!("Failed to create {}", output.display()))?;
    package::write_package(file, &entries)?;
    println!("Wrote {} ({} vehicles)", output.display(), entries.len());
    Ok(())
}
