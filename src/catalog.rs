//! Catalog construction from a tree of vehicle definition documents.
//!
//! The catalog is built once at startup by scanning a directory tree
//! nested under nation-named directories (the game's
//! `res/scripts/item_defs/vehicles` layout) and is immutable
//! afterwards. Each file contributes one [`Vehicle`]: its stripped raw
//! document, the styles discoverable under `models`/`sets`, and the
//! regions its customization areas accept.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Component, Path, PathBuf};

use itertools::Itertools;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::document::strip_metadata_line;
use crate::error::Error;
use crate::game_constants::{Region, nation_display_name};
use crate::transform;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed document {}: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("unknown nation directory {code:?} for {}", path.display())]
    UnknownNation { code: String, path: PathBuf },
    #[error("unknown customization area code {code:?} in {}", path.display())]
    UnknownAreaCode { code: String, path: PathBuf },
    #[error("no display-names entry for vehicle {0:?}")]
    MissingDisplayEntry(String),
    #[error("malformed display names table: {0}")]
    DisplayNames(#[from] serde_json::Error),
    #[error("vehicle {0:?} is not in the catalog")]
    VehicleNotFound(String),
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Per-vehicle display metadata from the external lookup table.
/// Unknown fields are rejected so schema drift fails the load instead
/// of being silently ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleNames {
    pub name: String,
    pub tier: u8,
    pub class: String,
    #[serde(default)]
    pub styles: HashMap<String, String>,
}

/// The display-names table, keyed by vehicle key.
///
/// Schema: `{vehicle_key: {"name", "tier", "class",
/// "styles": {style_id: display_name}}}`.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct DisplayNames(HashMap<String, VehicleNames>);

impl DisplayNames {
    pub fn load(path: &Path) -> Result<DisplayNames, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn vehicle(&self, key: &str) -> Option<&VehicleNames> {
        self.0.get(key)
    }
}

/// A selectable style: the tag used inside the document plus the name
/// shown to users.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Style {
    pub id: String,
    pub name: String,
}

/// A single vehicle's catalog entry. Frozen once the catalog is built.
#[derive(Debug, Clone)]
pub struct Vehicle {
    /// Root element tag up to the first `.`.
    pub key: String,
    /// Document text with the metadata line already stripped.
    pub raw_document: String,
    /// Nation display name, resolved from the containing directory.
    pub nation: String,
    pub display_name: String,
    pub tier: u8,
    pub class: String,
    /// Unique (id, display name) pairs, ordered by id.
    pub styles: Vec<Style>,
    pub camo_regions: BTreeSet<Region>,
    pub paint_regions: BTreeSet<Region>,
    /// Archive paths the transformed document must be written at. A
    /// vehicle whose asset is mounted more than once has several.
    pub destination_paths: Vec<String>,
}

/// The immutable vehicle catalog.
#[derive(Debug)]
pub struct Catalog {
    vehicles: HashMap<String, Vehicle>,
}

impl Catalog {
    /// Scan `root` bottom-up and build the catalog.
    ///
    /// Any load error -- unreadable or malformed file, unknown nation
    /// or area code, missing display-names entry -- fails the whole
    /// build; there is no partial catalog. Vehicles without styles are
    /// pruned, which is normal, not an error.
    pub fn load(root: &Path, names: &DisplayNames) -> Result<Catalog, CatalogError> {
        let mut vehicles: HashMap<String, Vehicle> = HashMap::new();

        for entry in WalkDir::new(root).contents_first(true).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(mut vehicle) = scan_file(entry.path(), names)? else {
                continue;
            };

            if let Some(existing) = vehicles.get_mut(&vehicle.key) {
                // Two files resolving to the same key: destination
                // paths accumulate, every other field follows the
                // later file.
                warn!(key = %vehicle.key, "duplicate vehicle key, later definition wins");
                let mut destination_paths = std::mem::take(&mut existing.destination_paths);
                destination_paths.append(&mut vehicle.destination_paths);
                vehicle.destination_paths = destination_paths;
                *existing = vehicle;
            } else {
                vehicles.insert(vehicle.key.clone(), vehicle);
            }
        }

        Ok(Catalog { vehicles })
    }

    /// All vehicles in presentation order: nation, then key.
    pub fn vehicles(&self) -> Vec<&Vehicle> {
        self.vehicles
            .values()
            .sorted_by(|a, b| (&a.nation, &a.key).cmp(&(&b.nation, &b.key)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&Vehicle> {
        self.vehicles.get(key)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Apply a style selection to one vehicle and return the archive
    /// paths plus the transformed document text.
    pub fn transform(
        &self,
        key: &str,
        style_id: &str,
        allowed_camo: &BTreeSet<Region>,
        allowed_paint: &BTreeSet<Region>,
    ) -> Result<(Vec<String>, String), Error> {
        let vehicle = self
            .get(key)
            .ok_or_else(|| CatalogError::VehicleNotFound(key.to_string()))?;
        let text =
            transform::apply_style(&vehicle.raw_document, style_id, allowed_camo, allowed_paint)?;
        Ok((vehicle.destination_paths.clone(), text))
    }
}

/// Scan one definition file. Returns `None` when the vehicle has no
/// styles and is therefore not cataloged.
fn scan_file(path: &Path, names: &DisplayNames) -> Result<Option<Vehicle>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = strip_metadata_line(&raw);
    let doc = roxmltree::Document::parse(&document).map_err(|source| CatalogError::Xml {
        path: path.to_path_buf(),
        source,
    })?;

    let root_tag = doc.root_element().tag_name().name();
    let key = root_tag.split('.').next().unwrap_or(root_tag).to_string();

    let mut style_ids: BTreeSet<String> = BTreeSet::new();
    for models in doc.descendants().filter(|n| n.has_tag_name("models")) {
        let Some(sets) = models.children().find(|n| n.has_tag_name("sets")) else {
            continue;
        };
        for style in sets.children().filter(|n| n.is_element()) {
            style_ids.insert(style.tag_name().name().to_string());
        }
    }
    if style_ids.is_empty() {
        debug!(path = %path.display(), "no styles found, vehicle not cataloged");
        return Ok(None);
    }

    let entry = names
        .vehicle(&key)
        .ok_or_else(|| CatalogError::MissingDisplayEntry(key.clone()))?;
    let styles = style_ids
        .into_iter()
        .map(|id| {
            // Unresolved style display names default to the raw id.
            let name = entry.styles.get(&id).cloned().unwrap_or_else(|| id.clone());
            Style { id, name }
        })
        .collect();

    let mut camo_regions = BTreeSet::new();
    let mut paint_regions = BTreeSet::new();
    for areas in doc
        .descendants()
        .filter(|n| n.has_tag_name("customizableVehicleAreas"))
    {
        for (tag, regions) in [
            ("camouflage", &mut camo_regions),
            ("paint", &mut paint_regions),
        ] {
            if let Some(leaf) = areas.children().find(|n| n.has_tag_name(tag))
                && let Some(code) = leaf.text().map(str::trim)
                && !code.is_empty()
            {
                let region =
                    Region::from_area_code(code).ok_or_else(|| CatalogError::UnknownAreaCode {
                        code: code.to_string(),
                        path: path.to_path_buf(),
                    })?;
                regions.insert(region);
            }
        }
    }

    let nation_code = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let nation = nation_display_name(nation_code)
        .ok_or_else(|| CatalogError::UnknownNation {
            code: nation_code.to_string(),
            path: path.to_path_buf(),
        })?
        .to_string();

    Ok(Some(Vehicle {
        key,
        raw_document: document,
        nation,
        display_name: entry.name.clone(),
        tier: entry.tier,
        class: entry.class.clone(),
        styles,
        camo_regions,
        paint_regions,
        destination_paths: vec![destination_path(path)],
    }))
}

/// Archive path for a source file: the last five directory components
/// plus the file name, `/`-joined. Matches the game's
/// `res/scripts/item_defs/vehicles/<nation>/<file>` mount layout.
fn destination_path(path: &Path) -> String {
    let mut parts: Vec<String> = path
        .parent()
        .map(|p| {
            p.components()
                .filter_map(|c| match c {
                    Component::Normal(segment) => segment.to_str().map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    let keep = parts.len().saturating_sub(5);
    let mut parts = parts.split_off(keep);
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        parts.push(name.to_string());
    }
    parts.join("/")
}
