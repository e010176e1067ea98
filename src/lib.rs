/// Catalog construction from a tree of vehicle definition documents
pub mod catalog;
/// In-memory element tree for vehicle definition documents
pub mod document;
/// Error definitions
pub mod error;
/// Fixed vocabularies from the game's `item_defs` conventions
pub mod game_constants;
/// `.wotmod` package assembly
pub mod package;
/// Style splicing and customization-region clearing
pub mod transform;

pub use error::{Error, Result};
