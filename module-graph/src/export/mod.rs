//! Graph exports: JSON manifest and GraphML.

pub mod graphml;
pub mod manifest;

pub use graphml::write_graphml;
pub use manifest::{GraphManifest, write_manifest};
