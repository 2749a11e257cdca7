//! Marker pack compilation.
//!
//! A pack source directory holds a `categories/` tree, a `maps/` directory
//! with per-map marker files and world geometry, an `assets/` directory
//! copied verbatim, and `compiled_assets/` trail sources. Compilation
//! produces a build tree with the category XML, per-map overlay XML,
//! compiled binary trails and a zip of the lot.

pub mod autotrail;
pub mod categories;
pub mod maps;
pub mod markers;
pub mod package;
