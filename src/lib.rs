//! Homebrew Channel bundle exporter for the Nintendo Wii.
//!
//! Given an export preset, this crate copies the boot executable template,
//! saves the project's resource pack either next to it or embedded inside it,
//! records the embedded pack's location in the executable's `pck` section,
//! and writes the `meta.xml` manifest read by the Homebrew Channel.
//!
//! The binary `wiibundle` drives [`pipeline::export`] from the command line.

pub mod args;
pub mod error;
pub mod manifest;
pub mod pack;
pub mod patcher;
pub mod pipeline;
pub mod platform;
pub mod preset;

pub use error::{ErrorKind, ExportError};
pub use pipeline::{export, ExportContext, ExportedBundle};
pub use preset::ExportPreset;
