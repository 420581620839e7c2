#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! On-disk altar definitions and configuration.
//!
//! Definitions live in a TOML catalog keyed by altar name. Item fields are
//! kept as raw TOML values until the world asks for records, so a single
//! malformed entry is reported against its altar instead of rejecting the
//! whole file. Configuration is read leniently: missing keys take defaults
//! and unusable effect names are disabled with a diagnostic.

mod authoring;
mod catalog;
mod settings;

pub use authoring::{
    AuthoringError, Change, Edit, Editor, Grants, ItemTarget, PedestalTarget, Permission,
};
pub use catalog::{AltarEntry, Catalog, DefinitionStore, StoreError};
pub use settings::{load_settings, parse_settings, SettingsError, SettingsReport};
