//! ltx - X-Ray LTX configuration toolkit
//!
//! Parses the engine's INI dialect (section inheritance, `#include` across
//! two gamedata roots, `<<END` blocks) into [`Document`]s with typed field
//! accessors, and models loot as [`SpawnEntry`] values that can be priced,
//! counted, pooled and compressed.

pub mod catalog;
pub mod cli;
pub mod document;
pub mod error;
pub mod gamedata;
pub mod manifest;
pub mod number;
pub mod output;
pub mod parser;
pub mod project;
pub mod spawn;
pub mod validation;

pub use catalog::{BuyCoefficients, ItemCatalog, ItemType};
pub use document::{Document, FieldValue, Section, SectionFilter, WriteOptions};
pub use error::{FieldError, LtxError, MissingReason, ParseError, Result, SpawnError};
pub use gamedata::Gamedata;
pub use manifest::Manifest;
pub use number::Number;
pub use project::{ObjectLoot, Project};
pub use spawn::{parse_item_list, read_items, ItemSpec, SpawnEntry, SpawnPool};
pub use validation::{validate_project, Diagnostic, Severity, ValidationResult};
