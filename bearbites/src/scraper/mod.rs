//! Vendor HTML parsing.
//!
//! Parsers never fail on markup drift: missing fragments are skipped and
//! missing fields fall back to defaults. Construction only fails if a
//! built-in pattern does not compile.

pub mod icons;
pub mod ingredients;
pub mod label;
pub mod nutrition;
pub mod short_menu;
pub mod strategy;
mod text;
pub mod urls;

pub use label::LabelParser;
pub use short_menu::{ShortMenuParser, StationIndex, DEFAULT_STATION};
pub use strategy::{ExtractionStrategy, StrategyCascade};
