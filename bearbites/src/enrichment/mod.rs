//! Background spicy classification for menu items.

mod classifier;
mod pipeline;
mod worker;

pub use classifier::{parse_spicy_response, LlmSpicyClassifier, SpicyClassifier};
pub use pipeline::{EnrichmentReport, SpicyEnricher};
pub use worker::{enrichment_channel, EnrichmentQueue, EnrichmentWorker};
