//! Dining-hall menus scraped from the vendor's HTML pages, normalized into
//! structured menus and nutrition labels, cached per artifact and enriched
//! in the background with a spicy classification.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod llm;
pub mod models;
pub mod scraper;
pub mod services;
pub mod timezone;
pub mod upstream;
