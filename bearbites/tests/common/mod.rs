// Shared fixtures and fakes for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use bearbites::cache::{CacheStore, MemoryCacheStore};
use bearbites::enrichment::SpicyClassifier;
use bearbites::error::{BearBitesError, Result};
use bearbites::upstream::HtmlFetcher;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn menu_item_html(item_id: &str, name: &str, icons: &str) -> String {
    format!(
        r#"<tr><td><div class="menuItemWrapper"><div class="shortmenurecipes"><a href='label.aspx?locationNum=03&amp;RecNumAndPort={item_id}' target='_self'>{name}</a></div><div class="menuItemPieceIcons">{icons}</div></div></td></tr>"#
    )
}

/// A vendor short-menu page with one meal section.
pub fn short_menu_html(meal: &str, body: &str) -> String {
    format!(
        r#"<html><body><table><tr><td><h3 class="shortmenumeals">{meal}</h3></td></tr>{body}</table></body></html>"#
    )
}

pub fn empty_menu_html() -> String {
    "<html><body><div class=\"shortmenutitle\">No Data Available</div></body></html>".to_string()
}

pub fn label_html(name: &str, ingredients: &str) -> String {
    format!(
        r#"<html><head><title>{name}</title></head><body>
        <div class="labelrecipe">{name}</div>
        <span class="nf-serving">Serving Size</span> 1 each
        <span class="nf-calories">Calories</span><span class="nf-calories-count">320</span>
        <div class="ingred-paragraph"><p>{ingredients}</p></div>
        </body></html>"#
    )
}

pub fn label_html_without_ingredients(name: &str) -> String {
    format!(r#"<html><head><title>{name}</title></head><body><div class="labelrecipe">{name}</div></body></html>"#)
}

pub fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }
        ],
        "usage": {
            "prompt_tokens": 1,
            "completion_tokens": 1,
            "total_tokens": 2
        }
    })
}

/// Serves fixed pages by exact URL and counts requests.
#[derive(Default)]
pub struct MapFetcher {
    pages: HashMap<String, String>,
    pub requests: AtomicUsize,
}

impl MapFetcher {
    pub fn with_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HtmlFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| BearBitesError::UpstreamStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

/// Memory store that records every write.
pub struct CountingStore {
    inner: MemoryCacheStore,
    writes: Mutex<Vec<(String, Option<Duration>)>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryCacheStore::new(1000),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn writes(&self) -> Vec<(String, Option<Duration>)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn writes_with_prefix(&self, prefix: &str) -> usize {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl CacheStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        self.writes.lock().unwrap().push((key.to_string(), ttl));
        self.inner.put(key, value, ttl).await
    }

    async fn purge_expired(&self) -> Result<u64> {
        self.inner.purge_expired().await
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

/// Answers from the food name: names containing "Spicy" are spicy, names
/// containing "Broken" fail.
#[derive(Default)]
pub struct FakeClassifier {
    calls: AtomicUsize,
}

impl FakeClassifier {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpicyClassifier for FakeClassifier {
    async fn classify(&self, food_name: &str, _ingredients: &str) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if food_name.contains("Broken") {
            return Err(BearBitesError::Llm("model refused".to_string()));
        }
        Ok(food_name.contains("Spicy"))
    }
}
