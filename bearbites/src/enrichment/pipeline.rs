use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;

use super::classifier::SpicyClassifier;
use crate::cache::keys::{self, MENU_TTL};
use crate::cache::Cache;
use crate::models::{DayMenu, SpicyStatus};
use crate::services::MenuService;

/// Counts for one enrichment run, by how each item was settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// Distinct item ids that were unknown at the start.
    pub pending: usize,
    pub from_cache: usize,
    pub classified: usize,
    /// No ingredients on the label: recorded as not spicy without a model call.
    pub defaulted: usize,
    /// Left unknown; retried on a later run.
    pub failed: usize,
}

impl EnrichmentReport {
    pub fn resolved(&self) -> usize {
        self.from_cache + self.classified + self.defaulted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Classified(bool),
    Defaulted,
    Failed,
}

struct PendingItem {
    id: String,
    name: String,
    label_url: String,
}

/// Resolves unknown spiciness on a menu: permanent cache first, then the
/// classifier in bounded batches. Resolved values are never reclassified.
#[derive(Clone)]
pub struct SpicyEnricher {
    menus: MenuService,
    cache: Cache,
    classifier: Arc<dyn SpicyClassifier>,
    batch_size: usize,
}

impl SpicyEnricher {
    pub fn new(menus: MenuService, classifier: Arc<dyn SpicyClassifier>, batch_size: usize) -> Self {
        Self {
            cache: menus.cache().clone(),
            menus,
            classifier,
            batch_size: batch_size.max(1),
        }
    }

    /// Fill in `is_spicy` for every item it can and, if anything changed,
    /// write the whole menu back under its menu key.
    ///
    /// Concurrent runs over the same menu are last-writer-wins.
    pub async fn enrich(&self, menu: &mut DayMenu) -> EnrichmentReport {
        let mut report = EnrichmentReport::default();
        if !menu.needs_enrichment() {
            return report;
        }

        let mut pending: Vec<PendingItem> = Vec::new();
        for item in menu.items().filter(|item| !item.is_spicy.is_known()) {
            if !pending.iter().any(|p| p.id == item.id) {
                pending.push(PendingItem {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    label_url: item.label_url.clone(),
                });
            }
        }
        report.pending = pending.len();

        let mut resolved: HashMap<String, bool> = HashMap::new();

        let cached = join_all(pending.iter().map(|item| {
            let key = keys::spicy_key(&item.id);
            async move { self.cache.get_json::<bool>(&key).await }
        }))
        .await;
        let mut remaining = Vec::new();
        for (item, hit) in pending.into_iter().zip(cached) {
            match hit {
                Some(spicy) => {
                    report.from_cache += 1;
                    resolved.insert(item.id, spicy);
                }
                None => remaining.push(item),
            }
        }

        for batch in remaining.chunks(self.batch_size) {
            let outcomes = join_all(batch.iter().map(|item| self.resolve_item(item))).await;
            for (item, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Outcome::Classified(spicy) => {
                        report.classified += 1;
                        resolved.insert(item.id.clone(), spicy);
                    }
                    Outcome::Defaulted => {
                        report.defaulted += 1;
                        resolved.insert(item.id.clone(), false);
                    }
                    Outcome::Failed => report.failed += 1,
                }
            }
        }

        if resolved.is_empty() {
            tracing::debug!(location_id = %menu.location_id, date = %menu.date, ?report, "Nothing resolved");
            return report;
        }

        for item in menu.items_mut() {
            if let Some(spicy) = resolved.get(&item.id) {
                if !item.is_spicy.is_known() {
                    item.is_spicy = SpicyStatus::from_bool(*spicy);
                }
            }
        }

        let key = keys::menu_key(&menu.location_id, menu.date);
        self.cache.put_json_logged(&key, &*menu, Some(MENU_TTL)).await;

        tracing::info!(
            location_id = %menu.location_id,
            date = %menu.date,
            pending = report.pending,
            resolved = report.resolved(),
            failed = report.failed,
            "Spicy enrichment finished"
        );
        report
    }

    async fn resolve_item(&self, item: &PendingItem) -> Outcome {
        let Some(detail) = self.menus.get_food_detail(&item.id, &item.label_url).await else {
            return Outcome::Failed;
        };

        let ingredients = detail.ingredients_text();
        if ingredients.trim().is_empty() {
            // Cached permanently; classifier failures below are not.
            self.remember(&item.id, false).await;
            return Outcome::Defaulted;
        }

        match self.classifier.classify(&item.name, &ingredients).await {
            Ok(spicy) => {
                self.remember(&item.id, spicy).await;
                Outcome::Classified(spicy)
            }
            Err(e) => {
                tracing::warn!(item_id = %item.id, error = %e, "Spicy classification failed");
                Outcome::Failed
            }
        }
    }

    async fn remember(&self, item_id: &str, spicy: bool) {
        self.cache
            .put_json_logged(&keys::spicy_key(item_id), &spicy, None)
            .await;
    }
}
