use tracing::{debug, info, warn};

use crate::enrichment::EnrichmentQueue;
use crate::error::Result;
use crate::services::MenuService;

/// Periodically loads today's menu for every location so the first request
/// of the day is a cache hit, and queues those menus for enrichment.
#[derive(Clone)]
pub struct PrewarmManager {
    menus: MenuService,
    queue: EnrichmentQueue,
    interval_secs: u64,
}

impl PrewarmManager {
    pub fn new(menus: MenuService, queue: EnrichmentQueue, interval_secs: u64) -> Self {
        Self {
            menus,
            queue,
            interval_secs,
        }
    }

    /// Returns the number of locations whose menu was loaded.
    pub async fn run_once(&self) -> Result<u64> {
        let today = self.menus.today();
        info!(%today, "Starting menu prewarm");

        let mut loaded = 0u64;
        for location in self.menus.get_locations() {
            match self.menus.get_menu(&location.id, today).await {
                Some(menu) => {
                    loaded += 1;
                    debug!(location_id = %location.id, items = menu.item_count(), "Prewarmed menu");
                    self.queue.submit(menu);
                }
                None => warn!(location_id = %location.id, "Prewarm could not load menu"),
            }
        }

        info!(loaded, "Menu prewarm complete");
        Ok(loaded)
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::cache::{Cache, MemoryCacheStore};
    use crate::error::BearBitesError;
    use crate::upstream::HtmlFetcher;

    /// Glasgow publishes a menu; every other location fails upstream.
    #[derive(Default)]
    struct GlasgowOnly {
        requests: AtomicUsize,
    }

    #[async_trait]
    impl HtmlFetcher for GlasgowOnly {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if url.contains("locationNum=03") {
                return Ok(r#"<h3 class="shortmenumeals">Dinner</h3>
                    <tr><td><div class="menuItemWrapper"><a href='label.aspx?locationNum=03&RecNumAndPort=1*3'>Pho</a></div></td></tr>"#
                    .to_string());
            }
            Err(BearBitesError::UpstreamStatus {
                status: 500,
                url: url.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_run_once_warms_each_location() {
        let fetcher = Arc::new(GlasgowOnly::default());
        let cache = Cache::new(Arc::new(MemoryCacheStore::new(100)));
        let menus = MenuService::new(cache, fetcher.clone(), "http://vendor.test/foodpro").unwrap();
        let manager = PrewarmManager::new(menus.clone(), EnrichmentQueue::disabled(), 60);

        assert_eq!(manager.run_once().await.unwrap(), 1);
        assert_eq!(manager.interval_secs(), 60);

        let requests = fetcher.requests.load(Ordering::SeqCst);
        assert!(menus.get_menu("03", menus.today()).await.is_some());
        assert_eq!(fetcher.requests.load(Ordering::SeqCst), requests);
    }
}
