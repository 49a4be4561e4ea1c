use std::sync::Arc;

use crate::config::Config;
use crate::enrichment::EnrichmentQueue;
use crate::llm::LlmProvider;
use crate::services::MenuService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub menus: MenuService,
    /// Fire-and-forget spicy enrichment; disabled when enrichment is off.
    pub enrichment: EnrichmentQueue,
    pub llm: LlmProvider,
}

impl AppState {
    pub fn new(
        config: Config,
        menus: MenuService,
        enrichment: EnrichmentQueue,
        llm: LlmProvider,
    ) -> Self {
        Self {
            config: Arc::new(config),
            menus,
            enrichment,
            llm,
        }
    }
}
