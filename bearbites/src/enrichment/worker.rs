use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use super::pipeline::SpicyEnricher;
use crate::models::DayMenu;

/// Fire-and-forget handle for scheduling enrichment.
///
/// `submit` never waits: when the queue is full or disabled the menu is
/// dropped and will be picked up again by a later request.
#[derive(Clone)]
pub struct EnrichmentQueue {
    sender: Option<mpsc::Sender<DayMenu>>,
}

impl EnrichmentQueue {
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Returns whether the menu was queued.
    pub fn submit(&self, menu: DayMenu) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        if !menu.needs_enrichment() {
            return false;
        }

        let location_id = menu.location_id.clone();
        let date = menu.date;
        match sender.try_send(menu) {
            Ok(()) => {
                tracing::debug!(location_id = %location_id, %date, "Queued menu for enrichment");
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(location_id = %location_id, %date, "Enrichment queue full, dropping menu");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(location_id = %location_id, %date, "Enrichment worker stopped, dropping menu");
                false
            }
        }
    }
}

/// Consumes queued menus one at a time, each bounded by `task_timeout`.
pub struct EnrichmentWorker {
    receiver: mpsc::Receiver<DayMenu>,
    enricher: SpicyEnricher,
    task_timeout: Duration,
}

pub fn enrichment_channel(
    enricher: SpicyEnricher,
    capacity: usize,
    task_timeout: Duration,
) -> (EnrichmentQueue, EnrichmentWorker) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (
        EnrichmentQueue {
            sender: Some(sender),
        },
        EnrichmentWorker {
            receiver,
            enricher,
            task_timeout,
        },
    )
}

impl EnrichmentWorker {
    pub async fn run(mut self, token: CancellationToken) {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Enrichment worker shutting down...");
                    break;
                }
                next = self.receiver.recv() => {
                    let Some(menu) = next else {
                        tracing::info!("Enrichment queue closed");
                        break;
                    };
                    self.process(menu).await;
                }
            }
        }
    }

    async fn process(&self, mut menu: DayMenu) {
        let location_id = menu.location_id.clone();
        let date = menu.date;

        match tokio::time::timeout(self.task_timeout, self.enricher.enrich(&mut menu)).await {
            Ok(report) => {
                tracing::debug!(location_id = %location_id, %date, ?report, "Enrichment task done");
            }
            Err(_) => {
                tracing::warn!(
                    location_id = %location_id,
                    %date,
                    timeout_secs = self.task_timeout.as_secs(),
                    "Enrichment task timed out"
                );
            }
        }
    }
}
