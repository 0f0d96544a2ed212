//! Periodic removal of expired links.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::application::services::LinkService;
use crate::domain::repositories::LinkRepository;

/// Deletes expired links every `interval` until `shutdown` flips to `true`.
///
/// The first sweep runs one full interval after start. A failed sweep is
/// logged and retried on the next tick.
pub async fn run_expiry_sweeper<L>(
    service: Arc<LinkService<L>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    L: LinkRepository + ?Sized + 'static,
{
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(interval_secs = interval.as_secs(), "Expiry sweeper started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match service.purge_expired().await {
                    Ok(0) => debug!("Expiry sweep found nothing to delete"),
                    Ok(deleted) => info!(deleted, "Expired links purged"),
                    Err(e) => warn!(error = %e, "Expiry sweep failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Expiry sweeper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::background::BackgroundTasks;
    use crate::application::services::LinkSettings;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::NullCache;

    #[tokio::test(start_paused = true)]
    async fn test_sweeps_on_interval_and_stops() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete_expired().times(2).returning(|_| Ok(1));

        let service = Arc::new(LinkService::new(
            Arc::new(repo),
            Arc::new(NullCache::new()),
            BackgroundTasks::new(4, Duration::from_secs(1)),
            LinkSettings::default(),
        ));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_expiry_sweeper(service, Duration::from_secs(600), rx));

        tokio::time::sleep(Duration::from_secs(1250)).await;
        tx.send(true).unwrap();

        handle.await.unwrap();
    }
}
