use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Spawns a cancellable recurring task. The first tick fires immediately,
/// then every `period`; a slow tick delays the next one instead of bursting.
/// Started once at process init, stopped through the token at shutdown.
pub fn spawn_recurring<F, Fut>(
    name: &'static str,
    period: Duration,
    token: CancellationToken,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!("{name} task started (period {period:?})");
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    log::info!("{name} task stopped");
                    break;
                }
                _ = interval.tick() => tick().await,
            }
        }
    })
}
