use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::sleep;

use crate::queries::QueryClient;

/// Background task evicting cache entries that sat unused past the
/// retention window. Runs on a fixed period and on demand signals;
/// shuts down once every signal sender is gone.
pub struct RetentionSweeper {
    client: QueryClient,
    receiver: UnboundedReceiver<()>,
    period: Duration,
}

impl RetentionSweeper {
    pub fn new(client: QueryClient, receiver: UnboundedReceiver<()>, period: Duration) -> Self {
        Self {
            client,
            receiver,
            period,
        }
    }

    pub async fn start(mut self) {
        log::debug!("retention sweeper started");

        loop {
            tokio::select! {
                signal = self.receiver.recv() => {
                    if signal.is_none() {
                        break;
                    }
                    self.run_sweep();
                }
                _ = sleep(self.period) => {
                    self.run_sweep();
                }
            }
        }

        log::debug!("retention sweeper stopped");
    }

    fn run_sweep(&self) {
        let evicted = self.client.sweep();
        if evicted > 0 {
            log::debug!("evicted {evicted} idle cache entries");
        }
    }
}
