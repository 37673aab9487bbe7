//! Trade feed
//!
//! Bounded queues in front of [`CampaignService::on_trade_event`]. Events are
//! sharded by sender so one user's events are applied in order by a single
//! worker while different users proceed in parallel.
//!
//! Storage failures are retried with exponential backoff. After cancellation
//! workers stop taking events; anything still queued is counted as dropped.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use tradingace_types::{CampaignError, CampaignResult, SwapEvent};

use crate::completion::TradeOutcome;
use crate::service::CampaignService;

/// Trade feed configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Number of worker shards
    #[serde(default = "default_shards")]
    pub shards: usize,

    /// Queue capacity per shard
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Retries after the first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_initial_backoff_ms")]
    pub retry_initial_backoff_ms: u64,

    #[serde(default = "default_retry_max_backoff_ms")]
    pub retry_max_backoff_ms: u64,
}

fn default_shards() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_initial_backoff_ms() -> u64 {
    200
}

fn default_retry_max_backoff_ms() -> u64 {
    5000
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            shards: default_shards(),
            queue_capacity: default_queue_capacity(),
            max_retries: default_max_retries(),
            retry_initial_backoff_ms: default_retry_initial_backoff_ms(),
            retry_max_backoff_ms: default_retry_max_backoff_ms(),
        }
    }
}

impl FeedConfig {
    /// Delay before retry number `attempt` (zero-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let delay = self
            .retry_initial_backoff_ms
            .saturating_mul(factor)
            .min(self.retry_max_backoff_ms);
        Duration::from_millis(delay)
    }
}

/// Live counters of the feed
#[derive(Debug, Default)]
pub struct FeedStats {
    processed: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time copy of [`FeedStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStatsSnapshot {
    /// Events merged into task records
    pub processed: u64,
    /// Events ignored because no campaign was active
    pub skipped: u64,
    /// Events rejected with a non-retryable error
    pub failed: u64,
    /// Events abandoned after retries or at shutdown
    pub dropped: u64,
}

impl FeedStats {
    pub fn snapshot(&self) -> FeedStatsSnapshot {
        FeedStatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Cloneable submission side of a [`TradeFeed`]
#[derive(Clone)]
pub struct FeedHandle {
    senders: Arc<Vec<mpsc::Sender<SwapEvent>>>,
    stats: Arc<FeedStats>,
    cancel: CancellationToken,
}

impl FeedHandle {
    /// Queue an event, waiting for capacity on its shard.
    ///
    /// Fails with `FeedClosed` once the feed is cancelled or its workers
    /// are gone.
    pub async fn submit(&self, event: SwapEvent) -> CampaignResult<()> {
        if self.cancel.is_cancelled() {
            return Err(CampaignError::FeedClosed);
        }

        let shard = shard_for(&event.sender, self.senders.len());
        self.senders[shard]
            .send(event)
            .await
            .map_err(|_| CampaignError::FeedClosed)
    }

    pub fn stats(&self) -> FeedStatsSnapshot {
        self.stats.snapshot()
    }

    /// Events waiting across all shards
    pub fn queued(&self) -> usize {
        self.senders
            .iter()
            .map(|tx| tx.max_capacity() - tx.capacity())
            .sum()
    }
}

/// Sharded trade event processor
pub struct TradeFeed {
    handle: FeedHandle,
    workers: Vec<JoinHandle<()>>,
}

impl TradeFeed {
    /// Spawn one worker per shard on the current runtime
    pub fn spawn(
        service: Arc<CampaignService>,
        config: FeedConfig,
        cancel: CancellationToken,
    ) -> Self {
        let shards = config.shards.max(1);
        let capacity = config.queue_capacity.max(1);
        let stats = Arc::new(FeedStats::default());

        let mut senders = Vec::with_capacity(shards);
        let mut workers = Vec::with_capacity(shards);

        for shard in 0..shards {
            let (tx, rx) = mpsc::channel(capacity);
            senders.push(tx);

            let worker = ShardWorker {
                shard,
                service: service.clone(),
                config: config.clone(),
                stats: stats.clone(),
                cancel: cancel.clone(),
            };
            workers.push(tokio::spawn(worker.run(rx)));
        }

        info!(shards, capacity, "Trade feed started");

        Self {
            handle: FeedHandle {
                senders: Arc::new(senders),
                stats,
                cancel,
            },
            workers,
        }
    }

    pub fn handle(&self) -> FeedHandle {
        self.handle.clone()
    }

    /// Drop this feed's own handle and wait for every worker to exit.
    ///
    /// Workers exit once cancelled, or once every handle clone is dropped
    /// and the queues are drained.
    pub async fn close_and_join(self) -> FeedStatsSnapshot {
        let stats = self.handle.stats.clone();
        drop(self.handle);

        for worker in self.workers {
            if let Err(e) = worker.await {
                error!(error = %e, "Trade feed worker panicked");
            }
        }

        let snapshot = stats.snapshot();
        info!(
            processed = snapshot.processed,
            skipped = snapshot.skipped,
            failed = snapshot.failed,
            dropped = snapshot.dropped,
            "Trade feed stopped"
        );
        snapshot
    }
}

fn shard_for(sender: &Address, shards: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    sender.hash(&mut hasher);
    (hasher.finish() % shards as u64) as usize
}

struct ShardWorker {
    shard: usize,
    service: Arc<CampaignService>,
    config: FeedConfig,
    stats: Arc<FeedStats>,
    cancel: CancellationToken,
}

impl ShardWorker {
    async fn run(self, mut rx: mpsc::Receiver<SwapEvent>) {
        debug!(shard = self.shard, "Feed worker started");

        loop {
            let event = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                event = rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            if !self.process(&event).await {
                break;
            }
        }

        rx.close();
        while rx.try_recv().is_ok() {
            FeedStats::incr(&self.stats.dropped);
        }

        debug!(shard = self.shard, "Feed worker stopped");
    }

    /// Apply one event with retries. Returns `false` if cancelled mid-way.
    async fn process(&self, event: &SwapEvent) -> bool {
        let mut attempt = 0u32;

        loop {
            match self.service.on_trade_event(event).await {
                Ok(TradeOutcome::Applied { .. }) => {
                    FeedStats::incr(&self.stats.processed);
                    return true;
                }
                Ok(TradeOutcome::NoActiveCampaign) => {
                    FeedStats::incr(&self.stats.skipped);
                    return true;
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff(attempt);
                    attempt += 1;
                    warn!(
                        shard = self.shard,
                        tx = %event.tx_hash,
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Trade event failed, retrying"
                    );

                    tokio::select! {
                        _ = self.cancel.cancelled() => {
                            FeedStats::incr(&self.stats.dropped);
                            return false;
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) if e.is_retryable() => {
                    error!(
                        shard = self.shard,
                        tx = %event.tx_hash,
                        user = %event.user(),
                        error = %e,
                        "Trade event dropped after retries"
                    );
                    FeedStats::incr(&self.stats.dropped);
                    return true;
                }
                Err(e) => {
                    warn!(
                        shard = self.shard,
                        tx = %event.tx_hash,
                        error = %e,
                        "Trade event rejected"
                    );
                    FeedStats::incr(&self.stats.failed);
                    return true;
                }
            }
        }
    }
}
