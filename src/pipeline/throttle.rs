//! Byte-rate throttle stage
//!
//! The throttle is the pipeline's only pacing suspend point: it delays the
//! pump so that, on average, no more than the target bytes/s leave the source.
//! Everything downstream of it is non-blocking.

use std::time::Duration;

use tokio::time::Instant;

/// Pacing granularity: the pump reads one chunk per tick at steady state
const TICKS_PER_SEC: u64 = 10;

/// Chunk size bounds, so extreme bitrates still produce sane reads
const MIN_CHUNK: usize = 64;
const MAX_CHUNK: usize = 64 * 1024;

/// Rate limiter pacing output to a target bytes/s
///
/// Accounting starts at construction; an injection installs a fresh throttle
/// so the mixer's output is paced from its own epoch rather than inheriting
/// the old stage's backlog.
#[derive(Debug)]
pub struct Throttle {
    /// Target rate in bytes/s
    rate: u64,
    /// Bytes paced since `epoch`
    sent: u64,
    /// Start of the pacing window
    epoch: Instant,
}

impl Throttle {
    /// Create a throttle pacing at `rate` bytes/s
    pub fn new(rate: u64) -> Self {
        Self {
            rate: rate.max(1),
            sent: 0,
            epoch: Instant::now(),
        }
    }

    /// The target rate in bytes/s
    pub fn rate(&self) -> u64 {
        self.rate
    }

    /// Read size that yields roughly one chunk per tick
    pub fn chunk_size(&self) -> usize {
        ((self.rate / TICKS_PER_SEC) as usize).clamp(MIN_CHUNK, MAX_CHUNK)
    }

    /// Account for `n` bytes and sleep until they are due
    ///
    /// The deadline is cumulative (`epoch + sent / rate`), so jitter in one
    /// tick is absorbed by the next instead of drifting.
    pub async fn pace(&mut self, n: usize) {
        self.sent += n as u64;

        let due = self.epoch + Duration::from_secs_f64(self.sent as f64 / self.rate as f64);
        if due > Instant::now() {
            tokio::time::sleep_until(due).await;
        }
    }
}
