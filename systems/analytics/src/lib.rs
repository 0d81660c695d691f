#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Progress tracking that tells the calling layer when a run is worth saving.

use rampart_core::{Event, RunStatistics, Snapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Persistent per-stage progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Stage name the record belongs to.
    pub stage: String,
    /// Highest wave ever cleared.
    pub best_wave: u32,
    /// Best star rating earned, zero until the stage is won.
    pub stars: u8,
    /// Statistics of the most recently saved run.
    pub statistics: RunStatistics,
}

impl ProgressRecord {
    /// Empty record for `stage`.
    #[must_use]
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            best_wave: 0,
            stars: 0,
            statistics: RunStatistics::default(),
        }
    }
}

/// Moment at which the calling layer should persist the progress record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveTrigger {
    /// The stage was won.
    StageComplete {
        /// Stars earned by this run.
        stars: u8,
    },
    /// Lives ran out.
    GameOver {
        /// Wave during which the run ended.
        wave: u32,
    },
    /// A wave beyond the previous best was cleared.
    NewBestWave {
        /// New best wave.
        wave: u32,
    },
}

/// Folds world events into a [`ProgressRecord`].
#[derive(Debug)]
pub struct Analytics {
    record: ProgressRecord,
}

impl Analytics {
    /// Starts tracking on top of a previously saved record.
    #[must_use]
    pub fn new(record: ProgressRecord) -> Self {
        Self { record }
    }

    /// Current record.
    #[must_use]
    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    /// Consumes the tracker and yields the record.
    #[must_use]
    pub fn into_record(self) -> ProgressRecord {
        self.record
    }

    /// Consumes one tick's events and emits the save triggers they imply.
    ///
    /// Statistics are copied from `snapshot` whenever a trigger fires so the
    /// saved record matches the state that caused the save.
    pub fn handle(&mut self, snapshot: &Snapshot, events: &[Event], out: &mut Vec<SaveTrigger>) {
        let before = out.len();
        for event in events {
            match event {
                Event::WaveComplete { wave, .. } if *wave > self.record.best_wave => {
                    self.record.best_wave = *wave;
                    out.push(SaveTrigger::NewBestWave { wave: *wave });
                }
                Event::StageComplete { stars } => {
                    self.record.stars = self.record.stars.max(*stars);
                    out.push(SaveTrigger::StageComplete { stars: *stars });
                }
                Event::GameOver { wave } => {
                    out.push(SaveTrigger::GameOver { wave: *wave });
                }
                _ => {}
            }
        }

        if out.len() > before {
            self.record.statistics = snapshot.stats.clone();
            debug!(
                target: "rampart::analytics",
                stage = %self.record.stage,
                triggers = out.len() - before,
                best_wave = self.record.best_wave,
                "progress.save_requested"
            );
        }
    }
}
