//! Thinking-stage simulation
//!
//! The assistant has no backend, so "thinking" is a fixed walk through eight
//! stage descriptors with a constant dwell per stage. The simulator is a
//! plain state machine driven by `poll(now)` from the UI tick loop; there is
//! no timer thread. The active stage index is exported directly, and per-stage
//! statuses are derived from it: everything below the index is completed, the
//! index itself is active, the rest pending.
//!
//! Once started, a run is not interruptible; a new run can only begin after
//! the previous one finished (or the simulator was reset on disposal).

use crate::types::{StageStatus, ThinkingStage};
use std::time::{Duration, Instant};

/// Fixed stage catalog: (title, description), in execution order.
const STAGE_DEFS: [(&str, &str); 8] = [
    ("Question Analysis", "Processing question and analyzing intent"),
    ("Tool Selection", "Selecting appropriate tools and strategy"),
    ("AI Optimization", "Gemini tool selection and parameter optimization"),
    ("SQL Generation", "Executing NL2SQL transformation"),
    ("Database Query", "Querying Oracle database with generated SQL"),
    ("Data Analysis", "Interpreting query results and data patterns"),
    ("Response Formatting", "Formatting response and preparing visualization"),
    ("Finalization", "Finalizing enterprise-grade response"),
];

/// Number of stages in a full run
pub const STAGE_COUNT: usize = STAGE_DEFS.len();

/// The full catalog with every stage pending
pub fn stage_catalog() -> Vec<ThinkingStage> {
    STAGE_DEFS
        .iter()
        .enumerate()
        .map(|(i, (title, description))| ThinkingStage {
            id: (i + 1).to_string(),
            title: title.to_string(),
            description: description.to_string(),
            status: StageStatus::Pending,
        })
        .collect()
}

/// What changed during a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorUpdate {
    /// Advanced to the stage at this index
    Stage(usize),
    /// The run completed; the indicator clears to idle
    Finished,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    Running { index: usize, stage_started: Instant },
}

/// State machine for the staged thinking indicator
#[derive(Debug)]
pub struct ThinkingSimulator {
    dwell: Duration,
    state: State,
}

impl ThinkingSimulator {
    /// Create a simulator with the given per-stage dwell time
    pub fn new(dwell: Duration) -> Self {
        Self {
            dwell,
            state: State::Idle,
        }
    }

    /// Begin a run at the first stage. Returns false while a run is already
    /// in flight; an active run cannot be preempted.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = State::Running {
            index: 0,
            stage_started: now,
        };
        tracing::debug!(stages = STAGE_COUNT, "Thinking simulation started");
        true
    }

    /// Advance the state machine. Call on every UI tick; dwell expiry moves
    /// to the next stage, and passing the last stage clears to idle.
    pub fn poll(&mut self, now: Instant) -> Option<SimulatorUpdate> {
        let State::Running {
            mut index,
            mut stage_started,
        } = self.state
        else {
            return None;
        };

        let mut update = None;
        while now.duration_since(stage_started) >= self.dwell {
            stage_started += self.dwell;
            index += 1;
            if index >= STAGE_COUNT {
                self.state = State::Idle;
                tracing::debug!("Thinking simulation finished");
                return Some(SimulatorUpdate::Finished);
            }
            update = Some(SimulatorUpdate::Stage(index));
        }

        self.state = State::Running {
            index,
            stage_started,
        };
        update
    }

    /// Drop any in-flight run. Only used when disposing a session.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// Index of the active stage, if a run is in flight
    pub fn active_index(&self) -> Option<usize> {
        match self.state {
            State::Running { index, .. } => Some(index),
            State::Idle => None,
        }
    }

    /// The active stage descriptor
    pub fn current_stage(&self) -> Option<ThinkingStage> {
        let index = self.active_index()?;
        let mut stage = stage_catalog().swap_remove(index);
        stage.status = StageStatus::Active;
        Some(stage)
    }

    /// The catalog with statuses derived from the active index
    pub fn stages(&self) -> Vec<ThinkingStage> {
        let active = self.active_index();
        let mut stages = stage_catalog();
        if let Some(active) = active {
            for (i, stage) in stages.iter_mut().enumerate() {
                stage.status = if i < active {
                    StageStatus::Completed
                } else if i == active {
                    StageStatus::Active
                } else {
                    StageStatus::Pending
                };
            }
        }
        stages
    }

    /// Overall progress percent: `(active + 1) / STAGE_COUNT * 100`
    pub fn progress_percent(&self) -> u16 {
        match self.active_index() {
            Some(index) => (((index + 1) * 100) / STAGE_COUNT) as u16,
            None => 0,
        }
    }

    /// Total wall time a full run takes
    pub fn total_duration(&self) -> Duration {
        self.dwell * STAGE_COUNT as u32
    }
}
