//! Pipeline states and the per-run trace.

use serde::Serialize;

/// States of a pipeline run, in order.
///
/// `Quantized` is skipped when quantization is off. `Failed` is terminal and
/// is never recorded as reached; see [`StageTrace::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Arenas created and the request admitted
    Ready,
    Decoded,
    Quantized,
    /// Squared and posterized
    Resized,
    Tiled,
    Encoded,
    Done,
    Failed,
}

impl Stage {
    pub const fn name(&self) -> &'static str {
        match self {
            Stage::Ready => "ready",
            Stage::Decoded => "decoded",
            Stage::Quantized => "quantized",
            Stage::Resized => "resized",
            Stage::Tiled => "tiled",
            Stage::Encoded => "encoded",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a pipeline run went through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageTrace {
    /// Furthest state reached, `None` if setup failed
    pub reached: Option<Stage>,

    /// The state the run was trying to reach when it failed
    pub failed_at: Option<Stage>,

    pub arenas_created: usize,
    pub arenas_released: usize,
}

impl StageTrace {
    /// The terminal state: `Failed` after any failure, otherwise the
    /// furthest state reached.
    pub fn state(&self) -> Option<Stage> {
        if self.failed_at.is_some() {
            Some(Stage::Failed)
        } else {
            self.reached
        }
    }

    /// Record the outcome of the step that enters `stage`.
    ///
    /// Only the first failure is kept.
    pub(crate) fn record<T, E>(&mut self, stage: Stage, result: Result<T, E>) -> Result<T, E> {
        match &result {
            Ok(_) => {
                if self.failed_at.is_none() && self.reached.map_or(true, |r| r < stage) {
                    self.reached = Some(stage);
                }
            }
            Err(_) => {
                if self.failed_at.is_none() {
                    self.failed_at = Some(stage);
                }
            }
        }
        result
    }

    /// Mark a run that got through every stage as `Done`.
    pub(crate) fn finish(&mut self) {
        if self.failed_at.is_none() {
            self.reached = Some(Stage::Done);
        }
    }
}
