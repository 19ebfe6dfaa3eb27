use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::mastery::{MAX_STORED_REPETITIONS, MasteryEntry};
use crate::error::QuizError;

pub const SNAPSHOT_FILE: &str = "quiz_state.json";
pub const EXPORT_FILE: &str = "quizProgress.json";
/// Upper bound on total repetitions and on the persisted queue length.
pub const MAX_QUEUE_LEN: usize = 1_000_000;

/// Everything needed to resume a quiz: counters per question index and the
/// pending queue with the question on screen at the front.
///
/// The same shape is used for the durable snapshot and for exported files.
/// Missing keys deserialize as empty so partial exports still import.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub question_stats: BTreeMap<usize, MasteryEntry>,
    #[serde(default)]
    pub question_queue: Vec<usize>,
}

impl SessionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.question_stats.is_empty() && self.question_queue.is_empty()
    }

    /// Reject counters a queue could never be built from.
    pub fn validate(&self) -> Result<(), QuizError> {
        if let Some((index, entry)) = self
            .question_stats
            .iter()
            .find(|(_, e)| e.repetitions_remaining > MAX_STORED_REPETITIONS)
        {
            return Err(QuizError::InvalidSnapshot(format!(
                "question {index} has {} repetitions, at most {MAX_STORED_REPETITIONS} allowed",
                entry.repetitions_remaining
            )));
        }
        let total: u64 = self
            .question_stats
            .values()
            .map(|e| u64::from(e.repetitions_remaining))
            .sum();
        if total > MAX_QUEUE_LEN as u64 {
            return Err(QuizError::InvalidSnapshot(format!(
                "{total} repetitions in total, at most {MAX_QUEUE_LEN} allowed"
            )));
        }
        if self.question_queue.len() > MAX_QUEUE_LEN {
            return Err(QuizError::InvalidSnapshot(format!(
                "queue holds {} items, at most {MAX_QUEUE_LEN} allowed",
                self.question_queue.len()
            )));
        }
        Ok(())
    }
}
