use chrono::Utc;
use rand::rngs::SmallRng;
use tracing::{info, warn};

use crate::deck::{QuestionRecord, QuestionStore};
use crate::engine::evaluator::{self, Outcome};
use crate::engine::mastery::{MAX_STORED_REPETITIONS, MasteryTracker};
use crate::engine::scheduler::{Next, QueueScheduler};
use crate::error::QuizError;
use crate::store::schema::SessionSnapshot;

/// All mutable quiz state for one run: counters, pending queue, the question
/// on screen and the options it is shown with.
pub struct QuizSession {
    questions: QuestionStore,
    tracker: MasteryTracker,
    scheduler: QueueScheduler,
    current: Option<usize>,
    options: Vec<String>,
    initial_repetitions: u32,
    rng: SmallRng,
}

impl QuizSession {
    /// Start from a persisted snapshot when there is one, fresh otherwise.
    pub fn resume(
        questions: QuestionStore,
        snapshot: Option<SessionSnapshot>,
        initial_repetitions: u32,
        rng: SmallRng,
    ) -> Self {
        let mut session = Self {
            questions,
            tracker: MasteryTracker::default(),
            scheduler: QueueScheduler::default(),
            current: None,
            options: Vec::new(),
            initial_repetitions,
            rng,
        };
        session.restore(snapshot.unwrap_or_default());
        session
    }

    /// Replace counters and queue with `snapshot`. Nothing is on screen
    /// afterwards; the next `advance` serves the snapshot's front question.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        let count = self.questions.len();

        let mut tracker = MasteryTracker::from_entries(snapshot.question_stats);
        let stale_entries = tracker.retain_below(count);
        let clamped = tracker.clamp_repetitions(MAX_STORED_REPETITIONS);
        if clamped > 0 {
            warn!(clamped, max = MAX_STORED_REPETITIONS, "lowered oversized repetition counters");
        }
        tracker.initialize(count, self.initial_repetitions);

        let mut scheduler = QueueScheduler::with_pending(snapshot.question_queue);
        let stale_queued = scheduler.retain(|index| tracker.entries().contains_key(&index));

        if stale_entries + stale_queued > 0 {
            warn!(
                stale_entries,
                stale_queued, "progress referenced questions missing from the source"
            );
        }

        self.tracker = tracker;
        self.scheduler = scheduler;
        self.current = None;
        self.options.clear();
    }

    /// Throw away all progress and start over with fresh counters.
    pub fn restart(&mut self) {
        self.restore(SessionSnapshot::default());
        info!(questions = self.questions.len(), "restarted quiz");
    }

    /// Move to the next question, or report that nothing is left to ask.
    pub fn advance(&mut self) -> Next {
        let next = self.scheduler.next(&self.tracker, &mut self.rng);
        match next {
            Next::Question(index) => {
                self.current = Some(index);
                self.options = match self.questions.get(index) {
                    Some(record) => evaluator::build_options(record, &mut self.rng),
                    None => Vec::new(),
                };
            }
            Next::Complete => {
                self.current = None;
                self.options.clear();
                info!("all repetitions exhausted");
            }
        }
        next
    }

    /// Answer the current question with the option shown at `slot` (0-based).
    /// `Ok(None)` when there is no current question or no such option.
    pub fn answer(&mut self, slot: usize) -> Result<Option<Outcome>, QuizError> {
        let Some(selected) = self.options.get(slot).cloned() else {
            return Ok(None);
        };
        self.answer_text(&selected)
    }

    pub fn answer_text(&mut self, selected: &str) -> Result<Option<Outcome>, QuizError> {
        let Some(index) = self.current else {
            return Ok(None);
        };
        let outcome = evaluator::evaluate(&self.questions, &mut self.tracker, selected, index)?;
        self.tracker.mark_asked(index, Utc::now());
        Ok(Some(outcome))
    }

    /// Drop one repetition of the current question without judging an answer.
    pub fn forget(&mut self) -> Option<u32> {
        let index = self.current?;
        let remaining = self.tracker.record_forget(index);
        self.tracker.mark_asked(index, Utc::now());
        remaining
    }

    /// The persistable state, with the question on screen first in the queue.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            question_stats: self.tracker.entries().clone(),
            question_queue: self
                .current
                .into_iter()
                .chain(self.scheduler.pending().iter().copied())
                .collect(),
        }
    }

    pub fn questions(&self) -> &QuestionStore {
        &self.questions
    }

    pub fn tracker(&self) -> &MasteryTracker {
        &self.tracker
    }

    pub fn scheduler(&self) -> &QueueScheduler {
        &self.scheduler
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.current.and_then(|i| self.questions.get(i))
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn current_repetitions(&self) -> Option<u32> {
        self.current
            .and_then(|i| self.tracker.repetitions_remaining(i))
    }

    pub fn total_remaining(&self) -> u64 {
        self.tracker.total_remaining()
    }

    /// Share of questions whose counter reached zero.
    pub fn mastery_ratio(&self) -> f64 {
        let total = self.tracker.entries().len();
        if total == 0 {
            return 0.0;
        }
        self.tracker.mastered_count() as f64 / total as f64
    }
}
