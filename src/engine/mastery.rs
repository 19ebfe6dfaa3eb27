use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REPETITIONS: u32 = 3;
/// Highest counter accepted from a restored snapshot.
pub const MAX_STORED_REPETITIONS: u32 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryEntry {
    pub repetitions_remaining: u32,
    /// Persisted for future interval scheduling; the queue never reads it.
    #[serde(default)]
    pub last_asked_at: Option<DateTime<Utc>>,
}

impl MasteryEntry {
    pub fn new(repetitions: u32) -> Self {
        Self {
            repetitions_remaining: repetitions,
            last_asked_at: None,
        }
    }
}

/// Repetition counters keyed by question index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MasteryTracker {
    entries: BTreeMap<usize, MasteryEntry>,
}

impl MasteryTracker {
    pub fn from_entries(entries: BTreeMap<usize, MasteryEntry>) -> Self {
        Self { entries }
    }

    /// Fill in one entry per question, but only when nothing was restored.
    pub fn initialize(&mut self, question_count: usize, repetitions: u32) {
        if !self.entries.is_empty() {
            return;
        }
        self.entries = (0..question_count)
            .map(|i| (i, MasteryEntry::new(repetitions)))
            .collect();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<usize, MasteryEntry> {
        &self.entries
    }

    pub fn repetitions_remaining(&self, index: usize) -> Option<u32> {
        self.entries.get(&index).map(|e| e.repetitions_remaining)
    }

    pub fn record_correct(&mut self, index: usize) -> Option<u32> {
        self.update(index, |reps| reps.saturating_sub(1))
    }

    pub fn record_incorrect(&mut self, index: usize) -> Option<u32> {
        self.update(index, |reps| reps.saturating_add(1))
    }

    /// "I already know this": one fewer repetition without judging an answer.
    pub fn record_forget(&mut self, index: usize) -> Option<u32> {
        self.update(index, |reps| reps.saturating_sub(1))
    }

    pub fn mark_asked(&mut self, index: usize, at: DateTime<Utc>) {
        if let Some(entry) = self.entries.get_mut(&index) {
            entry.last_asked_at = Some(at);
        }
    }

    pub fn total_remaining(&self) -> u64 {
        self.entries
            .values()
            .map(|e| u64::from(e.repetitions_remaining))
            .sum()
    }

    pub fn mastered_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.repetitions_remaining == 0)
            .count()
    }

    /// Drop entries for questions that no longer exist. Returns how many were removed.
    pub fn retain_below(&mut self, question_count: usize) -> usize {
        let before = self.entries.len();
        self.entries.retain(|&index, _| index < question_count);
        before - self.entries.len()
    }

    /// Lower any counter above `max` to `max`. Returns how many were lowered.
    pub fn clamp_repetitions(&mut self, max: u32) -> usize {
        let mut clamped = 0;
        for entry in self.entries.values_mut() {
            if entry.repetitions_remaining > max {
                entry.repetitions_remaining = max;
                clamped += 1;
            }
        }
        clamped
    }

    fn update(&mut self, index: usize, f: impl FnOnce(u32) -> u32) -> Option<u32> {
        let entry = self.entries.get_mut(&index)?;
        entry.repetitions_remaining = f(entry.repetitions_remaining);
        Some(entry.repetitions_remaining)
    }
}
