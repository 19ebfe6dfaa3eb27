use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::engine::mastery::MasteryTracker;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Empty,
    Building,
    Serving,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Next {
    Question(usize),
    Complete,
}

/// Work queue of question indices, weighted by remaining repetitions.
#[derive(Clone, Debug)]
pub struct QueueScheduler {
    queue: VecDeque<usize>,
    state: SchedulerState,
    rebuilds: usize,
}

impl Default for QueueScheduler {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            state: SchedulerState::Empty,
            rebuilds: 0,
        }
    }
}

impl QueueScheduler {
    /// Resume from a persisted queue.
    pub fn with_pending(pending: impl IntoIterator<Item = usize>) -> Self {
        let queue: VecDeque<usize> = pending.into_iter().collect();
        let state = if queue.is_empty() {
            SchedulerState::Empty
        } else {
            SchedulerState::Serving
        };
        Self {
            queue,
            state,
            rebuilds: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn pending(&self) -> &VecDeque<usize> {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    pub fn build_queue<R: Rng + ?Sized>(&mut self, tracker: &MasteryTracker, rng: &mut R) {
        self.state = SchedulerState::Building;
        self.queue = build_queue(tracker, rng).into();
        self.rebuilds += 1;
        debug!(len = self.queue.len(), rebuilds = self.rebuilds, "rebuilt question queue");
    }

    pub fn next<R: Rng + ?Sized>(&mut self, tracker: &MasteryTracker, rng: &mut R) -> Next {
        if self.queue.is_empty() {
            if tracker.total_remaining() == 0 {
                self.state = SchedulerState::Done;
                return Next::Complete;
            }
            self.build_queue(tracker, rng);
        }

        match self.queue.pop_front() {
            Some(index) => {
                self.state = SchedulerState::Serving;
                Next::Question(index)
            }
            None => {
                self.state = SchedulerState::Done;
                Next::Complete
            }
        }
    }

    /// Keep only the pending indices `keep` accepts. Returns how many were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(usize) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|&index| keep(index));
        if self.queue.is_empty() && self.state == SchedulerState::Serving {
            self.state = SchedulerState::Empty;
        }
        before - self.queue.len()
    }
}

/// Each index repeated by its remaining count, shuffled, then one pass that
/// moves most adjacent repeats apart.
pub fn build_queue<R: Rng + ?Sized>(tracker: &MasteryTracker, rng: &mut R) -> Vec<usize> {
    let mut queue: Vec<usize> = tracker
        .entries()
        .iter()
        .flat_map(|(&index, entry)| std::iter::repeat_n(index, entry.repetitions_remaining as usize))
        .collect();
    queue.shuffle(rng);
    spread_adjacent_repeats(&mut queue, rng);
    queue
}

/// Single best-effort pass: a repeat at `i` is swapped with a random earlier
/// position before `i - 1`. The swapped-in value may itself land next to a twin.
fn spread_adjacent_repeats<R: Rng + ?Sized>(queue: &mut [usize], rng: &mut R) {
    for i in 1..queue.len() {
        if queue[i] == queue[i - 1] {
            let swap_index = if i > 1 { rng.gen_range(0..i - 1) } else { 0 };
            queue.swap(i, swap_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::engine::mastery::{DEFAULT_REPETITIONS, MasteryEntry};

    fn tracker_with(reps: &[u32]) -> MasteryTracker {
        let entries: BTreeMap<usize, MasteryEntry> = reps
            .iter()
            .enumerate()
            .map(|(i, &r)| (i, MasteryEntry::new(r)))
            .collect();
        MasteryTracker::from_entries(entries)
    }

    fn counts(queue: &[usize], len: usize) -> Vec<u32> {
        let mut counts = vec![0; len];
        for &i in queue {
            counts[i] += 1;
        }
        counts
    }

    #[test]
    fn queue_counts_match_repetitions() {
        let reps = [3, 0, 5, 1, 2];
        let tracker = tracker_with(&reps);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let queue = build_queue(&tracker, &mut rng);
            assert_eq!(queue.len() as u64, tracker.total_remaining());
            assert_eq!(counts(&queue, reps.len()), reps.to_vec());
        }
    }

    #[test]
    fn build_is_deterministic_for_a_seed() {
        let tracker = tracker_with(&[3, 3, 3, 3]);
        let a = build_queue(&tracker, &mut SmallRng::seed_from_u64(42));
        let b = build_queue(&tracker, &mut SmallRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn single_question_queue_survives_spread_pass() {
        let tracker = tracker_with(&[6]);
        let queue = build_queue(&tracker, &mut SmallRng::seed_from_u64(1));
        assert_eq!(queue, vec![0; 6]);
    }

    #[test]
    fn spread_pass_swaps_first_pair_with_front() {
        let mut queue = vec![4, 4, 1];
        spread_adjacent_repeats(&mut queue, &mut SmallRng::seed_from_u64(3));
        assert_eq!(queue, vec![4, 4, 1]);
    }

    #[test]
    fn spread_pass_moves_repeat_earlier() {
        // The repeat at position 3 can only be swapped into position 0 or 1.
        let mut queue = vec![1, 2, 3, 3];
        spread_adjacent_repeats(&mut queue, &mut SmallRng::seed_from_u64(9));
        assert_eq!(queue[2], 3);
        assert!(queue[3] == 1 || queue[3] == 2);
        assert_eq!(counts(&queue, 4), vec![0, 1, 1, 2]);
    }

    #[test]
    fn drains_then_rebuilds_once() {
        let mut tracker = MasteryTracker::default();
        tracker.initialize(2, DEFAULT_REPETITIONS);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut scheduler = QueueScheduler::default();
        assert_eq!(scheduler.state(), SchedulerState::Empty);

        let first = scheduler.next(&tracker, &mut rng);
        assert!(matches!(first, Next::Question(_)));
        assert_eq!(scheduler.rebuild_count(), 1);
        assert_eq!(scheduler.state(), SchedulerState::Serving);

        for _ in 0..5 {
            assert!(matches!(scheduler.next(&tracker, &mut rng), Next::Question(_)));
        }
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.rebuild_count(), 1);

        // Repetitions never changed, so the drained queue is built again exactly once.
        assert!(matches!(scheduler.next(&tracker, &mut rng), Next::Question(_)));
        assert_eq!(scheduler.rebuild_count(), 2);
        assert_eq!(scheduler.len(), 5);
    }

    #[test]
    fn completes_when_nothing_remains() {
        let tracker = tracker_with(&[0, 0, 0]);
        let mut scheduler = QueueScheduler::default();
        let next = scheduler.next(&tracker, &mut SmallRng::seed_from_u64(0));
        assert_eq!(next, Next::Complete);
        assert_eq!(scheduler.state(), SchedulerState::Done);
        assert_eq!(scheduler.rebuild_count(), 0);
    }

    #[test]
    fn pending_queue_is_served_before_rebuilding() {
        let tracker = tracker_with(&[3, 3]);
        let mut scheduler = QueueScheduler::with_pending([1, 0]);
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(scheduler.next(&tracker, &mut rng), Next::Question(1));
        assert_eq!(scheduler.next(&tracker, &mut rng), Next::Question(0));
        assert_eq!(scheduler.rebuild_count(), 0);
    }

    #[test]
    fn pending_queue_is_served_even_when_counts_reached_zero() {
        let tracker = tracker_with(&[0]);
        let mut scheduler = QueueScheduler::with_pending([0]);
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(scheduler.next(&tracker, &mut rng), Next::Question(0));
        assert_eq!(scheduler.next(&tracker, &mut rng), Next::Complete);
    }

    #[test]
    fn retain_drops_unknown_indices() {
        let mut scheduler = QueueScheduler::with_pending([0, 9, 1, 12]);
        assert_eq!(scheduler.retain(|i| i < 2), 2);
        assert_eq!(scheduler.pending().iter().copied().collect::<Vec<_>>(), vec![0, 1]);
    }
}
