use rand::Rng;
use rand::seq::SliceRandom;

use crate::deck::{QuestionRecord, QuestionStore};
use crate::engine::mastery::MasteryTracker;
use crate::error::QuizError;

pub const MAX_OPTIONS: usize = 4;
pub const MAX_DISTRACTORS: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub is_correct: bool,
    pub correct_answer: String,
}

/// Judge `selected` against the question's answer and update its counter.
///
/// Matching is exact: no trimming and no case folding. Persisting and
/// advancing the queue are left to the caller.
pub fn evaluate(
    questions: &QuestionStore,
    tracker: &mut MasteryTracker,
    selected: &str,
    index: usize,
) -> Result<Outcome, QuizError> {
    let record = questions
        .get(index)
        .ok_or(QuizError::UnknownQuestion(index))?;
    let is_correct = selected == record.correct_answer;

    let updated = if is_correct {
        tracker.record_correct(index)
    } else {
        tracker.record_incorrect(index)
    };
    if updated.is_none() {
        return Err(QuizError::UnknownQuestion(index));
    }

    Ok(Outcome {
        is_correct,
        correct_answer: record.correct_answer.clone(),
    })
}

/// The correct answer plus up to three sampled distractors, shuffled.
pub fn build_options<R: Rng + ?Sized>(record: &QuestionRecord, rng: &mut R) -> Vec<String> {
    let distractors: Vec<&String> = record
        .incorrect_answers
        .iter()
        .filter(|answer| !answer.trim().is_empty())
        .collect();

    let mut options = vec![record.correct_answer.clone()];
    options.extend(
        distractors
            .choose_multiple(rng, MAX_DISTRACTORS)
            .map(|answer| (*answer).clone()),
    );
    options.shuffle(rng);
    options.truncate(MAX_OPTIONS);
    options
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::deck::record;
    use crate::engine::mastery::DEFAULT_REPETITIONS;

    fn setup() -> (QuestionStore, MasteryTracker) {
        let store = QuestionStore::new(vec![
            record("Capital of Peru?", "Lima", &["Cusco", "Arequipa"]),
            record("2 + 2?", "4", &["3", "5", "22", "four", "8"]),
        ]);
        let mut tracker = MasteryTracker::default();
        tracker.initialize(store.len(), DEFAULT_REPETITIONS);
        (store, tracker)
    }

    #[test]
    fn correct_answer_decrements() {
        let (store, mut tracker) = setup();
        let outcome = evaluate(&store, &mut tracker, "Lima", 0).unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.correct_answer, "Lima");
        assert_eq!(tracker.repetitions_remaining(0), Some(2));
    }

    #[test]
    fn wrong_answer_increments_and_reveals_answer() {
        let (store, mut tracker) = setup();
        let outcome = evaluate(&store, &mut tracker, "Cusco", 0).unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.correct_answer, "Lima");
        assert_eq!(tracker.repetitions_remaining(0), Some(4));
    }

    #[test]
    fn matching_is_exact() {
        let (store, mut tracker) = setup();
        assert!(!evaluate(&store, &mut tracker, "lima", 0).unwrap().is_correct);
        assert!(!evaluate(&store, &mut tracker, " Lima", 0).unwrap().is_correct);
        assert_eq!(tracker.repetitions_remaining(0), Some(5));
    }

    #[test]
    fn unknown_index_is_an_error() {
        let (store, mut tracker) = setup();
        let err = evaluate(&store, &mut tracker, "x", 9).unwrap_err();
        assert!(matches!(err, QuizError::UnknownQuestion(9)));
        assert_eq!(tracker.total_remaining(), 6);
    }

    #[test]
    fn two_distractors_give_three_options() {
        let (store, _) = setup();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..20 {
            let options = build_options(store.get(0).unwrap(), &mut rng);
            assert_eq!(options.len(), 3);
            assert!(options.contains(&"Lima".to_string()));
        }
    }

    #[test]
    fn many_distractors_are_sampled_down_to_four_options() {
        let (store, _) = setup();
        let record = store.get(1).unwrap();
        let mut rng = SmallRng::seed_from_u64(8);
        for _ in 0..20 {
            let options = build_options(record, &mut rng);
            assert_eq!(options.len(), MAX_OPTIONS);
            assert_eq!(options.iter().filter(|o| *o == "4").count(), 1);
            let mut unique = options.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), MAX_OPTIONS);
        }
    }

    #[test]
    fn blank_distractors_are_ignored() {
        let r = record("q", "a", &["", "  ", "b"]);
        let options = build_options(&r, &mut SmallRng::seed_from_u64(0));
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn no_distractors_gives_single_option() {
        let r = record("q", "a", &[]);
        assert_eq!(build_options(&r, &mut SmallRng::seed_from_u64(0)), vec!["a"]);
    }
}
