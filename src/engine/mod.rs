pub mod evaluator;
pub mod mastery;
pub mod scheduler;

pub use evaluator::Outcome;
pub use mastery::{MasteryEntry, MasteryTracker};
pub use scheduler::{Next, QueueScheduler};
