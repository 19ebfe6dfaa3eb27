pub mod quiz;

pub use quiz::QuizSession;
