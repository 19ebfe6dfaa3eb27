use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    /// A CSV row that could not become a question. The row is skipped.
    #[error("line {line}: {reason}")]
    Ingestion { line: u64, reason: String },

    /// The question source could not be fetched or read at all.
    #[error("could not load questions from {source_name}: {message}")]
    Transport {
        source_name: String,
        message: String,
    },

    #[error("malformed progress snapshot: {0}")]
    PersistenceParse(#[from] serde_json::Error),

    #[error("progress snapshot rejected: {0}")]
    InvalidSnapshot(String),

    #[error("could not read progress file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("question index {0} is out of range")]
    UnknownQuestion(usize),
}

impl QuizError {
    pub fn transport(source_name: &str, message: impl ToString) -> Self {
        QuizError::Transport {
            source_name: source_name.to_string(),
            message: message.to_string(),
        }
    }
}
