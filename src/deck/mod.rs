pub mod ingest;
pub mod source;

/// One multiple-choice question as loaded from the CSV source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionRecord {
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub context: String,
}

impl QuestionRecord {
    pub fn has_context(&self) -> bool {
        !self.context.trim().is_empty()
    }
}

/// Read-only list of questions, addressed by their position in the source.
#[derive(Clone, Debug, Default)]
pub struct QuestionStore {
    questions: Vec<QuestionRecord>,
}

impl QuestionStore {
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        Self { questions }
    }

    pub fn get(&self, index: usize) -> Option<&QuestionRecord> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestionRecord> {
        self.questions.iter()
    }
}

#[cfg(test)]
pub(crate) fn record(question: &str, correct: &str, incorrect: &[&str]) -> QuestionRecord {
    QuestionRecord {
        question: question.to_string(),
        correct_answer: correct.to_string(),
        incorrect_answers: incorrect.iter().map(|s| s.to_string()).collect(),
        context: String::new(),
    }
}
