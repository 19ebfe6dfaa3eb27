use std::borrow::Cow;
use std::sync::LazyLock;

use csv::{ReaderBuilder, StringRecord, Trim};
use regex::Regex;
use tracing::{debug, warn};

use crate::deck::QuestionRecord;
use crate::error::QuizError;

pub const QUESTION_HEADER: &str = "Pregunta";
pub const CORRECT_HEADER: &str = "Opción Correcta";
pub const INCORRECT_HEADERS: [&str; 3] = [
    "Opción Incorrecta 1",
    "Opción Incorrecta 2",
    "Opción Incorrecta 3",
];
pub const CONTEXT_HEADER: &str = "Contexto";

const INCORRECT_PREFIX: &str = "Opción Incorrecta";

static QUOTED_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""\s*,\s*""#).expect("separator pattern is valid"));

/// Result of turning CSV text into questions. Rejected rows are kept so callers
/// can report them; they never abort ingestion.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub questions: Vec<QuestionRecord>,
    pub skipped: Vec<QuizError>,
}

/// Column positions resolved from the header row.
struct Columns {
    question: Option<usize>,
    correct: Option<usize>,
    incorrect: [Option<usize>; 3],
    context: Option<usize>,
    /// Incorrect-answer columns beyond the three slots, merged into the third.
    extra_incorrect: Vec<usize>,
    width: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let names: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let find = |name: &str| names.iter().position(|h| h == name);

        let incorrect = INCORRECT_HEADERS.map(find);

        // Any other incorrect-answer column, including a repeated slot header.
        let extra_incorrect = names
            .iter()
            .enumerate()
            .filter(|&(i, h)| h.starts_with(INCORRECT_PREFIX) && !incorrect.contains(&Some(i)))
            .map(|(i, _)| i)
            .collect();

        Self {
            question: find(QUESTION_HEADER),
            correct: find(CORRECT_HEADER),
            incorrect,
            context: find(CONTEXT_HEADER),
            extra_incorrect,
            width: names.len(),
        }
    }
}

/// Collapse whitespace between quoted fields: `"a" , "b"` becomes `"a","b"`.
pub fn preprocess(data: &str) -> Cow<'_, str> {
    QUOTED_SEPARATOR.replace_all(data, "\",\"")
}

/// Trim a field and strip one pair of surrounding double quotes.
pub fn clean_field(field: &str) -> String {
    let trimmed = field.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

fn unescape(field: &str) -> String {
    field.replace("\\\"", "\"")
}

fn raw_field(record: &StringRecord, column: Option<usize>) -> String {
    column
        .and_then(|i| record.get(i))
        .map(unescape)
        .unwrap_or_default()
}

pub fn parse_questions(data: &str) -> IngestReport {
    let data = preprocess(data);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .quote(b'"')
        .double_quote(true)
        .from_reader(data.as_bytes());

    let mut report = IngestReport::default();

    let columns = match reader.headers() {
        Ok(headers) => Columns::from_headers(headers),
        Err(e) => {
            let err = QuizError::Ingestion {
                line: 1,
                reason: format!("unreadable header row: {e}"),
            };
            warn!("{err}");
            report.skipped.push(err);
            return report;
        }
    };

    for (row, result) in reader.records().enumerate() {
        let fallback_line = row as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                let err = QuizError::Ingestion {
                    line,
                    reason: e.to_string(),
                };
                warn!("skipping row: {err}");
                report.skipped.push(err);
                continue;
            }
        };
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(fallback_line);

        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue;
        }

        match record_to_question(&record, &columns) {
            Some(question) => report.questions.push(question),
            None => {
                let err = QuizError::Ingestion {
                    line,
                    reason: "missing question or correct answer".to_string(),
                };
                warn!("skipping row: {err}");
                report.skipped.push(err);
            }
        }
    }

    debug!(
        loaded = report.questions.len(),
        skipped = report.skipped.len(),
        "parsed question source"
    );
    report
}

fn record_to_question(record: &StringRecord, columns: &Columns) -> Option<QuestionRecord> {
    let mut slots = columns.incorrect.map(|col| raw_field(record, col));

    let overflow = columns
        .extra_incorrect
        .iter()
        .copied()
        .chain(columns.width..record.len());
    for col in overflow {
        let extra = raw_field(record, Some(col));
        if extra.is_empty() {
            continue;
        }
        if slots[2].is_empty() {
            slots[2] = extra;
        } else {
            slots[2] = format!("{}, {}", slots[2], extra);
        }
    }

    let question = clean_field(&raw_field(record, columns.question));
    let correct_answer = clean_field(&raw_field(record, columns.correct));
    if question.is_empty() || correct_answer.is_empty() {
        return None;
    }

    let incorrect_answers = slots
        .iter()
        .map(|s| clean_field(s))
        .filter(|s| !s.is_empty())
        .collect();

    Some(QuestionRecord {
        question,
        correct_answer,
        incorrect_answers,
        context: clean_field(&raw_field(record, columns.context)),
    })
}
