use std::fs;

use tracing::{error, info};

use crate::deck::QuestionStore;
use crate::deck::ingest::parse_questions;
use crate::error::QuizError;

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Read the raw CSV text from a local path or an HTTP(S) URL.
pub fn read_source(location: &str) -> Result<String, QuizError> {
    if is_remote(location) {
        fetch_url(location)
    } else {
        fs::read_to_string(location).map_err(|e| QuizError::transport(location, e))
    }
}

/// Load and parse the question source. Bad rows are logged and dropped; only a
/// failure to obtain the text at all is an error.
pub fn load_questions(location: &str) -> Result<QuestionStore, QuizError> {
    let data = read_source(location).inspect_err(|e| error!("{e}"))?;
    let report = parse_questions(&data);
    info!(
        source = location,
        questions = report.questions.len(),
        skipped = report.skipped.len(),
        "loaded questions"
    );
    Ok(QuestionStore::new(report.questions))
}

#[cfg(feature = "network")]
fn fetch_url(url: &str) -> Result<String, QuizError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Option::<std::time::Duration>::None)
        .build()
        .map_err(|e| QuizError::transport(url, e))?;
    let response = client
        .get(url)
        .send()
        .map_err(|e| QuizError::transport(url, e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(QuizError::transport(url, format!("HTTP status {status}")));
    }
    response.text().map_err(|e| QuizError::transport(url, e))
}

#[cfg(not(feature = "network"))]
fn fetch_url(url: &str) -> Result<String, QuizError> {
    Err(QuizError::transport(
        url,
        "built without the `network` feature",
    ))
}
