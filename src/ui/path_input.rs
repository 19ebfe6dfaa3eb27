use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const MAX_SCANNED: usize = 1000;
const MAX_COMPLETIONS: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Single-line editor for the import prompt. Tab completes against the
/// filesystem, offering directories and `.json` files.
pub struct PathInput {
    text: String,
    /// Char index; 0 is before the first char.
    cursor: usize,
    completions: Vec<String>,
    completion_index: Option<usize>,
    pub completion_error: bool,
}

impl PathInput {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
            completions: Vec::new(),
            completion_index: None,
            completion_error: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    /// The typed path with a leading `~` expanded.
    pub fn expanded_path(&self) -> PathBuf {
        let trimmed = self.text.trim();
        match (trimmed.strip_prefix('~'), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest.trim_start_matches(['/', '\\'])),
            _ => PathBuf::from(trimmed),
        }
    }

    /// Text split around the cursor for rendering.
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.text.split_at(self.byte_offset(self.cursor))
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Tab => {
                self.tab_complete(true);
                return InputResult::Continue;
            }
            KeyCode::BackTab => {
                self.tab_complete(false);
                return InputResult::Continue;
            }
            _ => {}
        }

        self.reset_completion();
        let len = self.text.chars().count();
        match key.code {
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.remove_at_cursor();
            }
            KeyCode::Delete => self.remove_at_cursor(),
            KeyCode::Char('u') if ctrl => {
                self.text.clear();
                self.cursor = 0;
            }
            KeyCode::Char(ch) if !ctrl => {
                let at = self.byte_offset(self.cursor);
                self.text.insert(at, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        InputResult::Continue
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn remove_at_cursor(&mut self) {
        let at = self.byte_offset(self.cursor);
        if let Some(ch) = self.text[at..].chars().next() {
            self.text.replace_range(at..at + ch.len_utf8(), "");
        }
    }

    fn reset_completion(&mut self) {
        self.completions.clear();
        self.completion_index = None;
        self.completion_error = false;
    }

    fn tab_complete(&mut self, forward: bool) {
        if self.cursor < self.text.chars().count() {
            return;
        }
        let next = match self.completion_index {
            None => {
                self.completions = self.scan_completions();
                if self.completions.is_empty() {
                    return;
                }
                0
            }
            Some(idx) => {
                let count = self.completions.len();
                if forward {
                    (idx + 1) % count
                } else {
                    (idx + count - 1) % count
                }
            }
        };
        self.completion_index = Some(next);
        self.text = self.completions[next].clone();
        self.cursor = self.text.chars().count();
    }

    fn scan_completions(&mut self) -> Vec<String> {
        let seed = self.text.clone();
        let split = seed.rfind(['/', '\\']).map(|pos| pos + 1).unwrap_or(0);
        let (dir_str, partial) = seed.split_at(split);

        let read_dir = if dir_str.is_empty() {
            PathBuf::from(".")
        } else {
            PathInput::new(dir_str).expanded_path()
        };
        let entries = match std::fs::read_dir(&read_dir) {
            Ok(rd) => rd,
            Err(_) => {
                self.completion_error = true;
                return Vec::new();
            }
        };

        let include_hidden = partial.starts_with('.');
        let mut candidates: Vec<(bool, String)> = entries
            .take(MAX_SCANNED)
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
                if (!include_hidden && name.starts_with('.')) || !name.starts_with(partial) {
                    return None;
                }
                if is_dir {
                    Some((true, format!("{dir_str}{name}{}", std::path::MAIN_SEPARATOR)))
                } else if name.ends_with(".json") {
                    Some((false, format!("{dir_str}{name}")))
                } else {
                    None
                }
            })
            .collect();

        // Directories first, then alphabetical
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        candidates.truncate(MAX_COMPLETIONS);
        candidates.into_iter().map(|(_, path)| path).collect()
    }
}
