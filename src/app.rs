use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use rust_i18n::t;
use tracing::{error, info};

use crate::config::Config;
use crate::engine::evaluator::Outcome;
use crate::engine::scheduler::Next;
use crate::session::QuizSession;
use crate::store::json_store::{self, JsonStore};
use crate::ui::layout::QuizLayout;
use crate::ui::path_input::{InputResult, PathInput};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    AwaitingAnswer,
    ShowingFeedback,
    ImportPrompt,
    Complete,
}

impl AppScreen {
    pub fn is_quiz(self) -> bool {
        matches!(self, AppScreen::AwaitingAnswer | AppScreen::ShowingFeedback)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// 0-based option slot.
    Select(usize),
    Next,
    Forget,
    Export,
    OpenImport,
    Restart,
    Quit,
}

/// Map a key press to the action it triggers on `screen`, if any.
/// The import prompt consumes its own keys; only Ctrl-C reaches here.
pub fn dispatch(screen: AppScreen, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }
    if screen == AppScreen::ImportPrompt {
        return None;
    }

    match (screen, key.code) {
        (_, KeyCode::Char('q') | KeyCode::Esc) => Some(Action::Quit),
        (AppScreen::AwaitingAnswer, KeyCode::Char(ch @ '1'..='4')) => {
            Some(Action::Select(ch as usize - '1' as usize))
        }
        (AppScreen::ShowingFeedback, KeyCode::Char(' ' | 'n') | KeyCode::Enter) => {
            Some(Action::Next)
        }
        (s, KeyCode::Char('f')) if s.is_quiz() => Some(Action::Forget),
        (s, KeyCode::Char('e')) if s.is_quiz() => Some(Action::Export),
        (_, KeyCode::Char('i')) => Some(Action::OpenImport),
        (AppScreen::Complete, KeyCode::Char('r')) => Some(Action::Restart),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

pub struct App {
    pub screen: AppScreen,
    pub session: QuizSession,
    pub last_outcome: Option<Outcome>,
    pub selected: Option<usize>,
    pub import_input: Option<PathInput>,
    /// Screen to return to when the import prompt is dismissed.
    pub import_return: AppScreen,
    pub status: Option<StatusMessage>,
    pub theme: &'static Theme,
    pub config: Config,
    pub store: Option<JsonStore>,
    /// Layout of the last drawn frame, for mouse hit-testing.
    pub layout: QuizLayout,
    pub should_quit: bool,
}

impl App {
    /// Build the app and show the first question (or the completion screen).
    pub fn new(
        config: Config,
        theme: &'static Theme,
        session: QuizSession,
        store: Option<JsonStore>,
    ) -> Self {
        let mut app = Self {
            screen: AppScreen::AwaitingAnswer,
            session,
            last_outcome: None,
            selected: None,
            import_input: None,
            import_return: AppScreen::AwaitingAnswer,
            status: None,
            theme,
            config,
            store,
            layout: QuizLayout::default(),
            should_quit: false,
        };
        app.advance();
        app
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.screen == AppScreen::ImportPrompt && dispatch(self.screen, key).is_none() {
            self.handle_import_key(key);
            return;
        }
        if let Some(action) = dispatch(self.screen, key) {
            self.apply(action);
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.screen != AppScreen::AwaitingAnswer {
            return;
        }
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if let Some(slot) = self.layout.option_at(mouse.column, mouse.row) {
            self.select_option(slot);
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Select(slot) => self.select_option(slot),
            Action::Next => self.continue_to_next(),
            Action::Forget => self.forget_current(),
            Action::Export => self.export_progress(),
            Action::OpenImport => self.open_import(),
            Action::Restart => self.restart(),
            Action::Quit => self.should_quit = true,
        }
    }

    pub fn select_option(&mut self, slot: usize) {
        if self.screen != AppScreen::AwaitingAnswer {
            return;
        }
        match self.session.answer(slot) {
            Ok(Some(outcome)) => {
                self.last_outcome = Some(outcome);
                self.selected = Some(slot);
                self.screen = AppScreen::ShowingFeedback;
                self.persist();
            }
            Ok(None) => {}
            Err(e) => {
                error!("failed to evaluate answer: {e}");
                self.set_error(e.to_string());
            }
        }
    }

    pub fn continue_to_next(&mut self) {
        if self.screen == AppScreen::ShowingFeedback {
            self.advance();
        }
    }

    pub fn forget_current(&mut self) {
        if !self.screen.is_quiz() {
            return;
        }
        if let Some(remaining) = self.session.forget() {
            self.set_info(t!("status.forgot", count = remaining).to_string());
        }
        self.advance();
    }

    pub fn export_progress(&mut self) {
        let dir = self.config.export_dir();
        match json_store::export_to_file(&self.session.snapshot(), &dir) {
            Ok(path) => {
                self.set_info(t!("status.exported", path = path.display()).to_string());
            }
            Err(e) => {
                error!("export failed: {e:#}");
                self.set_error(t!("status.export_failed", error = e).to_string());
            }
        }
    }

    pub fn open_import(&mut self) {
        if self.screen == AppScreen::ImportPrompt {
            return;
        }
        let default_path = json_store::export_path(&self.config.export_dir());
        self.import_input = Some(PathInput::new(&default_path.to_string_lossy()));
        self.import_return = self.screen;
        self.screen = AppScreen::ImportPrompt;
    }

    fn handle_import_key(&mut self, key: KeyEvent) {
        let Some(input) = self.import_input.as_mut() else {
            self.screen = self.import_return;
            return;
        };
        match input.handle(key) {
            InputResult::Continue => {}
            InputResult::Cancel => self.close_import(),
            InputResult::Submit => {
                let path = input.expanded_path();
                self.close_import();
                self.import_from(&path);
            }
        }
    }

    fn close_import(&mut self) {
        self.import_input = None;
        self.screen = self.import_return;
    }

    /// Replace progress with the file at `path`. On any failure the current
    /// tracker, queue and screen stay as they were.
    pub fn import_from(&mut self, path: &Path) {
        match json_store::import_from_file(path) {
            Ok(snapshot) => {
                self.session.restore(snapshot);
                self.persist();
                self.set_info(t!("status.imported", path = path.display()).to_string());
                self.advance();
            }
            Err(e) => {
                error!(path = %path.display(), "import failed: {e}");
                self.set_error(t!("status.import_failed", error = e).to_string());
            }
        }
    }

    pub fn restart(&mut self) {
        if self.screen != AppScreen::Complete {
            return;
        }
        self.session.restart();
        self.status = None;
        self.advance();
    }

    fn advance(&mut self) {
        self.last_outcome = None;
        self.selected = None;
        match self.session.advance() {
            Next::Question(_) => {
                self.screen = AppScreen::AwaitingAnswer;
                self.persist();
            }
            Next::Complete => {
                self.screen = AppScreen::Complete;
                if let Some(store) = &self.store {
                    if let Err(e) = store.clear_snapshot() {
                        error!("failed to clear stored progress: {e:#}");
                    }
                }
                info!(questions = self.session.questions().len(), "quiz complete");
            }
        }
    }

    fn persist(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save_snapshot(&self.session.snapshot()) {
            error!("failed to save progress: {e:#}");
            self.set_error(t!("status.save_failed", error = e).to_string());
        }
    }

    fn set_info(&mut self, text: String) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Info,
            text,
        });
    }

    fn set_error(&mut self, text: String) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Error,
            text,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use tempfile::TempDir;

    use super::*;
    use crate::deck::{QuestionStore, record};
    use crate::engine::mastery::{DEFAULT_REPETITIONS, MasteryEntry};
    use crate::store::schema::SessionSnapshot;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn make_app(snapshot: Option<SessionSnapshot>) -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().join("data")).unwrap();
        let questions = QuestionStore::new(vec![
            record("q0", "a0", &["x0", "y0"]),
            record("q1", "a1", &["x1", "y1", "z1"]),
        ]);
        let session = QuizSession::resume(
            questions,
            snapshot,
            DEFAULT_REPETITIONS,
            SmallRng::seed_from_u64(21),
        );
        let config = Config {
            export_dir: dir.path().join("exports").to_string_lossy().to_string(),
            ..Config::default()
        };
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let app = App::new(config, theme, session, Some(store));
        (dir, app)
    }

    fn correct_slot(app: &App) -> usize {
        let answer = &app.session.current_question().unwrap().correct_answer;
        app.session
            .options()
            .iter()
            .position(|o| o == answer)
            .unwrap()
    }

    #[test]
    fn dispatch_table() {
        use AppScreen::*;
        assert_eq!(dispatch(AwaitingAnswer, key(KeyCode::Char('1'))), Some(Action::Select(0)));
        assert_eq!(dispatch(AwaitingAnswer, key(KeyCode::Char('4'))), Some(Action::Select(3)));
        assert_eq!(dispatch(AwaitingAnswer, key(KeyCode::Char('5'))), None);
        assert_eq!(dispatch(ShowingFeedback, key(KeyCode::Char('1'))), None);
        assert_eq!(dispatch(ShowingFeedback, key(KeyCode::Char(' '))), Some(Action::Next));
        assert_eq!(dispatch(ShowingFeedback, key(KeyCode::Enter)), Some(Action::Next));
        assert_eq!(dispatch(AwaitingAnswer, key(KeyCode::Char(' '))), None);
        assert_eq!(dispatch(AwaitingAnswer, key(KeyCode::Char('f'))), Some(Action::Forget));
        assert_eq!(dispatch(ShowingFeedback, key(KeyCode::Char('f'))), Some(Action::Forget));
        assert_eq!(dispatch(Complete, key(KeyCode::Char('f'))), None);
        assert_eq!(dispatch(Complete, key(KeyCode::Char('e'))), None);
        assert_eq!(dispatch(Complete, key(KeyCode::Char('i'))), Some(Action::OpenImport));
        assert_eq!(dispatch(Complete, key(KeyCode::Char('r'))), Some(Action::Restart));
        assert_eq!(dispatch(AwaitingAnswer, key(KeyCode::Char('r'))), None);
        assert_eq!(dispatch(Complete, key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(dispatch(ImportPrompt, key(KeyCode::Char('q'))), None);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(dispatch(ImportPrompt, ctrl_c), Some(Action::Quit));
    }

    #[test]
    fn starts_on_a_question_and_persists_it() {
        let (_dir, app) = make_app(None);
        assert_eq!(app.screen, AppScreen::AwaitingAnswer);
        let saved = app.store.as_ref().unwrap().load_snapshot().unwrap();
        assert_eq!(saved.question_queue[0], app.session.current_index().unwrap());
    }

    #[test]
    fn answer_then_next() {
        let (_dir, mut app) = make_app(None);
        let slot = correct_slot(&app);
        app.handle_key(key(KeyCode::Char(char::from(b'1' + slot as u8))));
        assert_eq!(app.screen, AppScreen::ShowingFeedback);
        assert!(app.last_outcome.as_ref().unwrap().is_correct);
        assert_eq!(app.session.total_remaining(), 5);

        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.screen, AppScreen::AwaitingAnswer);
        assert!(app.last_outcome.is_none());
    }

    #[test]
    fn forget_decrements_and_advances() {
        let (_dir, mut app) = make_app(None);
        app.handle_key(key(KeyCode::Char('f')));
        assert_eq!(app.session.total_remaining(), 5);
        assert_eq!(app.screen, AppScreen::AwaitingAnswer);
        assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Info);
    }

    #[test]
    fn completion_clears_snapshot() {
        let (_dir, mut app) = make_app(None);
        while app.screen != AppScreen::Complete {
            let slot = correct_slot(&app);
            app.select_option(slot);
            app.continue_to_next();
        }
        assert_eq!(app.session.total_remaining(), 0);
        assert!(!app.store.as_ref().unwrap().has_snapshot());
    }

    #[test]
    fn restart_from_complete() {
        let mut snapshot = SessionSnapshot::default();
        snapshot.question_stats.insert(0, MasteryEntry::new(0));
        snapshot.question_stats.insert(1, MasteryEntry::new(0));
        let (_dir, mut app) = make_app(Some(snapshot));
        assert_eq!(app.screen, AppScreen::Complete);

        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.screen, AppScreen::AwaitingAnswer);
        assert_eq!(app.session.total_remaining(), 6);
    }

    #[test]
    fn malformed_import_leaves_state_unchanged() {
        let (dir, mut app) = make_app(None);
        let before = app.session.snapshot();
        let screen = app.screen;

        let path = dir.path().join("broken.json");
        fs::write(&path, "{ definitely not json").unwrap();
        app.import_from(&path);
        assert_eq!(app.session.snapshot(), before);
        assert_eq!(app.screen, screen);
        assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Error);

        app.import_from(&dir.path().join("missing.json"));
        assert_eq!(app.session.snapshot(), before);
    }

    #[test]
    fn export_then_import_via_prompt() {
        let (_dir, mut app) = make_app(None);
        app.handle_key(key(KeyCode::Char('e')));
        assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Info);
        let exported = app.session.snapshot();

        app.handle_key(key(KeyCode::Char('f')));
        assert_ne!(app.session.snapshot(), exported);

        // The prompt is prefilled with the export path
        app.handle_key(key(KeyCode::Char('i')));
        assert_eq!(app.screen, AppScreen::ImportPrompt);
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.screen, AppScreen::AwaitingAnswer);
        assert_eq!(app.session.tracker().entries(), &exported.question_stats);
        assert_eq!(app.session.current_index(), Some(exported.question_queue[0]));
    }

    #[test]
    fn import_prompt_cancel_returns_to_previous_screen() {
        let (_dir, mut app) = make_app(None);
        app.handle_key(key(KeyCode::Char('i')));
        app.handle_key(key(KeyCode::Char('q')));
        assert_eq!(app.screen, AppScreen::ImportPrompt);
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.screen, AppScreen::AwaitingAnswer);
        assert!(app.import_input.is_none());
    }

    #[test]
    fn mouse_click_selects_option() {
        let (_dir, mut app) = make_app(None);
        app.layout = QuizLayout::new(
            ratatui::layout::Rect::new(0, 0, 80, 40),
            app.session.options().len(),
            1,
        );
        let row = app.layout.options[0];
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: row.x + 2,
            row: row.y + 1,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.screen, AppScreen::ShowingFeedback);
        assert_eq!(app.selected, Some(0));
    }
}
