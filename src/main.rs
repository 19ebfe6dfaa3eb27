use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{error, info};

use repaso::app::App;
use repaso::config::Config;
use repaso::deck::source::load_questions;
use repaso::event::{AppEvent, EventHandler};
use repaso::logging;
use repaso::session::QuizSession;
use repaso::store::json_store::{self, JsonStore};
use repaso::ui::layout::QuizLayout;
use repaso::ui::render::render;
use repaso::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "repaso",
    version,
    about = "Terminal flashcard quiz with repetition-weighted review"
)]
struct Cli {
    #[arg(short, long, help = "Question CSV path or http(s) URL")]
    questions: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Interface language (en, es)")]
    lang: Option<String>,

    #[arg(short, long, help = "Repetitions per question when starting fresh")]
    repetitions: Option<u32>,

    #[arg(long, value_name = "DIR", help = "Write saved progress to DIR/quizProgress.json and exit")]
    export: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Replace saved progress with FILE and exit")]
    import: Option<PathBuf>,

    #[arg(long, help = "Delete saved progress and exit")]
    reset: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut Config) {
        if let Some(questions) = &self.questions {
            config.questions = questions.clone();
        }
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
        if let Some(lang) = &self.lang {
            config.language = lang.clone();
        }
        if let Some(repetitions) = self.repetitions {
            config.initial_repetitions = repetitions;
        }
        config.normalize();
    }

    fn is_one_shot(&self) -> bool {
        self.reset || self.export.is_some() || self.import.is_some()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Ignoring unreadable config {}: {err:#}", Config::config_path().display());
            Config::default()
        }
    };
    cli.apply_to(&mut config);
    rust_i18n::set_locale(&config.language);

    let _log_guard = logging::init_tracing(&config.log_level, &logging::default_log_dir());

    let store = match JsonStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            error!("progress will not be saved: {err:#}");
            None
        }
    };

    if cli.is_one_shot() {
        let Some(store) = store else {
            bail!("progress store is unavailable");
        };
        return run_command(&cli, &store);
    }

    let questions = load_questions(&config.questions)
        .with_context(|| format!("could not load questions from {}", config.questions))?;
    if questions.is_empty() {
        bail!("no usable questions in {}", config.questions);
    }

    let snapshot = store.as_ref().and_then(JsonStore::load_snapshot);
    let session = QuizSession::resume(
        questions,
        snapshot,
        config.initial_repetitions,
        SmallRng::from_entropy(),
    );

    let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
    let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
    let mut app = App::new(config, theme, session, store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!("terminal loop failed: {err:#}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// `--reset`, `--export` and `--import` work on the stored snapshot without
/// starting the UI.
fn run_command(cli: &Cli, store: &JsonStore) -> Result<()> {
    if cli.reset {
        store.clear_snapshot()?;
        info!("saved progress cleared");
        println!("Cleared saved progress");
    }
    if let Some(dir) = &cli.export {
        let Some(snapshot) = store.load_snapshot().filter(|s| !s.is_empty()) else {
            bail!("no saved progress to export");
        };
        let path = json_store::export_to_file(&snapshot, dir)?;
        println!("Exported progress to {}", path.display());
    }
    if let Some(file) = &cli.import {
        let snapshot = json_store::import_from_file(file)?;
        store.save_snapshot(&snapshot)?;
        println!("Imported progress from {}", file.display());
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        let mut layout = QuizLayout::default();
        terminal.draw(|frame| layout = render(frame, app))?;
        app.layout = layout;

        match events.next()? {
            AppEvent::Key(key) => app.handle_key(key),
            AppEvent::Mouse(mouse) => app.handle_mouse(mouse),
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
