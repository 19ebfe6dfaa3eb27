use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use rust_i18n::t;

use crate::app::{App, AppScreen, StatusKind};
use crate::ui::components::completion::CompletionPanel;
use crate::ui::components::import_prompt::ImportPrompt;
use crate::ui::components::mastery_bar::MasteryBar;
use crate::ui::components::question_card::{OptionRow, OptionState, QuestionCard};
use crate::ui::layout::{QuizLayout, centered_rect, pack_hint_lines};

const MASTERY_BAR_WIDTH: u16 = 30;

/// Draw the whole frame and return the layout used, so mouse clicks can be
/// matched against what is on screen.
pub fn render(frame: &mut Frame, app: &App) -> QuizLayout {
    let area = frame.area();
    let colors = &app.theme.colors;
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

    let base_screen = match app.screen {
        AppScreen::ImportPrompt => app.import_return,
        other => other,
    };

    let footer = footer_lines(app, base_screen, area.width as usize);
    let option_count = if base_screen == AppScreen::Complete {
        0
    } else {
        app.session.options().len()
    };
    let layout = QuizLayout::new(area, option_count, footer.len() as u16);

    render_header(frame, app, layout.header);
    if base_screen == AppScreen::Complete {
        let body = layout.question.union(layout.feedback);
        frame.render_widget(
            CompletionPanel {
                question_count: app.session.questions().len(),
                theme: app.theme,
            },
            centered_rect(60, 60, body),
        );
    } else {
        render_quiz(frame, app, base_screen, &layout);
    }
    frame.render_widget(Paragraph::new(footer), layout.footer);

    if let Some(input) = app.import_input.as_ref().filter(|_| app.screen == AppScreen::ImportPrompt) {
        frame.render_widget(
            ImportPrompt {
                input,
                theme: app.theme,
            },
            centered_rect(60, 30, area),
        );
    }

    layout
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(MASTERY_BAR_WIDTH)])
        .split(area);

    let mut spans = vec![
        Span::styled(
            format!(" {} ", t!("app.title")),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", t!("header.remaining", count = app.session.total_remaining())),
            Style::default().fg(colors.header_fg()).bg(colors.header_bg()),
        ),
    ];
    if let Some(count) = app.session.current_repetitions() {
        spans.push(Span::styled(
            format!("| {} ", t!("header.question_repetitions", count = count)),
            Style::default().fg(colors.accent()).bg(colors.header_bg()),
        ));
    }

    let header = Paragraph::new(vec![Line::from(""), Line::from(spans)])
        .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, columns[0]);

    let tracker = app.session.tracker();
    frame.render_widget(
        MasteryBar::new(tracker.mastered_count(), tracker.entries().len(), app.theme),
        columns[1],
    );
}

fn render_quiz(frame: &mut Frame, app: &App, screen: AppScreen, layout: &QuizLayout) {
    let colors = &app.theme.colors;
    let Some(record) = app.session.current_question() else {
        return;
    };
    let revealed = screen == AppScreen::ShowingFeedback;

    frame.render_widget(QuestionCard::new(record, revealed, app.theme), layout.question);

    for (slot, (text, rect)) in app.session.options().iter().zip(&layout.options).enumerate() {
        let state = match (&app.last_outcome, app.selected) {
            (Some(outcome), Some(selected)) if revealed && selected == slot => {
                if outcome.is_correct {
                    OptionState::ChosenCorrect
                } else {
                    OptionState::ChosenIncorrect
                }
            }
            // Once answered only the chosen option stays visible
            _ if revealed => continue,
            _ => OptionState::Open,
        };
        frame.render_widget(
            OptionRow {
                number: slot + 1,
                text,
                state,
                compact: layout.compact,
                theme: app.theme,
            },
            *rect,
        );
    }

    if let Some(outcome) = app.last_outcome.as_ref().filter(|_| revealed) {
        let (text, color) = if outcome.is_correct {
            (t!("feedback.correct").to_string(), colors.success())
        } else {
            (
                t!("feedback.incorrect", answer = outcome.correct_answer).to_string(),
                colors.error(),
            )
        };
        let feedback = Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .wrap(Wrap { trim: true });
        let feedback = if layout.compact {
            feedback
        } else {
            feedback.block(Block::bordered().border_style(Style::default().fg(color)))
        };
        frame.render_widget(feedback, layout.feedback);
    }
}

fn footer_lines(app: &App, screen: AppScreen, width: usize) -> Vec<Line<'static>> {
    let colors = &app.theme.colors;
    let mut lines = Vec::new();

    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => colors.success(),
            StatusKind::Error => colors.error(),
        };
        lines.push(Line::from(Span::styled(
            format!("  {}", status.text),
            Style::default().fg(color),
        )));
    }

    let hints: Vec<String> = match screen {
        AppScreen::AwaitingAnswer => vec![
            t!("hints.answer", max = app.session.options().len()).to_string(),
            t!("hints.forget").to_string(),
            t!("hints.export").to_string(),
            t!("hints.import").to_string(),
            t!("hints.quit").to_string(),
        ],
        AppScreen::ShowingFeedback => vec![
            t!("hints.next").to_string(),
            t!("hints.forget").to_string(),
            t!("hints.export").to_string(),
            t!("hints.import").to_string(),
            t!("hints.quit").to_string(),
        ],
        AppScreen::Complete | AppScreen::ImportPrompt => vec![
            t!("hints.restart").to_string(),
            t!("hints.import").to_string(),
            t!("hints.quit").to_string(),
        ],
    };
    let hint_refs: Vec<&str> = hints.iter().map(String::as_str).collect();
    lines.extend(
        pack_hint_lines(&hint_refs, width)
            .into_iter()
            .map(|hint| Line::from(Span::styled(hint, Style::default().fg(colors.context_fg())))),
    );
    lines
}
