use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::deck::QuestionRecord;
use crate::ui::theme::Theme;

/// Question text, plus its context once the answer has been revealed.
pub struct QuestionCard<'a> {
    pub record: &'a QuestionRecord,
    pub show_context: bool,
    pub theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(record: &'a QuestionRecord, show_context: bool, theme: &'a Theme) -> Self {
        Self {
            record,
            show_context,
            theme,
        }
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("question.title")))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));

        let mut lines = vec![Line::from(Span::styled(
            self.record.question.as_str(),
            Style::default()
                .fg(colors.fg())
                .add_modifier(Modifier::BOLD),
        ))];

        if self.show_context && self.record.has_context() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("{}:", t!("question.context")),
                Style::default().fg(colors.accent()),
            )));
            lines.push(Line::from(Span::styled(
                self.record.context.as_str(),
                Style::default().fg(colors.context_fg()),
            )));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionState {
    Open,
    ChosenCorrect,
    ChosenIncorrect,
}

/// One numbered answer row. Compact rows drop the border.
pub struct OptionRow<'a> {
    pub number: usize,
    pub text: &'a str,
    pub state: OptionState,
    pub compact: bool,
    pub theme: &'a Theme,
}

impl Widget for OptionRow<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let (accent, bg) = match self.state {
            OptionState::Open => (colors.border(), colors.bg()),
            OptionState::ChosenCorrect => (colors.correct(), colors.option_selected_bg()),
            OptionState::ChosenIncorrect => (colors.incorrect(), colors.option_selected_bg()),
        };

        let line = Line::from(vec![
            Span::styled(
                format!("[{}] ", self.number),
                Style::default()
                    .fg(colors.option_key())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                self.text,
                Style::default().fg(if self.state == OptionState::Open {
                    colors.fg()
                } else {
                    accent
                }),
            ),
        ]);

        let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
        if self.compact {
            paragraph.render(area, buf);
        } else {
            paragraph
                .block(Block::bordered().border_style(Style::default().fg(accent)))
                .render(area, buf);
        }
    }
}
