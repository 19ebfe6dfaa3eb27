use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::ui::path_input::PathInput;
use crate::ui::theme::Theme;

/// Popup holding the path field for importing a progress file.
pub struct ImportPrompt<'a> {
    pub input: &'a PathInput,
    pub theme: &'a Theme,
}

impl Widget for ImportPrompt<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        Clear.render(area, buf);

        let block = Block::bordered()
            .title(format!(" {} ", t!("import.title")))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));

        let (before, after) = self.input.split_at_cursor();
        let mut chars = after.chars();
        let cursor_char = chars.next().map(String::from).unwrap_or_else(|| " ".to_string());
        let rest = chars.as_str();

        let mut lines = vec![
            Line::from(Span::styled(
                t!("import.prompt").to_string(),
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(before, Style::default().fg(colors.accent())),
                Span::styled(
                    cursor_char,
                    Style::default()
                        .fg(colors.bg())
                        .bg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(rest, Style::default().fg(colors.accent())),
            ]),
            Line::from(""),
        ];
        if self.input.completion_error {
            lines.push(Line::from(Span::styled(
                t!("import.no_matches").to_string(),
                Style::default().fg(colors.warning()),
            )));
        }
        lines.push(Line::from(Span::styled(
            t!("import.hint").to_string(),
            Style::default().fg(colors.context_fg()),
        )));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
