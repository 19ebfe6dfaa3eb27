use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};
use rust_i18n::t;

use crate::ui::theme::Theme;

/// Share of questions whose repetition counter reached zero.
pub struct MasteryBar<'a> {
    pub mastered: usize,
    pub total: usize,
    pub theme: &'a Theme,
}

impl<'a> MasteryBar<'a> {
    pub fn new(mastered: usize, total: usize, theme: &'a Theme) -> Self {
        Self {
            mastered: mastered.min(total),
            total,
            theme,
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.mastered as f64 / self.total as f64
        }
    }
}

impl Widget for MasteryBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered().border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio() * inner.width as f64).round() as u16;
        for x in inner.x..inner.x + inner.width {
            let bg = if x < inner.x + filled_width {
                colors.bar_filled()
            } else {
                colors.bar_empty()
            };
            buf[(x, inner.y)].set_style(Style::default().bg(bg));
        }

        let label = t!("progress.mastered", done = self.mastered, total = self.total).to_string();
        let label_width = label.chars().count() as u16;
        let label_x = inner.x + inner.width.saturating_sub(label_width) / 2;
        buf.set_stringn(
            label_x,
            inner.y,
            &label,
            inner.width as usize,
            Style::default().fg(colors.header_fg()),
        );
    }
}
