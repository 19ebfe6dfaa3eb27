use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

const MAX_CONTENT_WIDTH: u16 = 100;
const COMPACT_HEIGHT: u16 = 24;

/// Screen regions for the quiz view. Option rows are kept so mouse clicks
/// can be mapped back to the option under the pointer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuizLayout {
    pub header: Rect,
    pub question: Rect,
    pub options: Vec<Rect>,
    pub feedback: Rect,
    pub footer: Rect,
    pub compact: bool,
}

impl QuizLayout {
    pub fn new(area: Rect, option_count: usize, footer_lines: u16) -> Self {
        let compact = area.height < COMPACT_HEIGHT;
        let row_height: u16 = if compact { 1 } else { 3 };
        let options_height = row_height.saturating_mul(option_count as u16);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(options_height),
                Constraint::Length(if compact { 1 } else { 3 }),
                Constraint::Length(footer_lines.max(1)),
            ])
            .split(area);

        let options_area = content_column(vertical[2]);
        let options = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(row_height); option_count])
            .split(options_area)
            .to_vec();

        Self {
            header: vertical[0],
            question: content_column(vertical[1]),
            options,
            feedback: content_column(vertical[3]),
            footer: vertical[4],
            compact,
        }
    }

    /// Index of the option row containing the cell at (`column`, `row`).
    pub fn option_at(&self, column: u16, row: u16) -> Option<usize> {
        let pos = Position::new(column, row);
        self.options.iter().position(|rect| rect.contains(pos))
    }
}

/// Horizontally centered column no wider than `MAX_CONTENT_WIDTH`.
fn content_column(area: Rect) -> Rect {
    let width = area.width.min(MAX_CONTENT_WIDTH);
    let left = area.x + (area.width - width) / 2;
    Rect::new(left, area.y, width, area.height)
}

/// Greedily pack key hints into as few lines as fit in `width`.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();

    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let candidate = if current.is_empty() {
            format!("{prefix}{hint}")
        } else {
            format!("{current}{separator}{hint}")
        };
        if current.is_empty() || candidate.chars().count() <= width {
            current = candidate;
        } else {
            out.push(std::mem::replace(&mut current, format!("{prefix}{hint}")));
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 50;
    const MIN_POPUP_HEIGHT: u16 = 8;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_rows_are_stacked_and_hit_testable() {
        let layout = QuizLayout::new(Rect::new(0, 0, 80, 40), 4, 1);
        assert!(!layout.compact);
        assert_eq!(layout.options.len(), 4);
        for pair in layout.options.windows(2) {
            assert_eq!(pair[0].y + pair[0].height, pair[1].y);
        }
        let third = layout.options[2];
        assert_eq!(layout.option_at(third.x + 1, third.y + 1), Some(2));
        assert_eq!(layout.option_at(0, 0), None);
    }

    #[test]
    fn short_terminals_use_single_line_options() {
        let layout = QuizLayout::new(Rect::new(0, 0, 80, 16), 3, 1);
        assert!(layout.compact);
        assert!(layout.options.iter().all(|r| r.height == 1));
    }

    #[test]
    fn content_is_capped_and_centered_on_wide_screens() {
        let layout = QuizLayout::new(Rect::new(0, 0, 200, 40), 2, 1);
        assert_eq!(layout.question.width, MAX_CONTENT_WIDTH);
        assert_eq!(layout.question.x, 50);
    }

    #[test]
    fn hints_pack_onto_lines() {
        let lines = pack_hint_lines(&["[1-4] answer", "[f] forget", "[q] quit"], 30);
        assert_eq!(lines, vec!["  [1-4] answer  [f] forget", "  [q] quit"]);
        assert!(pack_hint_lines(&[], 30).is_empty());
    }

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered_rect(50, 50, area);
        assert_eq!(popup.width, 40);
        assert_eq!(popup.height, 8);
        assert_eq!(popup.y, 1);
    }
}
