use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use civicdesk_core::models::Statistic;

use crate::app::App;
use crate::ui::styles;

use super::ready_or_render;

/// Cards per row
const CARDS_PER_ROW: usize = 4;

/// Card height including borders
const CARD_HEIGHT: u16 = 5;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(overview) = ready_or_render(frame, &app.dashboard, "Dashboard", area) else {
        return;
    };

    let stats = overview.statistics();
    let row_count = stats.len().div_ceil(CARDS_PER_ROW).max(1);

    let mut constraints = vec![Constraint::Length(2)];
    constraints.extend(std::iter::repeat(Constraint::Length(CARD_HEIGHT)).take(row_count));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let heading = Line::from(vec![
        Span::styled(" Overview", styles::title_style()),
        Span::styled(
            format!("  ({} view)", overview.role().display_name()),
            styles::muted_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(heading), chunks[0]);

    for (row, row_stats) in stats.chunks(CARDS_PER_ROW).enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, CARDS_PER_ROW as u32); CARDS_PER_ROW])
            .split(chunks[row + 1]);

        for (stat, cell) in row_stats.iter().zip(cells.iter()) {
            render_card(frame, stat, *cell);
        }
    }
}

fn render_card(frame: &mut Frame, stat: &Statistic, area: Rect) {
    let mut value = vec![Span::styled(stat.value.clone(), styles::highlight_style())];
    if let Some(ref suffix) = stat.suffix {
        value.push(Span::raw(" "));
        value.push(Span::styled(suffix.clone(), styles::muted_style()));
    }

    let lines = vec![Line::from(""), Line::from(value)];

    let block = Block::default()
        .title(format!(" {} ", stat.title))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
