//! Page content for each protected route.

pub mod analytics;
pub mod dashboard;
pub mod placeholder;
pub mod tasks;

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use civicdesk_core::fetch::Loadable;
use civicdesk_core::routes::Route;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, route: Route, area: Rect) {
    match route {
        Route::Dashboard => dashboard::render(frame, app, area),
        Route::Tasks => tasks::render(frame, app, area),
        Route::Analytics => analytics::render(frame, app, area),
        other => placeholder::render(frame, other, area),
    }
}

/// Draw the loading or error state of a fetch into `area`.
/// Returns the data when it is ready and nothing was drawn.
pub fn ready_or_render<'a, T>(
    frame: &mut Frame,
    state: &'a Loadable<T>,
    title: &str,
    area: Rect,
) -> Option<&'a T> {
    let lines = match state {
        Loadable::Ready(data) => return Some(data),
        Loadable::Idle | Loadable::Loading => {
            vec![Line::from(Span::styled("Loading...", styles::muted_style()))]
        }
        Loadable::Failed(message) => vec![
            Line::from(Span::styled(message.clone(), styles::error_style())),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", styles::muted_style()),
                Span::styled("r", styles::help_key_style()),
                Span::styled(" to try again", styles::muted_style()),
            ]),
        ],
    };

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
    None
}
