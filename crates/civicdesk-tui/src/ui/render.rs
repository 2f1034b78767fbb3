use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use civicdesk_core::fetch::Loadable;
use civicdesk_core::routes::Route;
use civicdesk_core::utils::format_date;

use crate::app::{App, AppState, LoginFocus, Screen};

use super::pages;
use super::styles;

const APP_TITLE: &str = "CivicDesk";
const APP_SUBTITLE: &str = "Municipal Administration";

pub fn render(frame: &mut Frame, app: &App) {
    match app.screen {
        Screen::Loading => render_loading(frame),
        Screen::Login => render_login(frame, app),
        Screen::Page(_) | Screen::NotFound => render_main(frame, app),
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_loading(frame: &mut Frame) {
    let area = centered_rect_fixed(30, 3, frame.area());
    let paragraph = Paragraph::new(Line::from(Span::styled("Loading...", styles::muted_style())))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false)));
    frame.render_widget(paragraph, area);
}

fn render_main(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Menu
            Constraint::Min(10),   // Page content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_menu(frame, app, chunks[1]);
    render_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ShowingComments => render_comments_overlay(frame, app),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  {} ", APP_TITLE);
    let user = app
        .user()
        .map(|u| format!("{} ({})", u.display_name(), u.role.display_name()))
        .unwrap_or_default();
    let help_hint = "[?] Help";

    let used = title.len() + APP_SUBTITLE.len() + user.chars().count() + help_hint.len() + 6;
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::styled(APP_SUBTITLE, styles::muted_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(user, styles::highlight_style()),
        Span::raw("   "),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_menu(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.current_route();

    let mut spans = vec![Span::raw(" ")];
    for (i, route) in Route::PROTECTED.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, route.title());
        spans.push(Span::styled(label, styles::tab_style(current == Some(*route))));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.screen {
        Screen::Page(route) => pages::render(frame, app, route, area),
        _ => render_not_found(frame, app, area),
    }
}

fn render_not_found(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("  404 - Page not found", styles::error_style())),
        Line::from(""),
        Line::from(Span::styled(
            format!("  Nothing lives at {}", app.location),
            styles::muted_style(),
        )),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("1-8", styles::help_key_style()),
            Span::styled(" to pick a page", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[r]efresh | [L]ogout | [q]uit";

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => format!(" {} ", app.api.base_url()),
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());

    let left_style = if app.status_message.is_some() {
        styles::highlight_style()
    } else {
        styles::muted_style()
    };

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(format!("  {}", APP_TITLE), styles::title_style())),
        Line::from(Span::styled(
            format!("  {} - version {}", APP_SUBTITLE, version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-8", "Open page"),
        help_line("←/→", "Previous/next page"),
        help_line("↑/↓", "Navigate list"),
        help_line("PgUp/PgDn", "Scroll list"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("r", "Refresh page"),
        help_line("L", "Log out"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Tasks", styles::highlight_style())),
        help_line("f", "Cycle status filter"),
        help_line("/", "Search"),
        help_line("s", "Advance status"),
        help_line("x", "Delete task"),
        help_line("Enter", "Show comments"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_login(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() || app.login_pending { 13 } else { 11 };
    let area = centered_rect_fixed(46, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{:^44}", APP_TITLE),
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!("{:^44}", APP_SUBTITLE),
            styles::muted_style(),
        )),
        Line::from(""),
    ];

    let field_style = |focused: bool| {
        if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        }
    };

    let username_focused = app.login_focus == LoginFocus::Username;
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(
            format!("{:<16}{}", app.login_username, cursor),
            field_style(username_focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let password_masked: String = "*".repeat(app.login_password.chars().count().min(16));
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(
            format!("{:<16}{}", password_masked, cursor),
            field_style(password_focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    let button_focused = app.login_focus == LoginFocus::Button;
    let label = if button_focused { " ▶ Login ◀ " } else { "   Login   " };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("            ["),
        Span::styled(label, field_style(button_focused)),
        Span::raw("]"),
    ]));

    if app.login_pending {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Signing in...", styles::muted_style())));
    } else if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_comments_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(70, 20, frame.area());
    frame.render_widget(Clear, area);

    let title = app
        .comments_task
        .as_ref()
        .map(|(_, name)| format!(" Comments - {} ", name))
        .unwrap_or_else(|| " Comments ".to_string());

    let mut lines = Vec::new();
    match app.comments {
        Loadable::Idle | Loadable::Loading => {
            lines.push(Line::from(Span::styled(" Loading...", styles::muted_style())));
        }
        Loadable::Failed(ref message) => {
            lines.push(Line::from(Span::styled(format!(" {}", message), styles::error_style())));
        }
        Loadable::Ready(ref comments) if comments.is_empty() => {
            lines.push(Line::from(Span::styled(" No comments yet", styles::muted_style())));
        }
        Loadable::Ready(ref comments) => {
            for comment in comments {
                let author = comment
                    .user
                    .as_ref()
                    .map(|u| u.display_name().to_string())
                    .unwrap_or_else(|| "Unknown".to_string());
                let when = comment.created_at.as_deref().map(format_date).unwrap_or_default();
                lines.push(Line::from(vec![
                    Span::styled(format!(" {}", author), styles::highlight_style()),
                    Span::styled(format!("  {}", when), styles::muted_style()),
                ]));
                lines.push(Line::from(format!("   {}", comment.text)));
                lines.push(Line::from(""));
            }
        }
    }

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .title_bottom(Line::from(" Esc to close ").right_aligned())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let task_id = app
        .selected_task()
        .map(|t| t.task_id.clone())
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   Delete task {}?", task_id),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
