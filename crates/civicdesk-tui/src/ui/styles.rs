use ratatui::style::{Color, Modifier, Style};

use civicdesk_core::models::{TaskPriority, TaskStatus};

// Color palette
pub const PRIMARY: Color = Color::Rgb(24, 144, 255);
pub const SECONDARY: Color = Color::Rgb(82, 196, 26);
pub const ACCENT: Color = Color::Rgb(250, 173, 20);
pub const ERROR: Color = Color::Rgb(245, 34, 45);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn search_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

// Same colors the web client used for its status and priority tags
pub fn status_style(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Pending => Style::default().fg(ACCENT),
        TaskStatus::InProgress => Style::default().fg(PRIMARY),
        TaskStatus::Completed => success_style(),
        TaskStatus::Canceled => muted_style(),
    }
}

pub fn priority_style(priority: TaskPriority) -> Style {
    match priority {
        TaskPriority::Critical => error_style().add_modifier(Modifier::BOLD),
        TaskPriority::High => error_style(),
        TaskPriority::Medium => highlight_style(),
        TaskPriority::Low => success_style(),
    }
}
