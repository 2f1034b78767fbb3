//! Keyboard input handling for the TUI.
//!
//! Keys are translated into `App` calls; anything that talks to the
//! backend is spawned by `App` itself, so handling never blocks the loop.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use civicdesk_core::routes::Route;

use crate::app::{
    can_add_password_char, can_add_username_char, App, AppState, LoginFocus, Screen,
    PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    match app.screen {
        Screen::Login => return handle_login_input(app, key),
        Screen::Loading => {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                app.state = AppState::ConfirmingQuit;
            }
            return Ok(false);
        }
        Screen::Page(_) | Screen::NotFound => {}
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::ShowingComments) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            app.close_comments();
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::ConfirmingDelete) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        return handle_search_input(app, key);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char(c @ '1'..='8') => {
            let index = c as usize - '1' as usize;
            if let Some(route) = Route::from_index(index) {
                app.navigate(route);
            }
            return Ok(false);
        }
        KeyCode::Left => {
            app.prev_page();
            return Ok(false);
        }
        KeyCode::Right => {
            app.next_page();
            return Ok(false);
        }
        KeyCode::Char('r') => {
            app.refresh();
            return Ok(false);
        }
        KeyCode::Char('L') => {
            app.logout();
            return Ok(false);
        }
        _ => {}
    }

    if app.current_route() == Some(Route::Tasks) {
        handle_tasks_input(app, key);
    }

    Ok(false)
}

fn handle_tasks_input(app: &mut App, key: KeyEvent) {
    let page = PAGE_SCROLL_SIZE as isize;
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_task_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_task_selection(1),
        KeyCode::PageUp => app.move_task_selection(-page),
        KeyCode::PageDown => app.move_task_selection(page),
        KeyCode::Home => app.task_selection = 0,
        KeyCode::End => {
            app.task_selection = app.visible_tasks().len().saturating_sub(1);
        }
        KeyCode::Char('f') => app.cycle_status_filter(),
        KeyCode::Char('/') => app.state = AppState::Searching,
        KeyCode::Char('s') => app.advance_selected_task(),
        KeyCode::Char('x') => app.request_delete(),
        KeyCode::Enter => app.open_comments(),
        KeyCode::Esc => {
            if !app.search_query.is_empty() {
                app.set_search_query(String::new());
            }
        }
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.set_search_query(String::new());
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            // Keep search query active
        }
        KeyCode::Backspace => {
            let mut query = app.search_query.clone();
            query.pop();
            app.set_search_query(query);
        }
        KeyCode::Char(c) => {
            let query = format!("{}{}", app.search_query, c);
            app.set_search_query(query);
        }
        _ => {}
    }
    Ok(false)
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.submit_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}
