//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use safeguard_core::auth::credentials::{can_add_password_char, can_add_username_char};
use safeguard_core::{Route, Screen, UserDecision};

use crate::app::{App, AppState, PAGE_SCROLL_SIZE};
use crate::form::LoginFocus;

/// Longest filter text accepted
const MAX_FILTER_LENGTH: usize = 60;

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Confirmations sit above every screen, including login
    if matches!(app.state, AppState::Confirming) {
        handle_confirm_input(app, key);
        return app.state == AppState::Quitting;
    }

    match app.route() {
        Route::Loading => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                app.state = AppState::Quitting;
                return true;
            }
            return false;
        }
        Route::Login => return handle_login_input(app, key),
        Route::Tab(_) | Route::StationDetail { .. } => {}
    }

    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return false;
        }
        AppState::Editing => {
            handle_form_input(app, key);
            return false;
        }
        AppState::Filtering => {
            handle_filter_input(app, key);
            return false;
        }
        AppState::Quitting => return true,
        AppState::Normal | AppState::Confirming => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.request_quit();
            return false;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return false;
        }
        KeyCode::Char(c @ '1'..='8') => {
            if let Some(screen) = c.to_digit(10).and_then(|n| Screen::from_number(n as usize)) {
                app.switch_screen(screen);
            }
            return false;
        }
        KeyCode::Left => {
            if let Some(screen) = app.current_screen() {
                app.switch_screen(screen.prev());
            }
            return false;
        }
        KeyCode::Right => {
            if let Some(screen) = app.current_screen() {
                app.switch_screen(screen.next());
            }
            return false;
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.move_selection(isize::MIN / 2),
        KeyCode::End => app.move_selection(isize::MAX / 2),
        KeyCode::Char('u') | KeyCode::F(5) => app.refresh_current(),
        KeyCode::Esc => {
            app.go_back();
        }
        _ => handle_screen_input(app, key),
    }
    false
}

fn handle_screen_input(app: &mut App, key: KeyEvent) {
    match app.route() {
        Route::Tab(Screen::Map) => match key.code {
            KeyCode::Enter => app.open_station_detail(),
            KeyCode::Char('/') => app.state = AppState::Filtering,
            _ => {}
        },
        Route::Tab(Screen::Alerts) => match key.code {
            KeyCode::Char('/') => app.state = AppState::Filtering,
            KeyCode::Char('f') => app.cycle_alert_level_filter(),
            _ => handle_crud_input(app, key),
        },
        Route::Tab(Screen::Sensors | Screen::Readings | Screen::Stations) => {
            handle_crud_input(app, key)
        }
        Route::Tab(Screen::Settings) => match key.code {
            KeyCode::Char('t') => app.toggle_notifications(),
            KeyCode::Char('m') => app.toggle_dark_mode(),
            KeyCode::Char('l') => app.toggle_language(),
            KeyCode::Char('r') => app.request_restore_defaults(),
            KeyCode::Char('o') => app.request_logout(),
            _ => {}
        },
        Route::Tab(Screen::Instructions) => {
            if key.code == KeyCode::Char('o') {
                app.request_logout();
            }
        }
        _ => {}
    }
}

fn handle_crud_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('n') => app.start_new(),
        KeyCode::Char('e') | KeyCode::Enter => app.start_edit(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        _ => {}
    }
}

fn handle_confirm_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.resolve_pending(UserDecision::Confirm)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.resolve_pending(UserDecision::Cancel)
        }
        _ => {}
    }
}

fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.clear_filter();
            app.state = AppState::Normal;
        }
        KeyCode::Enter => app.state = AppState::Normal,
        KeyCode::Backspace => {
            if let Some(text) = app.filter_text_mut() {
                text.pop();
            }
            app.after_filter_change();
        }
        KeyCode::Char(c) => {
            if let Some(text) = app.filter_text_mut() {
                if text.chars().count() < MAX_FILTER_LENGTH {
                    text.push(c);
                }
            }
            app.after_filter_change();
        }
        _ => {}
    }
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.cancel_form();
        return;
    }
    if key.code == KeyCode::Enter {
        app.submit_form();
        return;
    }

    let Some(form) = app.form.as_mut() else {
        app.state = AppState::Normal;
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left => form.cycle_level(false),
        KeyCode::Right => form.cycle_level(true),
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Quitting;
            return true;
        }
        KeyCode::Down | KeyCode::Tab => app.login.next_focus(),
        KeyCode::Up | KeyCode::BackTab => app.login.prev_focus(),
        KeyCode::Enter => match app.login.focus {
            LoginFocus::Username => app.login.next_focus(),
            LoginFocus::Password | LoginFocus::Button => app.submit_login(),
        },
        KeyCode::Backspace => match app.login.focus {
            LoginFocus::Username => {
                app.login.username.pop();
            }
            LoginFocus::Password => {
                app.login.password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => {
            let login = &mut app.login;
            match login.focus {
                LoginFocus::Username => {
                    if can_add_username_char(login.username.chars().count(), c) {
                        login.username.push(c);
                    }
                }
                LoginFocus::Password => {
                    if can_add_password_char(login.password.chars().count(), c) {
                        login.password.push(c);
                    }
                }
                LoginFocus::Button => {}
            }
        }
        _ => {}
    }
    false
}
