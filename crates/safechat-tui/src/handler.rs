use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode, Tab};
use crate::tui::AppEvent;

const MOUSE_SCROLL_LINES: u16 = 3;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
    app.poll_reply().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('n') => {
                app.new_conversation();
                return;
            }
            _ => {}
        }
    }
    if key.code == KeyCode::Tab {
        app.switch_tab();
        return;
    }

    match (app.tab, app.input_mode) {
        (Tab::Chat, InputMode::Editing) => handle_chat_editing(app, key),
        (Tab::Chat, InputMode::Normal) => handle_chat_normal(app, key),
        (Tab::Profile, _) => handle_profile(app, key),
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown | KeyCode::Char('d') => app.scroll_down(app.page_size()),
        KeyCode::PageUp | KeyCode::Char('u') => app.scroll_up(app.page_size()),
        KeyCode::Char('G') | KeyCode::End => app.scroll_down(u16::MAX),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_up(u16::MAX),
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => app.delete_before_cursor(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::PageDown => app.scroll_down(app.page_size()),
        KeyCode::PageUp => app.scroll_up(app.page_size()),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

fn handle_profile(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.profile_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.profile_nav_up(),
        KeyCode::Enter => app.select_profile_option(),
        KeyCode::Esc => app.switch_tab(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.tab != Tab::Chat {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(MOUSE_SCROLL_LINES),
        MouseEventKind::ScrollUp => app.scroll_up(MOUSE_SCROLL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, press(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_typing_and_enter_submits() {
        let mut app = test_app();
        type_text(&mut app, "hi").await;
        assert_eq!(app.input, "hi");

        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert!(app.input.is_empty());
        assert_eq!(app.transcript()[0].text(), "hi");
    }

    #[tokio::test]
    async fn test_q_is_text_while_editing() {
        let mut app = test_app();
        type_text(&mut app, "q").await;
        assert_eq!(app.input, "q");
        assert!(!app.should_quit);

        handle_event(&mut app, press(KeyCode::Esc)).await.unwrap();
        handle_event(&mut app, press(KeyCode::Char('q'))).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_any_tab() {
        let mut app = test_app();
        handle_event(&mut app, press(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.tab, Tab::Profile);

        handle_event(&mut app, ctrl('c')).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_ctrl_n_resets_conversation() {
        let mut app = test_app();
        type_text(&mut app, "report").await;
        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();

        handle_event(&mut app, ctrl('n')).await.unwrap();
        assert!(app.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_profile_keys() {
        let mut app = test_app();
        handle_event(&mut app, press(KeyCode::Tab)).await.unwrap();
        handle_event(&mut app, press(KeyCode::Char('j'))).await.unwrap();
        assert_eq!(app.profile_state.selected(), Some(1));

        handle_event(&mut app, press(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.tab, Tab::Chat);
        assert_eq!(app.input_mode, InputMode::Editing);
    }
}
