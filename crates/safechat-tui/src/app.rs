use std::sync::Arc;
use std::time::Duration;

use ratatui::widgets::ListState;
use safechat_core::{Config, ContextWindowBuilder, LlmClient, PendingState, Turn, TurnController};
use tracing::info;

use crate::profile::{ProfileTarget, PROFILE_OPTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Chat,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Everything needed to start a fresh conversation
struct ChatSettings {
    client: Arc<dyn LlmClient>,
    builder: ContextWindowBuilder,
    fallback_message: String,
    request_timeout: Option<Duration>,
}

impl ChatSettings {
    fn controller(&self) -> TurnController {
        TurnController::new(Arc::clone(&self.client), self.builder.clone())
            .with_fallback_message(self.fallback_message.clone())
            .with_request_timeout(self.request_timeout)
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub tab: Tab,
    pub input_mode: InputMode,

    // Chat state
    pub chat: TurnController,
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars
    pub chat_scroll: u16,
    pub chat_height: u16,      // inner height of the chat area, set during render
    pub chat_total_lines: u16, // wrapped line count of the transcript, set during render
    pub follow_bottom: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Profile state
    pub profile_state: ListState,
    pub status: Option<String>,

    settings: ChatSettings,
}

impl App {
    pub fn new(config: &Config, client: Arc<dyn LlmClient>) -> Self {
        let settings = ChatSettings {
            client,
            builder: config.context_builder(),
            fallback_message: config.fallback_message().to_string(),
            request_timeout: config.request_timeout(),
        };

        let mut profile_state = ListState::default();
        profile_state.select(Some(0));

        Self {
            should_quit: false,
            tab: Tab::Chat,
            input_mode: InputMode::Editing,

            chat: settings.controller(),
            input: String::new(),
            cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_total_lines: 0,
            follow_bottom: true,

            animation_frame: 0,

            profile_state,
            status: None,

            settings,
        }
    }

    pub fn transcript(&self) -> &[Turn] {
        self.chat.transcript()
    }

    pub fn is_awaiting(&self) -> bool {
        self.chat.state() == PendingState::AwaitingResponse
    }

    /// Send the input buffer. The buffer is only cleared if the controller took it.
    pub fn submit_input(&mut self) {
        if self.chat.submit(&self.input) {
            self.input.clear();
            self.cursor = 0;
            self.follow_bottom = true;
            self.status = None;
        }
    }

    /// Record the reply if the pending request has finished.
    pub async fn poll_reply(&mut self) {
        if self.chat.poll_response().await.is_some() {
            self.follow_bottom = true;
            self.animation_frame = 0;
        }
    }

    /// Drop the current transcript. A reply still in flight is discarded when it lands.
    pub fn new_conversation(&mut self) {
        info!(turns = self.chat.transcript().len(), "starting new conversation");
        self.chat = self.settings.controller();
        self.chat_scroll = 0;
        self.chat_total_lines = 0;
        self.follow_bottom = true;
        self.animation_frame = 0;
        self.status = Some("Started a new conversation".to_string());
    }

    pub fn switch_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Chat => Tab::Profile,
            Tab::Profile => Tab::Chat,
        };
        self.input_mode = match self.tab {
            Tab::Chat => InputMode::Editing,
            Tab::Profile => InputMode::Normal,
        };
        self.status = None;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_awaiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Input editing
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    // Chat scrolling
    pub fn max_chat_scroll(&self) -> u16 {
        self.chat_total_lines.saturating_sub(self.chat_height)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_bottom = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max_scroll = self.max_chat_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
        self.follow_bottom = self.chat_scroll >= max_scroll;
    }

    pub fn page_size(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }

    // Profile menu
    pub fn profile_nav_down(&mut self) {
        let len = PROFILE_OPTIONS.len();
        let i = self.profile_state.selected().unwrap_or(0);
        self.profile_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn profile_nav_up(&mut self) {
        let i = self.profile_state.selected().unwrap_or(0);
        self.profile_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_profile_option(&mut self) {
        let Some(option) = self
            .profile_state
            .selected()
            .and_then(|i| PROFILE_OPTIONS.get(i))
        else {
            return;
        };

        match option.target {
            ProfileTarget::Logout => self.should_quit = true,
            _ => {
                self.status = Some(format!(
                    "{} is not available in the terminal client",
                    option.title
                ));
            }
        }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
