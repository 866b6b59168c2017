use std::collections::VecDeque;

use thiepcuoi_core::{ChatEvent, ExchangeController, ExchangeSnapshot, Notification};
use tracing::debug;

use crate::ui::LayoutMode;

/// Ticks (300ms each) a toast stays on screen
const TOAST_TICKS: u16 = 15;

#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub remaining_ticks: u16,
}

pub struct App {
    pub should_quit: bool,
    pub layout: LayoutMode,
    pub controller: ExchangeController,

    // Last known conversation state, refreshed on every chat event
    pub snapshot: ExchangeSnapshot,

    // Input cursor (character index into snapshot.pending_input)
    pub input_cursor: usize,

    // Transcript scrolling
    pub scroll: u16,
    pub max_scroll: u16,
    pub follow_bottom: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for typing dots

    pub toasts: VecDeque<Toast>,
}

impl App {
    pub fn new(controller: ExchangeController, layout: LayoutMode) -> Self {
        let snapshot = controller.snapshot();
        Self {
            should_quit: false,
            layout,
            controller,
            snapshot,
            input_cursor: 0,
            scroll: 0,
            max_scroll: 0,
            follow_bottom: true,
            animation_frame: 0,
            toasts: VecDeque::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.controller.config().model
    }

    pub fn busy(&self) -> bool {
        self.snapshot.busy
    }

    pub fn input(&self) -> &str {
        &self.snapshot.pending_input
    }

    /// Re-read controller state and keep the cursor inside the input.
    pub fn refresh(&mut self) {
        self.snapshot = self.controller.snapshot();
        let char_count = self.snapshot.pending_input.chars().count();
        self.input_cursor = self.input_cursor.min(char_count);
    }

    pub fn on_chat_event(&mut self, event: Option<ChatEvent>) {
        match event {
            Some(ChatEvent::Appended(_)) | Some(ChatEvent::Reset) | None => {
                self.follow_bottom = true;
            }
            Some(ChatEvent::BusyChanged(busy)) => {
                if busy {
                    self.follow_bottom = true;
                }
                self.animation_frame = 0;
            }
            Some(ChatEvent::InputChanged) => {}
        }
        self.refresh();
    }

    pub fn push_toast(&mut self, notification: Notification) {
        debug!(title = %notification.title, "showing toast");
        self.toasts.push_back(Toast {
            notification,
            remaining_ticks: TOAST_TICKS,
        });
    }

    pub fn dismiss_toast(&mut self) -> bool {
        self.toasts.pop_front().is_some()
    }

    pub fn current_toast(&self) -> Option<&Toast> {
        self.toasts.front()
    }

    /// Tick animation frame and age the visible toast (called by Tick event)
    pub fn tick(&mut self) {
        if self.snapshot.busy {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if let Some(toast) = self.toasts.front_mut() {
            toast.remaining_ticks = toast.remaining_ticks.saturating_sub(1);
            if toast.remaining_ticks == 0 {
                self.toasts.pop_front();
            }
        }
    }

    /// Start an exchange with the current input. Rejections (blank input,
    /// missing key) are reported by the controller itself.
    pub fn submit(&mut self) {
        if self.snapshot.busy {
            return;
        }
        let text = self.controller.pending_input();
        if let Ok(pending) = self.controller.begin(text) {
            tokio::spawn(async move {
                let outcome = pending.resolve().await;
                debug!(?outcome, "exchange settled");
            });
            self.input_cursor = 0;
            self.follow_bottom = true;
        }
        self.refresh();
    }

    pub fn clear_transcript(&mut self) {
        self.controller.clear();
        self.scroll = 0;
        self.follow_bottom = true;
        self.refresh();
    }

    // Input editing, cursor is a character index

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.input_cursor;
        self.controller.update_input(|input| {
            let byte_pos = char_to_byte_index(input, cursor);
            input.insert(byte_pos, c);
        });
        self.input_cursor += 1;
        self.refresh();
    }

    pub fn delete_before_cursor(&mut self) {
        if self.input_cursor == 0 {
            return;
        }
        self.input_cursor -= 1;
        let cursor = self.input_cursor;
        self.controller.update_input(|input| {
            let byte_pos = char_to_byte_index(input, cursor);
            if byte_pos < input.len() {
                input.remove(byte_pos);
            }
        });
        self.refresh();
    }

    pub fn delete_at_cursor(&mut self) {
        let cursor = self.input_cursor;
        self.controller.update_input(|input| {
            let byte_pos = char_to_byte_index(input, cursor);
            if byte_pos < input.len() {
                input.remove(byte_pos);
            }
        });
        self.refresh();
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input().chars().count();
        self.input_cursor = (self.input_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.input().chars().count();
    }

    // Transcript scrolling

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow_bottom = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll);
        if self.scroll >= self.max_scroll {
            self.follow_bottom = true;
        }
    }

    /// Called by the renderer once it knows how tall the transcript is.
    pub fn set_scroll_bounds(&mut self, total_lines: u16, visible_height: u16) {
        self.max_scroll = total_lines.saturating_sub(visible_height);
        if self.follow_bottom {
            self.scroll = self.max_scroll;
        } else {
            self.scroll = self.scroll.min(self.max_scroll);
        }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
