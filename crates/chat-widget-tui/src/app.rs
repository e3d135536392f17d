use chat_widget_core::ChatController;
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Shortcuts,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: FocusPane,
    pub controller: ChatController,
    pub endpoint: String,

    // Shortcut bubbles
    pub selected_shortcut: usize,

    // Chat log viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of chat area for scroll calculations
    pub chat_width: u16,  // Inner width of chat area for wrap calculations
    pub follow_latest: bool,

    // Typing indicator animation (0-2)
    pub animation_frame: u8,

    // Layout areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub send_area: Option<Rect>,
    pub shortcut_areas: Vec<Rect>,
}

impl App {
    pub fn new(controller: ChatController, endpoint: String) -> Self {
        Self {
            should_quit: false,
            focus: FocusPane::Input,
            controller,
            endpoint,

            selected_shortcut: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            follow_latest: true,

            animation_frame: 0,

            chat_area: None,
            send_area: None,
            shortcut_areas: Vec::new(),
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.controller.is_awaiting_reply() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Pick up the log's scroll request so the newest entry stays visible
    pub fn sync_scroll(&mut self) {
        if self.controller.log_mut().take_scroll_request() {
            self.follow_latest = true;
            self.scroll_to_bottom();
        }
    }

    /// Number of rendered lines the chat log occupies at the current width,
    /// measured on the same wrapped paragraph the chat pane draws
    pub fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };

        let lines = crate::ui::chat_paragraph(self).line_count(wrap_width);
        u16::try_from(lines).unwrap_or(u16::MAX)
    }

    fn max_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.total_chat_lines().saturating_sub(visible_height)
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_latest = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
        self.follow_latest = self.chat_scroll == self.max_scroll();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Input => FocusPane::Shortcuts,
            FocusPane::Shortcuts => FocusPane::Input,
        };
        if self.controller.shortcuts().is_empty() {
            self.focus = FocusPane::Input;
        }
    }

    pub fn shortcut_next(&mut self) {
        let count = self.controller.shortcuts().len();
        if count > 0 {
            self.selected_shortcut = (self.selected_shortcut + 1) % count;
        }
    }

    pub fn shortcut_prev(&mut self) {
        let count = self.controller.shortcuts().len();
        if count > 0 {
            self.selected_shortcut = (self.selected_shortcut + count - 1) % count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::app_with_reply;
    use chat_widget_core::Origin;

    #[tokio::test]
    async fn line_count_follows_word_wrapping() {
        let (mut app, _rx) = app_with_reply("unused");
        app.chat_width = 10;

        // 20 characters, but three words that each need their own row
        app.controller.append_message("aaaaaa bbbbbb cccccc", Origin::User);
        assert_eq!(app.total_chat_lines(), 1 + 3 + 1);

        app.controller.append_message("a\n\nb", Origin::Assistant);
        assert_eq!(app.total_chat_lines(), 5 + 1 + 3 + 1);

        let handle = app.controller.show_pending_indicator();
        assert_eq!(app.total_chat_lines(), 10 + 2);
        app.controller.log_mut().remove_pending(handle);
    }

    #[tokio::test]
    async fn line_count_uses_display_width() {
        let (mut app, _rx) = app_with_reply("unused");
        app.chat_width = 10;

        // Six characters, twelve cells
        app.controller.append_message("漢漢漢漢漢漢", Origin::Assistant);
        assert_eq!(app.total_chat_lines(), 1 + 2 + 1);
    }

    #[tokio::test]
    async fn append_brings_view_back_to_bottom() {
        let (mut app, _rx) = app_with_reply("unused");
        app.chat_width = 40;
        app.chat_height = 4;
        for i in 0..5 {
            app.controller.append_message(format!("message {}", i), Origin::User);
        }
        app.sync_scroll();
        let bottom = app.chat_scroll;
        assert_eq!(bottom, 15 - 4);

        app.scroll_up(5);
        assert!(!app.follow_latest);
        app.sync_scroll();
        assert_eq!(app.chat_scroll, bottom - 5);

        app.controller.append_message("newest", Origin::Assistant);
        app.sync_scroll();
        assert!(app.follow_latest);
        assert_eq!(app.chat_scroll, 18 - 4);
    }

    #[tokio::test]
    async fn shortcut_selection_wraps() {
        let (mut app, _rx) = app_with_reply("unused");
        let count = app.controller.shortcuts().len();
        app.shortcut_prev();
        assert_eq!(app.selected_shortcut, count - 1);
        app.shortcut_next();
        assert_eq!(app.selected_shortcut, 0);
    }
}
