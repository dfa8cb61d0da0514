use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};
use tui_textarea::TextArea;

use crate::core::chat::ChatSession;
use crate::core::persona::{PersonaCatalog, PersonaSwatch};
use crate::ui::picker::PickerState;
use crate::ui::theme::{parse_hex_color, Theme};

/// Everything the renderer and the event loop share.
pub struct ChatView {
    pub session: ChatSession,
    pub theme: Theme,
    pub input: TextArea<'static>,
    pub picker: Option<PickerState>,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub exit_requested: bool,
    /// Text of the submission in flight, restored into the input on failure.
    pub in_flight_input: Option<String>,
}

impl ChatView {
    pub fn new(session: ChatSession, theme: Theme) -> Self {
        let mut view = Self {
            session,
            theme,
            input: TextArea::default(),
            picker: None,
            scroll_offset: 0,
            auto_scroll: true,
            exit_requested: false,
            in_flight_input: None,
        };
        view.reset_input(None);
        view
    }

    pub fn input_text(&self) -> String {
        self.input.lines().join("\n")
    }

    /// Replace the input with `text` (or empty it) and restyle it.
    pub fn reset_input(&mut self, text: Option<&str>) {
        let lines: Vec<String> = text
            .map(|t| t.lines().map(str::to_string).collect())
            .unwrap_or_default();
        let mut input = TextArea::new(lines);
        input.move_cursor(tui_textarea::CursorMove::Bottom);
        input.move_cursor(tui_textarea::CursorMove::End);
        self.input = input;
        self.style_input();
    }

    /// Apply border, cursor and placeholder styling for the current state.
    pub fn style_input(&mut self) {
        let enabled = self.session.input_enabled();
        let border = if enabled {
            self.persona_color()
                .map(|c| Style::default().fg(c))
                .unwrap_or(self.theme.input_border_style)
        } else {
            self.theme.input_disabled_style
        };
        let title = if enabled {
            "Message (Enter to send, Shift+Enter for newline, Ctrl+P persona, Ctrl+N new thread)"
        } else {
            "Waiting for response…"
        };
        self.input.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        );
        self.input.set_cursor_line_style(Style::default());
        let cursor = if enabled {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        self.input.set_cursor_style(cursor);
        self.input.set_placeholder_text("Type a message…");
        self.input.set_placeholder_style(self.theme.placeholder_style);
        let text_style = if enabled {
            self.theme.assistant_text_style
        } else {
            self.theme.input_disabled_style
        };
        self.input.set_style(text_style);
    }

    pub fn persona_color(&self) -> Option<Color> {
        let swatch = PersonaSwatch::for_persona(self.session.selected_persona());
        parse_hex_color(swatch.primary())
    }

    pub fn open_persona_picker(&mut self) {
        let selected = self
            .session
            .workspace()
            .ok()
            .and_then(|w| w.settings.selected_persona_id.clone());
        let catalog = PersonaCatalog::from_settings(&self.session.settings);
        self.picker = Some(PickerState::for_personas(
            &catalog.visible_in_chat(),
            selected.as_deref(),
        ));
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
    }
}
