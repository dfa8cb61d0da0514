mod code;
mod render;


pub use render::{render_markdown, render_plain};

use crate::core::config::SystemPersona;
use crate::core::message::{Message, Role};
use crate::core::persona::{avatar_initials, PersonaSwatch};
use crate::ui::theme::{parse_hex_color, Theme};
use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

pub const USER_LABEL: &str = "You";

#[derive(Clone, Copy, Debug)]
pub struct MessageRenderConfig {
    pub markdown: bool,
    pub syntax_highlighting: bool,
}

impl MessageRenderConfig {
    pub fn markdown(markdown_enabled: bool, syntax_highlighting: bool) -> Self {
        Self {
            markdown: markdown_enabled,
            syntax_highlighting: markdown_enabled && syntax_highlighting,
        }
    }
}

/// Side, label and body style for one message, decided by its role.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageLayout {
    pub alignment: Alignment,
    pub label: Option<String>,
    pub label_style: Style,
    pub body_style: Style,
}

pub fn layout_for(role: Role, persona: Option<&SystemPersona>, theme: &Theme) -> MessageLayout {
    match role {
        Role::User => MessageLayout {
            alignment: Alignment::Right,
            label: Some(USER_LABEL.to_string()),
            label_style: theme.user_label_style,
            body_style: theme.user_text_style,
        },
        Role::Assistant => {
            let swatch = PersonaSwatch::for_persona(persona);
            let mut label_style = Style::default().add_modifier(Modifier::BOLD);
            if let Some(color) = parse_hex_color(swatch.primary()) {
                label_style = label_style.fg(color);
            }
            MessageLayout {
                alignment: Alignment::Left,
                label: Some(avatar_initials(persona)),
                label_style,
                body_style: theme.assistant_text_style,
            }
        }
        Role::System => MessageLayout {
            alignment: Alignment::Left,
            label: None,
            label_style: theme.system_text_style,
            body_style: theme.system_text_style,
        },
    }
}

/// Lines for a whole message: its label line (if any) followed by the body,
/// every line carrying the role's alignment.
pub fn render_message(
    msg: &Message,
    persona: Option<&SystemPersona>,
    theme: &Theme,
    config: MessageRenderConfig,
) -> Vec<Line<'static>> {
    let layout = layout_for(msg.role, persona, theme);
    let mut lines = Vec::new();
    if let Some(label) = layout.label {
        lines.push(Line::from(Span::styled(label, layout.label_style)));
    }
    let body = if config.markdown {
        render_markdown(
            &msg.content,
            theme,
            layout.body_style,
            config.syntax_highlighting,
        )
    } else {
        render_plain(&msg.content, layout.body_style)
    };
    lines.extend(body);
    lines
        .into_iter()
        .map(|line| line.alignment(layout.alignment))
        .collect()
}
