use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::chat::{ChatState, NoticeKind};
use crate::core::constants::APP_TITLE;
use crate::core::message::Message;
use crate::ui::markdown::{render_message, MessageRenderConfig};
use crate::ui::picker::PickerState;
use crate::ui::theme::{parse_hex_color, Theme};
use crate::ui::view::ChatView;

pub const EMPTY_THREAD_PLACEHOLDER: &str = "Start a new conversation";
pub const RAG_BADGE: &str = " RAG ";
const MAX_INPUT_LINES: u16 = 6;

pub fn ui(f: &mut Frame, view: &mut ChatView) {
    let area = f.area();
    let input_lines = (view.input.lines().len() as u16).clamp(1, MAX_INPUT_LINES);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(input_lines + 2), // +2 for borders
        ])
        .split(area);

    f.render_widget(
        Block::default().style(Style::default().bg(view.theme.background_color)),
        area,
    );
    f.render_widget(Paragraph::new(header_line(view)), chunks[0]);
    render_transcript(f, view, chunks[1]);
    f.render_widget(Paragraph::new(status_line(view)), chunks[2]);
    f.render_widget(&view.input, chunks[3]);

    if let Some(picker) = view.picker.as_ref() {
        render_picker(f, picker, &view.theme, area);
    }
}

fn header_line(view: &ChatView) -> Line<'static> {
    let theme = &view.theme;
    let session = &view.session;
    let workspace = session
        .workspace()
        .map(|w| w.name.clone())
        .unwrap_or_default();

    let mut spans = vec![
        Span::styled(
            format!("{APP_TITLE} "),
            theme.title_style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("· {} / {} · {} ", workspace, session.thread_name(), session.model()),
            theme.title_style,
        ),
    ];

    let persona = session.selected_persona();
    let dot_style = view
        .persona_color()
        .map(|c| Style::default().fg(c))
        .unwrap_or(theme.title_style);
    spans.push(Span::styled("● ", dot_style));
    spans.push(Span::styled(
        persona
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Default Persona".to_string()),
        theme.title_style,
    ));

    if session.has_knowledge_in_context() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(RAG_BADGE, theme.badge_style));
    }
    Line::from(spans)
}

fn status_line(view: &mut ChatView) -> Line<'static> {
    let theme = view.theme.clone();
    if let Some(notice) = view.session.active_notice(Instant::now()) {
        let style = match notice.kind {
            NoticeKind::Info => theme.notice_info_style,
            NoticeKind::Error => theme.notice_error_style,
        };
        return Line::from(Span::styled(notice.text.clone(), style));
    }
    match view.session.state() {
        ChatState::Submitting => Line::from(Span::styled(
            "● Thinking…",
            theme.submitting_indicator_style,
        )),
        ChatState::Idle | ChatState::Error(_) => Line::default(),
    }
}

/// Lines for the whole transcript, with a blank line between messages.
pub fn transcript_lines(view: &ChatView) -> Vec<Line<'static>> {
    let session = &view.session;
    let theme = &view.theme;
    let config = MessageRenderConfig::markdown(
        session.settings.markdown_enabled(),
        session.settings.syntax_enabled(),
    );
    let persona = session.selected_persona();

    let mut lines = Vec::new();
    if session.settings.show_system_prompt() {
        let prompt = Message::system(session.current().thread_id.clone(), session.system_prompt());
        lines.extend(render_message(&prompt, None, theme, config));
        lines.push(Line::default());
    }
    for msg in session.messages() {
        lines.extend(render_message(msg, persona, theme, config));
        lines.push(Line::default());
    }
    lines.pop();
    lines
}

/// Rows `lines` occupy once wrapped to `width` columns.
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| {
            let w: usize = line.spans.iter().map(|s| s.content.width()).sum();
            w.div_ceil(width).max(1)
        })
        .sum();
    rows.min(usize::from(u16::MAX)) as u16
}

fn render_transcript(f: &mut Frame, view: &mut ChatView, area: Rect) {
    if view.session.messages().is_empty() && !view.session.settings.show_system_prompt() {
        let top = area.height / 2;
        let placeholder = Paragraph::new(Line::from(Span::styled(
            EMPTY_THREAD_PLACEHOLDER,
            view.theme.placeholder_style,
        )))
        .alignment(Alignment::Center);
        let centered = Rect {
            y: area.y + top,
            height: 1.min(area.height),
            ..area
        };
        f.render_widget(placeholder, centered);
        return;
    }

    let lines = transcript_lines(view);
    let total = wrapped_height(&lines, area.width);
    let max_offset = total.saturating_sub(area.height);
    if view.auto_scroll || view.scroll_offset >= max_offset {
        view.auto_scroll = true;
        view.scroll_offset = max_offset;
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((view.scroll_offset, 0));
    f.render_widget(paragraph, area);
}

fn render_picker(f: &mut Frame, picker: &PickerState, theme: &Theme, area: Rect) {
    let height = (picker.items.len() as u16 + 2).min(area.height);
    let width = 48.min(area.width);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };

    let items: Vec<ListItem> = picker
        .items
        .iter()
        .map(|item| {
            let dot = parse_hex_color(&item.color)
                .map(|c| Style::default().fg(c))
                .unwrap_or_default();
            let mut spans = vec![
                Span::styled("● ", dot),
                Span::styled(item.label.clone(), theme.assistant_text_style),
            ];
            if !item.description.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", item.description),
                    theme.placeholder_style,
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(picker.title.clone())
                .style(Style::default().bg(theme.background_color)),
        )
        .highlight_style(theme.picker_highlight_style);
    let mut state = ListState::default();
    state.select(Some(picker.selected));

    f.render_widget(Clear, rect);
    f.render_stateful_widget(list, rect, &mut state);
}
