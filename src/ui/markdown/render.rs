use super::code::{flush_code_block, language_hint_from_codeblock_kind, push_codeblock_text};
use crate::ui::theme::Theme;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

const QUOTE_PREFIX: &str = "│ ";

#[derive(Clone, Copy, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

/// Render markdown `content` into terminal lines using `base` for body text.
///
/// Pure: the same input always yields the same lines.
pub fn render_markdown(
    content: &str,
    theme: &Theme,
    base: Style,
    syntax_enabled: bool,
) -> Vec<Line<'static>> {
    MarkdownRenderer::new(content, theme, base, syntax_enabled).render()
}

/// Plain rendering used when markdown is switched off: one line per source
/// line, no markup interpretation.
pub fn render_plain(content: &str, style: Style) -> Vec<Line<'static>> {
    content
        .lines()
        .map(|l| Line::from(Span::styled(detab(l), style)))
        .collect()
}

struct MarkdownRenderer<'a> {
    content: &'a str,
    theme: &'a Theme,
    syntax_enabled: bool,
    lines: Vec<Line<'static>>,
    current_spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    list_indent_stack: Vec<usize>,
    quote_depth: usize,
    in_code_block: Option<String>,
    code_block_lines: Vec<String>,
    link_dest: Option<String>,
}

impl<'a> MarkdownRenderer<'a> {
    fn new(content: &'a str, theme: &'a Theme, base: Style, syntax_enabled: bool) -> Self {
        Self {
            content,
            theme,
            syntax_enabled,
            lines: Vec::new(),
            current_spans: Vec::new(),
            style_stack: vec![base],
            list_stack: Vec::new(),
            list_indent_stack: Vec::new(),
            quote_depth: 0,
            in_code_block: None,
            code_block_lines: Vec::new(),
            link_dest: None,
        }
    }

    fn render(mut self) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        let parser = Parser::new_ext(self.content, options);

        for event in parser {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag_end) => self.end_tag(tag_end),
                Event::Text(text) => {
                    if self.in_code_block.is_some() {
                        push_codeblock_text(&mut self.code_block_lines, &text);
                    } else {
                        let style = self.current_style();
                        self.push_span(Span::styled(detab(&text), style));
                    }
                }
                Event::Code(code) => {
                    self.push_span(Span::styled(detab(&code), self.theme.md_inline_code_style));
                }
                Event::SoftBreak => {
                    let style = self.current_style();
                    self.push_span(Span::styled(" ", style));
                }
                Event::HardBreak => self.flush_current_spans(),
                Event::Rule => {
                    self.flush_current_spans();
                    self.lines.push(Line::from(Span::styled(
                        "─".repeat(40),
                        self.theme.md_quote_style,
                    )));
                    self.push_empty_line();
                }
                Event::TaskListMarker(checked) => {
                    let marker = if checked { "[x] " } else { "[ ] " };
                    self.push_span(Span::styled(marker, self.current_style()));
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    let style = self.current_style();
                    self.push_span(Span::styled(html.trim_end().to_string(), style));
                }
                _ => {}
            }
        }

        self.flush_current_spans();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.flush_current_spans();
                let style = self.heading_style(level);
                self.style_stack.push(style);
            }
            Tag::BlockQuote(_) => {
                self.flush_current_spans();
                self.quote_depth += 1;
                let style = self.current_style().patch(self.theme.md_quote_style);
                self.style_stack.push(style);
            }
            Tag::List(start) => {
                self.flush_current_spans();
                self.list_stack.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
                self.list_indent_stack.push(0);
            }
            Tag::Item => {
                self.flush_current_spans();
                let marker = match self.list_stack.last_mut() {
                    Some(ListKind::Ordered(k)) => {
                        let cur = *k;
                        *k += 1;
                        format!("{cur}. ")
                    }
                    _ => "• ".to_string(),
                };
                if let Some(indent) = self.list_indent_stack.last_mut() {
                    *indent = marker.width();
                }
                let parent_indent: usize = self
                    .list_indent_stack
                    .iter()
                    .take(self.list_indent_stack.len().saturating_sub(1))
                    .sum();
                if parent_indent > 0 {
                    self.current_spans.push(Span::raw(" ".repeat(parent_indent)));
                }
                let style = self.current_style();
                self.current_spans.push(Span::styled(marker, style));
            }
            Tag::CodeBlock(kind) => {
                self.flush_current_spans();
                self.in_code_block = Some(language_hint_from_codeblock_kind(kind));
                self.code_block_lines.clear();
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.style_stack.push(self.theme.md_link_style);
                self.link_dest = Some(dest_url.to_string());
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Paragraph => {
                self.flush_current_spans();
                if self.list_stack.is_empty() {
                    self.push_empty_line();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_current_spans();
                self.push_empty_line();
                self.style_stack.pop();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_current_spans();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.style_stack.pop();
            }
            TagEnd::List(_) => {
                self.flush_current_spans();
                self.list_stack.pop();
                self.list_indent_stack.pop();
                if self.list_stack.is_empty() {
                    self.push_empty_line();
                }
            }
            TagEnd::Item => self.flush_current_spans(),
            TagEnd::CodeBlock => {
                let lang = self.in_code_block.take().unwrap_or_default();
                let indent = self.list_indent_stack.iter().sum();
                let produced = flush_code_block(
                    &mut self.code_block_lines,
                    self.syntax_enabled,
                    &lang,
                    self.theme,
                    indent,
                );
                for line in produced {
                    self.push_line(line.spans);
                }
                self.push_empty_line();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.style_stack.pop();
            }
            TagEnd::Link | TagEnd::Image => {
                self.style_stack.pop();
                if let Some(dest) = self.link_dest.take() {
                    let shown = self
                        .current_spans
                        .last()
                        .is_some_and(|s| s.content.as_ref() == dest);
                    if !shown && !dest.is_empty() {
                        let style = self.current_style().add_modifier(Modifier::DIM);
                        self.push_span(Span::styled(format!(" ({dest})"), style));
                    }
                }
            }
            _ => {}
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.current_style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    fn heading_style(&self, level: HeadingLevel) -> Style {
        let style = self.current_style().patch(self.theme.md_heading_style);
        match level {
            HeadingLevel::H1 => style.add_modifier(Modifier::UNDERLINED),
            _ => style,
        }
    }

    fn push_span(&mut self, span: Span<'static>) {
        if self.current_spans.is_empty() && !self.list_stack.is_empty() {
            // continuation text inside a list item aligns with the item body
            let indent: usize = self.list_indent_stack.iter().sum();
            if indent > 0 {
                self.current_spans.push(Span::raw(" ".repeat(indent)));
            }
        }
        self.current_spans.push(span);
    }

    fn flush_current_spans(&mut self) {
        if self.current_spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current_spans);
        self.push_line(spans);
    }

    fn push_line(&mut self, mut spans: Vec<Span<'static>>) {
        if self.quote_depth > 0 {
            spans.insert(
                0,
                Span::styled(QUOTE_PREFIX.repeat(self.quote_depth), self.theme.md_quote_style),
            );
        }
        self.lines.push(Line::from(spans));
    }

    fn push_empty_line(&mut self) {
        if self.lines.last().is_some_and(|l| l.width() == 0) || self.lines.is_empty() {
            return;
        }
        self.lines.push(Line::default());
    }
}

pub(super) fn detab(s: &str) -> String {
    s.replace('\t', "    ")
}
