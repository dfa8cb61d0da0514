use super::render::detab;
use crate::ui::theme::Theme;
use crate::utils::syntax::highlight_code_block;
use pulldown_cmark::CodeBlockKind;
use ratatui::text::{Line, Span};

pub(super) fn language_hint_from_codeblock_kind(kind: CodeBlockKind) -> String {
    match kind {
        CodeBlockKind::Indented => String::new(),
        CodeBlockKind::Fenced(info) => info.split_ascii_whitespace().next().unwrap_or("").into(),
    }
}

pub(super) fn push_codeblock_text(code_block_lines: &mut Vec<String>, text: &str) {
    for l in text.lines() {
        code_block_lines.push(detab(l));
    }
}

fn plain_codeblock_lines(code_block_lines: &[String], theme: &Theme) -> Vec<Line<'static>> {
    let style = theme.code_block_style();
    code_block_lines
        .iter()
        .map(|line| Line::from(vec![Span::styled(line.clone(), style)]))
        .collect()
}

/// Turn the buffered code block into lines, highlighted when the language is
/// recognised and highlighting is on, and drain the buffer.
pub(super) fn flush_code_block(
    code_block_lines: &mut Vec<String>,
    syntax_enabled: bool,
    language_hint: &str,
    theme: &Theme,
    indent: usize,
) -> Vec<Line<'static>> {
    if code_block_lines.is_empty() {
        return Vec::new();
    }

    let highlighted = if syntax_enabled {
        let joined = code_block_lines.join("\n");
        highlight_code_block(language_hint, &joined, theme)
    } else {
        None
    };
    let mut produced = highlighted.unwrap_or_else(|| plain_codeblock_lines(code_block_lines, theme));
    code_block_lines.clear();

    if indent > 0 {
        for line in &mut produced {
            line.spans.insert(0, Span::raw(" ".repeat(indent)));
        }
    }
    produced
}
