use crate::ui::theme::Theme;
use ratatui::style::{Color as TuiColor, Style};
use ratatui::text::{Line, Span};
use std::sync::OnceLock;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

fn is_dark_background(c: &TuiColor) -> bool {
    match c {
        TuiColor::Rgb(r, g, b) => {
            let br = 0.2126 * (*r as f32) + 0.7152 * (*g as f32) + 0.0722 * (*b as f32);
            br < 128.0
        }
        TuiColor::White => false,
        _ => true,
    }
}

fn normalize_lang_hint(s: &str) -> String {
    let t = s.trim().to_ascii_lowercase();
    match t.as_str() {
        "py" | "python" => "python".into(),
        "bash" | "sh" | "zsh" | "shell" => "bash".into(),
        "js" | "javascript" | "jsx" => "javascript".into(),
        "ts" | "tsx" | "typescript" => "typescript".into(),
        "yaml" | "yml" => "yaml".into(),
        "rust" | "rs" => "rust".into(),
        "c" | "h" => "c".into(),
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "c++" => "cpp".into(),
        "kotlin" | "kt" => "kotlin".into(),
        other => other.into(),
    }
}

fn find_syntax(lang_hint: &str) -> Option<&'static SyntaxReference> {
    let lang = normalize_lang_hint(lang_hint);
    if lang.is_empty() {
        return None;
    }
    syntax_set().find_syntax_by_token(&lang)
}

/// Whether a fenced block tagged `lang_hint` gets syntax highlighting.
pub fn is_recognized_language(lang_hint: &str) -> bool {
    find_syntax(lang_hint).is_some()
}

pub(crate) fn pick_syntect_theme_name_for_theme(theme: &Theme) -> &'static str {
    if is_dark_background(&theme.background_color) {
        "base16-ocean.dark"
    } else {
        "InspiredGitHub"
    }
}

/// Highlight `code` as `lang_hint`. Returns `None` for languages the
/// highlighter does not know, so callers can fall back to plain code.
pub fn highlight_code_block(
    lang_hint: &str,
    code: &str,
    theme: &Theme,
) -> Option<Vec<Line<'static>>> {
    let syntax = find_syntax(lang_hint)?;
    let ts = theme_set();
    let theme_name = pick_syntect_theme_name_for_theme(theme);
    let syn_theme = ts
        .themes
        .get(theme_name)
        .or_else(|| ts.themes.get("base16-ocean.dark"))?;

    let mut h = syntect::easy::HighlightLines::new(syntax, syn_theme);
    let bg = theme.md_codeblock_bg;

    let mut out: Vec<Line<'static>> = Vec::new();
    for line in syntect::util::LinesWithEndings::from(code) {
        let ranges = h.highlight_line(line, syntax_set()).ok()?;
        let mut spans: Vec<Span<'static>> = Vec::new();
        for (style, text) in ranges {
            let frag = text.strip_suffix('\n').unwrap_or(text);
            let frag = frag.strip_suffix('\r').unwrap_or(frag);
            if frag.is_empty() {
                continue;
            }
            let fg = style.foreground;
            let mut st = Style::default().fg(TuiColor::Rgb(fg.r, fg.g, fg.b));
            if let Some(bgcol) = bg {
                st = st.bg(bgcol);
            }
            spans.push(Span::styled(frag.to_string(), st));
        }
        out.push(Line::from(spans));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn normalize_lang_hint_maps_common_aliases() {
        assert_eq!(normalize_lang_hint("py"), "python");
        assert_eq!(normalize_lang_hint("JS"), "javascript");
        assert_eq!(normalize_lang_hint("yml"), "yaml");
        assert_eq!(normalize_lang_hint("hpp"), "cpp");
        assert_eq!(normalize_lang_hint("rs"), "rust");
    }

    #[test]
    fn known_and_unknown_languages() {
        assert!(is_recognized_language("rust"));
        assert!(is_recognized_language("py"));
        assert!(!is_recognized_language(""));
        assert!(!is_recognized_language("definitely-not-a-language"));
    }

    #[test]
    fn unknown_language_is_not_highlighted() {
        let theme = Theme::dark_default();
        assert!(highlight_code_block("nonsense-lang", "x = 1", &theme).is_none());
    }

    #[test]
    fn highlighted_block_keeps_one_line_per_source_line() {
        let theme = Theme::dark_default();
        let code = "fn main() {\n    println!(\"hi\");\n}\n";
        let lines = highlight_code_block("rust", code, &theme).unwrap();
        assert_eq!(lines.len(), 3);
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(first, "fn main() {");
        assert!(lines[0]
            .spans
            .iter()
            .all(|s| s.style.bg == theme.md_codeblock_bg));
    }

    #[test]
    fn theme_selection_matches_brightness() {
        let dark = Theme::dark_default();
        let light = Theme::light();
        assert_eq!(pick_syntect_theme_name_for_theme(&dark), "base16-ocean.dark");
        assert_eq!(pick_syntect_theme_name_for_theme(&light), "InspiredGitHub");
        assert!(is_dark_background(&Color::Black));
        assert!(!is_dark_background(&Color::Rgb(240, 240, 240)));
    }
}
