use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_label_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub system_text_style: Style,
    pub placeholder_style: Style,

    // Chrome
    pub title_style: Style,
    pub badge_style: Style,
    pub submitting_indicator_style: Style,
    pub input_border_style: Style,
    pub input_disabled_style: Style,
    pub notice_info_style: Style,
    pub notice_error_style: Style,
    pub picker_highlight_style: Style,

    // Markdown
    pub md_heading_style: Style,
    pub md_link_style: Style,
    pub md_inline_code_style: Style,
    pub md_code_style: Style,
    pub md_codeblock_bg: Option<Color>,
    pub md_quote_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Rgb(16, 16, 20),
            user_label_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_text_style: Style::default().fg(Color::White),
            system_text_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            placeholder_style: Style::default().fg(Color::DarkGray),

            title_style: Style::default().fg(Color::Gray),
            badge_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Rgb(155, 135, 245))
                .add_modifier(Modifier::BOLD),
            submitting_indicator_style: Style::default().fg(Color::Yellow),
            input_border_style: Style::default().fg(Color::Gray),
            input_disabled_style: Style::default().fg(Color::DarkGray),
            notice_info_style: Style::default().fg(Color::Green),
            notice_error_style: Style::default().fg(Color::LightRed),
            picker_highlight_style: Style::default().add_modifier(Modifier::REVERSED),

            md_heading_style: Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
            md_link_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::UNDERLINED),
            md_inline_code_style: Style::default().fg(Color::LightYellow),
            md_code_style: Style::default().fg(Color::Gray),
            md_codeblock_bg: Some(Color::Rgb(30, 30, 36)),
            md_quote_style: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::Rgb(250, 250, 250),
            user_label_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_text_style: Style::default().fg(Color::Black),
            system_text_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            placeholder_style: Style::default().fg(Color::Gray),

            title_style: Style::default().fg(Color::DarkGray),
            badge_style: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(124, 58, 237))
                .add_modifier(Modifier::BOLD),
            submitting_indicator_style: Style::default().fg(Color::Rgb(180, 83, 9)),
            input_border_style: Style::default().fg(Color::Black),
            input_disabled_style: Style::default().fg(Color::Gray),
            notice_info_style: Style::default().fg(Color::Rgb(21, 128, 61)),
            notice_error_style: Style::default().fg(Color::Red),
            picker_highlight_style: Style::default().add_modifier(Modifier::REVERSED),

            md_heading_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            md_link_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            md_inline_code_style: Style::default().fg(Color::Rgb(180, 83, 9)),
            md_code_style: Style::default().fg(Color::DarkGray),
            md_codeblock_bg: Some(Color::Rgb(236, 236, 240)),
            md_quote_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark_default(),
        }
    }

    /// Code style with the code block background applied.
    pub fn code_block_style(&self) -> Style {
        match self.md_codeblock_bg {
            Some(bg) => self.md_code_style.bg(bg),
            None => self.md_code_style,
        }
    }
}

/// Parse `#rgb` or `#rrggbb` into a terminal colour.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(parse_hex_color("#9b87f5"), Some(Color::Rgb(0x9b, 0x87, 0xf5)));
        assert_eq!(parse_hex_color("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex_color(" #D946EF "), Some(Color::Rgb(0xd9, 0x46, 0xef)));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(parse_hex_color("9b87f5"), None);
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn unknown_theme_name_falls_back_to_dark() {
        let theme = Theme::from_name("solarized");
        assert_eq!(theme.background_color, Theme::dark_default().background_color);
    }
}
