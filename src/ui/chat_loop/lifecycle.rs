use std::{error::Error, io, io::Write};

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::{
    cursor::SetCursorStyle,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::style::Color;
use ratatui::Terminal;

pub type ChatTerminal<W = io::Stdout> = Terminal<CrosstermBackend<W>>;

pub fn setup_terminal(cursor_color: Option<Color>) -> Result<ChatTerminal, Box<dyn Error>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        SetCursorStyle::SteadyBar
    )?;

    if let Some(color) = cursor_color {
        queue_cursor_color(&mut stdout, color)?;
        stdout.flush()?;
    }

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).inspect_err(|_| {
        let _ = disable_raw_mode();
    })?;

    Ok(terminal)
}

pub fn restore_terminal<W: Write>(terminal: &mut ChatTerminal<W>) -> Result<(), Box<dyn Error>> {
    disable_raw_mode()?;
    queue_reset_cursor_color(terminal.backend_mut())?;
    execute!(
        terminal.backend_mut(),
        SetCursorStyle::DefaultUserShape,
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Tint the cursor with the selected persona's colour, or reset it.
pub fn apply_cursor_color<W: Write>(
    terminal: &mut ChatTerminal<W>,
    color: Option<Color>,
) -> io::Result<()> {
    match color {
        Some(color) => queue_cursor_color(terminal.backend_mut(), color)?,
        None => queue_reset_cursor_color(terminal.backend_mut())?,
    }
    terminal.backend_mut().flush()
}

fn queue_cursor_color<W: Write>(writer: &mut W, color: Color) -> io::Result<()> {
    if let Some(payload) = cursor_color_payload(color) {
        execute!(writer, Print(format!("\x1b]12;{}\x1b\\", payload)))?;
    }
    Ok(())
}

fn queue_reset_cursor_color<W: Write>(writer: &mut W) -> io::Result<()> {
    execute!(writer, Print("\x1b]112\x1b\\"))
}

fn cursor_color_payload(color: Color) -> Option<String> {
    match color {
        Color::Rgb(r, g, b) => Some(format!("#{:02x}{:02x}{:02x}", r, g, b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_color_payload_is_hex() {
        assert_eq!(
            cursor_color_payload(Color::Rgb(0x9b, 0x87, 0xf5)).as_deref(),
            Some("#9b87f5")
        );
        assert_eq!(cursor_color_payload(Color::Red), None);
    }

    #[test]
    fn queues_cursor_color_sequence() {
        let mut buf: Vec<u8> = Vec::new();
        queue_cursor_color(&mut buf, Color::Rgb(0x12, 0x34, 0x56)).expect("write");
        assert_eq!(buf, b"\x1b]12;#123456\x1b\\");
    }

    #[test]
    fn reset_writes_sequence() {
        let mut buf: Vec<u8> = Vec::new();
        queue_reset_cursor_color(&mut buf).expect("write");
        assert_eq!(buf, b"\x1b]112\x1b\\");
    }
}
