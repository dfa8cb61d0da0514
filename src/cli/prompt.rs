//! Small interactive prompts for the non-TUI commands.

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};

#[derive(Debug)]
pub enum PromptError {
    Cancelled,
    Io(io::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::Cancelled => write!(f, "Cancelled by user"),
            PromptError::Io(err) => write!(f, "Terminal error: {err}"),
        }
    }
}

impl std::error::Error for PromptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PromptError::Io(err) => Some(err),
            PromptError::Cancelled => None,
        }
    }
}

impl From<io::Error> for PromptError {
    fn from(err: io::Error) -> Self {
        PromptError::Io(err)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SecretOutcome {
    Continue,
    Submit,
    Cancel,
}

fn apply_secret_key(buffer: &mut String, key: &KeyEvent) -> SecretOutcome {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => SecretOutcome::Submit,
        KeyCode::Esc => SecretOutcome::Cancel,
        KeyCode::Char('c') if ctrl => SecretOutcome::Cancel,
        KeyCode::Char('u') if ctrl => {
            buffer.clear();
            SecretOutcome::Continue
        }
        KeyCode::Backspace => {
            buffer.pop();
            SecretOutcome::Continue
        }
        KeyCode::Char(c) if !ctrl && !c.is_control() => {
            buffer.push(c);
            SecretOutcome::Continue
        }
        _ => SecretOutcome::Continue,
    }
}

fn redraw_masked(prompt: &str, buffer: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\r\x1b[K{}{}", prompt, "*".repeat(buffer.chars().count()))?;
    stdout.flush()
}

/// Read a line without echoing it. Pasted text is accepted.
pub fn prompt_secret(prompt: &str) -> Result<String, PromptError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableBracketedPaste)?;

    let result = (|| -> Result<String, PromptError> {
        let mut buffer = String::new();
        redraw_masked(prompt, &buffer)?;
        loop {
            if !event::poll(Duration::from_millis(100))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match apply_secret_key(&mut buffer, &key) {
                        SecretOutcome::Submit => return Ok(buffer),
                        SecretOutcome::Cancel => return Err(PromptError::Cancelled),
                        SecretOutcome::Continue => {}
                    }
                }
                Event::Paste(text) => {
                    buffer.extend(text.chars().filter(|c| !c.is_control()));
                }
                _ => continue,
            }
            redraw_masked(prompt, &buffer)?;
        }
    })();

    let restored = disable_raw_mode().and_then(|_| execute!(stdout, DisableBracketedPaste));
    println!();
    let value = result?;
    restored?;
    Ok(value)
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` is no.
pub fn confirm(question: &str) -> Result<bool, PromptError> {
    print!("{question} [y/N]: ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
