//! Masked password input for `add-user`.

use std::io::Write;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};

use crate::BoxError;

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Editing,
    Submitted,
    Interrupted,
}

/// Applies one key press to the buffer being typed.
fn apply_key(buf: &mut String, key: KeyEvent) -> Input {
    if key.kind == KeyEventKind::Release {
        return Input::Editing;
    }
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Input::Submitted,
        KeyCode::Char('c') if control => Input::Interrupted,
        KeyCode::Backspace => {
            buf.pop();
            Input::Editing
        }
        KeyCode::Char(ch) if !control => {
            buf.push(ch);
            Input::Editing
        }
        _ => Input::Editing,
    }
}

/// Both entries must be equal and non-empty.
fn confirmed(first: String, second: &str) -> Result<String, BoxError> {
    if first.is_empty() {
        return Err("password must not be empty".into());
    }
    if first != second {
        return Err("passwords do not match".into());
    }
    Ok(first)
}

struct RawMode;

impl RawMode {
    fn enter() -> Result<Self, BoxError> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_masked(prompt: &str) -> Result<String, BoxError> {
    let _raw = RawMode::enter()?;
    let mut out = std::io::stderr();
    let mut buf = String::new();
    loop {
        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print(prompt),
            Print("*".repeat(buf.chars().count()))
        )?;
        out.flush()?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        match apply_key(&mut buf, key) {
            Input::Editing => {}
            Input::Submitted => break,
            Input::Interrupted => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
        }
    }
    execute!(out, Print("\r\n"))?;
    Ok(buf)
}

/// Asks for a new password and its confirmation.
pub(crate) fn read_new_password() -> Result<String, BoxError> {
    let first = read_masked("Password: ")?;
    let second = read_masked("Confirm password: ")?;
    confirmed(first, &second)
}
