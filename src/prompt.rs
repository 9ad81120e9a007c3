//! Interactive prompts: update confirmation and the end-of-run pause

use crate::error::Aborted;
use console::{Key, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use std::io;
use tracing::warn;

/// Trait for asking the user whether an update may run
pub trait Confirmer {
    /// Returns true if the user agreed, or `Aborted` on Ctrl-C
    fn confirm(&self, question: &str) -> Result<bool, Aborted>;
}

/// Confirmer backed by a terminal prompt
///
/// Pressing Enter accepts. Outside an attended terminal every question is
/// answered "no" so an unattended run never installs unasked.
#[derive(Debug, Default)]
pub struct TerminalConfirmer;

impl TerminalConfirmer {
    /// Create a new terminal confirmer
    pub fn new() -> Self {
        Self
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, question: &str) -> Result<bool, Aborted> {
        if !console::user_attended() {
            warn!("stdin is not interactive; declining: {}", question);
            return Ok(false);
        }

        prompt_answer(
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(question)
                .default(true)
                .interact_on(&Term::stderr()),
        )
    }
}

/// Interpret the prompt result
///
/// The prompt reads keys in raw mode, so Ctrl-C arrives as an
/// `Interrupted` error instead of a signal.
fn prompt_answer(answer: dialoguer::Result<bool>) -> Result<bool, Aborted> {
    match answer {
        Ok(answer) => Ok(answer),
        Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => Err(Aborted),
        Err(e) => {
            warn!("confirmation prompt failed: {}", e);
            Ok(false)
        }
    }
}

/// Wait for Enter so a double-clicked console window stays open
///
/// Returns `Aborted` when Ctrl-C is pressed instead.
pub fn pause_at_end() -> Result<(), Aborted> {
    if !console::user_attended() {
        return Ok(());
    }
    let term = Term::stdout();
    if term.write_str("\nPress Enter to exit … ").is_err() {
        return Ok(());
    }

    let outcome = loop {
        if let Some(outcome) = pause_key(term.read_key_raw()) {
            break outcome;
        }
    };
    let _ = term.write_line("");
    outcome
}

/// What a key pressed during the pause does; `None` keeps waiting
fn pause_key(key: io::Result<Key>) -> Option<Result<(), Aborted>> {
    match key {
        Ok(Key::CtrlC) => Some(Err(Aborted)),
        // EOF, a closed terminal or a non-terminal stdin ends the pause
        Ok(Key::Enter) | Ok(Key::Unknown) | Err(_) => Some(Ok(())),
        Ok(_) => None,
    }
}
