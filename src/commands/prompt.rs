use std::collections::VecDeque;

use inquire::{Confirm, InquireError, Select, Text};
use tracing::debug;

use crate::error::{Result, TuneError};
use crate::models::Ipv6Policy;
use crate::util;

/// Interactive input used by the commands.
pub trait Prompter {
    /// Yes/no question, default No.
    fn confirm(&mut self, message: &str) -> Result<bool>;
    /// Free-form one-line answer.
    fn ask(&mut self, message: &str) -> Result<String>;
    /// Pick one of `options`.
    fn choose(&mut self, message: &str, options: Vec<String>) -> Result<String>;
}

/// Terminal prompts backed by `inquire`.
#[derive(Debug, Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        Ok(Confirm::new(message).with_default(false).prompt()?)
    }

    fn ask(&mut self, message: &str) -> Result<String> {
        Ok(Text::new(message).prompt()?)
    }

    fn choose(&mut self, message: &str, options: Vec<String>) -> Result<String> {
        Ok(Select::new(message, options).prompt()?)
    }
}

/// Esc / Ctrl-C in a prompt.
pub fn is_cancel(err: &TuneError) -> bool {
    matches!(
        err,
        TuneError::Prompt(InquireError::OperationCanceled | InquireError::OperationInterrupted)
    )
}

/// Ask for the IPv6 policy until a valid 1-3 answer is given. `max_attempts`
/// bounds the retries; `None` keeps asking.
pub fn ask_ipv6_policy(p: &mut dyn Prompter, max_attempts: Option<usize>) -> Result<Ipv6Policy> {
    println!("IPv6 policy:");
    for policy in Ipv6Policy::ALL {
        println!("  {}) {}", policy.menu_number(), policy);
    }
    let mut attempts = 0usize;
    loop {
        let answer = p.ask("Choose [1-3]:")?;
        attempts += 1;
        match Ipv6Policy::from_menu(&answer) {
            Ok(policy) => {
                debug!(%policy, attempts, "ipv6 policy chosen");
                return Ok(policy);
            }
            Err(e) => {
                util::warn(&e);
                if max_attempts.is_some_and(|max| attempts >= max) {
                    return Err(TuneError::TooManyAttempts(attempts));
                }
            }
        }
    }
}

/// Replays canned answers; for driving the commands without a terminal.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    confirms: VecDeque<bool>,
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirm_with(mut self, yes: bool) -> Self {
        self.confirms.push_back(yes);
        self
    }

    pub fn answer(mut self, text: &str) -> Self {
        self.answers.push_back(text.to_string());
        self
    }

    /// Every prompt message shown so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        self.asked.push(message.to_string());
        self.confirms.pop_front().ok_or(TuneError::Prompt(InquireError::OperationCanceled))
    }

    fn ask(&mut self, message: &str) -> Result<String> {
        self.asked.push(message.to_string());
        self.answers.pop_front().ok_or(TuneError::Prompt(InquireError::OperationCanceled))
    }

    fn choose(&mut self, message: &str, options: Vec<String>) -> Result<String> {
        self.asked.push(message.to_string());
        let wanted = self.answers.pop_front().ok_or(TuneError::Prompt(InquireError::OperationCanceled))?;
        options
            .into_iter()
            .find(|o| *o == wanted)
            .ok_or(TuneError::Prompt(InquireError::InvalidConfiguration(format!("no option '{wanted}'"))))
    }
}
