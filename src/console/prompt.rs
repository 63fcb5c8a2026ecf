//! Yes/no confirmation prompt

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::{Result, SsError};

const RETRY_MESSAGE: &str = "Please respond with 'yes' or 'no' (or 'y' or 'n').\n";

/// Answer assumed when the user just presses Enter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptDefault {
    Yes,
    No,
    /// No default, the user has to answer explicitly
    Required,
}

impl PromptDefault {
    /// Hint appended to the question
    pub fn suffix(&self) -> &'static str {
        match self {
            PromptDefault::Yes => " [Y/n] ",
            PromptDefault::No => " [y/N] ",
            PromptDefault::Required => " [y/n] ",
        }
    }

    /// Answer used for empty input, if any
    pub fn value(&self) -> Option<bool> {
        match self {
            PromptDefault::Yes => Some(true),
            PromptDefault::No => Some(false),
            PromptDefault::Required => None,
        }
    }
}

impl FromStr for PromptDefault {
    type Err = SsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "yes" => Ok(PromptDefault::Yes),
            "no" => Ok(PromptDefault::No),
            "none" => Ok(PromptDefault::Required),
            other => Err(SsError::InvalidInput(format!(
                "invalid default answer: '{}'",
                other
            ))),
        }
    }
}

/// Interpret a typed answer; `None` when it is neither yes nor no
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "yes" | "ye" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

/// Ask `question` until a yes/no answer is given
///
/// Empty input selects `default` when there is one. If input ends before a
/// valid answer the default is returned, or [`SsError::Cancelled`] when the
/// answer is required.
pub fn query_yes_no<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    question: &str,
    default: PromptDefault,
) -> Result<bool> {
    let mut line = String::new();
    loop {
        write!(output, "{}{}", question, default.suffix())?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return default
                .value()
                .ok_or_else(|| SsError::Cancelled("no answer given".to_string()));
        }

        let choice = line.trim();
        if choice.is_empty() {
            if let Some(answer) = default.value() {
                return Ok(answer);
            }
        } else if let Some(answer) = parse_answer(choice) {
            return Ok(answer);
        }

        output.write_all(RETRY_MESSAGE.as_bytes())?;
    }
}

/// [`query_yes_no`] on the process's stdin and stdout
pub fn query_yes_no_stdin(question: &str, default: PromptDefault) -> Result<bool> {
    let stdin = io::stdin();
    query_yes_no(stdin.lock(), io::stdout(), question, default)
}
