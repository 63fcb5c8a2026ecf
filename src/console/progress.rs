//! Terminal progress output
//!
//! [`print_progress`] redraws a single `#`/`-` bar in place with a carriage
//! return and is meant to be called once per loop iteration.
//! [`file_progress_bar`] is the indicatif bar used by the CLI for scans.

use std::io::Write;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{Result, SsError};

/// Layout of a text progress line
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressLayout {
    /// Text printed before the bar
    pub prefix: String,
    /// Text printed after the percentage
    pub suffix: String,
    /// Decimal places in the percentage
    pub decimals: usize,
    /// Width of the bar in characters
    pub bar_length: usize,
}

impl Default for ProgressLayout {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            decimals: 2,
            bar_length: 100,
        }
    }
}

impl ProgressLayout {
    /// Create a progress layout with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prefix text
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the suffix text
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the number of decimals shown in the percentage
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    /// Set the bar width
    pub fn with_bar_length(mut self, bar_length: usize) -> Self {
        self.bar_length = bar_length;
        self
    }
}

/// Render one progress line, including the leading carriage return
///
/// # Examples
/// ```
/// use ss_utilities::console::progress::{render_progress, ProgressLayout};
///
/// let layout = ProgressLayout::new().with_bar_length(10).with_decimals(1);
/// assert_eq!(render_progress(5, 10, &layout).unwrap(), "\r |#####-----| 50.0% ");
/// ```
pub fn render_progress(iteration: u64, total: u64, layout: &ProgressLayout) -> Result<String> {
    if total == 0 {
        return Err(SsError::InvalidInput(
            "progress total must be greater than 0".to_string(),
        ));
    }

    let fraction = iteration as f64 / total as f64;
    let filled = ((layout.bar_length as f64 * fraction).round_ties_even() as usize)
        .min(layout.bar_length);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(layout.bar_length - filled));

    Ok(format!(
        "\r{} |{}| {:.*}% {}",
        layout.prefix,
        bar,
        layout.decimals,
        100.0 * fraction,
        layout.suffix
    ))
}

/// Write a progress line to `out` and flush it
///
/// A newline is written once `iteration` reaches `total`.
pub fn print_progress<W: Write>(
    out: &mut W,
    iteration: u64,
    total: u64,
    layout: &ProgressLayout,
) -> Result<()> {
    let line = render_progress(iteration, total, layout)?;
    out.write_all(line.as_bytes())?;
    if iteration == total {
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Styled indicatif bar counting files
pub fn file_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} files ({eta}) {msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
