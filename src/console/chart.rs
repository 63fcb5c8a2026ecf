//! Plain-text horizontal bar charts

use serde::{Deserialize, Serialize};

use crate::{Result, SsError};

/// Rendering options for [`ascii_bar_chart`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Title centred above the chart
    pub title: String,
    /// Total width of the chart in characters
    pub max_width: usize,
    /// Whether to print each value after its bar
    pub show_values: bool,
    /// Character the bars are drawn with
    pub bar_char: char,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "ASCII Bar Chart".to_string(),
            max_width: 100,
            show_values: true,
            bar_char: '#',
        }
    }
}

impl ChartOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn with_show_values(mut self, show_values: bool) -> Self {
        self.show_values = show_values;
        self
    }

    pub fn with_bar_char(mut self, bar_char: char) -> Self {
        self.bar_char = bar_char;
        self
    }
}

/// Render `(label, value)` pairs as a horizontal bar chart
///
/// Bars are scaled so the largest value fills the space left after the
/// label column and room for the printed value. Rows with a value of zero or
/// less get no bar.
///
/// # Examples
/// ```
/// use ss_utilities::console::chart::{ascii_bar_chart, ChartOptions};
///
/// let opts = ChartOptions::new().with_title("Sales").with_max_width(40);
/// let chart = ascii_bar_chart(&[("north", 12.0), ("south", 3.0)], &opts).unwrap();
/// assert!(chart.contains("north | ["));
/// assert_eq!(chart.lines().count(), 6);
/// ```
pub fn ascii_bar_chart<S: AsRef<str>>(data: &[(S, f64)], options: &ChartOptions) -> Result<String> {
    if data.is_empty() {
        return Err(SsError::InvalidInput("chart data is empty".to_string()));
    }
    if let Some((label, value)) = data.iter().find(|(_, v)| !v.is_finite()) {
        return Err(SsError::InvalidInput(format!(
            "value for '{}' is not finite: {}",
            label.as_ref(),
            value
        )));
    }

    let width = options.max_width;
    let title_len = options.title.chars().count();
    let pad_left = width.saturating_sub(title_len) / 2;
    let pad_right = width.saturating_sub(title_len + pad_left);
    let rule = "-".repeat(width);

    let mut output = format!(
        "{rule}\n{}{}{}\n{rule}\n",
        " ".repeat(pad_left),
        options.title,
        " ".repeat(pad_right),
    );

    let label_width = if options.show_values {
        data.iter()
            .map(|(label, _)| label.as_ref().chars().count())
            .max()
            .unwrap_or(0)
    } else {
        0
    };
    let max_value = data
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    let right_space = 10 + max_value.to_string().len();

    let bar_space = width
        .checked_sub(label_width + right_space)
        .filter(|space| *space > 0)
        .ok_or_else(|| {
            SsError::InvalidInput(format!(
                "chart width {} leaves no room for bars (labels {}, values {})",
                width, label_width, right_space
            ))
        })?;
    let bar_inc = max_value / bar_space as f64;

    for (label, value) in data {
        let label = label.as_ref();
        let value_label = if options.show_values {
            format!(" {}", value)
        } else {
            String::new()
        };
        let bars = if *value > 0.0 {
            let count = (value / bar_inc).floor() as usize;
            format!("[{}]", options.bar_char.to_string().repeat(count))
        } else {
            String::new()
        };
        let left_pad = " ".repeat((label_width + 2).saturating_sub(label.chars().count()));
        output.push_str(&format!("{}{} | {}{}\n", left_pad, label, bars, value_label));
    }

    output.push_str(&rule);
    output.push('\n');
    Ok(output)
}
