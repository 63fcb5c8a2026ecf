//! Console helpers
//!
//! Text progress bars, yes/no prompts and ASCII bar charts. Writers and
//! readers are passed in so everything here can be driven from tests.

pub mod chart;
pub mod progress;
pub mod prompt;

pub use chart::{ascii_bar_chart, ChartOptions};
pub use progress::{file_progress_bar, print_progress, render_progress, ProgressLayout};
pub use prompt::{parse_answer, query_yes_no, query_yes_no_stdin, PromptDefault};
