use clap::{Parser, Subcommand};
use serde::Deserialize;
use ss_utilities::config::UtilsConfig;
use ss_utilities::email::{send_email, Email};
use ss_utilities::log_file::ErrorLog;
use ss_utilities::console::{
    ascii_bar_chart, file_progress_bar, print_progress, query_yes_no_stdin, PromptDefault,
};
use ss_utilities::scan::{scan_files_with_progress, write_results, ScanOptions};
use ss_utilities::stats::ErrorSummary;
use ss_utilities::{error, Result, SsError};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ssutils")]
#[command(about = "Error statistics, ASCII charts, file scanning and e-mail alerts", long_about = None)]
struct Cli {
    /// Use this config file instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only print warnings and results
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan for files with particular extensions, optionally containing a string
    Scan {
        /// Directory to search in (default is the current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// File extensions without the period; glob wildcards allowed ('*' matches any, 'py*' matches .py and .pyc)
        #[arg(short, long, num_args = 1..)]
        extension: Vec<String>,

        /// Search subdirectories too
        #[arg(short, long)]
        recursive: bool,

        /// String to look for in matched files
        #[arg(long)]
        find: Option<String>,

        /// Replacement for the found string (requires --find)
        #[arg(long, requires = "find")]
        replace: Option<String>,

        /// Write results to this file instead of stdout
        #[arg(short, long)]
        outfile: Option<PathBuf>,

        /// Replace without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Draw an ASCII bar chart from `label,value` lines
    Chart {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// Chart title
        #[arg(long, default_value = "ASCII Bar Chart")]
        title: String,

        /// Chart width in characters (overrides the config)
        #[arg(long)]
        width: Option<usize>,

        /// Don't print values after the bars
        #[arg(long)]
        no_values: bool,
    },

    /// Print R², Pearson and wMAPE for a JSON file of predictions and actuals
    Stats {
        /// JSON file with `predictions`, `actuals` and optional `norms`
        file: PathBuf,
    },

    /// Show the text progress bar
    ProgressDemo {
        /// Number of steps
        #[arg(long, default_value = "20", value_parser = clap::value_parser!(u64).range(1..))]
        steps: u64,

        /// Delay between steps in milliseconds
        #[arg(long, default_value = "50")]
        delay_ms: u64,
    },

    /// Send an e-mail through the SMTP account in the config
    Email {
        /// Recipient addresses, comma separated
        #[arg(long)]
        to: String,

        /// File holding the message body (stdin when omitted)
        #[arg(long)]
        body: Option<PathBuf>,

        /// Subject line
        #[arg(short, long)]
        subject: Option<String>,

        /// Carbon-copy addresses, comma separated
        #[arg(long)]
        cc: Option<String>,

        /// Address replies should go to
        #[arg(long)]
        reply_to: Option<String>,

        /// Files to attach
        #[arg(short, long)]
        attach: Vec<PathBuf>,

        /// Send the body as HTML
        #[arg(long)]
        html: bool,
    },
}

#[derive(Deserialize)]
struct StatsInput {
    predictions: Vec<f64>,
    actuals: Vec<f64>,
    norms: Option<Vec<f64>>,
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<UtilsConfig> {
    match path {
        Some(path) => UtilsConfig::load_from(path),
        None => UtilsConfig::load(),
    }
}

/// Parse `label,value` lines; blank lines and `#` comments are ignored
fn parse_chart_data<R: BufRead>(reader: R) -> Result<Vec<(String, f64)>> {
    let mut data = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (label, value) = line.rsplit_once(',').ok_or_else(|| {
            SsError::InvalidInput(format!("line {}: expected 'label,value'", idx + 1))
        })?;
        let value: f64 = value.trim().parse().map_err(|_| {
            SsError::InvalidInput(format!("line {}: invalid number '{}'", idx + 1, value.trim()))
        })?;
        data.push((label.trim().to_string(), value));
    }
    Ok(data)
}

fn run_scan(config: &UtilsConfig, mut options: ScanOptions, yes: bool) -> Result<()> {
    if options.extensions.is_empty() {
        options.extensions = config.default_extensions.clone();
    }
    options.validate()?;

    if let (Some(find), Some(replace)) = (&options.find, &options.replace) {
        let question = format!(
            "Replace every '{}' with '{}' in matching files under '{}'?",
            find,
            replace,
            options.path.display()
        );
        if !yes && !query_yes_no_stdin(&question, PromptDefault::No)? {
            return Err(SsError::Cancelled("replacement declined".to_string()));
        }
    }

    let report = if options.quiet {
        scan_files_with_progress(&options, None)?
    } else {
        let pb = file_progress_bar(0);
        let report = scan_files_with_progress(&options, Some(&pb))?;
        pb.finish_and_clear();
        report
    };
    log::info!("{}", report);

    write_results(&report.results, options.outfile.as_deref(), &mut io::stdout())
}

fn run(cli: Cli, config: &UtilsConfig) -> Result<()> {
    match cli.command {
        Commands::Scan {
            path,
            extension,
            recursive,
            find,
            replace,
            outfile,
            yes,
        } => {
            let mut options = match path {
                Some(path) => ScanOptions::new(path),
                None => ScanOptions::default(),
            }
            .with_extensions(extension)
            .with_recursive(recursive)
            .with_quiet(cli.quiet);
            options.find = find;
            options.replace = replace;
            options.outfile = outfile;
            run_scan(config, options, yes)
        }
        Commands::Chart {
            file,
            title,
            width,
            no_values,
        } => {
            let data = match file {
                Some(path) => parse_chart_data(BufReader::new(std::fs::File::open(path)?))?,
                None => {
                    let mut input = String::new();
                    io::stdin().read_to_string(&mut input)?;
                    parse_chart_data(input.as_bytes())?
                }
            };
            let mut options = config
                .chart_options()
                .with_title(title)
                .with_show_values(!no_values);
            if let Some(width) = width {
                options = options.with_max_width(width);
            }
            print!("{}", ascii_bar_chart(&data, &options)?);
            Ok(())
        }
        Commands::Stats { file } => {
            let content = std::fs::read_to_string(&file)?;
            let input: StatsInput = serde_json::from_str(&content).map_err(|e| {
                SsError::InvalidInput(format!("{}: {}", file.display(), e))
            })?;
            let summary =
                ErrorSummary::compute(&input.predictions, &input.actuals, input.norms.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Commands::ProgressDemo { steps, delay_ms } => {
            let layout = config
                .progress_layout()
                .with_prefix("Progress:")
                .with_suffix("Complete");
            let mut stdout = io::stdout();
            for i in 0..=steps {
                print_progress(&mut stdout, i, steps, &layout)?;
                std::thread::sleep(Duration::from_millis(delay_ms));
            }
            Ok(())
        }
        Commands::Email {
            to,
            body,
            subject,
            cc,
            reply_to,
            attach,
            html,
        } => {
            let smtp = config.smtp.as_ref().ok_or_else(|| {
                SsError::ConfigError("no [smtp] section in the config file".to_string())
            })?;
            let body = match body {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut input = String::new();
                    io::stdin().read_to_string(&mut input)?;
                    input
                }
            };
            let mut email = Email::new(to, body).with_html(html);
            email.subject = subject;
            email.cc = cc;
            email.reply_to = reply_to;
            email.attachments = attach;
            send_email(smtp, &email)
        }
    }
}

/// Record `err` to the error log when one is configured and return the
/// message shown to the user
fn report_error(err: &SsError, log: Option<&ErrorLog>) -> String {
    if let Some(log) = log {
        error::anticipated(&err.to_string(), Some("ssutils"), None, Some(log));
    }
    error::user_friendly_message(err)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", error::user_friendly_message(&err));
            return ExitCode::FAILURE;
        }
    };

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", report_error(&err, config.error_logger().as_ref()));
            ExitCode::FAILURE
        }
    }
}
