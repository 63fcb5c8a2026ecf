//! File scanning module
//!
//! Finds files by extension under a directory, optionally recursing, and
//! searches their raw bytes for a string with optional in-place replacement.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use glob::{MatchOptions, Pattern};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};

use crate::{Result, SsError};

/// Extension pattern matching any file name that contains a dot
pub const ANY_EXTENSION: &str = "*";

const NAME_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Compile extensions into `*.{ext}` glob patterns
///
/// Extensions may carry glob metacharacters, so `py*` also matches `.pyc`
/// and `.pyw` files.
fn extension_patterns(extensions: &[String]) -> Result<Vec<Pattern>> {
    extensions
        .iter()
        .map(|ext| {
            Pattern::new(&format!("*.{}", ext)).map_err(|e| {
                SsError::InvalidInput(format!("Invalid extension pattern '{}': {}", ext, e))
            })
        })
        .collect()
}

/// Parameters of a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Directory to search in
    pub path: PathBuf,
    /// Extensions without the leading period, `*` for any; glob wildcards allowed
    pub extensions: Vec<String>,
    /// Whether to descend into subdirectories
    pub recursive: bool,
    /// String to look for inside matched files
    pub find: Option<String>,
    /// Replacement for every occurrence of `find`
    pub replace: Option<String>,
    /// File to write results to instead of stdout
    pub outfile: Option<PathBuf>,
    /// Suppress progress messages
    pub quiet: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            path: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            extensions: vec![ANY_EXTENSION.to_string()],
            recursive: false,
            find: None,
            replace: None,
            outfile: None,
            quiet: false,
        }
    }
}

impl ScanOptions {
    /// Scan `path` with default settings
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_find(mut self, find: impl Into<String>) -> Self {
        self.find = Some(find.into());
        self
    }

    pub fn with_replace(mut self, replace: impl Into<String>) -> Self {
        self.replace = Some(replace.into());
        self
    }

    pub fn with_outfile(mut self, outfile: impl Into<PathBuf>) -> Self {
        self.outfile = Some(outfile.into());
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Validate the scan parameters
    pub fn validate(&self) -> Result<()> {
        if !self.path.is_dir() {
            return Err(SsError::InvalidInput(format!(
                "The path you specified ('{}') does not exist.",
                self.path.display()
            )));
        }

        if self.extensions.is_empty() {
            return Err(SsError::InvalidInput(
                "At least one extension is required".to_string(),
            ));
        }

        if let Some(bad) = self
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.') || e.contains(['/', '\\']))
        {
            return Err(SsError::InvalidInput(format!(
                "Invalid extension '{}': give it without the period",
                bad
            )));
        }

        extension_patterns(&self.extensions)?;

        match (&self.find, &self.replace) {
            (Some(find), _) if find.is_empty() => Err(SsError::InvalidInput(
                "The string to find must not be empty".to_string(),
            )),
            (None, Some(_)) => Err(SsError::InvalidInput(
                "'--replace' must be used in conjunction with '--find'".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Outcome of [`scan_files`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Files whose extension matched
    pub files_matched: usize,
    /// Matched files that contain the search string (all of them without one)
    pub results: Vec<PathBuf>,
    /// Whether matches were rewritten
    pub replaced: bool,
    /// Wall-clock time of the scan
    pub elapsed: Duration,
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Millisecond precision keeps the summary readable.
        let elapsed = Duration::from_millis(self.elapsed.as_millis() as u64);
        write!(
            f,
            "{} out of {} files matched in {}",
            self.results.len(),
            self.files_matched,
            humantime::format_duration(elapsed)
        )?;
        if self.replaced {
            write!(f, " (replaced)")?;
        }
        Ok(())
    }
}

fn matches_extension(name: &str, patterns: &[Pattern]) -> bool {
    patterns.iter().any(|p| p.matches_with(name, NAME_MATCH))
}

fn visit_dir(
    dir: &Path,
    recursive: bool,
    extensions: &[Pattern],
    found: &mut BTreeSet<PathBuf>,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        if entry.file_type()?.is_dir() {
            if recursive {
                // An unreadable subdirectory should not abort the whole scan.
                if let Err(err) = visit_dir(&path, recursive, extensions, found) {
                    log::warn!("skipping {}: {}", path.display(), err);
                }
            }
        } else if path.is_file() && matches_extension(&name, extensions) {
            found.insert(path);
        }
    }
    Ok(())
}

/// List files under `options.path` matching any of `options.extensions`
///
/// Hidden entries are skipped and symlinked directories are not followed.
/// The result is sorted and free of duplicates.
pub fn collect_files(options: &ScanOptions) -> Result<Vec<PathBuf>> {
    let patterns = extension_patterns(&options.extensions)?;
    let mut found = BTreeSet::new();
    visit_dir(&options.path, options.recursive, &patterns, &mut found)?;
    Ok(found.into_iter().collect())
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Replace every non-overlapping occurrence of `needle`, scanning left to right
pub fn replace_bytes(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if needle.is_empty() {
        return haystack.to_vec();
    }

    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            out.extend_from_slice(replacement);
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

/// Keep the files containing `find`, rewriting them when `replace` is given
///
/// Without `find` every file is returned untouched. Files that cannot be
/// read are logged and skipped; failing to write a replacement is an error.
pub fn find_in_files(
    files: &[PathBuf],
    find: Option<&[u8]>,
    replace: Option<&[u8]>,
    progress: Option<&ProgressBar>,
) -> Result<Vec<PathBuf>> {
    let Some(find) = find else {
        return Ok(files.to_vec());
    };

    let mut results = Vec::new();
    for file in files {
        if let Some(pb) = progress {
            pb.inc(1);
        }

        let content = match fs::read(file) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("cannot read {}: {}", file.display(), err);
                continue;
            }
        };
        if !contains_bytes(&content, find) {
            continue;
        }

        if let Some(replacement) = replace {
            fs::write(file, replace_bytes(&content, find, replacement)).map_err(|e| {
                SsError::PersistenceError(format!("Failed to rewrite {}: {}", file.display(), e))
            })?;
            log::debug!("rewrote {}", file.display());
        }
        results.push(file.clone());
    }
    Ok(results)
}

/// Run a scan: collect files, then search (and maybe replace) inside them
pub fn scan_files(options: &ScanOptions) -> Result<ScanReport> {
    scan_files_with_progress(options, None)
}

/// [`scan_files`] reporting per-file progress on `progress`
pub fn scan_files_with_progress(
    options: &ScanOptions,
    progress: Option<&ProgressBar>,
) -> Result<ScanReport> {
    options.validate()?;
    let start = Instant::now();

    let level = if options.quiet { log::Level::Debug } else { log::Level::Info };
    log::log!(
        level,
        "Scanning '{}' for files with extensions: {:?}, recursive={}...",
        options.path.display(),
        options.extensions,
        options.recursive
    );

    let files = collect_files(options)?;
    log::log!(level, "    -> Found {} files matching the extension", files.len());

    if let Some(pb) = progress {
        pb.set_length(files.len() as u64);
    }
    let results = find_in_files(
        &files,
        options.find.as_deref().map(str::as_bytes),
        options.replace.as_deref().map(str::as_bytes),
        progress,
    )?;
    if let Some(find) = &options.find {
        log::log!(
            level,
            "    -> {} out of {} files contain the string '{}'",
            results.len(),
            files.len(),
            find
        );
    }

    Ok(ScanReport {
        files_matched: files.len(),
        results,
        replaced: options.find.is_some() && options.replace.is_some(),
        elapsed: start.elapsed(),
    })
}

/// Print one result path per line to `out`, or into `outfile` when given
pub fn write_results<W: Write>(results: &[PathBuf], outfile: Option<&Path>, out: &mut W) -> Result<()> {
    match outfile {
        None => {
            for file in results {
                writeln!(out, "{}", file.display())?;
            }
        }
        Some(path) => {
            let mut content = String::new();
            for file in results {
                content.push_str(&format!("{}\n", file.display()));
            }
            fs::write(path, content).map_err(|e| {
                SsError::PersistenceError(format!("Failed to write {}: {}", path.display(), e))
            })?;
            writeln!(out, "    -> Results were printed to '{}'", path.display())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(extensions: &[&str]) -> Vec<Pattern> {
        let extensions: Vec<String> = extensions.iter().map(|e| e.to_string()).collect();
        extension_patterns(&extensions).unwrap()
    }

    #[test]
    fn test_matches_extension() {
        let py = patterns(&["py"]);
        assert!(matches_extension("main.py", &py));
        assert!(matches_extension("archive.tar.py", &py));
        assert!(!matches_extension("main.pyc", &py));
        assert!(!matches_extension("happy", &py));
        assert!(!matches_extension(".py", &py));

        let any = patterns(&[ANY_EXTENSION]);
        assert!(matches_extension("notes.txt", &any));
        assert!(!matches_extension("Makefile", &any));

        let several = patterns(&["rs", "toml"]);
        assert!(matches_extension("Cargo.toml", &several));
        assert!(matches_extension("lib.rs", &several));
    }

    #[test]
    fn test_matches_wildcard_extension() {
        let py_any = patterns(&["py*"]);
        assert!(matches_extension("main.py", &py_any));
        assert!(matches_extension("main.pyc", &py_any));
        assert!(!matches_extension("main.rs", &py_any));

        let one_char = patterns(&["?s"]);
        assert!(matches_extension("lib.rs", &one_char));
        assert!(matches_extension("app.js", &one_char));
        assert!(!matches_extension("app.jsx", &one_char));

        let class = patterns(&["[ch]"]);
        assert!(matches_extension("main.c", &class));
        assert!(matches_extension("main.h", &class));
        assert!(!matches_extension("main.o", &class));
    }

    #[test]
    fn test_replace_bytes() {
        assert_eq!(replace_bytes(b"aaa", b"aa", b"b"), b"ba".to_vec());
        assert_eq!(replace_bytes(b"foo bar foo", b"foo", b"baz"), b"baz bar baz".to_vec());
        assert_eq!(replace_bytes(b"abc", b"x", b"y"), b"abc".to_vec());
        assert_eq!(replace_bytes(b"abc", b"", b"y"), b"abc".to_vec());
        assert_eq!(replace_bytes(b"abc", b"b", b""), b"ac".to_vec());
    }

    #[test]
    fn test_contains_bytes() {
        assert!(contains_bytes(b"hello world", b"lo w"));
        assert!(!contains_bytes(b"hi", b"hello"));
        assert!(!contains_bytes(b"hi", b""));
    }

    #[test]
    fn test_validate() {
        let dir = std::env::temp_dir();
        assert!(ScanOptions::new(&dir).validate().is_ok());
        assert!(ScanOptions::new(dir.join("definitely-not-here-7f3a")).validate().is_err());
        assert!(ScanOptions::new(&dir).with_replace("x").validate().is_err());
        assert!(ScanOptions::new(&dir).with_find("").validate().is_err());
        assert!(ScanOptions::new(&dir).with_extensions([".rs"]).validate().is_err());
        assert!(ScanOptions::new(&dir).with_extensions(["py["]).validate().is_err());
        assert!(ScanOptions::new(&dir).with_extensions(["py*"]).validate().is_ok());
        assert!(ScanOptions::new(&dir)
            .with_extensions(Vec::<String>::new())
            .validate()
            .is_err());
    }

    #[test]
    fn test_report_display() {
        let report = ScanReport {
            files_matched: 4,
            results: vec![PathBuf::from("a.txt")],
            replaced: false,
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(report.to_string(), "1 out of 4 files matched in 1s 500ms");
    }

    #[test]
    fn test_write_results_to_writer() {
        let mut out = Vec::new();
        write_results(&[PathBuf::from("a.py"), PathBuf::from("b.py")], None, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a.py\nb.py\n");
    }
}
