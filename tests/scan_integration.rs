//! Integration tests for scanning, searching and replacing in files

use ss_utilities::scan::{collect_files, find_in_files, scan_files, write_results, ScanOptions};
use ss_utilities::SsError;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn populate(root: &Path) {
    fs::create_dir_all(root.join("sub").join("deeper")).unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join("a.py"), "import os\nprint('needle')\n").unwrap();
    fs::write(root.join("b.py"), "x = 1\n").unwrap();
    fs::write(root.join("notes.txt"), "needle in a haystack\n").unwrap();
    fs::write(root.join("Makefile"), "needle:\n").unwrap();
    fs::write(root.join("sub").join("c.py"), "needle needle\n").unwrap();
    fs::write(root.join("sub").join("deeper").join("d.rs"), "fn needle() {}\n").unwrap();
    fs::write(root.join(".git").join("e.py"), "needle\n").unwrap();
}

fn names(files: &[std::path::PathBuf], root: &Path) -> Vec<String> {
    files
        .iter()
        .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

#[test]
fn test_collect_files_flat_and_recursive() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let flat = collect_files(&ScanOptions::new(dir.path()).with_extensions(["py"])).unwrap();
    assert_eq!(names(&flat, dir.path()), vec!["a.py", "b.py"]);

    let deep = collect_files(
        &ScanOptions::new(dir.path())
            .with_extensions(["py", "rs"])
            .with_recursive(true),
    )
    .unwrap();
    assert_eq!(
        names(&deep, dir.path()),
        vec!["a.py", "b.py", "sub/c.py", "sub/deeper/d.rs"]
    );

    // '*' needs a dot in the name, so Makefile is left out.
    let any = collect_files(&ScanOptions::new(dir.path())).unwrap();
    assert_eq!(names(&any, dir.path()), vec!["a.py", "b.py", "notes.txt"]);

    // Overlapping patterns list a file once.
    let overlap = collect_files(&ScanOptions::new(dir.path()).with_extensions(["py", "*"])).unwrap();
    assert_eq!(overlap.len(), 3);
}

#[test]
fn test_collect_files_wildcard_extensions() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    fs::write(dir.path().join("a.pyc"), [0u8, 1, 2]).unwrap();
    fs::write(dir.path().join("setup.cfg"), "[metadata]\n").unwrap();

    let py_any = collect_files(&ScanOptions::new(dir.path()).with_extensions(["py*"])).unwrap();
    assert_eq!(names(&py_any, dir.path()), vec!["a.py", "a.pyc", "b.py"]);

    let three = collect_files(&ScanOptions::new(dir.path()).with_extensions(["???"])).unwrap();
    assert_eq!(names(&three, dir.path()), vec!["a.pyc", "notes.txt", "setup.cfg"]);
}

#[test]
fn test_scan_find_only() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let report = scan_files(
        &ScanOptions::new(dir.path())
            .with_extensions(["py"])
            .with_recursive(true)
            .with_find("needle")
            .with_quiet(true),
    )
    .unwrap();

    assert_eq!(report.files_matched, 3);
    assert_eq!(names(&report.results, dir.path()), vec!["a.py", "sub/c.py"]);
    assert!(!report.replaced);
    // Searching must not touch the files.
    assert_eq!(
        fs::read_to_string(dir.path().join("sub").join("c.py")).unwrap(),
        "needle needle\n"
    );
}

#[test]
fn test_scan_find_and_replace() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let report = scan_files(
        &ScanOptions::new(dir.path())
            .with_extensions(["py", "txt"])
            .with_recursive(true)
            .with_find("needle")
            .with_replace("pin"),
    )
    .unwrap();

    assert_eq!(report.results.len(), 3);
    assert!(report.replaced);
    assert_eq!(
        fs::read_to_string(dir.path().join("sub").join("c.py")).unwrap(),
        "pin pin\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
        "pin in a haystack\n"
    );
    // Files outside the extension filter or hidden directories are untouched.
    assert_eq!(fs::read_to_string(dir.path().join("Makefile")).unwrap(), "needle:\n");
    assert_eq!(
        fs::read_to_string(dir.path().join(".git").join("e.py")).unwrap(),
        "needle\n"
    );
}

#[test]
fn test_scan_without_find_returns_all_matches() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let report = scan_files(&ScanOptions::new(dir.path()).with_extensions(["py"])).unwrap();
    assert_eq!(report.files_matched, 2);
    assert_eq!(report.results.len(), 2);
}

#[test]
fn test_scan_rejects_missing_directory() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(scan_files(&ScanOptions::new(missing)).is_err());
}

#[test]
fn test_write_results_to_outfile() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let outfile = dir.path().join("results.lst");

    let files = collect_files(&ScanOptions::new(dir.path()).with_extensions(["py"])).unwrap();
    let mut stdout = Vec::new();
    write_results(&files, Some(outfile.as_path()), &mut stdout).unwrap();

    let written = fs::read_to_string(&outfile).unwrap();
    assert_eq!(written.lines().count(), 2);
    assert!(written.lines().all(|l| l.ends_with(".py")));
    assert!(String::from_utf8(stdout).unwrap().contains("Results were printed to"));
}

#[test]
fn test_find_skips_files_that_cannot_be_read() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    // Removed after listing, and a directory posing as a file.
    let files = vec![
        dir.path().join("a.py"),
        dir.path().join("vanished.py"),
        dir.path().join("sub"),
        dir.path().join("notes.txt"),
    ];
    let found = find_in_files(&files, Some(b"needle".as_slice()), None, None).unwrap();
    assert_eq!(names(&found, dir.path()), vec!["a.py", "notes.txt"]);
}

#[cfg(unix)]
#[test]
fn test_find_skips_file_without_read_permission() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    populate(dir.path());
    let locked = dir.path().join("b.py");
    fs::write(&locked, "needle\n").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read(&locked).is_ok() {
        // Running as root, permissions are not enforced.
        return;
    }

    let files = vec![dir.path().join("a.py"), locked.clone()];
    let found = find_in_files(&files, Some(b"needle".as_slice()), None, None).unwrap();
    assert_eq!(names(&found, dir.path()), vec!["a.py"]);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_failed_rewrite_is_persistence_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    populate(dir.path());
    let readonly = dir.path().join("a.py");
    fs::set_permissions(&readonly, fs::Permissions::from_mode(0o444)).unwrap();
    if fs::OpenOptions::new().write(true).open(&readonly).is_ok() {
        // Running as root, permissions are not enforced.
        return;
    }

    let err = find_in_files(
        &[readonly.clone()],
        Some(b"needle".as_slice()),
        Some(b"pin".as_slice()),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, SsError::PersistenceError(_)));
    assert!(fs::read_to_string(&readonly).unwrap().contains("needle"));

    fs::set_permissions(&readonly, fs::Permissions::from_mode(0o644)).unwrap();
}
