//! Integration tests for csproj-langversion
//!
//! These tests run the reconciliation end-to-end, from project files and options
//! files on disk to the rewritten project text.

use std::fs;
use std::path::{Path, PathBuf};

use assert_matches::assert_matches;
use csproj_langversion::schema::MsBuildSchema;
use csproj_langversion::{
    FsResolver, LineEnding, Mode, Outcome, ProjectDocument, ProjectLangVersionSync, Runner,
    SyncConfig, SyncError,
};

const UNITY_PROJECT: &str = "tests/fixtures/unity/Assembly-CSharp.csproj";
const PLAIN_PROJECT: &str = "tests/fixtures/plain/Library.csproj";

fn lf_sync() -> ProjectLangVersionSync {
    ProjectLangVersionSync::new(SyncConfig {
        line_ending: LineEnding::Lf,
        ..SyncConfig::default()
    })
}

fn lang_versions(text: &str) -> Vec<String> {
    let doc = ProjectDocument::parse(text).expect("output should parse");
    let schema = MsBuildSchema::for_document(&doc);
    let versions = doc
        .elements_named(&schema.lang_version)
        .map(|el| el.text())
        .collect();
    versions
}

/// Copy a fixture project and its options file into a fresh directory
fn unity_workspace(options: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("Assets")).unwrap();
    fs::write(dir.path().join("Assets").join("csc.rsp"), options).unwrap();
    let project = dir.path().join("Assembly-CSharp.csproj");
    fs::copy(UNITY_PROJECT, &project).unwrap();
    (dir, project)
}

#[test]
fn test_unity_project_preview() {
    let text = fs::read_to_string(UNITY_PROJECT).expect("Failed to read fixture");
    let resolver = FsResolver::new("tests/fixtures/unity");

    let result = lf_sync().reconcile_with_report(&text, &resolver).unwrap();

    assert!(result.is_changed());
    assert_eq!(lang_versions(&result.text), vec!["11.0"]);
    assert_matches!(result.outcome, Outcome::Updated { ref previous, .. } if previous.as_deref() == Some("9.0"));
    assert_eq!(
        result.text,
        text.replace("<LangVersion>9.0</LangVersion>", "<LangVersion>11.0</LangVersion>"),
        "only the setting should change"
    );
}

#[test]
fn test_project_without_reference_is_untouched() {
    let text = fs::read_to_string(PLAIN_PROJECT).expect("Failed to read fixture");
    let resolver = FsResolver::new("tests/fixtures/plain");

    let result = lf_sync().reconcile_with_report(&text, &resolver).unwrap();

    assert!(!result.is_changed());
    assert_eq!(result.outcome, Outcome::NoReference);
    assert_eq!(result.text, text);
}

#[test]
fn test_created_setting_survives_reparse_in_namespace() {
    let (dir, project) = unity_workspace("-langVersion:10\n");
    let text = fs::read_to_string(&project)
        .unwrap()
        .replace("    <LangVersion>9.0</LangVersion>\n", "");
    assert!(lang_versions(&text).is_empty());

    let out = lf_sync()
        .reconcile(&text, &FsResolver::new(dir.path()))
        .unwrap();

    let doc = ProjectDocument::parse(&out).unwrap();
    let schema = MsBuildSchema::new(Some("http://schemas.microsoft.com/developer/msbuild/2003"));
    let found: Vec<_> = doc.elements_named(&schema.lang_version).collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text(), "10.0");
    assert!(out.contains("  <PropertyGroup>\n    <LangVersion>10.0</LangVersion>\n  </PropertyGroup>"));
}

#[test]
fn test_reconcile_twice_is_stable() {
    let (dir, project) = unity_workspace("  -LANGVERSION:10  \n-langVersion:preview\n");
    let text = fs::read_to_string(&project).unwrap();
    let resolver = FsResolver::new(dir.path());

    let once = lf_sync().reconcile(&text, &resolver).unwrap();
    let twice = lf_sync().reconcile(&once, &resolver).unwrap();

    assert_eq!(lang_versions(&once), vec!["10.0"]);
    assert_eq!(once, twice);
}

#[test]
fn test_dangling_reference_is_an_error() {
    let text = fs::read_to_string(UNITY_PROJECT).expect("Failed to read fixture");
    let dir = tempfile::tempdir().unwrap();

    let err = lf_sync()
        .reconcile(&text, &FsResolver::new(dir.path()))
        .unwrap_err();

    assert_matches!(err, SyncError::MissingResource { .. });
}

#[test]
fn test_runner_writes_changed_project() {
    let (_dir, project) = unity_workspace("-langVersion:10\n");
    let config = SyncConfig {
        line_ending: LineEnding::Lf,
        ..SyncConfig::default()
    };
    let runner = Runner::new(config, Mode::Write);

    let mut out: Vec<u8> = Vec::new();
    let report = runner.process_file(&project, &mut out).unwrap();

    assert!(report.changed);
    assert!(out.is_empty());
    let written = fs::read_to_string(&project).unwrap();
    assert_eq!(lang_versions(&written), vec!["10.0"]);

    let again = runner.process_file(&project, &mut out).unwrap();
    assert!(!again.changed);
}

#[test]
fn test_runner_check_mode_leaves_file_alone() {
    let (dir, project) = unity_workspace("-langVersion:preview\n");
    let before = fs::read_to_string(&project).unwrap();
    let runner = Runner::new(SyncConfig::default(), Mode::Check);

    let summary = runner.run_paths(&[dir.path().to_path_buf()], &mut Vec::<u8>::new());

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.changed, 1);
    assert_eq!(summary.exit_code(Mode::Check), 1);
    assert_eq!(fs::read_to_string(&project).unwrap(), before);
}

#[test]
fn test_runner_stdout_mode_prints_project() {
    let (_dir, project) = unity_workspace("-langVersion:preview\n");
    let before = fs::read_to_string(&project).unwrap();
    let runner = Runner::new(SyncConfig::default(), Mode::Stdout);

    let mut out: Vec<u8> = Vec::new();
    runner.process_file(&project, &mut out).unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert_eq!(lang_versions(&printed), vec!["11.0"]);
    assert_eq!(fs::read_to_string(&project).unwrap(), before);
}

#[test]
fn test_runner_uses_configured_project_root() {
    let (dir, _) = unity_workspace("-langVersion:10\n");
    let elsewhere = tempfile::tempdir().unwrap();
    let project = elsewhere.path().join("Assembly-CSharp.csproj");
    fs::copy(UNITY_PROJECT, &project).unwrap();

    let config = SyncConfig {
        project_root: Some(dir.path().to_path_buf()),
        ..SyncConfig::default()
    };
    let report = Runner::new(config, Mode::Write)
        .process_file(&project, &mut Vec::<u8>::new())
        .unwrap();

    assert!(report.changed);
    assert_eq!(lang_versions(&fs::read_to_string(&project).unwrap()), vec!["10.0"]);
}

#[test]
fn test_runner_reports_invalid_project() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("Broken.csproj");
    fs::write(&project, "<Project><PropertyGroup></Project>").unwrap();

    let summary = Runner::new(SyncConfig::default(), Mode::Write)
        .run(&[project.clone()], &mut Vec::<u8>::new());

    assert_eq!(summary.failed, 1);
    assert_eq!(
        fs::read_to_string(&project).unwrap(),
        "<Project><PropertyGroup></Project>"
    );
}

#[test]
fn test_runner_keeps_going_after_unreadable_path() {
    let (dir, project) = unity_workspace("-langVersion:10\n");
    let paths = [dir.path().join("no-such-dir").join("Other.csproj"), project.clone()];

    let summary = Runner::new(SyncConfig::default(), Mode::Write).run_paths(&paths, &mut Vec::<u8>::new());

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.changed, 1);
    assert_eq!(summary.exit_code(Mode::Write), 2);
    assert_eq!(lang_versions(&fs::read_to_string(&project).unwrap()), vec!["10.0"]);
}

#[test]
fn test_config_file_drives_runner() {
    let (dir, project) = unity_workspace("-langVersion:10\n");
    let config_path = dir.path().join("langversion.yaml");
    fs::write(&config_path, "project_root: .\nline_ending: crlf\n").unwrap();

    let config = SyncConfig::load(&config_path).unwrap();
    assert_eq!(config.project_root.as_deref(), Some(Path::new(dir.path()).join(".").as_path()));

    Runner::new(config, Mode::Write)
        .process_file(&project, &mut Vec::<u8>::new())
        .unwrap();

    let written = fs::read_to_string(&project).unwrap();
    assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n<Project"));
}
