//! Core check logic shared by library callers and the CLI.

use std::path::{Path, PathBuf};

use crate::analyzer::rules::{Issue, LintContext, RulesEngine, Severity};
use crate::parser::asc::AscParser;
use crate::parser::schema::Schematic;

#[derive(Debug, thiserror::Error)]
pub enum AscError {
    #[error("parse error: {0}")]
    Parse(#[from] crate::parser::asc::AscParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

/// Options for check runs (library or CLI).
#[derive(Clone, Debug, Default)]
pub struct CheckOptions {
    /// Count warnings as errors in the stats.
    pub strict: bool,
    /// Run only these rule ids; empty means all.
    pub rules: Vec<String>,
}

/// Per-file check result with issues and counts.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub file: PathBuf,
    pub issues: Vec<Issue>,
    pub stats: CheckStats,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CheckStats {
    pub errors: usize,
    pub warnings: usize,
    pub suggestions: usize,
    pub infos: usize,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.stats.errors > 0
    }

    pub fn total_issues(&self) -> usize {
        self.stats.errors + self.stats.warnings + self.stats.suggestions + self.stats.infos
    }
}

fn issues_to_stats(issues: &[Issue], strict: bool) -> CheckStats {
    let mut stats = CheckStats::default();
    for i in issues {
        match i.severity {
            Severity::Error => stats.errors += 1,
            Severity::Warning if strict => stats.errors += 1,
            Severity::Warning => stats.warnings += 1,
            Severity::Suggestion => stats.suggestions += 1,
            Severity::Info => stats.infos += 1,
        }
    }
    stats
}

/// Recursively discover `.asc` files in a directory.
pub fn discover_asc_files(dir: &Path) -> Result<Vec<PathBuf>, AscError> {
    let mut files = Vec::new();
    walk_dir(dir, &mut files, 0)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>, depth: usize) -> Result<(), AscError> {
    if depth > 20 {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with('.') || name == "target" || name == "build" {
                continue;
            }
            walk_dir(&path, files, depth + 1)?;
        } else if path.is_file() {
            if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
                if ext.eq_ignore_ascii_case("asc") {
                    files.push(path);
                }
            }
        }
    }
    Ok(())
}

/// Check API used by both the library surface and the CLI.
pub struct AscToolkit;

impl AscToolkit {
    /// Parse and lint a single schematic file.
    pub fn check_schematic(path: &Path, options: &CheckOptions) -> Result<CheckResult, AscError> {
        let schematic = AscParser::parse_file(path)?;
        Ok(Self::check_parsed(path, &schematic, options))
    }

    /// Lint an already parsed schematic.
    pub fn check_parsed(path: &Path, schematic: &Schematic, options: &CheckOptions) -> CheckResult {
        let mut engine = RulesEngine::with_default_rules();
        engine.retain(&options.rules);
        let ctx = LintContext::build(schematic);
        let issues = engine.analyze_with(schematic, &ctx);
        let stats = issues_to_stats(&issues, options.strict);
        CheckResult {
            file: path.to_path_buf(),
            issues,
            stats,
        }
    }

    /// Check every `.asc` file under a directory.
    pub fn check_project(dir: &Path, options: &CheckOptions) -> Result<Vec<CheckResult>, AscError> {
        let files = discover_asc_files(dir)?;
        tracing::debug!(count = files.len(), "discovered schematic files");
        let mut results = Vec::new();
        for path in files {
            results.push(Self::check_schematic(&path, options)?);
        }
        Ok(results)
    }
}
