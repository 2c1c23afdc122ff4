//! ltschem CLI - LTspice ASC schematic linting and formatting from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use ltschem::{
    parse_schematic, AscParser, AscToolkit, AscWriter, CheckOptions, CheckResult, Issue,
    NetExtractor, RulesEngine, Severity,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "ltschem")]
#[command(about = "LTspice ASC schematic lint and format tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint a single schematic file
    Check {
        /// Path to .asc file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if issues found at this severity or higher
        #[arg(long, value_enum)]
        fail_on: Option<FailOnSeverity>,

        /// Count warnings as errors
        #[arg(long)]
        strict: bool,

        /// Run only these rules (repeatable)
        #[arg(long = "rule", value_name = "ID")]
        rules: Vec<String>,
    },

    /// Lint all .asc files in a directory
    Project {
        /// Path to project directory
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if issues found at this severity or higher
        #[arg(long, value_enum)]
        fail_on: Option<FailOnSeverity>,

        /// Count warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Rewrite a schematic in canonical form
    Fmt {
        /// Path to .asc file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Rewrite the file in place instead of printing to stdout
        #[arg(short, long)]
        write: bool,

        /// Exit nonzero if the file is not already canonical, changing nothing
        #[arg(long, conflicts_with = "write")]
        check: bool,
    },

    /// Print the electrical nets implied by the drawing
    Nets {
        /// Path to .asc file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// List available lint rules
    Rules {
        /// Show severities as well
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
    /// GitHub Actions format
    Github,
    /// GitLab CI format
    Gitlab,
}

#[derive(Clone, ValueEnum)]
enum FailOnSeverity {
    Error,
    Warning,
    Info,
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Check {
            file,
            format,
            fail_on,
            strict,
            rules,
        } => handle_check(&file, format, fail_on, strict, rules),
        Commands::Project {
            dir,
            format,
            fail_on,
            strict,
        } => handle_project(&dir, format, fail_on, strict),
        Commands::Fmt { file, write, check } => handle_fmt(&file, write, check),
        Commands::Nets { file, format } => handle_nets(&file, format),
        Commands::Rules { verbose } => {
            handle_rules(verbose);
            0
        }
    };

    process::exit(exit_code);
}

fn handle_check(
    file: &PathBuf,
    format: OutputFormat,
    fail_on: Option<FailOnSeverity>,
    strict: bool,
    rules: Vec<String>,
) -> i32 {
    let options = CheckOptions { strict, rules };

    match AscToolkit::check_schematic(file, &options) {
        Ok(result) => {
            output_results(std::slice::from_ref(&result), &format);
            if let Some(severity) = fail_on {
                if should_fail(&result, &severity) {
                    return 1;
                }
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

fn handle_project(
    dir: &PathBuf,
    format: OutputFormat,
    fail_on: Option<FailOnSeverity>,
    strict: bool,
) -> i32 {
    let options = CheckOptions {
        strict,
        rules: vec![],
    };

    match AscToolkit::check_project(dir, &options) {
        Ok(results) => {
            output_results(&results, &format);
            if let Some(severity) = fail_on {
                for result in &results {
                    if should_fail(result, &severity) {
                        return 1;
                    }
                }
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

fn handle_fmt(file: &PathBuf, write: bool, check: bool) -> i32 {
    // Decode through the library so UTF-16LE files format like any other.
    let original = match AscParser::read_source(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let schematic = match AscParser::parse_str(&original) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let canonical = AscWriter::to_string(&schematic);

    if check {
        if canonical == original {
            0
        } else {
            eprintln!("{} is not in canonical form", file.display());
            1
        }
    } else if write {
        match std::fs::write(file, canonical) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {e}");
                1
            }
        }
    } else {
        print!("{canonical}");
        0
    }
}

fn handle_nets(file: &PathBuf, format: OutputFormat) -> i32 {
    let schematic = match parse_schematic(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let nets = NetExtractor::extract(&schematic);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "file": file.display().to_string(),
                "nets": nets,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
        }
        _ => {
            println!("{}: {} nets", file.display(), nets.len());
            for net in &nets {
                println!(
                    "  {:<10} {} wires, {} flags, {} pins",
                    net.name,
                    net.wires.len(),
                    net.flags.len(),
                    net.pins.len()
                );
                for pin in &net.pins {
                    println!("             {} pin {}", pin.instance, pin.pin);
                }
            }
        }
    }
    0
}

fn should_fail(result: &CheckResult, severity: &FailOnSeverity) -> bool {
    match severity {
        FailOnSeverity::Error => result.has_errors(),
        FailOnSeverity::Warning => result.stats.errors > 0 || result.stats.warnings > 0,
        FailOnSeverity::Info => result.total_issues() > 0,
    }
}

fn output_results(results: &[CheckResult], format: &OutputFormat) {
    match format {
        OutputFormat::Human => output_human(results),
        OutputFormat::Json => output_json(results),
        OutputFormat::Github => output_github(results),
        OutputFormat::Gitlab => output_gitlab(results),
    }
}

fn output_human(results: &[CheckResult]) {
    for result in results {
        println!("\nFile: {}", result.file.display());
        println!("{}", "─".repeat(60));

        if result.total_issues() == 0 {
            println!("  No issues found");
            continue;
        }

        for severity in [
            Severity::Error,
            Severity::Warning,
            Severity::Suggestion,
            Severity::Info,
        ] {
            let group: Vec<&Issue> = result
                .issues
                .iter()
                .filter(|i| i.severity == severity)
                .collect();
            if group.is_empty() {
                continue;
            }
            println!("\n  {}:", severity_heading(severity));
            for issue in group {
                println!("    - {}", issue.message);
                if let Some(ref suggestion) = issue.suggestion {
                    println!("      Hint: {suggestion}");
                }
            }
        }

        println!("\n  Summary:");
        println!("    Errors:      {}", result.stats.errors);
        println!("    Warnings:    {}", result.stats.warnings);
        println!("    Suggestions: {}", result.stats.suggestions);
        println!("    Info:        {}", result.stats.infos);
    }
}

fn severity_heading(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "ERRORS",
        Severity::Warning => "WARNINGS",
        Severity::Suggestion => "SUGGESTIONS",
        Severity::Info => "INFO",
    }
}

fn output_json(results: &[CheckResult]) {
    let output = serde_json::json!({
        "results": results.iter().map(|r| {
            serde_json::json!({
                "file": r.file.display().to_string(),
                "issues": r.issues,
                "stats": r.stats,
            })
        }).collect::<Vec<_>>(),
        "summary": {
            "total_files": results.len(),
            "total_issues": results.iter().map(|r| r.total_issues()).sum::<usize>(),
            "errors": results.iter().map(|r| r.stats.errors).sum::<usize>(),
        }
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn severity_to_github(issue: &Issue) -> &'static str {
    match issue.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Suggestion | Severity::Info => "notice",
    }
}

fn output_github(results: &[CheckResult]) {
    for result in results {
        for issue in &result.issues {
            let level = severity_to_github(issue);
            println!(
                "::{} file={}::{}",
                level,
                result.file.display(),
                issue.message.replace('\n', " ")
            );
        }
    }
}

fn severity_to_gitlab(issue: &Issue) -> &'static str {
    match issue.severity {
        Severity::Error => "blocker",
        Severity::Warning => "major",
        Severity::Suggestion => "minor",
        Severity::Info => "info",
    }
}

fn output_gitlab(results: &[CheckResult]) {
    let mut reports = Vec::new();
    for result in results {
        for issue in &result.issues {
            reports.push(serde_json::json!({
                "description": issue.message,
                "severity": severity_to_gitlab(issue),
                "location": {
                    "path": result.file.display().to_string(),
                }
            }));
        }
    }
    println!("{}", serde_json::to_string_pretty(&reports).unwrap());
}

fn handle_rules(verbose: bool) {
    println!("Available lint rules:\n");
    let engine = RulesEngine::with_default_rules();
    for rule in engine.rules() {
        println!("  {}", rule.id());
        println!("    {}", rule.name());
        if verbose {
            println!("    Severity: {:?}", rule.severity());
        }
        println!();
    }
}
