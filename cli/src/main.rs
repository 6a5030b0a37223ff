//! hongtou CLI - official-document import, rule training, and rendering

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

use hongtou::{
    check_document, compose_document, extract_features, import_docx, infer_rules, revise_rules,
    validate_letterhead, AgentRevision, DocumentNode, DocxRenderer, Features, LetterheadTemplate,
    Severity, StructuredFields, StyleRules,
};

#[derive(Parser)]
#[command(name = "hongtou")]
#[command(version)]
#[command(about = "Import, train, validate, and render official documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a DOCX into the semantic document model
    Import {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output JSON file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Infer style rules from sample files (DOCX or PDF)
    Analyze {
        /// Sample files
        #[arg(value_name = "FILES", required = true)]
        samples: Vec<PathBuf>,

        /// Output JSON file for rules + confidence (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Revise a rule set with an instruction and optional patches
    Revise {
        /// Current rules JSON file
        #[arg(value_name = "RULES")]
        rules: PathBuf,

        /// Plain-text revision instruction
        #[arg(short, long, default_value = "")]
        instruction: String,

        /// Explicit patch JSON file
        #[arg(long, value_name = "FILE")]
        patch: Option<PathBuf>,

        /// Agent result JSON file ({patch, assistantReply, summary})
        #[arg(long, value_name = "FILE")]
        agent: Option<PathBuf>,

        /// Output JSON file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Validate a letterhead template's geometry
    Validate {
        /// Letterhead template JSON file
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,
    },

    /// Check a document body against numbering/punctuation conventions
    Check {
        /// Document JSON file ({document, fields})
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Create a new document body from a topic rule set
    Compose {
        /// Rules JSON file
        #[arg(value_name = "RULES")]
        rules: PathBuf,

        /// Output JSON file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render a document to DOCX
    Render {
        /// Document JSON file ({document, fields})
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Letterhead template JSON file
        #[arg(long, value_name = "FILE")]
        letterhead: Option<PathBuf>,

        /// Unit name bound into the letterhead
        #[arg(long, default_value = "")]
        unit_name: String,

        /// Skip the letterhead even when a template is given
        #[arg(long)]
        no_letterhead: bool,

        /// Output DOCX file
        #[arg(short, long, value_name = "FILE", default_value = "output.docx")]
        output: PathBuf,
    },
}

/// Document JSON shape shared by `check` and `render`.
#[derive(Deserialize)]
struct DocumentFile {
    document: DocumentNode,
    #[serde(default)]
    fields: StructuredFields,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Commands::Import { input, output } => {
            let data = fs::read(&input)?;
            let result = import_docx(&data)?;

            for warning in result
                .report
                .numbering_warnings
                .iter()
                .chain(&result.report.table_warnings)
            {
                eprintln!("{} {}", "warning:".yellow().bold(), warning);
            }
            emit_json(&serde_json::to_value(&result)?, output.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Analyze { samples, output } => {
            let bar = ProgressBar::new(samples.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );

            let mut features: Vec<Features> = Vec::new();
            for path in &samples {
                bar.set_message(path.display().to_string());
                let data = fs::read(path)?;
                match extract_features(&data, None) {
                    Ok(f) => features.push(f),
                    Err(e) => {
                        bar.println(format!(
                            "{} {}: {}",
                            "skipped".yellow().bold(),
                            path.display(),
                            e
                        ));
                    }
                }
                bar.inc(1);
            }
            bar.finish_and_clear();

            let (rules, confidence) = infer_rules(&features)?;

            println!("{}", "inferred fields".bold());
            for (path, field) in &confidence {
                let share = format!("{:>5.1}%", field.confidence * 100.0);
                let share = if field.confidence >= 0.8 {
                    share.green()
                } else {
                    share.yellow()
                };
                println!("  {share}  {path} ({} samples)", field.samples);
            }

            let payload = serde_json::json!({
                "rules": rules,
                "confidenceReport": confidence,
            });
            emit_json(&payload, output.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Revise {
            rules,
            instruction,
            patch,
            agent,
            output,
        } => {
            let previous: StyleRules = read_json(&rules)?;
            let explicit = match patch {
                Some(path) => Some(read_json::<serde_json::Value>(&path)?),
                None => None,
            };
            let agent = match agent {
                Some(path) => Some(read_json::<AgentRevision>(&path)?),
                None => None,
            };

            let next = revise_rules(&previous, &instruction, explicit.as_ref(), agent.as_ref())?;
            emit_json(&serde_json::to_value(&next)?, output.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate { template } => {
            let template: LetterheadTemplate = read_json(&template)?;
            let outcome = validate_letterhead(&template);

            for error in &outcome.errors {
                println!("{} {}", "error:".red().bold(), error);
            }
            for warning in &outcome.warnings {
                println!("{} {}", "warning:".yellow().bold(), warning);
            }
            if outcome.passes() {
                println!("{}", "ok: template may be published".green());
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }

        Commands::Check { input } => {
            let file: DocumentFile = read_json(&input)?;
            let issues = check_document(&file.document);
            let mut has_error = false;
            for issue in &issues {
                let tag = match issue.severity {
                    Severity::Error => {
                        has_error = true;
                        "error:".red().bold()
                    }
                    Severity::Warning => "warning:".yellow().bold(),
                };
                println!("{tag} [{}] {} ({})", issue.code, issue.message, issue.path);
            }
            if issues.is_empty() {
                println!("{}", "ok: no issues".green());
            }
            Ok(if has_error {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }

        Commands::Compose { rules, output } => {
            let rules: StyleRules = read_json(&rules)?;
            let document = compose_document(&rules);
            let payload = serde_json::json!({
                "document": document,
                "fields": StructuredFields {
                    topic_template_rules: Some(rules),
                    ..Default::default()
                },
            });
            emit_json(&payload, output.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Render {
            input,
            letterhead,
            unit_name,
            no_letterhead,
            output,
        } => {
            let file: DocumentFile = read_json(&input)?;
            let mut renderer = DocxRenderer::new(file.document, file.fields)
                .with_unit_name(unit_name)
                .include_letterhead(!no_letterhead);
            if let Some(path) = letterhead {
                renderer = renderer.with_letterhead(read_json(&path)?);
            }

            let bytes = renderer.render()?;
            fs::write(&output, bytes)?;
            println!("{} {}", "wrote".green().bold(), output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn emit_json(
    value: &serde_json::Value,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}
