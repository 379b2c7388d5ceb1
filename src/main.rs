//! Resume analyzer: deterministic ATS-style resume scoring

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_analyzer::cli::{self, Cli, Commands, ConfigAction};
use resume_analyzer::config::{Config, OutputFormat};
use resume_analyzer::input::file_detector::FileType;
use resume_analyzer::input::text_extractor::markdown_to_text;
use resume_analyzer::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_analyzer::processing::taxonomy::{SkillCategory, SkillTaxonomy};
use resume_analyzer::{AnalysisEngine, AnalysisRequest, Result, ResumeAnalyzerError};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // RUST_LOG still wins over the default
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, cli.config, config).await {
        error!("Command failed: {}", e);
        process::exit(if e.is_client_error() { 2 } else { 1 });
    }
}

async fn run_command(command: Commands, config_path: Option<PathBuf>, config: Config) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            job,
            job_text,
            mime,
            output,
            save,
            detailed,
        } => {
            let output_format = match output {
                Some(name) => cli::parse_output_format(&name).map_err(ResumeAnalyzerError::InvalidInput)?,
                None => config.output.format,
            };
            let detailed = detailed || config.output.detailed;

            let mime_type = match mime {
                Some(mime) => mime,
                None => mime_from_extension(&resume)?,
            };

            let job_description = match (job, job_text) {
                (Some(path), _) => Some(read_job_description(&path).await?),
                (None, text) => text,
            };

            info!("Analyzing {} as {}", resume.display(), mime_type);
            let bytes = tokio::fs::read(&resume).await?;

            let filename = resume
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| resume.display().to_string());

            let mut request = AnalysisRequest::new(bytes, mime_type).with_filename(filename);
            if let Some(text) = job_description {
                request = request.with_job_description(text);
            }

            let engine = AnalysisEngine::new(&config)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner:.blue} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message("Analyzing resume...");
            spinner.enable_steady_tick(Duration::from_millis(100));

            let result = engine.analyze(request).await;
            spinner.finish_and_clear();
            let report = result?;

            let generator = ReportGenerator::with_options(config.output.color_output, detailed, true, true);
            let rendered = generator.generate_report(&report, &output_format)?;

            match save {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(suggest_filename(&output_format, &report.filename, true))
                    } else {
                        path
                    };
                    // Colors are escape codes once written to disk
                    let rendered = if output_format == OutputFormat::Console && config.output.color_output {
                        ReportGenerator::with_options(false, detailed, true, true)
                            .generate_report(&report, &output_format)?
                    } else {
                        rendered
                    };
                    save_report_to_file(&rendered, &path)?;
                    println!("💾 Report saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Skills { category } => {
            let category = category
                .as_deref()
                .map(cli::parse_category)
                .transpose()
                .map_err(ResumeAnalyzerError::InvalidInput)?;

            let taxonomy = SkillTaxonomy::with_custom_skills(&config.keywords.custom_skills)?;
            print_skills(&taxonomy, category);
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let content = toml::to_string_pretty(&config)
                    .map_err(|e| ResumeAnalyzerError::Configuration(e.to_string()))?;
                println!("⚙️  Current Configuration\n");
                println!("{}", content);
            }

            Some(ConfigAction::Reset) => {
                let path = config_path.unwrap_or_else(Config::config_path);
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(&path)?;
                println!("✅ Configuration reset: {}", path.display());
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.unwrap_or_else(Config::config_path).display());
            }
        },
    }

    Ok(())
}

fn mime_from_extension(path: &Path) -> Result<String> {
    cli::validate_file_extension(path, &["pdf", "doc", "docx"])
        .map_err(|e| ResumeAnalyzerError::InvalidInput(format!("Resume file: {}", e)))?;

    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    FileType::from_extension(ext)
        .document_format()
        .map(|format| format.mime_type().to_string())
        .ok_or_else(|| ResumeAnalyzerError::InvalidInput(format!("Cannot infer type of {}", path.display())))
}

async fn read_job_description(path: &Path) -> Result<String> {
    cli::validate_file_extension(path, &["txt", "md", "markdown"])
        .map_err(|e| ResumeAnalyzerError::InvalidInput(format!("Job description file: {}", e)))?;

    let content = tokio::fs::read_to_string(path).await?;
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();

    if FileType::from_extension(ext) == FileType::Markdown {
        Ok(markdown_to_text(&content))
    } else {
        if content.trim().is_empty() {
            warn!("Job description {} is empty; scoring without it", path.display());
        }
        Ok(content)
    }
}

fn print_skills(taxonomy: &SkillTaxonomy, category: Option<SkillCategory>) {
    let categories = [
        SkillCategory::Technical,
        SkillCategory::Tool,
        SkillCategory::Soft,
        SkillCategory::Certification,
    ];

    for current in categories {
        if category.is_some_and(|wanted| wanted != current) {
            continue;
        }

        let records: Vec<_> = taxonomy
            .records()
            .iter()
            .filter(|record| record.category == current)
            .collect();
        if records.is_empty() {
            continue;
        }

        println!("\n{} ({})", current, records.len());
        for record in records {
            let aliases: Vec<&str> = record
                .synonyms
                .iter()
                .filter(|synonym| **synonym != record.canonical_name)
                .map(String::as_str)
                .collect();
            if aliases.is_empty() {
                println!("  • {}", record.canonical_name);
            } else {
                println!("  • {} ({})", record.canonical_name, aliases.join(", "));
            }
        }
    }
}
