//! Output formatters: console, JSON, Markdown and HTML

use crate::config::OutputFormat;
use crate::error::{Result, ResumeAnalyzerError};
use crate::output::report::*;
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for formatting analysis reports
pub trait OutputFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for API integration and structured data
pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

/// Askama template for HTML output
#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Resume Analysis: {{ filename }}</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        .header {
            text-align: center;
            margin-bottom: 30px;
            border-bottom: 3px solid #007acc;
            padding-bottom: 20px;
        }
        .grade {
            display: inline-block;
            padding: 8px 16px;
            border-radius: 20px;
            font-weight: bold;
            color: white;
            background: #007acc;
            margin-left: 10px;
        }
        .section h2 {
            color: #007acc;
            border-bottom: 2px solid #e9ecef;
            padding-bottom: 10px;
        }
        .score-breakdown {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
            gap: 15px;
            margin: 20px 0;
        }
        .score-item {
            background: #f8f9fa;
            padding: 15px;
            border-radius: 6px;
            border-left: 4px solid #007acc;
        }
        .band-strong { border-left-color: #28a745; }
        .band-fair { border-left-color: #ffc107; }
        .band-weak { border-left-color: #dc3545; }
        .strengths, .improvements {
            background: #f8f9fa;
            padding: 15px;
            border-radius: 6px;
            margin: 10px 0;
        }
        .strengths { border-left: 4px solid #28a745; }
        .improvements { border-left: 4px solid #ffc107; }
        .impact { color: #6c757d; font-size: 0.9em; }
        .metadata {
            background: #e9ecef;
            padding: 15px;
            border-radius: 6px;
            margin-top: 30px;
            font-size: 0.9em;
            color: #6c757d;
        }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Resume Analysis Report</h1>
            <p>{{ filename }} | {{ word_count }} words</p>
        </div>

        <div class="section">
            <h2>Overall Score: {{ overall_score }}/100 <span class="grade">{{ grade }}</span></h2>
            <p>{{ verdict }}</p>
            <div class="score-breakdown">
                {% for item in scores %}
                <div class="score-item band-{{ item.band }}">
                    <h4>{{ item.name }}</h4>
                    <p><strong>{{ item.score }}/100</strong> ({{ item.band }})</p>
                </div>
                {% endfor %}
                {% if has_job_match %}
                <div class="score-item">
                    <h4>Job Match</h4>
                    <p><strong>{{ job_match_score }}/100</strong></p>
                </div>
                {% endif %}
            </div>
        </div>

        <div class="section">
            <h2>Skills</h2>
            <p><strong>Found:</strong> {{ skills_found }}</p>
            <p><strong>Missing:</strong> {{ missing_skills }}</p>
            {% if has_job_match %}
            <p><strong>Job requires:</strong> {{ job_required_skills }}</p>
            {% endif %}
        </div>

        <div class="section">
            <h2>Strengths</h2>
            <div class="strengths">
                <ul>
                {% for finding in strengths %}
                    <li>{{ finding.message }} <span class="impact">[{{ finding.area }}]</span></li>
                {% endfor %}
                </ul>
            </div>
        </div>

        <div class="section">
            <h2>Improvements</h2>
            <div class="improvements">
                <ol>
                {% for finding in improvements %}
                    <li>{{ finding.message }} <span class="impact">[{{ finding.area }}, up to {{ finding.impact }} pts]</span></li>
                {% endfor %}
                </ol>
            </div>
        </div>

        <div class="metadata">
            <p><strong>Sections detected:</strong> {{ sections_detected }}</p>
            <p><strong>Generated by Resume Analyzer v{{ version }}</strong></p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    filename: String,
    word_count: usize,
    overall_score: u8,
    grade: String,
    verdict: String,
    scores: Vec<HtmlScore>,
    has_job_match: bool,
    job_match_score: u8,
    skills_found: String,
    missing_skills: String,
    job_required_skills: String,
    strengths: Vec<Finding>,
    improvements: Vec<Finding>,
    sections_detected: String,
    version: String,
}

struct HtmlScore {
    name: &'static str,
    score: u8,
    band: &'static str,
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn section_list(report: &AnalysisReport) -> String {
    report
        .sections_detected
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn band_color(band: ScoreBand) -> Color {
        match band {
            ScoreBand::Strong => Color::Green,
            ScoreBand::Fair => Color::Yellow,
            ScoreBand::Weak => Color::Red,
        }
    }

    fn format_score(&self, name: &str, score: u8) -> String {
        let band = ScoreBand::from_score(score);
        let filled = usize::from(score) / 5;
        let bar = format!("{}{}", "■".repeat(filled), "·".repeat(20 - filled));
        format!(
            "  {:<20} {:>3}/100 {} {}\n",
            name,
            score,
            self.colorize(&bar, Self::band_color(band)),
            band.label()
        )
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME ANALYSIS", 1));
        output.push_str(&format!("File: {} ({} words)\n", report.filename, report.word_count));

        output.push_str(&self.format_header("Overall", 2));
        let grade_color = Self::band_color(ScoreBand::from_score(report.overall_score));
        output.push_str(&format!(
            "Score: {}/100  Grade: {}  {}\n",
            report.overall_score,
            self.colorize(report.grade.letter(), grade_color),
            self.colorize(report.grade.message(), Color::Cyan)
        ));

        output.push_str(&self.format_header("Score Breakdown", 3));
        for (name, score) in report.sub_scores() {
            output.push_str(&self.format_score(name, score));
        }
        if let Some(job_score) = report.job_match_score {
            output.push_str(&self.format_score("Job Match", job_score));
        }

        output.push_str(&self.format_header("Skills", 3));
        output.push_str(&format!("  Found:   {}\n", list_or_none(&report.skills_found)));
        output.push_str(&format!(
            "  Missing: {}\n",
            self.colorize(&list_or_none(&report.missing_skills), Color::Red)
        ));
        if let Some(required) = &report.job_required_skills {
            output.push_str(&format!("  Job requires: {}\n", list_or_none(required)));
        }

        let strengths = if self.detailed {
            &report.strengths[..]
        } else {
            &report.strengths[..report.strengths.len().min(5)]
        };
        if !strengths.is_empty() {
            output.push_str(&self.format_header("Strengths", 3));
            for finding in strengths {
                output.push_str(&format!("  {} {}\n", self.colorize("✓", Color::Green), finding.message));
            }
        }

        let improvements = if self.detailed {
            &report.improvements[..]
        } else {
            &report.improvements[..report.improvements.len().min(5)]
        };
        if !improvements.is_empty() {
            output.push_str(&self.format_header("Improvements", 3));
            for (i, finding) in improvements.iter().enumerate() {
                output.push_str(&format!("  {}. {}", i + 1, finding.message));
                if self.detailed {
                    output.push_str(&format!(" [{}, {} pts]", finding.area, finding.impact));
                }
                output.push('\n');
            }
        }

        if self.detailed {
            output.push_str(&self.format_header("Structure", 3));
            output.push_str(&format!("  Sections: {}\n", section_list(report)));
            if !report.missing_sections.is_empty() {
                let missing: Vec<&str> = report.missing_sections.iter().map(|s| s.label()).collect();
                output.push_str(&format!(
                    "  Missing:  {}\n",
                    self.colorize(&missing.join(", "), Color::Red)
                ));
            }
            for near in &report.near_misses {
                output.push_str(&format!("  Possible misspelling: \"{}\" → {}\n", near.found_as, near.skill));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &AnalysisReport) -> HtmlTemplate {
        HtmlTemplate {
            include_styles: self.include_styles,
            filename: report.filename.clone(),
            word_count: report.word_count,
            overall_score: report.overall_score,
            grade: report.grade.letter().to_string(),
            verdict: report.grade.message().to_string(),
            scores: report
                .sub_scores()
                .into_iter()
                .map(|(name, score)| HtmlScore {
                    name,
                    score,
                    band: ScoreBand::from_score(score).label(),
                })
                .collect(),
            has_job_match: report.job_match_score.is_some(),
            job_match_score: report.job_match_score.unwrap_or_default(),
            skills_found: list_or_none(&report.skills_found),
            missing_skills: list_or_none(&report.missing_skills),
            job_required_skills: list_or_none(report.job_required_skills.as_deref().unwrap_or_default()),
            strengths: report.strengths.clone(),
            improvements: report.improvements.clone(),
            sections_detected: section_list(report),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| ResumeAnalyzerError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_badge(band: ScoreBand) -> &'static str {
        match band {
            ScoreBand::Strong => "🟢",
            ScoreBand::Fair => "🟡",
            ScoreBand::Weak => "🔴",
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Analysis Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**File:** `{}` | **Type:** `{}` | **Words:** {}\n\n",
                report.filename, report.mime_type, report.word_count
            ));
        }

        output.push_str(&format!(
            "## Overall Score: {}/100 (Grade {})\n\n{}\n\n",
            report.overall_score,
            report.grade,
            report.grade.message()
        ));

        output.push_str("| Component | Score | Rating |\n");
        output.push_str("|-----------|-------|--------|\n");
        for (name, score) in report.sub_scores() {
            let band = ScoreBand::from_score(score);
            output.push_str(&format!(
                "| {} | {} | {} {} |\n",
                name,
                score,
                Self::markdown_badge(band),
                band.label()
            ));
        }
        if let Some(job_score) = report.job_match_score {
            let band = ScoreBand::from_score(job_score);
            output.push_str(&format!(
                "| Job Match | {} | {} {} |\n",
                job_score,
                Self::markdown_badge(band),
                band.label()
            ));
        }
        output.push('\n');

        output.push_str("## Skills\n\n");
        output.push_str(&format!("- **Found:** {}\n", list_or_none(&report.skills_found)));
        output.push_str(&format!("- **Missing:** {}\n", list_or_none(&report.missing_skills)));
        if let Some(required) = &report.job_required_skills {
            output.push_str(&format!("- **Job requires:** {}\n", list_or_none(required)));
        }
        output.push('\n');

        if !report.strengths.is_empty() {
            output.push_str("## Strengths\n\n");
            for finding in &report.strengths {
                output.push_str(&format!("- {}\n", finding.message));
            }
            output.push('\n');
        }

        if !report.improvements.is_empty() {
            output.push_str("## Improvements\n\n");
            for (i, finding) in report.improvements.iter().enumerate() {
                output.push_str(&format!(
                    "{}. {} _({}, {} pts)_\n",
                    i + 1,
                    finding.message,
                    finding.area,
                    finding.impact
                ));
            }
            output.push('\n');
        }

        output.push_str(&format!("**Sections detected:** {}\n", section_list(report)));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
            html_formatter: HtmlFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            html_formatter: HtmlFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &AnalysisReport, format: &OutputFormat) -> Result<String> {
        let formatters: [&dyn OutputFormatter; 4] = [
            &self.console_formatter,
            &self.json_formatter,
            &self.markdown_formatter,
            &self.html_formatter,
        ];

        let formatter = formatters
            .into_iter()
            .find(|formatter| formatter.supports_format() == *format)
            .ok_or_else(|| {
                let reason = format!("No formatter for {:?} output", format);
                ResumeAnalyzerError::OutputFormatting(reason)
            })?;
        formatter.format_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
    };
    format!("{}_analysis{}.{}", base_name, timestamp_suffix, extension)
}
