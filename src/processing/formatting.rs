//! Structural analysis: formatting quality and ATS parseability

use crate::config::FormattingConfig;
use crate::output::report::{AnalysisArea, Finding};
use crate::processing::document::{ResumeDocument, SectionKind};
use crate::processing::scoring::round_score;
use crate::processing::text_processor::TextProcessor;
use log::debug;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct FormattingAnalysis {
    pub formatting_score: u8,
    pub ats_score: u8,
    pub missing_sections: Vec<SectionKind>,
    pub multi_column_suspected: bool,
    pub strengths: Vec<Finding>,
    pub improvements: Vec<Finding>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ContactPlacement {
    Preamble,
    Elsewhere,
    Missing,
}

impl ContactPlacement {
    fn credit(&self) -> f64 {
        match self {
            ContactPlacement::Preamble => 1.0,
            ContactPlacement::Elsewhere => 0.5,
            ContactPlacement::Missing => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct BulletStats {
    lines: usize,
    bulleted: usize,
    glyph_kinds: usize,
    dominant_share: f64,
}

impl BulletStats {
    fn ratio(&self) -> f64 {
        if self.lines == 0 {
            0.0
        } else {
            self.bulleted as f64 / self.lines as f64
        }
    }
}

pub struct FormattingAnalyzer {
    config: FormattingConfig,
    processor: TextProcessor,
}

impl FormattingAnalyzer {
    pub fn new(config: &FormattingConfig) -> Self {
        Self {
            config: config.clone(),
            processor: TextProcessor::new(),
        }
    }

    pub fn analyze(&self, doc: &ResumeDocument) -> FormattingAnalysis {
        let weights = &self.config.weights;
        let ats_weights = &self.config.ats_weights;
        let sections = doc.sections();

        let mut formatting_points = 0.0;
        let mut ats_points = 0.0;
        let mut strengths = Vec::new();
        let mut improvements = Vec::new();

        // Expected sections
        let missing_sections = sections.missing_expected();
        for kind in SectionKind::EXPECTED {
            if missing_sections.contains(&kind) {
                improvements.push(Finding::new(
                    AnalysisArea::Ats,
                    format!("Add a clearly headed {} section; ATS parsers look for it by name", kind.label()),
                    ats_weights.section(kind),
                ));
            } else {
                formatting_points += f64::from(weights.section(kind));
                ats_points += f64::from(ats_weights.section(kind));
            }
        }
        if missing_sections.is_empty() {
            strengths.push(Finding::new(
                AnalysisArea::Ats,
                "Includes the standard Experience, Education and Skills sections",
                SectionKind::EXPECTED.iter().map(|k| ats_weights.section(*k)).sum(),
            ));
        }

        // Contact information
        let contact = self.contact_placement(doc);
        formatting_points += f64::from(weights.contact_info) * contact.credit();
        ats_points += f64::from(ats_weights.contact_info) * contact.credit();
        match contact {
            ContactPlacement::Preamble => strengths.push(Finding::new(
                AnalysisArea::Ats,
                "Contact email is at the top where parsers expect it",
                ats_weights.contact_info,
            )),
            ContactPlacement::Elsewhere => improvements.push(Finding::new(
                AnalysisArea::Ats,
                "Move your contact details to the top of the resume",
                u32::from(round_score(f64::from(ats_weights.contact_info) * 0.5)),
            )),
            ContactPlacement::Missing => improvements.push(Finding::new(
                AnalysisArea::Ats,
                "Add an email address so recruiters can reach you",
                ats_weights.contact_info,
            )),
        }

        // Bullet consistency
        let bullets = self.bullet_stats(doc);
        let bullet_credit = bullets.ratio() * bullets.dominant_share;
        let bullet_points = f64::from(weights.bullet_consistency) * bullet_credit;
        formatting_points += bullet_points;
        let bullet_lost = u32::from(round_score(f64::from(weights.bullet_consistency) - bullet_points));
        if bullets.lines == 0 {
            improvements.push(Finding::new(
                AnalysisArea::Formatting,
                "Describe your experience as bullet points under an Experience or Projects heading",
                weights.bullet_consistency,
            ));
        } else if bullets.ratio() < 0.5 {
            improvements.push(Finding::new(
                AnalysisArea::Formatting,
                format!(
                    "Only {} of {} experience lines are bullet points; list achievements as bullets",
                    bullets.bulleted, bullets.lines
                ),
                bullet_lost,
            ));
        } else if bullets.glyph_kinds > 1 {
            improvements.push(Finding::new(
                AnalysisArea::Formatting,
                format!("Use one bullet style throughout ({} different glyphs found)", bullets.glyph_kinds),
                bullet_lost,
            ));
        } else {
            strengths.push(Finding::new(
                AnalysisArea::Formatting,
                "Experience is written as consistent bullet points",
                u32::from(round_score(bullet_points)),
            ));
        }

        // Length bounds
        let words = doc.stats().word_count;
        let length_credit = self.length_credit(words);
        let length_points = f64::from(weights.length_bounds) * length_credit;
        formatting_points += length_points;
        let length_lost = u32::from(round_score(f64::from(weights.length_bounds) - length_points));
        if words < self.config.min_words {
            improvements.push(Finding::new(
                AnalysisArea::Formatting,
                format!(
                    "At {} words the resume is too sparse; aim for at least {}",
                    words, self.config.min_words
                ),
                length_lost,
            ));
        } else if words > self.config.max_words {
            improvements.push(Finding::new(
                AnalysisArea::Formatting,
                format!(
                    "At {} words the resume is too dense; trim it below {}",
                    words, self.config.max_words
                ),
                length_lost,
            ));
        } else {
            strengths.push(Finding::new(
                AnalysisArea::Formatting,
                format!("Length is appropriate ({} words)", words),
                weights.length_bounds,
            ));
        }

        // Paragraph density
        let (dense, paragraph_total) = self.dense_paragraphs(doc);
        let density_credit = if paragraph_total == 0 {
            0.0
        } else {
            1.0 - dense as f64 / paragraph_total as f64
        };
        let density_points = f64::from(weights.paragraph_density) * density_credit;
        formatting_points += density_points;
        if dense > 0 {
            improvements.push(Finding::new(
                AnalysisArea::Formatting,
                format!(
                    "Break up {} paragraph(s) longer than {} words",
                    dense, self.config.max_paragraph_words
                ),
                u32::from(round_score(f64::from(weights.paragraph_density) - density_points)),
            ));
        }

        // Layout
        let multi_column_suspected = self.multi_column_suspected(doc);
        if multi_column_suspected {
            improvements.push(Finding::new(
                AnalysisArea::Ats,
                "The text reads like a multi-column layout; use a single column so parsers keep lines in order",
                ats_weights.single_column,
            ));
        } else {
            ats_points += f64::from(ats_weights.single_column);
        }

        // Glyphs and tables
        let symbol_ratio = self.symbol_ratio(doc.extracted_text());
        let clean_symbols = symbol_ratio <= self.config.max_symbol_ratio;
        let no_tables = doc.stats().table_count == 0;
        let glyph_credit = match (clean_symbols, no_tables) {
            (true, true) => 1.0,
            (false, false) => 0.0,
            _ => 0.5,
        };
        ats_points += f64::from(ats_weights.clean_glyphs) * glyph_credit;
        let half_glyph = u32::from(round_score(f64::from(ats_weights.clean_glyphs) * 0.5));
        if !clean_symbols {
            improvements.push(Finding::new(
                AnalysisArea::Ats,
                "Replace icons and decorative symbols with plain text",
                half_glyph,
            ));
        }
        if !no_tables {
            improvements.push(Finding::new(
                AnalysisArea::Ats,
                format!("Avoid tables ({} found); many parsers read them out of order", doc.stats().table_count),
                half_glyph,
            ));
        }

        let formatting_score = round_score(100.0 * formatting_points / f64::from(weights.total().max(1)));
        let mut ats_score = round_score(100.0 * ats_points / f64::from(ats_weights.total().max(1)));
        if !missing_sections.is_empty() {
            ats_score = ats_score.min(self.config.missing_section_ats_ceiling);
        }

        debug!(
            "Formatting {} / ATS {} (missing sections: {:?}, multi-column: {})",
            formatting_score, ats_score, missing_sections, multi_column_suspected
        );

        FormattingAnalysis {
            formatting_score,
            ats_score,
            missing_sections,
            multi_column_suspected,
            strengths,
            improvements,
        }
    }

    fn contact_placement(&self, doc: &ResumeDocument) -> ContactPlacement {
        if self.processor.contains_email(&doc.sections().preamble) {
            ContactPlacement::Preamble
        } else if self.processor.contains_email(doc.extracted_text()) {
            ContactPlacement::Elsewhere
        } else {
            ContactPlacement::Missing
        }
    }

    fn bullet_stats(&self, doc: &ResumeDocument) -> BulletStats {
        let mut glyphs: BTreeMap<char, usize> = BTreeMap::new();
        let mut stats = BulletStats::default();

        for kind in SectionKind::LIST_LIKE {
            let Some(text) = doc.sections().text(kind) else {
                continue;
            };
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                stats.lines += 1;
                if let Some(glyph) = self.processor.bullet_glyph(line) {
                    stats.bulleted += 1;
                    *glyphs.entry(glyph).or_default() += 1;
                }
            }
        }

        stats.glyph_kinds = glyphs.len();
        stats.dominant_share = match glyphs.values().max() {
            Some(&most) => most as f64 / stats.bulleted as f64,
            None => 1.0,
        };
        stats
    }

    fn length_credit(&self, words: usize) -> f64 {
        if words == 0 {
            0.0
        } else if words < self.config.min_words {
            words as f64 / self.config.min_words as f64
        } else if words > self.config.max_words {
            self.config.max_words as f64 / words as f64
        } else {
            1.0
        }
    }

    fn dense_paragraphs(&self, doc: &ResumeDocument) -> (usize, usize) {
        let mut dense = 0;
        let mut total = 0;
        for paragraph in doc.paragraphs() {
            total += 1;
            if self.processor.word_count(paragraph) > self.config.max_paragraph_words {
                dense += 1;
            }
        }
        (dense, total)
    }

    /// Column layouts flatten into many short lines packed into long paragraphs.
    fn multi_column_suspected(&self, doc: &ResumeDocument) -> bool {
        let lines: Vec<&str> = doc.extracted_text().lines().filter(|l| !l.is_empty()).collect();
        if lines.len() < self.config.multi_column_min_lines {
            return false;
        }

        let average_chars =
            lines.iter().map(|l| l.chars().count()).sum::<usize>() as f64 / lines.len() as f64;
        let lines_per_paragraph = lines.len() as f64 / doc.stats().paragraph_count.max(1) as f64;

        average_chars < self.config.multi_column_max_avg_line_chars
            && lines_per_paragraph >= self.config.multi_column_min_lines_per_paragraph
    }

    fn symbol_ratio(&self, text: &str) -> f64 {
        let mut visible = 0usize;
        let mut symbols = 0usize;
        for c in text.chars().filter(|c| !c.is_whitespace()) {
            visible += 1;
            if self.processor.is_decorative_symbol(c) {
                symbols += 1;
            }
        }
        if visible == 0 {
            0.0
        } else {
            symbols as f64 / visible as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::file_detector::DocumentFormat;

    fn analyzer() -> FormattingAnalyzer {
        FormattingAnalyzer::new(&FormattingConfig::default())
    }

    fn doc(text: &str) -> ResumeDocument {
        ResumeDocument::new(Vec::new(), DocumentFormat::Pdf, text.to_string(), 0)
    }

    fn filler(words: usize) -> String {
        vec!["delivered"; words].join(" ")
    }

    fn complete_resume() -> String {
        format!(
            "Jane Doe\njane@example.com\n\nSummary\n{}\n\nExperience\n\u{2022} Led a team of five engineers\n\u{2022} Built billing APIs in Rust\n\nEducation\nBSc Computer Science\n\nSkills\nRust, Python, Docker",
            filler(160)
        )
    }

    #[test]
    fn test_complete_resume_scores_full_marks() {
        let analysis = analyzer().analyze(&doc(&complete_resume()));

        assert!(analysis.missing_sections.is_empty());
        assert_eq!(analysis.ats_score, 100);
        assert!(!analysis.multi_column_suspected);
        assert!(analysis.formatting_score >= 90, "got {}", analysis.formatting_score);
    }

    #[test]
    fn test_missing_section_caps_ats_score() {
        let text = complete_resume().replace("Education\nBSc Computer Science\n\n", "");
        let analysis = analyzer().analyze(&doc(&text));

        assert_eq!(analysis.missing_sections, vec![SectionKind::Education]);
        assert_eq!(analysis.ats_score, 50);
        assert_eq!(analysis.improvements[0].impact, 20);
    }

    #[test]
    fn test_email_outside_preamble_earns_half_credit() {
        let text = complete_resume().replace("jane@example.com\n", "") + "\njane@example.com";
        let analysis = analyzer().analyze(&doc(&text));

        // 15-point contact signal at half credit
        assert_eq!(analysis.ats_score, 93);
    }

    #[test]
    fn test_mixed_bullets_reduce_formatting() {
        let consistent = analyzer().analyze(&doc(&complete_resume()));
        let mixed = analyzer().analyze(&doc(&complete_resume().replacen('\u{2022}', "-", 1)));

        assert!(mixed.formatting_score < consistent.formatting_score);
        assert!(mixed.improvements.iter().any(|f| f.message.contains("one bullet style")));
    }

    #[test]
    fn test_short_resume_is_penalized() {
        let analysis = analyzer().analyze(&doc("Jane Doe\njane@example.com\n\nExperience\n\u{2022} Built things"));
        assert!(analysis.formatting_score < 60);
        assert!(analysis.improvements.iter().any(|f| f.message.contains("too sparse")));
    }

    #[test]
    fn test_multi_column_detection() {
        let column_text: String = (0..16)
            .map(|i| format!("Item {} here", i))
            .collect::<Vec<_>>()
            .join("\n");
        let text = format!(
            "jane@example.com\n\nExperience\n{}\n\nEducation\nBSc\n\nSkills\nRust",
            column_text
        );
        let analysis = analyzer().analyze(&doc(&text));

        assert!(analysis.multi_column_suspected);
        assert!(analysis.ats_score <= 85);
    }

    #[test]
    fn test_tables_and_symbols_reduce_ats() {
        let icons = "\u{2605}".repeat(30);
        let text = complete_resume().replace("Rust, Python, Docker", &format!("{} Rust \u{260E}\u{2709}", icons));
        let with_table = ResumeDocument::new(Vec::new(), DocumentFormat::OpenXmlWord, text, 2);
        let analysis = analyzer().analyze(&with_table);

        assert_eq!(analysis.ats_score, 90);
    }
}
