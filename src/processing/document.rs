//! Document structures and section segmentation

use crate::input::file_detector::DocumentFormat;
use crate::processing::text_processor::TextProcessor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical resume sections recognized by heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Summary,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Projects,
        SectionKind::Certifications,
    ];

    /// Sections an ATS expects every resume to carry.
    pub const EXPECTED: [SectionKind; 3] = [
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Skills,
    ];

    /// Sections whose lines are expected to be written as lists.
    pub const LIST_LIKE: [SectionKind; 2] = [SectionKind::Experience, SectionKind::Projects];

    /// Heading phrasings, already lowercased and stripped of punctuation.
    pub fn heading_synonyms(&self) -> &'static [&'static str] {
        match self {
            SectionKind::Summary => &[
                "summary",
                "professional summary",
                "career summary",
                "executive summary",
                "profile",
                "professional profile",
                "objective",
                "career objective",
                "about me",
                "about",
                "overview",
            ],
            SectionKind::Experience => &[
                "experience",
                "work experience",
                "professional experience",
                "relevant experience",
                "employment",
                "employment history",
                "work history",
                "career history",
                "professional background",
            ],
            SectionKind::Education => &[
                "education",
                "education and training",
                "academic background",
                "academic history",
                "academics",
                "qualifications",
                "educational background",
            ],
            SectionKind::Skills => &[
                "skills",
                "technical skills",
                "core skills",
                "key skills",
                "core competencies",
                "competencies",
                "skills and abilities",
                "areas of expertise",
                "expertise",
                "technologies",
                "tech stack",
            ],
            SectionKind::Projects => &[
                "projects",
                "personal projects",
                "selected projects",
                "key projects",
                "notable projects",
                "portfolio",
            ],
            SectionKind::Certifications => &[
                "certifications",
                "certificates",
                "licenses",
                "licenses and certifications",
                "certifications and licenses",
                "awards and certifications",
            ],
        }
    }

    /// Recognize a line as a section heading.
    pub fn from_heading(line: &str) -> Option<SectionKind> {
        let key = heading_key(line);
        if key.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.heading_synonyms().contains(&key.as_str()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Summary => "Summary",
            SectionKind::Experience => "Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Projects => "Projects",
            SectionKind::Certifications => "Certifications",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercase, punctuation stripped, whitespace collapsed. `&` reads as "and".
fn heading_key(line: &str) -> String {
    let spaced: String = line
        .to_lowercase()
        .replace('&', " and ")
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    /// The heading line as it appeared in the document (first occurrence).
    pub heading: String,
    pub text: String,
}

/// Section map in document order. Text before the first heading is the preamble.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sections {
    pub preamble: String,
    entries: Vec<Section>,
}

impl Sections {
    /// Split normalized text on recognized heading lines. A repeated heading
    /// appends to the section it names.
    pub fn segment(text: &str) -> Self {
        let mut preamble: Vec<&str> = Vec::new();
        let mut entries: Vec<(SectionKind, String, Vec<&str>)> = Vec::new();
        let mut current: Option<usize> = None;

        for line in text.lines() {
            if let Some(kind) = SectionKind::from_heading(line) {
                let index = match entries.iter().position(|(k, _, _)| *k == kind) {
                    Some(index) => index,
                    None => {
                        entries.push((kind, line.trim().to_string(), Vec::new()));
                        entries.len() - 1
                    }
                };
                current = Some(index);
                continue;
            }

            match current {
                Some(index) => entries[index].2.push(line),
                None => preamble.push(line),
            }
        }

        Self {
            preamble: join_trimmed(&preamble),
            entries: entries
                .into_iter()
                .map(|(kind, heading, lines)| Section {
                    kind,
                    heading,
                    text: join_trimmed(&lines),
                })
                .collect(),
        }
    }

    pub fn get(&self, kind: SectionKind) -> Option<&Section> {
        self.entries.iter().find(|s| s.kind == kind)
    }

    pub fn contains(&self, kind: SectionKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn text(&self, kind: SectionKind) -> Option<&str> {
        self.get(kind).map(|s| s.text.as_str())
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.entries.iter().map(|s| s.kind).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expected sections that were not found.
    pub fn missing_expected(&self) -> Vec<SectionKind> {
        SectionKind::EXPECTED
            .into_iter()
            .filter(|kind| !self.contains(*kind))
            .collect()
    }
}

fn join_trimmed(lines: &[&str]) -> String {
    lines.join("\n").trim().to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub word_count: usize,
    pub character_count: usize,
    pub line_count: usize,
    pub paragraph_count: usize,
    /// Tables found by the extractor (Open-XML Word only).
    pub table_count: usize,
}

/// An extracted resume. Built once by the extractor and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    #[serde(skip)]
    raw_bytes: Vec<u8>,
    format: DocumentFormat,
    extracted_text: String,
    sections: Sections,
    stats: DocumentStats,
}

impl ResumeDocument {
    /// Assemble a document from already-normalized text.
    pub fn new(raw_bytes: Vec<u8>, format: DocumentFormat, extracted_text: String, table_count: usize) -> Self {
        let processor = TextProcessor::new();
        let sections = Sections::segment(&extracted_text);

        let stats = DocumentStats {
            word_count: processor.word_count(&extracted_text),
            character_count: extracted_text.chars().count(),
            line_count: extracted_text.lines().filter(|l| !l.is_empty()).count(),
            paragraph_count: paragraphs(&extracted_text).count(),
            table_count,
        };

        Self {
            raw_bytes,
            format,
            extracted_text,
            sections,
            stats,
        }
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    pub fn stats(&self) -> &DocumentStats {
        &self.stats
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        paragraphs(&self.extracted_text)
    }
}

/// Blocks of text separated by blank lines.
pub fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n").map(str::trim).filter(|p| !p.is_empty())
}
