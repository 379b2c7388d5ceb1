//! Text extraction from the supported resume formats

use crate::error::{Result, ResumeAnalyzerError};
use crate::input::file_detector::DocumentFormat;
use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild,
};
use log::debug;
use pulldown_cmark::{Event, Parser, Tag};
use std::io::{Cursor, Read, Seek};

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Text decoded from a document before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawText {
    pub text: String,
    pub table_count: usize,
}

impl RawText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            table_count: 0,
        }
    }
}

pub trait TextExtractor {
    fn format(&self) -> DocumentFormat;
    fn extract(&self, bytes: &[u8]) -> Result<RawText>;

    fn corrupt(&self, reason: impl Into<String>) -> ResumeAnalyzerError
    where
        Self: Sized,
    {
        ResumeAnalyzerError::CorruptDocument {
            format: self.format(),
            reason: reason.into(),
        }
    }
}

pub fn extractor_for(format: DocumentFormat) -> &'static dyn TextExtractor {
    match format {
        DocumentFormat::Pdf => &PdfExtractor,
        DocumentFormat::LegacyWord => &LegacyWordExtractor,
        DocumentFormat::OpenXmlWord => &DocxExtractor,
    }
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract(&self, bytes: &[u8]) -> Result<RawText> {
        // The header may follow a little leading garbage.
        let head = &bytes[..bytes.len().min(1024)];
        if !head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
            return Err(self.corrupt("missing %PDF- header"));
        }

        // pdf-extract panics on some malformed object streams instead of erroring.
        let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|_| self.corrupt("PDF parser aborted on malformed content"))?;

        let text = extracted.map_err(|e| self.corrupt(e.to_string()))?;
        Ok(RawText::plain(text))
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::OpenXmlWord
    }

    fn extract(&self, bytes: &[u8]) -> Result<RawText> {
        if !bytes.starts_with(ZIP_MAGIC) {
            return Err(self.corrupt("not a ZIP container"));
        }

        let docx = docx_rs::read_docx(bytes).map_err(|e| self.corrupt(e.to_string()))?;

        let mut lines: Vec<String> = Vec::new();
        let mut table_count = 0;

        for child in docx.document.children.iter() {
            match child {
                DocumentChild::Paragraph(para) => lines.push(Self::paragraph_text(para)),
                DocumentChild::Table(table) => {
                    table_count += 1;
                    for TableChild::TableRow(row) in table.rows.iter() {
                        for TableRowChild::TableCell(cell) in row.cells.iter() {
                            for content in cell.children.iter() {
                                if let TableCellContent::Paragraph(para) = content {
                                    lines.push(Self::paragraph_text(para));
                                }
                            }
                        }
                    }
                    lines.push(String::new());
                }
                _ => {}
            }
        }

        Ok(RawText {
            text: lines.join("\n"),
            table_count,
        })
    }
}

impl DocxExtractor {
    /// List paragraphs carry their bullet as numbering metadata, not text, so
    /// one is written back in.
    fn paragraph_text(para: &Paragraph) -> String {
        let mut text = String::new();
        Self::collect_runs(&para.children, &mut text);

        if para.property.numbering_property.is_some() && !text.trim().is_empty() {
            format!("• {}", text)
        } else {
            text
        }
    }

    fn collect_runs(children: &[ParagraphChild], out: &mut String) {
        for child in children {
            match child {
                ParagraphChild::Run(run) => {
                    for rc in run.children.iter() {
                        match rc {
                            RunChild::Text(t) => out.push_str(&t.text),
                            RunChild::Tab(_) => out.push(' '),
                            RunChild::Break(_) => out.push('\n'),
                            _ => {}
                        }
                    }
                }
                ParagraphChild::Hyperlink(link) => Self::collect_runs(&link.children, out),
                _ => {}
            }
        }
    }
}

/// Reader for Word 97-2003 binaries.
///
/// The compound file is opened with `cfb` and only the `WordDocument` stream
/// and its table stream are read. Text is assembled from the piece table the
/// FIB points at. When the FIB or piece table is unusable the `WordDocument`
/// stream alone is scanned for runs of UTF-16LE and single-byte text.
pub struct LegacyWordExtractor;

const WORD_DOCUMENT_STREAM: &str = "/WordDocument";

const FIB_IDENT: u16 = 0xA5EC;
const FIB_FLAGS: usize = 0x000A;
const FIB_WHICH_TABLE_STREAM: u16 = 0x0200;
const FIB_CCP_TEXT: usize = 0x004C;
const FIB_FC_CLX: usize = 0x01A2;
const FIB_LCB_CLX: usize = 0x01A6;

const CLX_PRC: u8 = 0x01;
const CLX_PCDT: u8 = 0x02;
const PCD_SIZE: usize = 8;
const FC_COMPRESSED: u32 = 0x4000_0000;
const FC_MASK: u32 = 0x3FFF_FFFF;

const FIELD_BEGIN: char = '\u{13}';
const FIELD_SEPARATOR: char = '\u{14}';
const FIELD_END: char = '\u{15}';

const MIN_RUN_CHARS: usize = 4;

impl TextExtractor for LegacyWordExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::LegacyWord
    }

    fn extract(&self, bytes: &[u8]) -> Result<RawText> {
        if !bytes.starts_with(OLE_MAGIC) {
            return Err(self.corrupt("missing OLE compound file signature"));
        }

        let mut container = cfb::CompoundFile::open(Cursor::new(bytes))
            .map_err(|e| self.corrupt(format!("unreadable compound file: {}", e)))?;
        let word_document = read_stream(&mut container, WORD_DOCUMENT_STREAM)
            .map_err(|e| self.corrupt(format!("no WordDocument stream: {}", e)))?;

        match Self::piece_table_text(&mut container, &word_document) {
            Some(text) => Ok(RawText::plain(text)),
            None => {
                debug!("No usable piece table, scanning the WordDocument stream");
                Ok(RawText::plain(Self::scan(&word_document)))
            }
        }
    }
}

impl LegacyWordExtractor {
    /// Main-document text per the FIB's `ccpText` and the Clx piece table.
    /// Returns `None` on any inconsistency so the caller can fall back.
    fn piece_table_text<F: Read + Seek>(
        container: &mut cfb::CompoundFile<F>,
        word_document: &[u8],
    ) -> Option<String> {
        if u16_at(word_document, 0)? != FIB_IDENT {
            return None;
        }
        let table_stream = if u16_at(word_document, FIB_FLAGS)? & FIB_WHICH_TABLE_STREAM != 0 {
            "/1Table"
        } else {
            "/0Table"
        };
        let ccp_text = u32_at(word_document, FIB_CCP_TEXT)? as usize;
        let fc_clx = u32_at(word_document, FIB_FC_CLX)? as usize;
        let lcb_clx = u32_at(word_document, FIB_LCB_CLX)? as usize;
        if lcb_clx == 0 {
            return None;
        }

        let table = read_stream(container, table_stream).ok()?;
        let clx = table.get(fc_clx..fc_clx.checked_add(lcb_clx)?)?;

        // Property runs come first, then the piece table.
        let mut pos = 0;
        while *clx.get(pos)? == CLX_PRC {
            pos += 3 + usize::from(u16_at(clx, pos + 1)?);
        }
        if *clx.get(pos)? != CLX_PCDT {
            return None;
        }
        let lcb = u32_at(clx, pos + 1)? as usize;
        let plc = clx.get(pos + 5..(pos + 5).checked_add(lcb)?)?;
        if lcb < 4 || (lcb - 4) % (4 + PCD_SIZE) != 0 {
            return None;
        }
        let pieces = (lcb - 4) / (4 + PCD_SIZE);
        let descriptors = (pieces + 1) * 4;

        let mut text = String::new();
        for i in 0..pieces {
            let cp_start = u32_at(plc, i * 4)? as usize;
            if cp_start >= ccp_text {
                break;
            }
            let cp_end = (u32_at(plc, (i + 1) * 4)? as usize).min(ccp_text);
            let count = cp_end.checked_sub(cp_start)?;

            let fc = u32_at(plc, descriptors + i * PCD_SIZE + 2)?;
            let offset = (fc & FC_MASK) as usize;
            if fc & FC_COMPRESSED != 0 {
                let start = offset / 2;
                let chunk = word_document.get(start..start.checked_add(count)?)?;
                text.extend(chunk.iter().map(|&b| cp1252(b)));
            } else {
                let chunk = word_document.get(offset..offset.checked_add(count * 2)?)?;
                let units = chunk
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
                text.extend(
                    char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)),
                );
            }
        }

        Some(Self::visible_text(&text))
    }

    /// Drops field instructions (between begin and separator marks) and maps
    /// Word's paragraph, cell and break marks to newlines.
    fn visible_text(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        // One entry per open field: true while inside its instruction part.
        let mut fields: Vec<bool> = Vec::new();

        for c in text.chars() {
            match c {
                FIELD_BEGIN => fields.push(true),
                FIELD_SEPARATOR => {
                    if let Some(instruction) = fields.last_mut() {
                        *instruction = false;
                    }
                }
                FIELD_END => {
                    fields.pop();
                }
                _ if fields.iter().any(|&instruction| instruction) => {}
                c => out.extend(Self::text_char(c)),
            }
        }
        out
    }

    /// Heuristic recovery from the `WordDocument` stream: whichever of the
    /// UTF-16LE and single-byte decodings yields more letters wins.
    fn scan(word_document: &[u8]) -> String {
        let wide = Self::keep_runs(Self::utf16_runs(word_document));
        let narrow = Self::keep_runs(Self::byte_runs(word_document));

        let letters = |runs: &[String]| -> usize {
            runs.iter()
                .map(|r| r.chars().filter(|c| c.is_alphabetic()).count())
                .sum()
        };

        let runs = if letters(&wide) >= letters(&narrow) { wide } else { narrow };
        runs.join("\n")
    }

    fn text_char(c: char) -> Option<char> {
        match c {
            // Word paragraph, cell, line-break and page-break marks
            '\r' | '\u{07}' | '\u{0B}' | '\u{0C}' => Some('\n'),
            '\t' => Some('\t'),
            c if !c.is_control() && c != char::REPLACEMENT_CHARACTER => Some(c),
            _ => None,
        }
    }

    fn utf16_runs(bytes: &[u8]) -> Vec<String> {
        let mut runs = Vec::new();
        let mut current = String::new();

        for pair in bytes.chunks_exact(2) {
            let unit = u16::from_le_bytes([pair[0], pair[1]]);
            match char::from_u32(u32::from(unit)).and_then(Self::text_char) {
                Some(c) if unit != 0 => current.push(c),
                _ => {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }

    fn byte_runs(bytes: &[u8]) -> Vec<String> {
        let mut runs = Vec::new();
        let mut current = String::new();

        for &b in bytes {
            let decoded = match b {
                0x20..=0x7E | 0x80..=0xFF | b'\r' | b'\t' | 0x07 | 0x0B => {
                    Self::text_char(cp1252(b))
                }
                _ => None,
            };
            match decoded {
                Some(c) => current.push(c),
                None => {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }

    fn keep_runs(runs: Vec<String>) -> Vec<String> {
        runs.into_iter()
            .filter(|run| {
                let trimmed = run.trim();
                let letters = trimmed.chars().filter(|c| c.is_alphabetic()).count();
                trimmed.chars().count() >= MIN_RUN_CHARS
                    && letters * 2 >= trimmed.chars().filter(|c| !c.is_whitespace()).count()
            })
            .collect()
    }
}

fn read_stream<F: Read + Seek>(
    container: &mut cfb::CompoundFile<F>,
    path: &str,
) -> std::io::Result<Vec<u8>> {
    let mut stream = container.open_stream(path)?;
    let mut data = Vec::new();
    stream.read_to_end(&mut data)?;
    Ok(data)
}

fn u16_at(bytes: &[u8], at: usize) -> Option<u16> {
    let b = bytes.get(at..at.checked_add(2)?)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

fn u32_at(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Windows-1252, the code page of compressed pieces.
fn cp1252(b: u8) -> char {
    match b {
        0x80 => '\u{20AC}',
        0x85 => '\u{2026}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        _ => char::from(b),
    }
}

/// Flatten a Markdown job description to plain text, one block per line.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak => text.push(' '),
            Event::HardBreak => text.push('\n'),
            Event::Start(Tag::Item) => text.push_str("• "),
            Event::End(Tag::Paragraph) | Event::End(Tag::Item) | Event::End(Tag::Heading(..)) => {
                text.push('\n')
            }
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Documents built in memory for the extractor and engine tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    const TEXT_OFFSET: usize = 0x800;

    /// Names Word keeps in the table stream's stylesheet.
    pub const STYLE_NAMES: [&str; 5] = [
        "Table Grid",
        "Hyperlink",
        "Body Text",
        "Balloon Text",
        "Page Number",
    ];
    pub const AUTHOR: &str = "Microsoft Office User";

    fn utf16(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    /// Word 97-2003 file: a FIB pointing at a single uncompressed piece,
    /// a `1Table` stream holding the piece table and a stylesheet, and
    /// summary metadata naming the author.
    pub fn legacy_doc(text: &str) -> Vec<u8> {
        let units = text.encode_utf16().count() as u32;

        let mut clx = vec![0x02];
        clx.extend(16u32.to_le_bytes());
        clx.extend(0u32.to_le_bytes());
        clx.extend(units.to_le_bytes());
        clx.extend([0, 0]);
        clx.extend((TEXT_OFFSET as u32).to_le_bytes());
        clx.extend([0, 0]);

        let mut word_document = vec![0u8; TEXT_OFFSET];
        word_document[0..2].copy_from_slice(&0xA5ECu16.to_le_bytes());
        word_document[0x0A..0x0C].copy_from_slice(&0x0200u16.to_le_bytes());
        word_document[0x4C..0x50].copy_from_slice(&units.to_le_bytes());
        word_document[0x1A2..0x1A6].copy_from_slice(&0u32.to_le_bytes());
        word_document[0x1A6..0x1AA].copy_from_slice(&(clx.len() as u32).to_le_bytes());
        word_document.extend(utf16(text));

        compound_file(word_document, clx)
    }

    /// Same streams with a zeroed FIB, which forces the stream scan.
    pub fn legacy_doc_without_fib(text: &str) -> Vec<u8> {
        let mut word_document = vec![0u8; 64];
        word_document.extend(utf16(text));
        word_document.extend([0u8; 32]);

        compound_file(word_document, Vec::new())
    }

    fn compound_file(word_document: Vec<u8>, mut table: Vec<u8>) -> Vec<u8> {
        for name in STYLE_NAMES {
            table.extend([0, 0]);
            table.extend(utf16(name));
        }

        let mut summary = vec![0xFE, 0xFF, 0x00, 0x00];
        summary.extend([0u8; 44]);
        summary.extend(AUTHOR.as_bytes());
        summary.push(0);

        let mut file = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
        for (path, data) in [
            ("/WordDocument", word_document),
            ("/1Table", table),
            ("/\u{5}SummaryInformation", summary),
        ] {
            let mut stream = file.create_stream(path).unwrap();
            stream.write_all(&data).unwrap();
            stream.flush().unwrap();
        }
        file.flush().unwrap();
        file.into_inner().into_inner()
    }

    /// Single-page PDF, one Helvetica line per entry.
    pub fn simple_pdf(lines: &[&str]) -> Vec<u8> {
        let mut content = String::from("BT\n/F1 12 Tf\n72 720 Td\n");
        for line in lines {
            let escaped = line.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
            content.push_str(&format!("({}) Tj\n0 -16 Td\n", escaped));
        }
        content.push_str("ET");

        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).into_bytes());
        }

        let xref = pdf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            tail.push_str(&format!("{:010} 00000 n \n", offset));
        }
        tail.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref
        ));
        pdf.extend(tail.into_bytes());
        pdf
    }
}
