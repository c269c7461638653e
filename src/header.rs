// SPDX-FileCopyrightText: 2026 patient_redactor developers
// SPDX-License-Identifier: BSD-3-Clause

//! Patient header detection.
//!
//! Report PDFs carry a header of the form `LAST, FIRST (DOB: ... ID: ...)` on
//! the first page. The header is located once, before any page is redacted,
//! and yields the ordered phrase list: the full header string, then
//! `FIRST LAST`, then `LAST, FIRST`.

use lopdf::Document;
use regex::Regex;

use crate::fonts::PageFonts;
use crate::index::PageTextIndex;
use crate::tokens::TokenStream;
use crate::RedactError;

// Uppercase name parts (possibly multi-word), a comma, then a parenthesized
// suffix with the remaining patient details.
const HEADER_RE: &str =
    r"([A-Z][A-Z'\-]*(?:\s[A-Z][A-Z'\-]*)*)\s*,\s*([A-Z][A-Z'\-]*(?:\s[A-Z][A-Z'\-]*)*)\s*\(([^()]*)\)";

/// Parsed patient identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientName {
    pub first: String,
    pub last: String,
}

/// The located header string together with the name parsed out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientHeader {
    pub line: String,
    pub name: PatientName,
}

impl PatientHeader {
    /// Ordered target phrases, most specific first. The order only decides
    /// which phrase claims shared characters first; the redacted set is the
    /// same either way, since every phrase is matched against the original
    /// page text.
    pub fn phrases(&self) -> Vec<String> {
        vec![
            self.line.clone(),
            format!("{} {}", self.name.first, self.name.last),
            format!("{}, {}", self.name.last, self.name.first),
        ]
    }
}

/// Parse the first `"Last, First (…)"` shaped substring out of `text`.
pub fn parse_patient_header(text: &str) -> Result<PatientHeader, RedactError> {
    let pattern = Regex::new(HEADER_RE).unwrap();
    let captures = pattern
        .captures(text)
        .ok_or_else(|| RedactError::Parse(text.to_string()))?;

    let line = captures.get(0).unwrap().as_str().to_string();
    let last = captures.get(1).unwrap().as_str().trim().to_string();
    let first = captures.get(2).unwrap().as_str().trim().to_string();
    Ok(PatientHeader {
        line,
        name: PatientName { first, last },
    })
}

/// Locate the patient header on the document's first page.
///
/// The first page is decoded through the same tokenize-and-replay path used
/// for redaction, and its text is scanned for the header shape. A document
/// without a recognizable header fails with [`RedactError::Parse`]; no
/// output is produced for it.
pub fn find_patient_header(doc: &Document) -> Result<PatientHeader, RedactError> {
    let page_id = *doc
        .get_pages()
        .values()
        .next()
        .ok_or_else(|| RedactError::Parse("document has no pages".to_string()))?;

    let data = doc.get_page_content(page_id).map_err(RedactError::Format)?;
    let tokens = TokenStream::parse(doc, &data)?;
    let fonts = PageFonts::load(doc, page_id)?;
    let index = PageTextIndex::build(&tokens, &fonts)?;

    let header = parse_patient_header(index.text())?;
    log::info!(
        "Found patient header: '{}' (first: {}, last: {})",
        header.line,
        header.name.first,
        header.name.last
    );
    Ok(header)
}
