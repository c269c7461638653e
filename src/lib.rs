// SPDX-FileCopyrightText: 2026 patient_redactor developers
// SPDX-License-Identifier: BSD-3-Clause

//! Patient-name redaction for page-based medical report PDFs.
//!
//! The patient header (`LAST, FIRST (…)`) is read once from the first page
//! and turned into an ordered phrase list. Each page is then processed in
//! document order: the content stream is tokenized, replayed to decode the
//! shown text, searched for every phrase, and the raw string tokens behind
//! every match are zeroed before the stream is serialized back into the
//! page. Layout, fonts and all non-matching content pass through untouched.
//!
//! Every failure is fatal for the whole run; the output document is only
//! written after every page succeeded, and the input file is never modified.

pub mod fonts;
pub mod header;
pub mod index;
pub mod logging;
pub mod path;
pub mod redact;
pub mod tokens;

use std::path::{Path, PathBuf};

use lopdf::{Document, ObjectId};

pub use logging::ResultExt;

/// Error taxonomy of the redaction run. Every variant is fatal and
/// unrecoverable at the point of occurrence: nothing is retried, no page is
/// skipped, and no partially redacted document is ever persisted.
#[derive(Debug, thiserror::Error)]
pub enum RedactError {
    /// Input unreadable or output unwritable.
    #[error("unable to read or write PDF document: {0}")]
    Io(lopdf::Error),
    /// Content stream that cannot be tokenized or re-serialized, or an
    /// ill-formed operation such as a font selection without a font name.
    #[error("malformed content stream: {0}")]
    Format(lopdf::Error),
    /// A font-selection operator names a font absent from page resources.
    #[error("font /{0} is not present in the page resources")]
    Resource(String),
    /// A text-show operator occurred before any font was selected.
    #[error("text-show operator '{0}' before any font was selected")]
    State(String),
    /// A text-show operand decoded to zero or more than one character.
    #[error("text operand {0:?} did not decode to exactly one character")]
    Decode(String),
    /// No `"Last, First (…)"` patient header on the first page.
    #[error("no patient header of the form \"Last, First (...)\" found")]
    Parse(String),
}

/// Per-run counters, logged at the end and handy for assertions.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RedactionSummary {
    pub pages: usize,
    /// Number of glyph redactions applied; a glyph claimed by more than one
    /// phrase occurrence is counted once per claim.
    pub glyphs_redacted: usize,
}

/// Redact the patient's name from every page of `doc`, in place.
pub fn redact_document(doc: &mut Document) -> Result<RedactionSummary, RedactError> {
    let patient = header::find_patient_header(doc)?;
    let phrases = patient.phrases();

    let mut summary = RedactionSummary::default();
    for (page_number, page_id) in doc.get_pages() {
        let cleared = redact_page(doc, page_id, &phrases)?;
        log::info!("Page {}: {} glyph(s) blanked", page_number, cleared);
        summary.pages += 1;
        summary.glyphs_redacted += cleared;
    }
    log::info!(
        "Redaction complete: {} page(s), {} glyph redaction(s)",
        summary.pages,
        summary.glyphs_redacted
    );
    Ok(summary)
}

// tokenize -> decode -> match -> mutate -> rewrite, fully for one page
// before the next begins.
fn redact_page(
    doc: &mut Document,
    page_id: ObjectId,
    phrases: &[String],
) -> Result<usize, RedactError> {
    let data = doc.get_page_content(page_id).map_err(RedactError::Format)?;
    let (encoded, cleared) = {
        let mut tokens = tokens::TokenStream::parse(doc, &data)?;
        let fonts = fonts::PageFonts::load(doc, page_id)?;
        let text_index = index::PageTextIndex::build(&tokens, &fonts)?;
        let ranges = redact::find_matches(&text_index, phrases);
        let cleared = redact::apply(&mut tokens, &text_index, &ranges);
        (tokens.encode()?, cleared)
    };
    doc.change_page_content(page_id, encoded)
        .map_err(RedactError::Format)?;
    Ok(cleared)
}

/// Full run: load the input, redact every page, and write the output to
/// `redacted_<file name>` in the current working directory.
pub fn run(input_path: &Path) -> Result<PathBuf, RedactError> {
    log::info!("Loading: {}", input_path.display());
    let mut doc = Document::load(input_path).map_err(RedactError::Io)?;

    let summary = redact_document(&mut doc)?;

    let output_path = path::redacted_output_path(input_path);
    log::info!("Saving: {}", output_path.display());
    // Document::save reports plain I/O errors, unlike Document::load.
    doc.save(&output_path)
        .map_err(|e| RedactError::Io(lopdf::Error::IO(e)))?;
    log::info!(
        "DONE! {} glyph redaction(s) across {} page(s)",
        summary.glyphs_redacted,
        summary.pages
    );
    Ok(output_path)
}


#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "DOE, JANE (DOB: 02/02/1980 ID: 456)";

    // Concatenated raw string-token bytes of a page, i.e. what would be
    // rendered, without the one-character decode check.
    fn page_raw_text(doc: &Document, page_id: ObjectId) -> String {
        let data = doc.get_page_content(page_id).unwrap();
        let stream = tokens::TokenStream::parse(doc, &data).unwrap();
        (0..stream.len())
            .filter_map(|i| stream.string_bytes(i))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    #[test]
    fn test_scenario_full_page_redaction() {
        let text = format!("Patient: {} Visit notes: DOE, JANE reported...", HEADER);
        let mut doc = testdoc::single_page(&[&text]);

        let summary = redact_document(&mut doc).unwrap();
        assert_eq!(summary.pages, 1);
        // Header phrase (35 glyphs) plus two "DOE, JANE" occurrences
        // (9 each); the one inside the header is double-claimed.
        assert_eq!(summary.glyphs_redacted, 35 + 9 + 9);

        let remaining = page_raw_text(&doc, testdoc::first_page_id(&doc));
        assert!(remaining.contains("Patient: "));
        assert!(remaining.contains("Visit notes: "));
        assert!(remaining.contains("reported..."));
        assert!(!remaining.to_uppercase().contains("DOE"));
        assert!(!remaining.to_uppercase().contains("JANE"));
    }

    #[test]
    fn test_every_page_is_redacted() {
        let mut doc = testdoc::two_pages(
            &[HEADER],
            &["Follow-up for DOE, JANE today", "No other findings"],
        );

        let summary = redact_document(&mut doc).unwrap();
        assert_eq!(summary.pages, 2);

        for page_id in testdoc::page_ids(&doc) {
            let remaining = page_raw_text(&doc, page_id);
            assert!(!remaining.to_uppercase().contains("DOE"));
            assert!(!remaining.to_uppercase().contains("JANE"));
        }
        let second = page_raw_text(&doc, testdoc::page_ids(&doc)[1]);
        assert!(second.contains("Follow-up for "));
        assert!(second.contains("No other findings"));
    }

    #[test]
    fn test_scenario_no_match_page_untouched() {
        let mut doc = testdoc::two_pages(&[HEADER], &["Lab results within normal limits"]);
        let page2_id = testdoc::page_ids(&doc)[1];
        let before = doc.get_page_content(page2_id).unwrap();

        redact_document(&mut doc).unwrap();

        let after = doc.get_page_content(page2_id).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_scenario_text_before_font_aborts() {
        let mut doc = testdoc::page_without_font_selection(HEADER);
        let page_id = testdoc::first_page_id(&doc);
        let before = doc.get_page_content(page_id).unwrap();

        let result = redact_document(&mut doc);
        assert!(matches!(result, Err(RedactError::State(_))));

        // Nothing was persisted for the failed run.
        assert_eq!(doc.get_page_content(page_id).unwrap(), before);
    }

    #[test]
    fn test_multi_character_show_aborts() {
        let mut doc = testdoc::page_with_raw_show(HEADER);
        assert!(matches!(
            redact_document(&mut doc),
            Err(RedactError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let result = run(Path::new("no_such_report.pdf"));
        assert!(matches!(result, Err(RedactError::Io(_))));
    }

    #[test]
    fn test_document_without_header_aborts() {
        let mut doc = testdoc::single_page(&["Quarterly summary 2024"]);
        assert!(matches!(
            redact_document(&mut doc),
            Err(RedactError::Parse(_))
        ));
    }

    #[test]
    fn test_redacted_document_round_trips() {
        let mut doc = testdoc::single_page(&[HEADER, "DOE, JANE came in for a follow-up"]);
        redact_document(&mut doc).unwrap();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();

        let reloaded = Document::load_mem(&buffer).unwrap();
        let text = reloaded.extract_text(&[1]).unwrap();
        assert!(!text.to_uppercase().contains("DOE"));
        assert!(!text.to_uppercase().contains("JANE"));
        assert!(text.contains("came in for a follow-up"));
    }

    #[test]
    fn test_token_count_is_preserved() {
        let mut doc = testdoc::single_page(&[HEADER]);
        let page_id = testdoc::first_page_id(&doc);

        let before = doc.get_page_content(page_id).unwrap();
        let count_before = tokens::TokenStream::parse(&doc, &before).unwrap().len();

        redact_document(&mut doc).unwrap();

        let after = doc.get_page_content(page_id).unwrap();
        let count_after = tokens::TokenStream::parse(&doc, &after).unwrap().len();
        assert_eq!(count_before, count_after);
    }
}
