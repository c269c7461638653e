// SPDX-FileCopyrightText: 2026 patient_redactor developers
// SPDX-License-Identifier: BSD-3-Clause

//! Phrase matching and redaction.
//!
//! Every phrase is searched case-insensitively against the page's original
//! decoded text; redaction only zeroes token content and never removes or
//! shifts characters, so no re-search is needed between phrases. Overlapping
//! matches across phrases are harmless: a glyph claimed twice is simply
//! blanked twice, which is the same as once.

use std::ops::Range;

use regex::RegexBuilder;

use crate::index::PageTextIndex;
use crate::tokens::TokenStream;

/// Find every case-insensitive occurrence of each phrase, in phrase-list
/// order, as glyph-index ranges over the page's original text.
pub fn find_matches(index: &PageTextIndex, phrases: &[String]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    for phrase in phrases {
        let pattern = RegexBuilder::new(&regex::escape(phrase))
            .case_insensitive(true)
            .build()
            .unwrap();
        let mut occurrences = 0;
        for hit in pattern.find_iter(index.text()) {
            ranges.push(index.glyph_range(hit.range()));
            occurrences += 1;
        }
        if occurrences > 0 {
            log::debug!("Found '{}' {} time(s)", phrase, occurrences);
        }
    }
    ranges
}

/// Zero the token content behind every matched glyph. Returns the number of
/// glyph redactions applied (double-claimed glyphs counted once per claim).
pub fn apply(tokens: &mut TokenStream, index: &PageTextIndex, ranges: &[Range<usize>]) -> usize {
    let mut cleared = 0;
    for range in ranges {
        for glyph in &index.glyphs()[range.clone()] {
            tokens.clear_string(glyph.token_index);
            cleared += 1;
        }
    }
    cleared
}
