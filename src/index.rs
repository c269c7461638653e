// SPDX-FileCopyrightText: 2026 patient_redactor developers
// SPDX-License-Identifier: BSD-3-Clause

//! Page text index: the decoded, searchable text of one page.
//!
//! Replays the token stream once, tracking the active font, and decodes every
//! text-show string operand into a [`Glyph`]. The concatenation of glyph
//! characters is the search text; character offset `i` always corresponds to
//! `glyphs[i]`, so a substring match maps straight back to the token indices
//! that produced it.

use std::ops::Range;

use crate::fonts::{self, FontState, PageFonts};
use crate::tokens::TokenStream;
use crate::RedactError;

/// One decoded character and the arena index of the string token it came
/// from. The glyph holds no copy of the token content; mutating the token at
/// `token_index` mutates exactly what will be serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub character: char,
    pub token_index: usize,
}

fn is_text_show(operator: &str) -> bool {
    matches!(operator, "Tj" | "TJ" | "'" | "\"")
}

/// The ordered glyphs of a page plus their concatenated characters.
pub struct PageTextIndex {
    glyphs: Vec<Glyph>,
    text: String,
}

impl PageTextIndex {
    /// Replay the whole page and decode its shown text.
    ///
    /// Non-font, non-text-show operators pass through uninspected. String
    /// operands of a text-show operator are decoded one by one; numeric
    /// operands (kerning entries of `TJ`, the spacing operands of `"`) are
    /// skipped.
    pub fn build(tokens: &TokenStream, fonts: &PageFonts) -> Result<PageTextIndex, RedactError> {
        let mut state = FontState::NoFontSet;
        let mut glyphs = Vec::new();
        let mut text = String::new();

        for op in tokens.operations() {
            if op.operator == "Tf" {
                let name = op
                    .operands
                    .first()
                    .and_then(|&index| tokens.name_bytes(index))
                    .ok_or_else(|| {
                        RedactError::Format(lopdf::Error::Syntax(
                            "font selection without a font name".to_string(),
                        ))
                    })?;
                state.select(fonts, name)?;
            } else if is_text_show(op.operator) {
                let encoding = state.encoding(op.operator)?;
                for &index in &op.operands {
                    if let Some(raw) = tokens.string_bytes(index) {
                        let character = fonts::decode_single(encoding, raw)?;
                        glyphs.push(Glyph {
                            character,
                            token_index: index,
                        });
                        text.push(character);
                    }
                }
            }
        }

        log::debug!("Decoded page text ({} glyphs): {:?}", glyphs.len(), text);
        Ok(PageTextIndex { glyphs, text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Map a byte range of `text` (as reported by a substring match) to the
    /// half-open range of glyph indices whose characters compose it.
    pub fn glyph_range(&self, bytes: Range<usize>) -> Range<usize> {
        let start = self.text[..bytes.start].chars().count();
        let len = self.text[bytes.start..bytes.end].chars().count();
        start..start + len
    }
}
