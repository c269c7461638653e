// SPDX-FileCopyrightText: 2026 patient_redactor developers
// SPDX-License-Identifier: BSD-3-Clause

//! Font selection state and glyph decoding.
//!
//! While a page's operations are replayed, [`FontState`] tracks which font is
//! active. Font lookup goes through the page's resource dictionary
//! ([`PageFonts`]); text decoding goes through the active font's
//! character-to-Unicode mapping. A text-show operand must decode to exactly
//! one Unicode character; anything else is a fatal [`RedactError::Decode`].

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Encoding, ObjectId};

use crate::RedactError;

/// Per-page font resource lookup. Borrows the document for the duration of
/// one page's processing; nothing is remembered across pages.
pub struct PageFonts<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
}

impl<'a> PageFonts<'a> {
    pub fn load(doc: &'a Document, page_id: ObjectId) -> Result<PageFonts<'a>, RedactError> {
        let fonts = doc.get_page_fonts(page_id).map_err(RedactError::Format)?;
        log::debug!("Page has {} font resource(s)", fonts.len());
        Ok(PageFonts { doc, fonts })
    }

    /// Resolve a font resource name to its character-to-Unicode mapping.
    fn encoding(&self, name: &[u8]) -> Result<Encoding<'a>, RedactError> {
        let font: &'a Dictionary = self
            .fonts
            .get(name)
            .copied()
            .ok_or_else(|| RedactError::Resource(String::from_utf8_lossy(name).into_owned()))?;
        font.get_font_encoding(self.doc)
            .map_err(|_| RedactError::Resource(String::from_utf8_lossy(name).into_owned()))
    }
}

/// Two-state tracker for the active font while replaying a page.
///
/// Starts in `NoFontSet`; a `Tf` operator transitions to `FontSet`. Showing
/// text while no font is set is not a recoverable condition.
pub enum FontState<'a> {
    NoFontSet,
    FontSet(Encoding<'a>),
}

impl<'a> FontState<'a> {
    /// Handle a font-selection operator naming `name` in the page resources.
    pub fn select(&mut self, fonts: &PageFonts<'a>, name: &[u8]) -> Result<(), RedactError> {
        log::debug!("Selecting font /{}", String::from_utf8_lossy(name));
        *self = FontState::FontSet(fonts.encoding(name)?);
        Ok(())
    }

    /// The active encoding, or [`RedactError::State`] for a text-show
    /// operator reached before any font selection. `operator` is only used
    /// for error reporting.
    pub fn encoding(&self, operator: &str) -> Result<&Encoding<'a>, RedactError> {
        match self {
            FontState::NoFontSet => Err(RedactError::State(operator.to_string())),
            FontState::FontSet(encoding) => Ok(encoding),
        }
    }
}

/// Decode one text-show string operand into exactly one character.
pub fn decode_single(encoding: &Encoding, raw: &[u8]) -> Result<char, RedactError> {
    let decoded = Document::decode_text(encoding, raw)
        .map_err(|_| RedactError::Decode(String::from_utf8_lossy(raw).into_owned()))?;

    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(character), None) => Ok(character),
        // Zero characters or more than one: never silently coerced.
        _ => Err(RedactError::Decode(String::from_utf8_lossy(raw).into_owned())),
    }
}
