// SPDX-FileCopyrightText: 2026 patient_redactor developers
// SPDX-License-Identifier: BSD-3-Clause

//! Content-stream token arena.
//!
//! A page's content stream is tokenized into a single flat, order-preserving
//! sequence of [`Token`]s: one `Operand` token per operand value (array
//! operands are flattened element-wise) followed by one `Operator` token per
//! instruction. Token indices are stable from tokenization through
//! serialization, so a glyph can identify its source string operand by index
//! alone and mutate exactly what will be written back to the page.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};

use crate::RedactError;

/// One entry of the page token sequence.
#[derive(Debug, Clone)]
pub enum Token {
    /// An operand value (byte-string, name, number, ...), with indirect
    /// references already resolved to their underlying value.
    Operand(Object),
    /// An operator name, e.g. `Tf` or `Tj`.
    Operator(String),
}

/// How one original operand maps back onto arena slots, so serialization can
/// rebuild the exact operand structure (scalars stay scalars, arrays are
/// re-wrapped around their element tokens).
#[derive(Debug, Clone)]
enum Slot {
    Scalar(usize),
    Array(std::ops::Range<usize>),
}

#[derive(Debug, Clone)]
struct OpShape {
    slots: Vec<Slot>,
    operator: usize,
}

/// Flattened view of one operation during replay: the operator name and the
/// arena indices of all its operand tokens, in encounter order.
pub struct OpView<'a> {
    pub operator: &'a str,
    pub operands: Vec<usize>,
}

/// The tokenized content stream of a single page.
///
/// Owns every token; all other components refer to tokens by index only.
pub struct TokenStream {
    tokens: Vec<Token>,
    ops: Vec<OpShape>,
}

impl TokenStream {
    /// Tokenize the raw content-stream bytes of one page.
    ///
    /// All-or-nothing: any failure yields [`RedactError::Format`] and no
    /// partial token sequence. Indirect references among operands are
    /// resolved through `doc` before being stored, and an unresolvable
    /// reference fails the whole parse. The underlying parser skips bytes
    /// that do not form an operation instead of erroring on them.
    pub fn parse(doc: &Document, data: &[u8]) -> Result<TokenStream, RedactError> {
        let content = Content::decode(data).map_err(RedactError::Format)?;
        log::debug!("Tokenizing {} operations", content.operations.len());

        let mut tokens: Vec<Token> = Vec::new();
        let mut ops: Vec<OpShape> = Vec::new();
        for operation in content.operations {
            let mut slots = Vec::with_capacity(operation.operands.len());
            for operand in operation.operands {
                match resolve(doc, operand)? {
                    Object::Array(items) => {
                        let start = tokens.len();
                        for item in items {
                            let item = resolve(doc, item)?;
                            tokens.push(Token::Operand(item));
                        }
                        slots.push(Slot::Array(start..tokens.len()));
                    }
                    value => {
                        slots.push(Slot::Scalar(tokens.len()));
                        tokens.push(Token::Operand(value));
                    }
                }
            }
            let operator = tokens.len();
            tokens.push(Token::Operator(operation.operator));
            ops.push(OpShape { slots, operator });
        }
        Ok(TokenStream { tokens, ops })
    }

    /// Number of tokens in the arena (operands and operators).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token(&self, index: usize) -> &Token {
        &self.tokens[index]
    }

    /// Iterate operator/operand groups in content-stream order.
    pub fn operations(&self) -> impl Iterator<Item = OpView<'_>> {
        self.ops.iter().map(|shape| OpView {
            operator: match &self.tokens[shape.operator] {
                Token::Operator(name) => name.as_str(),
                // Shapes are only built with operator slots pointing at
                // Operator tokens.
                Token::Operand(_) => unreachable!("operator slot holds an operand"),
            },
            operands: shape
                .slots
                .iter()
                .flat_map(|slot| match slot {
                    Slot::Scalar(index) => *index..*index + 1,
                    Slot::Array(range) => range.clone(),
                })
                .collect(),
        })
    }

    /// Byte content of a string operand token, if the token is one.
    pub fn string_bytes(&self, index: usize) -> Option<&[u8]> {
        match &self.tokens[index] {
            Token::Operand(Object::String(bytes, _)) => Some(bytes),
            _ => None,
        }
    }

    /// Name content of a name operand token, if the token is one.
    pub fn name_bytes(&self, index: usize) -> Option<&[u8]> {
        match &self.tokens[index] {
            Token::Operand(Object::Name(name)) => Some(name),
            _ => None,
        }
    }

    /// Zero the content of a string operand token. The token itself stays in
    /// place, so token count and order are unaffected; an already-empty
    /// string stays empty.
    pub fn clear_string(&mut self, index: usize) {
        if let Token::Operand(Object::String(bytes, _)) = &mut self.tokens[index] {
            bytes.clear();
        }
    }

    /// Serialize the (possibly mutated) token sequence back into
    /// content-stream bytes, in the exact same token order.
    pub fn encode(&self) -> Result<Vec<u8>, RedactError> {
        let mut operations = Vec::with_capacity(self.ops.len());
        for shape in &self.ops {
            let operator = match &self.tokens[shape.operator] {
                Token::Operator(name) => name.clone(),
                Token::Operand(_) => unreachable!("operator slot holds an operand"),
            };
            let mut operands = Vec::with_capacity(shape.slots.len());
            for slot in &shape.slots {
                match slot {
                    Slot::Scalar(index) => operands.push(self.operand_value(*index)),
                    Slot::Array(range) => operands.push(Object::Array(
                        range.clone().map(|index| self.operand_value(index)).collect(),
                    )),
                }
            }
            operations.push(Operation { operator, operands });
        }
        Content { operations }.encode().map_err(RedactError::Format)
    }

    fn operand_value(&self, index: usize) -> Object {
        match &self.tokens[index] {
            Token::Operand(value) => value.clone(),
            Token::Operator(_) => unreachable!("operand slot holds an operator"),
        }
    }
}

// Follow reference chains down to the actual value. Content streams rarely
// contain indirect operands, but when they do the downstream components must
// see the resolved value, not the reference.
fn resolve(doc: &Document, object: Object) -> Result<Object, RedactError> {
    let mut object = object;
    while let Object::Reference(id) = object {
        object = doc.get_object(id).map_err(RedactError::Format)?.clone();
    }
    Ok(object)
}
