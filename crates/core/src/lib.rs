#![allow(clippy::result_large_err)]
//! treedoc-core: lexer, parser and tree model for treedoc documents.
//!
//! A treedoc document is a tree of named, attributed elements:
//!
//! ```text
//! model (name = "user", table = users, timestamps) {
//!     """ Registered customers. """
//!     field (name = "email", type = STRING, rules = ["required", "email"]),
//! }
//! ```
//!
//! # Public API
//!
//! - [`parse_document()`] / [`parse_str()`] / [`parse_file()`] -- parse a
//!   whole document into an [`Element`] tree
//! - [`Element::flatten()`] / [`Element::to_json_value()`] -- the generic
//!   projection handed to generators
//! - [`Lexer`] and [`tokenize()`] -- raw token access, comments included
//! - [`InputStream`] with [`StringInputStream`] and [`FileInputStream`]
//! - [`ParseError`] -- every failure, with line/column

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod source;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Attribute, AttributeList, Element, FlatElement, Value};
pub use error::{ErrorKind, ParseError};
pub use lexer::{tokenize, Lexer, Number, Payload, Position, Token, TokenKind};
pub use parser::{ParseOptions, Parser, DEFAULT_MAX_DEPTH};
pub use source::{FileInputStream, InputStream, ReaderInputStream, StringInputStream, CHUNK_SIZE};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use parser::{
    parse_attribute, parse_attribute_list, parse_document, parse_document_with, parse_element,
    parse_file, parse_str, parse_value,
};
