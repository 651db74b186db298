/// Recursive-descent parser for treedoc documents.
/// One token of lookahead drives every branch; there is no backtracking and
/// no error recovery. The first violation aborts the parse.
use std::path::Path;

use crate::ast::{Attribute, AttributeList, Element, Value};
use crate::error::ParseError;
use crate::lexer::{Lexer, Position, Token, TokenKind};
use crate::source::{FileInputStream, InputStream, StringInputStream};

mod attribute;
mod element;
pub mod helpers;
mod value;

use helpers::ErrorClass;

/// Default maximum nesting depth of elements and arrays.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Elements within elements and arrays within arrays each add a level.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

pub struct Parser<S> {
    lexer: Lexer<S>,
    current: Token,
    depth: usize,
    options: ParseOptions,
}

impl<S: InputStream> Parser<S> {
    /// Create a parser positioned on the first significant token.
    pub fn new(stream: S, options: ParseOptions) -> Result<Self, ParseError> {
        let mut parser = Parser {
            lexer: Lexer::new(stream),
            current: Token::start(),
            depth: 0,
            options,
        };
        parser.advance()?;
        Ok(parser)
    }

    pub fn peek(&self) -> &Token {
        &self.current
    }

    /// Move to the next significant token, returning the one left behind.
    pub fn advance(&mut self) -> Result<Token, ParseError> {
        let next = helpers::next_significant_token(&mut self.lexer)?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn expect(&self, allowed: &[TokenKind]) -> Result<(), ParseError> {
        self.expect_as(allowed, ErrorClass::Token)
    }

    fn expect_as(&self, allowed: &[TokenKind], class: ErrorClass) -> Result<(), ParseError> {
        helpers::expect_one_of(&self.current, allowed, class)
    }

    fn skip_optional_comma(&mut self) -> Result<(), ParseError> {
        let current = std::mem::replace(&mut self.current, Token::start());
        self.current = helpers::skip_optional_comma(&mut self.lexer, current)?;
        Ok(())
    }

    fn enter(&mut self, position: Position) -> Result<(), ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.options.max_depth,
                position,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Parse the root element and require the input to end after it.
    pub fn parse_document(&mut self) -> Result<Element, ParseError> {
        let root = self.parse_element()?;
        self.expect(&[TokenKind::EndOfToken])?;
        Ok(root)
    }
}

// ──────────────────────────────────────────────
// Entry points
// ──────────────────────────────────────────────

pub fn parse_document<S: InputStream>(stream: S) -> Result<Element, ParseError> {
    parse_document_with(stream, ParseOptions::default())
}

pub fn parse_document_with<S: InputStream>(
    stream: S,
    options: ParseOptions,
) -> Result<Element, ParseError> {
    tracing::debug!(max_depth = options.max_depth, "parsing document");
    let mut parser = Parser::new(stream, options)?;
    let root = parser.parse_document()?;
    tracing::debug!(
        identifier = %root.identifier,
        children = root.children.len(),
        "parsed document"
    );
    Ok(root)
}

pub fn parse_str(src: &str) -> Result<Element, ParseError> {
    parse_document(StringInputStream::new(src))
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<Element, ParseError> {
    parse_document(FileInputStream::open(path)?)
}

fn parse_with<S, T>(
    stream: S,
    rule: impl FnOnce(&mut Parser<S>) -> Result<T, ParseError>,
) -> Result<T, ParseError>
where
    S: InputStream,
{
    let mut parser = Parser::new(stream, ParseOptions::default())?;
    rule(&mut parser)
}

/// Parse a single element; input after it is left unread.
pub fn parse_element<S: InputStream>(stream: S) -> Result<Element, ParseError> {
    parse_with(stream, Parser::parse_element)
}

/// Parse a parenthesized attribute list; input after it is left unread.
pub fn parse_attribute_list<S: InputStream>(stream: S) -> Result<AttributeList, ParseError> {
    parse_with(stream, Parser::parse_attribute_list)
}

/// Parse one `name` or `name = value` pair; input after it is left unread.
pub fn parse_attribute<S: InputStream>(stream: S) -> Result<Attribute, ParseError> {
    parse_with(stream, Parser::parse_attribute)
}

/// Parse one attribute value; input after it is left unread.
pub fn parse_value<S: InputStream>(stream: S) -> Result<Value, ParseError> {
    parse_with(stream, Parser::parse_value)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
