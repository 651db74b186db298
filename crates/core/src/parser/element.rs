use super::helpers::into_text;
use super::Parser;
use crate::ast::Element;
use crate::error::ParseError;
use crate::lexer::TokenKind;
use crate::source::InputStream;

const ELEMENT_START: [TokenKind; 3] = [
    TokenKind::Identifier,
    TokenKind::RoundBracketOpen,
    TokenKind::CurlyBracketOpen,
];

/// A comma closes a childless element; a brace opens its body.
const ELEMENT_BODY: [TokenKind; 2] = [TokenKind::Comma, TokenKind::CurlyBracketOpen];

impl<S: InputStream> Parser<S> {
    // -- Element parsing ----------------------------------------

    /// `[identifier] [attribute-list] (',' | '{' (text-block | element)* '}')`
    pub(super) fn parse_element(&mut self) -> Result<Element, ParseError> {
        self.expect(&ELEMENT_START)?;
        let position = self.peek().position;
        self.enter(position)?;

        let mut element = Element {
            position,
            ..Element::default()
        };
        if self.peek().is(TokenKind::Identifier) {
            element.identifier = into_text(self.advance()?);
        }
        if self.peek().is(TokenKind::RoundBracketOpen) {
            element.attributes = self.parse_attribute_list()?;
        }

        self.expect(&ELEMENT_BODY)?;
        if self.peek().is(TokenKind::Comma) {
            self.advance()?;
        } else {
            self.parse_element_body(&mut element)?;
        }

        self.leave();
        Ok(element)
    }

    fn parse_element_body(&mut self, element: &mut Element) -> Result<(), ParseError> {
        self.advance()?;
        loop {
            match self.peek().kind {
                TokenKind::CurlyBracketClose | TokenKind::EndOfToken => break,
                TokenKind::NowdocString | TokenKind::EmbeddedSourceCode => {
                    let block = self.advance()?;
                    element.text_contents.push(into_text(block));
                    self.skip_optional_comma()?;
                }
                _ => {
                    let child = self.parse_element()?;
                    self.skip_optional_comma()?;
                    element.children.push(child);
                }
            }
        }
        self.expect(&[TokenKind::CurlyBracketClose])?;
        self.advance()?;
        Ok(())
    }
}
