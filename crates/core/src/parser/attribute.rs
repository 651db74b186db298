use super::helpers::into_text;
use super::Parser;
use crate::ast::{Attribute, AttributeList, Value};
use crate::error::ParseError;
use crate::lexer::TokenKind;
use crate::source::InputStream;

/// What may follow an attribute name: a value assignment, the next
/// attribute, a separator, or the end of the list.
const AFTER_NAME: [TokenKind; 4] = [
    TokenKind::Equal,
    TokenKind::Identifier,
    TokenKind::Comma,
    TokenKind::RoundBracketClose,
];

impl<S: InputStream> Parser<S> {
    // -- Attribute parsing --------------------------------------

    pub(super) fn parse_attribute(&mut self) -> Result<Attribute, ParseError> {
        self.expect(&[TokenKind::Identifier])?;
        let name_token = self.advance()?;
        let position = name_token.position;
        let name = into_text(name_token);

        self.expect(&AFTER_NAME)?;
        let value = if self.peek().is(TokenKind::Equal) {
            self.advance()?;
            self.parse_value()?
        } else {
            Value::Boolean(true)
        };

        Ok(Attribute {
            name,
            value,
            position,
        })
    }

    pub(super) fn parse_attribute_list(&mut self) -> Result<AttributeList, ParseError> {
        self.expect(&[TokenKind::RoundBracketOpen])?;
        self.advance()?;

        let mut attributes = AttributeList::new();
        while !matches!(
            self.peek().kind,
            TokenKind::RoundBracketClose | TokenKind::EndOfToken
        ) {
            let attribute = self.parse_attribute()?;
            self.skip_optional_comma()?;
            attributes.push(attribute);
        }

        self.expect(&[TokenKind::RoundBracketClose])?;
        self.advance()?;
        Ok(attributes)
    }
}
