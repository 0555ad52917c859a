use crate::lexer::{SpecificKind, Token, TokenKind};

use super::grammar::Terminal;

/// What a token looks like to the parse tables: a grammar terminal, end of
/// input, or something the grammar has no use for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Terminal(Terminal),
    Eof,
    Error,
}

/// The single site that maps lexer output onto grammar terminals. Pure in
/// `(kind, specific, lexeme)`; a lexer change touches exactly this table.
pub fn classify(token: &Token) -> TokenClass {
    match token.kind {
        TokenKind::Eof => TokenClass::Eof,
        TokenKind::Error => TokenClass::Error,
        TokenKind::Identifier => TokenClass::Terminal(Terminal::Id),
        TokenKind::Integer => TokenClass::Terminal(Terminal::Num),
        TokenKind::Float => TokenClass::Terminal(Terminal::Real),
        // The grammar has no string or character expressions.
        TokenKind::StringLit | TokenKind::CharLit => TokenClass::Error,
        TokenKind::Type => match token.specific {
            SpecificKind::TypeInt
            | SpecificKind::TypeLong
            | SpecificKind::TypeFloat
            | SpecificKind::TypeDouble
            | SpecificKind::TypeBool
            | SpecificKind::TypeBoolean
            | SpecificKind::TypeChar
            | SpecificKind::TypeByte
            | SpecificKind::TypeShort => TokenClass::Terminal(Terminal::Basic),
            _ => TokenClass::Error,
        },
        TokenKind::Reserved => match token.lexeme.as_str() {
            "if" => TokenClass::Terminal(Terminal::If),
            "else" => TokenClass::Terminal(Terminal::Else),
            "while" => TokenClass::Terminal(Terminal::While),
            "do" => TokenClass::Terminal(Terminal::Do),
            "break" => TokenClass::Terminal(Terminal::Break),
            "true" => TokenClass::Terminal(Terminal::True),
            "false" => TokenClass::Terminal(Terminal::False),
            _ => TokenClass::Error,
        },
        TokenKind::Operator => match token.lexeme.as_str() {
            "=" => TokenClass::Terminal(Terminal::Assign),
            "||" => TokenClass::Terminal(Terminal::OrOr),
            "&&" => TokenClass::Terminal(Terminal::AndAnd),
            "==" => TokenClass::Terminal(Terminal::EqEq),
            "!=" => TokenClass::Terminal(Terminal::Ne),
            "<" => TokenClass::Terminal(Terminal::Lt),
            "<=" => TokenClass::Terminal(Terminal::Le),
            ">" => TokenClass::Terminal(Terminal::Gt),
            ">=" => TokenClass::Terminal(Terminal::Ge),
            "+" => TokenClass::Terminal(Terminal::Plus),
            "-" => TokenClass::Terminal(Terminal::Minus),
            "*" => TokenClass::Terminal(Terminal::Star),
            "/" => TokenClass::Terminal(Terminal::Slash),
            "!" => TokenClass::Terminal(Terminal::Not),
            _ => TokenClass::Error,
        },
        TokenKind::Delimiter => match token.lexeme.as_str() {
            "{" => TokenClass::Terminal(Terminal::LBrace),
            "}" => TokenClass::Terminal(Terminal::RBrace),
            ";" => TokenClass::Terminal(Terminal::Semi),
            "[" => TokenClass::Terminal(Terminal::LBracket),
            "]" => TokenClass::Terminal(Terminal::RBracket),
            "(" => TokenClass::Terminal(Terminal::LParen),
            ")" => TokenClass::Terminal(Terminal::RParen),
            _ => TokenClass::Error,
        },
    }
}
