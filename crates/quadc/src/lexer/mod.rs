mod token;


pub use token::{SpecificKind, Token, TokenKind};

const TYPE_KEYWORDS: [&str; 10] = [
    "int", "long", "float", "double", "bool", "boolean", "char", "byte", "short", "void",
];

const RESERVED_WORDS: [&str; 7] = ["if", "else", "while", "do", "break", "true", "false"];

/// Scans a whole source text into tokens. The scanner never fails: anything
/// it cannot classify becomes a `TokenKind::Error` token and the parser
/// decides how to recover. The stream always ends with a single EOF token.
pub fn tokenize(source: &str) -> Vec<Token> {
    Scanner::new(source).run()
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
}

impl Scanner {
    fn new(source: &str) -> Scanner {
        Scanner {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn run(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn next_token(&mut self) -> Token {
        if let Some(err) = self.skip_trivia() {
            return err;
        }
        let (line, col) = (self.line, self.col);
        let c = match self.bump() {
            Some(c) => c,
            None => return Token::eof(line, col),
        };

        if c == '"' {
            return self.read_quoted(c, TokenKind::StringLit, line, col);
        }
        if c == '\'' {
            return self.read_quoted(c, TokenKind::CharLit, line, col);
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return self.read_word(c, line, col);
        }
        if c.is_ascii_digit() {
            return self.read_number(c, line, col);
        }
        self.read_operator_or_delimiter(c, line, col)
    }

    // Consumes whitespace and comments. Returns an error token only for an
    // unterminated block comment, positioned at the comment opener.
    fn skip_trivia(&mut self) -> Option<Token> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let (line, col) = (self.line, self.col);
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Some(Token::new(TokenKind::Error, "/*", line, col));
                    }
                }
                _ => return None,
            }
        }
    }

    fn read_word(&mut self, first: char, line: u32, col: u32) -> Token {
        let mut lexeme = String::from(first);
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let kind = if TYPE_KEYWORDS.contains(&lexeme.as_str()) {
            TokenKind::Type
        } else if RESERVED_WORDS.contains(&lexeme.as_str()) {
            TokenKind::Reserved
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, lexeme, line, col)
    }

    fn read_number(&mut self, first: char, line: u32, col: u32) -> Token {
        let mut lexeme = String::from(first);
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.bump();
            } else if c == '.' && !is_float && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) {
                is_float = true;
                lexeme.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let kind = if is_float {
            TokenKind::Float
        } else {
            TokenKind::Integer
        };
        Token::new(kind, lexeme, line, col)
    }

    fn read_quoted(&mut self, quote: char, kind: TokenKind, line: u32, col: u32) -> Token {
        let mut lexeme = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Token::new(TokenKind::Error, format!("{quote}{lexeme}"), line, col)
                }
                Some(c) if c == quote => return Token::new(kind, lexeme, line, col),
                Some('\\') => match self.bump() {
                    Some('n') => lexeme.push('\n'),
                    Some('t') => lexeme.push('\t'),
                    Some('\\') => lexeme.push('\\'),
                    Some(c) if c == quote => lexeme.push(c),
                    Some(c) => lexeme.push(c),
                    None => {
                        return Token::new(TokenKind::Error, format!("{quote}{lexeme}"), line, col)
                    }
                },
                Some(c) => lexeme.push(c),
            }
        }
    }

    fn read_operator_or_delimiter(&mut self, first: char, line: u32, col: u32) -> Token {
        // Maximal munch over the two-character operators first.
        if let Some(second) = self.peek() {
            let pair: String = [first, second].iter().collect();
            if matches!(pair.as_str(), "||" | "&&" | "==" | "!=" | "<=" | ">=") {
                self.bump();
                return Token::new(TokenKind::Operator, pair, line, col);
            }
        }
        match first {
            '=' | '<' | '>' | '+' | '-' | '*' | '/' | '!' => {
                Token::new(TokenKind::Operator, first.to_string(), line, col)
            }
            '{' | '}' | ';' | '[' | ']' | '(' | ')' => {
                Token::new(TokenKind::Delimiter, first.to_string(), line, col)
            }
            other => Token::new(TokenKind::Error, other.to_string(), line, col),
        }
    }
}
