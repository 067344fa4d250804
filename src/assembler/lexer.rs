//! Lexical analysis for operand text
//!
//! By the time a line reaches the lexer the cleaner has already separated the
//! mnemonic or directive from its operand, so the lexer only ever sees operand
//! text such as `#$42`, `(PTR),Y`, `!$0010`, `<TABLE` or `"HELLO",$0D`.
//!
//! Numbers are parsed eagerly: `$42` becomes `HexNumber(0x42)` and `%1010`
//! becomes `BinaryNumber(10)`. Anything that does not fit in 16 bits, or a
//! prefix followed by the wrong kind of digit, is a [`LexError`].
//!
//! # Examples
//!
//! ```
//! use retro6502::assembler::lexer::{tokenize, TokenType};
//!
//! let tokens = tokenize("($40),Y").unwrap();
//! let types: Vec<_> = tokens.into_iter().map(|t| t.token_type).collect();
//! assert_eq!(
//!     types,
//!     vec![
//!         TokenType::LParen,
//!         TokenType::HexNumber(0x40),
//!         TokenType::RParen,
//!         TokenType::Comma,
//!         TokenType::Identifier("Y".to_string()),
//!     ]
//! );
//! ```

use thiserror::Error;

/// Classification of lexical tokens in an operand
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    /// Identifiers: labels, variables, index registers
    Identifier(String),

    /// Decimal number literal (0-65535)
    DecimalNumber(u16),
    /// Hexadecimal number literal with `$` prefix
    HexNumber(u16),
    /// Binary number literal with `%` prefix
    BinaryNumber(u16),

    /// Double-quoted string literal (quotes stripped, case preserved)
    Str(String),

    /// `#` immediate mode prefix
    Hash,
    /// `,` operand separator and index marker
    Comma,
    /// `(` indirect addressing open
    LParen,
    /// `)` indirect addressing close
    RParen,
    /// `<` low byte selector
    Less,
    /// `>` high byte selector
    Greater,
    /// `!` forces the absolute form of an address
    Bang,
}

impl TokenType {
    /// The numeric value of a number token.
    pub fn number(&self) -> Option<u16> {
        match self {
            TokenType::DecimalNumber(v) | TokenType::HexNumber(v) | TokenType::BinaryNumber(v) => {
                Some(*v)
            }
            _ => None,
        }
    }
}

/// A single lexical token with its position in the operand text
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token classification and optional parsed value
    pub token_type: TokenType,

    /// Column offset within the operand (0-indexed)
    pub column: usize,

    /// Character span (for error highlighting)
    pub length: usize,
}

/// Errors detected while scanning operand text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("invalid hex digit '{ch}' at column {column}")]
    InvalidHexDigit { ch: char, column: usize },

    #[error("expected hex digits after '$' at column {column}")]
    MissingHexDigits { column: usize },

    #[error("invalid binary digit '{ch}' at column {column}")]
    InvalidBinaryDigit { ch: char, column: usize },

    #[error("expected binary digits after '%' at column {column}")]
    MissingBinaryDigits { column: usize },

    #[error("invalid decimal digit '{ch}' at column {column}")]
    InvalidDecimalDigit { ch: char, column: usize },

    #[error("number {value} exceeds maximum {max}")]
    NumberTooLarge { value: String, max: u16 },

    #[error("unterminated string starting at column {column}")]
    UnterminatedString { column: usize },

    #[error("unexpected character '{ch}' at column {column}")]
    UnexpectedChar { ch: char, column: usize },
}

impl LexError {
    /// True for malformed numeric literals, as opposed to general syntax errors.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            LexError::InvalidHexDigit { .. }
                | LexError::MissingHexDigits { .. }
                | LexError::InvalidBinaryDigit { .. }
                | LexError::MissingBinaryDigits { .. }
                | LexError::InvalidDecimalDigit { .. }
                | LexError::NumberTooLarge { .. }
        )
    }
}

/// Lexer state for converting operand text into tokens
pub struct Lexer<'a> {
    /// Iterator over (byte_offset, char) pairs
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,

    /// Length of the source, used as the column at end of input
    len: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given operand text
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.char_indices().peekable(),
            len: source.len(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn column(&mut self) -> usize {
        self.chars.peek().map(|&(pos, _)| pos).unwrap_or(self.len)
    }

    fn advance(&mut self) {
        self.chars.next();
    }

    /// Scan an identifier: [A-Za-z_][A-Za-z0-9_]* (uppercase normalized)
    fn scan_identifier(&mut self, start_col: usize) -> Token {
        let mut identifier = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token {
            length: identifier.len(),
            token_type: TokenType::Identifier(identifier.to_ascii_uppercase()),
            column: start_col,
        }
    }

    /// Collect the digits of a prefixed number, rejecting stray alphanumerics.
    fn scan_digits(
        &mut self,
        radix: u32,
        invalid: impl Fn(char, usize) -> LexError,
    ) -> Result<String, LexError> {
        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_digit(radix) {
                digits.push(ch);
                self.advance();
            } else if ch.is_ascii_alphanumeric() {
                return Err(invalid(ch, self.column()));
            } else {
                break;
            }
        }
        Ok(digits)
    }

    /// Scan a hexadecimal number: $[0-9A-Fa-f]+ (the `$` is already consumed)
    fn scan_hex_number(&mut self, start_col: usize) -> Result<Token, LexError> {
        let hex_str =
            self.scan_digits(16, |ch, column| LexError::InvalidHexDigit { ch, column })?;

        if hex_str.is_empty() {
            return Err(LexError::MissingHexDigits {
                column: self.column(),
            });
        }

        let value = u16::from_str_radix(&hex_str, 16).map_err(|_| LexError::NumberTooLarge {
            value: format!("${}", hex_str),
            max: u16::MAX,
        })?;

        Ok(Token {
            token_type: TokenType::HexNumber(value),
            column: start_col,
            length: hex_str.len() + 1,
        })
    }

    /// Scan a binary number: %[01]+ (the `%` is already consumed)
    fn scan_binary_number(&mut self, start_col: usize) -> Result<Token, LexError> {
        let bin_str =
            self.scan_digits(2, |ch, column| LexError::InvalidBinaryDigit { ch, column })?;

        if bin_str.is_empty() {
            return Err(LexError::MissingBinaryDigits {
                column: self.column(),
            });
        }

        let value = u16::from_str_radix(&bin_str, 2).map_err(|_| LexError::NumberTooLarge {
            value: format!("%{}", bin_str),
            max: u16::MAX,
        })?;

        Ok(Token {
            token_type: TokenType::BinaryNumber(value),
            column: start_col,
            length: bin_str.len() + 1,
        })
    }

    /// Scan a decimal number: [0-9]+
    fn scan_decimal_number(&mut self, start_col: usize) -> Result<Token, LexError> {
        let num_str =
            self.scan_digits(10, |ch, column| LexError::InvalidDecimalDigit { ch, column })?;

        let value: u16 = num_str.parse().map_err(|_| LexError::NumberTooLarge {
            value: num_str.clone(),
            max: u16::MAX,
        })?;

        Ok(Token {
            token_type: TokenType::DecimalNumber(value),
            column: start_col,
            length: num_str.len(),
        })
    }

    /// Scan a string literal (the opening quote is already consumed)
    fn scan_string(&mut self, start_col: usize) -> Result<Token, LexError> {
        let mut text = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
                None => return Err(LexError::UnterminatedString { column: start_col }),
            }
        }

        Ok(Token {
            length: text.len() + 2,
            token_type: TokenType::Str(text),
            column: start_col,
        })
    }

    fn single(&mut self, token_type: TokenType, start_col: usize) -> Token {
        self.advance();
        Token {
            token_type,
            column: start_col,
            length: 1,
        }
    }

    /// Get the next token from the source
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        // cleaned operands only keep whitespace inside strings
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }

        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let start_col = self.column();

        let token = match ch {
            '$' => {
                self.advance();
                self.scan_hex_number(start_col)?
            }
            '%' => {
                self.advance();
                self.scan_binary_number(start_col)?
            }
            '"' => {
                self.advance();
                self.scan_string(start_col)?
            }
            '#' => self.single(TokenType::Hash, start_col),
            ',' => self.single(TokenType::Comma, start_col),
            '(' => self.single(TokenType::LParen, start_col),
            ')' => self.single(TokenType::RParen, start_col),
            '<' => self.single(TokenType::Less, start_col),
            '>' => self.single(TokenType::Greater, start_col),
            '!' => self.single(TokenType::Bang, start_col),
            c if c.is_ascii_digit() => self.scan_decimal_number(start_col)?,
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(start_col),
            other => {
                return Err(LexError::UnexpectedChar {
                    ch: other,
                    column: start_col,
                })
            }
        };

        Ok(Some(token))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Tokenize operand text, stopping at the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).collect()
}
