//! Source cleaning, line classification and operand grammar
//!
//! Cleaning turns raw text into logical lines: comments and blank lines are
//! dropped, everything outside string literals is uppercased, a label sharing
//! a line with an instruction is split onto its own line, and whitespace is
//! squeezed so that each statement reads `MNEMONIC OPERAND` with no spaces
//! inside the operand.
//!
//! Classification then turns each logical line into a [`CodeToken`], trying
//! in order: origin, variable, label, instruction, data directive. A line
//! matching none of them becomes [`CodeTokenKind::Error`]; classification
//! never stops early, so every bad line is reported.

use crate::addressing::AddressingMode;
use crate::assembler::lexer::{self, LexError, TokenType};
use crate::assembler::symbol_table::{Labels, Variables};
use crate::assembler::{AssemblerError, ErrorType};
use crate::opcodes::{supports, Mnemonic};

/// A cleaned logical line with the 1-indexed source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub line: usize,
    pub text: String,
}

/// Selects one byte of a 16-bit value (`<value` / `>value`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteSelector {
    Low,
    High,
}

impl ByteSelector {
    pub fn apply(self, value: u16) -> u16 {
        match self {
            ByteSelector::Low => value & 0x00FF,
            ByteSelector::High => value >> 8,
        }
    }
}

/// A literal number or a name still to be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    Number(u16),
    Symbol(String),
}

/// An operand value with its optional byte selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub selector: Option<ByteSelector>,
    pub atom: Atom,
}

/// The syntactic shape of an instruction operand.
///
/// Zero-page versus absolute (and relative for branches) is decided later,
/// once the value is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandSyntax {
    /// No operand, or `A` on an accumulator instruction
    Implied,
    /// `#value`
    Immediate(Value),
    /// `value`
    Direct(Value),
    /// `value,X`
    IndexedX(Value),
    /// `value,Y`
    IndexedY(Value),
    /// `!value`: absolute even when the value fits in zero page
    Absolute(Value),
    /// `!value,X`
    AbsoluteX(Value),
    /// `!value,Y`
    AbsoluteY(Value),
    /// `(value)`
    Indirect(Value),
    /// `(value,X)`
    IndexedIndirect(Value),
    /// `(value),Y`
    IndirectIndexed(Value),
}

impl OperandSyntax {
    /// Addressing modes this shape can encode to, narrowest first.
    pub fn candidate_modes(&self, branch: bool) -> &'static [AddressingMode] {
        match self {
            OperandSyntax::Implied => &[AddressingMode::Implicit],
            OperandSyntax::Immediate(_) => &[AddressingMode::Immediate],
            OperandSyntax::Direct(_) if branch => &[AddressingMode::Relative],
            OperandSyntax::Direct(_) => &[AddressingMode::ZeroPage, AddressingMode::Absolute],
            OperandSyntax::IndexedX(_) => &[AddressingMode::ZeroPageX, AddressingMode::AbsoluteX],
            OperandSyntax::IndexedY(_) => &[AddressingMode::ZeroPageY, AddressingMode::AbsoluteY],
            OperandSyntax::Absolute(_) => &[AddressingMode::Absolute],
            OperandSyntax::AbsoluteX(_) => &[AddressingMode::AbsoluteX],
            OperandSyntax::AbsoluteY(_) => &[AddressingMode::AbsoluteY],
            OperandSyntax::Indirect(_) => &[AddressingMode::Indirect],
            OperandSyntax::IndexedIndirect(_) => &[AddressingMode::IndirectX],
            OperandSyntax::IndirectIndexed(_) => &[AddressingMode::IndirectY],
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            OperandSyntax::Implied => None,
            OperandSyntax::Immediate(v)
            | OperandSyntax::Direct(v)
            | OperandSyntax::IndexedX(v)
            | OperandSyntax::IndexedY(v)
            | OperandSyntax::Absolute(v)
            | OperandSyntax::AbsoluteX(v)
            | OperandSyntax::AbsoluteY(v)
            | OperandSyntax::Indirect(v)
            | OperandSyntax::IndexedIndirect(v)
            | OperandSyntax::IndirectIndexed(v) => Some(v),
        }
    }
}

/// `.BYTE` or `.WORD`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDirective {
    Byte,
    Word,
}

/// One comma-separated item of a data directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataItem {
    /// A string literal, emitted byte by byte
    Text(String),
    Value(Value),
}

/// Classified logical line.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeToken {
    /// 1-indexed source line
    pub line: usize,
    pub kind: CodeTokenKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CodeTokenKind {
    /// `*=value` or `.ORG value`
    Origin(Value),
    /// `NAME=value`; the value text is kept in [`Variables`]
    Variable(String),
    /// `NAME` or `NAME:`
    Label(String),
    Instruction {
        mnemonic: Mnemonic,
        operand: OperandSyntax,
    },
    Data {
        directive: DataDirective,
        items: Vec<DataItem>,
    },
    Error(AssemblerError),
}

// ========== Cleaning ==========

/// Cleans raw source into logical lines.
pub fn clean(source: &str) -> Vec<SourceLine> {
    let mut lines = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let text = uppercase_outside_quotes(strip_comment(raw));
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let (head, rest) = split_head(text);

        // `LABEL:` or `LABEL:LDA #1`
        if let Some(colon) = head.find(':') {
            let label = &head[..colon];
            let after = format!("{} {}", &head[colon + 1..], rest);
            lines.push(SourceLine {
                line,
                text: format!("{}:", label),
            });
            let after = after.trim();
            if !after.is_empty() {
                lines.push(SourceLine {
                    line,
                    text: collapse(after),
                });
            }
            continue;
        }

        // `LABEL LDA #1`
        if !rest.is_empty() && is_identifier(head) && !is_mnemonic(head) && starts_statement(rest)
        {
            lines.push(SourceLine {
                line,
                text: head.to_string(),
            });
            lines.push(SourceLine {
                line,
                text: collapse(rest),
            });
            continue;
        }

        lines.push(SourceLine {
            line,
            text: collapse(text),
        });
    }

    lines
}

fn strip_comment(raw: &str) -> &str {
    let mut in_quotes = false;
    for (idx, ch) in raw.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return &raw[..idx],
            _ => {}
        }
    }
    raw
}

fn uppercase_outside_quotes(text: &str) -> String {
    let mut in_quotes = false;
    text.chars()
        .map(|ch| {
            if ch == '"' {
                in_quotes = !in_quotes;
            }
            if in_quotes {
                ch
            } else {
                ch.to_ascii_uppercase()
            }
        })
        .collect()
}

fn squeeze_outside_quotes(text: &str) -> String {
    let mut in_quotes = false;
    text.chars()
        .filter(|ch| {
            if *ch == '"' {
                in_quotes = !in_quotes;
            }
            in_quotes || !ch.is_whitespace()
        })
        .collect()
}

/// First whitespace-delimited word and the trimmed remainder.
fn split_head(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim_start()),
        None => (text, ""),
    }
}

/// Normalizes one statement to `HEAD OPERAND`, or `HEAD=VALUE` for assignments.
fn collapse(statement: &str) -> String {
    let (head, rest) = split_head(statement);
    if rest.is_empty() {
        return head.to_string();
    }
    let operand = squeeze_outside_quotes(rest);
    if head.contains('=') || operand.starts_with('=') {
        format!("{}{}", head, operand)
    } else {
        format!("{} {}", head, operand)
    }
}

fn starts_statement(text: &str) -> bool {
    let (head, _) = split_head(text);
    is_mnemonic(head) || head.starts_with('.')
}

fn is_mnemonic(word: &str) -> bool {
    word.parse::<Mnemonic>().is_ok()
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Checks a label or variable name: a letter or underscore, then letters,
/// digits or underscores. Length is unbounded.
pub(crate) fn validate_label(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("label name cannot be empty".to_string());
    }

    if !is_identifier(name) {
        return Err(format!(
            "invalid label name '{}' (only letters, digits, and underscores allowed, not starting with a digit)",
            name
        ));
    }

    Ok(())
}

// ========== Classification ==========

/// Classifies every cleaned line, declaring labels and recording variables.
pub fn tokenize(lines: &[SourceLine], labels: &mut Labels, variables: &mut Variables) -> Vec<CodeToken> {
    lines
        .iter()
        .map(|source| {
            let kind = classify(&source.text, source.line, labels, variables)
                .unwrap_or_else(CodeTokenKind::Error);
            CodeToken {
                line: source.line,
                kind,
            }
        })
        .collect()
}

fn classify(
    text: &str,
    line: usize,
    labels: &mut Labels,
    variables: &mut Variables,
) -> Result<CodeTokenKind, AssemblerError> {
    // origin
    if let Some(value) = text
        .strip_prefix("*=")
        .or_else(|| text.strip_prefix(".ORG "))
    {
        return Ok(CodeTokenKind::Origin(parse_value(value, line)?));
    }

    // variable
    if let Some((name, value)) = text.split_once('=') {
        if is_identifier(name) {
            return define_variable(name, value, line, labels, variables);
        }
    }

    // label
    let bare = text.strip_suffix(':');
    let candidate = bare.unwrap_or(text);
    if is_identifier(candidate) {
        if is_mnemonic(candidate) {
            if bare.is_some() {
                return Err(AssemblerError::new(
                    ErrorType::ReservedName,
                    line,
                    format!("'{}' is an instruction and cannot be used as a label", candidate),
                ));
            }
        } else {
            return declare_label(candidate, line, labels, variables);
        }
    }

    let (head, operand) = split_head(text);

    // instruction, implied or with operand
    if let Ok(mnemonic) = head.parse::<Mnemonic>() {
        let operand = parse_operand(mnemonic, operand, line)?;
        check_modes(mnemonic, &operand, line)?;
        return Ok(CodeTokenKind::Instruction { mnemonic, operand });
    }

    // data directive
    if head.starts_with('.') {
        let directive = match head {
            ".BYTE" | ".DB" => DataDirective::Byte,
            ".WORD" | ".DW" => DataDirective::Word,
            _ => {
                return Err(AssemblerError::new(
                    ErrorType::InvalidDirective,
                    line,
                    format!("unknown directive '{}'", head),
                ))
            }
        };
        if operand.is_empty() {
            return Err(AssemblerError::new(
                ErrorType::InvalidDirective,
                line,
                format!("{} needs at least one value", head),
            ));
        }
        let items = parse_data(operand, line)?;
        return Ok(CodeTokenKind::Data { directive, items });
    }

    let message = if is_identifier(head) {
        format!("unknown instruction '{}'", head)
    } else {
        format!("cannot parse '{}'", text)
    };
    Err(AssemblerError::new(ErrorType::SyntaxError, line, message))
}

fn define_variable(
    name: &str,
    value: &str,
    line: usize,
    labels: &Labels,
    variables: &mut Variables,
) -> Result<CodeTokenKind, AssemblerError> {
    if is_mnemonic(name) {
        return Err(AssemblerError::new(
            ErrorType::ReservedName,
            line,
            format!("'{}' is an instruction and cannot be used as a variable", name),
        ));
    }
    if value.is_empty() {
        return Err(AssemblerError::new(
            ErrorType::SyntaxError,
            line,
            format!("variable '{}' has no value", name),
        ));
    }
    parse_value(value, line)?;

    if labels.contains(name) {
        return Err(AssemblerError::new(
            ErrorType::DuplicateVariable,
            line,
            format!("'{}' is already defined as a label", name),
        ));
    }
    variables.define(name, value, line).map_err(|previous| {
        AssemblerError::new(
            ErrorType::DuplicateVariable,
            line,
            format!("variable '{}' already defined on line {}", name, previous),
        )
    })?;

    Ok(CodeTokenKind::Variable(name.to_string()))
}

fn declare_label(
    name: &str,
    line: usize,
    labels: &mut Labels,
    variables: &Variables,
) -> Result<CodeTokenKind, AssemblerError> {
    validate_label(name).map_err(|message| AssemblerError::new(ErrorType::SyntaxError, line, message))?;

    if variables.contains(name) {
        return Err(AssemblerError::new(
            ErrorType::DuplicateLabel,
            line,
            format!("'{}' is already defined as a variable", name),
        ));
    }
    labels.declare(name, line).map_err(|previous| {
        AssemblerError::new(
            ErrorType::DuplicateLabel,
            line,
            format!("label '{}' already defined on line {}", name, previous),
        )
    })?;

    Ok(CodeTokenKind::Label(name.to_string()))
}

fn check_modes(mnemonic: Mnemonic, operand: &OperandSyntax, line: usize) -> Result<(), AssemblerError> {
    let modes = operand.candidate_modes(mnemonic.is_branch());
    if modes.iter().any(|&mode| supports(mnemonic, mode)) {
        Ok(())
    } else {
        Err(AssemblerError::new(
            ErrorType::InvalidAddressingMode,
            line,
            format!("{} does not support {} addressing", mnemonic, modes[0]),
        ))
    }
}

// ========== Operand grammar ==========

fn lex_error(err: LexError, line: usize) -> AssemblerError {
    let error_type = if err.is_numeric() {
        ErrorType::NumericParse
    } else {
        ErrorType::SyntaxError
    };
    AssemblerError::new(error_type, line, err.to_string())
}

fn lex(text: &str, line: usize) -> Result<Vec<TokenType>, AssemblerError> {
    let tokens = lexer::tokenize(text).map_err(|err| lex_error(err, line))?;
    Ok(tokens.into_iter().map(|t| t.token_type).collect())
}

fn value_from_tokens(tokens: &[TokenType], text: &str, line: usize) -> Result<Value, AssemblerError> {
    let (selector, atom) = match tokens {
        [TokenType::Less, atom] => (Some(ByteSelector::Low), atom),
        [TokenType::Greater, atom] => (Some(ByteSelector::High), atom),
        [atom] => (None, atom),
        _ => {
            return Err(AssemblerError::new(
                ErrorType::SyntaxError,
                line,
                format!("malformed operand '{}'", text),
            ))
        }
    };

    let atom = match atom {
        TokenType::Identifier(name) => Atom::Symbol(name.clone()),
        other => match other.number() {
            Some(n) => Atom::Number(n),
            None => {
                return Err(AssemblerError::new(
                    ErrorType::SyntaxError,
                    line,
                    format!("expected a number or name in '{}'", text),
                ))
            }
        },
    };

    Ok(Value { selector, atom })
}

/// Parses a single value: number, name, optionally prefixed by `<` or `>`.
pub fn parse_value(text: &str, line: usize) -> Result<Value, AssemblerError> {
    let tokens = lex(text, line)?;
    value_from_tokens(&tokens, text, line)
}

/// Parses an instruction operand into its syntactic shape.
pub fn parse_operand(mnemonic: Mnemonic, text: &str, line: usize) -> Result<OperandSyntax, AssemblerError> {
    use TokenType::{Bang, Comma, Hash, Identifier, LParen, RParen};

    let tokens = lex(text, line)?;
    let value = |inner: &[TokenType]| value_from_tokens(inner, text, line);

    let operand = match tokens.as_slice() {
        [] => OperandSyntax::Implied,
        [Bang, inner @ .., Comma, Identifier(x)] if x == "X" => {
            OperandSyntax::AbsoluteX(value(inner)?)
        }
        [Bang, inner @ .., Comma, Identifier(y)] if y == "Y" => {
            OperandSyntax::AbsoluteY(value(inner)?)
        }
        [Bang, rest @ ..] => OperandSyntax::Absolute(value(rest)?),
        [Identifier(a)] if a == "A" && supports(mnemonic, AddressingMode::Implicit) => {
            OperandSyntax::Implied
        }
        [Hash, rest @ ..] => OperandSyntax::Immediate(value(rest)?),
        [LParen, inner @ .., Comma, Identifier(x), RParen] if x == "X" => {
            OperandSyntax::IndexedIndirect(value(inner)?)
        }
        [LParen, inner @ .., RParen, Comma, Identifier(y)] if y == "Y" => {
            OperandSyntax::IndirectIndexed(value(inner)?)
        }
        [LParen, inner @ .., RParen] => OperandSyntax::Indirect(value(inner)?),
        [inner @ .., Comma, Identifier(x)] if x == "X" => OperandSyntax::IndexedX(value(inner)?),
        [inner @ .., Comma, Identifier(y)] if y == "Y" => OperandSyntax::IndexedY(value(inner)?),
        rest => OperandSyntax::Direct(value(rest)?),
    };

    Ok(operand)
}

/// Parses the comma-separated items of a data directive.
pub fn parse_data(text: &str, line: usize) -> Result<Vec<DataItem>, AssemblerError> {
    let tokens = lex(text, line)?;
    tokens
        .split(|t| *t == TokenType::Comma)
        .map(|item| match item {
            [TokenType::Str(s)] => Ok(DataItem::Text(s.clone())),
            other => value_from_tokens(other, text, line).map(DataItem::Value),
        })
        .collect()
}

/// Parse a number from a string (supports hex $XX, decimal, binary %XXXXXXXX)
pub fn parse_number(s: &str) -> Result<u16, String> {
    match lexer::tokenize(s.trim()) {
        Ok(tokens) => match tokens.as_slice() {
            [token] => token
                .token_type
                .number()
                .ok_or_else(|| format!("'{}' is not a number", s)),
            [] => Err("empty number string".to_string()),
            _ => Err(format!("'{}' is not a single number", s)),
        },
        Err(err) => Err(err.to_string()),
    }
}
