//! 6502 Assembler Module
//!
//! Converts assembly language source code into machine code in two passes.
//!
//! 1. **Clean and classify** ([`parser`]): comments and blank lines go, every
//!    remaining line becomes a [`CodeToken`]. Labels are declared and variables
//!    recorded here. Every malformed line is reported, not just the first.
//! 2. **Resolve** ([`encoder`]): a running program counter (default `$0800`)
//!    gives labels their addresses and instructions their bytes. References to
//!    labels further down are emitted as placeholders.
//! 3. **Backpatch**: placeholders are filled from the finished label table.
//! 4. **Compose**: bytes are laid into sparse 16-byte [`CodePages`].
//!
//! # Syntax
//!
//! ```text
//!         *=$0800          ; origin (also .ORG $0800)
//! COUNT   = 10             ; variable, substituted on use
//! START   LDX #COUNT       ; label sharing a line with an instruction
//! LOOP:   DEX
//!         BNE LOOP         ; branch, relative offset computed
//!         LDA #<MSG        ; low byte of an address
//!         JMP DONE         ; forward reference
//! MSG     .BYTE "HI",$0D
//! DONE    BRK
//! ```
//!
//! Numbers are `$hex`, `%binary` or decimal. Operands that resolve to `$FF` or
//! less use zero-page encodings when the instruction has one.

pub mod encoder;
pub mod lexer;
mod pages;
pub mod parser;
pub mod source_map;
pub mod symbol_table;

pub use encoder::InstructionToken;
pub use pages::CodePages;
pub use parser::{CodeToken, CodeTokenKind};
pub use source_map::SourceMap;

use crate::cpu::RESET_VECTOR;
use crate::MemoryBus;
use encoder::Resolver;
use symbol_table::{Labels, Variables};
use thiserror::Error;

/// Origin used until the source sets one with `*=` or `.ORG`.
pub const DEFAULT_ORIGIN: u16 = 0x0800;

/// Complete output from assembling source code
#[derive(Debug, Clone)]
pub struct AssemblerOutput {
    /// Assembled bytes, laid out by address
    pub pages: CodePages,

    /// Resolved labels, sorted by name
    pub symbols: Vec<Symbol>,

    /// Encoded instructions and data items in source order
    pub tokens: Vec<InstructionToken>,

    /// Source map for tracing
    pub source_map: SourceMap,
}

impl AssemblerOutput {
    /// Address of the first emitted byte in source order.
    pub fn entry_point(&self) -> Option<u16> {
        self.tokens
            .iter()
            .find(|token| !token.bytes.is_empty())
            .map(|token| token.pc)
    }

    /// Looks up a label's address.
    pub fn symbol(&self, name: &str) -> Option<u16> {
        self.symbols
            .binary_search_by(|s| s.name.as_str().cmp(name))
            .ok()
            .map(|idx| self.symbols[idx].address)
    }
}

/// A symbol table entry mapping a label to an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Label name (uppercase after cleaning)
    pub name: String,

    /// Resolved memory address for this label
    pub address: u16,

    /// Source line where label was defined
    pub defined_at: usize,
}

/// An error encountered during assembly
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct AssemblerError {
    /// Error type classification
    pub error_type: ErrorType,

    /// Line number where error occurred (1-indexed)
    pub line: usize,

    /// Human-readable error message
    pub message: String,
}

impl AssemblerError {
    pub fn new(error_type: ErrorType, line: usize, message: String) -> Self {
        Self {
            error_type,
            line,
            message,
        }
    }
}

/// Classification of assembly errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Line matches no statement form, or an operand is malformed
    SyntaxError,

    /// Duplicate label definition
    DuplicateLabel,

    /// Duplicate variable definition
    DuplicateVariable,

    /// Reference to a label that is never defined
    UndefinedLabel,

    /// An instruction mnemonic used as a label or variable name
    ReservedName,

    /// Variables that refer to each other in a loop
    CircularVariable,

    /// Malformed hex, binary or decimal literal
    NumericParse,

    /// Instruction does not have the requested addressing mode
    InvalidAddressingMode,

    /// Operand value out of range (e.g., immediate value > 255, branch too far)
    RangeError,

    /// Invalid directive usage
    InvalidDirective,
}

impl ErrorType {
    /// True for errors about names: duplicates, undefined references,
    /// reserved words and circular variables.
    pub fn is_symbol_error(self) -> bool {
        matches!(
            self,
            ErrorType::DuplicateLabel
                | ErrorType::DuplicateVariable
                | ErrorType::UndefinedLabel
                | ErrorType::ReservedName
                | ErrorType::CircularVariable
        )
    }
}

/// Assemble source code into machine code
///
/// Classification problems are all reported together; the later passes stop
/// at their first error.
///
/// # Examples
///
/// ```
/// use retro6502::assemble;
///
/// let output = assemble("LDA #$01\nSTA $0200").unwrap();
/// assert_eq!(output.pages.get(0x0800), Some(0xA9));
/// assert_eq!(output.pages.get(0x0802), Some(0x8D));
///
/// let errors = assemble("LDQ #1\nFOO BAR BAZ").unwrap_err();
/// assert_eq!(errors.len(), 2);
/// ```
pub fn assemble(source: &str) -> Result<AssemblerOutput, Vec<AssemblerError>> {
    let mut labels = Labels::new();
    let mut variables = Variables::new();

    let lines = parser::clean(source);
    let code_tokens = parser::tokenize(&lines, &mut labels, &mut variables);

    let errors: Vec<AssemblerError> = code_tokens
        .iter()
        .filter_map(|token| match &token.kind {
            CodeTokenKind::Error(err) => Some(err.clone()),
            _ => None,
        })
        .collect();
    if !errors.is_empty() {
        log::debug!("assembly failed: {} line(s) rejected", errors.len());
        return Err(errors);
    }

    let mut tokens = Resolver::new(&mut labels, &variables, DEFAULT_ORIGIN)
        .resolve(&code_tokens)
        .map_err(|err| vec![err])?;
    let pending = tokens.iter().filter(|t| t.is_pending()).count();
    encoder::backpatch(&mut tokens, &labels).map_err(|err| vec![err])?;

    let mut pages = CodePages::new();
    let mut source_map = SourceMap::new();
    for token in &tokens {
        pages.extend(token.pc, &token.bytes);
        source_map.add_mapping(token.pc, token.bytes.len() as u16, token.line);
    }
    source_map.finalize();

    log::debug!(
        "assembled {} line(s) into {} byte(s), {} backpatched",
        lines.len(),
        pages.len(),
        pending
    );

    Ok(AssemblerOutput {
        pages,
        symbols: labels.symbols(),
        tokens,
        source_map,
    })
}

/// Assembles `source` and writes the result into `memory`.
///
/// The reset vector is pointed at the first assembled byte unless the program
/// writes `$FFFC` or `$FFFD` itself.
///
/// ```
/// use retro6502::{assembler, FlatMemory};
///
/// let mut memory = FlatMemory::new();
/// assembler::load("*=$0300\nNOP", &mut memory).unwrap();
/// assert_eq!(memory.peek(0x0300), 0xEA);
/// assert_eq!((memory.peek(0xFFFC), memory.peek(0xFFFD)), (0x00, 0x03));
/// ```
pub fn load<M: MemoryBus>(
    source: &str,
    memory: &mut M,
) -> Result<AssemblerOutput, Vec<AssemblerError>> {
    let output = assemble(source)?;

    for (addr, byte) in output.pages.iter() {
        memory.write(addr, byte);
    }

    let sets_vector =
        output.pages.contains(RESET_VECTOR) || output.pages.contains(RESET_VECTOR + 1);
    if !sets_vector {
        if let Some(entry) = output.entry_point() {
            let [lo, hi] = entry.to_le_bytes();
            memory.write(RESET_VECTOR, lo);
            memory.write(RESET_VECTOR + 1, hi);
        }
    }

    Ok(output)
}
