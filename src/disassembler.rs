//! 6502 Disassembler Module
//!
//! Converts binary machine code into human-readable assembly mnemonics.
//!
//! Decoding walks forward from the start address. A byte that is not a
//! documented opcode, or an opcode whose operand bytes are cut off by the end
//! of the input, becomes a one-byte `.BYTE $nn` token and decoding resumes at
//! the next byte.

pub mod decoder;
pub mod formatter;

use std::fmt;

use crate::assembler::CodePages;
use crate::opcodes::OpcodeMetadata;
use crate::MemoryBus;

/// A single disassembled instruction or data byte
#[derive(Debug, Clone, PartialEq)]
pub struct DisassemblyToken {
    /// Memory address where this token starts
    pub address: u16,

    /// Raw bytes, opcode included
    pub bytes: Vec<u8>,

    /// Opcode metadata, `None` for `.BYTE` tokens
    pub metadata: Option<OpcodeMetadata>,

    /// Mnemonic text (`LDA`) or `.BYTE`
    pub mnemonic: String,

    /// Formatted operand, empty for implied instructions
    pub operand: String,

    /// One-line description
    pub description: String,
}

impl DisassemblyToken {
    /// Assembly text, e.g. `LDA #$05` or `.BYTE $02`.
    pub fn text(&self) -> String {
        if self.operand.is_empty() {
            self.mnemonic.clone()
        } else {
            format!("{} {}", self.mnemonic, self.operand)
        }
    }

    pub fn is_data(&self) -> bool {
        self.metadata.is_none()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for DisassemblyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&formatter::format_line(self))
    }
}

/// Disassemble a byte slice whose first byte sits at `start`
///
/// # Examples
///
/// ```
/// use retro6502::disassemble;
///
/// let tokens = disassemble(&[0xA9, 0x05, 0x02, 0x8D, 0x00], 0x0800);
/// let text: Vec<String> = tokens.iter().map(|t| t.text()).collect();
/// assert_eq!(text, vec!["LDA #$05", ".BYTE $02", ".BYTE $8D", "BRK"]);
/// assert_eq!(
///     tokens[0].to_string(),
///     "$0800   A9 05      LDA #$05   ; load accumulator"
/// );
/// ```
pub fn disassemble(bytes: &[u8], start: u16) -> Vec<DisassemblyToken> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    let mut address = start;

    while offset < bytes.len() {
        let token = match decoder::decode_instruction(&bytes[offset..], address) {
            Some(token) => token,
            None => {
                let byte = bytes[offset];
                let description = if crate::opcodes::decode(byte).is_some() {
                    "incomplete instruction"
                } else {
                    "undefined opcode"
                };
                decoder::data_byte(byte, address, description)
            }
        };

        offset += token.len();
        address = address.wrapping_add(token.len() as u16);
        tokens.push(token);
    }

    tokens
}

/// Disassemble `count` tokens straight from a memory bus.
///
/// Reads go through [`MemoryBus::read`], so device registers in range may
/// react to being read.
pub fn disassemble_memory<M: MemoryBus>(memory: &mut M, start: u16, count: usize) -> Vec<DisassemblyToken> {
    let mut tokens = Vec::with_capacity(count);
    let mut address = start;

    for _ in 0..count {
        let window: Vec<u8> = (0..3u16)
            .map(|i| memory.read(address.wrapping_add(i)))
            .collect();
        let token = decoder::decode_instruction(&window, address)
            .unwrap_or_else(|| decoder::data_byte(window[0], address, "undefined opcode"));
        address = address.wrapping_add(token.len() as u16);
        tokens.push(token);
    }

    tokens
}

/// Disassemble every contiguous run of bytes in assembled pages.
pub fn disassemble_pages(pages: &CodePages) -> Vec<DisassemblyToken> {
    pages
        .segments()
        .into_iter()
        .flat_map(|(start, bytes)| disassemble(&bytes, start))
        .collect()
}

/// Source text that reassembles to the same bytes.
///
/// An origin line is emitted before the first token and at every gap.
///
/// ```
/// use retro6502::{assemble, disassembler};
///
/// let first = assemble("LDX #$03\nLOOP DEX\nBNE LOOP\nBRK").unwrap();
/// let tokens = disassembler::disassemble_pages(&first.pages);
/// let again = assemble(&disassembler::to_source(&tokens)).unwrap();
/// assert_eq!(first.pages, again.pages);
/// ```
pub fn to_source(tokens: &[DisassemblyToken]) -> String {
    let mut lines = Vec::new();
    let mut expected: Option<u32> = None;

    for token in tokens {
        if expected != Some(token.address as u32) {
            lines.push(format!("*=${:04X}", token.address));
        }
        lines.push(token.text());
        expected = Some(token.address as u32 + token.len() as u32);
    }

    lines.join("\n")
}
