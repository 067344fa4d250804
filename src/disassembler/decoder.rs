//! Instruction decoder for the 6502 disassembler

use crate::disassembler::{formatter, DisassemblyToken};
use crate::opcodes::decode;

/// Decode a single instruction from a byte slice
///
/// Returns `None` for undefined opcodes and for instructions whose operand
/// bytes run past the end of `bytes`; the caller emits `.BYTE` for those.
pub fn decode_instruction(bytes: &[u8], address: u16) -> Option<DisassemblyToken> {
    let (&opcode, _) = bytes.split_first()?;
    let metadata = decode(opcode)?;

    let size = metadata.size_bytes as usize;
    let encoded = bytes.get(..size)?;

    Some(DisassemblyToken {
        address,
        bytes: encoded.to_vec(),
        metadata: Some(*metadata),
        mnemonic: metadata.mnemonic.as_str().to_string(),
        operand: formatter::format_operand(metadata.addressing_mode, &encoded[1..], address),
        description: metadata.mnemonic.description().to_string(),
    })
}

/// `.BYTE` token for a byte that does not start a complete instruction.
pub fn data_byte(byte: u8, address: u16, description: &str) -> DisassemblyToken {
    DisassemblyToken {
        address,
        bytes: vec![byte],
        metadata: None,
        mnemonic: ".BYTE".to_string(),
        operand: format!("${:02X}", byte),
        description: description.to_string(),
    }
}
