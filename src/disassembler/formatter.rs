//! Formatting functions for disassembled instructions

use crate::addressing::AddressingMode;
use crate::disassembler::DisassemblyToken;

/// Width of the raw byte column in a listing line.
const BYTE_COLUMN: usize = 8;

/// Render operand bytes the way the assembler reads them back.
///
/// `address` is where the instruction starts; branch targets are shown as
/// absolute addresses relative to the following instruction. Absolute
/// operands below $0100 carry the `!` prefix so they reassemble at full
/// width instead of collapsing to zero page.
pub fn format_operand(mode: AddressingMode, operand: &[u8], address: u16) -> String {
    use AddressingMode::*;

    let byte = operand.first().copied().unwrap_or(0);
    let word = match operand {
        [lo, hi, ..] => u16::from_le_bytes([*lo, *hi]),
        _ => byte as u16,
    };

    match mode {
        Implicit => String::new(),
        Immediate => format!("#${:02X}", byte),
        ZeroPage => format!("${:02X}", byte),
        ZeroPageX => format!("${:02X},X", byte),
        ZeroPageY => format!("${:02X},Y", byte),
        Relative => {
            let target = address
                .wrapping_add(2)
                .wrapping_add_signed(byte as i8 as i16);
            format!("${:04X}", target)
        }
        Absolute => format!("{}${:04X}", force(word), word),
        AbsoluteX => format!("{}${:04X},X", force(word), word),
        AbsoluteY => format!("{}${:04X},Y", force(word), word),
        Indirect => format!("(${:04X})", word),
        IndirectX => format!("(${:02X},X)", byte),
        IndirectY => format!("(${:02X}),Y", byte),
    }
}

fn force(word: u16) -> &'static str {
    if word <= 0xFF {
        "!"
    } else {
        ""
    }
}

/// `$AAAA   BB BB      TEXT   ; description`
pub fn format_line(token: &DisassemblyToken) -> String {
    let bytes = token
        .bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "${:04X}   {:<width$}   {}   ; {}",
        token.address,
        bytes,
        token.text(),
        token.description,
        width = BYTE_COLUMN
    )
}
