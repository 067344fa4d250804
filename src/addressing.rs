//! # Addressing Modes
//!
//! This module defines the 12 addressing modes of the NMOS 6502. Each mode
//! determines how the CPU interprets the operand bytes that follow an opcode and
//! how the effective address is calculated.
//!
//! Accumulator forms such as `ASL` or `ROL A` are folded into
//! [`AddressingMode::Implicit`]: the instruction has no operand bytes and acts on A.

/// 6502 addressing mode enumeration.
///
/// # Operand Sizes
///
/// - **0 bytes**: Implicit
/// - **1 byte**: Immediate, ZeroPage, ZeroPageX, ZeroPageY, Relative, IndirectX, IndirectY
/// - **2 bytes**: Absolute, AbsoluteX, AbsoluteY, Indirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand; the operation is implied or acts on the accumulator.
    ///
    /// Examples: CLC, RTS, ASL
    Implicit,

    /// 8-bit constant operand stored right after the opcode.
    ///
    /// Example: LDA #$10
    Immediate,

    /// 8-bit address in zero page (0x00-0xFF).
    ///
    /// Example: LDA $80
    ZeroPage,

    /// Zero page address indexed by X, wrapping within zero page.
    ///
    /// Example: LDA $80,X
    ZeroPageX,

    /// Zero page address indexed by Y, wrapping within zero page.
    ///
    /// Example: LDX $80,Y
    ZeroPageY,

    /// Signed 8-bit displacement used by branches.
    ///
    /// Example: BEQ LOOP
    Relative,

    /// Full 16-bit address.
    ///
    /// Example: JMP $1234
    Absolute,

    /// 16-bit address indexed by X.
    ///
    /// Example: LDA $1234,X
    AbsoluteX,

    /// 16-bit address indexed by Y.
    ///
    /// Example: LDA $1234,Y
    AbsoluteY,

    /// Indirect jump through a 16-bit pointer (JMP only).
    ///
    /// Example: JMP ($FFFC)
    Indirect,

    /// Indexed indirect: (ZP + X) is dereferenced.
    ///
    /// Example: LDA ($40,X)
    IndirectX,

    /// Indirect indexed: ZP is dereferenced, then Y is added.
    ///
    /// Example: LDA ($40),Y
    IndirectY,
}

impl AddressingMode {
    /// All addressing modes, in table order.
    pub const ALL: [AddressingMode; 12] = [
        AddressingMode::Implicit,
        AddressingMode::Immediate,
        AddressingMode::ZeroPage,
        AddressingMode::ZeroPageX,
        AddressingMode::ZeroPageY,
        AddressingMode::Relative,
        AddressingMode::Absolute,
        AddressingMode::AbsoluteX,
        AddressingMode::AbsoluteY,
        AddressingMode::Indirect,
        AddressingMode::IndirectX,
        AddressingMode::IndirectY,
    ];

    /// Number of operand bytes following the opcode.
    pub const fn operand_len(self) -> u8 {
        match self {
            AddressingMode::Implicit => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::Relative
            | AddressingMode::IndirectX
            | AddressingMode::IndirectY => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
        }
    }

    /// The zero-page counterpart of an absolute mode, if the 6502 has one.
    ///
    /// Used by the assembler to shorten absolute operands that fit in one byte.
    pub const fn zero_page_form(self) -> Option<AddressingMode> {
        match self {
            AddressingMode::Absolute => Some(AddressingMode::ZeroPage),
            AddressingMode::AbsoluteX => Some(AddressingMode::ZeroPageX),
            AddressingMode::AbsoluteY => Some(AddressingMode::ZeroPageY),
            _ => None,
        }
    }

    /// Short mode name used in diagnostics (IMPL, IMM, ZP, ...).
    pub const fn short_name(self) -> &'static str {
        match self {
            AddressingMode::Implicit => "IMPL",
            AddressingMode::Immediate => "IMM",
            AddressingMode::ZeroPage => "ZP",
            AddressingMode::ZeroPageX => "ZPX",
            AddressingMode::ZeroPageY => "ZPY",
            AddressingMode::Relative => "REL",
            AddressingMode::Absolute => "ABS",
            AddressingMode::AbsoluteX => "ABSX",
            AddressingMode::AbsoluteY => "ABSY",
            AddressingMode::Indirect => "IND",
            AddressingMode::IndirectX => "XZPI",
            AddressingMode::IndirectY => "ZPIY",
        }
    }
}

impl std::fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_lengths() {
        assert_eq!(AddressingMode::Implicit.operand_len(), 0);
        assert_eq!(AddressingMode::Immediate.operand_len(), 1);
        assert_eq!(AddressingMode::IndirectY.operand_len(), 1);
        assert_eq!(AddressingMode::Indirect.operand_len(), 2);
        assert_eq!(AddressingMode::AbsoluteY.operand_len(), 2);
    }

    #[test]
    fn test_zero_page_form() {
        assert_eq!(
            AddressingMode::Absolute.zero_page_form(),
            Some(AddressingMode::ZeroPage)
        );
        assert_eq!(
            AddressingMode::AbsoluteY.zero_page_form(),
            Some(AddressingMode::ZeroPageY)
        );
        assert_eq!(AddressingMode::Indirect.zero_page_form(), None);
    }
}
