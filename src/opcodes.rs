//! # Opcode Metadata Table
//!
//! This module contains the 256-entry opcode table that serves as the single
//! source of truth for instruction decoding (CPU, disassembler) and encoding
//! (assembler).
//!
//! The table covers the 151 documented NMOS 6502 opcodes. The remaining 105
//! byte values are `None`: the CPU refuses to execute them and the
//! disassembler renders them as `.BYTE` data.

use std::str::FromStr;

use crate::addressing::AddressingMode;

/// The 56 documented 6502 instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
}

impl Mnemonic {
    /// Every mnemonic, alphabetically.
    pub const ALL: [Mnemonic; 56] = [
        Mnemonic::Adc,
        Mnemonic::And,
        Mnemonic::Asl,
        Mnemonic::Bcc,
        Mnemonic::Bcs,
        Mnemonic::Beq,
        Mnemonic::Bit,
        Mnemonic::Bmi,
        Mnemonic::Bne,
        Mnemonic::Bpl,
        Mnemonic::Brk,
        Mnemonic::Bvc,
        Mnemonic::Bvs,
        Mnemonic::Clc,
        Mnemonic::Cld,
        Mnemonic::Cli,
        Mnemonic::Clv,
        Mnemonic::Cmp,
        Mnemonic::Cpx,
        Mnemonic::Cpy,
        Mnemonic::Dec,
        Mnemonic::Dex,
        Mnemonic::Dey,
        Mnemonic::Eor,
        Mnemonic::Inc,
        Mnemonic::Inx,
        Mnemonic::Iny,
        Mnemonic::Jmp,
        Mnemonic::Jsr,
        Mnemonic::Lda,
        Mnemonic::Ldx,
        Mnemonic::Ldy,
        Mnemonic::Lsr,
        Mnemonic::Nop,
        Mnemonic::Ora,
        Mnemonic::Pha,
        Mnemonic::Php,
        Mnemonic::Pla,
        Mnemonic::Plp,
        Mnemonic::Rol,
        Mnemonic::Ror,
        Mnemonic::Rti,
        Mnemonic::Rts,
        Mnemonic::Sbc,
        Mnemonic::Sec,
        Mnemonic::Sed,
        Mnemonic::Sei,
        Mnemonic::Sta,
        Mnemonic::Stx,
        Mnemonic::Sty,
        Mnemonic::Tax,
        Mnemonic::Tay,
        Mnemonic::Tsx,
        Mnemonic::Txa,
        Mnemonic::Txs,
        Mnemonic::Tya,
    ];

    /// Three-letter uppercase assembler name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Mnemonic::Adc => "ADC",
            Mnemonic::And => "AND",
            Mnemonic::Asl => "ASL",
            Mnemonic::Bcc => "BCC",
            Mnemonic::Bcs => "BCS",
            Mnemonic::Beq => "BEQ",
            Mnemonic::Bit => "BIT",
            Mnemonic::Bmi => "BMI",
            Mnemonic::Bne => "BNE",
            Mnemonic::Bpl => "BPL",
            Mnemonic::Brk => "BRK",
            Mnemonic::Bvc => "BVC",
            Mnemonic::Bvs => "BVS",
            Mnemonic::Clc => "CLC",
            Mnemonic::Cld => "CLD",
            Mnemonic::Cli => "CLI",
            Mnemonic::Clv => "CLV",
            Mnemonic::Cmp => "CMP",
            Mnemonic::Cpx => "CPX",
            Mnemonic::Cpy => "CPY",
            Mnemonic::Dec => "DEC",
            Mnemonic::Dex => "DEX",
            Mnemonic::Dey => "DEY",
            Mnemonic::Eor => "EOR",
            Mnemonic::Inc => "INC",
            Mnemonic::Inx => "INX",
            Mnemonic::Iny => "INY",
            Mnemonic::Jmp => "JMP",
            Mnemonic::Jsr => "JSR",
            Mnemonic::Lda => "LDA",
            Mnemonic::Ldx => "LDX",
            Mnemonic::Ldy => "LDY",
            Mnemonic::Lsr => "LSR",
            Mnemonic::Nop => "NOP",
            Mnemonic::Ora => "ORA",
            Mnemonic::Pha => "PHA",
            Mnemonic::Php => "PHP",
            Mnemonic::Pla => "PLA",
            Mnemonic::Plp => "PLP",
            Mnemonic::Rol => "ROL",
            Mnemonic::Ror => "ROR",
            Mnemonic::Rti => "RTI",
            Mnemonic::Rts => "RTS",
            Mnemonic::Sbc => "SBC",
            Mnemonic::Sec => "SEC",
            Mnemonic::Sed => "SED",
            Mnemonic::Sei => "SEI",
            Mnemonic::Sta => "STA",
            Mnemonic::Stx => "STX",
            Mnemonic::Sty => "STY",
            Mnemonic::Tax => "TAX",
            Mnemonic::Tay => "TAY",
            Mnemonic::Tsx => "TSX",
            Mnemonic::Txa => "TXA",
            Mnemonic::Txs => "TXS",
            Mnemonic::Tya => "TYA",
        }
    }

    /// One-line description shown next to disassembled instructions.
    pub const fn description(self) -> &'static str {
        match self {
            Mnemonic::Adc => "add with carry",
            Mnemonic::And => "and (with accumulator)",
            Mnemonic::Asl => "arithmetic shift left",
            Mnemonic::Bcc => "branch on carry clear",
            Mnemonic::Bcs => "branch on carry set",
            Mnemonic::Beq => "branch on equal (zero set)",
            Mnemonic::Bit => "bit test",
            Mnemonic::Bmi => "branch on minus (negative set)",
            Mnemonic::Bne => "branch on not equal (zero clear)",
            Mnemonic::Bpl => "branch on plus (negative clear)",
            Mnemonic::Brk => "break / interrupt",
            Mnemonic::Bvc => "branch on overflow clear",
            Mnemonic::Bvs => "branch on overflow set",
            Mnemonic::Clc => "clear carry",
            Mnemonic::Cld => "clear decimal",
            Mnemonic::Cli => "clear interrupt disable",
            Mnemonic::Clv => "clear overflow",
            Mnemonic::Cmp => "compare (with accumulator)",
            Mnemonic::Cpx => "compare with X",
            Mnemonic::Cpy => "compare with Y",
            Mnemonic::Dec => "decrement",
            Mnemonic::Dex => "decrement X",
            Mnemonic::Dey => "decrement Y",
            Mnemonic::Eor => "exclusive or (with accumulator)",
            Mnemonic::Inc => "increment",
            Mnemonic::Inx => "increment X",
            Mnemonic::Iny => "increment Y",
            Mnemonic::Jmp => "jump",
            Mnemonic::Jsr => "jump subroutine",
            Mnemonic::Lda => "load accumulator",
            Mnemonic::Ldx => "load X",
            Mnemonic::Ldy => "load Y",
            Mnemonic::Lsr => "logical shift right",
            Mnemonic::Nop => "no operation",
            Mnemonic::Ora => "or with accumulator",
            Mnemonic::Pha => "push accumulator",
            Mnemonic::Php => "push processor status (SR)",
            Mnemonic::Pla => "pull accumulator",
            Mnemonic::Plp => "pull processor status (SR)",
            Mnemonic::Rol => "rotate left",
            Mnemonic::Ror => "rotate right",
            Mnemonic::Rti => "return from interrupt",
            Mnemonic::Rts => "return from subroutine",
            Mnemonic::Sbc => "subtract with carry",
            Mnemonic::Sec => "set carry",
            Mnemonic::Sed => "set decimal",
            Mnemonic::Sei => "set interrupt disable",
            Mnemonic::Sta => "store accumulator",
            Mnemonic::Stx => "store X",
            Mnemonic::Sty => "store Y",
            Mnemonic::Tax => "transfer accumulator to X",
            Mnemonic::Tay => "transfer accumulator to Y",
            Mnemonic::Tsx => "transfer stack pointer to X",
            Mnemonic::Txa => "transfer X to accumulator",
            Mnemonic::Txs => "transfer X to stack pointer",
            Mnemonic::Tya => "transfer Y to accumulator",
        }
    }

    /// True for the eight conditional branches (relative addressing only).
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Mnemonic::Bcc
                | Mnemonic::Bcs
                | Mnemonic::Beq
                | Mnemonic::Bmi
                | Mnemonic::Bne
                | Mnemonic::Bpl
                | Mnemonic::Bvc
                | Mnemonic::Bvs
        )
    }
}

impl std::fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the 56 documented mnemonics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mnemonic '{0}'")]
pub struct UnknownMnemonic(pub String);

impl FromStr for Mnemonic {
    type Err = UnknownMnemonic;

    /// Parses a mnemonic case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mnemonic::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMnemonic(s.to_string()))
    }
}

/// Metadata for a single documented opcode.
///
/// # Examples
///
/// ```
/// use retro6502::{decode, AddressingMode, Mnemonic};
///
/// let lda_imm = decode(0xA9).unwrap();
/// assert_eq!(lda_imm.mnemonic, Mnemonic::Lda);
/// assert_eq!(lda_imm.addressing_mode, AddressingMode::Immediate);
/// assert_eq!(lda_imm.base_cycles, 2);
/// assert_eq!(lda_imm.size_bytes, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Instruction mnemonic.
    pub mnemonic: Mnemonic,

    /// Addressing mode for this instruction.
    pub addressing_mode: AddressingMode,

    /// Base cycle cost (page-crossing and branch penalties are not modelled).
    pub base_cycles: u8,

    /// Total instruction size in bytes (opcode + operands, 1-3).
    pub size_bytes: u8,
}

use AddressingMode as M;
use Mnemonic as I;

/// (opcode, mnemonic, mode, base cycles) for every documented instruction.
const DOCUMENTED: &[(u8, Mnemonic, AddressingMode, u8)] = &[
    (0x69, I::Adc, M::Immediate, 2),
    (0x65, I::Adc, M::ZeroPage, 3),
    (0x75, I::Adc, M::ZeroPageX, 4),
    (0x6D, I::Adc, M::Absolute, 4),
    (0x7D, I::Adc, M::AbsoluteX, 4),
    (0x79, I::Adc, M::AbsoluteY, 4),
    (0x61, I::Adc, M::IndirectX, 6),
    (0x71, I::Adc, M::IndirectY, 5),
    (0x29, I::And, M::Immediate, 2),
    (0x25, I::And, M::ZeroPage, 3),
    (0x35, I::And, M::ZeroPageX, 4),
    (0x2D, I::And, M::Absolute, 4),
    (0x3D, I::And, M::AbsoluteX, 4),
    (0x39, I::And, M::AbsoluteY, 4),
    (0x21, I::And, M::IndirectX, 6),
    (0x31, I::And, M::IndirectY, 5),
    (0x0A, I::Asl, M::Implicit, 2),
    (0x06, I::Asl, M::ZeroPage, 5),
    (0x16, I::Asl, M::ZeroPageX, 6),
    (0x0E, I::Asl, M::Absolute, 6),
    (0x1E, I::Asl, M::AbsoluteX, 7),
    (0x90, I::Bcc, M::Relative, 2),
    (0xB0, I::Bcs, M::Relative, 2),
    (0xF0, I::Beq, M::Relative, 2),
    (0x30, I::Bmi, M::Relative, 2),
    (0xD0, I::Bne, M::Relative, 2),
    (0x10, I::Bpl, M::Relative, 2),
    (0x50, I::Bvc, M::Relative, 2),
    (0x70, I::Bvs, M::Relative, 2),
    (0x24, I::Bit, M::ZeroPage, 3),
    (0x2C, I::Bit, M::Absolute, 4),
    (0x00, I::Brk, M::Implicit, 7),
    (0x18, I::Clc, M::Implicit, 2),
    (0xD8, I::Cld, M::Implicit, 2),
    (0x58, I::Cli, M::Implicit, 2),
    (0xB8, I::Clv, M::Implicit, 2),
    (0xC9, I::Cmp, M::Immediate, 2),
    (0xC5, I::Cmp, M::ZeroPage, 3),
    (0xD5, I::Cmp, M::ZeroPageX, 4),
    (0xCD, I::Cmp, M::Absolute, 4),
    (0xDD, I::Cmp, M::AbsoluteX, 4),
    (0xD9, I::Cmp, M::AbsoluteY, 4),
    (0xC1, I::Cmp, M::IndirectX, 6),
    (0xD1, I::Cmp, M::IndirectY, 5),
    (0xE0, I::Cpx, M::Immediate, 2),
    (0xE4, I::Cpx, M::ZeroPage, 3),
    (0xEC, I::Cpx, M::Absolute, 4),
    (0xC0, I::Cpy, M::Immediate, 2),
    (0xC4, I::Cpy, M::ZeroPage, 3),
    (0xCC, I::Cpy, M::Absolute, 4),
    (0xC6, I::Dec, M::ZeroPage, 5),
    (0xD6, I::Dec, M::ZeroPageX, 6),
    (0xCE, I::Dec, M::Absolute, 6),
    (0xDE, I::Dec, M::AbsoluteX, 7),
    (0xCA, I::Dex, M::Implicit, 2),
    (0x88, I::Dey, M::Implicit, 2),
    (0x49, I::Eor, M::Immediate, 2),
    (0x45, I::Eor, M::ZeroPage, 3),
    (0x55, I::Eor, M::ZeroPageX, 4),
    (0x4D, I::Eor, M::Absolute, 4),
    (0x5D, I::Eor, M::AbsoluteX, 4),
    (0x59, I::Eor, M::AbsoluteY, 4),
    (0x41, I::Eor, M::IndirectX, 6),
    (0x51, I::Eor, M::IndirectY, 5),
    (0xE6, I::Inc, M::ZeroPage, 5),
    (0xF6, I::Inc, M::ZeroPageX, 6),
    (0xEE, I::Inc, M::Absolute, 6),
    (0xFE, I::Inc, M::AbsoluteX, 7),
    (0xE8, I::Inx, M::Implicit, 2),
    (0xC8, I::Iny, M::Implicit, 2),
    (0x4C, I::Jmp, M::Absolute, 3),
    (0x6C, I::Jmp, M::Indirect, 5),
    (0x20, I::Jsr, M::Absolute, 6),
    (0xA9, I::Lda, M::Immediate, 2),
    (0xA5, I::Lda, M::ZeroPage, 3),
    (0xB5, I::Lda, M::ZeroPageX, 4),
    (0xAD, I::Lda, M::Absolute, 4),
    (0xBD, I::Lda, M::AbsoluteX, 4),
    (0xB9, I::Lda, M::AbsoluteY, 4),
    (0xA1, I::Lda, M::IndirectX, 6),
    (0xB1, I::Lda, M::IndirectY, 5),
    (0xA2, I::Ldx, M::Immediate, 2),
    (0xA6, I::Ldx, M::ZeroPage, 3),
    (0xB6, I::Ldx, M::ZeroPageY, 4),
    (0xAE, I::Ldx, M::Absolute, 4),
    (0xBE, I::Ldx, M::AbsoluteY, 4),
    (0xA0, I::Ldy, M::Immediate, 2),
    (0xA4, I::Ldy, M::ZeroPage, 3),
    (0xB4, I::Ldy, M::ZeroPageX, 4),
    (0xAC, I::Ldy, M::Absolute, 4),
    (0xBC, I::Ldy, M::AbsoluteX, 4),
    (0x4A, I::Lsr, M::Implicit, 2),
    (0x46, I::Lsr, M::ZeroPage, 5),
    (0x56, I::Lsr, M::ZeroPageX, 6),
    (0x4E, I::Lsr, M::Absolute, 6),
    (0x5E, I::Lsr, M::AbsoluteX, 7),
    (0xEA, I::Nop, M::Implicit, 2),
    (0x09, I::Ora, M::Immediate, 2),
    (0x05, I::Ora, M::ZeroPage, 3),
    (0x15, I::Ora, M::ZeroPageX, 4),
    (0x0D, I::Ora, M::Absolute, 4),
    (0x1D, I::Ora, M::AbsoluteX, 4),
    (0x19, I::Ora, M::AbsoluteY, 4),
    (0x01, I::Ora, M::IndirectX, 6),
    (0x11, I::Ora, M::IndirectY, 5),
    (0x48, I::Pha, M::Implicit, 3),
    (0x08, I::Php, M::Implicit, 3),
    (0x68, I::Pla, M::Implicit, 4),
    (0x28, I::Plp, M::Implicit, 4),
    (0x2A, I::Rol, M::Implicit, 2),
    (0x26, I::Rol, M::ZeroPage, 5),
    (0x36, I::Rol, M::ZeroPageX, 6),
    (0x2E, I::Rol, M::Absolute, 6),
    (0x3E, I::Rol, M::AbsoluteX, 7),
    (0x6A, I::Ror, M::Implicit, 2),
    (0x66, I::Ror, M::ZeroPage, 5),
    (0x76, I::Ror, M::ZeroPageX, 6),
    (0x6E, I::Ror, M::Absolute, 6),
    (0x7E, I::Ror, M::AbsoluteX, 7),
    (0x40, I::Rti, M::Implicit, 6),
    (0x60, I::Rts, M::Implicit, 6),
    (0xE9, I::Sbc, M::Immediate, 2),
    (0xE5, I::Sbc, M::ZeroPage, 3),
    (0xF5, I::Sbc, M::ZeroPageX, 4),
    (0xED, I::Sbc, M::Absolute, 4),
    (0xFD, I::Sbc, M::AbsoluteX, 4),
    (0xF9, I::Sbc, M::AbsoluteY, 4),
    (0xE1, I::Sbc, M::IndirectX, 6),
    (0xF1, I::Sbc, M::IndirectY, 5),
    (0x38, I::Sec, M::Implicit, 2),
    (0xF8, I::Sed, M::Implicit, 2),
    (0x78, I::Sei, M::Implicit, 2),
    (0x85, I::Sta, M::ZeroPage, 3),
    (0x95, I::Sta, M::ZeroPageX, 4),
    (0x8D, I::Sta, M::Absolute, 4),
    (0x9D, I::Sta, M::AbsoluteX, 5),
    (0x99, I::Sta, M::AbsoluteY, 5),
    (0x81, I::Sta, M::IndirectX, 6),
    (0x91, I::Sta, M::IndirectY, 6),
    (0x86, I::Stx, M::ZeroPage, 3),
    (0x96, I::Stx, M::ZeroPageY, 4),
    (0x8E, I::Stx, M::Absolute, 4),
    (0x84, I::Sty, M::ZeroPage, 3),
    (0x94, I::Sty, M::ZeroPageX, 4),
    (0x8C, I::Sty, M::Absolute, 4),
    (0xAA, I::Tax, M::Implicit, 2),
    (0xA8, I::Tay, M::Implicit, 2),
    (0xBA, I::Tsx, M::Implicit, 2),
    (0x8A, I::Txa, M::Implicit, 2),
    (0x9A, I::Txs, M::Implicit, 2),
    (0x98, I::Tya, M::Implicit, 2),
];

const fn build_table() -> [Option<OpcodeMetadata>; 256] {
    let mut table: [Option<OpcodeMetadata>; 256] = [None; 256];
    let mut i = 0;
    while i < DOCUMENTED.len() {
        let (opcode, mnemonic, addressing_mode, base_cycles) = DOCUMENTED[i];
        table[opcode as usize] = Some(OpcodeMetadata {
            mnemonic,
            addressing_mode,
            base_cycles,
            size_bytes: 1 + addressing_mode.operand_len(),
        });
        i += 1;
    }
    table
}

/// Complete 256-entry opcode table indexed by opcode byte.
///
/// Undefined (illegal) opcodes are `None`.
///
/// ```
/// use retro6502::OPCODE_TABLE;
///
/// assert_eq!(OPCODE_TABLE.iter().flatten().count(), 151);
/// assert!(OPCODE_TABLE[0x02].is_none());
/// ```
pub static OPCODE_TABLE: [Option<OpcodeMetadata>; 256] = build_table();

/// Decodes an opcode byte, returning `None` for undefined opcodes.
pub fn decode(opcode: u8) -> Option<&'static OpcodeMetadata> {
    OPCODE_TABLE[opcode as usize].as_ref()
}

/// Finds the opcode byte for a mnemonic in a given addressing mode.
///
/// Returns `None` when the instruction has no such form, e.g. there is no
/// zero-page,Y encoding of LDA.
///
/// ```
/// use retro6502::{lookup, AddressingMode, Mnemonic};
///
/// assert_eq!(lookup(Mnemonic::Lda, AddressingMode::Immediate), Some(0xA9));
/// assert_eq!(lookup(Mnemonic::Lda, AddressingMode::ZeroPageY), None);
/// ```
pub fn lookup(mnemonic: Mnemonic, mode: AddressingMode) -> Option<u8> {
    OPCODE_TABLE
        .iter()
        .position(|entry| {
            matches!(entry, Some(m) if m.mnemonic == mnemonic && m.addressing_mode == mode)
        })
        .map(|index| index as u8)
}

/// True if the mnemonic has any encoding in the given mode.
pub fn supports(mnemonic: Mnemonic, mode: AddressingMode) -> bool {
    lookup(mnemonic, mode).is_some()
}
