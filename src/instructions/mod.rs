//! # 6502 Instruction Implementations
//!
//! This module contains the implementations of all 6502 instructions, organized by category.
//! Each instruction is a standalone function taking the CPU and the already
//! computed [`Operand`]; PC has been advanced past the instruction by the time
//! the body runs.
//!
//! ## Categories
//!
//! - **alu**: Arithmetic and logic operations (ADC, SBC, AND, ORA, EOR, CMP, CPX, CPY, BIT)
//! - **branches**: Conditional branch instructions (BCC, BCS, BEQ, BNE, BMI, BPL, BVC, BVS)
//! - **shifts**: Shift and rotate operations (ASL, LSR, ROL, ROR)
//! - **load_store**: Load and store instructions (LDA, LDX, LDY, STA, STX, STY)
//! - **inc_dec**: Increment and decrement operations (INC, DEC, INX, INY, DEX, DEY)
//! - **control**: Control flow instructions (JMP, JSR, RTS, RTI, BRK, NOP)
//! - **stack**: Stack operations (PHA, PHP, PLA, PLP)
//! - **transfer**: Register transfer operations (TAX, TAY, TXA, TYA, TSX, TXS)
//!
//! The flag instructions (CLC, SEC, CLI, SEI, CLD, SED, CLV) are single
//! assignments and live directly in [`execute`].

mod alu;
mod branches;
mod control;
mod inc_dec;
mod load_store;
mod shifts;
mod stack;
mod transfer;

use crate::cpu::Operand;
use crate::opcodes::Mnemonic;
use crate::{MemoryBus, CPU};

/// Runs the body of `mnemonic` against `operand`.
pub(crate) fn execute<M: MemoryBus>(cpu: &mut CPU<M>, mnemonic: Mnemonic, operand: Operand) {
    match mnemonic {
        Mnemonic::Adc => alu::execute_adc(cpu, operand),
        Mnemonic::Sbc => alu::execute_sbc(cpu, operand),
        Mnemonic::And => alu::execute_and(cpu, operand),
        Mnemonic::Ora => alu::execute_ora(cpu, operand),
        Mnemonic::Eor => alu::execute_eor(cpu, operand),
        Mnemonic::Cmp => {
            let a = cpu.a;
            alu::execute_compare(cpu, a, operand)
        }
        Mnemonic::Cpx => {
            let x = cpu.x;
            alu::execute_compare(cpu, x, operand)
        }
        Mnemonic::Cpy => {
            let y = cpu.y;
            alu::execute_compare(cpu, y, operand)
        }
        Mnemonic::Bit => alu::execute_bit(cpu, operand),

        Mnemonic::Bcc => {
            let taken = !cpu.flag_c;
            branches::branch_if(cpu, taken, operand)
        }
        Mnemonic::Bcs => {
            let taken = cpu.flag_c;
            branches::branch_if(cpu, taken, operand)
        }
        Mnemonic::Bne => {
            let taken = !cpu.flag_z;
            branches::branch_if(cpu, taken, operand)
        }
        Mnemonic::Beq => {
            let taken = cpu.flag_z;
            branches::branch_if(cpu, taken, operand)
        }
        Mnemonic::Bpl => {
            let taken = !cpu.flag_n;
            branches::branch_if(cpu, taken, operand)
        }
        Mnemonic::Bmi => {
            let taken = cpu.flag_n;
            branches::branch_if(cpu, taken, operand)
        }
        Mnemonic::Bvc => {
            let taken = !cpu.flag_v;
            branches::branch_if(cpu, taken, operand)
        }
        Mnemonic::Bvs => {
            let taken = cpu.flag_v;
            branches::branch_if(cpu, taken, operand)
        }

        Mnemonic::Asl => shifts::execute_asl(cpu, operand),
        Mnemonic::Lsr => shifts::execute_lsr(cpu, operand),
        Mnemonic::Rol => shifts::execute_rol(cpu, operand),
        Mnemonic::Ror => shifts::execute_ror(cpu, operand),

        Mnemonic::Lda => load_store::execute_lda(cpu, operand),
        Mnemonic::Ldx => load_store::execute_ldx(cpu, operand),
        Mnemonic::Ldy => load_store::execute_ldy(cpu, operand),
        Mnemonic::Sta => {
            let a = cpu.a;
            load_store::store(cpu, a, operand)
        }
        Mnemonic::Stx => {
            let x = cpu.x;
            load_store::store(cpu, x, operand)
        }
        Mnemonic::Sty => {
            let y = cpu.y;
            load_store::store(cpu, y, operand)
        }

        Mnemonic::Inc => inc_dec::execute_inc(cpu, operand),
        Mnemonic::Dec => inc_dec::execute_dec(cpu, operand),
        Mnemonic::Inx => inc_dec::execute_inx(cpu),
        Mnemonic::Iny => inc_dec::execute_iny(cpu),
        Mnemonic::Dex => inc_dec::execute_dex(cpu),
        Mnemonic::Dey => inc_dec::execute_dey(cpu),

        Mnemonic::Jmp => control::execute_jmp(cpu, operand),
        Mnemonic::Jsr => control::execute_jsr(cpu, operand),
        Mnemonic::Rts => control::execute_rts(cpu),
        Mnemonic::Rti => control::execute_rti(cpu),
        Mnemonic::Brk => control::execute_brk(cpu),
        Mnemonic::Nop => {}

        Mnemonic::Pha => stack::execute_pha(cpu),
        Mnemonic::Php => stack::execute_php(cpu),
        Mnemonic::Pla => stack::execute_pla(cpu),
        Mnemonic::Plp => stack::execute_plp(cpu),

        Mnemonic::Clc => cpu.flag_c = false,
        Mnemonic::Sec => cpu.flag_c = true,
        Mnemonic::Cli => cpu.flag_i = false,
        Mnemonic::Sei => cpu.flag_i = true,
        Mnemonic::Cld => cpu.flag_d = false,
        Mnemonic::Sed => cpu.flag_d = true,
        Mnemonic::Clv => cpu.flag_v = false,

        Mnemonic::Tax => transfer::execute_tax(cpu),
        Mnemonic::Tay => transfer::execute_tay(cpu),
        Mnemonic::Txa => transfer::execute_txa(cpu),
        Mnemonic::Tya => transfer::execute_tya(cpu),
        Mnemonic::Tsx => transfer::execute_tsx(cpu),
        Mnemonic::Txs => transfer::execute_txs(cpu),
    }
}
