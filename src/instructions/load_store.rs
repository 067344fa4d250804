//! # Load and Store Instructions
//!
//! LDA, LDX and LDY set N and Z from the loaded value. STA, STX and STY write
//! a register to the effective address and leave the flags alone.

use crate::cpu::Operand;
use crate::{MemoryBus, CPU};

pub(crate) fn execute_lda<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    let value = cpu.operand_value(operand);
    cpu.a = value;
    cpu.set_nz(value);
}

pub(crate) fn execute_ldx<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    let value = cpu.operand_value(operand);
    cpu.x = value;
    cpu.set_nz(value);
}

pub(crate) fn execute_ldy<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    let value = cpu.operand_value(operand);
    cpu.y = value;
    cpu.set_nz(value);
}

/// Shared body of STA, STX and STY.
pub(crate) fn store<M: MemoryBus>(cpu: &mut CPU<M>, value: u8, operand: Operand) {
    if let Operand::Address(addr) = operand {
        cpu.memory.write(addr, value);
    }
}
