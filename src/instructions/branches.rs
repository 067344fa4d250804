//! # Branch Instructions
//!
//! BCC, BCS, BEQ, BNE, BMI, BPL, BVC and BVS all share one body: when the
//! tested condition holds, the signed 8-bit displacement is added to the
//! address of the next instruction.
//!
//! A taken branch costs one extra cycle, and one more if the target lies in a
//! different page than the next instruction.

use crate::cpu::Operand;
use crate::{MemoryBus, CPU};

/// Branches by the displacement stored at `operand` when `taken` is true.
///
/// No flags are affected.
pub(crate) fn branch_if<M: MemoryBus>(cpu: &mut CPU<M>, taken: bool, operand: Operand) {
    if !taken {
        return;
    }

    let offset = cpu.operand_value(operand) as i8;

    // PC already points past the branch
    let next = cpu.pc;
    let target = next.wrapping_add_signed(offset as i16);

    cpu.cycles += 1;
    if next & 0xFF00 != target & 0xFF00 {
        cpu.cycles += 1;
    }

    cpu.pc = target;
}
