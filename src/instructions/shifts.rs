//! # Shift and Rotate Instructions
//!
//! ASL, LSR, ROL and ROR operate on the accumulator when they carry no operand
//! address and on memory (read-modify-write) otherwise. The bit shifted out
//! always lands in C.

use crate::cpu::Operand;
use crate::{MemoryBus, CPU};

/// Executes ASL (Arithmetic Shift Left).
pub(crate) fn execute_asl<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    cpu.modify(operand, |cpu, value| {
        cpu.flag_c = value & 0x80 != 0;
        value << 1
    });
}

/// Executes LSR (Logical Shift Right). N always ends up clear.
pub(crate) fn execute_lsr<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    cpu.modify(operand, |cpu, value| {
        cpu.flag_c = value & 0x01 != 0;
        value >> 1
    });
}

/// Executes ROL (Rotate Left). The old carry enters at bit 0.
pub(crate) fn execute_rol<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    cpu.modify(operand, |cpu, value| {
        let carry_in = cpu.flag_c as u8;
        cpu.flag_c = value & 0x80 != 0;
        (value << 1) | carry_in
    });
}

/// Executes ROR (Rotate Right). The old carry enters at bit 7.
pub(crate) fn execute_ror<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    cpu.modify(operand, |cpu, value| {
        let carry_in = (cpu.flag_c as u8) << 7;
        cpu.flag_c = value & 0x01 != 0;
        (value >> 1) | carry_in
    });
}
