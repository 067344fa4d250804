//! # Control Flow Instructions
//!
//! This module implements JMP, JSR, RTS, RTI and BRK. NOP has no body.
//!
//! JSR pushes the address of its own last byte (return address − 1), high
//! byte first; RTS pulls it back and adds one. BRK behaves like an IRQ that
//! cannot be masked, except that the pushed status has the break bit set and
//! the pushed PC skips the padding byte after the opcode.

use crate::cpu::{Operand, FLAG_B, FLAG_UNUSED, IRQ_VECTOR};
use crate::{MemoryBus, CPU};

pub(crate) fn execute_jmp<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    if let Operand::Address(target) = operand {
        cpu.pc = target;
    }
}

pub(crate) fn execute_jsr<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    let return_addr = cpu.pc.wrapping_sub(1);
    cpu.push_word(return_addr);
    if let Operand::Address(target) = operand {
        cpu.pc = target;
    }
}

pub(crate) fn execute_rts<M: MemoryBus>(cpu: &mut CPU<M>) {
    cpu.pc = cpu.pull_word().wrapping_add(1);
}

/// Pulls the status byte, then PC. Unlike RTS, the PC is used as is.
pub(crate) fn execute_rti<M: MemoryBus>(cpu: &mut CPU<M>) {
    let status = cpu.pull();
    cpu.set_status(status);
    cpu.pc = cpu.pull_word();
}

pub(crate) fn execute_brk<M: MemoryBus>(cpu: &mut CPU<M>) {
    // PC sits after the opcode; BRK's padding byte is skipped too
    let return_addr = cpu.pc.wrapping_add(1);
    cpu.push_word(return_addr);

    let status = cpu.status() | FLAG_B | FLAG_UNUSED;
    cpu.push(status);

    cpu.flag_i = true;
    cpu.pc = cpu.memory.read_word(IRQ_VECTOR);
    log::debug!("BRK, vectoring to ${:04X}", cpu.pc);
}
