//! # Stack Instructions
//!
//! The stack lives in page 1 ($0100-$01FF) and grows downward. PHP always
//! pushes the status byte with the break bit and bit 5 set; PLP ignores both
//! bits when restoring flags.

use crate::cpu::{FLAG_B, FLAG_UNUSED};
use crate::{MemoryBus, CPU};

pub(crate) fn execute_pha<M: MemoryBus>(cpu: &mut CPU<M>) {
    cpu.push(cpu.a);
}

pub(crate) fn execute_php<M: MemoryBus>(cpu: &mut CPU<M>) {
    let status = cpu.status() | FLAG_B | FLAG_UNUSED;
    cpu.push(status);
}

/// PLA sets N and Z from the pulled value.
pub(crate) fn execute_pla<M: MemoryBus>(cpu: &mut CPU<M>) {
    let value = cpu.pull();
    cpu.a = value;
    cpu.set_nz(value);
}

pub(crate) fn execute_plp<M: MemoryBus>(cpu: &mut CPU<M>) {
    let status = cpu.pull();
    cpu.set_status(status);
}
