//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! This module implements arithmetic and logical operations:
//! - ADC: Add with Carry (binary and decimal mode)
//! - SBC: Subtract with Carry (binary and decimal mode)
//! - AND, ORA, EOR: bitwise logic on the accumulator
//! - CMP, CPX, CPY: register comparison
//! - BIT: bit test
//!
//! In decimal mode the NMOS part derives N and Z from the corrected BCD
//! result and V from the uncorrected binary sum.

use crate::cpu::Operand;
use crate::{MemoryBus, CPU};

/// Executes the ADC (Add with Carry) instruction.
///
/// Adds the operand plus the carry flag to the accumulator.
pub(crate) fn execute_adc<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    let value = cpu.operand_value(operand);
    add(cpu, value);
}

/// Executes the SBC (Subtract with Carry) instruction.
///
/// Subtracts the operand and the inverted carry (borrow) from the accumulator.
pub(crate) fn execute_sbc<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    let value = cpu.operand_value(operand);
    if cpu.flag_d {
        let binary = binary_add(cpu.a, !value, cpu.flag_c);
        let (result, carry) = decimal_sub(cpu.a, value, cpu.flag_c);
        cpu.flag_v = binary.overflow;
        cpu.flag_c = carry;
        cpu.a = result;
        cpu.set_nz(result);
    } else {
        // A - M - (1 - C) == A + !M + C
        add(cpu, !value);
    }
}

fn add<M: MemoryBus>(cpu: &mut CPU<M>, value: u8) {
    let binary = binary_add(cpu.a, value, cpu.flag_c);
    cpu.flag_v = binary.overflow;

    let (result, carry) = if cpu.flag_d {
        decimal_add(cpu.a, value, cpu.flag_c)
    } else {
        (binary.result, binary.carry)
    };

    cpu.flag_c = carry;
    cpu.a = result;
    cpu.set_nz(result);
}

struct BinarySum {
    result: u8,
    carry: bool,
    overflow: bool,
}

fn binary_add(a: u8, value: u8, carry_in: bool) -> BinarySum {
    let sum = a as u16 + value as u16 + carry_in as u16;
    let result = sum as u8;
    BinarySum {
        result,
        carry: sum > 0xFF,
        // both inputs share a sign the result does not have
        overflow: (a ^ result) & (value ^ result) & 0x80 != 0,
    }
}

/// Packed BCD addition. Returns the corrected result and the decimal carry.
fn decimal_add(a: u8, value: u8, carry_in: bool) -> (u8, bool) {
    let mut lo = (a & 0x0F) + (value & 0x0F) + carry_in as u8;
    if lo > 9 {
        lo += 6;
    }
    let mut hi = (a >> 4) + (value >> 4) + (lo > 0x0F) as u8;
    if hi > 9 {
        hi += 6;
    }
    let carry = hi > 0x0F;
    (((hi & 0x0F) << 4) | (lo & 0x0F), carry)
}

/// Packed BCD subtraction. The returned flag is set when no borrow occurred.
fn decimal_sub(a: u8, value: u8, carry_in: bool) -> (u8, bool) {
    let mut lo = (a & 0x0F) as i16 - (value & 0x0F) as i16 - (!carry_in) as i16;
    let mut hi = (a >> 4) as i16 - (value >> 4) as i16;
    if lo < 0 {
        lo += 10;
        hi -= 1;
    }
    let carry = hi >= 0;
    if hi < 0 {
        hi += 10;
    }
    ((((hi as u8) & 0x0F) << 4) | ((lo as u8) & 0x0F), carry)
}

/// Executes the AND (Logical AND) instruction.
pub(crate) fn execute_and<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    let value = cpu.operand_value(operand);
    cpu.a &= value;
    cpu.set_nz(cpu.a);
}

/// Executes the ORA (Logical Inclusive OR) instruction.
pub(crate) fn execute_ora<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    let value = cpu.operand_value(operand);
    cpu.a |= value;
    cpu.set_nz(cpu.a);
}

/// Executes the EOR (Exclusive OR) instruction.
pub(crate) fn execute_eor<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    let value = cpu.operand_value(operand);
    cpu.a ^= value;
    cpu.set_nz(cpu.a);
}

/// Shared body of CMP, CPX and CPY.
///
/// C is set when `register >= operand`; N and Z come from the difference.
/// The register itself is not modified.
pub(crate) fn execute_compare<M: MemoryBus>(cpu: &mut CPU<M>, register: u8, operand: Operand) {
    let value = cpu.operand_value(operand);
    cpu.flag_c = register >= value;
    cpu.set_nz(register.wrapping_sub(value));
}

/// Executes the BIT (Bit Test) instruction.
///
/// N and V are copied from bits 7 and 6 of the operand, Z is set when
/// `A & operand` is zero.
pub(crate) fn execute_bit<M: MemoryBus>(cpu: &mut CPU<M>, operand: Operand) {
    let value = cpu.operand_value(operand);
    cpu.flag_n = value & 0x80 != 0;
    cpu.flag_v = value & 0x40 != 0;
    cpu.flag_z = cpu.a & value == 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_add_carries_between_nibbles() {
        assert_eq!(decimal_add(0x58, 0x46, false), (0x04, true));
        assert_eq!(decimal_add(0x15, 0x26, false), (0x41, false));
        assert_eq!(decimal_add(0x99, 0x00, true), (0x00, true));
        assert_eq!(decimal_add(0x09, 0x00, true), (0x10, false));
    }

    #[test]
    fn test_decimal_sub_borrows_between_nibbles() {
        assert_eq!(decimal_sub(0x46, 0x12, true), (0x34, true));
        assert_eq!(decimal_sub(0x40, 0x13, true), (0x27, true));
        assert_eq!(decimal_sub(0x12, 0x21, true), (0x91, false));
        assert_eq!(decimal_sub(0x10, 0x00, false), (0x09, true));
    }

    #[test]
    fn test_binary_add_overflow() {
        let sum = binary_add(0x7F, 0x01, false);
        assert_eq!(sum.result, 0x80);
        assert!(sum.overflow);
        assert!(!sum.carry);

        let sum = binary_add(0xFF, 0x01, false);
        assert_eq!(sum.result, 0x00);
        assert!(!sum.overflow);
        assert!(sum.carry);
    }
}
