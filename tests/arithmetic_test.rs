//! Tests for ADC, SBC, the compare instructions and BIT.
//!
//! Tests cover:
//! - Binary boundary pairs (0+0, $7F+1, $FF+1, $80-1)
//! - Packed-decimal add and subtract with inter-nibble carry
//! - Compare flag rules (C = register >= operand)
//! - BIT flag transfer

use retro6502::{FlatMemory, MemoryBus, CPU};

/// Helper function to create a CPU with reset vector at 0x8000
fn setup_cpu() -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    CPU::with_seed(memory, 1)
}

/// Runs one two-byte immediate instruction with A and C preset
fn run_immediate(opcode: u8, a: u8, operand: u8, carry: bool, decimal: bool) -> CPU<FlatMemory> {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x8000, opcode);
    cpu.memory_mut().write(0x8001, operand);
    cpu.set_a(a);
    cpu.set_flag_c(carry);
    cpu.set_flag_d(decimal);
    cpu.step().unwrap();
    cpu
}

fn adc(a: u8, operand: u8, carry: bool) -> CPU<FlatMemory> {
    run_immediate(0x69, a, operand, carry, false)
}

fn sbc(a: u8, operand: u8, carry: bool) -> CPU<FlatMemory> {
    run_immediate(0xE9, a, operand, carry, false)
}

fn adc_bcd(a: u8, operand: u8, carry: bool) -> CPU<FlatMemory> {
    run_immediate(0x69, a, operand, carry, true)
}

fn sbc_bcd(a: u8, operand: u8, carry: bool) -> CPU<FlatMemory> {
    run_immediate(0xE9, a, operand, carry, true)
}

// ========== Binary ADC ==========

#[test]
fn test_adc_zero_plus_zero() {
    let cpu = adc(0x00, 0x00, false);

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_z());
    assert!(!cpu.flag_c());
    assert!(!cpu.flag_v());
    assert!(!cpu.flag_n());
    assert_eq!(cpu.pc(), 0x8002);
    assert_eq!(cpu.cycles(), 2);
}

#[test]
fn test_adc_signed_overflow() {
    let cpu = adc(0x7F, 0x01, false);

    assert_eq!(cpu.a(), 0x80);
    assert!(cpu.flag_v());
    assert!(cpu.flag_n());
    assert!(!cpu.flag_c());
    assert!(!cpu.flag_z());
}

#[test]
fn test_adc_unsigned_carry_out() {
    let cpu = adc(0xFF, 0x01, false);

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());
    assert!(!cpu.flag_v());
    assert!(!cpu.flag_n());
}

#[test]
fn test_adc_carry_in() {
    assert_eq!(adc(0x10, 0x05, true).a(), 0x16);
}

#[test]
fn test_adc_negative_overflow() {
    // -128 + -1 = +127 with overflow
    let cpu = adc(0x80, 0xFF, false);

    assert_eq!(cpu.a(), 0x7F);
    assert!(cpu.flag_v());
    assert!(cpu.flag_c());
    assert!(!cpu.flag_n());
}

// ========== Binary SBC ==========

#[test]
fn test_sbc_signed_underflow() {
    let cpu = sbc(0x80, 0x01, true);

    assert_eq!(cpu.a(), 0x7F);
    assert!(cpu.flag_v());
    assert!(cpu.flag_c());
    assert!(!cpu.flag_n());
}

#[test]
fn test_sbc_borrow() {
    let cpu = sbc(0x00, 0x01, true);

    assert_eq!(cpu.a(), 0xFF);
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n());
    assert!(!cpu.flag_v());
}

#[test]
fn test_sbc_borrow_in() {
    // Carry clear subtracts one more
    let cpu = sbc(0x10, 0x05, false);
    assert_eq!(cpu.a(), 0x0A);
    assert!(cpu.flag_c());
}

#[test]
fn test_sbc_equal_gives_zero() {
    let cpu = sbc(0x42, 0x42, true);
    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_z());
    assert!(cpu.flag_c());
}

// ========== Decimal Mode ==========

#[test]
fn test_adc_bcd_nibble_carry() {
    let cpu = adc_bcd(0x09, 0x01, false);
    assert_eq!(cpu.a(), 0x10);
    assert!(!cpu.flag_c());
}

#[test]
fn test_adc_bcd_carry_out() {
    // 58 + 46 = 104
    let cpu = adc_bcd(0x58, 0x46, false);
    assert_eq!(cpu.a(), 0x04);
    assert!(cpu.flag_c());
}

#[test]
fn test_adc_bcd_wraps_to_zero() {
    let cpu = adc_bcd(0x99, 0x00, true);
    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());
}

#[test]
fn test_adc_bcd_with_carry_in() {
    // 12 + 34 + 1 = 47
    assert_eq!(adc_bcd(0x12, 0x34, true).a(), 0x47);
}

#[test]
fn test_sbc_bcd_nibble_borrow() {
    let cpu = sbc_bcd(0x10, 0x01, true);
    assert_eq!(cpu.a(), 0x09);
    assert!(cpu.flag_c());
}

#[test]
fn test_sbc_bcd_wraps_below_zero() {
    let cpu = sbc_bcd(0x00, 0x01, true);
    assert_eq!(cpu.a(), 0x99);
    assert!(!cpu.flag_c());
}

#[test]
fn test_sbc_bcd_simple() {
    // 46 - 12 = 34
    let cpu = sbc_bcd(0x46, 0x12, true);
    assert_eq!(cpu.a(), 0x34);
    assert!(cpu.flag_c());
}

// ========== Compare ==========

#[test]
fn test_cmp_equal() {
    let cpu = run_immediate(0xC9, 0x40, 0x40, false, false);
    assert!(cpu.flag_z());
    assert!(cpu.flag_c());
    assert!(!cpu.flag_n());
    assert_eq!(cpu.a(), 0x40);
}

#[test]
fn test_cmp_less_than() {
    let cpu = run_immediate(0xC9, 0x40, 0x41, true, false);
    assert!(!cpu.flag_z());
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n());
}

#[test]
fn test_cmp_greater_than() {
    let cpu = run_immediate(0xC9, 0x40, 0x3F, false, false);
    assert!(!cpu.flag_z());
    assert!(cpu.flag_c());
}

#[test]
fn test_cpx_and_cpy() {
    let mut cpu = setup_cpu();
    // CPX #$10 / CPY #$20
    cpu.memory_mut().write(0x8000, 0xE0);
    cpu.memory_mut().write(0x8001, 0x10);
    cpu.memory_mut().write(0x8002, 0xC0);
    cpu.memory_mut().write(0x8003, 0x20);
    cpu.set_x(0x10);
    cpu.set_y(0x1F);

    cpu.step().unwrap();
    assert!(cpu.flag_z());
    assert!(cpu.flag_c());

    cpu.step().unwrap();
    assert!(!cpu.flag_z());
    assert!(!cpu.flag_c());
    assert_eq!(cpu.y(), 0x1F);
}

// ========== BIT ==========

#[test]
fn test_bit_copies_high_bits() {
    let mut cpu = setup_cpu();
    // BIT $10
    cpu.memory_mut().write(0x8000, 0x24);
    cpu.memory_mut().write(0x8001, 0x10);
    cpu.memory_mut().write(0x0010, 0xC0);
    cpu.set_a(0x01);

    cpu.step().unwrap();

    assert!(cpu.flag_n());
    assert!(cpu.flag_v());
    assert!(cpu.flag_z());
    assert_eq!(cpu.a(), 0x01);
    assert_eq!(cpu.cycles(), 3);
}

#[test]
fn test_bit_nonzero_mask() {
    let mut cpu = setup_cpu();
    // BIT $1234
    cpu.memory_mut().write(0x8000, 0x2C);
    cpu.memory_mut().write(0x8001, 0x34);
    cpu.memory_mut().write(0x8002, 0x12);
    cpu.memory_mut().write(0x1234, 0x01);
    cpu.set_a(0x01);

    cpu.step().unwrap();

    assert!(!cpu.flag_n());
    assert!(!cpu.flag_v());
    assert!(!cpu.flag_z());
}
