//! Property-based tests for CPU execution.

use proptest::prelude::*;
use retro6502::{FlatMemory, MemoryBus, CPU};

/// Helper function to create a CPU with reset vector at 0x8000
fn setup_cpu(seed: u64) -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    CPU::with_seed(memory, seed)
}

proptest! {
    /// Property: reset clears every flag except I, whatever the seed
    #[test]
    fn prop_reset_state(seed in any::<u64>()) {
        let cpu = setup_cpu(seed);
        prop_assert_eq!(cpu.pc(), 0x8000);
        prop_assert_eq!(cpu.status(), 0b0010_0100);
        prop_assert_eq!(cpu.cycles(), 0);
    }

    /// Property: binary ADC matches integer addition
    #[test]
    fn prop_adc_binary(a in any::<u8>(), m in any::<u8>(), carry in any::<bool>()) {
        let mut cpu = setup_cpu(1);
        cpu.memory_mut().load(0x8000, &[0x69, m]); // ADC #m
        cpu.set_a(a);
        cpu.set_flag_c(carry);

        cpu.step().unwrap();

        let sum = a as u16 + m as u16 + carry as u16;
        let result = sum as u8;
        prop_assert_eq!(cpu.a(), result);
        prop_assert_eq!(cpu.flag_c(), sum > 0xFF);
        prop_assert_eq!(cpu.flag_z(), result == 0);
        prop_assert_eq!(cpu.flag_n(), result & 0x80 != 0);
        let signed = a as i8 as i16 + m as i8 as i16 + carry as i16;
        prop_assert_eq!(cpu.flag_v(), !(-128..=127).contains(&signed));
    }

    /// Property: SBC is ADC of the one's complement
    #[test]
    fn prop_sbc_binary(a in any::<u8>(), m in any::<u8>(), carry in any::<bool>()) {
        let mut cpu = setup_cpu(2);
        cpu.memory_mut().load(0x8000, &[0xE9, m]); // SBC #m
        cpu.set_a(a);
        cpu.set_flag_c(carry);

        cpu.step().unwrap();

        let diff = a as i16 - m as i16 - (!carry) as i16;
        prop_assert_eq!(cpu.a(), diff as u8);
        prop_assert_eq!(cpu.flag_c(), diff >= 0);
    }

    /// Property: CMP sets C, Z and N from A - M without touching A
    #[test]
    fn prop_cmp_flags(a in any::<u8>(), m in any::<u8>()) {
        let mut cpu = setup_cpu(3);
        cpu.memory_mut().load(0x8000, &[0xC9, m]); // CMP #m
        cpu.set_a(a);

        cpu.step().unwrap();

        prop_assert_eq!(cpu.a(), a);
        prop_assert_eq!(cpu.flag_c(), a >= m);
        prop_assert_eq!(cpu.flag_z(), a == m);
        prop_assert_eq!(cpu.flag_n(), a.wrapping_sub(m) & 0x80 != 0);
    }

    /// Property: pushed values come back in reverse order
    #[test]
    fn prop_stack_lifo(values in prop::collection::vec(any::<u8>(), 1..32)) {
        let mut cpu = setup_cpu(4);
        cpu.set_sp(0xFF);

        let mut program = Vec::new();
        for value in &values {
            program.extend_from_slice(&[0xA9, *value, 0x48]); // LDA #v / PHA
        }
        for _ in &values {
            program.extend_from_slice(&[0x68, 0x9D, 0x00, 0x02, 0xE8]); // PLA / STA $0200,X / INX
        }
        cpu.memory_mut().load(0x8000, &program);
        cpu.set_x(0);

        for _ in 0..(values.len() * 5) {
            cpu.step().unwrap();
        }

        prop_assert_eq!(cpu.sp(), 0xFF);
        for (i, value) in values.iter().rev().enumerate() {
            prop_assert_eq!(cpu.memory().peek(0x0200 + i as u16), *value);
        }
    }

    /// Property: a taken branch lands at PC + 2 + signed offset
    #[test]
    fn prop_branch_displacement(offset in any::<u8>(), start in 0x1000u16..0xE000) {
        let mut cpu = setup_cpu(5);
        cpu.memory_mut().load(start, &[0x90, offset]); // BCC
        cpu.set_pc(start);
        cpu.set_flag_c(false);

        cpu.step().unwrap();

        let next = start + 2;
        let target = next.wrapping_add_signed(offset as i8 as i16);
        prop_assert_eq!(cpu.pc(), target);
        let crossed = (next & 0xFF00) != (target & 0xFF00);
        prop_assert_eq!(cpu.cycles(), if crossed { 4 } else { 3 });
    }

    /// Property: the pushed status always has bit 5 set; B only from PHP/BRK
    #[test]
    fn prop_php_sets_break_bits(status in any::<u8>()) {
        let mut cpu = setup_cpu(6);
        cpu.memory_mut().write(0x8000, 0x08); // PHP
        cpu.set_sp(0xFF);
        cpu.set_status(status);

        cpu.step().unwrap();

        let pushed = cpu.memory().peek(0x01FF);
        prop_assert_eq!(pushed, status | 0x30);
        prop_assert_eq!(cpu.status() & 0x30, 0x20);
    }
}
