//! Effective-address computation for every addressing mode.
//!
//! Tests cover:
//! - Zero-page indexing wraps inside page 0
//! - Absolute indexing and (zp),Y wrap at 0xFFFF
//! - Indirect pointers read a plain little-endian word
//! - Relative branches: offsets, taken and page-cross cycles

use retro6502::{ExecutionError, FlatMemory, MemoryBus, CPU};

/// Helper function to create a CPU with reset vector at 0x8000
fn setup_cpu() -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.load(0xFFFC, &[0x00, 0x80]);
    CPU::with_seed(memory, 5)
}

fn setup_at(pc: u16, program: &[u8]) -> CPU<FlatMemory> {
    let mut cpu = setup_cpu();
    cpu.memory_mut().load(pc, program);
    cpu.set_pc(pc);
    cpu
}

// ========== Load Modes ==========

#[test]
fn test_zero_page() {
    let mut cpu = setup_at(0x8000, &[0xA5, 0x42]); // LDA $42
    cpu.memory_mut().write(0x0042, 0x99);
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x99);
    assert_eq!(cpu.cycles(), 3);
}

#[test]
fn test_zero_page_x_wraps() {
    let mut cpu = setup_at(0x8000, &[0xB5, 0xFF]); // LDA $FF,X
    cpu.memory_mut().write(0x0001, 0x11);
    cpu.memory_mut().write(0x0101, 0x22);
    cpu.set_x(0x02);
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x11);
}

#[test]
fn test_zero_page_y_wraps() {
    let mut cpu = setup_at(0x8000, &[0xB6, 0xF0]); // LDX $F0,Y
    cpu.memory_mut().write(0x0010, 0x33);
    cpu.set_y(0x20);
    cpu.step().unwrap();
    assert_eq!(cpu.x(), 0x33);
}

#[test]
fn test_absolute_little_endian() {
    let mut cpu = setup_at(0x8000, &[0xAD, 0x34, 0x12]); // LDA $1234
    cpu.memory_mut().write(0x1234, 0x5A);
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x5A);
    assert_eq!(cpu.pc(), 0x8003);
}

#[test]
fn test_absolute_y() {
    let mut cpu = setup_at(0x8000, &[0xB9, 0xF0, 0x20]); // LDA $20F0,Y
    cpu.memory_mut().write(0x2110, 0x77);
    cpu.set_y(0x20);
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x77);
}

#[test]
fn test_absolute_x_wraps_address_space() {
    let mut cpu = setup_at(0x8000, &[0xBD, 0xFF, 0xFF]); // LDA $FFFF,X
    cpu.memory_mut().write(0x0000, 0x44);
    cpu.set_x(0x01);
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x44);
}

#[test]
fn test_indexed_indirect() {
    let mut cpu = setup_at(0x8000, &[0xA1, 0x20]); // LDA ($20,X)
    cpu.memory_mut().load(0x0024, &[0x00, 0x30]);
    cpu.memory_mut().write(0x3000, 0xAB);
    cpu.set_x(0x04);
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0xAB);
    assert_eq!(cpu.cycles(), 6);
}

#[test]
fn test_indexed_indirect_pointer_at_top_of_zero_page() {
    let mut cpu = setup_at(0x8000, &[0xA1, 0xFE]); // LDA ($FE,X)
    // X=1 puts the pointer at $FF/$100
    cpu.memory_mut().write(0x00FF, 0x00);
    cpu.memory_mut().write(0x0100, 0x40);
    cpu.memory_mut().write(0x0000, 0x50);
    cpu.memory_mut().write(0x4000, 0xCD);
    cpu.set_x(0x01);
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0xCD);
}

#[test]
fn test_indirect_indexed() {
    let mut cpu = setup_at(0x8000, &[0xB1, 0x10]); // LDA ($10),Y
    cpu.memory_mut().load(0x0010, &[0xF0, 0x30]);
    cpu.memory_mut().write(0x3105, 0xEE);
    cpu.set_y(0x15);
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0xEE);
}

#[test]
fn test_indirect_indexed_wraps_address_space() {
    let mut cpu = setup_at(0x8000, &[0xB1, 0x10]); // LDA ($10),Y
    cpu.memory_mut().load(0x0010, &[0xFF, 0xFF]);
    cpu.memory_mut().write(0x0001, 0x5C);
    cpu.set_y(0x02);
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x5C);
}

// ========== Store and Read-Modify-Write ==========

#[test]
fn test_store_consumes_address() {
    let mut cpu = setup_at(0x8000, &[0x9D, 0x00, 0x02]); // STA $0200,X
    cpu.set_a(0x42);
    cpu.set_x(0x05);
    cpu.step().unwrap();
    assert_eq!(cpu.memory().peek(0x0205), 0x42);
    assert_eq!(cpu.cycles(), 5);
}

#[test]
fn test_inc_memory() {
    let mut cpu = setup_at(0x8000, &[0xE6, 0x10]); // INC $10
    cpu.memory_mut().write(0x0010, 0xFF);
    cpu.step().unwrap();
    assert_eq!(cpu.memory().peek(0x0010), 0x00);
    assert!(cpu.flag_z());
    assert_eq!(cpu.cycles(), 5);
}

#[test]
fn test_asl_accumulator_and_memory() {
    let mut cpu = setup_at(0x8000, &[0x0A, 0x06, 0x10]); // ASL A / ASL $10
    cpu.set_a(0x81);
    cpu.memory_mut().write(0x0010, 0x40);

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x02);
    assert!(cpu.flag_c());

    cpu.step().unwrap();
    assert_eq!(cpu.memory().peek(0x0010), 0x80);
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n());
    assert_eq!(cpu.a(), 0x02);
}

#[test]
fn test_rotates_through_carry() {
    let mut cpu = setup_at(0x8000, &[0x2A, 0x6A, 0x6A]); // ROL A / ROR A / ROR A
    cpu.set_a(0x80);
    cpu.set_flag_c(false);

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x80);
    assert!(!cpu.flag_c());

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x40);
}

// ========== Jumps ==========

#[test]
fn test_jmp_absolute() {
    let mut cpu = setup_at(0x8000, &[0x4C, 0x00, 0x90]);
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x9000);
    assert_eq!(cpu.cycles(), 3);
}

#[test]
fn test_jmp_indirect() {
    let mut cpu = setup_at(0x8000, &[0x6C, 0x00, 0x30]); // JMP ($3000)
    cpu.memory_mut().load(0x3000, &[0x78, 0x56]);
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x5678);
}

#[test]
fn test_jmp_indirect_pointer_crosses_page() {
    let mut cpu = setup_at(0x8000, &[0x6C, 0xFF, 0x30]); // JMP ($30FF)
    cpu.memory_mut().write(0x30FF, 0x34);
    cpu.memory_mut().write(0x3100, 0x12);
    cpu.memory_mut().write(0x3000, 0x56);
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x1234);
}

// ========== Branches ==========

#[test]
fn test_branch_not_taken() {
    let mut cpu = setup_at(0x8000, &[0xD0, 0x10]); // BNE +16
    cpu.set_flag_z(true);
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x8002);
    assert_eq!(cpu.cycles(), 2);
}

#[test]
fn test_branch_forward_taken() {
    let mut cpu = setup_at(0x8000, &[0xF0, 0x10]); // BEQ +16
    cpu.set_flag_z(true);
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x8012);
    assert_eq!(cpu.cycles(), 3);
}

#[test]
fn test_branch_backward_taken() {
    let mut cpu = setup_at(0x8010, &[0x90, 0xFC]); // BCC -4
    cpu.set_flag_c(false);
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x800E);
}

#[test]
fn test_branch_page_cross_cycle() {
    let mut cpu = setup_at(0x80F0, &[0x10, 0x20]); // BPL +32
    cpu.set_flag_n(false);
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x8112);
    assert_eq!(cpu.cycles(), 4);
}

#[test]
fn test_every_branch_condition() {
    // (opcode, flag setter, flag value that takes the branch)
    let cases: [(u8, fn(&mut CPU<FlatMemory>, bool), bool); 8] = [
        (0x10, CPU::set_flag_n, false), // BPL
        (0x30, CPU::set_flag_n, true),  // BMI
        (0x50, CPU::set_flag_v, false), // BVC
        (0x70, CPU::set_flag_v, true),  // BVS
        (0x90, CPU::set_flag_c, false), // BCC
        (0xB0, CPU::set_flag_c, true),  // BCS
        (0xD0, CPU::set_flag_z, false), // BNE
        (0xF0, CPU::set_flag_z, true),  // BEQ
    ];

    for (opcode, set_flag, taken_when) in cases {
        let mut cpu = setup_at(0x8000, &[opcode, 0x08]);
        set_flag(&mut cpu, taken_when);
        cpu.step().unwrap();
        assert_eq!(cpu.pc(), 0x800A, "opcode {:02X} should branch", opcode);

        let mut cpu = setup_at(0x8000, &[opcode, 0x08]);
        set_flag(&mut cpu, !taken_when);
        cpu.step().unwrap();
        assert_eq!(cpu.pc(), 0x8002, "opcode {:02X} should fall through", opcode);
    }
}

// ========== Undefined Opcodes ==========

#[test]
fn test_undefined_opcode_faults() {
    let mut cpu = setup_at(0x8000, &[0x02]);
    let err = cpu.step().unwrap_err();
    assert_eq!(
        err,
        ExecutionError::Decode {
            opcode: 0x02,
            pc: 0x8000
        }
    );
    assert_eq!(err.to_string(), "undefined opcode $02 at $8000");
    assert_eq!(cpu.pc(), 0x8000);
    assert_eq!(cpu.cycles(), 0);
}
