//! End-to-end programs: assemble, load, run, inspect.
//!
//! Each test assembles a small program at the default origin, lets
//! `assembler::load` point the reset vector at it, and runs until the CPU
//! reaches a BRK.

use retro6502::{assembler, FlatMemory, CPU};

fn run_program(source: &str) -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    assembler::load(source, &mut memory).unwrap();

    let mut cpu = CPU::with_seed(memory, 42);
    cpu.run_until_brk(10_000).unwrap();
    cpu
}

// ========== Documented Scenarios ==========

#[test]
fn test_indexed_indirect_load() {
    let cpu = run_program(
        "
        LDX #$01
        LDA #$05
        STA $01
        LDA #$07
        STA $02
        LDY #$0A
        STY $0705
        LDA ($00,X)
        ",
    );

    assert_eq!(cpu.a(), 0x0A);
    assert_eq!(cpu.memory().peek(0x0705), 0x0A);
}

#[test]
fn test_fibonacci_thirteenth_term() {
    let cpu = run_program(
        "
        LDA #0
        STA $00          ; previous term
        LDA #1
        STA $01          ; current term
        LDX #12          ; additions
LOOP    LDA $00
        CLC
        ADC $01
        LDY $01
        STY $00
        STA $01
        DEX
        BNE LOOP
        LDA $01
        BRK
        ",
    );

    assert_eq!(cpu.a(), 233);
    assert_eq!(cpu.memory().peek(0x00), 144);
    assert_eq!(cpu.x(), 0);
}

#[test]
fn test_add_with_carry_wraps() {
    let cpu = run_program("SEC\nLDA #$FF\nADC #$01");

    assert_eq!(cpu.a(), 0x01);
    assert!(cpu.flag_c());
    assert!(!cpu.flag_z());
}

// ========== Larger Programs ==========

#[test]
fn test_fill_page_loop() {
    let cpu = run_program(
        "
        LDX #$00
        LDY #$00
LOOP    TXA
        STA $0200,Y
        INX
        INY
        CPY #$10
        BNE LOOP
        ",
    );

    for i in 0..0x10u16 {
        assert_eq!(cpu.memory().peek(0x0200 + i), i as u8);
    }
    assert_eq!(cpu.memory().peek(0x0210), 0x00);
}

#[test]
fn test_subroutine_and_pointer_copy() {
    let cpu = run_program(
        "
SRC     = $0900
DST     = $0A00
        LDA #<SRC
        STA $10
        LDA #>SRC
        STA $11
        JSR COPY
        BRK
COPY    LDY #$00
NEXT    LDA ($10),Y
        BEQ DONE
        STA DST,Y
        INY
        BNE NEXT
DONE    RTS
        *=$0900
        .BYTE \"HELLO\",0
        ",
    );

    let copied: Vec<u8> = (0..5).map(|i| cpu.memory().peek(0x0A00 + i)).collect();
    assert_eq!(copied, b"HELLO".to_vec());
    assert_eq!(cpu.y(), 5);
}

#[test]
fn test_decimal_counter() {
    // Count 0..=99 in BCD; stores the final value
    let cpu = run_program(
        "
        SED
        LDA #$00
        LDX #99
LOOP    CLC
        ADC #$01
        DEX
        BNE LOOP
        STA $20
        CLD
        ",
    );

    assert_eq!(cpu.memory().peek(0x20), 0x99);
    assert!(!cpu.flag_d());
}

#[test]
fn test_multiply_by_shift_and_add() {
    // 13 * 11 with the classic shift-and-add loop, 8-bit result
    let cpu = run_program(
        "
        LDA #0
        STA $02          ; product
        LDA #13
        STA $00          ; multiplicand
        LDA #11
        STA $01          ; multiplier
        LDX #8
LOOP    LSR $01
        BCC SKIP
        LDA $02
        CLC
        ADC $00
        STA $02
SKIP    ASL $00
        DEX
        BNE LOOP
        LDA $02
        ",
    );

    assert_eq!(cpu.a(), 143);
}

#[test]
fn test_cycle_count_accumulates() {
    // LDA #imm (2) + STA zp (3) + NOP (2)
    let cpu = run_program("LDA #$01\nSTA $10\nNOP");
    assert_eq!(cpu.cycles(), 7);
}
