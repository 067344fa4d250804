//! Disassembler listing tests.

use retro6502::disassembler::{self, disassemble_memory, disassemble_pages, to_source};
use retro6502::{assemble, disassemble, FlatMemory};

#[test]
fn test_listing_line_layout() {
    let tokens = disassemble(&[0xA9, 0x05, 0x8D, 0x00, 0x02, 0x00], 0x0800);

    let lines: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    assert_eq!(
        lines,
        vec![
            "$0800   A9 05      LDA #$05   ; load accumulator",
            "$0802   8D 00 02   STA $0200   ; store accumulator",
            "$0805   00         BRK   ; break / interrupt",
        ]
    );
}

#[test]
fn test_every_operand_form() {
    let program = [
        0xEA, // NOP
        0x0A, // ASL
        0xA9, 0x01, // LDA #$01
        0xA5, 0x10, // LDA $10
        0xB5, 0x10, // LDA $10,X
        0xB6, 0x10, // LDX $10,Y
        0xAD, 0x34, 0x12, // LDA $1234
        0xBD, 0x34, 0x12, // LDA $1234,X
        0xB9, 0x34, 0x12, // LDA $1234,Y
        0x6C, 0x34, 0x12, // JMP ($1234)
        0xA1, 0x10, // LDA ($10,X)
        0xB1, 0x10, // LDA ($10),Y
    ];

    let text: Vec<String> = disassemble(&program, 0x0800)
        .iter()
        .map(|t| t.text())
        .collect();
    assert_eq!(
        text,
        vec![
            "NOP",
            "ASL",
            "LDA #$01",
            "LDA $10",
            "LDA $10,X",
            "LDX $10,Y",
            "LDA $1234",
            "LDA $1234,X",
            "LDA $1234,Y",
            "JMP ($1234)",
            "LDA ($10,X)",
            "LDA ($10),Y",
        ]
    );
}

#[test]
fn test_branch_shows_target_address() {
    // BNE back to itself, BEQ forward over a NOP
    let tokens = disassemble(&[0xD0, 0xFE, 0xF0, 0x01, 0xEA, 0x60], 0x0900);
    assert_eq!(tokens[0].text(), "BNE $0900");
    assert_eq!(tokens[1].text(), "BEQ $0905");
}

#[test]
fn test_undefined_bytes_become_data() {
    let tokens = disassemble(&[0xFF, 0xEA, 0x02], 0x1000);

    assert_eq!(tokens.len(), 3);
    assert!(tokens[0].is_data());
    assert_eq!(tokens[0].text(), ".BYTE $FF");
    assert_eq!(tokens[0].description, "undefined opcode");
    assert!(!tokens[1].is_data());
    assert_eq!(tokens[2].address, 0x1002);
}

#[test]
fn test_tokens_tile_the_input() {
    let input: Vec<u8> = (0..=255u8).collect();
    let tokens = disassemble(&input, 0x4000);

    let total: usize = tokens.iter().map(|t| t.len()).sum();
    assert_eq!(total, input.len());
    for pair in tokens.windows(2) {
        assert_eq!(pair[0].address as usize + pair[0].len(), pair[1].address as usize);
    }
}

#[test]
fn test_address_wraps_at_top_of_memory() {
    let tokens = disassemble(&[0xEA, 0xEA], 0xFFFF);
    assert_eq!(tokens[1].address, 0x0000);
}

#[test]
fn test_disassemble_memory_follows_lengths() {
    let mut memory = FlatMemory::new();
    memory.load(0x0200, &[0xA2, 0x00, 0xE8, 0xD0, 0xFD, 0x00]);

    let tokens = disassemble_memory(&mut memory, 0x0200, 4);
    let text: Vec<String> = tokens.iter().map(|t| t.text()).collect();
    assert_eq!(text, vec!["LDX #$00", "INX", "BNE $0202", "BRK"]);
}

#[test]
fn test_pages_round_trip_through_source() {
    let original = assemble(
        "
        *=$0C00
START   LDY #$00
LOOP    LDA TABLE,Y
        STA $0400,Y
        INY
        CPY #$04
        BNE LOOP
        RTS
TABLE   .BYTE $10,$20,$30,$40
        *=$0D00
        JSR START
        ",
    )
    .unwrap();

    let tokens = disassemble_pages(&original.pages);
    let source = to_source(&tokens);
    assert!(source.starts_with("*=$0C00\n"));
    assert!(source.contains("\n*=$0D00\nJSR $0C00"));

    let again = assemble(&source).unwrap();
    assert_eq!(again.pages, original.pages);
}

#[test]
fn test_forward_reference_into_zero_page_round_trips() {
    // DATA is unknown when LDA is encoded, so it keeps the absolute width
    let first = assemble("*=$0000\nLDA DATA\nDATA .BYTE 1").unwrap();
    assert_eq!(first.pages.hex_dump().lines().next(), Some("0000: AD 03 00 01 . . . . . . . . . . . ."));

    let tokens = disassemble_pages(&first.pages);
    assert_eq!(tokens[0].text(), "LDA !$0003");

    let again = assemble(&to_source(&tokens)).unwrap();
    assert_eq!(again.pages, first.pages);
}

#[test]
fn test_listing_is_public_per_line() {
    let tokens = disassembler::disassemble(&[0x4C, 0x00, 0xC0], 0xE000);
    assert_eq!(
        tokens[0].to_string(),
        "$E000   4C 00 C0   JMP $C000   ; jump"
    );
}
