//! Fuzz target for the disassembler.
//!
//! Arbitrary bytes must decode into tokens that tile the input exactly.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use retro6502::disassemble;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    start_address: u16,
    bytes: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    if input.bytes.len() > 65536 {
        return;
    }

    let tokens = disassemble(&input.bytes, input.start_address);

    let mut total_size: usize = 0;
    let mut expected_address = input.start_address;

    for token in &tokens {
        assert_eq!(token.address, expected_address);
        assert!((1..=3).contains(&token.len()));
        if token.is_data() {
            assert_eq!(token.len(), 1);
            assert!(token.text().starts_with(".BYTE $"));
        }

        total_size += token.len();
        expected_address = expected_address.wrapping_add(token.len() as u16);
    }

    assert_eq!(total_size, input.bytes.len());
});
