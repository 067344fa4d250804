//! Fuzz target for the assembler.
//!
//! Feeds arbitrary text to the assembler. Errors are expected; panics are not.
//! Successful output is also disassembled and the listing reassembled.

#![no_main]

use libfuzzer_sys::fuzz_target;
use retro6502::{assemble, disassembler};

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);
    let Ok(output) = assemble(&source) else {
        return;
    };

    assert_eq!(output.pages.iter().count(), output.pages.len());
    let _ = output.pages.hex_dump();

    // Absolute operands below $0100 come back as zero page, so only
    // panics are checked here.
    let tokens = disassembler::disassemble_pages(&output.pages);
    let _ = assemble(&disassembler::to_source(&tokens));
});
