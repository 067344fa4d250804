//! Basic disassembler usage example

use retro6502::disassembler::{disassemble, to_source};

fn main() {
    let code = &[
        0xA9, 0x42, // LDA #$42
        0x8D, 0x00, 0x80, // STA $8000
        0x02, // undefined
        0xD0, 0xF9, // BNE back to start
        0x4C, 0x00, 0x80, // JMP $8000
    ];

    let tokens = disassemble(code, 0x8000);

    println!("Listing:");
    for token in &tokens {
        println!("{}", token);
    }

    println!();
    println!("Reassemblable source:");
    print!("{}", to_source(&tokens));
}
