//! Basic assembler usage example

use retro6502::assembler::assemble;

fn main() {
    let source = r#"
        *=$0800
COUNT   = 3
START   LDX #COUNT      ; count down from three
LOOP    DEX
        BNE LOOP
        LDA #<MSG
        STA $10
        LDA #>MSG
        STA $11
        JMP DONE
MSG     .BYTE "HELLO",$0D,0
DONE    BRK
    "#;

    match assemble(source) {
        Ok(output) => {
            println!("Assembled {} bytes:", output.pages.len());
            println!("{}", output.pages.hex_dump());
            println!();
            println!("Symbols:");
            for symbol in &output.symbols {
                println!("  {:<8} ${:04X}  (line {})", symbol.name, symbol.address, symbol.defined_at);
            }
        }
        Err(errors) => {
            eprintln!("Assembly failed:");
            for error in errors {
                eprintln!("  {}", error);
            }
        }
    }
}
