//! Apple-1 style terminal session
//!
//! Boots a small echo monitor in the Apple-1 ROM window, types a line on the
//! PIA keyboard and prints whatever the program sends to the display.
//!
//! Pass `-v` to print a listing of the start of the ROM first.

use std::env;
use std::io::{self, Write};

use retro6502::{Machine, MachineConfig};

const MONITOR: &str = r#"
KBD     = $D010
KBDCR   = $D011
DSP     = $D012

        *=$FF00
RESET   CLD
        LDX #0
BANNER  LDA TITLE,X
        BEQ PROMPT
        JSR ECHO
        INX
        BNE BANNER
PROMPT  LDA #$BE         ; '>'
        JSR ECHO
NEXT    LDA KBDCR        ; wait for a key
        BPL NEXT
        LDA KBD
        JSR ECHO
        CMP #$8D         ; return starts a new prompt
        BEQ PROMPT
        JMP NEXT
ECHO    BIT DSP          ; display ready when bit 7 is clear
        BMI ECHO
        STA DSP
        RTS
TITLE   .BYTE $8D,"RETRO6502",$8D,0

        *=$FFFC
        .WORD RESET
"#;

fn main() {
    let verbose = env::args().any(|arg| arg == "-v");

    let mut machine = match Machine::from_source(MachineConfig::apple1(), MONITOR) {
        Ok(machine) => machine,
        Err(err) => {
            eprintln!("boot failed: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = machine.set_output_callback(|ch| {
        let ch = if ch == b'\r' { b'\n' } else { ch };
        print!("{}", ch as char);
        let _ = io::stdout().flush();
    }) {
        eprintln!("{}", err);
        return;
    }

    if verbose {
        for token in machine.disassemble(0xFF00, 8) {
            println!("{}", token);
        }
    }

    if let Err(err) = machine.push_str("HELLO, WORLD\nAGAIN\n") {
        eprintln!("{}", err);
        return;
    }

    match machine.run(5_000) {
        Ok(steps) => println!("\n[{} instructions, {} cycles]", steps, machine.cpu().cycles()),
        Err(err) => eprintln!("\nhalted: {}", err),
    }
}
