//! # retro6502
//!
//! An NMOS 6502 CPU emulator with a two-pass assembler and a disassembler,
//! plus the memory-mapped devices needed to wire up small retro machines
//! (Apple-1, KIM-1, a custom single-board computer).
//!
//! The CPU never owns the address space: every access goes through the
//! [`MemoryBus`] trait, so a host decides what lives where.
//!
//! ## Quick Start
//!
//! ```rust
//! use retro6502::{assembler, CPU, FlatMemory};
//!
//! let mut memory = FlatMemory::new();
//!
//! // Assemble straight into memory; the reset vector is pointed at the code.
//! assembler::load("LDA #$05\nADC #$07\nBRK", &mut memory).unwrap();
//!
//! let mut cpu = CPU::new(memory);
//! assert_eq!(cpu.pc(), 0x0800);
//!
//! cpu.run_until_brk(100).unwrap();
//! assert_eq!(cpu.a(), 0x0C);
//! ```
//!
//! ## Modules
//!
//! - `cpu` - CPU state and execution logic
//! - `memory` - MemoryBus trait and implementations
//! - `opcodes` - Opcode metadata table and mnemonics
//! - `addressing` - Addressing mode enumerations
//! - `assembler` - Source text to machine code
//! - `disassembler` - Machine code back to text
//! - `devices` - Memory-mapped RAM, ROM and terminal devices
//! - `machine` - Machine presets built from devices
//! - `wasm` - Browser binding (feature `wasm`)

pub mod addressing;
pub mod assembler;
pub mod cpu;
pub mod devices;
pub mod disassembler;
pub mod machine;
pub mod memory;
pub mod opcodes;

#[cfg(feature = "wasm")]
pub mod wasm;

// Internal instruction implementations (not part of public API)
mod instructions;

// Re-export public API
pub use addressing::AddressingMode;
pub use assembler::{assemble, AssemblerError, AssemblerOutput, CodePages, ErrorType};
pub use cpu::CPU;
pub use devices::{Device, DeviceError, MappedMemory, PiaTerminal, RamDevice, RomDevice};
pub use disassembler::{disassemble, DisassemblyToken};
pub use machine::{Machine, MachineConfig, MachineError, Region};
pub use memory::{CallbackMemory, FlatMemory, MemoryBus};
pub use opcodes::{decode, lookup, Mnemonic, OpcodeMetadata, OPCODE_TABLE};

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// The byte at PC is not one of the documented NMOS opcodes.
    #[error("undefined opcode ${opcode:02X} at ${pc:04X}")]
    Decode { opcode: u8, pc: u16 },
}
