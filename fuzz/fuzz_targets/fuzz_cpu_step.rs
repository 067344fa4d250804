//! Fuzz target for CPU step execution.
//!
//! Builds an arbitrary CPU state and memory image, then executes a few
//! instructions. Undefined opcodes must surface as errors, never panics.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use retro6502::{ExecutionError, FlatMemory, MemoryBus, CPU};

#[derive(Debug, Arbitrary)]
struct FuzzCpuState {
    a: u8,
    x: u8,
    y: u8,
    sp: u8,
    status: u8,
    seed: u64,
}

#[derive(Debug, Arbitrary)]
struct FuzzMemory {
    /// Bytes at 0x8000 (instructions and operands)
    program: [u8; 16],
    zero_page: [u8; 256],
    stack_page: [u8; 256],
    /// Contents of 0x4000-0x40FF, reached by absolute operands
    main_memory: [u8; 256],
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    cpu_state: FuzzCpuState,
    memory: FuzzMemory,
}

fuzz_target!(|input: FuzzInput| {
    let mut memory = FlatMemory::new();
    memory.load(0xFFFC, &[0x00, 0x80]);
    memory.load(0xFFFE, &[0x00, 0x90]);
    memory.load(0x8000, &input.memory.program);
    memory.load(0x0000, &input.memory.zero_page);
    memory.load(0x0100, &input.memory.stack_page);
    memory.load(0x4000, &input.memory.main_memory);

    let mut cpu = CPU::with_seed(memory, input.cpu_state.seed);
    cpu.set_a(input.cpu_state.a);
    cpu.set_x(input.cpu_state.x);
    cpu.set_y(input.cpu_state.y);
    cpu.set_sp(input.cpu_state.sp);
    cpu.set_status(input.cpu_state.status);

    for _ in 0..4 {
        let pc = cpu.pc();
        let cycles = cpu.cycles();
        match cpu.step() {
            Ok(()) => assert!(cpu.cycles() >= cycles + 2),
            Err(ExecutionError::Decode { opcode, pc: at }) => {
                assert_eq!(at, pc);
                assert_eq!(cpu.pc(), pc);
                assert_eq!(cpu.memory_mut().read(pc), opcode);
                break;
            }
        }
        assert_eq!(cpu.status() & 0x30, 0x20);
    }
});
