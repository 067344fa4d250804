//! # CPU State and Execution
//!
//! This module contains the CPU struct representing the 6502 processor state and
//! the fetch-decode-execute loop.
//!
//! ## CPU State
//!
//! The CPU maintains:
//! - **Registers**: Accumulator (A), index registers (X, Y)
//! - **Program counter** (PC): 16-bit address of next instruction
//! - **Stack pointer** (SP): 8-bit offset into stack page (0x0100-0x01FF)
//! - **Status flags**: N, V, D, I, Z, C (individual bool fields)
//! - **Cycle counter**: u64 monotonically increasing cycle count
//!
//! The break flag has no storage of its own: it only exists in the status byte
//! pushed by BRK and PHP.
//!
//! ## Execution Model
//!
//! `step()` executes exactly one instruction:
//! 1. Fetch the opcode through [`MemoryBus::fetch_opcode`]
//! 2. Decode it through the opcode table (undefined opcodes fail)
//! 3. Compute the effective address for the addressing mode
//! 4. Advance PC past the instruction
//! 5. Execute the instruction body
//!
//! Advancing PC before the body runs is what makes branch displacements, JSR's
//! pushed return address and BRK's pushed PC come out the way the hardware
//! produces them.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

use crate::addressing::AddressingMode;
use crate::instructions;
use crate::opcodes::decode;
use crate::{ExecutionError, MemoryBus};

/// Address of the NMI vector (low byte).
pub const NMI_VECTOR: u16 = 0xFFFA;

/// Address of the reset vector (low byte).
pub const RESET_VECTOR: u16 = 0xFFFC;

/// Address of the IRQ/BRK vector (low byte).
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Base address of the hardware stack page.
pub const STACK_BASE: u16 = 0x0100;

pub(crate) const FLAG_N: u8 = 0b1000_0000;
pub(crate) const FLAG_V: u8 = 0b0100_0000;
pub(crate) const FLAG_UNUSED: u8 = 0b0010_0000;
pub(crate) const FLAG_B: u8 = 0b0001_0000;
pub(crate) const FLAG_D: u8 = 0b0000_1000;
pub(crate) const FLAG_I: u8 = 0b0000_0100;
pub(crate) const FLAG_Z: u8 = 0b0000_0010;
pub(crate) const FLAG_C: u8 = 0b0000_0001;

/// Where an instruction's operand lives.
///
/// Implied and accumulator instructions have no address and work on A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No memory operand.
    None,
    /// Effective address of the operand byte.
    Address(u16),
}

/// 6502 CPU state and execution context.
///
/// The CPU struct contains all processor state including registers, flags,
/// program counter, stack pointer, and cycle counter. It is generic over the
/// memory implementation via the `MemoryBus` trait.
///
/// # Examples
///
/// ```
/// use retro6502::{CPU, FlatMemory, MemoryBus};
///
/// let mut memory = FlatMemory::new();
/// memory.write(0xFFFC, 0x00);
/// memory.write(0xFFFD, 0x80);
///
/// let cpu = CPU::new(memory);
///
/// assert_eq!(cpu.pc(), 0x8000);
/// assert!(cpu.flag_i());
/// assert_eq!(cpu.cycles(), 0);
/// ```
pub struct CPU<M: MemoryBus> {
    /// Accumulator register
    pub(crate) a: u8,

    /// X index register
    pub(crate) x: u8,

    /// Y index register
    pub(crate) y: u8,

    /// Program counter (address of next instruction)
    pub(crate) pc: u16,

    /// Stack pointer (0x0100 + sp gives full stack address)
    pub(crate) sp: u8,

    /// Negative flag (set if bit 7 of result is 1)
    pub(crate) flag_n: bool,

    /// Overflow flag (set on signed overflow)
    pub(crate) flag_v: bool,

    /// Decimal mode flag (enables BCD arithmetic)
    pub(crate) flag_d: bool,

    /// Interrupt disable flag (blocks IRQ when set)
    pub(crate) flag_i: bool,

    /// Zero flag (set if result is zero)
    pub(crate) flag_z: bool,

    /// Carry flag (set on unsigned overflow/underflow)
    pub(crate) flag_c: bool,

    /// Total CPU cycles executed
    pub(crate) cycles: u64,

    /// xorshift state used to scramble registers on reset
    rng_state: u64,

    /// Memory bus implementation
    pub(crate) memory: M,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a new CPU on the given memory bus and resets it.
    ///
    /// A, X, Y and SP come up with unpredictable values, as on real hardware.
    /// Use [`CPU::with_seed`] when a reproducible power-on state is needed.
    pub fn new(memory: M) -> Self {
        let seed = RandomState::new().build_hasher().finish();
        Self::with_seed(memory, seed)
    }

    /// Creates a new CPU whose reset-time register scrambling is driven by `seed`.
    ///
    /// ```
    /// use retro6502::{CPU, FlatMemory};
    ///
    /// let a = CPU::with_seed(FlatMemory::new(), 7);
    /// let b = CPU::with_seed(FlatMemory::new(), 7);
    /// assert_eq!((a.a(), a.x(), a.y(), a.sp()), (b.a(), b.x(), b.y(), b.sp()));
    /// ```
    pub fn with_seed(memory: M, seed: u64) -> Self {
        let mut cpu = Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0,
            flag_n: false,
            flag_v: false,
            flag_d: false,
            flag_i: true,
            flag_z: false,
            flag_c: false,
            cycles: 0,
            rng_state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
            memory,
        };
        cpu.reset();
        cpu
    }

    /// Performs a hardware reset.
    ///
    /// - A, X, Y and SP are randomized (their power-up state is undefined)
    /// - all flags are cleared except I, which is set
    /// - PC is loaded from the reset vector at 0xFFFC/0xFFFD (little-endian)
    ///
    /// The cycle counter is not touched.
    pub fn reset(&mut self) {
        self.a = self.next_random();
        self.x = self.next_random();
        self.y = self.next_random();
        self.sp = self.next_random();

        self.flag_n = false;
        self.flag_v = false;
        self.flag_d = false;
        self.flag_i = true;
        self.flag_z = false;
        self.flag_c = false;

        self.pc = self.memory.read_word(RESET_VECTOR);
        log::debug!("reset: PC=${:04X} SP=${:02X}", self.pc, self.sp);
    }

    /// Executes one instruction and advances the CPU state.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Decode`] when the byte at PC is not a
    /// documented opcode. PC is left pointing at that byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use retro6502::{CPU, FlatMemory, MemoryBus};
    ///
    /// let mut mem = FlatMemory::new();
    /// mem.write(0xFFFC, 0x00);
    /// mem.write(0xFFFD, 0x80);
    /// mem.write(0x8000, 0xA9); // LDA #$42
    /// mem.write(0x8001, 0x42);
    ///
    /// let mut cpu = CPU::new(mem);
    /// cpu.step().unwrap();
    /// assert_eq!(cpu.a(), 0x42);
    /// assert_eq!(cpu.pc(), 0x8002);
    /// ```
    pub fn step(&mut self) -> Result<(), ExecutionError> {
        let pc = self.pc;
        let opcode = self.memory.fetch_opcode(pc);

        let Some(metadata) = decode(opcode) else {
            log::warn!("undefined opcode ${:02X} at ${:04X}", opcode, pc);
            return Err(ExecutionError::Decode { opcode, pc });
        };

        log::trace!(
            "${:04X}  {:02X}  {} {}",
            pc,
            opcode,
            metadata.mnemonic,
            metadata.addressing_mode
        );

        let operand = self.effective_address(metadata.addressing_mode);
        self.pc = pc.wrapping_add(metadata.size_bytes as u16);
        self.cycles += metadata.base_cycles as u64;

        instructions::execute(self, metadata.mnemonic, operand);

        Ok(())
    }

    /// Runs the CPU for a specified number of cycles.
    ///
    /// Executes instructions until the cycle budget is exhausted or an error
    /// occurs. Returns the number of cycles consumed, which may overshoot the
    /// budget by up to one instruction.
    pub fn run_for_cycles(&mut self, cycle_budget: u64) -> Result<u64, ExecutionError> {
        let start_cycles = self.cycles;
        let target_cycles = start_cycles + cycle_budget;

        while self.cycles < target_cycles {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Steps until `done` returns true or `max_steps` instructions ran.
    ///
    /// The predicate is checked before every instruction, so a condition that
    /// already holds executes nothing. Returns the number of instructions
    /// executed.
    ///
    /// ```
    /// use retro6502::{CPU, FlatMemory, MemoryBus};
    ///
    /// let mut mem = FlatMemory::new();
    /// mem.load(0x8000, &[0xE8, 0x4C, 0x00, 0x80]); // INX / JMP $8000
    /// mem.load(0xFFFC, &[0x00, 0x80]);
    ///
    /// let mut cpu = CPU::new(mem);
    /// cpu.set_x(0);
    /// cpu.run_until(|cpu| cpu.x() == 5, 1_000).unwrap();
    /// assert_eq!(cpu.x(), 5);
    /// ```
    pub fn run_until<F>(&mut self, mut done: F, max_steps: usize) -> Result<usize, ExecutionError>
    where
        F: FnMut(&mut Self) -> bool,
    {
        let mut steps = 0;
        while steps < max_steps && !done(self) {
            self.step()?;
            steps += 1;
        }
        Ok(steps)
    }

    /// Runs until PC reaches a BRK (0x00) opcode, without executing it.
    ///
    /// A zero byte at PC is the usual "halted" convention for test programs.
    pub fn run_until_brk(&mut self, max_steps: usize) -> Result<usize, ExecutionError> {
        self.run_until(|cpu| cpu.memory.read(cpu.pc) == 0x00, max_steps)
    }

    /// Requests a maskable interrupt.
    ///
    /// Ignored while the I flag is set. Otherwise pushes PC and the status byte
    /// (break bit clear), sets I and jumps through the IRQ vector at 0xFFFE.
    pub fn irq(&mut self) {
        if self.flag_i {
            return;
        }
        log::debug!("IRQ at PC=${:04X}", self.pc);
        self.interrupt(IRQ_VECTOR);
    }

    /// Triggers a non-maskable interrupt through the vector at 0xFFFA.
    pub fn nmi(&mut self) {
        log::debug!("NMI at PC=${:04X}", self.pc);
        self.interrupt(NMI_VECTOR);
    }

    fn interrupt(&mut self, vector: u16) {
        self.push_word(self.pc);
        let status = self.status() & !FLAG_B;
        self.push(status);
        self.flag_i = true;
        self.pc = self.memory.read_word(vector);
        self.cycles += 7;
    }

    /// Computes the operand location for `mode`, with PC still at the opcode.
    fn effective_address(&mut self, mode: AddressingMode) -> Operand {
        let operand_addr = self.pc.wrapping_add(1);

        let addr = match mode {
            AddressingMode::Implicit => return Operand::None,
            AddressingMode::Immediate | AddressingMode::Relative => operand_addr,
            AddressingMode::ZeroPage => self.memory.read(operand_addr) as u16,
            AddressingMode::ZeroPageX => self.memory.read(operand_addr).wrapping_add(self.x) as u16,
            AddressingMode::ZeroPageY => self.memory.read(operand_addr).wrapping_add(self.y) as u16,
            AddressingMode::Absolute => self.memory.read_word(operand_addr),
            AddressingMode::AbsoluteX => self
                .memory
                .read_word(operand_addr)
                .wrapping_add(self.x as u16),
            AddressingMode::AbsoluteY => self
                .memory
                .read_word(operand_addr)
                .wrapping_add(self.y as u16),
            AddressingMode::Indirect => {
                let ptr = self.memory.read_word(operand_addr);
                self.memory.read_word(ptr)
            }
            AddressingMode::IndirectX => {
                let zp = self.memory.read(operand_addr).wrapping_add(self.x);
                self.memory.read_word(zp as u16)
            }
            AddressingMode::IndirectY => {
                let zp = self.memory.read(operand_addr) as u16;
                self.memory.read_word(zp).wrapping_add(self.y as u16)
            }
        };

        Operand::Address(addr)
    }

    // ========== Helpers used by instruction bodies ==========

    /// Loads the operand value; implied operands read the accumulator.
    pub(crate) fn operand_value(&mut self, operand: Operand) -> u8 {
        match operand {
            Operand::Address(addr) => self.memory.read(addr),
            Operand::None => self.a,
        }
    }

    /// Read-modify-write on A (no address) or on memory.
    pub(crate) fn modify(&mut self, operand: Operand, f: impl FnOnce(&mut Self, u8) -> u8) {
        match operand {
            Operand::None => {
                let value = self.a;
                let result = f(self, value);
                self.a = result;
                self.set_nz(result);
            }
            Operand::Address(addr) => {
                let value = self.memory.read(addr);
                let result = f(self, value);
                self.memory.write(addr, result);
                self.set_nz(result);
            }
        }
    }

    pub(crate) fn set_nz(&mut self, value: u8) {
        self.flag_z = value == 0;
        self.flag_n = value & 0x80 != 0;
    }

    pub(crate) fn push(&mut self, value: u8) {
        self.memory.write(STACK_BASE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pull(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.memory.read(STACK_BASE | self.sp as u16)
    }

    /// Pushes high byte first so the word reads little-endian on the stack.
    pub(crate) fn push_word(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    pub(crate) fn pull_word(&mut self) -> u16 {
        let lo = self.pull() as u16;
        let hi = self.pull() as u16;
        (hi << 8) | lo
    }

    fn next_random(&mut self) -> u8 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state = x;
        (x >> 32) as u8
    }

    // ========== Register Getters ==========

    /// Returns the accumulator register value.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Returns the X index register value.
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Returns the Y index register value.
    pub fn y(&self) -> u8 {
        self.y
    }

    /// Returns the program counter value.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Returns the stack pointer value.
    ///
    /// The full stack address is 0x0100 + SP. The stack grows downward.
    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// Returns the status register as a packed byte.
    ///
    /// Bit layout (NV-BDIZC):
    /// - Bit 7: N (Negative)
    /// - Bit 6: V (Overflow)
    /// - Bit 5: (unused, always 1)
    /// - Bit 4: B (only set in copies pushed by BRK/PHP, reads 0 here)
    /// - Bit 3: D (Decimal)
    /// - Bit 2: I (Interrupt Disable)
    /// - Bit 1: Z (Zero)
    /// - Bit 0: C (Carry)
    ///
    /// ```
    /// use retro6502::{CPU, FlatMemory};
    ///
    /// let cpu = CPU::new(FlatMemory::new());
    /// assert_eq!(cpu.status(), 0b0010_0100); // bit 5 + I after reset
    /// ```
    pub fn status(&self) -> u8 {
        let mut status = FLAG_UNUSED;

        if self.flag_n {
            status |= FLAG_N;
        }
        if self.flag_v {
            status |= FLAG_V;
        }
        if self.flag_d {
            status |= FLAG_D;
        }
        if self.flag_i {
            status |= FLAG_I;
        }
        if self.flag_z {
            status |= FLAG_Z;
        }
        if self.flag_c {
            status |= FLAG_C;
        }

        status
    }

    /// Returns the total number of CPU cycles executed.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    // ========== Status Flag Getters ==========

    /// Returns true if the Negative flag is set.
    pub fn flag_n(&self) -> bool {
        self.flag_n
    }

    /// Returns true if the Overflow flag is set.
    pub fn flag_v(&self) -> bool {
        self.flag_v
    }

    /// Returns true if the Decimal mode flag is set.
    pub fn flag_d(&self) -> bool {
        self.flag_d
    }

    /// Returns true if the Interrupt Disable flag is set.
    pub fn flag_i(&self) -> bool {
        self.flag_i
    }

    /// Returns true if the Zero flag is set.
    pub fn flag_z(&self) -> bool {
        self.flag_z
    }

    /// Returns true if the Carry flag is set.
    pub fn flag_c(&self) -> bool {
        self.flag_c
    }

    // ========== Setters ==========

    pub fn set_a(&mut self, value: u8) {
        self.a = value;
    }

    pub fn set_x(&mut self, value: u8) {
        self.x = value;
    }

    pub fn set_y(&mut self, value: u8) {
        self.y = value;
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    pub fn set_sp(&mut self, value: u8) {
        self.sp = value;
    }

    /// Unpacks a status byte into the flags. Bits 5 and 4 are ignored.
    pub fn set_status(&mut self, value: u8) {
        self.flag_n = value & FLAG_N != 0;
        self.flag_v = value & FLAG_V != 0;
        self.flag_d = value & FLAG_D != 0;
        self.flag_i = value & FLAG_I != 0;
        self.flag_z = value & FLAG_Z != 0;
        self.flag_c = value & FLAG_C != 0;
    }

    pub fn set_flag_n(&mut self, value: bool) {
        self.flag_n = value;
    }

    pub fn set_flag_v(&mut self, value: bool) {
        self.flag_v = value;
    }

    pub fn set_flag_d(&mut self, value: bool) {
        self.flag_d = value;
    }

    pub fn set_flag_i(&mut self, value: bool) {
        self.flag_i = value;
    }

    pub fn set_flag_z(&mut self, value: bool) {
        self.flag_z = value;
    }

    pub fn set_flag_c(&mut self, value: bool) {
        self.flag_c = value;
    }

    // ========== Memory Access ==========

    /// Shared access to the memory bus.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Mutable access to the memory bus (for loading programs, poking I/O).
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Consumes the CPU and hands the memory bus back.
    pub fn into_memory(self) -> M {
        self.memory
    }
}
