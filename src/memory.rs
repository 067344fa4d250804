//! # Memory Bus Abstraction
//!
//! This module provides the `MemoryBus` trait that decouples the CPU from the
//! address space it runs in. The CPU never owns memory: every access goes through
//! the host's implementation, which is what lets machines interleave device
//! registers (keyboard, display, timers) with plain RAM and ROM.
//!
//! ## Design Principles
//!
//! The MemoryBus trait follows 6502 hardware behavior:
//! - No bus errors - reads/writes always succeed
//! - Unmapped reads may return garbage
//! - Writes to ROM/unmapped regions may be ignored
//! - Reads take `&mut self` because device registers may change when read
//!   (e.g. a keyboard strobe clears once the key has been consumed)

/// Memory bus trait for CPU to read/write bytes.
///
/// # Examples
///
/// ```
/// use retro6502::{MemoryBus, FlatMemory};
///
/// let mut mem = FlatMemory::new();
/// mem.write(0x1234, 0x42);
/// assert_eq!(mem.read(0x1234), 0x42);
/// ```
///
/// ## Intercepting opcode fetches
///
/// The CPU fetches each instruction's opcode through [`MemoryBus::fetch_opcode`]
/// exactly once per `step()`. Overriding it is the hook for execution tracing; it
/// must return the same byte `read` would.
///
/// ```
/// use retro6502::MemoryBus;
///
/// struct Traced {
///     ram: Vec<u8>,
///     fetched: Vec<u16>,
/// }
///
/// impl MemoryBus for Traced {
///     fn read(&mut self, addr: u16) -> u8 {
///         self.ram[addr as usize]
///     }
///
///     fn write(&mut self, addr: u16, value: u8) {
///         self.ram[addr as usize] = value;
///     }
///
///     fn fetch_opcode(&mut self, addr: u16) -> u8 {
///         self.fetched.push(addr);
///         self.read(addr)
///     }
/// }
/// ```
pub trait MemoryBus {
    /// Reads a byte from the specified 16-bit address.
    ///
    /// This method must never panic. Unmapped addresses may return any value.
    fn read(&mut self, addr: u16) -> u8;

    /// Writes a byte to the specified 16-bit address.
    ///
    /// This method must never panic. Read-only or unmapped addresses may ignore
    /// the write.
    fn write(&mut self, addr: u16, value: u8);

    /// Reads the opcode byte of the instruction about to execute.
    ///
    /// Called exactly once per instruction. Defaults to [`MemoryBus::read`].
    fn fetch_opcode(&mut self, addr: u16) -> u8 {
        self.read(addr)
    }

    /// Reads a little-endian 16-bit word.
    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}

/// Simple 64KB flat memory implementation.
///
/// All addresses (0x0000-0xFFFF) are writable RAM initialized to 0x00.
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
/// assert_eq!(cpu.pc(), 0x8000);
/// ```
pub struct FlatMemory {
    data: Box<[u8; 65536]>,
}

impl FlatMemory {
    /// Creates a new FlatMemory instance with all bytes initialized to zero.
    pub fn new() -> Self {
        Self {
            data: Box::new([0; 65536]),
        }
    }

    /// Copies `bytes` into memory starting at `addr`, wrapping at 0xFFFF.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            self.data[addr.wrapping_add(i as u16) as usize] = byte;
        }
    }

    /// Returns the byte at `addr` without going through the bus.
    pub fn peek(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for FlatMemory {
    fn read(&mut self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.data[addr as usize] = value;
    }
}

/// Adapts a pair of host closures to the [`MemoryBus`] trait.
///
/// `load(addr, is_opcode_fetch)` receives `true` only for the single opcode
/// fetch of each instruction; every other access passes `false`.
///
/// ```
/// use retro6502::{CallbackMemory, MemoryBus};
///
/// let mut ram = vec![0u8; 0x10000];
/// ram[0x10] = 0x99;
/// let ram = std::cell::RefCell::new(ram);
///
/// let mut bus = CallbackMemory::new(
///     |addr, _fetch| ram.borrow()[addr as usize],
///     |addr, value| ram.borrow_mut()[addr as usize] = value,
/// );
/// assert_eq!(bus.read(0x10), 0x99);
/// bus.write(0x11, 0x01);
/// assert_eq!(bus.read(0x11), 0x01);
/// ```
pub struct CallbackMemory<L, S>
where
    L: FnMut(u16, bool) -> u8,
    S: FnMut(u16, u8),
{
    load: L,
    store: S,
}

impl<L, S> CallbackMemory<L, S>
where
    L: FnMut(u16, bool) -> u8,
    S: FnMut(u16, u8),
{
    /// Wraps the host's load and store callbacks.
    pub fn new(load: L, store: S) -> Self {
        Self { load, store }
    }
}

impl<L, S> MemoryBus for CallbackMemory<L, S>
where
    L: FnMut(u16, bool) -> u8,
    S: FnMut(u16, u8),
{
    fn read(&mut self, addr: u16) -> u8 {
        (self.load)(addr, false)
    }

    fn write(&mut self, addr: u16, value: u8) {
        (self.store)(addr, value)
    }

    fn fetch_opcode(&mut self, addr: u16) -> u8 {
        (self.load)(addr, true)
    }
}
