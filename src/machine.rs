//! Machine presets
//!
//! The emulated computers share one CPU core and differ only in what is wired
//! onto the bus. A [`MachineConfig`] lists RAM and ROM regions and where the
//! PIA terminal sits; [`Machine::new`] turns it and a boot image into a
//! running system.
//!
//! ```
//! use retro6502::{assemble, Machine, MachineConfig};
//!
//! let rom = assemble(
//!     "*=$FF00
//!      RESET LDA #$21
//!            STA $D012
//!      HALT  JMP HALT
//!      *=$FFFC
//!      .WORD RESET",
//! )
//! .unwrap();
//!
//! let mut machine = Machine::new(MachineConfig::apple1(), &rom.pages).unwrap();
//! machine.run(3).unwrap();
//! assert_eq!(machine.take_output(), b"!");
//! ```

use crate::assembler::{self, AssemblerError, CodePages};
use crate::cpu::RESET_VECTOR;
use crate::devices::{DeviceError, MappedMemory, PiaTerminal, RamDevice, RomDevice};
use crate::disassembler::{self, DisassemblyToken};
use crate::{ExecutionError, MemoryBus, CPU};
use thiserror::Error;

/// A contiguous address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub base: u16,
    pub size: u16,
}

impl Region {
    pub const fn new(base: u16, size: u16) -> Self {
        Self { base, size }
    }

    pub fn contains(&self, addr: u16) -> bool {
        addr >= self.base && (addr as u32) < self.base as u32 + self.size as u32
    }

    /// Last address in the region.
    pub fn last(&self) -> u16 {
        (self.base as u32 + (self.size as u32).saturating_sub(1)).min(0xFFFF) as u16
    }
}

/// Description of a machine's bus.
///
/// The boot image is split across the configured regions: bytes in a ROM
/// region are burned into that ROM, bytes in a RAM region are preloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    pub name: String,
    pub ram: Vec<Region>,
    pub rom: Vec<Region>,
    /// Base address of the four PIA terminal registers
    pub terminal: Option<u16>,
    /// Value of ROM bytes the boot image leaves unset
    pub rom_fill: u8,
    /// Fixed power-on seed for reproducible runs
    pub seed: Option<u64>,
}

impl MachineConfig {
    /// An empty bus; add regions with the `with_*` methods.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ram: Vec::new(),
            rom: Vec::new(),
            terminal: None,
            rom_fill: 0xFF,
            seed: None,
        }
    }

    /// Apple-1: 4KB RAM at `$0000`, 4KB at `$E000`, PIA at `$D010` and a
    /// 256-byte monitor ROM at `$FF00`.
    pub fn apple1() -> Self {
        Self::new("Apple-1")
            .with_ram(0x0000, 0x1000)
            .with_ram(0xE000, 0x1000)
            .with_terminal(0xD010)
            .with_rom(0xFF00, 0x0100)
    }

    /// KIM-1: 1KB RAM, the 6530 RIOT RAM at `$1780`, the 1KB monitor ROM at
    /// `$1C00` and the vector mirror at `$FFFA`. The terminal stands in for the
    /// RIOT serial port at `$1700`.
    pub fn kim1() -> Self {
        Self::new("KIM-1")
            .with_ram(0x0000, 0x0400)
            .with_terminal(0x1700)
            .with_ram(0x1780, 0x0080)
            .with_rom(0x1C00, 0x0400)
            .with_rom(0xFFFA, 0x0006)
    }

    /// 32KB RAM, terminal at `$C000`, 8KB ROM at `$E000`.
    pub fn custom_board() -> Self {
        Self::new("custom board")
            .with_ram(0x0000, 0x8000)
            .with_terminal(0xC000)
            .with_rom(0xE000, 0x2000)
    }

    pub fn with_ram(mut self, base: u16, size: u16) -> Self {
        self.ram.push(Region::new(base, size));
        self
    }

    pub fn with_rom(mut self, base: u16, size: u16) -> Self {
        self.rom.push(Region::new(base, size));
        self
    }

    pub fn with_terminal(mut self, base: u16) -> Self {
        self.terminal = Some(base);
        self
    }

    pub fn with_rom_fill(mut self, fill: u8) -> Self {
        self.rom_fill = fill;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn is_loadable(&self, addr: u16) -> bool {
        self.ram
            .iter()
            .chain(self.rom.iter())
            .any(|region| region.contains(addr))
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::custom_board()
    }
}

/// Errors raised while building a machine.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("boot image is empty")]
    EmptyBootImage,

    #[error("boot image byte at ${address:04X} falls outside RAM and ROM")]
    UnmappedImage { address: u16 },

    #[error("reset vector at $FFFC is not backed by RAM or ROM")]
    NoResetVector,

    #[error("assembly failed with {} error(s)", .0.len())]
    Assembly(Vec<AssemblerError>),

    #[error("machine has no terminal")]
    NoTerminal,

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// A CPU wired to the bus described by a [`MachineConfig`].
pub struct Machine {
    config: MachineConfig,
    cpu: CPU<MappedMemory>,
}

impl Machine {
    /// Builds the bus, loads `boot_image` and resets the CPU.
    ///
    /// When the image does not set the reset vector itself, it is pointed at
    /// the lowest address in the image.
    pub fn new(config: MachineConfig, boot_image: &CodePages) -> Result<Self, MachineError> {
        let entry = boot_image
            .start_address()
            .ok_or(MachineError::EmptyBootImage)?;
        Self::build(config, boot_image, entry)
    }

    /// Assembles `source` and boots it, entering at the first assembled
    /// instruction unless the source sets the reset vector.
    pub fn from_source(config: MachineConfig, source: &str) -> Result<Self, MachineError> {
        let output = assembler::assemble(source).map_err(MachineError::Assembly)?;
        let entry = output.entry_point().ok_or(MachineError::EmptyBootImage)?;
        Self::build(config, &output.pages, entry)
    }

    fn build(config: MachineConfig, boot_image: &CodePages, entry: u16) -> Result<Self, MachineError> {
        if let Some((address, _)) = boot_image
            .iter()
            .find(|(addr, _)| !config.is_loadable(*addr))
        {
            return Err(MachineError::UnmappedImage { address });
        }

        let mut image = boot_image.clone();
        if !image.contains(RESET_VECTOR) && !image.contains(RESET_VECTOR + 1) {
            if !(config.is_loadable(RESET_VECTOR) && config.is_loadable(RESET_VECTOR + 1)) {
                return Err(MachineError::NoResetVector);
            }
            image.extend(RESET_VECTOR, &entry.to_le_bytes());
        }

        let mut memory = MappedMemory::new();
        for region in &config.ram {
            memory.add_device(region.base, Box::new(RamDevice::new(region.size)))?;
        }
        for region in &config.rom {
            let rom = RomDevice::from_pages(&image, region.base, region.size, config.rom_fill);
            memory.add_device(region.base, Box::new(rom))?;
        }
        if let Some(base) = config.terminal {
            memory.add_device(base, Box::new(PiaTerminal::new()))?;
        }

        // ROM already holds its share; writes there are ignored
        for (addr, byte) in image.iter() {
            memory.write(addr, byte);
        }

        let cpu = match config.seed {
            Some(seed) => CPU::with_seed(memory, seed),
            None => CPU::new(memory),
        };
        log::debug!(
            "built {}: {} RAM region(s), {} ROM region(s), {} image byte(s), reset ${:04X}",
            config.name,
            config.ram.len(),
            config.rom.len(),
            boot_image.len(),
            cpu.pc()
        );

        Ok(Self { config, cpu })
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn cpu(&self) -> &CPU<MappedMemory> {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CPU<MappedMemory> {
        &mut self.cpu
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    pub fn step(&mut self) -> Result<(), ExecutionError> {
        self.cpu.step()
    }

    /// Executes up to `max_steps` instructions.
    pub fn run(&mut self, max_steps: usize) -> Result<usize, ExecutionError> {
        self.cpu.run_until(|_| false, max_steps)
    }

    pub fn run_for_cycles(&mut self, cycles: u64) -> Result<u64, ExecutionError> {
        self.cpu.run_for_cycles(cycles)
    }

    pub fn terminal(&self) -> Option<&PiaTerminal> {
        let base = self.config.terminal?;
        self.cpu.memory().device::<PiaTerminal>(base)
    }

    pub fn terminal_mut(&mut self) -> Option<&mut PiaTerminal> {
        let base = self.config.terminal?;
        self.cpu.memory_mut().device_mut::<PiaTerminal>(base)
    }

    /// Sends a key to the terminal keyboard.
    pub fn push_key(&mut self, key: u8) -> Result<(), MachineError> {
        self.terminal_mut()
            .ok_or(MachineError::NoTerminal)?
            .push_key(key);
        Ok(())
    }

    /// Types `text` on the terminal keyboard; `\n` becomes carriage return.
    pub fn push_str(&mut self, text: &str) -> Result<(), MachineError> {
        self.terminal_mut()
            .ok_or(MachineError::NoTerminal)?
            .push_str(text);
        Ok(())
    }

    /// Characters displayed since the last call. Empty without a terminal.
    pub fn take_output(&mut self) -> Vec<u8> {
        self.terminal_mut()
            .map(PiaTerminal::take_output)
            .unwrap_or_default()
    }

    pub fn set_output_callback<F>(&mut self, callback: F) -> Result<(), MachineError>
    where
        F: FnMut(u8) + 'static,
    {
        self.terminal_mut()
            .ok_or(MachineError::NoTerminal)?
            .set_output_callback(callback);
        Ok(())
    }

    /// Disassembles `count` instructions at `start` as the CPU sees them.
    ///
    /// Reads go through the bus, so pointing this at the terminal consumes
    /// pending keys.
    pub fn disassemble(&mut self, start: u16, count: usize) -> Vec<DisassemblyToken> {
        disassembler::disassemble_memory(self.cpu.memory_mut(), start, count)
    }
}
