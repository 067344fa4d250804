//! Memory-mapped device support.
//!
//! Machines built on the core differ only in what sits on the bus. This module
//! provides the pieces they are wired from:
//!
//! - **Device trait**: offset-addressed hardware component
//! - **MappedMemory**: routes bus reads and writes to registered devices
//! - **Device implementations**: RAM, ROM and the Apple-1 style PIA terminal
//!
//! # Example
//!
//! ```rust
//! use retro6502::{MappedMemory, MemoryBus, RamDevice, RomDevice};
//!
//! let mut memory = MappedMemory::new();
//!
//! // 4KB RAM at 0x0000-0x0FFF
//! memory.add_device(0x0000, Box::new(RamDevice::new(0x1000))).unwrap();
//!
//! // 256 bytes of ROM at 0xFF00-0xFFFF
//! memory.add_device(0xFF00, Box::new(RomDevice::new(vec![0xEA; 256]))).unwrap();
//!
//! memory.write(0x0200, 0x42);
//! assert_eq!(memory.read(0x0200), 0x42);
//! assert_eq!(memory.read(0xFF10), 0xEA);
//! assert_eq!(memory.read(0x8000), 0xFF);
//! ```

use std::any::Any;

use crate::MemoryBus;
use thiserror::Error;

pub mod pia;
pub mod ram;
pub mod rom;

pub use pia::PiaTerminal;
pub use ram::RamDevice;
pub use rom::RomDevice;

/// Abstract interface for memory-mapped hardware devices.
///
/// The mapper calls these methods with offsets in `0..size()`, so a device never
/// needs to know where it was mapped.
///
/// Reads take `&mut self`: reading a register can have side effects, such as
/// the PIA clearing its key-ready strobe when the keyboard register is read.
///
/// # Examples
///
/// ```rust
/// use std::any::Any;
/// use retro6502::Device;
///
/// struct Latch(u8);
///
/// impl Device for Latch {
///     fn read(&mut self, _offset: u16) -> u8 {
///         self.0
///     }
///
///     fn write(&mut self, _offset: u16, value: u8) {
///         self.0 = value;
///     }
///
///     fn size(&self) -> u16 {
///         1
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn as_any_mut(&mut self) -> &mut dyn Any {
///         self
///     }
/// }
/// ```
pub trait Device {
    /// Read byte from device at offset relative to device base address.
    fn read(&mut self, offset: u16) -> u8;

    /// Write byte to device at offset relative to device base address.
    fn write(&mut self, offset: u16, value: u8);

    /// Size of the device's address space in bytes.
    fn size(&self) -> u16;

    /// Downcasting support, used to reach a concrete device after mapping.
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Internal mapping of a device to a base address.
struct DeviceMapping {
    base_addr: u16,
    device: Box<dyn Device>,
}

impl DeviceMapping {
    /// Exclusive end address, `None` when the device ends at 0xFFFF.
    fn end(&self) -> Option<u16> {
        let (end, overflow) = self.base_addr.overflowing_add(self.device.size());
        (!overflow).then_some(end)
    }

    fn contains(&self, addr: u16) -> bool {
        match self.end() {
            Some(end) => addr >= self.base_addr && addr < end,
            None => addr >= self.base_addr,
        }
    }
}

/// Error returned when device registration fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Address range overlaps with an existing device.
    #[error(
        "device at ${new_base:04X} (size ${new_size:04X}) overlaps device at ${existing_base:04X} (size ${existing_size:04X})"
    )]
    Overlap {
        new_base: u16,
        new_size: u16,
        existing_base: u16,
        existing_size: u16,
    },

    /// A device with no addressable bytes.
    #[error("device at ${base:04X} has zero size")]
    Empty { base: u16 },

    /// The device would extend past 0xFFFF.
    #[error("device at ${base:04X} (size ${size:04X}) runs past $FFFF")]
    OutOfRange { base: u16, size: u16 },
}

/// Memory mapper that routes read/write operations to registered devices.
///
/// Unmapped reads return `$FF`, mimicking the 6502 floating bus; unmapped
/// writes are dropped.
///
/// # Examples
///
/// ```rust
/// use retro6502::{MappedMemory, MemoryBus, PiaTerminal, RamDevice};
///
/// let mut memory = MappedMemory::new();
/// memory.add_device(0x0000, Box::new(RamDevice::new(0x1000))).unwrap();
/// memory.add_device(0xD010, Box::new(PiaTerminal::new())).unwrap();
///
/// memory
///     .device_mut::<PiaTerminal>(0xD010)
///     .unwrap()
///     .push_key(b'A');
/// assert_eq!(memory.read(0xD010), b'A' | 0x80);
/// ```
pub struct MappedMemory {
    devices: Vec<DeviceMapping>,
    unmapped_value: u8,
}

impl MappedMemory {
    /// Create a new empty memory mapper.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            unmapped_value: 0xFF,
        }
    }

    /// Register a device at the specified base address.
    ///
    /// The device occupies `base_addr..base_addr + size`, which must end at or
    /// below 0xFFFF.
    ///
    /// ```rust
    /// use retro6502::{DeviceError, MappedMemory, RamDevice};
    ///
    /// let mut memory = MappedMemory::new();
    /// memory.add_device(0x0000, Box::new(RamDevice::new(0x4000))).unwrap();
    ///
    /// let result = memory.add_device(0x1000, Box::new(RamDevice::new(0x0400)));
    /// assert!(matches!(result, Err(DeviceError::Overlap { existing_base: 0x0000, .. })));
    /// ```
    pub fn add_device(
        &mut self,
        base_addr: u16,
        device: Box<dyn Device>,
    ) -> Result<(), DeviceError> {
        let new_size = device.size();
        if new_size == 0 {
            return Err(DeviceError::Empty { base: base_addr });
        }
        let new_end = base_addr as u32 + new_size as u32;
        if new_end > 0x1_0000 {
            return Err(DeviceError::OutOfRange {
                base: base_addr,
                size: new_size,
            });
        }

        for mapping in &self.devices {
            let existing_size = mapping.device.size();
            let existing_end = mapping.base_addr as u32 + existing_size as u32;

            if (base_addr as u32) < existing_end && new_end > mapping.base_addr as u32 {
                return Err(DeviceError::Overlap {
                    new_base: base_addr,
                    new_size,
                    existing_base: mapping.base_addr,
                    existing_size,
                });
            }
        }

        log::debug!(
            "mapped device at ${:04X}-${:04X}",
            base_addr,
            new_end - 1
        );
        self.devices.push(DeviceMapping { base_addr, device });
        Ok(())
    }

    /// The device registered at exactly `base_addr`, if it has type `T`.
    pub fn device<T: Device + 'static>(&self, base_addr: u16) -> Option<&T> {
        self.devices
            .iter()
            .find(|mapping| mapping.base_addr == base_addr)
            .and_then(|mapping| mapping.device.as_any().downcast_ref::<T>())
    }

    /// Mutable access to the device registered at exactly `base_addr`.
    pub fn device_mut<T: Device + 'static>(&mut self, base_addr: u16) -> Option<&mut T> {
        self.devices
            .iter_mut()
            .find(|mapping| mapping.base_addr == base_addr)
            .and_then(|mapping| mapping.device.as_any_mut().downcast_mut::<T>())
    }

    /// True if some device answers at `addr`.
    pub fn is_mapped(&self, addr: u16) -> bool {
        self.devices.iter().any(|mapping| mapping.contains(addr))
    }

    /// Number of registered devices.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn find_device(&mut self, addr: u16) -> Option<(&mut dyn Device, u16)> {
        for mapping in self.devices.iter_mut() {
            if mapping.contains(addr) {
                return Some((mapping.device.as_mut(), addr - mapping.base_addr));
            }
        }
        None
    }
}

impl Default for MappedMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for MappedMemory {
    fn read(&mut self, addr: u16) -> u8 {
        let unmapped = self.unmapped_value;
        match self.find_device(addr) {
            Some((device, offset)) => device.read(offset),
            None => unmapped,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if let Some((device, offset)) = self.find_device(addr) {
            device.write(offset, value);
        }
    }
}
