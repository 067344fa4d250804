//! RAM device implementation.

use std::any::Any;

use super::Device;

/// Readable and writable storage, zero-filled on creation.
///
/// # Examples
///
/// ```rust
/// use retro6502::{Device, RamDevice};
///
/// let mut ram = RamDevice::new(1024);
/// ram.write(0x42, 0xAA);
/// assert_eq!(ram.read(0x42), 0xAA);
/// ```
#[derive(Debug, Clone)]
pub struct RamDevice {
    data: Vec<u8>,
}

impl RamDevice {
    pub fn new(size: u16) -> Self {
        Self {
            data: vec![0; size as usize],
        }
    }

    /// Copies `bytes` in starting at `offset`.
    ///
    /// Bytes that would land past the end of the device are dropped; the
    /// return value is how many were stored.
    ///
    /// ```rust
    /// use retro6502::{Device, RamDevice};
    ///
    /// let mut ram = RamDevice::new(4);
    /// assert_eq!(ram.load_bytes(2, &[1, 2, 3]), 2);
    /// assert_eq!(ram.read(3), 2);
    /// ```
    pub fn load_bytes(&mut self, offset: u16, bytes: &[u8]) -> usize {
        let start = (offset as usize).min(self.data.len());
        let end = (start + bytes.len()).min(self.data.len());
        let count = end - start;
        self.data[start..end].copy_from_slice(&bytes[..count]);
        count
    }

    /// Read without going through the bus.
    pub fn peek(&self, offset: u16) -> Option<u8> {
        self.data.get(offset as usize).copied()
    }
}

impl Device for RamDevice {
    fn read(&mut self, offset: u16) -> u8 {
        self.data[offset as usize]
    }

    fn write(&mut self, offset: u16, value: u8) {
        self.data[offset as usize] = value;
    }

    fn size(&self) -> u16 {
        self.data.len() as u16
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ram_new() {
        let mut ram = RamDevice::new(256);
        assert_eq!(ram.size(), 256);

        for i in 0..256 {
            assert_eq!(ram.read(i), 0x00);
        }
    }

    #[test]
    fn test_ram_read_write() {
        let mut ram = RamDevice::new(256);

        ram.write(0, 0xAA);
        ram.write(100, 0xBB);
        ram.write(255, 0xCC);

        assert_eq!(ram.read(0), 0xAA);
        assert_eq!(ram.read(100), 0xBB);
        assert_eq!(ram.read(255), 0xCC);
        assert_eq!(ram.read(1), 0x00);
    }

    #[test]
    fn test_ram_load_bytes() {
        let mut ram = RamDevice::new(256);

        // LDA #$42, STA $10
        assert_eq!(ram.load_bytes(0, &[0xA9, 0x42, 0x85, 0x10]), 4);

        assert_eq!(ram.peek(0), Some(0xA9));
        assert_eq!(ram.peek(3), Some(0x10));
        assert_eq!(ram.peek(256), None);
    }

    #[test]
    fn test_ram_load_past_end() {
        let mut ram = RamDevice::new(16);
        assert_eq!(ram.load_bytes(20, &[1, 2]), 0);
        assert_eq!(ram.load_bytes(15, &[9, 9, 9]), 1);
        assert_eq!(ram.peek(15), Some(9));
    }
}
