//! ROM device implementation.

use std::any::Any;

use super::Device;
use crate::CodePages;

/// Read-only memory. Writes from the bus are ignored.
///
/// # Examples
///
/// ```rust
/// use retro6502::{Device, RomDevice};
///
/// let mut rom = RomDevice::new(vec![0xEA, 0xEA, 0xEA]);
/// assert_eq!(rom.read(0), 0xEA);
///
/// rom.write(0, 0xFF);
/// assert_eq!(rom.read(0), 0xEA);
/// ```
#[derive(Debug, Clone)]
pub struct RomDevice {
    data: Vec<u8>,
}

impl RomDevice {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// ROM image for the window `base..base + size` cut from assembled pages.
    ///
    /// Cells the program never wrote hold `fill`.
    ///
    /// ```rust
    /// use retro6502::{assemble, Device, RomDevice};
    ///
    /// let output = assemble("*=$FF00\nRESET JMP RESET\n*=$FFFC\n.WORD RESET").unwrap();
    /// let mut rom = RomDevice::from_pages(&output.pages, 0xFF00, 0x100, 0x00);
    ///
    /// assert_eq!(rom.read(0x00), 0x4C);
    /// assert_eq!((rom.read(0xFC), rom.read(0xFD)), (0x00, 0xFF));
    /// ```
    pub fn from_pages(pages: &CodePages, base: u16, size: u16, fill: u8) -> Self {
        let mut rom = Self::new(vec![fill; size as usize]);
        rom.load_pages(pages, base);
        rom
    }

    /// Overlays the bytes of `pages` that fall inside this ROM when it is
    /// mapped at `base`. Returns how many bytes were taken.
    pub fn load_pages(&mut self, pages: &CodePages, base: u16) -> usize {
        let mut count = 0;
        for (addr, byte) in pages.iter() {
            let Some(offset) = addr.checked_sub(base) else {
                continue;
            };
            if let Some(cell) = self.data.get_mut(offset as usize) {
                *cell = byte;
                count += 1;
            }
        }
        count
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Device for RomDevice {
    fn read(&mut self, offset: u16) -> u8 {
        self.data[offset as usize]
    }

    fn write(&mut self, _offset: u16, _value: u8) {}

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
