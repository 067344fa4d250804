//! Sparse assembled output
//!
//! Assembled bytes are laid into 16-byte pages keyed by their aligned base
//! address. Cells the program never wrote stay `None`, which keeps gaps between
//! `*=` sections visible in the hex dump and lets [`CodePages::to_rom`] choose
//! the fill byte.

use std::collections::BTreeMap;
use std::fmt;

const PAGE_SIZE: usize = 16;

/// Sparse map from 16-byte-aligned page address to the bytes in that page.
///
/// # Examples
///
/// ```
/// use retro6502::CodePages;
///
/// let mut pages = CodePages::new();
/// pages.set(0x0802, 0xA9);
/// pages.set(0x0803, 0x01);
///
/// assert_eq!(pages.get(0x0802), Some(0xA9));
/// assert_eq!(pages.get(0x0801), None);
/// assert_eq!(
///     pages.hex_dump(),
///     "0800: . . A9 01 . . . . . . . . . . . ."
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodePages {
    pages: BTreeMap<u16, [Option<u8>; PAGE_SIZE]>,
}

impl CodePages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a byte; a later write to the same address wins.
    pub fn set(&mut self, addr: u16, value: u8) {
        let base = addr & !0x000F;
        let page = self.pages.entry(base).or_insert([None; PAGE_SIZE]);
        page[(addr & 0x000F) as usize] = Some(value);
    }

    /// Stores consecutive bytes starting at `addr`, wrapping at 0xFFFF.
    pub fn extend(&mut self, addr: u16, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            self.set(addr.wrapping_add(i as u16), byte);
        }
    }

    pub fn get(&self, addr: u16) -> Option<u8> {
        let base = addr & !0x000F;
        self.pages
            .get(&base)
            .and_then(|page| page[(addr & 0x000F) as usize])
    }

    pub fn contains(&self, addr: u16) -> bool {
        self.get(addr).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Number of bytes set.
    pub fn len(&self) -> usize {
        self.pages
            .values()
            .map(|page| page.iter().filter(|cell| cell.is_some()).count())
            .sum()
    }

    /// Lowest address holding a byte.
    pub fn start_address(&self) -> Option<u16> {
        self.iter().next().map(|(addr, _)| addr)
    }

    /// Every set byte in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u8)> + '_ {
        self.pages.iter().flat_map(|(&base, page)| {
            page.iter()
                .enumerate()
                .filter_map(move |(offset, cell)| cell.map(|b| (base + offset as u16, b)))
        })
    }

    /// Page base addresses with their cells, for callers that render pages.
    pub fn pages(&self) -> impl Iterator<Item = (u16, &[Option<u8>; PAGE_SIZE])> + '_ {
        self.pages.iter().map(|(&base, page)| (base, page))
    }

    /// Maximal runs of consecutive set bytes as `(start, bytes)`.
    pub fn segments(&self) -> Vec<(u16, Vec<u8>)> {
        let mut segments: Vec<(u16, Vec<u8>)> = Vec::new();
        for (addr, byte) in self.iter() {
            match segments.last_mut() {
                Some((start, bytes)) if *start as usize + bytes.len() == addr as usize => {
                    bytes.push(byte)
                }
                _ => segments.push((addr, vec![byte])),
            }
        }
        segments
    }

    /// One line per page: `AAAA:` followed by sixteen cells, `.` for unset.
    pub fn hex_dump(&self) -> String {
        self.to_string()
    }

    /// Raw image of `start..=end`, unset cells replaced by `fill`.
    ///
    /// ```
    /// use retro6502::CodePages;
    ///
    /// let mut pages = CodePages::new();
    /// pages.extend(0xFFFC, &[0x00, 0xFF]);
    ///
    /// let rom = pages.to_rom(0xFF00, 0xFFFF, 0xEA);
    /// assert_eq!(rom.len(), 256);
    /// assert_eq!(rom[0], 0xEA);
    /// assert_eq!(&rom[0xFC..], &[0x00, 0xFF, 0xEA, 0xEA]);
    /// ```
    pub fn to_rom(&self, start: u16, end: u16, fill: u8) -> Vec<u8> {
        if end < start {
            return Vec::new();
        }
        (start..=end)
            .map(|addr| self.get(addr).unwrap_or(fill))
            .collect()
    }
}

impl fmt::Display for CodePages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (base, page)) in self.pages.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:04X}:", base)?;
            for cell in page {
                match cell {
                    Some(byte) => write!(f, " {:02X}", byte)?,
                    None => write!(f, " .")?,
                }
            }
        }
        Ok(())
    }
}
