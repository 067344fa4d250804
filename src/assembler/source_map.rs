//! Source map between assembled addresses and source lines

/// Bidirectional mapping between emitted bytes and the lines that produced them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    /// Forward map: start address → emitted range
    /// Sorted by address for binary search
    address_to_source: Vec<(u16, AddressRange)>,
}

/// A range of emitted bytes and the source line that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    /// Line number (1-indexed)
    pub line: usize,

    /// Starting address (inclusive)
    pub start: u16,

    /// Number of bytes emitted
    pub len: u16,
}

impl AddressRange {
    pub fn contains(&self, address: u16) -> bool {
        address.wrapping_sub(self.start) < self.len
    }
}

impl SourceMap {
    /// Create a new empty source map
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `len` bytes at `start` came from `line`
    pub fn add_mapping(&mut self, start: u16, len: u16, line: usize) {
        if len > 0 {
            self.address_to_source
                .push((start, AddressRange { line, start, len }));
        }
    }

    /// Source line of the instruction or data item covering `address`
    pub fn line_for_address(&self, address: u16) -> Option<usize> {
        let idx = match self
            .address_to_source
            .binary_search_by_key(&address, |(start, _)| *start)
        {
            Ok(idx) => idx,
            Err(0) => return None,
            Err(idx) => idx - 1,
        };
        let range = self.address_to_source[idx].1;
        range.contains(address).then_some(range.line)
    }

    /// Every emitted range for `line`, in address order
    pub fn ranges_for_line(&self, line: usize) -> Vec<AddressRange> {
        self.address_to_source
            .iter()
            .map(|(_, range)| *range)
            .filter(|range| range.line == line)
            .collect()
    }

    /// Finalize the source map (sort for binary search)
    pub fn finalize(&mut self) {
        self.address_to_source.sort_by_key(|(addr, _)| *addr);
    }

    pub fn is_empty(&self) -> bool {
        self.address_to_source.is_empty()
    }
}
