//! Apple-1 style 6821 PIA terminal.
//!
//! The Apple-1 wires a 6821 PIA between the CPU, an ASCII keyboard and a
//! character display. Only the behavior its monitor relies on is modelled.

use std::any::Any;
use std::collections::VecDeque;

use super::Device;

/// Keyboard data register
pub const KBD: u16 = 0;
/// Keyboard control register
pub const KBDCR: u16 = 1;
/// Display data register
pub const DSP: u16 = 2;
/// Display control register
pub const DSPCR: u16 = 3;

const KEY_READY: u8 = 0x80;

/// Keyboard and display terminal on a 6821 PIA.
///
/// ## Register Map (offsets from device base address)
///
/// | Offset | Register | Access | Description |
/// |--------|----------|--------|-------------|
/// | 0      | KBD      | R      | Last key, bit 7 set. Reading clears the strobe |
/// | 1      | KBDCR    | R/W    | Bit 7 = key ready, bits 0-6 as written |
/// | 2      | DSP      | R/W    | Write outputs a 7-bit character; bit 7 reads 0 |
/// | 3      | DSPCR    | R/W    | Stored, not interpreted |
///
/// Keys pushed by the host queue up; the next one is latched into KBD as soon
/// as the previous one has been read. The display is always ready, so a
/// program polling DSP bit 7 never waits.
///
/// # Example
///
/// ```rust
/// use retro6502::{Device, PiaTerminal};
///
/// let mut pia = PiaTerminal::new();
/// pia.push_key(b'A');
///
/// assert_eq!(pia.read(1) & 0x80, 0x80);
/// assert_eq!(pia.read(0), 0xC1);
/// assert_eq!(pia.read(1) & 0x80, 0x00);
///
/// pia.write(2, 0xC8);
/// assert_eq!(pia.take_output(), b"H");
/// ```
pub struct PiaTerminal {
    kbd: u8,
    key_ready: bool,
    kbdcr: u8,
    dsp: u8,
    dspcr: u8,

    pending_keys: VecDeque<u8>,

    on_output: Option<Box<dyn FnMut(u8)>>,
    output: Vec<u8>,
}

impl PiaTerminal {
    pub fn new() -> Self {
        Self {
            kbd: 0x00,
            key_ready: false,
            kbdcr: 0x00,
            dsp: 0x00,
            dspcr: 0x00,
            pending_keys: VecDeque::new(),
            on_output: None,
            output: Vec::new(),
        }
    }

    /// Called with each 7-bit character the program writes to DSP.
    ///
    /// Output is still collected for [`take_output`](Self::take_output).
    pub fn set_output_callback<F>(&mut self, callback: F)
    where
        F: FnMut(u8) + 'static,
    {
        self.on_output = Some(Box::new(callback));
    }

    /// Queues a key press from the host.
    pub fn push_key(&mut self, key: u8) {
        self.pending_keys.push_back(key);
        self.latch_next_key();
    }

    /// Queues every byte of `text`, mapping `\n` to carriage return.
    pub fn push_str(&mut self, text: &str) {
        for byte in text.bytes() {
            self.push_key(if byte == b'\n' { b'\r' } else { byte });
        }
    }

    /// True when a key is latched and not yet read.
    pub fn key_ready(&self) -> bool {
        self.key_ready
    }

    /// Keys still waiting behind the latched one.
    pub fn pending_keys(&self) -> usize {
        self.pending_keys.len()
    }

    /// Drains the characters written to the display so far.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    fn latch_next_key(&mut self) {
        if self.key_ready {
            return;
        }
        if let Some(key) = self.pending_keys.pop_front() {
            self.kbd = key | KEY_READY;
            self.key_ready = true;
        }
    }

    fn display(&mut self, value: u8) {
        let ch = value & 0x7F;
        self.dsp = ch;
        log::trace!("pia display ${:02X}", ch);
        self.output.push(ch);
        if let Some(callback) = self.on_output.as_mut() {
            callback(ch);
        }
    }
}

impl Default for PiaTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for PiaTerminal {
    fn read(&mut self, offset: u16) -> u8 {
        match offset {
            KBD => {
                let key = self.kbd;
                self.key_ready = false;
                self.latch_next_key();
                key
            }
            KBDCR => {
                let ready = if self.key_ready { KEY_READY } else { 0 };
                ready | (self.kbdcr & 0x7F)
            }
            DSP => self.dsp & 0x7F,
            DSPCR => self.dspcr,
            _ => 0x00,
        }
    }

    fn write(&mut self, offset: u16, value: u8) {
        match offset {
            KBDCR => self.kbdcr = value,
            DSP => self.display(value),
            DSPCR => self.dspcr = value,
            _ => {}
        }
    }

    fn size(&self) -> u16 {
        4
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
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_pia_new() {
        let mut pia = PiaTerminal::new();
        assert_eq!(pia.size(), 4);
        assert!(!pia.key_ready());
        assert_eq!(pia.read(KBDCR), 0x00);
        assert_eq!(pia.read(DSP) & 0x80, 0x00);
    }

    #[test]
    fn test_keys_latch_in_order() {
        let mut pia = PiaTerminal::new();
        pia.push_key(b'1');
        pia.push_key(b'2');
        assert_eq!(pia.pending_keys(), 1);

        assert_eq!(pia.read(KBD), b'1' | 0x80);
        assert!(pia.key_ready());
        assert_eq!(pia.read(KBD), b'2' | 0x80);
        assert!(!pia.key_ready());
        assert_eq!(pia.read(KBDCR) & 0x80, 0x00);
    }

    #[test]
    fn test_kbdcr_keeps_written_bits() {
        let mut pia = PiaTerminal::new();
        pia.write(KBDCR, 0xA7);
        assert_eq!(pia.read(KBDCR), 0x27);

        pia.push_key(b'X');
        assert_eq!(pia.read(KBDCR), 0xA7);
    }

    #[test]
    fn test_display_strips_high_bit() {
        let output = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&output);

        let mut pia = PiaTerminal::new();
        pia.set_output_callback(move |ch| sink.borrow_mut().push(ch));

        pia.write(DSP, b'O' | 0x80);
        pia.write(DSP, b'K');

        assert_eq!(*output.borrow(), b"OK".to_vec());
        assert_eq!(pia.take_output(), b"OK".to_vec());
        assert!(pia.take_output().is_empty());
        assert_eq!(pia.read(DSP), b'K');
    }

    #[test]
    fn test_push_str_maps_newline() {
        let mut pia = PiaTerminal::new();
        pia.push_str("A\n");
        assert_eq!(pia.read(KBD), 0xC1);
        assert_eq!(pia.read(KBD), 0x8D);
    }

    #[test]
    fn test_kbd_write_ignored() {
        let mut pia = PiaTerminal::new();
        pia.write(KBD, 0x55);
        pia.write(DSPCR, 0x7F);
        assert_eq!(pia.read(KBD), 0x00);
        assert_eq!(pia.read(DSPCR), 0x7F);
    }
}
