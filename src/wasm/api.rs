//! WASM API for the emulator.
//!
//! Wraps a custom-board [`Machine`] for a browser host: assemble and boot a
//! program, step it, inspect registers and memory, feed the terminal and
//! disassemble what the CPU sees.

use crate::{assemble, Machine, MachineConfig, MemoryBus};
use wasm_bindgen::prelude::*;

/// Program booted before the host loads anything.
const IDLE_ROM: &str = "*=$E000\nIDLE JMP IDLE";

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsError {
    message: String,
}

#[wasm_bindgen]
impl JsError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str) -> JsError {
        JsError {
            message: message.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

impl<E: std::error::Error> From<E> for JsError {
    fn from(err: E) -> Self {
        JsError::new(&err.to_string())
    }
}

/// Result of assembly operation
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    success: bool,
    machine_code: Vec<u8>,
    start_addr: u16,
    hex_dump: String,
    errors: String,
    error_line: Option<usize>,
}

#[wasm_bindgen]
impl AssemblyResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    /// Bytes of the lowest contiguous segment
    #[wasm_bindgen(getter)]
    pub fn machine_code(&self) -> Vec<u8> {
        self.machine_code.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn start_addr(&self) -> u16 {
        self.start_addr
    }

    #[wasm_bindgen(getter)]
    pub fn hex_dump(&self) -> String {
        self.hex_dump.clone()
    }

    /// Every error, one per line
    #[wasm_bindgen(getter)]
    pub fn errors(&self) -> String {
        self.errors.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error_line(&self) -> Option<usize> {
        self.error_line
    }
}

/// One disassembled instruction
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct DisassemblyLine {
    address: u16,
    bytes: Vec<u8>,
    text: String,
    description: String,
}

#[wasm_bindgen]
impl DisassemblyLine {
    #[wasm_bindgen(getter)]
    pub fn address(&self) -> u16 {
        self.address
    }

    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.text.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn description(&self) -> String {
        self.description.clone()
    }
}

/// Main emulator interface for JavaScript
#[wasm_bindgen]
pub struct Emulator6502 {
    machine: Machine,
    on_output: js_sys::Function,
}

#[wasm_bindgen]
impl Emulator6502 {
    /// Creates an idling custom board; `on_output` receives each displayed
    /// character as a one-character string.
    #[wasm_bindgen(constructor)]
    pub fn new(on_output: js_sys::Function) -> Result<Emulator6502, JsError> {
        let machine = boot(IDLE_ROM, &on_output)?;
        Ok(Emulator6502 { machine, on_output })
    }

    /// Execute a single instruction
    pub fn step(&mut self) -> Result<(), JsError> {
        Ok(self.machine.step()?)
    }

    /// Execute multiple cycles and return actual cycles executed
    pub fn run_for_cycles(&mut self, cycles: u32) -> Result<u32, JsError> {
        Ok(self.machine.run_for_cycles(cycles as u64)? as u32)
    }

    /// Reset the CPU; memory contents are kept.
    pub fn reset(&mut self) {
        self.machine.reset();
    }

    #[wasm_bindgen(getter)]
    pub fn a(&self) -> u8 {
        self.machine.cpu().a()
    }

    #[wasm_bindgen(getter)]
    pub fn x(&self) -> u8 {
        self.machine.cpu().x()
    }

    #[wasm_bindgen(getter)]
    pub fn y(&self) -> u8 {
        self.machine.cpu().y()
    }

    #[wasm_bindgen(getter)]
    pub fn pc(&self) -> u16 {
        self.machine.cpu().pc()
    }

    #[wasm_bindgen(getter)]
    pub fn sp(&self) -> u8 {
        self.machine.cpu().sp()
    }

    #[wasm_bindgen(getter)]
    pub fn status(&self) -> u8 {
        self.machine.cpu().status()
    }

    #[wasm_bindgen(getter)]
    pub fn cycles(&self) -> f64 {
        self.machine.cpu().cycles() as f64
    }

    pub fn set_pc(&mut self, addr: u16) {
        self.machine.cpu_mut().set_pc(addr);
    }

    /// Type a key on the terminal keyboard
    pub fn push_key(&mut self, key: u8) -> Result<(), JsError> {
        Ok(self.machine.push_key(key)?)
    }

    pub fn read_memory(&mut self, addr: u16) -> u8 {
        self.machine.cpu_mut().memory_mut().read(addr)
    }

    pub fn write_memory(&mut self, addr: u16, value: u8) {
        self.machine.cpu_mut().memory_mut().write(addr, value);
    }

    /// Read a 256-byte page from memory
    pub fn get_memory_page(&mut self, page: u8) -> Vec<u8> {
        let start = (page as u16) << 8;
        let memory = self.machine.cpu_mut().memory_mut();
        (0..256).map(|i| memory.read(start + i)).collect()
    }

    /// Assemble source without touching the running machine
    pub fn assemble(&self, source: String) -> AssemblyResult {
        match assemble(&source) {
            Ok(output) => {
                let (start_addr, machine_code) = output
                    .pages
                    .segments()
                    .into_iter()
                    .next()
                    .unwrap_or_default();
                AssemblyResult {
                    success: true,
                    machine_code,
                    start_addr,
                    hex_dump: output.pages.hex_dump(),
                    errors: String::new(),
                    error_line: None,
                }
            }
            Err(errors) => AssemblyResult {
                success: false,
                machine_code: Vec::new(),
                start_addr: 0,
                hex_dump: String::new(),
                errors: errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"),
                error_line: errors.first().map(|err| err.line),
            },
        }
    }

    /// Assemble `source` and boot a fresh machine from it
    pub fn assemble_and_load(&mut self, source: String) -> AssemblyResult {
        let result = self.assemble(source.clone());
        if result.success {
            match boot(&source, &self.on_output) {
                Ok(machine) => self.machine = machine,
                Err(err) => {
                    return AssemblyResult {
                        success: false,
                        errors: err.message(),
                        ..result
                    }
                }
            }
        }
        result
    }

    /// Disassemble memory starting at an address
    pub fn disassemble(&mut self, start_addr: u16, num_instructions: u32) -> Vec<JsValue> {
        self.machine
            .disassemble(start_addr, num_instructions as usize)
            .into_iter()
            .map(|token| {
                JsValue::from(DisassemblyLine {
                    address: token.address,
                    text: token.text(),
                    description: token.description.to_string(),
                    bytes: token.bytes,
                })
            })
            .collect()
    }
}

fn boot(source: &str, on_output: &js_sys::Function) -> Result<Machine, JsError> {
    let mut machine = Machine::from_source(MachineConfig::custom_board(), source)?;
    let callback = on_output.clone();
    machine.set_output_callback(move |ch| {
        let text = (ch as char).to_string();
        let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&text));
    })?;
    Ok(machine)
}
