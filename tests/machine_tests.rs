//! Machine and device integration tests.
//!
//! Tests cover:
//! - A hand-wired bus running a program against the PIA terminal
//! - The Apple-1, KIM-1 and custom board presets
//! - Output callbacks and keyboard input through the CPU

use std::cell::RefCell;
use std::rc::Rc;

use retro6502::devices::pia;
use retro6502::{
    assemble, Machine, MachineConfig, MappedMemory, MemoryBus, PiaTerminal, RamDevice,
    RomDevice, CPU,
};

const HELLO: &str = "
        *=$FF00
RESET   LDX #$00
NEXT    LDA MSG,X
        BEQ DONE
        ORA #$80
        STA $D012
        INX
        JMP NEXT
DONE    JMP DONE
MSG     .BYTE \"HELLO\",0
        *=$FFFC
        .WORD RESET
";

#[test]
fn test_hand_wired_bus() {
    let rom = assemble(HELLO).unwrap();

    let mut memory = MappedMemory::new();
    memory
        .add_device(0x0000, Box::new(RamDevice::new(0x1000)))
        .unwrap();
    memory
        .add_device(0xD010, Box::new(PiaTerminal::new()))
        .unwrap();
    memory
        .add_device(0xFF00, Box::new(RomDevice::from_pages(&rom.pages, 0xFF00, 0x100, 0x00)))
        .unwrap();
    assert_eq!(memory.device_count(), 3);

    let mut cpu = CPU::with_seed(memory, 8);
    assert_eq!(cpu.pc(), 0xFF00);
    cpu.run_until(|_| false, 100).unwrap();

    let terminal = cpu.memory_mut().device_mut::<PiaTerminal>(0xD010).unwrap();
    assert_eq!(terminal.take_output(), b"HELLO");
}

#[test]
fn test_output_callback_sees_each_character() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    let mut machine = Machine::from_source(MachineConfig::apple1(), HELLO).unwrap();
    machine
        .set_output_callback(move |ch| sink.borrow_mut().push(ch))
        .unwrap();
    machine.run(100).unwrap();

    assert_eq!(seen.borrow().as_slice(), b"HELLO");
    // collected output is kept alongside the callback
    assert_eq!(machine.take_output(), b"HELLO");
    assert!(machine.take_output().is_empty());
}

#[test]
fn test_kim1_terminal_echo() {
    let source = "
        *=$1C00
START   LDA $1701
        BPL START
        LDA $1700
        STA $1702
        JMP START
        *=$FFFC
        .WORD START
    ";
    let mut machine = Machine::from_source(MachineConfig::kim1().with_seed(3), source).unwrap();
    assert_eq!(machine.cpu().pc(), 0x1C00);

    machine.push_str("OK\n").unwrap();
    machine.run(60).unwrap();

    assert_eq!(machine.take_output(), b"OK\r");
    let terminal = machine.terminal().unwrap();
    assert!(!terminal.key_ready());
    assert_eq!(terminal.pending_keys(), 0);
}

#[test]
fn test_keys_queue_behind_latched_key() {
    let mut machine = Machine::from_source(MachineConfig::apple1(), "*=$0300\nNOP").unwrap();
    machine.push_str("ABC").unwrap();

    let terminal = machine.terminal().unwrap();
    assert!(terminal.key_ready());
    assert_eq!(terminal.pending_keys(), 2);

    let bus = machine.cpu_mut().memory_mut();
    assert_eq!(bus.read(0xD010 + pia::KBD), b'A' | 0x80);
    assert_eq!(bus.read(0xD010 + pia::KBD), b'B' | 0x80);
    assert_eq!(bus.read(0xD010 + pia::KBDCR) & 0x80, 0x80);
    assert_eq!(bus.read(0xD010 + pia::KBD), b'C' | 0x80);
    assert_eq!(bus.read(0xD010 + pia::KBDCR) & 0x80, 0x00);
}

#[test]
fn test_custom_board_layout() {
    let mut machine = Machine::from_source(
        MachineConfig::custom_board().with_seed(2),
        "
        *=$E000
LOOP    INX
        JMP LOOP
        ",
    )
    .unwrap();
    assert_eq!(machine.cpu().pc(), 0xE000);

    let bus = machine.cpu_mut().memory_mut();
    assert!(bus.is_mapped(0x7FFF));
    assert!(!bus.is_mapped(0x8000));
    assert!(bus.is_mapped(0xC003));
    assert!(!bus.is_mapped(0xC004));
    assert_eq!(bus.read(0x9000), 0xFF);

    // INX + JMP is five cycles a lap
    let used = machine.run_for_cycles(50).unwrap();
    assert_eq!(used, 50);
    assert_eq!(machine.cpu().cycles(), 50);
}

#[test]
fn test_ram_program_on_custom_board() {
    let mut machine = Machine::from_source(
        MachineConfig::custom_board().with_seed(6),
        "
        *=$0400
        LDA #$00
        LDX #$05
ADD     CLC
        ADC #$03
        DEX
        BNE ADD
        STA $0300
        BRK
        ",
    )
    .unwrap();

    machine.cpu_mut().run_until_brk(100).unwrap();
    assert_eq!(machine.cpu_mut().memory_mut().read(0x0300), 15);
}

#[test]
fn test_reset_returns_to_entry() {
    let mut machine = Machine::from_source(MachineConfig::apple1(), HELLO).unwrap();
    machine.run(100).unwrap();
    assert_ne!(machine.cpu().pc(), 0xFF00);

    machine.take_output();
    machine.reset();
    assert_eq!(machine.cpu().pc(), 0xFF00);

    machine.run(100).unwrap();
    assert_eq!(machine.take_output(), b"HELLO");
}

#[test]
fn test_config_builder() {
    let config = MachineConfig::new("trainer")
        .with_ram(0x0000, 0x0800)
        .with_rom(0xF800, 0x0800)
        .with_terminal(0x2000)
        .with_rom_fill(0xEA)
        .with_seed(42);

    assert_eq!(config.name, "trainer");
    assert_eq!(config.ram.len(), 1);
    assert_eq!(config.terminal, Some(0x2000));

    let mut machine = Machine::from_source(config, "*=$F800\nNOP").unwrap();
    // unused ROM is filled
    assert_eq!(machine.cpu_mut().memory_mut().read(0xF900), 0xEA);
}
