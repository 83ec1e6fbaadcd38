//! Whole-machine tests driven by a stand-in CPU core.
//!
//! The CPU never touches the bus while stepping; it only burns a fixed
//! number of cycles per instruction and records the interrupts the
//! machine hands it. That isolates the frame loop, the interrupt wiring
//! and the loaders from any instruction set.

use emu_core::{Bus, Cpu, Observable, Value};
use emu_vic20::config::{BASIC_ROM_SIZE, CHAR_ROM_SIZE, KERNAL_ROM_SIZE};
use emu_vic20::vic::{CYCLES_PER_FRAME, SCREEN_HEIGHT, SCREEN_WIDTH};
use emu_vic20::{
    CartridgeSlot, JoystickButton, LoadError, LoadedProgram, PixelSink, RamExpansion, Vic20,
    Vic20Bus, Vic20Config, Vic20Key,
};

const RESET_VECTOR: u16 = 0xFD22;

struct ScriptedCpu {
    cycles_per_step: u32,
    pc: u16,
    interrupt_disable: bool,
    steps: u64,
    resets: u32,
    nmis: u32,
    irqs: u32,
}

impl ScriptedCpu {
    fn new(cycles_per_step: u32) -> Self {
        Self {
            cycles_per_step,
            pc: 0,
            interrupt_disable: true,
            steps: 0,
            resets: 0,
            nmis: 0,
            irqs: 0,
        }
    }
}

impl Cpu<Vic20Bus> for ScriptedCpu {
    fn step(&mut self, _bus: &mut Vic20Bus) -> u32 {
        self.steps += 1;
        self.pc = self.pc.wrapping_add(1);
        self.cycles_per_step
    }

    fn reset(&mut self, bus: &mut Vic20Bus) -> u32 {
        self.resets += 1;
        self.interrupt_disable = true;
        self.pc = bus.read_word(0xFFFC);
        7
    }

    fn irq(&mut self, _bus: &mut Vic20Bus) -> u32 {
        self.irqs += 1;
        self.interrupt_disable = true;
        7
    }

    fn nmi(&mut self, _bus: &mut Vic20Bus) -> u32 {
        self.nmis += 1;
        self.interrupt_disable = true;
        7
    }

    fn irq_enabled(&self) -> bool {
        !self.interrupt_disable
    }

    fn pc(&self) -> u16 {
        self.pc
    }

    fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }
}

fn config(ram_expansion: RamExpansion) -> Vic20Config {
    let mut kernal_rom = vec![0xEA; KERNAL_ROM_SIZE];
    let [lo, hi] = RESET_VECTOR.to_le_bytes();
    kernal_rom[0x1FFC] = lo;
    kernal_rom[0x1FFD] = hi;
    Vic20Config {
        kernal_rom,
        basic_rom: vec![0x60; BASIC_ROM_SIZE],
        char_rom: vec![0x00; CHAR_ROM_SIZE],
        ram_expansion,
    }
}

fn machine(cycles_per_step: u32) -> Vic20<ScriptedCpu> {
    init_tracing();
    Vic20::new(&config(RamExpansion::Unexpanded), ScriptedCpu::new(cycles_per_step))
        .expect("valid config")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Counts every pixel the VIC emits, and how many were border colour.
#[derive(Default)]
struct CountingSink {
    pixels: usize,
    border_pixels: usize,
    border: u8,
}

impl PixelSink for CountingSink {
    fn set_pixel(&mut self, _x: u16, _y: u16, colour: u8) {
        self.pixels += 1;
        if colour == self.border {
            self.border_pixels += 1;
        }
    }
}

// --- Frame timing ---

#[test]
fn frame_consumes_exact_budget_without_drift() {
    let mut vic20 = machine(4);
    for _ in 0..5 {
        assert_eq!(vic20.run_frame(), u64::from(CYCLES_PER_FRAME));
        assert_eq!(vic20.frame_carry(), 0);
    }
    assert_eq!(vic20.frame_count(), 5);
    assert_eq!(vic20.cpu().steps, 5 * u64::from(CYCLES_PER_FRAME / 4));
}

#[test]
fn odd_instruction_lengths_carry_overshoot() {
    let mut vic20 = machine(7);
    let start = vic20.master_clock();
    let mut total = 0;
    for k in 1..=20u64 {
        total += vic20.run_frame();
        let carry = u64::from(vic20.frame_carry());
        assert!(carry < 7);
        assert_eq!(total, k * u64::from(CYCLES_PER_FRAME) + carry);
    }
    assert_eq!(vic20.master_clock() - start, total);
}

#[test]
fn every_visible_pixel_drawn_once_per_frame() {
    let mut vic20 = machine(4);
    // Border colour 3, no character area configured
    vic20.bus_mut().write(0x900F, 0x0B);
    let mut sink = CountingSink {
        border: 3,
        ..CountingSink::default()
    };
    vic20.run_frame_into(&mut sink);
    let visible = usize::from(SCREEN_WIDTH) * usize::from(SCREEN_HEIGHT);
    assert_eq!(sink.pixels, visible);
    assert_eq!(sink.border_pixels, visible);
}

#[test]
fn run_frame_paints_own_framebuffer() {
    let mut vic20 = machine(4);
    vic20.bus_mut().write(0x900F, 0x0A); // border 2 (red)
    vic20.run_frame();
    let red = emu_vic20::palette::PALETTE[2];
    assert!(vic20.framebuffer().pixels().iter().all(|&p| p == red));
}

// --- Interrupts ---

#[test]
fn via1_interrupt_is_one_nmi_per_edge() {
    let mut vic20 = machine(2);
    let bus = vic20.bus_mut();
    bus.write(0x911B, 0x40); // ACR: T1 free-run
    bus.write(0x911E, 0x80 | 0x40); // IER: T1
    bus.write(0x9114, 100);
    bus.write(0x9115, 0);

    vic20.run_frame();
    // Flag never acknowledged: the line stays asserted
    assert_eq!(vic20.cpu().nmis, 1);
    vic20.run_frame();
    assert_eq!(vic20.cpu().nmis, 1);

    // Acknowledge, and the next expiry is a fresh edge
    vic20.bus_mut().read(0x9114);
    vic20.run_frame();
    assert_eq!(vic20.cpu().nmis, 2);
}

#[test]
fn via2_irq_waits_for_cpu_to_accept() {
    let mut vic20 = machine(2);
    let bus = vic20.bus_mut();
    bus.write(0x912B, 0x40); // ACR: T1 free-run
    bus.write(0x912E, 0x80 | 0x40); // IER: T1
    bus.write(0x9124, 0x00);
    bus.write(0x9125, 0x10);

    vic20.run_frame();
    assert_eq!(vic20.cpu().irqs, 0);
    assert!(vic20.bus().via2.irq_active());

    vic20.cpu_mut().interrupt_disable = false;
    vic20.run_frame();
    // Entry sets the interrupt-disable flag again
    assert_eq!(vic20.cpu().irqs, 1);
    assert_eq!(vic20.cpu().nmis, 0);
}

#[test]
fn restore_key_raises_nmi_through_ca1() {
    let mut vic20 = machine(2);
    vic20.bus_mut().write(0x911E, 0x80 | 0x02); // IER: CA1

    vic20.run_frame();
    assert_eq!(vic20.cpu().nmis, 0);

    vic20.set_restore(true);
    vic20.run_frame();
    assert_eq!(vic20.cpu().nmis, 1);

    // Holding the key is not another edge
    vic20.run_frame();
    assert_eq!(vic20.cpu().nmis, 1);

    // Releasing is the inactive edge
    vic20.set_restore(false);
    vic20.bus_mut().write(0x911D, 0x02); // acknowledge CA1
    vic20.run_frame();
    assert_eq!(vic20.cpu().nmis, 1);

    vic20.set_restore(true);
    vic20.run_frame();
    assert_eq!(vic20.cpu().nmis, 2);
}

// --- Keyboard and joystick through the VIAs ---

#[test]
fn keyboard_scan_through_bus() {
    let mut vic20 = machine(2);
    vic20.press_key(Vic20Key::Return);
    let (row, col) = Vic20Key::Return.matrix();

    let bus = vic20.bus_mut();
    bus.write(0x9122, 0xFF); // VIA2 DDRB: columns out
    bus.write(0x9123, 0x00); // VIA2 DDRA: rows in
    bus.write(0x9120, !(1 << col));
    assert_eq!(bus.read(0x9121), !(1 << row));

    vic20.release_all_keys();
    assert_eq!(vic20.bus_mut().read(0x9121), 0xFF);
}

#[test]
fn joystick_switches_read_active_low() {
    let mut vic20 = machine(2);
    assert_eq!(vic20.bus_mut().read(0x911F) & 0x3C, 0x3C);
    // PB7 is an input after reset
    assert_eq!(vic20.bus_mut().read(0x9120) & 0x80, 0x80);

    vic20.set_joystick(JoystickButton::Fire, true);
    vic20.set_joystick(JoystickButton::Right, true);
    assert_eq!(vic20.bus_mut().read(0x911F) & 0x3C, 0x1C);
    assert_eq!(vic20.bus_mut().read(0x9120) & 0x80, 0x00);

    vic20.set_joystick(JoystickButton::Fire, false);
    vic20.set_joystick(JoystickButton::Up, true);
    assert_eq!(vic20.bus_mut().read(0x911F) & 0x3C, 0x38);
}

// --- Typed text ---

#[test]
fn typed_text_fills_keyboard_buffer_and_resumes() {
    let mut vic20 = machine(4);
    let bus = vic20.bus_mut();
    bus.write(0x0289, 10); // buffer capacity
    bus.write(0x00C6, 0);

    vic20.type_text("PRINT 12345\n");
    vic20.run_frame();

    assert_eq!(vic20.bus_mut().read(0x00C6), 10);
    assert_eq!(vic20.pending_text(), 2);
    let typed: Vec<u8> = (0..10).map(|i| vic20.bus_mut().read(0x0277 + i)).collect();
    assert_eq!(typed, b"PRINT 1234");

    // The KERNAL drains the buffer
    vic20.bus_mut().write(0x00C6, 0);
    vic20.run_frame();
    assert_eq!(vic20.bus_mut().read(0x00C6), 2);
    assert_eq!(vic20.bus_mut().read(0x0277), b'5');
    assert_eq!(vic20.bus_mut().read(0x0278), 0x0D);
    assert_eq!(vic20.pending_text(), 0);
}

#[test]
fn full_keyboard_buffer_takes_nothing() {
    let mut vic20 = machine(4);
    vic20.bus_mut().write(0x0289, 0);
    vic20.type_text("X");
    vic20.run_frame();
    assert_eq!(vic20.pending_text(), 1);
    assert_eq!(vic20.bus_mut().read(0x0277), 0);
}

// --- Program loading ---

#[test]
fn prg_load_places_bytes_and_sets_end_pointers() {
    let mut vic20 = machine(2);
    let program = vic20
        .load_prg(&[0x01, 0x10, 0x11, 0x22, 0x33], false)
        .expect("load");
    assert_eq!(program, LoadedProgram { start: 0x1001, end: 0x1004 });

    let bus = vic20.bus_mut();
    assert_eq!(bus.read(0x1000), 0x00);
    assert_eq!(bus.read(0x1001), 0x11);
    assert_eq!(bus.read(0x1002), 0x22);
    assert_eq!(bus.read(0x1003), 0x33);
    for pointer in [0x2D, 0x2F, 0x31, 0xAE] {
        assert_eq!(bus.read(pointer), 0x04);
        assert_eq!(bus.read(pointer + 1), 0x10);
    }
    assert_eq!(bus.read_word(0x00AC), 0);
    assert_eq!(vic20.pending_text(), 0);
}

#[test]
fn prg_load_with_run_types_run() {
    let mut vic20 = machine(4);
    vic20.bus_mut().write(0x0289, 10);
    vic20.load_prg(&[0x01, 0x10, 0x00], true).expect("load");
    assert_eq!(vic20.pending_text(), 4);
    vic20.run_frame();
    let typed: Vec<u8> = (0..4).map(|i| vic20.bus_mut().read(0x0277 + i)).collect();
    assert_eq!(typed, b"RUN\r");
}

#[test]
fn short_prg_is_rejected_untouched() {
    let mut vic20 = machine(2);
    vic20.bus_mut().write(0x002D, 0x55);
    assert_eq!(
        vic20.load_prg(&[0x01, 0x10], true),
        Err(LoadError::ProgramTooShort { len: 2 })
    );
    assert_eq!(vic20.bus_mut().read(0x002D), 0x55);
    assert_eq!(vic20.pending_text(), 0);
}

// --- Memory configuration ---

#[test]
fn expansion_16k_maps_blocks_one_and_two() {
    init_tracing();
    let mut vic20 = Vic20::new(&config(RamExpansion::Ram16K), ScriptedCpu::new(2)).expect("valid");
    let bus = vic20.bus_mut();

    for addr in [0x2000u16, 0x3FFF, 0x4000, 0x5FFF] {
        bus.write(addr, 0xA5);
        assert_eq!(bus.read(addr), 0xA5, "${addr:04X}");
    }
    for addr in [0x0400u16, 0x0FFF, 0x6000, 0x7FFF, 0xA000, 0xBFFF] {
        bus.write(addr, 0xA5);
        assert_eq!(bus.read(addr), (addr >> 8) as u8, "${addr:04X}");
    }
}

#[test]
fn expansion_can_change_at_runtime() {
    let mut vic20 = machine(2);
    vic20.enable_ram_block(0, true);
    vic20.bus_mut().write(0x0400, 0x77);
    assert_eq!(vic20.bus_mut().read(0x0400), 0x77);

    vic20.set_ram_expansion(RamExpansion::Ram8K);
    assert_eq!(vic20.bus_mut().read(0x0400), 0x04);
    vic20.bus_mut().write(0x2000, 0x12);
    assert_eq!(vic20.bus_mut().read(0x2000), 0x12);
}

#[test]
fn unmapped_addresses_float_and_ignore_writes() {
    let mut vic20 = machine(2);
    let bus = vic20.bus_mut();
    bus.write(0x1000, 0x99);
    let unmapped = [0x0400u16, 0x0BFF, 0x2000, 0x5ABC, 0x7FFF, 0x9100, 0x9800, 0x9C00, 0xA000, 0xBFFF];
    for &addr in &unmapped {
        bus.write(addr, 0x00);
        assert_eq!(bus.read(addr), (addr >> 8) as u8, "${addr:04X}");
        assert_eq!(bus.read(addr), (addr >> 8) as u8, "${addr:04X} stable");
    }
    assert_eq!(bus.read(0x1000), 0x99);
}

#[test]
fn roms_ignore_writes() {
    let mut vic20 = machine(2);
    let bus = vic20.bus_mut();
    bus.write(0xC000, 0x00);
    bus.write(0xE000, 0x00);
    assert_eq!(bus.read(0xC000), 0x60);
    assert_eq!(bus.read(0xE000), 0xEA);
}

// --- Cartridges ---

fn cartridge_image(address: u16, len: usize) -> Vec<u8> {
    let mut image = address.to_le_bytes().to_vec();
    image.extend((0..len).map(|i| (i % 251) as u8));
    image
}

#[test]
fn cartridge_header_selects_slot_and_resets() {
    let mut vic20 = machine(2);
    let resets = vic20.cpu().resets;

    let slot = vic20
        .load_cartridge(&cartridge_image(0xA000, 8192), None, true)
        .expect("load");
    assert_eq!(slot, CartridgeSlot::Blk5);
    assert_eq!(vic20.cpu().resets, resets + 1);
    assert_eq!(vic20.cpu().pc(), RESET_VECTOR);

    let bus = vic20.bus_mut();
    assert_eq!(bus.read(0xA000), 0);
    assert_eq!(bus.read(0xA001), 1);
    assert_eq!(bus.read(0xBFFF), (8191 % 251) as u8);
    bus.write(0xA000, 0xFF);
    assert_eq!(bus.read(0xA000), 0);
}

#[test]
fn cartridge_overrides_expansion_ram() {
    init_tracing();
    let mut vic20 = Vic20::new(&config(RamExpansion::Ram8K), ScriptedCpu::new(2)).expect("valid");
    vic20.bus_mut().write(0x2000, 0x42);
    vic20
        .load_cartridge(&cartridge_image(0x2000, 4096), None, false)
        .expect("load");
    assert_eq!(vic20.bus_mut().read(0x2000), 0);

    vic20.eject_cartridge(CartridgeSlot::Blk1);
    assert_eq!(vic20.bus_mut().read(0x2000), 0x42);
}

#[test]
fn cartridge_errors() {
    let mut vic20 = machine(2);
    assert_eq!(
        vic20.load_cartridge(&cartridge_image(0x9000, 4096), None, false),
        Err(LoadError::UnsupportedCartridgeAddress(0x9000))
    );
    assert_eq!(
        vic20.load_cartridge(&[0; 5000], None, false),
        Err(LoadError::MissingCartridgeAddress { len: 5000 })
    );
}

#[test]
fn oversized_cartridge_drops_leading_bytes() {
    let mut vic20 = machine(2);
    let image: Vec<u8> = (0..5000u32).map(|i| (i % 256) as u8).collect();
    vic20
        .load_cartridge(&image, Some(CartridgeSlot::Blk3), false)
        .expect("load");
    let kept = &image[5000 - 4096..];
    let bus = vic20.bus_mut();
    assert_eq!(bus.read(0x6000), kept[0]);
    assert_eq!(bus.read(0x6FFF), kept[4095]);
    // 4K image mirrors through the 8K window
    assert_eq!(bus.read(0x7000), kept[0]);
}

#[test]
fn undersized_cartridge_trims_to_nothing() {
    let mut vic20 = machine(2);
    vic20.enable_ram_block(3, true);
    vic20
        .load_cartridge(&[0xAA; 100], Some(CartridgeSlot::Blk3), false)
        .expect("load");
    let bus = vic20.bus_mut();
    assert_eq!(bus.read(0x6000), 0x60);
    assert_eq!(bus.read(0x7ABC), 0x7A);
}

// --- Observability ---

#[test]
fn queries_cover_chips_and_memory() {
    let mut vic20 = machine(4);
    vic20.bus_mut().write(0x1234, 0x56);
    vic20.bus_mut().write(0x9002, 0x96);
    vic20.run_frame();

    assert_eq!(vic20.query("memory.$1234"), Some(Value::U8(0x56)));
    assert_eq!(vic20.query("vic.columns"), Some(Value::U8(22)));
    assert_eq!(vic20.query("frame_count"), Some(Value::U64(1)));
    assert_eq!(vic20.query("via1.ca1"), Some(Value::Bool(true)));
    assert_eq!(vic20.query("nope"), None);
    assert!(vic20.query_paths().contains(&"memory.<address>"));
}

#[test]
fn query_does_not_acknowledge_interrupts() {
    let mut vic20 = machine(2);
    let bus = vic20.bus_mut();
    bus.write(0x912E, 0x80 | 0x40);
    bus.write(0x9124, 10);
    bus.write(0x9125, 0);
    vic20.run_frame();

    assert_eq!(vic20.query("via2.irq"), Some(Value::Bool(true)));
    assert!(vic20.query("memory.$9124").is_some());
    assert_eq!(vic20.query("via2.irq"), Some(Value::Bool(true)));
    assert!(vic20.bus().via2.irq_active());
}
