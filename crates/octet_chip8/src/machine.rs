use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Chip8Error, Result};
use crate::{
    FONTSET, FONTSET_SIZE, NUM_KEYS, NUM_REGS, PROGRAM_CAPACITY, RAM_SIZE, SCREEN_HEIGHT,
    SCREEN_SIZE, SCREEN_WIDTH, STACK_SIZE, START_ADDRESS,
};

/// Everything a CHIP-8 program can observe or change.
///
/// The machine only guards its own invariants (bounds, stack depth); the
/// meaning of each instruction lives in [`crate::Cpu`].
#[derive(Clone)]
pub struct Machine {
    /// program counter
    pc: u16,
    ram: [u8; RAM_SIZE],
    /// display, row-major, `y * SCREEN_WIDTH + x`
    screen: [bool; SCREEN_SIZE],
    /// V Registers
    v_reg: [u8; NUM_REGS],
    /// I Register
    i_reg: u16,
    /// number of return addresses held in `stack`
    stack_pointer: usize,
    stack: [u16; STACK_SIZE],
    keys: [bool; NUM_KEYS],
    delay_timer: u8,
    sound_timer: u8,
    running: bool,
    redraw: bool,
    seed: Option<u64>,
    rng: StdRng,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// A machine whose random generator is seeded from the OS on every reset.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A machine whose random generator restarts from `seed` on every reset.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(Some(seed))
    }

    fn build(seed: Option<u64>) -> Self {
        let mut machine = Self {
            pc: START_ADDRESS,
            ram: [0; RAM_SIZE],
            screen: [false; SCREEN_SIZE],
            v_reg: [0; NUM_REGS],
            i_reg: 0,
            stack_pointer: 0,
            stack: [0; STACK_SIZE],
            keys: [false; NUM_KEYS],
            delay_timer: 0,
            sound_timer: 0,
            running: true,
            redraw: false,
            seed,
            rng: seeded_rng(seed),
        };
        machine.reset();
        machine
    }

    /// Returns the machine to its power-on state: memory cleared with the
    /// font set reloaded, registers, stack and timers zeroed, pc at 0x200.
    pub fn reset(&mut self) {
        self.pc = START_ADDRESS;
        self.ram = [0; RAM_SIZE];
        self.screen = [false; SCREEN_SIZE];
        self.v_reg = [0; NUM_REGS];
        self.i_reg = 0;
        self.stack_pointer = 0;
        self.stack = [0; STACK_SIZE];
        self.keys = [false; NUM_KEYS];
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.running = true;
        self.redraw = false;
        self.rng = seeded_rng(self.seed);
        self.ram[..FONTSET_SIZE].copy_from_slice(&FONTSET);
        log::debug!("Machine reset");
    }

    /// Copies `rom` verbatim to memory starting at 0x200.
    ///
    /// Returns the number of bytes written. An empty program is accepted.
    pub fn load_program(&mut self, rom: &[u8]) -> Result<usize> {
        if rom.len() > PROGRAM_CAPACITY {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                capacity: PROGRAM_CAPACITY,
            });
        }
        let start = START_ADDRESS as usize;
        self.ram[start..start + rom.len()].copy_from_slice(rom);
        log::info!("Loaded {} byte program at 0x{:03X}", rom.len(), start);
        Ok(rom.len())
    }

    // Memory

    pub fn memory(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }

    pub fn read_byte(&self, addr: usize) -> Result<u8> {
        self.ram
            .get(addr)
            .copied()
            .ok_or(Chip8Error::MemoryOutOfBounds { addr, len: 1 })
    }

    pub fn write_byte(&mut self, addr: usize, value: u8) -> Result<()> {
        let cell = self
            .ram
            .get_mut(addr)
            .ok_or(Chip8Error::MemoryOutOfBounds { addr, len: 1 })?;
        *cell = value;
        Ok(())
    }

    /// `len` bytes starting at `addr`, or an error if any of them is out of range.
    pub fn read_range(&self, addr: usize, len: usize) -> Result<&[u8]> {
        let end = range_end(addr, len)?;
        Ok(&self.ram[addr..end])
    }

    pub fn write_range(&mut self, addr: usize, bytes: &[u8]) -> Result<()> {
        let end = range_end(addr, bytes.len())?;
        self.ram[addr..end].copy_from_slice(bytes);
        Ok(())
    }

    /// The big-endian word at `addr` and `addr + 1`.
    pub fn read_word(&self, addr: usize) -> Result<u16> {
        let bytes = self.read_range(addr, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    // Registers

    pub fn registers(&self) -> &[u8; NUM_REGS] {
        &self.v_reg
    }

    /// Value of register `x`. Only the low nibble of `x` selects the register.
    #[inline]
    pub fn v(&self, x: usize) -> u8 {
        self.v_reg[x & 0xF]
    }

    #[inline]
    pub fn set_v(&mut self, x: usize, value: u8) {
        self.v_reg[x & 0xF] = value;
    }

    pub fn index(&self) -> u16 {
        self.i_reg
    }

    pub fn set_index(&mut self, value: u16) {
        self.i_reg = value;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    pub(crate) fn advance_pc(&mut self, by: u16) {
        self.pc = self.pc.wrapping_add(by);
    }

    // Stack

    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.stack_pointer]
    }

    pub fn stack_depth(&self) -> usize {
        self.stack_pointer
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        if self.stack_pointer == STACK_SIZE {
            return Err(Chip8Error::StackOverflow { pc: self.pc });
        }
        self.stack[self.stack_pointer] = addr;
        self.stack_pointer += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.stack_pointer == 0 {
            return Err(Chip8Error::StackUnderflow { pc: self.pc });
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer])
    }

    // Timers

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.delay_timer = value;
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.sound_timer = value;
    }

    /// The host should produce a tone while this holds.
    pub fn is_beeping(&self) -> bool {
        self.sound_timer > 0
    }

    /// Counts both timers down by one, stopping at zero.
    pub fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            self.sound_timer -= 1;
        }
    }

    // Display

    pub fn display(&self) -> &[bool; SCREEN_SIZE] {
        &self.screen
    }

    /// Whether the pixel at (`x`, `y`) is lit. Off-screen coordinates read as dark.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < SCREEN_WIDTH && y < SCREEN_HEIGHT && self.screen[y * SCREEN_WIDTH + x]
    }

    pub fn clear_screen(&mut self) {
        self.screen = [false; SCREEN_SIZE];
        self.redraw = true;
    }

    /// Flips the pixel at (`x`, `y`) and reports whether it was lit before.
    ///
    /// Coordinates off the 64x32 grid are clipped: nothing changes and no
    /// collision is reported.
    pub fn flip_pixel(&mut self, x: usize, y: usize) -> bool {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return false;
        }
        let pixel = &mut self.screen[y * SCREEN_WIDTH + x];
        let was_set = *pixel;
        *pixel = !was_set;
        was_set
    }

    /// Set by any instruction that changes the display.
    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    pub(crate) fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Reads and clears the redraw flag; call once per consumed frame.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    // Keypad

    pub fn keys(&self) -> &[bool; NUM_KEYS] {
        &self.keys
    }

    /// Replaces the whole key state, normally once before each step.
    pub fn set_keys(&mut self, keys: [bool; NUM_KEYS]) {
        self.keys = keys;
    }

    pub fn set_key(&mut self, key: usize, pressed: bool) -> Result<()> {
        let slot = self
            .keys
            .get_mut(key)
            .ok_or(Chip8Error::KeyOutOfRange { key })?;
        *slot = pressed;
        Ok(())
    }

    pub fn is_key_pressed(&self, key: usize) -> Result<bool> {
        self.keys
            .get(key)
            .copied()
            .ok_or(Chip8Error::KeyOutOfRange { key })
    }

    // Run state

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn halt(&mut self) {
        self.running = false;
    }

    pub(crate) fn random_byte(&mut self) -> u8 {
        self.rng.gen()
    }

    // Diagnostics

    /// All of memory as space-separated big-endian words, four hex digits each.
    pub fn dump_memory(&self) -> String {
        self.ram
            .chunks_exact(2)
            .map(|pair| format!("{:04x}", u16::from_be_bytes([pair[0], pair[1]])))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn range_end(addr: usize, len: usize) -> Result<usize> {
    addr.checked_add(len)
        .filter(|&end| end <= RAM_SIZE)
        .ok_or(Chip8Error::MemoryOutOfBounds { addr, len })
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
