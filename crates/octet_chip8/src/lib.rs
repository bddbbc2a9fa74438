mod config;
mod cpu;
mod error;
mod machine;
mod opcode;

pub use config::{Quirks, UnimplementedPolicy};
pub use cpu::{Cpu, Step};
pub use error::{Chip8Error, Result};
pub use machine::Machine;
pub use opcode::{Decoded, Instruction};

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const SCREEN_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

pub const RAM_SIZE: usize = 4096;
pub const NUM_REGS: usize = 16;
pub const STACK_SIZE: usize = 16;
pub const NUM_KEYS: usize = 16;

/// Address the program is loaded at and where execution starts.
pub const START_ADDRESS: u16 = 0x200;
/// Bytes available to a program, from `START_ADDRESS` up to the end of memory.
pub const PROGRAM_CAPACITY: usize = RAM_SIZE - START_ADDRESS as usize;

/// Highest address the index register is meant to hold; `FX1E` flags going past it.
pub const INDEX_LIMIT: u16 = 0x0FFF;

/// Index of the flag register VF.
pub const FLAG_REG: usize = 0xF;

/// Bytes per font glyph.
pub const GLYPH_SIZE: usize = 5;
pub const FONTSET_SIZE: usize = 80;

/// The 16 hexadecimal digit glyphs, 4x5 pixels each, stored at address 0.
pub const FONTSET: [u8; FONTSET_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
