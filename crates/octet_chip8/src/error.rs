use thiserror::Error;

pub type Result<T> = std::result::Result<T, Chip8Error>;

/// Fatal conditions raised by the machine or the instruction engine.
///
/// Any of these stops the machine: the running flag is cleared before the
/// error is handed back, and only `reset()` makes it steppable again.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chip8Error {
    #[error("memory access out of bounds: {len} byte(s) at 0x{addr:04X}")]
    MemoryOutOfBounds { addr: usize, len: usize },
    #[error("stack overflow on call at pc 0x{pc:04X}")]
    StackOverflow { pc: u16 },
    #[error("stack underflow on return at pc 0x{pc:04X}")]
    StackUnderflow { pc: u16 },
    #[error("key index out of range: {key}")]
    KeyOutOfRange { key: usize },
    #[error("program of {size} bytes does not fit in {capacity} bytes of program memory")]
    RomTooLarge { size: usize, capacity: usize },
    #[error("unimplemented opcode 0x{opcode:04X} at pc 0x{pc:04X}")]
    Unimplemented { opcode: u16, pc: u16 },
    #[error("machine is not running, reset it before stepping")]
    NotRunning,
}
