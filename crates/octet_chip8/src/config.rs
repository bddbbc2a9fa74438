use typed_builder::TypedBuilder;

/// What the engine does with opcodes it decodes but has no semantics for
/// (`8XY1`, `8XY3`, `8XY6`, `8XY7`, `8XYE`, `FX0A`, `FX55`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnimplementedPolicy {
    /// Leave pc where it is. The program keeps fetching the same opcode.
    #[default]
    Stall,
    /// Treat the opcode as a no-op and move to the next instruction.
    Skip,
    /// Stop the machine with `Chip8Error::Unimplemented`.
    Halt,
}

/// Interpreter behaviour switches.
///
/// The defaults follow the documented CHIP-8 semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, TypedBuilder)]
pub struct Quirks {
    /// `FX15` loads the delay timer with X itself instead of VX.
    #[builder(default)]
    pub delay_from_register_index: bool,
    #[builder(default)]
    pub unimplemented: UnimplementedPolicy,
}
