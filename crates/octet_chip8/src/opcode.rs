use std::fmt;

/// A decoded CHIP-8 instruction.
///
/// Register operands are indices into V0..VF, already reduced to a nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 - CLS
    ClearScreen,
    /// 00EE - RET
    Return,
    /// 1NNN - JP addr
    Jump { addr: u16 },
    /// 2NNN - CALL addr
    Call { addr: u16 },
    /// 3XNN - SE Vx, byte
    SkipEqual { x: usize, nn: u8 },
    /// 4XNN - SNE Vx, byte
    SkipNotEqual { x: usize, nn: u8 },
    /// 6XNN - LD Vx, byte
    Load { x: usize, nn: u8 },
    /// 7XNN - ADD Vx, byte
    AddImmediate { x: usize, nn: u8 },
    /// 8XY0 - LD Vx, Vy
    Assign { x: usize, y: usize },
    /// 8XY1 - OR Vx, Vy
    Or { x: usize, y: usize },
    /// 8XY2 - AND Vx, Vy
    And { x: usize, y: usize },
    /// 8XY3 - XOR Vx, Vy
    Xor { x: usize, y: usize },
    /// 8XY4 - ADD Vx, Vy, VF = carry
    AddRegister { x: usize, y: usize },
    /// 8XY5 - SUB Vx, Vy, VF = !borrow
    SubRegister { x: usize, y: usize },
    /// 8XY6 - SHR Vx
    ShiftRight { x: usize, y: usize },
    /// 8XY7 - SUBN Vx, Vy
    SubReverse { x: usize, y: usize },
    /// 8XYE - SHL Vx
    ShiftLeft { x: usize, y: usize },
    /// ANNN - LD I, addr
    SetIndex { addr: u16 },
    /// CXNN - RND Vx, byte
    Random { x: usize, nn: u8 },
    /// DXYN - DRW Vx, Vy, nibble
    Draw { x: usize, y: usize, n: u8 },
    /// EX9E - SKP Vx
    SkipKeyPressed { x: usize },
    /// EXA1 - SKNP Vx
    SkipKeyNotPressed { x: usize },
    /// FX07 - LD Vx, DT
    ReadDelay { x: usize },
    /// FX0A - LD Vx, K
    WaitKey { x: usize },
    /// FX15 - LD DT, Vx
    SetDelay { x: usize },
    /// FX18 - LD ST, Vx
    SetSound { x: usize },
    /// FX1E - ADD I, Vx
    AddIndex { x: usize },
    /// FX29 - LD F, Vx
    FontGlyph { x: usize },
    /// FX33 - LD B, Vx
    StoreBcd { x: usize },
    /// FX55 - LD [I], Vx
    StoreRegisters { x: usize },
    /// FX65 - LD Vx, [I]
    LoadRegisters { x: usize },
}

/// Result of decoding a raw opcode word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Instruction(Instruction),
    /// The top nibble selects a known family (0x0, 0x8, 0xE, 0xF) but the
    /// rest of the word matches nothing in it.
    UnknownInFamily(u16),
    /// The top nibble itself has no instructions.
    UnknownFamily(u16),
}

#[inline]
fn x(op: u16) -> usize {
    ((op & 0x0F00) >> 8) as usize
}

#[inline]
fn y(op: u16) -> usize {
    ((op & 0x00F0) >> 4) as usize
}

#[inline]
fn n(op: u16) -> u8 {
    (op & 0x000F) as u8
}

#[inline]
fn nn(op: u16) -> u8 {
    (op & 0x00FF) as u8
}

#[inline]
fn nnn(op: u16) -> u16 {
    op & 0x0FFF
}

impl Instruction {
    pub fn decode(op: u16) -> Decoded {
        use Instruction::*;

        let inst = match (op & 0xF000) >> 12 {
            0x0 => match op {
                0x00E0 => ClearScreen,
                0x00EE => Return,
                _ => return Decoded::UnknownInFamily(op),
            },
            0x1 => Jump { addr: nnn(op) },
            0x2 => Call { addr: nnn(op) },
            0x3 => SkipEqual { x: x(op), nn: nn(op) },
            0x4 => SkipNotEqual { x: x(op), nn: nn(op) },
            0x6 => Load { x: x(op), nn: nn(op) },
            0x7 => AddImmediate { x: x(op), nn: nn(op) },
            0x8 => {
                let (x, y) = (x(op), y(op));
                match n(op) {
                    0x0 => Assign { x, y },
                    0x1 => Or { x, y },
                    0x2 => And { x, y },
                    0x3 => Xor { x, y },
                    0x4 => AddRegister { x, y },
                    0x5 => SubRegister { x, y },
                    0x6 => ShiftRight { x, y },
                    0x7 => SubReverse { x, y },
                    0xE => ShiftLeft { x, y },
                    _ => return Decoded::UnknownInFamily(op),
                }
            }
            0xA => SetIndex { addr: nnn(op) },
            0xC => Random { x: x(op), nn: nn(op) },
            0xD => Draw {
                x: x(op),
                y: y(op),
                n: n(op),
            },
            0xE => match nn(op) {
                0x9E => SkipKeyPressed { x: x(op) },
                0xA1 => SkipKeyNotPressed { x: x(op) },
                _ => return Decoded::UnknownInFamily(op),
            },
            0xF => {
                let x = x(op);
                match nn(op) {
                    0x07 => ReadDelay { x },
                    0x0A => WaitKey { x },
                    0x15 => SetDelay { x },
                    0x18 => SetSound { x },
                    0x1E => AddIndex { x },
                    0x29 => FontGlyph { x },
                    0x33 => StoreBcd { x },
                    0x55 => StoreRegisters { x },
                    0x65 => LoadRegisters { x },
                    _ => return Decoded::UnknownInFamily(op),
                }
            }
            // 0x5, 0x9 and 0xB have no instructions here
            _ => return Decoded::UnknownFamily(op),
        };
        Decoded::Instruction(inst)
    }

    /// Whether the engine gives this instruction any effect.
    pub fn is_implemented(&self) -> bool {
        use Instruction::*;
        !matches!(
            self,
            Or { .. }
                | Xor { .. }
                | ShiftRight { .. }
                | SubReverse { .. }
                | ShiftLeft { .. }
                | WaitKey { .. }
                | StoreRegisters { .. }
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { addr } => write!(f, "JP 0x{addr:03X}"),
            Call { addr } => write!(f, "CALL 0x{addr:03X}"),
            SkipEqual { x, nn } => write!(f, "SE V{x}, 0x{nn:02X}"),
            SkipNotEqual { x, nn } => write!(f, "SNE V{x}, 0x{nn:02X}"),
            Load { x, nn } => write!(f, "LD V{x}, 0x{nn:02X}"),
            AddImmediate { x, nn } => write!(f, "ADD V{x}, 0x{nn:02X}"),
            Assign { x, y } => write!(f, "LD V{x}, V{y}"),
            Or { x, y } => write!(f, "OR V{x}, V{y}"),
            And { x, y } => write!(f, "AND V{x}, V{y}"),
            Xor { x, y } => write!(f, "XOR V{x}, V{y}"),
            AddRegister { x, y } => write!(f, "ADD V{x}, V{y}"),
            SubRegister { x, y } => write!(f, "SUB V{x}, V{y}"),
            ShiftRight { x, y } => write!(f, "SHR V{x}, V{y}"),
            SubReverse { x, y } => write!(f, "SUBN V{x}, V{y}"),
            ShiftLeft { x, y } => write!(f, "SHL V{x}, V{y}"),
            SetIndex { addr } => write!(f, "LD I, 0x{addr:03X}"),
            Random { x, nn } => write!(f, "RND V{x}, 0x{nn:02X}"),
            Draw { x, y, n } => write!(f, "DRW V{x}, V{y}, {n}"),
            SkipKeyPressed { x } => write!(f, "SKP V{x}"),
            SkipKeyNotPressed { x } => write!(f, "SKNP V{x}"),
            ReadDelay { x } => write!(f, "LD V{x}, DT"),
            WaitKey { x } => write!(f, "LD V{x}, K"),
            SetDelay { x } => write!(f, "LD DT, V{x}"),
            SetSound { x } => write!(f, "LD ST, V{x}"),
            AddIndex { x } => write!(f, "ADD I, V{x}"),
            FontGlyph { x } => write!(f, "LD F, V{x}"),
            StoreBcd { x } => write!(f, "LD B, V{x}"),
            StoreRegisters { x } => write!(f, "LD [I], V{x}"),
            LoadRegisters { x } => write!(f, "LD V{x}, [I]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_operand_fields() {
        assert_eq!(
            Instruction::decode(0xD12F),
            Decoded::Instruction(Instruction::Draw { x: 1, y: 2, n: 0xF })
        );
        assert_eq!(
            Instruction::decode(0x2ABC),
            Decoded::Instruction(Instruction::Call { addr: 0xABC })
        );
        assert_eq!(
            Instruction::decode(0x7A03),
            Decoded::Instruction(Instruction::AddImmediate { x: 0xA, nn: 0x03 })
        );
        assert_eq!(
            Instruction::decode(0xF533),
            Decoded::Instruction(Instruction::StoreBcd { x: 5 })
        );
    }

    #[test]
    fn unknown_families_are_distinct_from_unknown_secondaries() {
        for op in [0x5120, 0x9AB0, 0xB123] {
            assert_eq!(Instruction::decode(op), Decoded::UnknownFamily(op));
        }
        for op in [0x0000, 0x0123, 0x00E1, 0x8128, 0xE19F, 0xF1FF] {
            assert_eq!(Instruction::decode(op), Decoded::UnknownInFamily(op));
        }
    }

    #[test]
    fn stalling_opcodes_decode_but_are_not_implemented() {
        for op in [0x8121, 0x8123, 0x8126, 0x8127, 0x812E, 0xF10A, 0xF155] {
            match Instruction::decode(op) {
                Decoded::Instruction(inst) => assert!(!inst.is_implemented(), "{op:04X}"),
                other => panic!("0x{op:04X} decoded as {other:?}"),
            }
        }
        match Instruction::decode(0xF165) {
            Decoded::Instruction(inst) => assert!(inst.is_implemented()),
            other => panic!("decoded as {other:?}"),
        }
    }

    #[test]
    fn mnemonics() {
        let show = |op| match Instruction::decode(op) {
            Decoded::Instruction(inst) => inst.to_string(),
            other => panic!("decoded as {other:?}"),
        };
        assert_eq!(show(0x00E0), "CLS");
        assert_eq!(show(0x6A05), "LD V10, 0x05");
        assert_eq!(show(0xA2F0), "LD I, 0x2F0");
        assert_eq!(show(0xD015), "DRW V0, V1, 5");
    }
}
