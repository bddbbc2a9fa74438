use crate::config::{Quirks, UnimplementedPolicy};
use crate::error::{Chip8Error, Result};
use crate::machine::Machine;
use crate::opcode::{Decoded, Instruction};
use crate::{FLAG_REG, GLYPH_SIZE, INDEX_LIMIT};

/// Outcome of a single [`Cpu::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The instruction ran and moved pc on.
    Executed(Instruction),
    /// Recognised but unimplemented; pc was left on it.
    Stalled(Instruction),
    /// Recognised but unimplemented; pc moved past it with no other effect.
    Skipped(Instruction),
    /// Unknown opcode inside a known family. Reported, pc left on it.
    Unrecognized(u16),
    /// Unknown opcode family. The machine has stopped running.
    Halted(u16),
}

/// The fetch/decode/execute engine.
///
/// It holds no machine state of its own, so one `Cpu` can drive any number
/// of independent [`Machine`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cpu {
    quirks: Quirks,
}

impl Cpu {
    pub fn new(quirks: Quirks) -> Self {
        Self { quirks }
    }

    pub fn quirks(&self) -> &Quirks {
        &self.quirks
    }

    /// Runs one instruction at pc, then counts the timers down.
    ///
    /// A fatal error stops the machine before anything of the failing
    /// instruction is applied; the timers are left alone in that case.
    pub fn step(&self, machine: &mut Machine) -> Result<Step> {
        if !machine.is_running() {
            return Err(Chip8Error::NotRunning);
        }
        match self.cycle(machine) {
            Ok(step) => {
                machine.tick_timers();
                Ok(step)
            }
            Err(err) => {
                machine.halt();
                Err(err)
            }
        }
    }

    fn cycle(&self, machine: &mut Machine) -> Result<Step> {
        let pc = machine.pc();
        let opcode = machine.read_word(pc as usize)?;

        match Instruction::decode(opcode) {
            Decoded::Instruction(inst) => {
                log::trace!("{pc:03X}: {opcode:04X} {inst}");
                self.execute(machine, inst, opcode)
            }
            Decoded::UnknownInFamily(op) => {
                log::warn!("Unknown opcode 0x{op:04X} at 0x{pc:03X}");
                Ok(Step::Unrecognized(op))
            }
            Decoded::UnknownFamily(op) => {
                log::debug!("Unrecognized opcode family 0x{op:04X} at 0x{pc:03X}, halting");
                machine.halt();
                Ok(Step::Halted(op))
            }
        }
    }

    /// Applies `inst`, fetched as `opcode` from pc.
    fn execute(&self, m: &mut Machine, inst: Instruction, opcode: u16) -> Result<Step> {
        use Instruction::*;

        match inst {
            ClearScreen => m.clear_screen(),
            Return => {
                let ret = m.pop()?;
                // Resume after the call instruction
                m.set_pc(ret);
            }
            Jump { addr } => {
                m.set_pc(addr);
                return Ok(Step::Executed(inst));
            }
            Call { addr } => {
                m.push(m.pc())?;
                m.set_pc(addr);
                return Ok(Step::Executed(inst));
            }
            SkipEqual { x, nn } => {
                let cond = m.v(x) == nn;
                skip_if(m, cond);
                return Ok(Step::Executed(inst));
            }
            SkipNotEqual { x, nn } => {
                let cond = m.v(x) != nn;
                skip_if(m, cond);
                return Ok(Step::Executed(inst));
            }
            Load { x, nn } => m.set_v(x, nn),
            AddImmediate { x, nn } => m.set_v(x, m.v(x).wrapping_add(nn)),
            Assign { x, y } => m.set_v(x, m.v(y)),
            And { x, y } => m.set_v(x, m.v(x) & m.v(y)),
            AddRegister { x, y } => {
                let (val, carry) = m.v(x).overflowing_add(m.v(y));
                m.set_v(x, val);
                m.set_v(FLAG_REG, carry as u8);
            }
            SubRegister { x, y } => {
                // VF is 0 when there's a borrow, and 1 when there isn't
                let (val, borrow) = m.v(x).overflowing_sub(m.v(y));
                m.set_v(x, val);
                m.set_v(FLAG_REG, !borrow as u8);
            }
            SetIndex { addr } => m.set_index(addr),
            Random { x, nn } => {
                let byte = m.random_byte();
                m.set_v(x, byte & nn);
            }
            Draw { x, y, n } => {
                let (col, row) = (m.v(x) as usize, m.v(y) as usize);
                draw_sprite(m, col, row, n as usize)?;
            }
            SkipKeyPressed { x } => {
                let pressed = m.is_key_pressed(m.v(x) as usize)?;
                skip_if(m, pressed);
                return Ok(Step::Executed(inst));
            }
            SkipKeyNotPressed { x } => {
                let pressed = m.is_key_pressed(m.v(x) as usize)?;
                skip_if(m, !pressed);
                return Ok(Step::Executed(inst));
            }
            ReadDelay { x } => m.set_v(x, m.delay_timer()),
            SetDelay { x } => {
                let value = if self.quirks.delay_from_register_index {
                    x as u8
                } else {
                    m.v(x)
                };
                log::debug!("Delay timer set to {value}");
                m.set_delay_timer(value);
            }
            SetSound { x } => {
                log::debug!("Sound timer set to {}", m.v(x));
                m.set_sound_timer(m.v(x));
            }
            AddIndex { x } => {
                let sum = m.index() as u32 + m.v(x) as u32;
                m.set_v(FLAG_REG, (sum > INDEX_LIMIT as u32) as u8);
                m.set_index(sum as u16);
            }
            FontGlyph { x } => m.set_index(m.v(x) as u16 * GLYPH_SIZE as u16),
            StoreBcd { x } => {
                let val = m.v(x);
                m.write_range(m.index() as usize, &[val / 100, (val / 10) % 10, val % 10])?;
            }
            LoadRegisters { x } => {
                let mut regs = [0u8; 16];
                regs[..=x].copy_from_slice(m.read_range(m.index() as usize, x + 1)?);
                for (i, &val) in regs[..=x].iter().enumerate() {
                    m.set_v(i, val);
                }
                m.set_index(m.index().wrapping_add(x as u16 + 1));
            }
            Or { .. }
            | Xor { .. }
            | ShiftRight { .. }
            | SubReverse { .. }
            | ShiftLeft { .. }
            | WaitKey { .. }
            | StoreRegisters { .. } => return self.unimplemented(m, inst, opcode),
        }
        m.advance_pc(2);
        Ok(Step::Executed(inst))
    }

    fn unimplemented(&self, m: &mut Machine, inst: Instruction, opcode: u16) -> Result<Step> {
        let pc = m.pc();
        match self.quirks.unimplemented {
            UnimplementedPolicy::Stall => {
                log::warn!("Unimplemented opcode 0x{opcode:04X} ({inst}) at 0x{pc:03X}");
                Ok(Step::Stalled(inst))
            }
            UnimplementedPolicy::Skip => {
                log::warn!("Skipping unimplemented opcode 0x{opcode:04X} ({inst}) at 0x{pc:03X}");
                m.advance_pc(2);
                Ok(Step::Skipped(inst))
            }
            UnimplementedPolicy::Halt => Err(Chip8Error::Unimplemented { opcode, pc }),
        }
    }
}

fn skip_if(m: &mut Machine, cond: bool) {
    m.advance_pc(if cond { 4 } else { 2 });
}

/// XOR-blits an `height`-row sprite read from I at (`x`, `y`).
///
/// VF ends up 1 if any lit pixel was turned off. Pixels past the right or
/// bottom edge are clipped.
fn draw_sprite(m: &mut Machine, x: usize, y: usize, height: usize) -> Result<()> {
    let mut sprite = [0u8; 16];
    sprite[..height].copy_from_slice(m.read_range(m.index() as usize, height)?);

    let mut collision = false;
    for (row, &bits) in sprite[..height].iter().enumerate() {
        for col in 0..8 {
            if bits & (0x80 >> col) != 0 {
                collision |= m.flip_pixel(x + col, y + row);
            }
        }
    }
    m.set_v(FLAG_REG, collision as u8);
    m.request_redraw();
    Ok(())
}
