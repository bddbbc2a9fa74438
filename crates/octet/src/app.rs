use anyhow::Result;
use octet_chip8::{Cpu, Machine, Quirks, Step, SCREEN_HEIGHT, SCREEN_WIDTH};
use octet_term::App;

/// Drives the CHIP-8 core from the text frontend.
///
/// Key state lives on `machine`; the host sets it there between cycles and
/// the app never overwrites it.
pub struct EmulatorApp {
    cpu: Cpu,
    pub machine: Machine,
    beep: bool,
    should_exit: bool,
}

impl EmulatorApp {
    pub fn new(quirks: Quirks, seed: Option<u64>) -> Self {
        let machine = match seed {
            Some(seed) => Machine::with_seed(seed),
            None => Machine::new(),
        };
        Self {
            cpu: Cpu::new(quirks),
            machine,
            beep: false,
            should_exit: false,
        }
    }
}

impl App for EmulatorApp {
    fn init(&mut self) {
        log::info!("Chip8 init");
    }

    fn update(&mut self, screen: &mut [bool]) -> Result<bool> {
        // The tone starts on the cycle the sound timer reads 1
        self.beep = self.machine.sound_timer() == 1;

        match self.cpu.step(&mut self.machine) {
            Ok(Step::Halted(opcode)) => {
                log::info!(
                    "Program stopped on opcode 0x{:04X} at 0x{:03X}",
                    opcode,
                    self.machine.pc()
                );
                self.should_exit = true;
            }
            Ok(_) => {}
            Err(err) => {
                log::error!("Chip8 stopped: {err}");
                self.should_exit = true;
                return Err(err.into());
            }
        }

        if self.machine.take_redraw() {
            screen.copy_from_slice(self.machine.display());
            return Ok(true);
        }
        Ok(false)
    }

    fn should_beep(&self) -> bool {
        self.beep
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn exit(&mut self) {
        log::info!("Chip8 exit");
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn title(&self) -> String {
        "Octet Chip-8".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octet_chip8::SCREEN_SIZE;
    use octet_term::render_frame;

    fn app_with(program: &[u8]) -> EmulatorApp {
        let mut app = EmulatorApp::new(Quirks::default(), Some(1));
        app.machine.load_program(program).unwrap();
        app
    }

    #[test]
    fn keys_set_on_the_machine_reach_the_program() {
        // V0 = 7, skip if key V0 is pressed
        let mut app = app_with(&[0x60, 0x07, 0xE0, 0x9E]);
        app.machine.set_key(7, true).unwrap();
        let mut screen = [false; SCREEN_SIZE];

        app.update(&mut screen).unwrap();
        app.update(&mut screen).unwrap();
        assert_eq!(app.machine.pc(), 0x206);
    }

    #[test]
    fn presents_the_full_display() {
        // I = glyph 0, draw it at (V0, V0)
        let mut app = app_with(&[0xA0, 0x00, 0xD0, 0x05]);
        let mut screen = [false; SCREEN_SIZE];

        assert!(!app.update(&mut screen).unwrap());
        assert!(app.update(&mut screen).unwrap());

        let text = render_frame(&screen, app.width() as usize);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), SCREEN_HEIGHT);
        assert!(lines.iter().all(|line| line.len() == SCREEN_WIDTH));
        assert!(lines[0].starts_with("XXXX "));
        assert!(lines[1].starts_with("X  X "));
    }

    #[test]
    fn unknown_family_asks_to_exit() {
        let mut app = app_with(&[0x50, 0x00]);
        let mut screen = [false; SCREEN_SIZE];
        app.update(&mut screen).unwrap();
        assert!(app.should_exit());
    }
}
