use anyhow::{Context, Result};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use typed_builder::TypedBuilder;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";
const BELL: char = '\x07';

/// An emulator the text frontend can drive, one cycle per `update`.
pub trait App {
    fn init(&mut self);
    /// Runs one cycle. Returns `true` when `screen` holds a new frame to present.
    fn update(&mut self, screen: &mut [bool]) -> Result<bool>;
    /// Whether a tone should start on this cycle.
    fn should_beep(&self) -> bool;
    fn should_exit(&self) -> bool;
    fn exit(&mut self);

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn title(&self) -> String;
}

#[derive(TypedBuilder)]
pub struct TermInitInfo {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Cycles per second. 0 runs unpaced.
    #[builder(default = 500)]
    pub cycle_hz: u32,
    /// Stop after this many cycles even if the app keeps running.
    #[builder(default, setter(strip_option))]
    pub max_cycles: Option<u64>,
    /// Clear the terminal before each frame instead of appending frames.
    #[builder(default = true)]
    pub clear_between_frames: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub cycles: u64,
    pub frames: u64,
}

pub struct TermContext<W: Write> {
    out: W,
    width: usize,
    height: usize,
    cycle_period: Option<Duration>,
    max_cycles: Option<u64>,
    clear_between_frames: bool,
}

impl TermContext<io::Stdout> {
    /// Drives `app` on stdout until it asks to exit.
    pub fn run(init_info: TermInitInfo, app: impl App) -> Result<RunStats> {
        TermContext::new(init_info, io::stdout()).drive(app)
    }
}

impl<W: Write> TermContext<W> {
    pub fn new(init_info: TermInitInfo, out: W) -> Self {
        let TermInitInfo {
            width,
            height,
            title,
            cycle_hz,
            max_cycles,
            clear_between_frames,
        } = init_info;
        log::info!("{title}: {width}x{height} at {cycle_hz} Hz");

        let cycle_period = (cycle_hz > 0).then(|| Duration::from_secs(1) / cycle_hz);
        Self {
            out,
            width: width as usize,
            height: height as usize,
            cycle_period,
            max_cycles,
            clear_between_frames,
        }
    }

    pub fn drive(&mut self, mut app: impl App) -> Result<RunStats> {
        let mut screen_state = vec![false; self.width * self.height];
        let mut stats = RunStats::default();

        app.init();
        let mut last_cycle = Instant::now();
        loop {
            if app.should_exit() || self.max_cycles.is_some_and(|max| stats.cycles >= max) {
                app.exit();
                break;
            }

            let new_frame = match app.update(&mut screen_state) {
                Ok(new_frame) => new_frame,
                Err(err) => {
                    app.exit();
                    return Err(err);
                }
            };
            stats.cycles += 1;

            if app.should_beep() {
                write!(self.out, "{BELL}")?;
            }
            if new_frame {
                self.present(&screen_state)?;
                stats.frames += 1;
            }

            if let Some(period) = self.cycle_period {
                let elapsed = last_cycle.elapsed();
                if elapsed < period {
                    std::thread::sleep(period - elapsed);
                }
                last_cycle = Instant::now();
            }
        }

        log::info!("Ran {} cycles, presented {} frames", stats.cycles, stats.frames);
        Ok(stats)
    }

    fn present(&mut self, screen: &[bool]) -> Result<()> {
        let frame = render_frame(screen, self.width);
        if self.clear_between_frames {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        self.out
            .write_all(frame.as_bytes())
            .and_then(|_| self.out.flush())
            .context("failed to write frame")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// One text line per row, `X` for lit pixels and a space for dark ones.
pub fn render_frame(screen: &[bool], width: usize) -> String {
    let mut out = String::with_capacity(screen.len() + screen.len() / width.max(1));
    for row in screen.chunks(width.max(1)) {
        out.extend(row.iter().map(|&lit| if lit { 'X' } else { ' ' }));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lights one more pixel per cycle and presents every other cycle.
    struct Counter {
        cycle: usize,
        stop_at: usize,
        inited: bool,
        exited: bool,
    }

    impl App for &mut Counter {
        fn init(&mut self) {
            self.inited = true;
        }

        fn update(&mut self, screen: &mut [bool]) -> Result<bool> {
            screen[self.cycle] = true;
            self.cycle += 1;
            Ok(self.cycle % 2 == 0)
        }

        fn should_beep(&self) -> bool {
            self.cycle == 3
        }

        fn should_exit(&self) -> bool {
            self.cycle >= self.stop_at
        }

        fn exit(&mut self) {
            self.exited = true;
        }

        fn width(&self) -> u32 {
            4
        }

        fn height(&self) -> u32 {
            2
        }

        fn title(&self) -> String {
            "counter".to_string()
        }
    }

    fn info(max_cycles: Option<u64>) -> TermInitInfo {
        let info = TermInitInfo::builder()
            .width(4)
            .height(2)
            .title("test".to_string())
            .cycle_hz(0)
            .clear_between_frames(false);
        match max_cycles {
            Some(max) => info.max_cycles(max).build(),
            None => info.build(),
        }
    }

    #[test]
    fn renders_rows() {
        let screen = [true, false, false, true, false, true, true, false];
        assert_eq!(render_frame(&screen, 4), "X  X\n XX \n");
    }

    #[test]
    fn drives_until_the_app_exits() {
        let mut app = Counter {
            cycle: 0,
            stop_at: 4,
            inited: false,
            exited: false,
        };
        let mut ctx = TermContext::new(info(None), Vec::new());
        let stats = ctx.drive(&mut app).unwrap();

        assert_eq!(stats, RunStats { cycles: 4, frames: 2 });
        assert!(app.inited && app.exited);

        let out = String::from_utf8(ctx.into_inner()).unwrap();
        assert_eq!(out, "XX  \n    \n\u{7}XXXX\n    \n");
    }

    #[test]
    fn stops_at_max_cycles() {
        let mut app = Counter {
            cycle: 0,
            stop_at: 8,
            inited: false,
            exited: false,
        };
        let mut ctx = TermContext::new(info(Some(3)), Vec::new());
        let stats = ctx.drive(&mut app).unwrap();
        assert_eq!(stats.cycles, 3);
        assert!(app.exited);
    }
}
