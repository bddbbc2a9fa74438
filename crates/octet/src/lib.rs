mod app;
mod config;
mod rom;

use anyhow::Result;
use octet_term::{App, RunStats, TermContext, TermInitInfo};
use std::io::Write;

pub use app::EmulatorApp;
pub use config::{Args, PolicyArg, RunConfig};
pub use rom::{demo_rom, read_rom};

/// Loads the configured ROM (or the demo) and runs it in the terminal.
pub fn run(config: &RunConfig) -> Result<RunStats> {
    let app = prepare(config)?;
    if config.dump_memory {
        println!("{}", app.machine.dump_memory());
    }
    TermContext::run(init_info(config, &app), app)
}

/// Same as [`run`], writing frames to `out`.
pub fn run_with_writer<W: Write>(config: &RunConfig, out: W) -> Result<(RunStats, W)> {
    let app = prepare(config)?;
    let mut ctx = TermContext::new(init_info(config, &app), out);
    let stats = ctx.drive(app)?;
    Ok((stats, ctx.into_inner()))
}

fn prepare(config: &RunConfig) -> Result<EmulatorApp> {
    let rom = match &config.rom_path {
        Some(path) => read_rom(path)?,
        None => {
            log::info!("No ROM path provided, playing the built-in demo");
            demo_rom()
        }
    };

    let mut app = EmulatorApp::new(config.quirks, config.seed);
    app.machine.reset();
    app.machine.load_program(&rom)?;
    Ok(app)
}

fn init_info(config: &RunConfig, app: &EmulatorApp) -> TermInitInfo {
    let info = TermInitInfo::builder()
        .width(app.width())
        .height(app.height())
        .title(app.title())
        .cycle_hz(config.cycle_hz);
    match config.max_cycles {
        Some(max) => info.max_cycles(max).build(),
        None => info.build(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_to_completion() {
        let config = RunConfig::builder().cycle_hz(0).seed(1).build();
        let (stats, out) = run_with_writer(&config, Vec::new()).unwrap();

        assert_eq!(stats.frames, 16);
        assert!(stats.cycles > 100);
        let out = String::from_utf8(out).unwrap();
        // Row 1 once digits 0-3 are on screen
        assert!(out.contains("XXXX  X XXXXXXXX"));
    }

    #[test]
    fn max_cycles_cuts_the_demo_short() {
        // The second draw is the 11th instruction
        let config = RunConfig::builder().cycle_hz(0).max_cycles(11).build();
        let (stats, _) = run_with_writer(&config, Vec::new()).unwrap();
        assert_eq!(stats.cycles, 11);
        assert_eq!(stats.frames, 2);
    }

    #[test]
    fn missing_rom_fails_before_running() {
        let config = RunConfig::builder()
            .rom_path("no/such/rom.ch8".into())
            .cycle_hz(0)
            .build();
        assert!(run_with_writer(&config, Vec::new()).is_err());
    }
}
