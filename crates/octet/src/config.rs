use clap::{Parser, ValueEnum};
use octet_chip8::{Quirks, UnimplementedPolicy};
use std::path::PathBuf;
use typed_builder::TypedBuilder;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "octet", version, about = "A CHIP-8 interpreter for the terminal")]
pub struct Args {
    /// ROM to run. Plays a built-in demo when omitted.
    pub rom: Option<PathBuf>,

    /// Cycles per second, 0 for unpaced.
    #[arg(long, default_value_t = 500)]
    pub hz: u32,

    /// Stop after this many cycles.
    #[arg(long)]
    pub cycles: Option<u64>,

    /// Seed for the random number generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print memory after loading the ROM.
    #[arg(long)]
    pub dump: bool,

    /// FX15 loads the delay timer with X instead of VX.
    #[arg(long)]
    pub fx15_index: bool,

    /// What to do on an opcode that decodes but has no semantics.
    #[arg(long, value_enum, default_value_t = PolicyArg::Stall)]
    pub unimplemented: PolicyArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Stall,
    Skip,
    Halt,
}

impl From<PolicyArg> for UnimplementedPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Stall => UnimplementedPolicy::Stall,
            PolicyArg::Skip => UnimplementedPolicy::Skip,
            PolicyArg::Halt => UnimplementedPolicy::Halt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct RunConfig {
    /// ROM to run. `None` plays the built-in demo.
    #[builder(default, setter(strip_option))]
    pub rom_path: Option<PathBuf>,
    #[builder(default = 500)]
    pub cycle_hz: u32,
    #[builder(default, setter(strip_option))]
    pub max_cycles: Option<u64>,
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
    #[builder(default)]
    pub dump_memory: bool,
    #[builder(default)]
    pub quirks: Quirks,
}

impl From<Args> for RunConfig {
    fn from(args: Args) -> Self {
        RunConfig {
            rom_path: args.rom,
            cycle_hz: args.hz,
            max_cycles: args.cycles,
            seed: args.seed,
            dump_memory: args.dump,
            quirks: Quirks::builder()
                .delay_from_register_index(args.fx15_index)
                .unimplemented(args.unimplemented.into())
                .build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<RunConfig, clap::Error> {
        let argv = std::iter::once("octet").chain(args.iter().copied());
        Args::try_parse_from(argv).map(RunConfig::from)
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, RunConfig::builder().build());
        assert_eq!(config.cycle_hz, 500);
        assert_eq!(config.rom_path, None);
        assert_eq!(config.quirks, Quirks::default());
    }

    #[test]
    fn all_options() {
        let config = parse(&[
            "--hz",
            "0",
            "games/pong.ch8",
            "--cycles",
            "1000",
            "--seed",
            "42",
            "--dump",
            "--fx15-index",
            "--unimplemented",
            "skip",
        ])
        .unwrap();

        let expected = RunConfig::builder()
            .rom_path(PathBuf::from("games/pong.ch8"))
            .cycle_hz(0)
            .max_cycles(1000)
            .seed(42)
            .dump_memory(true)
            .quirks(
                Quirks::builder()
                    .delay_from_register_index(true)
                    .unimplemented(UnimplementedPolicy::Skip)
                    .build(),
            )
            .build();
        assert_eq!(config, expected);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--hz"]).is_err());
        assert!(parse(&["--hz", "fast"]).is_err());
        assert!(parse(&["--unimplemented", "explode"]).is_err());
        assert!(parse(&["--turbo"]).is_err());
        assert!(parse(&["a.ch8", "b.ch8"]).is_err());
    }

    #[test]
    fn help_is_reported_by_the_parser() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert!(err.to_string().contains("--fx15-index"));
    }

    #[test]
    fn args_are_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
