use clap::Parser;
use octet::{Args, RunConfig};

fn main() {
    env_logger::init();

    let config = RunConfig::from(Args::parse());

    match &config.rom_path {
        Some(path) => log::info!("Playing ROM path: '{}'", path.display()),
        None => log::info!("Playing built-in demo"),
    }

    if let Err(err) = octet::run(&config) {
        log::error!("{err:#}");
        eprintln!("octet: {err:#}");
        std::process::exit(1);
    }
}
