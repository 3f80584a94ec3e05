use std::process::ExitCode;

use anyhow::Context;
use log::{LevelFilter, debug, error, info};
use minipm::{EventLoop, Loginctl, launcher, surface::X11Surface};
use simple_logger::SimpleLogger;

const NAME: &str = "minipm";
const WIDTH: u16 = 300;
const HEIGHT: u16 = 80;

fn run() -> anyhow::Result<()> {
    let surface = X11Surface::create(NAME, WIDTH, HEIGHT).context("Cannot open the window")?;
    launcher::ignore_children().context("Cannot ignore SIGCHLD")?;

    let mut event_loop = EventLoop::new(surface, Loginctl);
    let state = event_loop.run()?;
    debug!("Exiting in state {state:?}");

    Ok(())
}

fn main() -> ExitCode {
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Info).init() {
        eprintln!("Cannot initialize logger: {e}");
    }
    info!("Starting {NAME}");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
