use collisim::{LogCanvas, SimConfig, Simulation};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

/// `collisim [config.json]`
fn run() -> collisim::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading configuration from {path}");
            SimConfig::from_path(path)?
        }
        None => SimConfig::default(),
    };
    if config.time_limit.is_none() {
        log::warn!("no time_limit configured; the run only ends when the process is killed");
    }

    let mut sim = Simulation::new(&config)?;
    let mut canvas = LogCanvas::new().with_pacing(config.pace_ms > 0);
    let summary = sim.simulate(&mut canvas)?;
    log::info!("{} frames presented", canvas.frames());
    log::debug!("{summary:?}");
    Ok(())
}
