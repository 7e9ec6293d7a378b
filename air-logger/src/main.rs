use air_logger::{Config, Station};
use log::{error, info, warn};
use std::{
    process::ExitCode,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use uploader::{HttpTransport, Uploader};

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Air Quality Logger");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.upload.api_key.is_empty() {
        warn!("No API key configured, uploads will be rejected (set KUUKI_UPLOAD__API_KEY)");
    }

    let running = match install_interrupt_handler() {
        Ok(running) => running,
        Err(e) => {
            error!("Failed to install interrupt handler: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let transport = match HttpTransport::new() {
        Ok(transport) => transport,
        Err(e) => {
            error!("Failed to set up HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let port = config.serial.resolve_port();
    let source = match serial_source::open_serial(
        &port,
        config.serial.baud_rate,
        config.serial.read_timeout(),
    ) {
        Ok(source) => source,
        Err(e) => {
            error!("Cannot open port: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Connected to {}", port);

    let mut station = Station::new(source, Uploader::new(transport, config.upload.target()));
    info!("Uploading to {}", station.uploader().target().url);

    let result = station.run(&running);
    drop(station);

    match result {
        Ok(()) => {
            info!("Stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn install_interrupt_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let running = Arc::new(AtomicBool::new(true));
    let running_for_signal = Arc::clone(&running);

    ctrlc::set_handler(move || {
        running_for_signal.store(false, Ordering::SeqCst);
    })?;

    Ok(running)
}
