use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use druid::{commands, AppLauncher, LocalizedString, Target, WindowDesc};
use tracing::{info, warn};

use mpu6050_viz::session::Session;
use mpu6050_viz::state::AppState;
use mpu6050_viz::transport::{self, SerialTransport};
use mpu6050_viz::widget::VisualizerWidget;
use mpu6050_viz::window;

#[derive(Parser, Debug)]
#[command(version, about = "Live 3D motion visualizer for MPU-6050 serial telemetry")]
struct Args {
    /// Serial port to read from (auto-detected when omitted)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate of the serial link
    #[arg(short, long, default_value_t = 115_200)]
    baud: u32,

    /// Number of samples kept per channel
    #[arg(long, default_value_t = window::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Render tick interval in milliseconds
    #[arg(long, default_value_t = 50)]
    interval_ms: u64,

    /// Edge length of the pose cuboid, in position units
    #[arg(long, default_value_t = 0.4)]
    cube_size: f64,

    /// List detected serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mpu6050_viz=info".into()),
        )
        .init();

    let args = Args::parse();

    if args.list_ports {
        transport::print_available_ports();
        return Ok(());
    }

    let port_name = match args.port.clone().or_else(transport::find_sensor_port) {
        Some(port) => port,
        None => {
            transport::print_available_ports();
            return Err(anyhow!(
                "no serial port given and none could be auto-detected; pass one with --port"
            ));
        }
    };

    println!(
        "{} v{} reading from {} at {} baud",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        port_name,
        args.baud
    );
    println!("Keys: q quit, p pause, d debug overlay");

    // A failed connection is fatal at startup; show the operator the
    // alternatives instead of retrying.
    let serial = match SerialTransport::open(&port_name, args.baud) {
        Ok(serial) => serial,
        Err(err) => {
            eprintln!("Could not open {}: {}", port_name, err);
            eprintln!("Possible fixes:");
            eprintln!("  1. Close any other program holding the port (serial monitor, etc.)");
            eprintln!("  2. Unplug and reconnect the board");
            eprintln!("  3. Pass a different port with --port");
            transport::print_available_ports();
            return Err(err.into());
        }
    };

    let session = Session::new(Box::new(serial), args.capacity);

    let main_window = WindowDesc::new(VisualizerWidget::new(
        session,
        args.cube_size,
        Duration::from_millis(args.interval_ms),
    ))
    .title(LocalizedString::new("MPU-6050 Motion Visualizer"))
    .window_size((960.0, 480.0));

    let initial_state = AppState {
        port: port_name,
        debug: false,
        paused: false,
    };

    let launcher = AppLauncher::with_window(main_window);

    // Route Ctrl+C through the normal quit path so the window closes and
    // the serial transport is flushed and dropped.
    let interrupt_handle = launcher.get_external_handle();
    if let Err(err) = ctrlc::set_handler(move || {
        let _ = interrupt_handle.submit_command(commands::QUIT_APP, (), Target::Global);
    }) {
        warn!(%err, "could not install interrupt handler");
    }

    launcher
        .launch(initial_state)
        .map_err(|err| anyhow!("failed to launch UI: {err}"))?;

    info!("visualizer stopped");
    Ok(())
}
