//! Loopback check for a serial line.
//!
//! Writes a probe string and reads it back. Wire TX to RX on the adapter
//! (or pass `--mock` to run against the in-memory line).
//!
//! ```text
//! cargo run --example loopback -- --port /dev/ttyUSB0 --baud 115200
//! cargo run --example loopback -- --mock
//! ```

use clap::Parser;
use serial_line::config::ConfigLoader;
use serial_line::port::Backend;
use serial_line::{logging, BaudRate, MockLine, SerialPort};

#[derive(Parser, Debug)]
#[command(about = "Write a probe over a serial line and read it back")]
struct Args {
    /// Device path; overrides `[port] name` from the configuration
    #[arg(short, long)]
    port: Option<String>,

    /// Line speed in bits per second; overrides `[line] baud_rate`
    #[arg(short, long)]
    baud: Option<u32>,

    /// Bytes to send; the echo is read back as one line, so end it with
    /// the configured `[io] line_terminator`
    #[arg(long, default_value = "serial-line loopback\n")]
    probe: String,

    /// Use the in-memory mock line instead of a device
    #[arg(long)]
    mock: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = ConfigLoader::load()?.into_config();
    logging::init(&config.logging)?;

    if let Some(port) = args.port {
        config.port.name = Some(port);
    }
    if let Some(baud) = args.baud {
        config.line.baud_rate = BaudRate::try_from(baud)?;
    }

    if args.mock {
        let line = MockLine::new();
        line.enqueue_read(args.probe.as_bytes());
        let port = SerialPort::with_backend("MOCK0", line);
        run(port, &config, &args.probe)
    } else {
        let name = config.port_name()?.to_string();
        run(SerialPort::new(name), &config, &args.probe)
    }
}

fn run<B: Backend>(
    mut port: SerialPort<B>,
    config: &serial_line::Config,
    probe: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    port.open(&config.line)?;
    println!("Opened {} at {}", port.name(), port.line_settings()?);

    port.write_str(probe)?;
    let echo = port.read_configured_line(&config.io)?;

    if echo == probe.as_bytes() {
        println!("Loopback OK ({} bytes)", echo.len());
    } else {
        println!(
            "Loopback MISMATCH: sent {:?}, got {:?}",
            probe,
            String::from_utf8_lossy(&echo)
        );
    }

    port.close()?;
    Ok(())
}
