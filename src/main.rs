//! IMU packet monitor - frames the JSON stream and reports arrival rates
//!
//! Reads newline-delimited JSON records from a serial port (or a captured
//! file), drops lines that are not bracket-shaped, and prints the current and
//! average packet rate once per second.
//!
//! Usage:
//!   imu-monitor --port /dev/ttyUSB0 --baud 230400
//!   imu-monitor --replay capture.log --decode

use clap::Parser;
use imu_serial_stream::{
    agmt_line, ByteSource, ImuSample, MonitorOptions, MonitorSession, ReaderSource, SerialConfig,
    SerialLink, SessionEvent, StreamError,
};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "imu-monitor")]
#[command(about = "Monitor IMU JSON packets on a serial link", long_about = None)]
struct Args {
    /// Serial device path
    #[arg(short, long, default_value = imu_serial_stream::transport::DEFAULT_PORT)]
    port: String,

    /// Baud rate
    #[arg(short, long, default_value_t = imu_serial_stream::transport::DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Replay a captured byte stream instead of opening the port
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Print the first N packets verbatim
    #[arg(short, long, default_value = "3")]
    echo: u64,

    /// Decode every packet and print it as a scaled reading
    #[arg(long)]
    decode: bool,

    /// Duration in seconds (optional, runs until Ctrl+C if omitted)
    #[arg(short, long)]
    duration: Option<u64>,
}

fn open_source(args: &Args) -> Result<Box<dyn ByteSource>, Box<dyn std::error::Error>> {
    if let Some(path) = &args.replay {
        let file = File::open(path)?;
        println!("Replaying IMU data packets from {}...", path.display());
        return Ok(Box::new(ReaderSource::new(BufReader::new(file))));
    }

    let config = SerialConfig {
        path: args.port.clone(),
        baud_rate: args.baud,
        ..Default::default()
    };

    match SerialLink::open(&config) {
        Ok(link) => {
            println!(
                "Monitoring IMU data packets on {} at {} baud...",
                config.path, config.baud_rate
            );
            Ok(Box::new(link))
        }
        Err(e @ StreamError::TransportUnavailable { .. }) => {
            eprintln!("Error: {}", e);
            eprintln!("Please check:");
            eprintln!("  1. The IMU board is connected via USB");
            eprintln!("  2. The device path is correct (--port)");
            eprintln!("  3. Your user can access the port (e.g. 'dialout' group)");
            eprintln!("  4. No other application is using the port");
            Err(Box::new(e))
        }
        Err(e) => Err(Box::new(e)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("IMU Packet Monitor");
    println!("==================");

    let mut source = open_source(&args)?;

    println!("Started: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Expected JSON format: {{\"accX\":...}}");
    println!("Press Ctrl+C to exit\n");

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\nReceived Ctrl+C, stopping monitor...");
        r.store(false, Ordering::SeqCst);
    })?;

    let start = Instant::now();
    let end_time = args.duration.map(|d| start + Duration::from_secs(d));
    let mut session = MonitorSession::new(MonitorOptions { echo_first: args.echo }, start);
    let mut decode_failures = 0u64;

    let summary = session.run(source.as_mut(), &running, end_time, |event| match event {
        SessionEvent::Packet { index, record, echo } => {
            if echo {
                println!("Packet {}: {}", index, record.text());
            }
            if args.decode {
                match ImuSample::from_json(record.as_bytes()) {
                    Ok(sample) => println!("{}", agmt_line(&sample)),
                    Err(e) => {
                        decode_failures += 1;
                        log::warn!("Packet {} did not decode: {}", index, e);
                    }
                }
            }
        }
        SessionEvent::Report(report) => println!("{}", report),
    })?;

    println!("\nMonitoring complete!");
    println!("Total packets: {}", summary.total_packets);
    println!("Malformed lines: {}", summary.malformed_lines);
    if args.decode {
        println!("Undecodable packets: {}", decode_failures);
    }
    println!("Elapsed time: {:.2} seconds", summary.elapsed_secs);
    println!("Average rate: {:.1} Hz", summary.average_hz);

    Ok(())
}
