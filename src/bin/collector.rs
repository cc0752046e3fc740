//! IMU Record Collector
//!
//! Monitors the serial link and stores every decodable record in an HDF5 file.
//!
//! Usage:
//!   collector --port /dev/ttyUSB0 --output imu.h5 --duration 60

use clap::Parser;
use imu_serial_stream::{
    Hdf5Writer, ImuSample, MonitorOptions, MonitorSession, SerialConfig, SerialLink, SessionEvent,
    StreamError, TimeKeeper, TimestampedSample,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const BATCH_SIZE: usize = 100;
const FLUSH_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "collector")]
#[command(about = "Collect IMU JSON records to an HDF5 file", long_about = None)]
struct Args {
    /// Serial device path
    #[arg(short, long, default_value = imu_serial_stream::transport::DEFAULT_PORT)]
    port: String,

    /// Baud rate
    #[arg(short, long, default_value_t = imu_serial_stream::transport::DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Output HDF5 file path
    #[arg(short, long, default_value = "imu_data.h5")]
    output: PathBuf,

    /// Duration in seconds (optional, runs until Ctrl+C if omitted)
    #[arg(short, long)]
    duration: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("IMU Record Collector");
    println!("====================");
    println!("Port: {} at {} baud", args.port, args.baud);
    println!("Output file: {}", args.output.display());
    if let Some(duration) = args.duration {
        println!("Duration: {} seconds", duration);
    } else {
        println!("Duration: continuous (Ctrl+C to stop)");
    }
    println!();

    let config = SerialConfig {
        path: args.port.clone(),
        baud_rate: args.baud,
        ..Default::default()
    };
    let mut link = SerialLink::open(&config)?;
    // Drop whatever queued up before we started; the first line is usually partial
    link.clear_input()?;

    let mut writer = Hdf5Writer::create(&args.output, &args.port, args.baud)?;
    println!("HDF5 file created!\n");

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\nReceived Ctrl+C, stopping collection...");
        r.store(false, Ordering::SeqCst);
    })?;

    let start = Instant::now();
    let end_time = args.duration.map(|d| start + Duration::from_secs(d));
    let timer = TimeKeeper::new();
    let mut session = MonitorSession::new(MonitorOptions { echo_first: 0 }, start);
    let mut batch: Vec<TimestampedSample> = Vec::with_capacity(BATCH_SIZE);
    let mut last_flush = Instant::now();
    let mut undecodable = 0u64;
    let mut write_error: Option<StreamError> = None;

    let result = session.run(&mut link, &running, end_time, |event| match event {
        SessionEvent::Packet { record, .. } => {
            if write_error.is_some() {
                return;
            }
            match ImuSample::from_json(record.as_bytes()) {
                Ok(sample) => batch.push(TimestampedSample {
                    timestamp: timer.elapsed_secs(),
                    sample,
                }),
                Err(e) => {
                    undecodable += 1;
                    log::debug!("Skipping undecodable record: {}", e);
                }
            }

            if batch.len() >= BATCH_SIZE {
                if let Err(e) = writer.append_batch(&batch) {
                    eprintln!("Write error: {}", e);
                    write_error = Some(e);
                    running.store(false, Ordering::SeqCst);
                    return;
                }
                batch.clear();

                if last_flush.elapsed() >= FLUSH_INTERVAL {
                    if let Err(e) = writer.flush() {
                        eprintln!("Flush error: {}", e);
                    }
                    last_flush = Instant::now();
                }
            }
        }
        SessionEvent::Report(report) => println!("{}", report),
    });

    // Write remaining samples
    if write_error.is_none() && !batch.is_empty() {
        writer.append_batch(&batch)?;
    }
    writer.flush()?;

    if let Some(e) = write_error {
        return Err(Box::new(e));
    }

    match result {
        Ok(summary) => {
            println!("\nCollection complete!");
            println!("Total packets: {}", summary.total_packets);
            println!("Stored samples: {}", writer.sample_count());
            println!("Undecodable packets: {}", undecodable);
            println!("Malformed lines: {}", summary.malformed_lines);
            println!("Elapsed time: {:.2} seconds", summary.elapsed_secs);
            println!("Average rate: {:.1} Hz", summary.average_hz);
            println!("File: {}", args.output.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("\nError during collection: {}", e);
            Err(Box::new(e))
        }
    }
}
