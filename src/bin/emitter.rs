//! Synthetic IMU emitter
//!
//! Plays the producer side of the link: serializes synthetic samples into a
//! fixed buffer and writes them as JSON lines to a serial port or stdout.
//! Pair it with `imu-monitor` over a loopback cable or a pty pair.
//!
//! Usage:
//!   imu-emitter --port /dev/ttyUSB1 --rate 200
//!   imu-emitter --rate 50 --count 500 > capture.log

use clap::Parser;
use imu_serial_stream::{serializer, SerialConfig, SerialLink, StreamControl, StreamError, SyntheticImu};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stack buffer for one record; larger records fall back to the heap
const RECORD_BUFFER_SIZE: usize = 192;

#[derive(Parser, Debug)]
#[command(name = "imu-emitter")]
#[command(about = "Emit synthetic IMU JSON records", long_about = None)]
struct Args {
    /// Serial device path (stdout if omitted)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long, default_value_t = imu_serial_stream::transport::DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Sample rate in Hz (1-1000)
    #[arg(short, long, default_value = "100")]
    rate: u32,

    /// Stop after this many records
    #[arg(short, long)]
    count: Option<u64>,

    /// Duration in seconds (optional, runs until Ctrl+C if omitted)
    #[arg(short, long)]
    duration: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.rate == 0 || args.rate > 1000 {
        eprintln!("Error: rate must be 1-1000 Hz");
        std::process::exit(1);
    }

    let mut sink: Box<dyn Write> = match &args.port {
        Some(path) => {
            let config = SerialConfig {
                path: path.clone(),
                baud_rate: args.baud,
                ..Default::default()
            };
            Box::new(SerialLink::open(&config)?)
        }
        None => Box::new(io::stdout().lock()),
    };

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let start = Instant::now();
    let end_time = args.duration.map(|d| start + Duration::from_secs(d));
    let mut buffer = [0u8; RECORD_BUFFER_SIZE];
    let mut sent = 0u64;
    let mut write_error: Option<StreamError> = None;

    log::info!("Emitting synthetic records at {} Hz", args.rate);

    SyntheticImu::new().stream(args.rate, |sample| {
        if !running.load(Ordering::SeqCst) {
            return StreamControl::Break;
        }
        if let Some(end) = end_time {
            if Instant::now() >= end {
                return StreamControl::Break;
            }
        }

        let result = match serializer::write_into(&sample, &mut buffer) {
            Ok(len) => sink.write_all(&buffer[..=len]),
            Err(StreamError::BufferTooSmall { required, .. }) => {
                let mut spill = vec![0u8; required];
                match serializer::write_into(&sample, &mut spill) {
                    Ok(len) => sink.write_all(&spill[..=len]),
                    Err(e) => {
                        write_error = Some(e);
                        return StreamControl::Break;
                    }
                }
            }
            Err(e) => {
                write_error = Some(e);
                return StreamControl::Break;
            }
        };

        if let Err(e) = result.and_then(|_| sink.flush()) {
            write_error = Some(e.into());
            return StreamControl::Break;
        }

        sent += 1;
        match args.count {
            Some(limit) if sent >= limit => StreamControl::Break,
            _ => StreamControl::Continue,
        }
    })?;

    if let Some(e) = write_error {
        eprintln!("Write error: {}", e);
        return Err(Box::new(e));
    }

    log::info!(
        "Sent {} records in {:.2} s",
        sent,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
