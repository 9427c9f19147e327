use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::{debug, error, info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering}
};
use std::thread;
use std::time::Duration;

use gyro_spectrograph::make_waves::GyroSimulator;
use gyro_spectrograph::presets::{AnalyzerConfig, ConfigFile, DEFAULT_CONFIG_PATH};
use gyro_spectrograph::text_canvas::TextCanvas;
use gyro_spectrograph::utils::SAMPLE_RATE_HZ;
use gyro_spectrograph::{
    spectrograph, Axis, FftLength, GraphicsArea, SpecCommand, SupportedLength, ViewController,
};

// PAL OSD resolution, drawn at four pixels per column and eight per row
const SCREEN_WIDTH: i32 = 360;
const SCREEN_HEIGHT: i32 = 288;
const CELL_WIDTH: i32 = 4;
const CELL_HEIGHT: i32 = 8;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FftLengthArg {
    #[value(name = "512")]
    N512,
    #[value(name = "1024")]
    N1024,
}

#[derive(Parser, Debug)]
#[command(name = "gyro-spectrograph")]
#[command(version)]
#[command(about = "Gyro vibration spectrograph driven by a simulated gyro", long_about = None)]
struct Cli {
    /// YAML configuration file, created with defaults if missing
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Transform length per processing cycle
    #[arg(long, value_enum, default_value = "1024")]
    fft_length: FftLengthArg,

    /// Stop after rendering this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Enable logging (RUST_LOG is respected when set)
    #[arg(long)]
    enable_logs: bool,
}

fn main() {
    let cli = Cli::parse();

    // Set up proper logging filters
    if cli.enable_logs {
        // Don't override RUST_LOG if it's already set
        if std::env::var("RUST_LOG").is_err() {
            std::env::set_var("RUST_LOG", "gyro_spectrograph=info,spectrograph=debug");
        }
        env_logger::init();
    }

    if let Err(e) = run(cli) {
        error!("Application encountered an error: {:?}", e);
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_file = ConfigFile::load_or_create(&cli.config)?;
    let config = config_file.config.clone();
    info!("Using configuration {}", config_file.path().display());

    let shutdown_flag = Arc::new(AtomicBool::new(false));
    {
        let shutdown_flag = Arc::clone(&shutdown_flag);
        ctrlc::set_handler(move || {
            info!("Received Ctrl+C");
            shutdown_flag.store(true, Ordering::SeqCst);
        })
        .map_err(|e| anyhow!("Error setting Ctrl+C handler: {}", e))?;
    }

    match cli.fft_length {
        FftLengthArg::N512 => run_analyzer::<512>(&config, cli.frames, shutdown_flag),
        FftLengthArg::N1024 => run_analyzer::<1024>(&config, cli.frames, shutdown_flag),
    }
}

fn run_analyzer<const N: usize>(
    config: &AnalyzerConfig,
    frames: Option<u64>,
    shutdown_flag: Arc<AtomicBool>,
) -> Result<()>
where
    FftLength<N>: SupportedLength,
{
    info!("Starting spectrograph with {}-point transform", N);
    let (producer, mut processor, reader) = spectrograph::<N>();
    let reset_requested = Arc::new(AtomicBool::new(false));

    // Gyro thread: one capture per axis every N samples of signal time
    info!("Starting gyro simulation thread...");
    let gyro_thread = thread::spawn({
        let shutdown_flag = Arc::clone(&shutdown_flag);
        let mut simulator = GyroSimulator::new(config.simulation.clone());
        let capture_time = Duration::from_secs_f32(N as f32 / SAMPLE_RATE_HZ as f32);
        move || {
            while !shutdown_flag.load(Ordering::SeqCst) {
                for axis in Axis::ALL {
                    producer.fill_with(axis, |buf| simulator.fill(axis, &mut buf[..]));
                }
                simulator.advance(N);
                debug!("Gyro captures filled, motor at {:.1} Hz", simulator.motor_hz());
                thread::sleep(capture_time);
            }
        }
    });

    info!("Starting processing thread...");
    let processing_thread = thread::spawn({
        let shutdown_flag = Arc::clone(&shutdown_flag);
        let reset_requested = Arc::clone(&reset_requested);
        let interval = Duration::from_millis(config.cycle_interval_ms);
        move || {
            while !shutdown_flag.load(Ordering::SeqCst) {
                if reset_requested.swap(false, Ordering::SeqCst) {
                    processor.reset();
                }
                processor.process_cycle();
                thread::sleep(interval);
            }
            info!("Processing stopped after {} cycles", processor.cycles());
        }
    });

    let (command_tx, command_rx) = unbounded();
    // Blocked in read_line until input or EOF, so it is not joined
    spawn_command_reader(command_tx, Arc::clone(&shutdown_flag), Arc::clone(&reset_requested));

    let area = GraphicsArea::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    let mut canvas = TextCanvas::new(SCREEN_WIDTH, SCREEN_HEIGHT, CELL_WIDTH, CELL_HEIGHT);
    let mut view = ViewController::new();
    let render_interval = Duration::from_millis(config.render_interval_ms);
    let mut rendered = 0u64;

    while !shutdown_flag.load(Ordering::SeqCst) {
        let command = next_command(&command_rx);
        canvas.clear();
        view.osd_frame(command, &reader, &config.notch, &area, &mut canvas);

        let mut stdout = io::stdout().lock();
        write!(stdout, "\x1b[2J\x1b[H{}", canvas)?;
        writeln!(stdout, "view {:?}  cycles {}  [s]witch [r]eset [q]uit", view.state(), reader.generation())?;
        stdout.flush()?;

        rendered += 1;
        if frames.map_or(false, |limit| rendered >= limit) {
            info!("Rendered {} frames, stopping", rendered);
            break;
        }
        thread::sleep(render_interval);
    }

    // Set shutdown flag to stop processing threads
    info!("Setting shutdown flag...");
    shutdown_flag.store(true, Ordering::SeqCst);

    if gyro_thread.join().is_ok() {
        info!("Gyro thread terminated successfully");
    } else {
        warn!("Gyro thread may not have terminated cleanly");
    }

    if processing_thread.join().is_ok() {
        info!("Processing thread terminated successfully");
    } else {
        warn!("Processing thread may not have terminated cleanly");
    }

    Ok(())
}

// One command per frame; a switch waiting in the queue is applied next frame
fn next_command(rx: &Receiver<SpecCommand>) -> SpecCommand {
    match rx.try_recv() {
        Ok(command) => command,
        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => SpecCommand::None,
    }
}

fn spawn_command_reader(tx: Sender<SpecCommand>, shutdown_flag: Arc<AtomicBool>, reset_requested: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read command: {}", e);
                    break;
                }
            };
            match line.trim() {
                "s" => {
                    if tx.send(SpecCommand::SwitchAxis).is_err() {
                        break;
                    }
                }
                "r" => reset_requested.store(true, Ordering::SeqCst),
                "q" => {
                    shutdown_flag.store(true, Ordering::SeqCst);
                    break;
                }
                "" => {}
                other => warn!("Unknown command '{}'", other),
            }
        }
    });
}
