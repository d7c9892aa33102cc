/**
 * Slot Relay Binary
 *
 * Runs the detection-to-code relay:
 * 1. Invokes the external detector once per tick
 * 2. Folds detections into a canonical six-symbol code
 * 3. Streams the rolling code window to the downstream controller
 *
 * The detector command is expected to capture a frame, run inference and
 * write a YOLO-style label file; this binary only consumes that file.
 */

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::info;

use slotlink::detector::{ClassVocabulary, ProcessDetector};
use slotlink::relay::{RelayConfig, SlotRelay};
use slotlink::uart::CodeSender;

#[derive(Parser)]
#[command(name = "slot_relay")]
#[command(about = "Relay six-slot detection codes to the downstream controller")]
#[command(version)]
struct Cli {
    /// Serial port the downstream controller listens on.
    #[arg(long, default_value = "/dev/serial0")]
    port: String,

    /// Serial baud rate.
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Canonicalization policy of this rig.
    #[arg(long, value_enum, default_value_t = PolicyArg::Digits)]
    policy: PolicyArg,

    /// Class vocabulary file, one class name per line.
    #[arg(long)]
    names: PathBuf,

    /// External detector command, invoked once per tick.
    #[arg(long)]
    detector_cmd: PathBuf,

    /// Extra argument passed to the detector command (repeatable).
    #[arg(long = "detector-arg")]
    detector_args: Vec<String>,

    /// Label file the detector writes its output to.
    #[arg(long)]
    label_file: PathBuf,

    /// History persistence file (mixed policy only).
    #[arg(long, default_value = "results.txt")]
    history_file: PathBuf,

    /// Producer loop interval in milliseconds.
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Codes are permutations of the digits 1-6.
    Digits,
    /// Codes hold one letter a-f plus five distinct digits.
    Mixed,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let vocab = ClassVocabulary::load(&cli.names)?;
    info!("loaded {} class names", vocab.len());

    let detector = ProcessDetector::new(
        cli.detector_cmd.clone(),
        cli.detector_args.clone(),
        cli.label_file.clone(),
        vocab,
    );

    let config = match cli.policy {
        PolicyArg::Digits => RelayConfig::digits(),
        PolicyArg::Mixed => RelayConfig::mixed(cli.history_file.clone()),
    }
    .with_interval(Duration::from_millis(cli.interval_ms));

    let mut relay = SlotRelay::new(config, detector)?;
    let sender = CodeSender::new(&cli.port).with_baud(cli.baud);
    let sender_handle = relay.start_sender(sender)?;

    // Runs until the process is stopped.
    relay.run();

    relay.shutdown();
    let _ = sender_handle.join();
    Ok(())
}
