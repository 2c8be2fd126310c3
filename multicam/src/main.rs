use multicam::config::ConfigOrigin;
use multicam::imaging::{read_image, white_balance};
use multicam::{CameraManager, CaptureResponse, MulticamConfig, MuxTarget};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::Duration;

const USAGE: &str = "Usage: multicam [--config PATH] <command>

Commands:
  status              Print manager state
  capture             Capture all cameras into a grid composite
  select <N|all>      Pin one slot or four-in-one mode
  cycle <SECONDS>     Cycle through functional slots for SECONDS
  preview <COUNT> <DIR>
                      Write COUNT preview frames to DIR
  wb-gains <IMAGE>    Grey-world colour gains of a reference image";

/// How long exit waits for queued log records to reach the file
const LOG_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

enum Command {
    Status,
    Capture,
    Select(MuxTarget),
    Cycle(Duration),
    Preview { count: usize, dir: PathBuf },
    WbGains(PathBuf),
}

struct Args {
    config_path: Option<PathBuf>,
    command: Command,
}

fn main() {
    let args = match parse_args(std::env::args().skip(1).collect()) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}\n\n{}", msg, USAGE);
            process::exit(2);
        }
    };

    // Calibration only reads a file; it must not grab the camera.
    if let Command::WbGains(path) = &args.command {
        process::exit(run_wb_gains(path));
    }

    let config = load_config(args.config_path.as_deref());
    let logger = initialize_logger(&config);

    let manager = match CameraManager::initialize(config, logger.clone()) {
        Ok(manager) => manager,
        Err(e) => {
            logger.error(&format!("Camera manager failed to start: {}", e));
            print_json(&json!({ "success": false, "error": e.to_string() }));
            exit_after_flush(&logger, 1);
        }
    };

    let code = run_command(&manager, args.command);

    if let Err(e) = manager.cleanup() {
        logger.error(&format!("Cleanup failed: {}", e));
    }
    drop(manager);
    exit_after_flush(&logger, code);
}

/// Exits once the log writer has caught up
fn exit_after_flush(logger: &logging::Logger, code: i32) -> ! {
    if !logger.flush(LOG_FLUSH_TIMEOUT) {
        eprintln!("Log writer did not finish; the log file may be incomplete");
    }
    process::exit(code)
}

fn parse_args(raw: Vec<String>) -> Result<Args, String> {
    let mut config_path = None;
    let mut rest = Vec::new();
    let mut iter = raw.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter.next().ok_or("--config needs a path")?;
            config_path = Some(PathBuf::from(path));
        } else {
            rest.push(arg);
        }
    }

    let command = match rest.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["status"] => Command::Status,
        ["capture"] => Command::Capture,
        ["select", target] => {
            Command::Select(target.parse().map_err(|e| format!("{}", e))?)
        }
        ["cycle", seconds] => {
            let seconds: f64 = seconds
                .parse()
                .map_err(|_| format!("'{}' is not a number of seconds", seconds))?;
            if !(seconds.is_finite() && seconds > 0.0) {
                return Err("cycle duration must be positive".to_string());
            }
            let duration = Duration::try_from_secs_f64(seconds)
                .map_err(|_| format!("cycle duration of {} seconds is too long", seconds))?;
            Command::Cycle(duration)
        }
        ["preview", count, dir] => Command::Preview {
            count: count
                .parse()
                .map_err(|_| format!("'{}' is not a frame count", count))?,
            dir: PathBuf::from(dir),
        },
        ["wb-gains", image] => Command::WbGains(PathBuf::from(image)),
        [] => return Err("Missing command".to_string()),
        other => return Err(format!("Unknown command: {}", other.join(" "))),
    };

    Ok(Args {
        config_path,
        command,
    })
}

/// Loads configuration or falls back to defaults
fn load_config(path: Option<&Path>) -> MulticamConfig {
    match MulticamConfig::load(path) {
        Ok((config, origin)) => {
            if origin != ConfigOrigin::Defaults {
                println!("Configuration loaded from: {}", origin);
            }
            config
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            eprintln!("Using default configuration");
            MulticamConfig::default()
        }
    }
}

/// Initializes the root logger from configuration
fn initialize_logger(config: &MulticamConfig) -> logging::Logger {
    match config.logging.open_logger() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to create logger: {}", e);
            eprintln!("Cannot continue without logging system.");
            process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn failure(e: impl std::fmt::Display) -> i32 {
    print_json(&json!({ "success": false, "error": e.to_string() }));
    1
}

fn run_command(manager: &CameraManager, command: Command) -> i32 {
    match command {
        Command::Status => {
            print_json(&manager.get_status());
            0
        }
        Command::Capture => {
            let result = manager.capture_all_cameras();
            let response = CaptureResponse::from_result(&result);
            print_json(&response);
            if response.success { 0 } else { 1 }
        }
        Command::Select(target) => match manager.select(target) {
            Ok(()) => {
                print_json(&manager.get_status());
                0
            }
            Err(e) => failure(e),
        },
        Command::Cycle(duration) => {
            if let Err(e) = manager.start_camera_cycle(None) {
                return failure(e);
            }
            thread::sleep(duration);
            manager.stop_camera_cycle();
            print_json(&manager.get_status());
            0
        }
        Command::Preview { count, dir } => run_preview(manager, count, &dir),
        Command::WbGains(path) => run_wb_gains(&path),
    }
}

fn run_preview(manager: &CameraManager, count: usize, dir: &Path) -> i32 {
    if let Err(e) = fs::create_dir_all(dir) {
        return failure(e);
    }

    let mut written = Vec::with_capacity(count);
    for (index, frame) in manager.preview_frames().take(count).enumerate() {
        let path = dir.join(format!("frame_{:04}.jpg", index));
        if let Err(e) = fs::write(&path, &frame) {
            return failure(e);
        }
        written.push(path.display().to_string());
    }

    print_json(&json!({ "success": true, "frames": written }));
    0
}

fn run_wb_gains(path: &Path) -> i32 {
    let gains = read_image(path).and_then(|image| white_balance::grey_world_gains(&image));
    match gains {
        Ok(gains) => {
            print_json(&json!({ "success": true, "colour_gains": gains }));
            0
        }
        Err(e) => failure(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, String> {
        parse_args(args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_parse_select() {
        let args = parse(&["select", "all"]).unwrap();
        assert!(matches!(args.command, Command::Select(MuxTarget::All)));
        assert!(args.config_path.is_none());
    }

    #[test]
    fn test_parse_config_anywhere() {
        let args = parse(&["capture", "--config", "/tmp/c.json"]).unwrap();
        assert!(matches!(args.command, Command::Capture));
        assert_eq!(args.config_path, Some(PathBuf::from("/tmp/c.json")));
    }

    #[test]
    fn test_parse_preview() {
        let args = parse(&["preview", "5", "out"]).unwrap();
        match args.command {
            Command::Preview { count, dir } => {
                assert_eq!(count, 5);
                assert_eq!(dir, PathBuf::from("out"));
            }
            _ => panic!("expected preview"),
        }
    }

    #[test]
    fn test_parse_cycle() {
        let args = parse(&["cycle", "2.5"]).unwrap();
        assert!(matches!(args.command, Command::Cycle(d) if d == Duration::from_millis(2500)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["cycle", "-1"]).is_err());
        assert!(parse(&["cycle", "1e300"]).is_err());
        assert!(parse(&["select", "x"]).is_err());
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["dance"]).is_err());
    }
}
