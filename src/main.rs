//! radbench-log command line entry point.
//!
//! ## Subcommands
//!
//! - `radbench-log config show [--json]` - Print the effective configuration
//! - `radbench-log config validate` - Parse the configuration file (exit 0/2)
//! - `radbench-log demo [ITERATIONS]` - Drive a session with a synthetic kernel

use std::process::ExitCode;
use std::time::Duration;

use radbench_log::config::{self as rb_config, ConfigStore, SessionOptions, TelemetrySettings};
use radbench_log::telemetry::{init_logging, init_metrics, LogConfig, LogFormat};
use radbench_log::IterationSession;

const DEFAULT_DEMO_ITERATIONS: usize = 10;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    let log_config = LogConfig {
        format: LogFormat::Pretty,
        level: std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        output_path: None,
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Logging setup failed: {}", e);
    }
    init_metrics();

    match command {
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    let json_output = args.get(3).map(|s| s.as_str()) == Some("--json");
                    run_config_show(json_output)
                }
                "validate" => run_config_validate(),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_usage();
                    ExitCode::FAILURE
                }
            }
        }
        "demo" => {
            let iterations = match args.get(2) {
                None => DEFAULT_DEMO_ITERATIONS,
                Some(raw) => match raw.parse::<usize>() {
                    Ok(n) => n,
                    Err(_) => {
                        eprintln!("Invalid iteration count: {}", raw);
                        return ExitCode::FAILURE;
                    }
                },
            };
            run_demo(iterations)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("radbench-log {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn load_settings() -> Result<(TelemetrySettings, SessionOptions), rb_config::ConfigError> {
    let store = ConfigStore::load(rb_config::config_path())?;
    let options = SessionOptions::default().merged_with(&store)?;
    Ok((TelemetrySettings::from_store(store)?, options))
}

fn run_config_show(json_output: bool) -> ExitCode {
    let (settings, options) = match load_settings() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2u8);
        }
    };
    let effective = settings.effective(&options);
    if json_output {
        match serde_json::to_string_pretty(&effective) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize configuration: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("config file:          {}", rb_config::config_path().display());
        println!("transport:            {}", effective.transport);
        match &effective.endpoint {
            Some(endpoint) => println!("collector:            {}", endpoint),
            None => println!("collector:            (not configured)"),
        }
        println!("log dir:              {}", effective.log_dir.display());
        println!("ecc:                  {}", effective.ecc);
        println!("max errors per iter:  {}", options.max_errors_per_iter);
        println!("max infos per iter:   {}", options.max_infos_per_iter);
        println!("print interval:       {}", options.iter_interval_print);
        println!("double error kill:    {}", options.double_error_kill);
        println!("info overflow fatal:  {}", options.info_overflow_fatal);
    }
    ExitCode::SUCCESS
}

fn run_config_validate() -> ExitCode {
    match load_settings() {
        Ok((settings, _)) => {
            if let Err(e) = settings.endpoint() {
                eprintln!("Configuration incomplete: {}", e);
                return ExitCode::from(2u8);
            }
            println!("Configuration OK");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(2u8)
        }
    }
}

/// Run a fake kernel under a real session using the machine configuration.
fn run_demo(iterations: usize) -> ExitCode {
    let test_info = format!("demo iterations:{}", iterations);
    let mut session = match IterationSession::start("radbench_demo", test_info) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Could not start session: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("logging to {}", session.log_file_name());

    for i in 0..iterations {
        let result = session
            .begin_iteration()
            .and_then(|_| {
                std::thread::sleep(Duration::from_millis(5));
                session.end_iteration()
            })
            .and_then(|_| session.report_error_count(0))
            .and_then(|_| session.report_info_detail(&format!("demo step {}", i)));
        if let Err(e) = result {
            eprintln!("Session error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match session.end() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Session error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "radbench-log - iteration telemetry for benchmark kernels v{}

USAGE:
    radbench-log [COMMAND] [OPTIONS]

COMMANDS:
    config show [--json]   Print the effective configuration
    config validate        Check the configuration file (exit 2 if invalid)
    demo [ITERATIONS]      Run a synthetic kernel under a telemetry session
    version                Show version information
    help                   Show this help message

ENVIRONMENT:
    RADBENCH_LOG_CONFIG  Configuration file (default: /etc/radiation-benchmarks.conf)
    RUST_LOG             Log level (debug, info, warn, error)
",
        version
    );
}
