// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use anyhow::{Context, Result};
use mpk_driver::config::{validate_config, ConfigEvent, ConfigWatcher, DriverConfig};
use mpk_driver::control::{format_binding, Control, ControlMap};
use mpk_driver::host::{Screen, StandaloneHost};
use mpk_driver::midi::{print_destinations, print_sources, MidiInput, MidirOutput};
use mpk_driver::Driver;
use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn, Level};

/// Longest wait for MIDI before servicing timers and reloads
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn print_usage() {
    println!("MPK Driver - Akai MPK 225 control surface");
    println!();
    println!("Usage: mpk-driver [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --list-sources          List available MIDI sources (inputs)");
    println!("  --list-destinations     List available MIDI destinations (outputs)");
    println!("  --monitor <N> [--config FILE]");
    println!("                          Monitor MIDI input from source N");
    println!("  --print-config          Print the default configuration as YAML");
    println!("  --check-config <FILE>   Validate a configuration and print its bindings");
    println!("  --run [--config FILE]   Run the driver against the standalone host");
    println!("  -v, --verbose           Debug logging");
    println!("  --help                  Show this help message");
    println!();
    println!("While running, type `screen <name>` (e.g. `screen audio_mixer`) to");
    println!("simulate a screen change, or `quit` to stop.");
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Path given with `--config`, if any
fn config_arg(args: &[String]) -> Option<PathBuf> {
    let i = args.iter().position(|a| a == "--config")?;
    match args.get(i + 1) {
        Some(path) => Some(PathBuf::from(path)),
        None => {
            eprintln!("Error: --config requires a file path");
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<DriverConfig> {
    match path {
        Some(path) => DriverConfig::load(path),
        None => Ok(DriverConfig::default()),
    }
}

fn monitor_input(source: usize, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    let map = ControlMap::from_layout(&config.layout)?;

    println!("Connecting to MIDI source {}...", source);
    let input = MidiInput::new(&config.device.client_name, source)?;

    println!("Monitoring {} (press Ctrl+C to stop)...", input.port_name());
    println!();

    loop {
        match input.recv_timeout(POLL_INTERVAL) {
            Ok(Some(msg)) => match map.resolve(&msg) {
                Some(event) => println!("{:?} -> {} ({})", msg, event.control, event.value),
                None => println!("{:?}", msg),
            },
            Ok(None) => {}
            Err(e) => {
                println!("{}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Lines typed on stdin. The channel disconnects at EOF.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn check_config(path: &str) -> Result<()> {
    let config = validate_config(path)?;
    let map = ControlMap::from_layout(&config.layout)?;

    println!("{} is valid ({} bindings)", path, map.len());
    println!();
    for control in Control::all() {
        if let Some(binding) = map.binding_of(control) {
            println!("  {:<12} {}", control.to_string(), format_binding(&binding));
        }
    }
    Ok(())
}

fn run_driver(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_ref())?;

    let client = config.device.client_name.clone();
    let input = MidiInput::open_matching(&client, &config.device.port_match)
        .context("Failed to open controller input")?;
    let output = MidirOutput::open_matching(&client, &config.device.port_match)
        .context("Failed to open controller output")?;

    let mut host = StandaloneHost::new(config.standalone.chains).with_output(Box::new(output));
    let mut driver = Driver::new(config)?;
    driver.init(&mut host);

    let watcher = match &config_path {
        Some(path) => Some(ConfigWatcher::new(path, None)?),
        None => None,
    };
    let commands = spawn_stdin_reader();

    println!(
        "{} on {} (mode {:?}). Type `quit` to stop.",
        Driver::info().driver_name,
        input.port_name(),
        driver.mode()
    );

    'run: loop {
        let timeout = host
            .next_due_in(Instant::now())
            .map_or(POLL_INTERVAL, |due| due.min(POLL_INTERVAL));

        match input.recv_timeout(timeout) {
            Ok(Some(msg)) => {
                driver.midi_event(&msg, &mut host);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "controller input closed");
                break;
            }
        }

        for task in host.due_tasks(Instant::now()) {
            driver.run_periodic(task, &mut host);
        }

        if let Some(watcher) = &watcher {
            for event in watcher.recv_all() {
                match event {
                    ConfigEvent::Reloaded(config) => {
                        if let Err(e) = driver.apply_config(*config, &mut host) {
                            warn!(error = %e, "reloaded configuration rejected");
                        }
                    }
                    ConfigEvent::Error(e) => warn!(error = %e, "configuration reload failed"),
                }
            }
        }

        loop {
            match commands.try_recv() {
                Ok(line) => {
                    let line = line.trim();
                    if line == "quit" {
                        break 'run;
                    }
                    if let Some(name) = line.strip_prefix("screen ") {
                        driver.on_screen_changed(&Screen::from_name(name.trim()));
                    } else if !line.is_empty() {
                        println!("Unknown command: {}", line);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'run,
            }
        }

        for event in host.drain_events() {
            println!("{}", event);
        }
    }

    driver.end(&mut host);
    info!("stopped");
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("MPK Driver - Akai MPK 225 control surface");
        println!("Run with --help for usage information");
        return Ok(());
    }

    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");

    match args[1].as_str() {
        "--list-sources" => {
            print_sources();
        }
        "--list-destinations" => {
            print_destinations();
        }
        "--monitor" => {
            if args.len() < 3 {
                eprintln!("Error: --monitor requires a source number");
                eprintln!("Use --list-sources to see available sources");
                std::process::exit(1);
            }
            let source: usize = args[2]
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid source number: {}", args[2]))?;
            let config_path = config_arg(&args);
            init_logging(verbose);
            monitor_input(source, config_path)?;
        }
        "--print-config" => {
            print!("{}", DriverConfig::default().to_yaml()?);
        }
        "--check-config" => {
            if args.len() < 3 {
                eprintln!("Error: --check-config requires a file path");
                std::process::exit(1);
            }
            check_config(&args[2])?;
        }
        "--run" => {
            let config_path = config_arg(&args);
            init_logging(verbose);
            run_driver(config_path)?;
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
