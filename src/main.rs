use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use clap::Parser;

mod config;
mod general;
mod io;
mod remote;

use general::control::Controller;
use io::sink::{ConsoleSink, KeySink, MidiSink};

/// Set when the user asks to quit (stdin `exit`, OSC exit path). Main polls it.
pub static EXIT_FLAG: AtomicBool = AtomicBool::new(false);
/// Gates verbose debug prints.
pub static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

#[derive(Parser)]
#[command(name = "lyre-autoplay", about = "MIDI file auto player for a 3-octave lyre keyboard")]
struct Cli {
    /// Path to the MIDI file to play
    midi: PathBuf,
    /// Playback speed multiplier (> 1 plays faster)
    #[arg(long)]
    speed: Option<f64>,
    /// Audition folded notes on a MIDI output port matching this name substring
    #[arg(long)]
    midi_out: Option<String>,
    /// Enable the OSC remote-control listener
    #[arg(long)]
    osc: bool,
}

fn main() {
    match run() {
        Ok(_) => (),
        Err(err) => println!("Error: {}", err),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let cfg = config::init(cli.speed, cli.midi_out, cli.osc)?;

    let events = io::loader::load_events(&cli.midi)?;
    let shift = general::shift::find_best_shift(&events);
    general::check::print_loaded(&cli.midi, events.len(), shift);

    let sink: Box<dyn KeySink> = match &cfg.midi_output {
        Some(substr) => Box::new(MidiSink::connect(substr)?),
        None => Box::new(ConsoleSink::new()),
    };

    let controller = Arc::new(Controller::new(
        events,
        shift,
        cfg.speed,
        Duration::from_millis(cfg.start_delay_ms),
        Arc::new(Mutex::new(sink)),
    ));

    general::check::print_quick_help();

    let stdin_handle = general::stdin_handler::spawn_stdin_handler(controller.clone());
    let osc_handle = if cfg.osc.enabled {
        Some(remote::osc_listener::spawn_osc_listener(controller.clone()))
    } else {
        None
    };

    // Wait for exit signal from the stdin or OSC thread
    while !EXIT_FLAG.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
    }

    println!("Exiting...");
    controller.stop();
    let _ = stdin_handle.join();
    if let Some(handle) = osc_handle {
        let _ = handle.join();
    }

    Ok(())
}
