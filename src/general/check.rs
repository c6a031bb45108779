use std::io::Write;
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

// Status lines are best-effort: write errors on them are ignored.

pub fn print_loaded(path: &Path, event_count: usize, shift: i32) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_intense(true));
    let _ = writeln!(
        &mut stdout,
        "Loaded {}: {} events, shift {:+} semitones",
        path.display(),
        event_count,
        shift
    );
    let _ = stdout.reset();
}

// Print the quick help line in blue (works on Windows CMD via termcolor)
pub fn print_quick_help() {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_intense(true));
    let _ = writeln!(&mut stdout, "Type 'p' to play/pause, 'help' for commands, 'exit' to quit");
    let _ = stdout.reset();
}

pub fn print_playing() {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_intense(true));
    let _ = writeln!(&mut stdout, "Playing");
    let _ = stdout.reset();
}

pub fn print_paused() {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_intense(true));
    let _ = writeln!(&mut stdout, "Paused");
    let _ = stdout.reset();
}
