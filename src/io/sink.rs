use std::error::Error;
use std::io::{stdin, stdout, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::general::layout;

/// A single key-press emission: the key symbol plus the (already folded)
/// pitch it stands for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyPress {
    pub symbol: char,
    pub pitch: u8,
}

/// Where emitted key presses go. The playback loop calls `press` between
/// timed waits; a failure ends the playback run.
pub trait KeySink: Send {
    fn press(&mut self, key: KeyPress) -> Result<(), Box<dyn Error>>;
}

/// Prints each key press as a colored line (dry-run sink, the default).
pub struct ConsoleSink {
    stdout: StandardStream,
}

impl ConsoleSink {
    pub fn new() -> Self {
        ConsoleSink { stdout: StandardStream::stdout(ColorChoice::Always) }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySink for ConsoleSink {
    fn press(&mut self, key: KeyPress) -> Result<(), Box<dyn Error>> {
        self.stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(&mut self.stdout, "key '{}'", key.symbol)?;
        self.stdout.reset()?;
        writeln!(&mut self.stdout, "  ({})", layout::note_name(key.pitch))?;
        Ok(())
    }
}

/// Auditions the folded notes on a MIDI output port instead of the console.
/// Monophonic: each press releases the previous note first.
pub struct MidiSink {
    conn: midir::MidiOutputConnection,
    last_pitch: Option<u8>,
}

impl MidiSink {
    /// Open the first MIDI output port whose name contains `port_substr`,
    /// with interactive selection as fallback.
    pub fn connect(port_substr: &str) -> Result<Self, Box<dyn Error>> {
        let midi_out = midir::MidiOutput::new("lyre-autoplay output")?;
        let idx = choose_output_port(&midi_out, port_substr)?;
        let ports = midi_out.ports();
        let port = ports.get(idx).ok_or("invalid output port selected")?;
        println!("Opening MIDI output: {}", midi_out.port_name(port)?);
        let conn = midi_out.connect(port, "lyre-autoplay-output")?;
        Ok(MidiSink { conn, last_pitch: None })
    }
}

impl KeySink for MidiSink {
    fn press(&mut self, key: KeyPress) -> Result<(), Box<dyn Error>> {
        if let Some(prev) = self.last_pitch.take() {
            // Note Off for the previous key
            self.conn.send(&[0x80, prev, 0])?;
        }
        // Note On
        self.conn.send(&[0x90, key.pitch, 100])?;
        self.last_pitch = Some(key.pitch);
        Ok(())
    }
}

/// Select a MIDI output port. Prefers a port whose name contains
/// `port_substr`; otherwise takes a single available port, or lists the
/// ports and asks.
fn choose_output_port(
    midi_out: &midir::MidiOutput,
    port_substr: &str,
) -> Result<usize, Box<dyn Error>> {
    let ports = midi_out.ports();
    if ports.is_empty() {
        return Err("no MIDI output port found".into());
    }

    for (i, p) in ports.iter().enumerate() {
        if let Ok(name) = midi_out.port_name(p) {
            if name.contains(port_substr) {
                println!("Choosing output port matching '{}': {}", port_substr, name);
                return Ok(i);
            }
        }
    }

    if ports.len() == 1 {
        println!("Choosing the only available output port: {}", midi_out.port_name(&ports[0])?);
        return Ok(0);
    }

    println!("\nAvailable output ports:");
    for (i, p) in ports.iter().enumerate() {
        println!("{}: {}", i, midi_out.port_name(p)?);
    }

    print!("Please select output port: ");
    stdout().flush()?;
    let mut choice = String::new();
    stdin().read_line(&mut choice)?;
    let idx = choice.trim().parse::<usize>()?;
    if idx >= ports.len() {
        return Err("invalid output port selected".into());
    }
    Ok(idx)
}

/// Test sink that records every press into a shared vector.
#[cfg(test)]
pub struct RecordingSink {
    presses: std::sync::Arc<std::sync::Mutex<Vec<KeyPress>>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> (Self, std::sync::Arc<std::sync::Mutex<Vec<KeyPress>>>) {
        let presses = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        (RecordingSink { presses: presses.clone() }, presses)
    }
}

#[cfg(test)]
impl KeySink for RecordingSink {
    fn press(&mut self, key: KeyPress) -> Result<(), Box<dyn Error>> {
        self.presses.lock().expect("recording sink poisoned").push(key);
        Ok(())
    }
}
