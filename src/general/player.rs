use std::error::Error;
use std::time::{Duration, Instant};

use crate::general::control::{PlayState, PlaybackState};
use crate::general::layout;
use crate::io::loader::NoteEvent;
use crate::io::sink::{KeyPress, KeySink};

/// Poll granularity of the cancellable inter-event wait.
const WAIT_SLICE: Duration = Duration::from_millis(25);

/// Replay `events` in real time, emitting key presses through `sink`.
///
/// Runs until the sequence ends or `state` leaves `Playing`; cancellation is
/// cooperative and observed inside the inter-event wait. Notes landing
/// outside the playable range after shifting are octave-folded back in;
/// anything still unplayable (or on an unwired key) is dropped without error.
/// Sink failures propagate and end the run.
pub fn play(
    events: &[NoteEvent],
    shift: i32,
    speed: f64,
    state: &PlaybackState,
    sink: &mut dyn KeySink,
) -> Result<(), Box<dyn Error>> {
    for event in events {
        if state.get() != PlayState::Playing {
            break;
        }
        if !wait_scaled(event.delta, speed, state) {
            break;
        }
        if event.is_control {
            continue;
        }
        let pitch = fold_into_range(event.pitch as i32 + shift);
        if pitch < layout::LOWEST_PITCH || pitch > layout::HIGHEST_PITCH {
            continue;
        }
        if let Some(symbol) = layout::symbol_for(pitch as u8) {
            if crate::is_debug_enabled() {
                println!("[play] {} -> '{}'", layout::note_name(pitch as u8), symbol);
            }
            sink.press(KeyPress { symbol, pitch: pitch as u8 })?;
        }
    }
    Ok(())
}

/// Fold an absolute pitch into the playable range by whole octaves, keeping
/// its pitch class. Pitches below the range land in the lowest playable
/// octave, pitches above it in the highest. In-range pitches pass through.
pub fn fold_into_range(pitch: i32) -> i32 {
    if pitch < layout::LOWEST_PITCH {
        pitch.rem_euclid(layout::OCTAVE) + layout::LOWEST_PITCH
    } else if pitch > layout::HIGHEST_PITCH {
        pitch.rem_euclid(layout::OCTAVE) + layout::HIGH_FOLD_BASE
    } else {
        pitch
    }
}

/// Wait `delta / speed` seconds against a monotonic deadline, waking every
/// `WAIT_SLICE` to observe cancellation. Returns false if playback was
/// stopped during the wait.
fn wait_scaled(delta: f64, speed: f64, state: &PlaybackState) -> bool {
    let deadline = Instant::now() + Duration::from_secs_f64(delta / speed);
    loop {
        if state.get() != PlayState::Playing {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(WAIT_SLICE.min(deadline - now));
    }
}
