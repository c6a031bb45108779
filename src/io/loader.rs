use std::error::Error;
use std::fs;
use std::path::Path;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

/// One merged, delta-timed event from the loaded MIDI file.
///
/// `delta` is in seconds relative to the previous event in the merged
/// stream. Control events (meta, note-off, velocity-0 note-on, anything that
/// is not a sounding note) keep the timeline honest but are never played.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteEvent {
    pub is_control: bool,
    pub pitch: u8,
    pub delta: f64,
}

/// Default tempo when the file carries none: 500,000 us per quarter note (120 BPM).
const DEFAULT_US_PER_QN: f64 = 500_000.0;
/// PPQ fallback for SMPTE-timed files.
const DEFAULT_PPQ: f64 = 480.0;

enum RawKind {
    Tempo(f64),
    Note(u8),
    Control,
}

struct RawEvent {
    ticks: u64,
    kind: RawKind,
}

/// Parse a Standard MIDI File into the merged, delta-timed event sequence
/// the shift selector and playback engine consume.
pub fn load_events(path: &Path) -> Result<Vec<NoteEvent>, Box<dyn Error>> {
    let bytes = fs::read(path)?;
    let smf = Smf::parse(&bytes)?;
    Ok(events_from_smf(&smf))
}

/// Flatten all tracks into one tick-ordered stream, then schedule it.
fn events_from_smf(smf: &Smf<'_>) -> Vec<NoteEvent> {
    let ppq = match smf.header.timing {
        Timing::Metrical(t) => t.as_int() as f64,
        _ => DEFAULT_PPQ,
    };

    let mut raw = Vec::new();
    for track in &smf.tracks {
        let mut abs_ticks = 0u64;
        for event in track {
            abs_ticks += event.delta.as_int() as u64;
            let kind = match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(us)) => RawKind::Tempo(us.as_int() as f64),
                TrackEventKind::Midi { message: MidiMessage::NoteOn { key, vel }, .. }
                    if vel.as_int() > 0 =>
                {
                    RawKind::Note(key.as_int())
                }
                _ => RawKind::Control,
            };
            raw.push(RawEvent { ticks: abs_ticks, kind });
        }
    }
    // Stable sort keeps same-tick events in track order (tempo track first)
    raw.sort_by_key(|e| e.ticks);

    schedule(raw, ppq)
}

/// Convert tick-stamped raw events into delta-second `NoteEvent`s, applying
/// tempo changes as they occur in the merged stream.
fn schedule(raw: Vec<RawEvent>, ppq: f64) -> Vec<NoteEvent> {
    let mut out = Vec::with_capacity(raw.len());
    let mut us_per_qn = DEFAULT_US_PER_QN;
    let mut prev_ticks = 0u64;
    for event in raw {
        let delta_ticks = event.ticks - prev_ticks;
        prev_ticks = event.ticks;
        let delta = delta_ticks as f64 / ppq * us_per_qn / 1_000_000.0;
        match event.kind {
            RawKind::Tempo(us) => {
                us_per_qn = us;
                out.push(NoteEvent { is_control: true, pitch: 0, delta });
            }
            RawKind::Note(pitch) => out.push(NoteEvent { is_control: false, pitch, delta }),
            RawKind::Control => out.push(NoteEvent { is_control: true, pitch: 0, delta }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(ticks: u64, kind: RawKind) -> RawEvent {
        RawEvent { ticks, kind }
    }

    #[test]
    fn deltas_at_default_tempo() {
        // 480 ticks at 480 PPQ and 120 BPM is exactly half a second
        let events = schedule(
            vec![raw(0, RawKind::Note(60)), raw(480, RawKind::Note(62))],
            480.0,
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].delta, 0.0);
        assert!((events[1].delta - 0.5).abs() < 1e-9);
        assert!(!events[1].is_control);
        assert_eq!(events[1].pitch, 62);
    }

    #[test]
    fn tempo_change_applies_to_later_deltas() {
        // Doubling the tempo halves the seconds per tick from that point on
        let events = schedule(
            vec![
                raw(0, RawKind::Tempo(250_000.0)),
                raw(480, RawKind::Note(60)),
                raw(960, RawKind::Note(62)),
            ],
            480.0,
        );
        assert!(events[0].is_control);
        assert!((events[1].delta - 0.25).abs() < 1e-9);
        assert!((events[2].delta - 0.25).abs() < 1e-9);
    }

    #[test]
    fn control_events_carry_their_gap() {
        let events = schedule(
            vec![raw(0, RawKind::Note(60)), raw(240, RawKind::Control), raw(480, RawKind::Note(64))],
            480.0,
        );
        assert!(events[1].is_control);
        assert!((events[1].delta - 0.25).abs() < 1e-9);
        assert!((events[2].delta - 0.25).abs() < 1e-9);
    }

    #[test]
    fn merges_tracks_and_classifies_velocity_zero() {
        // Format-1 file at 480 PPQ. Track 1: tempo meta at tick 0, C4 at
        // tick 480. Track 2: velocity-0 note-on at tick 240, G4 at tick 480.
        let mut bytes = vec![
            b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 1, 0, 2, 0x01, 0xE0,
        ];
        bytes.extend_from_slice(&[
            b'M', b'T', b'r', b'k', 0, 0, 0, 0x10,
            0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // tempo 500000
            0x83, 0x60, 0x90, 0x3C, 0x64, // +480 ticks, C4 on
            0x00, 0xFF, 0x2F, 0x00, // end of track
        ]);
        bytes.extend_from_slice(&[
            b'M', b'T', b'r', b'k', 0, 0, 0, 0x0E,
            0x81, 0x70, 0x90, 0x40, 0x00, // +240 ticks, E4 on with vel 0
            0x81, 0x70, 0x90, 0x43, 0x50, // +240 ticks, G4 on
            0x00, 0xFF, 0x2F, 0x00,
        ]);
        let smf = Smf::parse(&bytes).unwrap();
        let events = events_from_smf(&smf);

        // tempo + vel-0 + 2 notes + 2 end-of-track metas, tick order
        assert_eq!(events.len(), 6);
        assert!(events[0].is_control);
        assert_eq!(events[0].delta, 0.0);
        // The velocity-0 note-on from track 2 is merged in at tick 240 and
        // classified as a control event
        assert!(events[1].is_control);
        assert!((events[1].delta - 0.25).abs() < 1e-9);
        // Both tick-480 notes, in track order, a quarter second later
        assert!(!events[2].is_control);
        assert_eq!(events[2].pitch, 60);
        assert!((events[2].delta - 0.25).abs() < 1e-9);
        assert!(!events[4].is_control);
        assert_eq!(events[4].pitch, 67);
        assert_eq!(events[4].delta, 0.0);
    }

    #[test]
    fn smpte_timing_falls_back_to_default_ppq() {
        // Format-0 file with SMPTE division (-24 fps, 40 ticks/frame): the
        // loader schedules it as if it were 480 PPQ at the default tempo.
        let mut bytes = vec![
            b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0xE8, 0x28,
        ];
        bytes.extend_from_slice(&[
            b'M', b'T', b'r', b'k', 0, 0, 0, 0x0D,
            0x00, 0x90, 0x3C, 0x64,
            0x83, 0x60, 0x90, 0x3E, 0x64, // +480 ticks
            0x00, 0xFF, 0x2F, 0x00,
        ]);
        let smf = Smf::parse(&bytes).unwrap();
        let events = events_from_smf(&smf);

        assert_eq!(events.len(), 3);
        assert!(!events[1].is_control);
        assert!((events[1].delta - 0.5).abs() < 1e-9);
    }

    #[test]
    fn simultaneous_events_get_zero_delta() {
        let events = schedule(
            vec![raw(100, RawKind::Note(60)), raw(100, RawKind::Note(64))],
            480.0,
        );
        assert!(events[0].delta > 0.0);
        assert_eq!(events[1].delta, 0.0);
    }
}
