use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::general::player;
use crate::io::loader::NoteEvent;
use crate::io::sink::KeySink;

/// Playback lifecycle. `Stopped` covers both "paused" and "finished": the
/// controller only launches the engine from a fresh `Idle`, never from
/// `Stopped` (there is no resume).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PlayState {
    Idle = 0,
    Playing = 1,
    Stopped = 2,
}

/// Single-word atomic cell holding the shared playback state. The engine's
/// per-event check and the controller's transitions go through `get`/`set`,
/// so reads and writes are never torn.
pub struct PlaybackState(AtomicU8);

impl PlaybackState {
    pub fn new() -> Self {
        PlaybackState(AtomicU8::new(PlayState::Idle as u8))
    }

    pub fn get(&self) -> PlayState {
        match self.0.load(Ordering::SeqCst) {
            0 => PlayState::Idle,
            1 => PlayState::Playing,
            _ => PlayState::Stopped,
        }
    }

    pub fn set(&self, state: PlayState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the loaded sequence and the shared playback state, and serializes
/// every state transition behind `toggle`/`stop`.
pub struct Controller {
    state: Arc<PlaybackState>,
    events: Arc<Vec<NoteEvent>>,
    shift: i32,
    speed: f64,
    start_delay: Duration,
    sink: Arc<Mutex<Box<dyn KeySink>>>,
}

impl Controller {
    pub fn new(
        events: Vec<NoteEvent>,
        shift: i32,
        speed: f64,
        start_delay: Duration,
        sink: Arc<Mutex<Box<dyn KeySink>>>,
    ) -> Self {
        Controller {
            state: Arc::new(PlaybackState::new()),
            events: Arc::new(events),
            shift,
            speed,
            start_delay,
            sink,
        }
    }

    pub fn state(&self) -> PlayState {
        self.state.get()
    }

    /// Handle one play/pause trigger.
    ///
    /// From `Idle` the state moves to `Playing` immediately and the engine is
    /// launched on its own thread after the start delay; the transition is
    /// published before the thread spawns, so a trigger arriving inside the
    /// delay window sees `Playing` and cancels the pending launch instead of
    /// starting a second engine. While `Playing` the trigger requests a
    /// cooperative stop. A trigger in `Stopped` is ignored: playback never
    /// relaunches after a stop, and the engine does not reset the state when
    /// the sequence ends.
    pub fn toggle(&self) {
        match self.state.get() {
            PlayState::Playing => {
                self.state.set(PlayState::Stopped);
                crate::general::check::print_paused();
            }
            PlayState::Idle => {
                self.state.set(PlayState::Playing);
                let state = self.state.clone();
                let events = self.events.clone();
                let sink = self.sink.clone();
                let shift = self.shift;
                let speed = self.speed;
                let delay = self.start_delay;
                thread::spawn(move || {
                    thread::sleep(delay);
                    // Stopped during the start delay: abandon the launch
                    if state.get() != PlayState::Playing {
                        return;
                    }
                    crate::general::check::print_playing();
                    if let Ok(mut sink) = sink.lock() {
                        if let Err(err) = player::play(&events, shift, speed, &state, &mut **sink) {
                            eprintln!("Error emitting key press: {}", err);
                            state.set(PlayState::Stopped);
                        }
                    }
                });
            }
            PlayState::Stopped => {}
        }
    }

    /// Force a cooperative stop (used at process exit).
    pub fn stop(&self) {
        self.state.set(PlayState::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sink::RecordingSink;
    use crate::io::sink::KeyPress;

    fn controller_with(
        events: Vec<NoteEvent>,
        delay_ms: u64,
    ) -> (Controller, Arc<Mutex<Vec<KeyPress>>>) {
        let (sink, presses) = RecordingSink::new();
        let sink: Box<dyn KeySink> = Box::new(sink);
        let controller = Controller::new(
            events,
            0,
            1.0,
            Duration::from_millis(delay_ms),
            Arc::new(Mutex::new(sink)),
        );
        (controller, presses)
    }

    fn note(pitch: u8, delta: f64) -> NoteEvent {
        NoteEvent { is_control: false, pitch, delta }
    }

    #[test]
    fn starts_idle() {
        let (controller, _) = controller_with(vec![], 1);
        assert_eq!(controller.state(), PlayState::Idle);
    }

    #[test]
    fn toggle_from_idle_plays_after_the_start_delay() {
        let events = vec![note(60, 0.05); 20];
        let (controller, presses) = controller_with(events, 50);
        controller.toggle();
        // The transition is visible before the engine starts
        assert_eq!(controller.state(), PlayState::Playing);
        thread::sleep(Duration::from_millis(250));
        assert_eq!(controller.state(), PlayState::Playing);
        assert!(!presses.lock().unwrap().is_empty());
        controller.stop();
    }

    #[test]
    fn second_toggle_during_the_start_delay_cancels_the_launch() {
        let events = vec![note(60, 0.02); 5];
        let (controller, presses) = controller_with(events, 80);
        controller.toggle();
        controller.toggle();
        assert_eq!(controller.state(), PlayState::Stopped);
        // Wait out the delay plus the whole sequence: the abandoned launch
        // must not play anything, and nothing relaunches later
        thread::sleep(Duration::from_millis(300));
        assert!(presses.lock().unwrap().is_empty());
        assert_eq!(controller.state(), PlayState::Stopped);
        controller.toggle();
        thread::sleep(Duration::from_millis(200));
        assert!(presses.lock().unwrap().is_empty());
    }

    #[test]
    fn toggle_while_playing_stops_without_relaunch() {
        let events = vec![note(60, 0.05); 40];
        let (controller, presses) = controller_with(events, 10);
        controller.toggle();
        thread::sleep(Duration::from_millis(100));
        assert_eq!(controller.state(), PlayState::Playing);

        controller.toggle();
        assert_eq!(controller.state(), PlayState::Stopped);
        thread::sleep(Duration::from_millis(120));
        let count = presses.lock().unwrap().len();

        // Further toggles are ignored: no relaunch from Stopped
        controller.toggle();
        thread::sleep(Duration::from_millis(120));
        assert_eq!(controller.state(), PlayState::Stopped);
        assert_eq!(presses.lock().unwrap().len(), count);
    }

    #[test]
    fn state_stays_playing_after_the_sequence_ends() {
        let (controller, _) = controller_with(vec![note(60, 0.0)], 1);
        controller.toggle();
        thread::sleep(Duration::from_millis(100));
        // Engine finished the whole sequence without a stop request
        assert_eq!(controller.state(), PlayState::Playing);
        // The next trigger moves it to Stopped, after which nothing relaunches
        controller.toggle();
        assert_eq!(controller.state(), PlayState::Stopped);
    }
}
