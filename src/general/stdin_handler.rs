use std::io::stdin;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use crate::general::control::Controller;

/// Spawn a thread that reads command lines from stdin. Empty line or 'exit'
/// sets the global `EXIT_FLAG`; 'p' (or 'play'/'pause'/'toggle') forwards a
/// play/pause trigger to the controller.
pub fn spawn_stdin_handler(controller: Arc<Controller>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = stdin();
        let mut line = String::new();
        loop {
            line.clear();
            if stdin.read_line(&mut line).is_err() {
                break;
            }
            let cmd = line.trim();
            if cmd.is_empty()
                || cmd.eq_ignore_ascii_case("exit")
                || cmd.eq_ignore_ascii_case("quit")
                || cmd.eq_ignore_ascii_case("q")
            {
                crate::EXIT_FLAG.store(true, Ordering::SeqCst);
                break;
            }

            if cmd.eq_ignore_ascii_case("p")
                || cmd.eq_ignore_ascii_case("play")
                || cmd.eq_ignore_ascii_case("pause")
                || cmd.eq_ignore_ascii_case("toggle")
            {
                controller.toggle();
                continue;
            }

            // Debug toggle commands
            if cmd.eq_ignore_ascii_case("debug on") || cmd.eq_ignore_ascii_case("debug enable") {
                crate::DEBUG_ENABLED.store(true, Ordering::SeqCst);
                println!("Debug enabled");
                continue;
            }
            if cmd.eq_ignore_ascii_case("debug off") || cmd.eq_ignore_ascii_case("debug disable") {
                crate::DEBUG_ENABLED.store(false, Ordering::SeqCst);
                println!("Debug disabled");
                continue;
            }

            if cmd.eq_ignore_ascii_case("status") {
                println!("Playback state: {:?}", controller.state());
                continue;
            }

            if cmd.eq_ignore_ascii_case("help") || cmd.eq_ignore_ascii_case("h") {
                println!("Commands:");
                println!("  p/play/pause     - Toggle playback");
                println!("  status           - Show the playback state");
                println!("  debug on/off     - Enable/Disable verbose debug prints");
                println!("  help/h           - Show this help");
                println!("  exit/quit/q      - Exit program");
                continue;
            }

            println!("Unrecognized command: '{}'. Type 'help' for available commands.", cmd);
        }
    })
}
