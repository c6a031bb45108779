use std::net::UdpSocket;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rosc::{decoder, OscPacket};

use crate::general::control::Controller;

/// Spawns a background thread that listens for OSC on the configured
/// address. The configured toggle path triggers play/pause on `controller`,
/// the exit path ends the process. The thread checks `crate::EXIT_FLAG`
/// periodically to shut down gracefully.
pub fn spawn_osc_listener(controller: Arc<Controller>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let config = crate::config::get_config();

        let bind_addr = format!("{}:{}", config.osc.listening_host, config.osc.listening_port);
        let socket = match UdpSocket::bind(&bind_addr) {
            Ok(s) => s,
            Err(err) => {
                eprintln!("OSC bind failed on {}: {}", bind_addr, err);
                return;
            }
        };

        // Socket timeout so EXIT_FLAG gets polled between packets
        socket.set_read_timeout(Some(Duration::from_millis(200))).ok();

        if crate::is_debug_enabled() {
            println!(
                "OSC listener bound on {} (paths: {}, {})",
                bind_addr, config.osc.toggle_path, config.osc.exit_path
            );
        }

        let mut buf = [0u8; rosc::decoder::MTU];

        loop {
            if crate::EXIT_FLAG.load(Ordering::SeqCst) {
                break;
            }

            match socket.recv_from(&mut buf) {
                Ok((size, peer_addr)) => match decoder::decode_udp(&buf[..size]) {
                    Ok((_, packet)) => handle_packet(packet, &controller),
                    Err(err) => eprintln!("OSC decode error from {}: {}", peer_addr, err),
                },
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(err) => eprintln!("OSC recv error: {}", err),
            }
        }

        if crate::is_debug_enabled() {
            println!("OSC listener exiting");
        }
    })
}

fn handle_packet(packet: OscPacket, controller: &Controller) {
    match packet {
        OscPacket::Message(msg) => handle_message(msg, controller),
        OscPacket::Bundle(bundle) => {
            for pkt in bundle.content {
                handle_packet(pkt, controller);
            }
        }
    }
}

fn handle_message(msg: rosc::OscMessage, controller: &Controller) {
    let config = crate::config::get_config();

    if msg.addr == config.osc.toggle_path {
        if crate::is_debug_enabled() {
            println!("[OSC] play/pause toggle");
        }
        controller.toggle();
    } else if msg.addr == config.osc.exit_path {
        crate::EXIT_FLAG.store(true, Ordering::SeqCst);
    }
}
