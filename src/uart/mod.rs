/**
 * Serial sender
 *
 * Background thread that writes the freshest transmission string to the
 * downstream controller once per second, newline-terminated. The string
 * is shared with the producer loop through a single RwLock cell, so the
 * sender always observes either the old window or the new one, never a
 * partial write.
 */

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info};

pub const DEFAULT_BAUD: u32 = 115_200;
const SEND_INTERVAL: Duration = Duration::from_secs(1);

/// Most recently rendered transmission string. One writer (the producer
/// loop), one reader (the sender thread). None until warm-up completes.
pub type SharedWindow = Arc<RwLock<Option<String>>>;

pub struct CodeSender {
    port_name: String,
    baud_rate: u32,
}

impl CodeSender {
    pub fn new(port_name: &str) -> Self {
        CodeSender {
            port_name: port_name.to_string(),
            baud_rate: DEFAULT_BAUD,
        }
    }

    pub fn with_baud(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Open the port and start the send loop in a background thread.
    /// Stops once `running` goes false.
    pub fn start(
        self,
        window: SharedWindow,
        running: Arc<AtomicBool>,
    ) -> Result<JoinHandle<()>, serialport::Error> {
        let mut port = serialport::new(&self.port_name, self.baud_rate)
            .timeout(Duration::from_millis(100))
            .open()?;
        info!("serial port {} open at {} baud", self.port_name, self.baud_rate);

        let handle = thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                send_tick(&mut port, &window);
                thread::sleep(SEND_INTERVAL);
            }
            info!("serial sender stopped");
        });

        Ok(handle)
    }
}

/// One send pass: write the current window, newline-terminated, to the
/// port. Nothing is sent while the window is still None (warm-up). Write
/// errors are logged and the next tick retries; the core places no
/// framing requirements on the link beyond the trailing delimiter and
/// the line terminator.
fn send_tick<W: Write>(port: &mut W, window: &SharedWindow) {
    let current = window.read().unwrap().clone();
    if let Some(message) = current {
        let line = format!("{}\n", message);
        match port.write_all(line.as_bytes()).and_then(|_| port.flush()) {
            Ok(()) => info!("sent: {}", message),
            Err(e) => error!("serial write failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(value: Option<&str>) -> SharedWindow {
        Arc::new(RwLock::new(value.map(|s| s.to_string())))
    }

    #[test]
    fn test_nothing_sent_during_warmup() {
        let mut port: Vec<u8> = Vec::new();
        send_tick(&mut port, &shared(None));
        assert!(port.is_empty());
    }

    #[test]
    fn test_window_sent_newline_terminated() {
        let mut port: Vec<u8> = Vec::new();
        send_tick(&mut port, &shared(Some("12345672345617")));
        assert_eq!(port, b"12345672345617\n".to_vec());
    }

    #[test]
    fn test_fresh_window_replaces_old() {
        let window = shared(Some("1234567"));
        let mut port: Vec<u8> = Vec::new();

        send_tick(&mut port, &window);
        *window.write().unwrap() = Some("6543217".to_string());
        send_tick(&mut port, &window);

        assert_eq!(port, b"1234567\n6543217\n".to_vec());
    }

    #[test]
    fn test_same_window_resent_every_tick() {
        let window = shared(Some("1b34567"));
        let mut port: Vec<u8> = Vec::new();

        send_tick(&mut port, &window);
        send_tick(&mut port, &window);

        assert_eq!(port, b"1b34567\n1b34567\n".to_vec());
    }
}
