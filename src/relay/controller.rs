/**
 * Slot Relay Controller
 *
 * Producer loop tying the pipeline together:
 * 1. Runs the external detector once per tick
 * 2. Classifies detections into the six slots
 * 3. Canonicalizes the raw tuple into a code
 * 4. Appends to the rolling history, persists it, republishes the window
 *
 * The history has exactly one writer (this loop). The rendered window is
 * shared with the serial sender through the RwLock cell in `uart`.
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, error, info};

use crate::code::{CodePolicy, RawTuple};
use crate::detector::Detector;
use crate::history::{CodeHistory, HistoryEntry, WINDOW_LEN};
use crate::relay::RelayError;
use crate::slots::{classify, SlotLayout};
use crate::uart::{CodeSender, SharedWindow};

/// Deployment configuration. The policy choice also fixes the slot
/// layout, history capacity and persistence defaults of the two rigs,
/// each individually overridable.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub policy: CodePolicy,
    pub layout: SlotLayout,
    pub capacity: usize,
    pub interval: Duration,
    pub history_file: Option<PathBuf>,
}

impl RelayConfig {
    /// Digit-code rig: spaced layout, history bounded to one window, no
    /// persistence.
    pub fn digits() -> Self {
        RelayConfig {
            policy: CodePolicy::Digits,
            layout: SlotLayout::spaced(),
            capacity: WINDOW_LEN,
            interval: Duration::from_millis(500),
            history_file: None,
        }
    }

    /// Mixed-code rig: staggered layout, 40-deep history persisted to a
    /// results file for crash recovery.
    pub fn mixed(history_file: impl Into<PathBuf>) -> Self {
        RelayConfig {
            policy: CodePolicy::Mixed,
            layout: SlotLayout::staggered(),
            capacity: 40,
            interval: Duration::from_millis(500),
            history_file: Some(history_file.into()),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_layout(mut self, layout: SlotLayout) -> Self {
        self.layout = layout;
        self
    }
}

pub struct SlotRelay<D: Detector> {
    config: RelayConfig,
    detector: D,
    history: CodeHistory,
    window: SharedWindow,
    running: Arc<AtomicBool>,
}

impl<D: Detector> SlotRelay<D> {
    /// Build a relay, pre-loading the history file when the deployment
    /// persists one.
    pub fn new(config: RelayConfig, detector: D) -> Result<Self, RelayError> {
        let history = match &config.history_file {
            Some(path) => CodeHistory::load(path, config.capacity)?,
            None => CodeHistory::new(config.capacity),
        };

        Ok(SlotRelay {
            history,
            detector,
            window: Arc::new(RwLock::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    /// Shared handle the sender reads the freshest window from.
    pub fn window(&self) -> SharedWindow {
        Arc::clone(&self.window)
    }

    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn history(&self) -> &CodeHistory {
        &self.history
    }

    /// Spawn the serial sender against this relay's shared window.
    pub fn start_sender(&self, sender: CodeSender) -> Result<JoinHandle<()>, RelayError> {
        self.running.store(true, Ordering::SeqCst);
        Ok(sender.start(self.window(), self.running_flag())?)
    }

    /// Signal the sender thread and a concurrent `run` to stop.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Run one detect/classify/canonicalize/aggregate tick.
    pub fn tick(&mut self) -> Result<(), RelayError> {
        let entry = match self.detector.detect()? {
            Some(detections) => {
                debug!("{} detections this frame", detections.len());
                let raw = classify(&detections, &self.config.layout);
                HistoryEntry::Code(self.config.policy.canonicalize(&raw))
            }
            None => self.missing_output_entry(),
        };

        info!("new result: {}", entry.render());
        self.history.push(entry);

        if let Some(path) = &self.config.history_file {
            self.history.save(path)?;
        }

        self.publish();
        Ok(())
    }

    /// A frame without readable detector output maps to an empty tuple
    /// under the digits policy and to the explicit error placeholder
    /// under the mixed policy. Never an error for the caller.
    fn missing_output_entry(&self) -> HistoryEntry {
        match self.config.policy {
            CodePolicy::Digits => {
                HistoryEntry::Code(self.config.policy.canonicalize(&RawTuple::empty()))
            }
            CodePolicy::Mixed => HistoryEntry::Error,
        }
    }

    fn publish(&self) {
        if !self.history.warmed_up() {
            info!("warming up: {}/{} results", self.history.len(), WINDOW_LEN);
            return;
        }
        let rendered = self.history.render_window();
        if let Some(window) = &rendered {
            info!("current window: {}", window);
        }
        *self.window.write().unwrap() = rendered;
    }

    /// Run the producer loop until shutdown. No tick outcome is fatal:
    /// detector and persistence failures are logged and the loop moves
    /// on to the next frame.
    pub fn run(&mut self) {
        self.running.store(true, Ordering::SeqCst);
        while self.running.load(Ordering::SeqCst) {
            if let Err(e) = self.tick() {
                error!("tick failed: {}", e);
            }
            std::thread::sleep(self.config.interval);
        }
        info!("producer loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DetectorError;
    use crate::slots::Detection;

    /// Scripted detector: replays a fixed sequence of outcomes.
    struct ScriptedDetector {
        outcomes: Vec<Option<Vec<Detection>>>,
        next: usize,
    }

    impl ScriptedDetector {
        fn new(outcomes: Vec<Option<Vec<Detection>>>) -> Self {
            ScriptedDetector { outcomes, next: 0 }
        }
    }

    impl Detector for ScriptedDetector {
        fn detect(&mut self) -> Result<Option<Vec<Detection>>, DetectorError> {
            let outcome = self.outcomes[self.next % self.outcomes.len()].clone();
            self.next += 1;
            Ok(outcome)
        }
    }

    fn full_frame() -> Vec<Detection> {
        vec![
            Detection::new("1", 0.1, 0.3, 0.05, 0.1),
            Detection::new("2", 0.5, 0.3, 0.05, 0.1),
            Detection::new("3", 0.8, 0.3, 0.05, 0.1),
            Detection::new("4", 0.1, 0.7, 0.05, 0.1),
            Detection::new("5", 0.5, 0.7, 0.05, 0.1),
            Detection::new("6", 0.8, 0.7, 0.05, 0.1),
        ]
    }

    #[test]
    fn test_window_published_only_after_warmup() {
        let detector = ScriptedDetector::new(vec![Some(full_frame())]);
        let mut relay = SlotRelay::new(RelayConfig::digits(), detector).unwrap();
        let window = relay.window();

        for _ in 0..5 {
            relay.tick().unwrap();
        }
        assert!(window.read().unwrap().is_none());

        relay.tick().unwrap();
        let published = window.read().unwrap().clone().unwrap();
        assert_eq!(published, "123456712345671234567123456712345671234567");
    }

    #[test]
    fn test_missing_output_digits_policy_fills_tuple() {
        let detector = ScriptedDetector::new(vec![None]);
        let mut relay = SlotRelay::new(RelayConfig::digits(), detector).unwrap();

        relay.tick().unwrap();
        let entry = relay.history().entries().next().unwrap().render();
        assert_eq!(entry.len(), 6);
        assert!(entry.bytes().all(|b| (b'1'..=b'6').contains(&b)));
    }

    #[test]
    fn test_missing_output_mixed_policy_is_error_entry() {
        let dir = tempfile::tempdir().unwrap();
        let config = RelayConfig::mixed(dir.path().join("results.txt"));
        let detector = ScriptedDetector::new(vec![None]);
        let mut relay = SlotRelay::new(config, detector).unwrap();

        relay.tick().unwrap();
        assert_eq!(relay.history().entries().next(), Some(&HistoryEntry::Error));
    }

    #[test]
    fn test_history_persisted_every_tick() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let config = RelayConfig::mixed(path.clone());
        let detector = ScriptedDetector::new(vec![Some(full_frame()), None]);
        let mut relay = SlotRelay::new(config, detector).unwrap();

        relay.tick().unwrap();
        relay.tick().unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = saved.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "error");
    }

    #[test]
    fn test_history_preloaded_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        std::fs::write(&path, "123456\n1b3456\n").unwrap();

        let config = RelayConfig::mixed(path);
        let detector = ScriptedDetector::new(vec![None]);
        let relay = SlotRelay::new(config, detector).unwrap();
        assert_eq!(relay.history().len(), 2);
    }

    #[test]
    fn test_mixed_full_frame_gets_forced_letter() {
        let dir = tempfile::tempdir().unwrap();
        let config = RelayConfig::mixed(dir.path().join("results.txt"))
            .with_layout(SlotLayout::spaced());
        let detector = ScriptedDetector::new(vec![Some(full_frame())]);
        let mut relay = SlotRelay::new(config, detector).unwrap();

        relay.tick().unwrap();
        let entry = relay.history().entries().next().unwrap().render();
        assert_eq!(entry, "1b3456");
    }
}
