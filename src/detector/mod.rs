/**
 * Detector collaborator
 *
 * Parses YOLO-style label files (one `class cx cy w h [conf]` line per
 * detection, normalized coordinates) and invokes the external detector
 * process once per frame. A missing label file is an ordinary outcome:
 * the detector saved nothing for the frame.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};
use thiserror::Error;

use crate::slots::Detection;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("detector i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to spawn detector: {0}")]
    Spawn(std::io::Error),
    #[error("detector exited with status {0}")]
    ExitStatus(std::process::ExitStatus),
}

/// Ordered class-id to class-name mapping supplied by the model.
#[derive(Debug, Clone)]
pub struct ClassVocabulary {
    names: Vec<String>,
}

impl ClassVocabulary {
    pub fn new(names: Vec<String>) -> Self {
        ClassVocabulary { names }
    }

    /// Load a `.names`-style file: one class name per line.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let names = text
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Ok(ClassVocabulary::new(names))
    }

    pub fn name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Parse one label file. `Ok(None)` means the file does not exist.
pub fn parse_label_file(
    path: &Path,
    vocab: &ClassVocabulary,
) -> Result<Option<Vec<Detection>>, DetectorError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    Ok(Some(parse_label_text(&text, vocab)))
}

/// Parse label lines. Malformed lines are skipped and processing
/// continues; out-of-range class ids are dropped before classification.
pub fn parse_label_text(text: &str, vocab: &ClassVocabulary) -> Vec<Detection> {
    let mut detections = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            warn!("skipping malformed label line: {:?}", line);
            continue;
        }

        let parsed = (
            parts[0].parse::<usize>(),
            parts[1].parse::<f64>(),
            parts[2].parse::<f64>(),
            parts[3].parse::<f64>(),
            parts[4].parse::<f64>(),
        );
        let (class_id, cx, cy, w, h) = match parsed {
            (Ok(id), Ok(cx), Ok(cy), Ok(w), Ok(h)) => (id, cx, cy, w, h),
            _ => {
                warn!("skipping malformed label line: {:?}", line);
                continue;
            }
        };

        let Some(name) = vocab.name(class_id) else {
            debug!("dropping out-of-range class id {}", class_id);
            continue;
        };

        detections.push(Detection::new(name, cx, cy, w, h));
    }

    detections
}

/// Per-frame source of detections.
pub trait Detector {
    /// Run one detection pass. `Ok(None)` means the detector produced no
    /// readable output for the frame.
    fn detect(&mut self) -> Result<Option<Vec<Detection>>, DetectorError>;
}

/// Invokes an external detector command and reads back the label file it
/// writes. Camera capture and inference both live behind that command.
pub struct ProcessDetector {
    program: PathBuf,
    args: Vec<String>,
    label_path: PathBuf,
    vocab: ClassVocabulary,
}

impl ProcessDetector {
    pub fn new(
        program: impl Into<PathBuf>,
        args: Vec<String>,
        label_path: impl Into<PathBuf>,
        vocab: ClassVocabulary,
    ) -> Self {
        ProcessDetector {
            program: program.into(),
            args,
            label_path: label_path.into(),
            vocab,
        }
    }
}

impl Detector for ProcessDetector {
    fn detect(&mut self) -> Result<Option<Vec<Detection>>, DetectorError> {
        // stale output from the previous frame must not be re-read
        if self.label_path.exists() {
            fs::remove_file(&self.label_path)?;
        }

        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(DetectorError::Spawn)?;
        if !status.success() {
            return Err(DetectorError::ExitStatus(status));
        }

        parse_label_file(&self.label_path, &self.vocab)
    }
}
