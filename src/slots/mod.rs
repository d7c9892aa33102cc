/**
 * Slot Classifier
 *
 * Maps raw detector output (class symbol + normalized bounding box) onto
 * six fixed spatial slots and picks one representative detection per slot.
 * Pure functions only, no I/O.
 */

use crate::code::{RawSymbol, RawTuple};

/// One raw observation from the external detector. Coordinates are
/// normalized to [0, 1] relative to image width/height.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class: String,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Detection {
    pub fn new(class: &str, center_x: f64, center_y: f64, width: f64, height: f64) -> Self {
        Detection {
            class: class.to_string(),
            center_x,
            center_y,
            width,
            height,
        }
    }

    /// Left edge of the bounding box, used as the in-slot tie-break key.
    pub fn left_edge(&self) -> f64 {
        self.center_x - self.width / 2.0
    }
}

/// One normalized slot rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotRect {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

const fn rect(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> SlotRect {
    SlotRect {
        x_min,
        x_max,
        y_min,
        y_max,
    }
}

impl SlotRect {
    /// Half-open membership test on both axes: min <= v < max.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x < self.x_max && y >= self.y_min && y < self.y_max
    }
}

/// The six fixed slot rectangles, indexed 0-5 in the physical layout.
/// Slot boundaries are configuration constants, not computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotLayout(pub [SlotRect; 6]);

impl SlotLayout {
    /// Evenly spaced 2x3 grid used by the digit-code rig.
    pub const fn spaced() -> Self {
        SlotLayout([
            rect(0.0, 0.219, 0.2, 0.5),
            rect(0.344, 0.609, 0.208, 0.5),
            rect(0.703, 1.0, 0.208, 0.5),
            rect(0.0, 0.219, 0.5, 1.0),
            rect(0.344, 0.609, 0.5, 1.0),
            rect(0.703, 1.0, 0.5, 1.0),
        ])
    }

    /// Staggered layout used by the mixed-code rig.
    pub const fn staggered() -> Self {
        SlotLayout([
            rect(0.0, 0.1, 0.5, 0.764),
            rect(0.133, 0.234, 0.222, 0.402),
            rect(0.289, 0.406, 0.22, 0.417),
            rect(0.46, 0.587, 0.194, 0.403),
            rect(0.625, 0.738, 0.167, 0.33),
            rect(0.728, 0.89, 0.44, 0.68),
        ])
    }
}

/// Assign detections to slots by center point and pick one representative
/// per slot: the detection with the smallest bounding-box left edge wins,
/// with input order as the final tie-break. Class symbols are forwarded
/// as-is; the canonicalizer decides what to do with out-of-alphabet ones.
pub fn classify(detections: &[Detection], layout: &SlotLayout) -> RawTuple {
    let mut tuple = RawTuple::empty();

    for (i, slot) in layout.0.iter().enumerate() {
        let mut best: Option<&Detection> = None;

        for det in detections {
            if !slot.contains(det.center_x, det.center_y) {
                continue;
            }
            match best {
                // strict < keeps the earlier detection on exact ties
                Some(b) if det.left_edge() < b.left_edge() => best = Some(det),
                Some(_) => {}
                None => best = Some(det),
            }
        }

        if let Some(det) = best {
            tuple.0[i] = RawSymbol::Class(det.class.clone());
        }
    }

    tuple
}
