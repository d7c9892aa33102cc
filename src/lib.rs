pub mod code;
pub mod detector;
pub mod history;
pub mod relay;
pub mod slots;
pub mod uart;

pub use code::{CanonicalCode, CodePolicy, RawSymbol, RawTuple};
pub use detector::{ClassVocabulary, Detector, DetectorError, ProcessDetector};
pub use history::{CodeHistory, HistoryEntry};
pub use relay::{RelayConfig, RelayError, SlotRelay};
pub use slots::{classify, Detection, SlotLayout, SlotRect};
pub use uart::{CodeSender, SharedWindow};
