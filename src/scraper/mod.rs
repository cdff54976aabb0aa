//! Guest count acquisition: markup extraction, realtime fallback channel
//! and the diagnostic raw capture

pub mod channel;
pub mod extractor;
pub mod raw_capture;

pub use channel::{ChannelClient, LiveSource};
pub use extractor::{extract, extract_uid, Extraction};
pub use raw_capture::RawCapture;
