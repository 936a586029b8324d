pub mod recording;

pub use recording::{Recording, RecordingMeta};
