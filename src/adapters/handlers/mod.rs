//! Payment event handler adapters.

mod logging;
mod recording;

pub use logging::LoggingEventHandler;
pub use recording::{HandledEvent, RecordingEventHandler};
