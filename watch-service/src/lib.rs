pub mod lifecycle;
pub mod matcher;
pub mod notifier;
pub mod processor;

pub use lifecycle::{shutdown_signal, spawn_signal_listener, PROCESS_NAME};
pub use matcher::{matches, matching_entries};
pub use notifier::{detection_event, Notifier, PERMALINK_BASE};
pub use processor::{ProcessorOptions, ProcessorState, ProcessorStats, RunOutcome, StreamProcessor};
