//! Episodic memory: buffer, consolidation and the replicated log.
//!
//! - [`MemoryBuffer`]: bounded FIFO buffer of recent salient events
//! - [`MemoryCrystallizer`]: long-term consolidation into crystals
//! - [`MemoryLog`]: grow-only CRDT replicated across trusted peers

mod buffer;
mod crystallizer;
mod entry;
mod log;

pub use buffer::{MemoryBuffer, RecallFilter, DEFAULT_CAPACITY};
pub use crystallizer::{CrystallizerConfig, MemoryCrystal, MemoryCrystallizer};
pub use entry::{Memory, MemoryContent, MemoryKind, MemorySubject, DEFAULT_SALIENCE};
pub use log::{LogRecord, MemoryLog, MergeOutcome};
