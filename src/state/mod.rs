//! Presentation state for notevox.
//!
//! A single immutable snapshot, advanced only by the pure reducer in
//! response to discrete events. Capture and pipeline components never
//! touch it directly.

pub mod reducer;

pub use reducer::{AppEvent, AppState, LifecycleStatus, reduce};
