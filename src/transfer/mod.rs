//! Simulated file transfer.
//!
//! - `engine`: route resolution, packet streaming, counters and progress
//! - `pacing`: per-packet delay and cancellation

pub mod engine;
pub mod pacing;

pub use engine::{
    SilentProgress, TransferEngine, TransferError, TransferProgress, TransferReport, TransferState,
    TransferStatus,
};
pub use pacing::{CancelToken, NoDelay, Pacer, ThreadPacer, DEFAULT_PACKET_DELAY};
