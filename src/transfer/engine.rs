//! Simulated packet transfer.
//!
//! A transfer resolves the shortest route between two nodes, then streams
//! the source node's content to the destination node packet by packet. Each
//! delivered packet is appended to the destination, counted once on both
//! endpoints and reported to the progress observer before the pacing delay.
//!
//! An aborted or cancelled transfer keeps whatever prefix was already
//! appended; nothing is rolled back.

use std::io::{self, Cursor, Read, Write};
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;

use super::pacing::{CancelToken, Pacer, ThreadPacer, DEFAULT_PACKET_DELAY};
use crate::content::{ChunkReader, ContentError, ContentStore, DEFAULT_PACKET_SIZE};
use crate::routing::{shortest_path, Route, RoutingError};
use crate::topology::{NodeId, Topology};

/// Lifecycle of a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransferState {
    Idle,
    RouteResolved,
    Transferring,
    Completed,
    Aborted,
}

/// How a transfer that did not fail came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransferStatus {
    /// The source content was fully delivered
    Completed,
    /// The cancel token was set; only a prefix was delivered
    Cancelled,
}

/// Summary of a finished transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    pub from: NodeId,
    pub to: NodeId,
    pub route: Route,
    pub packets: u64,
    pub bytes: u64,
    pub status: TransferStatus,
}

/// Errors that abort a transfer
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error(transparent)]
    Routing(RoutingError),

    #[error("No path exists between {from} and {to}. Transfer aborted.")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("Source content of computer {id} is unavailable")]
    SourceUnavailable {
        id: NodeId,
        #[source]
        source: ContentError,
    },

    #[error("Destination content of computer {id} is unavailable")]
    DestinationUnavailable {
        id: NodeId,
        #[source]
        source: ContentError,
    },

    #[error("Transfer from {from} to {to} failed after {delivered} packets")]
    Io {
        from: NodeId,
        to: NodeId,
        delivered: u64,
        #[source]
        source: io::Error,
    },
}

/// Observer of transfer progress.
///
/// All methods default to doing nothing.
pub trait TransferProgress {
    fn on_state(&mut self, _state: TransferState) {}

    fn on_route(&mut self, _route: &Route) {}

    /// Called once per delivered packet; `sequence` starts at 1
    fn on_packet(&mut self, _sequence: u64, _data: &[u8]) {}
}

/// Progress observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl TransferProgress for SilentProgress {}

/// Runs transfers one at a time.
///
/// `transfer` borrows the engine and the topology mutably for its whole
/// duration, so no second transfer and no topology mutation can start
/// while one is in flight.
pub struct TransferEngine<P = ThreadPacer> {
    packet_size: usize,
    packet_delay: Duration,
    pacer: P,
    cancel: CancelToken,
    state: TransferState,
}

impl Default for TransferEngine<ThreadPacer> {
    fn default() -> Self {
        Self::new(DEFAULT_PACKET_SIZE, DEFAULT_PACKET_DELAY)
    }
}

impl TransferEngine<ThreadPacer> {
    /// Engine that sleeps `packet_delay` after every packet
    pub fn new(packet_size: usize, packet_delay: Duration) -> Self {
        Self::with_pacer(packet_size, packet_delay, ThreadPacer)
    }
}

impl<P: Pacer> TransferEngine<P> {
    pub fn with_pacer(packet_size: usize, packet_delay: Duration, pacer: P) -> Self {
        Self {
            packet_size: packet_size.max(1),
            packet_delay,
            pacer,
            cancel: CancelToken::new(),
            state: TransferState::Idle,
        }
    }

    /// Share an externally owned cancel token
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the running (and any later) transfer when cancelled
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn packet_size(&self) -> usize {
        self.packet_size
    }

    pub fn packet_delay(&self) -> Duration {
        self.packet_delay
    }

    /// State reached by the most recent transfer
    pub fn state(&self) -> TransferState {
        self.state
    }

    fn enter(&mut self, state: TransferState, progress: &mut dyn TransferProgress) {
        self.state = state;
        progress.on_state(state);
    }

    fn abort(&mut self, error: TransferError, progress: &mut dyn TransferProgress) -> TransferError {
        warn!("{}", error);
        self.enter(TransferState::Aborted, progress);
        error
    }

    /// Copy the content of `from` onto the end of the content of `to`.
    ///
    /// Counters are only touched for packets that were actually appended.
    /// When `from == to` the source is read as it was when the transfer
    /// started, so a node can be copied onto itself.
    pub fn transfer<S>(
        &mut self,
        topology: &mut Topology,
        store: &mut S,
        from: NodeId,
        to: NodeId,
        progress: &mut dyn TransferProgress,
    ) -> Result<TransferReport, TransferError>
    where
        S: ContentStore + ?Sized,
    {
        self.enter(TransferState::Idle, progress);

        let route = match shortest_path(topology, from, to) {
            Ok(route) => route,
            Err(RoutingError::NoPath { .. }) => {
                return Err(self.abort(TransferError::NoRoute { from, to }, progress));
            }
            Err(e) => return Err(self.abort(TransferError::Routing(e), progress)),
        };
        info!("Shortest path: {} ({}ms)", route, route.total_weight);
        progress.on_route(&route);
        self.enter(TransferState::RouteResolved, progress);

        let source = match self.open_source(store, from, to) {
            Ok(source) => source,
            Err(e) => return Err(self.abort(e, progress)),
        };
        let mut chunks = ChunkReader::new(source, self.packet_size);
        let mut sink = match store.open_for_append(to) {
            Ok(sink) => sink,
            Err(source) => {
                drop(chunks);
                return Err(self.abort(TransferError::DestinationUnavailable { id: to, source }, progress));
            }
        };
        self.enter(TransferState::Transferring, progress);
        let running = self.cancel.start_running();

        let mut packets = 0u64;
        let mut bytes = 0u64;
        let mut status = TransferStatus::Completed;
        let outcome = loop {
            if self.cancel.is_cancelled() {
                info!("Transfer {} -> {} cancelled after {} packets", from, to, packets);
                status = TransferStatus::Cancelled;
                break Ok(());
            }
            let chunk = match chunks.next_chunk() {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break sink.flush(),
                Err(e) => break Err(e),
            };
            if let Err(e) = sink.write_all(&chunk) {
                break Err(e);
            }
            topology.counters_mut().record_packet(from, to);
            packets += 1;
            bytes += chunk.len() as u64;
            debug!("Packet {} sent: {:?}", packets, String::from_utf8_lossy(&chunk));
            progress.on_packet(packets, &chunk);
            self.pacer.pause(self.packet_delay);
        };
        drop(sink);
        drop(chunks);
        drop(running);

        if let Err(source) = outcome {
            return Err(self.abort(
                TransferError::Io {
                    from,
                    to,
                    delivered: packets,
                    source,
                },
                progress,
            ));
        }

        let final_state = match status {
            TransferStatus::Completed => TransferState::Completed,
            TransferStatus::Cancelled => TransferState::Aborted,
        };
        self.enter(final_state, progress);
        info!("Data transfer {} -> {} finished: {} packets, {} bytes", from, to, packets, bytes);

        Ok(TransferReport {
            from,
            to,
            route,
            packets,
            bytes,
            status,
        })
    }

    fn open_source<S>(&self, store: &S, from: NodeId, to: NodeId) -> Result<Box<dyn Read>, TransferError>
    where
        S: ContentStore + ?Sized,
    {
        let unavailable = |source| TransferError::SourceUnavailable { id: from, source };
        if from != to {
            return store.open_for_read(from).map_err(unavailable);
        }
        let snapshot = store.read_all(from).map_err(unavailable)?;
        Ok(Box::new(Cursor::new(snapshot)))
    }
}
