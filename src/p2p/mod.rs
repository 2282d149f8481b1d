pub mod message;
pub mod peers;
pub mod reconcile;
pub mod server;

pub use message::Message;
pub use peers::{PeerId, PeerSet};
pub use reconcile::{Reconciliation, reconcile};

/// Messages buffered per peer before further sends to it are dropped.
pub const OUTBOUND_QUEUE_SIZE: usize = 256;
