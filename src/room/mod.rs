//! Room layer: the async driver and the collaborators it talks to.

mod driver;
mod ledger;
mod transport;

pub use driver::{RoomHandle, RoomReport, RoomSignal, TournamentRoom, SIGNAL_BUFFER};
pub use ledger::{Ledger, LedgerError, MemoryLedger};
pub use transport::{MemoryTransport, RoomTransport};
