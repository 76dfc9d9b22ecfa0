//! Lookup and history orchestration.
//!
//! Both orchestrators follow the same pattern: issue a ticket (cancelling any
//! older call of the same action), mark the state `InFlight`, await the
//! executor, classify, and commit only if the ticket is still current.

mod history;
mod lifecycle;
mod lookup;

pub use history::{HistoryOrchestrator, HistorySnapshot, HISTORY_PATH};
pub use lifecycle::RequestLifecycleState;
pub use lookup::{LookupOrchestrator, LookupSnapshot, PRICE_PATH};
