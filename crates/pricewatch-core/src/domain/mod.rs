//! # Domain Models
//!
//! Types exchanged with the price service.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Asset`] | Supported crypto asset |
//! | [`LookupRequest`] | Validated price lookup input |
//! | [`LookupResult`] | Price, 24h change and local retrieval time |
//! | [`HistoryEntry`] | One past lookup reported by the server |
//! | [`UtcDateTime`] | UTC timestamp |

mod asset;
mod models;
mod timestamp;

pub use asset::Asset;
pub use models::{
    EntryId, EntryKey, HistoryEntry, LookupDecodeError, LookupRequest, LookupResult,
};
pub use timestamp::UtcDateTime;
