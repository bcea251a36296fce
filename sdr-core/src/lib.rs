//! Engagement lifecycle and aggregation core for the SDR dashboard.
//!
//! Prospects, outbound/inbound email and meeting-recording sessions each live
//! with a different external collaborator. The managers here track the local
//! view of each stream, gate side effects on session and account state, and
//! [`aggregation`] derives the dashboard statistics from borrowed snapshots.

pub mod account;
pub mod aggregation;
pub mod cache;
pub mod calendar;
pub mod emails;
pub mod engine;
pub mod error;
pub mod fence;
pub mod gateway;
pub mod meetings;
pub mod prospects;
pub mod storage;

#[cfg(test)]
mod testing;

pub use account::AccountLink;
pub use cache::EngagementCache;
pub use calendar::CalendarGateway;
pub use emails::{EmailLifecycleManager, ReplySync};
pub use engine::{CoreOptions, EngagementCore};
pub use error::{EngagementError, Result};
pub use fence::RequestFence;
pub use gateway::{HttpServiceGateway, ServiceGateway, Session};
pub use meetings::{meeting_detail, MeetingBotOrchestrator, RefreshOutcome};
pub use prospects::{DiscoveryOutcome, ProspectDiff, ProspectFilter, ProspectStore};
pub use storage::{KeyValueStore, RedisKvStore, SqliteKvStore};
