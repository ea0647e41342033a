//! # Dojotrack Core Library
//!
//! This library provides the core business logic for Dojotrack, a training
//! attendance tracker for martial-arts gyms. It implements a CLI-first
//! philosophy where all operations are available via a standalone CLI binary,
//! with any graphical frontend being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Check-in**: A cooldown-gated check-in policy plus a transactional
//!   service that applies accepted check-ins to storage atomically
//! - **Progression**: Pure belt/tier math deriving promotion decisions from
//!   cumulative training counts
//! - **Storage**: SQLite-based member and attendance storage, TOML-based
//!   configuration
//! - **Stats**: Monthly and all-time attendance summaries for dashboards
//!
//! ## Key Components
//!
//! - [`CheckInPolicy`]: Cooldown gate and counter/rank update computation
//! - [`CheckInService`]: Atomic read-evaluate-persist check-in flow
//! - [`Belt`]: Rank state machine (white through black, black terminal)
//! - [`Database`]: Member and attendance persistence
//! - [`Config`]: Application configuration management

pub mod attendance;
pub mod checkin;
pub mod error;
pub mod events;
pub mod member;
pub mod progression;
pub mod stats;
pub mod storage;

pub use attendance::AttendanceRecord;
pub use checkin::{CheckInOutcome, CheckInPolicy, CheckInReceipt, CheckInService, CheckInUpdate};
pub use error::{CheckInError, ConfigError, CoreError, DatabaseError};
pub use events::Event;
pub use member::Member;
pub use progression::{Belt, Promotion, RankProgress};
pub use stats::{AttendanceStats, BeltCount, MonthStats};
pub use storage::{Config, Database};
