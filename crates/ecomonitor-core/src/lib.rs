//! # EcoMonitor Core Library
//!
//! Session gate and engagement core for the EcoMonitor app. Every operation
//! is available through the standalone CLI binary; screens are a thin layer
//! over the same library.
//!
//! ## Architecture
//!
//! - **Storage**: an async key-value seam ([`KeyValueStore`]) with SQLite,
//!   OS keyring and in-memory backends, plus TOML configuration
//! - **Streak**: once-per-day check-in counter with tiers and badges
//! - **Session / Quota**: guest vs. account identity and the free-use gate
//! - **Biometric**: hardware auth seam and the per-mount unlock gate
//! - **Score**: pure engagement score for the home screen
//!
//! ## Key Components
//!
//! - [`StreakEngine`]: daily streak bookkeeping
//! - [`SessionContext`]: explicit auth context shared by gated features
//! - [`UnlockGate`]: biometric unlock state machine
//! - [`Config`]: application configuration management

pub mod biometric;
pub mod clock;
pub mod error;
pub mod quota;
pub mod score;
pub mod session;
pub mod storage;
pub mod streak;

pub use biometric::{
    biometric_kind, is_biometric_lock_enabled, set_biometric_lock, ChallengeOutcome, ChallengePrompt,
    GateView, HardwareAuth, MountId, UnlockGate, UnlockState,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AuthError, ConfigError, CoreError, Result, StoreError};
pub use quota::{feature_access, run_gated, FeatureAccess, GatedError, GUEST_USAGE_LIMIT};
pub use score::{score, ConfidenceLevel, EngagementInputs, ScoreBand};
pub use session::{Identity, SessionContext, SessionSnapshot, SubscriptionStatus};
pub use storage::{open_store, Config, KeyValueStore, KeyringStore, MemoryStore, SqliteStore};
pub use streak::{StreakBadge, StreakEngine, StreakRecord, StreakTier};
