//! Shared primitive types used across the entire game core.

/// Wall-clock instant in unix milliseconds.
pub type Timestamp = i64;

/// A span of time in milliseconds.
pub type DurationMs = i64;

/// Stable identifier handed out by the identity provider.
pub type UserId = String;

/// Identifier the Hub assigns to a pet at registration.
pub type RegenmonId = String;

/// Identity of one live snapshot. A fresh id is minted every time a pet
/// becomes live (start or load); late callbacks compare against it.
pub type SessionId = uuid::Uuid;
