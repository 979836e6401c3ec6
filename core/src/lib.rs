//! Regenmon core: a virtual pet that hatches, grows, decays and dies on a
//! wall clock, optionally linked to a shared Hub of other players' pets.
//!
//! Pure transforms (`decay`, `action`, `reconcile`) never touch I/O. The
//! `controller` sequences them and owns every collaborator call.

pub mod action;
pub mod clock;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod decay;
pub mod error;
pub mod evaluator;
pub mod event;
pub mod hub;
pub mod persistence;
pub mod progress;
pub mod reconcile;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod types;

pub use controller::{ActionStatus, LifecycleController, Phase};
pub use error::{PetError, PetResult};
