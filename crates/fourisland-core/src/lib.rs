//! Four Island Core - Game Session Engine
//!
//! The stateful half of the game: egg incubation, daycare breeding,
//! offline catch-up, and a key-value save layer, all driven by explicit
//! timestamps so the whole game can run under a virtual clock.
//!
//! # Architecture
//!
//! Pure rules (genetics, filters, odds) live in `fourisland-logic`; this
//! crate owns everything with state or I/O:
//! - **GameSession**: the single owner of game state, RNG, and the save
//!   store; every player-facing operation is a method with write-through
//!   persistence
//! - **Engines**: incubation and daycare logic as free functions over the
//!   session state
//! - **Scheduler**: next-due bookkeeping for the periodic drivers behind
//!   an injectable [`scheduler::Clock`]
//! - **Persistence**: the camelCase key-value save layout, with tolerant
//!   per-key loading and a base64 export/import codec
//!
//! # Example
//!
//! ```rust,no_run
//! use fourisland_core::prelude::*;
//!
//! let species = SpeciesTable::default();
//! let store = MemoryStore::new();
//! let mut session = GameSession::load(store, species, SessionConfig::default());
//!
//! let clock = SystemClock;
//! session.resume(clock.now_ms());
//! let mut scheduler = Scheduler::new(&session, &clock);
//!
//! // Host loop
//! loop {
//!     scheduler.run_due(&mut session, &clock);
//! }
//! ```

pub mod session;
pub mod incubator;
pub mod daycare;
pub mod scheduler;
pub mod persistence;
pub mod transfer;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::persistence::{FileStore, KvStore, MemoryStore};
    pub use crate::scheduler::{Clock, Scheduler, SystemClock, VirtualClock};
    pub use crate::session::{EggSource, GameSession, Notifier, SessionConfig};
    pub use fourisland_logic::species::SpeciesTable;
}
