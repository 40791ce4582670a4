//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (carried in `GameState`)
//! - Stable iteration order (spawn order; removals scan back-to-front)
//! - No rendering or platform dependencies

pub mod boss;
pub mod collision;
pub mod entity;
pub mod jet;
pub mod spawn;
pub mod state;
pub mod tick;

pub use boss::{BossAttack, ChainGrab, ChainPhase, DraggedKind, Krampus, select_attack};
pub use collision::Aabb;
pub use entity::{Balloon, House, Landmark, LandmarkKind, Pickup, PickupKind, Wendigo};
pub use jet::{EliteJet, ElitePhase, FighterJet, JetPhase};
pub use state::{
    Biome, EncounterKind, GameEvent, GamePhase, GameState, Mode, Shield, Sleigh,
};
pub use tick::{TickInput, tick};
