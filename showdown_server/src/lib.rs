pub mod cards;
pub mod config;
pub mod distributor;
pub mod pot;
pub mod reveal;
pub mod room;
pub mod selector;
pub mod showdown;
pub mod variant;

pub use config::EngineConfig;
pub use room::{Room, RoomRegistry};
pub use showdown::ShowdownEngine;
pub use variant::{UnknownVariantPolicy, VariantConfig, VariantRegistry};
