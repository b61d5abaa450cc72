pub mod chat;
pub mod embedding;
pub mod index;
pub mod llm;
pub mod plex;
pub mod recommendations;
pub mod reference;
pub mod sessions;

pub use chat::{ChatEngine, TurnOutcome};
pub use sessions::SessionStore;
