pub mod ai;
pub mod combat;
pub mod config;
pub mod data;
pub mod ecs;
pub mod error;
pub mod map;
pub mod player;
pub mod progression;
pub mod quest;
pub mod scripted_input;
pub mod session;
pub mod town;

pub use config::GameConfig;
pub use error::{GameError, Refusal};
pub use player::PlayerState;
pub use session::{DungeonSession, SceneTransition, TurnOutcome};
