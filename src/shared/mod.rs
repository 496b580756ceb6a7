//! Types shared with the input and presentation layers.
//!
//! The input layer talks to the world through [`Command`]s; the renderer
//! reads [`WorldSnapshot`]s.

pub mod commands;
pub mod snapshot;

pub use commands::Command;
pub use snapshot::{BotView, FoodView, ObstacleView, PowerUpView, PredatorView, WorldSnapshot};
