//! # tilepath
//!
//! Tile-grid pathfinding and occupation management for an entity layer.
//!
//! - **Passability**: static map + per-request exclusions + other entities' occupation
//! - **Place finder**: nearest free cell around a requested target
//! - **Path planner**: 8-directional grid A* with corner-cutting prevention
//! - **Occupation tracker**: cells each entity currently reserves
//! - **Movement**: per-tick interpolation towards waypoints, re-planning on arrival
//!
//! Paths are ordered destination-first: the next waypoint is the last element.

pub mod command;
pub mod config;
pub mod entity;
pub mod grid;
pub mod movement;
pub mod occupation;
pub mod passability;
pub mod pathfinding;
pub mod place_finder;
pub mod world;

pub use command::{Command, CommandLog};
pub use config::{Config, ConfigSource};
pub use entity::{DrawBox, Entity, EntityClass, EntityDesc, EntityId, Motion, Step};
pub use grid::{Cell, Grid, MapPassability};
pub use occupation::OccupationTracker;
pub use passability::{Exclusion, Passability};
pub use pathfinding::{format_path, PathPlanner, Plan};
pub use place_finder::place_finder;
pub use world::World;

/// Core error type for tilepath
#[derive(thiserror::Error, Debug)]
pub enum TileError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Command log (de)serialization failed
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parsed but holds unusable values
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// No entity with this ID exists
    #[error("Unknown entity {0}")]
    UnknownEntity(EntityId),

    /// No entity description with this name was registered
    #[error("Entity description \"{0}\" not found")]
    UnknownEntityDesc(String),

    /// Cell lies outside the grid
    #[error("Cell ({x},{y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
}

/// Result type used throughout tilepath
pub type TileResult<T> = Result<T, TileError>;
