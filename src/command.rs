use crate::entity::EntityId;
use crate::grid::{Cell, MapPassability};
use crate::world::World;
use crate::TileResult;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// Commands the entity layer accepts from its surroundings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Spawn an undescribed movable entity on (x, y)
    Spawn { x: i32, y: i32 },
    /// Spawn an entity from a registered description
    SpawnDesc { name: String, x: i32, y: i32 },
    /// Select movables overlapping the rectangle (ax, ay)-(bx, by)
    Select { ax: f32, ay: f32, bx: f32, by: f32 },
    /// Send the current selection towards (x, y)
    MoveSelection { x: i32, y: i32 },
    /// Send a single entity towards (x, y)
    MoveEntity { id: EntityId, x: i32, y: i32 },
    /// Advance the simulation
    Tick { delta: f32 },
}

/// Logged command with timestamp
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggedCommand {
    /// Milliseconds since the log was started
    pub timestamp_ms: u64,
    pub command: Command,
}

impl<M: MapPassability> World<M> {
    /// Execute a single command
    pub fn apply(&mut self, command: &Command) -> TileResult<()> {
        match command {
            Command::Spawn { x, y } => {
                self.spawn_movable(Cell::new(*x, *y))?;
            }
            Command::SpawnDesc { name, x, y } => {
                self.add_entity_by_name(name, Cell::new(*x, *y))?;
            }
            Command::Select { ax, ay, bx, by } => {
                self.select_in_rect(*ax, *ay, *bx, *by);
            }
            Command::MoveSelection { x, y } => self.move_selection(*x, *y),
            Command::MoveEntity { id, x, y } => self.move_entity(*id, *x, *y)?,
            Command::Tick { delta } => self.tick(*delta),
        }
        Ok(())
    }
}

/// Command journal
pub struct CommandLog {
    start_time: Instant,
    commands: Vec<LoggedCommand>,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandLog {
    pub fn new() -> Self {
        CommandLog {
            start_time: Instant::now(),
            commands: Vec::new(),
        }
    }

    /// Log a command with the current timestamp
    pub fn log(&mut self, command: Command) {
        let timestamp_ms = self.start_time.elapsed().as_millis() as u64;
        self.commands.push(LoggedCommand {
            timestamp_ms,
            command,
        });
    }

    /// Apply a command to the world and log it if it succeeded
    pub fn execute<M: MapPassability>(&mut self, world: &mut World<M>, command: Command) -> TileResult<()> {
        world.apply(&command)?;
        self.log(command);
        Ok(())
    }

    /// Get all logged commands
    pub fn commands(&self) -> &[LoggedCommand] {
        &self.commands
    }

    /// Save log to JSON file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> TileResult<()> {
        let json = serde_json::to_string_pretty(&self.commands)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load log from JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> TileResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let commands: Vec<LoggedCommand> = serde_json::from_str(&json)?;
        Ok(CommandLog {
            start_time: Instant::now(),
            commands,
        })
    }

    /// Apply every logged command in order, stopping at the first failure
    pub fn replay<M: MapPassability>(&self, world: &mut World<M>) -> TileResult<()> {
        info!("replaying {} commands", self.commands.len());
        for logged in &self.commands {
            world.apply(&logged.command)?;
        }
        Ok(())
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let mut spawns = 0;
        let mut selections = 0;
        let mut moves = 0;
        let mut ticks = 0;
        let mut simulated = 0.0f32;

        for logged in &self.commands {
            match &logged.command {
                Command::Spawn { .. } | Command::SpawnDesc { .. } => spawns += 1,
                Command::Select { .. } => selections += 1,
                Command::MoveSelection { .. } | Command::MoveEntity { .. } => moves += 1,
                Command::Tick { delta } => {
                    ticks += 1;
                    simulated += delta;
                }
            }
        }

        let duration = self.commands.last().map(|c| c.timestamp_ms).unwrap_or(0);

        format!(
            "Session Duration: {}ms\n\
             Total Commands: {}\n\
             Entities: {} spawned, {} selections, {} move commands\n\
             Simulation: {} ticks ({:.2}s simulated)",
            duration,
            self.commands.len(),
            spawns,
            selections,
            moves,
            ticks,
            simulated
        )
    }
}
