use crate::entity::{DrawBox, EntityDesc};
use crate::grid::{Cell, Grid};
use crate::place_finder::check_place_radius;
use crate::{TileError, TileResult};
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Entity descriptions, one `[[entity]]` table each
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntityDesc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_cols")]
    pub cols: i32,
    #[serde(default = "default_rows")]
    pub rows: i32,
    /// Statically blocked cells as `[x, y]` pairs
    #[serde(default)]
    pub blocked: Vec<[i32; 2]>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovementConfig {
    /// Grid units per second
    #[serde(default = "default_speed")]
    pub speed: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// How far around a requested target a free cell is looked for
    #[serde(default = "default_place_radius")]
    pub place_radius: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    /// Draw box for entities spawned without a description
    #[serde(default)]
    pub default_draw_box: DrawBox,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_command_log_path")]
    pub command_log_path: String,
}

// Default values
fn default_cols() -> i32 { 100 }
fn default_rows() -> i32 { 100 }
fn default_speed() -> f32 { 2.0 }
fn default_place_radius() -> f32 { crate::place_finder::DEFAULT_PLACE_RADIUS }
fn default_log_level() -> String { "info".to_string() }
fn default_command_log_path() -> String { "commands.json".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: default_cols(),
            rows: default_rows(),
            blocked: Vec::new(),
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            place_radius: default_place_radius(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_draw_box: DrawBox::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            command_log_path: default_command_log_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            movement: MovementConfig::default(),
            search: SearchConfig::default(),
            selection: SelectionConfig::default(),
            logging: LoggingConfig::default(),
            entities: Vec::new(),
        }
    }
}

/// What was found when looking for a configuration file
///
/// Lets a caller read the log level before the logger exists and report the
/// outcome afterwards.
#[derive(Debug)]
pub enum ConfigSource {
    Loaded(Config),
    Missing,
    Invalid(TileError),
}

impl ConfigSource {
    /// Look for a configuration file without logging anything
    pub fn probe(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return ConfigSource::Missing;
        }
        match Config::load(path) {
            Ok(config) => ConfigSource::Loaded(config),
            Err(e) => ConfigSource::Invalid(e),
        }
    }

    /// Log level to start the logger with
    pub fn log_level(&self) -> String {
        match self {
            ConfigSource::Loaded(config) => config.logging.level.clone(),
            _ => default_log_level(),
        }
    }

    /// Report how the configuration was obtained, falling back to defaults
    pub fn resolve(self, path: &Path) -> Config {
        match self {
            ConfigSource::Loaded(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            ConfigSource::Missing => {
                info!("No {} found, using default configuration", path.display());
                Config::default()
            }
            ConfigSource::Invalid(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                warn!("Using default configuration");
                Config::default()
            }
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> TileResult<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> TileResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Load configuration from file, or use defaults if it is missing or broken
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        ConfigSource::probe(path).resolve(path)
    }

    /// Reject values the planner cannot work with
    pub fn validate(&self) -> TileResult<()> {
        if self.grid.cols <= 0 || self.grid.rows <= 0 {
            return Err(TileError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.cols, self.grid.rows
            )));
        }
        if !(self.movement.speed > 0.0) {
            return Err(TileError::InvalidConfig(format!(
                "movement speed must be positive, got {}",
                self.movement.speed
            )));
        }
        check_place_radius(self.search.place_radius, self.grid.cols, self.grid.rows)?;
        for [x, y] in &self.grid.blocked {
            if *x < 0 || *x >= self.grid.cols || *y < 0 || *y >= self.grid.rows {
                return Err(TileError::OutOfBounds { x: *x, y: *y });
            }
        }
        Ok(())
    }

    /// Build the static map described by the `[grid]` section
    pub fn build_grid(&self) -> Grid {
        let blocked: Vec<Cell> = self
            .grid
            .blocked
            .iter()
            .map(|[x, y]| Cell::new(*x, *y))
            .collect();
        Grid::with_blocked(self.grid.rows, self.grid.cols, &blocked)
    }
}
