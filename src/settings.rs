//! World settings - Save/load match config as JSON

use bevy::log::warn;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_VIEWPORT, QUADTREE_CAPACITY};
use crate::map::MapSize;

/// Match setup chosen before play starts. Saved to `Documents/Empires/settings.json`.
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorldSettings {
    // World gen
    #[serde(default)]
    pub map_size: MapSize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_villagers")]
    pub villagers: usize,
    #[serde(default = "default_resources")]
    pub resources: usize,
    #[serde(default = "default_houses")]
    pub houses: usize,
    // Index tuning
    #[serde(default = "default_capacity")]
    pub quadtree_capacity: usize,
    // Viewport (world units)
    #[serde(default = "default_viewport")]
    pub viewport: (i32, i32),
    // Headless runner: frames to simulate before exiting (0 = run forever)
    #[serde(default = "default_frames")]
    pub frames: u64,
}

fn default_seed() -> u64 { 1 }
fn default_villagers() -> usize { 3 }
fn default_resources() -> usize { 40 }
fn default_houses() -> usize { 2 }
fn default_capacity() -> usize { QUADTREE_CAPACITY }
fn default_viewport() -> (i32, i32) { DEFAULT_VIEWPORT }
fn default_frames() -> u64 { 600 }

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            map_size: MapSize::default(),
            seed: default_seed(),
            villagers: default_villagers(),
            resources: default_resources(),
            houses: default_houses(),
            quadtree_capacity: default_capacity(),
            viewport: default_viewport(),
            frames: default_frames(),
        }
    }
}

fn settings_path() -> Option<PathBuf> {
    let home = std::env::var("USERPROFILE")
        .or_else(|_| std::env::var("HOME"))
        .ok()?;
    let dir = PathBuf::from(home).join("Documents").join("Empires");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join("settings.json"))
}

pub fn save_settings_to(settings: &WorldSettings, path: &Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("serialize settings: {}", e))?;
    std::fs::write(path, json).map_err(|e| format!("write {}: {}", path.display(), e))
}

pub fn load_settings_from(path: &Path) -> Result<WorldSettings, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("read {}: {}", path.display(), e))?;
    serde_json::from_str(&json).map_err(|e| format!("parse {}: {}", path.display(), e))
}

pub fn save_settings(settings: &WorldSettings) {
    let Some(path) = settings_path() else { return };
    if let Err(e) = save_settings_to(settings, &path) {
        warn!("Failed to save settings: {}", e);
    }
}

/// Settings from the user's documents folder, or defaults if missing/corrupt.
pub fn load_settings() -> WorldSettings {
    let Some(path) = settings_path() else { return WorldSettings::default() };
    if !path.exists() {
        return WorldSettings::default();
    }
    load_settings_from(&path).unwrap_or_else(|e| {
        warn!("Failed to load settings, using defaults: {}", e);
        WorldSettings::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = WorldSettings {
            map_size: MapSize::Large,
            seed: 99,
            villagers: 12,
            ..Default::default()
        };
        save_settings_to(&settings, &path).unwrap();
        assert_eq!(load_settings_from(&path).unwrap(), settings);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "map_size": "huge", "villagers": 1 }"#).unwrap();
        let s = load_settings_from(&path).unwrap();
        assert_eq!(s.map_size, MapSize::Huge);
        assert_eq!(s.villagers, 1);
        assert_eq!(s.quadtree_capacity, QUADTREE_CAPACITY);
        assert_eq!(s.viewport, DEFAULT_VIEWPORT);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_settings_from(&path).is_err());
        assert!(load_settings_from(&dir.path().join("missing.json")).is_err());
    }
}
