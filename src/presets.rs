use crate::error::ConfigError;
use crate::particle::ShapeKind;
use crate::settings::{
    BiasAxis, ClusterPattern, RenderMode, RenderSettings, SimulationSettings, SpawnRegion,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A named preset containing simulation and render settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub settings: SimulationSettings,
    #[serde(default)]
    pub render: RenderSettings,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            settings,
            render: RenderSettings::default(),
        }
    }

    pub fn with_render(mut self, render: RenderSettings) -> Self {
        self.render = render;
        self
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    /// Built-in presets plus user presets from the platform config directory
    pub fn new() -> Self {
        Self::with_dir(Self::default_dir())
    }

    /// Built-in presets plus user presets stored in `dir`
    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    /// Get the presets directory path
    fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dla-aggregation").join("presets"))
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Load user presets from disk, skipping unreadable files
    fn load_user_presets(&mut self) {
        let Some(dir) = &self.dir else {
            return;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<Preset>(&content).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(mut preset) => {
                    preset.settings.sanitize();
                    self.user.push(preset);
                }
                Err(err) => warn!(path = %path.display(), %err, "Skipping unreadable preset"),
            }
        }
        self.user.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Save a preset to disk, replacing any user preset with the same name
    pub fn save_preset(&mut self, preset: Preset) -> Result<PathBuf, ConfigError> {
        let dir = self.dir.clone().ok_or(ConfigError::NoConfigDir)?;

        fs::create_dir_all(&dir).map_err(|source| ConfigError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(format!("{}.json", file_stem(&preset.name)));
        let json = serde_json::to_string_pretty(&preset)?;
        fs::write(&path, json).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        match self.user.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.user.push(preset),
        }
        Ok(path)
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.all_presets().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Get preset names for display
    pub fn preset_names(&self) -> Vec<&str> {
        self.all_presets().map(|p| p.name.as_str()).collect()
    }
}

/// Sanitize a preset name into a file name
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn builtin_presets() -> Vec<Preset> {
    vec![
        // Basic - unbiased walkers onto the default wall
        Preset::new(
            "Basic",
            "Brownian walkers aggregating onto a central wall",
            SimulationSettings::default(),
        ),
        // Directional - sideways pull with partial sticking
        Preset::new(
            "Directional",
            "Walkers pulled toward a vertical wall, 60% sticking",
            SimulationSettings {
                bias_axis: BiasAxis::Meridian,
                bias_force: 1.0,
                stick_probability: 0.6,
                ..Default::default()
            },
        ),
        // Equator - vertical pull onto a horizontal wall
        Preset::new(
            "Equator",
            "Walkers fall toward a horizontal wall from above and below",
            SimulationSettings {
                bias_axis: BiasAxis::Equator,
                bias_force: 1.5,
                spawn_region: SpawnRegion::Edges,
                ..Default::default()
            },
        ),
        // Lines - draw the aggregation edges instead of bodies
        Preset::new(
            "Lines",
            "Captures every sticking event as a line segment",
            SimulationSettings {
                capture_lines: true,
                cluster_pattern: ClusterPattern::Center,
                max_walkers: 3000,
                ..Default::default()
            },
        )
        .with_render(RenderSettings {
            mode: RenderMode::Lines,
            show_walkers: false,
            ..RenderSettings::default()
        }),
        // Attractor - every walker steers toward the centre
        Preset::new(
            "Attractor",
            "Walkers pulled toward a single central seed",
            SimulationSettings {
                use_per_particle_bias: true,
                bias_force: 0.5,
                cluster_pattern: ClusterPattern::Center,
                prune_by_age: true,
                max_age: 3000,
                ..Default::default()
            },
        ),
        // Obstacle - growth around a static hexagon
        Preset::new(
            "Obstacle",
            "Static hexagon that captures every walker touching it",
            SimulationSettings {
                cluster_pattern: ClusterPattern::Obstacle,
                spawn_region: SpawnRegion::Edges,
                use_per_particle_bias: true,
                bias_force: 0.3,
                ..Default::default()
            },
        ),
        // Lattice - classic on-grid point DLA
        Preset::new(
            "Lattice",
            "Point walkers on the integer lattice around a single seed",
            SimulationSettings {
                walker_shape: ShapeKind::Point,
                cluster_pattern: ClusterPattern::Center,
                prune_by_distance: true,
                max_wander_distance: 300.0,
                ..Default::default()
            },
        ),
        // Polygons - rotated triangles
        Preset::new(
            "Polygons",
            "Randomly rotated triangles with edge spawning",
            SimulationSettings {
                walker_shape: ShapeKind::Polygon,
                polygon_sides: 3,
                particle_size: 4.0,
                spawn_region: SpawnRegion::Top,
                bias_axis: BiasAxis::Equator,
                ..Default::default()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_presets_are_valid() {
        let manager = PresetManager::with_dir(None);
        assert!(manager.builtin.len() >= 7);
        for preset in &manager.builtin {
            let mut sanitized = preset.settings.clone();
            sanitized.sanitize();
            assert_eq!(sanitized, preset.settings, "{} out of range", preset.name);
        }
        let directional = manager.find("directional").unwrap();
        assert_eq!(directional.settings.bias_axis, BiasAxis::Meridian);
        assert_eq!(directional.settings.stick_probability, 0.6);
        assert!(manager.find("missing").is_none());
    }

    #[test]
    fn test_save_without_directory_fails() {
        let mut manager = PresetManager::with_dir(None);
        let result = manager.save_preset(Preset::new("x", "", SimulationSettings::default()));
        assert!(matches!(result, Err(ConfigError::NoConfigDir)));
    }

    #[test]
    fn test_saved_presets_reload() {
        let dir = TempDir::new().unwrap();
        let mut manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        assert!(manager.user.is_empty());

        let preset = Preset::new(
            "My Run/1",
            "custom",
            SimulationSettings {
                stick_probability: 0.25,
                ..Default::default()
            },
        );
        let path = manager.save_preset(preset.clone()).unwrap();
        assert_eq!(path.file_name().unwrap(), "My_Run_1.json");

        // Saving again replaces rather than duplicates
        manager.save_preset(preset.clone()).unwrap();
        assert_eq!(manager.user.len(), 1);

        std::fs::write(dir.path().join("broken.json"), "{").unwrap();
        let reloaded = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        assert_eq!(reloaded.user, vec![preset]);
        assert!(reloaded.preset_names().contains(&"My Run/1"));
    }
}
