use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use voxsim_world::SimulationSettings;

/// User settings, stored as YAML in the settings directory.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub simulate: SimulateParams,
}

/// Drives a headless run of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulateParams {
    pub ticks: u64,
    pub seed: u64,
    /// Direction the agent walks in for the whole run.
    pub walk: Vector3<f32>,
    pub jump: bool,
    /// Log a summary every this many ticks. Zero disables the periodic summary.
    pub log_every: u64,
    pub actions: Vec<ScriptedAction>,
}

/// Something the agent does at a given tick, aimed along `facing` from its eye.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptedAction {
    Place {
        tick: u64,
        /// Machine name of the block, e.g. `oak_sapling`.
        block: String,
        facing: Vector3<f32>,
    },
    Remove {
        tick: u64,
        facing: Vector3<f32>,
    },
}

impl ScriptedAction {
    pub fn tick(&self) -> u64 {
        match self {
            ScriptedAction::Place { tick, .. } | ScriptedAction::Remove { tick, .. } => *tick,
        }
    }
}

impl Default for SimulateParams {
    fn default() -> Self {
        SimulateParams {
            ticks: 4096,
            seed: 0,
            walk: Vector3::new(0.0, 0.0, 0.0),
            jump: false,
            log_every: 512,
            actions: vec![ScriptedAction::Place {
                tick: 0,
                block: "oak_sapling".into(),
                facing: Vector3::new(1.0, 2.0, 0.0),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_settings() {
        let yaml = r#"
simulation:
  fire_spread_chance: 16
simulate:
  ticks: 10
  actions:
    - kind: place
      tick: 3
      block: wheat_0
      facing: {x: 0.0, y: 1.0, z: 0.0}
    - kind: remove
      tick: 5
      facing: {x: 0.0, y: 1.0, z: 0.0}
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(settings.simulation.fire_spread_chance, 16);
        assert_eq!(
            settings.simulation.growth_8,
            SimulationSettings::default().growth_8
        );
        assert_eq!(settings.simulate.ticks, 10);
        assert_eq!(settings.simulate.log_every, 512);
        assert_eq!(settings.simulate.actions.len(), 2);
        assert_eq!(settings.simulate.actions[1].tick(), 5);
        assert_eq!(
            settings.simulate.actions[0],
            ScriptedAction::Place {
                tick: 3,
                block: "wheat_0".into(),
                facing: Vector3::new(0.0, 1.0, 0.0),
            }
        );
    }

    #[test]
    fn test_default_settings_round_trip() {
        let settings = Settings::default();
        let yaml = serde_yaml::to_string(&settings).unwrap();
        let parsed: Settings = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, settings);
    }
}
