//! Configuration for the haptic effects demo.
//!
//! A [`DemoConfig`] describes the window, camera, light, tool, device, and
//! the scene objects with their haptic effects and custom force behaviors.
//! Configs are plain JSON; [`DemoConfig::default`] reproduces the stock
//! demo scene of four spheres.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::effects::EffectKind;
use crate::error::ConfigError;

/// A material parameter that is either absolute or relative to a device limit.
///
/// In JSON: `{"absolute": 0.1}` or `{"of_max": 0.9}`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    /// Used as is.
    Absolute(f64),
    /// Multiplied by the matching device limit.
    OfMax(f64),
}

impl Scalar {
    /// Resolve against the device limit for this parameter.
    pub fn resolve(self, max: f64) -> f64 {
        match self {
            Scalar::Absolute(v) => v,
            Scalar::OfMax(fraction) => fraction * max,
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Absolute(0.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub fullscreen: bool,
    /// Flip the rendered image vertically.
    pub mirrored: bool,
    pub vsync: bool,
    /// Multisample count, 1 or 4.
    pub msaa_samples: u32,
    pub background: [f32; 3],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Haptic Effects".into(),
            fullscreen: false,
            mirrored: false,
            vsync: true,
            msaa_samples: 4,
            background: [1.0, 1.0, 1.0],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    pub near: f32,
    pub far: f32,
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [3.0, 0.0, 0.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 0.0, 1.0],
            near: 0.01,
            far: 10.0,
            fov_deg: 45.0,
        }
    }
}

/// Spot light illuminating the scene.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub direction: [f32; 3],
    /// Half angle of the light cone.
    pub cutoff_deg: f32,
    pub ambient: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [1.0, 1.0, 1.0],
            direction: [-1.0, -1.0, -1.0],
            cutoff_deg: 60.0,
            ambient: 0.35,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    pub radius: f64,
    /// Radius of the virtual workspace the device workspace is mapped onto.
    pub workspace_radius: f64,
    /// Withhold forces until a small force is first computed.
    pub wait_for_small_force: bool,
    pub color: [f32; 3],
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            radius: 0.03,
            workspace_radius: 1.0,
            wait_for_small_force: true,
            color: [0.9, 0.5, 0.1],
        }
    }
}

/// Specification and hand model of the simulated device.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    pub model_name: String,
    /// N
    pub max_linear_force: f64,
    /// N/m
    pub max_linear_stiffness: f64,
    /// N.s/m
    pub max_linear_damping: f64,
    /// m
    pub workspace_radius: f64,
    /// kg
    pub handle_mass: f64,
    /// Spring pulling the handle toward the hand target, N/m.
    pub hand_stiffness: f64,
    /// N.s/m
    pub hand_damping: f64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            model_name: "virtual".into(),
            max_linear_force: 12.0,
            max_linear_stiffness: 2000.0,
            max_linear_damping: 20.0,
            workspace_radius: 0.05,
            handle_mass: 0.2,
            hand_stiffness: 400.0,
            hand_damping: 8.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HapticsConfig {
    /// Seconds per haptic tick.
    pub time_step: f64,
    /// Upper bound on the device force used to scale materials, N.
    pub force_cap: f64,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            time_step: 0.001,
            force_cap: 7.0,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaterialConfig {
    pub stiffness: Scalar,
    pub viscosity: Scalar,
    pub magnet_max_force: Scalar,
    pub magnet_max_distance: f64,
    pub stick_slip_force_max: Scalar,
    pub stick_slip_stiffness: Scalar,
    /// Hz
    pub vibration_frequency: f64,
    pub vibration_amplitude: Scalar,
    pub color: Option<[f32; 3]>,
}

/// A sphere in the scene.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ObjectConfig {
    pub name: String,
    pub radius: f64,
    pub position: [f64; 3],
    /// Objects outside the world are neither drawn nor felt.
    #[serde(default = "default_true")]
    pub in_world: bool,
    #[serde(default)]
    pub material: MaterialConfig,
    #[serde(default)]
    pub effects: Vec<EffectKind>,
    /// Spherical environment map for the surface.
    #[serde(default)]
    pub texture: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

/// A hand-tuned force behavior attached to one object.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviorConfig {
    /// Add a velocity-proportional force and amplify the total near the object.
    ViscousBoost {
        target: String,
        gain: f64,
        scale: f64,
        margin: f64,
    },
    /// Time-driven oscillating force while the tool is near the object.
    Oscillation {
        target: String,
        frequency: f64,
        amplitude: f64,
        margin: f64,
        hysteresis: f64,
    },
    /// The object is a point mass pushed by the tool force, returning home
    /// when it drifts too far.
    SpringMass {
        target: String,
        mass: f64,
        damping: f64,
        margin: f64,
        force_scale: f64,
        velocity_decay: f64,
        max_travel: f64,
    },
}

impl BehaviorConfig {
    /// Name of the object this behavior is attached to.
    pub fn target(&self) -> &str {
        match self {
            BehaviorConfig::ViscousBoost { target, .. }
            | BehaviorConfig::Oscillation { target, .. }
            | BehaviorConfig::SpringMass { target, .. } => target,
        }
    }
}

/// Complete configuration of the demo.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub tool: ToolConfig,
    pub device: DeviceConfig,
    pub haptics: HapticsConfig,
    pub objects: Vec<ObjectConfig>,
    /// Applied in order after the effect forces, every haptic tick.
    pub behaviors: Vec<BehaviorConfig>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        let magnet = ObjectConfig {
            name: "magnet".into(),
            radius: 0.5,
            position: [0.0, -1.2, 0.0],
            in_world: true,
            material: MaterialConfig::default(),
            effects: vec![EffectKind::Surface],
            texture: None,
        };

        let fluid = ObjectConfig {
            name: "fluid".into(),
            radius: 0.3,
            position: [0.0, 0.0, 0.0],
            in_world: false,
            material: MaterialConfig {
                viscosity: Scalar::OfMax(0.9),
                ..Default::default()
            },
            effects: vec![EffectKind::Viscosity],
            texture: None,
        };

        let stick_slip = ObjectConfig {
            name: "stick_slip".into(),
            radius: 0.3,
            position: [0.0, 1.0, 0.0],
            in_world: true,
            material: MaterialConfig {
                stick_slip_force_max: Scalar::OfMax(0.2),
                stick_slip_stiffness: Scalar::OfMax(0.6),
                ..Default::default()
            },
            effects: vec![EffectKind::StickSlip],
            texture: None,
        };

        let vibrations = ObjectConfig {
            name: "vibrations".into(),
            radius: 0.5,
            position: [0.0, 0.0, 0.0],
            in_world: true,
            material: MaterialConfig {
                vibration_frequency: 60.0,
                vibration_amplitude: Scalar::OfMax(0.5),
                stiffness: Scalar::Absolute(0.1),
                ..Default::default()
            },
            effects: vec![EffectKind::Vibration, EffectKind::Surface, EffectKind::Viscosity],
            texture: None,
        };

        let behaviors = vec![
            BehaviorConfig::ViscousBoost {
                target: "magnet".into(),
                gain: 0.1,
                scale: 4.0,
                margin: 0.05,
            },
            BehaviorConfig::Oscillation {
                target: "vibrations".into(),
                frequency: 6.0,
                amplitude: 6.0,
                margin: 0.05,
                hysteresis: 2.0,
            },
            BehaviorConfig::SpringMass {
                target: "stick_slip".into(),
                mass: 0.5,
                damping: 0.0,
                margin: 0.03,
                force_scale: 10.0,
                velocity_decay: 0.999,
                max_travel: 1.0,
            },
        ];

        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            tool: ToolConfig::default(),
            device: DeviceConfig::default(),
            haptics: HapticsConfig::default(),
            objects: vec![magnet, fluid, stick_slip, vibrations],
            behaviors,
        }
    }
}

impl DemoConfig {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DemoConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Index of the object with the given name.
    pub fn object_index(&self, name: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.name == name)
    }

    /// Check ranges and cross references.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !(self.haptics.time_step > 0.0 && self.haptics.time_step <= 0.1) {
            return invalid(format!(
                "haptics.time_step must be in (0, 0.1], got {}",
                self.haptics.time_step
            ));
        }
        if !is_positive(self.haptics.force_cap) {
            return invalid("haptics.force_cap must be positive".into());
        }
        if !matches!(self.window.msaa_samples, 1 | 4) {
            return invalid(format!(
                "window.msaa_samples must be 1 or 4, got {}",
                self.window.msaa_samples
            ));
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return invalid("camera clipping planes must satisfy 0 < near < far".into());
        }
        if !is_positive(self.tool.radius) || !is_positive(self.tool.workspace_radius) {
            return invalid("tool radius and workspace radius must be positive".into());
        }

        let device = &self.device;
        let device_limits = [
            ("max_linear_force", device.max_linear_force),
            ("max_linear_stiffness", device.max_linear_stiffness),
            ("max_linear_damping", device.max_linear_damping),
            ("workspace_radius", device.workspace_radius),
            ("handle_mass", device.handle_mass),
            ("hand_stiffness", device.hand_stiffness),
            ("hand_damping", device.hand_damping),
        ];
        for (field, value) in device_limits {
            if !is_positive(value) {
                return invalid(format!("device.{} must be positive, got {}", field, value));
            }
        }

        let mut names = HashSet::new();
        for object in &self.objects {
            if !is_positive(object.radius) {
                return invalid(format!("object '{}' has non-positive radius", object.name));
            }
            if !names.insert(object.name.as_str()) {
                return invalid(format!("duplicate object name '{}'", object.name));
            }
        }

        for behavior in &self.behaviors {
            if self.object_index(behavior.target()).is_none() {
                return Err(ConfigError::UnknownObject(behavior.target().to_string()));
            }
            if let BehaviorConfig::SpringMass { mass, .. } = behavior {
                if !is_positive(*mass) {
                    return invalid("spring_mass behavior needs a positive mass".into());
                }
            }
        }

        Ok(())
    }
}

/// Finite and strictly greater than zero. NaN fails.
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = DemoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.objects.len(), 4);
        assert!(!config.objects[1].in_world);
        assert_eq!(config.behaviors.len(), 3);
    }

    #[test]
    fn test_scalar_resolve() {
        assert_eq!(Scalar::Absolute(0.1).resolve(100.0), 0.1);
        assert!((Scalar::OfMax(0.5).resolve(7.0) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_defaults_survive_json() {
        let config = DemoConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"of_max\""));
        assert!(json.contains("\"type\": \"spring_mass\""));

        let back = DemoConfig::from_json(&json).unwrap();
        let names: Vec<_> = back.objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["magnet", "fluid", "stick_slip", "vibrations"]);
        assert_eq!(back.objects[3].effects, config.objects[3].effects);
        assert_eq!(back.behaviors[2].target(), "stick_slip");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "haptics": { "time_step": 0.002 },
            "objects": [
                { "name": "ball", "radius": 0.2, "position": [0.0, 0.0, 0.0],
                  "material": { "viscosity": { "of_max": 0.5 } },
                  "effects": ["viscosity"] }
            ],
            "behaviors": []
        }"#;
        let config = DemoConfig::from_json(json).unwrap();
        assert_eq!(config.haptics.time_step, 0.002);
        assert_eq!(config.haptics.force_cap, 7.0);
        assert!(config.objects[0].in_world);
        assert_eq!(config.objects[0].material.viscosity, Scalar::OfMax(0.5));
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_unknown_behavior_target_rejected() {
        let mut config = DemoConfig::default();
        config.behaviors.push(BehaviorConfig::ViscousBoost {
            target: "nowhere".into(),
            gain: 1.0,
            scale: 1.0,
            margin: 0.0,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownObject(name)) if name == "nowhere"
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = DemoConfig::default();
        config.haptics.time_step = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DemoConfig::default();
        config.window.msaa_samples = 2;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DemoConfig::default();
        config.objects[0].radius = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DemoConfig::default();
        config.objects[1].name = "magnet".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_nan_and_infinite_values_rejected() {
        let mut config = DemoConfig::default();
        config.objects[0].radius = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DemoConfig::default();
        config.tool.radius = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DemoConfig::default();
        config.tool.workspace_radius = f64::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DemoConfig::default();
        config.device.workspace_radius = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DemoConfig::default();
        config.haptics.force_cap = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DemoConfig::default();
        config.camera.near = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_device_limits_validated() {
        let mut config = DemoConfig::default();
        config.device.max_linear_force = -5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(msg)) if msg.contains("max_linear_force")
        ));

        let bad: [fn(&mut DeviceConfig); 5] = [
            |d| d.max_linear_stiffness = 0.0,
            |d| d.max_linear_damping = f64::NAN,
            |d| d.hand_stiffness = -1.0,
            |d| d.hand_damping = f64::INFINITY,
            |d| d.handle_mass = 0.0,
        ];
        for corrupt in bad {
            let mut config = DemoConfig::default();
            corrupt(&mut config.device);
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            DemoConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
