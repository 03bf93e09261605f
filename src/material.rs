//! Haptic and graphic material properties of scene objects.

use crate::config::MaterialConfig;
use crate::device::DeviceInfo;

const DEFAULT_GRAY: [f32; 3] = [0.5, 0.5, 0.5];

/// Device limits expressed in world units, used to scale materials.
///
/// Stiffness and damping are divided by the workspace scale factor because
/// positions and velocities are measured in the (larger) virtual workspace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceLimits {
    /// N
    pub max_force: f64,
    /// N per world unit
    pub max_stiffness: f64,
    /// N.s per world unit
    pub max_damping: f64,
}

impl DeviceLimits {
    pub fn new(info: &DeviceInfo, workspace_scale_factor: f64, force_cap: f64) -> Self {
        Self {
            max_force: info.max_linear_force.min(force_cap),
            max_stiffness: info.max_linear_stiffness / workspace_scale_factor,
            max_damping: info.max_linear_damping / workspace_scale_factor,
        }
    }
}

/// Resolved material of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub stiffness: f64,
    pub viscosity: f64,
    pub magnet_max_force: f64,
    pub magnet_max_distance: f64,
    pub stick_slip_force_max: f64,
    pub stick_slip_stiffness: f64,
    pub vibration_frequency: f64,
    pub vibration_amplitude: f64,
    pub color: [f32; 3],
}

impl Material {
    pub fn from_config(config: &MaterialConfig, limits: &DeviceLimits) -> Self {
        Self {
            stiffness: config.stiffness.resolve(limits.max_stiffness),
            viscosity: config.viscosity.resolve(limits.max_damping),
            magnet_max_force: config.magnet_max_force.resolve(limits.max_force),
            magnet_max_distance: config.magnet_max_distance,
            stick_slip_force_max: config.stick_slip_force_max.resolve(limits.max_force),
            stick_slip_stiffness: config.stick_slip_stiffness.resolve(limits.max_stiffness),
            vibration_frequency: config.vibration_frequency,
            vibration_amplitude: config.vibration_amplitude.resolve(limits.max_force),
            color: config.color.unwrap_or(DEFAULT_GRAY),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            stiffness: 0.0,
            viscosity: 0.0,
            magnet_max_force: 0.0,
            magnet_max_distance: 0.0,
            stick_slip_force_max: 0.0,
            stick_slip_stiffness: 0.0,
            vibration_frequency: 0.0,
            vibration_amplitude: 0.0,
            color: DEFAULT_GRAY,
        }
    }
}
