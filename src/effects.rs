//! Haptic effects attached to scene objects.
//!
//! Each object carries a list of effects selected by [`EffectKind`] and
//! parameterized by the object's [`Material`]. Every haptic tick the world
//! asks each effect for a force on the tool and sums them.
//!
//! | Effect | Active when | Force |
//! |--------|-------------|-------|
//! | Surface | tool overlaps object | `stiffness * penetration` along the normal |
//! | Magnetic | tool within `magnet_max_distance` of the surface | pull toward object, peak at half distance |
//! | Viscosity | tool overlaps object | `-viscosity * velocity` |
//! | StickSlip | tool overlaps object | spring to a sliding anchor, capped |
//! | Vibration | tool overlaps object | `amplitude * sin(2πft)` along X |

use std::f64::consts::TAU;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::material::Material;
use crate::shape::Sphere;
use crate::tool::ToolState;

/// Selects which haptic model an effect uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Surface,
    Magnetic,
    Viscosity,
    StickSlip,
    Vibration,
}

/// A haptic effect with its per-object state.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Surface,
    Magnetic,
    Viscosity,
    StickSlip {
        /// Point the tool is held to while sticking.
        anchor: Option<DVec3>,
    },
    Vibration,
}

impl Effect {
    pub fn new(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Surface => Effect::Surface,
            EffectKind::Magnetic => Effect::Magnetic,
            EffectKind::Viscosity => Effect::Viscosity,
            EffectKind::StickSlip => Effect::StickSlip { anchor: None },
            EffectKind::Vibration => Effect::Vibration,
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::Surface => EffectKind::Surface,
            Effect::Magnetic => EffectKind::Magnetic,
            Effect::Viscosity => EffectKind::Viscosity,
            Effect::StickSlip { .. } => EffectKind::StickSlip,
            Effect::Vibration => EffectKind::Vibration,
        }
    }

    /// Force this effect applies to the tool at haptic time `time` (seconds).
    pub fn compute(
        &mut self,
        sphere: &Sphere,
        material: &Material,
        tool: &ToolState,
        time: f64,
    ) -> DVec3 {
        let contact_radius = sphere.radius + tool.radius;
        let distance = sphere.distance_to(tool.position);
        let in_contact = distance < contact_radius;

        match self {
            Effect::Surface => {
                if !in_contact {
                    return DVec3::ZERO;
                }
                let penetration = contact_radius - distance;
                material.stiffness * penetration * sphere.outward_normal(tool.position)
            }

            Effect::Magnetic => {
                let gap = sphere.surface_distance(tool.position) - tool.radius;
                let range = material.magnet_max_distance;
                if range <= 0.0 || gap <= 0.0 || gap >= range {
                    return DVec3::ZERO;
                }
                let half = 0.5 * range;
                let magnitude = if gap < half {
                    material.magnet_max_force * gap / half
                } else {
                    material.magnet_max_force * (range - gap) / half
                };
                -magnitude * sphere.outward_normal(tool.position)
            }

            Effect::Viscosity => {
                if !in_contact {
                    return DVec3::ZERO;
                }
                -material.viscosity * tool.velocity
            }

            Effect::StickSlip { anchor } => {
                if !in_contact {
                    *anchor = None;
                    return DVec3::ZERO;
                }
                let held = *anchor.get_or_insert(tool.position);
                let force = material.stick_slip_stiffness * (held - tool.position);
                let magnitude = force.length();
                let max = material.stick_slip_force_max;
                if magnitude > max && magnitude > 0.0 {
                    // Slip: drag the anchor so the spring sits exactly at the limit
                    let ratio = max / magnitude;
                    *anchor = Some(tool.position + (held - tool.position) * ratio);
                    force * ratio
                } else {
                    force
                }
            }

            Effect::Vibration => {
                if !in_contact {
                    return DVec3::ZERO;
                }
                let wave = (TAU * material.vibration_frequency * time).sin();
                material.vibration_amplitude * wave * DVec3::X
            }
        }
    }

    /// Drop any contact state, e.g. after the object jumps to a new place.
    pub fn reset(&mut self) {
        if let Effect::StickSlip { anchor } = self {
            *anchor = None;
        }
    }
}
