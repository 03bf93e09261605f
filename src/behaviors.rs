//! Hand-tuned force behaviors layered on top of the haptic effects.
//!
//! After the effects have produced the tool force for a tick, each
//! [`Behavior`] looks at the distance between the tool and its target object
//! and may rewrite the force or move the object:
//!
//! - [`ViscousBoost`] adds a velocity-proportional force near the object and
//!   amplifies the total.
//! - [`Oscillation`] adds a rotating force while the tool is near the object,
//!   with a wider release radius once engaged.
//! - [`SpringMass`] treats the object as a free point mass: the tool force
//!   pushes it, it drifts and slows down, and it snaps home if it strays.
//!
//! Behaviors run in order, so later ones see the force produced by earlier
//! ones.

use std::f64::consts::TAU;

use glam::DVec3;

use crate::config::BehaviorConfig;
use crate::error::ConfigError;
use crate::tool::ToolState;
use crate::world::{SceneObject, World};

/// Adds a velocity term to the force near an object, then scales the total.
#[derive(Debug, Clone, PartialEq)]
pub struct ViscousBoost {
    /// Velocity gain, N.s per world unit.
    pub gain: f64,
    /// Multiplier on the total force while near.
    pub scale: f64,
    /// Extra reach beyond the object radius.
    pub margin: f64,
}

impl ViscousBoost {
    /// Boosted force while the tool is within `radius + margin` of the object.
    pub fn apply(&mut self, object: &mut SceneObject, tool: &ToolState, force: DVec3) -> DVec3 {
        if object.sphere.contains(tool.position, self.margin) {
            (force + self.gain * tool.velocity) * self.scale
        } else {
            force
        }
    }
}

/// A rotating force felt while the tool stays in contact with an object.
///
/// Once engaged, the release distance grows by `hysteresis`, so the tool
/// does not flicker in and out at the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Oscillation {
    /// Hz
    pub frequency: f64,
    /// N
    pub amplitude: f64,
    pub margin: f64,
    /// Radius multiplier applied to the release threshold while engaged.
    pub hysteresis: f64,
    elapsed: f64,
    engaged: bool,
}

impl Oscillation {
    pub fn new(frequency: f64, amplitude: f64, margin: f64, hysteresis: f64) -> Self {
        Self {
            frequency,
            amplitude,
            margin,
            hysteresis,
            elapsed: 0.0,
            engaged: false,
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Time spent inside since the last entry, s.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn apply(
        &mut self,
        object: &mut SceneObject,
        tool: &ToolState,
        force: DVec3,
        dt: f64,
    ) -> DVec3 {
        let distance = object.sphere.distance_to(tool.position);
        let threshold = if self.engaged {
            self.margin + object.radius() * self.hysteresis
        } else {
            self.margin + object.radius()
        };

        if distance < threshold {
            self.elapsed += dt;
            let phase = TAU * self.frequency * self.elapsed;
            let a = self.amplitude * phase.sin();
            let b = self.amplitude * phase.cos();
            self.engaged = true;
            force + DVec3::new(-b, a, b)
        } else {
            self.elapsed = 0.0;
            self.engaged = false;
            force
        }
    }
}

/// Lets the tool push an object around as a damped point mass.
///
/// The object takes the reaction to the tool force and drifts until its
/// velocity decays. Past `max_travel` from home it snaps back.
#[derive(Debug, Clone, PartialEq)]
pub struct SpringMass {
    /// kg
    pub mass: f64,
    pub damping: f64,
    pub margin: f64,
    /// Multiplier on the tool force while in contact.
    pub force_scale: f64,
    /// Per-tick velocity retention.
    pub velocity_decay: f64,
    /// Distance from home beyond which the object is reset.
    pub max_travel: f64,
    velocity: DVec3,
}

impl SpringMass {
    pub fn new(
        mass: f64,
        damping: f64,
        margin: f64,
        force_scale: f64,
        velocity_decay: f64,
        max_travel: f64,
    ) -> Self {
        Self {
            mass,
            damping,
            margin,
            force_scale,
            velocity_decay,
            max_travel,
            velocity: DVec3::ZERO,
        }
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn apply(
        &mut self,
        object: &mut SceneObject,
        tool: &ToolState,
        force: DVec3,
        dt: f64,
    ) -> DVec3 {
        let mut force = force;

        if object.sphere.contains(tool.position, self.margin) {
            // The object takes the reaction of the force felt by the user
            let net = -force - self.damping * self.velocity;
            self.velocity += (net / self.mass) * dt;
            force *= self.force_scale;
        }

        object.set_position(object.position() + self.velocity * dt);
        self.velocity *= self.velocity_decay;

        if (object.position() - object.home).length() > self.max_travel {
            self.velocity = DVec3::ZERO;
            let home = object.home;
            object.set_position(home);
            for effect in &mut object.effects {
                effect.reset();
            }
        }

        force
    }
}

/// The behaviors the demo knows about.
#[derive(Debug, Clone, PartialEq)]
pub enum BehaviorKind {
    ViscousBoost(ViscousBoost),
    Oscillation(Oscillation),
    SpringMass(SpringMass),
}

/// A behavior bound to one object of the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Behavior {
    target: usize,
    kind: BehaviorKind,
}

impl Behavior {
    pub fn new(target: usize, kind: BehaviorKind) -> Self {
        Self { target, kind }
    }

    /// Bind a configured behavior to its object in `world`.
    pub fn from_config(config: &BehaviorConfig, world: &World) -> Result<Self, ConfigError> {
        let target = world
            .find(config.target())
            .ok_or_else(|| ConfigError::UnknownObject(config.target().to_string()))?;

        let kind = match *config {
            BehaviorConfig::ViscousBoost {
                gain, scale, margin, ..
            } => BehaviorKind::ViscousBoost(ViscousBoost {
                gain,
                scale,
                margin,
            }),
            BehaviorConfig::Oscillation {
                frequency,
                amplitude,
                margin,
                hysteresis,
                ..
            } => BehaviorKind::Oscillation(Oscillation::new(frequency, amplitude, margin, hysteresis)),
            BehaviorConfig::SpringMass {
                mass,
                damping,
                margin,
                force_scale,
                velocity_decay,
                max_travel,
                ..
            } => BehaviorKind::SpringMass(SpringMass::new(
                mass,
                damping,
                margin,
                force_scale,
                velocity_decay,
                max_travel,
            )),
        };

        Ok(Self { target, kind })
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn kind(&self) -> &BehaviorKind {
        &self.kind
    }

    /// Rewrite `force` for one tick of length `dt`.
    ///
    /// Does nothing if the target object is missing or outside the world.
    pub fn apply(&mut self, world: &mut World, tool: &ToolState, force: &mut DVec3, dt: f64) {
        let Some(object) = world.object_mut(self.target) else {
            return;
        };
        if !object.in_world {
            return;
        }

        *force = match &mut self.kind {
            BehaviorKind::ViscousBoost(b) => b.apply(object, tool, *force),
            BehaviorKind::Oscillation(b) => b.apply(object, tool, *force, dt),
            BehaviorKind::SpringMass(b) => b.apply(object, tool, *force, dt),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;
    use crate::material::Material;
    use crate::shape::Sphere;

    const DT: f64 = 0.001;

    fn object(radius: f64, position: DVec3) -> SceneObject {
        SceneObject::new("obj", Sphere::new(radius, position), Material::default())
    }

    fn tool(position: DVec3, velocity: DVec3) -> ToolState {
        ToolState {
            position,
            velocity,
            radius: 0.03,
        }
    }

    #[test]
    fn test_viscous_boost_near_and_far() {
        let mut boost = ViscousBoost {
            gain: 0.1,
            scale: 4.0,
            margin: 0.05,
        };
        let mut obj = object(0.5, DVec3::new(0.0, -1.2, 0.0));

        let near = tool(DVec3::new(0.0, -0.66, 0.0), DVec3::new(2.0, 0.0, 0.0));
        let f = boost.apply(&mut obj, &near, DVec3::new(0.0, 1.0, 0.0));
        assert!((f - DVec3::new(0.8, 4.0, 0.0)).length() < 1e-12);

        let far = tool(DVec3::new(0.0, -0.6, 0.0), DVec3::new(2.0, 0.0, 0.0));
        let f = boost.apply(&mut obj, &far, DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(f, DVec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_oscillation_force_pattern() {
        let mut osc = Oscillation::new(6.0, 6.0, 0.05, 2.0);
        let mut obj = object(0.5, DVec3::ZERO);
        let inside = tool(DVec3::new(0.0, 0.0, 0.3), DVec3::ZERO);

        let f = osc.apply(&mut obj, &inside, DVec3::ZERO, DT);
        let phase = TAU * 6.0 * DT;
        let expected = DVec3::new(-6.0 * phase.cos(), 6.0 * phase.sin(), 6.0 * phase.cos());
        assert!((f - expected).length() < 1e-12);
        assert!(osc.is_engaged());
        assert!((osc.elapsed() - DT).abs() < 1e-15);
    }

    #[test]
    fn test_oscillation_hysteresis() {
        let mut osc = Oscillation::new(6.0, 6.0, 0.05, 2.0);
        let mut obj = object(0.5, DVec3::ZERO);

        // 0.8 is outside the entry radius (0.55) ...
        let ring = tool(DVec3::new(0.0, 0.8, 0.0), DVec3::ZERO);
        assert_eq!(osc.apply(&mut obj, &ring, DVec3::ZERO, DT), DVec3::ZERO);
        assert!(!osc.is_engaged());

        // ... but inside the release radius (1.05) once engaged
        let inside = tool(DVec3::new(0.0, 0.2, 0.0), DVec3::ZERO);
        osc.apply(&mut obj, &inside, DVec3::ZERO, DT);
        assert!(osc.is_engaged());
        assert_ne!(osc.apply(&mut obj, &ring, DVec3::ZERO, DT), DVec3::ZERO);
        assert!(osc.is_engaged());
        assert!((osc.elapsed() - 2.0 * DT).abs() < 1e-15);

        // Leaving the release radius resets the clock
        let outside = tool(DVec3::new(0.0, 1.2, 0.0), DVec3::ZERO);
        assert_eq!(osc.apply(&mut obj, &outside, DVec3::ZERO, DT), DVec3::ZERO);
        assert!(!osc.is_engaged());
        assert_eq!(osc.elapsed(), 0.0);
    }

    #[test]
    fn test_spring_mass_contact_pushes_object() {
        let mut sm = SpringMass::new(0.5, 0.0, 0.03, 10.0, 0.999, 1.0);
        let mut obj = object(0.3, DVec3::new(0.0, 1.0, 0.0));
        let touching = tool(DVec3::new(0.0, 0.7, 0.0), DVec3::ZERO);

        // Tool pushed back toward -Y, so the object is pushed toward +Y
        let f = sm.apply(&mut obj, &touching, DVec3::new(0.0, -1.0, 0.0), DT);
        assert!((f - DVec3::new(0.0, -10.0, 0.0)).length() < 1e-12);

        let v = (1.0 / 0.5) * DT;
        assert!((sm.velocity().y - v * 0.999).abs() < 1e-15);
        assert!((obj.position().y - (1.0 + v * DT)).abs() < 1e-15);
    }

    #[test]
    fn test_spring_mass_drifts_and_decays_without_contact() {
        let mut sm = SpringMass::new(0.5, 0.0, 0.03, 10.0, 0.999, 1.0);
        let mut obj = object(0.3, DVec3::new(0.0, 1.0, 0.0));
        sm.velocity = DVec3::new(0.0, 0.0, 0.1);
        let far = tool(DVec3::new(0.0, -1.0, 0.0), DVec3::ZERO);

        let f = sm.apply(&mut obj, &far, DVec3::new(1.0, 2.0, 3.0), DT);
        assert_eq!(f, DVec3::new(1.0, 2.0, 3.0));
        assert!((obj.position().z - 0.1 * DT).abs() < 1e-15);
        assert!((sm.velocity().z - 0.0999).abs() < 1e-15);
    }

    #[test]
    fn test_spring_mass_resets_when_too_far() {
        let mut sm = SpringMass::new(0.5, 0.0, 0.03, 10.0, 0.999, 1.0);
        let mut obj = object(0.3, DVec3::new(0.0, 1.0, 0.0)).with_effect(Effect::StickSlip {
            anchor: Some(DVec3::new(0.0, 1.0, 1.0)),
        });
        obj.set_position(DVec3::new(0.0, 1.0, 0.9995));
        sm.velocity = DVec3::new(0.0, 0.0, 1.0);
        let far = tool(DVec3::new(0.0, -1.0, 0.0), DVec3::ZERO);

        sm.apply(&mut obj, &far, DVec3::ZERO, DT);
        assert_eq!(obj.position(), DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(sm.velocity(), DVec3::ZERO);
        assert_eq!(obj.effects[0], Effect::StickSlip { anchor: None });
    }

    #[test]
    fn test_behavior_from_config_binds_target() {
        let mut world = World::new();
        world.add(object(0.5, DVec3::ZERO));
        let config = BehaviorConfig::Oscillation {
            target: "obj".into(),
            frequency: 6.0,
            amplitude: 6.0,
            margin: 0.05,
            hysteresis: 2.0,
        };
        let behavior = Behavior::from_config(&config, &world).unwrap();
        assert_eq!(behavior.target(), 0);
        assert!(matches!(behavior.kind(), BehaviorKind::Oscillation(_)));

        let missing = BehaviorConfig::ViscousBoost {
            target: "nope".into(),
            gain: 0.1,
            scale: 4.0,
            margin: 0.05,
        };
        assert!(matches!(
            Behavior::from_config(&missing, &world),
            Err(ConfigError::UnknownObject(_))
        ));
    }

    #[test]
    fn test_behavior_skips_objects_outside_world() {
        let mut world = World::new();
        let mut obj = object(0.5, DVec3::ZERO);
        obj.in_world = false;
        world.add(obj);

        let mut behavior = Behavior::new(
            0,
            BehaviorKind::ViscousBoost(ViscousBoost {
                gain: 0.1,
                scale: 4.0,
                margin: 0.05,
            }),
        );
        let mut force = DVec3::X;
        behavior.apply(&mut world, &tool(DVec3::ZERO, DVec3::ZERO), &mut force, DT);
        assert_eq!(force, DVec3::X);
    }
}
