//! Scene content shared by the haptics and graphics loops.
//!
//! The haptics thread owns the [`World`]; the graphics thread only sees the
//! [`SceneSnapshot`] published after every tick.

use glam::DVec3;

use crate::config::DemoConfig;
use crate::effects::Effect;
use crate::material::{DeviceLimits, Material};
use crate::shape::Sphere;
use crate::tool::ToolState;

/// A sphere with its material and haptic effects.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub sphere: Sphere,
    /// Position the object was created at.
    pub home: DVec3,
    pub material: Material,
    pub effects: Vec<Effect>,
    /// Objects outside the world are neither drawn nor felt.
    pub in_world: bool,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, sphere: Sphere, material: Material) -> Self {
        Self {
            name: name.into(),
            home: sphere.position,
            sphere,
            material,
            effects: Vec::new(),
            in_world: true,
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn position(&self) -> DVec3 {
        self.sphere.position
    }

    pub fn set_position(&mut self, position: DVec3) {
        self.sphere.position = position;
    }

    pub fn radius(&self) -> f64 {
        self.sphere.radius
    }
}

/// Pose of one object as the renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectPose {
    pub position: DVec3,
    pub radius: f64,
    pub color: [f32; 3],
    pub visible: bool,
}

/// Everything the graphics loop needs from one haptic tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneSnapshot {
    /// Same order as the world's objects.
    pub objects: Vec<ObjectPose>,
    pub tool_position: DVec3,
    pub tool_radius: f64,
    pub force: DVec3,
    pub force_engaged: bool,
    /// Haptic loop rate, Hz.
    pub haptic_rate: f64,
}

/// The set of objects the tool can touch.
#[derive(Debug, Clone, Default)]
pub struct World {
    objects: Vec<SceneObject>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the scene described by `config`, scaling materials by `limits`.
    pub fn from_config(config: &DemoConfig, limits: &DeviceLimits) -> Self {
        let objects = config
            .objects
            .iter()
            .map(|o| {
                let sphere = Sphere::new(o.radius, DVec3::from_array(o.position));
                let material = Material::from_config(&o.material, limits);
                let mut object = SceneObject::new(o.name.clone(), sphere, material);
                object.effects = o.effects.iter().copied().map(Effect::new).collect();
                object.in_world = o.in_world;
                object
            })
            .collect();
        Self { objects }
    }

    pub fn add(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    pub fn object_mut(&mut self, index: usize) -> Option<&mut SceneObject> {
        self.objects.get_mut(index)
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.name == name)
    }

    /// Sum of all effect forces on the tool from objects in the world.
    pub fn compute_interaction_force(&mut self, tool: &ToolState, time: f64) -> DVec3 {
        let mut total = DVec3::ZERO;
        for object in self.objects.iter_mut().filter(|o| o.in_world) {
            for effect in &mut object.effects {
                total += effect.compute(&object.sphere, &object.material, tool, time);
            }
        }
        total
    }

    /// Object poses for rendering. Tool fields are left for the caller.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            objects: self
                .objects
                .iter()
                .map(|o| ObjectPose {
                    position: o.position(),
                    radius: o.radius(),
                    color: o.material.color,
                    visible: o.in_world,
                })
                .collect(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceConfig;
    use crate::device::DeviceInfo;
    use crate::effects::EffectKind;

    fn limits() -> DeviceLimits {
        DeviceLimits::new(&DeviceInfo::from_config(&DeviceConfig::default()), 20.0, 7.0)
    }

    #[test]
    fn test_default_scene() {
        let world = World::from_config(&DemoConfig::default(), &limits());
        assert_eq!(world.objects().len(), 4);
        let vib = world.find("vibrations").unwrap();
        let kinds: Vec<_> = world.objects()[vib].effects.iter().map(Effect::kind).collect();
        assert_eq!(
            kinds,
            [EffectKind::Vibration, EffectKind::Surface, EffectKind::Viscosity]
        );
        assert_eq!(world.objects()[2].home, DVec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_objects_out_of_world_are_not_felt() {
        let mut world = World::new();
        let material = Material {
            viscosity: 1.0,
            ..Default::default()
        };
        let mut fluid = SceneObject::new("fluid", Sphere::new(0.3, DVec3::ZERO), material)
            .with_effect(Effect::new(EffectKind::Viscosity));
        fluid.in_world = false;
        let index = world.add(fluid);

        let tool = ToolState {
            position: DVec3::ZERO,
            velocity: DVec3::X,
            radius: 0.03,
        };
        assert_eq!(world.compute_interaction_force(&tool, 0.0), DVec3::ZERO);

        world.object_mut(index).unwrap().in_world = true;
        let f = world.compute_interaction_force(&tool, 0.0);
        assert!((f + DVec3::X).length() < 1e-12);
    }

    #[test]
    fn test_snapshot_tracks_positions() {
        let mut world = World::from_config(&DemoConfig::default(), &limits());
        world.object_mut(2).unwrap().set_position(DVec3::new(0.1, 1.0, 0.0));
        let snap = world.snapshot();
        assert_eq!(snap.objects.len(), 4);
        assert_eq!(snap.objects[2].position, DVec3::new(0.1, 1.0, 0.0));
        assert!(!snap.objects[1].visible);
    }
}
