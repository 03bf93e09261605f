//! # Haptic Effects
//!
//! Four spheres, each rendering a different force effect through a haptic
//! device: a magnetic surface, a viscous fluid, a stick-slip surface and a
//! vibrating sphere. A small set of per-tick behaviors reshapes those forces
//! further: a viscous boost, an oscillating push and a sphere that can be
//! knocked away on a spring.
//!
//! ## Threads
//!
//! The haptics loop runs on its own thread at 1 kHz by default. It owns the
//! [`World`] and the [`ToolCursor`] and publishes a [`SceneSnapshot`] after
//! every tick. The graphics loop ([`App`]) draws the latest snapshot and moves
//! the simulated device's hand from the mouse.
//!
//! ```ignore
//! use haptic_effects::prelude::*;
//!
//! let config = DemoConfig::default();
//! let (device, hand) = VirtualDevice::new(&config.device, config.haptics.time_step);
//! let mut haptics = HapticsLoop::from_config(&config, Box::new(device))?;
//! haptics.start()?;
//! let force = haptics.step()?;
//! ```
//!
//! ## Configuration
//!
//! The whole scene is a [`DemoConfig`], loadable from JSON. Missing fields
//! fall back to the stock scene.
//!
//! ## Effects
//!
//! | Effect | Force |
//! |--------|-------|
//! | [`EffectKind::Surface`] | Spring pushing the tool out of the sphere |
//! | [`EffectKind::Magnetic`] | Pull toward the surface within a band |
//! | [`EffectKind::Viscosity`] | Drag opposing tool velocity inside |
//! | [`EffectKind::StickSlip`] | Capped spring to a sliding anchor |
//! | [`EffectKind::Vibration`] | Sinusoid while in contact |

pub mod app;
pub mod behaviors;
pub mod config;
pub mod device;
pub mod effects;
pub mod error;
pub mod frequency;
pub mod gpu;
pub mod haptics;
pub mod input;
pub mod material;
pub mod shape;
pub mod tool;
pub mod world;

pub use app::App;
pub use behaviors::{Behavior, BehaviorKind, Oscillation, SpringMass, ViscousBoost};
pub use config::{BehaviorConfig, DemoConfig, ObjectConfig, Scalar};
pub use device::{DeviceInfo, HandController, HapticDevice, VirtualDevice};
pub use effects::{Effect, EffectKind};
pub use error::{ConfigError, DemoError, DeviceError, GpuError, TextureError};
pub use frequency::FrequencyCounter;
pub use glam::DVec3;
pub use haptics::{HapticsLoop, HapticsThread, SharedSnapshot, SimulationFlags};
pub use material::{DeviceLimits, Material};
pub use shape::Sphere;
pub use tool::{ToolCursor, ToolState};
pub use world::{ObjectPose, SceneObject, SceneSnapshot, World};

/// Common imports for building and driving the demo.
pub mod prelude {
    pub use crate::behaviors::Behavior;
    pub use crate::config::DemoConfig;
    pub use crate::device::{HandController, HapticDevice, VirtualDevice};
    pub use crate::effects::{Effect, EffectKind};
    pub use crate::haptics::{HapticsLoop, HapticsThread};
    pub use crate::tool::ToolCursor;
    pub use crate::world::{SceneObject, SceneSnapshot, World};
    pub use glam::DVec3;
}
