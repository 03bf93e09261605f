//! Haptic device interface and a simulated device.
//!
//! [`HapticDevice`] is the seam between the haptics loop and hardware. The
//! demo ships a [`VirtualDevice`]: a handle of small mass that the user's
//! "hand" drags around through a spring-damper, while the forces commanded by
//! the haptics loop push back on it. The hand target is set from the UI
//! thread through a cloneable [`HandController`].

use std::sync::{Arc, Mutex, MutexGuard};

use glam::DVec3;
use log::{debug, info};

use crate::config::DeviceConfig;
use crate::error::DeviceError;

/// Static specification of a haptic device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub model_name: String,
    /// N
    pub max_linear_force: f64,
    /// N/m
    pub max_linear_stiffness: f64,
    /// N.s/m
    pub max_linear_damping: f64,
    /// Radius of the physical workspace, m.
    pub workspace_radius: f64,
}

impl DeviceInfo {
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            model_name: config.model_name.clone(),
            max_linear_force: config.max_linear_force,
            max_linear_stiffness: config.max_linear_stiffness,
            max_linear_damping: config.max_linear_damping,
            workspace_radius: config.workspace_radius,
        }
    }
}

/// A force-feedback pointing device.
///
/// Positions and velocities are in device coordinates (metres), forces in
/// newtons. Calls other than `open` and `specifications` fail with
/// [`DeviceError::NotOpen`] on a closed device.
pub trait HapticDevice: Send {
    fn open(&mut self) -> Result<(), DeviceError>;
    fn close(&mut self) -> Result<(), DeviceError>;
    fn specifications(&self) -> &DeviceInfo;
    fn position(&self) -> Result<DVec3, DeviceError>;
    fn linear_velocity(&self) -> Result<DVec3, DeviceError>;
    fn set_force(&mut self, force: DVec3) -> Result<(), DeviceError>;
}

/// Moves the hand holding a [`VirtualDevice`].
///
/// The target is in normalized workspace coordinates, each axis in `[-1, 1]`.
#[derive(Debug, Clone, Default)]
pub struct HandController {
    target: Arc<Mutex<DVec3>>,
}

impl HandController {
    fn lock(&self) -> MutexGuard<'_, DVec3> {
        // A panicking writer cannot leave a DVec3 half-written
        self.target.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_target(&self, normalized: DVec3) {
        *self.lock() = normalized.clamp(DVec3::splat(-1.0), DVec3::splat(1.0));
    }

    pub fn target(&self) -> DVec3 {
        *self.lock()
    }
}

/// Simulated device handle driven by a [`HandController`].
///
/// Each call to `set_force` advances the handle by one fixed step.
#[derive(Debug)]
pub struct VirtualDevice {
    info: DeviceInfo,
    hand: HandController,
    handle_mass: f64,
    hand_stiffness: f64,
    hand_damping: f64,
    step: f64,
    position: DVec3,
    velocity: DVec3,
    last_force: DVec3,
    open: bool,
}

impl VirtualDevice {
    /// Create a device advancing `step` seconds per force update, together
    /// with the controller that moves it.
    pub fn new(config: &DeviceConfig, step: f64) -> (Self, HandController) {
        let hand = HandController::default();
        let device = Self {
            info: DeviceInfo::from_config(config),
            hand: hand.clone(),
            handle_mass: config.handle_mass,
            hand_stiffness: config.hand_stiffness,
            hand_damping: config.hand_damping,
            step,
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            last_force: DVec3::ZERO,
            open: false,
        };
        (device, hand)
    }

    /// Force applied on the last update, after clamping.
    pub fn last_force(&self) -> DVec3 {
        self.last_force
    }

    fn ensure_open(&self) -> Result<(), DeviceError> {
        if self.open {
            Ok(())
        } else {
            Err(DeviceError::NotOpen)
        }
    }

    fn integrate(&mut self, force: DVec3) {
        let radius = self.info.workspace_radius;
        let target = self.hand.target() * radius;

        let spring = self.hand_stiffness * (target - self.position);
        let damping = -self.hand_damping * self.velocity;
        let acceleration = (spring + damping + force) / self.handle_mass;

        self.velocity += acceleration * self.step;
        self.position += self.velocity * self.step;

        // Mechanical stop at the edge of the workspace
        let distance = self.position.length();
        if distance > radius {
            let normal = self.position / distance;
            self.position = normal * radius;
            let outward = self.velocity.dot(normal);
            if outward > 0.0 {
                self.velocity -= outward * normal;
            }
        }
    }
}

impl HapticDevice for VirtualDevice {
    fn open(&mut self) -> Result<(), DeviceError> {
        if !self.open {
            // Start where the hand is so the first ticks feel no spring jerk
            self.position = self.hand.target() * self.info.workspace_radius;
            self.velocity = DVec3::ZERO;
            self.open = true;
            info!("Opened haptic device '{}'", self.info.model_name);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        if self.open {
            self.open = false;
            self.last_force = DVec3::ZERO;
            info!("Closed haptic device '{}'", self.info.model_name);
        }
        Ok(())
    }

    fn specifications(&self) -> &DeviceInfo {
        &self.info
    }

    fn position(&self) -> Result<DVec3, DeviceError> {
        self.ensure_open()?;
        Ok(self.position)
    }

    fn linear_velocity(&self) -> Result<DVec3, DeviceError> {
        self.ensure_open()?;
        Ok(self.velocity)
    }

    fn set_force(&mut self, force: DVec3) -> Result<(), DeviceError> {
        self.ensure_open()?;
        let clamped = force.clamp_length_max(self.info.max_linear_force);
        if clamped != force {
            debug!("Clamped device force {:.2} N to {:.2} N", force.length(), clamped.length());
        }
        self.last_force = clamped;
        self.integrate(clamped);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> (VirtualDevice, HandController) {
        VirtualDevice::new(&DeviceConfig::default(), 0.001)
    }

    #[test]
    fn test_closed_device_errors() {
        let (mut dev, _) = device();
        assert_eq!(dev.position(), Err(DeviceError::NotOpen));
        assert_eq!(dev.set_force(DVec3::ZERO), Err(DeviceError::NotOpen));
        assert_eq!(dev.specifications().model_name, "virtual");
    }

    #[test]
    fn test_open_starts_at_hand() {
        let (mut dev, hand) = device();
        hand.set_target(DVec3::new(0.0, 0.5, 0.0));
        dev.open().unwrap();
        let p = dev.position().unwrap();
        assert!((p - DVec3::new(0.0, 0.025, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_hand_target_is_clamped() {
        let hand = HandController::default();
        hand.set_target(DVec3::new(3.0, -2.0, 0.5));
        assert_eq!(hand.target(), DVec3::new(1.0, -1.0, 0.5));

        let other = hand.clone();
        other.set_target(DVec3::new(0.5, 0.0, 0.0));
        assert_eq!(hand.target(), DVec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_handle_follows_hand() {
        let (mut dev, hand) = device();
        dev.open().unwrap();
        hand.set_target(DVec3::new(0.0, 0.0, 0.4));
        for _ in 0..3000 {
            dev.set_force(DVec3::ZERO).unwrap();
        }
        let p = dev.position().unwrap();
        assert!((p.z - 0.02).abs() < 1e-4, "handle at {p:?}");
        assert!(dev.linear_velocity().unwrap().length() < 1e-3);
    }

    #[test]
    fn test_force_is_clamped_and_pushes_handle() {
        let (mut dev, _) = device();
        dev.open().unwrap();
        dev.set_force(DVec3::new(100.0, 0.0, 0.0)).unwrap();
        assert!((dev.last_force().length() - 12.0).abs() < 1e-9);
        assert!(dev.linear_velocity().unwrap().x > 0.0);
    }

    #[test]
    fn test_workspace_stop() {
        let (mut dev, _) = device();
        dev.open().unwrap();
        for _ in 0..2000 {
            dev.set_force(DVec3::new(12.0, 0.0, 0.0)).unwrap();
        }
        let p = dev.position().unwrap();
        assert!(p.length() <= 0.05 + 1e-12);
    }

    #[test]
    fn test_close_zeroes_force() {
        let (mut dev, _) = device();
        dev.open().unwrap();
        dev.set_force(DVec3::new(1.0, 0.0, 0.0)).unwrap();
        dev.close().unwrap();
        assert_eq!(dev.last_force(), DVec3::ZERO);
        assert_eq!(dev.linear_velocity(), Err(DeviceError::NotOpen));
    }
}
