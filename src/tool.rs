//! The virtual tool (cursor) that represents the device tip in the scene.

use glam::DVec3;
use log::{info, warn};

use crate::config::ToolConfig;
use crate::device::{DeviceInfo, HapticDevice};
use crate::error::DeviceError;
use crate::world::World;

/// Forces stay withheld until the computed force first falls below this, N.
pub const SMALL_FORCE_THRESHOLD: f64 = 0.2;

/// Position and velocity of the tool in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolState {
    pub position: DVec3,
    pub velocity: DVec3,
    pub radius: f64,
}

/// Maps a haptic device into the virtual workspace and forwards forces.
pub struct ToolCursor {
    device: Box<dyn HapticDevice>,
    radius: f64,
    workspace_radius: f64,
    wait_for_small_force: bool,
    force_engaged: bool,
    started: bool,
    position: DVec3,
    velocity: DVec3,
    force: DVec3,
}

impl ToolCursor {
    pub fn new(device: Box<dyn HapticDevice>, config: &ToolConfig) -> Self {
        Self {
            device,
            radius: config.radius,
            workspace_radius: config.workspace_radius,
            wait_for_small_force: config.wait_for_small_force,
            force_engaged: !config.wait_for_small_force,
            started: false,
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            force: DVec3::ZERO,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn specifications(&self) -> &DeviceInfo {
        self.device.specifications()
    }

    /// Ratio between the virtual workspace and the physical one.
    pub fn workspace_scale_factor(&self) -> f64 {
        self.workspace_radius / self.device.specifications().workspace_radius
    }

    /// Open the device and start tracking it.
    pub fn start(&mut self) -> Result<(), DeviceError> {
        self.device.open()?;
        self.started = true;
        self.force_engaged = !self.wait_for_small_force;
        self.update_from_device()?;
        info!(
            "Tool started (radius {}, workspace scale {:.1})",
            self.radius,
            self.workspace_scale_factor()
        );
        Ok(())
    }

    /// Release the device. Sends a zero force before closing.
    pub fn stop(&mut self) -> Result<(), DeviceError> {
        if !self.started {
            return Ok(());
        }
        self.started = false;
        self.force = DVec3::ZERO;
        self.device.set_force(DVec3::ZERO)?;
        self.device.close()
    }

    /// Read the device and map it into world space.
    pub fn update_from_device(&mut self) -> Result<(), DeviceError> {
        let scale = self.workspace_scale_factor();
        self.position = self.device.position()? * scale;
        self.velocity = self.device.linear_velocity()? * scale;
        Ok(())
    }

    /// Set the tool force to the sum of the world's effect forces.
    pub fn compute_interaction_forces(&mut self, world: &mut World, time: f64) -> DVec3 {
        self.force = world.compute_interaction_force(&self.state(), time);
        self.force
    }

    pub fn state(&self) -> ToolState {
        ToolState {
            position: self.position,
            velocity: self.velocity,
            radius: self.radius,
        }
    }

    pub fn device_global_position(&self) -> DVec3 {
        self.position
    }

    pub fn device_global_linear_velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn device_global_force(&self) -> DVec3 {
        self.force
    }

    pub fn set_device_global_force(&mut self, force: DVec3) {
        self.force = force;
    }

    /// Whether forces are currently being sent to the device.
    pub fn is_force_engaged(&self) -> bool {
        self.force_engaged
    }

    /// Send the current force to the device.
    ///
    /// While waiting for a small force, zero is sent instead.
    pub fn apply_to_device(&mut self) -> Result<(), DeviceError> {
        if !self.force_engaged && self.force.length() < SMALL_FORCE_THRESHOLD {
            self.force_engaged = true;
            info!("Tool forces engaged");
        }

        let output = if self.force_engaged {
            self.force
        } else {
            DVec3::ZERO
        };
        self.device.set_force(output)
    }
}

impl Drop for ToolCursor {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to release haptic device on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceConfig;
    use crate::device::VirtualDevice;

    fn tool(wait: bool) -> (ToolCursor, crate::device::HandController) {
        let (device, hand) = VirtualDevice::new(&DeviceConfig::default(), 0.001);
        let config = ToolConfig {
            wait_for_small_force: wait,
            ..Default::default()
        };
        (ToolCursor::new(Box::new(device), &config), hand)
    }

    #[test]
    fn test_scale_factor() {
        let (tool, _) = tool(true);
        assert!((tool.workspace_scale_factor() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_position_is_scaled() {
        let (mut tool, hand) = tool(true);
        hand.set_target(DVec3::new(0.0, 1.0, 0.0));
        tool.start().unwrap();
        assert!((tool.device_global_position() - DVec3::new(0.0, 1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_waits_for_small_force() {
        let (mut tool, _) = tool(true);
        tool.start().unwrap();
        assert!(!tool.is_force_engaged());

        tool.set_device_global_force(DVec3::new(5.0, 0.0, 0.0));
        tool.apply_to_device().unwrap();
        assert!(!tool.is_force_engaged());

        tool.set_device_global_force(DVec3::new(0.1, 0.0, 0.0));
        tool.apply_to_device().unwrap();
        assert!(tool.is_force_engaged());

        // Once engaged, large forces pass through
        tool.set_device_global_force(DVec3::new(5.0, 0.0, 0.0));
        tool.apply_to_device().unwrap();
        assert!(tool.is_force_engaged());
    }

    #[test]
    fn test_engaged_immediately_without_wait() {
        let (mut tool, _) = tool(false);
        tool.start().unwrap();
        assert!(tool.is_force_engaged());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut tool, _) = tool(true);
        assert!(tool.stop().is_ok());
        tool.start().unwrap();
        assert!(tool.stop().is_ok());
        assert!(tool.stop().is_ok());
        assert_eq!(tool.update_from_device(), Err(DeviceError::NotOpen));
    }
}
