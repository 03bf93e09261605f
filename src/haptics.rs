//! The haptics loop and the worker thread that runs it.
//!
//! One tick of [`HapticsLoop::step`]:
//!
//! 1. read the device into the tool
//! 2. sum the effect forces of every object in the world
//! 3. let each behavior rewrite the force (and move its object)
//! 4. send the force to the device
//! 5. advance the haptic clock and publish a [`SceneSnapshot`]
//!
//! [`HapticsThread`] runs ticks at `1 / time_step` Hz until stopped. The
//! graphics loop reads the latest snapshot and never touches the world.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use glam::DVec3;
use log::{error, info, warn};

use crate::behaviors::Behavior;
use crate::config::DemoConfig;
use crate::device::HapticDevice;
use crate::error::{ConfigError, DemoError, DeviceError};
use crate::frequency::FrequencyCounter;
use crate::material::DeviceLimits;
use crate::tool::ToolCursor;
use crate::world::{SceneSnapshot, World};

/// Ticks the loop may fall behind before it stops trying to catch up.
const MAX_LAG_TICKS: u32 = 10;

/// Run state shared between the graphics and haptics threads.
#[derive(Debug)]
pub struct SimulationFlags {
    running: AtomicBool,
    finished: AtomicBool,
}

impl SimulationFlags {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            finished: AtomicBool::new(true),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Ask the loop to stop after the current tick.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    fn mark_started(&self) {
        self.finished.store(false, Ordering::Release);
        self.running.store(true, Ordering::Release);
    }

    fn mark_finished(&self) {
        self.running.store(false, Ordering::Release);
        self.finished.store(true, Ordering::Release);
    }
}

impl Default for SimulationFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Latest scene state published by the haptics loop.
pub type SharedSnapshot = Arc<Mutex<SceneSnapshot>>;

fn lock_snapshot(shared: &SharedSnapshot) -> MutexGuard<'_, SceneSnapshot> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Tool, world and behaviors advanced one fixed step at a time.
pub struct HapticsLoop {
    tool: ToolCursor,
    world: World,
    behaviors: Vec<Behavior>,
    time_step: f64,
    clock: f64,
    rate: FrequencyCounter,
    snapshot: SharedSnapshot,
}

impl HapticsLoop {
    pub fn new(tool: ToolCursor, world: World, behaviors: Vec<Behavior>, time_step: f64) -> Self {
        let snapshot = Arc::new(Mutex::new(world.snapshot()));
        Self {
            tool,
            world,
            behaviors,
            time_step,
            clock: 0.0,
            rate: FrequencyCounter::new(),
            snapshot,
        }
    }

    /// Build the tool, world and behaviors described by `config` around `device`.
    pub fn from_config(config: &DemoConfig, device: Box<dyn HapticDevice>) -> Result<Self, ConfigError> {
        config.validate()?;

        let tool = ToolCursor::new(device, &config.tool);
        let limits = DeviceLimits::new(
            tool.specifications(),
            tool.workspace_scale_factor(),
            config.haptics.force_cap,
        );
        let world = World::from_config(config, &limits);
        let behaviors = config
            .behaviors
            .iter()
            .map(|b| Behavior::from_config(b, &world))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(tool, world, behaviors, config.haptics.time_step))
    }

    pub fn tool(&self) -> &ToolCursor {
        &self.tool
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Haptic time elapsed, s.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Handle to the snapshot published every tick.
    pub fn snapshot_handle(&self) -> SharedSnapshot {
        Arc::clone(&self.snapshot)
    }

    pub fn start(&mut self) -> Result<(), DeviceError> {
        self.tool.start()?;
        self.rate.reset();
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), DeviceError> {
        self.tool.stop()
    }

    /// Advance one tick and return the force sent to the tool.
    pub fn step(&mut self) -> Result<DVec3, DeviceError> {
        self.tool.update_from_device()?;

        let mut force = self.tool.compute_interaction_forces(&mut self.world, self.clock);
        let state = self.tool.state();
        for behavior in &mut self.behaviors {
            behavior.apply(&mut self.world, &state, &mut force, self.time_step);
        }

        self.tool.set_device_global_force(force);
        self.tool.apply_to_device()?;

        self.clock += self.time_step;
        self.rate.signal(1);
        self.publish();

        Ok(force)
    }

    fn publish(&self) {
        let mut snapshot = self.world.snapshot();
        snapshot.tool_position = self.tool.device_global_position();
        snapshot.tool_radius = self.tool.radius();
        snapshot.force = self.tool.device_global_force();
        snapshot.force_engaged = self.tool.is_force_engaged();
        snapshot.haptic_rate = self.rate.frequency();
        *lock_snapshot(&self.snapshot) = snapshot;
    }

    /// Tick until `flags` asks to stop or the device fails, then release the tool.
    pub fn run(mut self, flags: &SimulationFlags) {
        let period = Duration::from_secs_f64(self.time_step);
        let mut next_tick = Instant::now();

        while flags.is_running() {
            if let Err(e) = self.step() {
                error!("Haptics loop stopped: {}", e);
                break;
            }

            next_tick += period;
            let now = Instant::now();
            if next_tick > now {
                thread::sleep(next_tick - now);
            } else if now - next_tick > period * MAX_LAG_TICKS {
                warn!("Haptics loop fell behind; resynchronizing");
                next_tick = now;
            }
        }

        if let Err(e) = self.stop() {
            warn!("Failed to release haptic device: {}", e);
        }
        flags.mark_finished();
        info!("Haptics loop finished after {:.3} s of haptic time", self.clock);
    }
}

/// A [`HapticsLoop`] running on its own thread.
pub struct HapticsThread {
    flags: Arc<SimulationFlags>,
    snapshot: SharedSnapshot,
    handle: Option<JoinHandle<()>>,
}

impl HapticsThread {
    /// Start the device and spawn the loop.
    pub fn spawn(mut haptics: HapticsLoop) -> Result<Self, DemoError> {
        haptics.start()?;

        let flags = Arc::new(SimulationFlags::new());
        let snapshot = haptics.snapshot_handle();
        flags.mark_started();

        let thread_flags = Arc::clone(&flags);
        let handle = thread::Builder::new()
            .name("haptics".into())
            .spawn(move || haptics.run(&thread_flags))
            .map_err(|e| {
                flags.mark_finished();
                DemoError::Thread(e)
            })?;

        info!("Haptics thread started");
        Ok(Self {
            flags,
            snapshot,
            handle: Some(handle),
        })
    }

    pub fn flags(&self) -> &SimulationFlags {
        &self.flags
    }

    /// Copy of the most recent snapshot.
    pub fn snapshot(&self) -> SceneSnapshot {
        lock_snapshot(&self.snapshot).clone()
    }

    /// Stop the loop and wait for it to release the device.
    pub fn stop(&mut self) {
        self.flags.request_stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Haptics thread panicked");
            }
        }
    }
}

impl Drop for HapticsThread {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceConfig;
    use crate::device::VirtualDevice;

    fn haptics() -> (HapticsLoop, crate::device::HandController) {
        let config = DemoConfig::default();
        let (device, hand) = VirtualDevice::new(&config.device, config.haptics.time_step);
        (HapticsLoop::from_config(&config, Box::new(device)).unwrap(), hand)
    }

    #[test]
    fn test_flags_lifecycle() {
        let flags = SimulationFlags::new();
        assert!(!flags.is_running());
        assert!(flags.is_finished());
        flags.mark_started();
        assert!(flags.is_running());
        assert!(!flags.is_finished());
        flags.request_stop();
        assert!(!flags.is_running());
        flags.mark_finished();
        assert!(flags.is_finished());
    }

    #[test]
    fn test_step_requires_start() {
        let (mut h, _) = haptics();
        assert_eq!(h.step(), Err(DeviceError::NotOpen));
    }

    #[test]
    fn test_step_advances_clock_and_publishes() {
        let (mut h, hand) = haptics();
        hand.set_target(DVec3::new(0.0, 0.0, 1.0));
        h.start().unwrap();
        for _ in 0..10 {
            h.step().unwrap();
        }
        assert!((h.clock() - 0.01).abs() < 1e-12);

        let snap = h.snapshot_handle().lock().unwrap().clone();
        assert_eq!(snap.objects.len(), 4);
        assert!((snap.tool_radius - 0.03).abs() < 1e-12);
        assert!((snap.tool_position.z - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_from_config_rejects_unknown_target() {
        let mut config = DemoConfig::default();
        config.objects.retain(|o| o.name != "magnet");
        let (device, _) = VirtualDevice::new(&DeviceConfig::default(), 0.001);
        assert!(matches!(
            HapticsLoop::from_config(&config, Box::new(device)),
            Err(ConfigError::UnknownObject(_))
        ));
    }

    #[test]
    fn test_thread_stops_and_releases_device() {
        let (h, _) = haptics();
        let mut thread = HapticsThread::spawn(h).unwrap();
        assert!(thread.flags().is_running());
        std::thread::sleep(Duration::from_millis(20));
        thread.stop();
        assert!(!thread.flags().is_running());
        assert!(thread.flags().is_finished());
        // Stopping twice is harmless
        thread.stop();
    }
}
