use std::env;
use std::process::ExitCode;

use haptic_effects::{App, DemoConfig, DemoError, HapticsLoop, HapticsThread, VirtualDevice};
use log::{error, info};
use winit::event_loop::{ControlFlow, EventLoop};

const HELP: &str = "\
Haptic Effects
--------------
Move the mouse to guide the tool across the screen plane.
Scroll or hold [w]/[s] to move it in depth, [r] to re-centre depth.

Keyboard options:
[f] - Enable/Disable full screen mode
[m] - Enable/Disable vertical mirroring
[q] - Exit application
";

fn run() -> Result<(), DemoError> {
    let config = match env::args().nth(1) {
        Some(path) => {
            info!("Loading scene from {}", path);
            DemoConfig::load(&path)?
        }
        None => DemoConfig::default(),
    };

    let (device, hand) = VirtualDevice::new(&config.device, config.haptics.time_step);
    let haptics = HapticsLoop::from_config(&config, Box::new(device))?;
    let thread = HapticsThread::spawn(haptics)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, thread, hand);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    println!("{}", HELP);

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
