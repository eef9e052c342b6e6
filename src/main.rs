mod display;

use display::{Display, InputEvent, RenderTarget, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use riftgate::config::{AppConfig, MqttConfig};
use riftgate::control::{Command, Controller};
use riftgate::error::Result;
use riftgate::gesture::{GestureFeed, GestureState, PortalController};
use riftgate::portal::Portal;
use riftgate::source::{FrameSource, SyntheticCamera};
use riftgate::util::FpsCounter;
use sdl2::keyboard::Keycode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CAMERA_FPS: f32 = 30.0;
/// Seconds between FPS log lines
const STATUS_INTERVAL: f32 = 5.0;

struct Args {
    width: u32,
    height: u32,
    vsync: bool,
    config: Option<String>,
    mqtt_host: Option<String>,
    seed: Option<u64>,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        vsync: true,
        config: None,
        mqtt_host: None,
        seed: None,
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--no-vsync" => parsed.vsync = false,
            "--width" | "-w" => {
                if let Some(w) = value.and_then(|v| v.parse().ok()) {
                    parsed.width = w;
                }
                i += 1;
            },
            "--height" | "-h" => {
                if let Some(h) = value.and_then(|v| v.parse().ok()) {
                    parsed.height = h;
                }
                i += 1;
            },
            "--resolution" | "-r" => {
                // WxH, e.g. 1280x720
                if let Some((w, h)) = value.and_then(|v| v.split_once('x')) {
                    if let (Ok(w), Ok(h)) = (w.parse(), h.parse()) {
                        parsed.width = w;
                        parsed.height = h;
                    }
                }
                i += 1;
            },
            "--config" => {
                parsed.config = value.cloned();
                i += 1;
            },
            "--mqtt" => {
                parsed.mqtt_host = value.cloned();
                i += 1;
            },
            "--seed" => {
                parsed.seed = value.and_then(|v| v.parse().ok());
                i += 1;
            },
            "--help" => {
                println!("Usage: riftgate [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --width W, -w W       Set window width (default: {})", DEFAULT_WIDTH);
                println!("  --height H, -h H      Set window height (default: {})", DEFAULT_HEIGHT);
                println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1280x720)");
                println!("  --config PATH         Load settings from a JSON file");
                println!("  --mqtt HOST           Subscribe to gesture states on HOST");
                println!("  --seed N              Seed the portal for reproducible runs");
                println!("  --no-vsync            Disable VSync for uncapped framerate");
                println!("  --help                Show this help message");
                println!();
                println!("Keys: O open, C close, U toggle effect, D demo mode, Esc quit");
                std::process::exit(0);
            },
            other => warn!(arg = other, "ignoring unknown argument"),
        }
        i += 1;
    }

    parsed
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args();
    let mut config = args
        .config
        .as_deref()
        .map(AppConfig::load_or_default)
        .unwrap_or_default();
    if let Some(host) = args.mqtt_host {
        let base = config.mqtt.take().unwrap_or_default();
        config.mqtt = Some(MqttConfig { host, ..base });
    }

    let mut camera = SyntheticCamera::new(args.width, args.height, CAMERA_FPS);
    let (width, height) = camera.size();
    // Without a first frame there is nothing to composite onto
    let mut frame = camera.next_frame()?;

    let mut portal = match args.seed {
        Some(seed) => Portal::with_seed(width, height, config.portal.clone(), seed),
        None => Portal::new(width, height, config.portal.clone()),
    };
    let mut controller = PortalController::new(config.control.clone());

    let feed = config.mqtt.as_ref().and_then(|mqtt| match GestureFeed::connect(mqtt) {
        Ok(feed) => Some(feed),
        Err(e) => {
            warn!(error = %e, "running without gesture feed");
            None
        },
    });
    let remote = match Controller::new() {
        Ok(remote) => {
            info!(path = %remote.socket_path().display(), "control socket listening");
            Some(remote)
        },
        Err(e) => {
            warn!(error = %e, "control socket unavailable");
            None
        },
    };

    let (mut display, texture_creator) =
        Display::with_options("riftgate", width, height, args.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;

    info!(width, height, vsync = args.vsync, "riftgate started");

    let mut fps_counter = FpsCounter::new(60);
    let mut gesture = GestureState::empty();
    let mut status_timer = 0.0;

    'main: loop {
        let (dt, fps) = fps_counter.tick();

        let mut commands: Vec<Command> = Vec::new();
        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(Keycode::Escape) => commands.push(Command::Quit),
                InputEvent::KeyDown(Keycode::O) => commands.push(Command::Open),
                InputEvent::KeyDown(Keycode::C) => commands.push(Command::Close),
                InputEvent::KeyDown(Keycode::U) => commands.push(Command::ToggleMode),
                InputEvent::KeyDown(Keycode::D) => commands.push(Command::ToggleDemo),
                InputEvent::KeyDown(_) => {},
            }
        }
        if let Some(remote) = &remote {
            commands.extend(remote.poll());
        }
        for command in commands {
            match command {
                Command::Open => portal.open(),
                Command::Close => portal.close(),
                Command::ToggleMode => controller.toggle_view(&mut portal),
                Command::ToggleDemo => controller.toggle_demo(),
                Command::Quit => break 'main,
            }
        }

        match &feed {
            Some(feed) => {
                if let Some(latest) = feed.poll() {
                    gesture = latest;
                }
                controller.apply(&mut portal, &gesture, dt);
            },
            None => controller.tick(&mut portal, dt),
        }
        portal.update(dt);

        {
            let out = portal.render(&frame, controller.enabled());
            display.present(&mut target, &out)?;
        }

        status_timer += dt;
        if status_timer >= STATUS_INTERVAL {
            status_timer = 0.0;
            let (min_fps, max_fps) = fps_counter.min_max_fps();
            info!(
                fps = fps.round() as u32,
                min = min_fps.round() as u32,
                max = max_fps.round() as u32,
                state = %portal.state(),
                embers = portal.ember_count(),
                spores = portal.spore_count(),
                "status"
            );
        }
        display.set_title(&format!(
            "riftgate | {} {:.2} | {:.0} fps",
            portal.state(),
            portal.open_amount(),
            fps
        ));

        frame = match camera.next_frame() {
            Ok(next) => next,
            Err(e) => {
                info!(error = %e, "frame source ended");
                break;
            },
        };
    }

    info!(frames = camera.frames_produced(), "riftgate stopped");
    Ok(())
}
