/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::execute;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{GameConfig, LogConfig};
use domain::entity::{Actions, FrameInput};
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_QUIT, KEYS_RESTART};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let loaded = GameConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    init_tracing(&config.log);
    if let Err(e) = &loaded {
        warn!(error = %e, "config ignored, using defaults");
    }

    let mut world = new_world(&config);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }
    let enhanced = enable_key_release();

    let sound = SoundEngine::new();
    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config, enhanced);

    if enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Dragon Keep!");
    println!("Level {}  Kills {}", world.player.level, world.player.kills);
}

/// Log to a file: stdout belongs to the renderer. `RUST_LOG` overrides the
/// configured filter. A log file that cannot be created disables logging.
fn init_tracing(log: &LogConfig) {
    let Ok(file) = File::create(&log.file) else { return };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
}

/// Ask the terminal for Release events. Returns whether it agreed.
fn enable_key_release() -> bool {
    if !crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false) {
        return false;
    }
    let flags = KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
    execute!(io::stdout(), PushKeyboardEnhancementFlags(flags)).is_ok()
}

fn new_world(config: &GameConfig) -> WorldState {
    let mut rules = config.rules.clone();
    rules.seed = rules.resolve_seed();
    info!(seed = rules.seed, key_drop = ?rules.key_drop, boss_pick = ?rules.boss_pick, "new run");
    WorldState::new(&rules)
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    enhanced: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced;
    let mut gp = GamepadState::new(&config.gamepad);
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);
    let mut last_tick = Instant::now();

    // Edges seen between ticks, so a tap shorter than one tick still counts.
    let mut pending = Actions::default();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            info!("quit");
            break;
        }
        if world.is_over() && (kb.any_pressed(KEYS_RESTART) || gp.restart_pressed()) {
            *world = new_world(config);
            pending = Actions::default();
            last_tick = Instant::now();
        }

        let frame = merge(kb.frame_input(), gp.frame_input());
        pending = or_actions(pending, frame.pressed);

        if last_tick.elapsed() >= tick_rate {
            let input = FrameInput { held: or_actions(frame.held, pending), pressed: pending };
            pending = Actions::default();

            let events = step::step(world, input);
            if let Some(sfx) = sound {
                sfx.play_events(&events);
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn merge(a: FrameInput, b: FrameInput) -> FrameInput {
    FrameInput { held: or_actions(a.held, b.held), pressed: or_actions(a.pressed, b.pressed) }
}

fn or_actions(a: Actions, b: Actions) -> Actions {
    Actions {
        left: a.left || b.left,
        right: a.right || b.right,
        jump: a.jump || b.jump,
        crouch: a.crouch || b.crouch,
        attack: a.attack || b.attack,
        interact: a.interact || b.interact,
    }
}
