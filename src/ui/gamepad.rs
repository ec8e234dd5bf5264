/// Gamepad input via gilrs (feature `gamepad`).
///
/// Mapping is read from the `[gamepad]` table of config.toml. Defaults:
///   D-pad / left stick  →  walk left / right, down = crouch, up = jump
///   A                   →  Jump
///   X                   →  Attack
///   Y / B               →  Interact (door)
///   Start               →  Restart after Won / Lost
///   Select              →  Quit
///
/// Without the feature the tracker still exists but never reports input,
/// so the host code is identical either way.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::{Actions, FrameInput};

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.3;

const BTN_COUNT: usize = 8;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Directions, merged from d-pad and stick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Dir {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held { self.just_pressed = true; }
        self.held = held;
    }
}

struct ActionMap {
    jump: Vec<Btn>,
    attack: Vec<Btn>,
    interact: Vec<Btn>,
    quit: Vec<Btn>,
    restart: Vec<Btn>,
}

impl ActionMap {
    /// Names that do not parse are skipped; an empty result keeps the default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn pick(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() { fallback } else { parsed }
        }
        let d = ActionMap::default();
        ActionMap {
            jump: pick(&cfg.jump, d.jump),
            attack: pick(&cfg.attack, d.attack),
            interact: pick(&cfg.interact, d.interact),
            quit: pick(&cfg.quit, d.quit),
            restart: pick(&cfg.restart, d.restart),
        }
    }
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump: vec![Btn::A],
            attack: vec![Btn::X],
            interact: vec![Btn::Y, Btn::B],
            quit: vec![Btn::Select],
            restart: vec![Btn::Start],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad: [bool; 4],
    stick_x: f32,
    stick_y: f32,
    /// Merged d-pad + stick.
    dirs: [BtnState; 4],

    map: ActionMap,
    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                tracing::warn!(error = %e, "gamepad support unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [false; 4],
            stick_x: 0.0,
            stick_y: 0.0,
            dirs: [BtnState::default(); 4],
            map: ActionMap::from_config(cfg),
            connected,
        }
    }

    /// Poll pending gamepad events. Call once per frame.
    pub fn update(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        for d in &mut self.dirs { d.just_pressed = false; }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();

        self.merge_dirs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.stick_x = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.stick_y = v,
                EventType::Connected => {
                    self.connected = true;
                    tracing::info!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                    tracing::info!("gamepad disconnected");
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, held: bool) {
        let dir = match btn {
            Button::DPadUp => Some(Dir::Up),
            Button::DPadDown => Some(Dir::Down),
            Button::DPadLeft => Some(Dir::Left),
            Button::DPadRight => Some(Dir::Right),
            _ => None,
        };
        if let Some(d) = dir {
            self.dpad[d as usize] = held;
        } else if let Some(b) = Btn::from_gilrs(btn) {
            self.buttons[b as usize].set(held);
        }
    }

    fn merge_dirs(&mut self) {
        let stick = [
            self.stick_y > STICK_DEADZONE,
            self.stick_y < -STICK_DEADZONE,
            self.stick_x < -STICK_DEADZONE,
            self.stick_x > STICK_DEADZONE,
        ];
        for i in 0..4 {
            self.dirs[i].set(self.dpad[i] || stick[i]);
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = [false; 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }

    // ── Queries ──

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].held)
    }

    fn any_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    fn dir(&self, d: Dir) -> BtnState {
        self.dirs[d as usize]
    }

    /// Gameplay input for this frame.
    pub fn frame_input(&self) -> FrameInput {
        let held = Actions {
            left: self.dir(Dir::Left).held,
            right: self.dir(Dir::Right).held,
            jump: self.dir(Dir::Up).held || self.any_held(&self.map.jump),
            crouch: self.dir(Dir::Down).held,
            attack: self.any_held(&self.map.attack),
            interact: self.any_held(&self.map.interact),
        };
        let pressed = Actions {
            left: self.dir(Dir::Left).just_pressed,
            right: self.dir(Dir::Right).just_pressed,
            jump: self.dir(Dir::Up).just_pressed || self.any_pressed(&self.map.jump),
            crouch: self.dir(Dir::Down).just_pressed,
            attack: self.any_pressed(&self.map.attack),
            interact: self.any_pressed(&self.map.interact),
        };
        FrameInput { held, pressed }
    }

    pub fn quit_pressed(&self) -> bool {
        self.any_pressed(&self.map.quit)
    }

    pub fn restart_pressed(&self) -> bool {
        self.any_pressed(&self.map.restart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> GamepadState {
        let mut gp = GamepadState::new(&GamepadConfig::default());
        gp.release_all();
        gp
    }

    #[test]
    fn button_names_parse_case_insensitively() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name("North"), Some(Btn::Y));
        assert_eq!(Btn::from_name("back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("Z"), None);
    }

    #[test]
    fn bad_names_fall_back_to_default_mapping() {
        let cfg = GamepadConfig {
            jump: vec!["nope".into()],
            attack: vec!["RB".into(), "??".into()],
            ..GamepadConfig::default()
        };
        let map = ActionMap::from_config(&cfg);
        assert_eq!(map.jump, vec![Btn::A]);
        assert_eq!(map.attack, vec![Btn::R1]);
    }

    #[test]
    fn buttons_map_to_held_and_pressed_actions() {
        let mut gp = pad();
        gp.buttons[Btn::Y as usize].set(true);
        gp.buttons[Btn::X as usize].set(true);
        let f = gp.frame_input();
        assert!(f.held.interact && f.pressed.interact);
        assert!(f.held.attack && f.pressed.attack);

        gp.update();
        let f = gp.frame_input();
        assert!(f.held.interact, "still held");
        assert!(!f.pressed.interact, "edge only once");
    }

    #[test]
    fn stick_past_deadzone_walks() {
        let mut gp = pad();
        gp.stick_x = -0.8;
        gp.stick_y = -0.9;
        gp.update();
        let f = gp.frame_input();
        assert!(f.held.left && !f.held.right);
        assert!(f.held.crouch);

        gp.stick_x = 0.1;
        gp.stick_y = 0.0;
        gp.update();
        let f = gp.frame_input();
        assert!(!f.held.left && !f.held.crouch);
    }
}
