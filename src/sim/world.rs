/// WorldState: the complete snapshot of a running game.
///
/// One aggregate owns every entity, the RNG, the attack id source and the
/// camera. `step` mutates it in place; the renderer only reads it. Restart
/// means building a fresh `WorldState`.
///
/// ## Camera / Viewport
///
/// World and screen coordinates are separate:
///   - `camera.x`: world x of the left edge of the viewport
///   - Renderer maps: `screen_x = world_x - camera.x`
///   - Camera eases toward `player.x - view_w * 0.35` and is clamped to the
///     current room, so the player sees a little more ahead than behind
///   - Room transitions snap it to the new room's left edge

use crate::config::RulesConfig;
use crate::domain::ai::AttackPick;
use crate::domain::entity::{
    AttackIdGen, Boss, Door, Elite, Flame, KeyItem, Monster, Player, Projectile,
};
use crate::domain::physics::Rect;
use crate::domain::rng::SimpleRng;
use crate::domain::rules::KeyDropPolicy;
use super::level::{self, Room};

/// Default lifetime of an on-screen message, in ticks.
pub const MESSAGE_TICKS: u32 = 120;

const CAMERA_LEAD: f32 = 0.35;
const CAMERA_SMOOTHING: f32 = 0.14;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Won,
    Lost,
}

/// Where the run stands, derived from world state for the HUD.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Progression {
    NoKey,
    KeyHeld,
    DoorOpen,
    BossDormant,
    BossActive,
    Won,
    Lost,
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub x: f32,
    pub view_w: f32,
}

impl Camera {
    pub fn new(view_w: f32) -> Self {
        Camera { x: 0.0, view_w }
    }

    /// Ease toward the lead position for `target_x`, then clamp to `room`.
    pub fn follow(&mut self, target_x: f32, room: Room) {
        let goal = target_x - self.view_w * CAMERA_LEAD;
        self.x += (goal - self.x) * CAMERA_SMOOTHING;
        self.clamp_to(room);
    }

    /// Jump straight to the left edge of `room`.
    pub fn snap_to(&mut self, room: Room) {
        self.x = room.bounds().0;
    }

    fn clamp_to(&mut self, room: Room) {
        let (left, right) = room.bounds();
        self.x = self.x.max(left).min((right - self.view_w).max(left));
    }
}

pub struct WorldState {
    // ── Static layout ──
    pub platforms: Vec<Rect>,
    pub door: Door,

    // ── Entities ──
    pub player: Player,
    pub monsters: Vec<Monster>,
    pub elite: Elite,
    pub elite_bolts: Vec<Projectile>,
    /// Spawned on entering the boss room.
    pub boss: Option<Boss>,
    pub fireballs: Vec<Projectile>,
    pub flames: Vec<Flame>,
    /// At most one key ever exists.
    pub key: Option<KeyItem>,

    // ── Rules ──
    pub key_drop: KeyDropPolicy,
    pub boss_pick: AttackPick,
    pub rng: SimpleRng,
    pub attack_ids: AttackIdGen,

    // ── Meta ──
    pub room: Room,
    pub camera: Camera,
    pub phase: Phase,
    pub tick: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    pub fn new(rules: &RulesConfig) -> Self {
        let (px, py) = level::PLAYER_START;
        let mut rng = SimpleRng::new(rules.seed);
        let monsters = level::monsters(&mut rng);
        WorldState {
            platforms: level::platforms(),
            door: level::door(),
            player: Player::new(px, py),
            monsters,
            elite: level::elite(),
            elite_bolts: Vec::new(),
            boss: None,
            fireballs: Vec::new(),
            flames: Vec::new(),
            key: None,
            key_drop: rules.key_drop,
            boss_pick: rules.boss_pick,
            rng,
            attack_ids: AttackIdGen::default(),
            room: Room::Main,
            camera: Camera::new(level::VIEW_W),
            phase: Phase::Playing,
            tick: 0,
            message: String::new(),
            message_timer: 0,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    pub fn is_over(&self) -> bool {
        self.phase != Phase::Playing
    }

    pub fn progression(&self) -> Progression {
        match self.phase {
            Phase::Won => return Progression::Won,
            Phase::Lost => return Progression::Lost,
            Phase::Playing => {}
        }
        match &self.boss {
            Some(b) if b.is_dormant() => Progression::BossDormant,
            Some(_) => Progression::BossActive,
            None if self.door.open => Progression::DoorOpen,
            None if self.player.has_key => Progression::KeyHeld,
            None => Progression::NoKey,
        }
    }

    /// Boss `(hp, max_hp)` once it exists.
    pub fn boss_health(&self) -> Option<(u32, u32)> {
        self.boss.as_ref().map(|b| (b.hp, b.max_hp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::BossMode;

    fn world() -> WorldState {
        WorldState::new(&RulesConfig::default())
    }

    #[test]
    fn fresh_world_has_no_key_and_no_boss() {
        let w = world();
        assert_eq!(w.progression(), Progression::NoKey);
        assert!(w.key.is_none());
        assert!(w.boss.is_none());
        assert_eq!(w.room, Room::Main);
        assert_eq!(w.monsters.len(), 6);
    }

    #[test]
    fn progression_tracks_key_door_and_boss() {
        let mut w = world();
        w.player.has_key = true;
        assert_eq!(w.progression(), Progression::KeyHeld);
        w.player.has_key = false;
        w.door.open = true;
        assert_eq!(w.progression(), Progression::DoorOpen);
        w.boss = Some(Boss::new(3700.0, 260.0, 10));
        assert_eq!(w.progression(), Progression::BossDormant);
        if let Some(b) = w.boss.as_mut() {
            b.mode = BossMode::Idle;
        }
        assert_eq!(w.progression(), Progression::BossActive);
        w.phase = Phase::Won;
        assert_eq!(w.progression(), Progression::Won);
    }

    #[test]
    fn camera_eases_and_clamps_to_room() {
        let mut cam = Camera::new(960.0);
        cam.follow(100.0, Room::Main);
        assert_eq!(cam.x, 0.0, "cannot scroll left of the world");

        for _ in 0..200 {
            cam.follow(1500.0, Room::Main);
        }
        assert!((cam.x - (1500.0 - 960.0 * 0.35)).abs() < 0.5);

        for _ in 0..200 {
            cam.follow(2790.0, Room::Main);
        }
        assert!((cam.x - (2800.0 - 960.0)).abs() < 1e-3);
    }

    #[test]
    fn camera_is_pinned_in_boss_room() {
        let mut cam = Camera::new(960.0);
        cam.snap_to(Room::Boss);
        assert_eq!(cam.x, 3000.0);
        cam.follow(3900.0, Room::Boss);
        assert_eq!(cam.x, 3000.0);
    }

    #[test]
    fn set_message_sets_timer() {
        let mut w = world();
        w.set_message("hello", 30);
        assert_eq!(w.message, "hello");
        assert_eq!(w.message_timer, 30);
    }
}
