/// Level layout: the fixed world every run takes place in.
///
/// ## Geometry (world x →)
///
///   0 ──────────────────────── main area ──────────────────── 2800 │ 3000 ── boss room ── 3960
///        ▭ ledges, monster patrol strips          elite ▮  door ▯  │   floor + two perches
///
/// The boss room is a separate x-range with its own floor. The camera is
/// clamped to whichever room the player is in, so the gap between the two
/// is never visible.
///
/// ## Monster seeds: `(x, y, left, right)`
///   Each monster starts at `(x, y)` (dropping onto the floor under it) and
///   patrols `[left, right]`.

use crate::domain::entity::{Door, Elite, Facing, Monster, ELITE_H, PLAYER_H};
use crate::domain::physics::Rect;
use crate::domain::rng::SimpleRng;

// ── Viewport ──

pub const VIEW_W: f32 = 960.0;
pub const VIEW_H: f32 = 540.0;

// ── Main area ──

pub const WORLD_WIDTH: f32 = 2800.0;
pub const GROUND_Y: f32 = 470.0;
/// Anything below this is out of the world: instant death.
pub const FALL_LIMIT: f32 = VIEW_H + 300.0;
pub const PLAYER_START: (f32, f32) = (100.0, 200.0);

const MAIN_PLATFORMS: [Rect; 7] = [
    Rect::new(0.0, GROUND_Y, WORLD_WIDTH, 70.0),
    Rect::new(280.0, 380.0, 220.0, 20.0),
    Rect::new(650.0, 330.0, 260.0, 20.0),
    Rect::new(1080.0, 390.0, 220.0, 20.0),
    Rect::new(1450.0, 320.0, 280.0, 20.0),
    Rect::new(1870.0, 370.0, 220.0, 20.0),
    Rect::new(2240.0, 310.0, 240.0, 20.0),
];

const MONSTER_SEEDS: [(f32, f32, f32, f32); 6] = [
    (420.0, 250.0, 300.0, 560.0),
    (780.0, 220.0, 680.0, 930.0),
    (1160.0, 260.0, 1040.0, 1280.0),
    (1540.0, 210.0, 1450.0, 1720.0),
    (1950.0, 230.0, 1880.0, 2080.0),
    (2360.0, 190.0, 2260.0, 2500.0),
];

// ── Elite guard ──

pub const ELITE_SPAWN_X: f32 = 2380.0;
pub const ELITE_LEFT: f32 = 2150.0;
pub const ELITE_RIGHT: f32 = 2580.0;

// ── Door ──

pub const DOOR_RECT: Rect = Rect::new(2660.0, GROUND_Y - 110.0, 60.0, 110.0);
pub const DOOR_TRIGGER_MARGIN: f32 = 30.0;

// ── Boss room ──

pub const BOSS_ROOM_LEFT: f32 = 3000.0;
pub const BOSS_ROOM_RIGHT: f32 = BOSS_ROOM_LEFT + VIEW_W;
pub const BOSS_ENTRANCE: (f32, f32) = (BOSS_ROOM_LEFT + 40.0, GROUND_Y - PLAYER_H);
pub const BOSS_SPAWN: (f32, f32) = (BOSS_ROOM_LEFT + 700.0, 260.0);
/// Highest the hovering boss may climb.
pub const BOSS_MIN_Y: f32 = 120.0;

const BOSS_PLATFORMS: [Rect; 3] = [
    Rect::new(BOSS_ROOM_LEFT, GROUND_Y, VIEW_W, 70.0),
    Rect::new(BOSS_ROOM_LEFT + 160.0, 350.0, 160.0, 20.0),
    Rect::new(BOSS_ROOM_LEFT + 640.0, 350.0, 160.0, 20.0),
];

/// Which region of the world the player occupies.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Room {
    Main,
    Boss,
}

impl Room {
    /// Horizontal `(left, right)` limits of the room.
    pub fn bounds(self) -> (f32, f32) {
        match self {
            Room::Main => (0.0, WORLD_WIDTH),
            Room::Boss => (BOSS_ROOM_LEFT, BOSS_ROOM_RIGHT),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Builders
// ══════════════════════════════════════════════════════════════

/// Every platform of both rooms.
pub fn platforms() -> Vec<Rect> {
    MAIN_PLATFORMS.iter().chain(BOSS_PLATFORMS.iter()).copied().collect()
}

/// Fresh monsters at their seeds, each walking a random way.
pub fn monsters(rng: &mut SimpleRng) -> Vec<Monster> {
    MONSTER_SEEDS
        .iter()
        .enumerate()
        .map(|(id, &(x, y, left, right))| {
            let dir = if rng.coin() { Facing::Right } else { Facing::Left };
            Monster::new(id, x, y, left, right, dir)
        })
        .collect()
}

pub fn elite() -> Elite {
    Elite::new(ELITE_SPAWN_X, GROUND_Y - ELITE_H, ELITE_LEFT, ELITE_RIGHT)
}

pub fn door() -> Door {
    Door::new(DOOR_RECT, DOOR_TRIGGER_MARGIN)
}
