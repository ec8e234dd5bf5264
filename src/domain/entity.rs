/// Entities: Player, Monster, Elite, Boss, KeyItem, Door, projectiles.
///
/// Every behavior state machine is a tagged enum carrying its own timers,
/// so e.g. a dash without a locked direction cannot be represented.

use super::physics::{Body, Rect};

// ── Player tuning ──

pub const PLAYER_W: f32 = 42.0;
pub const PLAYER_H: f32 = 60.0;
pub const PLAYER_CROUCH_H: f32 = 40.0;
pub const PLAYER_MAX_HP: u32 = 100;

// ── Enemy tuning ──

pub const MONSTER_W: f32 = 44.0;
pub const MONSTER_H: f32 = 52.0;
pub const MONSTER_MAX_HP: u32 = 32;
pub const MONSTER_DAMAGE: u32 = 12;

pub const ELITE_W: f32 = 48.0;
pub const ELITE_H: f32 = 64.0;
pub const ELITE_MAX_HP: u32 = 3;
pub const ELITE_DAMAGE: u32 = 18;

pub const BOSS_W: f32 = 120.0;
pub const BOSS_H: f32 = 96.0;
pub const BOSS_MAX_HP: u32 = 600;
pub const BOSS_TOUCH_DAMAGE: u32 = 20;

// ── Items / hazards ──

pub const KEY_SIZE: f32 = 24.0;

pub const FLAME_W: f32 = 60.0;
pub const FLAME_WARNING_TICKS: u32 = 50;
pub const FLAME_PILLAR_TICKS: u32 = 60;
pub const FLAME_PILLAR_MAX_H: f32 = 180.0;
pub const FLAME_DAMAGE: u32 = 22;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1.0 for left, +1.0 for right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Direction from `from_x` toward `to_x` (ties face right).
    pub fn toward(from_x: f32, to_x: f32) -> Facing {
        if to_x < from_x { Facing::Left } else { Facing::Right }
    }

    pub fn flip(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// One snapshot of the logical controls.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Actions {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub crouch: bool,
    pub attack: bool,
    pub interact: bool,
}

/// Frame input: `held` is level-triggered (movement, attack),
/// `pressed` is edge-triggered and valid for one tick only (interact).
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub held: Actions,
    pub pressed: Actions,
}

/// Identity of one melee swing. Minted by the world, never reused.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AttackId(u64);

/// Source of fresh `AttackId`s.
#[derive(Clone, Debug, Default)]
pub struct AttackIdGen {
    next: u64,
}

impl AttackIdGen {
    pub fn mint(&mut self) -> AttackId {
        self.next += 1;
        AttackId(self.next)
    }
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub hp: u32,
    pub max_hp: u32,
    pub facing: Facing,
    pub invuln_timer: u32,
    pub attack_timer: u32,
    pub attack_cooldown: u32,
    /// Swing currently in flight; meaningful only while `attack_timer > 0`.
    pub attack_id: Option<AttackId>,
    pub crouching: bool,
    pub level: u32,
    pub exp: u32,
    pub kills: u32,
    pub has_key: bool,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Player {
            body: Body::new(x, y, PLAYER_W, PLAYER_H),
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            facing: Facing::Right,
            invuln_timer: 0,
            attack_timer: 0,
            attack_cooldown: 0,
            attack_id: None,
            crouching: false,
            level: 1,
            exp: 0,
            kills: 0,
            has_key: false,
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln_timer > 0
    }

    /// The swing that is live this tick, if any.
    pub fn active_attack(&self) -> Option<AttackId> {
        if self.attack_timer > 0 { self.attack_id } else { None }
    }
}

// ══════════════════════════════════════════════════════════════
// Monster (patrol enemy, immortal by respawn)
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MonsterState {
    Patrol,
    /// Hit recently: patrol suspended, knockback velocity carries it.
    Knocked { ticks_left: u32 },
    Respawning { ticks_left: u32 },
}

#[derive(Clone, Debug)]
pub struct Monster {
    pub id: usize,
    pub body: Body,
    pub hp: u32,
    pub max_hp: u32,
    pub damage: u32,
    pub left: f32,
    pub right: f32,
    pub dir: Facing,
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub state: MonsterState,
    pub last_hit: Option<AttackId>,
}

impl Monster {
    pub fn new(id: usize, x: f32, y: f32, left: f32, right: f32, dir: Facing) -> Self {
        Monster {
            id,
            body: Body::new(x, y, MONSTER_W, MONSTER_H),
            hp: MONSTER_MAX_HP,
            max_hp: MONSTER_MAX_HP,
            damage: MONSTER_DAMAGE,
            left,
            right,
            dir,
            spawn_x: x,
            spawn_y: y,
            state: MonsterState::Patrol,
            last_hit: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        !matches!(self.state, MonsterState::Respawning { .. })
    }

    /// Back to the seed position with full hp.
    pub fn reset(&mut self, dir: Facing) {
        self.body = Body::new(self.spawn_x, self.spawn_y, MONSTER_W, MONSTER_H);
        self.hp = self.max_hp;
        self.dir = dir;
        self.state = MonsterState::Patrol;
        self.last_hit = None;
    }
}

// ══════════════════════════════════════════════════════════════
// Elite guard
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EliteState {
    Idle,
    /// Telegraph before the bolt; direction locked at windup start.
    Windup { ticks_left: u32, dir: Facing },
    /// Recovery right after the bolt leaves.
    Fire { ticks_left: u32 },
    Hurt { ticks_left: u32 },
    Dead,
}

#[derive(Clone, Debug)]
pub struct Elite {
    pub body: Body,
    pub hp: u32,
    pub max_hp: u32,
    pub damage: u32,
    pub left: f32,
    pub right: f32,
    pub dir: Facing,
    pub knock_vx: f32,
    pub skill_cooldown: u32,
    pub state: EliteState,
    pub last_hit: Option<AttackId>,
}

impl Elite {
    pub fn new(x: f32, y: f32, left: f32, right: f32) -> Self {
        Elite {
            body: Body::new(x, y, ELITE_W, ELITE_H),
            hp: ELITE_MAX_HP,
            max_hp: ELITE_MAX_HP,
            damage: ELITE_DAMAGE,
            left,
            right,
            dir: Facing::Left,
            knock_vx: 0.0,
            skill_cooldown: 0,
            state: EliteState::Idle,
            last_hit: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state != EliteState::Dead
    }
}

// ══════════════════════════════════════════════════════════════
// Boss (dragon)
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BossAttack {
    Fireball,
    Flame,
    Charge,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChargePhase {
    Windup { ticks_left: u32, dir: Facing },
    Dash { ticks_left: u32, dir: Facing },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BossMode {
    /// Just woke up in the boss room; no attacks, no touch damage.
    Dormant { ticks_left: u32 },
    Idle,
    Fireball { elapsed: u32 },
    /// Waits until its warnings and pillars have burned out.
    Flame,
    Charge(ChargePhase),
    Dead,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AttackCooldowns {
    pub fireball: u32,
    pub flame: u32,
    pub charge: u32,
    pub global: u32,
}

impl AttackCooldowns {
    pub fn tick(&mut self) {
        self.fireball = self.fireball.saturating_sub(1);
        self.flame = self.flame.saturating_sub(1);
        self.charge = self.charge.saturating_sub(1);
        self.global = self.global.saturating_sub(1);
    }

    pub fn ready(&self, attack: BossAttack) -> bool {
        match attack {
            BossAttack::Fireball => self.fireball == 0,
            BossAttack::Flame => self.flame == 0,
            BossAttack::Charge => self.charge == 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Boss {
    pub body: Body,
    pub hp: u32,
    pub max_hp: u32,
    pub touch_damage: u32,
    pub facing: Facing,
    pub mode: BossMode,
    pub cooldowns: AttackCooldowns,
    pub last_hit: Option<AttackId>,
}

impl Boss {
    pub fn new(x: f32, y: f32, wake_ticks: u32) -> Self {
        Boss {
            body: Body::new(x, y, BOSS_W, BOSS_H),
            hp: BOSS_MAX_HP,
            max_hp: BOSS_MAX_HP,
            touch_damage: BOSS_TOUCH_DAMAGE,
            facing: Facing::Left,
            mode: BossMode::Dormant { ticks_left: wake_ticks },
            cooldowns: AttackCooldowns::default(),
            last_hit: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.mode != BossMode::Dead
    }

    pub fn is_dormant(&self) -> bool {
        matches!(self.mode, BossMode::Dormant { .. })
    }
}

// ══════════════════════════════════════════════════════════════
// Key, door
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct KeyItem {
    pub rect: Rect,
    pub active: bool,
    pub collected: bool,
}

impl KeyItem {
    pub fn new(x: f32, y: f32) -> Self {
        KeyItem { rect: Rect::new(x, y, KEY_SIZE, KEY_SIZE), active: true, collected: false }
    }
}

#[derive(Clone, Debug)]
pub struct Door {
    pub rect: Rect,
    /// Extra horizontal reach of the interact zone on each side.
    pub trigger_margin: f32,
    pub open: bool,
}

impl Door {
    pub fn new(rect: Rect, trigger_margin: f32) -> Self {
        Door { rect, trigger_margin, open: false }
    }

    pub fn trigger_zone(&self) -> Rect {
        self.rect.inflate_x(self.trigger_margin)
    }
}

// ══════════════════════════════════════════════════════════════
// Projectiles & hazards
// ══════════════════════════════════════════════════════════════

/// Straight-flying shot (elite bolt, boss fireball). No gravity.
#[derive(Clone, Debug)]
pub struct Projectile {
    pub body: Body,
    pub life: u32,
    pub damage: u32,
}

impl Projectile {
    pub fn new(x: f32, y: f32, w: f32, h: f32, vx: f32, life: u32, damage: u32) -> Self {
        let mut body = Body::new(x, y, w, h);
        body.vx = vx;
        Projectile { body, life, damage }
    }

    /// Advance one tick. Returns false once expended.
    pub fn tick(&mut self) -> bool {
        self.body.x += self.body.vx;
        self.body.y += self.body.vy;
        self.life = self.life.saturating_sub(1);
        self.life > 0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FlamePhase {
    /// Harmless floor marker.
    Warning { ticks_left: u32 },
    Pillar { age: u32 },
}

/// Boss flame: a floor warning that erupts into a rising/falling pillar.
#[derive(Clone, Debug)]
pub struct Flame {
    pub x: f32,
    pub floor_y: f32,
    pub phase: FlamePhase,
}

impl Flame {
    pub fn new(center_x: f32, floor_y: f32) -> Self {
        Flame {
            x: center_x - FLAME_W / 2.0,
            floor_y,
            phase: FlamePhase::Warning { ticks_left: FLAME_WARNING_TICKS },
        }
    }

    /// Current pillar height: rises over the first half, falls over the second.
    pub fn pillar_height(&self) -> f32 {
        match self.phase {
            FlamePhase::Warning { .. } => 0.0,
            FlamePhase::Pillar { age } => {
                let half = FLAME_PILLAR_TICKS as f32 / 2.0;
                let t = age as f32;
                let ratio = if t <= half { t / half } else { (FLAME_PILLAR_TICKS as f32 - t) / half };
                FLAME_PILLAR_MAX_H * ratio.clamp(0.0, 1.0)
            }
        }
    }

    /// Damaging area, if any.
    pub fn hitbox(&self) -> Option<Rect> {
        let h = self.pillar_height();
        if h <= 0.0 { return None; }
        Some(Rect::new(self.x, self.floor_y - h, FLAME_W, h))
    }

    /// Advance one tick. Returns false once the pillar has burned out.
    pub fn tick(&mut self) -> bool {
        match self.phase {
            FlamePhase::Warning { ticks_left } => {
                if ticks_left <= 1 {
                    self.phase = FlamePhase::Pillar { age: 0 };
                } else {
                    self.phase = FlamePhase::Warning { ticks_left: ticks_left - 1 };
                }
                true
            }
            FlamePhase::Pillar { age } => {
                let age = age + 1;
                self.phase = FlamePhase::Pillar { age };
                age < FLAME_PILLAR_TICKS
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_ids_are_unique_and_increasing() {
        let mut ids = AttackIdGen::default();
        let a = ids.mint();
        let b = ids.mint();
        assert_ne!(a, b);
        assert_eq!(a, AttackId(1));
        assert_eq!(b, AttackId(2));
    }

    #[test]
    fn active_attack_requires_timer() {
        let mut p = Player::new(0.0, 0.0);
        let mut ids = AttackIdGen::default();
        p.attack_id = Some(ids.mint());
        assert_eq!(p.active_attack(), None);
        p.attack_timer = 3;
        assert!(p.active_attack().is_some());
    }

    #[test]
    fn monster_reset_restores_seed() {
        let mut m = Monster::new(0, 420.0, 250.0, 300.0, 560.0, Facing::Left);
        m.body.x = 999.0;
        m.hp = 0;
        m.state = MonsterState::Respawning { ticks_left: 0 };
        m.reset(Facing::Right);
        assert_eq!(m.body.x, 420.0);
        assert_eq!(m.body.y, 250.0);
        assert_eq!(m.hp, MONSTER_MAX_HP);
        assert_eq!(m.dir, Facing::Right);
        assert!(m.is_alive());
    }

    #[test]
    fn cooldowns_saturate_at_zero() {
        let mut cd = AttackCooldowns { fireball: 1, flame: 0, charge: 2, global: 0 };
        cd.tick();
        cd.tick();
        cd.tick();
        assert!(cd.ready(BossAttack::Fireball));
        assert!(cd.ready(BossAttack::Flame));
        assert!(cd.ready(BossAttack::Charge));
        assert_eq!(cd.global, 0);
    }

    #[test]
    fn flame_warning_is_harmless_then_pillar_burns_out() {
        let mut f = Flame::new(500.0, 470.0);
        assert_eq!(f.hitbox(), None);
        for _ in 0..FLAME_WARNING_TICKS {
            assert!(f.tick());
        }
        assert_eq!(f.phase, FlamePhase::Pillar { age: 0 });

        let mut peak = 0.0_f32;
        let mut alive = true;
        let mut ticks = 0;
        while alive {
            alive = f.tick();
            peak = peak.max(f.pillar_height());
            ticks += 1;
        }
        assert_eq!(ticks, FLAME_PILLAR_TICKS);
        assert!((peak - FLAME_PILLAR_MAX_H).abs() < 0.01);
        assert_eq!(f.hitbox(), None);
    }

    #[test]
    fn projectile_expires_after_life() {
        let mut p = Projectile::new(0.0, 0.0, 10.0, 10.0, 3.0, 2, 5);
        assert!(p.tick());
        assert!(!p.tick());
        assert_eq!(p.body.x, 6.0);
    }

    #[test]
    fn door_trigger_zone_is_wider_than_door() {
        let d = Door::new(Rect::new(100.0, 0.0, 60.0, 110.0), 30.0);
        let z = d.trigger_zone();
        assert_eq!(z.x, 70.0);
        assert_eq!(z.w, 120.0);
    }
}
