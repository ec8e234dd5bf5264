/// Enemy behavior machines: monster patrol, elite skill cast, boss attacks.
///
/// Each `update_*` advances one entity by one tick and reports what it
/// spawned; the step owns the projectile lists and the player, so nothing
/// here touches them directly.
///
/// ## Monster
///   Patrol ──hit──▶ Knocked ──timer──▶ Patrol
///   any    ──hp 0─▶ Respawning ──timer──▶ Patrol (seed position, random dir)
///
/// ## Elite
///   Idle ──cooldown 0 ∧ player in sight──▶ Windup ──timer──▶ Fire ──timer──▶ Idle
///   any live ──hit──▶ Hurt ──timer──▶ Idle
///   any live ──hp 0─▶ Dead
///
/// ## Boss
///   Dormant ──timer──▶ Idle
///   Idle ──global cd 0 ∧ no remnants ∧ some attack ready ∧ Y-aligned──▶
///        Fireball | Flame | Charge(Windup ──▶ Dash)
///   every attack ──done──▶ Idle (own cooldown + global cooldown)
///   any ──hp 0──▶ Dead

use super::entity::{
    AttackId, Boss, BossAttack, BossMode, ChargePhase, Elite, EliteState, Facing, Flame,
    Monster, MonsterState, Projectile,
};
use super::physics::{self, Rect};
use super::rng::SimpleRng;

// ── Monster ──

pub const MONSTER_SPEED: f32 = 1.2;
pub const MONSTER_KNOCK_TICKS: u32 = 10;
pub const MONSTER_KNOCKBACK: f32 = 2.8;
pub const MONSTER_RESPAWN_TICKS: u32 = 240;
const KNOCK_DECAY: f32 = 0.85;

// ── Elite ──

pub const ELITE_SPEED: f32 = 1.0;
pub const ELITE_SIGHT_RANGE: f32 = 560.0;
pub const ELITE_WINDUP_TICKS: u32 = 36;
pub const ELITE_WINDUP_CREEP: f32 = 0.4;
pub const ELITE_FIRE_TICKS: u32 = 12;
pub const ELITE_SKILL_COOLDOWN: u32 = 150;
pub const ELITE_HURT_TICKS: u32 = 24;
pub const ELITE_KNOCKBACK: f32 = 6.0;

pub const BOLT_W: f32 = 20.0;
pub const BOLT_H: f32 = 14.0;
pub const BOLT_SPEED: f32 = 6.0;
pub const BOLT_LIFE: u32 = 120;
pub const BOLT_DAMAGE: u32 = 14;

// ── Boss ──

pub const BOSS_WAKE_TICKS: u32 = 60;
pub const BOSS_GLOBAL_COOLDOWN: u32 = 50;
pub const BOSS_ALIGN_TOLERANCE: f32 = 24.0;
pub const BOSS_ALIGN_SPEED: f32 = 2.2;
pub const BOSS_STANDOFF: f32 = 260.0;
pub const BOSS_DRIFT_SPEED: f32 = 1.0;
pub const BOSS_HIT_NUDGE: f32 = 14.0;
const BOSS_RESIDUAL_DECAY: f32 = 0.9;

pub const FIREBALL_WINDUP_TICKS: u32 = 40;
pub const FIREBALL_RELEASE_TICK: u32 = 20;
pub const FIREBALL_COOLDOWN: u32 = 90;
pub const FIREBALL_W: f32 = 28.0;
pub const FIREBALL_H: f32 = 20.0;
pub const FIREBALL_SPEED: f32 = 7.0;
pub const FIREBALL_LIFE: u32 = 160;
pub const FIREBALL_DAMAGE: u32 = 16;

pub const FLAME_COOLDOWN: u32 = 180;

pub const CHARGE_WINDUP_TICKS: u32 = 45;
pub const CHARGE_WINDUP_CREEP: f32 = 0.6;
pub const CHARGE_DASH_TICKS: u32 = 70;
pub const CHARGE_DASH_SPEED: f32 = 11.0;
pub const CHARGE_RESIDUAL_SPEED: f32 = 1.5;
pub const CHARGE_COOLDOWN: u32 = 240;

/// What the AI knows about the player this tick (already moved).
#[derive(Clone, Copy, Debug)]
pub struct Target {
    pub center_x: f32,
    pub center_y: f32,
    pub in_main_area: bool,
}

/// Result of a player swing landing on an enemy.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Strike {
    /// Same swing already landed, or target not hittable.
    Ignored,
    Hit { damage: u32 },
    Killed { damage: u32 },
}

// ══════════════════════════════════════════════════════════════
// Monster
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MonsterTick {
    Active,
    Waiting,
    Respawned,
}

pub fn update_monster(m: &mut Monster, platforms: &[Rect], rng: &mut SimpleRng) -> MonsterTick {
    match m.state {
        MonsterState::Respawning { ticks_left } => {
            if ticks_left <= 1 {
                let dir = if rng.coin() { Facing::Right } else { Facing::Left };
                m.reset(dir);
                return MonsterTick::Respawned;
            }
            m.state = MonsterState::Respawning { ticks_left: ticks_left - 1 };
            return MonsterTick::Waiting;
        }
        MonsterState::Patrol => {
            m.body.vx = m.dir.sign() * MONSTER_SPEED;
        }
        MonsterState::Knocked { .. } => {}
    }

    physics::integrate(&mut m.body);

    match m.state {
        MonsterState::Patrol => {
            if m.body.x < m.left {
                m.dir = Facing::Right;
            } else if m.body.x + m.body.w > m.right {
                m.dir = Facing::Left;
            }
        }
        MonsterState::Knocked { ticks_left } => {
            m.body.vx *= KNOCK_DECAY;
            m.state = if ticks_left <= 1 {
                MonsterState::Patrol
            } else {
                MonsterState::Knocked { ticks_left: ticks_left - 1 }
            };
        }
        MonsterState::Respawning { .. } => {}
    }

    physics::resolve_against_platforms(&mut m.body, platforms);
    MonsterTick::Active
}

pub fn strike_monster(m: &mut Monster, id: AttackId, damage: u32, from: Facing) -> Strike {
    if !m.is_alive() || m.last_hit == Some(id) { return Strike::Ignored; }
    m.last_hit = Some(id);
    m.hp = m.hp.saturating_sub(damage);
    if m.hp == 0 {
        m.state = MonsterState::Respawning { ticks_left: MONSTER_RESPAWN_TICKS };
        m.body.vx = 0.0;
        return Strike::Killed { damage };
    }
    m.state = MonsterState::Knocked { ticks_left: MONSTER_KNOCK_TICKS };
    m.body.vx = from.sign() * MONSTER_KNOCKBACK;
    Strike::Hit { damage }
}

// ══════════════════════════════════════════════════════════════
// Elite guard
// ══════════════════════════════════════════════════════════════

/// Advance the elite one tick. Returns a bolt when the skill fires.
pub fn update_elite(e: &mut Elite, platforms: &[Rect], target: &Target) -> Option<Projectile> {
    if !e.is_alive() { return None; }

    e.skill_cooldown = e.skill_cooldown.saturating_sub(1);
    let mut bolt = None;

    match e.state {
        EliteState::Idle => {
            let dx = target.center_x - e.body.center_x();
            if e.skill_cooldown == 0 && target.in_main_area && dx.abs() <= ELITE_SIGHT_RANGE {
                let dir = Facing::toward(e.body.center_x(), target.center_x);
                e.dir = dir;
                e.body.vx = 0.0;
                e.state = EliteState::Windup { ticks_left: ELITE_WINDUP_TICKS, dir };
            } else {
                e.body.vx = e.dir.sign() * ELITE_SPEED;
            }
        }
        EliteState::Windup { ticks_left, dir } => {
            e.body.vx = -dir.sign() * ELITE_WINDUP_CREEP;
            if ticks_left <= 1 {
                bolt = Some(spawn_bolt(e, dir));
                e.skill_cooldown = ELITE_SKILL_COOLDOWN;
                e.state = EliteState::Fire { ticks_left: ELITE_FIRE_TICKS };
            } else {
                e.state = EliteState::Windup { ticks_left: ticks_left - 1, dir };
            }
        }
        EliteState::Fire { ticks_left } => {
            e.body.vx = 0.0;
            e.state = if ticks_left <= 1 { EliteState::Idle } else { EliteState::Fire { ticks_left: ticks_left - 1 } };
        }
        EliteState::Hurt { ticks_left } => {
            e.body.vx = e.knock_vx;
            e.knock_vx *= KNOCK_DECAY;
            e.state = if ticks_left <= 1 { EliteState::Idle } else { EliteState::Hurt { ticks_left: ticks_left - 1 } };
        }
        EliteState::Dead => {}
    }

    physics::integrate(&mut e.body);

    // Patrol turnaround, then hard clamp to the patrol strip
    if e.state == EliteState::Idle {
        if e.body.x < e.left {
            e.dir = Facing::Right;
        } else if e.body.x + e.body.w > e.right {
            e.dir = Facing::Left;
        }
    }
    e.body.clamp_x(e.left, e.right);

    physics::resolve_against_platforms(&mut e.body, platforms);
    bolt
}

fn spawn_bolt(e: &Elite, dir: Facing) -> Projectile {
    let x = match dir {
        Facing::Right => e.body.x + e.body.w,
        Facing::Left => e.body.x - BOLT_W,
    };
    let y = e.body.center_y() - BOLT_H / 2.0;
    Projectile::new(x, y, BOLT_W, BOLT_H, dir.sign() * BOLT_SPEED, BOLT_LIFE, BOLT_DAMAGE)
}

/// Land a swing on the elite. Any live skill state is cancelled.
pub fn strike_elite(e: &mut Elite, id: AttackId, damage: u32, from: Facing) -> Strike {
    if !e.is_alive() || e.last_hit == Some(id) { return Strike::Ignored; }
    e.last_hit = Some(id);
    e.hp = e.hp.saturating_sub(damage);
    if e.hp == 0 {
        e.state = EliteState::Dead;
        e.body.vx = 0.0;
        e.knock_vx = 0.0;
        return Strike::Killed { damage };
    }
    e.state = EliteState::Hurt { ticks_left: ELITE_HURT_TICKS };
    e.knock_vx = from.sign() * ELITE_KNOCKBACK;
    Strike::Hit { damage }
}

// ══════════════════════════════════════════════════════════════
// Boss
// ══════════════════════════════════════════════════════════════

/// How the boss chooses among ready attacks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AttackPick {
    Random,
    /// Fireball, then flame, then charge.
    Priority,
}

const ATTACK_ORDER: [BossAttack; 3] = [BossAttack::Fireball, BossAttack::Flame, BossAttack::Charge];

/// Room geometry and world knowledge the boss needs for one tick.
pub struct BossCtx<'a> {
    pub left: f32,
    pub right: f32,
    pub min_y: f32,
    pub floor_y: f32,
    pub target: Target,
    pub fireballs_live: bool,
    pub flames_live: bool,
    pub pick: AttackPick,
    pub rng: &'a mut SimpleRng,
}

/// Everything the boss did this tick.
#[derive(Clone, Debug, Default)]
pub struct BossTick {
    pub woke: bool,
    pub aligning: bool,
    pub started: Option<BossAttack>,
    pub finished: Option<BossAttack>,
    pub fireball: Option<Projectile>,
    pub flame: Option<Flame>,
}

pub fn update_boss(boss: &mut Boss, ctx: &mut BossCtx) -> BossTick {
    let mut out = BossTick::default();
    if !boss.is_alive() { return out; }

    boss.cooldowns.tick();

    match boss.mode {
        BossMode::Dormant { ticks_left } => {
            if ticks_left <= 1 {
                boss.mode = BossMode::Idle;
                boss.cooldowns.global = BOSS_GLOBAL_COOLDOWN;
                out.woke = true;
            } else {
                boss.mode = BossMode::Dormant { ticks_left: ticks_left - 1 };
            }
        }
        BossMode::Idle => idle(boss, ctx, &mut out),
        BossMode::Fireball { elapsed } => {
            let elapsed = elapsed + 1;
            if elapsed == FIREBALL_RELEASE_TICK {
                out.fireball = Some(spawn_fireball(boss, &ctx.target));
            }
            if elapsed >= FIREBALL_WINDUP_TICKS {
                finish(boss, BossAttack::Fireball, &mut out);
            } else {
                boss.mode = BossMode::Fireball { elapsed };
            }
        }
        BossMode::Flame => {
            if !ctx.flames_live {
                finish(boss, BossAttack::Flame, &mut out);
            }
        }
        BossMode::Charge(ChargePhase::Windup { ticks_left, dir }) => {
            boss.body.x -= dir.sign() * CHARGE_WINDUP_CREEP;
            boss.mode = if ticks_left <= 1 {
                BossMode::Charge(ChargePhase::Dash { ticks_left: CHARGE_DASH_TICKS, dir })
            } else {
                BossMode::Charge(ChargePhase::Windup { ticks_left: ticks_left - 1, dir })
            };
        }
        BossMode::Charge(ChargePhase::Dash { ticks_left, dir }) => {
            boss.body.x += dir.sign() * CHARGE_DASH_SPEED;
            let hit_wall = boss.body.x <= ctx.left || boss.body.x + boss.body.w >= ctx.right;
            if hit_wall || ticks_left <= 1 {
                let back = Facing::toward(boss.body.center_x(), ctx.target.center_x);
                boss.body.vx = back.sign() * CHARGE_RESIDUAL_SPEED;
                finish(boss, BossAttack::Charge, &mut out);
            } else {
                boss.mode = BossMode::Charge(ChargePhase::Dash { ticks_left: ticks_left - 1, dir });
            }
        }
        BossMode::Dead => {}
    }

    boss.body.clamp_x(ctx.left, ctx.right);
    boss.body.y = boss.body.y.max(ctx.min_y).min(ctx.floor_y - boss.body.h);
    out
}

fn idle(boss: &mut Boss, ctx: &mut BossCtx, out: &mut BossTick) {
    let cx = boss.body.center_x();
    boss.facing = Facing::toward(cx, ctx.target.center_x);

    // Residual motion (e.g. after a charge) plus a slow approach to standoff range
    boss.body.x += boss.body.vx;
    boss.body.vx *= BOSS_RESIDUAL_DECAY;
    if boss.body.vx.abs() < 0.05 { boss.body.vx = 0.0; }
    let dx = ctx.target.center_x - cx;
    if dx.abs() > BOSS_STANDOFF {
        boss.body.x += dx.signum() * BOSS_DRIFT_SPEED;
    }

    if boss.cooldowns.global > 0 || ctx.fireballs_live || ctx.flames_live { return; }

    let ready: Vec<BossAttack> = ATTACK_ORDER
        .iter()
        .copied()
        .filter(|a| boss.cooldowns.ready(*a))
        .collect();
    if ready.is_empty() { return; }

    // Only commit once roughly level with the player, measured against the
    // height the boss can actually reach (a crouching player sits below it).
    let half_h = boss.body.h / 2.0;
    let reachable_y = ctx.target.center_y.clamp(ctx.min_y + half_h, ctx.floor_y - half_h);
    let dy = reachable_y - boss.body.center_y();
    if dy.abs() > BOSS_ALIGN_TOLERANCE {
        boss.body.y += dy.signum() * dy.abs().min(BOSS_ALIGN_SPEED);
        out.aligning = true;
        return;
    }

    let attack = match ctx.pick {
        AttackPick::Priority => ready[0],
        AttackPick::Random => ready[ctx.rng.index(ready.len())],
    };
    begin(boss, attack, ctx, out);
}

fn begin(boss: &mut Boss, attack: BossAttack, ctx: &BossCtx, out: &mut BossTick) {
    boss.body.vx = 0.0;
    match attack {
        BossAttack::Fireball => {
            boss.mode = BossMode::Fireball { elapsed: 0 };
        }
        BossAttack::Flame => {
            boss.mode = BossMode::Flame;
            out.flame = Some(Flame::new(ctx.target.center_x, ctx.floor_y));
        }
        BossAttack::Charge => {
            let dir = Facing::toward(boss.body.center_x(), ctx.target.center_x);
            boss.mode = BossMode::Charge(ChargePhase::Windup { ticks_left: CHARGE_WINDUP_TICKS, dir });
        }
    }
    out.started = Some(attack);
}

fn finish(boss: &mut Boss, attack: BossAttack, out: &mut BossTick) {
    match attack {
        BossAttack::Fireball => boss.cooldowns.fireball = FIREBALL_COOLDOWN,
        BossAttack::Flame => boss.cooldowns.flame = FLAME_COOLDOWN,
        BossAttack::Charge => boss.cooldowns.charge = CHARGE_COOLDOWN,
    }
    boss.cooldowns.global = BOSS_GLOBAL_COOLDOWN;
    boss.mode = BossMode::Idle;
    out.finished = Some(attack);
}

fn spawn_fireball(boss: &Boss, target: &Target) -> Projectile {
    let dir = Facing::toward(boss.body.center_x(), target.center_x);
    let x = match dir {
        Facing::Right => boss.body.x + boss.body.w,
        Facing::Left => boss.body.x - FIREBALL_W,
    };
    let y = boss.body.center_y() - FIREBALL_H / 2.0;
    Projectile::new(x, y, FIREBALL_W, FIREBALL_H, dir.sign() * FIREBALL_SPEED, FIREBALL_LIFE, FIREBALL_DAMAGE)
}

/// Land a swing on the boss: damage plus a nudge away from the hit.
pub fn strike_boss(boss: &mut Boss, id: AttackId, damage: u32, from: Facing) -> Strike {
    if !boss.is_alive() || boss.last_hit == Some(id) { return Strike::Ignored; }
    boss.last_hit = Some(id);
    boss.hp = boss.hp.saturating_sub(damage);
    boss.body.x += from.sign() * BOSS_HIT_NUDGE;
    if boss.hp == 0 {
        boss.mode = BossMode::Dead;
        boss.body.vx = 0.0;
        return Strike::Killed { damage };
    }
    Strike::Hit { damage }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{AttackIdGen, ELITE_MAX_HP};

    fn ground() -> Vec<Rect> {
        vec![Rect::new(0.0, 470.0, 5000.0, 70.0)]
    }

    fn target_at(x: f32, y: f32) -> Target {
        Target { center_x: x, center_y: y, in_main_area: true }
    }

    // ── monster ──

    #[test]
    fn monster_patrol_reverses_at_bounds() {
        let mut rng = SimpleRng::new(1);
        let mut m = Monster::new(0, 300.0, 418.0, 290.0, 400.0, Facing::Right);
        let mut saw_left = false;
        for _ in 0..400 {
            update_monster(&mut m, &ground(), &mut rng);
            if m.dir == Facing::Left { saw_left = true; }
            assert!(m.body.x > 280.0 && m.body.x + m.body.w < 410.0);
        }
        assert!(saw_left);
        assert!(m.body.on_ground);
    }

    #[test]
    fn knocked_monster_does_not_patrol() {
        let mut rng = SimpleRng::new(1);
        let mut ids = AttackIdGen::default();
        let mut m = Monster::new(0, 300.0, 418.0, 0.0, 1000.0, Facing::Right);
        m.hp = 100;
        let r = strike_monster(&mut m, ids.mint(), 1, Facing::Left);
        assert_eq!(r, Strike::Hit { damage: 1 });
        let x0 = m.body.x;
        update_monster(&mut m, &ground(), &mut rng);
        assert!(m.body.x < x0, "knockback carries it left despite patrolling right");
        for _ in 0..MONSTER_KNOCK_TICKS {
            update_monster(&mut m, &ground(), &mut rng);
        }
        assert_eq!(m.state, MonsterState::Patrol);
    }

    #[test]
    fn monster_dies_and_respawns_at_seed() {
        let mut rng = SimpleRng::new(3);
        let mut ids = AttackIdGen::default();
        let mut m = Monster::new(2, 300.0, 418.0, 0.0, 1000.0, Facing::Right);
        for _ in 0..50 { update_monster(&mut m, &ground(), &mut rng); }
        let r = strike_monster(&mut m, ids.mint(), 9999, Facing::Right);
        assert_eq!(r, Strike::Killed { damage: 9999 });
        assert!(!m.is_alive());

        let mut respawned_at = None;
        for t in 1..=MONSTER_RESPAWN_TICKS {
            if update_monster(&mut m, &ground(), &mut rng) == MonsterTick::Respawned {
                respawned_at = Some(t);
                break;
            }
        }
        assert_eq!(respawned_at, Some(MONSTER_RESPAWN_TICKS));
        assert!(m.is_alive());
        assert_eq!(m.body.x, 300.0);
        assert_eq!(m.hp, m.max_hp);
    }

    #[test]
    fn same_swing_never_hits_twice() {
        let mut ids = AttackIdGen::default();
        let mut m = Monster::new(0, 0.0, 0.0, 0.0, 100.0, Facing::Right);
        m.hp = 100;
        let id = ids.mint();
        assert_eq!(strike_monster(&mut m, id, 10, Facing::Right), Strike::Hit { damage: 10 });
        assert_eq!(strike_monster(&mut m, id, 10, Facing::Right), Strike::Ignored);
        assert_eq!(m.hp, 90);
        assert_eq!(strike_monster(&mut m, ids.mint(), 10, Facing::Right), Strike::Hit { damage: 10 });
        assert_eq!(m.hp, 80);
    }

    // ── elite ──

    fn elite() -> Elite {
        let mut e = Elite::new(2200.0, 406.0, 2000.0, 2500.0);
        e.body.on_ground = true;
        e
    }

    #[test]
    fn elite_winds_up_then_fires_toward_player() {
        let mut e = elite();
        let t = target_at(1900.0, 440.0);
        assert!(update_elite(&mut e, &ground(), &t).is_none());
        assert!(matches!(e.state, EliteState::Windup { dir: Facing::Left, .. }));

        let x_before = e.body.x;
        let mut bolt = None;
        for _ in 0..ELITE_WINDUP_TICKS {
            if let Some(b) = update_elite(&mut e, &ground(), &t) {
                bolt = Some(b);
            }
        }
        let bolt = bolt.expect("bolt fired at end of windup");
        assert!(bolt.body.vx < 0.0);
        assert!(e.body.x > x_before, "creeps backward during windup");
        assert!(matches!(e.state, EliteState::Fire { .. }));
        assert_eq!(e.skill_cooldown, ELITE_SKILL_COOLDOWN);

        for _ in 0..ELITE_FIRE_TICKS {
            update_elite(&mut e, &ground(), &t);
        }
        assert_eq!(e.state, EliteState::Idle);
    }

    #[test]
    fn elite_ignores_player_out_of_sight() {
        let mut e = elite();
        let far = target_at(2200.0 - ELITE_SIGHT_RANGE - 100.0, 440.0);
        for _ in 0..10 {
            assert!(update_elite(&mut e, &ground(), &far).is_none());
        }
        assert_eq!(e.state, EliteState::Idle);

        let mut other_room = target_at(2100.0, 440.0);
        other_room.in_main_area = false;
        update_elite(&mut e, &ground(), &other_room);
        assert_eq!(e.state, EliteState::Idle);
    }

    #[test]
    fn hit_cancels_windup_and_stuns() {
        let mut ids = AttackIdGen::default();
        let mut e = elite();
        let t = target_at(2000.0, 440.0);
        update_elite(&mut e, &ground(), &t);
        assert!(matches!(e.state, EliteState::Windup { .. }));

        assert_eq!(strike_elite(&mut e, ids.mint(), 1, Facing::Right), Strike::Hit { damage: 1 });
        assert_eq!(e.state, EliteState::Hurt { ticks_left: ELITE_HURT_TICKS });

        let x0 = e.body.x;
        for _ in 0..ELITE_HURT_TICKS {
            assert!(update_elite(&mut e, &ground(), &t).is_none());
        }
        assert!(e.body.x > x0, "drifts with the knockback");
        assert_eq!(e.state, EliteState::Idle);
    }

    #[test]
    fn elite_dies_after_max_hp_hits() {
        let mut ids = AttackIdGen::default();
        let mut e = elite();
        for i in 0..ELITE_MAX_HP {
            let r = strike_elite(&mut e, ids.mint(), 1, Facing::Right);
            if i + 1 < ELITE_MAX_HP {
                assert_eq!(r, Strike::Hit { damage: 1 });
            } else {
                assert_eq!(r, Strike::Killed { damage: 1 });
            }
        }
        assert!(!e.is_alive());
        assert_eq!(strike_elite(&mut e, ids.mint(), 1, Facing::Right), Strike::Ignored);
        assert!(update_elite(&mut e, &ground(), &target_at(2100.0, 440.0)).is_none());
    }

    // ── boss ──

    fn awake_boss(x: f32, y: f32) -> Boss {
        let mut b = Boss::new(x, y, 1);
        b.mode = BossMode::Idle;
        b
    }

    fn ctx<'a>(rng: &'a mut SimpleRng, target: Target) -> BossCtx<'a> {
        BossCtx {
            left: 3000.0,
            right: 3960.0,
            min_y: 120.0,
            floor_y: 470.0,
            target,
            fireballs_live: false,
            flames_live: false,
            pick: AttackPick::Priority,
            rng,
        }
    }

    #[test]
    fn dormant_boss_wakes_after_timer() {
        let mut rng = SimpleRng::new(1);
        let mut b = Boss::new(3700.0, 300.0, 3);
        let mut c = ctx(&mut rng, target_at(3100.0, 440.0));
        assert!(!update_boss(&mut b, &mut c).woke);
        assert!(!update_boss(&mut b, &mut c).woke);
        let t = update_boss(&mut b, &mut c);
        assert!(t.woke);
        assert_eq!(b.mode, BossMode::Idle);
        assert_eq!(b.cooldowns.global, BOSS_GLOBAL_COOLDOWN);
    }

    #[test]
    fn boss_aligns_vertically_before_attacking() {
        let mut rng = SimpleRng::new(1);
        let mut b = awake_boss(3600.0, 150.0); // center_y 198, player at 440
        let mut c = ctx(&mut rng, target_at(3400.0, 440.0));
        let t = update_boss(&mut b, &mut c);
        assert!(t.aligning);
        assert_eq!(t.started, None);
        assert!((b.body.y - (150.0 + BOSS_ALIGN_SPEED)).abs() < 1e-4);

        let mut started = None;
        for _ in 0..200 {
            let t = update_boss(&mut b, &mut c);
            if t.started.is_some() {
                started = t.started;
                break;
            }
        }
        assert_eq!(started, Some(BossAttack::Fireball));
        assert!((b.body.center_y() - 440.0).abs() <= BOSS_ALIGN_TOLERANCE);
    }

    #[test]
    fn boss_on_the_floor_counts_as_level_with_a_lower_target() {
        let mut rng = SimpleRng::new(1);
        let mut b = awake_boss(3600.0, 374.0); // lowest reachable, center_y 422
        let mut c = ctx(&mut rng, target_at(3200.0, 450.0)); // crouching height
        let t = update_boss(&mut b, &mut c);
        assert!(!t.aligning);
        assert_eq!(t.started, Some(BossAttack::Fireball));
        assert_eq!(b.body.y, 374.0);
    }

    #[test]
    fn fireball_released_mid_windup_then_cooldowns_set() {
        let mut rng = SimpleRng::new(1);
        let mut b = awake_boss(3600.0, 374.0); // resting on the floor, center_y 422
        let mut c = ctx(&mut rng, target_at(3200.0, 440.0));
        let t = update_boss(&mut b, &mut c);
        assert_eq!(t.started, Some(BossAttack::Fireball));

        let mut released = 0;
        let mut finished_at = None;
        for tick in 1..=FIREBALL_WINDUP_TICKS {
            let t = update_boss(&mut b, &mut c);
            if let Some(f) = t.fireball {
                released += 1;
                assert_eq!(tick, FIREBALL_RELEASE_TICK);
                assert!(f.body.vx < 0.0, "aimed toward the player's side");
            }
            if t.finished.is_some() {
                finished_at = Some(tick);
            }
        }
        assert_eq!(released, 1);
        assert_eq!(finished_at, Some(FIREBALL_WINDUP_TICKS));
        assert_eq!(b.mode, BossMode::Idle);
        assert_eq!(b.cooldowns.fireball, FIREBALL_COOLDOWN);
        assert_eq!(b.cooldowns.global, BOSS_GLOBAL_COOLDOWN);
    }

    #[test]
    fn remnants_block_new_attacks() {
        let mut rng = SimpleRng::new(1);
        let mut b = awake_boss(3600.0, 374.0);
        let mut c = ctx(&mut rng, target_at(3200.0, 440.0));
        c.fireballs_live = true;
        for _ in 0..20 {
            assert_eq!(update_boss(&mut b, &mut c).started, None);
        }
        c.fireballs_live = false;
        c.flames_live = true;
        assert_eq!(update_boss(&mut b, &mut c).started, None);
        c.flames_live = false;
        assert!(update_boss(&mut b, &mut c).started.is_some());
    }

    #[test]
    fn flame_spawns_under_player_and_waits_for_burnout() {
        let mut rng = SimpleRng::new(1);
        let mut b = awake_boss(3600.0, 374.0);
        b.cooldowns.fireball = 500;
        let mut c = ctx(&mut rng, target_at(3250.0, 440.0));
        let t = update_boss(&mut b, &mut c);
        assert_eq!(t.started, Some(BossAttack::Flame));
        let flame = t.flame.expect("warning spawned");
        assert!((flame.x + 30.0 - 3250.0).abs() < 1e-4);

        c.flames_live = true;
        for _ in 0..30 {
            assert_eq!(update_boss(&mut b, &mut c).finished, None);
            assert_eq!(b.mode, BossMode::Flame);
        }
        c.flames_live = false;
        assert_eq!(update_boss(&mut b, &mut c).finished, Some(BossAttack::Flame));
        assert_eq!(b.cooldowns.flame, FLAME_COOLDOWN);
    }

    #[test]
    fn charge_windup_then_dash_until_wall() {
        let mut rng = SimpleRng::new(1);
        let mut b = awake_boss(3600.0, 374.0);
        b.cooldowns.fireball = 900;
        b.cooldowns.flame = 900;
        let mut c = ctx(&mut rng, target_at(3200.0, 440.0));
        assert_eq!(update_boss(&mut b, &mut c).started, Some(BossAttack::Charge));

        let x0 = b.body.x;
        for _ in 0..CHARGE_WINDUP_TICKS {
            update_boss(&mut b, &mut c);
        }
        assert!(b.body.x > x0, "creeps away from the player during windup");
        assert!(matches!(b.mode, BossMode::Charge(ChargePhase::Dash { dir: Facing::Left, .. })));

        let mut finished = false;
        for _ in 0..CHARGE_DASH_TICKS {
            if update_boss(&mut b, &mut c).finished == Some(BossAttack::Charge) {
                finished = true;
                break;
            }
        }
        assert!(finished);
        assert_eq!(b.body.x, 3000.0, "stopped at the room wall");
        assert!(b.body.vx > 0.0, "residual velocity back toward the player");
        assert_eq!(b.cooldowns.charge, CHARGE_COOLDOWN);
    }

    #[test]
    fn random_pick_only_chooses_ready_attacks() {
        let mut rng = SimpleRng::new(42);
        for _ in 0..30 {
            let mut b = awake_boss(3600.0, 374.0);
            b.cooldowns.flame = 10;
            let mut c = ctx(&mut rng, target_at(3200.0, 440.0));
            c.pick = AttackPick::Random;
            let started = update_boss(&mut b, &mut c).started;
            assert!(matches!(started, Some(BossAttack::Fireball) | Some(BossAttack::Charge)));
        }
    }

    #[test]
    fn boss_strike_nudges_and_kills() {
        let mut ids = AttackIdGen::default();
        let mut b = awake_boss(3600.0, 374.0);
        b.hp = 20;
        assert_eq!(strike_boss(&mut b, ids.mint(), 12, Facing::Right), Strike::Hit { damage: 12 });
        assert_eq!(b.body.x, 3600.0 + BOSS_HIT_NUDGE);
        assert_eq!(strike_boss(&mut b, ids.mint(), 12, Facing::Right), Strike::Killed { damage: 12 });
        assert_eq!(b.hp, 0);
        assert_eq!(b.mode, BossMode::Dead);
    }
}
