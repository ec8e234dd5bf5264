/// Combat and progression rules, formula driven.
///
/// Pure functions over entities. No world access, no side effects beyond
/// the `&mut Player` they are handed. The step decides WHEN these apply;
/// this module decides WHAT happens.
///
/// ## Damage Table (player → enemy)
///
/// ┌──────────────┬────────────────────────────────────┬──────────────┐
/// │ Target        │ Raw value                          │ Clamp        │
/// ├──────────────┼────────────────────────────────────┼──────────────┤
/// │ Monster       │ fixed lethal value                 │ none         │
/// │ Elite         │ floor(power / 18) - ELITE_DEFENSE  │ [1, 1]       │
/// │ Boss          │ power - BOSS_DEFENSE               │ [12, 600/12-1] │
/// └──────────────┴────────────────────────────────────┴──────────────┘
///
///   power = BASE_ATTACK + (level - 1) * ATTACK_PER_LEVEL
///
/// ## Leveling
///
///   level = kills / KILLS_PER_LEVEL + 1
///   on level up: max_hp += LEVEL_UP_MAX_HP, hp = min(max_hp, hp + LEVEL_UP_HEAL)

use super::entity::{Facing, Player, BOSS_MAX_HP, KEY_SIZE};
use super::physics::Rect;

// ── Player attack ──

pub const ATTACK_TICKS: u32 = 12;
pub const ATTACK_COOLDOWN_TICKS: u32 = 22;
pub const ATTACK_BOX_W: f32 = 54.0;

pub const BASE_ATTACK: u32 = 16;
pub const ATTACK_PER_LEVEL: u32 = 4;

// ── Damage ──

pub const MONSTER_LETHAL_DAMAGE: u32 = 9999;
pub const ELITE_DEFENSE: u32 = 3;
pub const ELITE_MIN_DAMAGE: u32 = 1;
pub const ELITE_MAX_DAMAGE: u32 = 1;
pub const BOSS_DEFENSE: u32 = 6;
pub const BOSS_MIN_DAMAGE: u32 = 12;
pub const BOSS_MIN_HITS: u32 = 12;

// ── Taking damage ──

pub const INVULN_TICKS: u32 = 50;
pub const HURT_KNOCKBACK_X: f32 = 5.0;
pub const HURT_KNOCKBACK_Y: f32 = -6.0;

// ── Progression ──

pub const KILL_EXP: u32 = 20;
pub const KILLS_PER_LEVEL: u32 = 5;
pub const LEVEL_UP_MAX_HP: u32 = 12;
pub const LEVEL_UP_HEAL: u32 = 22;
pub const KEY_DROP_NTH_KILL: u32 = 6;
/// Gap kept between a displaced key and the door's trigger zone.
const KEY_DOOR_CLEARANCE: f32 = 16.0;

// ══════════════════════════════════════════════════════════════
// Attack
// ══════════════════════════════════════════════════════════════

pub fn attack_power(level: u32) -> u32 {
    BASE_ATTACK + level.saturating_sub(1) * ATTACK_PER_LEVEL
}

/// Melee hitbox in front of the player. Exists only while the swing is live.
pub fn attack_box(player: &Player) -> Option<Rect> {
    if player.attack_timer == 0 { return None; }
    let b = &player.body;
    let x = match player.facing {
        Facing::Right => b.x + b.w - 4.0,
        Facing::Left => b.x - ATTACK_BOX_W + 4.0,
    };
    let (dy, shrink) = if player.crouching { (8.0, 12.0) } else { (12.0, 16.0) };
    Some(Rect::new(x, b.y + dy, ATTACK_BOX_W, b.h - shrink))
}

// ══════════════════════════════════════════════════════════════
// Damage formulas
// ══════════════════════════════════════════════════════════════

/// Basic monsters are always one-hit kills; attack power is irrelevant.
pub fn monster_damage(_power: u32) -> u32 {
    MONSTER_LETHAL_DAMAGE
}

/// The elite takes exactly one point per hit at any level.
pub fn elite_damage(power: u32) -> u32 {
    let raw = (power / 18) as i64 - ELITE_DEFENSE as i64;
    raw.clamp(ELITE_MIN_DAMAGE as i64, ELITE_MAX_DAMAGE as i64) as u32
}

/// Highest damage a single hit may deal to the boss.
pub fn boss_max_damage() -> u32 {
    BOSS_MAX_HP / BOSS_MIN_HITS - 1
}

/// Boss damage: the fight always takes at least `BOSS_MIN_HITS` hits.
pub fn boss_damage(power: u32) -> u32 {
    let raw = power as i64 - BOSS_DEFENSE as i64;
    raw.clamp(BOSS_MIN_DAMAGE as i64, boss_max_damage() as i64) as u32
}

// ══════════════════════════════════════════════════════════════
// Player taking damage
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HurtOutcome {
    /// Invulnerable: nothing changed.
    Ignored,
    Hurt,
    Killed,
}

/// Damage the player from a source at `source_x`.
///
/// The caller is responsible for refusing damage once the game has ended.
pub fn hurt_player(player: &mut Player, damage: u32, source_x: f32) -> HurtOutcome {
    if player.is_invulnerable() { return HurtOutcome::Ignored; }
    player.hp = player.hp.saturating_sub(damage);
    player.invuln_timer = INVULN_TICKS;
    player.body.vx = if source_x < player.body.x { HURT_KNOCKBACK_X } else { -HURT_KNOCKBACK_X };
    player.body.vy = HURT_KNOCKBACK_Y;
    if player.hp == 0 { HurtOutcome::Killed } else { HurtOutcome::Hurt }
}

// ══════════════════════════════════════════════════════════════
// Progression
// ══════════════════════════════════════════════════════════════

pub fn level_for_kills(kills: u32) -> u32 {
    kills / KILLS_PER_LEVEL + 1
}

/// Credit one kill. Returns the new level if the player leveled up.
pub fn award_kill(player: &mut Player) -> Option<u32> {
    player.kills += 1;
    player.exp += KILL_EXP;
    let next = level_for_kills(player.kills);
    if next <= player.level { return None; }
    player.level = next;
    player.max_hp += LEVEL_UP_MAX_HP;
    player.hp = (player.hp + LEVEL_UP_HEAL).min(player.max_hp);
    Some(next)
}

/// Which death produces the (single) key.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyDropPolicy {
    EliteDeath,
    /// The n-th kill of any enemy drops the key at the victim's feet.
    NthKill(u32),
}

impl Default for KeyDropPolicy {
    fn default() -> Self {
        KeyDropPolicy::EliteDeath
    }
}

/// Where a key dropped by an enemy centred at `center_x` standing on
/// `floor_y` lands. Never inside the door's trigger zone: a key that would
/// overlap it is moved to the zone's left.
pub fn key_drop_position(center_x: f32, floor_y: f32, door_zone: &Rect) -> (f32, f32) {
    let y = floor_y - KEY_SIZE;
    let mut x = center_x - KEY_SIZE / 2.0;
    let key = Rect::new(x, y, KEY_SIZE, KEY_SIZE);
    if super::physics::overlaps(&key, door_zone) {
        x = door_zone.x - KEY_SIZE - KEY_DOOR_CLEARANCE;
    }
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::physics::overlaps;

    // ── attack box ──

    #[test]
    fn no_box_without_active_swing() {
        let p = Player::new(100.0, 100.0);
        assert_eq!(attack_box(&p), None);
    }

    #[test]
    fn box_sits_in_front_of_facing() {
        let mut p = Player::new(100.0, 100.0);
        p.attack_timer = 5;
        let right = attack_box(&p).unwrap();
        assert_eq!(right.x, 100.0 + 42.0 - 4.0);
        assert_eq!(right.y, 112.0);
        assert_eq!(right.h, 44.0);

        p.facing = Facing::Left;
        let left = attack_box(&p).unwrap();
        assert_eq!(left.x, 100.0 - 54.0 + 4.0);
    }

    #[test]
    fn crouching_box_is_lower_and_shorter() {
        let mut p = Player::new(100.0, 120.0);
        p.attack_timer = 5;
        p.crouching = true;
        p.body.h = 40.0;
        let b = attack_box(&p).unwrap();
        assert_eq!(b.y, 128.0);
        assert_eq!(b.h, 28.0);
    }

    // ── damage ──

    #[test]
    fn attack_power_grows_per_level() {
        assert_eq!(attack_power(1), BASE_ATTACK);
        assert_eq!(attack_power(3), BASE_ATTACK + 2 * ATTACK_PER_LEVEL);
    }

    #[test]
    fn monsters_always_die_in_one_hit() {
        for level in [1, 5, 50] {
            assert!(monster_damage(attack_power(level)) >= crate::domain::entity::MONSTER_MAX_HP);
        }
    }

    #[test]
    fn elite_takes_exactly_one() {
        for level in [1, 2, 10, 100, 10_000] {
            assert_eq!(elite_damage(attack_power(level)), 1);
        }
    }

    #[test]
    fn boss_damage_bounds_at_low_and_high_level() {
        let max = BOSS_MAX_HP / BOSS_MIN_HITS - 1;
        let low = boss_damage(attack_power(1));
        let high = boss_damage(attack_power(10_000));
        assert_eq!(low, BOSS_MIN_DAMAGE);
        assert_eq!(high, max);
        for level in 1..200 {
            let d = boss_damage(attack_power(level));
            assert!((BOSS_MIN_DAMAGE..=max).contains(&d));
        }
        // Never fewer than BOSS_MIN_HITS hits
        assert!(high * BOSS_MIN_HITS < BOSS_MAX_HP);
    }

    // ── hurt ──

    #[test]
    fn hurt_sets_invuln_and_knockback_away() {
        let mut p = Player::new(100.0, 100.0);
        assert_eq!(hurt_player(&mut p, 12, 50.0), HurtOutcome::Hurt);
        assert_eq!(p.hp, 88);
        assert_eq!(p.invuln_timer, INVULN_TICKS);
        assert_eq!(p.body.vx, HURT_KNOCKBACK_X);
        assert_eq!(p.body.vy, HURT_KNOCKBACK_Y);

        let mut q = Player::new(100.0, 100.0);
        hurt_player(&mut q, 12, 300.0);
        assert_eq!(q.body.vx, -HURT_KNOCKBACK_X);
    }

    #[test]
    fn spam_damage_applies_once_per_window() {
        let mut p = Player::new(100.0, 100.0);
        hurt_player(&mut p, 10, 0.0);
        for _ in 0..20 {
            assert_eq!(hurt_player(&mut p, 10, 0.0), HurtOutcome::Ignored);
        }
        assert_eq!(p.hp, 90);
    }

    #[test]
    fn lethal_damage_floors_at_zero() {
        let mut p = Player::new(0.0, 0.0);
        assert_eq!(hurt_player(&mut p, 500, 10.0), HurtOutcome::Killed);
        assert_eq!(p.hp, 0);
    }

    // ── leveling ──

    #[test]
    fn level_law_holds() {
        for k in 0..100 {
            assert_eq!(level_for_kills(k), k / 5 + 1);
        }
    }

    #[test]
    fn max_hp_rises_once_per_five_kills() {
        let mut p = Player::new(0.0, 0.0);
        let mut level_ups = 0;
        for k in 1..=23 {
            let before = p.max_hp;
            let up = award_kill(&mut p);
            if k % 5 == 0 {
                assert_eq!(up, Some(k / 5 + 1));
                assert_eq!(p.max_hp, before + LEVEL_UP_MAX_HP);
                level_ups += 1;
            } else {
                assert_eq!(up, None);
                assert_eq!(p.max_hp, before);
            }
            assert_eq!(p.level, level_for_kills(k));
            assert!(p.hp <= p.max_hp);
        }
        assert_eq!(level_ups, 4);
        assert_eq!(p.exp, 23 * KILL_EXP);
    }

    #[test]
    fn level_up_heal_is_capped() {
        let mut p = Player::new(0.0, 0.0);
        p.hp = 50;
        for _ in 0..5 { award_kill(&mut p); }
        assert_eq!(p.hp, 72);
        for _ in 0..5 { award_kill(&mut p); }
        assert_eq!(p.max_hp, 124);
        assert_eq!(p.hp, 94);
    }

    // ── key drop ──

    #[test]
    fn key_drops_at_feet_when_clear_of_door() {
        let zone = Rect::new(2630.0, 360.0, 120.0, 110.0);
        let (x, y) = key_drop_position(2200.0, 470.0, &zone);
        assert_eq!(x, 2188.0);
        assert_eq!(y, 446.0);
    }

    #[test]
    fn key_is_pushed_out_of_door_zone() {
        let zone = Rect::new(2630.0, 360.0, 120.0, 110.0);
        let (x, y) = key_drop_position(2640.0, 470.0, &zone);
        let key = Rect::new(x, y, KEY_SIZE, KEY_SIZE);
        assert!(!overlaps(&key, &zone));
        assert!(x + KEY_SIZE <= zone.x);
    }
}
