/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Player (timers, attack trigger, crouch, walk / jump, physics,
///      room and door clamp, fall check)
///   2. Monsters (behavior, contact, sword hits)
///   3. Elite guard (behavior, contact, sword hits)
///   4. Elite bolts
///   5. Key pickup
///   6. Door interaction, boss room transition
///   7. Boss (behavior, touch, sword hits)
///   8. Boss hazards (fireballs, flames)
///   9. Camera
///
/// The swing (attack id + hitbox) is fixed once stage 1 is done; every
/// later stage aims at the already-moved player. As soon as the phase
/// leaves `Playing` the remaining stages are skipped, and every later call
/// is a no-op.
///
/// All player damage funnels through `hit_player`, which is where
/// invulnerability and the end-of-game lock are enforced.

use tracing::{debug, info};

use crate::domain::ai::{self, MonsterTick, Strike, Target};
use crate::domain::entity::{
    Actions, AttackId, Boss, Facing, FrameInput, KeyItem, Player, Projectile, FLAME_DAMAGE,
    PLAYER_CROUCH_H, PLAYER_H,
};
use crate::domain::physics::{self, Rect};
use crate::domain::rules::{self, HurtOutcome, KeyDropPolicy};
use super::event::GameEvent;
use super::level::{self, Room};
use super::world::{Phase, WorldState, MESSAGE_TICKS};

pub const PLAYER_SPEED: f32 = 4.4;
pub const JUMP_VELOCITY: f32 = -14.8;
const FRICTION: f32 = 0.82;
const STOP_SPEED: f32 = 0.15;

/// The live melee swing this tick, if any.
type Swing = Option<(AttackId, Rect)>;

// ══════════════════════════════════════════════════════════════
// Main entry points
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if world.is_over() { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 { world.message.clear(); }
    }

    resolve_player(world, &input, &mut events);
    if world.is_over() { return events; }

    let swing = current_swing(&world.player);

    resolve_monsters(world, swing, &mut events);
    if world.is_over() { return events; }
    resolve_elite(world, swing, &mut events);
    if world.is_over() { return events; }
    resolve_elite_bolts(world, &mut events);
    if world.is_over() { return events; }
    resolve_key_pickup(world, &mut events);
    resolve_door(world, &input, &mut events);
    resolve_boss(world, swing, &mut events);
    if world.is_over() { return events; }
    resolve_boss_hazards(world, &mut events);
    if world.is_over() { return events; }

    world.camera.follow(world.player.body.x, world.room);
    events
}

/// Run `ticks` steps with the same held set. The pressed set applies to
/// the first tick only.
pub fn advance(world: &mut WorldState, input: FrameInput, ticks: u32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for i in 0..ticks {
        let frame = if i == 0 {
            input
        } else {
            FrameInput { held: input.held, pressed: Actions::default() }
        };
        events.extend(step(world, frame));
    }
    events
}

// ══════════════════════════════════════════════════════════════
// Shared helpers
// ══════════════════════════════════════════════════════════════

fn current_swing(player: &Player) -> Swing {
    player.active_attack().zip(rules::attack_box(player))
}

fn target_of(world: &WorldState) -> Target {
    Target {
        center_x: world.player.body.center_x(),
        center_y: world.player.body.center_y(),
        in_main_area: world.room == Room::Main,
    }
}

/// The single entry point for damaging the player.
fn hit_player(world: &mut WorldState, damage: u32, source_x: f32, events: &mut Vec<GameEvent>) {
    if world.is_over() { return; }
    match rules::hurt_player(&mut world.player, damage, source_x) {
        HurtOutcome::Ignored => {}
        HurtOutcome::Hurt => events.push(GameEvent::PlayerHurt { damage }),
        HurtOutcome::Killed => {
            events.push(GameEvent::PlayerHurt { damage });
            lose(world, events);
        }
    }
}

fn lose(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    world.player.hp = 0;
    world.phase = Phase::Lost;
    world.set_message("You have fallen... press R to try again", MESSAGE_TICKS);
    events.push(GameEvent::PlayerDied);
    info!(tick = world.tick, kills = world.player.kills, "player died");
}

fn win(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    world.phase = Phase::Won;
    world.fireballs.clear();
    world.flames.clear();
    world.set_message("The dragon is slain! Press R to play again", MESSAGE_TICKS);
    events.push(GameEvent::BossDefeated);
    info!(tick = world.tick, level = world.player.level, "boss defeated");
}

/// Credit a kill at `(center_x, floor_y)`: exp, level, and the n-th kill key.
fn credit_kill(world: &mut WorldState, center_x: f32, floor_y: f32, events: &mut Vec<GameEvent>) {
    if let Some(level) = rules::award_kill(&mut world.player) {
        events.push(GameEvent::LevelUp { level });
        world.set_message(&format!("Level up! Lv.{level}"), MESSAGE_TICKS);
        info!(level, max_hp = world.player.max_hp, "level up");
    }
    if let KeyDropPolicy::NthKill(n) = world.key_drop {
        if world.player.kills == n {
            drop_key(world, center_x, floor_y, events);
        }
    }
}

fn drop_key(world: &mut WorldState, center_x: f32, floor_y: f32, events: &mut Vec<GameEvent>) {
    if world.key.is_some() { return; }
    let (x, y) = rules::key_drop_position(center_x, floor_y, &world.door.trigger_zone());
    world.key = Some(KeyItem::new(x, y));
    world.set_message("A key dropped!", MESSAGE_TICKS);
    events.push(GameEvent::KeyDropped { x, y });
    info!(x, y, "key dropped");
}

/// Move live shots; drop expended or out-of-room ones. Returns the
/// `(damage, source_x)` of every shot that struck the player.
fn advance_projectiles(shots: &mut Vec<Projectile>, player: &Rect, room: Room) -> Vec<(u32, f32)> {
    let (left, right) = room.bounds();
    let mut hits = Vec::new();
    shots.retain_mut(|s| {
        if !s.tick() { return false; }
        let r = s.body.rect();
        if r.right() < left || r.x > right { return false; }
        if physics::overlaps(&r, player) {
            hits.push((s.damage, s.body.center_x()));
            return false;
        }
        true
    });
    hits
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    let held = input.held;
    let p = &mut world.player;

    // ── Timers ──
    p.attack_cooldown = p.attack_cooldown.saturating_sub(1);
    if held.attack && p.attack_cooldown == 0 {
        p.attack_timer = rules::ATTACK_TICKS;
        p.attack_cooldown = rules::ATTACK_COOLDOWN_TICKS;
        p.attack_id = Some(world.attack_ids.mint());
        events.push(GameEvent::AttackStarted);
    }
    p.attack_timer = p.attack_timer.saturating_sub(1);
    p.invuln_timer = p.invuln_timer.saturating_sub(1);

    // ── Posture ──
    let want_crouch = held.crouch && p.body.on_ground;
    if want_crouch != p.crouching {
        set_crouch(p, want_crouch);
    }

    // ── Walk / jump ──
    if held.left && !held.right {
        p.facing = Facing::Left;
    } else if held.right && !held.left {
        p.facing = Facing::Right;
    }
    let walking = !p.crouching && held.left != held.right;
    if walking {
        p.body.vx = p.facing.sign() * PLAYER_SPEED;
    } else {
        p.body.vx *= FRICTION;
        if p.body.vx.abs() < STOP_SPEED { p.body.vx = 0.0; }
    }
    if held.jump && p.body.on_ground && !p.crouching {
        p.body.vy = JUMP_VELOCITY;
        p.body.on_ground = false;
        events.push(GameEvent::Jumped);
    }

    // ── Physics ──
    physics::integrate(&mut p.body);
    physics::resolve_against_platforms(&mut p.body, &world.platforms);

    let (left, right) = world.room.bounds();
    p.body.clamp_x(left, right);
    if world.room == Room::Main && !world.door.open {
        let near_edge = world.door.rect.x;
        if p.body.x + p.body.w > near_edge {
            p.body.x = near_edge - p.body.w;
        }
    }

    if p.body.y > level::FALL_LIMIT {
        debug!(y = p.body.y, "player fell out of the world");
        lose(world, events);
    }
}

/// Switch posture, keeping the feet where they are.
fn set_crouch(p: &mut Player, crouch: bool) {
    let dh = PLAYER_H - PLAYER_CROUCH_H;
    p.crouching = crouch;
    if crouch {
        p.body.h = PLAYER_CROUCH_H;
        p.body.y += dh;
    } else {
        p.body.h = PLAYER_H;
        p.body.y -= dh;
    }
}

// ══════════════════════════════════════════════════════════════
// Monsters
// ══════════════════════════════════════════════════════════════

fn resolve_monsters(world: &mut WorldState, swing: Swing, events: &mut Vec<GameEvent>) {
    for i in 0..world.monsters.len() {
        let tick = ai::update_monster(&mut world.monsters[i], &world.platforms, &mut world.rng);
        if tick == MonsterTick::Respawned {
            let id = world.monsters[i].id;
            debug!(id, "monster respawned");
            events.push(GameEvent::MonsterRespawned { id });
        }
        if !world.monsters[i].is_alive() { continue; }

        let rect = world.monsters[i].body.rect();
        if physics::overlaps(&world.player.body.rect(), &rect) {
            let damage = world.monsters[i].damage;
            let source_x = world.monsters[i].body.center_x();
            hit_player(world, damage, source_x, events);
            if world.is_over() { return; }
        }

        let Some((id, hitbox)) = swing else { continue };
        if !physics::overlaps(&hitbox, &rect) { continue; }

        let damage = rules::monster_damage(rules::attack_power(world.player.level));
        let facing = world.player.facing;
        let m = &mut world.monsters[i];
        if let Strike::Killed { .. } = ai::strike_monster(m, id, damage, facing) {
            let (id, cx, floor_y) = (m.id, m.body.center_x(), m.body.bottom());
            debug!(id, "monster killed");
            events.push(GameEvent::MonsterKilled { id });
            credit_kill(world, cx, floor_y, events);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Elite guard
// ══════════════════════════════════════════════════════════════

fn resolve_elite(world: &mut WorldState, swing: Swing, events: &mut Vec<GameEvent>) {
    if !world.elite.is_alive() { return; }

    let target = target_of(world);
    if let Some(bolt) = ai::update_elite(&mut world.elite, &world.platforms, &target) {
        debug!(vx = bolt.body.vx, "elite fired");
        world.elite_bolts.push(bolt);
        events.push(GameEvent::EliteFired);
    }

    let rect = world.elite.body.rect();
    if physics::overlaps(&world.player.body.rect(), &rect) {
        let damage = world.elite.damage;
        let source_x = world.elite.body.center_x();
        hit_player(world, damage, source_x, events);
        if world.is_over() { return; }
    }

    let Some((id, hitbox)) = swing else { return };
    if !physics::overlaps(&hitbox, &rect) { return; }

    let damage = rules::elite_damage(rules::attack_power(world.player.level));
    match ai::strike_elite(&mut world.elite, id, damage, world.player.facing) {
        Strike::Ignored => {}
        Strike::Hit { damage } => {
            debug!(hp = world.elite.hp, "elite hit");
            events.push(GameEvent::EliteHit { damage });
        }
        Strike::Killed { damage } => {
            events.push(GameEvent::EliteHit { damage });
            events.push(GameEvent::EliteKilled);
            world.elite_bolts.clear();
            info!(tick = world.tick, "elite guard defeated");

            let cx = world.elite.body.center_x();
            let floor_y = world.elite.body.bottom();
            credit_kill(world, cx, floor_y, events);
            if world.key_drop == KeyDropPolicy::EliteDeath {
                drop_key(world, cx, floor_y, events);
            }
        }
    }
}

fn resolve_elite_bolts(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let player = world.player.body.rect();
    let hits = advance_projectiles(&mut world.elite_bolts, &player, Room::Main);
    for (damage, source_x) in hits {
        hit_player(world, damage, source_x, events);
        if world.is_over() { return; }
    }
}

// ══════════════════════════════════════════════════════════════
// Key, door, room transition
// ══════════════════════════════════════════════════════════════

fn resolve_key_pickup(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let player = world.player.body.rect();
    let Some(key) = world.key.as_mut() else { return };
    if !key.active || !physics::overlaps(&player, &key.rect) { return; }

    key.active = false;
    key.collected = true;
    world.player.has_key = true;
    world.set_message("Got the key! Press E at the door", MESSAGE_TICKS);
    events.push(GameEvent::KeyCollected);
    info!("key collected");
}

fn resolve_door(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    if world.room != Room::Main { return; }

    let player = world.player.body.rect();
    let in_zone = physics::overlaps(&player, &world.door.trigger_zone());
    if input.pressed.interact && in_zone && !world.door.open {
        if world.player.has_key {
            world.door.open = true;
            world.player.has_key = false;
            world.set_message("The door creaks open...", MESSAGE_TICKS);
            events.push(GameEvent::DoorOpened);
            info!("door opened");
        } else {
            world.set_message("Locked. Find the key first", MESSAGE_TICKS);
            events.push(GameEvent::DoorLocked);
        }
    }

    if world.door.open && world.player.body.x >= world.door.rect.right() {
        enter_boss_room(world, events);
    }
}

fn enter_boss_room(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    world.room = Room::Boss;

    let (x, y) = level::BOSS_ENTRANCE;
    let p = &mut world.player;
    if p.crouching { set_crouch(p, false); }
    p.body.x = x;
    p.body.y = y;
    p.body.vx = 0.0;
    p.body.vy = 0.0;
    world.camera.snap_to(Room::Boss);

    let (bx, by) = level::BOSS_SPAWN;
    world.boss = Some(Boss::new(bx, by, ai::BOSS_WAKE_TICKS));
    world.elite_bolts.clear();

    world.set_message("Something huge stirs in the dark...", MESSAGE_TICKS);
    events.push(GameEvent::EnteredBossRoom);
    info!(tick = world.tick, "entered boss room");
}

// ══════════════════════════════════════════════════════════════
// Boss
// ══════════════════════════════════════════════════════════════

fn resolve_boss(world: &mut WorldState, swing: Swing, events: &mut Vec<GameEvent>) {
    if world.room != Room::Boss { return; }

    let target = target_of(world);
    let (left, right) = Room::Boss.bounds();
    let fireballs_live = !world.fireballs.is_empty();
    let flames_live = !world.flames.is_empty();
    let out = {
        let Some(boss) = world.boss.as_mut() else { return };
        let mut ctx = ai::BossCtx {
            left,
            right,
            min_y: level::BOSS_MIN_Y,
            floor_y: level::GROUND_Y,
            target,
            fireballs_live,
            flames_live,
            pick: world.boss_pick,
            rng: &mut world.rng,
        };
        ai::update_boss(boss, &mut ctx)
    };

    if out.woke {
        world.set_message("The dragon awakens!", MESSAGE_TICKS);
        events.push(GameEvent::BossAwoke);
        info!("boss awake");
    }
    if let Some(attack) = out.started {
        debug!(?attack, "boss attack");
        events.push(GameEvent::BossAttack(attack));
    }
    if let Some(fireball) = out.fireball { world.fireballs.push(fireball); }
    if let Some(flame) = out.flame { world.flames.push(flame); }

    let Some(boss) = world.boss.as_ref() else { return };
    if !boss.is_alive() { return; }
    let rect = boss.body.rect();
    let touch = boss.touch_damage;
    let source_x = boss.body.center_x();

    if !boss.is_dormant() && physics::overlaps(&world.player.body.rect(), &rect) {
        hit_player(world, touch, source_x, events);
        if world.is_over() { return; }
    }

    let Some((id, hitbox)) = swing else { return };
    if !physics::overlaps(&hitbox, &rect) { return; }

    let damage = rules::boss_damage(rules::attack_power(world.player.level));
    let facing = world.player.facing;
    let Some(boss) = world.boss.as_mut() else { return };
    match ai::strike_boss(boss, id, damage, facing) {
        Strike::Ignored => {}
        Strike::Hit { damage } => {
            debug!(hp = boss.hp, damage, "boss hit");
            events.push(GameEvent::BossHit { damage });
        }
        Strike::Killed { damage } => {
            events.push(GameEvent::BossHit { damage });
            win(world, events);
        }
    }
}

fn resolve_boss_hazards(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let player = world.player.body.rect();
    let mut hits = advance_projectiles(&mut world.fireballs, &player, Room::Boss);

    world.flames.retain_mut(|f| f.tick());
    hits.extend(
        world.flames
            .iter()
            .filter_map(|f| f.hitbox())
            .filter(|r| physics::overlaps(r, &player))
            .map(|r| (FLAME_DAMAGE, r.center_x())),
    );

    for (damage, source_x) in hits {
        hit_player(world, damage, source_x, events);
        if world.is_over() { return; }
    }
}
