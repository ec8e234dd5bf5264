/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and effects.

use crate::domain::entity::BossAttack;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    AttackStarted,
    PlayerHurt { damage: u32 },
    PlayerDied,
    LevelUp { level: u32 },

    MonsterKilled { id: usize },
    MonsterRespawned { id: usize },

    EliteHit { damage: u32 },
    EliteFired,
    EliteKilled,

    KeyDropped { x: f32, y: f32 },
    KeyCollected,
    DoorLocked,
    DoorOpened,
    EnteredBossRoom,

    BossAwoke,
    BossAttack(BossAttack),
    BossHit { damage: u32 },
    BossDefeated,
}
