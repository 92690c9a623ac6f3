use {bevy::prelude::*, skills_assets::SkillAction, std::time::Duration};

pub struct SkillEventsPlugin;

impl Plugin for SkillEventsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<LevelUp>()
            .register_type::<SkillCardChosen>()
            .register_type::<SkillAcquired>()
            .register_type::<ShockwaveSource>()
            .register_type::<MissileHit>();
    }
}

/// The experience threshold was crossed. Ignored while a level-up is in progress.
#[derive(Event, Reflect, Debug, Clone, Copy, Default)]
pub struct LevelUp;

/// The world is paused and these cards are up for choice.
#[derive(Event, Debug, Clone)]
pub struct SkillCardsOffered {
    pub cards: Vec<String>,
}

/// Player input: pick one of the offered cards.
#[derive(Event, Reflect, Debug, Clone, Default)]
pub struct SkillCardChosen {
    pub skill_id: String,
}

/// Emitted after a skill was recorded and its effect applied.
#[derive(Event, Reflect, Debug, Clone, Default)]
pub struct SkillAcquired {
    pub skill_id: String,
    pub stacks: u32,
}

/// A special action was applied; systems that own the action react to it.
#[derive(Event, Debug, Clone, Copy)]
pub struct SkillActionApplied {
    pub action: SkillAction,
    pub stacks: u32,
}

#[derive(Event, Debug, Clone)]
pub struct SpecialBehaviorGranted {
    pub tag: String,
}

#[derive(Event, Debug, Clone)]
pub struct BuffStarted {
    pub buff_id: String,
    pub duration: Duration,
}

#[derive(Event, Debug, Clone)]
pub struct BuffEnded {
    pub buff_id: String,
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShockwaveSource {
    #[default]
    Manual,
    LevelUp,
    Auto,
    Echo,
}

/// Request an area pulse around the player. Dropped if one is already active.
#[derive(Event, Debug, Clone, Copy)]
pub struct PerformShockwave {
    pub scale: f32,
    pub source: ShockwaveSource,
}

impl PerformShockwave {
    pub fn new(source: ShockwaveSource) -> Self {
        Self { scale: 1.0, source }
    }
}

/// Pull every live pickup to the player.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct CollectAllPickups;

/// An energy pickup reached the player.
#[derive(Event, Debug, Clone, Copy)]
pub struct PickupCollected {
    pub position: Vec2,
}

/// A guided missile struck its current target.
#[derive(Event, Reflect, Debug, Clone, Copy)]
#[reflect(Default)]
pub struct MissileHit {
    pub target: Entity,
    pub position: Vec2,
}

impl Default for MissileHit {
    fn default() -> Self {
        Self {
            target: Entity::PLACEHOLDER,
            position: Vec2::ZERO,
        }
    }
}

/// The player finished a dash from `from` to `to`.
#[derive(Event, Debug, Clone, Copy)]
pub struct DashPerformed {
    pub from: Vec2,
    pub to: Vec2,
}

/// Throw the current run away and start over from base stats.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RestartRun;
