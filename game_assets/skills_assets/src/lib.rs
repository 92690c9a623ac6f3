mod catalog;

pub use catalog::*;

use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
    stat_resources::{ModifierOp, StatKey},
};

pub struct SkillsAssetsPlugin;

impl Plugin for SkillsAssetsPlugin {
    fn build(&self, app: &mut App) {
        let catalog = match SkillCatalog::builtin() {
            Ok(catalog) => {
                info!(skills = catalog.len(), "skill catalog loaded");
                catalog
            }
            Err(e) => {
                error!("Failed to parse skill catalog: {e}, level-ups will offer no cards");
                SkillCatalog::default()
            }
        };

        app.insert_resource(catalog)
            .register_type::<SkillCategory>()
            .register_type::<Rarity>();
    }
}

/// One selectable skill card, loaded from `catalog.ron`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDefinition {
    /// Unique identifier (e.g., "fire_rate_up", "guided_missile")
    pub id: String,
    /// Display name shown on the card
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: SkillCategory,
    pub rarity: Rarity,
    #[serde(default)]
    pub stacking: Stacking,
    /// Relative selection weight, only read by the category-weighted draw
    pub probability: f32,
    /// Skill that must already be selected before this one can be offered
    #[serde(default)]
    pub prerequisite: Option<String>,
    pub effect: EffectDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
#[reflect(Serialize, Deserialize)]
pub enum SkillCategory {
    /// One-shot or timed effects
    Active,
    /// Permanent numeric upgrades
    Passive,
    /// Dash, shockwave and weapon behaviors
    Skill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Reflect)]
#[reflect(Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// How many times the same card may be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stacking {
    /// Leaves the pool once selected.
    #[default]
    Once,
    /// Stays in the pool until taken this many times.
    UpTo(u32),
}

impl Stacking {
    pub fn is_stackable(&self) -> bool {
        matches!(self, Stacking::UpTo(_))
    }

    pub fn max_stacks(&self) -> Option<u32> {
        match self {
            Stacking::Once => None,
            Stacking::UpTo(max) => Some(*max),
        }
    }
}

/// A single stat adjustment inside an effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatChange {
    pub target: StatKey,
    pub operation: ModifierOp,
    pub value: f32,
}

/// What happens when a card is chosen.
///
/// # Usage
/// - **Catalog**: every `catalog.ron` entry carries exactly one descriptor.
/// - **Application**: `skills::apply_effect` matches on this exhaustively; a
///   catalog entry naming something that is not a variant here is dropped
///   with a warning when the catalog loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectDescriptor {
    /// Permanent modifier, independent per application.
    StatModifier {
        target: StatKey,
        operation: ModifierOp,
        value: f32,
        /// Second independent modifier, e.g. the fire-rate cost of a damage upgrade.
        #[serde(default)]
        secondary: Option<StatChange>,
    },
    /// One-shot effect applied on pick.
    Instant {
        action: InstantAction,
        #[serde(default = "one")]
        value: f32,
    },
    /// Modifiers that last `duration_ms`, optionally with a recurring action
    /// living exactly as long as the buff.
    TimedBuff {
        buff_id: String,
        duration_ms: u64,
        #[serde(default)]
        modifiers: Vec<StatChange>,
        #[serde(default)]
        action: Option<BuffAction>,
    },
    /// Non-numeric behavior consulted by other systems.
    SpecialBehavior(SpecialBehavior),
}

fn one() -> f32 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstantAction {
    AddBarrierCharge,
    HealPlayer,
    CollectAllEnergy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuffAction {
    /// Shockwave every few seconds while the buff lasts.
    AutoShockwave,
    /// Periodic lightning strikes scaled by the skill's stack level.
    ActivateRandomLightning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialBehavior {
    /// Free-form flag (e.g. "dash_knockback") read by dash and shockwave code.
    Behavior(String),
    Action(SkillAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillAction {
    ActivateGuidedMissile,
    EnhanceMissileBounce,
    ElectricChainAttack,
    ActivateElectricField,
    ActivateMissileChainLightning,
    EnableDoubleShot,
    EnableExplosiveBullets,
    EnableShrapnelExplosion,
}

impl SkillAction {
    /// Behavior tag recorded when the action is not handled by a dedicated system.
    pub fn tag(self) -> &'static str {
        match self {
            SkillAction::ActivateGuidedMissile => "guided_missile",
            SkillAction::EnhanceMissileBounce => "missile_bounce",
            SkillAction::ElectricChainAttack => "electric_chain",
            SkillAction::ActivateElectricField => "electric_field",
            SkillAction::ActivateMissileChainLightning => "missile_chain_lightning",
            SkillAction::EnableDoubleShot => "double_shot",
            SkillAction::EnableExplosiveBullets => "explosive_bullets",
            SkillAction::EnableShrapnelExplosion => "shrapnel_explosion",
        }
    }

    pub fn is_missile_action(self) -> bool {
        matches!(
            self,
            SkillAction::ActivateGuidedMissile | SkillAction::EnhanceMissileBounce
        )
    }
}
