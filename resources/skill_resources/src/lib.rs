mod experience;

pub use experience::*;

use {
    bevy::prelude::*,
    skills_assets::{SkillDefinition, Stacking},
    stat_resources::StatKey,
    std::{
        collections::{HashMap, HashSet},
        time::Duration,
    },
};

/// A timed buff currently layered on the player's stats.
#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct ActiveBuff {
    /// Elapsed run time when the buff was applied.
    pub started_at: Duration,
    pub duration: Duration,
    /// Every modifier the buff registered, removed together on expiry.
    pub modifier_ids: Vec<(StatKey, String)>,
}

/// What the player has picked this run.
///
/// Only the skill effect path writes here. `selected` and `stacks` are updated
/// before an effect runs, so effects that scale with their own level read the
/// new stack count.
#[derive(Resource, Reflect, Debug, Clone)]
#[reflect(Resource)]
pub struct PlayerSkills {
    pub selected: HashSet<String>,
    pub stacks: HashMap<String, u32>,
    pub behaviors: HashSet<String>,
    pub active_buffs: HashMap<String, ActiveBuff>,
    pub barrier_charges: u32,
    pub max_barrier_charges: u32,
    application_counter: u64,
}

impl Default for PlayerSkills {
    fn default() -> Self {
        Self {
            selected: HashSet::new(),
            stacks: HashMap::new(),
            behaviors: HashSet::new(),
            active_buffs: HashMap::new(),
            barrier_charges: 0,
            max_barrier_charges: 3,
            application_counter: 0,
        }
    }
}

impl PlayerSkills {
    /// Whether `skill` may be offered on the next draw.
    pub fn can_select(&self, skill: &SkillDefinition) -> bool {
        if skill
            .prerequisite
            .as_ref()
            .is_some_and(|prerequisite| !self.selected.contains(prerequisite))
        {
            return false;
        }

        match skill.stacking {
            Stacking::Once => !self.selected.contains(&skill.id),
            Stacking::UpTo(max) => self.stack(&skill.id) < max,
        }
    }

    /// Marks `skill` as taken. Returns the stack count after recording.
    pub fn record(&mut self, skill: &SkillDefinition) -> u32 {
        self.selected.insert(skill.id.clone());
        let stack = self.stacks.entry(skill.id.clone()).or_default();
        match skill.stacking {
            Stacking::Once => *stack = 1,
            Stacking::UpTo(max) => *stack = (*stack + 1).min(max),
        }
        *stack
    }

    pub fn stack(&self, id: &str) -> u32 {
        self.stacks.get(id).copied().unwrap_or(0)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn has_behavior(&self, tag: &str) -> bool {
        self.behaviors.contains(tag)
    }

    /// Returns `true` if the tag was not present yet.
    pub fn grant_behavior(&mut self, tag: impl Into<String>) -> bool {
        self.behaviors.insert(tag.into())
    }

    /// Adds up to `amount` barrier charges without exceeding the cap.
    pub fn add_barrier_charges(&mut self, amount: u32) -> u32 {
        self.barrier_charges = (self.barrier_charges + amount).min(self.max_barrier_charges);
        self.barrier_charges
    }

    /// Counter that makes every stat-modifier application id unique.
    pub fn next_application_id(&mut self) -> u64 {
        self.application_counter += 1;
        self.application_counter
    }

    pub fn insert_buff(&mut self, buff_id: impl Into<String>, buff: ActiveBuff) {
        self.active_buffs.insert(buff_id.into(), buff);
    }

    pub fn take_buff(&mut self, buff_id: &str) -> Option<ActiveBuff> {
        self.active_buffs.remove(buff_id)
    }

    pub fn active_buff(&self, buff_id: &str) -> Option<&ActiveBuff> {
        self.active_buffs.get(buff_id)
    }

    pub fn reset(&mut self) {
        *self = Self {
            max_barrier_charges: self.max_barrier_charges,
            ..default()
        };
    }
}

/// Cards on the table while the world is paused for selection.
#[derive(Resource, Reflect, Default, Debug, Clone)]
#[reflect(Resource)]
pub struct SkillOffer {
    pub cards: Vec<String>,
}

impl SkillOffer {
    pub fn contains(&self, id: &str) -> bool {
        self.cards.iter().any(|card| card == id)
    }

    pub fn is_open(&self) -> bool {
        !self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        skills_assets::{EffectDescriptor, InstantAction, Rarity, SkillCategory},
    };

    fn skill(id: &str, stacking: Stacking, prerequisite: Option<&str>) -> SkillDefinition {
        SkillDefinition {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            category: SkillCategory::Skill,
            rarity: Rarity::Common,
            stacking,
            probability: 0.1,
            prerequisite: prerequisite.map(str::to_string),
            effect: EffectDescriptor::Instant {
                action: InstantAction::HealPlayer,
                value: 1.0,
            },
        }
    }

    #[test]
    fn non_stackable_leaves_the_pool_after_one_pick() {
        let mut skills = PlayerSkills::default();
        let heal = skill("instant_heal", Stacking::Once, None);

        assert!(skills.can_select(&heal));
        assert_eq!(skills.record(&heal), 1);
        assert!(!skills.can_select(&heal));
        assert_eq!(skills.record(&heal), 1);
    }

    #[test]
    fn stackable_is_eligible_until_max() {
        let mut skills = PlayerSkills::default();
        let fire_rate = skill("fire_rate_up", Stacking::UpTo(2), None);

        skills.record(&fire_rate);
        assert!(skills.can_select(&fire_rate));
        skills.record(&fire_rate);
        assert!(!skills.can_select(&fire_rate));
        assert_eq!(skills.record(&fire_rate), 2);
        assert_eq!(skills.stack("fire_rate_up"), 2);
    }

    #[test]
    fn prerequisite_gates_eligibility() {
        let mut skills = PlayerSkills::default();
        let missile = skill("guided_missile", Stacking::UpTo(10), None);
        let bounce = skill("bouncing_missile", Stacking::UpTo(3), Some("guided_missile"));

        assert!(!skills.can_select(&bounce));
        skills.record(&missile);
        assert!(skills.can_select(&bounce));
    }

    #[test]
    fn barrier_charges_are_capped() {
        let mut skills = PlayerSkills::default();
        assert_eq!(skills.add_barrier_charges(2), 2);
        assert_eq!(skills.add_barrier_charges(2), 3);
    }

    #[test]
    fn reset_clears_everything_but_the_cap() {
        let mut skills = PlayerSkills {
            max_barrier_charges: 5,
            ..default()
        };
        skills.record(&skill("x", Stacking::Once, None));
        skills.grant_behavior("dash_knockback");
        skills.next_application_id();

        skills.reset();

        assert!(skills.selected.is_empty());
        assert!(!skills.has_behavior("dash_knockback"));
        assert_eq!(skills.max_barrier_charges, 5);
        assert_eq!(skills.next_application_id(), 1);
    }
}
