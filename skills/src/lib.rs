mod effects;
mod selection;

pub use {effects::*, selection::*};


use {
    bevy::prelude::*,
    skill_events::SkillEventsPlugin,
    skill_resources::{Experience, PlayerSkills, SkillOffer},
    skills_assets::{SkillCategory, SkillsAssetsPlugin},
    std::time::Duration,
};

/// Level-up card selection and the effect applier behind it.
///
/// Expects the scheduler, the simulation phase and the player stats to be
/// provided by their own plugins.
pub struct SkillsPlugin;

impl Plugin for SkillsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((SkillsAssetsPlugin, SkillEventsPlugin))
            .init_resource::<SkillsConfig>()
            .init_resource::<PlayerSkills>()
            .init_resource::<SkillOffer>()
            .init_resource::<Experience>()
            .register_type::<PlayerSkills>()
            .register_type::<SkillOffer>()
            .add_observer(selection::on_level_up)
            .add_observer(selection::on_show_skill_cards)
            .add_observer(selection::on_skill_card_chosen)
            .add_observer(selection::on_release_level_up_guard)
            .add_observer(effects::on_buff_expired);
    }
}

#[derive(Resource, Debug, Clone)]
pub struct SkillsConfig {
    pub cards_per_offer: usize,
    pub draw_mode: DrawMode,
    /// Category roll weights for [`DrawMode::CategoryWeighted`].
    pub category_weights: Vec<(SkillCategory, f32)>,
    /// Level-up pulse plays out before the cards appear.
    pub card_delay: Duration,
    /// How long after a pick another level-up is held back.
    pub guard_release: Duration,
    pub auto_shockwave_interval: Duration,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            cards_per_offer: 3,
            draw_mode: DrawMode::Uniform,
            category_weights: vec![
                (SkillCategory::Active, 0.5),
                (SkillCategory::Passive, 0.35),
                (SkillCategory::Skill, 0.15),
            ],
            card_delay: Duration::from_secs(2),
            guard_release: Duration::from_secs(1),
            auto_shockwave_interval: Duration::from_secs(3),
        }
    }
}
