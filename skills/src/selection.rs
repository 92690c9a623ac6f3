use {
    crate::{EffectContext, SkillsConfig, acquire_skill},
    bevy::prelude::*,
    rand::{Rng, seq::IndexedRandom},
    skill_events::{
        LevelUp, PerformShockwave, ShockwaveSource, SkillAcquired, SkillCardChosen,
        SkillCardsOffered,
    },
    skill_resources::{Experience, PlayerSkills, SkillOffer},
    skills_assets::{SkillCatalog, SkillCategory, SkillDefinition},
    stat_resources::PlayerStats,
    states::SimulationPhase,
    std::collections::HashSet,
    system_schedule::{TaskFired, TaskKind, TaskOwner, TaskScheduler},
};

/// How cards are drawn from the eligible pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// Every eligible skill is equally likely.
    #[default]
    Uniform,
    /// Each card first rolls a category not used yet this draw, then a skill
    /// of that category by its `probability`.
    CategoryWeighted,
}

/// Skills that may be offered right now.
pub fn eligible<'a>(catalog: &'a SkillCatalog, skills: &PlayerSkills) -> Vec<&'a SkillDefinition> {
    catalog.iter().filter(|skill| skills.can_select(skill)).collect()
}

/// Up to `cards_per_offer` distinct eligible skill ids.
pub fn draw_candidates(
    catalog: &SkillCatalog,
    skills: &PlayerSkills,
    config: &SkillsConfig,
    rng: &mut impl Rng,
) -> Vec<String> {
    let pool = eligible(catalog, skills);
    match config.draw_mode {
        DrawMode::Uniform => pool
            .choose_multiple(rng, config.cards_per_offer)
            .map(|skill| skill.id.clone())
            .collect(),
        DrawMode::CategoryWeighted => draw_weighted(pool, config, rng),
    }
}

fn draw_weighted(
    mut pool: Vec<&SkillDefinition>,
    config: &SkillsConfig,
    rng: &mut impl Rng,
) -> Vec<String> {
    let mut cards = Vec::with_capacity(config.cards_per_offer);
    let mut used = HashSet::new();

    while cards.len() < config.cards_per_offer && !pool.is_empty() {
        let open: Vec<(SkillCategory, f32)> = config
            .category_weights
            .iter()
            .copied()
            .filter(|(category, _)| {
                !used.contains(category) && pool.iter().any(|skill| skill.category == *category)
            })
            .collect();

        let candidates: Vec<usize> = match open.choose_weighted(rng, |(_, weight)| *weight) {
            Ok((category, _)) => {
                used.insert(*category);
                (0..pool.len())
                    .filter(|index| pool[*index].category == *category)
                    .collect()
            }
            // Every category was used once; the rest is a plain weighted pick.
            Err(_) => (0..pool.len()).collect(),
        };

        let Some(index) = candidates
            .choose_weighted(rng, |index| pool[*index].probability.max(0.0))
            .or_else(|_| candidates.choose(rng).ok_or(()))
            .ok()
            .copied()
        else {
            break;
        };
        cards.push(pool.swap_remove(index).id.clone());
    }

    cards
}

pub(crate) fn on_level_up(
    _trigger: On<LevelUp>,
    mut commands: Commands,
    config: Res<SkillsConfig>,
    mut experience: ResMut<Experience>,
    mut scheduler: ResMut<TaskScheduler>,
) {
    if !experience.begin_level_up() {
        debug!(level = experience.level, "level-up ignored, already leveling or at max level");
        return;
    }

    info!(level = experience.level, "level up");
    commands.trigger(PerformShockwave::new(ShockwaveSource::LevelUp));
    scheduler.schedule_once(
        config.card_delay,
        TaskKind::ShowSkillCards,
        Some(TaskOwner::LevelUp),
    );
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn on_show_skill_cards(
    trigger: On<TaskFired>,
    mut commands: Commands,
    catalog: Res<SkillCatalog>,
    config: Res<SkillsConfig>,
    skills: Res<PlayerSkills>,
    mut phase: ResMut<SimulationPhase>,
    mut offer: ResMut<SkillOffer>,
    mut experience: ResMut<Experience>,
    mut scheduler: ResMut<TaskScheduler>,
) {
    if trigger.event().kind != TaskKind::ShowSkillCards {
        return;
    }

    let cards = draw_candidates(&catalog, &skills, &config, &mut rand::rng());
    if cards.is_empty() {
        info!("no eligible skills left, skipping card selection");
        experience.finish_level_up();
        return;
    }

    debug!(?cards, "offering skill cards");
    *phase = SimulationPhase::SelectingSkill;
    scheduler.pause_all();
    offer.cards = cards.clone();
    commands.trigger(SkillCardsOffered { cards });
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn on_skill_card_chosen(
    trigger: On<SkillCardChosen>,
    mut commands: Commands,
    time: Res<Time>,
    catalog: Res<SkillCatalog>,
    config: Res<SkillsConfig>,
    mut phase: ResMut<SimulationPhase>,
    mut offer: ResMut<SkillOffer>,
    mut skills: ResMut<PlayerSkills>,
    mut stats: ResMut<PlayerStats>,
    mut scheduler: ResMut<TaskScheduler>,
) {
    let skill_id = &trigger.event().skill_id;
    if !phase.is_selecting() || !offer.contains(skill_id) {
        warn!(skill = %skill_id, "card chosen that is not on offer, ignored");
        return;
    }
    let Some(skill) = catalog.get(skill_id) else {
        warn!(skill = %skill_id, "offered card missing from catalog, ignored");
        return;
    };

    let mut ctx = EffectContext {
        skills: &mut skills,
        stats: &mut stats,
        scheduler: &mut scheduler,
        config: &config,
        now: time.elapsed(),
    };
    let (stacks, outcome) = acquire_skill(&mut ctx, skill);
    outcome.emit(&mut commands);
    commands.trigger(SkillAcquired {
        skill_id: skill.id.clone(),
        stacks,
    });

    offer.clear();
    *phase = SimulationPhase::Running;
    scheduler.resume_all();
    scheduler.schedule_once(
        config.guard_release,
        TaskKind::ReleaseLevelUpGuard,
        Some(TaskOwner::LevelUp),
    );
}

pub(crate) fn on_release_level_up_guard(
    trigger: On<TaskFired>,
    mut commands: Commands,
    mut experience: ResMut<Experience>,
) {
    if trigger.event().kind != TaskKind::ReleaseLevelUpGuard {
        return;
    }

    experience.finish_level_up();
    // Experience kept flowing while the guard was up.
    if experience.current >= experience.to_next {
        commands.trigger(LevelUp);
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        rand::{SeedableRng, rngs::StdRng},
        skills_assets::{EffectDescriptor, InstantAction, Rarity, Stacking},
    };

    fn skill(id: &str, category: SkillCategory, stacking: Stacking) -> SkillDefinition {
        SkillDefinition {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            category,
            rarity: Rarity::Common,
            stacking,
            probability: 0.1,
            prerequisite: None,
            effect: EffectDescriptor::Instant {
                action: InstantAction::HealPlayer,
                value: 1.0,
            },
        }
    }

    #[test]
    fn offers_only_eligible_distinct_skills() {
        let catalog = SkillCatalog::builtin().expect("catalog.ron should parse");
        let config = SkillsConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut skills = PlayerSkills::default();
        for id in ["instant_heal", "double_shot", "dash_knockback"] {
            let taken = catalog.get(id).expect("skill exists");
            skills.record(taken);
        }

        for _ in 0..200 {
            let cards = draw_candidates(&catalog, &skills, &config, &mut rng);
            assert_eq!(cards.len(), 3);
            let distinct: HashSet<&String> = cards.iter().collect();
            assert_eq!(distinct.len(), 3);
            for card in &cards {
                let definition = catalog.get(card).expect("card is in the catalog");
                assert!(skills.can_select(definition), "{card} is not eligible");
            }
        }
    }

    #[test]
    fn fewer_eligible_than_cards_offers_all_of_them() {
        let catalog = SkillCatalog::new(vec![
            skill("a", SkillCategory::Active, Stacking::Once),
            skill("b", SkillCategory::Passive, Stacking::UpTo(2)),
            skill("c", SkillCategory::Skill, Stacking::Once),
        ]);
        let mut skills = PlayerSkills::default();
        skills.record(catalog.get("c").expect("c exists"));
        let mut rng = StdRng::seed_from_u64(2);

        for mode in [DrawMode::Uniform, DrawMode::CategoryWeighted] {
            let config = SkillsConfig {
                draw_mode: mode,
                ..default()
            };
            let mut cards = draw_candidates(&catalog, &skills, &config, &mut rng);
            cards.sort();
            assert_eq!(cards, vec!["a".to_string(), "b".to_string()]);
        }
    }

    #[test]
    fn maxed_out_pool_offers_nothing() {
        let catalog = SkillCatalog::new(vec![skill("a", SkillCategory::Passive, Stacking::UpTo(1))]);
        let mut skills = PlayerSkills::default();
        skills.record(catalog.get("a").expect("a exists"));

        let cards = draw_candidates(
            &catalog,
            &skills,
            &SkillsConfig::default(),
            &mut StdRng::seed_from_u64(3),
        );
        assert!(cards.is_empty());
    }

    #[test]
    fn category_weighted_draw_spreads_categories() {
        let catalog = SkillCatalog::builtin().expect("catalog.ron should parse");
        let config = SkillsConfig {
            draw_mode: DrawMode::CategoryWeighted,
            ..default()
        };
        let skills = PlayerSkills::default();
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..100 {
            let cards = draw_candidates(&catalog, &skills, &config, &mut rng);
            let categories: HashSet<SkillCategory> = cards
                .iter()
                .filter_map(|card| catalog.get(card))
                .map(|skill| skill.category)
                .collect();
            assert_eq!(cards.len(), 3);
            assert_eq!(categories.len(), 3);
        }
    }

    #[test]
    fn prerequisites_hide_dependent_skills() {
        let catalog = SkillCatalog::builtin().expect("catalog.ron should parse");
        let skills = PlayerSkills::default();

        let ids: Vec<&str> = eligible(&catalog, &skills)
            .into_iter()
            .map(|skill| skill.id.as_str())
            .collect();

        assert!(ids.contains(&"guided_missile"));
        assert!(!ids.contains(&"bouncing_missile"));
        assert!(!ids.contains(&"missile_chain_lightning"));
    }
}
