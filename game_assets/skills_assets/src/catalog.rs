use {
    crate::SkillDefinition,
    bevy::{platform::collections::HashMap, prelude::*},
    ron::value::RawValue,
};

const BUILTIN_CATALOG: &str = include_str!("../../../assets/skills/catalog.ron");

/// Ids other systems look up directly.
pub mod skill_ids {
    pub const GUIDED_MISSILE: &str = "guided_missile";
    pub const BOUNCING_MISSILE: &str = "bouncing_missile";
    pub const ELECTRIC_CHAIN: &str = "electric_chain";
    pub const ELECTRIC_FIELD: &str = "electric_field";
    pub const MISSILE_CHAIN_LIGHTNING: &str = "missile_chain_lightning";
    pub const RANDOM_LIGHTNING: &str = "random_lightning";
    pub const DOUBLE_SHOCKWAVE: &str = "double_shockwave";
}

/// Immutable table of every selectable skill, in catalog order.
#[derive(Resource, Debug, Default, Clone)]
pub struct SkillCatalog {
    skills: Vec<SkillDefinition>,
    index: HashMap<String, usize>,
}

impl SkillCatalog {
    pub fn new(skills: Vec<SkillDefinition>) -> Self {
        let mut catalog = Self::default();
        for skill in skills {
            if catalog.index.contains_key(&skill.id) {
                warn!(id = %skill.id, "duplicate skill id in catalog, keeping the first");
                continue;
            }
            catalog.index.insert(skill.id.clone(), catalog.skills.len());
            catalog.skills.push(skill);
        }
        catalog
    }

    /// Parses a RON list of skills. An entry naming an unknown effect or
    /// action is logged and left out; only a malformed list is an error.
    pub fn from_ron(source: &str) -> Result<Self, ron::error::SpannedError> {
        let entries: Vec<&RawValue> = ron::from_str(source)?;
        let skills = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry.into_rust::<SkillDefinition>() {
                Ok(skill) => Some(skill),
                Err(e) => {
                    warn!(entry = index, "skipping unreadable skill entry: {e}");
                    None
                }
            })
            .collect();
        Ok(Self::new(skills))
    }

    /// The catalog shipped with the game.
    pub fn builtin() -> Result<Self, ron::error::SpannedError> {
        Self::from_ron(BUILTIN_CATALOG)
    }

    pub fn get(&self, id: &str) -> Option<&SkillDefinition> {
        self.index.get(id).map(|&index| &self.skills[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.iter()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::*,
        stat_resources::{ModifierOp, StatKey},
    };

    #[test]
    fn builtin_catalog_parses() {
        let catalog = SkillCatalog::builtin().expect("catalog.ron should parse");

        assert_eq!(catalog.len(), 33);
        for id in [
            skill_ids::GUIDED_MISSILE,
            skill_ids::BOUNCING_MISSILE,
            skill_ids::ELECTRIC_CHAIN,
            skill_ids::ELECTRIC_FIELD,
            skill_ids::MISSILE_CHAIN_LIGHTNING,
            skill_ids::RANDOM_LIGHTNING,
            skill_ids::DOUBLE_SHOCKWAVE,
        ] {
            assert!(catalog.get(id).is_some(), "missing {id}");
        }
    }

    #[test]
    fn builtin_prerequisites_point_at_real_skills() {
        let catalog = SkillCatalog::builtin().expect("catalog.ron should parse");

        for skill in catalog.iter() {
            if let Some(prerequisite) = &skill.prerequisite {
                assert!(
                    catalog.get(prerequisite).is_some(),
                    "{} requires unknown {prerequisite}",
                    skill.id
                );
            }
        }
    }

    #[test]
    fn fire_rate_up_is_a_stackable_multiplier() {
        let catalog = SkillCatalog::builtin().expect("catalog.ron should parse");
        let skill = catalog.get("fire_rate_up").expect("fire_rate_up exists");

        assert_eq!(skill.category, SkillCategory::Passive);
        assert_eq!(skill.stacking.max_stacks(), Some(5));
        assert_eq!(
            skill.effect,
            EffectDescriptor::StatModifier {
                target: StatKey::FireRate,
                operation: ModifierOp::Multiply,
                value: 0.8,
                secondary: None,
            }
        );
    }

    #[test]
    fn parses_every_descriptor_shape() {
        let source = r#"[
            (
                id: "a",
                name: "A",
                category: Passive,
                rarity: Uncommon,
                stacking: UpTo(3),
                probability: 0.08,
                effect: StatModifier(
                    target: BulletDamage,
                    operation: Multiply,
                    value: 1.5,
                    secondary: Some((target: FireRate, operation: Multiply, value: 1.2)),
                ),
            ),
            (
                id: "b",
                name: "B",
                category: Active,
                rarity: Common,
                probability: 0.1,
                effect: Instant(action: HealPlayer),
            ),
            (
                id: "c",
                name: "C",
                category: Active,
                rarity: Rare,
                probability: 0.04,
                effect: TimedBuff(buff_id: "auto_shockwave", duration_ms: 30000, action: Some(AutoShockwave)),
            ),
            (
                id: "d",
                name: "D",
                category: Skill,
                rarity: Common,
                probability: 0.05,
                prerequisite: Some("a"),
                effect: SpecialBehavior(Behavior("dash_knockback")),
            ),
        ]"#;

        let catalog = SkillCatalog::from_ron(source).expect("should parse");
        assert_eq!(catalog.len(), 4);

        let b = catalog.get("b").expect("b exists");
        assert_eq!(b.stacking, Stacking::Once);
        assert_eq!(
            b.effect,
            EffectDescriptor::Instant {
                action: InstantAction::HealPlayer,
                value: 1.0,
            }
        );
        assert_eq!(
            catalog.get("d").and_then(|d| d.prerequisite.as_deref()),
            Some("a")
        );
    }

    #[test]
    fn unknown_entries_are_skipped() {
        let source = r#"[
            (id: "heal", name: "Heal", category: Active, rarity: Common, probability: 0.1, effect: Instant(action: HealPlayer)),
            (id: "dragon", name: "Dragon", category: Active, rarity: Common, probability: 0.1, effect: Instant(action: SummonDragon)),
            (id: "warp", name: "Warp", category: Skill, rarity: Rare, probability: 0.1, effect: Teleport(range: 300.0)),
            (id: "field", name: "Field", category: Skill, rarity: Rare, probability: 0.1, effect: SpecialBehavior(Action(ActivateElectricField))),
        ]"#;

        let catalog = SkillCatalog::from_ron(source).expect("the list itself is valid");
        let ids: Vec<&str> = catalog.iter().map(|skill| skill.id.as_str()).collect();
        assert_eq!(ids, vec!["heal", "field"]);
    }

    #[test]
    fn malformed_list_is_an_error() {
        assert!(SkillCatalog::from_ron("[(id: \"x\", ").is_err());
        assert!(SkillCatalog::from_ron("42").is_err());
    }

    #[test]
    fn duplicate_ids_keep_the_first() {
        let source = r#"[
            (id: "x", name: "First", category: Active, rarity: Common, probability: 0.1, effect: Instant(action: HealPlayer)),
            (id: "x", name: "Second", category: Active, rarity: Common, probability: 0.1, effect: Instant(action: HealPlayer)),
        ]"#;

        let catalog = SkillCatalog::from_ron(source).expect("should parse");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("x").map(|s| s.name.as_str()), Some("First"));
    }
}
