use {
    crate::SkillsConfig,
    bevy::prelude::*,
    chain_lightning::storm_interval,
    skill_events::{BuffEnded, BuffStarted, CollectAllPickups, SkillActionApplied, SpecialBehaviorGranted},
    skill_resources::{ActiveBuff, PlayerSkills},
    skills_assets::{
        BuffAction, EffectDescriptor, InstantAction, SkillDefinition, SpecialBehavior, StatChange,
    },
    stat_events::{AddStatModifier, RemoveStatModifier, StatChanged},
    stat_resources::{PlayerStats, StatKey},
    std::time::Duration,
    system_schedule::{TaskFired, TaskKind, TaskOwner, TaskScheduler},
};

/// Everything an effect may touch while it is applied.
pub struct EffectContext<'a> {
    pub skills: &'a mut PlayerSkills,
    pub stats: &'a mut PlayerStats,
    pub scheduler: &'a mut TaskScheduler,
    pub config: &'a SkillsConfig,
    /// Elapsed run time, stamped on buffs.
    pub now: Duration,
}

/// Events an applied effect wants emitted, in emission order: removals go
/// out before additions so a replaced buff never deletes its successor's
/// modifiers.
#[derive(Debug, Default)]
pub struct EffectOutcome {
    pub removed: Vec<RemoveStatModifier>,
    pub added: Vec<AddStatModifier>,
    pub changed: Vec<StatChanged>,
    pub behaviors: Vec<String>,
    pub actions: Vec<SkillActionApplied>,
    pub buff_started: Option<BuffStarted>,
    pub collect_all: bool,
}

impl EffectOutcome {
    pub fn emit(self, commands: &mut Commands) {
        for event in self.removed {
            commands.trigger(event);
        }
        for event in self.added {
            commands.trigger(event);
        }
        for event in self.changed {
            commands.trigger(event);
        }
        for tag in self.behaviors {
            commands.trigger(SpecialBehaviorGranted { tag });
        }
        for event in self.actions {
            commands.trigger(event);
        }
        if let Some(event) = self.buff_started {
            commands.trigger(event);
        }
        if self.collect_all {
            commands.trigger(CollectAllPickups);
        }
    }
}

/// Records `skill` as taken and applies its effect with the new stack count.
pub fn acquire_skill(ctx: &mut EffectContext, skill: &SkillDefinition) -> (u32, EffectOutcome) {
    let stacks = ctx.skills.record(skill);
    let outcome = apply_effect(ctx, skill, stacks);
    info!(skill = %skill.id, stacks, "skill acquired");
    (stacks, outcome)
}

pub fn apply_effect(ctx: &mut EffectContext, skill: &SkillDefinition, stacks: u32) -> EffectOutcome {
    let mut outcome = EffectOutcome::default();

    match &skill.effect {
        EffectDescriptor::StatModifier {
            target,
            operation,
            value,
            secondary,
        } => {
            // A fresh id per application, so stacks add up instead of overwriting.
            let id = format!("{}_{}", skill.id, ctx.skills.next_application_id());
            if let Some(change) = secondary {
                outcome.added.push(modifier(change, format!("{id}_secondary")));
            }
            outcome.added.push(AddStatModifier {
                stat: *target,
                id,
                op: *operation,
                value: *value,
            });
        }
        EffectDescriptor::Instant { action, value } => match action {
            InstantAction::AddBarrierCharge => {
                let charges = ctx.skills.add_barrier_charges(value.max(0.0) as u32);
                debug!(charges, "barrier charge added");
            }
            InstantAction::HealPlayer => {
                let health = (ctx.stats.player_health + value).min(ctx.stats.max_player_health);
                ctx.stats.player_health = health;
                outcome.changed.push(StatChanged {
                    stat: StatKey::PlayerHealth,
                    value: health,
                });
            }
            InstantAction::CollectAllEnergy => outcome.collect_all = true,
        },
        EffectDescriptor::TimedBuff {
            buff_id,
            duration_ms,
            modifiers,
            action,
        } => apply_buff(
            ctx,
            &mut outcome,
            buff_id,
            Duration::from_millis(*duration_ms),
            modifiers,
            action.map(|action| (action, stacks)),
        ),
        EffectDescriptor::SpecialBehavior(SpecialBehavior::Behavior(tag)) => {
            if ctx.skills.grant_behavior(tag.clone()) {
                outcome.behaviors.push(tag.clone());
            }
        }
        EffectDescriptor::SpecialBehavior(SpecialBehavior::Action(action)) => {
            // Missile actions only feed the launcher's stack counts.
            if !action.is_missile_action() && ctx.skills.grant_behavior(action.tag()) {
                outcome.behaviors.push(action.tag().to_string());
            }
            outcome.actions.push(SkillActionApplied {
                action: *action,
                stacks,
            });
        }
    }

    outcome
}

fn apply_buff(
    ctx: &mut EffectContext,
    outcome: &mut EffectOutcome,
    buff_id: &str,
    duration: Duration,
    modifiers: &[StatChange],
    action: Option<(BuffAction, u32)>,
) {
    // Reapplying refreshes the buff: the old modifiers and timers go first.
    if let Some(removed) = remove_buff(ctx.skills, ctx.scheduler, buff_id) {
        debug!(buff = buff_id, "replacing active buff");
        outcome.removed.extend(removed);
    }

    let mut modifier_ids = Vec::with_capacity(modifiers.len());
    for change in modifiers {
        let id = format!("buff_{buff_id}_{}", change.target.name());
        modifier_ids.push((change.target, id.clone()));
        outcome.added.push(modifier(change, id));
    }

    let owner = Some(TaskOwner::Buff(buff_id.to_string()));
    ctx.scheduler.schedule_once(
        duration,
        TaskKind::BuffExpiry {
            buff_id: buff_id.to_string(),
        },
        owner.clone(),
    );
    match action {
        Some((BuffAction::AutoShockwave, _)) => {
            ctx.scheduler.schedule_repeating(
                ctx.config.auto_shockwave_interval,
                TaskKind::AutoShockwave,
                owner,
            );
        }
        Some((BuffAction::ActivateRandomLightning, level)) => {
            ctx.scheduler.schedule_repeating(
                storm_interval(level),
                TaskKind::LightningStorm { level },
                owner,
            );
        }
        None => {}
    }

    ctx.skills.insert_buff(
        buff_id,
        ActiveBuff {
            started_at: ctx.now,
            duration,
            modifier_ids,
        },
    );
    info!(buff = buff_id, ?duration, "buff started");
    outcome.buff_started = Some(BuffStarted {
        buff_id: buff_id.to_string(),
        duration,
    });
}

/// Drops an active buff with every task it owns. Returns the modifier
/// removals to emit, or `None` if the buff was not active.
pub fn remove_buff(
    skills: &mut PlayerSkills,
    scheduler: &mut TaskScheduler,
    buff_id: &str,
) -> Option<Vec<RemoveStatModifier>> {
    let buff = skills.take_buff(buff_id)?;
    let cancelled = scheduler.cancel_owned(&TaskOwner::Buff(buff_id.to_string()));
    trace!(buff = buff_id, cancelled, "buff tasks cancelled");

    Some(
        buff.modifier_ids
            .into_iter()
            .map(|(stat, id)| RemoveStatModifier { stat, id })
            .collect(),
    )
}

pub(crate) fn on_buff_expired(
    trigger: On<TaskFired>,
    mut commands: Commands,
    mut skills: ResMut<PlayerSkills>,
    mut scheduler: ResMut<TaskScheduler>,
) {
    let TaskKind::BuffExpiry { buff_id } = &trigger.event().kind else {
        return;
    };
    let Some(removed) = remove_buff(&mut skills, &mut scheduler, buff_id) else {
        return;
    };

    info!(buff = %buff_id, "buff expired");
    for event in removed {
        commands.trigger(event);
    }
    commands.trigger(BuffEnded {
        buff_id: buff_id.clone(),
    });
}

fn modifier(change: &StatChange, id: String) -> AddStatModifier {
    AddStatModifier {
        stat: change.target,
        id,
        op: change.operation,
        value: change.value,
    }
}
