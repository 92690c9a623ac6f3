mod scheduler;

pub use scheduler::*;

use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GameSchedule {
    FrameStart,
    ResolveIntent,
    PerformAction,
    Effect,
    FrameEnd,
}

pub struct SchedulePlugin;

impl Plugin for SchedulePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TaskScheduler>()
            .register_type::<TaskScheduler>()
            .configure_sets(
                Update,
                (
                    GameSchedule::FrameStart,
                    GameSchedule::ResolveIntent,
                    GameSchedule::PerformAction,
                    GameSchedule::Effect,
                    GameSchedule::FrameEnd,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                run_scheduled_tasks.in_set(GameSchedule::FrameStart),
            );
    }
}

/// Advances every unpaused task and fans fired ones out as [`TaskFired`].
///
/// Not gated on the simulation phase: paused tasks simply do not advance, while
/// tasks scheduled around the pause (card presentation, guard release) still run.
pub fn run_scheduled_tasks(
    mut commands: Commands,
    time: Res<Time>,
    mut scheduler: ResMut<TaskScheduler>,
) {
    for fired in scheduler.tick(time.delta()) {
        trace!(id = ?fired.id, kind = ?fired.kind, "task fired");
        commands.trigger(TaskFired {
            id: fired.id,
            kind: fired.kind,
            owner: fired.owner,
        });
    }
}
