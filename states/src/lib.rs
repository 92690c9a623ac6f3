use bevy::prelude::*;

pub struct SimulationPhasePlugin;

impl Plugin for SimulationPhasePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationPhase>()
            .register_type::<SimulationPhase>();
    }
}

/// Whether the world is advancing or frozen behind the skill-card picker.
/// Always flipped together with the task scheduler's pause flags.
#[derive(Resource, Reflect, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[reflect(Resource)]
pub enum SimulationPhase {
    #[default]
    Running,
    SelectingSkill,
}

impl SimulationPhase {
    pub fn is_running(&self) -> bool {
        matches!(self, SimulationPhase::Running)
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self, SimulationPhase::SelectingSkill)
    }
}

/// Run condition for every system that mutates the world.
pub fn simulation_running(phase: Res<SimulationPhase>) -> bool {
    phase.is_running()
}
