use {bevy::prelude::*, std::time::Duration};

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// Groups tasks that must be cancelled together.
#[derive(Reflect, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskOwner {
    /// A timed buff: its expiry and every recurring action it started.
    Buff(String),
    LevelUp,
    Shockwave,
    ElectricField,
    Launcher,
    Spawner,
    Chain(u32),
}

/// Handler tag of a scheduled task. Each gameplay plugin observes
/// [`TaskFired`] and handles the kinds it owns.
#[derive(Reflect, Debug, Clone, PartialEq)]
pub enum TaskKind {
    EnemySpawn,
    MissileVolley,
    MissileLaunch {
        origin: Vec2,
        target: Entity,
        bounce: u32,
    },
    ChainJump {
        session: u32,
    },
    BuffExpiry {
        buff_id: String,
    },
    AutoShockwave,
    LightningStorm {
        level: u32,
    },
    LightningStrike {
        position: Vec2,
        damage: f32,
        range: f32,
    },
    EchoShockwave {
        scale: f32,
    },
    ShockwaveWindowEnd,
    ElectricFieldPulse,
    ShowSkillCards,
    ReleaseLevelUpGuard,
}

#[derive(Reflect, Debug, Clone)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub kind: TaskKind,
    pub owner: Option<TaskOwner>,
    pub paused: bool,
    timer: Timer,
}

impl ScheduledTask {
    pub fn is_repeating(&self) -> bool {
        self.timer.mode() == TimerMode::Repeating
    }

    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FiredTask {
    pub id: TaskId,
    pub kind: TaskKind,
    pub owner: Option<TaskOwner>,
}

#[derive(Event, Debug, Clone)]
pub struct TaskFired {
    pub id: TaskId,
    pub kind: TaskKind,
    pub owner: Option<TaskOwner>,
}

/// Every delayed or recurring piece of gameplay runs through here, so pausing
/// for skill selection and tearing down a buff's timers are single calls.
#[derive(Resource, Reflect, Default, Debug)]
#[reflect(Resource)]
pub struct TaskScheduler {
    tasks: Vec<ScheduledTask>,
    next_id: u64,
    paused: bool,
}

impl TaskScheduler {
    pub fn schedule_once(
        &mut self,
        delay: Duration,
        kind: TaskKind,
        owner: Option<TaskOwner>,
    ) -> TaskId {
        self.push(Timer::new(delay, TimerMode::Once), kind, owner)
    }

    pub fn schedule_repeating(
        &mut self,
        period: Duration,
        kind: TaskKind,
        owner: Option<TaskOwner>,
    ) -> TaskId {
        let period = period.max(Duration::from_millis(1));
        self.push(Timer::new(period, TimerMode::Repeating), kind, owner)
    }

    fn push(&mut self, timer: Timer, kind: TaskKind, owner: Option<TaskOwner>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        // Tasks created while the world is frozen stay frozen until resume.
        self.tasks.push(ScheduledTask {
            id,
            kind,
            owner,
            paused: self.paused,
            timer,
        });
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        before != self.tasks.len()
    }

    /// Cancels every task of `owner` and returns how many were dropped.
    pub fn cancel_owned(&mut self, owner: &TaskOwner) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.owner.as_ref() != Some(owner));
        before - self.tasks.len()
    }

    pub fn pause_all(&mut self) {
        self.paused = true;
        for task in &mut self.tasks {
            task.paused = true;
        }
    }

    pub fn resume_all(&mut self) {
        self.paused = false;
        for task in &mut self.tasks {
            task.paused = false;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn get(&self, id: TaskId) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn owned_by<'a>(&'a self, owner: &'a TaskOwner) -> impl Iterator<Item = &'a ScheduledTask> {
        self.tasks
            .iter()
            .filter(move |task| task.owner.as_ref() == Some(owner))
    }

    pub fn contains_kind(&self, kind: &TaskKind) -> bool {
        self.tasks.iter().any(|task| &task.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.paused = false;
    }

    /// Advances unpaused tasks by `delta`. A repeating task that elapsed more
    /// than one period fires once per period; finished one-shot tasks are dropped.
    pub fn tick(&mut self, delta: Duration) -> Vec<FiredTask> {
        let mut fired = Vec::new();

        for task in self.tasks.iter_mut().filter(|task| !task.paused) {
            task.timer.tick(delta);
            for _ in 0..task.timer.times_finished_this_tick() {
                fired.push(FiredTask {
                    id: task.id,
                    kind: task.kind.clone(),
                    owner: task.owner.clone(),
                });
            }
        }

        self.tasks
            .retain(|task| task.is_repeating() || !task.timer.is_finished());

        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buff(id: &str) -> TaskOwner {
        TaskOwner::Buff(id.to_string())
    }

    #[test]
    fn one_shot_fires_once_and_is_dropped() {
        let mut scheduler = TaskScheduler::default();
        scheduler.schedule_once(Duration::from_millis(200), TaskKind::ShowSkillCards, None);

        assert!(scheduler.tick(Duration::from_millis(150)).is_empty());
        let fired = scheduler.tick(Duration::from_millis(60));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, TaskKind::ShowSkillCards);
        assert!(scheduler.is_empty());
        assert!(scheduler.tick(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn repeating_task_fires_every_period() {
        let mut scheduler = TaskScheduler::default();
        scheduler.schedule_repeating(Duration::from_millis(500), TaskKind::ElectricFieldPulse, None);

        let fired = scheduler.tick(Duration::from_millis(1600));
        assert_eq!(fired.len(), 3);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn paused_tasks_do_not_advance() {
        let mut scheduler = TaskScheduler::default();
        scheduler.schedule_repeating(Duration::from_millis(1200), TaskKind::EnemySpawn, None);
        scheduler.pause_all();

        assert!(scheduler.tick(Duration::from_secs(10)).is_empty());

        // Scheduled during the pause, so frozen as well.
        scheduler.schedule_once(Duration::ZERO, TaskKind::AutoShockwave, None);
        assert!(scheduler.tick(Duration::from_secs(1)).is_empty());

        scheduler.resume_all();
        let fired = scheduler.tick(Duration::from_millis(1200));
        assert_eq!(fired.len(), 2);
    }

    #[test]
    fn cancel_owned_drops_the_whole_group() {
        let mut scheduler = TaskScheduler::default();
        let owner = buff("auto_shockwave");
        scheduler.schedule_once(
            Duration::from_secs(30),
            TaskKind::BuffExpiry {
                buff_id: "auto_shockwave".into(),
            },
            Some(owner.clone()),
        );
        scheduler.schedule_repeating(
            Duration::from_secs(3),
            TaskKind::AutoShockwave,
            Some(owner.clone()),
        );
        scheduler.schedule_repeating(Duration::from_millis(1200), TaskKind::EnemySpawn, Some(TaskOwner::Spawner));

        assert_eq!(scheduler.owned_by(&owner).count(), 2);
        assert_eq!(scheduler.cancel_owned(&owner), 2);
        assert_eq!(scheduler.cancel_owned(&owner), 0);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.contains_kind(&TaskKind::EnemySpawn));
    }

    #[test]
    fn cancel_by_id() {
        let mut scheduler = TaskScheduler::default();
        let id = scheduler.schedule_once(Duration::from_secs(1), TaskKind::ShockwaveWindowEnd, None);

        assert!(scheduler.get(id).is_some());
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(scheduler.tick(Duration::from_secs(2)).is_empty());
    }
}
