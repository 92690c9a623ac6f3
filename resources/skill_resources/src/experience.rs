use bevy::prelude::*;

/// Experience toward the next weapon level.
#[derive(Resource, Reflect, Debug, Clone, PartialEq)]
#[reflect(Resource)]
pub struct Experience {
    pub level: u32,
    pub current: u32,
    pub to_next: u32,
    pub max_level: u32,
    /// Set from the level-up until shortly after the card is chosen.
    pub leveling_up: bool,
}

impl Default for Experience {
    fn default() -> Self {
        Self {
            level: 1,
            current: 0,
            to_next: 100,
            max_level: 30,
            leveling_up: false,
        }
    }
}

impl Experience {
    pub fn is_max_level(&self) -> bool {
        self.level >= self.max_level
    }

    /// Adds `amount` unless at max level. Returns `true` when the threshold is reached.
    pub fn gain(&mut self, amount: u32) -> bool {
        if !self.is_max_level() {
            self.current += amount;
        }
        self.current >= self.to_next
    }

    /// Starts a level-up. Refused while one is already in progress or at max level.
    pub fn begin_level_up(&mut self) -> bool {
        if self.leveling_up || self.is_max_level() {
            return false;
        }
        self.leveling_up = true;
        self.level += 1;
        self.current = 0;
        self.to_next = Self::threshold(self.level);
        true
    }

    pub fn finish_level_up(&mut self) {
        self.leveling_up = false;
    }

    pub fn threshold(level: u32) -> u32 {
        100 + level * 75
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_up_is_guarded() {
        let mut xp = Experience::default();

        assert!(!xp.gain(80));
        assert!(xp.gain(20));
        assert!(xp.begin_level_up());
        assert!(!xp.begin_level_up());
        assert_eq!(xp.level, 2);
        assert_eq!(xp.current, 0);
        assert_eq!(xp.to_next, 250);

        xp.finish_level_up();
        assert!(xp.begin_level_up());
        assert_eq!(xp.level, 3);
    }

    #[test]
    fn no_experience_at_max_level() {
        let mut xp = Experience {
            level: 30,
            to_next: Experience::threshold(30),
            ..default()
        };

        assert!(!xp.gain(10_000));
        assert_eq!(xp.current, 0);
        assert!(!xp.begin_level_up());
    }
}
