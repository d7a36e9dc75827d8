use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ProgressError;

/// Milestone flags tracked independently of stage payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Achievement {
    BasicTraining,
    StandardProtocol,
    ExpertCourse,
}

impl Achievement {
    /// Ordered from the first star to the third
    pub const ALL: [Achievement; 3] = [
        Achievement::BasicTraining,
        Achievement::StandardProtocol,
        Achievement::ExpertCourse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Achievement::BasicTraining => "basicTraining",
            Achievement::StandardProtocol => "standardProtocol",
            Achievement::ExpertCourse => "expertCourse",
        }
    }

    /// Star level this flag represents (1..=3)
    pub fn level(&self) -> u8 {
        match self {
            Achievement::BasicTraining => 1,
            Achievement::StandardProtocol => 2,
            Achievement::ExpertCourse => 3,
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Achievement {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Achievement::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ProgressError::InvalidAchievement(s.to_string()))
    }
}

/// Achievement flags. Missing fields in stored JSON read as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Achievements {
    pub basic_training: bool,
    pub standard_protocol: bool,
    pub expert_course: bool,
}

impl Achievements {
    pub fn get(&self, flag: Achievement) -> bool {
        match flag {
            Achievement::BasicTraining => self.basic_training,
            Achievement::StandardProtocol => self.standard_protocol,
            Achievement::ExpertCourse => self.expert_course,
        }
    }

    pub fn set(&mut self, flag: Achievement, value: bool) {
        match flag {
            Achievement::BasicTraining => self.basic_training = value,
            Achievement::StandardProtocol => self.standard_protocol = value,
            Achievement::ExpertCourse => self.expert_course = value,
        }
    }

    pub fn count(&self) -> usize {
        Achievement::ALL.iter().filter(|a| self.get(**a)).count()
    }

    /// Highest achieved star, regardless of gaps below it
    pub fn level(&self) -> u8 {
        Achievement::ALL
            .iter()
            .rev()
            .find(|a| self.get(**a))
            .map(Achievement::level)
            .unwrap_or(0)
    }

    /// Star checkbox rule: checking level N sets every flag up to N and
    /// leaves higher ones alone; unchecking N clears N and everything above.
    pub fn check_level(&self, level: u8, checked: bool) -> Result<Self, ProgressError> {
        if !(1..=3).contains(&level) {
            return Err(ProgressError::InvalidLevel(level));
        }
        let mut flags = *self;
        for a in Achievement::ALL {
            if checked && a.level() <= level {
                flags.set(a, true);
            } else if !checked && a.level() >= level {
                flags.set(a, false);
            }
        }
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flag_names() {
        assert_eq!("expertCourse".parse::<Achievement>().unwrap(), Achievement::ExpertCourse);
        assert!(matches!(
            "masterClass".parse::<Achievement>(),
            Err(ProgressError::InvalidAchievement(_))
        ));
    }

    #[test]
    fn level_uses_highest_flag() {
        let mut a = Achievements::default();
        assert_eq!(a.level(), 0);
        a.standard_protocol = true;
        assert_eq!(a.level(), 2);
        assert_eq!(a.count(), 1);
        a.expert_course = true;
        assert_eq!(a.level(), 3);
    }

    #[test]
    fn checking_cascades_down() {
        let two = Achievements::default().check_level(2, true).unwrap();
        assert!(two.basic_training && two.standard_protocol && !two.expert_course);
        assert!(matches!(Achievements::default().check_level(4, true), Err(ProgressError::InvalidLevel(4))));
        assert!(matches!(Achievements::default().check_level(0, false), Err(ProgressError::InvalidLevel(0))));
    }

    #[test]
    fn checking_keeps_higher_flags() {
        let expert_only = Achievements {
            expert_course: true,
            ..Default::default()
        };
        let checked = expert_only.check_level(1, true).unwrap();
        assert_eq!(
            checked,
            Achievements {
                basic_training: true,
                standard_protocol: false,
                expert_course: true,
            }
        );
    }

    #[test]
    fn unchecking_cascades_up() {
        let all = Achievements::default().check_level(3, true).unwrap();
        let one = all.check_level(2, false).unwrap();
        assert!(one.basic_training && !one.standard_protocol && !one.expert_course);
        assert_eq!(all.check_level(1, false).unwrap(), Achievements::default());
    }

    #[test]
    fn partial_json_defaults_to_false() {
        let a: Achievements = serde_json::from_str(r#"{"basicTraining": true}"#).unwrap();
        assert!(a.basic_training);
        assert!(!a.standard_protocol);
        let empty: Achievements = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Achievements::default());
    }
}
