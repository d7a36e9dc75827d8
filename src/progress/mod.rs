pub mod achievements;
pub mod calculator;
pub mod error;
pub mod model;
pub mod mutator;
pub mod rounds;
pub mod stage;

pub use achievements::{Achievement, Achievements};
pub use calculator::{
    achievement_count, achievement_level, completed_round_count, stage_completion_level,
    stage_completion_level_with, ProgressSummary, DEFAULT_MAX_ROUNDS,
};
pub use error::ProgressError;
pub use model::{CustomerProgress, StageData};
pub use mutator::{
    clear_stage, set_achievement_level, set_stage, set_stage_memo, set_stage_payload,
    toggle_achievement, toggle_achievement_named,
};
pub use rounds::RoundProgress;
pub use stage::{StageKey, StageKind, StagePayload};
