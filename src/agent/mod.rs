//! Worker agents: professions, the serf arena, movement, and behavior

pub mod behavior;
pub mod movement;
pub mod profession;
pub mod serf;

pub use behavior::{Continuation, SerfState};
pub use movement::MoveOutcome;
pub use profession::Profession;
pub use serf::Serf;
