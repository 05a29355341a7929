//! Turn planning for AI-controlled combatants.
//!
//! The planner is deterministic: given the same encounter it produces the
//! same [`AiDecision`]. It never mutates anything; the orchestrator executes
//! the returned actions through the regular rule functions.

mod context;
mod decision;
mod targeting;

pub use context::AiContext;
pub use decision::{
    AiAction, AiDecision, CunningActionChoice, decide_monster_turn, get_best_usable_attack,
};
pub use targeting::{find_best_target, score_target};
