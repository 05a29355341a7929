//! Turn manager: initiative, start-of-turn bookkeeping and turn order.
//!
//! The orchestrator owns the encounter loop; these functions only compute the
//! next state of one combatant (or of the order) at a time.

mod initiative;
mod start;

pub use initiative::{assign_initiative, initiative_order, next_turn_index, roll_initiative};
pub use start::{
    ConditionExpiry, StartOfTurnEffect, TurnStart, apply_start_of_turn_effects, begin_turn,
    calculate_condition_expiry, calculate_start_of_turn_effects, get_turn_resets,
    should_skip_turn,
};
