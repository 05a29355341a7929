//! Initiative and turn order.

use std::cmp::Reverse;

use crate::combat::is_dead;
use crate::env::{Advantage, DiceRoller};
use crate::features::has_remarkable_athlete;
use crate::state::{Ability, Combatant, CombatantId};

/// d20 + DEX modifier; Remarkable Athlete rolls with advantage.
pub fn roll_initiative(combatant: &Combatant, dice: &mut impl DiceRoller) -> i32 {
    let advantage = if has_remarkable_athlete(combatant) {
        Advantage::Advantage
    } else {
        Advantage::Normal
    };
    dice.roll_d20_with(advantage).natural as i32 + combatant.ability_modifier(Ability::Dexterity)
}

/// Rolls initiative for everyone, in roster order.
pub fn assign_initiative(combatants: &[Combatant], dice: &mut impl DiceRoller) -> Vec<Combatant> {
    combatants
        .iter()
        .map(|c| {
            let initiative = roll_initiative(c, dice);
            c.clone().with_initiative(initiative)
        })
        .collect()
}

/// Highest initiative first; ties go to the higher DEX score, then the lower id.
pub fn initiative_order(combatants: &[Combatant]) -> Vec<CombatantId> {
    let mut order: Vec<&Combatant> = combatants.iter().collect();
    order.sort_by_key(|c| {
        (
            Reverse(c.initiative),
            Reverse(c.abilities().score(Ability::Dexterity)),
            c.id,
        )
    });
    order.into_iter().map(|c| c.id).collect()
}

/// Index of the next combatant to act after `current`, wrapping around and
/// skipping the dead. `None` when nobody is left alive.
pub fn next_turn_index(order: &[Combatant], current: usize) -> Option<usize> {
    let len = order.len();
    (1..=len)
        .map(|step| (current + step) % len)
        .find(|&index| !is_dead(&order[index]))
}
