//! Saving throws.

use crate::env::{Advantage, DiceRoller};
use crate::state::{Ability, Combatant};

/// Result of one saving throw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SavingThrow {
    pub ability: Ability,
    pub natural: u32,
    pub total: i32,
    pub dc: i32,
    pub success: bool,
}

/// Bonus added to a saving throw.
///
/// Characters add proficiency to proficient saves; monsters use their listed
/// save bonus, falling back to the ability modifier.
pub fn saving_throw_modifier(combatant: &Combatant, ability: Ability) -> i32 {
    match (combatant.sheet(), combatant.stat_block()) {
        (Some(sheet), _) => {
            let proficiency = if sheet.is_proficient_in_save(ability) {
                combatant.proficiency_bonus()
            } else {
                0
            };
            sheet.abilities.modifier(ability) + proficiency
        }
        (None, Some(stats)) => stats.save_bonus(ability),
        (None, None) => 0,
    }
}

/// DC of an effect keyed to `ability`: 8 + proficiency + modifier.
pub fn save_dc(combatant: &Combatant, ability: Ability) -> i32 {
    8 + combatant.proficiency_bonus() + combatant.ability_modifier(ability)
}

pub fn roll_saving_throw(
    combatant: &Combatant,
    ability: Ability,
    dc: i32,
    dice: &mut impl DiceRoller,
) -> SavingThrow {
    roll_saving_throw_with(combatant, ability, dc, Advantage::Normal, dice)
}

pub fn roll_saving_throw_with(
    combatant: &Combatant,
    ability: Ability,
    dc: i32,
    advantage: Advantage,
    dice: &mut impl DiceRoller,
) -> SavingThrow {
    let natural = dice.roll_d20_with(advantage).natural;
    let total = natural as i32 + saving_throw_modifier(combatant, ability);
    SavingThrow {
        ability,
        natural,
        total,
        dc,
        success: total >= dc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedDice;
    use crate::testing::{fighter, goblin};

    #[test]
    fn proficient_saves_add_proficiency() {
        let hero = fighter(5);
        assert_eq!(saving_throw_modifier(&hero, Ability::Strength), 3 + 3);
        assert_eq!(saving_throw_modifier(&hero, Ability::Dexterity), 1);
    }

    #[test]
    fn monster_saves_use_stat_block() {
        let gob = goblin();
        assert_eq!(saving_throw_modifier(&gob, Ability::Dexterity), 2);
        assert_eq!(saving_throw_modifier(&gob, Ability::Strength), -1);
    }

    #[test]
    fn meeting_the_dc_succeeds() {
        let gob = goblin();
        let save = roll_saving_throw(&gob, Ability::Strength, 10, &mut ScriptedDice::new([11]));
        assert!(save.success);
        assert_eq!(save.total, 10);

        let save = roll_saving_throw(&gob, Ability::Strength, 10, &mut ScriptedDice::new([10]));
        assert!(!save.success);
    }

    #[test]
    fn save_dc_uses_proficiency_and_modifier() {
        assert_eq!(save_dc(&fighter(1), Ability::Strength), 8 + 2 + 3);
    }
}
