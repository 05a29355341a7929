//! Spending limited-use fighter features.

use crate::combat::{LogEntry, LogKind, SavingThrow, apply_healing, roll_saving_throw};
use crate::env::{DiceExpr, DiceRoller};
use crate::state::{Ability, Combatant};

use super::kinds::FeatureKind;
use super::query::{
    FeatureError, can_use_action_surge, can_use_indomitable, can_use_second_wind, find_feature,
};

/// A combatant after spending a feature, with the lines to append to the combat log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureUse<T = ()> {
    pub combatant: Combatant,
    pub outcome: T,
    pub log: Vec<LogEntry>,
}

fn spend_use(combatant: &mut Combatant, kind: FeatureKind) {
    let Some(feature) = find_feature(combatant, kind) else {
        return;
    };
    let key = feature.uses_key().to_string();
    if let Some(remaining) = combatant.resources.class_feature_uses.get_mut(&key) {
        *remaining = remaining.saturating_sub(1);
    }
}

/// Second Wind: bonus action, heals 1d10 + fighter level.
///
/// Returns the amount actually healed as the outcome.
pub fn use_second_wind(
    combatant: &Combatant,
    dice: &mut impl DiceRoller,
) -> Result<FeatureUse<u32>, FeatureError> {
    can_use_second_wind(combatant)?;

    let roll = dice.roll(&DiceExpr::new(1, 10).with_modifier(combatant.level() as i32));
    let mut next = apply_healing(combatant, roll.total);
    let healed = next.current_hp - combatant.current_hp;
    spend_use(&mut next, FeatureKind::SecondWind);
    next.turn.has_bonus_acted = true;

    Ok(FeatureUse {
        log: vec![LogEntry::new(
            LogKind::Feature,
            format!("{} uses Second Wind and regains {healed} HP", combatant.name),
        )],
        combatant: next,
        outcome: healed,
    })
}

/// Action Surge: regain the action (and a fresh set of attacks) once per turn.
pub fn use_action_surge(combatant: &Combatant) -> Result<FeatureUse, FeatureError> {
    can_use_action_surge(combatant)?;

    let mut next = combatant.clone();
    spend_use(&mut next, FeatureKind::ActionSurge);
    next.turn.has_acted = false;
    next.turn.attacks_made_this_turn = 0;
    next.turn.used_action_surge_this_turn = true;

    Ok(FeatureUse {
        log: vec![LogEntry::new(
            LogKind::Feature,
            format!("{} surges into action", combatant.name),
        )],
        combatant: next,
        outcome: (),
    })
}

/// Indomitable: reroll a failed saving throw, adding the fighter level.
pub fn use_indomitable(
    combatant: &Combatant,
    ability: Ability,
    dc: i32,
    dice: &mut impl DiceRoller,
) -> Result<FeatureUse<SavingThrow>, FeatureError> {
    can_use_indomitable(combatant)?;

    let mut save = roll_saving_throw(combatant, ability, dc, dice);
    save.total += combatant.level() as i32;
    save.success = save.total >= dc;

    let mut next = combatant.clone();
    spend_use(&mut next, FeatureKind::Indomitable);

    let verdict = if save.success { "succeeds" } else { "fails" };
    Ok(FeatureUse {
        log: vec![LogEntry::new(
            LogKind::Feature,
            format!(
                "{} rerolls the {} save with Indomitable and {verdict} ({} vs DC {dc})",
                combatant.name,
                ability.abbreviation(),
                save.total
            ),
        )],
        combatant: next,
        outcome: save,
    })
}
