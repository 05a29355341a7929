//! What happens when a combatant's turn begins.

use tracing::trace;

use crate::combat::{LogEntry, LogKind, apply_healing, is_dead};
use crate::features::{ClassFeature, active_features};
use crate::maneuver::{apply_relentless, check_relentless};
use crate::state::{Ability, ActiveCondition, Combatant, Condition, ConditionDuration, TurnFlags};

/// The per-turn flags a combatant starts its turn with.
///
/// The reaction is not part of this patch: it is refreshed separately by
/// [`begin_turn`], so one spent on someone else's turn stays spent until then.
pub fn get_turn_resets() -> TurnFlags {
    TurnFlags::default()
}

/// Conditions after one tick of their durations.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionExpiry {
    pub conditions: Vec<ActiveCondition>,
    pub expired_condition_names: Vec<Condition>,
    /// The Evasive Footwork condition ran out on this tick.
    pub evasive_expired: bool,
}

/// Ticks every timed condition once.
///
/// A duration above 1 loses a turn; a duration of 1 expires. Indefinite and
/// until-cured conditions are untouched.
pub fn calculate_condition_expiry(combatant: &Combatant) -> ConditionExpiry {
    let mut expiry = ConditionExpiry::default();
    for active in &combatant.conditions {
        match active.duration {
            ConditionDuration::Turns(turns) if turns > 1 => {
                expiry
                    .conditions
                    .push(ActiveCondition::for_turns(active.condition, turns - 1));
            }
            ConditionDuration::Turns(_) => {
                expiry.expired_condition_names.push(active.condition);
                if active.condition == Condition::Evasive {
                    expiry.evasive_expired = true;
                }
            }
            ConditionDuration::Indefinite | ConditionDuration::UntilCured => {
                expiry.conditions.push(*active);
            }
        }
    }
    expiry
}

/// A passive feature firing at the start of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum StartOfTurnEffect {
    /// Gain Heroic Inspiration.
    HeroicWarrior,
    /// Regain HP while bloodied.
    HeroicRally { heal: u32 },
}

/// Start-of-turn effects in feature declaration order.
pub fn calculate_start_of_turn_effects(combatant: &Combatant) -> Vec<StartOfTurnEffect> {
    let mut effects = Vec::new();
    for feature in active_features(combatant) {
        match feature {
            ClassFeature::HeroicWarrior(_) if !combatant.heroic_inspiration => {
                effects.push(StartOfTurnEffect::HeroicWarrior);
            }
            ClassFeature::Survivor(_) => {
                let hp = combatant.current_hp;
                let bloodied = hp > 0 && hp * 2 <= combatant.max_hp;
                let amount = 5 + combatant.ability_modifier(Ability::Constitution);
                let heal = (amount.max(0) as u32).min(combatant.max_hp - hp);
                if bloodied && heal > 0 {
                    effects.push(StartOfTurnEffect::HeroicRally { heal });
                }
            }
            _ => {}
        }
    }
    effects
}

#[must_use]
pub fn apply_start_of_turn_effects(
    combatant: &Combatant,
    effects: &[StartOfTurnEffect],
) -> (Combatant, Vec<LogEntry>) {
    let mut next = combatant.clone();
    let mut log = Vec::new();
    for effect in effects {
        match *effect {
            StartOfTurnEffect::HeroicWarrior => {
                next.heroic_inspiration = true;
                log.push(LogEntry::new(
                    LogKind::Feature,
                    format!("{} gains Heroic Inspiration", combatant.name),
                ));
            }
            StartOfTurnEffect::HeroicRally { heal } => {
                next = apply_healing(&next, heal);
                log.push(LogEntry::new(
                    LogKind::Heal,
                    format!("{} rallies and regains {heal} HP", combatant.name),
                ));
            }
        }
    }
    (next, log)
}

/// Dead combatants are skipped; the unconscious still take their turn to roll
/// death saves.
pub fn should_skip_turn(combatant: &Combatant) -> bool {
    is_dead(combatant)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnStart {
    pub combatant: Combatant,
    pub expired: Vec<Condition>,
    pub effects: Vec<StartOfTurnEffect>,
    pub log: Vec<LogEntry>,
}

/// Everything that happens as a combatant's turn begins, in order: flags
/// reset and the reaction returns, conditions tick, Relentless regains a die,
/// then start-of-turn features fire.
pub fn begin_turn(combatant: &Combatant) -> TurnStart {
    let mut next = combatant.clone();
    next.turn = get_turn_resets();
    next.has_reacted = false;

    let expiry = calculate_condition_expiry(&next);
    next.conditions = expiry.conditions;
    if expiry.evasive_expired {
        next.evasive_ac_bonus = 0;
    }

    let mut log: Vec<LogEntry> = expiry
        .expired_condition_names
        .iter()
        .map(|condition| {
            LogEntry::new(
                LogKind::Condition,
                format!("{} is no longer {condition}", combatant.name),
            )
        })
        .collect();

    if check_relentless(&next) {
        next = apply_relentless(&next);
        log.push(LogEntry::new(
            LogKind::Feature,
            format!("{} regains a superiority die (Relentless)", combatant.name),
        ));
    }

    let effects = calculate_start_of_turn_effects(&next);
    let (next, effect_log) = apply_start_of_turn_effects(&next, &effects);
    log.extend(effect_log);

    trace!(
        target: "tactics::turn",
        combatant = %combatant.id,
        expired = expiry.expired_condition_names.len(),
        effects = effects.len(),
        "turn started"
    );

    TurnStart {
        combatant: next,
        expired: expiry.expired_condition_names,
        effects,
        log,
    }
}
