//! Conditions attached to combatants.
//!
//! A condition is a named status (prone, frightened, unconscious, ...) with a
//! duration counted in the affected combatant's own turns. Durations only tick
//! at the start of that combatant's turn; see [`crate::turn::calculate_condition_expiry`].

/// Named status effects.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Condition {
    // ========================================================================
    // Standard conditions
    // ========================================================================
    Blinded,
    Charmed,
    Deafened,
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,

    // ========================================================================
    // Feature and maneuver riders
    // ========================================================================
    /// Evasive Footwork: AC bonus from a superiority die until it expires.
    Evasive,
    /// Goading Attack: disadvantage on attacks against anyone but the goader.
    Goaded,
    /// Sap mastery: disadvantage on the next attack roll.
    Sapped,
    /// Slow mastery: speed reduced by 10 ft.
    Slowed,
    /// Vex mastery: the attacker has advantage on its next attack against this target.
    Vexed,
    /// Dodge action: attacks against this combatant have disadvantage.
    Dodging,
    /// Disengage action: movement does not provoke opportunity attacks.
    Disengaged,
}

impl Condition {
    /// Conditions that stop a combatant from taking actions or reactions.
    pub const fn is_incapacitating(self) -> bool {
        matches!(
            self,
            Self::Incapacitated | Self::Paralyzed | Self::Petrified | Self::Stunned | Self::Unconscious
        )
    }
}

/// How long a condition lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConditionDuration {
    /// Expires after this many of the affected combatant's turn starts.
    Turns(u32),
    /// Lasts until something explicitly removes it (death, unconsciousness).
    Indefinite,
    /// Permanent until cured by a spell, rest or feature.
    UntilCured,
}

impl ConditionDuration {
    /// True when the duration is a countdown.
    pub const fn is_timed(self) -> bool {
        matches!(self, Self::Turns(_))
    }
}

/// A condition applied to a combatant together with its remaining duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveCondition {
    pub condition: Condition,
    pub duration: ConditionDuration,
}

impl ActiveCondition {
    pub const fn new(condition: Condition, duration: ConditionDuration) -> Self {
        Self {
            condition,
            duration,
        }
    }

    pub const fn for_turns(condition: Condition, turns: u32) -> Self {
        Self::new(condition, ConditionDuration::Turns(turns))
    }

    pub const fn indefinite(condition: Condition) -> Self {
        Self::new(condition, ConditionDuration::Indefinite)
    }

    pub const fn until_cured(condition: Condition) -> Self {
        Self::new(condition, ConditionDuration::UntilCured)
    }
}

/// Returns `conditions` with `added` appended unless that condition is already present.
///
/// Existing entries are never replaced or reordered.
pub fn with_condition(conditions: &[ActiveCondition], added: ActiveCondition) -> Vec<ActiveCondition> {
    let mut next = conditions.to_vec();
    if !next.iter().any(|c| c.condition == added.condition) {
        next.push(added);
    }
    next
}

/// Returns `conditions` with every entry of `removed` dropped.
pub fn without_condition(conditions: &[ActiveCondition], removed: Condition) -> Vec<ActiveCondition> {
    conditions
        .iter()
        .filter(|c| c.condition != removed)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appending_keeps_unrelated_conditions() {
        let start = vec![ActiveCondition::for_turns(Condition::Poisoned, 3)];
        let next = with_condition(&start, ActiveCondition::indefinite(Condition::Prone));
        assert_eq!(next.len(), 2);
        assert_eq!(next[0], start[0]);
        assert_eq!(next[1].condition, Condition::Prone);
    }

    #[test]
    fn appending_existing_condition_is_a_no_op() {
        let start = vec![ActiveCondition::for_turns(Condition::Prone, 1)];
        let next = with_condition(&start, ActiveCondition::indefinite(Condition::Prone));
        assert_eq!(next, start);
    }

    #[test]
    fn condition_names_round_trip_through_strings() {
        assert_eq!(Condition::Unconscious.as_ref(), "unconscious");
        assert_eq!("prone".parse::<Condition>().unwrap(), Condition::Prone);
    }
}
