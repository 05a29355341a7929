//! Whether a spell can be cast, and what casting it spends.

use crate::error::{RejectionKind, RuleError};
use crate::state::Combatant;

use super::{CastingTime, Spell};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CastError {
    #[error("only characters can cast spells")]
    NotACharacter,
    #[error("action already used this turn")]
    ActionUsed,
    #[error("bonus action already used this turn")]
    BonusActionUsed,
    #[error("reaction spells need a trigger and cannot be cast freely")]
    RequiresTrigger,
}

impl RuleError for CastError {
    fn kind(&self) -> RejectionKind {
        match self {
            Self::NotACharacter | Self::RequiresTrigger => RejectionKind::Precondition,
            Self::ActionUsed | Self::BonusActionUsed => RejectionKind::ActionEconomy,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotACharacter => "not_a_character",
            Self::ActionUsed => "action_used",
            Self::BonusActionUsed => "bonus_action_used",
            Self::RequiresTrigger => "requires_trigger",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("caster has no spell slots")]
    NoSpellSlots,
    #[error("no level {0} spell slots")]
    NoSlotOfLevel(u8),
    #[error("no level {0} spell slots remaining")]
    NoSlotsRemaining(u8),
}

impl RuleError for SlotError {
    fn kind(&self) -> RejectionKind {
        match self {
            Self::NoSpellSlots | Self::NoSlotOfLevel(_) => RejectionKind::Precondition,
            Self::NoSlotsRemaining(_) => RejectionKind::ResourceExhausted,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoSpellSlots => "no_spell_slots",
            Self::NoSlotOfLevel(_) => "no_slot_of_level",
            Self::NoSlotsRemaining(_) => "no_slots_remaining",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpellError {
    #[error(transparent)]
    Cast(#[from] CastError),
    #[error(transparent)]
    Slot(#[from] SlotError),
}

impl RuleError for SpellError {
    fn kind(&self) -> RejectionKind {
        match self {
            Self::Cast(err) => err.kind(),
            Self::Slot(err) => err.kind(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Cast(err) => err.error_code(),
            Self::Slot(err) => err.error_code(),
        }
    }
}

/// What a successful cast will spend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SlotUsage {
    Cantrip,
    Slot(u8),
    /// The once-per-rest free cast granted by Magic Initiate.
    MagicInitiate,
}

/// Action-economy gate for casting `spell`.
pub fn validate_spell_casting(caster: &Combatant, spell: &Spell) -> Result<(), CastError> {
    if !caster.is_character() {
        return Err(CastError::NotACharacter);
    }
    match spell.casting_time {
        CastingTime::Action if caster.turn.has_acted => Err(CastError::ActionUsed),
        CastingTime::BonusAction if caster.turn.has_bonus_acted => Err(CastError::BonusActionUsed),
        CastingTime::Reaction => Err(CastError::RequiresTrigger),
        _ => Ok(()),
    }
}

/// Which resource casting `spell` would consume.
///
/// Cantrips are free. A pending Magic Initiate free use for this spell wins
/// over slots. Otherwise a slot of the spell's level must have charges left.
pub fn validate_spell_slot(caster: &Combatant, spell: &Spell) -> Result<SlotUsage, SlotError> {
    if spell.is_cantrip() {
        return Ok(SlotUsage::Cantrip);
    }
    if caster
        .resources
        .magic_initiate_free_uses
        .get(&spell.id)
        .copied()
        .unwrap_or(false)
    {
        return Ok(SlotUsage::MagicInitiate);
    }
    let slots = caster
        .resources
        .spell_slots
        .as_ref()
        .ok_or(SlotError::NoSpellSlots)?;
    let meter = slots
        .get(spell.level)
        .ok_or(SlotError::NoSlotOfLevel(spell.level))?;
    if meter.is_empty() {
        return Err(SlotError::NoSlotsRemaining(spell.level));
    }
    Ok(SlotUsage::Slot(spell.level))
}

/// Spends the slot or free use and the action-economy slot of the cast.
///
/// A concentration spell replaces whatever the caster was concentrating on.
#[must_use]
pub fn consume_spell_resources(caster: &Combatant, spell: &Spell, usage: SlotUsage) -> Combatant {
    let mut next = caster.clone();
    match usage {
        SlotUsage::Cantrip => {}
        SlotUsage::Slot(level) => {
            next.resources.spell_slots = next.resources.spell_slots.map(|slots| slots.spend(level));
        }
        SlotUsage::MagicInitiate => {
            next.resources
                .magic_initiate_free_uses
                .insert(spell.id.clone(), false);
        }
    }
    match spell.casting_time {
        CastingTime::Action => next.turn.has_acted = true,
        CastingTime::BonusAction => next.turn.has_bonus_acted = true,
        CastingTime::Reaction => next.has_reacted = true,
    }
    if spell.concentration {
        next.concentrating_on = Some(spell.id.clone());
    }
    next
}

/// Validates and pays for a cast in one step.
pub fn prepare_cast(caster: &Combatant, spell: &Spell) -> Result<(Combatant, SlotUsage), SpellError> {
    validate_spell_casting(caster, spell)?;
    let usage = validate_spell_slot(caster, spell)?;
    Ok((consume_spell_resources(caster, spell, usage), usage))
}
