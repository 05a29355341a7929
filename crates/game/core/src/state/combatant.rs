//! The combatant: a character or monster with live encounter state.

use std::collections::BTreeMap;

use crate::features::{ClassFeature, RacialAbilityKind};

use super::abilities::{Ability, AbilityScores, proficiency_bonus};
use super::character::{CharacterSheet, MonsterStatBlock};
use super::common::{CombatantId, Position, ResourceMeter};
use super::condition::{ActiveCondition, Condition};

/// What kind of creature a combatant wraps.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum CombatantPayload {
    Character(CharacterSheet),
    Monster(MonsterStatBlock),
}

/// Action-economy flags cleared at the start of the combatant's own turn.
///
/// The reaction is deliberately not part of this struct; see
/// [`Combatant::has_reacted`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnFlags {
    pub has_acted: bool,
    pub has_bonus_acted: bool,
    /// Feet of movement spent this turn.
    pub movement_used: u32,
    pub attacks_made_this_turn: u32,
    pub used_sneak_attack_this_turn: bool,
    pub used_maneuver_this_attack: bool,
    pub used_action_surge_this_turn: bool,
    /// Dash taken this turn; doubles the movement budget.
    pub dashed: bool,
    /// Feinting Attack target and the superiority die rolled for it.
    pub feint_target: Option<CombatantId>,
    pub feint_bonus: u32,
    /// Lunging Attack damage bonus pending for the next melee hit.
    pub lunging_bonus: u32,
    /// Precision Attack bonus pending for the current attack roll.
    pub precision_bonus: u32,
}

/// Spell slots keyed by slot level (1-9).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellSlots(pub BTreeMap<u8, ResourceMeter>);

impl SpellSlots {
    pub fn new(slots: impl IntoIterator<Item = (u8, u32)>) -> Self {
        Self(
            slots
                .into_iter()
                .map(|(level, count)| (level, ResourceMeter::full(count)))
                .collect(),
        )
    }

    pub fn get(&self, level: u8) -> Option<ResourceMeter> {
        self.0.get(&level).copied()
    }

    /// Returns the slots with one slot of `level` spent.
    #[must_use]
    pub fn spend(&self, level: u8) -> Self {
        let mut next = self.clone();
        if let Some(meter) = next.0.get_mut(&level) {
            *meter = meter.spend_one();
        }
        next
    }
}

/// Depletable pools tracked per combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourcePools {
    /// Remaining uses keyed by [`ClassFeature::uses_key`].
    pub class_feature_uses: BTreeMap<String, u32>,
    pub racial_ability_uses: BTreeMap<RacialAbilityKind, u32>,
    /// Spell ids castable once without a slot (Magic Initiate); `true` while unused.
    pub magic_initiate_free_uses: BTreeMap<String, bool>,
    pub superiority_dice_remaining: u32,
    pub spell_slots: Option<SpellSlots>,
}

/// Death saving throw tally for a character at 0 HP.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeathSaves {
    pub successes: u8,
    pub failures: u8,
    pub is_stable: bool,
}

impl DeathSaves {
    pub const FATAL_FAILURES: u8 = 3;
    pub const STABILIZING_SUCCESSES: u8 = 3;
}

/// A participant in an encounter.
///
/// Invariant: `current_hp <= max_hp`. Rule functions never mutate a combatant
/// in place; they return a new value (or a delta that produces one).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub payload: CombatantPayload,
    pub position: Position,
    pub current_hp: u32,
    pub max_hp: u32,
    pub temporary_hp: u32,
    pub initiative: i32,
    pub conditions: Vec<ActiveCondition>,
    pub turn: TurnFlags,
    /// Reaction spent since the start of this combatant's last turn.
    pub has_reacted: bool,
    pub resources: ResourcePools,
    pub death_saves: DeathSaves,
    /// Spell id being concentrated on.
    pub concentrating_on: Option<String>,
    pub heroic_inspiration: bool,
    /// AC bonus granted by Evasive Footwork while the `evasive` condition lasts.
    pub evasive_ac_bonus: u32,
}

impl Combatant {
    fn with_payload(id: CombatantId, name: String, payload: CombatantPayload, max_hp: u32) -> Self {
        Self {
            id,
            name,
            payload,
            position: Position::ORIGIN,
            current_hp: max_hp,
            max_hp,
            temporary_hp: 0,
            initiative: 0,
            conditions: Vec::new(),
            turn: TurnFlags::default(),
            has_reacted: false,
            resources: ResourcePools::default(),
            death_saves: DeathSaves::default(),
            concentrating_on: None,
            heroic_inspiration: false,
            evasive_ac_bonus: 0,
        }
    }

    pub fn character(
        id: CombatantId,
        name: impl Into<String>,
        sheet: CharacterSheet,
        max_hp: u32,
    ) -> Self {
        Self::with_payload(id, name.into(), CombatantPayload::Character(sheet), max_hp)
    }

    pub fn monster(id: CombatantId, stats: MonsterStatBlock, max_hp: u32) -> Self {
        let name = stats.name.clone();
        Self::with_payload(id, name, CombatantPayload::Monster(stats), max_hp)
    }

    // ========================================================================
    // Builders
    // ========================================================================

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Sets current HP, clamped to `max_hp`.
    pub fn with_hp(mut self, current_hp: u32) -> Self {
        self.current_hp = current_hp.min(self.max_hp);
        self
    }

    pub fn with_condition(mut self, condition: ActiveCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_resources(mut self, resources: ResourcePools) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_superiority_dice(mut self, dice: u32) -> Self {
        self.resources.superiority_dice_remaining = dice;
        self
    }

    pub fn with_spell_slots(mut self, slots: SpellSlots) -> Self {
        self.resources.spell_slots = Some(slots);
        self
    }

    pub fn with_initiative(mut self, initiative: i32) -> Self {
        self.initiative = initiative;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn is_character(&self) -> bool {
        matches!(self.payload, CombatantPayload::Character(_))
    }

    pub fn is_monster(&self) -> bool {
        matches!(self.payload, CombatantPayload::Monster(_))
    }

    /// Binary factions: characters oppose monsters and vice versa.
    pub fn is_enemy_of(&self, other: &Combatant) -> bool {
        self.is_character() != other.is_character()
    }

    pub fn sheet(&self) -> Option<&CharacterSheet> {
        match &self.payload {
            CombatantPayload::Character(sheet) => Some(sheet),
            CombatantPayload::Monster(_) => None,
        }
    }

    pub fn stat_block(&self) -> Option<&MonsterStatBlock> {
        match &self.payload {
            CombatantPayload::Monster(stats) => Some(stats),
            CombatantPayload::Character(_) => None,
        }
    }

    /// Character level, or 0 for monsters.
    pub fn level(&self) -> u32 {
        self.sheet().map(|s| s.level).unwrap_or(0)
    }

    pub fn abilities(&self) -> &AbilityScores {
        match &self.payload {
            CombatantPayload::Character(sheet) => &sheet.abilities,
            CombatantPayload::Monster(stats) => &stats.abilities,
        }
    }

    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        self.abilities().modifier(ability)
    }

    pub fn proficiency_bonus(&self) -> i32 {
        match &self.payload {
            CombatantPayload::Character(sheet) => proficiency_bonus(sheet.level),
            CombatantPayload::Monster(stats) => stats.proficiency_bonus,
        }
    }

    /// Every class feature on the sheet, regardless of level.
    pub fn features(&self) -> &[ClassFeature] {
        self.sheet().map(|s| s.features.as_slice()).unwrap_or(&[])
    }

    pub fn speed(&self) -> u32 {
        match &self.payload {
            CombatantPayload::Character(sheet) => sheet.speed,
            CombatantPayload::Monster(stats) => stats.speed,
        }
    }

    pub fn has_condition(&self, condition: Condition) -> bool {
        self.conditions.iter().any(|c| c.condition == condition)
    }

    pub fn is_spellcasting_character(&self) -> bool {
        self.sheet().is_some_and(CharacterSheet::is_spellcaster)
    }

    pub fn is_concentrating(&self) -> bool {
        self.concentrating_on.is_some()
    }

    /// Unspent feet of movement this turn, counting Dash.
    pub fn movement_remaining(&self) -> u32 {
        let budget = if self.turn.dashed {
            self.speed() * 2
        } else {
            self.speed()
        };
        budget.saturating_sub(self.turn.movement_used)
    }

    pub fn feature_uses(&self, key: &str) -> Option<u32> {
        self.resources.class_feature_uses.get(key).copied()
    }
}
