//! Rolling spell attacks, saves and projectiles.

use std::collections::BTreeMap;

use crate::combat::{AttackRoll, SavingThrow, is_dead, resolve_attack_roll, roll_saving_throw};
use crate::env::{Advantage, DiceExpr, DiceRoller};
use crate::features::armor_class;
use crate::state::{Combatant, CombatantId};

use super::Spell;

/// Modifier of the caster's spellcasting ability (0 without one).
pub fn spellcasting_modifier(caster: &Combatant) -> i32 {
    caster
        .sheet()
        .and_then(|sheet| sheet.spellcasting_ability)
        .map_or(0, |ability| caster.ability_modifier(ability))
}

/// Proficiency plus spellcasting modifier.
pub fn spell_attack_bonus(caster: &Combatant) -> i32 {
    caster.proficiency_bonus() + spellcasting_modifier(caster)
}

/// 8 + proficiency + spellcasting modifier.
pub fn spell_save_dc(caster: &Combatant) -> i32 {
    8 + spell_attack_bonus(caster)
}

/// Damage dice of `spell` for a caster of `caster_level`.
///
/// Cantrips take the highest scaling tier at or below the caster's level;
/// leveled spells always use their base dice.
pub fn get_effective_damage_dice(spell: &Spell, caster_level: u32) -> Option<DiceExpr> {
    let damage = spell.damage.as_ref()?;
    if !spell.is_cantrip() {
        return Some(damage.dice);
    }
    Some(damage.scaling.at(caster_level).copied().unwrap_or(damage.dice))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellAttack {
    pub roll: AttackRoll,
    pub damage: u32,
}

/// One spell attack roll against `target`'s AC.
///
/// Only a natural 20 crits; a critical doubles the damage dice.
pub fn resolve_spell_attack(
    caster: &Combatant,
    target: &Combatant,
    spell: &Spell,
    dice: &mut impl DiceRoller,
) -> SpellAttack {
    let d20 = dice.roll_d20_with(Advantage::Normal);
    let roll = resolve_attack_roll(
        d20,
        spell_attack_bonus(caster),
        armor_class(target),
        20,
        Advantage::Normal,
    );
    let damage = match get_effective_damage_dice(spell, caster.level()) {
        Some(expr) if roll.hit => {
            let expr = if roll.critical { expr.doubled() } else { expr };
            dice.roll(&expr).total
        }
        _ => 0,
    };
    SpellAttack { roll, damage }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellSaveOutcome {
    pub save: SavingThrow,
    pub damage: u32,
}

/// The target saves against the caster's spell DC, then damage is rolled.
///
/// A success halves the damage (rounded down). A spell with a damaged-target
/// die uses it only when the target is below its max HP.
///
/// Returns `None` when the spell has no saving throw.
pub fn resolve_spell_save(
    caster: &Combatant,
    target: &Combatant,
    spell: &Spell,
    dice: &mut impl DiceRoller,
) -> Option<SpellSaveOutcome> {
    let ability = spell.saving_throw?;
    let save = roll_saving_throw(target, ability, spell_save_dc(caster), dice);

    let damage = spell
        .damage
        .as_ref()
        .zip(get_effective_damage_dice(spell, caster.level()))
        .map_or(0, |(damage, expr)| {
            let expr = match damage.damaged_target_die {
                Some(sides) if target.current_hp < target.max_hp => expr.with_sides(sides),
                _ => expr,
            };
            let rolled = dice.roll(&expr).total;
            if save.success { rolled / 2 } else { rolled }
        });

    Some(SpellSaveOutcome { save, damage })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileHit {
    pub target: CombatantId,
    pub projectiles: u32,
    pub damage: u32,
}

/// Splits the spell's projectiles over `assignments` and rolls each one.
///
/// Assignments are honored in order until the spell's projectile count runs
/// out. Assignments naming dead or unknown combatants are skipped. Hits on
/// the same target are summed.
pub fn resolve_projectiles(
    caster: &Combatant,
    spell: &Spell,
    assignments: &[(CombatantId, u32)],
    combatants: &[Combatant],
    dice: &mut impl DiceRoller,
) -> Vec<ProjectileHit> {
    let (Some(total), Some(expr)) = (
        spell.projectiles,
        get_effective_damage_dice(spell, caster.level()),
    ) else {
        return Vec::new();
    };

    let mut remaining = total;
    let mut hits: BTreeMap<CombatantId, ProjectileHit> = BTreeMap::new();
    let mut order = Vec::new();
    for &(target, count) in assignments {
        let alive = combatants.iter().any(|c| c.id == target && !is_dead(c));
        if !alive {
            continue;
        }
        let count = count.min(remaining);
        remaining -= count;
        let damage: u32 = (0..count).map(|_| dice.roll(&expr).total).sum();
        let entry = hits.entry(target).or_insert_with(|| {
            order.push(target);
            ProjectileHit {
                target,
                projectiles: 0,
                damage: 0,
            }
        });
        entry.projectiles += count;
        entry.damage += damage;
        if remaining == 0 {
            break;
        }
    }
    order.into_iter().filter_map(|id| hits.remove(&id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::calculate_damage_application;
    use crate::env::ScriptedDice;
    use crate::testing::{goblin, spell_catalog, wizard};

    fn spell(id: &str) -> Spell {
        spell_catalog()
            .into_iter()
            .find(|s| s.id == id)
            .unwrap()
    }

    #[test]
    fn cantrips_scale_and_leveled_spells_do_not() {
        let bolt = spell("fire_bolt");
        assert_eq!(get_effective_damage_dice(&bolt, 1), Some(DiceExpr::new(1, 10)));
        assert_eq!(get_effective_damage_dice(&bolt, 5), Some(DiceExpr::new(2, 10)));
        assert_eq!(get_effective_damage_dice(&bolt, 16), Some(DiceExpr::new(3, 10)));
        assert_eq!(get_effective_damage_dice(&bolt, 20), Some(DiceExpr::new(4, 10)));

        let fireball = spell("fireball");
        assert_eq!(get_effective_damage_dice(&fireball, 20), Some(DiceExpr::new(8, 6)));
    }

    #[test]
    fn spell_attack_uses_spellcasting_bonus() {
        let mage = wizard(5);
        assert_eq!(spell_attack_bonus(&mage), 3 + 3);
        assert_eq!(spell_save_dc(&mage), 14);

        let gob = goblin();
        // 9 + 6 = 15 meets AC 15; 2d10 at level 5.
        let hit = resolve_spell_attack(&mage, &gob, &spell("fire_bolt"), &mut ScriptedDice::new([9, 4, 6]));
        assert!(hit.roll.hit);
        assert_eq!(hit.damage, 10);

        let miss = resolve_spell_attack(&mage, &gob, &spell("fire_bolt"), &mut ScriptedDice::new([1]));
        assert!(!miss.roll.hit);
        assert_eq!(miss.damage, 0);

        let crit = resolve_spell_attack(
            &mage,
            &gob,
            &spell("fire_bolt"),
            &mut ScriptedDice::new([20, 1, 2, 3, 4]),
        );
        assert!(crit.roll.critical);
        assert_eq!(crit.damage, 10);
    }

    #[test]
    fn successful_save_halves_rounding_down() {
        let mage = wizard(5);
        let gob = goblin();
        let mut dice = ScriptedDice::new([20, 1, 1, 1, 1, 1, 1, 1, 2]);
        let outcome = resolve_spell_save(&mage, &gob, &spell("fireball"), &mut dice).unwrap();
        assert!(outcome.save.success);
        assert_eq!(outcome.damage, 4);

        let mut dice = ScriptedDice::new([2, 1, 1, 1, 1, 1, 1, 1, 2]);
        let outcome = resolve_spell_save(&mage, &gob, &spell("fireball"), &mut dice).unwrap();
        assert_eq!(outcome.damage, 9);
    }

    #[test]
    fn damaged_die_only_below_max_hp() {
        let mage = wizard(5);
        let healthy = goblin();
        let mut dice = ScriptedDice::new([1, 12, 12]);
        let full = resolve_spell_save(&mage, &healthy, &spell("toll_the_dead"), &mut dice).unwrap();
        // d8 faces are clamped to 8.
        assert_eq!(full.damage, 16);

        let hurt = healthy.clone().with_hp(healthy.max_hp - 1);
        let mut dice = ScriptedDice::new([1, 12, 12]);
        let wounded = resolve_spell_save(&mage, &hurt, &spell("toll_the_dead"), &mut dice).unwrap();
        assert_eq!(wounded.damage, 24);
    }

    #[test]
    fn projectiles_skip_dead_and_cap_total() {
        let mage = wizard(5);
        let gob = goblin();
        let mut other = goblin();
        other.id = CombatantId(201);
        let mut fallen = goblin();
        fallen.id = CombatantId(202);
        let fallen = calculate_damage_application(&fallen, 99).apply_to(&fallen);
        let roster = [mage.clone(), gob.clone(), other.clone(), fallen.clone()];

        let hits = resolve_projectiles(
            &mage,
            &spell("magic_missile"),
            &[(fallen.id, 1), (gob.id, 2), (other.id, 5)],
            &roster,
            &mut ScriptedDice::new([4, 4, 4, 4]),
        );
        assert_eq!(
            hits,
            vec![
                ProjectileHit { target: gob.id, projectiles: 2, damage: 10 },
                ProjectileHit { target: other.id, projectiles: 1, damage: 5 },
            ]
        );
    }
}
