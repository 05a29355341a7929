//! Choosing whom to attack.

use tracing::trace;

use crate::grid::distance_feet;
use crate::state::Combatant;

use super::context::AiContext;

/// Priority of `target` for the actor; higher is better.
///
/// Starts from the base score, loses points per foot of distance, and gains
/// points for a badly hurt target (below a quarter, else below half, of max
/// HP), a spellcasting character, and a concentrating target.
pub fn score_target(ctx: &AiContext<'_>, target: &Combatant) -> i32 {
    let weights = &ctx.config.ai;
    let distance = distance_feet(ctx.actor.position, target.position) as i32;
    let mut score = weights.base_score - weights.distance_penalty * distance;

    let hp = target.current_hp * 100;
    if hp < target.max_hp * 25 {
        score += weights.critical_hp_bonus;
    } else if hp < target.max_hp * 50 {
        score += weights.bloodied_bonus;
    }
    if target.is_spellcasting_character() {
        score += weights.spellcaster_bonus;
    }
    if target.is_concentrating() {
        score += weights.concentration_bonus;
    }
    score
}

/// Highest-scoring living enemy; the first one seen wins ties.
pub fn find_best_target<'a>(ctx: &AiContext<'a>) -> Option<&'a Combatant> {
    let mut best: Option<(&'a Combatant, i32)> = None;
    for &enemy in ctx.enemies() {
        let score = score_target(ctx, enemy);
        trace!(target: "tactics::ai", actor = %ctx.actor.id, enemy = %enemy.id, score, "target scored");
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((enemy, score));
        }
    }
    best.map(|(enemy, _)| enemy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::state::{CombatantId, Position};
    use crate::testing::{fighter, goblin, open_grid, wizard};

    #[test]
    fn closer_targets_score_higher() {
        let grid = open_grid();
        let config = RulesConfig::default();
        let gob = goblin().at(Position::new(0, 0));
        let near = fighter(3).at(Position::new(1, 0));
        let mut far = fighter(3).at(Position::new(5, 0));
        far.id = CombatantId(2);
        let roster = [gob.clone(), near.clone(), far.clone()];
        let ctx = AiContext::new(&roster[0], &roster, &grid, &config);

        assert_eq!(score_target(&ctx, &near), 100 - 10);
        assert_eq!(score_target(&ctx, &far), 100 - 50);
        assert_eq!(find_best_target(&ctx).map(|c| c.id), Some(near.id));
    }

    #[test]
    fn wounded_casters_are_prioritised() {
        let grid = open_grid();
        let config = RulesConfig::default();
        let gob = goblin().at(Position::new(0, 0));
        let mut mage = wizard(5).at(Position::new(3, 0)).with_hp(5);
        mage.concentrating_on = Some("hold_person".into());
        let roster = [gob, mage.clone()];
        let ctx = AiContext::new(&roster[0], &roster, &grid, &config);
        // 100 - 30 + 40 + 15 + 25
        assert_eq!(score_target(&ctx, &mage), 150);
    }

    #[test]
    fn bloodied_bonus_applies_between_a_quarter_and_half_hp() {
        let grid = open_grid();
        let config = RulesConfig::default();
        let gob = goblin().at(Position::new(0, 0));
        let roster = [gob, fighter(3).at(Position::new(1, 0))];
        let ctx = AiContext::new(&roster[0], &roster, &grid, &config);

        // fighter(3) has 26 max HP.
        let healthy = roster[1].clone().with_hp(13);
        let bloodied = roster[1].clone().with_hp(7);
        let critical = roster[1].clone().with_hp(6);
        assert_eq!(score_target(&ctx, &healthy), 90);
        assert_eq!(score_target(&ctx, &bloodied), 90 + 20);
        assert_eq!(score_target(&ctx, &critical), 90 + 40);
    }

    #[test]
    fn ties_go_to_the_first_enemy() {
        let grid = open_grid();
        let config = RulesConfig::default();
        let gob = goblin().at(Position::new(5, 5));
        let first = fighter(3).at(Position::new(4, 5));
        let mut second = fighter(3).at(Position::new(6, 5));
        second.id = CombatantId(2);
        let roster = [gob, first.clone(), second];
        let ctx = AiContext::new(&roster[0], &roster, &grid, &config);
        assert_eq!(find_best_target(&ctx).map(|c| c.id), Some(first.id));
    }

    #[test]
    fn allies_are_never_targets() {
        let grid = open_grid();
        let config = RulesConfig::default();
        let gob = goblin();
        let mut friend = goblin().at(Position::new(1, 0));
        friend.id = CombatantId(201);
        let roster = [gob, friend];
        let ctx = AiContext::new(&roster[0], &roster, &grid, &config);
        assert!(find_best_target(&ctx).is_none());
    }
}
