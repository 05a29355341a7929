//! Planning a full turn.

use tracing::debug;

use crate::combat::{AttackOption, available_attacks};
use crate::features::{can_use_cunning_action, can_use_second_wind, get_max_attacks};
use crate::grid::{
    Path, can_target_with_ranged_attack, diagonal_rule_distance, distance_feet, find_path,
    has_line_of_sight, step_cost,
};
use crate::state::{Combatant, CombatantId, Position, WeaponReach};

use super::context::AiContext;
use super::targeting::find_best_target;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CunningActionChoice {
    Dash,
    Disengage,
}

/// One step of a planned turn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AiAction {
    /// Walk `path` (start included) ending at `destination`.
    Move {
        path: Vec<Position>,
        destination: Position,
        cost: u32,
    },
    Attack {
        target: CombatantId,
        /// Name of the chosen [`AttackOption`].
        attack: String,
    },
    SecondWind,
    CunningAction(CunningActionChoice),
    End,
}

/// A planned turn; always ends with [`AiAction::End`].
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiDecision {
    pub actions: Vec<AiAction>,
}

impl AiDecision {
    fn end_only() -> Self {
        Self {
            actions: vec![AiAction::End],
        }
    }
}

/// Picks the attack to use against `target` from `from`.
///
/// Prefers a melee attack that reaches, then a ranged attack whose normal
/// range covers the distance with line of sight. Otherwise returns the first
/// attack (for movement planning) flagged as not usable yet.
pub fn get_best_usable_attack(
    ctx: &AiContext<'_>,
    from: Position,
    target: &Combatant,
) -> Option<(AttackOption, bool)> {
    let attacks = available_attacks(ctx.actor);
    let distance = distance_feet(from, target.position);

    let melee = attacks.iter().find(|a| match a.reach {
        WeaponReach::Melee { reach } => {
            distance <= reach && has_line_of_sight(ctx.grid, from, target.position, ctx.fog)
        }
        WeaponReach::Ranged { .. } => false,
    });
    if let Some(attack) = melee {
        return Some((attack.clone(), true));
    }

    let ranged = attacks.iter().find(|a| match a.reach {
        WeaponReach::Ranged { normal, .. } => {
            diagonal_rule_distance(from, target.position) <= normal
                && can_target_with_ranged_attack(ctx.grid, from, target.position, normal, ctx.fog)
                    .can_target
        }
        WeaponReach::Melee { .. } => false,
    });
    if let Some(attack) = ranged {
        return Some((attack.clone(), true));
    }

    attacks.into_iter().next().map(|attack| (attack, false))
}

fn attacks_left(actor: &Combatant) -> u32 {
    let made = actor.turn.attacks_made_this_turn;
    if actor.turn.has_acted && made == 0 {
        return 0;
    }
    get_max_attacks(actor).saturating_sub(made)
}

fn push_attacks(actions: &mut Vec<AiAction>, actor: &Combatant, target: &Combatant, attack: &AttackOption) {
    for _ in 0..attacks_left(actor) {
        actions.push(AiAction::Attack {
            target: target.id,
            attack: attack.name.clone(),
        });
    }
}

/// Cuts `path` so it never ends on `avoid` and costs at most `budget` feet.
fn truncate_path(ctx: &AiContext<'_>, path: &Path, avoid: Position, budget: u32) -> Option<Path> {
    let mut positions = Vec::with_capacity(path.positions.len());
    let mut cost = 0;
    for window in path.positions.windows(2) {
        let (from, to) = (window[0], window[1]);
        if positions.is_empty() {
            positions.push(from);
        }
        if to == avoid {
            break;
        }
        let step = step_cost(ctx.grid, from, to)?;
        if cost + step > budget {
            break;
        }
        cost += step;
        positions.push(to);
    }
    (positions.len() > 1).then_some(Path { positions, cost })
}

/// Plans the turn of an AI-controlled combatant.
///
/// 1. Pick the best target; with no living enemy the turn just ends.
/// 2. Use Second Wind when hurt, otherwise consider Cunning Action
///    (Disengage when crowded and hurt, Dash when nothing is close).
/// 3. Attack if an attack is usable from where the actor stands.
/// 4. Otherwise move toward the target along the cheapest path within the
///    movement budget, stopping short of the target's cell, and attack from
///    there if possible.
pub fn decide_monster_turn(ctx: &AiContext<'_>) -> AiDecision {
    let actor = ctx.actor;
    let Some(target) = find_best_target(ctx) else {
        debug!(target: "tactics::ai", actor = %actor.id, "no enemies left");
        return AiDecision::end_only();
    };

    let weights = &ctx.config.ai;
    let mut actions = Vec::new();
    let mut bonus_action_free = true;
    let mut movement = actor.movement_remaining();

    if actor.is_character()
        && can_use_second_wind(actor).is_ok()
        && ctx.actor_below_hp_percent(weights.second_wind_hp_percent)
    {
        actions.push(AiAction::SecondWind);
        bonus_action_free = false;
    }

    if bonus_action_free && can_use_cunning_action(actor).is_ok() {
        let adjacent = ctx.enemies_within(actor.position, 5);
        let nearest = ctx.nearest_enemy_distance(actor.position).unwrap_or(0);
        if adjacent >= weights.disengage_min_adjacent
            && ctx.actor_below_hp_percent(weights.disengage_hp_percent)
        {
            actions.push(AiAction::CunningAction(CunningActionChoice::Disengage));
        } else if adjacent == 0 && nearest > weights.dash_distance_ft {
            actions.push(AiAction::CunningAction(CunningActionChoice::Dash));
            movement += actor.speed();
        }
    }

    let Some((attack, usable)) = get_best_usable_attack(ctx, actor.position, target) else {
        actions.push(AiAction::End);
        return AiDecision { actions };
    };

    if usable {
        push_attacks(&mut actions, actor, target, &attack);
    } else if let Some(path) = find_path(ctx.grid, actor.position, target.position, ctx.occupied())
        && let Some(route) = truncate_path(ctx, &path, target.position, movement)
        && let Some(destination) = route.destination()
    {
        actions.push(AiAction::Move {
            destination,
            cost: route.cost,
            path: route.positions,
        });
        if let Some((attack, true)) = get_best_usable_attack(ctx, destination, target) {
            push_attacks(&mut actions, actor, target, &attack);
        }
    }
    actions.push(AiAction::End);

    debug!(
        target: "tactics::ai",
        actor = %actor.id,
        target_id = %target.id,
        actions = actions.len(),
        "turn planned"
    );
    AiDecision { actions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::features::initialize_class_feature_uses;
    use crate::grid::Grid;
    use crate::testing::{fighter, goblin, open_grid, rogue};

    fn plan(actor_index: usize, roster: &[Combatant], grid: &Grid) -> AiDecision {
        let config = RulesConfig::default();
        let ctx = AiContext::new(&roster[actor_index], roster, grid, &config);
        decide_monster_turn(&ctx)
    }

    #[test]
    fn no_enemies_means_end() {
        let grid = open_grid();
        let roster = [goblin()];
        assert_eq!(plan(0, &roster, &grid).actions, vec![AiAction::End]);
    }

    #[test]
    fn adjacent_target_is_attacked_in_melee() {
        let grid = open_grid();
        let roster = [
            goblin().at(Position::new(2, 2)),
            fighter(3).at(Position::new(3, 2)),
        ];
        let decision = plan(0, &roster, &grid);
        assert_eq!(
            decision.actions,
            vec![
                AiAction::Attack {
                    target: roster[1].id,
                    attack: "Scimitar".into()
                },
                AiAction::End
            ]
        );
    }

    #[test]
    fn ranged_attack_needs_line_of_sight() {
        let open = open_grid();
        let roster = [
            goblin().at(Position::new(0, 0)),
            fighter(3).at(Position::new(6, 0)),
        ];
        let decision = plan(0, &roster, &open);
        assert!(matches!(
            &decision.actions[0],
            AiAction::Attack { attack, .. } if attack == "Shortbow"
        ));

        let walled = open_grid().with_wall(Position::new(3, 0));
        let decision = plan(0, &roster, &walled);
        assert!(matches!(decision.actions[0], AiAction::Move { .. }));
    }

    #[test]
    fn movement_stops_next_to_the_target_and_attacks() {
        let grid = open_grid();
        let hero = fighter(3).at(Position::new(4, 0));
        let mut brute = goblin().at(Position::new(0, 0));
        if let crate::state::CombatantPayload::Monster(stats) = &mut brute.payload {
            stats.attacks.truncate(1);
        }
        let roster = [brute, hero.clone()];
        let decision = plan(0, &roster, &grid);

        let AiAction::Move {
            destination, cost, path,
        } = &decision.actions[0]
        else {
            panic!("expected a move, got {:?}", decision.actions);
        };
        assert_eq!(*destination, Position::new(3, 0));
        assert_eq!(*cost, 15);
        assert_eq!(path.first(), Some(&Position::new(0, 0)));
        assert!(!path.contains(&hero.position));
        assert!(matches!(decision.actions[1], AiAction::Attack { .. }));
        assert_eq!(decision.actions.last(), Some(&AiAction::End));
    }

    #[test]
    fn movement_is_bounded_by_speed() {
        let grid = Grid::new(20, 3);
        let mut brute = goblin().at(Position::new(0, 1));
        if let crate::state::CombatantPayload::Monster(stats) = &mut brute.payload {
            stats.attacks.truncate(1);
        }
        let roster = [brute, fighter(3).at(Position::new(15, 1))];
        let decision = plan(0, &roster, &grid);
        let AiAction::Move {
            destination, cost, path,
        } = &decision.actions[0]
        else {
            panic!("expected a move, got {:?}", decision.actions);
        };
        assert_eq!(*cost, 30);
        assert_eq!(destination.x, 6);
        assert_eq!(path.len(), 7);
        assert_eq!(decision.actions[1], AiAction::End);
    }

    #[test]
    fn hurt_fighters_use_second_wind_first() {
        let grid = open_grid();
        let mut hero = fighter(3).at(Position::new(2, 2));
        hero.resources.class_feature_uses = initialize_class_feature_uses(&hero);
        let hero = hero.clone().with_hp(hero.max_hp / 3);
        let roster = [hero, goblin().at(Position::new(3, 2))];
        let decision = plan(0, &roster, &grid);
        assert_eq!(decision.actions[0], AiAction::SecondWind);
        assert!(matches!(decision.actions[1], AiAction::Attack { .. }));
    }

    #[test]
    fn dash_needs_the_nearest_enemy_beyond_fifteen_feet() {
        let grid = Grid::new(30, 5);
        let thief = rogue(3).at(Position::new(0, 2));

        let at_threshold = [thief.clone(), goblin().at(Position::new(3, 2))];
        let decision = plan(0, &at_threshold, &grid);
        assert!(
            !decision
                .actions
                .iter()
                .any(|a| matches!(a, AiAction::CunningAction(_)))
        );
        assert!(matches!(decision.actions[0], AiAction::Move { .. }));

        let beyond = [thief, goblin().at(Position::new(4, 2))];
        let decision = plan(0, &beyond, &grid);
        assert_eq!(
            decision.actions[0],
            AiAction::CunningAction(CunningActionChoice::Dash)
        );
    }

    #[test]
    fn rogues_dash_when_far_and_disengage_when_swarmed() {
        let grid = Grid::new(30, 5);
        let thief = rogue(3).at(Position::new(0, 2));
        let far = [thief.clone(), goblin().at(Position::new(20, 2))];
        let decision = plan(0, &far, &grid);
        assert_eq!(
            decision.actions[0],
            AiAction::CunningAction(CunningActionChoice::Dash)
        );
        let AiAction::Move { cost, .. } = &decision.actions[1] else {
            panic!("expected a move");
        };
        assert_eq!(*cost, 60);

        let hurt = thief.clone().with_hp(1);
        let mut second = goblin().at(Position::new(1, 3));
        second.id = CombatantId(201);
        let swarmed = [hurt, goblin().at(Position::new(1, 2)), second];
        let decision = plan(0, &swarmed, &grid);
        assert_eq!(
            decision.actions[0],
            AiAction::CunningAction(CunningActionChoice::Disengage)
        );
    }
}
