//! Blackboard shared by the planning steps.

use std::collections::BTreeSet;

use crate::combat::{AttackSituation, is_dead};
use crate::config::RulesConfig;
use crate::grid::{FogOfWar, Grid, distance_feet};
use crate::state::{Combatant, Position};

/// Everything the planner reads for one combatant's turn.
///
/// Living enemies and occupied cells are computed once in [`AiContext::new`]
/// and reused by every step.
pub struct AiContext<'a> {
    /// The combatant whose turn is being planned.
    pub actor: &'a Combatant,
    /// The whole roster, the actor included.
    pub combatants: &'a [Combatant],
    pub grid: &'a Grid,
    pub fog: Option<&'a FogOfWar>,
    pub config: &'a RulesConfig,

    enemies: Vec<&'a Combatant>,
    occupied: BTreeSet<Position>,
}

impl<'a> AiContext<'a> {
    /// # Arguments
    ///
    /// * `actor` - The combatant to plan for
    /// * `combatants` - Every combatant in the encounter
    /// * `grid` - The battle map
    /// * `config` - Scoring weights and thresholds
    pub fn new(
        actor: &'a Combatant,
        combatants: &'a [Combatant],
        grid: &'a Grid,
        config: &'a RulesConfig,
    ) -> Self {
        let enemies = combatants
            .iter()
            .filter(|c| c.id != actor.id && c.is_enemy_of(actor) && !is_dead(c))
            .collect();
        let occupied = combatants
            .iter()
            .filter(|c| c.id != actor.id && !is_dead(c))
            .map(|c| c.position)
            .collect();
        Self {
            actor,
            combatants,
            grid,
            fog: None,
            config,
            enemies,
            occupied,
        }
    }

    pub fn with_fog(mut self, fog: &'a FogOfWar) -> Self {
        self.fog = Some(fog);
        self
    }

    /// Living enemies in roster order.
    pub fn enemies(&self) -> &[&'a Combatant] {
        &self.enemies
    }

    /// Cells held by living combatants other than the actor.
    pub fn occupied(&self) -> &BTreeSet<Position> {
        &self.occupied
    }

    pub fn enemies_within(&self, from: Position, feet: u32) -> usize {
        self.enemies
            .iter()
            .filter(|e| distance_feet(from, e.position) <= feet)
            .count()
    }

    pub fn nearest_enemy_distance(&self, from: Position) -> Option<u32> {
        self.enemies
            .iter()
            .map(|e| distance_feet(from, e.position))
            .min()
    }

    pub fn attack_situation(&self) -> AttackSituation<'a> {
        AttackSituation {
            grid: self.grid,
            fog: self.fog,
            combatants: self.combatants,
        }
    }

    /// True when current HP is strictly below `percent` of max.
    pub fn actor_below_hp_percent(&self, percent: u32) -> bool {
        self.actor.current_hp * 100 < self.actor.max_hp * percent
    }
}
