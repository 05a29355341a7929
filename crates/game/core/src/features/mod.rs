//! Class, subclass and racial features.
//!
//! [`kinds`] holds the tagged feature union, [`query`] derives values from the
//! active feature set, and [`actions`] spends feature uses.

mod actions;
mod kinds;
mod query;
mod table;

pub use actions::{FeatureUse, use_action_surge, use_indomitable, use_second_wind};
pub use kinds::{
    ClassFeature, ExtraAttackFeature, FeatureKind, FightingStyle, FightingStyleFeature,
    GenericFeature, ImprovedCriticalFeature, LevelGate, RacialAbility, RacialAbilityKind,
    SneakAttackFeature, UsageFeature, WeaponMasteryFeature,
};
pub use query::{
    FeatureError, MaxUses, active_features, archery_bonus, armor_class, can_sneak_attack,
    can_use_action_surge, can_use_cunning_action, can_use_indomitable, can_use_second_wind,
    defense_bonus, dueling_bonus, find_feature, get_critical_range, get_max_attacks,
    get_max_uses, has_feature, has_fighting_style, has_heroic_warrior, has_relentless,
    has_remarkable_athlete, has_studied_attacks, has_survivor, has_tactical_master,
    initialize_class_feature_uses, initialize_racial_ability_uses, is_critical_hit,
    sneak_attack_dice, weapon_mastery_count,
};
pub use table::{LevelTable, level_lookup};
