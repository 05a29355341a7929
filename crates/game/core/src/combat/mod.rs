//! Attack, damage and recovery resolution.
//!
//! Every function here is a pure transform: it takes combatants by reference
//! and returns the changed copies together with [`LogEntry`] lines.

mod attack;
mod damage;
mod log;
mod recovery;
mod saves;

pub use attack::{
    AttackError, AttackOption, AttackRoll, AttackSituation, WeaponAttack, attack_advantage,
    available_attacks, can_attack, check_attack_reach, resolve_attack_roll, resolve_weapon_attack,
};
pub use damage::{
    CombatOutcome, DamageApplication, calculate_damage_application, check_combat_end, is_dead,
};
pub use log::{LogEntry, LogKind};
pub use recovery::{
    ConcentrationCheck, DeathSaveOutcome, DeathSaveResult, apply_healing, check_concentration,
    concentration_dc, grant_temporary_hp, roll_death_save,
};
pub use saves::{
    SavingThrow, roll_saving_throw, roll_saving_throw_with, save_dc, saving_throw_modifier,
};
