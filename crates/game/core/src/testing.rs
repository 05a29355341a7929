//! Shared fixtures for unit tests.

use crate::env::DiceExpr;
use crate::features::{
    ClassFeature, ExtraAttackFeature, FightingStyle, FightingStyleFeature,
    ImprovedCriticalFeature, LevelGate, LevelTable, RacialAbility, RacialAbilityKind,
    SneakAttackFeature, UsageFeature, initialize_class_feature_uses,
    initialize_racial_ability_uses,
};
use crate::grid::Grid;
use crate::maneuver::{
    Maneuver, ManeuverEffect, ManeuverSave, ManeuverTrigger, max_superiority_dice,
};
use crate::spell::{
    AreaOfEffect, CastingTime, Spell, SpellAttackType, SpellDamage, SpellRange, SpellSchool,
};
use crate::state::{
    Ability, AbilityScores, Armor, ArmorCategory, CharacterSheet, Combatant,
    CombatantId, Condition, ConditionDuration, DamageType, MonsterAttack, MonsterStatBlock,
    SpellSlots, Weapon, WeaponProperties, WeaponReach,
};

fn gate(level: u32) -> LevelGate {
    LevelGate { level }
}

fn usage(level: u32) -> UsageFeature {
    UsageFeature {
        level,
        ..UsageFeature::default()
    }
}

fn ready(mut combatant: Combatant) -> Combatant {
    combatant.resources.class_feature_uses = initialize_class_feature_uses(&combatant);
    combatant.resources.racial_ability_uses = initialize_racial_ability_uses(&combatant);
    combatant
}

fn fighter_sheet(level: u32) -> CharacterSheet {
    let mut sheet = CharacterSheet::new("fighter", level, AbilityScores::new(16, 12, 14, 10, 12, 10));
    sheet.save_proficiencies = vec![Ability::Strength, Ability::Constitution];
    sheet.armor = Some(Armor::new("chain mail", 16, ArmorCategory::Heavy));
    sheet.shield = true;
    sheet.weapons = vec![
        Weapon::melee("Longsword", DiceExpr::new(1, 8), DamageType::Slashing)
            .with_properties(WeaponProperties::VERSATILE),
    ];
    sheet.features = vec![
        ClassFeature::FightingStyle(FightingStyleFeature {
            level: 1,
            style: FightingStyle::Defense,
        }),
        ClassFeature::SecondWind(usage(1)),
        ClassFeature::ActionSurge(usage(2)),
        ClassFeature::ExtraAttack(ExtraAttackFeature {
            level: 5,
            attack_count: 2,
        }),
        ClassFeature::Indomitable(usage(9)),
    ];
    sheet
}

fn fighter_hp(level: u32) -> u32 {
    10 + 8 * level.saturating_sub(1)
}

pub(crate) fn fighter(level: u32) -> Combatant {
    ready(Combatant::character(
        CombatantId(1),
        "Fighter",
        fighter_sheet(level),
        fighter_hp(level),
    ))
}

pub(crate) fn champion(level: u32) -> Combatant {
    let mut sheet = fighter_sheet(level);
    sheet.subclass = Some("champion".into());
    sheet.features.extend([
        ClassFeature::ImprovedCritical(ImprovedCriticalFeature {
            level: 3,
            critical_range: 19,
        }),
        ClassFeature::RemarkableAthlete(gate(3)),
        ClassFeature::HeroicWarrior(gate(10)),
        ClassFeature::ImprovedCritical(ImprovedCriticalFeature {
            level: 15,
            critical_range: 18,
        }),
        ClassFeature::Survivor(gate(18)),
    ]);
    ready(Combatant::character(CombatantId(1), "Champion", sheet, fighter_hp(level)))
}

pub(crate) fn battle_master(level: u32) -> Combatant {
    let mut sheet = fighter_sheet(level);
    sheet.subclass = Some("battle_master".into());
    sheet.features.extend([
        ClassFeature::CombatSuperiority(gate(3)),
        ClassFeature::Relentless(gate(15)),
    ]);
    for id in [
        "trip_attack",
        "parry",
        "precision_attack",
        "riposte",
        "pushing_attack",
        "menacing_attack",
        "evasive_footwork",
        "feinting_attack",
        "lunging_attack",
    ] {
        sheet.known_maneuvers.push(id.to_string());
    }
    ready(Combatant::character(CombatantId(1), "Battle Master", sheet, fighter_hp(level)))
        .with_superiority_dice(max_superiority_dice(level))
}

pub(crate) fn rogue(level: u32) -> Combatant {
    let mut sheet = CharacterSheet::new("rogue", level, AbilityScores::new(10, 16, 12, 12, 10, 14));
    sheet.save_proficiencies = vec![Ability::Dexterity, Ability::Intelligence];
    sheet.armor = Some(Armor::new("leather", 11, ArmorCategory::Light));
    sheet.weapons = vec![
        Weapon::melee("Shortsword", DiceExpr::new(1, 6), DamageType::Piercing)
            .with_properties(WeaponProperties::FINESSE | WeaponProperties::LIGHT),
    ];
    sheet.features = vec![
        ClassFeature::SneakAttack(SneakAttackFeature {
            level: 1,
            dice_scaling: LevelTable::new((0..10).map(|i| (1 + 2 * i, DiceExpr::new(1 + i, 6)))),
        }),
        ClassFeature::CunningAction(gate(2)),
    ];
    ready(Combatant::character(
        CombatantId(3),
        "Rogue",
        sheet,
        8 + 6 * level.saturating_sub(1),
    ))
}

pub(crate) fn wizard(level: u32) -> Combatant {
    let mut sheet = CharacterSheet::new("wizard", level, AbilityScores::new(8, 14, 14, 16, 12, 10));
    sheet.save_proficiencies = vec![Ability::Intelligence, Ability::Wisdom];
    sheet.weapons = vec![
        Weapon::melee("Quarterstaff", DiceExpr::new(1, 6), DamageType::Bludgeoning)
            .with_properties(WeaponProperties::VERSATILE),
    ];
    sheet.spellcasting_ability = Some(Ability::Intelligence);
    sheet.known_spells = spell_catalog().into_iter().map(|s| s.id).collect();
    ready(Combatant::character(
        CombatantId(4),
        "Wizard",
        sheet,
        6 + 5 * level.saturating_sub(1),
    ))
    .with_spell_slots(SpellSlots::new([(1, 4), (2, 3), (3, 2)]))
}

pub(crate) fn half_orc() -> Combatant {
    let mut sheet = fighter_sheet(3);
    sheet.racial_abilities = vec![RacialAbility::new(
        RacialAbilityKind::RelentlessEndurance,
        Some(1),
    )];
    ready(Combatant::character(CombatantId(5), "Half-Orc", sheet, 28))
}

pub(crate) fn goblin() -> Combatant {
    let stats = MonsterStatBlock::new("Goblin", 15, AbilityScores::new(8, 14, 10, 10, 8, 8))
        .with_attack(MonsterAttack {
            name: "Scimitar".into(),
            attack_bonus: 4,
            damage: DiceExpr::new(1, 6).with_modifier(2),
            damage_type: DamageType::Slashing,
            reach: WeaponReach::Melee { reach: 5 },
        })
        .with_attack(MonsterAttack {
            name: "Shortbow".into(),
            attack_bonus: 4,
            damage: DiceExpr::new(1, 6).with_modifier(2),
            damage_type: DamageType::Piercing,
            reach: WeaponReach::Ranged {
                normal: 80,
                long: 320,
            },
        });
    Combatant::monster(CombatantId(100), stats, 7)
}

pub(crate) fn open_grid() -> Grid {
    Grid::new(12, 12)
}

fn maneuver(id: &str, trigger: ManeuverTrigger, saving_throw: Option<ManeuverSave>) -> Maneuver {
    Maneuver {
        id: id.into(),
        name: id.replace('_', " "),
        trigger,
        description: String::new(),
        saving_throw,
    }
}

fn condition_save(ability: Ability, condition: Condition, duration: ConditionDuration) -> Option<ManeuverSave> {
    Some(ManeuverSave {
        ability,
        effect: ManeuverEffect::Condition {
            condition,
            duration,
        },
    })
}

pub(crate) fn maneuver_catalog() -> Vec<Maneuver> {
    vec![
        maneuver(
            "trip_attack",
            ManeuverTrigger::OnHit,
            condition_save(Ability::Strength, Condition::Prone, ConditionDuration::Indefinite),
        ),
        maneuver(
            "pushing_attack",
            ManeuverTrigger::OnHit,
            Some(ManeuverSave {
                ability: Ability::Strength,
                effect: ManeuverEffect::Push { feet: 15 },
            }),
        ),
        maneuver(
            "menacing_attack",
            ManeuverTrigger::OnHit,
            condition_save(Ability::Wisdom, Condition::Frightened, ConditionDuration::Turns(1)),
        ),
        maneuver(
            "goading_attack",
            ManeuverTrigger::OnHit,
            condition_save(Ability::Wisdom, Condition::Goaded, ConditionDuration::Turns(1)),
        ),
        maneuver("precision_attack", ManeuverTrigger::PreAttack, None),
        maneuver("parry", ManeuverTrigger::Reaction, None),
        maneuver("riposte", ManeuverTrigger::Reaction, None),
        maneuver("evasive_footwork", ManeuverTrigger::BonusAction, None),
        maneuver("feinting_attack", ManeuverTrigger::BonusAction, None),
        maneuver("lunging_attack", ManeuverTrigger::BonusAction, None),
        maneuver("rally", ManeuverTrigger::BonusAction, None),
    ]
}

fn spell(id: &str, level: u8, school: SpellSchool, casting_time: CastingTime, range: SpellRange) -> Spell {
    Spell {
        id: id.into(),
        name: id.replace('_', " "),
        level,
        school,
        casting_time,
        range,
        damage: None,
        area_of_effect: None,
        projectiles: None,
        saving_throw: None,
        attack_type: None,
        concentration: false,
    }
}

fn damage(dice: DiceExpr, damage_type: DamageType) -> SpellDamage {
    SpellDamage {
        dice,
        damage_type,
        scaling: LevelTable::default(),
        damaged_target_die: None,
    }
}

fn cantrip_scaling(count_sides: u32) -> LevelTable<DiceExpr> {
    LevelTable::new([
        (5, DiceExpr::new(2, count_sides)),
        (11, DiceExpr::new(3, count_sides)),
        (17, DiceExpr::new(4, count_sides)),
    ])
}

pub(crate) fn spell_catalog() -> Vec<Spell> {
    let action = CastingTime::Action;
    vec![
        Spell {
            damage: Some(SpellDamage {
                scaling: cantrip_scaling(10),
                ..damage(DiceExpr::new(1, 10), DamageType::Fire)
            }),
            attack_type: Some(SpellAttackType::Ranged),
            ..spell("fire_bolt", 0, SpellSchool::Evocation, action, SpellRange::Feet(120))
        },
        Spell {
            damage: Some(SpellDamage {
                scaling: cantrip_scaling(8),
                damaged_target_die: Some(12),
                ..damage(DiceExpr::new(1, 8), DamageType::Necrotic)
            }),
            saving_throw: Some(Ability::Wisdom),
            ..spell("toll_the_dead", 0, SpellSchool::Necromancy, action, SpellRange::Feet(60))
        },
        spell("shield", 1, SpellSchool::Abjuration, CastingTime::Reaction, SpellRange::SelfOnly),
        Spell {
            damage: Some(damage(DiceExpr::new(1, 4).with_modifier(1), DamageType::Force)),
            projectiles: Some(3),
            ..spell("magic_missile", 1, SpellSchool::Evocation, action, SpellRange::Feet(120))
        },
        Spell {
            damage: Some(damage(DiceExpr::new(3, 6), DamageType::Fire)),
            area_of_effect: Some(AreaOfEffect::Cone { length: 15 }),
            saving_throw: Some(Ability::Dexterity),
            ..spell("burning_hands", 1, SpellSchool::Evocation, action, SpellRange::SelfOnly)
        },
        spell("misty_step", 2, SpellSchool::Conjuration, CastingTime::BonusAction, SpellRange::SelfOnly),
        Spell {
            saving_throw: Some(Ability::Wisdom),
            concentration: true,
            ..spell("hold_person", 2, SpellSchool::Enchantment, action, SpellRange::Feet(60))
        },
        Spell {
            damage: Some(damage(DiceExpr::new(8, 6), DamageType::Fire)),
            area_of_effect: Some(AreaOfEffect::Sphere { radius: 20 }),
            saving_throw: Some(Ability::Dexterity),
            ..spell("fireball", 3, SpellSchool::Evocation, action, SpellRange::Feet(150))
        },
        Spell {
            damage: Some(damage(DiceExpr::new(8, 6), DamageType::Lightning)),
            area_of_effect: Some(AreaOfEffect::Line { length: 100 }),
            saving_throw: Some(Ability::Dexterity),
            ..spell("lightning_bolt", 3, SpellSchool::Evocation, action, SpellRange::SelfOnly)
        },
    ]
}
