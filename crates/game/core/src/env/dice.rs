//! Dice notation and the injectable dice source.
//!
//! Every random outcome in the engine flows through a [`DiceRoller`]. The
//! engine never owns a generator: callers pass one in, which keeps rule
//! functions pure over their inputs and lets tests force specific faces.
//!
//! # Implementations
//!
//! - [`PcgDice`]: seedable PCG-XSH-RR generator, replays exactly from a seed
//! - [`RandDice`]: adapts any [`rand::RngCore`]
//! - [`ScriptedDice`]: replays a fixed list of faces

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// A dice expression such as `2d6+3`.
///
/// Serialized as its notation string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DiceExpr {
    pub const fn new(count: u32, sides: u32) -> Self {
        Self {
            count,
            sides,
            modifier: 0,
        }
    }

    pub const fn with_modifier(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self
    }

    /// Same dice with the count doubled (critical hits).
    pub const fn doubled(self) -> Self {
        Self {
            count: self.count * 2,
            sides: self.sides,
            modifier: self.modifier,
        }
    }

    /// Same count and modifier with a different die size.
    pub const fn with_sides(self, sides: u32) -> Self {
        Self {
            count: self.count,
            sides,
            modifier: self.modifier,
        }
    }

    pub const fn min_total(&self) -> i32 {
        self.count as i32 + self.modifier
    }

    pub const fn max_total(&self) -> i32 {
        (self.count * self.sides) as i32 + self.modifier
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

/// Error returned when dice notation cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiceParseError {
    #[error("empty dice expression")]
    Empty,
    #[error("dice expression `{0}` is missing the `d` separator")]
    MissingSeparator(String),
    #[error("invalid number in dice expression `{0}`")]
    InvalidNumber(String),
    #[error("dice expression `{0}` has zero-sided dice")]
    ZeroSides(String),
}

impl FromStr for DiceExpr {
    type Err = DiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(DiceParseError::Empty);
        }
        let lower = compact.to_ascii_lowercase();
        let (dice, modifier) = match lower.find(['+', '-']) {
            Some(idx) => {
                let modifier = lower[idx..]
                    .parse::<i32>()
                    .map_err(|_| DiceParseError::InvalidNumber(s.to_string()))?;
                (&lower[..idx], modifier)
            }
            None => (lower.as_str(), 0),
        };
        let (count, sides) = dice
            .split_once('d')
            .ok_or_else(|| DiceParseError::MissingSeparator(s.to_string()))?;
        let count = if count.is_empty() {
            1
        } else {
            count
                .parse::<u32>()
                .map_err(|_| DiceParseError::InvalidNumber(s.to_string()))?
        };
        let sides = sides
            .parse::<u32>()
            .map_err(|_| DiceParseError::InvalidNumber(s.to_string()))?;
        if sides == 0 {
            return Err(DiceParseError::ZeroSides(s.to_string()));
        }
        Ok(DiceExpr {
            count,
            sides,
            modifier,
        })
    }
}

impl TryFrom<String> for DiceExpr {
    type Error = DiceParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DiceExpr> for String {
    fn from(expr: DiceExpr) -> Self {
        expr.to_string()
    }
}

/// Outcome of rolling a [`DiceExpr`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceRoll {
    pub rolls: Vec<u32>,
    pub modifier: i32,
    /// Sum of the faces plus the modifier, floored at 0.
    pub total: u32,
}

/// Advantage state of a d20 roll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Advantage {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl Advantage {
    /// Combines two sources; advantage and disadvantage cancel out.
    pub const fn combine(has_advantage: bool, has_disadvantage: bool) -> Self {
        match (has_advantage, has_disadvantage) {
            (true, false) => Self::Advantage,
            (false, true) => Self::Disadvantage,
            _ => Self::Normal,
        }
    }
}

/// A d20 roll with both faces when advantage or disadvantage applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct D20Roll {
    /// The face that counts.
    pub natural: u32,
    /// The discarded face, if two dice were rolled.
    pub discarded: Option<u32>,
}

/// Source of die faces.
///
/// Only [`roll_die`](DiceRoller::roll_die) is required; everything else is
/// expressed in terms of it so scripted sources stay trivial.
pub trait DiceRoller {
    /// Roll one die with `sides` faces (1..=sides).
    fn roll_die(&mut self, sides: u32) -> u32;

    fn roll_d20(&mut self) -> u32 {
        self.roll_die(20)
    }

    fn roll_d20_with(&mut self, advantage: Advantage) -> D20Roll {
        let first = self.roll_d20();
        match advantage {
            Advantage::Normal => D20Roll {
                natural: first,
                discarded: None,
            },
            Advantage::Advantage => {
                let second = self.roll_d20();
                D20Roll {
                    natural: first.max(second),
                    discarded: Some(first.min(second)),
                }
            }
            Advantage::Disadvantage => {
                let second = self.roll_d20();
                D20Roll {
                    natural: first.min(second),
                    discarded: Some(first.max(second)),
                }
            }
        }
    }

    fn roll(&mut self, expr: &DiceExpr) -> DiceRoll {
        let rolls: Vec<u32> = (0..expr.count).map(|_| self.roll_die(expr.sides)).collect();
        let sum: i64 = rolls.iter().map(|&r| r as i64).sum::<i64>() + expr.modifier as i64;
        DiceRoll {
            rolls,
            modifier: expr.modifier,
            total: sum.max(0) as u32,
        }
    }
}

impl<T: DiceRoller + ?Sized> DiceRoller for &mut T {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

// ============================================================================
// PCG
// ============================================================================

/// Seedable PCG-XSH-RR generator (64-bit state, 32-bit output).
///
/// The same seed always yields the same face sequence, so an encounter can be
/// replayed from its seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcgDice {
    state: u64,
}

impl PcgDice {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub const fn seeded(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        let state = self.state;
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl DiceRoller for PcgDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides <= 1 {
            return 1;
        }
        (self.next_u32() % sides) + 1
    }
}

// ============================================================================
// rand adapter
// ============================================================================

/// Adapts any [`rand::RngCore`] into a dice source.
#[derive(Clone, Debug)]
pub struct RandDice<R> {
    rng: R,
}

impl<R: rand::RngCore> RandDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: rand::RngCore> DiceRoller for RandDice<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        use rand::Rng;
        if sides <= 1 {
            return 1;
        }
        self.rng.gen_range(1..=sides)
    }
}

// ============================================================================
// Scripted
// ============================================================================

/// Replays a fixed sequence of faces.
///
/// Each face is clamped into `1..=sides` for the die being rolled. Once the
/// script runs out, the last face is repeated (or 1 for an empty script).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptedDice {
    faces: VecDeque<u32>,
    last: Option<u32>,
}

impl ScriptedDice {
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            last: None,
        }
    }

    /// Faces not yet consumed.
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DiceRoller for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let face = match self.faces.pop_front() {
            Some(face) => {
                self.last = Some(face);
                face
            }
            None => self.last.unwrap_or(1),
        };
        face.clamp(1, sides.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_notation() {
        assert_eq!("2d6+3".parse::<DiceExpr>().unwrap(), DiceExpr::new(2, 6).with_modifier(3));
        assert_eq!("d20".parse::<DiceExpr>().unwrap(), DiceExpr::new(1, 20));
        assert_eq!("1D4 - 1".parse::<DiceExpr>().unwrap(), DiceExpr::new(1, 4).with_modifier(-1));
    }

    #[test]
    fn rejects_malformed_notation() {
        assert_eq!("".parse::<DiceExpr>(), Err(DiceParseError::Empty));
        assert!(matches!("12".parse::<DiceExpr>(), Err(DiceParseError::MissingSeparator(_))));
        assert!(matches!("2d0".parse::<DiceExpr>(), Err(DiceParseError::ZeroSides(_))));
        assert!(matches!("xd6".parse::<DiceExpr>(), Err(DiceParseError::InvalidNumber(_))));
    }

    #[test]
    fn display_matches_notation() {
        assert_eq!(DiceExpr::new(3, 8).with_modifier(-2).to_string(), "3d8-2");
        assert_eq!(DiceExpr::new(1, 10).to_string(), "1d10");
    }

    #[test]
    fn pcg_is_deterministic_and_in_range() {
        let mut a = PcgDice::seeded(42);
        let mut b = PcgDice::seeded(42);
        for _ in 0..200 {
            let face = a.roll_die(6);
            assert_eq!(face, b.roll_die(6));
            assert!((1..=6).contains(&face));
        }
    }

    #[test]
    fn rand_adapter_stays_in_range() {
        use rand_chacha::ChaCha8Rng;
        use rand_chacha::rand_core::SeedableRng;

        let mut dice = RandDice::new(ChaCha8Rng::seed_from_u64(7));
        for _ in 0..200 {
            assert!((1..=20).contains(&dice.roll_d20()));
        }
    }

    #[test]
    fn advantage_keeps_higher_face() {
        let mut dice = ScriptedDice::new([4, 17]);
        let roll = dice.roll_d20_with(Advantage::Advantage);
        assert_eq!(roll.natural, 17);
        assert_eq!(roll.discarded, Some(4));

        let mut dice = ScriptedDice::new([4, 17]);
        assert_eq!(dice.roll_d20_with(Advantage::Disadvantage).natural, 4);
    }

    #[test]
    fn scripted_faces_clamp_and_repeat() {
        let mut dice = ScriptedDice::new([9, 3]);
        assert_eq!(dice.roll_die(6), 6);
        assert_eq!(dice.roll_die(6), 3);
        assert_eq!(dice.roll_die(6), 3);
    }

    #[test]
    fn roll_sums_faces_and_modifier() {
        let mut dice = ScriptedDice::new([2, 5]);
        let roll = dice.roll(&DiceExpr::new(2, 6).with_modifier(1));
        assert_eq!(roll.rolls, vec![2, 5]);
        assert_eq!(roll.total, 8);
    }
}
