//! Common rejection infrastructure.
//!
//! Rule validators never throw: they return `Err` with a domain-specific enum
//! whose `Display` text is the human-readable reason shown to the player.
//! Each enum also implements [`RuleError`] so callers can branch on the broad
//! category without matching strings.

/// Broad category of a rejected action.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RejectionKind {
    /// The action, bonus action or reaction needed is already spent.
    ActionEconomy,
    /// A limited resource (uses, dice, slots) is exhausted.
    ResourceExhausted,
    /// A rules precondition is unmet (range, weapon, level, caster type).
    Precondition,
    /// A referenced entity is missing or not known.
    NotFound,
}

/// Common trait for all rule rejections.
///
/// # Implementation Guidelines
///
/// - Derive `thiserror::Error`; the message is the player-facing reason
/// - Classify by what the player must change, not by severity
pub trait RuleError: core::fmt::Display + core::fmt::Debug {
    fn kind(&self) -> RejectionKind;

    /// Stable identifier for the variant, for tests and telemetry.
    fn error_code(&self) -> &'static str;

    /// The reason shown to the player.
    fn reason(&self) -> String {
        self.to_string()
    }
}
