//! Method roles and the primary tie-break policy.

use std::fmt;
use std::str::FromStr;

/// Method-combination category of a registered handler.
///
/// Mirrors the CLOS standard method combination: one `Primary` is selected,
/// every applicable `Before`, `After` and `Around` participates.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Role {
    Primary,
    Before,
    After,
    Around,
}

impl Role {
    pub const ALL: [Role; 4] = [Self::Primary, Self::Before, Self::After, Self::Around];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Before => "before",
            Self::After => "after",
            Self::Around => "around",
        }
    }

    /// Whether handlers of this role receive a continuation.
    #[inline]
    pub const fn takes_continuation(self) -> bool {
        matches!(self, Self::Around)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = UnknownKeyword;

    /// Accepts `primary`, `before`, `after`, `around`, with or without a
    /// leading `:` as in CLOS method qualifiers.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let word = text.strip_prefix(':').unwrap_or(text);
        Role::ALL
            .into_iter()
            .find(|role| role.name() == word)
            .ok_or_else(|| UnknownKeyword::new("role", text))
    }
}

/// How competing `Primary` handlers of equal specificity are resolved.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum DispatchPolicy {
    /// Keep the first primary met while walking candidates.
    #[default]
    FirstWins,
    /// Let each later primary of the same specificity replace the held one.
    LastWins,
}

impl DispatchPolicy {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstWins => "first-wins",
            Self::LastWins => "last-wins",
        }
    }
}

impl fmt::Display for DispatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DispatchPolicy {
    type Err = UnknownKeyword;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "first-wins" | "first_wins" => Ok(Self::FirstWins),
            "last-wins" | "last_wins" => Ok(Self::LastWins),
            _ => Err(UnknownKeyword::new("dispatch policy", text)),
        }
    }
}

/// Text that does not name a known role or policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownKeyword {
    pub expected: &'static str,
    pub found: String,
}

impl UnknownKeyword {
    fn new(expected: &'static str, found: &str) -> Self {
        Self {
            expected,
            found: found.to_string(),
        }
    }
}

impl fmt::Display for UnknownKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: `{}`", self.expected, self.found)
    }
}

impl std::error::Error for UnknownKeyword {}
