//! Structured representations of parsed dice notation.

use core::{fmt, slice};

use crate::dice::Dice;

/// Fully parsed dice notation, ready to be rolled.
///
/// Notation with a single group of dice (`2d6+3`) is [`Self::Simple`], while notation that sums multiple groups
/// (`3d6+1d4-2`) is [`Self::Complex`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "Notation is either one group or several")]
pub enum RollSpec {
	/// Single dice group with an optional modifier
	Simple(SimpleSpec),

	/// Multiple dice groups summed together with an optional modifier
	Complex(ComplexSpec),
}

impl RollSpec {
	/// Gets the flat modifier added to the total of the dice.
	#[must_use]
	#[inline]
	pub const fn modifier(&self) -> i32 {
		match self {
			Self::Simple(spec) => spec.modifier,
			Self::Complex(spec) => spec.modifier,
		}
	}

	/// Gets the normalized notation the spec was parsed from (trimmed and with all whitespace removed, but with the
	/// original casing).
	#[must_use]
	#[inline]
	pub fn format(&self) -> &str {
		match self {
			Self::Simple(spec) => &spec.format,
			Self::Complex(spec) => &spec.format,
		}
	}

	/// Indicates whether this is [`Self::Complex`].
	#[must_use]
	#[inline]
	pub const fn is_complex(&self) -> bool {
		matches!(self, Self::Complex(..))
	}

	/// Gets all dice groups in the order they appeared in the notation.
	/// A [`Self::Simple`] spec always has exactly one.
	///
	/// # Examples
	/// ```
	/// use dado::{dice::Dice, parse::NotationParser};
	///
	/// let spec = NotationParser::default().parse("1d6+1d4+2").unwrap();
	/// assert_eq!(spec.groups(), &[Dice::new(1, 6), Dice::new(1, 4)]);
	/// ```
	#[must_use]
	pub fn groups(&self) -> &[Dice] {
		match self {
			Self::Simple(spec) => slice::from_ref(&spec.dice),
			Self::Complex(spec) => &spec.groups,
		}
	}
}

impl fmt::Display for RollSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format())
	}
}

/// Notation consisting of one group of dice, such as `1d20+5`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct SimpleSpec {
	/// Dice to roll
	pub dice: Dice,

	/// Flat value added to the dice total (may be negative)
	pub modifier: i32,

	/// Normalized notation this was parsed from
	pub format: String,
}

impl SimpleSpec {
	/// Creates a simple spec.
	#[must_use]
	pub fn new(dice: Dice, modifier: i32, format: impl Into<String>) -> Self {
		Self {
			dice,
			modifier,
			format: format.into(),
		}
	}
}

/// Notation consisting of two or more groups of dice, such as `1d6+1d4+2`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct ComplexSpec {
	/// Dice groups to roll, in the order they appeared
	pub groups: Vec<Dice>,

	/// Flat value added to the sum of all groups (may be negative)
	pub modifier: i32,

	/// Normalized notation this was parsed from
	pub format: String,
}

impl ComplexSpec {
	/// Creates a complex spec.
	#[must_use]
	pub fn new(groups: Vec<Dice>, modifier: i32, format: impl Into<String>) -> Self {
		Self {
			groups,
			modifier,
			format: format.into(),
		}
	}
}
