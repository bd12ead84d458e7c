//! Outcome biasing for single die draws ("lucky" and "unlucky" dice) and the conditions used to drive it.

use core::fmt;

use tracing::debug;

use super::{roller::Roller, Error};

/// Maximum number of times a biased die will be rerolled before settling for its last value
pub const MAX_REROLLS: u32 = 100;

/// Policy that nudges a single die draw toward the favorable or unfavorable end of its range by rerolling it until a
/// threshold is met or [`MAX_REROLLS`] is exhausted.
///
/// The rerolled values are genuine draws from the same roller; nothing is ever clamped or remapped. If the reroll
/// budget runs out, the last value drawn is kept even if it misses the threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "Unlikely to change, no logical fallback")]
pub enum Bias {
	/// Draws are kept as-is
	#[default]
	None,

	/// Draws below [`lucky_threshold()`] are rerolled
	Lucky,

	/// Draws above [`unlucky_threshold()`] are rerolled
	Unlucky,
}

impl Bias {
	/// Creates a bias from a pair of lucky/unlucky flags. If both are set, lucky takes precedence.
	///
	/// # Examples
	/// ```
	/// use dado::dice::Bias;
	///
	/// assert_eq!(Bias::from_flags(false, false), Bias::None);
	/// assert_eq!(Bias::from_flags(false, true), Bias::Unlucky);
	/// assert_eq!(Bias::from_flags(true, true), Bias::Lucky);
	/// ```
	#[must_use]
	pub const fn from_flags(lucky: bool, unlucky: bool) -> Self {
		if lucky {
			Self::Lucky
		} else if unlucky {
			Self::Unlucky
		} else {
			Self::None
		}
	}

	/// Gets the condition that a draw must pass in order to be rerolled for a die with the given number of sides,
	/// if any.
	///
	/// # Examples
	/// ```
	/// use dado::dice::{Bias, Condition};
	///
	/// assert_eq!(Bias::Lucky.reroll_condition(20), Some(Condition::Lt(14)));
	/// assert_eq!(Bias::Unlucky.reroll_condition(20), Some(Condition::Gt(6)));
	/// assert_eq!(Bias::None.reroll_condition(20), None);
	/// ```
	#[must_use]
	pub const fn reroll_condition(self, sides: u32) -> Option<Condition> {
		match self {
			Self::None => None,
			Self::Lucky => Some(Condition::Lt(lucky_threshold(sides))),
			Self::Unlucky => Some(Condition::Gt(unlucky_threshold(sides))),
		}
	}

	/// Applies the bias to an initial draw, rerolling with the given roller as needed.
	///
	/// # Errors
	/// Any error from [`Roller::random_int()`] while rerolling is passed along.
	///
	/// # Examples
	/// ```
	/// use dado::dice::{roller::Iter as IterRoller, Bias};
	///
	/// // An unlucky d6 rerolls anything above 3
	/// let mut roller = IterRoller::new([5, 4, 2]);
	/// assert_eq!(Bias::Unlucky.apply(6, 6, &mut roller)?, 2);
	/// # Ok::<(), dado::dice::Error>(())
	/// ```
	pub fn apply<R: Roller + ?Sized>(self, first: u32, sides: u32, rng: &mut R) -> Result<u32, Error> {
		let Some(cond) = self.reroll_condition(sides) else {
			return Ok(first);
		};

		let mut result = first;
		let mut rerolls = 0;
		while cond.check(result) && rerolls < MAX_REROLLS {
			result = rng.random_int(sides)?;
			rerolls += 1;
		}

		if rerolls > 0 {
			debug!(bias = ?self, %cond, sides, rerolls, result, "rerolled biased die");
		}

		Ok(result)
	}

	/// Indicates whether this is [`Self::Lucky`].
	#[must_use]
	#[inline]
	pub const fn is_lucky(self) -> bool {
		matches!(self, Self::Lucky)
	}

	/// Indicates whether this is [`Self::Unlucky`].
	#[must_use]
	#[inline]
	pub const fn is_unlucky(self) -> bool {
		matches!(self, Self::Unlucky)
	}
}

/// Lowest value a lucky die is satisfied with: 4 for a d6, otherwise 70% of the sides rounded up.
///
/// # Examples
/// ```
/// use dado::dice::bias::lucky_threshold;
///
/// assert_eq!(lucky_threshold(6), 4);
/// assert_eq!(lucky_threshold(20), 14);
/// assert_eq!(lucky_threshold(4), 3);
/// ```
#[must_use]
pub const fn lucky_threshold(sides: u32) -> u32 {
	if sides == 6 {
		4
	} else {
		sides.saturating_mul(7).div_ceil(10)
	}
}

/// Highest value an unlucky die is satisfied with: 3 for a d6, otherwise 30% of the sides rounded up.
///
/// # Examples
/// ```
/// use dado::dice::bias::unlucky_threshold;
///
/// assert_eq!(unlucky_threshold(6), 3);
/// assert_eq!(unlucky_threshold(20), 6);
/// assert_eq!(unlucky_threshold(2), 1);
/// ```
#[must_use]
pub const fn unlucky_threshold(sides: u32) -> u32 {
	if sides == 6 {
		3
	} else {
		sides.saturating_mul(3).div_ceil(10)
	}
}

/// Test that decides whether a biased die is rerolled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "A biased die only ever rerolls values past one side of a threshold")]
pub enum Condition {
	/// Checks whether values are greater than its own value. Symbol: `>`
	Gt(u32),

	/// Checks whether values are less than its own value. Symbol: `<`
	Lt(u32),
}

impl Condition {
	/// Checks a value against the condition.
	#[must_use]
	pub const fn check(&self, val: u32) -> bool {
		match self {
			Self::Gt(threshold) => val > *threshold,
			Self::Lt(threshold) => val < *threshold,
		}
	}

	/// Gets the symbol that represents the condition.
	#[must_use]
	pub const fn symbol(&self) -> &'static str {
		match self {
			Self::Gt(..) => ">",
			Self::Lt(..) => "<",
		}
	}
}

impl fmt::Display for Condition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let (Self::Gt(threshold) | Self::Lt(threshold)) = self;
		write!(f, "{}{threshold}", self.symbol())
	}
}
