//! All functionality for directly creating dice, rolling them, and working with their resulting rolls.
//!
//! This is the home of the dice "primitives". For resolving full notation strings, see
//! [`RollEngine`](crate::engine::RollEngine).

pub mod bias;
pub mod roller;
pub mod stats;

use core::fmt;
use std::collections::TryReserveError;

pub use self::{
	bias::{Bias, Condition},
	roller::Roller,
};

/// Smallest number of sides a die can have when it is rolled
pub const MIN_SIDES: u32 = 2;

/// Largest number of sides a die can have when it is rolled
pub const MAX_SIDES: u32 = 100;

/// Largest value a single draw from a [`Roller`] can produce
pub const MAX_RANDOM: u32 = 256;

/// A group of one or more dice that all have the same number of sides, such as the `2d6` in `2d6+3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_structs, reason = "A dice group is fully described by its count and sides")]
pub struct Dice {
	/// Number of dice to roll
	pub count: u32,

	/// Number of sides for each die
	pub sides: u32,
}

impl Dice {
	/// Creates a new set of dice with a given count and number of sides.
	#[must_use]
	pub const fn new(count: u32, sides: u32) -> Self {
		Self { count, sides }
	}

	/// Gets the largest total the dice can roll, or [`None`] if it doesn't fit in a `u32`.
	///
	/// # Examples
	/// ```
	/// use dado::dice::Dice;
	///
	/// assert_eq!(Dice::new(4, 6).max_total(), Some(24));
	/// assert_eq!(Dice::new(u32::MAX, 6).max_total(), None);
	/// ```
	#[must_use]
	pub const fn max_total(&self) -> Option<u32> {
		self.count.checked_mul(self.sides)
	}
}

impl Default for Dice {
	/// Creates the default dice (1d20).
	#[inline]
	fn default() -> Self {
		Self::new(1, 20)
	}
}

impl fmt::Display for Dice {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}d{}", self.count, self.sides)
	}
}

/// Representation of the result from rolling [`Dice`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Plain pairing of a dice group and its values")]
pub struct Rolled {
	/// Each individual die value that was rolled, in order
	pub rolls: Vec<u32>,

	/// Dice that were rolled to produce this
	pub dice: Dice,
}

impl Rolled {
	/// Calculates the total of all roll values.
	///
	/// # Errors
	/// If there is an integer overflow while summing the die rolls, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use dado::dice::{Dice, Rolled};
	///
	/// let rolled = Rolled::from_dice_and_rolls(Dice::new(3, 6), [3, 4, 5]);
	/// assert_eq!(rolled.total()?, 12);
	/// # Ok::<(), dado::dice::Error>(())
	/// ```
	pub fn total(&self) -> Result<u32, Error> {
		sum(&self.rolls)
	}

	/// Creates a new rolled set of dice from a given set of dice and an iterator of values.
	#[must_use]
	pub fn from_dice_and_rolls(dice: Dice, rolls: impl IntoIterator<Item = u32>) -> Self {
		Self {
			rolls: rolls.into_iter().collect(),
			dice,
		}
	}
}

impl fmt::Display for Rolled {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// The output is the dice the roll is from followed by a list of all of the individual rolled values.
	///
	/// # Examples
	/// ```
	/// use dado::dice::{Dice, Rolled};
	///
	/// let rolled = Rolled::from_dice_and_rolls(Dice::new(4, 6), [6, 2, 5, 3]);
	/// assert_eq!(rolled.to_string(), "4d6:[6, 2, 5, 3]");
	/// ```
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}:{}", self.dice, list(&self.rolls))
	}
}

/// Renders values as a bracketed, comma-separated list.
pub(crate) fn list<T: fmt::Display>(vals: &[T]) -> String {
	format!(
		"[{}]",
		vals.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join(", ")
	)
}

/// Sums die values, failing on overflow.
pub(crate) fn sum(vals: &[u32]) -> Result<u32, Error> {
	vals.iter()
		.try_fold(0_u32, |total, val| total.checked_add(*val))
		.ok_or(Error::Overflow)
}

/// Reserves room for `count` more values without aborting when the allocation fails.
pub(crate) fn reserve<T>(vals: &mut Vec<T>, count: u32) -> Result<(), Error> {
	let additional = usize::try_from(count).map_err(|_err| Error::Overflow)?;
	vals.try_reserve_exact(additional).map_err(Error::Capacity)
}

/// An error resulting from misuse of a [`Roller`] or from its entropy source
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// A random integer was requested with an upper bound outside of `1..=256`.
	///
	/// # Examples
	/// ```
	/// use dado::dice::{roller::{Roller, Secure as SecureRoller}, Error};
	///
	/// let mut roller = SecureRoller::new();
	/// assert!(matches!(roller.random_int(0), Err(Error::OutOfRange(0))));
	/// assert!(matches!(roller.random_int(257), Err(Error::OutOfRange(257))));
	/// ```
	#[error("max value must be between 1 and 256, got {0}")]
	OutOfRange(u32),

	/// A die was requested with a number of sides outside of `2..=100`.
	///
	/// # Examples
	/// ```
	/// use dado::dice::{roller::{Roller, Secure as SecureRoller}, Bias, Error};
	///
	/// let mut roller = SecureRoller::new();
	/// assert!(matches!(roller.roll_die(1, Bias::None), Err(Error::InvalidDie(1))));
	/// assert!(matches!(roller.roll_die(101, Bias::None), Err(Error::InvalidDie(101))));
	/// ```
	#[error("die must have between 2 and 100 sides, got {0}")]
	InvalidDie(u32),

	/// Zero dice were requested.
	#[error("must roll at least 1 die")]
	InvalidCount,

	/// The secure entropy source failed after it was detected as available.
	#[error("secure entropy source failed: {0}")]
	Entropy(getrandom::Error),

	/// The largest total the dice could roll doesn't fit in a `u32`, or there was an integer overflow when summing
	/// roll values. Dice are checked for this before any of them are drawn.
	///
	/// # Examples
	/// ```
	/// use dado::dice::{roller::{Roller, Secure as SecureRoller}, Bias, Error};
	///
	/// let mut roller = SecureRoller::new();
	/// assert!(matches!(roller.roll_multiple(u32::MAX, 6, Bias::None), Err(Error::Overflow)));
	/// ```
	#[error("integer overflow")]
	Overflow,

	/// Memory for the rolled values couldn't be reserved.
	#[error("unable to reserve memory for rolls: {0}")]
	Capacity(TryReserveError),
}
