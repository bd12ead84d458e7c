//! Abstractions for drawing random die values using various means.

use core::iter::Peekable;

use fastrand::Rng;
use tracing::warn;

use super::{reserve, Bias, Dice, Error, Rolled, MAX_RANDOM, MAX_SIDES, MIN_SIDES};

/// Rolls dice - what else is there to say?
pub trait Roller {
	/// Draws a uniformly distributed integer in `1..=max`.
	///
	/// # Errors
	/// If `max` is outside of `1..=256`, [`Error::OutOfRange`] is returned. Rollers backed by a fallible entropy
	/// source may also return [`Error::Entropy`].
	fn random_int(&mut self, max: u32) -> Result<u32, Error>;

	/// Indicates whether the values this roller draws come from a cryptographically secure source.
	/// This never changes over the lifetime of a roller.
	#[must_use]
	fn is_secure(&self) -> bool;

	/// Rolls a single die, rerolling it as dictated by the given [`Bias`].
	///
	/// # Errors
	/// If `sides` is outside of `2..=100`, [`Error::InvalidDie`] is returned.
	///
	/// # Examples
	/// ```
	/// use dado::dice::{roller::{Iter as IterRoller, Roller}, Bias};
	///
	/// // A lucky d20 rerolls anything below 14
	/// let mut roller = IterRoller::new([3, 9, 17]);
	/// assert_eq!(roller.roll_die(20, Bias::Lucky)?, 17);
	/// # Ok::<(), dado::dice::Error>(())
	/// ```
	fn roll_die(&mut self, sides: u32, bias: Bias) -> Result<u32, Error> {
		if !(MIN_SIDES..=MAX_SIDES).contains(&sides) {
			return Err(Error::InvalidDie(sides));
		}

		let first = self.random_int(sides)?;
		bias.apply(first, sides, self)
	}

	/// Rolls `count` independent dice, preserving the order they were drawn in.
	///
	/// # Errors
	/// If `count` is zero, [`Error::InvalidCount`] is returned. If `sides` is outside of `2..=100`,
	/// [`Error::InvalidDie`] is returned. If the largest possible total of the dice doesn't fit in a `u32`,
	/// [`Error::Overflow`] is returned before anything is drawn, and if there isn't enough memory to hold the rolls,
	/// [`Error::Capacity`] is returned. Any error from [`Self::roll_die()`] is also passed along.
	fn roll_multiple(&mut self, count: u32, sides: u32, bias: Bias) -> Result<Vec<u32>, Error> {
		if count == 0 {
			return Err(Error::InvalidCount);
		}
		if !(MIN_SIDES..=MAX_SIDES).contains(&sides) {
			return Err(Error::InvalidDie(sides));
		}
		if Dice::new(count, sides).max_total().is_none() {
			return Err(Error::Overflow);
		}

		let mut rolls = Vec::new();
		reserve(&mut rolls, count)?;
		for _ in 0..count {
			rolls.push(self.roll_die(sides, bias)?);
		}

		Ok(rolls)
	}

	/// Rolls a set of dice.
	///
	/// # Errors
	/// See [`Self::roll_multiple()`].
	fn roll(&mut self, dice: &Dice, bias: Bias) -> Result<Rolled, Error> {
		Ok(Rolled {
			rolls: self.roll_multiple(dice.count, dice.sides, bias)?,
			dice: *dice,
		})
	}
}

/// Draws a uniformly distributed integer in `1..=max` from random bytes supplied by `fill`.
///
/// Bytes are read as a big-endian unsigned integer of the smallest width covering `max`. Values at or above the
/// largest multiple of `max` representable in that width are discarded and redrawn, so the final modulo reduction
/// introduces no bias.
///
/// # Errors
/// If `max` is outside of `1..=256`, [`Error::OutOfRange`] is returned. Errors from `fill` are passed along.
///
/// # Examples
/// ```
/// use dado::dice::roller::uniform_int;
///
/// // 252 is the largest multiple of 6 that fits in a byte, so 255 and 252 are both rejected
/// let mut bytes = [255, 252, 5].into_iter();
/// let val = uniform_int(6, |buf| {
/// 	buf.iter_mut().for_each(|b| *b = bytes.next().unwrap());
/// 	Ok(())
/// })?;
/// assert_eq!(val, 6);
/// # Ok::<(), dado::dice::Error>(())
/// ```
pub fn uniform_int(max: u32, mut fill: impl FnMut(&mut [u8]) -> Result<(), Error>) -> Result<u32, Error> {
	if !(1..=MAX_RANDOM).contains(&max) {
		return Err(Error::OutOfRange(max));
	}

	let width = byte_width(max);
	let span = 1_u64 << (8 * width);
	let limit = span / u64::from(max) * u64::from(max);

	let mut buf = [0_u8; 8];
	loop {
		let bytes = &mut buf[..width];
		fill(bytes)?;

		let val = bytes.iter().fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte));
		if val < limit {
			// Always fits since val < limit <= 256^width and max <= 256
			return Ok(u32::try_from(val % u64::from(max)).map_err(|_err| Error::Overflow)? + 1);
		}
	}
}

/// Determines the minimal number of bytes needed to represent values up to `max`.
const fn byte_width(max: u32) -> usize {
	let mut width = 0;
	while (1_u64 << (8 * width)) < max as u64 {
		width += 1;
	}
	width
}

/// Checks whether the operating system's secure entropy source can be read from.
fn os_entropy_available() -> bool {
	getrandom::fill(&mut [0_u8; 1]).is_ok()
}

/// Generates rolls from the operating system's cryptographically secure entropy source via [getrandom], falling back
/// to [fastrand] when the secure source is unavailable.
///
/// Whether the secure source is in use is decided once, when the roller is created, and reported by
/// [`Roller::is_secure()`].
///
/// # Examples
///
/// ## Secure roller
/// ```
/// use dado::dice::{roller::{Roller, Secure as SecureRoller}, Bias, Dice};
///
/// let mut roller = SecureRoller::new();
///
/// let dice = Dice::new(4, 6);
/// let rolled = roller.roll(&dice, Bias::None)?;
/// assert!(rolled.rolls.iter().all(|val| (1..=6).contains(val)));
/// # Ok::<(), dado::dice::Error>(())
/// ```
///
/// ## Manually seeded fallback roller
/// ```
/// use dado::dice::{roller::{Roller, Secure as SecureRoller}, Bias, Dice};
///
/// let mut roller = SecureRoller::with_seed(0x750c38d574400);
/// assert!(!roller.is_secure());
///
/// let dice = Dice::new(4, 6);
/// let _ = roller.roll(&dice, Bias::None)?;
/// # Ok::<(), dado::dice::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Secure(Source);

/// Where a [`Secure`] roller gets its random bytes from
#[derive(Debug, Clone)]
enum Source {
	/// Operating system entropy
	Os,

	/// Non-secure pseudorandom generator
	FastRand(Rng),
}

impl Secure {
	/// Creates a new roller, probing for the secure entropy source and falling back to [fastrand] if it can't be used.
	#[must_use]
	pub fn new() -> Self {
		if os_entropy_available() {
			Self(Source::Os)
		} else {
			warn!("secure entropy source unavailable, falling back to non-secure random generation");
			Self::insecure()
		}
	}

	/// Creates a new roller that always uses [fastrand], regardless of whether the secure source is available.
	#[must_use]
	pub fn insecure() -> Self {
		Self(Source::FastRand(Rng::new()))
	}

	/// Creates a new roller that uses a pre-seeded [fastrand] instance. Its rolls are reproducible and not secure.
	#[must_use]
	pub fn with_seed(seed: u64) -> Self {
		Self(Source::FastRand(Rng::with_seed(seed)))
	}

	/// Fills a buffer with random bytes from the roller's source.
	fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error> {
		match &mut self.0 {
			Source::Os => getrandom::fill(buf).map_err(Error::Entropy),
			Source::FastRand(rng) => {
				rng.fill(buf);
				Ok(())
			}
		}
	}
}

impl Default for Secure {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl Roller for Secure {
	/// Draws a value using [`uniform_int()`] with bytes from the roller's source.
	#[inline]
	fn random_int(&mut self, max: u32) -> Result<u32, Error> {
		uniform_int(max, |buf| self.fill(buf))
	}

	#[inline]
	fn is_secure(&self) -> bool {
		matches!(self.0, Source::Os)
	}
}

/// Generates rolls that always have a specific value.
///
/// # Examples
/// ```
/// use dado::dice::{roller::{Roller, Val as ValRoller}, Bias, Dice};
///
/// let mut roller = ValRoller(4);
///
/// let rolled = roller.roll(&Dice::new(4, 6), Bias::None)?;
/// assert!(rolled.rolls.iter().all(|val| *val == 4));
/// # Ok::<(), dado::dice::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Val(pub u32);

impl Roller for Val {
	/// Draws one specific value, regardless of `max`.
	#[inline]
	fn random_int(&mut self, _max: u32) -> Result<u32, Error> {
		Ok(self.0)
	}

	#[inline]
	fn is_secure(&self) -> bool {
		false
	}
}

/// Generates rolls that always have their max value.
///
/// # Examples
/// ```
/// use dado::dice::{roller::{Max as MaxRoller, Roller}, Bias, Dice};
///
/// let mut roller = MaxRoller;
///
/// let rolled = roller.roll(&Dice::new(2, 20), Bias::None)?;
/// assert!(rolled.rolls.iter().all(|val| *val == 20));
/// # Ok::<(), dado::dice::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Max;

impl Roller for Max {
	/// Draws the max value.
	#[inline]
	fn random_int(&mut self, max: u32) -> Result<u32, Error> {
		if (1..=MAX_RANDOM).contains(&max) {
			Ok(max)
		} else {
			Err(Error::OutOfRange(max))
		}
	}

	#[inline]
	fn is_secure(&self) -> bool {
		false
	}
}

/// Generates rolls from an iterator of values. Mainly useful for testing purposes.
///
/// # Examples
/// ```
/// use dado::dice::{roller::{Iter as IterRoller, Roller}, Bias, Dice};
///
/// let mut roller = IterRoller::new(vec![1, 2, 3, 4, 10]);
/// let rolled = roller.roll(&Dice::new(5, 6), Bias::None)?;
/// assert_eq!(rolled.rolls, vec![1, 2, 3, 4, 10]);
/// # Ok::<(), dado::dice::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Iter<I: Iterator<Item = u32>>(Peekable<I>);

impl<I: Iterator<Item = u32>> Iter<I> {
	/// Checks whether the iterator still has values available.
	#[inline]
	pub fn can_roll(&mut self) -> bool {
		self.0.peek().is_some()
	}

	/// Creates a new roller that uses the given iterator to provide roll values.
	#[must_use]
	#[inline]
	pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
		Self(iter.into_iter().peekable())
	}
}

impl<I: Iterator<Item = u32>> Roller for Iter<I> {
	/// Draws the value from the next iteration.
	///
	/// # Panics
	/// If the iterator has finished, this will panic.
	#[inline]
	#[expect(
		clippy::expect_used,
		reason = "Mostly for testing, otherwise manual checking of can_roll() is expected"
	)]
	fn random_int(&mut self, _max: u32) -> Result<u32, Error> {
		Ok(self.0.next().expect("iterator is finished"))
	}

	#[inline]
	fn is_secure(&self) -> bool {
		false
	}
}
