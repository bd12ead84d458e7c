//! Sampling a roller's output to check how evenly it distributes values.

use super::{roller::Roller, Bias, Error};

/// Per-face tallies from repeatedly rolling a single unbiased die
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Distribution {
	/// Number of times each face came up, indexed by `face - 1`
	pub counts: Vec<u32>,

	/// Number of times each face would come up under a perfectly even distribution
	pub expected: f64,

	/// Absolute difference between each face's count and [`Self::expected`]
	pub deviations: Vec<f64>,
}

impl Distribution {
	/// Rolls a die with the given number of sides `rolls` times and tallies the results.
	///
	/// # Errors
	/// Any error from [`Roller::roll_die()`] is passed along.
	///
	/// # Examples
	/// ```
	/// use dado::dice::{roller::Secure as SecureRoller, stats::Distribution};
	///
	/// let dist = Distribution::sample(&mut SecureRoller::new(), 6, 600)?;
	/// assert_eq!(dist.counts.len(), 6);
	/// assert_eq!(dist.expected, 100.0);
	/// assert_eq!(dist.counts.iter().sum::<u32>(), 600);
	/// # Ok::<(), dado::dice::Error>(())
	/// ```
	pub fn sample<R: Roller + ?Sized>(rng: &mut R, sides: u32, rolls: u32) -> Result<Self, Error> {
		let mut counts = vec![0_u32; usize::try_from(sides).unwrap_or_default()];
		for _ in 0..rolls {
			let val = rng.roll_die(sides, Bias::None)?;
			if let Some(count) = usize::try_from(val - 1).ok().and_then(|idx| counts.get_mut(idx)) {
				*count += 1;
			}
		}

		let expected = f64::from(rolls) / f64::from(sides);
		let deviations = counts
			.iter()
			.map(|count| (f64::from(*count) - expected).abs())
			.collect();

		Ok(Self {
			counts,
			expected,
			deviations,
		})
	}

	/// Gets the largest deviation from [`Self::expected`] of any face, as a fraction of [`Self::expected`].
	#[must_use]
	pub fn max_relative_deviation(&self) -> f64 {
		self.deviations
			.iter()
			.fold(0.0_f64, |max, dev| max.max(*dev / self.expected))
	}
}
