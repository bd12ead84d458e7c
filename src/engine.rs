//! Resolution of dice notation into complete, explained roll outcomes.
//!
//! [`RollEngine`] is the single entry point for callers: hand it notation, a [`RollType`], and a [`Bias`], and it
//! returns a [`RollOutcome`] describing every die drawn and how the final result was reached.

use core::{cmp::Ordering, fmt, str::FromStr};

use tracing::trace;

use crate::{
	dice::{self, list, reserve, roller::Secure as SecureRoller, Bias, Roller},
	notation::RollSpec,
	parse::{self, NotationParser},
};

/// Shaping applied to each die position of a simple roll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "Unlikely to change, no logical fallback")]
pub enum RollType {
	/// One die per position
	#[default]
	Normal,

	/// Two dice per position, keeping the higher
	Advantage,

	/// Two dice per position, keeping the lower
	Disadvantage,
}

impl RollType {
	/// Gets the identifier of the roll type (`normal`, `advantage`, or `disadvantage`).
	#[must_use]
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Normal => "normal",
			Self::Advantage => "advantage",
			Self::Disadvantage => "disadvantage",
		}
	}

	/// Gets the display label of the roll type.
	#[must_use]
	pub const fn label(self) -> &'static str {
		match self {
			Self::Normal => "Normal",
			Self::Advantage => "Advantage",
			Self::Disadvantage => "Disadvantage",
		}
	}

	/// Picks the kept value out of a pair of dice rolled for a single position.
	#[must_use]
	const fn select(self, [a, b]: [u32; 2]) -> u32 {
		match self {
			Self::Normal | Self::Advantage => {
				if a >= b {
					a
				} else {
					b
				}
			}
			Self::Disadvantage => {
				if a <= b {
					a
				} else {
					b
				}
			}
		}
	}
}

impl fmt::Display for RollType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for RollType {
	type Err = Error;

	/// Parses a roll type from its identifier, ignoring case.
	///
	/// # Examples
	/// ```
	/// use dado::engine::RollType;
	///
	/// assert_eq!("advantage".parse::<RollType>()?, RollType::Advantage);
	/// assert_eq!("Disadvantage".parse::<RollType>()?, RollType::Disadvantage);
	/// assert!("sideways".parse::<RollType>().is_err());
	/// # Ok::<(), dado::engine::Error>(())
	/// ```
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"normal" => Ok(Self::Normal),
			"advantage" => Ok(Self::Advantage),
			"disadvantage" => Ok(Self::Disadvantage),
			_ => Err(Error::UnknownRollType(s.to_owned())),
		}
	}
}

/// Raw values drawn for a roll
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "Dice are drawn singly or in pairs")]
pub enum Rolls {
	/// One value per die, in the order drawn (normal and complex rolls)
	Flat(Vec<u32>),

	/// Two values per die position (advantage and disadvantage rolls)
	Paired(Vec<[u32; 2]>),
}

impl Rolls {
	/// Gets the number of die positions (values for flat rolls, pairs for paired rolls).
	#[must_use]
	pub fn len(&self) -> usize {
		match self {
			Self::Flat(vals) => vals.len(),
			Self::Paired(pairs) => pairs.len(),
		}
	}

	/// Indicates whether no dice were drawn.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Indicates whether this is [`Self::Paired`].
	#[must_use]
	pub const fn is_paired(&self) -> bool {
		matches!(self, Self::Paired(..))
	}
}

/// Everything that happened while resolving a single roll
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct RollOutcome {
	/// Normalized notation that was rolled
	pub format: String,

	/// Roll type that was requested
	pub roll_type: RollType,

	/// Raw values drawn
	pub rolls: Rolls,

	/// Values counted toward the result (the rolls themselves for flat rolls, the kept value of each pair otherwise)
	pub selected_rolls: Vec<u32>,

	/// Sum of the selected rolls plus the modifier
	pub final_result: i64,

	/// Flat modifier that was applied
	pub modifier: i32,

	/// Human-readable account of every draw and the arithmetic performed
	pub explanation: String,

	/// Whether the roll used lucky dice
	pub is_lucky: bool,

	/// Whether the roll used unlucky dice
	pub is_unlucky: bool,

	/// Whether the values came from a secure random source
	pub is_secure: bool,
}

impl RollOutcome {
	/// Builds a plain-text summary of the outcome suitable for posting in a chat.
	///
	/// The first line holds the notation and result, annotated with the roll type (unless normal) and markers for
	/// lucky/unlucky dice. The second line holds the explanation, followed by a warning marker if the roll wasn't
	/// secure.
	///
	/// # Examples
	/// ```
	/// use dado::{dice::{roller::Iter as IterRoller, Bias}, engine::{RollEngine, RollType}};
	///
	/// let mut engine = RollEngine::with_roller(IterRoller::new([7, 15]));
	/// let outcome = engine.roll("1d20+2", RollType::Advantage, Bias::None)?;
	/// assert_eq!(outcome.chat_summary(), "🎲 1d20+2: 17 (Advantage)\nAdvantage: (7, 15) -> [15] +2 ⚠️");
	/// # Ok::<(), dado::engine::Error>(())
	/// ```
	#[must_use]
	pub fn chat_summary(&self) -> String {
		let mut text = format!("🎲 {}: {}", self.format, self.final_result);

		if self.roll_type != RollType::Normal {
			text.push_str(&format!(" ({})", self.roll_type.label()));
		}
		if self.is_lucky {
			text.push_str(" 🍀");
		}
		if self.is_unlucky {
			text.push_str(" 💀");
		}

		text.push('\n');
		text.push_str(&self.explanation);

		if !self.is_secure {
			text.push_str(" ⚠️");
		}

		text
	}
}

impl fmt::Display for RollOutcome {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// The output is the notation and final result followed by the explanation, e.g. `2d6+3 = 10 ([3, 4] +3)`.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} = {} ({})", self.format, self.final_result, self.explanation)
	}
}

/// Parses dice notation and rolls it, producing explained [`RollOutcome`]s.
///
/// The engine owns its [`Roller`] and [`NotationParser`], both of which can be supplied explicitly.
///
/// # Concurrency
/// Rolling takes `&mut self` since the roller may carry generator state, so a single engine can't be rolled from
/// several threads at once. Engines using the default [`SecureRoller`] are `Send + Sync` and cheap to clone, so give
/// each thread its own clone (or share one behind a `Mutex`). Clones of a seeded engine produce identical rolls.
///
/// # Examples
/// ```
/// use dado::{dice::Bias, engine::{RollEngine, RollType}};
///
/// let mut engine = RollEngine::new();
/// let outcome = engine.roll("2d6+3", RollType::Normal, Bias::None)?;
/// assert!((5..=15).contains(&outcome.final_result));
/// assert_eq!(outcome.rolls.len(), 2);
/// # Ok::<(), dado::engine::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct RollEngine<R: Roller = SecureRoller> {
	/// Source of die values
	roller: R,

	/// Parser used for incoming notation
	parser: NotationParser,
}

impl RollEngine {
	/// Creates an engine with a [`SecureRoller`] and a parser with default limits.
	#[must_use]
	pub fn new() -> Self {
		Self::with_roller(SecureRoller::new())
	}

	/// Gets example notations, suitable for hint text.
	#[must_use]
	#[inline]
	pub const fn supported_formats() -> &'static [&'static str] {
		NotationParser::supported_formats()
	}
}

impl Default for RollEngine {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl<R: Roller> RollEngine<R> {
	/// Creates an engine with the given roller and a parser with default limits.
	#[must_use]
	#[inline]
	pub fn with_roller(roller: R) -> Self {
		Self::with_parts(roller, NotationParser::default())
	}

	/// Creates an engine with the given roller and parser.
	#[must_use]
	#[inline]
	pub const fn with_parts(roller: R, parser: NotationParser) -> Self {
		Self { roller, parser }
	}

	/// Parses notation and rolls it.
	///
	/// Complex notation (multiple dice groups) is always rolled as a flat sum, regardless of the roll type requested.
	///
	/// # Errors
	/// If the notation fails to parse, [`Error::InvalidFormat`] is returned. If the parsed dice can't be rolled (such
	/// as a die with more than 100 sides), [`Error::Dice`] is returned.
	///
	/// # Examples
	/// ```
	/// use dado::{dice::{roller::Iter as IterRoller, Bias}, engine::{RollEngine, RollType, Rolls}};
	///
	/// let mut engine = RollEngine::with_roller(IterRoller::new([3, 4, 5]));
	/// let outcome = engine.roll("3d6+2", RollType::Normal, Bias::None)?;
	/// assert_eq!(outcome.final_result, 14);
	/// assert_eq!(outcome.rolls, Rolls::Flat(vec![3, 4, 5]));
	/// assert_eq!(outcome.explanation, "[3, 4, 5] +2");
	/// # Ok::<(), dado::engine::Error>(())
	/// ```
	pub fn roll(&mut self, input: &str, roll_type: RollType, bias: Bias) -> Result<RollOutcome, Error> {
		let spec = self.parser.parse_detailed(input).map_err(Error::InvalidFormat)?;
		self.roll_spec(&spec, roll_type, bias)
	}

	/// Rolls an already-parsed spec. See [`Self::roll()`].
	///
	/// # Errors
	/// If the spec's dice can't be rolled, [`Error::Dice`] is returned.
	pub fn roll_spec(&mut self, spec: &RollSpec, roll_type: RollType, bias: Bias) -> Result<RollOutcome, Error> {
		// The combined total must fit before anything is drawn, which also bounds how many dice are drawn
		let fits = spec
			.groups()
			.iter()
			.try_fold(0_u32, |total, dice| dice.max_total().and_then(|max| total.checked_add(max)));
		if fits.is_none() {
			return Err(dice::Error::Overflow.into());
		}

		let modifier = spec.modifier();
		let (rolls, selected_rolls, explanation) = match (spec, roll_type) {
			(RollSpec::Complex(complex), _) => {
				let mut all = Vec::new();
				let mut parts = Vec::with_capacity(complex.groups.len());
				for dice in &complex.groups {
					let rolled = self.roller.roll(dice, bias)?;
					parts.push(rolled.to_string());
					reserve(&mut all, dice.count)?;
					all.extend(rolled.rolls);
				}

				(Rolls::Flat(all.clone()), all, parts.join(" + "))
			}

			(RollSpec::Simple(simple), RollType::Normal) => {
				let rolled = self.roller.roll(&simple.dice, bias)?;
				let explanation = list(&rolled.rolls);
				(Rolls::Flat(rolled.rolls.clone()), rolled.rolls, explanation)
			}

			(RollSpec::Simple(simple), RollType::Advantage | RollType::Disadvantage) => {
				if simple.dice.count == 0 {
					return Err(dice::Error::InvalidCount.into());
				}

				let mut pairs = Vec::new();
				reserve(&mut pairs, simple.dice.count)?;
				for _ in 0..simple.dice.count {
					let first = self.roller.roll_die(simple.dice.sides, bias)?;
					let second = self.roller.roll_die(simple.dice.sides, bias)?;
					pairs.push([first, second]);
				}

				let selected = pairs.iter().map(|pair| roll_type.select(*pair)).collect::<Vec<_>>();
				let explanation = format!(
					"{}: {} -> {}",
					roll_type.label(),
					pairs
						.iter()
						.map(|[first, second]| format!("({first}, {second})"))
						.collect::<Vec<_>>()
						.join(", "),
					list(&selected)
				);

				(Rolls::Paired(pairs), selected, explanation)
			}
		};

		let total = dice::sum(&selected_rolls)?;
		let final_result = i64::from(total) + i64::from(modifier);
		let explanation = explanation + &modifier_suffix(modifier);

		trace!(format = spec.format(), %roll_type, ?bias, final_result, %explanation, "resolved roll");

		Ok(RollOutcome {
			format: spec.format().to_owned(),
			roll_type,
			rolls,
			selected_rolls,
			final_result,
			modifier,
			explanation,
			is_lucky: bias.is_lucky(),
			is_unlucky: bias.is_unlucky(),
			is_secure: self.roller.is_secure(),
		})
	}

	/// Indicates whether the engine's roller draws from a secure random source.
	#[must_use]
	#[inline]
	pub fn is_secure(&self) -> bool {
		self.roller.is_secure()
	}

	/// Gets a one-line statement of whether secure randomness is in use.
	///
	/// # Examples
	/// ```
	/// use dado::{dice::roller::Secure as SecureRoller, engine::RollEngine};
	///
	/// let engine = RollEngine::with_roller(SecureRoller::insecure());
	/// assert_eq!(engine.security_status(), "Warning: using less secure random number generation");
	/// ```
	#[must_use]
	pub fn security_status(&self) -> &'static str {
		if self.is_secure() {
			"Using secure random number generation"
		} else {
			"Warning: using less secure random number generation"
		}
	}

	/// Gets the parser the engine uses.
	#[must_use]
	#[inline]
	pub const fn parser(&self) -> &NotationParser {
		&self.parser
	}

	/// Gets the roller the engine uses.
	#[must_use]
	#[inline]
	pub const fn roller(&self) -> &R {
		&self.roller
	}

	/// Gets mutable access to the roller the engine uses.
	#[inline]
	pub fn roller_mut(&mut self) -> &mut R {
		&mut self.roller
	}
}

/// Renders a modifier as an explanation suffix (` +N` or ` -N`), or nothing if it is zero.
fn modifier_suffix(modifier: i32) -> String {
	match modifier.cmp(&0) {
		Ordering::Greater => format!(" +{modifier}"),
		Ordering::Less => format!(" {modifier}"),
		Ordering::Equal => String::new(),
	}
}

/// An error resulting from resolving a roll
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// The notation couldn't be parsed.
	///
	/// # Examples
	/// ```
	/// use dado::{dice::Bias, engine::{Error, RollEngine, RollType}};
	///
	/// let mut engine = RollEngine::new();
	/// assert!(matches!(engine.roll("invalid", RollType::Normal, Bias::None), Err(Error::InvalidFormat(..))));
	/// assert!(matches!(engine.roll("", RollType::Normal, Bias::None), Err(Error::InvalidFormat(..))));
	/// ```
	#[error("invalid dice format: {0}")]
	InvalidFormat(#[source] parse::Error),

	/// The parsed dice couldn't be rolled.
	#[error(transparent)]
	Dice(#[from] dice::Error),

	/// The roll type identifier isn't one of `normal`, `advantage`, or `disadvantage`.
	#[error("unknown roll type: {0}")]
	UnknownRollType(String),
}
