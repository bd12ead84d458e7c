//! Parsing of dice notation strings like `1d20`, `2d6+3`, and `3d6+1d4-2` into [`RollSpec`]s.
//!
//! The grammar is deliberately small: one or more `<count>d<sides>` groups joined with `+`, optionally followed by a
//! single signed integer modifier. Input is matched case-insensitively and all whitespace is ignored.

use core::{ops::Range, str::FromStr};

use chumsky::{prelude::*, span::Span as _};

use crate::{
	dice::Dice,
	notation::{ComplexSpec, RollSpec, SimpleSpec},
};

/// Example notations, suitable for hint text
pub const SUPPORTED_FORMATS: &[&str] = &[
	"1d4", "1d6", "1d8", "1d10", "1d12", "1d20", "1d100", "2d6", "3d8", "4d6", "1d20+5", "2d6-2", "1d8+3",
];

/// Generates a parser for an unsigned run of decimal digits (leading zeros allowed).
fn digits<'src>() -> impl Parser<'src, &'src str, String, extra::Err<Rich<'src, char>>> + Clone {
	text::digits(10).collect()
}

/// Generates a parser for an unsigned number, saturating at [`u64::MAX`] so oversized values can still be reported
/// against [`Limits`].
fn number<'src>() -> impl Parser<'src, &'src str, u64, extra::Err<Rich<'src, char>>> + Clone {
	digits().map(|digits| digits.parse().unwrap_or(u64::MAX))
}

/// Generates a parser that specifically handles dice groups like "1d20", "2d6", etc. The output is the count and
/// sides as written, before any [`Limits`] are applied.
pub fn dice_part<'src>() -> impl Parser<'src, &'src str, (u64, u64), extra::Err<Rich<'src, char>>> + Clone {
	number()
		.labelled("dice count")
		.then_ignore(just('d'))
		.then(number().labelled("dice sides"))
}

/// Generates a parser that handles signed flat modifiers like "+5" or "-2".
pub fn modifier_part<'src>() -> impl Parser<'src, &'src str, i32, extra::Err<Rich<'src, char>>> + Clone {
	one_of("+-")
		.then(digits())
		.labelled("modifier")
		.try_map(|(sign, digits), span| {
			format!("{sign}{digits}")
				.parse()
				.map_err(|err| Rich::custom(span, format!("Modifier: {err}")))
		})
}

/// Generates a parser that handles full (lowercase, whitespace-free) notation: dice groups joined with "+" and an
/// optional trailing modifier, expecting end of input. The output is the list of groups and the modifier (0 if
/// absent).
///
/// Groups can only be added together. Subtracting a group (`1d6-1d4`) is rejected, as is anything after the
/// modifier (`1d6+2+3`).
pub fn notation<'src>() -> impl Parser<'src, &'src str, (Vec<(u64, u64)>, i32), extra::Err<Rich<'src, char>>> + Clone
{
	dice_part()
		.then(just('+').ignore_then(dice_part()).repeated().collect::<Vec<_>>())
		.then(modifier_part().or_not())
		.then_ignore(end())
		.map(|((first, rest), modifier)| {
			let mut groups = Vec::with_capacity(rest.len() + 1);
			groups.push(first);
			groups.extend(rest);
			(groups, modifier.unwrap_or(0))
		})
}

/// Trims the input and strips all whitespace from it, preserving casing.
///
/// # Examples
/// ```
/// use dado::parse::normalize;
///
/// assert_eq!(normalize("  1d20 + 3  "), "1d20+3");
/// ```
#[must_use]
pub fn normalize(input: &str) -> String {
	input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Numeric bounds applied to dice groups after they have been parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_structs, reason = "Limits are plain configuration")]
pub struct Limits {
	/// Largest number of dice allowed in a single group
	pub max_dice: u32,

	/// Smallest number of sides allowed for a die
	pub min_sides: u32,

	/// Largest number of sides allowed for a die
	pub max_sides: u32,
}

impl Limits {
	/// Limits that effectively only enforce a minimum of 1 die and 2 sides.
	pub const UNBOUNDED: Self = Self {
		max_dice: u32::MAX,
		min_sides: 2,
		max_sides: u32::MAX,
	};

	/// Creates limits that cap groups at 10 dice of up to 100 sides.
	///
	/// # Examples
	/// ```
	/// use dado::parse::{Limits, NotationParser};
	///
	/// let parser = NotationParser::with_limits(Limits::conservative());
	/// assert!(parser.validate("10d100"));
	/// assert!(!parser.validate("11d6"));
	/// assert!(!parser.validate("1d101"));
	/// ```
	#[must_use]
	pub const fn conservative() -> Self {
		Self {
			max_dice: 10,
			min_sides: 2,
			max_sides: 100,
		}
	}

	/// Checks a dice group's count and sides against the limits, producing the [`Dice`] they describe.
	///
	/// # Errors
	/// If the count or sides are out of bounds, the corresponding error variant is returned.
	///
	/// # Examples
	/// ```
	/// use dado::{dice::Dice, parse::{Error, Limits}};
	///
	/// let limits = Limits::conservative();
	/// assert_eq!(limits.check(2, 6), Ok(Dice::new(2, 6)));
	/// assert_eq!(limits.check(11, 6), Err(Error::CountOutOfBounds { count: 11, max: 10 }));
	/// ```
	pub fn check(&self, count: u64, sides: u64) -> Result<Dice, Error> {
		let count_err = || Error::CountOutOfBounds {
			count,
			max: self.max_dice,
		};
		let sides_err = || Error::SidesOutOfBounds {
			sides,
			min: self.min_sides,
			max: self.max_sides,
		};

		let count = u32::try_from(count).map_err(|_err| count_err())?;
		if count < 1 || count > self.max_dice {
			return Err(count_err());
		}

		let sides = u32::try_from(sides).map_err(|_err| sides_err())?;
		if sides < self.min_sides || sides > self.max_sides {
			return Err(sides_err());
		}

		Ok(Dice::new(count, sides))
	}
}

impl Default for Limits {
	/// Creates [`Self::UNBOUNDED`] limits.
	#[inline]
	fn default() -> Self {
		Self::UNBOUNDED
	}
}

/// Validates and parses dice notation into [`RollSpec`]s, enforcing a set of [`Limits`].
///
/// # Examples
/// ```
/// use dado::{dice::Dice, notation::RollSpec, parse::NotationParser};
///
/// let parser = NotationParser::default();
///
/// let Some(RollSpec::Simple(spec)) = parser.parse("  2D6 - 2 ") else { panic!() };
/// assert_eq!(spec.dice, Dice::new(2, 6));
/// assert_eq!(spec.modifier, -2);
/// assert_eq!(spec.format, "2D6-2");
///
/// assert!(parser.parse("3d6+1d4-2").is_some_and(|spec| spec.is_complex()));
/// assert!(parser.parse("d6").is_none());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NotationParser {
	/// Bounds enforced on every parsed dice group
	limits: Limits,
}

impl NotationParser {
	/// Creates a parser that enforces the given limits.
	#[must_use]
	#[inline]
	pub const fn with_limits(limits: Limits) -> Self {
		Self { limits }
	}

	/// Gets the limits the parser enforces.
	#[must_use]
	#[inline]
	pub const fn limits(&self) -> Limits {
		self.limits
	}

	/// Parses notation into a spec, returning [`None`] for anything empty, malformed, or out of bounds.
	#[must_use]
	#[inline]
	pub fn parse(&self, input: &str) -> Option<RollSpec> {
		self.parse_detailed(input).ok()
	}

	/// Parses notation into a spec, detailing why it was rejected on failure.
	///
	/// # Errors
	/// If the input is blank, doesn't match the grammar, or contains a dice group outside of the parser's limits, the
	/// corresponding error variant is returned.
	pub fn parse_detailed(&self, input: &str) -> Result<RollSpec, Error> {
		let normalized = normalize(input);
		if normalized.is_empty() {
			return Err(Error::Empty);
		}

		let lowered = normalized.to_ascii_lowercase();
		let (groups, modifier) = notation()
			.parse(&lowered)
			.into_result()
			.map_err(|errs| Error::Syntax {
				input: normalized.clone(),
				errors: errs.into_iter().map(SyntaxError::from).collect(),
			})?;

		let groups = groups
			.into_iter()
			.map(|(count, sides)| self.limits.check(count, sides))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(if let [dice] = *groups.as_slice() {
			RollSpec::Simple(SimpleSpec::new(dice, modifier, normalized))
		} else {
			RollSpec::Complex(ComplexSpec::new(groups, modifier, normalized))
		})
	}

	/// Checks whether the notation would parse successfully. Has no side effects, so it is suitable for validating
	/// input as it is being typed.
	#[must_use]
	#[inline]
	pub fn validate(&self, input: &str) -> bool {
		self.parse_detailed(input).is_ok()
	}

	/// Builds a human-readable explanation of why the notation is rejected, or [`None`] if it is valid.
	///
	/// # Examples
	/// ```
	/// use dado::parse::{Limits, NotationParser};
	///
	/// let parser = NotationParser::with_limits(Limits::conservative());
	/// assert!(parser.error_message("").unwrap().starts_with("Enter a dice notation"));
	/// assert!(parser.error_message("invalid").unwrap().starts_with("Invalid dice notation"));
	/// assert!(parser.error_message("11d6").unwrap().starts_with("Dice count"));
	/// assert!(parser.error_message("1d1").unwrap().starts_with("Dice must have"));
	/// assert_eq!(parser.error_message("1d20+5"), None);
	/// ```
	#[must_use]
	pub fn error_message(&self, input: &str) -> Option<String> {
		self.parse_detailed(input).err().map(|err| err.to_string())
	}

	/// Gets example notations, suitable for hint text.
	#[must_use]
	#[inline]
	pub const fn supported_formats() -> &'static [&'static str] {
		SUPPORTED_FORMATS
	}
}

impl FromStr for RollSpec {
	type Err = Error;

	/// Parses notation using a [`NotationParser`] with default (unbounded) limits.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		NotationParser::default().parse_detailed(s)
	}
}

/// Single problem encountered while matching notation against the grammar
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct SyntaxError {
	/// Byte range of the problem within the normalized notation
	pub span: Range<usize>,

	/// Description of the problem
	pub message: String,
}

impl From<Rich<'_, char>> for SyntaxError {
	fn from(err: Rich<'_, char>) -> Self {
		Self {
			span: err.span().start()..err.span().end(),
			message: err.to_string(),
		}
	}
}

/// Reason dice notation was rejected
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// No notation was given (empty or whitespace only).
	#[error("Enter a dice notation (e.g. 2d6, 1d20+5)")]
	Empty,

	/// The notation doesn't match the grammar.
	#[error("Invalid dice notation \"{input}\". Use [count]d[sides] (e.g. 2d6, 1d20+5)")]
	Syntax {
		/// Normalized notation that failed to parse
		input: String,

		/// Individual problems reported by the grammar
		errors: Vec<SyntaxError>,
	},

	/// A dice group has too few or too many dice.
	#[error("Dice count must be between 1 and {max}, got {count}")]
	CountOutOfBounds {
		/// Number of dice in the offending group (saturated at [`u64::MAX`])
		count: u64,

		/// Largest allowed number of dice
		max: u32,
	},

	/// A dice group has too few or too many sides.
	#[error("Dice must have between {min} and {max} sides, got {sides}")]
	SidesOutOfBounds {
		/// Number of sides in the offending group (saturated at [`u64::MAX`])
		sides: u64,

		/// Smallest allowed number of sides
		min: u32,

		/// Largest allowed number of sides
		max: u32,
	},
}
