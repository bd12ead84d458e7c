use core::error::Error as _;
use std::thread;

use crate::{
	dice::{
		self,
		roller::{Iter as IterRoller, Secure as SecureRoller, Val as ValRoller},
		Bias,
	},
	engine::{Error, RollEngine, RollType, Rolls},
	parse::{self, Limits, NotationParser},
};

fn engine_with<I: IntoIterator<Item = u32>>(vals: I) -> RollEngine<IterRoller<I::IntoIter>> {
	RollEngine::with_roller(IterRoller::new(vals))
}

#[test]
fn normal_roll() {
	let outcome = engine_with([3, 4, 5]).roll("3d6+2", RollType::Normal, Bias::None).unwrap();
	assert_eq!(outcome.format, "3d6+2");
	assert_eq!(outcome.rolls, Rolls::Flat(vec![3, 4, 5]));
	assert_eq!(outcome.selected_rolls, vec![3, 4, 5]);
	assert_eq!(outcome.final_result, 14);
	assert_eq!(outcome.modifier, 2);
	assert_eq!(outcome.explanation, "[3, 4, 5] +2");
	assert_eq!(outcome.to_string(), "3d6+2 = 14 ([3, 4, 5] +2)");
}

#[test]
fn negative_result() {
	let outcome = engine_with([1, 1]).roll("2d6-3", RollType::Normal, Bias::None).unwrap();
	assert_eq!(outcome.final_result, -1);
	assert_eq!(outcome.explanation, "[1, 1] -3");
}

#[test]
fn zero_modifier_is_omitted() {
	let mut engine = RollEngine::with_roller(ValRoller(3));
	for input in ["1d6", "1d6+0", "1d6-0"] {
		let outcome = engine.roll(input, RollType::Normal, Bias::None).unwrap();
		assert_eq!(outcome.final_result, 3);
		assert_eq!(outcome.modifier, 0);
		assert_eq!(outcome.explanation, "[3]");
	}
}

#[test]
fn advantage() {
	let outcome = engine_with([7, 15, 12, 3])
		.roll("2d20+1", RollType::Advantage, Bias::None)
		.unwrap();
	assert_eq!(outcome.rolls, Rolls::Paired(vec![[7, 15], [12, 3]]));
	assert_eq!(outcome.selected_rolls, vec![15, 12]);
	assert_eq!(outcome.final_result, 28);
	assert_eq!(outcome.explanation, "Advantage: (7, 15), (12, 3) -> [15, 12] +1");
}

#[test]
fn disadvantage() {
	let outcome = engine_with([7, 15, 12, 3])
		.roll("2d20-1", RollType::Disadvantage, Bias::None)
		.unwrap();
	assert_eq!(outcome.rolls, Rolls::Paired(vec![[7, 15], [12, 3]]));
	assert_eq!(outcome.selected_rolls, vec![7, 3]);
	assert_eq!(outcome.final_result, 9);
	assert_eq!(outcome.explanation, "Disadvantage: (7, 15), (12, 3) -> [7, 3] -1");
}

#[test]
fn tied_pair() {
	let outcome = engine_with([4, 4]).roll("1d6", RollType::Advantage, Bias::None).unwrap();
	assert_eq!(outcome.selected_rolls, vec![4]);
	assert_eq!(outcome.explanation, "Advantage: (4, 4) -> [4]");
}

#[test]
fn paired_selection_holds() {
	let mut engine = RollEngine::new();
	for _ in 0..200 {
		let outcome = engine.roll("4d6", RollType::Advantage, Bias::None).unwrap();
		let Rolls::Paired(pairs) = &outcome.rolls else {
			panic!("advantage should draw pairs");
		};
		assert_eq!(pairs.len(), 4);
		for (pair, selected) in pairs.iter().zip(&outcome.selected_rolls) {
			assert_eq!(*selected, pair[0].max(pair[1]));
		}

		let outcome = engine.roll("4d6", RollType::Disadvantage, Bias::None).unwrap();
		let Rolls::Paired(pairs) = &outcome.rolls else {
			panic!("disadvantage should draw pairs");
		};
		assert_eq!(pairs.len(), 4);
		for (pair, selected) in pairs.iter().zip(&outcome.selected_rolls) {
			assert_eq!(*selected, pair[0].min(pair[1]));
		}
		assert_eq!(
			outcome.final_result,
			i64::from(outcome.selected_rolls.iter().sum::<u32>())
		);
	}
}

#[test]
fn results_stay_in_range() {
	let mut engine = RollEngine::new();
	for _ in 0..200 {
		let outcome = engine.roll("3d8-2", RollType::Normal, Bias::None).unwrap();
		assert!((1..=22).contains(&outcome.final_result));
		assert_eq!(outcome.rolls.len(), 3);
		assert!(!outcome.rolls.is_paired());
	}
}

#[test]
fn complex_roll() {
	let outcome = engine_with([4, 2]).roll("1d6+1d4+2", RollType::Normal, Bias::None).unwrap();
	assert_eq!(outcome.rolls, Rolls::Flat(vec![4, 2]));
	assert_eq!(outcome.final_result, 8);
	assert_eq!(outcome.explanation, "1d6:[4] + 1d4:[2] +2");

	let outcome = engine_with([1, 2, 3, 4])
		.roll("3d6+1d4-2", RollType::Normal, Bias::None)
		.unwrap();
	assert_eq!(outcome.final_result, 8);
	assert_eq!(outcome.explanation, "3d6:[1, 2, 3] + 1d4:[4] -2");
}

#[test]
fn complex_ignores_roll_type() {
	for roll_type in [RollType::Advantage, RollType::Disadvantage] {
		let outcome = engine_with([4, 2]).roll("1d6+1d4", roll_type, Bias::None).unwrap();
		assert_eq!(outcome.roll_type, roll_type);
		assert_eq!(outcome.rolls, Rolls::Flat(vec![4, 2]));
		assert_eq!(outcome.final_result, 6);
		assert_eq!(outcome.explanation, "1d6:[4] + 1d4:[2]");
	}
}

#[test]
fn biased_rolls() {
	let outcome = engine_with([3, 15]).roll("1d20", RollType::Normal, Bias::Lucky).unwrap();
	assert_eq!(outcome.final_result, 15);
	assert!(outcome.is_lucky);
	assert!(!outcome.is_unlucky);

	let outcome = engine_with([5, 2]).roll("1d6", RollType::Normal, Bias::Unlucky).unwrap();
	assert_eq!(outcome.final_result, 2);
	assert!(!outcome.is_lucky);
	assert!(outcome.is_unlucky);

	// Each die of a pair is biased independently
	let outcome = engine_with([1, 18, 2, 16])
		.roll("1d20", RollType::Disadvantage, Bias::Lucky)
		.unwrap();
	assert_eq!(outcome.rolls, Rolls::Paired(vec![[18, 16]]));
	assert_eq!(outcome.final_result, 16);

	let outcome = engine_with([1, 14, 20])
		.roll("1d20+1d20", RollType::Normal, Bias::Lucky)
		.unwrap();
	assert_eq!(outcome.rolls, Rolls::Flat(vec![14, 20]));
}

#[test]
fn invalid_format() {
	let mut engine = RollEngine::new();
	for input in ["invalid", "", "d6", "1d"] {
		let err = engine.roll(input, RollType::Normal, Bias::None).unwrap_err();
		assert!(matches!(err, Error::InvalidFormat(..)), "{input:?}: {err:?}");
		assert!(err.source().is_some());
	}

	assert!(matches!(
		engine.roll("   ", RollType::Normal, Bias::None),
		Err(Error::InvalidFormat(parse::Error::Empty))
	));
}

#[test]
fn unrollable_dice() {
	let mut engine = RollEngine::new();
	assert!(matches!(
		engine.roll("1d101", RollType::Normal, Bias::None),
		Err(Error::Dice(dice::Error::InvalidDie(101)))
	));
	assert!(matches!(
		engine.roll("1d6+1d200", RollType::Normal, Bias::None),
		Err(Error::Dice(dice::Error::InvalidDie(200)))
	));
}

#[test]
fn huge_counts_are_rejected_before_drawing() {
	let mut engine = RollEngine::new();
	for input in ["4294967295d6", "2000000000d6", "4294967295d2"] {
		assert!(
			matches!(
				engine.roll(input, RollType::Normal, Bias::None),
				Err(Error::Dice(dice::Error::Overflow))
			),
			"{input}"
		);
	}

	// An empty draw sequence panics if anything is drawn at all
	for roll_type in [RollType::Normal, RollType::Advantage, RollType::Disadvantage] {
		assert!(matches!(
			engine_with(Vec::<u32>::new()).roll("4294967295d6", roll_type, Bias::Lucky),
			Err(Error::Dice(dice::Error::Overflow))
		));
	}

	// Groups that fit individually can still overflow together
	assert!(matches!(
		engine_with(Vec::<u32>::new()).roll("1d6+715827882d6", RollType::Normal, Bias::None),
		Err(Error::Dice(dice::Error::Overflow))
	));
}

#[test]
fn largest_fitting_total() {
	let outcome = engine_with(vec![100; 6])
		.roll("3d100+5", RollType::Advantage, Bias::None)
		.unwrap();
	assert_eq!(outcome.final_result, 305);
}

#[test]
fn limited_parser() {
	let mut engine = RollEngine::with_parts(ValRoller(1), NotationParser::with_limits(Limits::conservative()));
	assert_eq!(engine.parser().limits(), Limits::conservative());
	assert!(matches!(
		engine.roll("11d6", RollType::Normal, Bias::None),
		Err(Error::InvalidFormat(parse::Error::CountOutOfBounds { count: 11, max: 10 }))
	));
	assert!(engine.roll("10d6", RollType::Normal, Bias::None).is_ok());
}

#[test]
fn chat_summary() {
	let mut outcome = engine_with([3, 4, 5]).roll("3d6+2", RollType::Normal, Bias::None).unwrap();
	assert_eq!(outcome.chat_summary(), "🎲 3d6+2: 14\n[3, 4, 5] +2 ⚠️");
	outcome.is_secure = true;
	assert_eq!(outcome.chat_summary(), "🎲 3d6+2: 14\n[3, 4, 5] +2");

	let mut outcome = engine_with([3, 15, 19, 2, 17])
		.roll("1d20", RollType::Advantage, Bias::Lucky)
		.unwrap();
	outcome.is_secure = true;
	assert_eq!(outcome.chat_summary(), "🎲 1d20: 19 (Advantage) 🍀\nAdvantage: (15, 19) -> [19]");

	let mut outcome = engine_with([5, 2]).roll("1d6", RollType::Normal, Bias::Unlucky).unwrap();
	outcome.is_secure = true;
	assert_eq!(outcome.chat_summary(), "🎲 1d6: 2 💀\n[2]");
}

#[test]
fn security() {
	let engine = RollEngine::with_roller(SecureRoller::with_seed(7));
	assert!(!engine.is_secure());
	assert_eq!(engine.security_status(), "Warning: using less secure random number generation");

	let mut engine = RollEngine::new();
	let secure = engine.is_secure();
	let outcome = engine.roll("1d20", RollType::Normal, Bias::None).unwrap();
	assert_eq!(outcome.is_secure, secure);
	if secure {
		assert_eq!(engine.security_status(), "Using secure random number generation");
	}
}

#[test]
fn seeded_engines_agree() {
	let mut a = RollEngine::with_roller(SecureRoller::with_seed(99));
	let mut b = a.clone();
	for _ in 0..20 {
		assert_eq!(
			a.roll("2d10+1", RollType::Advantage, Bias::None).unwrap(),
			b.roll("2d10+1", RollType::Advantage, Bias::None).unwrap()
		);
	}
}

#[test]
fn roll_types() {
	assert_eq!(RollType::default(), RollType::Normal);
	assert_eq!("NORMAL".parse::<RollType>().unwrap(), RollType::Normal);
	assert_eq!(" advantage ".parse::<RollType>().unwrap(), RollType::Advantage);
	assert!(matches!("double".parse::<RollType>(), Err(Error::UnknownRollType(s)) if s == "double"));
	assert_eq!(RollType::Disadvantage.to_string(), "disadvantage");
	assert_eq!(RollType::Disadvantage.label(), "Disadvantage");
}

#[test]
fn supported_formats() {
	assert_eq!(RollEngine::supported_formats(), NotationParser::supported_formats());
	let mut engine = RollEngine::new();
	for format in RollEngine::supported_formats() {
		assert!(engine.roll(format, RollType::Normal, Bias::None).is_ok(), "{format}");
	}
}

#[test]
fn engines_are_thread_safe() {
	fn assert_send_sync<T: Send + Sync>() {}
	assert_send_sync::<RollEngine>();

	let engine = RollEngine::new();
	thread::scope(|scope| {
		for _ in 0..4 {
			let mut engine = engine.clone();
			scope.spawn(move || {
				for _ in 0..100 {
					let outcome = engine.roll("2d6+1", RollType::Normal, Bias::None).unwrap();
					assert!((3..=13).contains(&outcome.final_result));
				}
			});
		}
	});
}
