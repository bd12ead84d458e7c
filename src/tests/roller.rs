use crate::dice::{
	roller::{uniform_int, Iter as IterRoller, Max as MaxRoller, Roller, Secure as SecureRoller, Val as ValRoller},
	stats::Distribution,
	Bias, Dice, Error,
};

/// Feeds `uniform_int()` from a fixed list of bytes, returning the value and the number of bytes consumed.
fn draw_from_bytes(max: u32, bytes: &[u8]) -> Result<(u32, usize), Error> {
	let mut iter = bytes.iter().copied();
	let mut consumed = 0;
	let val = uniform_int(max, |buf| {
		for byte in buf.iter_mut() {
			*byte = iter.next().expect("ran out of bytes");
			consumed += 1;
		}
		Ok(())
	})?;
	Ok((val, consumed))
}

#[test]
fn rejects_bytes_past_largest_multiple() {
	// 252 is the largest multiple of 6 within a byte
	assert_eq!(draw_from_bytes(6, &[255, 252, 251]).unwrap(), (6, 3));
	assert_eq!(draw_from_bytes(6, &[0]).unwrap(), (1, 1));
	assert_eq!(draw_from_bytes(6, &[5]).unwrap(), (6, 1));

	// 200 is the largest multiple of 100 within a byte
	assert_eq!(draw_from_bytes(100, &[200, 255, 199]).unwrap(), (100, 3));
}

#[test]
fn accepts_every_byte_for_powers_of_two() {
	for max in [2, 4, 8, 16, 32, 64, 128, 256] {
		for byte in 0..=u8::MAX {
			let (val, consumed) = draw_from_bytes(max, &[byte]).unwrap();
			assert_eq!(consumed, 1);
			assert_eq!(val, u32::from(byte) % max + 1);
		}
	}
}

#[test]
fn single_value_needs_no_bytes() {
	assert_eq!(draw_from_bytes(1, &[]).unwrap(), (1, 0));
}

#[test]
fn every_byte_maps_evenly_onto_faces() {
	// Over all 256 possible bytes, each accepted face must appear equally often for the draw to be unbiased
	for max in 1..=256 {
		let mut counts = vec![0_u32; max as usize];
		for byte in 0..=u8::MAX {
			let mut fed = false;
			let result = uniform_int(max, |buf| {
				if fed {
					return Err(Error::Overflow);
				}
				fed = true;
				buf.iter_mut().for_each(|b| *b = byte);
				Ok(())
			});

			match result {
				Ok(val) => counts[(val - 1) as usize] += 1,
				Err(Error::Overflow) => {}
				Err(err) => panic!("unexpected error: {err}"),
			}
		}

		let expected = 256 / max;
		assert!(counts.iter().all(|count| *count == expected), "max {max}: {counts:?}");
	}
}

#[test]
fn out_of_range_max() {
	let mut roller = SecureRoller::new();
	assert!(matches!(roller.random_int(0), Err(Error::OutOfRange(0))));
	assert!(matches!(roller.random_int(257), Err(Error::OutOfRange(257))));
	assert!(matches!(MaxRoller.random_int(300), Err(Error::OutOfRange(300))));
}

#[test]
fn full_byte_range() {
	let mut roller = SecureRoller::new();
	for _ in 0..1000 {
		let val = roller.random_int(256).unwrap();
		assert!((1..=256).contains(&val));
	}
	assert_eq!(roller.random_int(1).unwrap(), 1);
}

#[test]
fn d6_distribution_is_uniform() {
	let dist = Distribution::sample(&mut SecureRoller::new(), 6, 12_000).unwrap();
	assert_eq!(dist.counts.len(), 6);
	assert!((dist.expected - 2000.0).abs() < f64::EPSILON);
	assert!(dist.max_relative_deviation() < 0.1, "{dist:?}");
}

#[test]
fn d20_fallback_distribution_is_uniform() {
	let dist = Distribution::sample(&mut SecureRoller::with_seed(0x5eed), 20, 20_000).unwrap();
	assert_eq!(dist.counts.iter().sum::<u32>(), 20_000);
	assert!(dist.max_relative_deviation() < 0.15, "{dist:?}");
}

#[test]
fn small_sample_within_reference_tolerance() {
	let dist = Distribution::sample(&mut SecureRoller::new(), 6, 600).unwrap();
	assert!((dist.expected - 100.0).abs() < f64::EPSILON);
	assert_eq!(dist.deviations.len(), 6);
	assert!(dist.counts.iter().all(|count| (50..=150).contains(count)), "{dist:?}");
}

#[test]
fn seeded_rollers_are_reproducible() {
	let dice = Dice::new(10, 20);
	let a = SecureRoller::with_seed(42).roll(&dice, Bias::None).unwrap();
	let b = SecureRoller::with_seed(42).roll(&dice, Bias::None).unwrap();
	assert_eq!(a, b);
}

#[test]
fn security_flags() {
	assert!(!SecureRoller::insecure().is_secure());
	assert!(!SecureRoller::with_seed(1).is_secure());
	assert!(!ValRoller(1).is_secure());
	assert!(!MaxRoller.is_secure());
	assert!(!IterRoller::new([1]).is_secure());

	// The flag is decided once and stays put
	let mut roller = SecureRoller::new();
	let secure = roller.is_secure();
	let _ = roller.roll(&Dice::new(5, 6), Bias::None).unwrap();
	assert_eq!(roller.is_secure(), secure);
}

#[test]
fn max_roller_rolls_max() {
	let rolled = MaxRoller.roll(&Dice::new(3, 12), Bias::None).unwrap();
	assert_eq!(rolled.rolls, vec![12, 12, 12]);
}

#[test]
fn iter_roller_reports_remaining() {
	let mut roller = IterRoller::new([2, 3]);
	assert!(roller.can_roll());
	let _ = roller.roll(&Dice::new(2, 4), Bias::None).unwrap();
	assert!(!roller.can_roll());
}

#[test]
fn oversized_rolls_fail_before_drawing() {
	// An empty draw sequence panics if anything is drawn at all
	let mut roller = IterRoller::new(Vec::<u32>::new());
	assert!(matches!(roller.roll_multiple(u32::MAX, 6, Bias::None), Err(Error::Overflow)));
	assert!(matches!(roller.roll(&Dice::new(2_000_000_000, 6), Bias::None), Err(Error::Overflow)));
	assert!(matches!(roller.roll_multiple(u32::MAX, 101, Bias::None), Err(Error::InvalidDie(101))));
	assert!(matches!(roller.roll_multiple(0, 6, Bias::None), Err(Error::InvalidCount)));
}
