//! Timing properties of the keyer over whole messages

use morse_core::test_utils::KeyTrace;
use morse_core::*;
use proptest::prelude::*;
use rstest::rstest;

/// Keyed and unkeyed runs of `text`, in ticks
fn trace(text: &str, config: KeyerConfig) -> KeyTrace {
    let signals = KeyerSignals::new();
    let mut keyer: MorseKeyer<'_> = MorseKeyer::new(&signals, config);
    keyer.send(text).unwrap();

    let mut trace = KeyTrace::new();
    trace.run_until_idle(&mut keyer, 50_000_000);
    assert!(!keyer.busy(), "{text:?} did not complete");
    trace
}

/// Gaps that sit between two marks
fn inner_gaps(trace: &KeyTrace) -> Vec<u32> {
    let runs = trace.runs();
    let first = runs.iter().position(|run| run.keyed);
    let last = runs.iter().rposition(|run| run.keyed);
    match (first, last) {
        (Some(first), Some(last)) => runs[first..=last]
            .iter()
            .filter(|run| !run.keyed)
            .map(|run| run.ticks)
            .collect(),
        _ => Vec::new(),
    }
}

#[rstest]
#[case(20.0, 60)]
#[case(25.0, 48)]
#[case(12.0, 100)]
#[case(5.0, 240)]
#[case(0.5, 2400)]
#[case(1.5005, 799)]
#[case(1200.0, 1)]
fn test_unit_ticks(#[case] wpm: f32, #[case] ticks: u32) {
    assert_eq!(unit_ticks(wpm), Ok(ticks));
}

#[rstest]
#[case(0.0)]
#[case(-20.0)]
#[case(f32::NAN)]
#[case(f32::INFINITY)]
#[case(0.0001)]
#[case(1500.0)]
fn test_invalid_speeds(#[case] wpm: f32) {
    assert_eq!(unit_ticks(wpm), Err(KeyerError::InvalidSpeed));
    assert_eq!(KeyerConfig::new(wpm, Spacing::Standard), Err(KeyerError::InvalidSpeed));
}

#[rstest]
#[case("E", &[1])]
#[case("T", &[3])]
#[case("A", &[1, 3])]
#[case("N", &[3, 1])]
#[case("0", &[3, 3, 3, 3, 3])]
#[case("/", &[3, 1, 1, 3, 1])]
fn test_character_marks(#[case] text: &str, #[case] units: &[u32]) {
    const UNIT: u32 = 60;
    let config = KeyerConfig::new(20.0, Spacing::Standard).unwrap();

    let marks = trace(text, config).marks();
    let expected: Vec<u32> = units.iter().map(|units| units * UNIT).collect();
    assert_eq!(marks, expected);
}

#[test]
fn test_paris_is_fifty_units() {
    let config = KeyerConfig::new(20.0, Spacing::Standard).unwrap();
    let trace = trace("PARIS", config);

    let total: u32 = trace.runs().iter().map(|run| run.ticks).sum();
    assert_eq!(total, 50 * 60);
    assert_eq!(trace.marks().iter().sum::<u32>(), 22 * 60);
}

#[rstest]
#[case(Spacing::Standard, ".. / ..", &[60, 420, 60])]
#[case(Spacing::Legacy, ".. / ..", &[60, 660, 60])]
fn test_word_gap(#[case] spacing: Spacing, #[case] morse: &str, #[case] gaps: &[u32]) {
    let config = KeyerConfig::new(20.0, spacing).unwrap();
    let trace = trace("I I", config);

    assert_eq!(trace.to_morse_string(60), morse);
    assert_eq!(inner_gaps(&trace), gaps);
}

#[rstest]
#[case(1, 60_000)]
#[case(5, 300_000)]
#[case(30, 1_800_000)]
#[case(200, 1_800_000)]
fn test_repeat_delay_duration(#[case] minutes: u8, #[case] ticks: u32) {
    assert_eq!(message_delay_ticks(minutes), ticks);

    let config = KeyerConfig::new(20.0, Spacing::Standard)
        .unwrap()
        .with_repeat_delay(minutes);
    let trace = trace("E", config);
    assert_eq!(trace.total_space(), ticks);
}

proptest! {
    #[test]
    fn prop_unit_ticks_matches_formula(wpm in 0.01f32..1200.0) {
        let ticks = unit_ticks(wpm).unwrap();
        prop_assert!(ticks >= 1);
        prop_assert_eq!(ticks, (1_200_000.0 / (wpm * 1000.0)).floor() as u32);
    }

    #[test]
    fn prop_faster_is_never_longer(a in 1.0f32..100.0, b in 1.0f32..100.0) {
        let (slow, fast) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(unit_ticks(fast).unwrap() <= unit_ticks(slow).unwrap());
    }

    #[test]
    fn prop_marks_follow_table(text in "[A-Z0-9 ]{0,12}") {
        const UNIT: u32 = 60;
        let config = KeyerConfig::new(20.0, Spacing::Standard).unwrap();
        let trace = trace(&text, config);

        let expected: Vec<u32> = text
            .bytes()
            .filter_map(|byte| match lookup(byte) {
                Ok(Symbol::Code(stream)) => Some(stream),
                _ => None,
            })
            .flat_map(|stream| stream.map(|element| element.duration_units() * UNIT))
            .collect();
        prop_assert_eq!(trace.marks(), expected);

        for gap in inner_gaps(&trace) {
            prop_assert!(
                gap == UNIT || gap == 3 * UNIT || gap % (7 * UNIT) == 0,
                "unexpected gap of {} ticks in {:?}", gap, text
            );
        }
    }

    #[test]
    fn prop_unencodable_bytes_are_silent(text in "[#!@:;]{0,10}") {
        let config = KeyerConfig::new(20.0, Spacing::Standard).unwrap();
        let trace = trace(&text, config);
        prop_assert!(trace.marks().is_empty());
        prop_assert_eq!(trace.total_space(), 7 * 60);
    }
}
