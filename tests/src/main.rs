// Beacon simulation on the host: sends a message through the keyer and
// prints the resulting keying timeline

use morse_core::test_utils::KeyTrace;
use morse_core::*;

const MESSAGES: &[(&str, f32, Spacing)] = &[
    ("CQ DE N0CALL", 20.0, Spacing::Standard),
    ("PARIS", 20.0, Spacing::Standard),
    ("SOS", 12.0, Spacing::Legacy),
];

fn main() {
    println!("Rusty Morse beacon simulation (1 tick = {TICK_PERIOD_MS} ms)");
    println!();

    for &(text, wpm, spacing) in MESSAGES {
        if let Err(error) = simulate(text, wpm, spacing) {
            eprintln!("{text:?}: {error}");
        }
    }
}

fn simulate(text: &str, wpm: f32, spacing: Spacing) -> Result<(), KeyerError> {
    let signals = KeyerSignals::new();
    let config = KeyerConfig::new(wpm, spacing)?;
    let mut keyer: MorseKeyer<'_> = MorseKeyer::new(&signals, config);
    keyer.send(text)?;

    let mut trace = KeyTrace::new();
    let ticks = trace.run_until_idle(&mut keyer, 10_000_000);
    let unit = keyer.unit_ticks();

    println!("{text:?} at {wpm} WPM ({spacing:?} spacing, unit {unit} ticks)");
    println!("  {}", trace.to_morse_string(unit));
    println!("  {} ms total, keyed {} ms", ticks, trace.marks().iter().sum::<u32>());

    let timeline: String = trace
        .runs()
        .iter()
        .map(|run| {
            let symbol = if run.keyed { '#' } else { '_' };
            let width = (run.ticks / unit).max(1) as usize;
            std::iter::repeat(symbol).take(width).collect::<String>()
        })
        .collect();
    println!("  {timeline}");
    println!();

    Ok(())
}
