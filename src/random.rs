//! Random but legal parameter values, used for scene defaults.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::types::{Brightness, Hue, LightId, Range, Seconds};

/// Uniform integer in `min..=max`.
pub fn integer(min: u32, max: u32) -> u32 {
    rand::thread_rng().gen_range(min..=max)
}

/// Uniform time span in `min..=max` seconds at 0.1 s resolution.
pub fn seconds(min: f64, max: f64) -> Seconds {
    let (low, high) = ((min * 10.0).round() as u32, (max * 10.0).round() as u32);
    let ticks = rand::thread_rng().gen_range(low..=high);
    Seconds::create(f64::from(ticks) / 10.0).unwrap_or_default()
}

pub fn hue() -> Hue {
    Hue::new(rand::thread_rng().gen_range(Hue::MIN..=Hue::MAX))
}

pub fn hue_between(range: Range<Hue>) -> Hue {
    Hue::new(rand::thread_rng().gen_range(range.min().value()..=range.max().value()))
}

pub fn brightness(min: u8, max: u8) -> Brightness {
    let value = rand::thread_rng().gen_range(min..=max);
    Brightness::create(value).unwrap_or_default()
}

pub fn brightness_between(range: Range<Brightness>) -> Brightness {
    brightness(range.min().value(), range.max().value())
}

pub fn seconds_between(range: Range<Seconds>) -> Seconds {
    seconds(range.min().value(), range.max().value())
}

/// `(lower, upper)` from the two draws,
/// redrawn until `upper` is strictly greater.
fn ordered<T: PartialOrd>(
    mut draw_low: impl FnMut() -> T,
    mut draw_high: impl FnMut() -> T,
) -> (T, T) {
    loop {
        let lower = draw_low();
        let upper = draw_high();
        if lower < upper {
            return (lower, upper);
        }
    }
}

pub fn brightness_range() -> Range<Brightness> {
    let (min, max) = ordered(|| brightness(1, 100), || brightness(100, 254));
    Range::from_ordered(min, max)
}

pub fn hue_range() -> Range<Hue> {
    let (min, max) = ordered(
        || Hue::new(integer(0, 32766) as u16),
        || Hue::new(integer(32767, 65535) as u16),
    );
    Range::from_ordered(min, max)
}

pub fn time_range() -> Range<Seconds> {
    let (min, max) = ordered(|| seconds(1.0, 4.0), || seconds(4.0, 8.0));
    Range::from_ordered(min, max)
}

pub fn hue_sequence(len: usize) -> Vec<Hue> {
    (0..len).map(|_| hue()).collect()
}

pub fn shuffle<T>(items: &mut [T]) {
    items.shuffle(&mut rand::thread_rng());
}

/// Shuffled split into two halves, the odd one out going to the second.
pub fn split_lights(light_ids: &[LightId]) -> (Vec<LightId>, Vec<LightId>) {
    let mut light_ids = light_ids.to_vec();
    shuffle(&mut light_ids);
    let second = light_ids.split_off(light_ids.len() / 2);
    (light_ids, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_legal() {
        for _ in 0..200 {
            let range = brightness_range();
            assert!(range.min() < range.max());
            assert!((1..=100).contains(&range.min().value()));

            let range = hue_range();
            assert!(range.min().value() <= 32766);
            assert!(range.max().value() >= 32767);

            let range = time_range();
            assert!(range.min() < range.max());
            assert!(range.min().value() >= 1.0 && range.max().value() <= 8.0);

            let span = seconds(1.0, 3.0).value();
            assert!((1.0..=3.0).contains(&span));
            assert!(((span * 10.0).round() - span * 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_split_lights() {
        let ids: Vec<LightId> = (1..=5).filter_map(LightId::create).collect();
        let (first, second) = split_lights(&ids);
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 3);

        let mut all: Vec<LightId> = first.into_iter().chain(second).collect();
        all.sort();
        assert_eq!(all, ids);
    }
}
