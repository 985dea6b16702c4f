use rand::Rng;
use rand_distr::{Beta, Distribution, Normal, Uniform};

use crate::domain::parameters::EntryAgeDistribution;

/// Remaining quota below which a selection stops touching candidates.
const SELECTION_EPSILON: f64 = 1e-12;

/// Discrete selections whose expected-value rounding remainder is carried
/// from one year to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    AtzEnrollment,
    VacancyFill,
}

/// Source of every uncertain outcome in a simulated year.
///
/// The deterministic projection plugs in [`ExpectedValueDraws`]; each
/// Monte-Carlo trial plugs in its own [`RandomDraws`].
pub trait TransitionDraws {
    /// Part of `weight` for which an event with `probability` happens.
    fn share(&mut self, weight: f64, probability: f64) -> f64;

    /// Picks weight out of caller-ordered candidate weights at `rate`.
    /// Returns `(candidate index, weight taken)` for every candidate touched.
    fn select(&mut self, selection: Selection, candidates: &[f64], rate: f64) -> Vec<(usize, f64)>;

    fn entry_age(&mut self, distribution: &EntryAgeDistribution) -> f64;

    /// Whether hires should be merged into one record per org unit.
    fn consolidates_hires(&self) -> bool;
}

/// Expected values only; never touches a random number generator.
#[derive(Debug, Default)]
pub struct ExpectedValueDraws {
    atz_carry: f64,
    vacancy_carry: f64,
}

impl ExpectedValueDraws {
    pub fn new() -> Self {
        Self::default()
    }

    fn carry_mut(&mut self, selection: Selection) -> &mut f64 {
        match selection {
            Selection::AtzEnrollment => &mut self.atz_carry,
            Selection::VacancyFill => &mut self.vacancy_carry,
        }
    }
}

impl TransitionDraws for ExpectedValueDraws {
    fn share(&mut self, weight: f64, probability: f64) -> f64 {
        weight * probability
    }

    /// Takes `round(headcount * rate + carry)` from the leading candidates,
    /// splitting the last one when it holds more than the quota needs.
    fn select(&mut self, selection: Selection, candidates: &[f64], rate: f64) -> Vec<(usize, f64)> {
        let available: f64 = candidates.iter().sum();
        let carry = self.carry_mut(selection);
        let expected = available * rate + *carry;
        let mut remaining = expected.round().clamp(0.0, available);
        *carry = expected - remaining;

        let mut picks = Vec::new();
        for (idx, weight) in candidates.iter().enumerate() {
            if remaining <= SELECTION_EPSILON {
                break;
            }
            let taken = weight.min(remaining);
            if taken > 0.0 {
                picks.push((idx, taken));
                remaining -= taken;
            }
        }
        picks
    }

    fn entry_age(&mut self, distribution: &EntryAgeDistribution) -> f64 {
        distribution.mean()
    }

    fn consolidates_hires(&self) -> bool {
        true
    }
}

/// Independent Bernoulli draws from a caller-owned random stream.
pub struct RandomDraws<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomDraws<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn happens(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }
}

impl<R: Rng> TransitionDraws for RandomDraws<R> {
    fn share(&mut self, weight: f64, probability: f64) -> f64 {
        if self.happens(probability) { weight } else { 0.0 }
    }

    fn select(&mut self, _selection: Selection, candidates: &[f64], rate: f64) -> Vec<(usize, f64)> {
        candidates
            .iter()
            .copied()
            .enumerate()
            .filter(|_| self.happens(rate))
            .collect()
    }

    fn entry_age(&mut self, distribution: &EntryAgeDistribution) -> f64 {
        sample_entry_age(distribution, &mut self.rng)
    }

    fn consolidates_hires(&self) -> bool {
        false
    }
}

fn sample_entry_age<R: Rng + ?Sized>(distribution: &EntryAgeDistribution, rng: &mut R) -> f64 {
    match *distribution {
        EntryAgeDistribution::Fixed { age } => age,
        EntryAgeDistribution::Uniform { min, max } => Uniform::new_inclusive(min, max).sample(rng),
        EntryAgeDistribution::Normal {
            mean,
            std_dev,
            min,
            max,
        } => Normal::new(mean, std_dev)
            .map(|normal| normal.sample(rng))
            .unwrap_or(mean)
            .clamp(min, max),
        EntryAgeDistribution::Pert { min, mode, max } => {
            beta_pert_sample(min, mode, max, rng).unwrap_or_else(|| distribution.mean())
        }
    }
}

fn beta_pert_sample<R: Rng + ?Sized>(
    optimistic: f64,
    most_likely: f64,
    pessimistic: f64,
    rng: &mut R,
) -> Option<f64> {
    if pessimistic < optimistic {
        return None;
    }
    if (pessimistic - optimistic).abs() < f64::EPSILON {
        return Some(optimistic);
    }
    if most_likely < optimistic || most_likely > pessimistic {
        return None;
    }

    let range = pessimistic - optimistic;
    let alpha = 1.0 + 4.0 * ((most_likely - optimistic) / range);
    let beta = 1.0 + 4.0 * ((pessimistic - most_likely) / range);
    let beta_dist = Beta::new(alpha, beta).ok()?;
    let sample = beta_dist.sample(rng);
    Some(optimistic + sample * range)
}
