//! Configurable genetic operators for exam timetables.
//!
//! Provides tournament selection and the per-gene mutation dispatcher
//! via [`GeneticOperators`].
//!
//! # Usage
//!
//! ```
//! use u_examsched::ga::operators::{GeneticOperators, MutationKind};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.mutation_rate, 0.2);
//! assert_eq!(ops.kinds, MutationKind::ALL.to_vec());
//! ```

use rand::Rng;
use rand::prelude::IndexedRandom;

use super::chromosome::{
    ExamChromosome, UNEVALUATED, date_mutation, proctor_mutation, room_mutation, time_mutation,
    uniform_crossover, unit_probability,
};
use super::runner::Individual;
use crate::snapshot::Snapshot;

/// What a triggered gene mutation changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// New date; every proctor re-drawn for it.
    Date,
    /// New start time.
    Time,
    /// New room for one section.
    Room,
    /// New proctor for one section.
    Proctor,
}

impl MutationKind {
    /// All kinds, drawn uniformly when a gene mutates.
    pub const ALL: [MutationKind; 4] = [Self::Date, Self::Time, Self::Room, Self::Proctor];
}

/// Tournament selection.
///
/// Draws `size` individuals uniformly with replacement and returns an owned
/// copy of the fittest (first drawn wins ties). The copy never aliases the
/// population.
pub fn tournament_selection<I: Individual, R: Rng>(population: &[I], size: usize, rng: &mut R) -> I {
    let mut best = rng.random_range(0..population.len());
    for _ in 1..size.max(1) {
        let contestant = rng.random_range(0..population.len());
        if population[contestant].fitness() < population[best].fitness() {
            best = contestant;
        }
    }
    population[best].clone()
}

/// Crossover and mutation settings for exam chromosomes.
///
/// # Example
///
/// ```
/// use u_examsched::ga::operators::{GeneticOperators, MutationKind};
///
/// let ops = GeneticOperators {
///     mutation_rate: 0.1,
///     crossover_bias: 0.5,
///     kinds: vec![MutationKind::Time, MutationKind::Room],
/// };
/// ```
#[derive(Debug, Clone)]
pub struct GeneticOperators {
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    /// Probability a child keeps its own parent's gene at a position.
    pub crossover_bias: f64,
    /// Mutation kinds drawn from when a gene mutates.
    pub kinds: Vec<MutationKind>,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            mutation_rate: 0.2,
            crossover_bias: 0.5,
            kinds: MutationKind::ALL.to_vec(),
        }
    }
}

impl GeneticOperators {
    /// Uniform per-gene crossover.
    pub fn crossover<R: Rng>(
        &self,
        p1: &ExamChromosome,
        p2: &ExamChromosome,
        rng: &mut R,
    ) -> (ExamChromosome, ExamChromosome) {
        uniform_crossover(p1, p2, self.crossover_bias, rng)
    }

    /// Mutates each gene independently with probability `mutation_rate`.
    ///
    /// Resets the chromosome's fitness when any gene changed. A rate outside
    /// `[0, 1]` is clamped.
    pub fn mutate<R: Rng>(&self, chromosome: &mut ExamChromosome, snapshot: &Snapshot, rng: &mut R) {
        let rate = unit_probability(self.mutation_rate);
        let mut touched = false;
        for (gene, course) in chromosome.genes.iter_mut().zip(&snapshot.courses) {
            if !rng.random_bool(rate) {
                continue;
            }
            let Some(kind) = self.kinds.choose(rng) else {
                continue;
            };
            match kind {
                MutationKind::Date => date_mutation(gene, snapshot, rng),
                MutationKind::Time => time_mutation(gene, snapshot, rng),
                MutationKind::Room => room_mutation(gene, course, snapshot, rng),
                MutationKind::Proctor => proctor_mutation(gene, snapshot, rng),
            }
            touched = true;
        }
        if touched {
            chromosome.set_fitness(UNEVALUATED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::chromosome::tests::sample_snapshot;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_default_operators() {
        let ops = GeneticOperators::default();
        assert!((ops.mutation_rate - 0.2).abs() < 1e-12);
        assert!((ops.crossover_bias - 0.5).abs() < 1e-12);
        assert_eq!(ops.kinds.len(), 4);
    }

    #[test]
    fn test_tournament_picks_fittest_of_full_sample() {
        let snap = sample_snapshot();
        let mut rng = SmallRng::seed_from_u64(42);
        let population: Vec<ExamChromosome> = (0..5)
            .map(|i| {
                let mut ch = ExamChromosome::random(&snap, &mut rng);
                ch.fitness = 100 - i;
                ch
            })
            .collect();

        // A huge tournament samples everyone with overwhelming probability.
        let winner = tournament_selection(&population, 200, &mut rng);
        assert_eq!(winner.fitness, 96);
        assert_eq!(winner, population[4]);
    }

    #[test]
    fn test_tournament_returns_independent_copy() {
        let snap = sample_snapshot();
        let mut rng = SmallRng::seed_from_u64(42);
        let population = vec![ExamChromosome::random(&snap, &mut rng)];
        let before = population.clone();

        let mut selected = tournament_selection(&population, 5, &mut rng);
        selected.genes[0].rooms.fill(None);
        assert_eq!(population, before);
    }

    #[test]
    fn test_crossover() {
        let snap = sample_snapshot();
        let ops = GeneticOperators::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let p1 = ExamChromosome::random(&snap, &mut rng);
        let p2 = ExamChromosome::random(&snap, &mut rng);

        let (c1, c2) = ops.crossover(&p1, &p2, &mut rng);
        assert!(c1.is_valid(&snap));
        assert!(c2.is_valid(&snap));
    }

    #[test]
    fn test_zero_rate_never_mutates() {
        let snap = sample_snapshot();
        let ops = GeneticOperators {
            mutation_rate: 0.0,
            ..GeneticOperators::default()
        };
        let mut rng = SmallRng::seed_from_u64(42);
        let mut ch = ExamChromosome::random(&snap, &mut rng);
        ch.fitness = 10;
        let before = ch.clone();

        for _ in 0..50 {
            ops.mutate(&mut ch, &snap, &mut rng);
        }
        assert_eq!(ch, before);
    }

    #[test]
    fn test_full_rate_mutation_keeps_shape() {
        let snap = sample_snapshot();
        let ops = GeneticOperators {
            mutation_rate: 1.0,
            ..GeneticOperators::default()
        };
        let mut rng = SmallRng::seed_from_u64(42);
        let mut ch = ExamChromosome::random(&snap, &mut rng);
        ch.fitness = 10;

        ops.mutate(&mut ch, &snap, &mut rng);
        assert_eq!(ch.fitness, UNEVALUATED);
        assert!(ch.is_valid(&snap));
    }

    #[test]
    fn test_time_only_mutation() {
        let snap = sample_snapshot();
        let ops = GeneticOperators {
            mutation_rate: 1.0,
            crossover_bias: 0.5,
            kinds: vec![MutationKind::Time],
        };
        let mut rng = SmallRng::seed_from_u64(42);
        let ch = ExamChromosome::random(&snap, &mut rng);

        let mut changed = false;
        for _ in 0..20 {
            let mut m = ch.clone();
            ops.mutate(&mut m, &snap, &mut rng);
            for (a, b) in m.genes.iter().zip(&ch.genes) {
                assert_eq!(a.date, b.date);
                assert_eq!(a.rooms, b.rooms);
                assert_eq!(a.proctors, b.proctors);
                changed |= a.start != b.start;
            }
        }
        assert!(changed, "time mutation should move at least one start time");
    }

    #[test]
    fn test_out_of_range_probabilities_are_clamped() {
        let snap = sample_snapshot();
        let ops = GeneticOperators {
            mutation_rate: 1.5,
            crossover_bias: -0.1,
            kinds: MutationKind::ALL.to_vec(),
        };
        let mut rng = SmallRng::seed_from_u64(42);
        let p1 = ExamChromosome::random(&snap, &mut rng);
        let p2 = ExamChromosome::random(&snap, &mut rng);

        // Bias below 0 behaves as 0: every position swaps.
        let (c1, c2) = ops.crossover(&p1, &p2, &mut rng);
        assert_eq!(c1.genes, p2.genes);
        assert_eq!(c2.genes, p1.genes);

        // Rate above 1 behaves as 1: every gene mutates.
        let mut m = p1.clone();
        m.fitness = 10;
        ops.mutate(&mut m, &snap, &mut rng);
        assert_eq!(m.fitness, UNEVALUATED);

        let nan = GeneticOperators {
            mutation_rate: f64::NAN,
            ..GeneticOperators::default()
        };
        let mut n = p1.clone();
        nan.mutate(&mut n, &snap, &mut rng);
        assert_eq!(n, p1);
    }
}
