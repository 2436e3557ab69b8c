//! Generational GA driver.
//!
//! # Algorithm
//!
//! 1. Create `population_size` individuals.
//! 2. Evaluate every individual; remember the best ever seen.
//! 3. Stop on a zero score, an exhausted generation budget, or cancellation.
//! 4. Copy the `elite_count` best individuals unchanged into the next
//!    generation, then fill it with mutated crossover children of
//!    tournament-selected parents. Go to 2.
//!
//! Elitism keeps only the elite subset, not necessarily the global optimum,
//! so the best-ever individual is tracked separately and returned.
//!
//! # Lifecycle
//!
//! `INIT` (population created) → `EVOLVING` (loop above) → `DONE`, with the
//! reason recorded as a [`Termination`]. Runs that cannot start fail before
//! reaching the runner (see [`crate::ScheduleError`]).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::operators::tournament_selection;

/// A member of a GA population. Lower fitness is better.
pub trait Individual: Clone {
    /// Current fitness.
    fn fitness(&self) -> u64;
    /// Stores an evaluated fitness.
    fn set_fitness(&mut self, fitness: u64);
}

/// Problem-specific GA hooks.
pub trait GaProblem {
    /// Population member type.
    type Individual: Individual;

    /// Creates a random individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Scores an individual (0 = optimal).
    fn evaluate(&self, individual: &Self::Individual) -> u64;

    /// Recombines two parents into two children.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        rng: &mut R,
    ) -> (Self::Individual, Self::Individual);

    /// Mutates an individual in place.
    fn mutate<R: Rng>(&self, individual: &mut Self::Individual, rng: &mut R);
}

/// GA parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generation budget.
    pub max_generations: usize,
    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Individuals drawn per tournament.
    pub tournament_size: usize,
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    /// Probability a crossover child keeps its own parent's gene.
    pub crossover_bias: f64,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 60,
            max_generations: 150,
            elite_count: 8,
            tournament_size: 5,
            mutation_rate: 0.2,
            crossover_bias: 0.5,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Sets the per-gene mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the crossover bias.
    pub fn with_crossover_bias(mut self, bias: f64) -> Self {
        self.crossover_bias = bias;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Cooperative cancellation for long searches.
///
/// Polled once per generation. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Creates a token that only cancels when [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also cancels once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Also cancels `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested or the deadline passed.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// An individual reached fitness 0.
    PerfectScore,
    /// The generation budget ran out.
    GenerationLimit,
    /// The caller cancelled or the deadline passed.
    Cancelled,
}

/// Outcome of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult<I> {
    /// Best individual seen in any generation.
    pub best: I,
    /// Its fitness.
    pub best_fitness: u64,
    /// Generations evaluated (the initial population counts as one).
    pub generations: usize,
    /// Best-ever fitness after each generation.
    pub history: Vec<u64>,
    /// Why the run stopped.
    pub termination: Termination,
}

/// Runs a [`GaProblem`] to completion.
pub struct GaRunner;

impl GaRunner {
    /// Runs with an RNG seeded from `config.seed` and no cancellation.
    ///
    /// The config is not validated here; probabilities are the problem's
    /// concern (see [`crate::validation::validate_config`] for the checks the
    /// scheduler applies).
    pub fn run<P: GaProblem>(problem: &P, config: &GaConfig) -> GaResult<P::Individual> {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self::run_with(problem, config, &mut rng, &CancelToken::new())
    }

    /// Runs with an explicit RNG and cancellation token.
    ///
    /// The initial population is always evaluated, so a result exists even
    /// when cancelled immediately.
    pub fn run_with<P: GaProblem, R: Rng>(
        problem: &P,
        config: &GaConfig,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> GaResult<P::Individual> {
        let size = config.population_size.max(1);
        let elites = config.elite_count.min(size);

        let mut population: Vec<P::Individual> =
            (0..size).map(|_| problem.create_individual(rng)).collect();
        evaluate_all(problem, &mut population);

        let mut best = population[best_index(&population)].clone();
        let mut history = vec![best.fitness()];
        let mut generations = 1;
        debug!(generation = 1, fitness = best.fitness(), "initial best");

        let termination = loop {
            if best.fitness() == 0 {
                break Termination::PerfectScore;
            }
            if generations >= config.max_generations {
                break Termination::GenerationLimit;
            }
            if cancel.is_cancelled() {
                warn!(generations, fitness = best.fitness(), "search cancelled");
                break Termination::Cancelled;
            }

            population = next_generation(problem, config, &population, size, elites, rng);
            evaluate_all(problem, &mut population);
            generations += 1;

            let current = &population[best_index(&population)];
            if current.fitness() < best.fitness() {
                best = current.clone();
                debug!(generation = generations, fitness = best.fitness(), "new best");
            }
            history.push(best.fitness());
        };

        GaResult {
            best_fitness: best.fitness(),
            best,
            generations,
            history,
            termination,
        }
    }
}

fn evaluate_all<P: GaProblem>(problem: &P, population: &mut [P::Individual]) {
    for individual in population.iter_mut() {
        let fitness = problem.evaluate(individual);
        individual.set_fitness(fitness);
    }
}

/// Index of the lowest-fitness individual (first on ties).
fn best_index<I: Individual>(population: &[I]) -> usize {
    population
        .iter()
        .enumerate()
        .min_by_key(|(_, ind)| ind.fitness())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_generation<P: GaProblem, R: Rng>(
    problem: &P,
    config: &GaConfig,
    population: &[P::Individual],
    size: usize,
    elites: usize,
    rng: &mut R,
) -> Vec<P::Individual> {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by_key(|&i| population[i].fitness());

    let mut next: Vec<P::Individual> = order
        .iter()
        .take(elites)
        .map(|&i| population[i].clone())
        .collect();

    while next.len() < size {
        let parent1 = tournament_selection(population, config.tournament_size, rng);
        let parent2 = tournament_selection(population, config.tournament_size, rng);
        let (mut child1, mut child2) = problem.crossover(&parent1, &parent2, rng);

        problem.mutate(&mut child1, rng);
        next.push(child1);
        if next.len() < size {
            problem.mutate(&mut child2, rng);
            next.push(child2);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimize the number of set bits in a 16-bit word.
    struct OnesProblem;

    #[derive(Debug, Clone, PartialEq)]
    struct Bits {
        word: u16,
        fitness: u64,
    }

    impl Individual for Bits {
        fn fitness(&self) -> u64 {
            self.fitness
        }
        fn set_fitness(&mut self, fitness: u64) {
            self.fitness = fitness;
        }
    }

    impl GaProblem for OnesProblem {
        type Individual = Bits;

        fn create_individual<R: Rng>(&self, rng: &mut R) -> Bits {
            Bits {
                word: rng.random(),
                fitness: u64::MAX,
            }
        }

        fn evaluate(&self, individual: &Bits) -> u64 {
            individual.word.count_ones() as u64
        }

        fn crossover<R: Rng>(&self, p1: &Bits, p2: &Bits, rng: &mut R) -> (Bits, Bits) {
            let mask: u16 = rng.random();
            let a = (p1.word & mask) | (p2.word & !mask);
            let b = (p2.word & mask) | (p1.word & !mask);
            (
                Bits { word: a, fitness: u64::MAX },
                Bits { word: b, fitness: u64::MAX },
            )
        }

        fn mutate<R: Rng>(&self, individual: &mut Bits, rng: &mut R) {
            individual.word ^= 1 << rng.random_range(0..16);
        }
    }

    fn config() -> GaConfig {
        GaConfig::default()
            .with_population_size(20)
            .with_max_generations(200)
            .with_elite_count(2)
            .with_seed(42)
    }

    #[test]
    fn test_default_config() {
        let c = GaConfig::default();
        assert_eq!(c.population_size, 60);
        assert_eq!(c.max_generations, 150);
        assert_eq!(c.elite_count, 8);
        assert_eq!(c.tournament_size, 5);
        assert!((c.mutation_rate - 0.2).abs() < 1e-12);
        assert_eq!(c.seed, None);
    }

    #[test]
    fn test_runner_reaches_optimum() {
        let result = GaRunner::run(&OnesProblem, &config());
        assert_eq!(result.best_fitness, 0);
        assert_eq!(result.termination, Termination::PerfectScore);
        assert_eq!(result.history.len(), result.generations);
    }

    #[test]
    fn test_history_never_increases() {
        let result = GaRunner::run(&OnesProblem, &config());
        for pair in result.history.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn test_generation_limit() {
        let cfg = config().with_max_generations(1);
        let result = GaRunner::run(&OnesProblem, &cfg);
        assert_eq!(result.generations, 1);
        if result.best_fitness > 0 {
            assert_eq!(result.termination, Termination::GenerationLimit);
        }
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let a = GaRunner::run(&OnesProblem, &config().with_max_generations(5));
        let b = GaRunner::run(&OnesProblem, &config().with_max_generations(5));
        assert_eq!(a.best, b.best);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_cancel_returns_best_so_far() {
        let token = CancelToken::new();
        token.cancel();
        let mut rng = SmallRng::seed_from_u64(3);
        // Population of words with at least one bit set: never perfect at start.
        let cfg = config().with_population_size(4).with_elite_count(1);
        let result = GaRunner::run_with(&OnesProblem, &cfg, &mut rng, &token);
        assert_eq!(result.generations, 1);
        if result.best_fitness > 0 {
            assert_eq!(result.termination, Termination::Cancelled);
        }
        assert_eq!(result.best.fitness, result.best_fitness);
    }

    fn bits(fitnesses: &[u64]) -> Vec<Bits> {
        fitnesses
            .iter()
            .enumerate()
            .map(|(i, &fitness)| Bits {
                word: i as u16,
                fitness,
            })
            .collect()
    }

    #[test]
    fn test_next_generation_keeps_elites_in_order() {
        let population = bits(&[5, 1, 3, 1, 4, 0, 2]);
        let cfg = config();
        let mut rng = SmallRng::seed_from_u64(42);

        // 6 - 3 = 3 bred slots: the last pair contributes one child.
        let next = next_generation(&OnesProblem, &cfg, &population, 6, 3, &mut rng);
        assert_eq!(next.len(), 6);
        // Lowest fitness first; ties keep population order.
        assert_eq!(next[0], population[5]);
        assert_eq!(next[1], population[1]);
        assert_eq!(next[2], population[3]);
    }

    #[test]
    fn test_next_generation_fills_population() {
        let population = bits(&[9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        let cfg = config();
        let mut rng = SmallRng::seed_from_u64(7);

        for elites in 0..=4 {
            let next = next_generation(&OnesProblem, &cfg, &population, 10, elites, &mut rng);
            assert_eq!(next.len(), 10, "elites = {elites}");
            let expected: Vec<Bits> = population.iter().rev().take(elites).cloned().collect();
            assert_eq!(&next[..elites], expected.as_slice());
        }
    }

    #[test]
    fn test_deadline_cancels() {
        let token = CancelToken::new().with_deadline(Instant::now());
        assert!(token.is_cancelled());
        let token = CancelToken::new().with_timeout(Duration::from_secs(3600));
        assert!(!token.is_cancelled());
        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
    }
}
