//! Exam timetabling GA problem definition.
//!
//! Implements [`GaProblem`] for [`ExamChromosome`], bridging the run's
//! [`Snapshot`] and [`PenaltyWeights`] to the generic runner.

use rand::Rng;

use super::chromosome::{ExamChromosome, unit_probability};
use super::fitness::{FitnessBreakdown, PenaltyWeights, breakdown, evaluate};
use super::operators::GeneticOperators;
use super::runner::{GaConfig, GaProblem};
use crate::snapshot::Snapshot;

/// GA problem for one scheduling run.
///
/// # Example
/// ```no_run
/// use u_examsched::ga::{ExamGaProblem, GaConfig, GaRunner, PenaltyWeights};
/// use u_examsched::models::RunParameters;
/// use u_examsched::snapshot::{ReferenceData, Snapshot};
///
/// let data = ReferenceData::default(); // supplied by collaborators
/// let params = RunParameters::default();
/// let snapshot = Snapshot::load(&data, &params).unwrap();
/// let problem = ExamGaProblem::new(&snapshot, PenaltyWeights::default());
/// let result = GaRunner::run(&problem, &GaConfig::default().with_seed(42));
/// println!("best penalty: {}", result.best_fitness);
/// ```
pub struct ExamGaProblem<'a> {
    /// Run-scoped lookup tables.
    pub snapshot: &'a Snapshot,
    /// Violation weights.
    pub weights: PenaltyWeights,
    /// Crossover and mutation settings.
    pub operators: GeneticOperators,
}

impl<'a> ExamGaProblem<'a> {
    /// Creates a problem with default operators.
    pub fn new(snapshot: &'a Snapshot, weights: PenaltyWeights) -> Self {
        Self {
            snapshot,
            weights,
            operators: GeneticOperators::default(),
        }
    }

    /// Takes mutation rate and crossover bias from a GA config, clamped
    /// into `[0, 1]`.
    pub fn with_config(mut self, config: &GaConfig) -> Self {
        self.operators.mutation_rate = unit_probability(config.mutation_rate);
        self.operators.crossover_bias = unit_probability(config.crossover_bias);
        self
    }

    /// Sets the genetic operators.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Violation counts behind a chromosome's score.
    pub fn breakdown(&self, chromosome: &ExamChromosome) -> FitnessBreakdown {
        breakdown(chromosome, self.snapshot)
    }
}

impl GaProblem for ExamGaProblem<'_> {
    type Individual = ExamChromosome;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> ExamChromosome {
        ExamChromosome::random(self.snapshot, rng)
    }

    fn evaluate(&self, individual: &ExamChromosome) -> u64 {
        evaluate(individual, self.snapshot, &self.weights)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &ExamChromosome,
        parent2: &ExamChromosome,
        rng: &mut R,
    ) -> (ExamChromosome, ExamChromosome) {
        self.operators.crossover(parent1, parent2, rng)
    }

    fn mutate<R: Rng>(&self, individual: &mut ExamChromosome, rng: &mut R) {
        self.operators.mutate(individual, self.snapshot, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::chromosome::tests::sample_snapshot;
    use crate::ga::runner::{GaRunner, Termination};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_create_and_evaluate() {
        let snap = sample_snapshot();
        let problem = ExamGaProblem::new(&snap, PenaltyWeights::default());
        let mut rng = SmallRng::seed_from_u64(42);
        let ch = problem.create_individual(&mut rng);

        assert!(ch.is_valid(&snap));
        let fitness = problem.evaluate(&ch);
        assert_eq!(fitness, problem.breakdown(&ch).penalty(&problem.weights));
    }

    #[test]
    fn test_with_config() {
        let snap = sample_snapshot();
        let config = GaConfig::default().with_mutation_rate(0.05);
        let problem = ExamGaProblem::new(&snap, PenaltyWeights::default()).with_config(&config);
        assert!((problem.operators.mutation_rate - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_with_config_clamps_probabilities() {
        let snap = sample_snapshot();
        let config = GaConfig::default()
            .with_mutation_rate(1.5)
            .with_crossover_bias(-0.1)
            .with_max_generations(5)
            .with_seed(42);
        let problem = ExamGaProblem::new(&snap, PenaltyWeights::default()).with_config(&config);
        assert!((problem.operators.mutation_rate - 1.0).abs() < 1e-12);
        assert!(problem.operators.crossover_bias.abs() < 1e-12);

        // Runs to completion instead of rejecting the probabilities.
        let result = GaRunner::run(&problem, &config);
        assert!(result.generations <= 5);
    }

    #[test]
    fn test_crossover_and_mutation() {
        let snap = sample_snapshot();
        let problem = ExamGaProblem::new(&snap, PenaltyWeights::default());
        let mut rng = SmallRng::seed_from_u64(42);

        let p1 = problem.create_individual(&mut rng);
        let p2 = problem.create_individual(&mut rng);
        let (mut c1, _) = problem.crossover(&p1, &p2, &mut rng);
        problem.mutate(&mut c1, &mut rng);
        assert_eq!(c1.genes.len(), p1.genes.len());
        assert!(c1.is_valid(&snap));
    }

    #[test]
    fn test_ga_runner_integration() {
        let snap = sample_snapshot();
        let problem = ExamGaProblem::new(&snap, PenaltyWeights::default());
        let config = GaConfig::default().with_seed(42);

        let result = GaRunner::run(&problem, &config);
        // The sample has plenty of rooms and proctors for three courses.
        assert_eq!(result.best_fitness, 0);
        assert_eq!(result.termination, Termination::PerfectScore);
        assert!(problem.breakdown(&result.best).is_conflict_free());
    }
}
