//! GA-based exam timetabling.
//!
//! # Encoding
//!
//! One [`Gene`] per course: an exam date, a start time shared by all the
//! course's sections, and a room and proctor per section. Fitness is a
//! weighted penalty sum where 0 means no recorded violation.
//!
//! # Submodules
//!
//! - [`operators`]: Tournament selection and configurable mutation mix
//!
//! The generational loop itself lives in [`GaRunner`], which is generic over
//! [`GaProblem`] so the exam encoding stays independent of the driver.

mod chromosome;
mod fitness;
pub mod operators;
mod problem;
mod runner;

pub use chromosome::{
    ExamChromosome, Gene, UNEVALUATED, date_mutation, proctor_mutation, room_mutation,
    time_mutation, uniform_crossover,
};
pub use fitness::{FitnessBreakdown, PenaltyWeights, breakdown, evaluate};
pub use problem::ExamGaProblem;

#[cfg(test)]
pub(crate) use chromosome::tests as chromosome_fixtures;
pub use runner::{
    CancelToken, GaConfig, GaProblem, GaResult, GaRunner, Individual, Termination,
};
