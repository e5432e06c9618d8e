//! Transformations of planning problems into equivalent problems that are easier to handle by some planners.
//!
//! A transformation borrows the original [`Model`], produces a rewritten one and knows how to map
//! a plan for the rewritten problem back into a plan for the original one.

pub mod disjunctions;
pub mod dnf;
pub mod errors;
pub mod samples;

use std::cell::Cell;

use planx::{Action, Model, Plan, Sym};

pub use disjunctions::{ActionMapping, DisjunctiveConditionsRemover};
pub use errors::TransformError;

/// A rewriting of a planning problem, with the inverse mapping of its plans.
pub trait Transformer {
    /// The rewritten problem. Computed at most once, subsequent calls return the same problem.
    fn get_rewritten_problem(&self) -> Result<&Model, TransformError>;

    /// Action of the original problem from which the action `new_action` of the rewritten problem is derived.
    fn get_original_action(&self, new_action: &str) -> Result<&Action, TransformError>;

    /// Actions of the rewritten problem that replace the action `original_action`.
    fn get_transformed_actions(&self, original_action: &str) -> Result<Vec<&Action>, TransformError>;

    /// Translates a plan of the rewritten problem into a plan of the original problem.
    fn rewrite_back_plan(&self, plan: &Plan) -> Result<Plan, TransformError>;

    /// A name derived from `name` that is not used in the original or rewritten problem,
    /// nor returned by a previous call on this transformer.
    fn get_fresh_name(&self, name: &str) -> Result<Sym, TransformError>;
}

/// Generator of names `<prefix>_<name>_<n>`, where `n` is a counter owned by the generator.
#[derive(Debug)]
pub struct FreshNames {
    prefix: Sym,
    counter: Cell<usize>,
}

impl FreshNames {
    pub fn new(prefix: impl Into<Sym>) -> Self {
        FreshNames {
            prefix: prefix.into(),
            counter: Cell::new(0),
        }
    }

    /// Next name derived from `name` for which `taken` is false.
    /// The counter is shared by all names, so that no name is ever returned twice.
    pub fn fresh(&self, name: &str, taken: impl Fn(&str) -> bool) -> Sym {
        loop {
            let n = self.counter.get();
            self.counter.set(n + 1);
            let candidate = format!("{}_{name}_{n}", self.prefix);
            if !taken(&candidate) {
                return candidate.into();
            }
        }
    }
}
