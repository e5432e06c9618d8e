use std::fmt::Display;

use itertools::Itertools;

use crate::{Env, ExprId, Param, TimeInterval, Timestamp};

#[derive(Debug, Clone)]
pub struct Goal {
    pub universal_quantification: Vec<Param>,
    pub goal_expression: SimpleGoal,
}

impl<'a> Display for Env<'a, &Goal> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.elem.universal_quantification.is_empty() {
            write!(f, "forall ({}) ", self.elem.universal_quantification.iter().join(", "))?;
        }
        write!(f, "{}", self.env / &self.elem.goal_expression)
    }
}

/// A goal statement of the problem.
///
/// Regular goals (that must hold in the final state) are encoded as `HoldsDuring([horizon], expression)`.
#[derive(Clone, Debug)]
pub enum SimpleGoal {
    /// The expression must be true over the entire interval.
    HoldsDuring(TimeInterval, ExprId),
    /// The expression must be true at least once in the interval.
    SometimeDuring(TimeInterval, ExprId),
}

impl SimpleGoal {
    /// Expression that must hold at a given timepoint
    pub fn at(tp: impl Into<Timestamp>, expr: ExprId) -> SimpleGoal {
        SimpleGoal::HoldsDuring(TimeInterval::at(tp), expr)
    }

    /// Universally quantifies this goal over the given variables (possibly none).
    pub fn forall(self, vars: Vec<Param>) -> Goal {
        Goal {
            universal_quantification: vars,
            goal_expression: self,
        }
    }

    pub fn expression(&self) -> ExprId {
        match self {
            SimpleGoal::HoldsDuring(_, e) | SimpleGoal::SometimeDuring(_, e) => *e,
        }
    }
}

impl From<SimpleGoal> for Goal {
    fn from(value: SimpleGoal) -> Self {
        value.forall(Vec::new())
    }
}

impl<'a> Display for Env<'a, &SimpleGoal> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.elem {
            SimpleGoal::HoldsDuring(itv, e) => write!(f, "{} {}", itv, self.env / *e),
            SimpleGoal::SometimeDuring(itv, e) => write!(f, "sometime-during({} {})", itv, self.env / *e),
        }
    }
}
