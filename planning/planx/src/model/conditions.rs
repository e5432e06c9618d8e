use crate::{Env, Environment, ExprId, TimeInterval, Timestamp};

/// A boolean expression required to hold over a time interval of an action.
#[derive(Clone, Debug)]
pub struct Condition {
    pub interval: TimeInterval,
    pub cond: ExprId,
}

impl Condition {
    pub fn over(itv: impl Into<TimeInterval>, cond: ExprId) -> Self {
        Condition {
            interval: itv.into(),
            cond,
        }
    }

    pub fn at(tp: impl Into<Timestamp>, cond: ExprId) -> Self {
        Self::over(TimeInterval::at(tp), cond)
    }

    /// Renders the condition as `[interval] expression`.
    pub fn display(&self, env: &Environment) -> String {
        (env / self).to_string()
    }
}

impl<'a> std::fmt::Display for Env<'a, &Condition> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.elem.interval, self.env / self.elem.cond)
    }
}
