use itertools::Itertools;

use crate::{RealValue, Sym};

/// An action of a plan, with its ground arguments and, for temporal plans, its start time and duration.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionInstance {
    pub name: Sym,
    pub arguments: Vec<Sym>,
    pub start: Option<RealValue>,
    pub duration: Option<RealValue>,
}

impl ActionInstance {
    pub fn new(name: impl Into<Sym>, arguments: impl IntoIterator<Item = impl Into<Sym>>) -> Self {
        ActionInstance {
            name: name.into(),
            arguments: arguments.into_iter().map(|a| a.into()).collect(),
            start: None,
            duration: None,
        }
    }

    pub fn timed(self, start: impl Into<RealValue>, duration: Option<RealValue>) -> Self {
        ActionInstance {
            start: Some(start.into()),
            duration,
            ..self
        }
    }

    /// Same instance (arguments, timing) of an action with another name.
    pub fn renamed(&self, name: impl Into<Sym>) -> Self {
        ActionInstance {
            name: name.into(),
            ..self.clone()
        }
    }
}

impl std::fmt::Display for ActionInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{:>5}: ", start.to_string())?;
        }
        write!(f, "({}", self.name)?;
        if !self.arguments.is_empty() {
            write!(f, " {}", self.arguments.iter().join(" "))?;
        }
        write!(f, ")")?;
        if let Some(duration) = self.duration {
            write!(f, " [{duration}]")?;
        }
        Ok(())
    }
}

/// A sequence of action instances, either sequential (no timing) or timed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plan {
    steps: Vec<ActionInstance>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: ActionInstance) {
        self.steps.push(step)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionInstance> + '_ {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromIterator<ActionInstance> for Plan {
    fn from_iter<T: IntoIterator<Item = ActionInstance>>(iter: T) -> Self {
        Plan {
            steps: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for step in &self.steps {
            writeln!(f, "{step}")?;
        }
        Ok(())
    }
}
