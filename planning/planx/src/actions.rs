use std::collections::BTreeMap;

use thiserror::Error;

use crate::errors::{Message, Spanned};
use crate::params::signature;
use crate::*;

#[derive(Error, Debug)]
pub enum ActionsError {
    #[error("duplicate action {0}")]
    DuplicateAction(Sym, Sym),
    #[error("unknown action {0}")]
    UnknownAction(Sym),
    #[error("instantaneous action {0} has a condition at {1}")]
    MisplacedCondition(Sym, TimeInterval),
}

impl From<ActionsError> for Message {
    fn from(value: ActionsError) -> Self {
        match value {
            ActionsError::DuplicateAction(new, previous) => new
                .invalid("duplicate action")
                .info(&previous, "previous declaration"),
            ActionsError::UnknownAction(name) => name.invalid("unknown action"),
            ActionsError::MisplacedCondition(name, itv) => name
                .invalid("instantaneous action with a condition outside of its start")
                .ctx(format!("condition required at {itv}")),
        }
    }
}

/// Set of actions of a model, indexed by their name.
#[derive(Clone, Debug, Default)]
pub struct Actions {
    actions: BTreeMap<Sym, Action>,
}

impl Actions {
    /// Adds an action, rejecting duplicate names and conditions of an instantaneous action that are not at its start.
    pub fn add(&mut self, action: Action) -> Result<(), ActionsError> {
        if !action.is_durative() {
            let start = TimeInterval::at(TimeRef::Start);
            if let Some(c) = action.conditions.iter().find(|c| c.interval != start) {
                return Err(ActionsError::MisplacedCondition(action.name, c.interval.clone()));
            }
        }
        if let Some(prev) = self.actions.get(&action.name) {
            return Err(ActionsError::DuplicateAction(action.name, prev.name.clone()));
        }
        self.actions.insert(action.name.clone(), action);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Action, ActionsError> {
        self.actions
            .get(name)
            .ok_or_else(|| ActionsError::UnknownAction(name.into()))
    }

    /// Iterates over all actions, in lexicographic order of their names.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.values()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum Duration {
    Instantaneous,
    Fixed(ExprId),
    Bounded(ExprId, ExprId),
}

impl<'a> Display for Env<'a, &Duration> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.elem {
            Duration::Instantaneous => write!(f, "instantaneous"),
            Duration::Fixed(d) => write!(f, "{}", self.env / *d),
            Duration::Bounded(lb, ub) => write!(f, "[{}, {}]", self.env / *lb, self.env / *ub),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Action {
    pub name: Sym,
    pub parameters: Vec<Param>,
    pub duration: Duration,
    pub conditions: Vec<Condition>,
    pub effects: Vec<Effect>,
}

impl Action {
    pub fn new(name: impl Into<Sym>, parameters: Vec<Param>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            parameters,
            duration,
            conditions: Default::default(),
            effects: Default::default(),
        }
    }

    pub fn instantaneous(name: impl Into<Sym>, parameters: Vec<Param>) -> Self {
        Self::new(name, parameters, Duration::Instantaneous)
    }

    pub fn is_durative(&self) -> bool {
        !matches!(self.duration, Duration::Instantaneous)
    }

    /// Human readable kind of the action, for diagnostics.
    pub fn kind(&self) -> &'static str {
        if self.is_durative() {
            "durative action"
        } else {
            "instantaneous action"
        }
    }
}

impl<'a> Display for Env<'a, &Action> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let a = self.elem;
        write!(f, "{}({})", a.name, signature(&a.parameters))?;
        write!(f, "\n    duration: {}", self.env / &a.duration)?;
        write!(f, "\n    conditions:")?;
        for c in &a.conditions {
            write!(f, "\n      {}", self.env / c)?;
        }
        write!(f, "\n    effects:")?;
        for eff in &a.effects {
            write!(f, "\n      {}", self.env / eff)?;
        }
        Ok(())
    }
}
