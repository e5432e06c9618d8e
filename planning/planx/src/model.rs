use crate::{env::Environment, *};

mod conditions;
pub use conditions::*;

/// A planning problem: its environment (types, objects, fluents, expressions), actions, initial state and goals.
#[derive(Clone)]
pub struct Model {
    pub name: Sym,
    pub env: Environment,
    pub actions: Actions,
    /// Set of effects in the problem definition, covering both initial effects (at ORIGIN) and
    /// timed effects (after ORIGIN)
    pub init: Vec<Effect>,
    pub goals: Vec<Goal>,
}

impl Model {
    pub fn new(name: impl Into<Sym>, types: Types) -> Self {
        Self {
            name: name.into(),
            env: Environment::new(types),
            actions: Default::default(),
            init: Default::default(),
            goals: Default::default(),
        }
    }

    /// Builds a model with the same name, environment, initial state and goals, but without any action.
    pub fn with_same_context(&self) -> Self {
        Self {
            name: self.name.clone(),
            env: self.env.clone(),
            actions: Default::default(),
            init: self.init.clone(),
            goals: self.goals.clone(),
        }
    }

    /// Returns true if at least one action of the problem has a duration.
    pub fn is_temporal(&self) -> bool {
        self.actions.iter().any(|a| a.is_durative())
    }

    /// Returns true if `name` is already taken by a type, an object, a fluent or an action of the problem.
    pub fn has_name(&self, name: &str) -> bool {
        self.env.types.get_user_type(name).is_ok()
            || self.env.objects.get(name).is_ok()
            || self.env.fluents.get(name).is_ok()
            || self.actions.get(name).is_ok()
    }
}

/// Pairs the environments of two models, to compare their elements by structure rather than by identifiers.
struct Pairing<'a> {
    left: &'a Environment,
    right: &'a Environment,
}

impl Pairing<'_> {
    fn expr(&self, a: ExprId, b: ExprId) -> bool {
        self.left.same_tree(a, self.right, b)
    }

    fn exprs(&self, xs: &[ExprId], ys: &[ExprId]) -> bool {
        xs.len() == ys.len() && xs.iter().zip(ys).all(|(&x, &y)| self.expr(x, y))
    }

    fn params(xs: &[Param], ys: &[Param]) -> bool {
        xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| x.name == y.name && x.tpe == y.tpe)
    }

    fn duration(&self, a: &Duration, b: &Duration) -> bool {
        match (a, b) {
            (Duration::Instantaneous, Duration::Instantaneous) => true,
            (Duration::Fixed(x), Duration::Fixed(y)) => self.expr(*x, *y),
            (Duration::Bounded(xl, xu), Duration::Bounded(yl, yu)) => self.expr(*xl, *yl) && self.expr(*xu, *yu),
            _ => false,
        }
    }

    fn effect(&self, a: &Effect, b: &Effect) -> bool {
        let (EffectOp::Assign(x), EffectOp::Assign(y)) = (&a.operation, &b.operation);
        a.timing == b.timing
            && a.state_variable.fluent == b.state_variable.fluent
            && self.exprs(&a.state_variable.arguments, &b.state_variable.arguments)
            && self.expr(*x, *y)
    }

    fn effects(&self, xs: &[Effect], ys: &[Effect]) -> bool {
        xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| self.effect(x, y))
    }

    fn action(&self, a: &Action, b: &Action) -> bool {
        a.name == b.name
            && Self::params(&a.parameters, &b.parameters)
            && self.duration(&a.duration, &b.duration)
            && a.conditions.len() == b.conditions.len()
            && a.conditions
                .iter()
                .zip(&b.conditions)
                .all(|(x, y)| x.interval == y.interval && self.expr(x.cond, y.cond))
            && self.effects(&a.effects, &b.effects)
    }

    fn goal(&self, a: &Goal, b: &Goal) -> bool {
        let same_kind = match (&a.goal_expression, &b.goal_expression) {
            (SimpleGoal::HoldsDuring(x, _), SimpleGoal::HoldsDuring(y, _)) => x == y,
            (SimpleGoal::SometimeDuring(x, _), SimpleGoal::SometimeDuring(y, _)) => x == y,
            _ => false,
        };
        same_kind
            && Self::params(&a.universal_quantification, &b.universal_quantification)
            && self.expr(a.goal_expression.expression(), b.goal_expression.expression())
    }
}

/// Two models are equal if they have the same name and their actions, initial state and goals have the same
/// structure, regardless of the identifiers of their expressions.
impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        let pairing = Pairing {
            left: &self.env,
            right: &other.env,
        };
        self.name == other.name
            && self.actions.len() == other.actions.len()
            && self.actions.iter().zip(other.actions.iter()).all(|(a, b)| pairing.action(a, b))
            && pairing.effects(&self.init, &other.init)
            && self.goals.len() == other.goals.len()
            && self.goals.iter().zip(&other.goals).all(|(a, b)| pairing.goal(a, b))
    }
}

impl Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Problem: {}\n\n", self.name)?;
        write!(f, "{}\n{}\n", self.env.objects, self.env.fluents)?;

        write!(f, "\nActions:")?;
        for a in self.actions.iter() {
            write!(f, "\n\n  {}", &self.env / a)?;
        }
        write!(f, "\n\nInit:")?;
        for ini in &self.init {
            write!(f, "\n  {}", &self.env / ini)?;
        }

        write!(f, "\n\nGoals:")?;
        for g in &self.goals {
            write!(f, "\n  {}", &self.env / g)?;
        }
        Ok(())
    }
}
