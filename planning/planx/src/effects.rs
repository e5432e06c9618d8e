use crate::errors::Span;
use crate::{env::Env, *};
use itertools::Itertools;

/// A fluent applied to some arguments, i.e., the target of an effect.
#[derive(Debug, Clone)]
pub struct StateVariable {
    pub fluent: Sym,
    pub arguments: SeqExprId,
    #[allow(unused)]
    src: Option<Span>,
}

impl StateVariable {
    pub fn new(fluent: impl Into<Sym>, args: impl Into<SeqExprId>) -> Self {
        StateVariable {
            fluent: fluent.into(),
            arguments: args.into(),
            src: None,
        }
    }

    pub fn with_source(self, src: Span) -> Self {
        StateVariable { src: Some(src), ..self }
    }
}

impl<'env> Display for Env<'env, &StateVariable> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sv = self.elem;
        if sv.arguments.is_empty() {
            write!(f, "{}", sv.fluent)
        } else {
            write!(
                f,
                "{}({})",
                sv.fluent,
                sv.arguments.iter().map(|&a| self.env / a).format(", ")
            )
        }
    }
}

#[derive(Debug, Clone)]
pub enum EffectOp {
    Assign(ExprId),
}

impl<'env> Display for Env<'env, &EffectOp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.elem {
            EffectOp::Assign(value) => write!(f, ":= {}", self.env / *value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Effect {
    pub timing: Timestamp,
    pub state_variable: StateVariable,
    pub operation: EffectOp,
}

impl Effect {
    pub fn assignment(timing: impl Into<Timestamp>, state_variable: StateVariable, value: ExprId) -> Self {
        Effect {
            timing: timing.into(),
            state_variable,
            operation: EffectOp::Assign(value),
        }
    }
}

impl<'env> Display for Env<'env, &Effect> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {}",
            self.elem.timing,
            self.env / &self.elem.state_variable,
            self.env / &self.elem.operation
        )
    }
}
