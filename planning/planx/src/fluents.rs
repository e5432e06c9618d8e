use thiserror::Error;

use crate::errors::{Message, Span, Spanned};
use crate::params::signature;
use crate::{env::Environment, *};

#[derive(Error, Debug)]
pub enum FluentError {
    #[error("duplicate fluent {0}")]
    DuplicateFluent(Sym, Sym),
    #[error("unknown fluent {0}")]
    UnknownFluent(Sym),
}

impl From<FluentError> for Message {
    fn from(value: FluentError) -> Self {
        match value {
            FluentError::DuplicateFluent(new, previous) => new
                .invalid("duplicate fluent")
                .info(&previous, "previous declaration"),
            FluentError::UnknownFluent(name) => name.invalid("unknown fluent"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Fluents {
    fluents: Vec<Fluent>,
}

impl Display for Fluents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fluents:")?;
        for fluent in &self.fluents {
            write!(f, "\n  {fluent}")?;
        }
        Ok(())
    }
}

impl Fluents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: impl Into<Sym>) -> Result<&Fluent, FluentError> {
        let name = name.into();
        self.fluents
            .iter()
            .find(|f| f.name == name)
            .ok_or(FluentError::UnknownFluent(name))
    }

    pub fn add_fluent(
        &mut self,
        name: impl Into<Sym>,
        parameters: Vec<Param>,
        return_type: Type,
        origin: impl Into<Option<Span>>,
    ) -> Result<&Fluent, FluentError> {
        let fluent = Fluent {
            name: name.into(),
            parameters,
            return_type,
            origin: origin.into(),
        };
        if let Some(other) = self.fluents.iter().find(|f| f.name == fluent.name) {
            return Err(FluentError::DuplicateFluent(fluent.name, other.name.clone()));
        }
        self.fluents.push(fluent);
        Ok(&self.fluents[self.fluents.len() - 1])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fluent> {
        self.fluents.iter()
    }
}

#[derive(Clone, Debug)]
pub struct Fluent {
    pub name: Sym,
    pub parameters: Vec<Param>,
    pub return_type: Type,
    pub origin: Option<Span>,
}

impl Fluent {
    pub fn name(&self) -> &Sym {
        &self.name
    }

    pub fn return_type(&self, args: &[ExprId], env: &Environment) -> Result<Type, TypeError> {
        if args.len() < self.parameters.len() {
            return Err(TypeError::MissingParameter(self.parameters[args.len()].clone()));
        } else if args.len() > self.parameters.len() {
            return Err(TypeError::UnexpectedArgument(args[self.parameters.len()]));
        }
        for (param, arg) in self.parameters.iter().zip(args) {
            param.tpe.accepts(*arg, env)?;
        }
        Ok(self.return_type.clone())
    }
}

impl Display for Fluent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) -> {}",
            self.name,
            signature(&self.parameters),
            self.return_type
        )
    }
}

impl Spanned for Fluent {
    fn span(&self) -> Option<&Span> {
        self.origin.as_ref()
    }
}
