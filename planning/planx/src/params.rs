use std::fmt::Debug;

use derive_more::derive::Display;
use itertools::Itertools;

use crate::{Sym, types::Type};

/// A typed parameter of an action or fluent.
#[derive(Clone, Display)]
#[display("{name}")]
pub struct Param {
    pub name: Sym,
    pub tpe: Type,
}

impl Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.tpe)
    }
}

impl Param {
    pub fn new(name: impl Into<Sym>, tpe: impl Into<Type>) -> Self {
        Self {
            name: name.into(),
            tpe: tpe.into(),
        }
    }

    pub fn name(&self) -> &Sym {
        &self.name
    }

    pub fn tpe(&self) -> &Type {
        &self.tpe
    }
}

/// Formats a signature as `name: type, name: type`
pub(crate) fn signature(params: &[Param]) -> impl std::fmt::Display + '_ {
    params.iter().map(|p| format!("{p:?}")).format(", ")
}
