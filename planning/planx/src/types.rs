use crate::errors::{Message, Res, Spanned, ToEnvMessage};
use crate::*;
use std::sync::Arc;

/// Reasons for which an expression may be rejected by the type checker.
#[derive(Debug)]
pub enum TypeError {
    IncompatibleType(ExprId, Type),
    MissingParameter(Param),
    UnexpectedArgument(ExprId),
}

impl ToEnvMessage for TypeError {
    fn to_message(self, env: &Environment) -> Message {
        match self {
            TypeError::IncompatibleType(expr, expected) => {
                let expr = env / expr;
                expr.invalid(format!(
                    "has type `{}` but type `{}` was expected",
                    expr.tpe(),
                    expected
                ))
            }
            TypeError::UnexpectedArgument(expr) => (env / expr).invalid("unexpected argument"),
            TypeError::MissingParameter(param) => Message::error(format!("missing parameter: {param:?}")),
        }
    }
}

/// Entry point to the user-defined types of a model.
#[derive(Clone)]
pub struct Types {
    user_types: Arc<UserTypes>,
}

impl Types {
    pub fn new(types: UserTypes) -> Self {
        Self {
            user_types: Arc::new(types),
        }
    }

    pub fn top_user_type(&self) -> UserType {
        UserType::new(self.user_types.top_type.clone(), self.user_types.clone())
    }

    pub fn get_user_type(&self, name: impl Into<Sym>) -> Res<UserType> {
        let name = name.into();
        if self.user_types.contains(&name) {
            Ok(UserType::new(name, self.user_types.clone()))
        } else {
            Err(name.invalid("unknown type"))
        }
    }
}

/// Represents a single user-defined type within a type hierarchy
#[derive(Clone)]
pub struct UserType {
    pub name: Sym,
    hier: Arc<UserTypes>,
}

impl UserType {
    fn new(name: Sym, hier: Arc<UserTypes>) -> Self {
        Self { name, hier }
    }

    pub fn is_subtype_of(&self, other: &UserType) -> bool {
        self.hier.is_subtype_of(&self.name, &other.name)
    }
}

impl From<&UserType> for Type {
    fn from(value: &UserType) -> Self {
        Type::User(value.clone())
    }
}

impl From<UserType> for Type {
    fn from(value: UserType) -> Self {
        Type::User(value)
    }
}

impl PartialEq for UserType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Debug for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Hierarchy of user-defined types, with support for multiple inheritance.
/// All types are subtypes of an implicit top type.
#[derive(Clone)]
pub struct UserTypes {
    top_type: Sym,
    types: hashbrown::HashMap<Sym, Vec<Sym>>,
}

impl Default for UserTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl UserTypes {
    pub fn new() -> Self {
        Self {
            top_type: Sym::from("★object★"),
            types: Default::default(),
        }
    }

    pub fn is_subtype_of(&self, a: &Sym, b: &Sym) -> bool {
        if a == b || b == &self.top_type {
            true
        } else if let Some(parents) = self.types.get(a) {
            parents.iter().any(|parent| self.is_subtype_of(parent, b))
        } else {
            false
        }
    }

    pub fn contains(&self, name: &Sym) -> bool {
        name == &self.top_type || self.types.contains_key(name)
    }

    /// Records a new type with the given parent.
    /// If the parent is not recorded yet, it is created (assuming no parents).
    /// If the type already exists, a new parent is added.
    pub fn add_type<T: Into<Sym>>(&mut self, tpe: T, parent: Option<T>) {
        let tpe = tpe.into();
        match parent.map(|p| p.into()) {
            Some(parent) => {
                self.types.entry(parent.clone()).or_default();
                self.types.entry(tpe).or_default().push(parent);
            }
            None => {
                self.types.entry(tpe).or_default();
            }
        }
    }
}

#[derive(Clone)]
pub enum Type {
    Bool,
    Int,
    Real,
    User(UserType),
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.is_subtype_of(other) && other.is_subtype_of(self)
    }
}

impl Debug for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Real => write!(f, "real"),
            Type::User(tpe) => write!(f, "{tpe}"),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Type {
    pub fn is_subtype_of(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Bool, Type::Bool) => true,
            (Type::Real, Type::Real) => true,
            (Type::Int, Type::Int) => true,
            (Type::Int, Type::Real) => true,
            (Type::User(left), Type::User(right)) => left.is_subtype_of(right),
            _ => false,
        }
    }

    pub fn accepts(&self, expr: ExprId, env: &Environment) -> Result<(), TypeError> {
        if env.node(expr).tpe().is_subtype_of(self) {
            Ok(())
        } else {
            Err(TypeError::IncompatibleType(expr, self.clone()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hierarchy() {
        let mut hier = UserTypes::new();
        hier.add_type("truck", Some("vehicle"));
        hier.add_type("location", None);
        let types = Types::new(hier);
        let truck = types.get_user_type("truck").unwrap();
        let vehicle = types.get_user_type("vehicle").unwrap();
        let location = types.get_user_type("location").unwrap();
        assert!(truck.is_subtype_of(&vehicle));
        assert!(!vehicle.is_subtype_of(&truck));
        assert!(!truck.is_subtype_of(&location));
        assert!(truck.is_subtype_of(&types.top_user_type()));
        assert!(types.get_user_type("boat").is_err());
    }

    #[test]
    fn numeric_subtyping() {
        assert!(Type::Int.is_subtype_of(&Type::Real));
        assert!(!Type::Real.is_subtype_of(&Type::Int));
        assert!(!Type::Bool.is_subtype_of(&Type::Int));
    }
}
