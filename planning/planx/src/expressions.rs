use idmap::IntegerId;
use itertools::Itertools;
use smallvec::SmallVec;

use crate::{
    env::{Env, Environment},
    errors::{Res, Span, Spanned},
    *,
};

pub type IntValue = i64;

pub type RealValue = num_rational::Rational64;

#[derive(Debug, PartialEq, PartialOrd, Ord, Eq, Hash, Clone, Copy)]
pub struct ExprId(pub(crate) u32);

pub type SeqExprId = SmallVec<[ExprId; 3]>;

impl IntegerId for ExprId {
    fn from_id(id: u64) -> Self {
        assert!(id <= (u32::MAX as u64));
        ExprId(id as u32)
    }

    fn id(&self) -> u64 {
        self.0 as u64
    }

    fn id32(&self) -> u32 {
        self.0
    }
}

#[derive(Clone)]
pub(crate) struct ExprNode {
    expr: Expr,
    tpe: Type,
    span: Option<Span>,
}

impl ExprNode {
    pub fn new(expr: Expr, tpe: Type, span: Option<Span>) -> Self {
        Self { expr, tpe, span }
    }
}

pub type TExpr<'env> = Env<'env, ExprId>;

impl<'a> TExpr<'a> {
    fn get(&self) -> &'a ExprNode {
        self.env.get(self.elem)
    }

    pub fn tpe(&self) -> &'a Type {
        &self.get().tpe
    }

    pub fn expr(&self) -> &'a Expr {
        &self.get().expr
    }
}

impl<'a> Debug for TExpr<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl<'a> Spanned for TExpr<'a> {
    fn span(&self) -> Option<&Span> {
        self.get().span.as_ref()
    }
}

#[derive(Clone, Debug)]
pub enum Expr {
    Int(IntValue),
    Bool(bool),
    Object(Object),
    Param(Param),
    App(Fun, SeqExprId),
    StateVariable(Fluent, SeqExprId),
}

impl<'a> Display for TExpr<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env = self.env;
        match self.expr() {
            Expr::Int(i) => write!(f, "{i}"),
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Object(o) => write!(f, "{o}"),
            Expr::Param(p) => write!(f, "{p}"),
            Expr::App(function, args) => {
                write!(f, "{function}({})", args.iter().map(|&e| env / e).format(", "))
            }
            Expr::StateVariable(fluent, args) if args.is_empty() => write!(f, "{}", fluent.name()),
            Expr::StateVariable(fluent, args) => {
                write!(f, "{}({})", fluent.name(), args.iter().map(|&e| env / e).format(", "))
            }
        }
    }
}

impl Expr {
    pub fn tpe(&self, env: &Environment) -> Result<Type, TypeError> {
        match self {
            Expr::Int(_) => Ok(Type::Int),
            Expr::Bool(_) => Ok(Type::Bool),
            Expr::App(fun, args) => fun.return_type(args.as_slice(), env),
            Expr::StateVariable(fluent, args) => fluent.return_type(args.as_slice(), env),
            Expr::Object(o) => Ok(o.tpe().into()),
            Expr::Param(p) => Ok(p.tpe().clone()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fun {
    Plus,
    Minus,
    And,
    Or,
    Not,
    Implies,
    Iff,
    Eq,
}

impl Fun {
    pub fn return_type(&self, args: &[ExprId], env: &Environment) -> Result<Type, TypeError> {
        use Fun::*;
        match self {
            Plus | Minus => {
                for a in args {
                    Type::Int.accepts(*a, env)?;
                }
                Ok(Type::Int)
            }
            And | Or => {
                for a in args {
                    Type::Bool.accepts(*a, env)?;
                }
                Ok(Type::Bool)
            }
            Not => match args {
                [] => Err(TypeError::MissingParameter(Param::new("<negated-term>", Type::Bool))),
                [single] => {
                    Type::Bool.accepts(*single, env)?;
                    Ok(Type::Bool)
                }
                [_, second, ..] => Err(TypeError::UnexpectedArgument(*second)),
            },
            Implies | Iff => match args {
                [] | [_] => Err(TypeError::MissingParameter(Param::new("<operand>", Type::Bool))),
                [left, right] => {
                    Type::Bool.accepts(*left, env)?;
                    Type::Bool.accepts(*right, env)?;
                    Ok(Type::Bool)
                }
                [_, _, third, ..] => Err(TypeError::UnexpectedArgument(*third)),
            },
            Eq => match args {
                [] | [_] => Err(TypeError::MissingParameter(Param::new("<compared-term>", Type::Bool))),
                [_, _] => Ok(Type::Bool),
                [_, _, third, ..] => Err(TypeError::UnexpectedArgument(*third)),
            },
        }
    }
}

impl Display for Fun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Fun::Plus => "+",
                Fun::Minus => "-",
                Fun::And => "and",
                Fun::Or => "or",
                Fun::Not => "not",
                Fun::Implies => "imply",
                Fun::Iff => "iff",
                Fun::Eq => "=",
            }
        )
    }
}

/// Structural comparison and construction of expressions.
impl Environment {
    /// Returns true if the two expressions have the same tree, regardless of their identifiers.
    pub fn structurally_equal(&self, a: ExprId, b: ExprId) -> bool {
        self.same_tree(a, self, b)
    }

    /// Returns true if the expression `a` of this environment and the expression `b` of `other` have the same tree.
    pub fn same_tree(&self, a: ExprId, other: &Environment, b: ExprId) -> bool {
        if a == b && std::ptr::eq(self, other) {
            return true;
        }
        let all_equal = |xs: &SeqExprId, ys: &SeqExprId| {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(&x, &y)| self.same_tree(x, other, y))
        };
        match (self.node(a).expr(), other.node(b).expr()) {
            (Expr::Int(x), Expr::Int(y)) => x == y,
            (Expr::Bool(x), Expr::Bool(y)) => x == y,
            (Expr::Object(x), Expr::Object(y)) => x.name() == y.name(),
            (Expr::Param(x), Expr::Param(y)) => x.name() == y.name(),
            (Expr::App(f, xs), Expr::App(g, ys)) => f == g && all_equal(xs, ys),
            (Expr::StateVariable(f, xs), Expr::StateVariable(g, ys)) => f.name() == g.name() && all_equal(xs, ys),
            _ => false,
        }
    }

    pub fn bool(&mut self, value: bool) -> Res<ExprId> {
        self.intern(Expr::Bool(value), None)
    }

    pub fn int(&mut self, value: IntValue) -> Res<ExprId> {
        self.intern(Expr::Int(value), None)
    }

    pub fn object(&mut self, name: impl Into<Sym>) -> Res<ExprId> {
        let object = self.objects.get(name)?;
        self.intern(Expr::Object(object), None)
    }

    pub fn param(&mut self, param: &Param) -> Res<ExprId> {
        self.intern(Expr::Param(param.clone()), None)
    }

    pub fn state_variable(&mut self, fluent: impl Into<Sym>, args: &[ExprId]) -> Res<ExprId> {
        let fluent = self.fluents.get(fluent)?.clone();
        self.intern(Expr::StateVariable(fluent, SeqExprId::from_slice(args)), None)
    }

    pub fn app(&mut self, fun: Fun, args: &[ExprId]) -> Res<ExprId> {
        self.intern(Expr::App(fun, SeqExprId::from_slice(args)), None)
    }

    pub fn and(&mut self, conjuncts: &[ExprId]) -> Res<ExprId> {
        self.app(Fun::And, conjuncts)
    }

    pub fn or(&mut self, disjuncts: &[ExprId]) -> Res<ExprId> {
        self.app(Fun::Or, disjuncts)
    }

    pub fn not(&mut self, e: ExprId) -> Res<ExprId> {
        self.app(Fun::Not, &[e])
    }

    pub fn implies(&mut self, premise: ExprId, conclusion: ExprId) -> Res<ExprId> {
        self.app(Fun::Implies, &[premise, conclusion])
    }

    pub fn iff(&mut self, left: ExprId, right: ExprId) -> Res<ExprId> {
        self.app(Fun::Iff, &[left, right])
    }
}
