use idmap::DirectIdMap;

use crate::{
    Expr, ExprId, ExprNode, Fluents, Objects, Types,
    errors::{EnvError, Res, Span},
};

/// Owner of all expressions of a model, together with the types, objects and fluents they refer to.
pub struct Environment {
    pub types: Types,
    pub objects: Objects,
    pub fluents: Fluents,
    exprs: DirectIdMap<ExprId, ExprNode>,
    next_expr_id: u32,
}

/// An element together with the environment it lives in (typically for display purposes).
///
/// Usually built with the `/` operator: `&env / elem`
#[derive(Copy, Clone)]
pub struct Env<'a, T> {
    pub elem: T,
    pub env: &'a Environment,
}

impl Environment {
    pub fn new(types: Types) -> Self {
        Self {
            types,
            objects: Default::default(),
            fluents: Default::default(),
            exprs: Default::default(),
            next_expr_id: 0u32,
        }
    }

    /// Panics if the expression was not interned in this environment (or in the one it was cloned from).
    pub(crate) fn get(&self, id: ExprId) -> &ExprNode {
        self.exprs.get(id).unwrap()
    }

    pub fn node<T>(&self, id: T) -> Env<'_, T> {
        self / id
    }

    /// Type checks the expression and records it, returning its identifier.
    pub fn intern(&mut self, expr: Expr, span: impl Into<Option<Span>>) -> Res<ExprId> {
        let tpe = expr.tpe(self).msg(self)?;
        let id = ExprId(self.next_expr_id);
        self.next_expr_id += 1;
        let res = self.exprs.insert(id, ExprNode::new(expr, tpe, span.into()));
        debug_assert!(res.is_none());
        Ok(id)
    }
}

/// A cloned environment keeps the identifiers of all expressions of the original one.
impl Clone for Environment {
    fn clone(&self) -> Self {
        let mut exprs = DirectIdMap::default();
        for id in (0..self.next_expr_id).map(ExprId) {
            exprs.insert(id, self.get(id).clone());
        }
        Self {
            types: self.types.clone(),
            objects: self.objects.clone(),
            fluents: self.fluents.clone(),
            exprs,
            next_expr_id: self.next_expr_id,
        }
    }
}

impl<'a, T> std::ops::Div<T> for &'a Environment {
    type Output = Env<'a, T>;

    fn div(self, rhs: T) -> Self::Output {
        Env { elem: rhs, env: self }
    }
}

impl<'a, T> std::ops::Div<T> for &'a mut Environment {
    type Output = Env<'a, T>;

    fn div(self, rhs: T) -> Self::Output {
        Env { elem: rhs, env: self }
    }
}
