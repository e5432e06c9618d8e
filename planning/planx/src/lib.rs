//! Planning model: types, objects, fluents, expressions, actions, goals and plans.
//!
//! Expressions are interned in an [`Environment`] and referred to by their [`ExprId`].
//! Any element that needs the environment to be displayed can be wrapped with `&env / elem`.

mod actions;
mod effects;
mod env;
pub mod errors;
mod expressions;
mod fluents;
mod goals;
mod input;
mod model;
mod objects;
mod params;
mod plan;
mod sym;
mod timing;
mod types;

pub use actions::*;
pub use effects::*;
pub use env::*;
pub use errors::{Message, Res};
pub use expressions::*;
pub use fluents::*;
pub use goals::*;
pub use input::Input;
pub use model::*;
pub use objects::*;
pub use params::*;
pub use plan::*;
pub use sym::Sym;
pub use timing::*;
pub use types::*;

use std::fmt::{Debug, Display};
