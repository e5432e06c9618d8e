use planx::{ActionsError, Message, Sym};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error(
        "{kind} {action} of problem {problem} has an invalid name: double underscore '__' is reserved by the naming convention of generated actions"
    )]
    ReservedActionName {
        kind: &'static str,
        action: Sym,
        problem: Sym,
    },
    #[error("action {0} does not originate from the rewritten problem")]
    UnmappedAction(Sym),
    #[error("removing disjunctions from action {action} would produce more than {limit} actions")]
    TooManyActions { action: Sym, limit: usize },
    #[error(transparent)]
    Model(#[from] Message),
    #[error(transparent)]
    Actions(#[from] ActionsError),
}
