//! Removal of disjunctive conditions from the actions of a problem.
//!
//! Each action is split into one action per combination of the clauses of its condition groups.
//! The `i`-th action generated from `act` is named `act__i__`, which is why `__` may not appear in the name
//! of any action of the original problem.

use std::collections::BTreeMap;

use env_param::EnvParam;
use hashbrown::HashMap;
use itertools::Itertools;
use once_cell::unsync::OnceCell;
use planx::{Action, Condition, ExprId, Model, Plan, Sym, TimeInterval};

use crate::dnf::{self, Dnf, Negations};
use crate::errors::TransformError;
use crate::{FreshNames, Transformer};

/// Maximum number of actions that may be generated from a single action.
pub static MAX_SPLIT: EnvParam<usize> = EnvParam::new("PLANX_DNF_MAX_SPLIT", "100000");

/// Separator reserved for the names of generated actions.
pub const DELIMITER: &str = "__";

/// Name of the `index`-th action generated from `original`.
pub fn generated_name(original: &Sym, index: usize) -> Sym {
    format!("{}{DELIMITER}{index}{DELIMITER}", original.canonical_str()).into()
}

/// Associates each action of the original problem to the actions that replace it in the rewritten problem.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionMapping {
    old_to_new: BTreeMap<Sym, Vec<Sym>>,
    new_to_old: HashMap<Sym, Sym>,
}

impl ActionMapping {
    fn insert(&mut self, original: Sym, replacements: Vec<Sym>) {
        for r in &replacements {
            self.new_to_old.insert(r.clone(), original.clone());
        }
        self.old_to_new.insert(original, replacements);
    }

    /// Actions that replace `original`, in the order they were generated.
    pub fn transformed(&self, original: &str) -> Option<&[Sym]> {
        self.old_to_new.get(original).map(|v| v.as_slice())
    }

    /// Action of the original problem from which `new` was derived.
    pub fn original(&self, new: &str) -> Option<&Sym> {
        self.new_to_old.get(new)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Sym, &[Sym])> + '_ {
        self.old_to_new.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of original actions in the mapping.
    pub fn len(&self) -> usize {
        self.old_to_new.len()
    }

    pub fn is_empty(&self) -> bool {
        self.old_to_new.is_empty()
    }
}

impl std::fmt::Display for ActionMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (original, replacements) in self.iter() {
            writeln!(f, "{original} -> [{}]", replacements.iter().join(", "))?;
        }
        Ok(())
    }
}

/// Conditions of an action that must hold together over the same interval.
#[derive(Clone, Debug)]
pub struct ConditionGroup {
    pub interval: TimeInterval,
    pub conditions: Vec<ExprId>,
}

/// Splits the conditions of an action into independent groups, one per interval,
/// in the order in which the intervals first appear.
///
/// All conditions of an instantaneous action hold at its start, hence form a single group.
pub fn condition_groups(action: &Action) -> Vec<ConditionGroup> {
    let mut groups: Vec<ConditionGroup> = Vec::new();
    for c in &action.conditions {
        match groups.iter_mut().find(|g| g.interval == c.interval) {
            Some(group) => group.conditions.push(c.cond),
            None => groups.push(ConditionGroup {
                interval: c.interval.clone(),
                conditions: vec![c.cond],
            }),
        }
    }
    groups
}

/// Fails if the name of any action of the model contains the reserved delimiter.
pub fn check_action_names(model: &Model) -> Result<(), TransformError> {
    match model.actions.iter().find(|a| a.name.contains(DELIMITER)) {
        Some(a) => Err(TransformError::ReservedActionName {
            kind: a.kind(),
            action: a.name.clone(),
            problem: model.name.clone(),
        }),
        None => Ok(()),
    }
}

/// Number of actions resulting from the combination of the clauses of all groups.
///
/// Groups whose normal form exceeded the limit are `None`. They only matter if no other group is unsatisfiable.
fn num_combinations(action: &Action, dnfs: &[Option<Dnf>], limit: usize) -> Result<usize, TransformError> {
    if dnfs.iter().flatten().any(Dnf::is_empty) {
        return Ok(0);
    }
    dnfs.iter()
        .try_fold(1usize, |acc, dnf| {
            let n = acc.checked_mul(dnf.as_ref()?.len())?;
            (n <= limit).then_some(n)
        })
        .ok_or_else(|| TransformError::TooManyActions {
            action: action.name.clone(),
            limit,
        })
}

/// Result of the removal of disjunctive conditions.
#[derive(Clone)]
pub struct Rewritten {
    pub problem: Model,
    pub mapping: ActionMapping,
}

/// Builds a new problem in which the condition groups of each action are conjunctions of literals.
///
/// Actions whose groups all have a single clause are kept as is (same name, same conditions).
/// Other actions are replaced by one action per combination of clauses, the last group varying the fastest.
pub fn compile(model: &Model) -> Result<Rewritten, TransformError> {
    compile_with_limit(model, MAX_SPLIT.get())
}

/// Same as [`compile`], failing if more than `limit` actions would be generated from a single action.
pub fn compile_with_limit(model: &Model, limit: usize) -> Result<Rewritten, TransformError> {
    let _span = tracing::span!(tracing::Level::TRACE, "DNF", problem = %model.name).entered();
    check_action_names(model)?;

    let mut problem = model.with_same_context();
    let mut mapping = ActionMapping::default();
    let mut negations = Negations::default();

    for action in model.actions.iter() {
        let groups = condition_groups(action);
        let normalized: Vec<Option<Dnf>> = groups
            .iter()
            .map(|g| dnf::normalize(&model.env, &g.conditions, limit).ok())
            .collect();

        if normalized.iter().all(|dnf| dnf.as_ref().is_some_and(|dnf| dnf.len() == 1)) {
            problem.actions.add(action.clone())?;
            mapping.insert(action.name.clone(), vec![action.name.clone()]);
            continue;
        }
        let num_generated = num_combinations(action, &normalized, limit)?;
        if num_generated == 0 {
            tracing::warn!(action = %action.name, "conditions can never be satisfied, action removed");
            mapping.insert(action.name.clone(), Vec::new());
            continue;
        }
        // all groups are within the limit past this point
        let dnfs: Vec<Dnf> = normalized.into_iter().flatten().collect();
        tracing::debug!(action = %action.name, groups = groups.len(), generated = num_generated, "splitting");

        let mut generated = Vec::with_capacity(num_generated);
        let choices = dnfs.iter().map(|dnf| 0..dnf.len()).multi_cartesian_product();
        for (i, choice) in choices.enumerate() {
            let mut conditions = Vec::new();
            for ((group, dnf), &clause) in groups.iter().zip(&dnfs).zip(&choice) {
                for lit in dnf.clauses()[clause].iter() {
                    let cond = lit.to_expr(&mut problem.env, &mut negations)?;
                    conditions.push(Condition::over(group.interval.clone(), cond));
                }
            }
            let split = Action {
                name: generated_name(&action.name, i),
                conditions,
                ..action.clone()
            };
            generated.push(split.name.clone());
            problem.actions.add(split)?;
        }
        mapping.insert(action.name.clone(), generated);
    }
    Ok(Rewritten { problem, mapping })
}

/// Replaces each action of the plan by the original action it was derived from.
/// Arguments and timing of each step are left untouched.
pub fn rewrite_back(plan: &Plan, mapping: &ActionMapping) -> Result<Plan, TransformError> {
    plan.iter()
        .map(|step| match mapping.original(step.name.canonical_str()) {
            Some(original) => Ok(step.renamed(original)),
            None => Err(TransformError::UnmappedAction(step.name.clone())),
        })
        .collect()
}

/// Removes the disjunctions in the conditions of the actions of a problem.
///
/// The rewritten problem is computed on first request and reused afterwards.
/// The original problem is borrowed for the whole lifetime of the remover and thus cannot change in between.
pub struct DisjunctiveConditionsRemover<'a> {
    original: &'a Model,
    rewritten: OnceCell<Rewritten>,
    fresh_names: FreshNames,
}

impl<'a> DisjunctiveConditionsRemover<'a> {
    pub fn new(original: &'a Model) -> Self {
        Self {
            original,
            rewritten: OnceCell::new(),
            fresh_names: FreshNames::new("dnf"),
        }
    }

    pub fn original_problem(&self) -> &'a Model {
        self.original
    }

    fn rewritten(&self) -> Result<&Rewritten, TransformError> {
        self.rewritten.get_or_try_init(|| compile(self.original))
    }

    pub fn get_old_to_new_actions_mapping(&self) -> Result<&ActionMapping, TransformError> {
        Ok(&self.rewritten()?.mapping)
    }
}

impl Transformer for DisjunctiveConditionsRemover<'_> {
    fn get_rewritten_problem(&self) -> Result<&Model, TransformError> {
        Ok(&self.rewritten()?.problem)
    }

    fn get_original_action(&self, new_action: &str) -> Result<&Action, TransformError> {
        let original = self
            .rewritten()?
            .mapping
            .original(new_action)
            .ok_or_else(|| TransformError::UnmappedAction(new_action.into()))?;
        Ok(self.original.actions.get(original.canonical_str())?)
    }

    fn get_transformed_actions(&self, original_action: &str) -> Result<Vec<&Action>, TransformError> {
        let rewritten = self.rewritten()?;
        // fails if the action does not exist in the original problem
        self.original.actions.get(original_action)?;
        let names = rewritten.mapping.transformed(original_action).unwrap_or_default();
        names
            .iter()
            .map(|name| {
                rewritten
                    .problem
                    .actions
                    .get(name.canonical_str())
                    .map_err(TransformError::from)
            })
            .collect()
    }

    fn rewrite_back_plan(&self, plan: &Plan) -> Result<Plan, TransformError> {
        rewrite_back(plan, &self.rewritten()?.mapping)
    }

    fn get_fresh_name(&self, name: &str) -> Result<Sym, TransformError> {
        let problem = self.get_rewritten_problem()?;
        Ok(self.fresh_names.fresh(name, |candidate| {
            problem.has_name(candidate) || self.original.has_name(candidate)
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::samples;
    use planx::{ActionInstance, Duration, TimeRef, Timestamp};

    fn conditions(model: &Model, action: &str) -> Vec<String> {
        let action = model.actions.get(action).unwrap();
        action.conditions.iter().map(|c| c.display(&model.env)).collect()
    }

    #[test]
    fn naming() {
        assert_eq!(generated_name(&"move".into(), 0), "move__0__");
        assert_eq!(generated_name(&"move".into(), 12), "move__12__");
    }

    #[test]
    fn instantaneous_groups() {
        let model = samples::robot_locations_visited().unwrap();
        let groups = condition_groups(model.actions.get("move").unwrap());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].conditions.len(), 2);
        assert_eq!(groups[0].interval, TimeInterval::at(TimeRef::Start));
    }

    #[test]
    fn durative_groups() {
        let model = samples::temporal_mockup().unwrap();
        let groups = condition_groups(model.actions.get("act").unwrap());
        let intervals: Vec<String> = groups.iter().map(|g| g.interval.to_string()).collect();
        assert_eq!(
            intervals,
            ["[start]", "[start + 1]", "[start + 2, start + 3]", "[start + 4, start + 5]"]
        );
    }

    #[test]
    fn shared_interval_is_a_single_group() {
        let mut model = samples::temporal_mockup().unwrap();
        let act = model.actions.get("act").unwrap().clone();
        let b = model.env.state_variable("b", &[]).unwrap();
        let mut extended = Action {
            name: "other".into(),
            ..act
        };
        extended.conditions.push(Condition::at(Timestamp::after_start(1), b));
        let groups = condition_groups(&extended);
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[1].conditions.len(), 2);
        assert_eq!(groups[1].conditions[1], b);
    }

    #[test]
    fn split_conditions() {
        let model = samples::robot_locations_visited().unwrap();
        let rewritten = compile(&model).unwrap();
        let problem = &rewritten.problem;
        assert_eq!(problem.actions.len(), 3);
        assert_eq!(
            conditions(problem, "move__0__"),
            ["[start] robot_at(r, l_from)", "[start] is_connected(l_from, l_to)"]
        );
        assert_eq!(
            conditions(problem, "move__1__"),
            ["[start] robot_at(r, l_from)", "[start] is_connected(l_to, l_from)"]
        );
        // unchanged action
        assert_eq!(conditions(problem, "visit"), conditions(&model, "visit"));
        assert_eq!(
            rewritten.mapping.transformed("move").unwrap(),
            [Sym::from("move__0__"), Sym::from("move__1__")]
        );
        assert_eq!(rewritten.mapping.transformed("visit").unwrap(), [Sym::from("visit")]);
        assert_eq!(rewritten.mapping.original("move__1__").unwrap(), "move");
    }

    #[test]
    fn unsatisfiable_action() {
        let mut model = samples::mockup().unwrap();
        let a = model.env.state_variable("a", &[]).unwrap();
        let not_a = model.env.not(a).unwrap();
        let mut never = Action::instantaneous("never", vec![]);
        never.conditions.push(Condition::at(TimeRef::Start, a));
        never.conditions.push(Condition::at(TimeRef::Start, not_a));
        model.actions.add(never).unwrap();

        let rewritten = compile(&model).unwrap();
        assert_eq!(rewritten.mapping.transformed("never").unwrap(), &[] as &[Sym]);
        assert!(rewritten.problem.actions.get("never").is_err());
        assert_eq!(rewritten.problem.actions.len(), 4);
    }

    #[test]
    fn reserved_names() {
        let model = samples::reserved_name().unwrap();
        let err = compile(&model).err().unwrap();
        assert!(matches!(err, TransformError::ReservedActionName { .. }));
        let msg = err.to_string();
        assert!(msg.contains("instantaneous action act__1__"), "{msg}");
        assert!(msg.contains("mockup"), "{msg}");
    }

    #[test]
    fn split_limit() {
        let model = samples::temporal_mockup().unwrap();
        assert!(matches!(
            compile_with_limit(&model, 80),
            Err(TransformError::TooManyActions { limit: 80, .. })
        ));
        let rewritten = compile_with_limit(&model, 81).unwrap();
        assert_eq!(rewritten.problem.actions.len(), 81);
    }

    /// Problem with boolean fluents `x0..xn` and `y0..yn` and a durative action `wide`
    /// requiring `(x0 | y0) & ... & (xn | yn)` at start and `end_condition` at end.
    fn wide(n: usize, end_condition: impl Fn(&mut Model) -> ExprId) -> Model {
        let mut model = Model::new("wide", planx::Types::new(planx::UserTypes::new()));
        let mut pairs = Vec::new();
        for i in 0..n {
            let [x, y] = [format!("x{i}"), format!("y{i}")].map(|name| {
                model.env.fluents.add_fluent(name.as_str(), vec![], planx::Type::Bool, None).unwrap();
                model.env.state_variable(name.as_str(), &[]).unwrap()
            });
            pairs.push(model.env.or(&[x, y]).unwrap());
        }
        let start = model.env.and(&pairs).unwrap();
        let end = end_condition(&mut model);
        let duration = model.env.int(1).unwrap();
        let mut act = Action::new("wide", vec![], Duration::Fixed(duration));
        act.conditions.push(Condition::at(TimeRef::Start, start));
        act.conditions.push(Condition::at(TimeRef::End, end));
        model.actions.add(act).unwrap();
        model
    }

    #[test]
    fn split_limit_during_normalization() {
        let model = wide(40, |m| m.env.bool(true).unwrap());
        // 2^40 clauses are never built
        assert!(matches!(
            compile_with_limit(&model, 10),
            Err(TransformError::TooManyActions { limit: 10, ref action }) if action == "wide"
        ));
        let model = wide(3, |m| m.env.bool(true).unwrap());
        assert_eq!(compile_with_limit(&model, 8).unwrap().problem.actions.len(), 8);
        assert!(compile_with_limit(&model, 7).is_err());
    }

    #[test]
    fn unsatisfiable_group_beyond_limit() {
        // the start group is too large, but the end group can never hold
        let model = wide(40, |m| {
            let x = m.env.state_variable("x0", &[]).unwrap();
            let not_x = m.env.not(x).unwrap();
            m.env.and(&[x, not_x]).unwrap()
        });
        let rewritten = compile_with_limit(&model, 10).unwrap();
        assert!(rewritten.problem.actions.is_empty());
        assert_eq!(rewritten.mapping.transformed("wide").unwrap(), &[] as &[Sym]);
    }

    #[test]
    fn fresh_names() {
        let mut model = samples::robot_locations_visited().unwrap();
        model.env.objects.add_object("dnf_move_1", model.env.types.top_user_type()).unwrap();
        let remover = DisjunctiveConditionsRemover::new(&model);
        assert_eq!(remover.get_fresh_name("move").unwrap(), "dnf_move_0");
        // taken by an object of the problem
        assert_eq!(remover.get_fresh_name("move").unwrap(), "dnf_move_2");
        assert_eq!(remover.get_fresh_name("visit").unwrap(), "dnf_visit_3");

        let rewritten = remover.get_rewritten_problem().unwrap();
        for _ in 0..10 {
            let name = remover.get_fresh_name("move__0__").unwrap();
            assert!(name.canonical_str().starts_with("dnf_move__0___"));
            assert!(!rewritten.has_name(name.canonical_str()));
            assert!(!model.has_name(name.canonical_str()));
        }
        // each transformer has its own counter
        let other = DisjunctiveConditionsRemover::new(&model);
        assert_eq!(other.get_fresh_name("move").unwrap(), "dnf_move_0");
    }

    #[test]
    fn back_rewriting() {
        let model = samples::robot_locations_visited().unwrap();
        let rewritten = compile(&model).unwrap();
        let plan: Plan = [
            ActionInstance::new("move__1__", ["r1", "l2", "l1"]),
            ActionInstance::new("visit", ["r1", "l1"]),
        ]
        .into_iter()
        .collect();
        let back = rewrite_back(&plan, &rewritten.mapping).unwrap();
        assert_eq!(back.to_string(), "(move r1 l2 l1)\n(visit r1 l1)\n");

        let plan: Plan = [ActionInstance::new("move", ["r1", "l2", "l1"])].into_iter().collect();
        assert!(matches!(
            rewrite_back(&plan, &rewritten.mapping),
            Err(TransformError::UnmappedAction(name)) if name == "move"
        ));
    }
}
