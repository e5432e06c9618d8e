//! Small reference problems with disjunctive conditions.

use planx::*;

fn bool_fluents(model: &mut Model, names: &[&str]) -> Res<()> {
    for &name in names {
        model.env.fluents.add_fluent(name, vec![], Type::Bool, None)?;
    }
    Ok(())
}

/// `fluent := value`, where `fluent` has no parameter
fn set(env: &mut Environment, timing: impl Into<Timestamp>, fluent: &str, value: bool) -> Res<Effect> {
    let value = env.bool(value)?;
    Ok(Effect::assignment(timing, StateVariable::new(fluent, SeqExprId::new()), value))
}

/// A robot moving between connected locations, with an undirected `is_connected` relation.
///
/// `move` requires `is_connected(l_from, l_to) | is_connected(l_to, l_from)`, `visit` has no disjunction.
pub fn robot_locations_visited() -> Res<Model> {
    let mut types = UserTypes::new();
    types.add_type("robot", None);
    types.add_type("location", None);
    let mut model = Model::new("robot_locations_visited", Types::new(types));
    let robot = model.env.types.get_user_type("robot")?;
    let location = model.env.types.get_user_type("location")?;

    model.env.objects.add_object("r1", robot.clone())?;
    for l in ["l1", "l2", "l3"] {
        model.env.objects.add_object(l, location.clone())?;
    }
    let fluents = &mut model.env.fluents;
    fluents.add_fluent(
        "robot_at",
        vec![Param::new("r", &robot), Param::new("l", &location)],
        Type::Bool,
        None,
    )?;
    fluents.add_fluent(
        "is_connected",
        vec![Param::new("from", &location), Param::new("to", &location)],
        Type::Bool,
        None,
    )?;
    fluents.add_fluent("visited", vec![Param::new("l", &location)], Type::Bool, None)?;

    let env = &mut model.env;
    let tru = env.bool(true)?;
    let fal = env.bool(false)?;

    // move(r, l_from, l_to)
    let params = vec![
        Param::new("r", &robot),
        Param::new("l_from", &location),
        Param::new("l_to", &location),
    ];
    let r = env.param(&params[0])?;
    let from = env.param(&params[1])?;
    let to = env.param(&params[2])?;
    let at_from = env.state_variable("robot_at", &[r, from])?;
    let connected = env.state_variable("is_connected", &[from, to])?;
    let connected_back = env.state_variable("is_connected", &[to, from])?;
    let either_way = env.or(&[connected, connected_back])?;
    let mut mv = Action::instantaneous("move", params);
    mv.conditions.push(Condition::at(TimeRef::Start, at_from));
    mv.conditions.push(Condition::at(TimeRef::Start, either_way));
    mv.effects.push(Effect::assignment(
        TimeRef::Start,
        StateVariable::new("robot_at", vec![r, from]),
        fal,
    ));
    mv.effects.push(Effect::assignment(
        TimeRef::Start,
        StateVariable::new("robot_at", vec![r, to]),
        tru,
    ));

    // visit(r, l)
    let params = vec![Param::new("r", &robot), Param::new("l", &location)];
    let r = env.param(&params[0])?;
    let l = env.param(&params[1])?;
    let at = env.state_variable("robot_at", &[r, l])?;
    let mut visit = Action::instantaneous("visit", params);
    visit.conditions.push(Condition::at(TimeRef::Start, at));
    visit
        .effects
        .push(Effect::assignment(TimeRef::Start, StateVariable::new("visited", vec![l]), tru));

    model.actions.add(mv)?;
    model.actions.add(visit)?;

    let env = &mut model.env;
    let r1 = env.object("r1")?;
    let [l1, l2, l3] = [env.object("l1")?, env.object("l2")?, env.object("l3")?];
    model.init.push(Effect::assignment(
        Timestamp::ORIGIN,
        StateVariable::new("robot_at", vec![r1, l1]),
        tru,
    ));
    for (a, b) in [(l1, l2), (l2, l3)] {
        model.init.push(Effect::assignment(
            Timestamp::ORIGIN,
            StateVariable::new("is_connected", vec![a, b]),
            tru,
        ));
    }
    for l in [l1, l2, l3] {
        let visited = model.env.state_variable("visited", &[l])?;
        model.goals.push(SimpleGoal::at(Timestamp::HORIZON, visited).into());
    }
    Ok(model)
}

/// `(a <=> (b => c)) => (a & d)`, whose disjunctive normal form is `(!a & !b) | (!a & c) | (b & !c & a) | (a & d)`
fn ad_hoc_condition(env: &mut Environment) -> Res<ExprId> {
    let [a, b, c, d] = [
        env.state_variable("a", &[])?,
        env.state_variable("b", &[])?,
        env.state_variable("c", &[])?,
        env.state_variable("d", &[])?,
    ];
    let b_implies_c = env.implies(b, c)?;
    let lhs = env.iff(a, b_implies_c)?;
    let rhs = env.and(&[a, d])?;
    env.implies(lhs, rhs)
}

fn ad_hoc_action(env: &mut Environment, name: &str) -> Res<Action> {
    let cond = ad_hoc_condition(env)?;
    let mut act = Action::instantaneous(name, vec![]);
    act.conditions.push(Condition::at(TimeRef::Start, cond));
    act.effects.push(set(env, TimeRef::Start, "a", true)?);
    Ok(act)
}

fn mockup_context(name: &str, initial: [bool; 4]) -> Res<Model> {
    let mut model = Model::new(name, Types::new(UserTypes::new()));
    let fluents = ["a", "b", "c", "d"];
    bool_fluents(&mut model, &fluents)?;
    for (fluent, value) in fluents.into_iter().zip(initial) {
        let init = set(&mut model.env, Timestamp::ORIGIN, fluent, value)?;
        model.init.push(init);
    }
    let a = model.env.state_variable("a", &[])?;
    model.goals.push(SimpleGoal::at(Timestamp::HORIZON, a).into());
    Ok(model)
}

/// Problem `mockup` with a single instantaneous action `act`, whose condition has four disjuncts.
pub fn mockup() -> Res<Model> {
    let mut model = mockup_context("mockup", [true, false, true, false])?;
    let act = ad_hoc_action(&mut model.env, "act")?;
    model.actions.add(act)?;
    Ok(model)
}

/// Same as [`mockup`] with an additional action named `act__1__`.
pub fn reserved_name() -> Res<Model> {
    let mut model = mockup()?;
    let act = ad_hoc_action(&mut model.env, "act__1__")?;
    model.actions.add(act)?;
    Ok(model)
}

/// Problem `temporal_mockup` with a single durative action `act`, whose condition `!a => (b | ((c <=> d) & d))`
/// is required at four distinct times (two timepoints, two intervals).
pub fn temporal_mockup() -> Res<Model> {
    let mut model = mockup_context("temporal_mockup", [false, false, true, false])?;
    let env = &mut model.env;
    let [a, b, c, d] = [
        env.state_variable("a", &[])?,
        env.state_variable("b", &[])?,
        env.state_variable("c", &[])?,
        env.state_variable("d", &[])?,
    ];
    let not_a = env.not(a)?;
    let c_iff_d = env.iff(c, d)?;
    let both = env.and(&[c_iff_d, d])?;
    let disj = env.or(&[b, both])?;
    let exp = env.implies(not_a, disj)?;

    let duration = env.int(10)?;
    let mut act = Action::new("act", vec![], Duration::Fixed(duration));
    act.conditions.push(Condition::at(TimeRef::Start, exp));
    act.conditions.push(Condition::at(Timestamp::after_start(1), exp));
    act.conditions.push(Condition::over(
        TimeInterval::closed(Timestamp::after_start(2), Timestamp::after_start(3)),
        exp,
    ));
    act.conditions.push(Condition::over(
        TimeInterval::closed(Timestamp::after_start(4), Timestamp::after_start(5)),
        exp,
    ));
    act.effects.push(set(env, Timestamp::after_start(6), "a", true)?);
    model.actions.add(act)?;
    Ok(model)
}

/// Named reference problems, e.g., for command line selection.
pub fn by_name(name: &str) -> Option<Res<Model>> {
    match name {
        "robot" | "robot_locations_visited" => Some(robot_locations_visited()),
        "mockup" => Some(mockup()),
        "temporal" | "temporal_mockup" => Some(temporal_mockup()),
        "reserved" => Some(reserved_name()),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn samples_are_well_formed() -> Res<()> {
        let robot = robot_locations_visited()?;
        assert_eq!(robot.actions.len(), 2);
        assert_eq!(robot.goals.len(), 3);
        assert!(!robot.is_temporal());

        let mockup = mockup()?;
        let act = &mockup.env / mockup.actions.get("act")?;
        assert!(act.to_string().contains("imply(iff(a, imply(b, c)), and(a, d))"));

        let temporal = temporal_mockup()?;
        assert!(temporal.is_temporal());
        assert_eq!(temporal.actions.get("act")?.conditions.len(), 4);

        assert_eq!(reserved_name()?.actions.len(), 2);
        assert!(by_name("unknown").is_none());
        Ok(())
    }
}
