//! Conversion of boolean conditions into disjunctive normal form.
//!
//! The conversion happens in two passes:
//!
//!  - [`Nnf::of`] eliminates implications and equivalences and pushes negations down to the atoms,
//!    tracking the polarity of each subexpression instead of building intermediate negations.
//!  - [`Nnf::to_dnf`] distributes conjunctions over disjunctions, from left to right.
//!    In the resulting sequence of clauses, the leftmost operand of a conjunction varies the slowest.
//!
//! Any expression that is not a boolean connective (`and`, `or`, `not`, `imply`, `iff`) or a constant is an atom.
//!
//! Both passes stop as soon as a formula built along the way has more clauses than a given limit.

use hashbrown::HashMap;
use itertools::Itertools;
use planx::{Environment, Expr, ExprId, Fun, Res};
use smallvec::SmallVec;
use thiserror::Error;

/// The normal form of a formula (or of one of its subformulas) has more clauses than allowed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("disjunctive normal form with more than {limit} clauses")]
pub struct TooManyClauses {
    pub limit: usize,
}

/// An atom or its negation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    pub atom: ExprId,
    pub positive: bool,
}

impl Literal {
    pub fn pos(atom: ExprId) -> Self {
        Literal { atom, positive: true }
    }

    pub fn neg(atom: ExprId) -> Self {
        Literal { atom, positive: false }
    }

    pub fn negated(self) -> Self {
        Literal {
            atom: self.atom,
            positive: !self.positive,
        }
    }

    /// Structural equality: same polarity on structurally equal atoms.
    pub fn same_as(&self, other: &Literal, env: &Environment) -> bool {
        self.positive == other.positive && env.structurally_equal(self.atom, other.atom)
    }

    pub fn is_complement_of(&self, other: &Literal, env: &Environment) -> bool {
        self.same_as(&other.negated(), env)
    }

    /// Builds an expression equivalent to this literal.
    /// Negative literals are materialized as `not(atom)`, interned at most once per atom.
    pub fn to_expr(self, env: &mut Environment, negations: &mut Negations) -> Res<ExprId> {
        if self.positive {
            Ok(self.atom)
        } else {
            negations.of(self.atom, env)
        }
    }

    pub fn display(&self, env: &Environment) -> String {
        if self.positive {
            (env / self.atom).to_string()
        } else {
            format!("not({})", env / self.atom)
        }
    }
}

/// Cache of the `not(atom)` expressions created in an environment.
#[derive(Default)]
pub struct Negations {
    cache: HashMap<ExprId, ExprId>,
}

impl Negations {
    pub fn of(&mut self, atom: ExprId, env: &mut Environment) -> Res<ExprId> {
        if let Some(&neg) = self.cache.get(&atom) {
            return Ok(neg);
        }
        let neg = env.not(atom)?;
        self.cache.insert(atom, neg);
        Ok(neg)
    }
}

/// A conjunction of literals. The empty clause is `true`.
///
/// Literals are kept in insertion order, without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Clause {
    literals: SmallVec<[Literal; 4]>,
}

impl Clause {
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> + '_ {
        self.literals.iter()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Adds a literal to the conjunction.
    /// Returns false if the clause became contradictory (it contains the complement of `lit`).
    fn push(&mut self, lit: Literal, env: &Environment) -> bool {
        if self.literals.iter().any(|l| l.is_complement_of(&lit, env)) {
            return false;
        }
        if !self.literals.iter().any(|l| l.same_as(&lit, env)) {
            self.literals.push(lit);
        }
        true
    }

    /// Conjunction of the two clauses, or `None` if it is contradictory.
    pub fn conjoin(&self, other: &Clause, env: &Environment) -> Option<Clause> {
        let mut res = self.clone();
        for &lit in &other.literals {
            if !res.push(lit, env) {
                return None;
            }
        }
        Some(res)
    }

    pub fn eval(&self, holds: &impl Fn(ExprId) -> bool) -> bool {
        self.literals.iter().all(|l| holds(l.atom) == l.positive)
    }

    pub fn display(&self, env: &Environment) -> String {
        if self.literals.is_empty() {
            "true".to_string()
        } else {
            self.literals.iter().map(|l| l.display(env)).join(" & ")
        }
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Clause {
            literals: iter.into_iter().collect(),
        }
    }
}

/// A disjunction of clauses. An empty disjunction is `false`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dnf {
    clauses: Vec<Clause>,
}

impl Dnf {
    pub fn tautology() -> Self {
        Dnf {
            clauses: vec![Clause::default()],
        }
    }

    pub fn contradiction() -> Self {
        Dnf { clauses: Vec::new() }
    }

    pub fn literal(lit: Literal) -> Self {
        Dnf {
            clauses: vec![std::iter::once(lit).collect()],
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Disjunction: the clauses of `self` followed by the ones of `other`.
    pub fn or(mut self, other: Dnf, limit: usize) -> Result<Dnf, TooManyClauses> {
        if self.clauses.len() + other.clauses.len() > limit {
            return Err(TooManyClauses { limit });
        }
        self.clauses.extend(other.clauses);
        Ok(self)
    }

    /// Conjunction, distributed over the clauses of both sides.
    /// Clauses of `self` vary the slowest, contradictory combinations are dropped.
    ///
    /// Fails as soon as more than `limit` clauses survive.
    pub fn and(&self, other: &Dnf, env: &Environment, limit: usize) -> Result<Dnf, TooManyClauses> {
        let mut clauses = Vec::new();
        for (l, r) in self.clauses.iter().cartesian_product(&other.clauses) {
            if let Some(clause) = l.conjoin(r, env) {
                if clauses.len() == limit {
                    return Err(TooManyClauses { limit });
                }
                clauses.push(clause);
            }
        }
        Ok(Dnf { clauses })
    }

    pub fn eval(&self, holds: &impl Fn(ExprId) -> bool) -> bool {
        self.clauses.iter().any(|c| c.eval(holds))
    }

    pub fn display(&self, env: &Environment) -> String {
        if self.clauses.is_empty() {
            "false".to_string()
        } else {
            self.clauses.iter().map(|c| format!("({})", c.display(env))).join(" | ")
        }
    }
}

/// A boolean formula in negation normal form: negations only appear in literals.
#[derive(Clone, Debug)]
pub enum Nnf {
    Lit(Literal),
    And(Vec<Nnf>),
    Or(Vec<Nnf>),
}

impl Nnf {
    /// Negation normal form of `expr` (if `positive`) or of its negation (otherwise).
    pub fn of(env: &Environment, expr: ExprId, positive: bool) -> Nnf {
        // conjunction of the subformulas under the current polarity (a disjunction if negative)
        let all = |subs: Vec<Nnf>| if positive { Nnf::And(subs) } else { Nnf::Or(subs) };
        let any = |subs: Vec<Nnf>| if positive { Nnf::Or(subs) } else { Nnf::And(subs) };
        match env.node(expr).expr() {
            Expr::Bool(value) => {
                if *value == positive {
                    Nnf::And(Vec::new())
                } else {
                    Nnf::Or(Vec::new())
                }
            }
            Expr::App(fun, args) => match (fun, args.as_slice()) {
                (Fun::Not, [e]) => Nnf::of(env, *e, !positive),
                (Fun::And, es) => all(es.iter().map(|e| Nnf::of(env, *e, positive)).collect()),
                (Fun::Or, es) => any(es.iter().map(|e| Nnf::of(env, *e, positive)).collect()),
                // p => q  ~~>  !p | q
                (Fun::Implies, [p, q]) => any(vec![Nnf::of(env, *p, !positive), Nnf::of(env, *q, positive)]),
                // p <=> q  ~~>  (p & q) | (!p & !q)
                // !(p <=> q)  ~~>  (!p | !q) & (p | q)
                (Fun::Iff, [p, q]) => {
                    let both = |pol: bool| all(vec![Nnf::of(env, *p, pol), Nnf::of(env, *q, pol)]);
                    if positive {
                        Nnf::Or(vec![both(true), both(false)])
                    } else {
                        Nnf::And(vec![both(false), both(true)])
                    }
                }
                _ => Nnf::atom(expr, positive),
            },
            _ => Nnf::atom(expr, positive),
        }
    }

    fn atom(expr: ExprId, positive: bool) -> Nnf {
        Nnf::Lit(Literal { atom: expr, positive })
    }

    /// Disjunctive normal form of this formula, failing if it or any of its subformulas has more than `limit` clauses.
    pub fn to_dnf(&self, env: &Environment, limit: usize) -> Result<Dnf, TooManyClauses> {
        match self {
            Nnf::Lit(lit) => Ok(Dnf::literal(*lit)),
            Nnf::Or(disjuncts) => disjuncts
                .iter()
                .try_fold(Dnf::contradiction(), |acc, d| acc.or(d.to_dnf(env, limit)?, limit)),
            Nnf::And(conjuncts) => {
                let mut acc = Dnf::tautology();
                for c in conjuncts {
                    if acc.is_empty() {
                        break;
                    }
                    acc = acc.and(&c.to_dnf(env, limit)?, env, limit)?;
                }
                Ok(acc)
            }
        }
    }
}

/// Disjunctive normal form of the conjunction of all `exprs`, with at most `limit` clauses.
pub fn normalize(env: &Environment, exprs: &[ExprId], limit: usize) -> Result<Dnf, TooManyClauses> {
    let conjunction = Nnf::And(exprs.iter().map(|&e| Nnf::of(env, e, true)).collect());
    conjunction.to_dnf(env, limit)
}

#[cfg(test)]
mod test {
    use super::*;
    use planx::{Type, Types, UserTypes};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    struct Fixture {
        env: Environment,
        atoms: Vec<ExprId>,
    }

    impl Fixture {
        fn new(num_atoms: usize) -> Fixture {
            let mut env = Environment::new(Types::new(UserTypes::new()));
            let mut atoms = Vec::new();
            for i in 0..num_atoms {
                let name = format!("{}", (b'a' + i as u8) as char);
                env.fluents.add_fluent(name.as_str(), vec![], Type::Bool, None).unwrap();
                atoms.push(env.state_variable(name.as_str(), &[]).unwrap());
            }
            Fixture { env, atoms }
        }

        fn clauses(&self, dnf: &Dnf) -> Vec<String> {
            dnf.clauses().iter().map(|c| c.display(&self.env)).collect()
        }

        /// All assignments of the atoms, as a function from atom to its value.
        fn assignments(&self) -> impl Iterator<Item = impl Fn(ExprId) -> bool + '_> + '_ {
            (0..(1u32 << self.atoms.len())).map(move |bits| {
                move |e: ExprId| {
                    let i = self.atoms.iter().position(|&a| self.env.structurally_equal(a, e)).unwrap();
                    bits & (1 << i) != 0
                }
            })
        }
    }

    fn normal_form(env: &Environment, exprs: &[ExprId]) -> Dnf {
        normalize(env, exprs, usize::MAX).unwrap()
    }

    fn eval(env: &Environment, e: ExprId, holds: &impl Fn(ExprId) -> bool) -> bool {
        match env.node(e).expr() {
            Expr::Bool(b) => *b,
            Expr::App(Fun::Not, args) => !eval(env, args[0], holds),
            Expr::App(Fun::And, args) => args.iter().all(|&a| eval(env, a, holds)),
            Expr::App(Fun::Or, args) => args.iter().any(|&a| eval(env, a, holds)),
            Expr::App(Fun::Implies, args) => !eval(env, args[0], holds) || eval(env, args[1], holds),
            Expr::App(Fun::Iff, args) => eval(env, args[0], holds) == eval(env, args[1], holds),
            _ => holds(e),
        }
    }

    #[test]
    fn implication_and_equivalence() -> Res<()> {
        let mut f = Fixture::new(4);
        let [a, b, c, d] = [f.atoms[0], f.atoms[1], f.atoms[2], f.atoms[3]];
        let env = &mut f.env;
        // (a <=> (b => c)) => (a & d)
        let b_implies_c = env.implies(b, c)?;
        let lhs = env.iff(a, b_implies_c)?;
        let rhs = env.and(&[a, d])?;
        let e = env.implies(lhs, rhs)?;

        let dnf = normal_form(&f.env, &[e]);
        assert_eq!(
            f.clauses(&dnf),
            ["not(a) & not(b)", "not(a) & c", "b & not(c) & a", "a & d"]
        );
        Ok(())
    }

    #[test]
    fn nested_disjunctions() -> Res<()> {
        let mut f = Fixture::new(4);
        let [a, b, c, d] = [f.atoms[0], f.atoms[1], f.atoms[2], f.atoms[3]];
        let env = &mut f.env;
        // !a => (b | ((c <=> d) & d))
        let not_a = env.not(a)?;
        let c_iff_d = env.iff(c, d)?;
        let conj = env.and(&[c_iff_d, d])?;
        let disj = env.or(&[b, conj])?;
        let e = env.implies(not_a, disj)?;

        let dnf = normal_form(&f.env, &[e]);
        assert_eq!(f.clauses(&dnf), ["a", "b", "c & d"]);
        Ok(())
    }

    #[test]
    fn distribution_order() -> Res<()> {
        let mut f = Fixture::new(4);
        let [a, b, c, d] = [f.atoms[0], f.atoms[1], f.atoms[2], f.atoms[3]];
        let env = &mut f.env;
        let ab = env.or(&[a, b])?;
        let cd = env.or(&[c, d])?;

        // the conjunction of several expressions is distributed from left to right
        let dnf = normal_form(&f.env, &[ab, cd]);
        assert_eq!(f.clauses(&dnf), ["a & c", "a & d", "b & c", "b & d"]);

        let dnf = normal_form(&f.env, &[cd, ab]);
        assert_eq!(f.clauses(&dnf), ["c & a", "c & b", "d & a", "d & b"]);
        Ok(())
    }

    #[test]
    fn de_morgan() -> Res<()> {
        let mut f = Fixture::new(3);
        let [a, b, c] = [f.atoms[0], f.atoms[1], f.atoms[2]];
        let env = &mut f.env;
        let not_c = env.not(c)?;
        let and = env.and(&[a, b])?;
        let or = env.or(&[and, not_c])?;
        let e = env.not(or)?;
        // !((a & b) | !c)  ==  (!a | !b) & c
        let dnf = normal_form(&f.env, &[e]);
        assert_eq!(f.clauses(&dnf), ["not(a) & c", "not(b) & c"]);

        let double = f.env.not(e)?;
        let dnf = normal_form(&f.env, &[double]);
        assert_eq!(f.clauses(&dnf), ["a & b", "not(c)"]);
        Ok(())
    }

    #[test]
    fn duplicates_and_contradictions() -> Res<()> {
        let mut f = Fixture::new(2);
        let [a, b] = [f.atoms[0], f.atoms[1]];
        let env = &mut f.env;
        // an atom interned twice is still the same literal
        let a2 = env.state_variable("a", &[])?;
        let not_a = env.not(a2)?;
        let dup = env.and(&[a, b, a2])?;
        assert_eq!(f.clauses(&normal_form(&f.env, &[dup])), ["a & b"]);

        let contradiction = f.env.and(&[a, b, not_a])?;
        assert!(normal_form(&f.env, &[contradiction]).is_empty());

        // (a | b) & !a: only the second branch survives
        let a_or_b = f.env.or(&[a, b])?;
        assert_eq!(f.clauses(&normal_form(&f.env, &[a_or_b, not_a])), ["b & not(a)"]);
        Ok(())
    }

    #[test]
    fn constants() -> Res<()> {
        let mut f = Fixture::new(2);
        let [a, b] = [f.atoms[0], f.atoms[1]];
        let env = &mut f.env;
        let tru = env.bool(true)?;
        let fal = env.bool(false)?;
        let not_fal = env.not(fal)?;
        let or_true = env.or(&[a, tru])?;
        let and_false = env.and(&[a, fal])?;
        let empty_or = env.or(&[])?;
        let or_false = env.or(&[fal, b])?;

        assert_eq!(normal_form(&f.env, &[]), Dnf::tautology());
        assert_eq!(f.clauses(&normal_form(&f.env, &[tru])), ["true"]);
        assert_eq!(f.clauses(&normal_form(&f.env, &[not_fal])), ["true"]);
        assert_eq!(f.clauses(&normal_form(&f.env, &[or_true])), ["a", "true"]);
        assert!(normal_form(&f.env, &[fal]).is_empty());
        assert!(normal_form(&f.env, &[and_false]).is_empty());
        assert!(normal_form(&f.env, &[empty_or]).is_empty());
        assert_eq!(f.clauses(&normal_form(&f.env, &[or_false])), ["b"]);
        Ok(())
    }

    #[test]
    fn non_boolean_subterms_are_atoms() -> Res<()> {
        let mut f = Fixture::new(1);
        let a = f.atoms[0];
        let env = &mut f.env;
        let one = env.int(1)?;
        let two = env.int(2)?;
        let eq = env.app(Fun::Eq, &[one, two])?;
        let not_eq = env.not(eq)?;
        let e = env.implies(a, not_eq)?;
        assert_eq!(f.clauses(&normal_form(&f.env, &[e])), ["not(a)", "not(=(1, 2))"]);
        Ok(())
    }

    #[test]
    fn negations_are_shared() -> Res<()> {
        let mut f = Fixture::new(2);
        let [a, b] = [f.atoms[0], f.atoms[1]];
        let mut negations = Negations::default();
        let n1 = Literal::neg(a).to_expr(&mut f.env, &mut negations)?;
        let n2 = Literal::neg(a).to_expr(&mut f.env, &mut negations)?;
        let n3 = Literal::neg(b).to_expr(&mut f.env, &mut negations)?;
        assert_eq!(n1, n2);
        assert_ne!(n1, n3);
        assert_eq!(Literal::pos(b).to_expr(&mut f.env, &mut negations)?, b);
        assert_eq!((&f.env / n1).to_string(), "not(a)");
        Ok(())
    }

    #[test]
    fn clause_limit() -> Res<()> {
        let mut f = Fixture::new(26);
        let env = &mut f.env;
        // (a | b) & (c | d) & ... & (y | z): 2^13 clauses
        let pairs = f
            .atoms
            .chunks(2)
            .map(|pair| env.or(pair))
            .collect::<Res<Vec<_>>>()?;
        let wide = env.and(&pairs)?;

        assert_eq!(normalize(&f.env, &[wide], 10), Err(TooManyClauses { limit: 10 }));
        assert_eq!(normalize(&f.env, &[wide], 1 << 12), Err(TooManyClauses { limit: 1 << 12 }));
        assert_eq!(normalize(&f.env, &[wide], 1 << 13).unwrap().len(), 1 << 13);

        // a disjunction is bounded as well
        let [a, b, c] = [f.atoms[0], f.atoms[1], f.atoms[2]];
        let abc = f.env.or(&[a, b, c])?;
        assert!(normalize(&f.env, &[abc], 2).is_err());
        assert_eq!(normalize(&f.env, &[abc], 3).unwrap().len(), 3);
        Ok(())
    }

    /// Random formula over the given atoms, with at most `depth` nested connectives.
    fn random_formula(rng: &mut SmallRng, env: &mut Environment, atoms: &[ExprId], depth: u32) -> ExprId {
        if depth == 0 || rng.random_bool(0.2) {
            return atoms[rng.random_range(0..atoms.len())];
        }
        let sub = |rng: &mut SmallRng, env: &mut Environment| random_formula(rng, env, atoms, depth - 1);
        match rng.random_range(0..5) {
            0 => {
                let e = sub(rng, env);
                env.not(e).unwrap()
            }
            1 | 2 => {
                let n = rng.random_range(1..4);
                let args: Vec<ExprId> = (0..n).map(|_| sub(rng, env)).collect();
                if rng.random_bool(0.5) {
                    env.and(&args).unwrap()
                } else {
                    env.or(&args).unwrap()
                }
            }
            3 => {
                let (p, q) = (sub(rng, env), sub(rng, env));
                env.implies(p, q).unwrap()
            }
            _ => {
                let (p, q) = (sub(rng, env), sub(rng, env));
                env.iff(p, q).unwrap()
            }
        }
    }

    #[test]
    fn random_formulas_are_equivalent() {
        let mut f = Fixture::new(4);
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for _ in 0..300 {
            let e = random_formula(&mut rng, &mut f.env, &f.atoms, 3);
            let dnf = normal_form(&f.env, &[e]);
            for holds in f.assignments() {
                assert_eq!(
                    eval(&f.env, e, &holds),
                    dnf.eval(&holds),
                    "{} ~~> {}",
                    &f.env / e,
                    dnf.display(&f.env)
                );
            }
            // normalization is deterministic
            assert_eq!(dnf, normal_form(&f.env, &[e]));
        }
    }
}
