use anyhow::{Context, Result};
use clap::Parser;
use planx::{ActionInstance, Plan};
use planx_transforms::disjunctions::MAX_SPLIT;
use planx_transforms::{DisjunctiveConditionsRemover, Transformer, samples};

/// Removes disjunctive conditions from the actions of a reference problem and shows the result.
#[derive(Debug, Clone, Parser)]
#[command(name = "planx-dnf", rename_all = "kebab-case")]
pub struct Opt {
    /// Problem to transform: one of "robot", "mockup", "temporal", "reserved"
    #[arg(long, short, default_value = "robot")]
    problem: String,

    /// Only print the mapping from original to generated actions
    #[arg(long)]
    mapping_only: bool,

    /// Actions of a plan of the rewritten problem, e.g. `--step "move__1__ r1 l2 l1"`.
    /// If present, the plan is rewritten back into a plan of the original problem.
    #[arg(long = "step")]
    steps: Vec<String>,

    /// Logging level to use: one of "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: tracing::Level,
}

fn parse_step(step: &str) -> Result<ActionInstance> {
    let mut parts = step.split_whitespace();
    let name = parts.next().with_context(|| format!("empty plan step: \"{step}\""))?;
    Ok(ActionInstance::new(name, parts))
}

fn main() -> Result<()> {
    let opt: Opt = Opt::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::Uptime::from(std::time::Instant::now()))
        .with_max_level(opt.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(limit = MAX_SPLIT.get(), "{}", MAX_SPLIT.name());

    let model = samples::by_name(&opt.problem)
        .with_context(|| format!("unknown problem: {}", opt.problem))??;
    let remover = DisjunctiveConditionsRemover::new(&model);
    let rewritten = remover.get_rewritten_problem()?;
    let mapping = remover.get_old_to_new_actions_mapping()?;
    tracing::info!(
        original = model.actions.len(),
        rewritten = rewritten.actions.len(),
        "removed disjunctive conditions"
    );

    if !opt.mapping_only {
        println!("{rewritten}\n");
    }
    print!("{mapping}");

    if !opt.steps.is_empty() {
        let plan: Plan = opt.steps.iter().map(|s| parse_step(s)).collect::<Result<_>>()?;
        let original = remover.rewrite_back_plan(&plan)?;
        println!("\nPlan:\n{original}");
    }
    Ok(())
}
