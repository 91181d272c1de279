//! Redeem Application CLI

use std::{io, path::PathBuf, process};

use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;
use tracing_subscriber::EnvFilter;

use redeem::{
    allocation,
    discounts::Discount,
    fixtures::{Fixture, FixtureError},
};
use redeem_app::{
    context::EngineContext,
    domain::discounts::data::{ConditionDraft, NewDiscount, OrderDraft, OrderLineDraft, RuleDraft},
};

#[derive(Debug, Parser)]
#[command(name = "redeem-app", about = "Redeem CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Evaluate(EvaluateArgs),
}

#[derive(Debug, Args)]
struct EvaluateArgs {
    /// Directory holding the catalog, discounts & orders fixture files
    #[arg(long, env = "REDEEM_FIXTURES_DIR", default_value = "crates/core/fixtures")]
    fixtures_dir: PathBuf,

    /// Fixture set to load
    #[arg(short, long, default_value = "demo")]
    fixture: String,

    /// Order key within the fixture set
    #[arg(short, long, default_value = "mixed")]
    order: String,

    /// Discount codes to apply, in stacking order
    #[arg(short, long, default_value = "SUMMER10")]
    codes: Vec<String>,

    /// Print the evaluated order as JSON instead of a receipt
    #[arg(long)]
    json: bool,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Evaluate(args) => evaluate(args).await,
    }
}

async fn evaluate(args: EvaluateArgs) -> Result<(), String> {
    let mut fixture = Fixture::with_base_path(&args.fixtures_dir);

    load_set(&mut fixture, &args.fixture)
        .map_err(|error| format!("failed to load fixture set '{}': {error}", args.fixture))?;

    let (context, catalog, regions) = EngineContext::in_memory();

    for (product, facts) in fixture.facts() {
        catalog.put(*product, facts.clone());
    }

    for region in fixture.regions() {
        regions.put(region);
    }

    for discount in fixture.discounts() {
        context
            .discounts
            .create_discount(discount_draft(discount))
            .await
            .map_err(|error| format!("failed to create discount {}: {error}", discount.code))?;
    }

    let order = fixture
        .order(&args.order)
        .map_err(|error| format!("failed to load order '{}': {error}", args.order))?;

    let ctx = fixture
        .order_context(&args.order, Timestamp::now())
        .map_err(|error| format!("failed to build evaluation context: {error}"))?;

    let draft = OrderDraft {
        currency: order.currency().iso_alpha_code.to_string(),
        lines: order
            .iter()
            .map(|line| OrderLineDraft {
                product: line.product(),
                unit_price: u64::try_from(line.unit_price().to_minor_units()).unwrap_or_default(),
                quantity: line.quantity(),
            })
            .collect(),
    };

    let evaluated = context
        .discounts
        .evaluate_order(draft, args.codes.clone(), ctx)
        .await
        .map_err(|error| format!("failed to evaluate order: {error}"))?;

    if args.json {
        let json = serde_json::to_string_pretty(&evaluated)
            .map_err(|error| format!("failed to serialize evaluation: {error}"))?;

        println!("{json}");

        return Ok(());
    }

    // Receipt rendering needs the per-line allocation detail the evaluated
    // totals flatten away, so price the order again through the aggregator.
    let mut discounts = Vec::with_capacity(args.codes.len());

    for code in &args.codes {
        let record = context
            .discounts
            .get_by_code(code)
            .await
            .map_err(|error| format!("failed to fetch discount {code}: {error}"))?;

        discounts.push(record.discount);
    }

    let allocated = allocation::apply(&order, &discounts)
        .map_err(|error| format!("failed to price order: {error}"))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    allocated
        .write_to(&mut handle, fixture.labels())
        .map_err(|error| format!("failed to render receipt: {error}"))?;

    Ok(())
}

/// Loads the catalog, discounts, and orders files sharing one set name.
fn load_set(fixture: &mut Fixture, name: &str) -> Result<(), FixtureError> {
    fixture
        .load_catalog(name)?
        .load_discounts(name)?
        .load_orders(name)?;

    Ok(())
}

/// Re-expresses a pre-built fixture discount as a creation draft.
fn discount_draft(discount: &Discount) -> NewDiscount {
    let conditions = discount
        .rule
        .conditions()
        .iter()
        .map(|condition| ConditionDraft {
            uuid: None,
            operator: condition.operator,
            scope: condition.scope.clone(),
        })
        .collect();

    NewDiscount {
        code: discount.code.as_str().to_string(),
        rule: RuleDraft {
            description: discount.rule.description().to_string(),
            value: discount.rule.value(),
            allocation: discount.rule.allocation(),
            conditions,
        },
        is_dynamic: discount.is_dynamic,
        is_disabled: discount.is_disabled,
        starts_at: discount.starts_at,
        ends_at: discount.ends_at,
        valid_duration: discount.valid_duration,
        usage_limit: discount.usage_limit,
        regions: discount.regions.clone(),
    }
}
