mod serve;
mod store;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use restake_lp::{
    Asset, Instruction, LedgerError, LedgerEvent, Outcome, RestakeLp, Transfer,
};
use restake_lp_performer::{DEFAULT_PORT, DEFAULT_TIMEOUT_SECS};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use tracing::info;
use tracing_subscriber::EnvFilter;

use store::{CliConfig, Store};

// ─── Version banner ───────────────────────────────────────────────────────────

fn print_banner() {
    let ver = env!("CARGO_PKG_VERSION");
    println!();
    println!("  Restake-LP  v{ver}  ·  multi-protocol liquidity and yield ledger");
    println!("  {}", "─".repeat(62));
    println!("  Parts     registry · positions · pools · strategies · admin");
    println!("  State     JSON file (--state / RESTAKE_LP_STATE)");
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// Restake-LP: liquidity, restaking and yield-strategy accounting across protocols.
///
/// Every command supports --json for machine-readable output.
/// Global options can also be set via environment variables:
///   RESTAKE_LP_STATE  : path to the ledger state file
///   RESTAKE_LP_CALLER : base-58 pubkey the command acts as
///   RESTAKE_LP_CONFIG : TOML config (admins + ledger bounds)
#[derive(Parser)]
#[command(
    name    = "restake-lp",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Multi-protocol liquidity, restaking and yield-strategy ledger.",
    after_help = "\
ENVIRONMENT:
  RESTAKE_LP_STATE    Ledger state file  [default: restake-lp.json]
  RESTAKE_LP_CALLER   Base-58 pubkey of the acting user or admin
  RESTAKE_LP_CONFIG   TOML config: `admins = [..]` plus any ledger bound
  RUST_LOG            Log filter for stderr output  [default: warn]

QUICK START:
  restake-lp add-protocol --id <PK> --name eigen --fee-bps 100 --router <PK>
  restake-lp add-token    --id <PK> --symbol stETH --decimals 18 --min-amount 1000
  restake-lp restake      --protocol <PK> --token <PK> --amount 5000 --strategy core
  restake-lp positions
  restake-lp serve        --port 8080"
)]
struct Cli {
    /// Ledger state file (created on first write)
    #[arg(
        long,
        global     = true,
        value_name = "PATH",
        default_value = "restake-lp.json",
        env = "RESTAKE_LP_STATE"
    )]
    state: PathBuf,

    /// Pubkey the command acts as (required for commands that change the ledger)
    #[arg(long, global = true, value_name = "PUBKEY", env = "RESTAKE_LP_CALLER")]
    caller: Option<Pubkey>,

    /// TOML config file with `admins` and ledger bounds
    #[arg(long, global = true, value_name = "PATH", env = "RESTAKE_LP_CONFIG")]
    config: Option<PathBuf>,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    // ── Registry (admin) ──────────────────────────────────────────────────────
    /// Allowlist a protocol capital can be routed to
    AddProtocol {
        #[arg(long, value_name = "PUBKEY")]
        id: Pubkey,
        #[arg(long)]
        name: String,
        /// Protocol fee in basis points (bounded by max_protocol_fee_bps)
        #[arg(long, value_name = "BPS")]
        fee_bps: u16,
        #[arg(long, value_name = "PUBKEY")]
        router: Pubkey,
    },
    /// Allowlist a token
    AddToken {
        #[arg(long, value_name = "PUBKEY")]
        id: Pubkey,
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value_t = 18)]
        decimals: u8,
        /// Smallest amount accepted in one deposit (atomic units)
        #[arg(long, value_name = "AMOUNT", default_value_t = 0)]
        min_amount: u64,
    },
    /// Register a two-token pool
    AddPool {
        #[arg(long, value_name = "PUBKEY")]
        id: Pubkey,
        #[arg(long, value_name = "PUBKEY")]
        token_a: Pubkey,
        #[arg(long, value_name = "PUBKEY")]
        token_b: Pubkey,
        #[arg(long, value_name = "TIER", default_value_t = 30)]
        fee_tier: u32,
    },
    /// Deactivate a protocol (positions are kept)
    RemoveProtocol {
        #[arg(long, value_name = "PUBKEY")]
        id: Pubkey,
    },
    RemoveToken {
        #[arg(long, value_name = "PUBKEY")]
        id: Pubkey,
    },
    RemovePool {
        #[arg(long, value_name = "PUBKEY")]
        id: Pubkey,
    },
    /// Set the annual yield strategies price a protocol at
    SetProtocolYield {
        #[arg(long, value_name = "PUBKEY")]
        protocol: Pubkey,
        /// Annual yield in basis points (≤ 10000)
        #[arg(long, value_name = "BPS")]
        apy_bps: u16,
        #[arg(long, value_name = "AMOUNT", default_value_t = 0)]
        liquidity: u64,
    },

    // ── Position ledger ───────────────────────────────────────────────────────
    /// Stake a token pair in a protocol
    ///
    /// Position liquidity is the arithmetic mean of the two amounts.
    #[command(
        after_help = "\
EXAMPLES:
  restake-lp provide-liquidity --protocol <PK> --token-a <PK> --token-b <PK> \\
    --amount-a 2000 --amount-b 4000"
    )]
    ProvideLiquidity {
        #[arg(long, value_name = "PUBKEY")]
        protocol: Pubkey,
        #[arg(long, value_name = "PUBKEY")]
        token_a: Pubkey,
        #[arg(long, value_name = "PUBKEY")]
        token_b: Pubkey,
        #[arg(long, value_name = "AMOUNT")]
        amount_a: u64,
        #[arg(long, value_name = "AMOUNT")]
        amount_b: u64,
    },
    /// Record a restaking position
    Restake {
        #[arg(long, value_name = "PUBKEY")]
        protocol: Pubkey,
        #[arg(long, value_name = "PUBKEY")]
        token: Pubkey,
        #[arg(long, value_name = "AMOUNT")]
        amount: u64,
        /// Free-text strategy tag
        #[arg(long, default_value = "")]
        strategy: String,
    },
    /// Request a rebalance across protocols (recorded only; balances do not move)
    #[command(
        after_help = "\
EXAMPLES:
  restake-lp rebalance --protocol <PK1> --amount 500 --protocol <PK2> --amount 700"
    )]
    Rebalance {
        #[arg(long = "protocol", value_name = "PUBKEY", required = true)]
        protocols: Vec<Pubkey>,
        #[arg(long = "amount", value_name = "AMOUNT", required = true)]
        amounts: Vec<u64>,
    },
    /// Close a liquidity position by index (see `positions`)
    WithdrawLiquidity {
        #[arg(long, value_name = "INDEX")]
        position: usize,
    },
    /// Close a restaking position by index (see `positions`)
    WithdrawRestaking {
        #[arg(long, value_name = "INDEX")]
        position: usize,
    },

    // ── Pool accounting ───────────────────────────────────────────────────────
    /// Open a pool position; liquidity = floor(sqrt(amount_a × amount_b))
    AddLiquidity {
        #[arg(long, value_name = "PUBKEY")]
        pool: Pubkey,
        #[arg(long, value_name = "AMOUNT")]
        amount_a: u64,
        #[arg(long, value_name = "AMOUNT")]
        amount_b: u64,
        #[arg(long, default_value = "")]
        strategy: String,
    },
    /// Withdraw part of a pool position, proportionally to its amounts
    RemoveLiquidity {
        #[arg(long, value_name = "PUBKEY")]
        pool: Pubkey,
        #[arg(long, value_name = "INDEX")]
        position: usize,
        #[arg(long, value_name = "SHARES")]
        liquidity: u64,
    },
    /// Credit the flat 0.5 % harvest on a pool position
    Harvest {
        #[arg(long, value_name = "PUBKEY")]
        pool: Pubkey,
        #[arg(long, value_name = "INDEX")]
        position: usize,
    },
    /// Retag a pool position's strategy
    UpdateStrategy {
        #[arg(long, value_name = "PUBKEY")]
        pool: Pubkey,
        #[arg(long, value_name = "INDEX")]
        position: usize,
        #[arg(long)]
        strategy: String,
    },
    /// Record the caller's yield preference
    SetYieldStrategy {
        #[arg(long)]
        name: String,
        #[arg(long, value_name = "PUBKEY")]
        target_pool: Pubkey,
        #[arg(long, value_name = "BPS", default_value_t = 0)]
        min_yield_bps: u16,
        #[arg(long, value_name = "BPS", default_value_t = 100)]
        max_slippage_bps: u16,
    },

    // ── Strategy engine ───────────────────────────────────────────────────────
    /// Define a named weighted allocation (weights must sum to 10000 bps)
    #[command(
        after_help = "\
EXAMPLES:
  restake-lp add-strategy --name balanced \\
    --protocol <PK1> --weight-bps 6000 --protocol <PK2> --weight-bps 4000"
    )]
    AddStrategy {
        #[arg(long)]
        name: String,
        #[arg(long = "protocol", value_name = "PUBKEY", required = true)]
        protocols: Vec<Pubkey>,
        #[arg(long = "weight-bps", value_name = "BPS", required = true)]
        weights_bps: Vec<u16>,
        #[arg(long, value_name = "BPS", default_value_t = 0)]
        min_yield_bps: u16,
        #[arg(long, value_name = "BPS", default_value_t = 100)]
        max_slippage_bps: u16,
    },
    RemoveStrategy {
        #[arg(long)]
        name: String,
    },
    /// Allocate an amount across a strategy's protocols
    ExecuteStrategy {
        #[arg(long)]
        name: String,
        #[arg(long, value_name = "AMOUNT")]
        amount: u64,
    },
    /// Request movement between protocol sets (recorded only)
    TriggerRebalancing {
        #[arg(long = "from", value_name = "PUBKEY")]
        from_protocols: Vec<Pubkey>,
        #[arg(long = "amount", value_name = "AMOUNT")]
        amounts: Vec<u64>,
        #[arg(long = "to", value_name = "PUBKEY", required = true)]
        to_protocols: Vec<Pubkey>,
    },
    /// Claim the caller's strategy yield for one protocol
    ClaimYield {
        #[arg(long, value_name = "PUBKEY")]
        protocol: Pubkey,
    },

    // ── Fee / admin ───────────────────────────────────────────────────────────
    UpdateProtocolFee {
        #[arg(long, value_name = "BPS")]
        fee_bps: u16,
    },
    UpdateTaskFee {
        #[arg(long, value_name = "BPS")]
        fee_bps: u16,
    },
    /// Halt deposits, withdrawals and strategy execution
    Pause,
    Unpause,
    /// Move custody balance of a token to the calling admin
    EmergencyWithdraw {
        #[arg(long, value_name = "PUBKEY")]
        token: Pubkey,
        #[arg(long, value_name = "AMOUNT")]
        amount: u64,
    },

    // ── Reads ─────────────────────────────────────────────────────────────────
    /// Counts, totals, fees and pause flag
    Stats,
    /// List registered protocols with their yield metadata
    Protocols,
    Tokens,
    Pools,
    Strategies,
    /// Show one strategy
    Strategy {
        #[arg(long)]
        name: String,
    },
    /// List a user's positions and allocations (defaults to --caller)
    Positions {
        #[arg(long, value_name = "PUBKEY")]
        user: Option<Pubkey>,
    },
    /// Claimable strategy yield for a user and protocol (defaults to --caller)
    Claimable {
        #[arg(long, value_name = "PUBKEY")]
        protocol: Pubkey,
        #[arg(long, value_name = "PUBKEY")]
        user: Option<Pubkey>,
    },

    // ── Task performer ────────────────────────────────────────────────────────
    /// Serve the task performer over TCP (one JSON request per line)
    #[command(
        after_help = "\
EXAMPLES:
  restake-lp serve --port 8080
  echo '{\"task_id\":\"t1\",\"payload\":{\"type\":\"rebalance\"}}' | nc localhost 8080"
    )]
    Serve {
        #[arg(long, value_name = "ADDR", default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Per-request read/write deadline
        #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
    },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    // When invoked with no arguments, show banner + full help and exit cleanly.
    if std::env::args().len() == 1 {
        print_banner();
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();
    init_tracing();

    if let Commands::Serve { host, port, timeout_secs } = cli.command {
        let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
        return runtime.block_on(serve::run(
            SocketAddr::new(host, port),
            Duration::from_secs(timeout_secs),
        ));
    }

    let config = CliConfig::load(cli.config.as_deref())?;
    let store = Store::new(&cli.state);
    let mut ledger = store.open(&config)?;

    use Instruction as Ix;
    let ix = match cli.command {
        Commands::AddProtocol { id, name, fee_bps, router } => {
            Ix::AddProtocol { id, name, fee_bps, router }
        }
        Commands::AddToken { id, symbol, decimals, min_amount } => {
            Ix::AddToken { id, symbol, decimals, min_amount }
        }
        Commands::AddPool { id, token_a, token_b, fee_tier } => {
            Ix::AddPool { id, token_a, token_b, fee_tier }
        }
        Commands::RemoveProtocol { id } => Ix::RemoveProtocol { id },
        Commands::RemoveToken { id } => Ix::RemoveToken { id },
        Commands::RemovePool { id } => Ix::RemovePool { id },
        Commands::SetProtocolYield { protocol, apy_bps, liquidity } => {
            Ix::SetProtocolYield { protocol, apy_bps, liquidity }
        }
        Commands::ProvideLiquidity { protocol, token_a, token_b, amount_a, amount_b } => {
            Ix::ProvideLiquidity { protocol, token_a, token_b, amount_a, amount_b }
        }
        Commands::Restake { protocol, token, amount, strategy } => {
            Ix::ExecuteRestaking { protocol, token, amount, strategy }
        }
        Commands::Rebalance { protocols, amounts } => Ix::ExecuteRebalancing { protocols, amounts },
        Commands::WithdrawLiquidity { position } => Ix::WithdrawLiquidity { position },
        Commands::WithdrawRestaking { position } => Ix::WithdrawRestaking { position },
        Commands::AddLiquidity { pool, amount_a, amount_b, strategy } => {
            Ix::AddLiquidity { pool, amount_a, amount_b, strategy }
        }
        Commands::RemoveLiquidity { pool, position, liquidity } => {
            Ix::RemoveLiquidity { pool, position, liquidity }
        }
        Commands::Harvest { pool, position } => Ix::HarvestYield { pool, position },
        Commands::UpdateStrategy { pool, position, strategy } => {
            Ix::UpdateStrategy { pool, position, strategy }
        }
        Commands::SetYieldStrategy { name, target_pool, min_yield_bps, max_slippage_bps } => {
            Ix::SetYieldStrategy { name, target_pool, min_yield_bps, max_slippage_bps }
        }
        Commands::AddStrategy { name, protocols, weights_bps, min_yield_bps, max_slippage_bps } => {
            Ix::AddStrategy { name, protocols, weights_bps, min_yield_bps, max_slippage_bps }
        }
        Commands::RemoveStrategy { name } => Ix::RemoveStrategy { name },
        Commands::ExecuteStrategy { name, amount } => Ix::ExecuteStrategy { name, amount },
        Commands::TriggerRebalancing { from_protocols, amounts, to_protocols } => {
            Ix::TriggerRebalancing { from_protocols, to_protocols, amounts }
        }
        Commands::ClaimYield { protocol } => Ix::ClaimYield { protocol },
        Commands::UpdateProtocolFee { fee_bps } => Ix::UpdateProtocolFee { fee_bps },
        Commands::UpdateTaskFee { fee_bps } => Ix::UpdateTaskFee { fee_bps },
        Commands::Pause => Ix::Pause,
        Commands::Unpause => Ix::Unpause,
        Commands::EmergencyWithdraw { token, amount } => Ix::EmergencyWithdraw { token, amount },

        Commands::Stats => return cmd_stats(&ledger, cli.json),
        Commands::Protocols => return cmd_protocols(&ledger, cli.json),
        Commands::Tokens => return cmd_tokens(&ledger, cli.json),
        Commands::Pools => return cmd_pools(&ledger, cli.json),
        Commands::Strategies => return cmd_strategies(&ledger, None, cli.json),
        Commands::Strategy { name } => return cmd_strategies(&ledger, Some(name.as_str()), cli.json),
        Commands::Positions { user } => {
            let user = user.or(cli.caller).context("--user or --caller is required")?;
            return cmd_positions(&ledger, &user, cli.json);
        }
        Commands::Claimable { protocol, user } => {
            let user = user.or(cli.caller).context("--user or --caller is required")?;
            return cmd_claimable(&ledger, &user, &protocol, cli.json);
        }
        Commands::Serve { .. } => return Err(anyhow!("serve runs without a ledger")),
    };

    let caller = cli.caller.context(
        "--caller (or RESTAKE_LP_CALLER) is required for commands that change the ledger",
    )?;
    cmd_execute(&mut ledger, &store, caller, ix, cli.json)
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ─── Mutations ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Executed<'a> {
    status: &'static str,
    command: &'static str,
    caller: String,
    outcome: &'a Outcome,
    events: &'a [LedgerEvent],
    transfers: &'a [Transfer],
}

#[derive(Serialize)]
struct Rejected<'a> {
    status: &'static str,
    command: &'static str,
    kind: String,
    error: &'a str,
}

fn cmd_execute(
    ledger: &mut RestakeLp,
    store: &Store,
    caller: Pubkey,
    ix: Instruction,
    json_output: bool,
) -> Result<()> {
    let command = ix.name();

    let outcome = match ledger.process(caller, ix) {
        Ok(outcome) => outcome,
        Err(err) => return Err(report_rejection(command, &err, json_output)),
    };
    let events = ledger.take_events();
    let transfers = ledger.take_transfers();
    store.save(ledger)?;
    info!(command, %caller, events = events.len(), transfers = transfers.len(), "applied");

    if json_output {
        return print_json(&Executed {
            status: "ok",
            command,
            caller: caller.to_string(),
            outcome: &outcome,
            events: &events,
            transfers: &transfers,
        });
    }

    println!("─── {command} ───────────────────────────────────────────────────");
    println!("  Caller     {caller}");
    print_outcome(&outcome);
    for event in &events {
        println!("  Event      {event:?}");
    }
    for t in &transfers {
        let asset = match t.asset {
            Asset::Token(mint) => mint.to_string(),
            Asset::Native => "native".to_string(),
        };
        println!("  Transfer   {} {asset}  →  {}", t.amount, t.recipient);
    }
    println!("  State      {}", store.path().display());
    Ok(())
}

fn report_rejection(command: &'static str, err: &LedgerError, json_output: bool) -> anyhow::Error {
    if json_output {
        let message = err.to_string();
        let body = Rejected { status: "error", command, kind: err.kind().to_string(), error: &message };
        if let Ok(text) = serde_json::to_string_pretty(&body) {
            println!("{text}");
        }
    }
    anyhow!("{command} rejected ({}): {err}", err.kind())
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Done => println!("  Status     ok"),
        Outcome::Position { index } => println!("  Position   #{index}"),
        Outcome::Withdrawn { amount_a, amount_b } => {
            println!("  Amount A   {amount_a:>20}");
            println!("  Amount B   {amount_b:>20}");
        }
        Outcome::Released { amount } => println!("  Released   {amount:>20}"),
        Outcome::Harvested { amount } => println!("  Harvested  {amount:>20}"),
        Outcome::Executed(receipt) => {
            println!("  Strategy   {}", receipt.strategy);
            for a in &receipt.allocations {
                println!("    {}  amount {:>14}  yield {:>10}", a.protocol, a.amount, a.yield_earned);
            }
            println!("  Allocated  {:>20}", receipt.allocated);
            println!("  Dust       {:>20}", receipt.dust);
            println!("  Yield      {:>20}", receipt.total_yield);
        }
    }
}

// ─── Reads ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Query<'a, T: Serialize> {
    status: &'static str,
    command: &'a str,
    data: T,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to encode JSON output")?);
    Ok(())
}

fn cmd_stats(ledger: &RestakeLp, json_output: bool) -> Result<()> {
    let s = ledger.stats();
    if json_output {
        return print_json(&Query { status: "ok", command: "stats", data: &s });
    }
    println!("─── Stats ────────────────────────────────────────────────────────");
    println!("  Protocols        {} ({} active)", s.protocols, s.active_protocols);
    println!("  Tokens           {}", s.tokens);
    println!("  Pools            {}", s.pools);
    println!("  Strategies       {}", s.strategies);
    println!("  Users            {}", s.users);
    println!();
    println!("  Liquidity        {:>24}", s.total_liquidity);
    println!("  Restaked         {:>24}", s.total_restaked);
    println!("  Pool liquidity   {:>24}", s.total_pool_liquidity);
    println!("  Pool yield       {:>24}", s.total_pool_yield);
    println!("  Strategy deposits{:>24}", s.total_strategy_deposits);
    println!("  Unclaimed yield  {:>24}", s.unclaimed_yield);
    println!();
    println!("  Protocol fee     {} bps ({:.2}%)", s.protocol_fee_bps, s.protocol_fee_bps as f64 / 100.0);
    println!("  Task fee         {} bps ({:.2}%)", s.task_fee_bps, s.task_fee_bps as f64 / 100.0);
    println!("  Paused           {}", if s.paused { "yes" } else { "no" });
    Ok(())
}

fn cmd_protocols(ledger: &RestakeLp, json_output: bool) -> Result<()> {
    if json_output {
        return print_json(&Query { status: "ok", command: "protocols", data: ledger.protocols() });
    }
    println!("─── Protocols ────────────────────────────────────────────────────");
    if ledger.protocols().is_empty() {
        println!("  No protocols registered. Run `restake-lp add-protocol` as an admin.");
    }
    for p in ledger.protocols() {
        let apy = ledger.protocol_yield(&p.id).filter(|y| y.active).map(|y| y.apy_bps);
        println!("  {}  {:<16} fee {:>4} bps  {}{}",
            p.id, p.name, p.fee_bps,
            if p.active { "active" } else { "removed" },
            apy.map(|bps| format!("  apy {bps} bps")).unwrap_or_default());
    }
    Ok(())
}

fn cmd_tokens(ledger: &RestakeLp, json_output: bool) -> Result<()> {
    if json_output {
        return print_json(&Query { status: "ok", command: "tokens", data: ledger.tokens() });
    }
    println!("─── Tokens ───────────────────────────────────────────────────────");
    for t in ledger.tokens() {
        println!("  {}  {:<10} decimals {:>2}  min {:>12}  {}",
            t.id, t.symbol, t.decimals, t.min_amount,
            if t.active { "active" } else { "removed" });
    }
    Ok(())
}

fn cmd_pools(ledger: &RestakeLp, json_output: bool) -> Result<()> {
    if json_output {
        return print_json(&Query { status: "ok", command: "pools", data: ledger.pools() });
    }
    println!("─── Pools ────────────────────────────────────────────────────────");
    for p in ledger.pools() {
        println!("  {}  {}", p.id, if p.active { "active" } else { "removed" });
        println!("        Tokens     {} / {}", p.token_a, p.token_b);
        println!("        Fee tier   {}", p.fee_tier);
        println!("        Liquidity  {:>20}", p.total_liquidity);
        println!("        Fees       {:>20}", p.total_fees);
    }
    Ok(())
}

fn cmd_strategies(ledger: &RestakeLp, name: Option<&str>, json_output: bool) -> Result<()> {
    let strategies = match name {
        Some(name) => vec![ledger
            .strategy(name)
            .with_context(|| format!("Strategy '{name}' does not exist"))?],
        None => ledger.strategies().iter().collect(),
    };
    if json_output {
        return print_json(&Query { status: "ok", command: "strategies", data: &strategies });
    }
    println!("─── Strategies ───────────────────────────────────────────────────");
    for s in strategies {
        println!("  {}  {}", s.name, if s.active { "active" } else { "removed" });
        for leg in &s.legs {
            println!("        {}  {:>5} bps", leg.protocol, leg.weight_bps);
        }
        println!("        Deposited  {:>20}", s.total_deposited);
        println!("        Yield      {:>20}", s.total_yield);
        println!("        Min yield  {} bps  ·  max slippage {} bps", s.min_yield_bps, s.max_slippage_bps);
    }
    Ok(())
}

fn cmd_positions(ledger: &RestakeLp, user: &Pubkey, json_output: bool) -> Result<()> {
    let Some(account) = ledger.user(user) else {
        if json_output {
            return print_json(&Query { status: "ok", command: "positions", data: Option::<()>::None });
        }
        println!("  No positions for {user}.");
        return Ok(());
    };
    if json_output {
        return print_json(&Query { status: "ok", command: "positions", data: account });
    }

    println!("─── Positions: {user} ───");
    println!("  Liquidity balance  {}", account.liquidity_balance);
    for (i, p) in account.liquidity_positions.iter().enumerate() {
        println!("  [L{i:>2}]  {}  {} + {}  liquidity {}{}",
            p.protocol, p.amount_a, p.amount_b, p.liquidity,
            if p.active { "" } else { "  (closed)" });
    }
    for (i, p) in account.restaking_positions.iter().enumerate() {
        println!("  [R{i:>2}]  {}  {} of {}  '{}'{}",
            p.protocol, p.amount, p.token, p.strategy,
            if p.active { "" } else { "  (closed)" });
    }
    for (i, p) in account.pool_positions.iter().enumerate() {
        println!("  [P{i:>2}]  {}  liquidity {}  fees {}  '{}'{}",
            p.pool, p.liquidity, p.fees_earned, p.strategy,
            if p.active { "" } else { "  (closed)" });
    }
    if let Some(name) = &account.allocation_strategy {
        println!("  Strategy '{name}'");
        for a in &account.allocations {
            println!("        {}  amount {:>14}  yield {:>10}", a.protocol, a.amount, a.yield_earned);
        }
    }
    println!("  Pool yield         {}", account.pool_yield_total);
    println!("  Strategy yield     {}", account.total_yield_balance);
    Ok(())
}

fn cmd_claimable(ledger: &RestakeLp, user: &Pubkey, protocol: &Pubkey, json_output: bool) -> Result<()> {
    let amount = ledger.claimable_yield(user, protocol);
    if json_output {
        #[derive(Serialize)]
        struct Claimable {
            user: String,
            protocol: String,
            amount: u128,
        }
        return print_json(&Query {
            status: "ok",
            command: "claimable",
            data: Claimable { user: user.to_string(), protocol: protocol.to_string(), amount },
        });
    }
    println!("  Claimable  {amount}  (user {user}, protocol {protocol})");
    Ok(())
}
