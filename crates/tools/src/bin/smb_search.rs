//! シナリオファイルから最短入力列を探索する
//!
//! 使用例:
//!   cargo run --release --bin smb_search -- scenarios/1-2-pipe.toml --max-limit 120 -o solution.json
//!   cargo run --release --bin smb_search -- scenarios/1-2-pipe.toml --mode max-x-pos --max-limit 30

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::info;

use rsmb_core::goal::{MaxXPosMetric, Scenario, Unreachable};
use rsmb_core::tt::{HashedStore, OrderedStore, StateStore};
use rsmb_core::types::format_rle;
use rsmb_core::{Dist, SearchEngine, SearchGoal, SearchOutcome};
use tools::common::io::write_text;
use tools::common::logging::init_logger;
use tools::scenario::{GoalMode, LoadedScenario, load_scenario};
use tools::solution::SolutionFile;

/// 状態ストアの種類
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// 状態の全順序による BTreeMap
    Ordered,
    /// HashMap
    Hashed,
}

#[derive(Parser, Debug)]
#[command(about = "SMB の最短入力列探索")]
struct Cli {
    /// シナリオファイル（TOML）
    scenario: PathBuf,

    /// 状態ストアの種類
    #[arg(long, value_enum, default_value_t = StoreKind::Ordered)]
    store: StoreKind,

    /// 探索の目的（シナリオの設定を上書き）
    #[arg(long, value_enum)]
    mode: Option<GoalMode>,

    /// 最初のラウンドの上限（シナリオの設定を上書き）
    #[arg(long)]
    start_limit: Option<Dist>,

    /// 探索を打ち切る上限（シナリオの設定を上書き）
    #[arg(long)]
    max_limit: Option<Dist>,

    /// 進捗ログの間隔（展開ノード数、0 で無効）
    #[arg(long)]
    progress_interval: Option<u64>,

    /// ラウンドごとに状態ストアを消す
    #[arg(long, default_value_t = false)]
    clear_table: bool,

    /// 解を JSON で書き出す（`-` で標準出力、`.gz` で圧縮）
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// デバッグログを有効にする
    #[arg(long, default_value_t = false)]
    debug: bool,
}

impl Cli {
    fn apply_overrides(&self, scenario: &mut LoadedScenario) -> Result<()> {
        let limits = &mut scenario.limits;
        if let Some(start_limit) = self.start_limit {
            limits.start_limit = start_limit;
        }
        if let Some(max_limit) = self.max_limit {
            limits.max_limit = Some(max_limit);
        }
        if let Some(interval) = self.progress_interval {
            limits.progress_interval = interval;
        }
        if self.clear_table {
            limits.retain_table = false;
        }
        if let Some(mode) = self.mode {
            scenario.set_mode(mode)?;
        }
        Ok(())
    }
}

fn run<T: StateStore>(cli: &Cli, scenario: &LoadedScenario, store: T) -> Result<bool> {
    match scenario.mode {
        GoalMode::Scenario => {
            let Some(spec) = scenario.goal.clone() else {
                bail!("scenario has no [goal] table");
            };
            let goal = Scenario::new(&scenario.profile, &scenario.level, spec);
            search(cli, scenario, goal, store, |_| {})
        }
        GoalMode::Unreachable => search(cli, scenario, Unreachable, store, |_| {}),
        GoalMode::MaxXPos => {
            let goal = MaxXPosMetric::new(&scenario.profile);
            search(cli, scenario, goal, store, |goal| match goal.best() {
                Some(best) => println!("max x_pos: {:#x}\n{best}", best.x_pos),
                None => println!("max x_pos: no state expanded"),
            })
        }
    }
}

fn search<G: SearchGoal, T: StateStore>(
    cli: &Cli,
    scenario: &LoadedScenario,
    goal: G,
    store: T,
    report: impl FnOnce(&G),
) -> Result<bool> {
    let mut engine =
        SearchEngine::new(&scenario.profile, &scenario.level, goal, store, scenario.limits.clone())?;

    let outcome = engine.search(&scenario.starts).context("search aborted")?;
    let stats = engine.stats();

    let found = match &outcome {
        SearchOutcome::Found(solution) => {
            println!("solution: {}", format_rle(&solution.inputs));
            println!("start: #{}", solution.start_index);
            if let Some(event) = &solution.event {
                println!("event: {event:?}");
            }
            if let Some(path) = &cli.output {
                let file = SolutionFile::new(solution, Some(stats));
                let mut json = serde_json::to_string_pretty(&file)?;
                json.push('\n');
                write_text(path, &json).with_context(|| format!("failed to write {}", path.display()))?;
                info!("wrote solution to {}", path.display());
            }
            true
        }
        SearchOutcome::NotFound { limit } => {
            println!("no solution within {limit} steps");
            false
        }
    };
    report(engine.goal());
    println!("{}", stats.format_report());
    Ok(found)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.debug);

    let mut scenario = load_scenario(&cli.scenario)?;
    cli.apply_overrides(&mut scenario)?;
    info!("mode: {:?}, store: {:?}, limits: {:?}", scenario.mode, cli.store, scenario.limits);

    let found = match cli.store {
        StoreKind::Ordered => run(&cli, &scenario, OrderedStore::new())?,
        StoreKind::Hashed => run(&cli, &scenario, HashedStore::new())?,
    };
    // ゴールのない目的は終了コード 0
    if !found && scenario.mode == GoalMode::Scenario {
        std::process::exit(1);
    }
    Ok(())
}
