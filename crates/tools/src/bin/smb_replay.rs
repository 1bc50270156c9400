//! 入力列を再生して各フレームの状態を表示する
//!
//! 使用例:
//!   cargo run --bin smb_replay -- scenarios/1-2-pipe.toml --solution solution.json
//!   cargo run --bin smb_replay -- scenarios/1-2-pipe.toml --inputs "3x B|R, A|R" --start 0

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

use rsmb_core::{Emulator, SearchGoal};
use rsmb_core::goal::Scenario;
use tools::common::io::read_text;
use tools::common::logging::init_logger;
use tools::scenario::load_scenario;
use tools::solution::{SolutionFile, parse_inputs};

#[derive(Parser, Debug)]
#[command(about = "SMB の入力列の再生")]
struct Cli {
    /// シナリオファイル（TOML）
    scenario: PathBuf,

    /// smb_search が書き出した解ファイル（JSON）
    #[arg(long, conflicts_with = "inputs")]
    solution: Option<PathBuf>,

    /// 入力列（例: "3x B|R, NIL, A|R"）
    #[arg(long)]
    inputs: Option<String>,

    /// `--inputs` を適用する開始状態の番号
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// 最終フレームの状態だけを表示する
    #[arg(long, default_value_t = false)]
    last_only: bool,

    /// デバッグログを有効にする
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.debug);

    let scenario = load_scenario(&cli.scenario)?;
    let (start, inputs) = match (&cli.solution, &cli.inputs) {
        (Some(path), None) => {
            let file = SolutionFile::from_json(&read_text(path)?)?;
            (file.start, file.inputs)
        }
        (None, Some(text)) => {
            let Some(start) = scenario.starts.get(cli.start) else {
                bail!("start #{} out of range ({} start states)", cli.start, scenario.starts.len());
            };
            (start.clone(), parse_inputs(text)?)
        }
        _ => bail!("either --solution or --inputs is required"),
    };

    let emu = Emulator::new(&scenario.profile, &scenario.level);
    let outcomes = emu.replay(&start, &inputs)?;

    println!("start: {start}");
    for (i, (input, out)) in inputs.iter().zip(&outcomes).enumerate() {
        let last = i + 1 == outcomes.len();
        if cli.last_only && !last {
            continue;
        }
        println!("frame {} input: {input}", i + 1);
        println!("{}", out.state);
        if let Some(event) = &out.event {
            println!("event: {event:?}");
        }
    }

    if outcomes.len() < inputs.len() {
        println!("replay stopped after {} of {} inputs", outcomes.len(), inputs.len());
    }
    if let Some(spec) = scenario.goal.clone() {
        let goal = Scenario::new(&scenario.profile, &scenario.level, spec);
        let reached = outcomes.last().is_some_and(|o| goal.is_goal(&o.state, o.event.as_ref()));
        println!("goal reached: {reached}");
    }
    Ok(())
}
