//! ロガー初期化

use std::io::Write;

/// `env_logger` を `[LEVEL] target: message` 形式で初期化する
///
/// 既定のレベルは `info`（`debug` 指定時は `debug`）。`RUST_LOG` があればそちらを優先する。
pub fn init_logger(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    );
    builder
        .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Stderr)
        .init();
}
