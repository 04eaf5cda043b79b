use anyhow::{Context, Result};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// 詳細表示の有無からログレベルを決める。
pub fn level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// 標準エラー出力にログを出力するロガーを作成する。
pub fn dispatch(verbose: bool) -> fern::Dispatch {
    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .debug(Color::Cyan)
        .warn(Color::Yellow)
        .error(Color::Red);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Warn)
        .level_for(env!("CARGO_PKG_NAME"), level(verbose))
        .chain(std::io::stderr())
}

/// ロガーを初期化する。
pub fn init(verbose: bool) -> Result<()> {
    dispatch(verbose)
        .apply()
        .context("Failed to initialize logger")
}
