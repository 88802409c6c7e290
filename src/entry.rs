use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::run_daemon;
use crate::args::DaemonArgs;
use crate::config::{apply_config, load_config};
use crate::error::AppResult;

/// Parse flags, merge the config file, and run the daemon to completion.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, a failed bind,
/// or a fatal backend failure.
pub fn run() -> AppResult<()> {
    let (args, matches) = parse_args()?;
    let args = merge_config(args, &matches)?;

    crate::logger::init_logging(args.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let report = runtime.block_on(run_daemon(args))?;
    tracing::debug!("Final report: {:?}", report);
    Ok(())
}

fn parse_args() -> AppResult<(DaemonArgs, ArgMatches)> {
    let matches = DaemonArgs::command().get_matches();
    let args = DaemonArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

fn merge_config(mut args: DaemonArgs, matches: &ArgMatches) -> AppResult<DaemonArgs> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }
    Ok(args)
}
