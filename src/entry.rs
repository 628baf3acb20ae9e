use std::ffi::OsString;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::run_probe;
use crate::args::ProbeArgs;
use crate::error::{AppError, AppResult, ValidationError};

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    crate::logger::init_logging(args.verbose, args.no_color);

    apply_config(&mut args, &matches)?;
    if args.url.is_none() {
        tracing::error!("Missing URL (set --url or provide in config).");
        return Err(AppError::validation(ValidationError::MissingUrl));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_probe(&args))
}

fn parse_args() -> AppResult<Option<(ProbeArgs, ArgMatches)>> {
    let mut cmd = ProbeArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = ProbeArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    crate::config::default_config_path().is_none()
}

fn apply_config(args: &mut ProbeArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = crate::config::load_config(args.config.as_deref())? {
        crate::config::apply_config(args, matches, &config)?;
    }
    Ok(())
}
