use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app;
use crate::args::{HttpMethod, PokeArgs};
use crate::config::{apply_config, is_cli, load_config};
use crate::error::AppResult;

/// Parses arguments, applies the config file, and runs the request on a
/// multi-thread runtime.
///
/// # Errors
///
/// Returns an error when the arguments or config are invalid, the runtime
/// cannot start, or the request fails.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;
    default_method(&mut args, &matches);
    apply_file_config(&mut args, &matches)?;
    crate::logger::init_logging(args.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(app::run(args)).inspect_err(|err| {
        tracing::error!("{}", err);
    })
}

fn parse_args() -> AppResult<(PokeArgs, ArgMatches)> {
    let matches = PokeArgs::command().get_matches();
    let args = PokeArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

fn apply_file_config(args: &mut PokeArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(args, matches, &config)?;
    }
    Ok(())
}

/// A body with an implicit method is sent as POST. A method from the config
/// file still wins since it is applied afterwards.
fn default_method(args: &mut PokeArgs, matches: &ArgMatches) {
    if args.command.is_none()
        && args.method == HttpMethod::Get
        && !is_cli(matches, "method")
        && args.has_body_source()
    {
        args.method = HttpMethod::Post;
    }
}
