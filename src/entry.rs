use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use tracing::{error, info};

use crate::agent::AgentContext;
use crate::api::{ChefClient, HeaderSigner};
use crate::args::LoadArgs;
use crate::attributes::load_attributes;
use crate::config::types::ConfigFile;
use crate::config::{
    LoadSettings, SAMPLE_CONFIG, build_settings, check_client_key, load_config,
};
use crate::cookbooks::ApiCookbookDownloader;
use crate::domain::Attributes;
use crate::error::{AppError, AppResult};
use crate::fleet::Fleet;
use crate::shutdown::stop_channel;
use crate::shutdown_handlers::setup_signal_stop_handler;

/// Runs the command line application.
///
/// # Errors
///
/// Returns an error when startup fails: bad arguments, an invalid config, an
/// unreadable client key or ohai file, or a fleet whose agents got lost.
pub fn run() -> AppResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    if args.sample_config {
        print!("{}", SAMPLE_CONFIG);
        return Ok(());
    }

    crate::logger::init_logging(args.verbose);

    let Some(config) = load_config(args.config.as_deref()).inspect_err(|err| {
        error!("{}", err);
    })?
    else {
        LoadArgs::command().print_help()?;
        println!();
        return Ok(());
    };

    let (settings, attributes) = prepare(config, &args).inspect_err(|err| {
        error!("{}", err);
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_fleet(settings, attributes))
}

fn parse_args() -> AppResult<Option<LoadArgs>> {
    let mut cmd = LoadArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    Ok(Some(LoadArgs::from_arg_matches(&matches)?))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    ["chef-load.toml", "chef-load.json"]
        .iter()
        .any(|path| Path::new(path).exists())
}

fn prepare(
    config: ConfigFile,
    args: &LoadArgs,
) -> AppResult<(LoadSettings, Arc<Attributes>)> {
    let settings = build_settings(config, args)?;
    check_client_key(&settings.client_key)?;
    let attributes = load_attributes(settings.ohai_json_file.as_deref())?;
    Ok((settings, attributes))
}

async fn run_fleet(settings: LoadSettings, attributes: Arc<Attributes>) -> AppResult<()> {
    let signer = Arc::new(HeaderSigner::new(
        settings.client_name,
        settings.chef_version,
    ));
    let api = ChefClient::new(&settings.api, signer)?;
    let context = AgentContext {
        config: Arc::new(settings.run),
        attributes,
        api: Arc::new(api),
        downloader: Arc::new(ApiCookbookDownloader),
    };
    info!("Starting chef-load against {}", settings.api.server_url);

    let (stop_tx, stop_rx) = stop_channel();
    let signal_handle = setup_signal_stop_handler(&stop_tx);
    let outcome = Fleet::new(context).launch(&stop_rx).wait().await;
    signal_handle.abort();

    outcome.map_err(|err| {
        error!("{}", err);
        AppError::fleet(err)
    })
}
