//! Command handlers

use crate::cli::{Cli, Commands};
use crate::output::{output_results, output_stage_report};
use anpr_app::{open_command_gateway, AssetBootstrap, Config};
use anpr_domain::RecognizeArg;
use anpr_infra::assets::{staged_files, AssetPaths, FsAssetSource};
use anpr_types::{Error, OutputFormat, Rect, Result};
use std::path::PathBuf;

pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if cli.assets.is_some() {
        config.asset_source = cli.assets.clone();
    }
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir.clone();
    }
    if let Some(ref engine) = cli.engine {
        config.engine_command = engine.clone();
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Stage { list } => cmd_stage(&config, list),
        Commands::Recognize {
            image,
            country,
            top_n,
            region,
            regions,
            bytes,
            detect_region,
        } => {
            if let Some(country) = country {
                config.country = country;
            }
            if let Some(top_n) = top_n {
                config.top_n = top_n;
            }
            if region.is_some() {
                config.default_region = region;
            }
            config.detect_region |= detect_region;
            cmd_recognize(&config, image, regions, bytes, output_format)
        }
        Commands::Config {
            show,
            set_country,
            set_top_n,
            set_region,
            set_prewarp,
            set_assets,
            set_engine,
            set_format,
        } => {
            let mut changed = false;

            if let Some(country) = set_country {
                config.country = country;
                changed = true;
            }
            if let Some(top_n) = set_top_n {
                config.top_n = top_n;
                changed = true;
            }
            if let Some(region) = set_region {
                config.default_region = Some(region).filter(|r| !r.is_empty());
                changed = true;
            }
            if let Some(prewarp) = set_prewarp {
                config.prewarp = Some(prewarp).filter(|p| !p.is_empty());
                changed = true;
            }
            if let Some(assets) = set_assets {
                config.asset_source = Some(assets);
                changed = true;
            }
            if let Some(engine) = set_engine {
                config.engine_command = engine;
                changed = true;
            }
            if let Some(format) = set_format {
                config.output_format = format;
                changed = true;
            }

            if changed {
                config.save()?;
                println!("Configuration saved.");
            }
            if show || !changed {
                println!("{}", config);
            }
            Ok(())
        }
    }
}

/// Stage from the configured bundle, or reuse a previous staging
fn resolve_assets(config: &Config) -> Result<AssetPaths> {
    let data_dir = config.data_dir()?;

    match config.asset_source {
        Some(ref source_dir) => {
            if !source_dir.is_dir() {
                return Err(Error::FileNotFound(source_dir.clone()));
            }
            let bootstrap = AssetBootstrap::new(data_dir);
            let staged = bootstrap.stage(&FsAssetSource::new(source_dir));
            Ok(staged.paths.clone())
        }
        None => {
            let paths = AssetPaths::under(&data_dir);
            if !paths.config_file.is_file() {
                return Err(Error::InvalidArgument(
                    "no asset source configured and nothing staged yet; pass --assets".to_string(),
                ));
            }
            tracing::info!(dir = %data_dir.display(), "using previously staged assets");
            Ok(paths)
        }
    }
}

fn cmd_stage(config: &Config, list: bool) -> Result<()> {
    let source_dir = config.asset_source.clone().ok_or_else(|| {
        Error::InvalidArgument("no asset source configured; pass --assets".to_string())
    })?;
    if !source_dir.is_dir() {
        return Err(Error::FileNotFound(source_dir));
    }

    let bootstrap = AssetBootstrap::new(config.data_dir()?);
    let staged = bootstrap.stage(&FsAssetSource::new(&source_dir));
    output_stage_report(&staged.report, &staged.paths);

    if list {
        let root = bootstrap.data_dir();
        println!("\nStaged files under {}:", root.display());
        for file in staged_files(root) {
            println!("  {}", file.display());
        }
    }

    Ok(())
}

fn cmd_recognize(
    config: &Config,
    image: PathBuf,
    regions: Vec<Rect>,
    as_bytes: bool,
    output_format: OutputFormat,
) -> Result<()> {
    if !image.is_file() {
        return Err(Error::FileNotFound(image));
    }

    let paths = resolve_assets(config)?;

    // Regions only travel with byte buffers
    let args: Vec<RecognizeArg> = if as_bytes || !regions.is_empty() {
        let bytes = std::fs::read(&image)?;
        let mut args = vec![RecognizeArg::Bytes(bytes)];
        if !regions.is_empty() {
            args.push(RecognizeArg::Regions(regions));
        }
        args
    } else {
        vec![RecognizeArg::Str(image.display().to_string())]
    };

    let gateway = open_command_gateway(config, &paths);
    let handle = gateway.recognize_args(args)?;
    gateway.initialize(config.init_params())?;

    let results = handle.wait()?;
    output_results(output_format, &results)
}
