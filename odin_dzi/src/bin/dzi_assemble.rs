/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use odin_common::define_cli;
use odin_dzi::{DziConfig, OutputSpec, TileLoading, assemble_dzi, describe_dzi};

define_cli! { ARGS [version, about="reconstruct a single image from a Deep Zoom Image (dzi) tile pyramid"] =
    level: u32 [help="subsample level (steps up from 1:1), e.g. level=2 => 4x4 subsampling", short, long, default_value="0"],
    config: Option<String> [help="optional RON config file", long],
    sequential: bool [help="load tiles sequentially (overrides config)", long],
    info: bool [help="only print DZI metadata and geometry, do not assemble", long],
    verbose: bool [help="log per tile processing", short, long],
    input: String [help="input DZI descriptor (\"filename.dzi\")"],
    output: Option<String> [help="output image, any supported format (e.g. \"out.tif[compression=deflate]\")", required_unless_present="info"]
}

fn main()->Result<()> {
    init_tracing( ARGS.verbose);

    let mut config = match &ARGS.config {
        Some(path) => DziConfig::load( path)?,
        None => DziConfig::default()
    };
    if ARGS.sequential { config.parallel = false }

    if ARGS.info {
        print!("{}", describe_dzi( &ARGS.input, ARGS.level, &config)?);
        return Ok(())
    }

    let output = ARGS.output.as_deref().context("no output specified")?;
    let output = OutputSpec::parse( output)?;

    assemble_dzi( &ARGS.input, &output, ARGS.level, &config, TileLoading::from_config( &config))
        .with_context(|| format!("failed to assemble {}", ARGS.input))?;

    Ok(())
}

fn init_tracing (verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new( default_level));

    // only succeeds if there is no global subscriber set yet
    let _ = tracing_subscriber::fmt()
        .with_env_filter( filter)
        .with_writer( std::io::stderr)
        .try_init();
}
