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

//! reconstruction of a single raster from the tiles of one pyramid level

use std::path::Path;
use image::DynamicImage;
use rayon::prelude::*;
use tracing::{debug,info};

use crate::config::DziConfig;
use crate::manifest::DziManifest;
use crate::geometry::{PyramidGeometry, TileRef, crop_rect};
use crate::output::{OutputSpec, write_image};
use crate::raster::{load_image, crop, join_grid, trim};
use crate::errors::{Result,OdinDziError};

/// how tiles are loaded
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum TileLoading {
    Sequential,
    /// use the global rayon pool
    Parallel,
    /// use a dedicated pool with the given number of threads
    ParallelWith(usize),
}

impl TileLoading {
    pub fn from_config (config: &DziConfig)->Self {
        match (config.parallel, config.max_threads) {
            (false, _) => TileLoading::Sequential,
            (true, Some(n)) => TileLoading::ParallelWith(n),
            (true, None) => TileLoading::Parallel
        }
    }
}

/// load (and crop if there is an overlap) a single tile
pub fn load_tile (manifest: &DziManifest, geometry: &PyramidGeometry, tile: TileRef)->Result<DynamicImage> {
    let path = tile.path( manifest, geometry.target_level);
    debug!("loading tile ({},{}) from {:?}", tile.x, tile.y, path);

    let img = load_image( &path).map_err(|e| OdinDziError::TileLoadError( tile.x, tile.y, path.clone(), e))?;

    if manifest.has_overlap() {
        let rect = crop_rect( manifest, geometry, tile);
        crop( &img, &rect).map_err(|e| match e {
            OdinDziError::DimensionMismatch(msg) => OdinDziError::DimensionMismatch( format!("tile ({},{}) {:?}: {}", tile.x, tile.y, path, msg)),
            other => other
        })

    } else { // no border to strip
        Ok(img)
    }
}

/// load all tiles of the target level in row-major order, failing on the first tile that can't be loaded
pub fn load_tiles (manifest: &DziManifest, geometry: &PyramidGeometry, loading: TileLoading)->Result<Vec<DynamicImage>> {
    let tiles: Vec<TileRef> = geometry.tiles().collect();

    match loading {
        TileLoading::Sequential => {
            tiles.into_iter().map(|t| load_tile( manifest, geometry, t)).collect()
        }
        TileLoading::Parallel => {
            tiles.into_par_iter().map(|t| load_tile( manifest, geometry, t)).collect()
        }
        TileLoading::ParallelWith(n_threads) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads( n_threads).build()
                .map_err(|e| OdinDziError::ConfigError( format!("cannot create thread pool: {e}")))?;
            pool.install( || tiles.into_par_iter().map(|t| load_tile( manifest, geometry, t)).collect())
        }
    }
}

/// assemble the raster of the target level. The result has exactly `out_width` x `out_height` pixels
pub fn assemble (manifest: &DziManifest, geometry: &PyramidGeometry, loading: TileLoading)->Result<DynamicImage> {
    info!("Tiling {}x{} images of size {} -> {}x{}", 
          geometry.grid_width, geometry.grid_height, manifest.tile_size, geometry.out_width, geometry.out_height);

    let tiles = load_tiles( manifest, geometry, loading)?;
    let joined = join_grid( &tiles, geometry.grid_width as usize)?;

    trim( joined, geometry.out_width, geometry.out_height)
}

/// the complete run: parse manifest, compute geometry, assemble and write output.
/// Nothing is written if any of the preceding steps fails
pub fn assemble_dzi<P: AsRef<Path>> (input: P, output: &OutputSpec, step: u32, config: &DziConfig, loading: TileLoading)->Result<PyramidGeometry> {
    let manifest = DziManifest::parse_with_config( input, config)?;
    let geometry = PyramidGeometry::compute( &manifest, step)?;

    let img = assemble( &manifest, &geometry, loading)?;
    write_image( &img, output, config.jpeg_quality)?;

    Ok(geometry)
}

/// human readable summary of manifest and derived geometry for a given step. Does not touch tiles
pub fn describe_dzi<P: AsRef<Path>> (input: P, step: u32, config: &DziConfig)->Result<String> {
    let manifest = DziManifest::parse_with_config( input, config)?;
    let geometry = PyramidGeometry::compute( &manifest, step)?;

    Ok( format!(
        "tiles dir:    {:?}\nformat:       {}\noverlap:      {}\ntile size:    {}\nfull size:    {}x{}\nlevels:       {}\ntarget level: {} (subsample 1:{})\noutput size:  {}x{}\ntile grid:    {}x{}\n",
        manifest.tiles_dir, manifest.format, manifest.overlap, manifest.tile_size, manifest.full_width, manifest.full_height,
        geometry.levels, geometry.target_level, geometry.subsample, geometry.out_width, geometry.out_height,
        geometry.grid_width, geometry.grid_height
    ))
}
