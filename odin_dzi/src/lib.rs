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

#![doc = include_str!("../README.md")]

mod errors;
pub use errors::{Result,OdinDziError};

pub mod config;
pub use config::DziConfig;

pub mod manifest;
pub use manifest::DziManifest;

pub mod geometry;
pub use geometry::{PyramidGeometry, TileRef, CropRect, locate, crop_rect};

pub mod raster;

pub mod output;
pub use output::{OutputSpec, write_image};

mod assemble;
pub use assemble::{TileLoading, assemble, assemble_dzi, describe_dzi, load_tile, load_tiles};
