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

use std::path::PathBuf;
use odin_common::define_error;

pub type Result<T> = std::result::Result<T, OdinDziError>;

define_error!{ pub OdinDziError = 
    IOError(#[from] std::io::Error) : "IO error: {0}",
    ImageError(#[from] image::ImageError) : "image error: {0}",
    TiffError(#[from] tiff::TiffError) : "tiff error: {0}",
    ConfigError(String) : "config error: {0}",
    InvalidMetadata(String) : "invalid DZI metadata: {0}",
    InvalidLevel(u32,u32) : "subsample step {0} exceeds pyramid depth of {1} levels",
    TileLoadError(u32, u32, PathBuf, #[source] image::ImageError) : "failed to load tile ({0},{1}) from {2:?}: {3}",
    DimensionMismatch(String) : "dimension mismatch: {0}",
    OutputWriteError(String) : "output write error: {0}"
}

impl OdinDziError {
    /// grid coordinate of a failed tile load
    pub fn tile_coord (&self)->Option<(u32,u32)> {
        match self {
            OdinDziError::TileLoadError(x,y,..) => Some((*x,*y)),
            _ => None
        }
    }
}

pub fn invalid_metadata (msg: impl ToString)->OdinDziError {
    OdinDziError::InvalidMetadata( msg.to_string())
}

pub fn dimension_mismatch (msg: impl ToString)->OdinDziError {
    OdinDziError::DimensionMismatch( msg.to_string())
}

pub fn output_write_error (msg: impl ToString)->OdinDziError {
    OdinDziError::OutputWriteError( msg.to_string())
}
