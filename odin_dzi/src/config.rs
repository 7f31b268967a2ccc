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

use std::path::Path;
use serde::{Serialize,Deserialize};

use crate::errors::{Result,OdinDziError};

pub const DEFAULT_TILES_DIR_SUFFIX: &str = "_files";
pub const DEFAULT_MANIFEST_EXT: &str = "dzi";
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// runtime configuration of DZI assembly, read from a RON file such as
/// ```text
/// DziConfig(
///     tiles_dir_suffix: "_files",
///     parallel: true,
///     max_threads: Some(8),
/// )
/// ```
/// all fields are optional
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct DziConfig {
    /// what replaces the manifest extension to get the tile directory
    pub tiles_dir_suffix: String,

    /// required (case insensitive) manifest filename extension
    pub manifest_ext: String,

    /// load and crop tiles concurrently
    pub parallel: bool,

    /// size of dedicated thread pool (None uses the global rayon pool)
    pub max_threads: Option<usize>,

    /// used for JPEG output if there is no explicit quality option
    pub jpeg_quality: u8,
}

impl Default for DziConfig {
    fn default()->Self {
        DziConfig {
            tiles_dir_suffix: DEFAULT_TILES_DIR_SUFFIX.to_string(),
            manifest_ext: DEFAULT_MANIFEST_EXT.to_string(),
            parallel: true,
            max_threads: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl DziConfig {
    pub fn from_ron_str (s: &str)->Result<Self> {
        let config: DziConfig = ron::from_str(s).map_err(|e| OdinDziError::ConfigError(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>> (path: P)->Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| OdinDziError::ConfigError(format!("cannot read {path:?}: {e}")))?;
        Self::from_ron_str( &s).map_err(|e| OdinDziError::ConfigError(format!("{path:?}: {e}")))
    }

    fn check (&self)->Result<()> {
        if self.manifest_ext.is_empty() {
            return Err( OdinDziError::ConfigError("empty manifest_ext".into()))
        }
        if self.max_threads == Some(0) {
            return Err( OdinDziError::ConfigError("max_threads has to be > 0".into()))
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err( OdinDziError::ConfigError(format!("jpeg_quality {} not in 1..100", self.jpeg_quality)))
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file() {
        let config = DziConfig::from_ron_str( include_str!("../configs/odin_dzi.ron")).unwrap();
        assert_eq!( config, DziConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = DziConfig::from_ron_str( "DziConfig( parallel: false, max_threads: Some(2) )").unwrap();
        assert!( !config.parallel);
        assert_eq!( config.max_threads, Some(2));
        assert_eq!( config.tiles_dir_suffix, "_files");
    }

    #[test]
    fn test_invalid_config() {
        assert!( matches!( DziConfig::from_ron_str( "DziConfig( jpeg_quality: 0 )"), Err(OdinDziError::ConfigError(_))));
        assert!( matches!( DziConfig::from_ron_str( "DziConfig( parallel: 42 )"), Err(OdinDziError::ConfigError(_))));
    }
}
