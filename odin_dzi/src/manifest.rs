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

//! DZI descriptor parsing. A manifest looks like
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Image xmlns="http://schemas.microsoft.com/deepzoom/2008" Format="jpg" Overlap="2" TileSize="256">
//!   <Size Width="7026" Height="9221"/>
//! </Image>
//! ```
//! and has an associated `<name>_files/` tile directory next to it

use std::path::{Path,PathBuf};
use serde::Deserialize;
use quick_xml::{Reader, events::Event};
use tracing::{info,warn};
use odin_common::fs::sibling_dir_with_suffix;

use crate::config::{DziConfig,DEFAULT_MANIFEST_EXT,DEFAULT_TILES_DIR_SUFFIX};
use crate::errors::{Result,invalid_metadata};

// raw XML view. Numeric attributes are kept as strings so that we can report which one is bad

#[derive(Deserialize,Debug)]
struct XmlImage {
    #[serde(rename = "@Format")]
    format: Option<String>,

    #[serde(rename = "@Overlap")]
    overlap: Option<String>,

    #[serde(rename = "@TileSize")]
    tile_size: Option<String>,

    #[serde(rename = "Size", default)]
    sizes: Vec<XmlSize>,
}

#[derive(Deserialize,Debug)]
struct XmlSize {
    #[serde(rename = "@Width")]
    width: Option<String>,

    #[serde(rename = "@Height")]
    height: Option<String>,
}

/// the parsed (immutable) contents of a DZI descriptor
#[derive(Debug,Clone,PartialEq)]
pub struct DziManifest {
    /// tile image file extension (e.g. "jpg")
    pub format: String,
    /// border pixels shared between adjacent tiles
    pub overlap: u32,
    /// nominal tile edge length
    pub tile_size: u32,
    /// full resolution image width
    pub full_width: u32,
    /// full resolution image height
    pub full_height: u32,
    /// root of the `<level>/<x>_<y>.<format>` tile tree
    pub tiles_dir: PathBuf,
}

impl DziManifest {

    /// parse manifest file with default tile dir naming (`<name>.dzi` -> `<name>_files`)
    pub fn parse<P: AsRef<Path>> (path: P)->Result<Self> {
        Self::parse_with( path, DEFAULT_MANIFEST_EXT, DEFAULT_TILES_DIR_SUFFIX)
    }

    pub fn parse_with_config<P: AsRef<Path>> (path: P, config: &DziConfig)->Result<Self> {
        Self::parse_with( path, &config.manifest_ext, &config.tiles_dir_suffix)
    }

    pub fn parse_with<P: AsRef<Path>> (path: P, manifest_ext: &str, tiles_dir_suffix: &str)->Result<Self> {
        let path = path.as_ref();
        let tiles_dir = sibling_dir_with_suffix( path, manifest_ext, tiles_dir_suffix).map_err(invalid_metadata)?;
        let xml = std::fs::read_to_string( path).map_err(|e| invalid_metadata( format!("cannot read {path:?}: {e}")))?;

        let manifest = Self::from_xml( &xml, tiles_dir)?;
        info!("{path:?}: format={}, overlap={}, tile_size={}, size={}x{}", 
              manifest.format, manifest.overlap, manifest.tile_size, manifest.full_width, manifest.full_height);
        Ok(manifest)
    }

    /// parse the XML descriptor text. The tile directory is not derived from the XML
    pub fn from_xml (xml: &str, tiles_dir: PathBuf)->Result<Self> {
        check_structure( xml)?;
        let img: XmlImage = quick_xml::de::from_str(xml).map_err(|e| invalid_metadata( format!("malformed XML: {e}")))?;

        let size = match img.sizes.as_slice() {
            [size] => size,
            [] => return Err( invalid_metadata("no Size element")),
            _ => return Err( invalid_metadata("more than one Size element"))
        };

        let format = required( "Format", &img.format)?.trim().to_string();
        if format.is_empty() { return Err( invalid_metadata("empty Format attribute")) }

        let overlap = parse_uint( "Overlap", &img.overlap)?;
        let tile_size = positive( "TileSize", parse_uint( "TileSize", &img.tile_size)?)?;
        let full_width = positive( "Width", parse_uint( "Width", &size.width)?)?;
        let full_height = positive( "Height", parse_uint( "Height", &size.height)?)?;

        if overlap >= tile_size {
            warn!("overlap {overlap} not smaller than tile size {tile_size}, tile cropping is ill-defined");
        }

        Ok( DziManifest { format, overlap, tile_size, full_width, full_height, tiles_dir } )
    }

    pub fn has_overlap (&self)->bool { self.overlap > 0 }
}

/// the descriptor has to have an `Image` root with a single `Size` child element
fn check_structure (xml: &str)->Result<()> {
    let mut reader = Reader::from_str( xml);
    let mut depth = 0usize;
    let mut has_root = false;
    let mut n_children = 0;

    loop {
        let event = reader.read_event().map_err(|e| invalid_metadata( format!("malformed XML: {e}")))?;
        let (elem, is_empty) = match event {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(_) => { depth = depth.saturating_sub(1); continue }
            Event::Eof => break,
            _ => continue
        };

        let local_name = elem.local_name();
        let name = String::from_utf8_lossy( local_name.as_ref());
        match depth {
            0 => {
                if has_root { return Err( invalid_metadata("more than one root element")) }
                if name != "Image" { return Err( invalid_metadata( format!("unexpected root element <{name}>"))) }
                has_root = true;
            }
            1 => {
                if name != "Size" { return Err( invalid_metadata( format!("unexpected element <{name}> in <Image>"))) }
                n_children += 1;
            }
            _ => {}
        }
        if !is_empty { depth += 1 }
    }

    if !has_root { return Err( invalid_metadata("no Image element")) }
    if n_children != 1 { return Err( invalid_metadata( format!("expected one Size element, found {n_children}"))) }
    Ok(())
}

fn required<'a> (name: &str, attr: &'a Option<String>)->Result<&'a str> {
    attr.as_deref().ok_or_else(|| invalid_metadata( format!("missing {name} attribute")))
}

fn parse_uint (name: &str, attr: &Option<String>)->Result<u32> {
    let s = required( name, attr)?;
    s.trim().parse::<u32>().map_err(|_| invalid_metadata( format!("{name} is not a non-negative integer: {s:?}")))
}

fn positive (name: &str, v: u32)->Result<u32> {
    if v == 0 { Err( invalid_metadata( format!("{name} has to be > 0"))) } else { Ok(v) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::OdinDziError;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Image xmlns="http://schemas.microsoft.com/deepzoom/2008"
   Format="jpg" 
   Overlap="2" 
   TileSize="256" >
   <Size Height="9221" 
         Width="7026"/>
</Image>"#;

    fn parse (xml: &str)->Result<DziManifest> {
        DziManifest::from_xml( xml, PathBuf::from("img_files"))
    }

    #[test]
    fn test_parse_xml() {
        let m = parse( XML).unwrap();
        assert_eq!( m.format, "jpg");
        assert_eq!( m.overlap, 2);
        assert_eq!( m.tile_size, 256);
        assert_eq!( m.full_width, 7026);
        assert_eq!( m.full_height, 9221);
        assert!( m.has_overlap());
    }

    #[test]
    fn test_missing_attrs() {
        let xml = r#"<Image Format="png" TileSize="256"><Size Width="10" Height="10"/></Image>"#;
        assert!( matches!( parse(xml), Err(OdinDziError::InvalidMetadata(_))));

        let xml = r#"<Image Format="png" Overlap="0" TileSize="256"><Size Width="10"/></Image>"#;
        assert!( matches!( parse(xml), Err(OdinDziError::InvalidMetadata(_))));

        let xml = r#"<Image Format="png" Overlap="0" TileSize="256"></Image>"#;
        assert!( matches!( parse(xml), Err(OdinDziError::InvalidMetadata(_))));
    }

    #[test]
    fn test_non_integer_attrs() {
        let xml = r#"<Image Format="png" Overlap="1.5" TileSize="256"><Size Width="10" Height="10"/></Image>"#;
        assert!( matches!( parse(xml), Err(OdinDziError::InvalidMetadata(_))));

        let xml = r#"<Image Format="png" Overlap="1" TileSize="256"><Size Width="-10" Height="10"/></Image>"#;
        assert!( matches!( parse(xml), Err(OdinDziError::InvalidMetadata(_))));
    }

    #[test]
    fn test_unexpected_elements() {
        let xml = r#"<Foo Format="png" Overlap="0" TileSize="256"><Size Width="10" Height="10"/></Foo>"#;
        assert!( matches!( parse(xml), Err(OdinDziError::InvalidMetadata(_))));

        let xml = r#"<Image Format="png" Overlap="0" TileSize="256"><Bar/><Size Width="10" Height="10"/></Image>"#;
        assert!( matches!( parse(xml), Err(OdinDziError::InvalidMetadata(_))));

        let xml = r#"<Image Format="png" Overlap="0" TileSize="256"><Size Width="10" Height="10"/><Size Width="5" Height="5"/></Image>"#;
        assert!( matches!( parse(xml), Err(OdinDziError::InvalidMetadata(_))));

        // namespace prefixes are accepted
        let xml = r#"<dz:Image xmlns:dz="http://schemas.microsoft.com/deepzoom/2008" Format="png" Overlap="0" TileSize="256"><dz:Size Width="10" Height="10"/></dz:Image>"#;
        assert!( check_structure(xml).is_ok());
    }

    #[test]
    fn test_malformed_xml() {
        assert!( matches!( parse("<Image Format=\"png\""), Err(OdinDziError::InvalidMetadata(_))));
        assert!( matches!( parse("not xml at all"), Err(OdinDziError::InvalidMetadata(_))));
    }
}
