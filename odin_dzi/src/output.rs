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

//! output specification and writing. The output argument can carry format options in brackets:
//! `out.tif[compression=deflate]`, `out.jpg[Q=85]`

use std::{fs::File, io::{BufWriter, Seek, Write}, path::{Path,PathBuf}};
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat, codecs::jpeg::JpegEncoder};
use tiff::encoder::{colortype, Compression as TiffCompression, DeflateLevel, TiffEncoder};
use tempfile::NamedTempFile;
use tracing::info;
use odin_common::fs::{ensure_writable_parent, lowercase_extension};

use crate::errors::{Result,output_write_error};

/// output path plus ordered `key[=value]` format options
#[derive(Debug,Clone,PartialEq)]
pub struct OutputSpec {
    pub path: PathBuf,
    pub options: Vec<(String,Option<String>)>,
}

impl OutputSpec {
    pub fn parse (spec: &str)->Result<Self> {
        let spec = spec.trim();

        let (path, options) = match spec.find('[') {
            Some(i) => {
                let opts = spec[i+1..].strip_suffix(']')
                    .ok_or_else(|| output_write_error( format!("unterminated option list in {spec:?}")))?;
                (&spec[..i], parse_options( opts)?)
            }
            None => (spec, Vec::new())
        };

        if path.is_empty() {
            return Err( output_write_error( format!("no output path in {spec:?}")))
        }

        Ok( OutputSpec { path: PathBuf::from(path), options } )
    }

    pub fn from_path<P: AsRef<Path>> (path: P)->Self {
        OutputSpec { path: path.as_ref().to_path_buf(), options: Vec::new() }
    }

    /// lower case file extension which determines the output format
    pub fn format_ext (&self)->Option<String> {
        lowercase_extension( &self.path)
    }

    pub fn option (&self, key: &str)->Option<&Option<String>> {
        self.options.iter().find(|(k,_)| k.eq_ignore_ascii_case(key)).map(|(_,v)| v)
    }

    fn check_options (&self, supported: &[&str])->Result<()> {
        for (k,_) in &self.options {
            if !supported.iter().any(|s| s.eq_ignore_ascii_case(k)) {
                return Err( output_write_error( format!("unsupported option '{k}' for {:?}", self.path)))
            }
        }
        Ok(())
    }
}

fn parse_options (s: &str)->Result<Vec<(String,Option<String>)>> {
    let mut options = Vec::new();
    for opt in s.split(',').map(|o| o.trim()).filter(|o| !o.is_empty()) {
        let (k,v) = match opt.split_once('=') {
            Some((k,v)) => (k.trim(), Some(v.trim().to_string())),
            None => (opt, None)
        };
        if k.is_empty() {
            return Err( output_write_error( format!("empty option key in '{opt}'")))
        }
        options.push( (k.to_string(), v));
    }
    Ok(options)
}

/// the encoder selected by output extension and options
enum Encoding {
    Tiff(TiffCompression),
    Jpeg(u8),
    Other(ImageFormat),
}

impl Encoding {
    fn of_spec (spec: &OutputSpec, default_jpeg_quality: u8)->Result<Self> {
        let path = &spec.path;
        let ext = spec.format_ext().ok_or_else(|| output_write_error( format!("no format extension in {path:?}")))?;

        match ext.as_str() {
            "tif" | "tiff" => {
                spec.check_options( &["compression"])?;
                Ok( Encoding::Tiff( tiff_compression( spec)?) )
            }
            "jpg" | "jpeg" => {
                spec.check_options( &["Q", "quality"])?;
                Ok( Encoding::Jpeg( jpeg_quality( spec, default_jpeg_quality)?) )
            }
            _ => {
                spec.check_options( &[])?;
                let format = ImageFormat::from_extension( &ext)
                    .ok_or_else(|| output_write_error( format!("unsupported output format '{ext}'")))?;
                Ok( Encoding::Other(format) )
            }
        }
    }
}

/// write image according to spec. `default_jpeg_quality` is used if there is no quality option.
/// The image is encoded into a temporary file next to the target, which only replaces the target
/// once encoding succeeded
pub fn write_image (img: &DynamicImage, spec: &OutputSpec, default_jpeg_quality: u8)->Result<()> {
    let path = &spec.path;
    let encoding = Encoding::of_spec( spec, default_jpeg_quality)?;

    ensure_writable_parent( path).map_err(|e| output_write_error( format!("{path:?}: {e}")))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new(".")
    };

    let mut tmp_file = NamedTempFile::new_in( dir).map_err(|e| output_write_error( format!("{path:?}: {e}")))?;
    encode( img, tmp_file.as_file_mut(), &encoding).map_err(|e| output_write_error( format!("{path:?}: {e}")))?;
    tmp_file.persist( path).map_err(|e| output_write_error( format!("{path:?}: {}", e.error)))?;

    let (w,h) = img.dimensions();
    info!("written {w}x{h} image to {path:?}");
    Ok(())
}

fn encode (img: &DynamicImage, file: &mut File, encoding: &Encoding)->Result<()> {
    let mut out = BufWriter::new( file);
    match encoding {
        Encoding::Tiff(compression) => encode_tiff( img, &mut out, *compression)?,
        Encoding::Jpeg(quality) => encode_jpeg( img, &mut out, *quality)?,
        Encoding::Other(format) => img.write_to( &mut out, *format)?
    }
    out.flush()?;
    Ok(())
}

fn tiff_compression (spec: &OutputSpec)->Result<TiffCompression> {
    match spec.option("compression") {
        None => Ok( TiffCompression::Uncompressed ),
        Some(Some(v)) => match v.to_ascii_lowercase().as_str() {
            "none" => Ok( TiffCompression::Uncompressed ),
            "deflate" => Ok( TiffCompression::Deflate( DeflateLevel::Balanced) ),
            "lzw" => Ok( TiffCompression::Lzw ),
            "packbits" => Ok( TiffCompression::Packbits ),
            other => Err( output_write_error( format!("unknown TIFF compression '{other}'")))
        }
        Some(None) => Err( output_write_error("compression option requires a value"))
    }
}

fn jpeg_quality (spec: &OutputSpec, default_quality: u8)->Result<u8> {
    match spec.option("Q").or_else(|| spec.option("quality")) {
        None => Ok(default_quality),
        Some(Some(v)) => match v.parse::<u8>() {
            Ok(q) if (1..=100).contains(&q) => Ok(q),
            _ => Err( output_write_error( format!("invalid JPEG quality '{v}' (1..100)")))
        }
        Some(None) => Err( output_write_error("quality option requires a value"))
    }
}

fn encode_tiff<W: Write + Seek> (img: &DynamicImage, out: &mut W, compression: TiffCompression)->Result<()> {
    let (w,h) = img.dimensions();
    let mut enc = TiffEncoder::new( out)?.with_compression( compression);

    match img.color() {
        ColorType::L8 => enc.write_image::<colortype::Gray8>( w, h, img.to_luma8().as_raw())?,
        ColorType::Rgb8 => enc.write_image::<colortype::RGB8>( w, h, img.to_rgb8().as_raw())?,
        c if c.has_alpha() => enc.write_image::<colortype::RGBA8>( w, h, img.to_rgba8().as_raw())?,
        _ => enc.write_image::<colortype::RGB8>( w, h, img.to_rgb8().as_raw())?
    }
    Ok(())
}

fn encode_jpeg<W: Write> (img: &DynamicImage, out: &mut W, quality: u8)->Result<()> {
    let enc = JpegEncoder::new_with_quality( out, quality);

    // JPEG has no alpha channel
    match img.color() {
        ColorType::L8 | ColorType::Rgb8 => img.write_with_encoder( enc)?,
        ColorType::La8 | ColorType::L16 | ColorType::La16 => DynamicImage::ImageLuma8( img.to_luma8()).write_with_encoder( enc)?,
        _ => DynamicImage::ImageRgb8( img.to_rgb8()).write_with_encoder( enc)?
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let spec = OutputSpec::parse( "out/result.png").unwrap();
        assert_eq!( spec.path, PathBuf::from("out/result.png"));
        assert!( spec.options.is_empty());
        assert_eq!( spec.format_ext().as_deref(), Some("png"));
    }

    #[test]
    fn test_parse_options() {
        let spec = OutputSpec::parse( "out.TIF[compression=deflate, tile,pyramid]").unwrap();
        assert_eq!( spec.path, PathBuf::from("out.TIF"));
        assert_eq!( spec.format_ext().as_deref(), Some("tif"));
        assert_eq!( spec.options, vec![
            ("compression".to_string(), Some("deflate".to_string())),
            ("tile".to_string(), None),
            ("pyramid".to_string(), None),
        ]);
        assert_eq!( spec.option("Compression"), Some(&Some("deflate".to_string())));
    }

    #[test]
    fn test_parse_malformed() {
        assert!( OutputSpec::parse( "out.tif[compression=deflate").is_err());
        assert!( OutputSpec::parse( "out.tif[=deflate]").is_err());
        assert!( OutputSpec::parse( "[Q=80]").is_err());
    }

    #[test]
    fn test_format_options() {
        let spec = OutputSpec::parse( "a.jpg[Q=75]").unwrap();
        assert_eq!( jpeg_quality( &spec, 90).unwrap(), 75);
        assert_eq!( jpeg_quality( &OutputSpec::from_path("a.jpg"), 90).unwrap(), 90);
        assert!( jpeg_quality( &OutputSpec::parse( "a.jpg[Q=0]").unwrap(), 90).is_err());

        assert!( matches!( tiff_compression( &OutputSpec::parse( "a.tif[compression=lzw]").unwrap()), Ok(TiffCompression::Lzw)));
        assert!( tiff_compression( &OutputSpec::parse( "a.tif[compression=jpeg2k]").unwrap()).is_err());

        // tile/pyramid layouts are not supported by our TIFF writer
        assert!( OutputSpec::parse( "a.tif[tile]").unwrap().check_options( &["compression"]).is_err());
    }
}
