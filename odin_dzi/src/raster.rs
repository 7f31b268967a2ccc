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

//! raster primitives used by tile assembly. These wrap the external 'image' crate

use std::path::Path;
use image::{self, imageops, ColorType, DynamicImage, GenericImageView, ImageBuffer, Pixel};

use crate::geometry::CropRect;
use crate::errors::{Result,dimension_mismatch};

pub fn load_image<P: AsRef<Path>> (path: P)->image::ImageResult<DynamicImage> {
    image::ImageReader::open( path.as_ref())?.with_guessed_format()?.decode()
}

/// crop rectangle relative to the image origin. Unlike `DynamicImage::crop_imm` this
/// fails if the rectangle is not fully inside of the image
pub fn crop (img: &DynamicImage, rect: &CropRect)->Result<DynamicImage> {
    let (w,h) = img.dimensions();
    if rect.right() > w || rect.bottom() > h {
        return Err( dimension_mismatch( format!("crop rect {rect:?} exceeds image size {w}x{h}")))
    }
    Ok( img.crop_imm( rect.left, rect.top, rect.width, rect.height) )
}

/// column widths and row heights of a tile grid, taken from the first row and column
#[derive(Debug,Clone,PartialEq)]
pub struct GridLayout {
    pub col_widths: Vec<u32>,
    pub row_heights: Vec<u32>,
}

impl GridLayout {
    /// check that all tiles of a column have the same width and all tiles of a row have the same height
    pub fn of_tiles (tiles: &[DynamicImage], columns: usize)->Result<Self> {
        if columns == 0 || tiles.is_empty() {
            return Err( dimension_mismatch("empty tile grid"))
        }
        if tiles.len() % columns != 0 {
            return Err( dimension_mismatch( format!("{} tiles do not fill a grid with {columns} columns", tiles.len())))
        }
        let rows = tiles.len() / columns;

        let col_widths: Vec<u32> = tiles[..columns].iter().map(|t| t.width()).collect();
        let row_heights: Vec<u32> = (0..rows).map(|r| tiles[r*columns].height()).collect();

        for (i,tile) in tiles.iter().enumerate() {
            let (x,y) = (i % columns, i / columns);
            let (w,h) = tile.dimensions();
            if w != col_widths[x] {
                return Err( dimension_mismatch( format!("tile ({x},{y}) width {w} differs from column width {}", col_widths[x])))
            }
            if h != row_heights[y] {
                return Err( dimension_mismatch( format!("tile ({x},{y}) height {h} differs from row height {}", row_heights[y])))
            }
        }

        Ok( GridLayout { col_widths, row_heights } )
    }

    pub fn columns (&self)->usize { self.col_widths.len() }
    pub fn width (&self)->u32 { self.col_widths.iter().sum() }
    pub fn height (&self)->u32 { self.row_heights.iter().sum() }

    /// upper left pixel position of the i-th (row-major) tile
    pub fn origin (&self, i: usize)->(u32,u32) {
        let (x,y) = (i % self.columns(), i / self.columns());
        (self.col_widths[..x].iter().sum(), self.row_heights[..y].iter().sum())
    }
}

/// join row-major tiles into a grid with `columns` columns. Same-row tiles are placed adjacent,
/// rows directly beneath each other.
/// The result keeps the tile color type if all tiles share L8, La8 or Rgb8, otherwise it is Rgba8
pub fn join_grid (tiles: &[DynamicImage], columns: usize)->Result<DynamicImage> {
    let layout = GridLayout::of_tiles( tiles, columns)?;

    let color = tiles[0].color();
    let is_uniform = tiles.iter().all(|t| t.color() == color);

    let joined = match (is_uniform, color) {
        (true, ColorType::L8) => DynamicImage::ImageLuma8( place_tiles( tiles, &layout, |t| t.to_luma8())),
        (true, ColorType::La8) => DynamicImage::ImageLumaA8( place_tiles( tiles, &layout, |t| t.to_luma_alpha8())),
        (true, ColorType::Rgb8) => DynamicImage::ImageRgb8( place_tiles( tiles, &layout, |t| t.to_rgb8())),
        _ => DynamicImage::ImageRgba8( place_tiles( tiles, &layout, |t| t.to_rgba8()))
    };
    Ok(joined)
}

fn place_tiles<P,F> (tiles: &[DynamicImage], layout: &GridLayout, convert: F)->ImageBuffer<P,Vec<P::Subpixel>>
    where P: Pixel, F: Fn(&DynamicImage)->ImageBuffer<P,Vec<P::Subpixel>>
{
    let mut canvas = ImageBuffer::new( layout.width(), layout.height());
    for (i,tile) in tiles.iter().enumerate() {
        let (x,y) = layout.origin(i);
        imageops::replace( &mut canvas, &convert(tile), x as i64, y as i64);
    }
    canvas
}

/// cut the joined raster to its exact target size (removing excess at the right/bottom border)
pub fn trim (img: DynamicImage, width: u32, height: u32)->Result<DynamicImage> {
    let (w,h) = img.dimensions();
    if w < width || h < height {
        Err( dimension_mismatch( format!("joined raster {w}x{h} smaller than expected {width}x{height}")))
    } else if w == width && h == height {
        Ok(img)
    } else {
        Ok( img.crop_imm( 0, 0, width, height) )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage, Rgb};

    fn gray (w: u32, h: u32, v: u8)->DynamicImage {
        DynamicImage::ImageLuma8( GrayImage::from_pixel( w, h, Luma([v])))
    }

    #[test]
    fn test_join_grid() {
        let tiles = vec![ gray(3,2,1), gray(1,2,2), gray(3,4,3), gray(1,4,4) ];
        let img = join_grid( &tiles, 2).unwrap();

        assert_eq!( img.dimensions(), (4,6));
        assert_eq!( img.color(), ColorType::L8);
        let img = img.to_luma8();
        assert_eq!( img.get_pixel(2,1).0, [1]);
        assert_eq!( img.get_pixel(3,0).0, [2]);
        assert_eq!( img.get_pixel(0,2).0, [3]);
        assert_eq!( img.get_pixel(3,5).0, [4]);
    }

    #[test]
    fn test_join_mixed_colors() {
        let rgb = DynamicImage::ImageRgb8( RgbImage::from_pixel( 2, 2, Rgb([10,20,30])));
        let img = join_grid( &[rgb, gray(2,2,5)], 2).unwrap();
        assert_eq!( img.color(), ColorType::Rgba8);
        assert_eq!( img.dimensions(), (4,2));
        assert_eq!( img.get_pixel(0,0).0, [10,20,30,255]);
        assert_eq!( img.get_pixel(3,1).0, [5,5,5,255]);
    }

    #[test]
    fn test_join_inconsistent() {
        // second row has a different width in column 0
        let tiles = vec![ gray(3,2,1), gray(1,2,2), gray(2,4,3), gray(1,4,4) ];
        assert!( join_grid( &tiles, 2).is_err());

        // row height mismatch
        let tiles = vec![ gray(3,2,1), gray(1,3,2) ];
        assert!( join_grid( &tiles, 2).is_err());

        // incomplete grid
        let tiles = vec![ gray(3,2,1), gray(1,2,2), gray(3,2,3) ];
        assert!( join_grid( &tiles, 2).is_err());
    }

    #[test]
    fn test_crop_bounds() {
        let img = gray(4,4,0);
        assert_eq!( crop( &img, &CropRect::new(1,1,3,3)).unwrap().dimensions(), (3,3));
        assert!( crop( &img, &CropRect::new(1,1,4,3)).is_err());
    }

    #[test]
    fn test_trim() {
        assert_eq!( trim( gray(5,5,0), 4, 3).unwrap().dimensions(), (4,3));
        assert_eq!( trim( gray(5,5,0), 5, 5).unwrap().dimensions(), (5,5));
        assert!( trim( gray(3,5,0), 4, 3).is_err());
    }
}
