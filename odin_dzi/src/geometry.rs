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

//! pyramid geometry of a DZI tile set: which level to read, how big the result is, how many tiles
//! there are and how each tile has to be cropped to remove its overlap border

use std::path::PathBuf;
use tracing::info;
use odin_common::{bit_length, ceil_div, pow2_u64};

use crate::manifest::DziManifest;
use crate::errors::{Result,OdinDziError};

/// derived geometry for a given manifest and subsample step
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct PyramidGeometry {
    /// total pyramid depth (bit length of the larger full resolution dimension)
    pub levels: u32,
    /// requested number of halving steps from full resolution
    pub step: u32,
    /// index of the level directory we read tiles from
    pub target_level: u32,
    /// 2^step
    pub subsample: u64,
    pub out_width: u32,
    pub out_height: u32,
    /// number of tile columns
    pub grid_width: u32,
    /// number of tile rows
    pub grid_height: u32,
}

impl PyramidGeometry {
    pub fn compute (manifest: &DziManifest, step: u32)->Result<Self> {
        let full_width = manifest.full_width as u64;
        let full_height = manifest.full_height as u64;

        let levels = bit_length( full_width.max( full_height));
        if step > levels {
            return Err( OdinDziError::InvalidLevel( step, levels))
        }
        let target_level = levels - step;

        let subsample = pow2_u64( step);
        let out_width = ceil_div( full_width, subsample) as u32;
        let out_height = ceil_div( full_height, subsample) as u32;

        let level_tile_size = manifest.tile_size as u64 * subsample;
        let grid_width = ceil_div( full_width, level_tile_size) as u32;
        let grid_height = ceil_div( full_height, level_tile_size) as u32;

        info!("pyramid levels: {levels}, target level: {target_level} (subsample 1:{subsample})");

        Ok( PyramidGeometry { levels, step, target_level, subsample, out_width, out_height, grid_width, grid_height } )
    }

    pub fn tile_count (&self)->usize {
        self.grid_width as usize * self.grid_height as usize
    }

    /// all tiles in row-major order (rows top-to-bottom, columns left-to-right)
    pub fn tiles (&self)->impl Iterator<Item=TileRef> + '_ {
        (0..self.grid_height).flat_map( move |y| (0..self.grid_width).map( move |x| TileRef{x,y}))
    }

    #[inline] pub fn is_last_column (&self, x: u32)->bool { x + 1 >= self.grid_width }
    #[inline] pub fn is_last_row (&self, y: u32)->bool { y + 1 >= self.grid_height }
}

/// grid coordinate of a tile at the target level
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub struct TileRef {
    pub x: u32,
    pub y: u32,
}

impl TileRef {
    pub fn new (x: u32, y: u32)->Self { TileRef{x,y} }

    /// the `<tiles_dir>/<level>/<x>_<y>.<format>` file of this tile. Existence is not checked
    pub fn path (&self, manifest: &DziManifest, target_level: u32)->PathBuf {
        locate( manifest, target_level, self.x, self.y)
    }
}

pub fn locate (manifest: &DziManifest, target_level: u32, x: u32, y: u32)->PathBuf {
    manifest.tiles_dir
        .join( target_level.to_string())
        .join( format!("{}_{}.{}", x, y, manifest.format))
}

/// rectangle relative to the origin of the loaded tile image
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new (left: u32, top: u32, width: u32, height: u32)->Self { CropRect{left,top,width,height} }

    pub fn right (&self)->u32 { self.left + self.width }
    pub fn bottom (&self)->u32 { self.top + self.height }
}

/// compute the tile content rectangle without the overlap border.
/// Tiles in the first row/column have no leading border, tiles in the last row/column only
/// contribute the remainder of the output size
pub fn crop_rect (manifest: &DziManifest, geometry: &PyramidGeometry, tile: TileRef)->CropRect {
    let overlap = manifest.overlap;
    let tile_size = manifest.tile_size;

    let left = if tile.x > 0 { overlap } else { 0 };
    let top = if tile.y > 0 { overlap } else { 0 };

    let width = if geometry.is_last_column( tile.x) { remainder( geometry.out_width, tile_size) } else { tile_size };
    let height = if geometry.is_last_row( tile.y) { remainder( geometry.out_height, tile_size) } else { tile_size };

    CropRect { left, top, width, height }
}

/// size of the last tile in a row/column, which is `tile_size` if `len` is evenly divisible
#[inline]
fn remainder (len: u32, tile_size: u32)->u32 {
    (len.saturating_sub(1) % tile_size) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest (overlap: u32, tile_size: u32, full_width: u32, full_height: u32)->DziManifest {
        DziManifest { format: "jpg".into(), overlap, tile_size, full_width, full_height, tiles_dir: PathBuf::from("img_files") }
    }

    #[test]
    fn test_full_resolution() {
        let m = manifest( 2, 256, 7026, 9221);
        let g = PyramidGeometry::compute( &m, 0).unwrap();

        assert_eq!( g.levels, 14);
        assert_eq!( g.target_level, 14);
        assert_eq!( g.subsample, 1);
        assert_eq!( (g.out_width, g.out_height), (7026, 9221));
        assert_eq!( (g.grid_width, g.grid_height), (28, 37));
        assert_eq!( g.tile_count(), 28*37);
    }

    #[test]
    fn test_subsampled() {
        let m = manifest( 2, 256, 7026, 9221);
        let g = PyramidGeometry::compute( &m, 3).unwrap();

        assert_eq!( g.target_level, 11);
        assert_eq!( g.subsample, 8);
        assert_eq!( (g.out_width, g.out_height), (879, 1153));
        assert_eq!( (g.grid_width, g.grid_height), (4, 5));

        // step == levels is the single pixel level 0
        let g = PyramidGeometry::compute( &m, 14).unwrap();
        assert_eq!( g.target_level, 0);
        assert_eq!( (g.out_width, g.out_height), (1, 1));
        assert_eq!( (g.grid_width, g.grid_height), (1, 1));
    }

    #[test]
    fn test_invalid_level() {
        let m = manifest( 2, 256, 7026, 9221);
        match PyramidGeometry::compute( &m, 15) {
            Err(OdinDziError::InvalidLevel(step,levels)) => assert_eq!( (step,levels), (15,14)),
            other => panic!("unexpected result {other:?}")
        }
    }

    #[test]
    fn test_output_size_independent_of_overlap() {
        for step in 0..5 {
            let g0 = PyramidGeometry::compute( &manifest( 0, 254, 5000, 3001), step).unwrap();
            let g1 = PyramidGeometry::compute( &manifest( 1, 254, 5000, 3001), step).unwrap();
            assert_eq!( (g0.out_width, g0.out_height), (g1.out_width, g1.out_height));
        }
    }

    #[test]
    fn test_tiles_row_major() {
        let m = manifest( 1, 4, 7, 9);
        let g = PyramidGeometry::compute( &m, 0).unwrap();
        let tiles: Vec<(u32,u32)> = g.tiles().map(|t| (t.x,t.y)).collect();
        assert_eq!( tiles, vec![(0,0),(1,0),(0,1),(1,1),(0,2),(1,2)]);
    }

    #[test]
    fn test_locate() {
        let m = manifest( 1, 256, 7026, 9221);
        let p = locate( &m, 14, 3, 7);
        assert_eq!( p, PathBuf::from("img_files").join("14").join("3_7.jpg"));
        assert_eq!( TileRef::new(3,7).path( &m, 14), p);
    }

    #[test]
    fn test_crop_rects() {
        let m = manifest( 2, 256, 7026, 9221);
        let g = PyramidGeometry::compute( &m, 0).unwrap();

        assert_eq!( crop_rect( &m, &g, TileRef::new(0,0)), CropRect::new( 0, 0, 256, 256));
        assert_eq!( crop_rect( &m, &g, TileRef::new(5,0)), CropRect::new( 2, 0, 256, 256));
        assert_eq!( crop_rect( &m, &g, TileRef::new(0,5)), CropRect::new( 0, 2, 256, 256));

        // last column: ((7026-1) % 256) + 1 = 114, last row: ((9221-1) % 256) + 1 = 5
        assert_eq!( crop_rect( &m, &g, TileRef::new(27,3)), CropRect::new( 2, 2, 114, 256));
        assert_eq!( crop_rect( &m, &g, TileRef::new(27,36)), CropRect::new( 2, 2, 114, 5));
    }

    #[test]
    fn test_even_remainder() {
        let m = manifest( 1, 256, 512, 300);
        let g = PyramidGeometry::compute( &m, 0).unwrap();
        assert_eq!( g.grid_width, 2);
        assert_eq!( crop_rect( &m, &g, TileRef::new(1,0)).width, 256);
    }

    #[test]
    fn test_single_tile() {
        let m = manifest( 1, 256, 100, 60);
        let g = PyramidGeometry::compute( &m, 0).unwrap();
        assert_eq!( (g.grid_width, g.grid_height), (1,1));
        assert_eq!( crop_rect( &m, &g, TileRef::new(0,0)), CropRect::new( 0, 0, 100, 60));
    }
}
