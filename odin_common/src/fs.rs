/*
 * Copyright © 2024, United States Government, as represented by the Administrator of 
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

use std::fs;
use std::io::{self,ErrorKind::*};
use std::path::{Path,PathBuf};

use crate::macros::io_error;

type Result<T> = std::result::Result<T,std::io::Error>;

pub fn extension<'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().extension().and_then(|ostr| ostr.to_str())
}

pub fn filestem <'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().file_stem().and_then(|ostr| ostr.to_str())
}

/// lower case extension of path (if any)
pub fn lowercase_extension<T: AsRef<Path>> (path: &T)->Option<String> {
    extension(path).map(|ext| ext.to_ascii_lowercase())
}

/// derive the path of a sibling dir from a file path by replacing the (mandatory) file extension `ext`
/// with `suffix`, e.g. "/data/img.dzi" -> "/data/img_files".
/// Extension matching is case insensitive. Files that do not have the expected extension or an
/// empty stem are rejected
pub fn sibling_dir_with_suffix (path: impl AsRef<Path>, ext: &str, suffix: &str)->Result<PathBuf> {
    let path = path.as_ref();

    match extension(&path) {
        Some(e) if e.eq_ignore_ascii_case(ext) => {}
        Some(e) => return Err(io_error!(InvalidInput, "expected .{} file, got .{} in {:?}", ext, e, path)),
        None => return Err(io_error!(InvalidInput, "no .{} extension in {:?}", ext, path))
    }

    let stem = filestem(&path).filter(|s| !s.is_empty())
        .ok_or_else(|| io_error!(InvalidInput, "invalid filename {:?}", path))?;

    let dir_name = format!("{stem}{suffix}");
    Ok( match path.parent() {
        Some(parent) => parent.join( dir_name),
        None => PathBuf::from( dir_name)
    })
}

/// check if dir pathname exists and is writable, try to create dir otherwise
pub fn ensure_writable_dir (path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        let md = fs::metadata(&path)?;
        if md.permissions().readonly() {
            Err(io_error!(PermissionDenied, "dir {:?} not writable", &path))
        } else {
            Ok(())
        }

    } else {
        fs::create_dir_all(path)
    }
}

/// make sure the parent dir of a file path is writable. Relative filenames without dir
/// component refer to the current working dir
pub fn ensure_writable_parent (path: impl AsRef<Path>) -> io::Result<()> {
    match path.as_ref().parent() {
        Some(dir) if !dir.as_os_str().is_empty() => ensure_writable_dir( dir),
        _ => Ok(())
    }
}
