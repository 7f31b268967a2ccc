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

pub mod macros;
pub mod fs;

// integer sugar used by tiling/pyramid computations

/// integer division that rounds up (`b` has to be > 0)
#[inline(always)] pub fn ceil_div (a: u64, b: u64)->u64 { a.div_ceil(b) }

/// number of bits required to represent `n`, i.e. `1 + floor(log2(n))` for n > 0 and 0 for n == 0
#[inline(always)] pub fn bit_length (n: u64)->u32 { u64::BITS - n.leading_zeros() }

/// 2^n as u64 (n has to be < 64)
#[inline(always)] pub fn pow2_u64 (n: u32)->u64 { 1u64 << n }
