//! Opaque-pixel bounds for hitbox trimming.
//!
//! Sprites usually carry a lot of transparent padding, so hit regions sized to
//! the full rectangle feel unfair. The host hands over a texture's alpha
//! channel once per key; the tight box around the pixels above the threshold
//! is cached so repeat queries cost nothing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tight box around a texture's opaque pixels, in unscaled texture space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueBounds {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Compute the opaque bounds of a row-major alpha bitmap (`w * h` entries,
/// one byte per pixel). Pixels with alpha strictly above the threshold count
/// as solid. A degenerate or fully transparent image falls back to the full
/// rectangle.
pub fn opaque_bounds(width: u32, height: u32, alpha: &[u8], alpha_threshold: u8) -> OpaqueBounds {
    let full = OpaqueBounds {
        x: 0,
        y: 0,
        w: width.max(1),
        h: height.max(1),
    };
    if width == 0 || height == 0 || alpha.len() < (width * height) as usize {
        return full;
    }

    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;

    for y in 0..height {
        let row = (y * width) as usize;
        for x in 0..width {
            if alpha[row + x as usize] > alpha_threshold {
                any = true;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
    }

    if !any {
        return full;
    }

    OpaqueBounds {
        x: min_x,
        y: min_y,
        w: max_x - min_x + 1,
        h: max_y - min_y + 1,
    }
}

/// Per-texture cache keyed by (texture key, threshold); the alpha data is only
/// requested on a miss.
#[derive(Debug, Default)]
pub struct BoundsCache {
    cache: HashMap<(String, u8), OpaqueBounds>,
}

impl BoundsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up cached bounds, computing them from the host-supplied bitmap on
    /// the first query. `load` returns (width, height, alpha bytes).
    pub fn get_or_compute<F>(&mut self, key: &str, alpha_threshold: u8, load: F) -> OpaqueBounds
    where
        F: FnOnce() -> (u32, u32, Vec<u8>),
    {
        if let Some(bounds) = self.cache.get(&(key.to_string(), alpha_threshold)) {
            return *bounds;
        }
        let (w, h, alpha) = load();
        let bounds = opaque_bounds(w, h, &alpha, alpha_threshold);
        self.cache
            .insert((key.to_string(), alpha_threshold), bounds);
        bounds
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_transparent_padding() {
        // 6x4 bitmap with a 2x2 solid core at (2,1)
        let mut alpha = vec![0u8; 24];
        for (x, y) in [(2, 1), (3, 1), (2, 2), (3, 2)] {
            alpha[y * 6 + x] = 255;
        }
        let bounds = opaque_bounds(6, 4, &alpha, 10);
        assert_eq!(
            bounds,
            OpaqueBounds {
                x: 2,
                y: 1,
                w: 2,
                h: 2
            }
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut alpha = vec![0u8; 9];
        alpha[4] = 10;
        // Alpha equal to the threshold does not count as solid
        let bounds = opaque_bounds(3, 3, &alpha, 10);
        assert_eq!(bounds.w, 3);
        assert_eq!(bounds.h, 3);

        alpha[4] = 11;
        let bounds = opaque_bounds(3, 3, &alpha, 10);
        assert_eq!(
            bounds,
            OpaqueBounds {
                x: 1,
                y: 1,
                w: 1,
                h: 1
            }
        );
    }

    #[test]
    fn test_fully_transparent_falls_back_to_full() {
        let alpha = vec![0u8; 16];
        let bounds = opaque_bounds(4, 4, &alpha, 10);
        assert_eq!(
            bounds,
            OpaqueBounds {
                x: 0,
                y: 0,
                w: 4,
                h: 4
            }
        );
    }

    #[test]
    fn test_cache_loads_once_per_key() {
        let mut cache = BoundsCache::new();
        let mut loads = 0;

        for _ in 0..3 {
            let bounds = cache.get_or_compute("sleigh", 10, || {
                loads += 1;
                (2, 2, vec![255, 0, 0, 0])
            });
            assert_eq!(
                bounds,
                OpaqueBounds {
                    x: 0,
                    y: 0,
                    w: 1,
                    h: 1
                }
            );
        }
        assert_eq!(loads, 1);

        // A different threshold is a different cache entry
        cache.get_or_compute("sleigh", 200, || {
            loads += 1;
            (2, 2, vec![255, 0, 0, 0])
        });
        assert_eq!(loads, 2);
        assert_eq!(cache.len(), 2);
    }
}
