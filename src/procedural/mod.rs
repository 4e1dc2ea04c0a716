//! Procedural raster synthesis for the track surface.
//!
//! Stateless, deterministic generators producing caller-owned byte buffers:
//! a multi-octave noise heightmap, a normal map derived from it, and two
//! small format/debug helpers. The track bakes a 512x512 normal map from
//! these at load time; nothing here runs per frame.

pub mod noise;

use cgmath::{InnerSpace, Vector3, Zero};

use noise::{simplex2, simplex3};

/// Generates a `width` x `height`, row-major, single-channel heightmap.
///
/// Four octaves of simplex noise are stacked: three at halving frequency
/// and amplitude, plus a high-frequency 3-D octave keyed on both
/// coordinates and their product to break up axis-aligned patterns. Then
/// the running min/max is used to rescale the field linearly into [0, 255].
///
/// Returns an empty buffer when either dimension is zero.
pub fn generate_height_map(width: u32, height: u32) -> Vec<u8> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let (w, h) = (width as usize, height as usize);
    let mut field = vec![0.0f32; w * h];
    let mut min = f32::MAX;
    let mut max = f32::MIN;

    for x in 0..h {
        let offset = x * w;
        for y in 0..w {
            let (fx, fy) = (x as f32, y as f32);
            let mut value = 0.0;
            value += simplex2(fx / 8.0, fy / 8.0) / 4.0;
            value += simplex2(fx / 4.0, fy / 4.0) / 2.0;
            value += simplex2(fx / 2.0, fy / 2.0);
            value += simplex3(fx * 2.0, fy * 2.0, fx * fy / 10.0) * 4.0;

            field[offset + y] = value;
            min = min.min(value);
            max = max.max(value);
        }
    }

    let range = max - min;
    if range == 0.0 {
        return vec![0; w * h];
    }

    field
        .into_iter()
        .map(|value| (255.0 * (value - min) / range) as u8)
        .collect()
}

/// Expands a heightmap into grayscale RGBA. Debug helper.
pub fn height_map_to_rgba(width: u32, height: u32, heights: &[u8]) -> Vec<u8> {
    let size = width as usize * height as usize;
    if size == 0 || heights.len() < size {
        return Vec::new();
    }

    let mut rgba = Vec::with_capacity(size * 4);
    for &h in &heights[..size] {
        rgba.extend_from_slice(&[h, h, h, 0xFF]);
    }
    rgba
}

/// Alternating black/white RGBA pixels: grid lines for even widths, a
/// checkerboard for odd ones. Debug helper.
pub fn generate_alternating_grid(width: u32, height: u32) -> Vec<u8> {
    let size = width as usize * height as usize;
    if size == 0 {
        return Vec::new();
    }

    let mut rgba = Vec::with_capacity(size * 4);
    for x in 0..size {
        let shade = if x % 2 == 0 { 0x00 } else { 0xFF };
        rgba.extend_from_slice(&[shade, shade, shade, 0xFF]);
    }
    rgba
}

/// Derives a tangent-space normal map from a heightmap.
///
/// For each texel, the eight neighbors form a fan of eight triangles around
/// the center sample; the triangle normals are summed and normalized, and
/// the result is encoded as `(n + 1) / 2 * 255` per channel with opaque
/// alpha. Neighbor lookups wrap around the image edges; the map is
/// treated as toroidal, which keeps the seams invisible when the texture
/// tiles across the track.
///
/// Returns an empty buffer when either dimension is zero or the heightmap
/// is too small.
pub fn generate_normal_map(width: u32, height: u32, height_map: &[u8]) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 || height_map.len() < w * h {
        return Vec::new();
    }

    let sample = |row: usize, col: usize| -> f32 { height_map[row * w + col] as f32 / 255.0 };

    let mut normal_map = Vec::with_capacity(w * h * 4);
    for x in 0..h {
        for y in 0..w {
            let xp1 = (x + 1) % h;
            let yp1 = (y + 1) % w;
            let xm1 = if x != 0 { x - 1 } else { h - 1 };
            let ym1 = if y != 0 { y - 1 } else { w - 1 };

            let center = Vector3::new(0.0, 0.0, sample(x, y));
            // Counter-clockwise around the square, starting at the right
            // apothem.
            let ring = [
                Vector3::new(1.0, 0.0, sample(x, yp1)),
                Vector3::new(1.0, 1.0, sample(xm1, yp1)),
                Vector3::new(0.0, 1.0, sample(xm1, y)),
                Vector3::new(-1.0, 1.0, sample(xm1, ym1)),
                Vector3::new(-1.0, 0.0, sample(x, ym1)),
                Vector3::new(-1.0, -1.0, sample(xp1, ym1)),
                Vector3::new(0.0, -1.0, sample(xp1, y)),
                Vector3::new(1.0, -1.0, sample(xp1, yp1)),
            ];

            let mut sum = Vector3::zero();
            for i in 0..8 {
                sum += (ring[i] - center).cross(ring[(i + 1) % 8] - center);
            }
            let normal = sum.normalize();

            normal_map.extend_from_slice(&[
                (((normal.x + 1.0) / 2.0) * 255.0) as u8,
                (((normal.y + 1.0) / 2.0) * 255.0) as u8,
                (((normal.z + 1.0) / 2.0) * 255.0) as u8,
                0xFF,
            ]);
        }
    }

    normal_map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(channel: u8) -> f32 {
        channel as f32 / 255.0 * 2.0 - 1.0
    }

    #[test]
    fn height_map_has_one_byte_per_texel() {
        let map = generate_height_map(32, 16);
        assert_eq!(map.len(), 32 * 16);
    }

    #[test]
    fn height_map_spans_the_full_byte_range() {
        let map = generate_height_map(64, 64);
        assert_eq!(*map.iter().min().unwrap(), 0);
        assert_eq!(*map.iter().max().unwrap(), 255);
    }

    #[test]
    fn empty_dimensions_yield_empty_buffers() {
        assert!(generate_height_map(0, 64).is_empty());
        assert!(generate_height_map(64, 0).is_empty());
        assert!(generate_normal_map(0, 4, &[]).is_empty());
        assert!(height_map_to_rgba(0, 0, &[]).is_empty());
        assert!(generate_alternating_grid(0, 7).is_empty());
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(generate_height_map(16, 16), generate_height_map(16, 16));
    }

    #[test]
    fn flat_height_map_yields_straight_up_normals() {
        let flat = vec![128u8; 8 * 8];
        let normals = generate_normal_map(8, 8, &flat);
        assert_eq!(normals.len(), 8 * 8 * 4);
        for texel in normals.chunks(4) {
            assert!(decode(texel[0]).abs() < 0.01);
            assert!(decode(texel[1]).abs() < 0.01);
            assert!((decode(texel[2]) - 1.0).abs() < 0.01);
            assert_eq!(texel[3], 0xFF);
        }
    }

    #[test]
    fn ramp_normals_tilt_against_the_gradient() {
        // Height increases with the column index, so normals lean toward
        // -x in texture space. The wrapped seam column is excluded.
        let w = 16usize;
        let map: Vec<u8> = (0..w * w).map(|i| ((i % w) * 10) as u8).collect();
        let normals = generate_normal_map(w as u32, w as u32, &map);
        for row in 0..w {
            for col in 1..w - 1 {
                let texel = &normals[(row * w + col) * 4..][..4];
                assert!(decode(texel[0]) < 0.0, "row {row} col {col}");
            }
        }
    }

    #[test]
    fn rgba_expansion_is_grayscale_and_opaque() {
        let rgba = height_map_to_rgba(2, 2, &[0, 85, 170, 255]);
        assert_eq!(
            rgba,
            vec![0, 0, 0, 255, 85, 85, 85, 255, 170, 170, 170, 255, 255, 255, 255, 255]
        );
    }

    #[test]
    fn alternating_grid_checkerboards() {
        let grid = generate_alternating_grid(3, 1);
        assert_eq!(grid.len(), 12);
        assert_eq!(&grid[0..4], &[0, 0, 0, 255]);
        assert_eq!(&grid[4..8], &[255, 255, 255, 255]);
    }
}
