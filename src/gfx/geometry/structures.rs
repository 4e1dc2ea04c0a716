//! Scene-specific tessellation: extruded building outlines and the closed
//! track ribbon.

use cgmath::{InnerSpace, Vector3};

use super::MeshData;

/// How many times the track normal map repeats per world unit.
const TRACK_UV_REPEAT: f32 = 0.25;

/// Generate a building from four base corners and a per-corner roof height.
///
/// The walls are extruded straight up from each base point to its height and
/// the roof is split into two triangles, so the four heights need not match.
///
/// # Arguments
/// * `base` - Four base corners in counter-clockwise order
/// * `heights` - Roof height above each corresponding corner
pub fn generate_building(base: [[f32; 3]; 4], heights: [f32; 4]) -> MeshData {
    let mut data = MeshData::new();

    // Reversed for the rasterizer's winding, same as the quad tessellator.
    let base: Vec<Vector3<f32>> = base.iter().rev().map(|&c| Vector3::from(c)).collect();
    let heights: Vec<f32> = heights.iter().rev().copied().collect();

    for x in 0..4 {
        build_wall(&mut data, &base, &heights, x, (x + 1) % 4);
    }
    build_roof_tri(&mut data, &base, &heights, 0, 1, 2);
    build_roof_tri(&mut data, &base, &heights, 0, 2, 3);

    data
}

fn build_wall(data: &mut MeshData, base: &[Vector3<f32>], heights: &[f32], i1: usize, i2: usize) {
    let start = data.vertex_count() as u32;
    let p = [
        base[i1],
        base[i2],
        Vector3::new(base[i2].x, heights[i2], base[i2].z),
        Vector3::new(base[i1].x, heights[i1], base[i1].z),
    ];
    let normal: [f32; 3] = (p[1] - p[0]).cross(p[2] - p[0]).normalize().into();

    for corner in p {
        data.push_vertex(corner.into(), normal);
    }
    data.push_triangle(start, start + 1, start + 2);
    data.push_triangle(start, start + 2, start + 3);
}

fn build_roof_tri(
    data: &mut MeshData,
    base: &[Vector3<f32>],
    heights: &[f32],
    i1: usize,
    i2: usize,
    i3: usize,
) {
    let start = data.vertex_count() as u32;
    let p = [
        Vector3::new(base[i1].x, heights[i1], base[i1].z),
        Vector3::new(base[i2].x, heights[i2], base[i2].z),
        Vector3::new(base[i3].x, heights[i3], base[i3].z),
    ];
    let normal: [f32; 3] = (p[1] - p[0]).cross(p[2] - p[0]).normalize().into();

    for corner in p {
        data.push_vertex(corner.into(), normal);
    }
    data.push_triangle(start, start + 1, start + 2);
}

/// Generate the track surface as a closed ribbon between two curb polylines.
///
/// Curb points are consumed pairwise (left\[i\], right\[i\]) and the strip
/// wraps from the last pair back to the first, closing the loop. Normals
/// point straight up; UVs repeat the normal map over world x/z so the
/// texture density is independent of segment length.
///
/// Trailing coordinates beyond the shorter curb are ignored.
pub fn generate_track_ribbon(left_curb: &[f32], right_curb: &[f32]) -> MeshData {
    let mut data = MeshData::new();
    let up = [0.0, 1.0, 0.0];

    let pairs = (left_curb.len().min(right_curb.len()) / 3) as u32;
    if pairs == 0 {
        return data;
    }

    for x in 0..pairs as usize {
        let l = [left_curb[x * 3], left_curb[x * 3 + 1], left_curb[x * 3 + 2]];
        let r = [
            right_curb[x * 3],
            right_curb[x * 3 + 1],
            right_curb[x * 3 + 2],
        ];
        data.push_vertex(l, up);
        data.push_vertex(r, up);
        data.tex_coords
            .push([l[0] * TRACK_UV_REPEAT, l[2] * TRACK_UV_REPEAT]);
        data.tex_coords
            .push([r[0] * TRACK_UV_REPEAT, r[2] * TRACK_UV_REPEAT]);
    }

    for x in (0..pairs * 2).step_by(2) {
        let n = (x + 2) % (pairs * 2); // next left curb vertex
        data.push_triangle(x, x + 1, n + 1); // left:  0 -- 2 -- 4
        data.push_triangle(n + 1, n, x); // right: 1 -- 3 -- 5
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_counts() {
        let b = generate_building(
            [
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 4.0],
                [4.0, 0.0, 4.0],
                [4.0, 0.0, 0.0],
            ],
            [2.0, 2.0, 3.0, 3.0],
        );
        // 4 walls x 4 vertices + 2 roof triangles x 3 vertices
        assert_eq!(b.vertex_count(), 22);
        // 2 per wall + 2 roof
        assert_eq!(b.triangle_count(), 10);
    }

    #[test]
    fn building_roof_reaches_heights() {
        let heights = [2.0, 5.0, 3.0, 4.0];
        let b = generate_building(
            [
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 4.0],
                [4.0, 0.0, 4.0],
                [4.0, 0.0, 0.0],
            ],
            heights,
        );
        let max_y = b.positions.iter().map(|p| p[1]).fold(f32::MIN, f32::max);
        assert_eq!(max_y, 5.0);
    }

    #[test]
    fn ribbon_closes_the_loop() {
        // A triangle-ish loop: three left/right pairs.
        let left = [0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 5.0, 0.0, 10.0];
        let right = [1.0, 0.0, 1.0, 9.0, 0.0, 1.0, 5.0, 0.0, 9.0];
        let ribbon = generate_track_ribbon(&left, &right);

        assert_eq!(ribbon.vertex_count(), 6);
        assert_eq!(ribbon.triangle_count(), 6);
        // The final segment must reference the first pair again.
        let last = &ribbon.indices[ribbon.indices.len() - 6..];
        assert!(last.contains(&0) && last.contains(&1));
    }

    #[test]
    fn ribbon_ignores_trailing_unpaired_data() {
        let left = [0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 5.0, 0.0, 10.0];
        let right = [1.0, 0.0, 1.0, 9.0, 0.0, 1.0]; // one pair short
        let ribbon = generate_track_ribbon(&left, &right);
        assert_eq!(ribbon.vertex_count(), 4);
    }

    #[test]
    fn ribbon_uvs_follow_world_footprint() {
        let left = [4.0, 0.0, 8.0, 12.0, 0.0, 8.0];
        let right = [4.0, 0.0, 12.0, 12.0, 0.0, 12.0];
        let ribbon = generate_track_ribbon(&left, &right);
        assert_eq!(ribbon.tex_coords[0], [1.0, 2.0]);
        assert_eq!(ribbon.tex_coords[1], [1.0, 3.0]);
    }
}
