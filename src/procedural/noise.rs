//! Coherent 2-D/3-D simplex noise.
//!
//! Self-contained implementation of Gustavson's simplex noise with Perlin's
//! reference permutation table, so the generated track surface is identical
//! on every run and every platform. Outputs are roughly in [-1, 1].

const GRAD3: [[f32; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

#[rustfmt::skip]
const PERM: [u8; 256] = [
    151, 160, 137,  91,  90,  15, 131,  13, 201,  95,  96,  53, 194, 233,   7, 225,
    140,  36, 103,  30,  69, 142,   8,  99,  37, 240,  21,  10,  23, 190,   6, 148,
    247, 120, 234,  75,   0,  26, 197,  62,  94, 252, 219, 203, 117,  35,  11,  32,
     57, 177,  33,  88, 237, 149,  56,  87, 174,  20, 125, 136, 171, 168,  68, 175,
     74, 165,  71, 134, 139,  48,  27, 166,  77, 146, 158, 231,  83, 111, 229, 122,
     60, 211, 133, 230, 220, 105,  92,  41,  55,  46, 245,  40, 244, 102, 143,  54,
     65,  25,  63, 161,   1, 216,  80,  73, 209,  76, 132, 187, 208,  89,  18, 169,
    200, 196, 135, 130, 116, 188, 159,  86, 164, 100, 109, 198, 173, 186,   3,  64,
     52, 217, 226, 250, 124, 123,   5, 202,  38, 147, 118, 126, 255,  82,  85, 212,
    207, 206,  59, 227,  47,  16,  58,  17, 182, 189,  28,  42, 223, 183, 170, 213,
    119, 248, 152,   2,  44, 154, 163,  70, 221, 153, 101, 155, 167,  43, 172,   9,
    129,  22,  39, 253,  19,  98, 108, 110,  79, 113, 224, 232, 178, 185, 112, 104,
    218, 246,  97, 228, 251,  34, 242, 193, 238, 210, 144,  12, 191, 179, 162, 241,
     81,  51, 145, 235, 249,  14, 239, 107,  49, 192, 214,  31, 181, 199, 106, 157,
    184,  84, 204, 176, 115, 121,  50,  45, 127,   4, 150, 254, 138, 236, 205,  93,
    222, 114,  67,  29,  24,  72, 243, 141, 128, 195,  78,  66, 215,  61, 156, 180,
];

fn perm(i: i32) -> i32 {
    PERM[(i & 255) as usize] as i32
}

fn grad_dot2(gi: usize, x: f32, y: f32) -> f32 {
    let g = GRAD3[gi];
    g[0] * x + g[1] * y
}

fn grad_dot3(gi: usize, x: f32, y: f32, z: f32) -> f32 {
    let g = GRAD3[gi];
    g[0] * x + g[1] * y + g[2] * z
}

/// 2-D simplex noise.
pub fn simplex2(x: f32, y: f32) -> f32 {
    // Skew/unskew factors for 2 dimensions.
    const F2: f32 = 0.366_025_42; // 0.5 * (sqrt(3) - 1)
    const G2: f32 = 0.211_324_87; // (3 - sqrt(3)) / 6

    let s = (x + y) * F2;
    let i = (x + s).floor() as i32;
    let j = (y + s).floor() as i32;

    let t = (i + j) as f32 * G2;
    let x0 = x - (i as f32 - t);
    let y0 = y - (j as f32 - t);

    // Which triangle of the skewed cell are we in?
    let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

    let x1 = x0 - i1 as f32 + G2;
    let y1 = y0 - j1 as f32 + G2;
    let x2 = x0 - 1.0 + 2.0 * G2;
    let y2 = y0 - 1.0 + 2.0 * G2;

    let gi0 = (perm(i + perm(j)) % 12) as usize;
    let gi1 = (perm(i + i1 + perm(j + j1)) % 12) as usize;
    let gi2 = (perm(i + 1 + perm(j + 1)) % 12) as usize;

    let mut total = 0.0;
    for (gi, cx, cy) in [(gi0, x0, y0), (gi1, x1, y1), (gi2, x2, y2)] {
        let t = 0.5 - cx * cx - cy * cy;
        if t > 0.0 {
            total += t * t * t * t * grad_dot2(gi, cx, cy);
        }
    }

    70.0 * total
}

/// 3-D simplex noise.
pub fn simplex3(x: f32, y: f32, z: f32) -> f32 {
    const F3: f32 = 1.0 / 3.0;
    const G3: f32 = 1.0 / 6.0;

    let s = (x + y + z) * F3;
    let i = (x + s).floor() as i32;
    let j = (y + s).floor() as i32;
    let k = (z + s).floor() as i32;

    let t = (i + j + k) as f32 * G3;
    let x0 = x - (i as f32 - t);
    let y0 = y - (j as f32 - t);
    let z0 = z - (k as f32 - t);

    // Corner offsets for the second and third simplex corners, picked by
    // ranking the fractional coordinates.
    let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
        if y0 >= z0 {
            (1, 0, 0, 1, 1, 0)
        } else if x0 >= z0 {
            (1, 0, 0, 1, 0, 1)
        } else {
            (0, 0, 1, 1, 0, 1)
        }
    } else if y0 < z0 {
        (0, 0, 1, 0, 1, 1)
    } else if x0 < z0 {
        (0, 1, 0, 0, 1, 1)
    } else {
        (0, 1, 0, 1, 1, 0)
    };

    let x1 = x0 - i1 as f32 + G3;
    let y1 = y0 - j1 as f32 + G3;
    let z1 = z0 - k1 as f32 + G3;
    let x2 = x0 - i2 as f32 + 2.0 * G3;
    let y2 = y0 - j2 as f32 + 2.0 * G3;
    let z2 = z0 - k2 as f32 + 2.0 * G3;
    let x3 = x0 - 1.0 + 3.0 * G3;
    let y3 = y0 - 1.0 + 3.0 * G3;
    let z3 = z0 - 1.0 + 3.0 * G3;

    let gi0 = (perm(i + perm(j + perm(k))) % 12) as usize;
    let gi1 = (perm(i + i1 + perm(j + j1 + perm(k + k1))) % 12) as usize;
    let gi2 = (perm(i + i2 + perm(j + j2 + perm(k + k2))) % 12) as usize;
    let gi3 = (perm(i + 1 + perm(j + 1 + perm(k + 1))) % 12) as usize;

    let mut total = 0.0;
    for (gi, cx, cy, cz) in [
        (gi0, x0, y0, z0),
        (gi1, x1, y1, z1),
        (gi2, x2, y2, z2),
        (gi3, x3, y3, z3),
    ] {
        let t = 0.6 - cx * cx - cy * cy - cz * cz;
        if t > 0.0 {
            total += t * t * t * t * grad_dot3(gi, cx, cy, cz);
        }
    }

    32.0 * total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplex2_stays_in_range() {
        for x in 0..64 {
            for y in 0..64 {
                let v = simplex2(x as f32 * 0.37, y as f32 * 0.53);
                assert!((-1.0..=1.0).contains(&v), "out of range: {v}");
            }
        }
    }

    #[test]
    fn simplex3_stays_in_range() {
        for x in 0..32 {
            for y in 0..32 {
                let v = simplex3(x as f32 * 0.41, y as f32 * 0.29, (x * y) as f32 * 0.07);
                assert!((-1.0..=1.0).contains(&v), "out of range: {v}");
            }
        }
    }

    #[test]
    fn noise_is_deterministic() {
        assert_eq!(simplex2(12.34, 56.78), simplex2(12.34, 56.78));
        assert_eq!(simplex3(1.2, 3.4, 5.6), simplex3(1.2, 3.4, 5.6));
    }

    #[test]
    fn noise_is_not_constant() {
        let mut values = std::collections::BTreeSet::new();
        for x in 0..16 {
            values.insert(simplex2(x as f32 * 0.71, 0.5).to_bits());
        }
        assert!(values.len() > 4);
    }

    #[test]
    fn negative_coordinates_are_valid() {
        let v = simplex2(-17.3, -42.9);
        assert!((-1.0..=1.0).contains(&v));
    }
}
