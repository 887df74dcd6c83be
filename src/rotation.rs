//! Euler-angle rotation pipeline for the pose cuboid.
//!
//! Coordinate convention follows the sensor model: index 0 is world x,
//! index 1 is world z (plotted as depth), index 2 is height. Yaw rotates
//! about the height axis, pitch about the depth axis, roll about x.

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &[[f64; 3]; 3], vector: &[f64; 3]) -> [f64; 3] {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Right-handed rotation about the first axis, angle in radians.
pub fn rotation_x(angle: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, cos, -sin], [0.0, sin, cos]]
}

/// Right-handed rotation about the second axis, angle in radians.
pub fn rotation_y(angle: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = angle.sin_cos();
    [[cos, 0.0, sin], [0.0, 1.0, 0.0], [-sin, 0.0, cos]]
}

/// Right-handed rotation about the third axis, angle in radians.
pub fn rotation_z(angle: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = angle.sin_cos();
    [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]]
}

/// Combined rotation for the sensor's Euler angles, in degrees.
///
/// Composed as `R = Rz(yaw) · Ry(pitch) · Rx(roll)`: roll is applied to the
/// object first, then pitch, then yaw. The sensor's angle outputs are tuned
/// to this order, so it must not change.
pub fn rotation_matrix(yaw_deg: f64, pitch_deg: f64, roll_deg: f64) -> [[f64; 3]; 3] {
    let rx = rotation_x(roll_deg.to_radians());
    let ry = rotation_y(pitch_deg.to_radians());
    let rz = rotation_z(yaw_deg.to_radians());
    multiply_matrices(&rz, &multiply_matrices(&ry, &rx))
}

/// Vertex index groups for the six cuboid faces, in the fixed order
/// bottom, top, front, back, left, right.
pub const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [2, 3, 7, 6],
    [0, 3, 7, 4],
    [1, 2, 6, 5],
];

/// The four edges outlining one face, as pairs into [`CUBE_FACES`] order.
pub const FACE_EDGES: [[usize; 2]; 4] = [[0, 1], [1, 2], [2, 3], [3, 0]];

/// Local-space cuboid of edge length `size` centered at the origin,
/// bottom face first, then the top face directly above it.
pub fn cube_vertices(size: f64) -> [[f64; 3]; 8] {
    let s = size / 2.0;
    [
        [-s, -s, -s],
        [s, -s, -s],
        [s, s, -s],
        [-s, s, -s],
        [-s, -s, s],
        [s, -s, s],
        [s, s, s],
        [-s, s, s],
    ]
}

/// Rotates the local cuboid by the given Euler angles (degrees) and places
/// it at the current (x, z) position. Height is never translated; the model
/// has no vertical displacement. Pure, recomputed fresh every tick.
pub fn rotate_and_place(
    yaw_deg: f64,
    pitch_deg: f64,
    roll_deg: f64,
    translate_x: f64,
    translate_z: f64,
    size: f64,
) -> [[f64; 3]; 8] {
    let rotation = rotation_matrix(yaw_deg, pitch_deg, roll_deg);
    let mut vertices = cube_vertices(size);
    for vertex in vertices.iter_mut() {
        let rotated = multiply_matrix_vector(&rotation, vertex);
        *vertex = [rotated[0] + translate_x, rotated[1] + translate_z, rotated[2]];
    }
    vertices
}

/// Expands 8 cuboid vertices into the six quad faces.
pub fn faces(vertices: &[[f64; 3]; 8]) -> [[[f64; 3]; 4]; 6] {
    CUBE_FACES.map(|quad| quad.map(|index| vertices[index]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn assert_close(actual: &[f64; 3], expected: &[f64; 3]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!(
                (a - e).abs() < EPSILON,
                "expected {:?}, got {:?}",
                expected,
                actual
            );
        }
    }

    #[test]
    fn zero_angles_zero_translation_is_identity() {
        let placed = rotate_and_place(0.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        for (v, local) in placed.iter().zip(&cube_vertices(1.0)) {
            assert_close(v, local);
        }
    }

    #[test]
    fn yaw_90_is_a_pure_height_axis_rotation() {
        for size in [0.4, 1.0, 3.0] {
            let placed = rotate_and_place(90.0, 0.0, 0.0, 0.0, 0.0, size);
            for (v, local) in placed.iter().zip(&cube_vertices(size)) {
                // (x, z) -> (-z, x), height untouched
                assert_close(v, &[-local[1], local[0], local[2]]);
            }
        }
    }

    #[test]
    fn roll_is_applied_before_yaw() {
        // Rz(90) . Rx(90) sends (x, y, z) to (z, x, y); the reverse order
        // Rx(90) . Rz(90) would send it to (-y, -z, x) instead.
        let rotation = rotation_matrix(90.0, 0.0, 90.0);
        let rotated = multiply_matrix_vector(&rotation, &[1.0, 2.0, 3.0]);
        assert_close(&rotated, &[3.0, 1.0, 2.0]);
    }

    #[test]
    fn translation_shifts_x_and_z_only() {
        let angles = [(0.0, 0.0, 0.0), (90.0, 0.0, 0.0), (33.0, -12.0, 141.0)];
        for (yaw, pitch, roll) in angles {
            let base = rotate_and_place(yaw, pitch, roll, 0.0, 0.0, 0.4);
            let moved = rotate_and_place(yaw, pitch, roll, 0.5, 1.2, 0.4);
            for (b, m) in base.iter().zip(&moved) {
                assert_close(m, &[b[0] + 0.5, b[1] + 1.2, b[2]]);
            }
        }
    }

    #[test]
    fn faces_follow_the_fixed_index_groups() {
        let vertices: [[f64; 3]; 8] =
            std::array::from_fn(|i| [i as f64, i as f64 * 10.0, i as f64 * 100.0]);
        let quads = faces(&vertices);
        assert_eq!(quads.len(), 6);
        for (quad, indices) in quads.iter().zip(&CUBE_FACES) {
            assert_eq!(quad.len(), 4);
            for (corner, &index) in quad.iter().zip(indices) {
                assert_eq!(*corner, vertices[index]);
            }
        }
    }

    #[test]
    fn rotation_matrices_are_orthonormal() {
        let rotation = rotation_matrix(37.0, -68.0, 112.0);
        // R . R^T = I
        let mut transposed = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                transposed[i][j] = rotation[j][i];
            }
        }
        let product = multiply_matrices(&rotation, &transposed);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((product[i][j] - expected).abs() < EPSILON);
            }
        }
    }
}
