use crate::vertex::ProjectedVertex;
use druid::Color;

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Unit normal of the triangle a-b-c in view space.
pub fn face_normal(a: &[f64; 3], b: &[f64; 3], c: &[f64; 3]) -> [f64; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let normal = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let length = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
    if length == 0.0 {
        return [0.0, 0.0, 1.0];
    }
    [normal[0] / length, normal[1] / length, normal[2] / length]
}

/// Fixed light direction for the pose view, roughly over the viewer's
/// shoulder. Unit length.
const LIGHT_DIR: [f64; 3] = [0.343, -0.686, 0.641];

/// Lambert-shades a face color against the fixed light. Two-sided, since
/// rotated quads wind either way, with an ambient floor so dim faces stay
/// visible.
pub fn shade(color: &Color, normal: &[f64; 3]) -> Color {
    let dot = normal[0] * LIGHT_DIR[0] + normal[1] * LIGHT_DIR[1] + normal[2] * LIGHT_DIR[2];
    let intensity = dot.abs().max(0.25);
    let (r, g, b, _) = color.as_rgba8();
    Color::rgb8(
        (r as f64 * intensity).min(255.0) as u8,
        (g as f64 * intensity).min(255.0) as u8,
        (b as f64 * intensity).min(255.0) as u8,
    )
}

/// Draws a flat-colored triangle with depth testing.
pub fn draw_triangle(
    v0: &ProjectedVertex,
    v1: &ProjectedVertex,
    v2: &ProjectedVertex,
    pixel_data: &mut [u8],
    z_buffer: &mut [f64],
    width: usize,
    height: usize,
    color: Color,
) {
    // Compute bounding box of the triangle
    let min_x = v0.screen_position[0]
        .min(v1.screen_position[0])
        .min(v2.screen_position[0])
        .floor()
        .max(0.0) as usize;
    let max_x = v0.screen_position[0]
        .max(v1.screen_position[0])
        .max(v2.screen_position[0])
        .ceil()
        .min(width as f64 - 1.0) as usize;
    let min_y = v0.screen_position[1]
        .min(v1.screen_position[1])
        .min(v2.screen_position[1])
        .floor()
        .max(0.0) as usize;
    let max_y = v0.screen_position[1]
        .max(v1.screen_position[1])
        .max(v2.screen_position[1])
        .ceil()
        .min(height as f64 - 1.0) as usize;

    // Signed area; zero means the triangle is edge-on
    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area == 0.0 {
        return;
    }

    let (r, g, b, a) = color.as_rgba8();

    // For each pixel in the bounding box
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f64 + 0.5;
            let py = y as f64 + 0.5;
            let p = [px, py];

            let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p);
            let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p);
            let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p);

            // Accept both windings; rotation flips faces freely
            let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
            if inside {
                // Normalize barycentric coordinates
                let w0 = w0 / area;
                let w1 = w1 / area;
                let w2 = w2 / area;

                // Interpolate view-space depth
                let depth = v0.position[1] * w0 + v1.position[1] * w1 + v2.position[1] * w2;

                // Depth test: smaller depth is closer to the viewer
                let offset = y * width + x;
                if depth < z_buffer[offset] {
                    z_buffer[offset] = depth;

                    let pixel_offset = offset * 4;
                    pixel_data[pixel_offset] = r;
                    pixel_data[pixel_offset + 1] = g;
                    pixel_data[pixel_offset + 2] = b;
                    pixel_data[pixel_offset + 3] = a;
                }
            }
        }
    }
}

/// Clips a segment to the buffer rectangle with the Liang-Barsky parameter
/// tests, returning `None` when it lies entirely outside. Keeps the integer
/// walk in `draw_line` bounded by the buffer size no matter how far
/// offscreen the endpoints are.
fn clip_segment(
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    width: usize,
    height: usize,
) -> Option<(f64, f64, f64, f64)> {
    let x_max = width as f64 - 1.0;
    let y_max = height as f64 - 1.0;
    let dx = x1 - x0;
    let dy = y1 - y0;
    // A span wider than f64 can represent degenerates to NaN endpoints.
    if !(dx.is_finite() && dy.is_finite()) {
        return None;
    }

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, x0),
        (dx, x_max - x0),
        (-dy, y0),
        (dy, y_max - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }
    }

    Some((x0 + t0 * dx, y0 + t0 * dy, x0 + t1 * dx, y0 + t1 * dy))
}

/// Draws a line between two points in the pixel buffer using Bresenham's
/// algorithm. Endpoints may be anywhere; the segment is clipped to the
/// buffer first so the walk stays bounded and the pixel casts cannot
/// overflow.
pub fn draw_line(
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    pixel_data: &mut [u8],
    width: usize,
    height: usize,
    color: Color,
) {
    if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
        return;
    }
    let Some((x0, y0, x1, y1)) = clip_segment(x0, y0, x1, y1, width, height) else {
        return;
    };
    let (mut x0, mut y0, x1, y1) = (
        x0.round() as isize,
        y0.round() as isize,
        x1.round() as isize,
        y1.round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy

    loop {
        if x0 >= 0 && x0 < width as isize && y0 >= 0 && y0 < height as isize {
            let offset = (y0 as usize * width + x0 as usize) * 4;
            let (r, g, b, a) = color.as_rgba8();
            pixel_data[offset] = r;
            pixel_data[offset + 1] = g;
            pixel_data[offset + 2] = b;
            pixel_data[offset + 3] = a;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Fills an axis-aligned rectangle, clipped to the buffer.
pub fn fill_rect(
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    pixel_data: &mut [u8],
    width: usize,
    height: usize,
    color: Color,
) {
    let (r, g, b, a) = color.as_rgba8();
    for py in y..(y + h).min(height) {
        for px in x..(x + w).min(width) {
            let offset = (py * width + px) * 4;
            pixel_data[offset] = r;
            pixel_data[offset + 1] = g;
            pixel_data[offset + 2] = b;
            pixel_data[offset + 3] = a;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: usize = 64;

    fn buffer() -> Vec<u8> {
        vec![0u8; SIZE * SIZE * 4]
    }

    fn pixel_set(pixel_data: &[u8], x: usize, y: usize) -> bool {
        pixel_data[(y * SIZE + x) * 4 + 3] != 0
    }

    #[test]
    fn line_inside_the_buffer_is_drawn() {
        let mut pixel_data = buffer();
        draw_line(4.0, 10.0, 20.0, 10.0, &mut pixel_data, SIZE, SIZE, Color::WHITE);
        for x in 4..=20 {
            assert!(pixel_set(&pixel_data, x, 10));
        }
        assert!(!pixel_set(&pixel_data, 3, 10));
        assert!(!pixel_set(&pixel_data, 21, 10));
    }

    #[test]
    fn huge_opposite_endpoints_do_not_panic() {
        // Position samples only have to be finite, so the projected
        // trajectory can hand the rasterizer coordinates this large.
        let mut pixel_data = buffer();
        draw_line(
            -1e300,
            32.0,
            1e300,
            32.0,
            &mut pixel_data,
            SIZE,
            SIZE,
            Color::WHITE,
        );
        // Span wider than f64 can hold.
        draw_line(
            f64::MIN,
            0.0,
            f64::MAX,
            63.0,
            &mut pixel_data,
            SIZE,
            SIZE,
            Color::WHITE,
        );
    }

    #[test]
    fn one_far_endpoint_terminates_quickly_and_clips() {
        let mut pixel_data = buffer();
        draw_line(32.0, 32.0, 1e15, 32.0, &mut pixel_data, SIZE, SIZE, Color::WHITE);
        // The onscreen part of the span is drawn, nothing more.
        assert!(pixel_set(&pixel_data, 32, 32));
        assert!(pixel_set(&pixel_data, SIZE - 1, 32));
        assert!(!pixel_set(&pixel_data, 31, 32));
    }

    #[test]
    fn fully_offscreen_line_draws_nothing() {
        let mut pixel_data = buffer();
        draw_line(
            -500.0,
            -500.0,
            -100.0,
            -2.0,
            &mut pixel_data,
            SIZE,
            SIZE,
            Color::WHITE,
        );
        assert!(pixel_data.iter().all(|&byte| byte == 0));
    }

    #[test]
    fn non_finite_endpoints_are_ignored() {
        let mut pixel_data = buffer();
        draw_line(f64::NAN, 0.0, 10.0, 10.0, &mut pixel_data, SIZE, SIZE, Color::WHITE);
        draw_line(0.0, 0.0, f64::INFINITY, 10.0, &mut pixel_data, SIZE, SIZE, Color::WHITE);
        assert!(pixel_data.iter().all(|&byte| byte == 0));
    }

    #[test]
    fn clipped_diagonal_stays_in_bounds() {
        // Out-of-bounds writes would panic on the slice index.
        let mut pixel_data = buffer();
        draw_line(
            -1000.0,
            -1000.0,
            1000.0,
            1000.0,
            &mut pixel_data,
            SIZE,
            SIZE,
            Color::WHITE,
        );
        assert!(pixel_set(&pixel_data, 10, 10));
    }
}
