/// A point after view rotation: view-space position for depth testing and
/// shading, screen position in pixels for rasterization.
pub struct ProjectedVertex {
    pub position: [f64; 3],
    pub screen_position: [f64; 2],
}
