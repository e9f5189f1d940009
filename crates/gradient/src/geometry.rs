//! Procedural tessellated-plane generator.
//!
//! Pure CPU-side buffer construction; no GPU calls happen here. The
//! renderer disables the depth buffer for performance, so vertices are
//! emitted back-to-front (highest v-parameter first) and correct layer
//! blending falls out of draw order. Back-face culling relies on the
//! consistent winding produced by [`PlaneGeometry::generate`].

/// Floats per vertex: clip-space x, clip-space y, and the v-parameter
/// the shaders use as third coordinate.
pub const FLOATS_PER_VERTEX: usize = 3;

/// Vertex and index buffers for the tessellated plane.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneGeometry {
    pub positions: Vec<f32>,
    pub indices: Vec<u32>,
    pub grid_x: u32,
    pub grid_z: u32,
}

impl PlaneGeometry {
    /// Tessellates the plane for a surface of `width`×`height` pixels.
    ///
    /// `grid_x = ceil(dx·width)`, `grid_z = ceil(dz·height)`, yielding
    /// `(grid_x+1)·(grid_z+1)` vertices and `6·grid_x·grid_z` indices.
    /// x runs left to right across [-1, 1]; rows are emitted with the
    /// v-parameter descending from 1 to 0 and y mirrored as `1 - 2v`.
    pub fn generate(width: u32, height: u32, density: [f32; 2]) -> Self {
        let grid_x = (density[0] * width as f32).ceil().max(1.0) as u32;
        let grid_z = (density[1] * height as f32).ceil().max(1.0) as u32;

        let mut positions =
            Vec::with_capacity(((grid_x + 1) * (grid_z + 1)) as usize * FLOATS_PER_VERTEX);
        for iz in 0..=grid_z {
            let v = 1.0 - iz as f32 / grid_z as f32;
            let y = 1.0 - 2.0 * v;
            for ix in 0..=grid_x {
                let x = -1.0 + 2.0 * ix as f32 / grid_x as f32;
                positions.extend_from_slice(&[x, y, v]);
            }
        }

        let stride = grid_x + 1;
        let mut indices = Vec::with_capacity((6 * grid_x * grid_z) as usize);
        for iz in 0..grid_z {
            for ix in 0..grid_x {
                let a = iz * stride + ix;
                let b = a + 1;
                let c = a + stride;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        Self {
            positions,
            indices,
            grid_x,
            grid_z,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        (self.positions.len() / FLOATS_PER_VERTEX) as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}
