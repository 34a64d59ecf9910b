use glam::Mat4;

/// The graphics API the viewer draws through.
///
/// Implementations own shader compilation, buffer objects and the canvas.
/// The viewer only uploads data once, sets uniforms and issues indexed
/// triangle draws.
pub trait RenderBackend {
    /// Handle to an uploaded vertex or index buffer.
    type Buffer;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Compile and link the shader program and make it current.
    fn init_program(&mut self) -> Result<(), Self::Error>;

    /// Upload `(x, y, z)` float triples.
    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<Self::Buffer, Self::Error>;

    fn create_index_buffer(&mut self, data: &[u32]) -> Result<Self::Buffer, Self::Error>;

    /// Current drawable size in pixels.
    fn canvas_size(&self) -> (u32, u32);

    fn set_viewport(&mut self, width: u32, height: u32);

    fn clear(&mut self, color: [f32; 4]);

    fn set_projection(&mut self, matrix: &Mat4);

    fn set_model_view(&mut self, matrix: &Mat4);

    /// RGBA, straight alpha.
    fn set_color(&mut self, rgba: [f32; 4]);

    fn bind_vertex_buffer(&mut self, buffer: &Self::Buffer);

    /// Draw `count` indices from `indices` as a triangle list.
    fn draw_indexed(&mut self, indices: &Self::Buffer, count: usize);
}
