//! The narrow seam between the core and the graphics API.
//!
//! The pass chain and frame coordinator touch the display only through
//! [`RenderBackend`]: create an intermediate image buffer, bracket a frame
//! (acquire and present the display surface), and report the surface size.
//! [`GpuContext`](crate::GpuContext) is the shipped wgpu implementation; the
//! test suite substitutes a recording mock.

/// Display/graphics backend as seen by the core.
pub trait RenderBackend {
    /// An off-screen image buffer a pass can write to and a later pass can
    /// read from.
    type Target;

    /// Allocate an intermediate buffer of `width` x `height` device pixels.
    fn create_target(&mut self, width: u32, height: u32, label: &str) -> Self::Target;

    /// Begin a frame: acquire the display surface for writing.
    fn begin_frame(&mut self);

    /// End the frame: submit recorded work and present the display surface.
    fn end_frame(&mut self);

    /// Current display surface size in device pixels.
    fn surface_size(&self) -> (u32, u32);
}
