//! GPU rendering subsystem.
//!
//! Two renderers, each owning its GPU resources and building them lazily:
//! - [`ShaderQuadRenderer`] draws a user fragment shader over a 2×2 plane,
//!   mono or side-by-side stereo.
//! - [`ButtonRenderer`] draws the overlay button (rounded box + label mask).
//!
//! Convention: CPU geometry is in logical pixels (top-left origin, +Y down);
//! shaders convert to NDC with a viewport uniform.

mod button;
mod ctx;
mod label;
mod quad;
mod shader;

pub use button::{ButtonDraw, ButtonRenderer, ButtonStyle};
pub use ctx::{RenderCtx, RenderTarget};
pub use label::{FontLoadError, LabelBitmap, LabelRasterizer};
pub use quad::{eye_viewports, ShaderQuadRenderer};
pub use shader::{ShaderError, ShaderProgram, FRAGMENT_ENTRY, SHADER_PRELUDE};

pub(crate) fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: component, alpha: component }
}

pub(crate) fn triangle_list() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

pub(crate) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];
