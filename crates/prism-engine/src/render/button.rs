use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::{Rect, Vec2};
use crate::paint::Color;

use super::{premul_alpha_blend, triangle_list, LabelBitmap, RenderCtx, RenderTarget, QUAD_INDICES};

/// Static look of an overlay button.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonStyle {
    pub corner_radius: f32,
    pub border_width: f32,
    pub border_color: Color,
    pub background: Color,
    pub text_color: Color,
}

/// One button draw: geometry plus the state-dependent opacity.
#[derive(Debug, Clone, Copy)]
pub struct ButtonDraw<'a> {
    pub rect: Rect,
    pub style: &'a ButtonStyle,
    pub opacity: f32,
}

/// Draws a single rounded, bordered button with a centered label mask.
///
/// Everything is done in one fragment pass: an SDF for the box and border and
/// a sampled R8 coverage texture for the label.
#[derive(Default)]
pub struct ButtonRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    bind_group: Option<wgpu::BindGroup>,
    ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    label_view: Option<wgpu::TextureView>,
    /// Logical size of the uploaded label; zero means no label.
    label_size: [f32; 2],
    label_dirty: bool,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
}

impl ButtonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads a new label mask. Call when the text or scale factor changes.
    pub fn set_label(&mut self, ctx: &RenderCtx<'_>, label: &LabelBitmap) {
        let size = wgpu::Extent3d {
            width: label.width.max(1),
            height: label.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("prism button label"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        if label.coverage.len() as u64 == u64::from(size.width) * u64::from(size.height) {
            ctx.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &label.coverage,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(size.width),
                    rows_per_image: Some(size.height),
                },
                size,
            );
        } else {
            log::warn!("label {:?}: coverage size mismatch, drawing without text", label.text);
        }

        self.label_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.label_size = label.logical_size().to_array();
        self.label_dirty = true;
    }

    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, draw: ButtonDraw<'_>) {
        if draw.rect.is_empty() || draw.opacity <= 0.0 {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_static_buffers(ctx);
        self.ensure_bindings(ctx);

        let Some(ubo) = self.ubo.as_ref() else { return };
        let label_rect = draw
            .rect
            .centered(Vec2::new(self.label_size[0], self.label_size[1]));
        let u = ButtonUniform {
            viewport: [ctx.viewport.width, ctx.viewport.height],
            rect_origin: draw.rect.origin.to_array(),
            rect_size: draw.rect.size.to_array(),
            label_origin: label_rect.origin.to_array(),
            label_size: self.label_size,
            radius: draw.style.corner_radius,
            border: draw.style.border_width,
            background: draw.style.background.to_array(),
            border_color: draw.style.border_color.to_array(),
            text_color: draw.style.text_color.to_array(),
            opacity: draw.opacity.clamp(0.0, 1.0),
            _pad: [0.0; 3],
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(vbo) = self.quad_vbo.as_ref() else { return };
        let Some(ibo) = self.quad_ibo.as_ref() else { return };

        let mut rpass = target.load_pass("prism button pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("prism button shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/button.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism button bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism button pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("prism button pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[CornerVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: triangle_list(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && !self.label_dirty {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        if self.label_view.is_none() {
            self.label_view = Some(empty_label(ctx));
            self.label_size = [0.0, 0.0];
        }
        let Some(label_view) = self.label_view.as_ref() else { return };

        let sampler = self.sampler.get_or_insert_with(|| {
            ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("prism button label sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        });

        let ubo = self.ubo.get_or_insert_with(|| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("prism button ubo"),
                size: std::mem::size_of::<ButtonUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism button bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(label_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
        self.label_dirty = false;
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism button quad vbo"),
            contents: bytemuck::cast_slice(&CORNERS),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism button quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

/// 1×1 transparent mask used until a label is uploaded (no font available).
fn empty_label(ctx: &RenderCtx<'_>) -> wgpu::TextureView {
    let size = wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 };
    let texture = ctx.device.create_texture_with_data(
        ctx.queue,
        &wgpu::TextureDescriptor {
            label: Some("prism empty label"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &[0u8],
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Uniform block layout (112 bytes), mirrors `Button` in button.wgsl.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ButtonUniform {
    viewport: [f32; 2],
    rect_origin: [f32; 2],
    rect_size: [f32; 2],
    label_origin: [f32; 2],
    label_size: [f32; 2],
    radius: f32,
    border: f32,
    background: [f32; 4],
    border_color: [f32; 4],
    text_color: [f32; 4],
    opacity: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CornerVertex {
    corner: [f32; 2], // 0..1
}

impl CornerVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CornerVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const CORNERS: [CornerVertex; 4] = [
    CornerVertex { corner: [0.0, 0.0] },
    CornerVertex { corner: [1.0, 0.0] },
    CornerVertex { corner: [1.0, 1.0] },
    CornerVertex { corner: [0.0, 1.0] },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<ButtonUniform>(), 112);
        assert_eq!(std::mem::offset_of!(ButtonUniform, background), 48);
        assert_eq!(std::mem::offset_of!(ButtonUniform, opacity), 96);
    }

    #[test]
    fn button_shader_is_valid_wgsl() {
        let src = include_str!("shaders/button.wgsl");
        let module = naga::front::wgsl::parse_str(src).expect("parse");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .expect("validate");
    }
}
