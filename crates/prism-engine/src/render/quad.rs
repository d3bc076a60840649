use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::{triangle_list, RenderCtx, RenderTarget, ShaderProgram, QUAD_INDICES};

/// Draws a [`ShaderProgram`] over a 2×2 plane covering the target.
///
/// The only per-frame input is `time`. In stereo mode the plane is drawn once
/// per eye into the left and right halves of the target.
pub struct ShaderQuadRenderer {
    program: ShaderProgram,
    stereo: bool,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group: Option<wgpu::BindGroup>,
    uniform_ubo: Option<wgpu::Buffer>,

    plane_vbo: Option<wgpu::Buffer>,
    plane_ibo: Option<wgpu::Buffer>,
}

impl ShaderQuadRenderer {
    pub fn new(program: ShaderProgram) -> Self {
        Self {
            program,
            stereo: false,
            pipeline_format: None,
            pipeline: None,
            bind_group: None,
            uniform_ubo: None,
            plane_vbo: None,
            plane_ibo: None,
        }
    }

    pub fn set_stereo(&mut self, stereo: bool) {
        if self.stereo != stereo {
            log::debug!("shader quad stereo = {stereo}");
        }
        self.stereo = stereo;
    }

    /// Writes `time` into the uniform block and draws the plane.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, time: f32) {
        self.ensure_pipeline(ctx);
        self.ensure_static_buffers(ctx);

        let Some(ubo) = self.uniform_ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&TimeUniform::new(time)));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(vbo) = self.plane_vbo.as_ref() else { return };
        let Some(ibo) = self.plane_ibo.as_ref() else { return };

        let (w, h) = target.size;
        let eyes = eye_viewports(w, h, self.stereo);

        let mut rpass = target.load_pass("prism shader pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint16);

        for [x, y, vw, vh] in eyes {
            rpass.set_viewport(x as f32, y as f32, vw as f32, vh as f32, 0.0, 1.0);
            rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = self.program.create_module(ctx.device);

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism shader bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism shader pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("prism shader pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[PlaneVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(super::FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: triangle_list(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let uniform_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism shader time ubo"),
            size: std::mem::size_of::<TimeUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism shader bind group"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_ubo.as_entire_binding(),
            }],
        });

        log::debug!("shader pipeline built for {:?}", ctx.surface_format);

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.uniform_ubo = Some(uniform_ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.plane_vbo.is_some() && self.plane_ibo.is_some() {
            return;
        }

        self.plane_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism plane vbo"),
            contents: bytemuck::cast_slice(&PLANE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.plane_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism plane ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

/// Per-eye viewports `[x, y, w, h]` in physical pixels.
///
/// Mono covers the whole target; stereo splits it into left/right halves, the
/// right eye taking the odd pixel column.
pub fn eye_viewports(width: u32, height: u32, stereo: bool) -> Vec<[u32; 4]> {
    let width = width.max(1);
    let height = height.max(1);
    if !stereo || width < 2 {
        return vec![[0, 0, width, height]];
    }
    let left = width / 2;
    vec![[0, 0, left, height], [left, 0, width - left, height]]
}

/// `time` padded to a 16-byte uniform block.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TimeUniform {
    time: f32,
    _pad: [f32; 3],
}

impl TimeUniform {
    fn new(time: f32) -> Self {
        Self { time, _pad: [0.0; 3] }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PlaneVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

impl PlaneVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2  // uv
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PlaneVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// 2×2 plane in clip space; `uv` origin bottom-left.
const PLANE_VERTICES: [PlaneVertex; 4] = [
    PlaneVertex { position: [-1.0, -1.0], uv: [0.0, 0.0] },
    PlaneVertex { position: [1.0, -1.0], uv: [1.0, 0.0] },
    PlaneVertex { position: [1.0, 1.0], uv: [1.0, 1.0] },
    PlaneVertex { position: [-1.0, 1.0], uv: [0.0, 1.0] },
];
