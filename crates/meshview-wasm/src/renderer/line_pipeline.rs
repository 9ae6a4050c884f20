//! 描画パイプラインモジュール
//!
//! 線・点・三角形の3つのパイプラインと、描画ごとのUniformを動的オフセットで切り替えるバッファ

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use meshview_renderer::{LineVertex, Primitive};

use super::depth::DEPTH_FORMAT;
use super::gpu_context::GpuContext;
use crate::shaders;

/// 1描画分のUniform
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniform {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl DrawUniform {
    pub fn new(view_proj: Mat4, model: Mat4, color: Vec4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            color: color.to_array(),
        }
    }
}

const UNIFORM_SIZE: u64 = std::mem::size_of::<DrawUniform>() as u64;

/// 初期のUniformスロット数
const INITIAL_SLOTS: usize = 64;

/// 描画パイプライン
pub struct LinePipeline {
    lines: wgpu::RenderPipeline,
    points: wgpu::RenderPipeline,
    triangles: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// スロット数
    capacity: usize,
    /// スロット間隔（オフセットのアラインメントに合わせる）
    stride: u64,
}

impl LinePipeline {
    /// 新しいパイプラインを作成
    pub fn new(ctx: &GpuContext) -> Self {
        let alignment = u64::from(ctx.device.limits().min_uniform_buffer_offset_alignment);
        let stride = UNIFORM_SIZE.div_ceil(alignment) * alignment;

        let bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Draw Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(UNIFORM_SIZE),
                    },
                    count: None,
                }],
            });

        let (uniform_buffer, bind_group) =
            create_uniform_slots(ctx, &bind_group_layout, stride, INITIAL_SLOTS);

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });

        let pipeline_layout =
            ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Line Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let create = |label, topology| {
            create_pipeline(ctx, &pipeline_layout, &shader, label, topology)
        };

        Self {
            lines: create("Line Pipeline", wgpu::PrimitiveTopology::LineList),
            points: create("Point Pipeline", wgpu::PrimitiveTopology::PointList),
            triangles: create("Triangle Pipeline", wgpu::PrimitiveTopology::TriangleList),
            bind_group_layout,
            uniform_buffer,
            bind_group,
            capacity: INITIAL_SLOTS,
            stride,
        }
    }

    pub fn pipeline(&self, primitive: Primitive) -> &wgpu::RenderPipeline {
        match primitive {
            Primitive::Lines => &self.lines,
            Primitive::Points => &self.points,
            Primitive::Triangles => &self.triangles,
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// スロット番号から動的オフセットを計算
    pub fn offset(&self, slot: usize) -> u32 {
        (slot as u64 * self.stride) as u32
    }

    /// 今フレームのUniformをまとめて書き込む（足りなければバッファを作り直す）
    pub fn write_uniforms(&mut self, ctx: &GpuContext, uniforms: &[DrawUniform]) {
        if uniforms.is_empty() {
            return;
        }
        if uniforms.len() > self.capacity {
            let capacity = uniforms.len().next_power_of_two();
            let (buffer, bind_group) =
                create_uniform_slots(ctx, &self.bind_group_layout, self.stride, capacity);
            self.uniform_buffer.destroy();
            self.uniform_buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
            tracing::debug!(capacity, "Uniform buffer grown");
        }

        let stride = self.stride as usize;
        let mut staging = vec![0u8; uniforms.len() * stride];
        for (slot, uniform) in staging.chunks_exact_mut(stride).zip(uniforms) {
            slot[..UNIFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(uniform));
        }
        ctx.queue.write_buffer(&self.uniform_buffer, 0, &staging);
    }
}

fn create_uniform_slots(
    ctx: &GpuContext,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Draw Uniform Buffer"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Draw Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(UNIFORM_SIZE),
            }),
        }],
    });

    (buffer, bind_group)
}

fn create_pipeline(
    ctx: &GpuContext,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    label: &str,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[LineVertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.config.format,
                // 非アクティブなメッシュとグリッドは半透明
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None, // 両面描画
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
