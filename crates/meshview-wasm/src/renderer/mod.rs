//! Rendererモジュール
//!
//! wgpu による RenderBackend の実装。
//! シーンから受け取った描画命令をためておき、render() で1パスにまとめて送信する

mod depth;
mod gpu_context;
mod line_pipeline;

pub use gpu_context::GpuContext;
pub use line_pipeline::DrawUniform;

use std::collections::HashMap;
use std::ops::Range;

use glam::{Mat4, Vec3, Vec4};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;
use wgpu::util::DeviceExt;

use meshview_renderer::mesh::to_vertices;
use meshview_renderer::{palette, BufferHandle, LineVertex, Primitive, Projection, RenderBackend};

use line_pipeline::LinePipeline;

/// GPU上の点バッファ
struct PointBuffer {
    buffer: wgpu::Buffer,
    len: u32,
}

/// 1回分の描画命令
struct DrawCommand {
    handle: BufferHandle,
    primitive: Primitive,
    range: Range<u32>,
    slot: usize,
}

/// wgpu バックエンド
pub struct WgpuBackend {
    ctx: GpuContext,
    pipeline: LinePipeline,

    // Depth buffer
    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,

    projection: Projection,
    buffers: HashMap<BufferHandle, PointBuffer>,
    next_id: u32,

    // 現在のUniform状態
    view: Mat4,
    model: Mat4,
    color: Vec4,

    uniforms: Vec<DrawUniform>,
    commands: Vec<DrawCommand>,
}

impl WgpuBackend {
    /// 新しいバックエンドを作成（非同期）
    pub async fn create(
        canvas: HtmlCanvasElement,
        projection: Projection,
    ) -> Result<WgpuBackend, JsValue> {
        let ctx = GpuContext::new(canvas).await?;
        let pipeline = LinePipeline::new(&ctx);
        let (depth_texture, depth_view) =
            depth::create_texture(&ctx.device, ctx.width(), ctx.height());

        tracing::info!("Renderer initialized");

        Ok(Self {
            ctx,
            pipeline,
            depth_texture,
            depth_view,
            projection,
            buffers: HashMap::new(),
            next_id: 0,
            view: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            color: Vec4::ONE,
            uniforms: Vec::new(),
            commands: Vec::new(),
        })
    }

    fn create_buffer(&self, points: &[Vec3]) -> PointBuffer {
        let vertices: Vec<LineVertex> = if points.is_empty() {
            // 空のバッファは作れないのでダミーを1つ入れる
            vec![LineVertex::new(Vec3::ZERO)]
        } else {
            to_vertices(points)
        };
        let buffer = self
            .ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Point Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        PointBuffer {
            buffer,
            len: points.len() as u32,
        }
    }

    /// ためた描画命令を送信して画面に表示する
    pub fn render(&mut self) -> Result<(), JsValue> {
        let uniforms = std::mem::take(&mut self.uniforms);
        let commands = std::mem::take(&mut self.commands);
        self.pipeline.write_uniforms(&self.ctx, &uniforms);

        let output = self
            .ctx
            .surface
            .get_current_texture()
            .map_err(|e| JsValue::from_str(&format!("Failed to get surface texture: {:?}", e)))?;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let clear = palette::CLEAR.as_dvec4();
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.x,
                            g: clear.y,
                            b: clear.z,
                            a: clear.w,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let (x, y, side) = self.ctx.square_viewport();
            render_pass.set_viewport(x, y, side, side, 0.0, 1.0);

            for command in &commands {
                let Some(points) = self.buffers.get(&command.handle) else {
                    continue;
                };
                let end = command.range.end.min(points.len);
                if command.range.start >= end {
                    continue;
                }
                render_pass.set_pipeline(self.pipeline.pipeline(command.primitive));
                render_pass.set_bind_group(
                    0,
                    self.pipeline.bind_group(),
                    &[self.pipeline.offset(command.slot)],
                );
                render_pass.set_vertex_buffer(0, points.buffer.slice(..));
                render_pass.draw(command.range.start..end, 0..1);
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Canvas サイズ変更
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);

            // Depth Texture再作成
            let (depth_texture, depth_view) =
                depth::create_texture(&self.ctx.device, width, height);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;

            tracing::debug!(width, height, "Resized");
        }
    }

    pub fn width(&self) -> u32 {
        self.ctx.width()
    }

    pub fn height(&self) -> u32 {
        self.ctx.height()
    }
}

impl RenderBackend for WgpuBackend {
    fn upload(&mut self, points: &[Vec3]) -> BufferHandle {
        let handle = BufferHandle::from_u32(self.next_id);
        self.next_id += 1;
        let buffer = self.create_buffer(points);
        self.buffers.insert(handle, buffer);
        handle
    }

    fn reupload(&mut self, handle: BufferHandle, points: &[Vec3]) {
        match self.buffers.get(&handle) {
            Some(existing) if existing.len as usize == points.len() && !points.is_empty() => {
                let vertices = to_vertices(points);
                self.ctx
                    .queue
                    .write_buffer(&existing.buffer, 0, bytemuck::cast_slice(&vertices));
            }
            Some(_) => {
                let buffer = self.create_buffer(points);
                if let Some(old) = self.buffers.insert(handle, buffer) {
                    old.buffer.destroy();
                }
            }
            None => tracing::warn!(handle = handle.to_u32(), "Reupload of unknown buffer"),
        }
    }

    fn release(&mut self, handle: BufferHandle) {
        if let Some(old) = self.buffers.remove(&handle) {
            old.buffer.destroy();
        }
    }

    fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    fn set_model(&mut self, model: Mat4) {
        self.model = model;
    }

    fn set_color(&mut self, color: Vec4) {
        self.color = color;
    }

    fn draw(&mut self, handle: BufferHandle, primitive: Primitive, range: Range<u32>) {
        let view_proj = self.projection.matrix() * self.view;
        self.uniforms
            .push(DrawUniform::new(view_proj, self.model, self.color));
        self.commands.push(DrawCommand {
            handle,
            primitive,
            range,
            slot: self.uniforms.len() - 1,
        });
    }
}
