//! wgpu implementation of `RenderBackend` drawing into a `HeadlessContext`
//!
//! Bind groups:
//! - group 0: frame uniforms, screen capture texture and sampler
//! - group 1: the effect's read-only instance storage buffer
//!
//! Every pipeline shares one layout; blend state is the only per-effect
//! pipeline difference.

use crate::backend::{BlendMode, BufferId, FrameUniforms, RenderBackend, ShaderDesc, ShaderId};
use crate::error::RenderError;
use crate::headless::HeadlessContext;
use tracing::debug;

struct InstanceBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    size: u64,
}

struct QueuedDraw {
    shader: ShaderId,
    buffer: BufferId,
    vertices: u32,
    instances: u32,
}

pub struct WgpuBackend {
    ctx: HeadlessContext,
    frame_layout: wgpu::BindGroupLayout,
    instance_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    frame_bind_group: wgpu::BindGroup,
    buffers: Vec<InstanceBuffer>,
    pipelines: Vec<wgpu::RenderPipeline>,
    draws: Vec<QueuedDraw>,
    has_capture: bool,
}

impl WgpuBackend {
    pub async fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let ctx = HeadlessContext::new(width, height).await?;
        Ok(Self::from_context(ctx))
    }

    pub fn from_context(ctx: HeadlessContext) -> Self {
        let device = &ctx.device;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            label: Some("overlay frame bind group layout"),
        });

        let instance_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("overlay instance bind group layout"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("overlay pipeline layout"),
            bind_group_layouts: &[&frame_layout, &instance_layout],
            push_constant_ranges: &[],
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("overlay frame uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("overlay capture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // 1x1 transparent capture until the caller supplies one
        let capture_view = upload_capture(&ctx, &[0, 0, 0, 0], 1, 1);
        let frame_bind_group =
            frame_bind_group(device, &frame_layout, &uniform_buffer, &capture_view, &sampler);

        Self {
            ctx,
            frame_layout,
            instance_layout,
            pipeline_layout,
            uniform_buffer,
            sampler,
            frame_bind_group,
            buffers: Vec::new(),
            pipelines: Vec::new(),
            draws: Vec::new(),
            has_capture: false,
        }
    }

    pub fn context(&self) -> &HeadlessContext {
        &self.ctx
    }

    pub fn has_capture(&self) -> bool {
        self.has_capture
    }

    /// Pixels of the last submitted frame, tightly packed RGBA
    pub async fn read_pixels(&self) -> Result<Vec<u8>, RenderError> {
        self.ctx.read_pixels().await
    }
}

fn upload_capture(ctx: &HeadlessContext, rgba: &[u8], width: u32, height: u32) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("overlay screen capture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    ctx.queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn frame_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniforms: &wgpu::Buffer,
    capture: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(capture),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some("overlay frame bind group"),
    })
}

fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
    }
}

impl RenderBackend for WgpuBackend {
    fn create_instance_buffer(&mut self, label: &str, size: u64) -> Result<BufferId, RenderError> {
        let device = &self.ctx.device;
        if size == 0 || size > device.limits().max_storage_buffer_binding_size as u64 {
            return Err(RenderError::BufferAllocation {
                label: label.to_string(),
                message: format!("size {size} outside storage binding limits"),
            });
        }

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::BufferAllocation {
                label: label.to_string(),
                message: err.to_string(),
            });
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.instance_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(label),
        });

        debug!(label, size, "instance buffer created");
        self.buffers.push(InstanceBuffer {
            buffer,
            bind_group,
            size,
        });
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn update_buffer(&mut self, buffer: BufferId, bytes: &[u8]) -> Result<(), RenderError> {
        let target = self.buffers.get(buffer.0).ok_or(RenderError::InvalidHandle {
            kind: "buffer",
            index: buffer.0,
        })?;
        if bytes.len() as u64 > target.size {
            return Err(RenderError::UploadTooLarge {
                len: bytes.len(),
                capacity: target.size,
            });
        }
        if !bytes.is_empty() {
            self.ctx.queue.write_buffer(&target.buffer, 0, bytes);
        }
        Ok(())
    }

    fn compile_shader(&mut self, desc: &ShaderDesc<'_>) -> Result<ShaderId, RenderError> {
        let device = &self.ctx.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.source.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(desc.vertex_entry),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(desc.fragment_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.ctx.format,
                    blend: Some(blend_state(desc.blend)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ShaderCompilation {
                label: desc.label.to_string(),
                message: err.to_string(),
            });
        }

        debug!(label = desc.label, blend = ?desc.blend, "pipeline compiled");
        self.pipelines.push(pipeline);
        Ok(ShaderId(self.pipelines.len() - 1))
    }

    fn set_screen_capture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected || expected == 0 {
            return Err(RenderError::CaptureSize {
                expected,
                actual: rgba.len(),
            });
        }
        let view = upload_capture(&self.ctx, rgba, width, height);
        self.frame_bind_group = frame_bind_group(
            &self.ctx.device,
            &self.frame_layout,
            &self.uniform_buffer,
            &view,
            &self.sampler,
        );
        self.has_capture = true;
        Ok(())
    }

    fn begin_frame(&mut self, mut uniforms: FrameUniforms) -> Result<(), RenderError> {
        uniforms.has_capture = if self.has_capture { 1.0 } else { 0.0 };
        self.ctx
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.draws.clear();
        Ok(())
    }

    fn draw_instanced(
        &mut self,
        shader: ShaderId,
        buffer: BufferId,
        vertices: u32,
        instances: u32,
    ) -> Result<(), RenderError> {
        if shader.0 >= self.pipelines.len() {
            return Err(RenderError::InvalidHandle {
                kind: "shader",
                index: shader.0,
            });
        }
        if buffer.0 >= self.buffers.len() {
            return Err(RenderError::InvalidHandle {
                kind: "buffer",
                index: buffer.0,
            });
        }
        self.draws.push(QueuedDraw {
            shader,
            buffer,
            vertices,
            instances,
        });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("overlay frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("overlay pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.ctx.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for draw in &self.draws {
                pass.set_pipeline(&self.pipelines[draw.shader.0]);
                pass.set_bind_group(1, &self.buffers[draw.buffer.0].bind_group, &[]);
                pass.draw(0..draw.vertices, 0..draw.instances);
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        self.draws.clear();
        Ok(())
    }
}
