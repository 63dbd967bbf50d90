//! wgpu GPU backend implementation.
//!
//! Implements target allocation, the per-view clear pass, and the full
//! compositing pass as a fullscreen-triangle pipeline. Stage content draw
//! submission belongs to the hosting engine's render pipeline; this
//! backend owns the pass setup and the blend, not the scene shading.

use std::sync::{Arc, OnceLock};

use crate::camera::Camera;
use crate::compositing::CompositingParameters;
use crate::error::LookDevError;
use crate::layout::SplitKind;
use crate::scene::Scene;
use crate::targets::RenderTarget;
use crate::types::{TextureDescriptor, TextureFormat, TextureUsage};

use super::{CompositeFrame, GpuBackend, GpuTexture};

/// Uniform block for the compositing pass. Field layout matches
/// `compositing.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CompositingUniforms {
    params: [f32; 4],
    geometry: [f32; 4],
    split_plane: [f32; 4],
    split_plane_ortho: [f32; 4],
    gizmo_center: [f32; 4],
    first_view_color: [f32; 4],
    second_view_color: [f32; 4],
    tone_map_coeffs1: [f32; 4],
    tone_map_coeffs2: [f32; 4],
    screen_ratio: [f32; 4],
}

impl CompositingUniforms {
    fn from_params(params: &CompositingParameters) -> Self {
        let (coeffs1, coeffs2) = params.tone_map.coefficients();
        let kind = match params.kind {
            SplitKind::Plane => 0.0,
            SplitKind::Circle => 1.0,
        };
        Self {
            params: [
                params.blend_factor,
                params.exposures[0],
                params.exposures[1],
                if params.tone_map_enabled { 1.0 } else { -1.0 },
            ],
            geometry: [
                kind,
                params.circle_radius,
                params.thickness,
                params.gizmo_length,
            ],
            split_plane: params.split_plane.to_array(),
            split_plane_ortho: params.split_plane_ortho.to_array(),
            gizmo_center: [
                params.gizmo_center.x,
                params.gizmo_center.y,
                params.zone_center.x,
                params.zone_center.y,
            ],
            first_view_color: params.first_view_color.to_array(),
            second_view_color: params.second_view_color.to_array(),
            tone_map_coeffs1: coeffs1.to_array(),
            tone_map_coeffs2: coeffs2.to_array(),
            screen_ratio: [params.screen_ratio.x, params.screen_ratio.y, 0.0, 0.0],
        }
    }
}

struct CompositePipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    output_format: TextureFormat,
}

/// wgpu-based GPU backend.
pub struct WgpuBackend {
    #[allow(dead_code)]
    instance: wgpu::Instance,
    #[allow(dead_code)]
    adapter: wgpu::Adapter,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    composite_pipeline: OnceLock<CompositePipeline>,
}

impl std::fmt::Debug for WgpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuBackend")
            .field("adapter", &self.adapter.get_info().name)
            .finish()
    }
}

impl WgpuBackend {
    /// Create a new wgpu backend.
    pub fn new() -> Result<Self, LookDevError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            backend_options: wgpu::BackendOptions::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| {
            LookDevError::InitializationFailed(format!("No compatible GPU adapter: {e}"))
        })?;

        log::info!("wgpu adapter: {:?}", adapter.get_info());

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("LookDev Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| {
            LookDevError::InitializationFailed(format!("Device creation failed: {e}"))
        })?;

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
            composite_pipeline: OnceLock::new(),
        })
    }

    /// Get the wgpu device.
    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    /// Get the wgpu queue.
    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    fn submit_and_wait(&self, encoder: wgpu::CommandEncoder) {
        let index = self.queue.submit(std::iter::once(encoder.finish()));
        let _ = self.device.poll(wgpu::PollType::Wait {
            submission_index: Some(index),
            timeout: Some(std::time::Duration::from_secs(10)),
        });
    }

    fn composite_pipeline(&self, output_format: TextureFormat) -> &CompositePipeline {
        self.composite_pipeline.get_or_init(|| {
            let shader = self
                .device
                .create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some("lookdev_compositing"),
                    source: wgpu::ShaderSource::Wgsl(include_str!("compositing.wgsl").into()),
                });

            let bind_group_layout =
                self.device
                    .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: Some("lookdev_compositing_layout"),
                        entries: &[
                            wgpu::BindGroupLayoutEntry {
                                binding: 0,
                                visibility: wgpu::ShaderStages::FRAGMENT,
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
                                    sample_type: wgpu::TextureSampleType::Float {
                                        filterable: true,
                                    },
                                    view_dimension: wgpu::TextureViewDimension::D2,
                                    multisampled: false,
                                },
                                count: None,
                            },
                            wgpu::BindGroupLayoutEntry {
                                binding: 2,
                                visibility: wgpu::ShaderStages::FRAGMENT,
                                ty: wgpu::BindingType::Texture {
                                    sample_type: wgpu::TextureSampleType::Float {
                                        filterable: true,
                                    },
                                    view_dimension: wgpu::TextureViewDimension::D2,
                                    multisampled: false,
                                },
                                count: None,
                            },
                            wgpu::BindGroupLayoutEntry {
                                binding: 3,
                                visibility: wgpu::ShaderStages::FRAGMENT,
                                ty: wgpu::BindingType::Sampler(
                                    wgpu::SamplerBindingType::Filtering,
                                ),
                                count: None,
                            },
                        ],
                    });

            let pipeline_layout =
                self.device
                    .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                        label: Some("lookdev_compositing_pipeline_layout"),
                        bind_group_layouts: &[&bind_group_layout],
                        immediate_size: 0,
                    });

            let pipeline = self
                .device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("lookdev_compositing_pipeline"),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        buffers: &[],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: convert_texture_format(output_format),
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
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
                    multiview_mask: None,
                    cache: None,
                });

            let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("lookdev_compositing_sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..wgpu::SamplerDescriptor::default()
            });

            CompositePipeline {
                pipeline,
                bind_group_layout,
                sampler,
                output_format,
            }
        })
    }
}

impl GpuBackend for WgpuBackend {
    fn name(&self) -> &'static str {
        "wgpu Backend"
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<GpuTexture, LookDevError> {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: descriptor.label.as_deref(),
            size: wgpu::Extent3d {
                width: descriptor.size.width,
                height: descriptor.size.height,
                depth_or_array_layers: descriptor.size.depth,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: convert_texture_format(descriptor.format),
            usage: convert_texture_usage(descriptor.usage),
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(GpuTexture::Wgpu {
            texture: Arc::new(texture),
            view: Arc::new(view),
        })
    }

    fn render_camera(&self, scene: &Scene, camera: &Camera) -> Result<(), LookDevError> {
        let target = camera.render_target().ok_or_else(|| {
            LookDevError::Internal(format!(
                "camera for scene '{}' has no bound render target",
                scene.name()
            ))
        })?;
        let GpuTexture::Wgpu { view, .. } = target.gpu_handle() else {
            return Err(LookDevError::Internal(
                "render target was not created by the wgpu backend".into(),
            ));
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lookdev_view_encoder"),
            });

        let [r, g, b, a] = camera.clear_color();
        {
            // Clear to the stage background; scene content draws are
            // submitted by the hosting engine's pipeline.
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(scene.name()),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: view.as_ref(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.submit_and_wait(encoder);
        Ok(())
    }

    fn composite(
        &self,
        frame: &CompositeFrame<'_>,
        output: &RenderTarget,
    ) -> Result<(), LookDevError> {
        let GpuTexture::Wgpu { view: out_view, .. } = output.gpu_handle() else {
            return Err(LookDevError::Internal(
                "composite target was not created by the wgpu backend".into(),
            ));
        };
        let GpuTexture::Wgpu {
            view: first_view, ..
        } = frame.first.gpu_handle()
        else {
            return Err(LookDevError::Internal(
                "first view texture was not created by the wgpu backend".into(),
            ));
        };
        let GpuTexture::Wgpu {
            view: second_view, ..
        } = frame.second.gpu_handle()
        else {
            return Err(LookDevError::Internal(
                "second view texture was not created by the wgpu backend".into(),
            ));
        };

        let pipeline = self.composite_pipeline(output.format());
        if pipeline.output_format != output.format() {
            return Err(LookDevError::Internal(format!(
                "composite pipeline built for {:?}, output is {:?}",
                pipeline.output_format,
                output.format()
            )));
        }

        let uniforms = CompositingUniforms::from_params(frame.params);
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lookdev_compositing_uniforms"),
            size: std::mem::size_of::<CompositingUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue
            .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lookdev_compositing_bind_group"),
            layout: &pipeline.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(first_view.as_ref()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(second_view.as_ref()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&pipeline.sampler),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lookdev_compositing_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lookdev_compositing"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: out_view.as_ref(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&pipeline.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.submit_and_wait(encoder);
        Ok(())
    }
}

fn convert_texture_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        TextureFormat::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
        TextureFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
        TextureFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
        TextureFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
    }
}

fn convert_texture_usage(usage: TextureUsage) -> wgpu::TextureUsages {
    let mut result = wgpu::TextureUsages::empty();

    if usage.contains(TextureUsage::COPY_SRC) {
        result |= wgpu::TextureUsages::COPY_SRC;
    }
    if usage.contains(TextureUsage::COPY_DST) {
        result |= wgpu::TextureUsages::COPY_DST;
    }
    if usage.contains(TextureUsage::TEXTURE_BINDING) {
        result |= wgpu::TextureUsages::TEXTURE_BINDING;
    }
    if usage.contains(TextureUsage::RENDER_ATTACHMENT) {
        result |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }

    result
}
