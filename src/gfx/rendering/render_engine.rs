//! wgpu forward renderer.
//!
//! One pipeline, one pass. Each frame the scene graph is drained into a
//! draw list, the list is written into a growable pool of per-draw uniform
//! bind groups, and the pass replays the list in order. The painter's-order
//! scene needs nothing fancier: there is no transparency, no instancing
//! and no shadow machinery.

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::gfx::camera::Camera;
use crate::gfx::resources::{Material, RenderContext, TextureResource};
use crate::gfx::scene::{DrawCall, Vertex3D};
use crate::wgpu_utils::UniformBuffer;
use crate::world::World;

use super::uniforms::{DrawUniform, FrameUniform};

/// Sky color behind everything.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.420,
    g: 0.824,
    b: 1.0,
    a: 1.0,
};

struct DrawBinding {
    ubo: UniformBuffer<DrawUniform>,
    bind_group: wgpu::BindGroup,
}

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,

    pipeline: wgpu::RenderPipeline,
    frame_ubo: UniformBuffer<FrameUniform>,
    frame_bind_group: wgpu::BindGroup,

    draw_layout: wgpu::BindGroupLayout,
    draw_pool: Vec<DrawBinding>,

    normal_map_layout: wgpu::BindGroupLayout,
    flat_normal_map: wgpu::BindGroup,
    _flat_normal_texture: TextureResource,

    draw_list: Vec<DrawCall>,
}

impl RenderEngine {
    /// Brings up the GPU for the given window.
    ///
    /// Fails with [`Error::Resource`] when no adapter or device is
    /// available; there is no software fallback worth rendering with.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| Error::resource(format!("failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::resource(format!("no compatible GPU adapter: {e}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Raceline Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| Error::resource(format!("failed to acquire GPU device: {e}")))?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = TextureResource::create_depth_texture(&device, &config, "depth_texture");

        // Group 0: per-frame camera and lighting.
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let frame_ubo = UniformBuffer::<FrameUniform>::new(&device);
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_ubo.binding_resource(),
            }],
        });

        // Group 1: per-draw transform and material.
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        // Group 2: the normal map (a mesh's own, or the flat fallback).
        let normal_map_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Normal Map Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // A single straight-up texel stands in for meshes without a map.
        let flat_normal_texture = TextureResource::create_from_rgba(
            &device,
            &queue,
            &[128, 128, 255, 255],
            1,
            1,
            "Flat Normal Map",
        );
        let flat_normal_map = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Flat Normal Map Bind Group"),
            layout: &normal_map_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&flat_normal_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&flat_normal_texture.sampler),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene_shader.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout, &normal_map_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[Vertex3D::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: TextureResource::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            pipeline,
            frame_ubo,
            frame_bind_group,
            draw_layout,
            draw_pool: Vec::new(),
            normal_map_layout,
            flat_normal_map,
            _flat_normal_texture: flat_normal_texture,
            draw_list: Vec::new(),
        })
    }

    /// The context handle mesh initialization needs.
    pub fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            device: &self.device,
            queue: &self.queue,
            normal_map_layout: &self.normal_map_layout,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Uploads the per-frame camera and lighting state.
    pub fn update_frame(&mut self, camera: &Camera, world: &World) {
        self.frame_ubo
            .update_content(&self.queue, FrameUniform::new(camera, world));
    }

    /// Drains the world into a draw list and replays it in one pass.
    pub fn render_frame(&mut self, world: &World) -> Result<()> {
        let mut draw_list = std::mem::take(&mut self.draw_list);
        draw_list.clear();
        {
            let ctx = self.render_context();
            world.render(&ctx, &mut draw_list);
        }
        self.draw_list = draw_list;

        self.ensure_pool(self.draw_list.len());

        // A node without a material inherits whatever was bound before it,
        // exactly like sequential uniform state in the original pipeline.
        let mut current_material = Rc::new(Material::default());
        for (i, call) in self.draw_list.iter().enumerate() {
            if let Some(material) = &call.material {
                current_material = Rc::clone(material);
            }
            let uniform = DrawUniform::new(call.transform, &current_material, call.normal_map);
            self.draw_pool[i].ubo.update_content(&self.queue, uniform);
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(Error::resource(format!("surface unavailable: {e}"))),
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (i, call) in self.draw_list.iter().enumerate() {
                pass.set_bind_group(1, &self.draw_pool[i].bind_group, &[]);
                call.mesh.draw(&mut pass, &self.flat_normal_map)?;
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Grows the per-draw bind-group pool to at least `len` slots.
    fn ensure_pool(&mut self, len: usize) {
        while self.draw_pool.len() < len {
            let ubo = UniformBuffer::<DrawUniform>::new(&self.device);
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Draw Bind Group"),
                layout: &self.draw_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.binding_resource(),
                }],
            });
            self.draw_pool.push(DrawBinding { ubo, bind_group });
        }
    }
}
