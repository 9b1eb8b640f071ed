use crate::effect::{RenderError, RibbonDraw, RibbonRenderer};
use crate::geometry::RibbonVertex;
use crate::shader::{RibbonUniforms, RIBBON_WGSL};

/// Options for the drawing context, set once at creation.
#[derive(Clone, Copy, Debug)]
pub struct ContextOptions {
    pub dpr: f32,
    /// Composite over the host with a transparent background.
    pub alpha: bool,
    pub antialias: bool,
}

struct RibbonMesh {
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_count: usize,
}

// ===================== WebGPU ribbon renderer =====================

pub struct GpuRenderer<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sample_count: u32,
    msaa_view: Option<wgpu::TextureView>,
    index_buffer: Option<(wgpu::Buffer, u32)>,
    meshes: Vec<RibbonMesh>,
    max_dimension: u32,
    width: u32,
    height: u32,
}

impl<'a> GpuRenderer<'a> {
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'a>,
        width: u32,
        height: u32,
        options: ContextOptions,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("ribbons_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let caps = surface.get_capabilities(&adapter);
        let format = *caps
            .formats
            .iter()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm
                )
            })
            .or_else(|| caps.formats.first())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = pick_alpha_mode(&caps.alpha_modes, options.alpha);
        let max_dimension = device.limits().max_texture_dimension_2d;
        let (width, height) = fit_to_max_dimension(width, height, max_dimension);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = if options.antialias
            && adapter
                .get_texture_format_features(format)
                .flags
                .sample_count_supported(4)
        {
            4
        } else {
            1
        };
        log::info!(
            "[gpu] {:?} {}x{} dpr={} alpha={:?} msaa={}",
            format,
            config.width,
            config.height,
            options.dpr,
            alpha_mode,
            sample_count
        );

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ribbon_bgl"),
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
        let pipeline = create_ribbon_pipeline(&device, &bind_group_layout, format, sample_count);
        let msaa_view = (sample_count > 1).then(|| {
            create_msaa_view(&device, format, config.width, config.height, sample_count)
        });

        Ok(Self {
            surface,
            device,
            queue,
            width: config.width,
            height: config.height,
            config,
            pipeline,
            bind_group_layout,
            sample_count,
            msaa_view,
            index_buffer: None,
            meshes: Vec::new(),
            max_dimension,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        if self.sample_count > 1 {
            self.msaa_view = Some(create_msaa_view(
                &self.device,
                self.config.format,
                self.width,
                self.height,
                self.sample_count,
            ));
        }
    }

    /// One mesh per ribbon; rebuilt only when the ribbon set changes shape.
    fn sync_meshes(&mut self, draws: &[RibbonDraw<'_>]) {
        let matches = self.meshes.len() == draws.len()
            && self
                .meshes
                .iter()
                .zip(draws)
                .all(|(m, d)| m.vertex_count == d.geometry.vertex_count());
        if matches {
            return;
        }
        self.meshes = draws
            .iter()
            .enumerate()
            .map(|(i, d)| self.create_mesh(i, d.geometry.vertex_count()))
            .collect();
        self.index_buffer = draws.first().map(|d| {
            let indices = d.geometry.indices();
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("ribbon_indices"),
                size: std::mem::size_of_val(indices) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.queue
                .write_buffer(&buffer, 0, bytemuck::cast_slice(indices));
            (buffer, indices.len() as u32)
        });
        log::info!("[gpu] allocated {} ribbon meshes", self.meshes.len());
    }

    fn create_mesh(&self, index: usize, vertex_count: usize) -> RibbonMesh {
        let vertex_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("ribbon_vb_{index}")),
            size: (std::mem::size_of::<RibbonVertex>() * vertex_count) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("ribbon_uniforms_{index}")),
            size: std::mem::size_of::<RibbonUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("ribbon_bg_{index}")),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        RibbonMesh {
            vertex_buffer,
            uniform_buffer,
            bind_group,
            vertex_count,
        }
    }
}

impl<'a> RibbonRenderer for GpuRenderer<'a> {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (width, height) = fit_to_max_dimension(width, height, self.max_dimension);
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.reconfigure();
        }
    }

    fn render(&mut self, draws: &[RibbonDraw<'_>], clear: [f32; 4]) -> Result<(), RenderError> {
        let frame = match self.surface.get_current_texture() {
            Ok(f) => f,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure();
                return Err(RenderError::SurfaceLost);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Skipped(format!("{e:?}"))),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.sync_meshes(draws);
        for (mesh, draw) in self.meshes.iter().zip(draws) {
            self.queue.write_buffer(
                &mesh.vertex_buffer,
                0,
                bytemuck::cast_slice(draw.geometry.vertices()),
            );
            self.queue
                .write_buffer(&mesh.uniform_buffer, 0, bytemuck::bytes_of(&draw.uniforms));
        }

        let (target, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&view)),
            None => (&view, None),
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("ribbons_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ribbons_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(clear)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some((index_buffer, index_count)) = &self.index_buffer {
                rpass.set_pipeline(&self.pipeline);
                rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                for mesh in &self.meshes {
                    rpass.set_bind_group(0, &mesh.bind_group, &[]);
                    rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    rpass.draw_indexed(0..*index_count, 0, 0..1);
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Scale `width`x`height` uniformly so neither side exceeds `max`, keeping
/// both at least 1.
pub fn fit_to_max_dimension(width: u32, height: u32, max: u32) -> (u32, u32) {
    let (w, h, max) = (width.max(1), height.max(1), max.max(1));
    let longest = w.max(h);
    if longest <= max {
        return (w, h);
    }
    let fit = |v: u32| ((v as u64 * max as u64 / longest as u64) as u32).clamp(1, max);
    (fit(w), fit(h))
}

/// Straight-alpha RGBA to a premultiplied clear color.
fn clear_color(rgba: [f32; 4]) -> wgpu::Color {
    let a = rgba[3].clamp(0.0, 1.0) as f64;
    wgpu::Color {
        r: rgba[0] as f64 * a,
        g: rgba[1] as f64 * a,
        b: rgba[2] as f64 * a,
        a,
    }
}

fn pick_alpha_mode(modes: &[wgpu::CompositeAlphaMode], transparent: bool) -> wgpu::CompositeAlphaMode {
    let wanted: &[wgpu::CompositeAlphaMode] = if transparent {
        &[
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
            wgpu::CompositeAlphaMode::Inherit,
        ]
    } else {
        &[wgpu::CompositeAlphaMode::Opaque]
    };
    wanted
        .iter()
        .copied()
        .find(|m| modes.contains(m))
        .or_else(|| modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

fn create_msaa_view(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    sample_count: u32,
) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("ribbons_msaa"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_ribbon_pipeline(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("ribbon_shader"),
        source: wgpu::ShaderSource::Wgsl(RIBBON_WGSL.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("ribbon_pl"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("ribbon_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[RibbonVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: sample_count,
            ..Default::default()
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}
