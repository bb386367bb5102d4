//! Offscreen color target at the capped render size, stretched onto the
//! full-size surface with one linear-filtered fullscreen triangle.

use crate::surface::RenderSize;

/// WGSL for the upscale blit.
pub const UPSCALE_SHADER_SOURCE: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0) var source_tex: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;

@vertex
fn vs_fullscreen(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs_upscale(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(source_tex, source_sampler, in.uv);
}
"#;

/// The texture the points pass renders into, plus the pipeline that copies
/// it to the swapchain.
pub struct UpscaleTarget {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    format: wgpu::TextureFormat,
    size: RenderSize,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

impl UpscaleTarget {
    /// Creates the target at `size` in the surface's `format`, so blending
    /// and sRGB encoding behave as if drawing to the surface directly.
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: RenderSize) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("upscale-shader"),
            source: wgpu::ShaderSource::Wgsl(UPSCALE_SHADER_SOURCE.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("upscale-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("upscale-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("upscale-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_fullscreen"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_upscale"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("upscale-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let (texture, view, bind_group) =
            create_color_target(device, &bind_group_layout, &sampler, format, size);

        Self {
            pipeline,
            bind_group_layout,
            sampler,
            format,
            size,
            texture,
            view,
            bind_group,
        }
    }

    /// View the points pass draws into.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> RenderSize {
        self.size
    }

    /// Recreates the color target at a new render size. Same size is a no-op.
    pub fn resize(&mut self, device: &wgpu::Device, size: RenderSize) {
        if size == self.size {
            return;
        }
        let (texture, view, bind_group) = create_color_target(
            device,
            &self.bind_group_layout,
            &self.sampler,
            self.format,
            size,
        );
        self.texture.destroy();
        self.texture = texture;
        self.view = view;
        self.bind_group = bind_group;
        self.size = size;
        log::debug!("Offscreen target resized to {}x{}", size.width, size.height);
    }

    /// Stretches the target over all of `surface_view`.
    pub fn blit(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("upscale-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

fn create_color_target(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    format: wgpu::TextureFormat,
    size: RenderSize,
) -> (wgpu::Texture, wgpu::TextureView, wgpu::BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("galaxy-color-target"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("upscale-bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    (texture, view, bind_group)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .ok()?;
            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    #[test]
    fn test_shader_entry_points() {
        assert!(UPSCALE_SHADER_SOURCE.contains("fn vs_fullscreen"));
        assert!(UPSCALE_SHADER_SOURCE.contains("fn fs_upscale"));
    }

    #[test]
    fn test_target_follows_render_size() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let render = RenderSize {
            width: 2560,
            height: 1440,
        };
        let mut target = UpscaleTarget::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb, render);
        assert_eq!(target.size(), render);
        assert_eq!(target.texture.width(), 2560);
        assert_eq!(target.texture.height(), 1440);

        let smaller = RenderSize {
            width: 1280,
            height: 720,
        };
        target.resize(&device, smaller);
        assert_eq!(target.size(), smaller);
        assert_eq!(target.texture.width(), 1280);
        assert_eq!(target.texture.format(), wgpu::TextureFormat::Rgba8UnormSrgb);
    }

    #[test]
    fn test_blit_to_larger_surface_texture() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let target = UpscaleTarget::new(
            &device,
            format,
            RenderSize {
                width: 64,
                height: 36,
            },
        );
        let surface_stand_in = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("surface-stand-in"),
            size: wgpu::Extent3d {
                width: 96,
                height: 54,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = surface_stand_in.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("upscale-test"),
        });
        target.blit(&mut encoder, &view);
        queue.submit([encoder.finish()]);
    }
}
