//! Additive, size-attenuated point sprites for the particle cloud.
//!
//! Each particle is one instance of a six-vertex quad. The vertex shader
//! places the quad's center with the usual view-projection and then offsets
//! the corners in screen space, so every point is a square whose side in
//! pixels is `size * viewport_height / 2 / depth`. Fragments are added onto
//! the target without depth testing, which makes dense arm regions glow.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use galaxy_generator::ParticleBuffers;
use galaxy_scene::{ParticleBackend, PointMaterial};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::camera::Camera;

/// Vertices per point quad.
const QUAD_VERTICES: u32 = 6;

/// Camera and sizing data shared by every point.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PointsUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Render target size in pixels.
    pub viewport: [f32; 2],
    /// World-space point size.
    pub point_size: f32,
    pub _pad: f32,
}

impl PointsUniform {
    pub fn new(camera: &Camera, viewport_width: u32, viewport_height: u32, point_size: f32) -> Self {
        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            proj: camera.projection_matrix().to_cols_array_2d(),
            viewport: [viewport_width.max(1) as f32, viewport_height.max(1) as f32],
            point_size,
            _pad: 0.0,
        }
    }
}

impl Default for PointsUniform {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            proj: Mat4::IDENTITY.to_cols_array_2d(),
            viewport: [1.0, 1.0],
            point_size: 0.0,
            _pad: 0.0,
        }
    }
}

/// Per-instance vertex data: position then linear color.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ParticleInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Interleaves the generator's position and color arrays.
pub fn instances_from_buffers(buffers: &ParticleBuffers) -> Vec<ParticleInstance> {
    buffers
        .positions
        .chunks_exact(3)
        .zip(buffers.colors.chunks_exact(3))
        .map(|(p, c)| ParticleInstance {
            position: [p[0], p[1], p[2]],
            color: [c[0], c[1], c[2]],
        })
        .collect()
}

/// One uploaded galaxy.
#[derive(Debug)]
pub struct GpuParticles {
    /// `None` for an empty galaxy; wgpu buffers cannot be created empty
    /// through `create_buffer_init`.
    instances: Option<wgpu::Buffer>,
    count: u32,
    material: PointMaterial,
}

impl GpuParticles {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn material(&self) -> PointMaterial {
        self.material
    }
}

/// Uploads galaxies into GPU memory and destroys them on release.
pub struct GpuParticleBackend<'a> {
    device: &'a wgpu::Device,
}

impl<'a> GpuParticleBackend<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }
}

impl ParticleBackend for GpuParticleBackend<'_> {
    type Handle = GpuParticles;

    fn upload(&mut self, buffers: &ParticleBuffers, material: PointMaterial) -> GpuParticles {
        let instances = instances_from_buffers(buffers);
        let count = instances.len() as u32;
        let buffer = (!instances.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("galaxy-particles"),
                    contents: bytemuck::cast_slice(&instances),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });
        log::debug!(
            "Uploaded {count} particles ({} bytes)",
            instances.len() * std::mem::size_of::<ParticleInstance>()
        );

        GpuParticles {
            instances: buffer,
            count,
            material,
        }
    }

    fn release(&mut self, handle: GpuParticles) {
        if let Some(buffer) = handle.instances {
            buffer.destroy();
        }
        log::debug!("Released {} particles", handle.count);
    }
}

/// Render pipeline plus the camera uniform it reads.
pub struct PointsPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl PointsPipeline {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points-shader"),
            source: wgpu::ShaderSource::Wgsl(POINTS_SHADER_SOURCE.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("points-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<PointsUniform>() as u64),
                },
                count: None,
            }],
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("points-uniform"),
            contents: bytemuck::bytes_of(&PointsUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("points-bind-group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("points-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let additive = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("points-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[ParticleInstance::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState {
                        color: additive,
                        alpha: additive,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    /// Uploads this frame's camera data.
    pub fn write_uniform(&self, queue: &wgpu::Queue, uniform: &PointsUniform) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniform));
    }

    /// Records the draw for `particles`. Empty galaxies record nothing.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, particles: &'a GpuParticles) {
        let Some(instances) = particles.instances.as_ref() else {
            return;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, instances.slice(..));
        pass.draw(0..QUAD_VERTICES, 0..particles.count);
    }
}

/// WGSL for the point sprites.
pub const POINTS_SHADER_SOURCE: &str = r#"
struct PointsUniform {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    viewport: vec2<f32>,
    point_size: f32,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> points: PointsUniform;

struct InstanceInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, instance: InstanceInput) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, -0.5),
        vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, 0.5),
    );

    let view_position = points.view * vec4<f32>(instance.position, 1.0);
    let clip = points.proj * view_position;

    let depth = max(-view_position.z, 0.0001);
    let size_px = max(points.point_size * points.viewport.y * 0.5 / depth, 1.0);
    let offset_ndc = corners[vertex_index] * size_px * 2.0 / points.viewport;

    var out: VertexOutput;
    out.clip_position = vec4<f32>(clip.xy + offset_ndc * clip.w, clip.z, clip.w);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_generator::{GalaxyParameters, generate};
    use galaxy_scene::GalaxyScene;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

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
    fn test_uniform_matches_wgsl_layout() {
        // Two mat4x4 (128) + vec2 (8) + f32 + f32.
        assert_eq!(std::mem::size_of::<PointsUniform>(), 144);
        assert!(POINTS_SHADER_SOURCE.contains("viewport: vec2<f32>"));
    }

    #[test]
    fn test_instance_layout() {
        let layout = ParticleInstance::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    fn test_shader_entry_points() {
        assert!(POINTS_SHADER_SOURCE.contains("fn vs_main"));
        assert!(POINTS_SHADER_SOURCE.contains("fn fs_main"));
    }

    #[test]
    fn test_instances_interleave_buffers() {
        let buffers = ParticleBuffers {
            positions: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            colors: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
        };
        let instances = instances_from_buffers(&buffers);
        assert_eq!(
            instances,
            vec![
                ParticleInstance {
                    position: [1.0, 2.0, 3.0],
                    color: [0.1, 0.2, 0.3],
                },
                ParticleInstance {
                    position: [4.0, 5.0, 6.0],
                    color: [0.4, 0.5, 0.6],
                },
            ]
        );
    }

    #[test]
    fn test_uniform_from_camera() {
        let camera = Camera::default();
        let uniform = PointsUniform::new(&camera, 0, 720, 0.01);
        assert_eq!(uniform.viewport, [1.0, 720.0]);
        assert_eq!(uniform.point_size, 0.01);
        assert_eq!(uniform.proj, camera.projection_matrix().to_cols_array_2d());
    }

    #[test]
    fn test_pipeline_creation_succeeds() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let _pipeline = PointsPipeline::new(&device, wgpu::TextureFormat::Bgra8UnormSrgb);
    }

    #[test]
    fn test_gpu_backend_swaps_galaxies() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut backend = GpuParticleBackend::new(&device);
        let mut scene = GalaxyScene::new();
        let params = GalaxyParameters {
            particle_count: 1_000,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        scene.regenerate(&mut backend, &params, &mut rng);
        let handle = scene.regenerate(&mut backend, &params, &mut rng);
        assert_eq!(handle.count(), 1_000);
        assert_eq!(handle.material().size, params.size);

        scene.dispose(&mut backend);
        assert!(!scene.is_attached());
    }

    #[test]
    fn test_empty_galaxy_has_no_buffer() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut backend = GpuParticleBackend::new(&device);
        let params = GalaxyParameters {
            particle_count: 0,
            ..Default::default()
        };
        let buffers = generate(&params, &mut ChaCha8Rng::seed_from_u64(1));
        let handle = backend.upload(&buffers, PointMaterial::from_params(&params));
        assert_eq!(handle.count(), 0);
        assert!(handle.instances.is_none());
        backend.release(handle);
    }
}
