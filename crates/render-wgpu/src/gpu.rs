use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use orbitscene_render::PerspectiveCamera;
use orbitscene_scene::{Geometry, GeometryHandle, Material, MeshData, NodeKind, Scene, Topology};
use std::collections::HashMap;
use wgpu::util::DeviceExt;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Samples per pixel for the scene pass; resolved into the swapchain image.
pub(crate) const SAMPLE_COUNT: u32 = 4;
const MAX_LIGHTS: usize = 4;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LightUniform {
    direction: [f32; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    ambient: [f32; 4],
    light_count: [u32; 4],
    lights: [LightUniform; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    color: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    specular: [f32; 4],
}

/// Interleave tessellated data into GPU vertices.
///
/// Vertex colours are kept only when `vertex_colors` is set; otherwise, and
/// for vertices without one, the colour is white so the material colour
/// applies unchanged.
pub(crate) fn interleave(mesh: &MeshData, vertex_colors: bool) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, p)| Vertex {
            position: p.to_array(),
            normal: mesh.normals.get(i).copied().unwrap_or(Vec3::ZERO).to_array(),
            color: mesh
                .colors
                .get(i)
                .filter(|_| vertex_colors)
                .map(|c| c.to_array())
                .unwrap_or([1.0; 3]),
        })
        .collect()
}

fn instance_for(world: Mat4, material: &Material) -> InstanceData {
    let cols = world.to_cols_array_2d();
    let color = material.color().to_array();
    let specular = match material {
        Material::Phong {
            specular,
            shininess,
            ..
        } => [specular.r, specular.g, specular.b, *shininess],
        Material::LineBasic { .. } => [0.0; 4],
    };
    InstanceData {
        model_0: cols[0],
        model_1: cols[1],
        model_2: cols[2],
        model_3: cols[3],
        color: [color[0], color[1], color[2], 1.0],
        specular,
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    topology: Topology,
}

/// Draws the meshes and line helpers of a [`Scene`].
///
/// Geometry is uploaded the first time a handle is drawn with a given
/// vertex-colour mode and kept for the life of the renderer.
pub struct SceneRenderer {
    phong_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: u64,
    meshes: HashMap<(GeometryHandle, bool), GpuMesh>,
    surface_format: wgpu::TextureFormat,
    msaa_target: wgpu::TextureView,
    depth_texture: wgpu::TextureView,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let phong_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("phong_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::PHONG_SHADER.into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });

        let phong_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &phong_shader,
            ("vs_main", "fs_main"),
            surface_format,
            wgpu::PrimitiveTopology::TriangleList,
            "phong_pipeline",
        );
        let line_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &line_shader,
            ("vs_line", "fs_line"),
            surface_format,
            wgpu::PrimitiveTopology::LineList,
            "line_pipeline",
        );

        let instance_capacity = 64;
        let instance_buffer = create_instance_buffer(device, instance_capacity);
        let msaa_target = Self::create_msaa_target(device, surface_format, width, height);
        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            phong_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            instance_buffer,
            instance_capacity,
            meshes: HashMap::new(),
            surface_format,
            msaa_target,
            depth_texture,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.msaa_target = Self::create_msaa_target(device, self.surface_format, width, height);
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Encode one frame of `scene` into `encoder`. The multisampled scene is
    /// resolved into `view`, replacing its contents.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&frame_uniforms(scene, camera)),
        );

        let drawables = scene.drawables();
        let mut instances = Vec::with_capacity(drawables.len());
        for d in &drawables {
            let (Some(geometry), Some(material)) =
                (scene.geometry(d.geometry), scene.material(d.material))
            else {
                continue;
            };
            let key = (d.geometry, material.uses_vertex_colors());
            self.meshes
                .entry(key)
                .or_insert_with(|| upload(device, geometry, key));
            instances.push((key, d.kind, instance_for(d.world, material)));
        }

        if instances.len() as u64 > self.instance_capacity {
            self.instance_capacity = (instances.len() as u64).next_power_of_two();
            self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
        }
        if !instances.is_empty() {
            let data: Vec<InstanceData> = instances.iter().map(|(_, _, i)| *i).collect();
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&data));
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.msaa_target,
                resolve_target: Some(view),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Discard,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        for (slot, (key, kind, _)) in instances.iter().enumerate() {
            let Some(mesh) = self.meshes.get(key) else {
                continue;
            };
            let pipeline = match (kind, mesh.topology) {
                (NodeKind::Lines { .. }, _) | (_, Topology::Lines) => &self.line_pipeline,
                _ => &self.phong_pipeline,
            };
            let slot = slot as u32;
            pass.set_pipeline(pipeline);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, slot..slot + 1);
        }
    }

    fn create_msaa_target(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa_target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: SAMPLE_COUNT,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: SAMPLE_COUNT,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn frame_uniforms(scene: &Scene, camera: &PerspectiveCamera) -> FrameUniforms {
    let mut uniforms = FrameUniforms::zeroed();
    uniforms.view_proj = camera.view_projection().to_cols_array_2d();
    uniforms.camera_position = camera.position.extend(1.0).to_array();
    let lights = scene.lights();
    let count = lights.len().min(MAX_LIGHTS);
    if lights.len() > MAX_LIGHTS {
        tracing::warn!(lights = lights.len(), max = MAX_LIGHTS, "extra lights ignored");
    }
    uniforms.light_count = [count as u32, 0, 0, 0];
    for (slot, light) in uniforms.lights.iter_mut().zip(lights) {
        let towards_light = -light.direction();
        let c = light.color.to_array();
        slot.direction = towards_light.extend(0.0).to_array();
        slot.color = [
            c[0] * light.intensity,
            c[1] * light.intensity,
            c[2] * light.intensity,
            1.0,
        ];
    }
    uniforms
}

fn upload(
    device: &wgpu::Device,
    geometry: &Geometry,
    (handle, vertex_colors): (GeometryHandle, bool),
) -> GpuMesh {
    let mesh = geometry.tessellate();
    let vertices = interleave(&mesh, vertex_colors);
    tracing::debug!(
        geometry = handle.0,
        kind = geometry.kind_name(),
        vertex_colors,
        vertices = vertices.len(),
        "uploading geometry"
    );
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("mesh_vertex_buffer"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("mesh_index_buffer"),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: mesh.indices.len() as u32,
        topology: mesh.topology(),
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("instance_buffer"),
        size: capacity * std::mem::size_of::<InstanceData>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    (vs, fs): (&str, &str),
    surface_format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x3,
                    ],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceData>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        3 => Float32x4,
                        4 => Float32x4,
                        5 => Float32x4,
                        6 => Float32x4,
                        7 => Float32x4,
                        8 => Float32x4,
                    ],
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            // Open shells (the hemisphere, the plane) are visible from both sides.
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: SAMPLE_COUNT,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
