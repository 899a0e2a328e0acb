use crate::shaders;
use crate::textures::{TextureCache, TextureSlot};
use crate::uniforms::{FrameUniforms, MaterialUniforms, MeshUniforms, draw_order};
use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use haunted_assets::{TextureStore, Wrap};
use haunted_render::PerspectiveCamera;
use haunted_scene::{GeometryId, MaterialId, Scene, StandardMaterial};
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct GpuMaterial {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    blended: bool,
}

/// Per-draw transform slot. Slots are reused frame to frame and only grow.
struct MeshSlot {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// wgpu renderer for the standard-material scene.
pub struct WgpuRenderer {
    opaque_pipeline: wgpu::RenderPipeline,
    blended_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    mesh_layout: wgpu::BindGroupLayout,
    textures: TextureCache,
    meshes: BTreeMap<GeometryId, GpuMesh>,
    materials: BTreeMap<MaterialId, GpuMaterial>,
    mesh_slots: Vec<MeshSlot>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

impl WgpuRenderer {
    /// Build pipelines, upload every loaded texture and every scene geometry.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: &Scene,
        store: &TextureStore,
    ) -> Self {
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let mut material_entries = vec![
            uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ];
        material_entries.extend((0..TextureSlot::ALL.len() as u32).map(|i| texture_entry(2 + i)));
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &material_entries,
        });

        let mesh_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mesh_bind_group_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("standard_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &material_layout, &mesh_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("standard_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::STANDARD_SHADER.into()),
        });

        let opaque_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "opaque_pipeline",
            wgpu::BlendState::REPLACE,
            true,
        );
        let blended_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "blended_pipeline",
            wgpu::BlendState::ALPHA_BLENDING,
            false,
        );

        let textures = TextureCache::new(device, queue, store);
        let mut renderer = Self {
            opaque_pipeline,
            blended_pipeline,
            frame_buffer,
            frame_bind_group,
            material_layout,
            mesh_layout,
            textures,
            meshes: BTreeMap::new(),
            materials: BTreeMap::new(),
            mesh_slots: Vec::new(),
            depth_texture: Self::create_depth_texture(device, width, height),
            surface_format,
        };
        renderer.sync_resources(device, scene, store);
        tracing::info!(
            "renderer ready: {} geometries, {} materials, {} textures",
            renderer.meshes.len(),
            renderer.materials.len(),
            renderer.textures.len()
        );
        renderer
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Upload geometries and materials added to the scene since the last call.
    pub fn sync_resources(&mut self, device: &wgpu::Device, scene: &Scene, store: &TextureStore) {
        for (i, geometry) in scene.geometries().iter().enumerate() {
            let id = GeometryId(i);
            if self.meshes.contains_key(&id) {
                continue;
            }
            let data = geometry.tessellate();
            let vertices: Vec<Vertex> = data
                .positions
                .iter()
                .zip(&data.normals)
                .zip(&data.uvs)
                .map(|((position, normal), uv)| Vertex {
                    position: *position,
                    normal: *normal,
                    uv: *uv,
                })
                .collect();
            let label = geometry.kind_name();
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            self.meshes.insert(
                id,
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: data.indices.len() as u32,
                },
            );
        }

        for (i, material) in scene.materials().iter().enumerate() {
            let id = MaterialId(i);
            if self.materials.contains_key(&id) {
                continue;
            }
            let gpu = self.create_material(device, material, store);
            self.materials.insert(id, gpu);
        }
    }

    /// Render one frame into `target`: opaque meshes, then blended meshes
    /// back to front, over the scene background.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        scene: &Scene,
        store: &TextureStore,
        camera: &PerspectiveCamera,
    ) {
        self.sync_resources(device, scene, store);

        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(scene, camera)),
        );
        for (id, gpu) in &self.materials {
            if let Some(material) = scene.material(*id) {
                let repeat = uv_repeat(material, store);
                queue.write_buffer(
                    &gpu.uniform_buffer,
                    0,
                    bytemuck::bytes_of(&MaterialUniforms::new(material, repeat)),
                );
            }
        }

        let draws = draw_order(scene, camera);
        while self.mesh_slots.len() < draws.len() {
            let slot = self.create_mesh_slot(device);
            self.mesh_slots.push(slot);
        }
        for (draw, slot) in draws.iter().zip(&self.mesh_slots) {
            queue.write_buffer(
                &slot.uniform_buffer,
                0,
                bytemuck::bytes_of(&MeshUniforms::new(draw.world)),
            );
        }

        let [r, g, b] = scene.background.to_linear();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
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

            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            let mut blended_bound = None;
            for (draw, slot) in draws.iter().zip(&self.mesh_slots) {
                let (Some(mesh), Some(material)) = (
                    self.meshes.get(&draw.geometry),
                    self.materials.get(&draw.material),
                ) else {
                    continue;
                };
                if blended_bound != Some(material.blended) {
                    pass.set_pipeline(if material.blended {
                        &self.blended_pipeline
                    } else {
                        &self.opaque_pipeline
                    });
                    blended_bound = Some(material.blended);
                }
                pass.set_bind_group(1, &material.bind_group, &[]);
                pass.set_bind_group(2, &slot.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_material(
        &self,
        device: &wgpu::Device,
        material: &StandardMaterial,
        store: &TextureStore,
    ) -> GpuMaterial {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&material.name),
            contents: bytemuck::bytes_of(&MaterialUniforms::new(
                material,
                uv_repeat(material, store),
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let slots = [
            (TextureSlot::Color, material.map),
            (TextureSlot::AmbientOcclusion, material.ao_map),
            (TextureSlot::Alpha, material.alpha_map),
            (TextureSlot::Normal, material.normal_map),
            (TextureSlot::Roughness, material.roughness_map),
            (TextureSlot::Metalness, material.metalness_map),
            (TextureSlot::Displacement, material.displacement_map),
        ];
        let wrap = material
            .textures()
            .find_map(|id| store.get(id))
            .map(|t| t.sampler.wrap_s)
            .unwrap_or(Wrap::ClampToEdge);

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(self.textures.sampler(wrap)),
            },
        ];
        entries.extend(slots.iter().enumerate().map(|(i, (slot, id))| {
            wgpu::BindGroupEntry {
                binding: 2 + i as u32,
                resource: wgpu::BindingResource::TextureView(self.textures.view(*slot, *id)),
            }
        }));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&material.name),
            layout: &self.material_layout,
            entries: &entries,
        });
        GpuMaterial {
            uniform_buffer,
            bind_group,
            blended: material.is_blended(),
        }
    }

    fn create_mesh_slot(&self, device: &wgpu::Device) -> MeshSlot {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mesh_uniforms"),
            size: std::mem::size_of::<MeshUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh_bind_group"),
            layout: &self.mesh_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        MeshSlot {
            uniform_buffer,
            bind_group,
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        label: &str,
        blend: wgpu::BlendState,
        depth_write_enabled: bool,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
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
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// UV repeat of a material: taken from its first loaded texture.
fn uv_repeat(material: &StandardMaterial, store: &TextureStore) -> Vec2 {
    material
        .textures()
        .find_map(|id| store.get(id))
        .map(|t| t.sampler.repeat)
        .unwrap_or(Vec2::ONE)
}
