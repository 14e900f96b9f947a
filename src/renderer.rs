// viewer renderer

use winit::window::Window;
use wgpu::util::DeviceExt;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use tracing::{info, warn};
use crate::common::{Mesh, Vertex};
use crate::controller::Controller;
use crate::diagnostics::SystemDiagnostics;
use crate::error::{MeshError, RenderError};
use crate::scene::{Material, Model, Scene};
use crate::transform::{model_matrix, normal_matrix};
use crate::upload::{MeshHandle, MeshUpload};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 4] = [
    wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32x3, offset: 0, shader_location: 0 },
    wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32x3, offset: 12, shader_location: 1 },
    wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32x3, offset: 24, shader_location: 2 },
    wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32x2, offset: 36, shader_location: 3 },
];

// --- UNIFORMS ---

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [f32; 16],
    pub cam_pos: [f32; 4],
    pub sun_dir: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LocalUniform {
    pub model: [f32; 16],
    pub normal: [f32; 16],
    pub colour: [f32; 4],
    pub params: [f32; 4], // x = diffuse, y = specular, z = specular power
}

impl LocalUniform {
    pub fn new(model: &Model<GpuMesh>) -> Self {
        let Material { colour, diffuse, specular, specular_power } = model.material;
        Self {
            model: model_matrix(&model.transform).to_cols_array(),
            normal: Mat4::from_mat3(normal_matrix(&model.transform)).to_cols_array(),
            colour: colour.extend(1.0).to_array(),
            params: [diffuse, specular, specular_power, 0.0],
        }
    }
}

// --- GPU MESHES ---

pub struct GpuMesh {
    v_buf: wgpu::Buffer,
    i_buf: wgpu::Buffer,
    uniform_buf: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    num_inds: u32,
    num_verts: u32,
}

impl MeshHandle for GpuMesh {
    fn vertex_count(&self) -> u32 {
        self.num_verts
    }

    fn index_count(&self) -> u32 {
        self.num_inds
    }

    fn destroy(self) {
        self.v_buf.destroy();
        self.i_buf.destroy();
        self.uniform_buf.destroy();
    }
}

/// Creates vertex, index and per-model uniform buffers on a device.
pub struct GpuUploader<'r> {
    device: &'r wgpu::Device,
    local_layout: &'r wgpu::BindGroupLayout,
}

impl MeshUpload for GpuUploader<'_> {
    type Handle = GpuMesh;

    fn upload(&mut self, mesh: &Mesh) -> Result<GpuMesh, MeshError> {
        mesh.validate()?;

        let v = mesh.to_vertices();
        let v_buf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor { label: Some("Mesh Vertices"), contents: bytemuck::cast_slice(&v), usage: wgpu::BufferUsages::VERTEX });
        let i_buf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor { label: Some("Mesh Indices"), contents: bytemuck::cast_slice(&mesh.indices), usage: wgpu::BufferUsages::INDEX });

        let uniform_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniform"),
            size: std::mem::size_of::<LocalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: self.local_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: uniform_buf.as_entire_binding() }],
            label: None,
        });

        Ok(GpuMesh {
            v_buf,
            i_buf,
            uniform_buf,
            bind_group,
            num_inds: mesh.indices.len() as u32,
            num_verts: v.len() as u32,
        })
    }
}

// --- RENDERER STRUCT ---

pub struct Renderer<'a> {
    pub window: &'a Window,
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,

    local_layout: wgpu::BindGroupLayout,
    pipeline_fill: wgpu::RenderPipeline,
    pipeline_wire: Option<wgpu::RenderPipeline>,

    global_buf: wgpu::Buffer,
    global_bind: wgpu::BindGroup,
    depth: wgpu::TextureView,
}

impl<'a> Renderer<'a> {
    pub async fn new(window: &'a Window, vsync: bool) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }).await.ok_or(RenderError::NoAdapter)?;

        SystemDiagnostics::log_gpu(&adapter.get_info());

        let mut features = wgpu::Features::empty();
        let has_wireframe = adapter.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        if has_wireframe {
            features |= wgpu::Features::POLYGON_MODE_LINE;
        } else {
            warn!("adapter has no line polygon mode, wireframe toggle disabled");
        }

        let (device, queue) = adapter.request_device(&wgpu::DeviceDescriptor {
            label: None, required_features: features, required_limits: adapter.limits(),
        }, None).await?;

        let size = window.inner_size();
        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(RenderError::UnsupportedSurface)?;
        config.present_mode = if vsync { wgpu::PresentMode::AutoVsync } else { wgpu::PresentMode::AutoNoVsync };
        surface.configure(&device, &config);

        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer { ty: wgpu::BufferBindingType::Uniform, has_dynamic_offset: false, min_binding_size: None },
                count: None,
            }],
            label: Some("global_layout"),
        });

        let local_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer { ty: wgpu::BufferBindingType::Uniform, has_dynamic_offset: false, min_binding_size: None },
                count: None,
            }],
            label: Some("local_layout"),
        });

        // --- BUFFERS ---
        let global_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Global Uniform"),
            size: std::mem::size_of::<GlobalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let global_bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: global_buf.as_entire_binding() }],
            label: None,
        });

        // --- PIPELINES ---
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor { label: None, source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()) });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor { label: None, bind_group_layouts: &[&global_layout, &local_layout], push_constant_ranges: &[] });

        let pipeline_fill = Self::create_pipeline(&device, &config, &layout, &shader, false);
        let pipeline_wire = has_wireframe.then(|| Self::create_pipeline(&device, &config, &layout, &shader, true));
        let depth = Self::mk_depth(&device, &config);

        info!(width = config.width, height = config.height, format = ?config.format, "renderer ready");

        Ok(Self {
            window, surface, device, queue, config,
            local_layout,
            pipeline_fill, pipeline_wire,
            global_buf, global_bind,
            depth,
        })
    }

    fn create_pipeline(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, layout: &wgpu::PipelineLayout, shader: &wgpu::ShaderModule, wireframe: bool) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(if wireframe { "Wireframe Pipeline" } else { "Fill Pipeline" }),
            layout: Some(layout),
            vertex: wgpu::VertexState { module: shader, entry_point: "vs_main", buffers: &[wgpu::VertexBufferLayout { array_stride: std::mem::size_of::<Vertex>() as _, step_mode: wgpu::VertexStepMode::Vertex, attributes: &VERTEX_ATTRIBUTES }] },
            fragment: Some(wgpu::FragmentState { module: shader, entry_point: "fs_main", targets: &[Some(config.format.into())] }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: if wireframe { wgpu::PolygonMode::Line } else { wgpu::PolygonMode::Fill },
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState { format: DEPTH_FORMAT, depth_write_enabled: true, depth_compare: wgpu::CompareFunction::Less, stencil: Default::default(), bias: Default::default() }),
            multisample: Default::default(), multiview: None,
        })
    }

    fn mk_depth(dev: &wgpu::Device, cfg: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
        dev.create_texture(&wgpu::TextureDescriptor { size: wgpu::Extent3d { width: cfg.width, height: cfg.height, depth_or_array_layers: 1 }, mip_level_count: 1, sample_count: 1, dimension: wgpu::TextureDimension::D2, format: DEPTH_FORMAT, usage: wgpu::TextureUsages::RENDER_ATTACHMENT, label: Some("Depth"), view_formats: &[] }).create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn uploader(&self) -> GpuUploader<'_> {
        GpuUploader { device: &self.device, local_layout: &self.local_layout }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        // minimized windows report zero
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth = Self::mk_depth(&self.device, &self.config);
    }

    pub fn render(&mut self, scene: &Scene<GpuMesh>, controller: &Controller) -> Result<(), RenderError> {
        let out = match self.surface.get_current_texture() {
            Ok(o) => o,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => {
                warn!(error = %e, "skipping frame");
                return Ok(());
            }
        };
        let view = out.texture.create_view(&wgpu::TextureViewDescriptor::default());

        // -- camera & sun --
        let sun_dir = Vec3::new(0.5, 0.8, 0.4).normalize();
        let mvp = controller.get_matrix(self.config.width as f32, self.config.height as f32);
        let cam_pos = controller.eye();

        let global_data = GlobalUniform {
            view_proj: mvp.to_cols_array(),
            cam_pos: cam_pos.extend(1.0).to_array(),
            sun_dir: sun_dir.extend(0.0).to_array(),
        };
        self.queue.write_buffer(&self.global_buf, 0, bytemuck::cast_slice(&[global_data]));

        for model in scene.iter() {
            self.queue.write_buffer(&model.mesh.uniform_buf, 0, bytemuck::cast_slice(&[LocalUniform::new(model)]));
        }

        let mut enc = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        {
            let mut pass = enc.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.02, g: 0.03, b: 0.05, a: 1.0 }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment { view: &self.depth, depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }), stencil_ops: None }),
                timestamp_writes: None, occlusion_query_set: None,
            });

            match (&self.pipeline_wire, controller.is_wireframe) {
                (Some(wire), true) => pass.set_pipeline(wire),
                _ => pass.set_pipeline(&self.pipeline_fill),
            }
            pass.set_bind_group(0, &self.global_bind, &[]);

            for model in scene.iter() {
                let mesh = &model.mesh;
                pass.set_bind_group(1, &mesh.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.v_buf.slice(..));
                pass.set_index_buffer(mesh.i_buf.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.num_inds, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(enc.finish()));
        out.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layouts_match_shader() {
        // std140 sizes of the WGSL structs
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 96);
        assert_eq!(std::mem::size_of::<LocalUniform>(), 160);
    }

    #[test]
    fn vertex_attributes_cover_stride() {
        let last = VERTEX_ATTRIBUTES[3];
        assert_eq!(last.offset + last.format.size(), std::mem::size_of::<Vertex>() as u64);
    }
}
