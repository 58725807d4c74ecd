//! Per-mode render programs, compiled once at startup.
//!
//! Each [`Program`] is the shared full-screen vertex stage plus the raymarch
//! fragment stage generated for one [`SceneMode`]. Sources are validated with
//! naga before they reach the device so a bad program comes back as a
//! [`ShaderCompileError`] instead of a device validation panic.

use std::num::NonZeroU64;
use std::sync::Arc;

use horizon_raymarch::{RaymarchConfig, SceneMode, program_source};
use log::{debug, info};
use wgpu::{ShaderModuleDescriptor, ShaderSource};

use crate::uniforms::UniformPacket;

/// A mode's program failed WGSL parsing or validation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("shader '{label}' for mode {mode} failed to compile: {message}")]
pub struct ShaderCompileError {
    pub mode: SceneMode,
    pub label: String,
    pub message: String,
}

/// Parses and validates a complete WGSL program.
pub fn validate_program_source(
    mode: SceneMode,
    label: &str,
    source: &str,
) -> Result<(), ShaderCompileError> {
    let fail = |message: String| ShaderCompileError {
        mode,
        label: label.to_string(),
        message,
    };

    let module = naga::front::wgsl::parse_str(source).map_err(|e| fail(e.emit_to_string(source)))?;
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| fail(e.emit_to_string(source)))?;
    Ok(())
}

/// Compiled pipeline and bind-group layout for one scene mode.
pub struct Program {
    pub mode: SceneMode,
    pub label: String,
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: Arc<wgpu::BindGroupLayout>,
}

impl Program {
    /// Generates, validates and compiles the program for `mode`.
    pub fn compile(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        mode: SceneMode,
    ) -> Result<Self, ShaderCompileError> {
        let label = format!("raymarch-{}", mode.name());
        let source = program_source(&RaymarchConfig::for_mode(mode));
        validate_program_source(mode, &label, &source)?;
        debug!("Validated program '{}' ({} bytes)", label, source.len());

        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some(&label),
            source: ShaderSource::Wgsl(source.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniforms-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(UniformPacket::SIZE),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label}-layout")),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                // Corners come from the vertex index.
                buffers: &[],
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
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None, // opaque
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        info!("Compiled program '{}'", label);

        Ok(Self {
            mode,
            label,
            pipeline,
            bind_group_layout: Arc::new(bind_group_layout),
        })
    }
}

/// The three compiled programs, one per mode.
pub struct ProgramCache {
    black_hole: Program,
    agn: Program,
    far_away: Program,
}

impl ProgramCache {
    /// Compiles every mode's program. Any failure fails the whole cache.
    pub fn compile_all(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, ShaderCompileError> {
        Ok(Self {
            black_hole: Program::compile(device, surface_format, SceneMode::BlackHole)?,
            agn: Program::compile(device, surface_format, SceneMode::Agn)?,
            far_away: Program::compile(device, surface_format, SceneMode::FarAway)?,
        })
    }

    pub fn get(&self, mode: SceneMode) -> &Program {
        match mode {
            SceneMode::BlackHole => &self.black_hole,
            SceneMode::Agn => &self.agn,
            SceneMode::FarAway => &self.far_away,
        }
    }
}

/// Bind group for the active program, built against that program's layout.
pub struct BindSet {
    pub mode: SceneMode,
    pub layout: Arc<wgpu::BindGroupLayout>,
    pub bind_group: wgpu::BindGroup,
}

impl BindSet {
    pub fn new(device: &wgpu::Device, program: &Program, uniform_buffer: &wgpu::Buffer) -> Self {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniforms-bind-group"),
            layout: &program.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        Self {
            mode: program.mode,
            layout: Arc::clone(&program.bind_group_layout),
            bind_group,
        }
    }
}
