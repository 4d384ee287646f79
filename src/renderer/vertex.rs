//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// 8-bit RGB plus alpha to a linear-ish float color
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> [f32; 4] {
    [
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    ]
}

/// Colors for game elements
pub mod colors {
    use super::rgba;

    pub const PICKUP: [f32; 4] = rgba(90, 220, 255, 255);
    pub const PICKUP_CORE: [f32; 4] = rgba(170, 250, 255, 255);
    pub const PLAYER_BULLET: [f32; 4] = rgba(150, 240, 255, 255);
    pub const ENEMY_BULLET: [f32; 4] = rgba(255, 130, 130, 255);
    pub const ENEMY_GLOW: [f32; 4] = rgba(255, 90, 90, 255);
    pub const BOSS_GLOW: [f32; 4] = rgba(255, 60, 180, 255);
    pub const ENEMY_BODY: [f32; 4] = rgba(155, 80, 70, 255);
    pub const BOSS_BODY: [f32; 4] = rgba(170, 70, 140, 255);
    pub const ENEMY_HEAD: [f32; 4] = rgba(240, 220, 200, 255);
    pub const ENEMY_GUN: [f32; 4] = rgba(40, 40, 40, 255);
    pub const PLAYER_GLOW: [f32; 4] = rgba(90, 190, 255, 255);
    pub const PLAYER_BODY: [f32; 4] = rgba(210, 250, 255, 255);
    pub const PLAYER_FIN: [f32; 4] = rgba(80, 180, 255, 255);
    pub const OVERLAY: [f32; 4] = rgba(0, 0, 0, 165);
}

/// Same color with a different alpha
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
}
