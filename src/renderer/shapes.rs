//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, with_alpha};

/// Generate vertices for a bullet trail, oldest point faintest and smallest
pub fn bullet_trail(trail: &[Vec2], radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    if trail.is_empty() {
        return Vec::new();
    }

    let len = trail.len() as f32;
    let mut vertices = Vec::with_capacity(trail.len() * segments as usize * 3);
    for (i, p) in trail.iter().enumerate() {
        let alpha = (30.0 + i as f32 * 18.0) / 255.0;
        let r = (radius * (i + 1) as f32 / len).max(1.0);
        vertices.extend(circle(*p, r, with_alpha(color, alpha), segments));
    }
    vertices
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for an axis-aligned rectangle from its top-left corner
pub fn rect(top_left: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let (x0, y0) = (top_left.x, top_left.y);
    let (x1, y1) = (top_left.x + size.x, top_left.y + size.y);
    vec![
        Vertex::new(x0, y0, color),
        Vertex::new(x1, y0, color),
        Vertex::new(x0, y1, color),
        Vertex::new(x0, y1, color),
        Vertex::new(x1, y0, color),
        Vertex::new(x1, y1, color),
    ]
}

pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) -> [Vertex; 3] {
    [
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_vertex_count_and_extent() {
        let verts = circle(Vec2::new(10.0, 20.0), 5.0, [1.0; 4], 12);
        assert_eq!(verts.len(), 36);
        for v in &verts {
            let d = Vec2::from(v.position).distance(Vec2::new(10.0, 20.0));
            assert!(d <= 5.0 + 1e-4);
        }
    }

    #[test]
    fn test_trail_fades_in_toward_head() {
        let trail = [Vec2::new(0.0, 0.0), Vec2::new(0.0, 4.0), Vec2::new(0.0, 8.0)];
        let verts = bullet_trail(&trail, 4.0, [1.0; 4], 6);
        assert_eq!(verts.len(), 3 * 6 * 3);
        let first_alpha = verts[0].color[3];
        let last_alpha = verts[verts.len() - 1].color[3];
        assert!(first_alpha < last_alpha);
        assert!(bullet_trail(&[], 4.0, [1.0; 4], 6).is_empty());
    }

    #[test]
    fn test_rect_covers_corners() {
        let verts = rect(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), [1.0; 4]);
        assert_eq!(verts.len(), 6);
        assert!(verts.iter().any(|v| v.position == [4.0, 6.0]));
        assert!(verts.iter().any(|v| v.position == [1.0, 2.0]));
    }
}
