use orbitscene_common::Color;
use serde::{Deserialize, Serialize};

/// Surface appearance shared by meshes through a material handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Material {
    /// Light-reactive shading: ambient + Lambert diffuse + Blinn-Phong specular.
    Phong {
        color: Color,
        specular: Color,
        shininess: f32,
    },
    /// Unlit lines, optionally taking colour from the vertices.
    LineBasic { color: Color, vertex_colors: bool },
}

impl Material {
    /// Phong material with the default white appearance.
    pub fn phong() -> Self {
        Self::Phong {
            color: Color::WHITE,
            specular: Color::from_hex(0x111111),
            shininess: 30.0,
        }
    }

    pub fn line_basic(vertex_colors: bool) -> Self {
        Self::LineBasic {
            color: Color::WHITE,
            vertex_colors,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Phong { color, .. } | Self::LineBasic { color, .. } => *color,
        }
    }

    pub fn set_color(&mut self, new: Color) {
        match self {
            Self::Phong { color, .. } | Self::LineBasic { color, .. } => *color = new,
        }
    }

    pub fn is_lit(&self) -> bool {
        matches!(self, Self::Phong { .. })
    }

    /// Whether per-vertex colours tint this material. Phong meshes use the
    /// material colour alone.
    pub fn uses_vertex_colors(&self) -> bool {
        match self {
            Self::Phong { .. } => false,
            Self::LineBasic { vertex_colors, .. } => *vertex_colors,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::phong()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phong_defaults_to_white() {
        let m = Material::phong();
        assert_eq!(m.color(), Color::WHITE);
        assert!(m.is_lit());
    }

    #[test]
    fn line_material_is_unlit() {
        let mut m = Material::line_basic(true);
        assert!(!m.is_lit());
        m.set_color(Color::RED);
        assert_eq!(m.color(), Color::RED);
    }

    #[test]
    fn vertex_colors_follow_material() {
        assert!(Material::line_basic(true).uses_vertex_colors());
        assert!(!Material::line_basic(false).uses_vertex_colors());
        assert!(!Material::phong().uses_vertex_colors());
    }
}
