//! Material descriptors bound to meshes.

use std::sync::Arc;

use crate::texture::{AlphaTexture, CubeTexture};

/// Shading model of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Unlit, optionally flat shaded.
    Basic,
    /// Lit with metalness/roughness.
    Standard,
    /// Lit with environment reflections, clearcoat and transmission.
    Physical,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceSide {
    #[default]
    Front,
    Back,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blending {
    #[default]
    Normal,
    Additive,
}

/// Parameters of one material instance.
#[derive(Debug, Clone)]
pub struct Material {
    pub kind: MaterialKind,
    /// Linear RGB.
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub reflectivity: f32,
    pub transmission: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub flat_shading: bool,
    pub depth_write: bool,
    pub side: FaceSide,
    pub blending: Blending,
    pub env_map: Option<Arc<CubeTexture>>,
    pub alpha_map: Option<Arc<AlphaTexture>>,
}

impl Material {
    fn base(kind: MaterialKind, color: [f32; 3]) -> Self {
        Self {
            kind,
            color,
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            metalness: 0.0,
            roughness: 1.0,
            clearcoat: 0.0,
            reflectivity: 0.0,
            transmission: 0.0,
            opacity: 1.0,
            transparent: false,
            flat_shading: false,
            depth_write: true,
            side: FaceSide::Front,
            blending: Blending::Normal,
            env_map: None,
            alpha_map: None,
        }
    }

    /// Flat, unlit material used in performance mode.
    pub fn basic(color: [f32; 3]) -> Self {
        Self {
            flat_shading: true,
            ..Self::base(MaterialKind::Basic, color)
        }
    }

    /// Lit material that glows slightly in its own color.
    pub fn standard(color: [f32; 3]) -> Self {
        Self {
            emissive: color,
            emissive_intensity: 0.5,
            metalness: 0.3,
            roughness: 0.4,
            ..Self::base(MaterialKind::Standard, color)
        }
    }

    /// Reflective material bound to the shared environment map.
    pub fn physical(color: [f32; 3], env_map: Arc<CubeTexture>) -> Self {
        Self {
            emissive: color,
            emissive_intensity: 0.8,
            metalness: 0.2,
            roughness: 0.1,
            clearcoat: 1.0,
            reflectivity: 1.0,
            env_map: Some(env_map),
            ..Self::base(MaterialKind::Physical, color)
        }
    }

    pub fn line(color: [f32; 3], opacity: f32) -> Self {
        Self::base(MaterialKind::Line, color).with_opacity(opacity)
    }

    /// Set opacity, marking the material transparent below 1.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = self.opacity < 1.0;
        self
    }

    pub fn with_side(mut self, side: FaceSide) -> Self {
        self.side = side;
        self
    }

    /// Additive blending without depth writes, for glow-like shells.
    pub fn additive(mut self) -> Self {
        self.blending = Blending::Additive;
        self.depth_write = false;
        self
    }

    pub fn with_transmission(mut self, transmission: f32) -> Self {
        self.transmission = transmission;
        self
    }

    pub fn with_alpha_map(mut self, alpha_map: Arc<AlphaTexture>) -> Self {
        self.alpha_map = Some(alpha_map);
        self.transparent = true;
        self
    }

    pub fn with_emissive_intensity(mut self, intensity: f32) -> Self {
        self.emissive_intensity = intensity;
        self
    }
}
