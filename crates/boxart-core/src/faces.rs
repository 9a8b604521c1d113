//! Logical faces of the box and which material each one carries

use crate::image_ref::ImageSlot;
use crate::loading::{SlotStatus, TextureSetStatus};

/// The six faces of the box, by outward normal (Y up, Z towards the viewer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxFace {
    /// +X
    Right,
    /// -X
    Left,
    /// +Y
    Top,
    /// -Y
    Bottom,
    /// +Z
    Front,
    /// -Z
    Back,
}

/// What a face is meant to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceMaterial {
    /// Flat frame color
    Frame,
    /// Image art from the given slot
    Art(ImageSlot),
}

/// What a face actually shows once texture loading is taken into account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFace {
    Flat,
    Textured(ImageSlot),
}

impl BoxFace {
    pub const ALL: [BoxFace; 6] = [
        BoxFace::Right,
        BoxFace::Left,
        BoxFace::Top,
        BoxFace::Bottom,
        BoxFace::Front,
        BoxFace::Back,
    ];

    pub fn material(&self) -> FaceMaterial {
        match self {
            BoxFace::Left => FaceMaterial::Art(ImageSlot::Spine),
            BoxFace::Front => FaceMaterial::Art(ImageSlot::Front),
            BoxFace::Back => FaceMaterial::Art(ImageSlot::Back),
            BoxFace::Right | BoxFace::Top | BoxFace::Bottom => FaceMaterial::Frame,
        }
    }

    /// Outward unit normal as (x, y, z)
    pub fn normal(&self) -> [f32; 3] {
        match self {
            BoxFace::Right => [1.0, 0.0, 0.0],
            BoxFace::Left => [-1.0, 0.0, 0.0],
            BoxFace::Top => [0.0, 1.0, 0.0],
            BoxFace::Bottom => [0.0, -1.0, 0.0],
            BoxFace::Front => [0.0, 0.0, 1.0],
            BoxFace::Back => [0.0, 0.0, -1.0],
        }
    }

    /// Quad size (u, v) for a box of the given dimensions
    pub fn extent(&self, width: f32, height: f32, depth: f32) -> [f32; 2] {
        match self {
            BoxFace::Front | BoxFace::Back => [width, height],
            BoxFace::Left | BoxFace::Right => [depth, height],
            BoxFace::Top | BoxFace::Bottom => [width, depth],
        }
    }

    /// Offset of the face center from the box center
    pub fn offset(&self, width: f32, height: f32, depth: f32) -> [f32; 3] {
        let n = self.normal();
        [n[0] * width / 2.0, n[1] * height / 2.0, n[2] * depth / 2.0]
    }

    /// Falls back to the frame color unless the face's art has loaded
    pub fn resolve(&self, textures: &TextureSetStatus) -> ResolvedFace {
        match self.material() {
            FaceMaterial::Frame => ResolvedFace::Flat,
            FaceMaterial::Art(slot) => match textures.status(slot) {
                SlotStatus::Ready => ResolvedFace::Textured(slot),
                SlotStatus::Empty | SlotStatus::Pending | SlotStatus::Failed => ResolvedFace::Flat,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_face_assignment() {
        let art: Vec<_> = BoxFace::ALL
            .iter()
            .filter(|f| matches!(f.material(), FaceMaterial::Art(_)))
            .collect();
        assert_eq!(art.len(), 3);
        assert_eq!(BoxFace::Left.material(), FaceMaterial::Art(ImageSlot::Spine));
        assert_eq!(BoxFace::Right.material(), FaceMaterial::Frame);
        assert_eq!(BoxFace::Top.material(), FaceMaterial::Frame);
        assert_eq!(BoxFace::Bottom.material(), FaceMaterial::Frame);
    }

    #[test]
    fn test_failed_art_degrades_to_flat() {
        let mut status = TextureSetStatus::default();
        let generation = status.begin([true, true, true]);
        status.finish(generation, ImageSlot::Front, true);
        status.finish(generation, ImageSlot::Back, false);

        assert_eq!(BoxFace::Front.resolve(&status), ResolvedFace::Textured(ImageSlot::Front));
        assert_eq!(BoxFace::Back.resolve(&status), ResolvedFace::Flat);
        assert_eq!(BoxFace::Left.resolve(&status), ResolvedFace::Flat);
    }

    #[test]
    fn test_geometry_matches_dimensions() {
        let (w, h, d) = (1.35, 1.9, 0.14);
        assert_eq!(BoxFace::Front.extent(w, h, d), [w, h]);
        assert_eq!(BoxFace::Left.extent(w, h, d), [d, h]);
        assert_eq!(BoxFace::Top.offset(w, h, d), [0.0, h / 2.0, 0.0]);
        assert_eq!(BoxFace::Back.offset(w, h, d), [0.0, 0.0, -d / 2.0]);
    }
}
