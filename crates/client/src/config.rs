//! Viewer configuration.

use std::path::PathBuf;

use yardview_core::{GeometryId, TextureId};

/// Cubemap face file stems, in layer order (+X, -X, +Y, -Y, +Z, -Z).
pub const SKYBOX_FACES: [&str; 6] = ["posx", "negx", "posy", "negy", "posz", "negz"];

/// Compiled-in viewer configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Window title.
    pub title: String,

    /// Initial window width in physical pixels.
    pub width: u32,

    /// Initial window height in physical pixels.
    pub height: u32,

    /// Root of every asset path below.
    pub resource_dir: PathBuf,

    /// Settings file, relative to `resource_dir`.
    pub settings_file: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Yardview".to_string(),
            width: 800,
            height: 600,
            resource_dir: PathBuf::from("resources"),
            settings_file: PathBuf::from("program_state.txt"),
        }
    }
}

impl ViewerConfig {
    pub fn settings_path(&self) -> PathBuf {
        self.resource_dir.join(&self.settings_file)
    }

    fn objects_dir(&self) -> PathBuf {
        self.resource_dir.join("objects")
    }

    fn textures_dir(&self) -> PathBuf {
        self.resource_dir.join("textures")
    }

    /// glTF binary for a disk-backed mesh, if the geometry has one.
    pub fn model_path(&self, geometry: GeometryId) -> Option<PathBuf> {
        geometry
            .model_name()
            .map(|name| self.objects_dir().join(format!("{name}.glb")))
    }

    /// Image file for a 2D texture. The skybox has six; see [`Self::skybox_paths`].
    pub fn texture_path(&self, texture: TextureId) -> Option<PathBuf> {
        let file = match texture {
            TextureId::Rose => "rose.png",
            TextureId::Bin => "bin.png",
            TextureId::Skybox => return None,
        };
        Some(self.textures_dir().join(file))
    }

    /// The six cubemap faces in layer order.
    pub fn skybox_paths(&self) -> [PathBuf; 6] {
        let dir = self.textures_dir().join("skybox");
        SKYBOX_FACES.map(|face| dir.join(format!("{face}.jpg")))
    }
}

/// Width over height, treating a zero dimension as one pixel.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn default_paths() {
        let config = ViewerConfig::default();
        assert_eq!(config.settings_path(), Path::new("resources/program_state.txt"));
        assert_eq!(
            config.model_path(GeometryId::Dog),
            Some(PathBuf::from("resources/objects/dog.glb"))
        );
        assert_eq!(config.model_path(GeometryId::RoseQuad), None);
        assert_eq!(
            config.texture_path(TextureId::Bin),
            Some(PathBuf::from("resources/textures/bin.png"))
        );
        assert_eq!(config.texture_path(TextureId::Skybox), None);
    }

    #[test]
    fn skybox_faces_in_layer_order() {
        let paths = ViewerConfig::default().skybox_paths();
        assert_eq!(paths[0], Path::new("resources/textures/skybox/posx.jpg"));
        assert_eq!(paths[3], Path::new("resources/textures/skybox/negy.jpg"));
        assert_eq!(paths[5], Path::new("resources/textures/skybox/negz.jpg"));
    }

    #[test]
    fn aspect_handles_zero_size() {
        assert_eq!(aspect_ratio(800, 600), 800.0 / 600.0);
        assert_eq!(aspect_ratio(0, 0), 1.0);
    }
}
