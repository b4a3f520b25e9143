/// In-memory scene and camera registry keyed by generated identifiers.
use crate::camera::{Camera, Intrinsics, Pose};
use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Scene holding the cameras placed in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    cameras: BTreeMap<String, Camera>,
}

impl Scene {
    fn new(id: String) -> Self {
        Self {
            id,
            cameras: BTreeMap::new(),
        }
    }

    /// Add a camera with a fresh identifier.
    /// Pose defaults to the origin with no rotation.
    pub fn create_camera(&mut self, pose: Option<Pose>, intrinsics: Option<Intrinsics>) -> &Camera {
        let id = Uuid::new_v4().to_string();
        let camera = Camera::new(id.clone(), pose.unwrap_or([0.0; 6]), intrinsics);
        self.cameras.entry(id).or_insert(camera)
    }

    pub fn list_cameras(&self) -> impl Iterator<Item = &Camera> {
        self.cameras.values()
    }

    pub fn get_camera(&self, camera_id: &str) -> Option<&Camera> {
        self.cameras.get(camera_id)
    }

    /// Replace the pose of an existing camera
    pub fn update_camera_pose(&mut self, camera_id: &str, pose: Pose) -> Result<&Camera, RegistryError> {
        let camera = self
            .cameras
            .get_mut(camera_id)
            .ok_or_else(|| RegistryError::CameraNotFound(camera_id.to_string()))?;
        camera.pose = pose;
        Ok(camera)
    }

    /// Remove a camera; removing an unknown camera is a no-op.
    pub fn delete_camera(&mut self, camera_id: &str) -> Option<Camera> {
        self.cameras.remove(camera_id)
    }
}

/// All scenes known to the service.
#[derive(Debug, Default)]
pub struct SceneRegistry {
    scenes: BTreeMap<String, Scene>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scene with a fresh identifier
    pub fn create_scene(&mut self) -> &Scene {
        let id = Uuid::new_v4().to_string();
        self.scenes.entry(id.clone()).or_insert(Scene::new(id))
    }

    pub fn list_scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.values()
    }

    pub fn get_scene(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes.get(scene_id)
    }

    /// Mutable access for camera operations; unknown scenes are an error.
    pub fn scene_mut(&mut self, scene_id: &str) -> Result<&mut Scene, RegistryError> {
        self.scenes
            .get_mut(scene_id)
            .ok_or_else(|| RegistryError::SceneNotFound(scene_id.to_string()))
    }

    /// Camera lookup across the scene boundary
    pub fn get_camera(&self, scene_id: &str, camera_id: &str) -> Result<&Camera, RegistryError> {
        self.get_scene(scene_id)
            .ok_or_else(|| RegistryError::SceneNotFound(scene_id.to_string()))?
            .get_camera(camera_id)
            .ok_or_else(|| RegistryError::CameraNotFound(camera_id.to_string()))
    }

    /// Remove a scene and its cameras; removing an unknown scene is a no-op.
    pub fn delete_scene(&mut self, scene_id: &str) -> Option<Scene> {
        self.scenes.remove(scene_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenes_get_unique_ids() {
        let mut registry = SceneRegistry::new();
        let first = registry.create_scene().id.clone();
        let second = registry.create_scene().id.clone();

        assert_ne!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
        assert_eq!(registry.list_scenes().count(), 2);
    }

    #[test]
    fn delete_scene_is_idempotent() {
        let mut registry = SceneRegistry::new();
        let id = registry.create_scene().id.clone();

        assert!(registry.delete_scene(&id).is_some());
        assert!(registry.delete_scene(&id).is_none());
        assert!(registry.get_scene(&id).is_none());
    }

    #[test]
    fn cameras_default_to_zero_pose() {
        let mut registry = SceneRegistry::new();
        let scene_id = registry.create_scene().id.clone();

        let scene = registry.scene_mut(&scene_id).unwrap();
        let camera = scene.create_camera(None, None).clone();
        assert_eq!(camera.pose, [0.0; 6]);
        assert_eq!(camera.camera_intrinsics, None);

        assert_eq!(registry.get_camera(&scene_id, &camera.id).unwrap(), &camera);
    }

    #[test]
    fn camera_pose_can_be_updated() {
        let mut registry = SceneRegistry::new();
        let scene_id = registry.create_scene().id.clone();
        let scene = registry.scene_mut(&scene_id).unwrap();
        let camera_id = scene
            .create_camera(None, Some(Intrinsics::new(50.0, 50.0, 320.0, 240.0)))
            .id
            .clone();

        let pose = [2.0, 2.0, 5.0, 0.2, 0.3, 0.1];
        assert_eq!(scene.update_camera_pose(&camera_id, pose).unwrap().pose, pose);
        assert_eq!(
            scene.update_camera_pose("missing", pose),
            Err(RegistryError::CameraNotFound("missing".to_string()))
        );
    }

    #[test]
    fn unknown_scene_is_reported() {
        let mut registry = SceneRegistry::new();
        assert_eq!(
            registry.scene_mut("nope").map(|scene| scene.id.clone()),
            Err(RegistryError::SceneNotFound("nope".to_string()))
        );
        assert_eq!(
            registry.get_camera("nope", "cam"),
            Err(RegistryError::SceneNotFound("nope".to_string()))
        );
    }

    #[test]
    fn delete_camera_is_idempotent() {
        let mut registry = SceneRegistry::new();
        let scene_id = registry.create_scene().id.clone();
        let scene = registry.scene_mut(&scene_id).unwrap();
        let camera_id = scene.create_camera(None, None).id.clone();

        assert!(scene.delete_camera(&camera_id).is_some());
        assert!(scene.delete_camera(&camera_id).is_none());
        assert_eq!(scene.list_cameras().count(), 0);
    }
}
