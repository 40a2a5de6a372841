use bytemuck::{Pod, Zeroable};

use crate::player::camera::{CameraPose, OrbitCamera};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
    /// Look target, w unused
    pub camera_target: [f32; 4],
}

impl CameraUniform {
    pub fn new(camera: &OrbitCamera, pose: &CameraPose, aspect: f32) -> Self {
        let view_proj = camera.projection(aspect) * pose.view_matrix();
        CameraUniform {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: pose.position.to_array(),
            _padding: 0.0,
            camera_target: pose.target.extend(1.0).to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::settings::CameraSettings;
    use glam::{Mat4, Vec3, Vec4};

    #[test]
    fn look_target_projects_to_screen_center() {
        let mut camera = OrbitCamera::new(CameraSettings::default());
        let pose = camera.update(Vec3::new(1.0, 0.0, 2.0));
        let uniform = CameraUniform::new(&camera, &pose, 16.0 / 9.0);

        let view_proj = Mat4::from_cols_array_2d(&uniform.view_proj);
        let clip = view_proj * Vec4::from(uniform.camera_target);
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 1e-4);
        assert!((clip.y / clip.w).abs() < 1e-4);
        assert_eq!(uniform.camera_pos, pose.position.to_array());
    }

    #[test]
    fn layout_is_gpu_friendly() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 96);
        let zeroed = CameraUniform::zeroed();
        let bytes = bytemuck::bytes_of(&zeroed);
        assert_eq!(bytes.len(), 96);
    }
}
