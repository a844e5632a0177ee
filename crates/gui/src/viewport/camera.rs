use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};

use crate::mesh::Aabb;

const PITCH_LIMIT: f32 = 1.5;

/// Orbit camera for the on-screen viewport and the headset mirror
pub struct ArcBallCamera {
    /// Turn about the world Y axis (radians)
    pub yaw: f32,
    /// Elevation above the XZ plane (radians)
    pub pitch: f32,
    pub distance: f32,
    /// Point the camera orbits
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
}

impl ArcBallCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.4,
            distance: 6.0,
            target: Vec3::ZERO,
            fov: 45.0_f32.to_radians(),
        }
    }

    /// Drag in screen degrees
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(0.05, 10_000.0);
    }

    /// Move the target in the view plane, scaled by the distance
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let (right, up) = self.screen_axes();
        self.target += (right * dx + up * dy) * self.distance * 0.1;
    }

    /// Look at `bounds` from far enough away to see all of it
    pub fn frame(&mut self, bounds: &Aabb) {
        self.target = bounds.center();
        self.distance = bounds.radius().max(0.01) / (self.fov * 0.5).sin() * 1.1;
    }

    fn orbit(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, -self.pitch, 0.0)
    }

    pub fn eye_position(&self) -> Vec3 {
        self.target + self.orbit() * Vec3::new(0.0, 0.0, self.distance)
    }

    /// Right and up directions of the screen in world space
    fn screen_axes(&self) -> (Vec3, Vec3) {
        let orbit = self.orbit();
        (orbit * Vec3::X, orbit * Vec3::Y)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let near = (self.distance * 0.01).max(0.001);
        let projection = Mat4::perspective_rh_gl(self.fov, aspect, near, self.distance * 20.0);
        projection * Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Screen position of a world point inside `rect`, `None` behind the camera
    pub fn project(&self, point: Vec3, rect: egui::Rect) -> Option<egui::Pos2> {
        project_with(self.view_projection(rect.width() / rect.height()), point, rect)
    }
}

pub fn project_with(vp: Mat4, point: Vec3, rect: egui::Rect) -> Option<egui::Pos2> {
    let clip = vp * Vec4::from((point, 1.0));
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    let half = rect.size() * 0.5;
    Some(rect.center() + egui::vec2(ndc.x * half.x, -ndc.y * half.y))
}
