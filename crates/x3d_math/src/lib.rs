// Re-export glam for convenience
pub use glam::*;

// X3D math helpers
mod transform;
pub use transform::{axis_angle_to_quat, Mat4Ext, TransformFields};
