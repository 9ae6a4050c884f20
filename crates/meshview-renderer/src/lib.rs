pub mod backend;
pub mod camera;
pub mod config;
pub mod controls;
pub mod gizmo;
pub mod mesh;
pub mod palette;
pub mod picking;
pub mod scene;

pub use backend::{BufferHandle, Primitive, RecordingBackend, Recorded, RenderBackend};
pub use camera::{Camera, CameraUniform, Projection};
pub use config::{ConfigError, GizmoConfig, InputConfig, Sensitivity, ViewerConfig};
pub use controls::{Command, Controls, KeyOutcome, Modifiers, PointerButton, Viewport, HELP};
pub use gizmo::{GizmoAxis, GizmoGeometry, GizmoHandles, Increment, Pick, TransformMode};
pub use mesh::{LineVertex, ObjectGeometry, Segments};
pub use picking::belongs_to_segment;
pub use scene::Scene;

// Re-export glam types for consistent version usage
pub use glam;
