//! Scene graph and scene assembly for the haunted house.
//!
//! # Invariants
//! - Nodes live for the lifetime of the scene unless explicitly removed.
//! - Traversal order is deterministic: roots and children in insertion order.
//! - Grave placement is driven by an injected RNG; the same seed yields the
//!   same graves.

pub mod config;
pub mod geometry;
pub mod graves;
pub mod house;
pub mod light;
pub mod material;
pub mod scene;

pub use config::SceneConfig;
pub use geometry::{Geometry, MeshData};
pub use graves::{GravePlacement, RingBounds, ScatterParams, scatter, spawn_graves};
pub use house::{HouseHandles, build_haunted_house, regenerate_graves};
pub use light::{AmbientLight, DirectionalLight, Light, PointLight};
pub use material::StandardMaterial;
pub use scene::{
    Fog, GeometryId, LightInstance, MaterialId, MeshInstance, Node, NodeKind, Scene, SceneError,
};
