//! # Scene Schema Core
//!
//! Core data structures and types for the scene schema engine.
//!
//! A scene schema is a declarative list of field definitions (type, options,
//! nested subfields, dependencies, restrictions, priority and visibility) used
//! to constrain structured descriptions of cinematic scenes. This crate holds
//! the raw schema records, the scene documents validated against them and the
//! findings and reports the engine produces.
//!
//! ## Key Concepts
//!
//! - **Field record**: one schema entry describing a scene attribute
//! - **Scene document**: one candidate scene, a mapping from field name to value
//! - **Scene sequence**: ordered documents sharing an identifier namespace
//! - **Finding**: one validation or consistency issue with severity and location
//!
//! ## Example
//!
//! ```rust
//! use scene_core::{FieldBuilder, SceneDocument};
//!
//! let schema = vec![
//!     FieldBuilder::new("SceneID", "string").required(true).build(),
//!     FieldBuilder::new("Duration", "string").options(["5s", "10s"]).build(),
//! ];
//!
//! let scene = SceneDocument::new()
//!     .with("SceneID", "desert_intro01")
//!     .with("Duration", "10s");
//!
//! assert_eq!(schema.len(), 2);
//! assert!(scene.is_present("SceneID"));
//! ```

pub mod builder;
pub mod error;
pub mod finding;
pub mod schema;
pub mod validator;
pub mod value;

pub use builder::*;
pub use error::*;
pub use finding::*;
pub use schema::*;
pub use validator::*;
pub use value::*;
