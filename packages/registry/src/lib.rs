//! # Pagewright Registry
//!
//! What a section type *is*: its display name, catalog group, renderer,
//! settings schema and placeholder asset, plus the resolver that turns a
//! schema and an instance's settings into flat render props.
//!
//! The registry is built once at startup and shared as an
//! `Arc<SectionRegistry>`; both the editor and the preview receive it by
//! injection.

pub mod catalog;
mod registry;
mod schema;
mod vdom;

pub use registry::{
    RegistryBuilder, RegistryError, SectionDescriptor, SectionRegistry, SectionRenderer,
};
pub use schema::{
    resolve, CacheStats, FieldDescriptor, FieldType, Props, ResolverCache, SectionSchema,
    UnsupportedField,
};
pub use vdom::{CssRule, RenderTree, VNode, SECTION_ID_ATTR, SECTION_TYPE_ATTR};
