//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes the immutable provider configuration (`ProviderDescriptor`): credentials,
//! endpoints, scope specification, static query extras, and the token request body encoding.
//! `strategy` defines [`ProviderStrategy`], the capability set flows call into for every
//! protocol step, with [`DefaultProviderStrategy`] covering the common OAuth 2.0 behavior.
//! `presets` builds descriptors for a handful of well-known providers.

pub mod descriptor;
pub mod presets;
pub mod profile;
pub mod strategy;

pub use descriptor::*;
pub use profile::*;
pub use strategy::*;
