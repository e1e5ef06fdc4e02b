//! Bags and their on-disk layout.
//!
//! A bag is a single archival content package: one directory under the root
//! being accessioned. This module holds the [`Bag`] type and the routine that
//! forces a bag into the canonical `data/{meta,originals,dips}` layout.
//!
//! ## Main Parts
//!
//! - [`Bag`] - A candidate bag directory and its folder name
//! - [`normalize`] - Reshape a bag into the canonical layout
//! - [`MatchMode`] - How canonical folder names are recognised
//! - [`LayoutReport`] - Directories created and entries moved by a normalization

#[allow(clippy::module_inception)]
// Same pattern as the rest of the crate: the type lives in a file named after it
pub mod bag;
pub mod layout;

pub use bag::Bag;
pub use layout::{LayoutError, LayoutReport, MatchMode, Relocation, normalize};
