//! Domain entities shared by every view's cache.

pub mod activity;
pub mod garden;
pub mod goal;
pub mod group;
pub mod profile;
pub mod reflection;
