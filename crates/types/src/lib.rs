#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the varia mutator engine
//!
//! This crate provides the value types shared by every phase: variant
//! identities, image variation names, partition types and the property
//! structs that override modules merge onto their base modules.

pub mod image;
pub mod properties;
pub mod variation;

// Re-export commonly used types
pub use image::{ImageVariation, PartitionType};
pub use properties::{
    extend_properties, FieldSpec, PropertyKind, PropertySchema, PropertyStruct,
    PropertyValue, SchemaId,
};
pub use variation::{VariantIdentity, Variation};

use serde::{Deserialize, Serialize};

/// Operating system a module variant is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Os {
    Android,
    Linux,
    LinuxBionic,
    Darwin,
    Windows,
}

impl Os {
    /// Whether this is the primary device OS. Only device modules take part
    /// in image variation splitting.
    #[must_use]
    pub fn is_device(self) -> bool {
        matches!(self, Self::Android)
    }
}

impl Default for Os {
    fn default() -> Self {
        Self::Android
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Android => write!(f, "android"),
            Self::Linux => write!(f, "linux_glibc"),
            Self::LinuxBionic => write!(f, "linux_bionic"),
            Self::Darwin => write!(f, "darwin"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Which part of the device a module is specific to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Platform,
    DeviceSpecific,
    SocSpecific,
    ProductSpecific,
    SystemExtSpecific,
}

impl Default for ModuleKind {
    fn default() -> Self {
        Self::Platform
    }
}

impl ModuleKind {
    /// Partition the module installs to before any image variation applies
    #[must_use]
    pub fn partition(self) -> &'static str {
        match self {
            Self::Platform => "system",
            Self::DeviceSpecific => "odm",
            Self::SocSpecific => "vendor",
            Self::ProductSpecific => "product",
            Self::SystemExtSpecific => "system_ext",
        }
    }
}
