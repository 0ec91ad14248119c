//! Image variation names and partition types

use serde::{Deserialize, Serialize};

/// Well-known image variation names. The core variation is the empty string.
pub struct ImageVariation;

impl ImageVariation {
    /// Framework-private and SDK code installed to the system image
    pub const CORE: &'static str = "";
    /// Code installed to the vendor image
    pub const VENDOR: &'static str = "vendor";
    /// Code installed to the product image
    pub const PRODUCT: &'static str = "product";
    /// Code installed to the recovery image
    pub const RECOVERY: &'static str = "recovery";
    /// Code installed to the ramdisk image
    pub const RAMDISK: &'static str = "ramdisk";
    /// Code installed to the vendor ramdisk image
    pub const VENDOR_RAMDISK: &'static str = "vendor_ramdisk";
    /// Code installed to the debug ramdisk image
    pub const DEBUG_RAMDISK: &'static str = "debug_ramdisk";

    /// The fixed variations, in split order
    pub const ALL: [&'static str; 7] = [
        Self::CORE,
        Self::RAMDISK,
        Self::VENDOR_RAMDISK,
        Self::DEBUG_RAMDISK,
        Self::RECOVERY,
        Self::VENDOR,
        Self::PRODUCT,
    ];

    /// Whether `variation` is one of the fixed image variations
    #[must_use]
    pub fn is_known(variation: &str) -> bool {
        Self::ALL.contains(&variation)
    }
}

/// Partition a filesystem-image style module is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionType {
    System,
    SystemExt,
    SystemDlkm,
    Vendor,
    VendorDlkm,
    Odm,
    Product,
    Recovery,
    Ramdisk,
    VendorRamdisk,
    DebugRamdisk,
}

impl PartitionType {
    /// Image variation to request from dependencies of a module pinned to
    /// this partition. Partitions without a dedicated image variation get
    /// the core variation.
    #[must_use]
    pub fn image_variation(self) -> &'static str {
        match self {
            Self::Vendor => ImageVariation::VENDOR,
            Self::Product => ImageVariation::PRODUCT,
            Self::Recovery => ImageVariation::RECOVERY,
            Self::Ramdisk => ImageVariation::RAMDISK,
            Self::VendorRamdisk => ImageVariation::VENDOR_RAMDISK,
            Self::DebugRamdisk => ImageVariation::DEBUG_RAMDISK,
            Self::System | Self::SystemExt | Self::SystemDlkm | Self::VendorDlkm | Self::Odm => {
                ImageVariation::CORE
            }
        }
    }
}
