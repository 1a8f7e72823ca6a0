//! Supporting types for the storage CRDs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Storage class of a volume or of a unit of available capacity
///
/// Whole-drive classes (`Hdd`, `Ssd`, `Nvme`) represent an entire
/// unpartitioned drive: consumption is all-or-nothing. The `*Lvg` variants
/// draw from a LogicalVolumeGroup and can be partially consumed.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[non_exhaustive]
pub enum StorageClass {
    /// Rotational drive, consumed whole
    #[default]
    Hdd,
    /// Solid-state drive, consumed whole
    Ssd,
    /// NVMe drive, consumed whole
    Nvme,
    /// Space within an LVM group backed by rotational drives
    #[serde(rename = "HDDLVG")]
    HddLvg,
    /// Space within an LVM group backed by solid-state drives
    #[serde(rename = "SSDLVG")]
    SsdLvg,
    /// Space within an LVM group backed by NVMe drives
    #[serde(rename = "NVMELVG")]
    NvmeLvg,
    /// No preference; any class is acceptable
    Any,
}

impl StorageClass {
    /// Returns true if this class draws from a LogicalVolumeGroup and can
    /// therefore be partially consumed
    pub fn is_lvg(&self) -> bool {
        matches!(self, Self::HddLvg | Self::SsdLvg | Self::NvmeLvg)
    }

    /// The group variant of a whole-drive class, if one exists.
    ///
    /// Used by capacity search to fall back to group space when no whole
    /// drive of the requested class fits.
    pub fn lvg_variant(&self) -> Option<StorageClass> {
        match self {
            Self::Hdd => Some(Self::HddLvg),
            Self::Ssd => Some(Self::SsdLvg),
            Self::Nvme => Some(Self::NvmeLvg),
            _ => None,
        }
    }
}

impl std::fmt::Display for StorageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hdd => write!(f, "HDD"),
            Self::Ssd => write!(f, "SSD"),
            Self::Nvme => write!(f, "NVME"),
            Self::HddLvg => write!(f, "HDDLVG"),
            Self::SsdLvg => write!(f, "SSDLVG"),
            Self::NvmeLvg => write!(f, "NVMELVG"),
            Self::Any => write!(f, "ANY"),
        }
    }
}

impl std::str::FromStr for StorageClass {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HDD" => Ok(Self::Hdd),
            "SSD" => Ok(Self::Ssd),
            "NVME" => Ok(Self::Nvme),
            "HDDLVG" => Ok(Self::HddLvg),
            "SSDLVG" => Ok(Self::SsdLvg),
            "NVMELVG" => Ok(Self::NvmeLvg),
            "ANY" => Ok(Self::Any),
            _ => Err(crate::Error::validation(format!(
                "invalid storage class: {s}, expected one of: HDD, SSD, NVME, HDDLVG, SSDLVG, NVMELVG, ANY"
            ))),
        }
    }
}

/// Lifecycle phase of a Volume
///
/// The operator only ever moves a volume along:
///
/// ```text
/// Creating -> {Created, FailedToCreate}
/// {Creating, Created, FailedToCreate, ReadyToRemove} -> Removing
/// Removing -> {Removed, FailToRemove}
/// ```
///
/// `Creating -> Created/FailedToCreate` and `Removing -> Removed/FailToRemove`
/// are performed by the node agent; the operator performs the rest.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[non_exhaustive]
pub enum VolumePhase {
    /// Capacity is allocated; the agent has not finished provisioning yet
    #[default]
    Creating,
    /// Provisioned and ready for use
    Created,
    /// The agent could not provision the volume
    FailedToCreate,
    /// Unpublished and eligible for removal
    ReadyToRemove,
    /// Removal requested; the agent is tearing the volume down
    Removing,
    /// The agent confirmed physical removal
    Removed,
    /// The agent could not remove the volume; manual remediation required
    FailToRemove,
}

impl VolumePhase {
    /// Returns true if a delete request may transition this phase to
    /// `Removing`
    pub fn can_request_removal(&self) -> bool {
        matches!(
            self,
            Self::Creating | Self::Created | Self::FailedToCreate | Self::ReadyToRemove
        )
    }

    /// Returns true if deletion is already underway or finished, making a
    /// further delete request a no-op
    pub fn removal_in_progress(&self) -> bool {
        matches!(self, Self::Removing | Self::Removed)
    }
}

impl std::fmt::Display for VolumePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Creating => write!(f, "Creating"),
            Self::Created => write!(f, "Created"),
            Self::FailedToCreate => write!(f, "FailedToCreate"),
            Self::ReadyToRemove => write!(f, "ReadyToRemove"),
            Self::Removing => write!(f, "Removing"),
            Self::Removed => write!(f, "Removed"),
            Self::FailToRemove => write!(f, "FailToRemove"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_lvg_classes_are_subdividable() {
        assert!(StorageClass::HddLvg.is_lvg());
        assert!(StorageClass::SsdLvg.is_lvg());
        assert!(StorageClass::NvmeLvg.is_lvg());
        assert!(!StorageClass::Hdd.is_lvg());
        assert!(!StorageClass::Ssd.is_lvg());
        assert!(!StorageClass::Nvme.is_lvg());
        assert!(!StorageClass::Any.is_lvg());
    }

    #[test]
    fn test_lvg_variant_mapping() {
        assert_eq!(StorageClass::Hdd.lvg_variant(), Some(StorageClass::HddLvg));
        assert_eq!(StorageClass::Ssd.lvg_variant(), Some(StorageClass::SsdLvg));
        assert_eq!(
            StorageClass::Nvme.lvg_variant(),
            Some(StorageClass::NvmeLvg)
        );
        // Group classes and Any have no further group variant
        assert_eq!(StorageClass::HddLvg.lvg_variant(), None);
        assert_eq!(StorageClass::Any.lvg_variant(), None);
    }

    #[test]
    fn test_storage_class_round_trips_through_str() {
        for sc in [
            StorageClass::Hdd,
            StorageClass::Ssd,
            StorageClass::Nvme,
            StorageClass::HddLvg,
            StorageClass::SsdLvg,
            StorageClass::NvmeLvg,
            StorageClass::Any,
        ] {
            assert_eq!(StorageClass::from_str(&sc.to_string()).unwrap(), sc);
        }
        assert!(StorageClass::from_str("floppy").is_err());
    }

    #[test]
    fn test_phases_eligible_for_removal_request() {
        assert!(VolumePhase::Creating.can_request_removal());
        assert!(VolumePhase::Created.can_request_removal());
        assert!(VolumePhase::FailedToCreate.can_request_removal());
        assert!(VolumePhase::ReadyToRemove.can_request_removal());
        assert!(!VolumePhase::Removing.can_request_removal());
        assert!(!VolumePhase::Removed.can_request_removal());
        assert!(!VolumePhase::FailToRemove.can_request_removal());
    }

    #[test]
    fn test_removal_in_progress_phases() {
        assert!(VolumePhase::Removing.removal_in_progress());
        assert!(VolumePhase::Removed.removal_in_progress());
        assert!(!VolumePhase::FailToRemove.removal_in_progress());
        assert!(!VolumePhase::Created.removal_in_progress());
    }
}
