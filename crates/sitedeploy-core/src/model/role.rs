// ── Device role classification ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Role of a device on a site network, derived from its model prefix.
///
/// Variant order is the order product types are sent when creating a network.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum DeviceRole {
    Appliance,
    Wireless,
    Switch,
    Camera,
    CellularGateway,
}

impl DeviceRole {
    /// Classify a hardware model (`MX68`, `Z3`, `MS120-8`, `CW9162`, ...).
    ///
    /// Returns `None` for models that cannot be placed on a site network.
    pub fn classify(model: &str) -> Option<Self> {
        let model = model.trim().to_ascii_uppercase();
        if model.starts_with("MX") || model.starts_with('Z') {
            Some(Self::Appliance)
        } else if model.starts_with("MS") {
            Some(Self::Switch)
        } else if model.starts_with("MR") || model.starts_with("CW") {
            Some(Self::Wireless)
        } else if model.starts_with("MV") {
            Some(Self::Camera)
        } else if model.starts_with("MG") {
            Some(Self::CellularGateway)
        } else {
            None
        }
    }

    /// Two-letter role code used in hostnames.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Appliance => "SG",
            Self::Switch => "SW",
            Self::Wireless => "WA",
            Self::Camera => "MV",
            Self::CellularGateway => "MG",
        }
    }

    pub fn from_abbreviation(code: &str) -> Option<Self> {
        match code {
            "SG" => Some(Self::Appliance),
            "SW" => Some(Self::Switch),
            "WA" => Some(Self::Wireless),
            "MV" => Some(Self::Camera),
            "MG" => Some(Self::CellularGateway),
            _ => None,
        }
    }

    /// Dashboard product type enabled on a network hosting this role.
    pub fn product_type(self) -> &'static str {
        match self {
            Self::Appliance => "appliance",
            Self::Wireless => "wireless",
            Self::Switch => "switch",
            Self::Camera => "camera",
            Self::CellularGateway => "cellularGateway",
        }
    }
}

/// Distinct product types for a set of roles, in network-creation order.
pub fn product_types(roles: impl IntoIterator<Item = DeviceRole>) -> Vec<String> {
    roles
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|role| role.product_type().to_owned())
        .collect()
}
