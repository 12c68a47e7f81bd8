// ── Site naming ──
//
// Site networks are named `<SITECODE>_<MAISON>`, e.g. `GB_MTB`. The site
// code and the maison's two-letter code feed every device hostname.

use std::fmt;

use serde::{Deserialize, Serialize};
use sitedeploy_api::Region;

use crate::error::CoreError;

/// Three-letter maison code → two-letter hostname code.
const MAISONS: &[(&str, &str)] = &[
    ("ALS", "LS"),
    ("BEM", "BM"),
    ("CAR", "CA"),
    ("CHL", "CH"),
    ("DUN", "DU"),
    ("IWC", "IW"),
    ("JLC", "JL"),
    ("LAN", "LA"),
    ("MTB", "MB"),
    ("PAN", "PA"),
    ("PIA", "PI"),
    ("PUR", "PU"),
    ("RDU", "RD"),
    ("RIC", "RI"),
    ("SHT", "SH"),
    ("VAC", "VA"),
    ("VCA", "VC"),
    ("SER", "SE"),
    ("AAL", "AA"),
    ("BUC", "BU"),
    ("DLV", "DL"),
    ("VHE", "VH"),
    ("GVR", "GV"),
    ("WFI", "WF"),
    ("LAB", "LB"),
];

/// Two-letter hostname code for a three-letter maison code.
pub fn maison_short_code(code: &str) -> Option<&'static str> {
    MAISONS
        .iter()
        .find(|(long, _)| *long == code)
        .map(|(_, short)| *short)
}

// ── SiteType ─────────────────────────────────────────────────────────

/// Office or boutique site, encoded as one letter in hostnames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteType {
    Office,
    Boutique,
}

impl SiteType {
    /// Office templates carry "Office" in their name; everything else is a boutique.
    pub fn from_template_name(name: &str) -> Self {
        if name.contains("Office") {
            Self::Office
        } else {
            Self::Boutique
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::Office => 'O',
            Self::Boutique => 'B',
        }
    }
}

// ── SiteName ─────────────────────────────────────────────────────────

/// A parsed site network name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteName {
    raw: String,
    site_code: String,
    maison: String,
    maison_short: &'static str,
}

impl SiteName {
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidSiteName {
            name: name.to_owned(),
            reason: reason.to_owned(),
        };

        let (site_code, maison) = name
            .split_once('_')
            .ok_or_else(|| invalid("expected <SITECODE>_<MAISON>"))?;
        if site_code.is_empty() {
            return Err(invalid("site code is empty"));
        }
        if maison.is_empty() {
            return Err(invalid("maison code is empty"));
        }

        let maison_short = maison_short_code(maison).ok_or_else(|| CoreError::UnknownMaison {
            code: maison.to_owned(),
        })?;

        Ok(Self {
            raw: name.to_owned(),
            site_code: site_code.to_owned(),
            maison: maison.to_owned(),
            maison_short,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn site_code(&self) -> &str {
        &self.site_code
    }

    pub fn maison(&self) -> &str {
        &self.maison
    }

    pub fn maison_short(&self) -> &'static str {
        self.maison_short
    }

    /// Hostname prefix shared by every device on the site, e.g. `NGBMBO`.
    pub fn hostname_prefix(&self, site_type: SiteType) -> String {
        format!(
            "N{}{}{}",
            self.site_code,
            self.maison_short,
            site_type.letter()
        )
    }

    /// Extra tag applied to access points on guest-WiFi sites.
    pub fn guest_tag(&self) -> String {
        format!("Guest_{}", self.maison)
    }
}

impl fmt::Display for SiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Dashboard region hosting a network: China sites are named `CN...`.
pub fn region_for_network(name: &str) -> Region {
    if name.starts_with("CN") {
        Region::China
    } else {
        Region::Worldwide
    }
}
