// ── Template families ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Category of a configuration template, inferred from its name.
///
/// Selects the VLAN addressing table applied after binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateFamily {
    #[strum(serialize = "BTQ")]
    Btq,
    #[strum(serialize = "Large BTQ")]
    LargeBtq,
    #[strum(serialize = "Simple Office")]
    SimpleOffice,
    #[strum(serialize = "ZTNA Office")]
    ZtnaOffice,
    #[strum(serialize = "ZTNA Manufacture")]
    ZtnaManufacture,
    #[strum(serialize = "Manufacture RIC")]
    ManufactureRic,
    #[strum(serialize = "VCA France Office")]
    VcaFranceOffice,
    #[strum(serialize = "VCA France Manufacture")]
    VcaFranceManufacture,
}

/// Name markers in match order; the first hit wins, so more specific
/// markers must precede the ones they contain ("ZTNA Office" before "Office").
const MARKERS: &[(&str, TemplateFamily)] = &[
    ("ZTNA Office", TemplateFamily::ZtnaOffice),
    (
        "EMEA - VCA France Office Template",
        TemplateFamily::VcaFranceOffice,
    ),
    (
        "EMEA - VCA France Manufacture Template",
        TemplateFamily::VcaFranceManufacture,
    ),
    ("ZTNA Manufacture", TemplateFamily::ZtnaManufacture),
    ("Manufacture RIC", TemplateFamily::ManufactureRic),
    ("Office", TemplateFamily::SimpleOffice),
    ("Large", TemplateFamily::LargeBtq),
];

impl TemplateFamily {
    pub fn detect(template_name: &str) -> Self {
        MARKERS
            .iter()
            .find(|(marker, _)| template_name.contains(marker))
            .map_or(Self::Btq, |(_, family)| *family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_prefers_specific_markers() {
        let cases = [
            ("EMEA - ZTNA Office Template", TemplateFamily::ZtnaOffice),
            (
                "EMEA - VCA France Office Template",
                TemplateFamily::VcaFranceOffice,
            ),
            (
                "EMEA - VCA France Manufacture Template",
                TemplateFamily::VcaFranceManufacture,
            ),
            ("ZTNA Manufacture v2", TemplateFamily::ZtnaManufacture),
            ("Manufacture RIC - Geneva", TemplateFamily::ManufactureRic),
            ("Simple Office", TemplateFamily::SimpleOffice),
            ("BTQ Large", TemplateFamily::LargeBtq),
            ("BTQ Standard", TemplateFamily::Btq),
            ("", TemplateFamily::Btq),
        ];
        for (name, family) in cases {
            assert_eq!(TemplateFamily::detect(name), family, "{name}");
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(TemplateFamily::LargeBtq.to_string(), "Large BTQ");
        assert_eq!(TemplateFamily::Btq.to_string(), "BTQ");
    }
}
