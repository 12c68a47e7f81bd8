// ── Hostnames ──
//
// `<prefix><ROLE><NN>`: e.g. prefix `NGBMBO`, switch, sequence 1 gives
// `NGBMBOSW01`. Sequence numbers are per role and start at 1.

use std::collections::BTreeMap;

use crate::model::DeviceRole;

/// Per-role sequence counters for one naming pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceCounters {
    issued: BTreeMap<DeviceRole, u32>,
}

impl SequenceCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after devices already on the network.
    pub fn seeded(existing: impl IntoIterator<Item = DeviceRole>) -> Self {
        let mut counters = Self::new();
        for role in existing {
            *counters.issued.entry(role).or_default() += 1;
        }
        counters
    }

    /// Next sequence number for `role`.
    pub fn next(&mut self, role: DeviceRole) -> u32 {
        let n = self.issued.entry(role).or_default();
        *n += 1;
        *n
    }

    pub fn issued(&self, role: DeviceRole) -> u32 {
        self.issued.get(&role).copied().unwrap_or(0)
    }
}

pub fn hostname(prefix: &str, role: DeviceRole, sequence: u32) -> String {
    format!("{prefix}{}{sequence:02}", role.abbreviation())
}

/// Recover the site prefix from an existing hostname like `NGBMBOSW01`.
///
/// Returns `None` unless the name ends in a known role code and two or
/// more digits.
pub fn hostname_prefix(name: &str) -> Option<&str> {
    let digits = name.len() - name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits < 2 {
        return None;
    }
    let without_seq = name.get(..name.len() - digits)?;
    let split = without_seq.len().checked_sub(2)?;
    let (prefix, role) = (without_seq.get(..split)?, without_seq.get(split..)?);
    DeviceRole::from_abbreviation(role)?;
    (!prefix.is_empty()).then_some(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_is_zero_padded() {
        assert_eq!(hostname("NGBMBO", DeviceRole::Switch, 1), "NGBMBOSW01");
        assert_eq!(hostname("NGBMBB", DeviceRole::Wireless, 12), "NGBMBBWA12");
        assert_eq!(hostname("NGBMBB", DeviceRole::Appliance, 2), "NGBMBBSG02");
    }

    #[test]
    fn hostnames_are_distinct_within_a_role() {
        let names: std::collections::HashSet<_> = (1..=99)
            .map(|n| hostname("NFRPA01CAB", DeviceRole::Wireless, n))
            .collect();
        assert_eq!(names.len(), 99);
    }

    #[test]
    fn counters_are_independent_per_role() {
        let mut counters = SequenceCounters::new();
        assert_eq!(counters.next(DeviceRole::Wireless), 1);
        assert_eq!(counters.next(DeviceRole::Wireless), 2);
        assert_eq!(counters.next(DeviceRole::Switch), 1);
        assert_eq!(counters.issued(DeviceRole::Camera), 0);
    }

    #[test]
    fn seeded_counters_continue() {
        let mut counters = SequenceCounters::seeded([
            DeviceRole::Wireless,
            DeviceRole::Wireless,
            DeviceRole::Appliance,
        ]);
        assert_eq!(counters.next(DeviceRole::Wireless), 3);
        assert_eq!(counters.next(DeviceRole::Switch), 1);
    }

    #[test]
    fn prefix_recovered_from_existing_name() {
        assert_eq!(hostname_prefix("NGBMBOSW01"), Some("NGBMBO"));
        assert_eq!(hostname_prefix("NFRPA01CABWA12"), Some("NFRPA01CAB"));
        assert_eq!(hostname_prefix("NGBMBOXX01"), None);
        assert_eq!(hostname_prefix("SW01"), None);
        assert_eq!(hostname_prefix("Meraki MX68"), None);
        assert_eq!(hostname_prefix(""), None);
    }
}
