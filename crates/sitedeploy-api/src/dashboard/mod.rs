// Dashboard REST API (v1): client, wire types, and regional hosts.

mod client;
pub mod types;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use client::DashboardClient;

/// Dashboard shard serving an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Region {
    #[default]
    Worldwide,
    China,
}

impl Region {
    pub fn host(self) -> &'static str {
        match self {
            Self::Worldwide => "api.meraki.com",
            Self::China => "api.meraki.cn",
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Self::Worldwide => "https://api.meraki.com/api/v1/",
            Self::China => "https://api.meraki.cn/api/v1/",
        }
    }
}
