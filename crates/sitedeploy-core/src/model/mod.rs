// ── Domain model ──
//
// Pure, network-free types: device roles, site names, base subnets,
// template families and DHCP modes.

pub mod dhcp;
pub mod role;
pub mod site;
pub mod subnet;
pub mod template;

pub use dhcp::DhcpHandling;
pub use role::{DeviceRole, product_types};
pub use site::{SiteName, SiteType, maison_short_code, region_for_network};
pub use subnet::{AddressRange, BaseSubnet};
pub use template::TemplateFamily;
