use crate::error::NetworkErrorExt;
use crate::{Ipv4Cidr, NetworkError};
use sdeck_domain::Environment;
use sdeck_domain::config::NetworkConfig;
use serde::Serialize;

/// Prefix length of every subnet.
pub const SUBNET_PREFIX: u8 = 24;

/// Zone slots reserved per tier; private blocks start after them so adding a zone never
/// shifts an existing subnet.
pub const ZONE_SLOTS: u32 = 4;

/// Subnets placed in one availability zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZonePlan {
    /// Position in the region's zone list.
    pub index: usize,
    pub public: Ipv4Cidr,
    /// Present only when the network has a NAT gateway.
    pub private: Option<Ipv4Cidr>,
}

/// Address layout of the network, computed before any resource is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkPlan {
    pub vpc: Ipv4Cidr,
    pub zones: Vec<ZonePlan>,
    pub nat_gateway: bool,
}

impl NetworkPlan {
    /// Carves `/24` public subnets from slots `0..zones` and, in production, private-with-egress
    /// subnets from slots `ZONE_SLOTS..ZONE_SLOTS + zones`.
    ///
    /// # Errors
    /// * [`NetworkError::InvalidCidr`] If the configured block cannot be parsed.
    /// * [`NetworkError::Capacity`] If the block is too small or too many zones are requested.
    pub fn new(config: &NetworkConfig, environment: Environment) -> Result<Self, NetworkError> {
        let vpc = config.cidr.parse::<Ipv4Cidr>().context("network.cidr")?;
        let zones = u32::from(config.max_azs);

        if zones == 0 || zones > ZONE_SLOTS {
            return Err(NetworkError::Capacity {
                message: format!("between 1 and {ZONE_SLOTS} zones are supported, got {zones}")
                    .into(),
                context: Some("network.max_azs".into()),
            });
        }
        if vpc.block_count(SUBNET_PREFIX) < u64::from(2 * ZONE_SLOTS) {
            return Err(NetworkError::Capacity {
                message: format!(
                    "{vpc} must hold at least {} /{SUBNET_PREFIX} blocks",
                    2 * ZONE_SLOTS
                )
                .into(),
                context: Some("network.cidr".into()),
            });
        }

        let nat_gateway = environment.is_production();
        let zones = (0..zones)
            .enumerate()
            .map(|(index, slot)| {
                Ok(ZonePlan {
                    index,
                    public: vpc.subnet(SUBNET_PREFIX, slot)?,
                    private: if nat_gateway {
                        Some(vpc.subnet(SUBNET_PREFIX, ZONE_SLOTS + slot)?)
                    } else {
                        None
                    },
                })
            })
            .collect::<Result<Vec<_>, NetworkError>>()?;

        Ok(Self { vpc, zones, nat_gateway })
    }
}
