use crate::NetworkError;
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 network in CIDR notation with all host bits cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Cidr {
    /// # Errors
    /// Returns [`NetworkError::InvalidCidr`] if the prefix exceeds 32 or host bits are set.
    pub fn new(network: Ipv4Addr, prefix: u8) -> Result<Self, NetworkError> {
        if prefix > 32 {
            return Err(NetworkError::InvalidCidr {
                message: format!("prefix /{prefix} exceeds 32").into(),
                context: None,
            });
        }
        if u32::from(network) & !mask(prefix) != 0 {
            return Err(NetworkError::InvalidCidr {
                message: format!("{network}/{prefix} has host bits set").into(),
                context: None,
            });
        }
        Ok(Self { network, prefix })
    }

    #[must_use]
    pub const fn network(&self) -> Ipv4Addr {
        self.network
    }

    #[must_use]
    pub const fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Number of `/new_prefix` blocks this network splits into.
    #[must_use]
    pub fn block_count(&self, new_prefix: u8) -> u64 {
        if new_prefix < self.prefix || new_prefix > 32 {
            0
        } else {
            1u64 << (new_prefix - self.prefix)
        }
    }

    /// The `index`-th `/new_prefix` block inside this network.
    ///
    /// # Errors
    /// Returns [`NetworkError::Capacity`] if the block does not fit.
    pub fn subnet(&self, new_prefix: u8, index: u32) -> Result<Self, NetworkError> {
        if u64::from(index) >= self.block_count(new_prefix) {
            return Err(NetworkError::Capacity {
                message: format!("{self} has no /{new_prefix} block #{index}").into(),
                context: None,
            });
        }
        let offset = u64::from(index) << (32 - u32::from(new_prefix));
        let base = u64::from(u32::from(self.network)) + offset;
        let network = u32::try_from(base).map_err(|_| NetworkError::Capacity {
            message: format!("{self} block #{index} overflows the address space").into(),
            context: None,
        })?;
        Self::new(Ipv4Addr::from(network), new_prefix)
    }
}

const fn mask(prefix: u8) -> u32 {
    if prefix == 0 { 0 } else { u32::MAX << (32 - prefix as u32) }
}

impl FromStr for Ipv4Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NetworkError::InvalidCidr {
            message: format!("'{s}' is not of the form a.b.c.d/n").into(),
            context: None,
        };
        let (addr, prefix) = s.trim().split_once('/').ok_or_else(invalid)?;
        let addr = addr.parse::<Ipv4Addr>().map_err(|_| invalid())?;
        let prefix = prefix.parse::<u8>().map_err(|_| invalid())?;
        Self::new(addr, prefix)
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl Serialize for Ipv4Cidr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
