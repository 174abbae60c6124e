//! IPv4 address generation preserving network classification
//!
//! A private original (10/8, 172.16/12, 192.168/16, 127/8, 169.254/16)
//! always yields a private replacement and a public original a public one.
//! Network prefixes (host bits all zero) stay network prefixes of the same
//! length; host addresses keep their CIDR suffix unchanged.

use rand::seq::SliceRandom;
use rand::Rng;
use std::net::Ipv4Addr;

/// Attempts at drawing a public address before using the fallback blocks
pub const PUBLIC_ATTEMPTS: usize = 200;

/// First octets of well-known public allocations
const PUBLIC_FALLBACK_OCTETS: [u8; 12] = [45, 52, 54, 63, 74, 89, 104, 142, 157, 185, 199, 216];

/// Private and local ranges preserved by generation, as (network, prefix)
const PRIVATE_RANGES: [(Ipv4Addr, u8); 5] = [
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
];

/// Prefix lengths of 10/8, 172.16/12 and 192.168/16, the blocks networks are drawn from
const PRIVATE_NETWORK_BLOCKS: [u8; 3] = [8, 12, 16];

/// Ranges that are neither private nor routable on the public internet
const NON_PUBLIC_RANGES: [(Ipv4Addr, u8); 9] = [
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(100, 64, 0, 0), 10),
    (Ipv4Addr::new(192, 0, 0, 0), 24),
    (Ipv4Addr::new(192, 0, 2, 0), 24),
    (Ipv4Addr::new(198, 18, 0, 0), 15),
    (Ipv4Addr::new(198, 51, 100, 0), 24),
    (Ipv4Addr::new(203, 0, 113, 0), 24),
    (Ipv4Addr::new(224, 0, 0, 0), 4),
    (Ipv4Addr::new(240, 0, 0, 0), 4),
];

/// An IPv4 address with an optional CIDR prefix length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedAddress {
    pub addr: Ipv4Addr,
    pub prefix: Option<u8>,
}

impl ParsedAddress {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (addr, prefix) = match text.split_once('/') {
            Some((addr, prefix)) => {
                let prefix: u8 = prefix.parse().ok()?;
                if prefix > 32 {
                    return None;
                }
                (addr, Some(prefix))
            }
            None => (text, None),
        };
        Some(Self {
            addr: addr.parse().ok()?,
            prefix,
        })
    }

    /// Whether this is a network prefix: a CIDR suffix with all host bits zero
    pub fn is_network(&self) -> bool {
        match self.prefix {
            Some(prefix) if prefix < 32 => u32::from(self.addr) & !mask(prefix) == 0,
            _ => false,
        }
    }
}

fn mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

fn in_range(addr: Ipv4Addr, (network, prefix): (Ipv4Addr, u8)) -> bool {
    u32::from(addr) & mask(prefix) == u32::from(network)
}

/// Private, loopback or link-local
pub fn is_private(addr: Ipv4Addr) -> bool {
    PRIVATE_RANGES.iter().any(|&range| in_range(addr, range))
}

/// Routable on the public internet
pub fn is_public(addr: Ipv4Addr) -> bool {
    !is_private(addr)
        && !addr.is_broadcast()
        && !NON_PUBLIC_RANGES.iter().any(|&range| in_range(addr, range))
}

/// Generate a replacement for an IPv4 address or network
///
/// Unparseable originals yield a public host address.
pub fn generate_ip<R: Rng + ?Sized>(original: Option<&str>, rng: &mut R) -> String {
    let Some(parsed) = original.and_then(ParsedAddress::parse) else {
        return random_public(rng).to_string();
    };
    let private = is_private(parsed.addr);

    match parsed.prefix {
        Some(prefix) if parsed.is_network() => {
            let network = if private {
                private_network(prefix, rng)
            } else {
                public_network(prefix, rng)
            };
            format!("{network}/{prefix}")
        }
        prefix => {
            let host = if private {
                private_host(parsed.addr, rng)
            } else {
                random_public(rng)
            };
            let host = keep_host_bits(host, prefix);
            match prefix {
                Some(prefix) => format!("{host}/{prefix}"),
                None => host.to_string(),
            }
        }
    }
}

/// A host address must not read as a network address under its own prefix
fn keep_host_bits(host: Ipv4Addr, prefix: Option<u8>) -> Ipv4Addr {
    match prefix {
        Some(prefix) if prefix < 31 && u32::from(host) & !mask(prefix) == 0 => {
            Ipv4Addr::from(u32::from(host) | 1)
        }
        _ => host,
    }
}

/// Random host inside the same private range as `original`
fn private_host<R: Rng + ?Sized>(original: Ipv4Addr, rng: &mut R) -> Ipv4Addr {
    let (network, prefix) = PRIVATE_RANGES
        .iter()
        .copied()
        .find(|&range| in_range(original, range))
        .unwrap_or(PRIVATE_RANGES[0]);

    let host_bits = rng.gen::<u32>() & !mask(prefix);
    let addr = u32::from(network) | host_bits;
    // Avoid .0 and .255 in the last octet
    let last = rng.gen_range(1..=254u32);
    Ipv4Addr::from((addr & !0xFF) | last)
}

/// Random private network with the given prefix, normalized to its network address
///
/// Only blocks at least as large as the prefix are drawn from, so masking
/// never leaves the private range. Below /8 no private network exists and
/// `10.0.0.0` is returned as is.
fn private_network<R: Rng + ?Sized>(prefix: u8, rng: &mut R) -> Ipv4Addr {
    let blocks: Vec<u8> = PRIVATE_NETWORK_BLOCKS
        .iter()
        .copied()
        .filter(|&block_prefix| block_prefix <= prefix)
        .collect();

    let candidate = match blocks.choose(rng) {
        Some(8) => Ipv4Addr::new(10, rng.gen(), rng.gen(), rng.gen()),
        Some(12) => Ipv4Addr::new(172, rng.gen_range(16..=31), rng.gen(), rng.gen()),
        Some(_) => Ipv4Addr::new(192, 168, rng.gen(), rng.gen()),
        None => return Ipv4Addr::new(10, 0, 0, 0),
    };
    Ipv4Addr::from(u32::from(candidate) & mask(prefix))
}

/// Random public host address
pub fn random_public<R: Rng + ?Sized>(rng: &mut R) -> Ipv4Addr {
    for _ in 0..PUBLIC_ATTEMPTS {
        let candidate = Ipv4Addr::new(
            rng.gen_range(1..=223),
            rng.gen(),
            rng.gen(),
            rng.gen_range(1..=254),
        );
        if is_public(candidate) {
            return candidate;
        }
    }

    tracing::debug!("Public address attempts exhausted, using fallback block");
    Ipv4Addr::new(
        fallback_octet(rng),
        rng.gen(),
        rng.gen(),
        rng.gen_range(1..=254),
    )
}

/// Random public network with the given prefix, normalized to its network address
fn public_network<R: Rng + ?Sized>(prefix: u8, rng: &mut R) -> Ipv4Addr {
    for _ in 0..PUBLIC_ATTEMPTS {
        let candidate = Ipv4Addr::new(rng.gen_range(1..=223), rng.gen(), rng.gen(), rng.gen());
        if !is_public(candidate) {
            continue;
        }
        let network = Ipv4Addr::from(u32::from(candidate) & mask(prefix));
        if is_public(network) {
            return network;
        }
    }

    tracing::debug!("Public network attempts exhausted, using fallback block");
    let candidate = Ipv4Addr::new(fallback_octet(rng), rng.gen(), rng.gen(), 0);
    Ipv4Addr::from(u32::from(candidate) & mask(prefix))
}

fn fallback_octet<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    PUBLIC_FALLBACK_OCTETS.choose(rng).copied().unwrap_or(45)
}
