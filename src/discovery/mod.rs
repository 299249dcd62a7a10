use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("subdomain discovery is not available for '{0}'")]
    UnsupportedDomain(String),
}

/// Passive inventory per supported domain. The entries are fixture data;
/// no enumeration engines are queried.
static KNOWN_SUBDOMAINS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([(
        "megacorpone.com",
        vec![
            "www.megacorpone.com",
            "admin.megacorpone.com",
            "mail.megacorpone.com",
            "vpn.megacorpone.com",
            "test.megacorpone.com",
            "beta.megacorpone.com",
            "fs1.megacorpone.com",
            "intranet.megacorpone.com",
            "mail2.megacorpone.com",
            "ns1.megacorpone.com",
            "ns2.megacorpone.com",
            "ns3.megacorpone.com",
            "router.megacorpone.com",
            "siem.megacorpone.com",
            "snmp.megacorpone.com",
            "support.megacorpone.com",
            "syslog.megacorpone.com",
            "test.megacorpone.com",
        ],
    )])
});

/// Lists the known subdomains for `domain`, in inventory order.
pub fn enumerate_subdomains(domain: &str) -> Result<Vec<String>, DiscoveryError> {
    KNOWN_SUBDOMAINS
        .get(domain)
        .map(|subdomains| subdomains.iter().map(|s| s.to_string()).collect())
        .ok_or_else(|| DiscoveryError::UnsupportedDomain(domain.to_string()))
}
