use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use super::{EngineHost, EnginePort, EngineProtocol, ScanEngine};
use crate::core::errors::EngineError;

static HOST_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<host\b.*?</host>").unwrap());
static ADDR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<address addr="([^"]+)""#).unwrap());
static PORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<port protocol="(\w+)" portid="(\d+)">(.*?)</port>"#).unwrap());
static STATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<state state="([^"]+)""#).unwrap());
static SERVICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<service\s[^>]*?\bname="([^"]+)""#).unwrap());
static PRODUCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bproduct="([^"]+)""#).unwrap());
static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bversion="([^"]+)""#).unwrap());

/// Production engine: spawns the nmap binary and reads XML from stdout.
pub struct NmapEngine {
    command: String,
}

impl NmapEngine {
    pub fn new() -> Self {
        Self {
            command: "nmap".to_string(),
        }
    }

    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn error(&self, target: &str, arguments: &str, exit_code: Option<i32>, detail: String) -> EngineError {
        EngineError {
            target: target.to_string(),
            arguments: arguments.to_string(),
            exit_code,
            stderr_tail: detail,
        }
    }
}

impl Default for NmapEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScanEngine for NmapEngine {
    async fn run(&self, target: &str, arguments: &str) -> Result<Vec<EngineHost>, EngineError> {
        let mut args = shell_words::split(arguments)
            .map_err(|err| self.error(target, arguments, None, format!("invalid argument string: {err}")))?;
        args.extend(["-oX".to_string(), "-".to_string()]);
        args.push(target.to_string());

        tracing::debug!("invoking {} {:?}", self.command, args);
        let output = Command::new(&self.command)
            .args(&args)
            .output()
            .await
            .map_err(|err| {
                self.error(target, arguments, None, format!("failed to spawn {}: {err}", self.command))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = stderr
                .lines()
                .rev()
                .take(10)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(self.error(target, arguments, output.status.code(), tail));
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        Ok(parse_nmap_xml(&xml))
    }
}

/// Pulls every host, protocol, and port out of nmap XML. Ports are grouped
/// per protocol under their host, whatever their state.
fn parse_nmap_xml(xml: &str) -> Vec<EngineHost> {
    let mut hosts = Vec::new();
    for host_match in HOST_RE.find_iter(xml) {
        let block = host_match.as_str();
        let Some(address) = ADDR_RE.captures(block).map(|cap| cap[1].to_string()) else {
            continue;
        };

        let mut protocols: Vec<EngineProtocol> = Vec::new();
        for cap in PORT_RE.captures_iter(block) {
            let proto_name = &cap[1];
            let Ok(port) = cap[2].parse::<u16>() else {
                continue;
            };
            let body = &cap[3];
            let port = EnginePort {
                port,
                state: STATE_RE
                    .captures(body)
                    .map(|c| c[1].to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                service: SERVICE_RE.captures(body).map(|c| c[1].to_string()),
                product: PRODUCT_RE.captures(body).map(|c| c[1].to_string()),
                version: VERSION_RE.captures(body).map(|c| c[1].to_string()),
            };
            match protocols.iter_mut().find(|p| p.name == proto_name) {
                Some(proto) => proto.ports.push(port),
                None => protocols.push(EngineProtocol {
                    name: proto_name.to_string(),
                    ports: vec![port],
                }),
            }
        }

        hosts.push(EngineHost { address, protocols });
    }
    hosts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap" args="nmap -sV -oX - scanme.nmap.org">
<host starttime="1"><status state="up" reason="echo-reply"/>
<address addr="45.33.32.156" addrtype="ipv4"/>
<ports>
<port protocol="tcp" portid="22"><state state="open" reason="syn-ack"/><service name="ssh" product="OpenSSH" version="6.6.1p1" method="probed" conf="10"/></port>
<port protocol="tcp" portid="80"><state state="closed" reason="reset"/></port>
<port protocol="udp" portid="123"><state state="open"/><service name="ntp"/></port>
</ports>
</host>
<host starttime="2"><status state="up" reason="echo-reply"/>
<address addr="45.33.32.157" addrtype="ipv4"/>
<ports>
<port protocol="tcp" portid="443"><state state="open" reason="syn-ack"/><service name="https" method="table" conf="3"/></port>
</ports>
</host>
</nmaprun>"#;

    #[test]
    fn parses_hosts_protocols_and_ports() {
        let hosts = parse_nmap_xml(SAMPLE_XML);
        assert_eq!(hosts.len(), 2);

        let first = &hosts[0];
        assert_eq!(first.address, "45.33.32.156");
        assert_eq!(first.protocols.len(), 2);

        let tcp = first.protocols.iter().find(|p| p.name == "tcp").unwrap();
        assert_eq!(tcp.ports.len(), 2);
        let ssh = tcp.ports.iter().find(|p| p.port == 22).unwrap();
        assert_eq!(ssh.state, "open");
        assert_eq!(ssh.service.as_deref(), Some("ssh"));
        assert_eq!(ssh.product.as_deref(), Some("OpenSSH"));
        assert_eq!(ssh.version.as_deref(), Some("6.6.1p1"));

        // closed ports are reported too, with no service detail
        let closed = tcp.ports.iter().find(|p| p.port == 80).unwrap();
        assert_eq!(closed.state, "closed");
        assert_eq!(closed.service, None);

        let udp = first.protocols.iter().find(|p| p.name == "udp").unwrap();
        assert_eq!(udp.ports[0].service.as_deref(), Some("ntp"));

        assert_eq!(hosts[1].address, "45.33.32.157");
        assert_eq!(hosts[1].protocols[0].ports[0].port, 443);
    }

    #[test]
    fn hostless_output_parses_to_nothing() {
        let hosts = parse_nmap_xml("<?xml version=\"1.0\"?><nmaprun></nmaprun>");
        assert!(hosts.is_empty());
    }
}
