pub mod nmap;

pub use nmap::NmapEngine;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::errors::EngineError;
use crate::core::models::ScanRecord;
use crate::storage;

/// Raw engine output for one discovered host.
#[derive(Debug, Clone, Default)]
pub struct EngineHost {
    pub address: String,
    pub protocols: Vec<EngineProtocol>,
}

#[derive(Debug, Clone, Default)]
pub struct EngineProtocol {
    pub name: String,
    pub ports: Vec<EnginePort>,
}

#[derive(Debug, Clone, Default)]
pub struct EnginePort {
    pub port: u16,
    pub state: String,
    pub service: Option<String>,
    pub product: Option<String>,
    pub version: Option<String>,
}

/// Black-box contract over the underlying scanning engine: one invocation
/// takes exactly one target and a single space-joined argument string.
#[async_trait]
pub trait ScanEngine: Send + Sync {
    async fn run(&self, target: &str, arguments: &str) -> Result<Vec<EngineHost>, EngineError>;
}

/// Drives the engine for one target and normalizes its output into canonical
/// records. Multi-target iteration belongs to the orchestrator, not here.
pub struct Scanner<E> {
    engine: E,
}

impl<E: ScanEngine> Scanner<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Scans one target, persists the canonical record set, and returns it.
    ///
    /// Engine failures are contained: the target contributes an empty record
    /// set instead of aborting a multi-target run. An empty set skips the
    /// file write entirely.
    pub async fn scan(
        &self,
        target: &str,
        nmap_args: &[String],
        save_dir: &Path,
    ) -> Result<Vec<ScanRecord>> {
        if target.trim().is_empty() {
            anyhow::bail!("scan target must not be empty");
        }
        let arguments = nmap_args.join(" ");
        tracing::info!("starting scan on {} with arguments: {}", target, arguments);

        let hosts = match self.engine.run(target, &arguments).await {
            Ok(hosts) => hosts,
            Err(err) => {
                tracing::error!("scan engine failed for {}: {}", target, err);
                return Ok(Vec::new());
            }
        };

        let records = normalize(hosts, target);
        let path = storage::scan_file_path(save_dir);
        if records.is_empty() {
            tracing::info!("no results to save in {}", path.display());
        } else {
            storage::write_scan_csv(&records, &path)?;
            tracing::info!("{} results saved to {}", records.len(), path.display());
        }
        Ok(records)
    }
}

/// One record per (host, protocol, port), tagged with the originating target
/// and with absent service fields defaulted to empty strings.
fn normalize(hosts: Vec<EngineHost>, target: &str) -> Vec<ScanRecord> {
    let mut records = Vec::new();
    for host in hosts {
        for proto in host.protocols {
            for port in proto.ports {
                records.push(ScanRecord {
                    ip: host.address.clone(),
                    protocol: proto.name.clone(),
                    port: port.port,
                    state: port.state,
                    name: port.service.unwrap_or_default(),
                    product: port.product.unwrap_or_default(),
                    version: port.version.unwrap_or_default(),
                    subdomain: target.to_string(),
                });
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    struct StaticEngine {
        hosts: Vec<EngineHost>,
    }

    #[async_trait]
    impl ScanEngine for StaticEngine {
        async fn run(&self, _target: &str, _arguments: &str) -> Result<Vec<EngineHost>, EngineError> {
            Ok(self.hosts.clone())
        }
    }

    struct FailingEngine;

    #[async_trait]
    impl ScanEngine for FailingEngine {
        async fn run(&self, target: &str, arguments: &str) -> Result<Vec<EngineHost>, EngineError> {
            Err(EngineError {
                target: target.to_string(),
                arguments: arguments.to_string(),
                exit_code: Some(1),
                stderr_tail: "Failed to resolve".to_string(),
            })
        }
    }

    fn sample_hosts() -> Vec<EngineHost> {
        vec![EngineHost {
            address: "45.33.32.156".to_string(),
            protocols: vec![
                EngineProtocol {
                    name: "tcp".to_string(),
                    ports: vec![
                        EnginePort {
                            port: 22,
                            state: "open".to_string(),
                            service: Some("ssh".to_string()),
                            product: Some("OpenSSH".to_string()),
                            version: Some("6.6.1p1".to_string()),
                        },
                        EnginePort {
                            port: 8080,
                            state: "filtered".to_string(),
                            service: None,
                            product: None,
                            version: None,
                        },
                    ],
                },
                EngineProtocol {
                    name: "udp".to_string(),
                    ports: vec![EnginePort {
                        port: 123,
                        state: "open".to_string(),
                        service: Some("ntp".to_string()),
                        product: None,
                        version: None,
                    }],
                },
            ],
        }]
    }

    #[tokio::test]
    async fn normalizes_every_host_protocol_port_combination() {
        let dir = tempdir().unwrap();
        let scanner = Scanner::new(StaticEngine {
            hosts: sample_hosts(),
        });

        let records = scanner
            .scan("www.megacorpone.com", &["-sV".to_string()], dir.path())
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.subdomain == "www.megacorpone.com"));
        let filtered = records.iter().find(|r| r.port == 8080).unwrap();
        assert_eq!(filtered.name, "");
        assert_eq!(filtered.product, "");
        assert_eq!(filtered.version, "");
        assert_eq!(records.iter().filter(|r| r.protocol == "udp").count(), 1);

        // the canonical file reflects exactly what was returned
        let restored = storage::read_scan_csv(&storage::scan_file_path(dir.path())).unwrap();
        assert_eq!(restored, records);
    }

    #[tokio::test]
    async fn engine_failure_yields_empty_set_and_no_file() {
        let dir = tempdir().unwrap();
        let scanner = Scanner::new(FailingEngine);

        let records = scanner
            .scan("unreachable.example.com", &["-sS".to_string()], dir.path())
            .await
            .unwrap();

        assert!(records.is_empty());
        assert!(!storage::scan_file_path(dir.path()).exists());
    }

    #[tokio::test]
    async fn empty_engine_output_skips_the_write() {
        let dir = tempdir().unwrap();
        let scanner = Scanner::new(StaticEngine { hosts: Vec::new() });

        let records = scanner
            .scan("quiet.example.com", &["-sT".to_string()], dir.path())
            .await
            .unwrap();

        assert!(records.is_empty());
        assert!(!storage::scan_file_path(dir.path()).exists());
    }

    #[tokio::test]
    async fn blank_target_is_rejected() {
        let dir = tempdir().unwrap();
        let scanner = Scanner::new(StaticEngine {
            hosts: sample_hosts(),
        });

        let err = scanner
            .scan("   ", &["-sV".to_string()], dir.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }
}
