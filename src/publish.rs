//! Best-effort delivery of finished items to external sinks.
//!
//! A sink receives the newest items of the run one at a time. Sinks are
//! independent: a failing delivery is recorded in that sink's
//! [`SinkReport`] and never stops the remaining items or the other sinks.
//! Nothing is retried.
//!
//! # Sinks
//!
//! | Sink | Transport | Payload |
//! |------|-----------|---------|
//! | [`WebhookSink`] | HTTP `POST` | one [`Item`] as JSON per request |

use crate::error::{BeatError, Result};
use crate::models::Item;
use crate::utils::{host_of, truncate_for_log};
use std::time::Duration;
use tracing::{info, instrument, warn};
use url::Url;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(15);

/// A consumer of finished items.
pub trait Sink {
    /// Label used in logs and reports.
    fn name(&self) -> &str;

    async fn deliver(&self, item: &Item) -> Result<()>;
}

/// Outcome of publishing to one sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub sink: String,
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    pub last_error: Option<String>,
}

/// POSTs each item as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(url: &str, client: reqwest::Client) -> Result<Self> {
        let parsed = Url::parse(url.trim())?;
        let host = host_of(parsed.as_str());
        Ok(Self {
            name: if host.is_empty() { parsed.to_string() } else { host },
            url: parsed.to_string(),
            client,
        })
    }
}

impl Sink for WebhookSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, item: &Item) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .timeout(DELIVERY_TIMEOUT)
            .json(item)
            .send()
            .await
            .map_err(|source| BeatError::Http {
                url: self.url.clone(),
                source,
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(BeatError::Sink {
            sink: self.name.clone(),
            reason: format!("HTTP {}: {}", status.as_u16(), truncate_for_log(&body, 200)),
        })
    }
}

/// Build one webhook sink per valid URL; invalid URLs are logged and skipped.
pub fn webhook_sinks(urls: &[String], client: &reqwest::Client) -> Vec<WebhookSink> {
    urls.iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .filter_map(|u| match WebhookSink::new(u, client.clone()) {
            Ok(sink) => Some(sink),
            Err(e) => {
                warn!(url = %u, error = %e, "Ignoring webhook URL");
                None
            }
        })
        .collect()
}

/// Deliver the first `limit` items to every sink, in order.
#[instrument(level = "info", skip_all, fields(sinks = sinks.len(), limit = limit))]
pub async fn publish_items<S: Sink>(sinks: &[S], items: &[Item], limit: usize) -> Vec<SinkReport> {
    let batch = &items[..limit.min(items.len())];
    let mut reports = Vec::with_capacity(sinks.len());

    for sink in sinks {
        let mut report = SinkReport {
            sink: sink.name().to_string(),
            ..Default::default()
        };
        for item in batch {
            report.attempted += 1;
            match sink.deliver(item).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(sink = %report.sink, link = %item.link, error = %e, "Delivery failed");
                    report.failed += 1;
                    report.last_error = Some(e.to_string());
                }
            }
        }
        info!(
            sink = %report.sink,
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            "Published items"
        );
        reports.push(report);
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeSink {
        name: String,
        reject_title: Option<&'static str>,
        received: RefCell<Vec<String>>,
    }

    impl FakeSink {
        fn new(name: &str, reject_title: Option<&'static str>) -> Self {
            Self {
                name: name.to_string(),
                reject_title,
                received: RefCell::new(Vec::new()),
            }
        }
    }

    impl Sink for FakeSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn deliver(&self, item: &Item) -> Result<()> {
            if self.reject_title == Some(item.title.as_str()) {
                return Err(BeatError::Sink {
                    sink: self.name.clone(),
                    reason: "HTTP 500: boom".to_string(),
                });
            }
            self.received.borrow_mut().push(item.title.clone());
            Ok(())
        }
    }

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item {
                source: "CDC".to_string(),
                title: format!("t{i}"),
                link: format!("https://cdc.gov/{i}"),
                summary: String::new(),
                date: String::new(),
                image: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_sink() {
        let sinks = vec![FakeSink::new("flaky", Some("t1")), FakeSink::new("steady", None)];
        let reports = publish_items(&sinks, &items(5), 3).await;

        assert_eq!(
            reports[0],
            SinkReport {
                sink: "flaky".to_string(),
                attempted: 3,
                delivered: 2,
                failed: 1,
                last_error: Some("sink flaky rejected item: HTTP 500: boom".to_string()),
            }
        );
        assert_eq!(*sinks[0].received.borrow(), vec!["t0", "t2"]);
        assert_eq!(reports[1].delivered, 3);
        assert_eq!(reports[1].last_error, None);
    }

    #[tokio::test]
    async fn test_limit_larger_than_items() {
        let sinks = vec![FakeSink::new("one", None)];
        let reports = publish_items(&sinks, &items(2), 10).await;
        assert_eq!(reports[0].attempted, 2);
    }

    #[tokio::test]
    async fn test_no_sinks_no_reports() {
        let sinks: Vec<FakeSink> = Vec::new();
        assert!(publish_items(&sinks, &items(2), 10).await.is_empty());
    }

    #[test]
    fn test_webhook_sinks_skip_invalid() {
        let client = reqwest::Client::new();
        let urls = vec![
            "https://hooks.example.com/beat".to_string(),
            " ".to_string(),
            "not a url".to_string(),
        ];
        let sinks = webhook_sinks(&urls, &client);
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks[0].name(), "hooks.example.com");
    }
}
