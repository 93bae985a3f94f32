//! One poll cycle: fetch rules per source, probe everything concurrently,
//! diff against stored incident state, and dispatch the batched alerts.

use std::sync::Arc;

use chrono::Utc;
use futures::future;
use tracing::{debug, error};

use crate::config::Config;
use crate::incident::routing::{self, MessageBatches};
use crate::incident::{self, Persistence};
use crate::monitoring::{Fetch, Prober};
use crate::notifier::{Notifier, router};
use crate::rules::source::RuleSource;
use crate::rules::{self, Rule};
use crate::store::cache::StoreCache;

pub struct Monitor<F> {
    config: Config,
    prober: Prober<F>,
    source: Arc<dyn RuleSource>,
    notifier: Arc<dyn Notifier>,
    cache: StoreCache,
}

impl<F: Fetch> Monitor<F> {
    pub fn new(
        config: Config,
        prober: Prober<F>,
        source: Arc<dyn RuleSource>,
        notifier: Arc<dyn Notifier>,
        cache: StoreCache,
    ) -> Self {
        Self { config, prober, source, notifier, cache }
    }

    /// Run one full cycle over all configured rule sources. A source that
    /// fails to resolve is logged and skipped; the others still run.
    pub async fn poll(&mut self) {
        for origin in self.config.rule_sources.clone() {
            let records = match self.source.fetch_records(&origin).await {
                Ok(records) => records,
                Err(err) => {
                    error!("error fetching rules from {origin}: {err:#}");
                    continue;
                }
            };

            let parsed = rules::parse_rules(&records);
            debug!("checking {} rules from {origin}", parsed.len());
            self.run_rules(&parsed).await;
        }
    }

    async fn run_rules(&mut self, parsed: &[Rule]) {
        // Fan out every check, then wait for all of them to settle before
        // touching the incident state
        let outcomes =
            future::join_all(parsed.iter().map(|rule| self.prober.check(rule))).await;

        let now_ms = Utc::now().timestamp_millis();
        let mut batches = MessageBatches::new();

        for (rule, outcome) in parsed.iter().zip(&outcomes) {
            let evaluation = incident::evaluate(rule, self.cache.get(&rule.url), outcome, now_ms);

            match evaluation.persistence {
                Persistence::Upsert => self.cache.put(evaluation.record).await,
                Persistence::Delete => self.cache.delete(&rule.url).await,
                Persistence::None => {}
            }

            routing::route(
                rule.contact_bitfield,
                &self.config.contacts,
                &evaluation.messages,
                &mut batches,
            );
        }

        router::dispatch(self.notifier.as_ref(), batches).await;
    }

    pub fn cache(&self) -> &StoreCache {
        &self.cache
    }
}
