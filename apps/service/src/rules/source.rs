//! Rule retrieval. Rules are published as DNS TXT records, one rule per
//! record; a record split across multiple character-strings is rejoined
//! without separators.

use anyhow::Result;
use async_trait::async_trait;
use trust_dns_resolver::TokioAsyncResolver;

/// Source of raw rule records for one configured origin.
#[async_trait]
pub trait RuleSource: Send + Sync {
    async fn fetch_records(&self, source: &str) -> Result<Vec<String>>;
}

pub struct DnsTxtSource {
    resolver: TokioAsyncResolver,
}

impl DnsTxtSource {
    pub fn from_system_conf() -> Result<Self> {
        Ok(Self { resolver: TokioAsyncResolver::tokio_from_system_conf()? })
    }
}

#[async_trait]
impl RuleSource for DnsTxtSource {
    async fn fetch_records(&self, source: &str) -> Result<Vec<String>> {
        let lookup = self.resolver.txt_lookup(source).await?;

        Ok(lookup
            .iter()
            .map(|txt| {
                txt.iter()
                    .map(|segment| String::from_utf8_lossy(segment).into_owned())
                    .collect::<String>()
            })
            .collect())
    }
}
