//! Probe descriptors: the samples a probe kind collects

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::debug;

use crate::SampleMap;

/// How a sample evolves over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Counter,
    Gauge,
    Derive,
    Absolute,
}

/// One named sample a probe collects.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SampleDesc<K> {
    /// Name the sample is stored under.
    pub name: String,

    pub kind: SampleKind,

    /// Key the parser reports this sample as. Samples without a collect
    /// key are computed downstream and never expected from a collection.
    pub collect_key: Option<K>,
}

/// Describes a probe kind: its identity and the samples it collects.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProbeDesc<K> {
    pub name: String,

    pub probe_name: String,

    #[serde(default = "Vec::new")]
    samples: Vec<SampleDesc<K>>,
}

impl<K: Eq + Hash> ProbeDesc<K> {
    pub fn new(name: impl Into<String>, probe_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            probe_name: probe_name.into(),
            samples: Vec::new(),
        }
    }

    pub fn add(&mut self, sample: SampleDesc<K>) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[SampleDesc<K>] {
        &self.samples
    }

    /// Collect-key to sample-name mapping.
    pub fn collect_mapping(&self) -> HashMap<&K, &str> {
        self.samples
            .iter()
            .filter_map(|sample| {
                sample
                    .collect_key
                    .as_ref()
                    .map(|key| (key, sample.name.as_str()))
            })
            .collect()
    }

    /// Rename raw collected samples to the names they are stored under.
    ///
    /// Entries the descriptor does not map are dropped with a debug log.
    pub fn translate(&self, raw: &SampleMap<K>) -> SampleMap<String>
    where
        K: fmt::Debug,
    {
        let mapping = self.collect_mapping();
        let mut translated = SampleMap::with_capacity(raw.len());
        for (key, value) in raw {
            match mapping.get(key) {
                Some(name) => {
                    translated.insert((*name).to_string(), *value);
                }
                None => debug!("dropped entry: {key:?}"),
            }
        }
        translated
    }
}
