use anyhow;
use prometheus::{
    core::{Atomic, AtomicU64, GenericCounterVec, GenericGauge, GenericGaugeVec},
    HistogramVec, IntCounterVec, Opts, Registry,
};

pub mod outcome {
    pub const ACCEPTED: &str = "accepted";
    pub const IDEMPOTENT_SKIP: &str = "idempotent_skip";
    pub const THRESHOLD_REACHED: &str = "threshold_reached";
    pub const INVALID_SIGNATURE: &str = "invalid_signature";
    pub const SUCCESS: &str = "success";
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

pub mod share_kind {
    pub const EXIT: &str = "exit";
    pub const DEPOSIT: &str = "deposit";
}

pub mod protocol {
    pub const EXECUTION: &str = "execution";
    pub const CONSENSUS: &str = "consensus";
    pub const IPFS: &str = "ipfs";
}

pub trait Registar {
    fn register_on(&self, registry: &Registry) -> anyhow::Result<()>;
}

pub type UIntGauge = GenericGauge<AtomicU64>;
pub type UIntGaugeVec = GenericGaugeVec<AtomicU64>;
pub type UIntCounterVec = GenericCounterVec<AtomicU64>;

#[derive(Clone)]
pub struct Metrics {
    pub metadata: Metadata,
    pub http: Http,
    pub shares: Shares,
    pub chain: Chain,
    pub adapters: Adapters,
}

impl Registar for Metrics {
    fn register_on(&self, registry: &Registry) -> anyhow::Result<()> {
        self.metadata.register_on(registry)?;
        self.http.register_on(registry)?;
        self.shares.register_on(registry)?;
        self.chain.register_on(registry)?;
        self.adapters.register_on(registry)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct Metadata {
    pub network_chain: UIntGaugeVec,
    pub app_build_info: UIntGaugeVec,
}

impl Registar for Metadata {
    fn register_on(&self, registry: &Registry) -> anyhow::Result<()> {
        registry.register(Box::new(self.network_chain.clone()))?;
        registry.register(Box::new(self.app_build_info.clone()))?;
        Ok(())
    }
}

/// HTTP endpoint request counters, labelled by endpoint and outcome (see [`outcome`]).
#[derive(Clone)]
pub struct Http {
    pub requests_total: UIntCounterVec,
}

impl Registar for Http {
    fn register_on(&self, registry: &Registry) -> anyhow::Result<()> {
        registry.register(Box::new(self.requests_total.clone()))?;
        Ok(())
    }
}

/// Share-submission counters, labelled by kind (see [`share_kind`]) and outcome (see [`outcome`]).
#[derive(Clone)]
pub struct Shares {
    pub submissions_total: UIntCounterVec,
}

impl Registar for Shares {
    fn register_on(&self, registry: &Registry) -> anyhow::Result<()> {
        registry.register(Box::new(self.submissions_total.clone()))?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct Chain {
    pub last_processed_block: UIntGauge,
    pub protocol_config_checkpoint_block: UIntGauge,
    pub registry_size: UIntGauge,
    pub oracle_committee_size: UIntGauge,
}

impl Registar for Chain {
    fn register_on(&self, registry: &Registry) -> anyhow::Result<()> {
        registry.register(Box::new(self.last_processed_block.clone()))?;
        registry.register(Box::new(self.protocol_config_checkpoint_block.clone()))?;
        registry.register(Box::new(self.registry_size.clone()))?;
        registry.register(Box::new(self.oracle_committee_size.clone()))?;
        Ok(())
    }
}

/// Tick duration and external-adapter call latency, labelled by protocol (see [`protocol`]).
#[derive(Clone)]
pub struct Adapters {
    pub tick_duration_seconds: HistogramVec,
    pub call_duration_seconds: HistogramVec,
    pub call_errors_total: UIntCounterVec,
}

impl Registar for Adapters {
    fn register_on(&self, registry: &Registry) -> anyhow::Result<()> {
        registry.register(Box::new(self.tick_duration_seconds.clone()))?;
        registry.register(Box::new(self.call_duration_seconds.clone()))?;
        registry.register(Box::new(self.call_errors_total.clone()))?;
        Ok(())
    }
}

fn gauge_vec<TVal: Atomic>(namespace: &str, name: &str, help: &str, labels: &[&str]) -> GenericGaugeVec<TVal> {
    let opts = Opts::new(name, help).namespace(namespace.to_string());
    GenericGaugeVec::new(opts, labels).unwrap()
}

fn gauge<TVal: Atomic>(namespace: &str, name: &str, help: &str) -> GenericGauge<TVal> {
    let opts = Opts::new(name, help).namespace(namespace.to_string());
    GenericGauge::with_opts(opts).unwrap()
}

fn counter_vec<TVal: Atomic>(namespace: &str, name: &str, help: &str, labels: &[&str]) -> GenericCounterVec<TVal> {
    let opts = Opts::new(name, help).namespace(namespace.to_string());
    GenericCounterVec::new(opts, labels).unwrap()
}

fn histogram_vec(namespace: &str, name: &str, help: &str, labels: &[&str]) -> HistogramVec {
    let opts = prometheus::HistogramOpts::new(name, help).namespace(namespace.to_string());
    HistogramVec::new(opts, labels).unwrap()
}

impl Metrics {
    pub fn new(namespace: &str) -> Self {
        let metadata = Metadata {
            network_chain: gauge_vec(namespace, "metadata__network_chain", "Configured chain ID", &["chain_name"]),
            app_build_info: gauge_vec(namespace, "metadata__app_build_info", "Application build info", &["version"]),
        };

        let http = Http {
            requests_total: counter_vec(
                namespace,
                "http__requests_total",
                "HTTP requests by endpoint and outcome",
                &["endpoint", "outcome"],
            ),
        };

        let shares = Shares {
            submissions_total: counter_vec(
                namespace,
                "shares__submissions_total",
                "Share submissions by kind and outcome",
                &["kind", "outcome"],
            ),
        };

        let chain = Chain {
            last_processed_block: gauge(
                namespace,
                "chain__last_processed_block",
                "Last execution block scanned for deposit events",
            ),
            protocol_config_checkpoint_block: gauge(
                namespace,
                "chain__protocol_config_checkpoint_block",
                "Last execution block scanned for keeper config updates",
            ),
            registry_size: gauge(namespace, "chain__registry_size", "Number of validators held in the registry"),
            oracle_committee_size: gauge(
                namespace,
                "chain__oracle_committee_size",
                "Size of the current oracle committee",
            ),
        };

        let adapters = Adapters {
            tick_duration_seconds: histogram_vec(
                namespace,
                "adapters__tick_duration_seconds",
                "Periodic task tick duration",
                &["task"],
            ),
            call_duration_seconds: histogram_vec(
                namespace,
                "adapters__call_duration_seconds",
                "External adapter call latency",
                &["protocol", "operation"],
            ),
            call_errors_total: counter_vec(
                namespace,
                "adapters__call_errors_total",
                "External adapter call errors",
                &["protocol", "operation"],
            ),
        };

        Metrics {
            metadata,
            http,
            shares,
            chain,
            adapters,
        }
    }
}
