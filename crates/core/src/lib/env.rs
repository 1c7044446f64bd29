use std::env;
use std::fmt::Debug;
use std::str::FromStr;

#[derive(Clone, Copy)]
pub struct EnvVarSpec {
    pub key: &'static str,
    pub sensitive: bool,
}

#[derive(Clone, Copy)]
pub struct EnvVarValue<TVal> {
    pub spec: &'static EnvVarSpec,
    pub value: TVal,
}

impl EnvVarSpec {
    pub fn default<TVal: FromStr>(&'static self, default: TVal) -> EnvVarValue<TVal> {
        let as_optional = self.optional();
        EnvVarValue {
            spec: as_optional.spec,
            value: as_optional.value.unwrap_or(default),
        }
    }

    pub fn optional<TVal: FromStr>(&'static self) -> EnvVarValue<Option<TVal>> {
        let value = match env::var(self.key) {
            Ok(val) => {
                let parsed = val
                    .parse()
                    .unwrap_or_else(|_e| panic!("Failed to parse env var {}", self.key));
                Some(parsed)
            }
            Err(e) => {
                tracing::debug!("Failed reading env var {}: {e:?}", self.key);
                None
            }
        };
        EnvVarValue { spec: self, value }
    }

    pub fn required<TVal: FromStr>(&'static self) -> EnvVarValue<TVal> {
        let raw_value = env::var(self.key).unwrap_or_else(|e| panic!("Failed to read env var {}: {e:?}", self.key));
        match raw_value.parse() {
            Ok(value) => EnvVarValue { spec: self, value },
            Err(_e) => {
                panic!("Failed to parse value {} for env var {}", raw_value, self.key)
            }
        }
    }

    pub fn map<TVal, Mapper>(&'static self, mapper: Mapper) -> EnvVarValue<TVal>
    where
        Mapper: Fn(&str) -> TVal,
    {
        let raw_value: String =
            env::var(self.key).unwrap_or_else(|e| panic!("Failed to read env var {}: {e:?}", self.key));
        let value = mapper(&raw_value);
        EnvVarValue { spec: self, value }
    }

    pub fn map_optional<TVal, Mapper>(&'static self, mapper: Mapper) -> EnvVarValue<Option<TVal>>
    where
        Mapper: Fn(&str) -> TVal,
    {
        let value = env::var(self.key).ok().map(|raw| mapper(&raw));
        EnvVarValue { spec: self, value }
    }
}

impl<TVal: Debug> Debug for EnvVarValue<TVal> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.spec.sensitive {
            f.write_str("***")
        } else {
            f.write_fmt(format_args!("{:?}", self.value))
        }
    }
}

/// Splits a comma-separated env var into a trimmed, non-empty list of endpoints.
pub fn split_csv_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_owned())
        .filter(|part| !part.is_empty())
        .collect()
}

pub const RELAYER_HOST: EnvVarSpec = EnvVarSpec {
    key: "RELAYER_HOST",
    sensitive: false,
};
pub const RELAYER_PORT: EnvVarSpec = EnvVarSpec {
    key: "RELAYER_PORT",
    sensitive: false,
};
pub const NETWORK: EnvVarSpec = EnvVarSpec {
    key: "NETWORK",
    sensitive: false,
};
pub const EXECUTION_ENDPOINT: EnvVarSpec = EnvVarSpec {
    key: "EXECUTION_ENDPOINT",
    sensitive: true,
};
pub const CONSENSUS_ENDPOINT: EnvVarSpec = EnvVarSpec {
    key: "CONSENSUS_ENDPOINT",
    sensitive: true,
};
pub const EXECUTION_TIMEOUT: EnvVarSpec = EnvVarSpec {
    key: "EXECUTION_TIMEOUT",
    sensitive: false,
};
pub const CONSENSUS_TIMEOUT: EnvVarSpec = EnvVarSpec {
    key: "CONSENSUS_TIMEOUT",
    sensitive: false,
};
pub const IPFS_TIMEOUT: EnvVarSpec = EnvVarSpec {
    key: "IPFS_TIMEOUT",
    sensitive: false,
};
pub const IPFS_FETCH_ENDPOINTS: EnvVarSpec = EnvVarSpec {
    key: "IPFS_FETCH_ENDPOINTS",
    sensitive: false,
};
pub const SIGNATURE_THRESHOLD: EnvVarSpec = EnvVarSpec {
    key: "SIGNATURE_THRESHOLD",
    sensitive: false,
};
pub const DATABASE: EnvVarSpec = EnvVarSpec {
    key: "DATABASE",
    sensitive: false,
};
pub const VALIDATOR_LIFETIME: EnvVarSpec = EnvVarSpec {
    key: "VALIDATOR_LIFETIME",
    sensitive: false,
};
pub const LOG_LEVEL: EnvVarSpec = EnvVarSpec {
    key: "LOG_LEVEL",
    sensitive: false,
};
pub const LOG_FORMAT: EnvVarSpec = EnvVarSpec {
    key: "LOG_FORMAT",
    sensitive: false,
};
pub const SENTRY_DSN: EnvVarSpec = EnvVarSpec {
    key: "SENTRY_DSN",
    sensitive: true,
};
pub const SENTRY_ENVIRONMENT: EnvVarSpec = EnvVarSpec {
    key: "SENTRY_ENVIRONMENT",
    sensitive: false,
};
pub const CONFIGURED_PUBLIC_KEYS_PATH: EnvVarSpec = EnvVarSpec {
    key: "CONFIGURED_PUBLIC_KEYS_PATH",
    sensitive: false,
};
pub const GENESIS_VALIDATORS_IPFS_HASH: EnvVarSpec = EnvVarSpec {
    key: "GENESIS_VALIDATORS_IPFS_HASH",
    sensitive: false,
};
pub const VALIDATORS_MANAGER_PRIVATE_KEY: EnvVarSpec = EnvVarSpec {
    key: "VALIDATORS_MANAGER_PRIVATE_KEY",
    sensitive: true,
};
pub const KEEPER_GENESIS_BLOCK: EnvVarSpec = EnvVarSpec {
    key: "KEEPER_GENESIS_BLOCK",
    sensitive: false,
};
pub const VALIDATORS_REGISTRY_ADDRESS: EnvVarSpec = EnvVarSpec {
    key: "VALIDATORS_REGISTRY_ADDRESS",
    sensitive: false,
};
pub const KEEPER_ADDRESS: EnvVarSpec = EnvVarSpec {
    key: "KEEPER_ADDRESS",
    sensitive: false,
};
pub const PROMETHEUS_NAMESPACE: EnvVarSpec = EnvVarSpec {
    key: "PROMETHEUS_NAMESPACE",
    sensitive: false,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims_csv_list() {
        let parsed = split_csv_list(" https://a.example , https://b.example ,, ");
        assert_eq!(parsed, vec!["https://a.example", "https://b.example"]);
    }
}
