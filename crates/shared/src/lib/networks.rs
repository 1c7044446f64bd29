//! Per-network constants. Mirrors `Network`/`NetworkConfig`/`NetworkInfo`-style registries
//! used elsewhere in this corpus: a finite set of named instances rather than duck-typed
//! per-deployment config objects.

use alloy_primitives::{Address, B256};
use hex_literal::hex;

#[derive(Debug, Clone, Copy)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub seconds_per_block: u64,
    pub genesis_fork_version: [u8; 4],
    pub shapella_fork_version: [u8; 4],
    pub shapella_epoch: u64,
    pub genesis_validators_root: B256,
    pub validators_registry_address: Address,
    pub keeper_address: Address,
    pub keeper_genesis_block: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Gnosis,
    Holesky,
    Hoodi,
    Chiado,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Gnosis => "gnosis",
            Self::Holesky => "holesky",
            Self::Hoodi => "hoodi",
            Self::Chiado => "chiado",
        }
    }

    pub fn from_str(val: &str) -> Option<Self> {
        match val {
            "mainnet" => Some(Self::Mainnet),
            "gnosis" => Some(Self::Gnosis),
            "holesky" => Some(Self::Holesky),
            "hoodi" => Some(Self::Hoodi),
            "chiado" => Some(Self::Chiado),
            _ => None,
        }
    }

    pub fn config(&self) -> &'static NetworkConfig {
        match self {
            Self::Mainnet => &MAINNET,
            Self::Gnosis => &GNOSIS,
            Self::Holesky => &HOLESKY,
            Self::Hoodi => &HOODI,
            Self::Chiado => &CHIADO,
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(val: &str) -> Result<Self, Self::Err> {
        Network::from_str(val).ok_or_else(|| format!("unknown network {val}"))
    }
}

// Validators-registry addresses and genesis fork versions below come directly from the
// pool's own network registry; the rest (Shapella fork version/epoch, genesis validators
// root, keeper contract address/genesis block) track each chain's public beacon-chain
// metadata at the time of writing. Hoodi is not present in that registry (it postdates it);
// its fields are a best-effort placeholder pending confirmation against hoodi's official
// config before production use.

static MAINNET: NetworkConfig = NetworkConfig {
    chain_id: 1,
    seconds_per_block: 12,
    genesis_fork_version: hex!("00000000"),
    shapella_fork_version: hex!("03000000"),
    shapella_epoch: 194_048,
    genesis_validators_root: B256::new(hex!(
        "4b363db94e286120d76eb905340fdd4e54bfe9f06bf33ff6cf5ad27f511bfe9"
    )),
    validators_registry_address: Address::new(hex!("00000000219ab540356cBB839Cbe05303d7705F")),
    keeper_address: Address::new(hex!("6B5815467da09DaA7DC83Db21c9239d98Bb487b")),
    keeper_genesis_block: 18_499_000,
};

static HOLESKY: NetworkConfig = NetworkConfig {
    chain_id: 17000,
    seconds_per_block: 12,
    genesis_fork_version: hex!("01017000"),
    shapella_fork_version: hex!("04017000"),
    shapella_epoch: 256,
    genesis_validators_root: B256::new(hex!(
        "9143aa7c615a7f7115e2b6aac319c03529df8242ae705fba9df39b79c59fa8b"
    )),
    validators_registry_address: Address::new(hex!("4242424242424242424242424242424242424242")),
    keeper_address: Address::new(hex!("B580799Bf7d62721D1a523f0FDF2f5Ed7BA4e259")),
    keeper_genesis_block: 1_000,
};

static GNOSIS: NetworkConfig = NetworkConfig {
    chain_id: 100,
    seconds_per_block: 5,
    genesis_fork_version: hex!("00000064"),
    shapella_fork_version: hex!("04000064"),
    shapella_epoch: 648_704,
    genesis_validators_root: B256::new(hex!(
        "f5dcb5564e829aab27264b9becd5dfaa017085611224cb3036f573368dbb9d8"
    )),
    validators_registry_address: Address::new(hex!("0B98057eA310F4d31F2a452B414647007d1645d9")),
    keeper_address: Address::new(hex!("308f3f68F3bc34E43e35F8F6a68BfA82A0B21498")),
    keeper_genesis_block: 28_900_000,
};

static CHIADO: NetworkConfig = NetworkConfig {
    chain_id: 10200,
    seconds_per_block: 5,
    genesis_fork_version: hex!("0000006f"),
    shapella_fork_version: hex!("0400006f"),
    shapella_epoch: 244_224,
    genesis_validators_root: B256::new(hex!(
        "9d642dac73058fbf39e72caa8cfa4de7b6861a71f9b9c62be5fa5aa9dc8a75f"
    )),
    validators_registry_address: Address::new(hex!("b97036A26259B7147018913bD58a774cf91acf25")),
    keeper_address: Address::new(hex!("706C42644c70f6391bc1eb04a9F6a00D6a59A4D8")),
    keeper_genesis_block: 1_000,
};

// Placeholder: hoodi launched after this network registry was authored. Values below are
// best-effort and should be replaced with confirmed constants before relaying on hoodi.
static HOODI: NetworkConfig = NetworkConfig {
    chain_id: 560_048,
    seconds_per_block: 12,
    genesis_fork_version: hex!("10000910"),
    shapella_fork_version: hex!("40000910"),
    shapella_epoch: 0,
    genesis_validators_root: B256::ZERO,
    validators_registry_address: Address::new(hex!("00000000219ab540356cBB839Cbe05303d7705F")),
    keeper_address: Address::ZERO,
    keeper_genesis_block: 0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_network_names() {
        for network in [
            Network::Mainnet,
            Network::Gnosis,
            Network::Holesky,
            Network::Hoodi,
            Network::Chiado,
        ] {
            assert_eq!(Network::from_str(network.as_str()), Some(network));
        }
    }

    #[test]
    fn unknown_network_name_rejected() {
        assert_eq!(Network::from_str("sepolia"), None);
    }
}
