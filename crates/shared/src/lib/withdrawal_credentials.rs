use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidatorType {
    #[serde(rename = "0x01")]
    V1,
    #[serde(rename = "0x02")]
    V2,
}

impl ValidatorType {
    fn prefix(&self) -> u8 {
        match self {
            ValidatorType::V1 => 0x01,
            ValidatorType::V2 => 0x02,
        }
    }
}

/// `prefix(1) || zero-padding(11) || vault address(20)`.
pub fn derive(validator_type: ValidatorType, vault: Address) -> B256 {
    let mut out = [0u8; 32];
    out[0] = validator_type.prefix();
    out[12..32].copy_from_slice(vault.as_slice());
    B256::from(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_and_v2_differ_only_in_prefix() {
        let vault = Address::repeat_byte(0xAB);
        let v1 = derive(ValidatorType::V1, vault);
        let v2 = derive(ValidatorType::V2, vault);
        assert_eq!(v1.as_slice()[0], 0x01);
        assert_eq!(v2.as_slice()[0], 0x02);
        assert_eq!(&v1.as_slice()[1..], &v2.as_slice()[1..]);
        assert_eq!(&v1.as_slice()[12..32], vault.as_slice());
    }
}
