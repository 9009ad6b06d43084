use serde::Deserialize;
use serde_json::Value;

use crate::shared::errors::LedgerError;
use crate::shared::move_types::AccountAddress;
use crate::shared::utils::de_u64;

/// Basiq pool state as of the last reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasiqSnapshot {
    pub owner: AccountAddress,
    pub x_reserve: u64,
    pub y_reserve: u64,
    pub x_decimal_adjustment: u64,
    pub y_decimal_adjustment: u64,
    pub x_price: u64,
    pub y_price: u64,
    pub fee_bips: u64,
    pub rebate_bips: u64,
}

#[derive(Deserialize)]
struct CoinValue {
    #[serde(deserialize_with = "de_u64")]
    value: u64,
}

/// `dex::BasiqPoolV1` resource fields the quote math needs
#[derive(Deserialize)]
struct BasiqPoolRecord {
    x_reserve: CoinValue,
    y_reserve: CoinValue,
    #[serde(deserialize_with = "de_u64")]
    x_decimal_adjustment: u64,
    #[serde(deserialize_with = "de_u64")]
    y_decimal_adjustment: u64,
    #[serde(deserialize_with = "de_u64")]
    x_price: u64,
    #[serde(deserialize_with = "de_u64")]
    y_price: u64,
    #[serde(deserialize_with = "de_u64")]
    fee_bips: u64,
    #[serde(deserialize_with = "de_u64")]
    rebate_bips: u64,
}

/// Decoder for Basiq pool resources
pub struct BasiqParser;

impl BasiqParser {
    pub fn parse_pool_data(owner: &AccountAddress, data: &Value) -> Result<BasiqSnapshot, LedgerError> {
        let record = BasiqPoolRecord::deserialize(data).map_err(|e| LedgerError::decode("BasiqPoolV1", e))?;

        for (name, bips) in [("fee_bips", record.fee_bips), ("rebate_bips", record.rebate_bips)] {
            if bips > 10_000 {
                return Err(LedgerError::decode("BasiqPoolV1", format!("{} = {} exceeds 10000", name, bips)));
            }
        }
        if record.x_decimal_adjustment == 0 || record.y_decimal_adjustment == 0 {
            return Err(LedgerError::decode("BasiqPoolV1", "decimal adjustment is zero"));
        }

        Ok(BasiqSnapshot {
            owner: owner.clone(),
            x_reserve: record.x_reserve.value,
            y_reserve: record.y_reserve.value,
            x_decimal_adjustment: record.x_decimal_adjustment,
            y_decimal_adjustment: record.y_decimal_adjustment,
            x_price: record.x_price,
            y_price: record.y_price,
            fee_bips: record.fee_bips,
            rebate_bips: record.rebate_bips,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "x_reserve": { "value": "1000000" },
            "y_reserve": { "value": "3000000" },
            "x_decimal_adjustment": "100",
            "y_decimal_adjustment": "1",
            "x_price": "1000000",
            "y_price": "1000000",
            "fee_bips": "30",
            "rebate_bips": "10",
            "admin": "0xb1"
        })
    }

    #[test]
    fn test_parse_pool_data() {
        let owner: AccountAddress = "0xb1".parse().unwrap();
        let snapshot = BasiqParser::parse_pool_data(&owner, &sample()).unwrap();
        assert_eq!(snapshot.y_reserve, 3_000_000);
        assert_eq!(snapshot.x_decimal_adjustment, 100);
        assert_eq!(snapshot.rebate_bips, 10);
    }

    #[test]
    fn test_reject_invalid_records() {
        let owner: AccountAddress = "0xb1".parse().unwrap();
        let mut data = sample();
        data["fee_bips"] = json!("10001");
        assert!(matches!(
            BasiqParser::parse_pool_data(&owner, &data),
            Err(LedgerError::Decode { .. })
        ));

        let mut data = sample();
        data.as_object_mut().unwrap().remove("x_price");
        assert!(BasiqParser::parse_pool_data(&owner, &data).is_err());
    }
}
