use serde::Deserialize;
use serde_json::Value;

use crate::shared::errors::LedgerError;
use crate::shared::utils::de_u64;

/// Stable curve pool state as of the last reload; times are in microseconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableCurveSnapshot {
    pub reserve_x: u64,
    pub reserve_y: u64,
    pub initial_a: u64,
    pub future_a: u64,
    pub initial_a_time: u64,
    pub future_a_time: u64,
    /// Fee over `FEE_DENOMINATOR`
    pub fee: u64,
}

#[derive(Deserialize)]
struct CoinValue {
    #[serde(deserialize_with = "de_u64")]
    value: u64,
}

#[derive(Deserialize)]
struct StableCurvePoolRecord {
    reserve_x: CoinValue,
    reserve_y: CoinValue,
    #[serde(rename = "initial_A", deserialize_with = "de_u64")]
    initial_a: u64,
    #[serde(rename = "future_A", deserialize_with = "de_u64")]
    future_a: u64,
    #[serde(rename = "initial_A_time", deserialize_with = "de_u64")]
    initial_a_time: u64,
    #[serde(rename = "future_A_time", deserialize_with = "de_u64")]
    future_a_time: u64,
    #[serde(deserialize_with = "de_u64")]
    fee: u64,
}

pub struct StableCurveParser;

impl StableCurveParser {
    pub fn parse_pool_data(data: &Value) -> Result<StableCurveSnapshot, LedgerError> {
        let record =
            StableCurvePoolRecord::deserialize(data).map_err(|e| LedgerError::decode("StableCurvePoolInfo", e))?;
        if record.initial_a == 0 || record.future_a == 0 {
            return Err(LedgerError::decode("StableCurvePoolInfo", "amplification is zero"));
        }
        if record.fee > 1_000_000 {
            return Err(LedgerError::decode(
                "StableCurvePoolInfo",
                format!("fee {} exceeds the fee denominator", record.fee),
            ));
        }
        Ok(StableCurveSnapshot {
            reserve_x: record.reserve_x.value,
            reserve_y: record.reserve_y.value,
            initial_a: record.initial_a,
            future_a: record.future_a,
            initial_a_time: record.initial_a_time,
            future_a_time: record.future_a_time,
            fee: record.fee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_pool_data() {
        let data = json!({
            "disabled": false,
            "reserve_x": { "value": "100000000" },
            "reserve_y": { "value": "990000" },
            "initial_A": "50",
            "future_A": "100",
            "initial_A_time": "1660000000000000",
            "future_A_time": "1660086400000000",
            "fee": "3000",
            "dev_fee": "0",
            "x_scale": "1",
            "y_scale": "100"
        });
        let snapshot = StableCurveParser::parse_pool_data(&data).unwrap();
        assert_eq!(snapshot.reserve_y, 990_000);
        assert_eq!(snapshot.future_a, 100);
        assert_eq!(snapshot.future_a_time, 1_660_086_400_000_000);
        assert_eq!(snapshot.fee, 3000);
    }

    #[test]
    fn test_reject_zero_amplification() {
        let data = json!({
            "reserve_x": { "value": "1" },
            "reserve_y": { "value": "1" },
            "initial_A": "0",
            "future_A": "0",
            "initial_A_time": "0",
            "future_A_time": "0",
            "fee": "0"
        });
        assert!(matches!(
            StableCurveParser::parse_pool_data(&data),
            Err(LedgerError::Decode { .. })
        ));
    }
}
