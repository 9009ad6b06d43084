//! Move type identities: account addresses, struct tags and token types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::shared::errors::TypeTagError;

/// Normalized account address: `0x` prefix, lowercase, no leading zeros
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress(String);

impl AccountAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountAddress {
    type Err = TypeTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);
        if digits.is_empty() || digits.len() > 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeTagError::InvalidAddress(s.to_string()));
        }
        let trimmed = digits.trim_start_matches('0');
        let normalized = if trimmed.is_empty() { "0" } else { trimmed };
        Ok(AccountAddress(format!("0x{}", normalized.to_ascii_lowercase())))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A Move type argument
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Primitive(String),
    Vector(Box<TypeTag>),
    Struct(StructTag),
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Primitive(name) => f.write_str(name),
            TypeTag::Vector(inner) => write!(f, "vector<{}>", inner),
            TypeTag::Struct(tag) => write!(f, "{}", tag),
        }
    }
}

/// A fully qualified Move struct type, e.g. `0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructTag {
    pub address: AccountAddress,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl StructTag {
    /// Returns the struct type parameter at `index`, if it is a struct
    pub fn struct_param(&self, index: usize) -> Option<&StructTag> {
        match self.type_params.get(index) {
            Some(TypeTag::Struct(tag)) => Some(tag),
            _ => None,
        }
    }

    /// Struct name including generic arguments, as `type_info::struct_name` reports it
    pub fn full_name(&self) -> String {
        if self.type_params.is_empty() {
            return self.name.clone();
        }
        let params: Vec<String> = self.type_params.iter().map(|p| p.to_string()).collect();
        format!("{}<{}>", self.name, params.join(", "))
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.full_name())
    }
}

impl FromStr for StructTag {
    type Err = TypeTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = TagParser { input: s, pos: 0 };
        let tag = parser.struct_tag()?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(parser.error("trailing characters"));
        }
        Ok(tag)
    }
}

struct TagParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TagParser<'a> {
    fn error(&self, reason: &str) -> TypeTagError {
        TypeTagError::InvalidStructTag {
            tag: self.input.to_string(),
            reason: format!("{} at offset {}", reason, self.pos),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), TypeTagError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", token)))
        }
    }

    fn ident(&mut self) -> Result<&'a str, TypeTagError> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected identifier"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn struct_tag(&mut self) -> Result<StructTag, TypeTagError> {
        let address = self.ident()?.parse::<AccountAddress>()?;
        self.expect("::")?;
        let module = self.ident()?.to_string();
        self.expect("::")?;
        let name = self.ident()?.to_string();
        let mut type_params = Vec::new();
        if self.eat("<") {
            loop {
                type_params.push(self.type_tag()?);
                if self.eat(",") {
                    continue;
                }
                self.expect(">")?;
                break;
            }
        }
        Ok(StructTag {
            address,
            module,
            name,
            type_params,
        })
    }

    fn type_tag(&mut self) -> Result<TypeTag, TypeTagError> {
        self.skip_ws();
        if self.rest().starts_with("0x") {
            return Ok(TypeTag::Struct(self.struct_tag()?));
        }
        let start = self.pos;
        let word = self.ident()?;
        if word == "vector" {
            self.expect("<")?;
            let inner = self.type_tag()?;
            self.expect(">")?;
            return Ok(TypeTag::Vector(Box::new(inner)));
        }
        if self.rest().trim_start().starts_with("::") {
            // struct tag with a non-0x-prefixed address
            self.pos = start;
            return Ok(TypeTag::Struct(self.struct_tag()?));
        }
        Ok(TypeTag::Primitive(word.to_string()))
    }
}

/// On-chain identity of a coin type, as recorded by `0x1::type_info::TypeInfo`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenType {
    pub address: AccountAddress,
    pub module: String,
    pub name: String,
}

impl TokenType {
    /// Decodes a `TypeInfo` record whose module and struct names are hex-encoded bytes
    pub fn from_type_info(info: &TypeInfoRecord) -> Result<Self, TypeTagError> {
        Ok(Self {
            address: info.account_address.parse()?,
            module: decode_hex_name(&info.module_name)?,
            name: decode_hex_name(&info.struct_name)?,
        })
    }
}

impl From<&StructTag> for TokenType {
    fn from(tag: &StructTag) -> Self {
        Self {
            address: tag.address.clone(),
            module: tag.module.clone(),
            name: tag.full_name(),
        }
    }
}

impl FromStr for TokenType {
    type Err = TypeTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag: StructTag = s.parse()?;
        Ok(TokenType::from(&tag))
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)
    }
}

impl Serialize for TokenType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw `0x1::type_info::TypeInfo` as returned by the ledger
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TypeInfoRecord {
    pub account_address: String,
    pub module_name: String,
    pub struct_name: String,
}

fn decode_hex_name(encoded: &str) -> Result<String, TypeTagError> {
    let digits = encoded.strip_prefix("0x").unwrap_or(encoded);
    let bytes = hex::decode(digits).map_err(|_| TypeTagError::InvalidHexName(encoded.to_string()))?;
    String::from_utf8(bytes).map_err(|_| TypeTagError::InvalidHexName(encoded.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_normalization() {
        let addr: AccountAddress = "0x0001".parse().unwrap();
        assert_eq!(addr.as_str(), "0x1");
        let addr: AccountAddress = "0xABCdef".parse().unwrap();
        assert_eq!(addr.as_str(), "0xabcdef");
        assert!("0xzz".parse::<AccountAddress>().is_err());
        assert!("".parse::<AccountAddress>().is_err());
    }

    #[test]
    fn test_parse_nested_struct_tag() {
        let tag: StructTag = "0xbeef::dex::BasiqPoolV1<0x1::aptos_coin::AptosCoin, 0xcafe::coins::USDC>"
            .parse()
            .unwrap();
        assert_eq!(tag.address.as_str(), "0xbeef");
        assert_eq!(tag.module, "dex");
        assert_eq!(tag.name, "BasiqPoolV1");
        assert_eq!(tag.type_params.len(), 2);
        let x = tag.struct_param(0).unwrap();
        assert_eq!(x.to_string(), "0x1::aptos_coin::AptosCoin");
        let y = tag.struct_param(1).unwrap();
        assert_eq!(y.name, "USDC");
    }

    #[test]
    fn test_parse_generic_params() {
        let tag: StructTag =
            "0x1::coin::CoinStore<0xa::stable_curve_swap::LPToken<0x1::aptos_coin::AptosCoin,0xa::c::D>>"
                .parse()
                .unwrap();
        let lp = tag.struct_param(0).unwrap();
        assert_eq!(lp.type_params.len(), 2);
        assert_eq!(
            lp.full_name(),
            "LPToken<0x1::aptos_coin::AptosCoin, 0xa::c::D>"
        );

        let vec_tag: StructTag = "0x1::m::S<vector<u8>, u64>".parse().unwrap();
        assert_eq!(
            vec_tag.type_params,
            vec![
                TypeTag::Vector(Box::new(TypeTag::Primitive("u8".to_string()))),
                TypeTag::Primitive("u64".to_string()),
            ]
        );
    }

    #[test]
    fn test_reject_malformed_tags() {
        assert!("0x1::coin".parse::<StructTag>().is_err());
        assert!("0x1::coin::CoinStore<0x1::a::B".parse::<StructTag>().is_err());
        assert!("0x1::coin::CoinStore>".parse::<StructTag>().is_err());
    }

    #[test]
    fn test_token_type_from_type_info() {
        let info = TypeInfoRecord {
            account_address: "0x0000000000000000000000000000000000000000000000000000000000000001".to_string(),
            module_name: format!("0x{}", hex::encode("aptos_coin")),
            struct_name: format!("0x{}", hex::encode("AptosCoin")),
        };
        let token = TokenType::from_type_info(&info).unwrap();
        assert_eq!(token, "0x1::aptos_coin::AptosCoin".parse().unwrap());
    }
}
