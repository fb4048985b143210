use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("ParseError: {reason}")]
pub struct ParseError {
    pub reason: String,
}

impl ParseError {
    pub fn new(reason: String) -> Self {
        ParseError { reason }
    }
}

/// Convert an ASN string to a u32, accepting asplain or asdot notation
/// E.g. "65000.100" -> 4259840100
pub fn asn_from_dotted(value: &str) -> Result<u32, ParseError> {
    let value = value.trim();
    match value.split_once('.') {
        Some((high, low)) => {
            let parse_half = |chunk: &str| {
                chunk
                    .parse::<u16>()
                    .map_err(|err| ParseError::new(format!("{} '{}'", err, value)))
            };
            let (high, low) = (parse_half(high)?, parse_half(low)?);
            Ok((u32::from(high) << 16) + u32::from(low))
        }
        None => value
            .parse::<u32>()
            .map_err(|err| ParseError::new(format!("{} '{}'", err, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asn_from_dotted() {
        assert_eq!(asn_from_dotted("100"), Ok(100));
        assert_eq!(asn_from_dotted("4259840100"), Ok(4259840100));
        assert_eq!(asn_from_dotted("65000.100"), Ok(4259840100));
        assert!(asn_from_dotted("70000.1").is_err());
        assert!(asn_from_dotted("AS65000").is_err());
    }
}
