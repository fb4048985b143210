use std::iter;
use std::ops::RangeInclusive;

use itertools::Itertools;

use super::ParseError;

/// String with bracketed numeric groups, E.g. "42[1,2]00000[1-9]"
///
/// Each group is a comma separated list of numbers and inclusive ranges.
/// Expansion yields the Cartesian product of all groups, the leftmost group
/// varying slowest.
#[derive(Clone, Debug, PartialEq)]
pub struct AsnPattern {
    // Literal text preceding each group, with the group's ranges
    groups: Vec<(String, Vec<RangeInclusive<u32>>)>,
    tail: String,
}

impl AsnPattern {
    pub fn parse(pattern: &str) -> Result<Self, ParseError> {
        let mut groups = Vec::new();
        let mut rest = pattern.trim();
        while let Some(open) = rest.find('[') {
            let lead = &rest[..open];
            if lead.contains(']') {
                return Err(ParseError::new(format!("Unbalanced ']' in '{}'", pattern)));
            }
            let close = rest[open..]
                .find(']')
                .map(|i| open + i)
                .ok_or_else(|| ParseError::new(format!("Unclosed '[' in '{}'", pattern)))?;
            let ranges = parse_numeric_group(&rest[open + 1..close], pattern)?;
            groups.push((lead.to_string(), ranges));
            rest = &rest[close + 1..];
        }
        if rest.contains(']') {
            return Err(ParseError::new(format!("Unbalanced ']' in '{}'", pattern)));
        }
        Ok(Self {
            groups,
            tail: rest.to_string(),
        })
    }

    /// Number of strings the pattern expands to, `None` past `u64::MAX`
    pub fn len(&self) -> Option<u64> {
        self.groups.iter().try_fold(1u64, |total, (_, ranges)| {
            let size = ranges
                .iter()
                .try_fold(0u64, |sum, r| sum.checked_add(u64::from(r.end() - r.start()) + 1))?;
            total.checked_mul(size)
        })
    }

    /// True when some group holds no values
    pub fn is_empty(&self) -> bool {
        self.groups.iter().any(|(_, ranges)| ranges.is_empty())
    }

    /// Lazily produce every expansion, in order
    pub fn iter(&self) -> Box<dyn Iterator<Item = String> + '_> {
        if self.groups.is_empty() {
            return Box::new(iter::once(self.tail.clone()));
        }
        Box::new(
            self.groups
                .iter()
                .map(|(_, ranges)| ranges.iter().flat_map(|r| r.clone()))
                .multi_cartesian_product()
                .map(move |combination| {
                    let mut expanded = String::new();
                    for ((lead, _), value) in self.groups.iter().zip(combination) {
                        expanded.push_str(lead);
                        expanded.push_str(&value.to_string());
                    }
                    expanded.push_str(&self.tail);
                    expanded
                }),
        )
    }
}

// "1-3,7" -> [1..=3, 7..=7]
fn parse_numeric_group(
    group: &str,
    pattern: &str,
) -> Result<Vec<RangeInclusive<u32>>, ParseError> {
    let number = |value: &str| {
        value
            .trim()
            .parse::<u32>()
            .map_err(|err| ParseError::new(format!("{} '{}' in '{}'", err, value, pattern)))
    };
    let mut ranges = Vec::new();
    for part in group.split(',') {
        match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (number(start)?, number(end)?);
                if start > end {
                    return Err(ParseError::new(format!(
                        "Descending range '{}' in '{}'",
                        part, pattern
                    )));
                }
                ranges.push(start..=end);
            }
            None => {
                let value = number(part)?;
                ranges.push(value..=value);
            }
        }
    }
    Ok(ranges)
}

/// Expand every bracketed group in `pattern`
pub fn expand_pattern(pattern: &str) -> Result<Vec<String>, ParseError> {
    Ok(AsnPattern::parse(pattern)?.iter().collect())
}

/// Expand `pattern` into the ASNs it describes
pub fn expand_asns(pattern: &str) -> Result<Vec<u32>, ParseError> {
    AsnPattern::parse(pattern)?
        .iter()
        .map(|asn| {
            asn.parse::<u32>()
                .map_err(|err| ParseError::new(format!("{} '{}'", err, asn)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_range() {
        assert_eq!(expand_asns("[1-9]").unwrap(), (1..=9).collect::<Vec<u32>>());
    }

    #[test]
    fn test_expand_list() {
        assert_eq!(expand_asns("[1,4]").unwrap(), vec![1, 4]);
        assert_eq!(expand_asns("[1-3,7]").unwrap(), vec![1, 2, 3, 7]);
    }

    #[test]
    fn test_expand_nested_groups() {
        let mut expected: Vec<u32> = (421000001..=421000009).collect();
        expected.extend(422000001..=422000009);
        assert_eq!(expand_asns("42[1,2]00000[1-9]").unwrap(), expected);
        assert_eq!(
            AsnPattern::parse("42[1,2]00000[1-9]").unwrap().len(),
            Some(18)
        );
        assert_eq!(AsnPattern::parse("65000").unwrap().len(), Some(1));
    }

    #[test]
    fn test_expand_strings() {
        assert_eq!(
            expand_pattern("as[1-2]-edge").unwrap(),
            vec!["as1-edge", "as2-edge"]
        );
        assert_eq!(expand_pattern("65000").unwrap(), vec!["65000"]);
    }

    #[test]
    fn test_expansion_is_lazy() {
        let pattern = AsnPattern::parse("[0-4294967295]").unwrap();
        let first: Vec<_> = pattern.iter().take(2).collect();
        assert_eq!(first, vec!["0", "1"]);
    }

    #[test]
    fn test_len_past_u64() {
        let pattern = AsnPattern::parse("[0-4294967295][0-4294967295]").unwrap();
        assert_eq!(pattern.len(), None);
        assert!(!pattern.is_empty());
        let pattern = AsnPattern::parse("[0-4294967295][0-4294967294]").unwrap();
        assert_eq!(pattern.len(), Some((1 << 32) * ((1 << 32) - 1)));
        assert_eq!(pattern.iter().next().as_deref(), Some("00"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(AsnPattern::parse("[1-9").is_err());
        assert!(AsnPattern::parse("1-9]").is_err());
        assert!(AsnPattern::parse("[]").is_err());
        assert!(AsnPattern::parse("[9-1]").is_err());
        assert!(AsnPattern::parse("[a-c]").is_err());
        assert!(AsnPattern::parse("[1,,2]").is_err());
    }
}
