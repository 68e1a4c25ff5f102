use crate::config::DomainEntry;
use crate::errors::DomainError;
use fancy_regex::Regex;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// How a configured entry matches a queried name.
///
/// `Exact` holds a lowercased dotted name and compares the whole string.
/// `Pattern` holds a regex compiled with `^(?:…)$` anchors, so only a
/// full-name match counts — suffix matching must be spelled out in the
/// pattern itself.
#[derive(Debug, Clone)]
pub enum NamePattern {
    Exact(Arc<str>),
    Pattern(Regex),
}

impl NamePattern {
    pub fn exact(name: &str) -> Self {
        let normalized = name.trim_end_matches('.').to_ascii_lowercase();
        NamePattern::Exact(Arc::from(normalized.as_str()))
    }

    pub fn pattern(pattern: &str) -> Result<Self, DomainError> {
        let anchored = format!("^(?:{})$", pattern);
        let regex = Regex::new(&anchored)
            .map_err(|e| DomainError::InvalidPattern(pattern.to_string(), e.to_string()))?;
        Ok(NamePattern::Pattern(regex))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Exact(exact) => exact.as_ref() == name,
            NamePattern::Pattern(regex) => regex.is_match(name).unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DomainRecord {
    pub pattern: NamePattern,
    pub address: Ipv4Addr,
}

impl DomainRecord {
    pub fn new(pattern: NamePattern, address: Ipv4Addr) -> Self {
        Self { pattern, address }
    }

    pub fn from_entry(entry: &DomainEntry) -> Result<Self, DomainError> {
        let address: Ipv4Addr = entry
            .address
            .parse()
            .map_err(|_| DomainError::InvalidIpAddress(entry.address.clone()))?;

        let pattern = match (&entry.name, &entry.pattern) {
            (Some(name), None) => NamePattern::exact(name),
            (None, Some(pattern)) => NamePattern::pattern(pattern)?,
            _ => {
                return Err(DomainError::InvalidEntry(
                    "exactly one of `name` or `pattern` must be set".to_string(),
                ))
            }
        };

        Ok(Self { pattern, address })
    }
}

/// Ordered table of domain records. Entry order is match precedence:
/// `lookup` returns the first record whose pattern matches.
#[derive(Debug, Clone, Default)]
pub struct DomainTable {
    records: Vec<DomainRecord>,
}

impl DomainTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DomainRecord) {
        self.records.push(record);
    }

    pub fn lookup(&self, name: &str) -> Option<&DomainRecord> {
        let name = name.trim_end_matches('.');
        self.records.iter().find(|r| r.pattern.matches(name))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn build_domain_table(entries: &[DomainEntry]) -> Result<DomainTable, DomainError> {
    let mut table = DomainTable::new();
    for entry in entries {
        table.push(DomainRecord::from_entry(entry)?);
    }
    Ok(table)
}
