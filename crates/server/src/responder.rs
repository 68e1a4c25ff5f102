use crate::wire::query::{parse_query, DecodedQuery};
use crate::wire::response::{encode_response, ResponseOutcome};
use crate::wire::{TYPE_A, TYPE_ALL};
use arc_swap::ArcSwap;
use captive_dns_domain::{DomainRecord, DomainTable};
use std::sync::Arc;
use tracing::debug;

/// Per-datagram protocol engine: decode, match, encode.
///
/// Holds no per-request state; the only shared state is the domain table,
/// read through an `ArcSwap` so [`DnsResponder::add_domain`] can swap in a
/// rebuilt table between requests without touching an in-flight lookup.
pub struct DnsResponder {
    table: ArcSwap<DomainTable>,
    ttl: u32,
    ignore_unknown: bool,
}

impl DnsResponder {
    pub fn new(table: DomainTable, ttl: u32, ignore_unknown: bool) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
            ttl,
            ignore_unknown,
        }
    }

    /// Extends the served table with one more record. Existing records keep
    /// their precedence; the new record matches last.
    pub fn add_domain(&self, record: DomainRecord) {
        let mut next = DomainTable::clone(&self.table.load());
        next.push(record);
        self.table.store(Arc::new(next));
    }

    /// Handles one inbound datagram and returns the reply bytes, or `None`
    /// when the datagram must be dropped silently. Never panics on malformed
    /// input.
    pub fn handle_packet(&self, datagram: &[u8]) -> Option<Vec<u8>> {
        let query = match parse_query(datagram) {
            Ok(query) => query,
            Err(e) => {
                debug!(error = %e, len = datagram.len(), "dropping undecodable datagram");
                return None;
            }
        };

        let outcome = self.resolve(&query);
        encode_response(datagram, &query, &outcome, self.ttl)
    }

    fn resolve(&self, query: &DecodedQuery) -> ResponseOutcome {
        // Type check comes first: a type-mismatch reply needs no lookup.
        if query.query_type != TYPE_A && query.query_type != TYPE_ALL {
            debug!(name = %query.name, query_type = query.query_type, "unsupported query type");
            return ResponseOutcome::NotImplemented;
        }

        let table = self.table.load();
        match table.lookup(&query.name) {
            Some(record) => {
                debug!(name = %query.name, address = %record.address, "answering");
                ResponseOutcome::Answered(record.address)
            }
            None if self.ignore_unknown => {
                debug!(name = %query.name, "unknown name, ignoring");
                ResponseOutcome::Ignored
            }
            None => {
                debug!(name = %query.name, "unknown name, answering NXDOMAIN");
                ResponseOutcome::NoSuchName
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::query::build_query;
    use captive_dns_domain::NamePattern;

    fn test_table() -> DomainTable {
        let mut table = DomainTable::new();
        table.push(DomainRecord::new(
            NamePattern::exact("ya.com"),
            "192.168.5.1".parse().unwrap(),
        ));
        table.push(DomainRecord::new(
            NamePattern::pattern(r".*\.portal\.lan").unwrap(),
            "10.0.0.1".parse().unwrap(),
        ));
        table
    }

    fn responder(ignore_unknown: bool) -> DnsResponder {
        DnsResponder::new(test_table(), 33, ignore_unknown)
    }

    #[test]
    fn test_answers_exact_name() {
        let reply = responder(false)
            .handle_packet(&build_query(0x4929, "ya.com", TYPE_A))
            .unwrap();

        assert_eq!(&reply[..2], &[0x49, 0x29]);
        assert_eq!(&reply[2..4], &[0x85, 0x80]);
        assert_eq!(&reply[6..8], &[0x00, 0x01]);
        // TTL 33, rdlength 4, 192.168.5.1.
        assert_eq!(
            &reply[reply.len() - 10..],
            &[0x00, 0x00, 0x00, 0x21, 0x00, 0x04, 0xC0, 0xA8, 0x05, 0x01]
        );
    }

    #[test]
    fn test_answers_pattern_name() {
        let reply = responder(false)
            .handle_packet(&build_query(1, "login.portal.lan", TYPE_A))
            .unwrap();
        assert_eq!(&reply[reply.len() - 4..], &[10, 0, 0, 1]);
    }

    #[test]
    fn test_mixed_case_query_matches() {
        let reply = responder(false).handle_packet(&build_query(1, "YA.COM", TYPE_A));
        assert_eq!(&reply.unwrap()[2..4], &[0x85, 0x80]);
    }

    #[test]
    fn test_all_type_answered_as_a() {
        let reply = responder(false)
            .handle_packet(&build_query(1, "ya.com", TYPE_ALL))
            .unwrap();
        assert_eq!(&reply[2..4], &[0x85, 0x80]);
        assert_eq!(&reply[reply.len() - 4..], &[192, 168, 5, 1]);
    }

    #[test]
    fn test_unsupported_type_flagged() {
        let request = build_query(1, "ya.com", 0x000F); // MX
        let reply = responder(false).handle_packet(&request).unwrap();
        assert_eq!(reply.len(), request.len());
        assert_eq!(&reply[2..4], &[0x81, 0x80]);
    }

    #[test]
    fn test_unknown_name_nxdomain_by_default() {
        let request = build_query(1, "nope.com", TYPE_A);
        let reply = responder(false).handle_packet(&request).unwrap();
        assert_eq!(&reply[2..4], &[0x81, 0x83]);
        assert_eq!(&reply[4..], &request[4..]);
    }

    #[test]
    fn test_unknown_name_ignored_when_configured() {
        assert!(responder(true)
            .handle_packet(&build_query(1, "nope.com", TYPE_A))
            .is_none());
        // Known names still get answered.
        assert!(responder(true)
            .handle_packet(&build_query(1, "ya.com", TYPE_A))
            .is_some());
    }

    #[test]
    fn test_malformed_datagrams_dropped() {
        let responder = responder(false);
        assert!(responder.handle_packet(&[]).is_none());
        assert!(responder.handle_packet(&[0x01, 0x02, 0x03]).is_none());

        let mut multi_question = build_query(1, "ya.com", TYPE_A);
        multi_question[5] = 2;
        assert!(responder.handle_packet(&multi_question).is_none());

        let truncated = build_query(1, "ya.com", TYPE_A);
        assert!(responder.handle_packet(&truncated[..14]).is_none());
    }

    #[test]
    fn test_idempotent_replies() {
        let responder = responder(false);
        let request = build_query(0x4929, "ya.com", TYPE_A);
        assert_eq!(
            responder.handle_packet(&request),
            responder.handle_packet(&request)
        );
    }

    #[test]
    fn test_add_domain_extends_table() {
        let responder = responder(false);
        let request = build_query(1, "late.com", TYPE_A);
        assert_eq!(&responder.handle_packet(&request).unwrap()[2..4], &[0x81, 0x83]);

        responder.add_domain(DomainRecord::new(
            NamePattern::exact("late.com"),
            "172.16.0.1".parse().unwrap(),
        ));
        let reply = responder.handle_packet(&request).unwrap();
        assert_eq!(&reply[2..4], &[0x85, 0x80]);
        assert_eq!(&reply[reply.len() - 4..], &[172, 16, 0, 1]);
    }
}
