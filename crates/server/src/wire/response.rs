use super::query::DecodedQuery;
use super::{HEADER_LEN, TYPE_A, TYPE_ALL};
use std::net::Ipv4Addr;

/// Standard query response, no error (unsupported query type).
const FLAGS_NOT_IMPLEMENTED: u16 = 0x8180;
/// Standard query response, no such name.
const FLAGS_NO_SUCH_NAME: u16 = 0x8183;
/// Authoritative query response, no error.
const FLAGS_ANSWER: u16 = 0x8580;

/// What the responder decided for one decoded query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    Answered(Ipv4Addr),
    NoSuchName,
    NotImplemented,
    Ignored,
}

/// Builds the reply datagram for `outcome`, or `None` for [`ResponseOutcome::Ignored`].
///
/// `query` must have been decoded from `datagram`; the question slice
/// `datagram[12..name_end + 4]` is bounds-checked by the decoder.
pub fn encode_response(
    datagram: &[u8],
    query: &DecodedQuery,
    outcome: &ResponseOutcome,
    ttl: u32,
) -> Option<Vec<u8>> {
    match outcome {
        ResponseOutcome::Ignored => None,
        ResponseOutcome::NotImplemented => Some(with_flags(datagram, FLAGS_NOT_IMPLEMENTED)),
        ResponseOutcome::NoSuchName => Some(with_flags(datagram, FLAGS_NO_SUCH_NAME)),
        ResponseOutcome::Answered(address) => Some(build_answer(datagram, query, *address, ttl)),
    }
}

/// Copy of the request with only the flags field rewritten.
fn with_flags(datagram: &[u8], flags: u16) -> Vec<u8> {
    let mut out = datagram.to_vec();
    out[2..4].copy_from_slice(&flags.to_be_bytes());
    out
}

/// Header + echoed question + one A record pointing back at the question name.
fn build_answer(datagram: &[u8], query: &DecodedQuery, address: Ipv4Addr, ttl: u32) -> Vec<u8> {
    let question = &datagram[HEADER_LEN..query.name_end + 4];

    let mut out = Vec::with_capacity(HEADER_LEN + question.len() + 16);
    out.extend_from_slice(&datagram[..HEADER_LEN]);
    out[2..4].copy_from_slice(&FLAGS_ANSWER.to_be_bytes());
    out[6..8].copy_from_slice(&1u16.to_be_bytes());

    out.extend_from_slice(question);
    if query.query_type == TYPE_ALL {
        // Only A records are ever served, so the echoed question says A.
        out[query.name_end..query.name_end + 2].copy_from_slice(&TYPE_A.to_be_bytes());
    }

    out.extend_from_slice(&[0xC0, 0x0C]); // name: pointer to offset 12
    out.extend_from_slice(&TYPE_A.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // class IN
    out.extend_from_slice(&ttl.to_be_bytes());
    out.extend_from_slice(&4u16.to_be_bytes());
    out.extend_from_slice(&address.octets());
    out
}
