use super::HEADER_LEN;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("datagram shorter than the 12-byte DNS header")]
    TooShortHeader,

    #[error("not a plain single-question query (qdcount {qdcount}, ancount {ancount})")]
    TooComplex { qdcount: u16, ancount: u16 },

    #[error("question name runs past the end of the datagram")]
    TruncatedLabel,

    #[error("question section truncated before type/class")]
    TooShortQuestion,
}

/// Result of decoding a raw DNS query datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedQuery {
    pub id: u16,
    pub flags: u16,
    pub question_count: u16,
    pub answer_count: u16,
    /// Queried name, ASCII-lowercased, no trailing dot.
    pub name: String,
    pub query_type: u16,
    pub query_class: u16,
    /// Offset of the question's type field; the question section is
    /// `datagram[12..name_end + 4]`.
    pub name_end: usize,
}

/// Decodes a raw query datagram into a [`DecodedQuery`].
///
/// Accepts only the narrow shape this responder serves: a single question,
/// no prior answers, and an uncompressed question name. A compression
/// pointer cannot legally start the question section here, so a label byte
/// with the top two bits set is rejected as [`DecodeError::TruncatedLabel`].
pub fn parse_query(datagram: &[u8]) -> Result<DecodedQuery, DecodeError> {
    if datagram.len() < HEADER_LEN {
        return Err(DecodeError::TooShortHeader);
    }

    let id = u16::from_be_bytes([datagram[0], datagram[1]]);
    let flags = u16::from_be_bytes([datagram[2], datagram[3]]);
    let qdcount = u16::from_be_bytes([datagram[4], datagram[5]]);
    let ancount = u16::from_be_bytes([datagram[6], datagram[7]]);

    if qdcount != 1 || ancount > 0 {
        return Err(DecodeError::TooComplex { qdcount, ancount });
    }

    let mut pos = HEADER_LEN;
    let mut name_buf: Vec<u8> = Vec::new();

    loop {
        let len = *datagram.get(pos).ok_or(DecodeError::TruncatedLabel)? as usize;
        if len == 0 {
            pos += 1;
            break;
        }
        if len & 0xC0 != 0 {
            return Err(DecodeError::TruncatedLabel);
        }
        pos += 1;
        let label = datagram
            .get(pos..pos + len)
            .ok_or(DecodeError::TruncatedLabel)?;
        if !name_buf.is_empty() {
            name_buf.push(b'.');
        }
        name_buf.extend(label.iter().map(|b| b.to_ascii_lowercase()));
        pos += len;
    }

    if pos + 4 > datagram.len() {
        return Err(DecodeError::TooShortQuestion);
    }
    let query_type = u16::from_be_bytes([datagram[pos], datagram[pos + 1]]);
    let query_class = u16::from_be_bytes([datagram[pos + 2], datagram[pos + 3]]);

    Ok(DecodedQuery {
        id,
        flags,
        question_count: qdcount,
        answer_count: ancount,
        name: String::from_utf8_lossy(&name_buf).into_owned(),
        query_type,
        query_class,
        name_end: pos,
    })
}

#[cfg(test)]
pub(crate) fn build_query(id: u16, name: &str, query_type: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&id.to_be_bytes());
    out.extend_from_slice(&[0x01, 0x00]); // RD
    out.extend_from_slice(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    for label in name.split('.').filter(|l| !l.is_empty()) {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0x00);
    out.extend_from_slice(&query_type.to_be_bytes());
    out.extend_from_slice(&[0x00, 0x01]); // class IN
    out
}
