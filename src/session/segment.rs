// ABOUTME: Splits over-length message text into ordered parts tagged for reassembly
// ABOUTME: Character-exact partitioning so one routine serves both 7-bit and UCS-2 budgets

use crate::session::error::{SmppError, SmppResult};

/// One segment of a logical message.
///
/// All parts of one message share a reference number drawn at random per
/// message; the receiving network reassembles on `(ref_num, seq)`.
/// Uniqueness is only needed among concurrently in-flight messages, so a
/// random 16-bit draw is collision-tolerant enough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePart {
    /// Reference shared by every part of the message
    pub ref_num: u16,
    /// Total number of parts
    pub total: u8,
    /// 1-based index of this part
    pub seq: u8,
    /// The substring carried by this part
    pub text: String,
}

/// Split `text` into parts of at most `limit` characters.
///
/// Text that fits in one part comes back as a single element equal to the
/// input. Longer text is partitioned into consecutive slices of exactly
/// `limit` characters, except the last which holds the remainder; parts
/// concatenated in order reproduce the input byte-for-byte.
///
/// The limit is counted in characters, not bytes, so the caller supplies
/// the budget matching the selected encoding (see
/// [`SegmentLimits`](crate::session::SegmentLimits)).
pub fn segment(text: &str, limit: usize) -> SmppResult<Vec<MessagePart>> {
    if limit == 0 {
        return Err(SmppError::InvalidData(
            "segment limit must be at least 1".to_string(),
        ));
    }

    let total = text.chars().count().div_ceil(limit).max(1);
    if total > u8::MAX as usize {
        return Err(SmppError::InvalidData(format!(
            "message needs {total} parts, segment count field holds at most {}",
            u8::MAX
        )));
    }

    let ref_num: u16 = rand::random();
    let mut parts = Vec::with_capacity(total);
    let mut rest = text;
    for seq in 1..=total {
        let cut = rest
            .char_indices()
            .nth(limit)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(cut);
        parts.push(MessagePart {
            ref_num,
            total: total as u8,
            seq: seq as u8,
            text: head.to_string(),
        });
        rest = tail;
    }

    Ok(parts)
}
