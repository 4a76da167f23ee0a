//! Hyphen-joined path segments used by the legacy write routes
//!
//! `/add_loan/:loan` carries `id-location-timestamp-lender-vessel` and
//! `/change_lender/:lender` carries `id-name`. The delimiter is never
//! escaped, so a field containing `-` cannot be told apart from a field
//! boundary. Decoding therefore insists on the exact field count and
//! rejects anything else instead of guessing.

use crate::{CoreError, CoreResult, LenderChange, LenderChangeInput, Loan, LoanInput, NewLoan};

pub const SEGMENT_DELIMITER: &str = "-";

const LOAN_FIELDS: usize = 5;
const LENDER_FIELDS: usize = 2;

/// `id-location-timestamp-lender-vessel`
pub fn encode_loan_segment(input: &LoanInput) -> String {
    [
        input.id.as_str(),
        input.location().as_str(),
        input.timestamp.as_str(),
        input.lender.as_str(),
        input.vessel.as_str(),
    ]
    .join(SEGMENT_DELIMITER)
}

/// `id-name`
pub fn encode_lender_segment(input: &LenderChangeInput) -> String {
    format!("{}{}{}", input.id, SEGMENT_DELIMITER, input.name)
}

fn split_exact(segment: &str, expected: usize) -> CoreResult<Vec<&str>> {
    if segment.is_empty() {
        return Err(CoreError::InvalidSegment {
            message: "empty segment".to_string(),
        });
    }
    let fields: Vec<&str> = segment.split(SEGMENT_DELIMITER).collect();
    if fields.len() != expected {
        return Err(CoreError::ArgumentCount {
            expected,
            actual: fields.len(),
        });
    }
    if fields[0].is_empty() {
        return Err(CoreError::InvalidSegment {
            message: "missing loan id".to_string(),
        });
    }
    Ok(fields)
}

pub fn decode_loan_segment(segment: &str) -> CoreResult<NewLoan> {
    let fields = split_exact(segment, LOAN_FIELDS)?;
    Ok(NewLoan {
        id: fields[0].to_string(),
        loan: Loan {
            location: fields[1].to_string(),
            timestamp: fields[2].to_string(),
            lender: fields[3].to_string(),
            vessel: fields[4].to_string(),
        },
    })
}

pub fn decode_lender_segment(segment: &str) -> CoreResult<LenderChange> {
    let fields = split_exact(segment, LENDER_FIELDS)?;
    Ok(LenderChange {
        id: fields[0].to_string(),
        lender: fields[1].to_string(),
    })
}
