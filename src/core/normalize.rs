use crate::domain::model::NormalizedId;
use crate::utils::error::{ImportError, Result};

/// CNJ process numbers carry exactly 20 digits: NNNNNNN-DD.AAAA.J.TR.OOOO.
pub const PROCESS_NUMBER_DIGITS: usize = 20;

/// Coerces a raw identifier into the canonical process-number shape.
///
/// All non-digit characters are stripped first, so masked and unmasked input
/// normalize to the same value. Anything that does not yield exactly 20
/// digits is rejected and never reaches the lookup client.
pub fn normalize(raw: &str) -> Result<NormalizedId> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != PROCESS_NUMBER_DIGITS {
        return Err(ImportError::InvalidNumber {
            raw: raw.to_string(),
            reason: format!(
                "expected {} digits, found {}",
                PROCESS_NUMBER_DIGITS,
                digits.len()
            ),
        });
    }

    Ok(NormalizedId {
        masked: format_mask(&digits),
        digits,
    })
}

/// Applies the fixed-width CNJ grouping to a 20-digit string.
pub fn format_mask(digits: &str) -> String {
    debug_assert_eq!(digits.len(), PROCESS_NUMBER_DIGITS);
    format!(
        "{}-{}.{}.{}.{}.{}",
        &digits[..7],
        &digits[7..9],
        &digits[9..13],
        &digits[13..14],
        &digits[14..16],
        &digits[16..20]
    )
}
