//! Gain update wire format.
//!
//! The controller expects `{"balancing": "[<Kp>,<Kd>]"}`: a JSON object whose
//! single value is a string holding a bracketed pair, each gain with exactly
//! three decimals. On the device side everything between the first `[` and
//! the following `]` is scanned as two comma-separated floats.

use balance_errors::DecodeError;

use crate::gain::GainValues;

/// Build the gain update payload.
///
/// ```rust
/// use balance_gains::{GainValues, format_gains_payload};
///
/// let payload = format_gains_payload(GainValues::new(1.0, 2.5));
/// assert_eq!(payload, r#"{"balancing": "[1.000,2.500]"}"#);
/// ```
pub fn format_gains_payload(values: GainValues) -> String {
    let GainValues { kp, kd } = values;
    format!("{{\"balancing\": \"[{kp:.3},{kd:.3}]\"}}")
}

/// Read a gain update the way the controller does.
///
/// # Errors
///
/// Returns [`DecodeError`] when the payload has no bracketed pair or either
/// value is not a number.
pub fn parse_gains_payload(payload: &[u8]) -> Result<GainValues, DecodeError> {
    let text = std::str::from_utf8(payload).map_err(DecodeError::invalid_utf8)?;

    let open = text
        .find('[')
        .ok_or_else(|| DecodeError::malformed("gain payload has no '['"))?;
    let rest = text.get(open.saturating_add(1)..).unwrap_or_default();
    let close = rest
        .find(']')
        .ok_or_else(|| DecodeError::malformed("gain payload has no ']'"))?;
    let inner = rest.get(..close).unwrap_or_default();

    let (kp, kd) = inner
        .split_once(',')
        .ok_or_else(|| DecodeError::malformed("gain pair is not comma separated"))?;
    let kp = kp
        .trim()
        .parse::<f64>()
        .map_err(|e| DecodeError::malformed(format!("Kp: {e}")))?;
    let kd = kd
        .trim()
        .parse::<f64>()
        .map_err(|e| DecodeError::malformed(format!("Kd: {e}")))?;

    Ok(GainValues::new(kp, kd))
}
