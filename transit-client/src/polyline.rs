//! Encoded-polyline codec.
//!
//! Backends ship leg path geometry as a compact printable-ASCII string:
//! per point one (Δlat, Δlon) pair of zig-zag-signed integers, split into
//! 5-bit groups, each group offset by `?` (0x3F), with 0x20 marking
//! continuation. Deltas are scaled by 1e-5 and accumulated from (0, 0).
//!
//! Decoding is stateless per call and bit-exact: the same input always
//! yields the same coordinates.

use crate::domain::Point;

/// Every encoded digit is offset by this character.
const CHAR_OFFSET: u8 = 0x3F;

/// Bit signalling that more 5-bit groups follow.
const CONTINUATION_BIT: u32 = 0x20;

/// Encoded deltas are hundred-thousandths of a degree.
const PRECISION: f64 = 1e-5;

/// Error returned when an encoded polyline is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolylineError {
    /// A character outside the encoding alphabet.
    #[error("invalid polyline character {0:#04x} at offset {1}")]
    InvalidCharacter(u8, usize),

    /// Input ended while a varint still had its continuation bit set,
    /// or a latitude delta had no matching longitude delta.
    #[error("truncated polyline: input ended mid-point")]
    Truncated,

    /// A single value used more 5-bit groups than fit in 32 bits.
    #[error("polyline value overflow at offset {0}")]
    Overflow(usize),
}

/// Decodes an encoded polyline into coordinates.
///
/// Empty input yields an empty sequence. Malformed input (a dangling
/// continuation bit, a lone latitude delta) is a hard error.
///
/// # Examples
///
/// ```
/// use transit_client::polyline::decode;
///
/// let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
/// assert_eq!(points.len(), 3);
/// assert!((points[0].lat_degrees() - 38.5).abs() < 1e-5);
/// assert!((points[0].lon_degrees() + 120.2).abs() < 1e-5);
/// ```
pub fn decode(encoded: &str) -> Result<Vec<Point>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::with_capacity(bytes.len() / 4);

    let mut index = 0;
    let mut lat = 0i64;
    let mut lon = 0i64;

    while index < bytes.len() {
        let (dlat, next) = decode_signed(bytes, index)?;
        if next >= bytes.len() {
            // Latitude without a longitude is half a point.
            return Err(PolylineError::Truncated);
        }
        let (dlon, next) = decode_signed(bytes, next)?;
        index = next;

        lat += i64::from(dlat);
        lon += i64::from(dlon);
        points.push(Point::from_degrees(
            lat as f64 * PRECISION,
            lon as f64 * PRECISION,
        ));
    }

    Ok(points)
}

/// Decodes one zig-zag-signed varint starting at `start`.
///
/// Returns the value and the offset just past it.
fn decode_signed(bytes: &[u8], start: usize) -> Result<(i32, usize), PolylineError> {
    let mut raw: u32 = 0;
    let mut shift = 0;
    let mut index = start;

    loop {
        let Some(&b) = bytes.get(index) else {
            return Err(PolylineError::Truncated);
        };
        if b < CHAR_OFFSET {
            return Err(PolylineError::InvalidCharacter(b, index));
        }
        let group = u32::from(b - CHAR_OFFSET);
        if shift >= 32 {
            return Err(PolylineError::Overflow(start));
        }
        raw |= (group & 0x1F) << shift;
        shift += 5;
        index += 1;

        if group & CONTINUATION_BIT == 0 {
            break;
        }
    }

    // Undo zig-zag signing.
    let value = if raw & 1 != 0 {
        !(raw >> 1) as i32
    } else {
        (raw >> 1) as i32
    };

    Ok((value, index))
}

/// Encodes coordinates with the reference polyline algorithm.
///
/// The inverse of [`decode`] to within the 1e-5 precision of the format.
pub fn encode(points: &[Point]) -> String {
    let mut out = String::with_capacity(points.len() * 6);
    let mut prev_lat = 0i64;
    let mut prev_lon = 0i64;

    for point in points {
        let lat = (point.lat_degrees() / PRECISION).round() as i64;
        let lon = (point.lon_degrees() / PRECISION).round() as i64;
        encode_signed((lat - prev_lat) as i32, &mut out);
        encode_signed((lon - prev_lon) as i32, &mut out);
        prev_lat = lat;
        prev_lon = lon;
    }

    out
}

fn encode_signed(value: i32, out: &mut String) {
    // Zig-zag sign into the low bit.
    let mut raw = (value << 1) as u32;
    if value < 0 {
        raw = !raw;
    }

    loop {
        let mut group = raw & 0x1F;
        raw >>= 5;
        if raw != 0 {
            group |= CONTINUATION_BIT;
        }
        out.push(char::from(group as u8 + CHAR_OFFSET));
        if raw == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(point: Point, lat: f64, lon: f64) {
        assert!(
            (point.lat_degrees() - lat).abs() < 1e-5,
            "lat {} != {lat}",
            point.lat_degrees()
        );
        assert!(
            (point.lon_degrees() - lon).abs() < 1e-5,
            "lon {} != {lon}",
            point.lon_degrees()
        );
    }

    #[test]
    fn empty_input_empty_output() {
        assert_eq!(decode("").unwrap(), vec![]);
    }

    #[test]
    fn reference_example() {
        let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(points.len(), 3);
        assert_close(points[0], 38.5, -120.2);
        assert_close(points[1], 40.7, -120.95);
        assert_close(points[2], 43.252, -126.453);
    }

    #[test]
    fn reference_example_encodes_back() {
        let points = [
            Point::from_degrees(38.5, -120.2),
            Point::from_degrees(40.7, -120.95),
            Point::from_degrees(43.252, -126.453),
        ];
        assert_eq!(encode(&points), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn single_point() {
        let encoded = encode(&[Point::from_degrees(52.52, 13.405)]);
        let points = decode(&encoded).unwrap();
        assert_eq!(points.len(), 1);
        assert_close(points[0], 52.52, 13.405);
    }

    #[test]
    fn dangling_continuation_bit_is_error() {
        // '_' has the continuation bit set; the stream ends mid-number.
        assert_eq!(decode("_"), Err(PolylineError::Truncated));
    }

    #[test]
    fn lone_latitude_is_error() {
        // '?' decodes to a complete zero delta, but no longitude follows.
        assert_eq!(decode("?"), Err(PolylineError::Truncated));
    }

    #[test]
    fn invalid_character_is_error() {
        assert!(matches!(
            decode(" ?"),
            Err(PolylineError::InvalidCharacter(0x20, 0))
        ));
    }

    #[test]
    fn decode_is_deterministic() {
        let a = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        let b = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(a, b);
    }
}
