//! NumPy `.npy` encoding for little-endian f64 volumes
//!
//! Writes format version 1.0 with the header padded to a 64-byte boundary.
//! Reads versions 1.0 through 3.0, C order only.

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGN: usize = 64;
const DESCR: &str = "<f8";

/// Decoded array: shape plus row-major samples
#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

pub fn encode(shape: &[usize], data: &[f64]) -> Vec<u8> {
    let dims = match shape {
        [n] => format!("({},)", n),
        _ => format!(
            "({})",
            shape.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ")
        ),
    };
    let mut header = format!("{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}", DESCR, dims);

    // magic (6) + version (2) + header length (2) + header + '\n'
    let unpadded = MAGIC.len() + 4 + header.len() + 1;
    header.push_str(&" ".repeat((ALIGN - unpadded % ALIGN) % ALIGN));
    header.push('\n');

    let mut out = Vec::with_capacity(MAGIC.len() + 4 + header.len() + data.len() * 8);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    for v in data {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Parse an `.npy` buffer; the error string says what was wrong with it
pub fn decode(bytes: &[u8]) -> Result<NpyArray, String> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err("not an npy array".into());
    }

    let (header_len, header_start): (usize, usize) = match bytes[6] {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err("truncated npy header".into());
            }
            (u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize, 12)
        }
        major => return Err(format!("unsupported npy version {}", major)),
    };

    let data_start = header_start.checked_add(header_len).ok_or("truncated npy header")?;
    let header = bytes
        .get(header_start..data_start)
        .and_then(|h| std::str::from_utf8(h).ok())
        .ok_or("truncated npy header")?;

    let descr = dict_value(header, "descr").ok_or("npy header missing descr")?;
    if !descr.starts_with(&format!("'{}'", DESCR)) {
        return Err(format!("unsupported dtype {}", descr.split(',').next().unwrap_or(descr)));
    }

    let fortran = dict_value(header, "fortran_order").ok_or("npy header missing fortran_order")?;
    if fortran.starts_with("True") {
        return Err("fortran-ordered arrays are not supported".into());
    }

    let shape = parse_shape(dict_value(header, "shape").ok_or("npy header missing shape")?)?;
    let expected = shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or("npy shape overflows")?;
    let expected_bytes = expected.checked_mul(8).ok_or("npy shape overflows")?;

    let body = &bytes[data_start..];
    if body.len() != expected_bytes {
        return Err(format!(
            "expected {} samples, found {} bytes of data",
            expected,
            body.len()
        ));
    }

    let data = body
        .chunks_exact(8)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            f64::from_le_bytes(raw)
        })
        .collect();

    Ok(NpyArray { shape, data })
}

/// Text following `'key':` in a header dict literal
fn dict_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let tag = format!("'{}':", key);
    let start = header.find(&tag)? + tag.len();
    Some(header[start..].trim_start())
}

fn parse_shape(value: &str) -> Result<Vec<usize>, String> {
    let inner = value
        .strip_prefix('(')
        .and_then(|rest| rest.split(')').next())
        .ok_or("malformed npy shape")?;

    inner
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| dim.parse::<usize>().map_err(|_| format!("malformed npy shape entry {:?}", dim)))
        .collect()
}
