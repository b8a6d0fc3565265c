//! Binary encode/decode for the `.vsf` dataset format.
//!
//! All integers are little-endian. Strings are length-prefixed with a
//! `u32` length. The format has no compression or alignment padding.
//!
//! ```text
//! [MAGIC "VSTF"] [VERSION u8] [var_count u32]
//! per variable:
//!   [name str] [kind u8] [persistence u8] [precision u8]
//!   [rank u8] [dim u64 × rank] [record_count u32]
//!   [value × element_count × record_count]
//! ```
//!
//! Integer values are `i32`; reals are `f64`, or `f32` when the variable
//! was written at low precision.

use std::io::{Read, Write};

use varstore_core::{BackendError, DataKind, Dims, Persistence};

use crate::dataset::{Dataset, Variable};
use crate::{FORMAT_VERSION, MAGIC};

const KIND_INT: u8 = 0;
const KIND_REAL: u8 = 1;

const PERSISTENCE_FIXED: u8 = 0;
const PERSISTENCE_GROW: u8 = 1;

const PRECISION_DOUBLE: u8 = 0;
const PRECISION_SINGLE: u8 = 1;

/// Upper bound on values preallocated while decoding, so a corrupt
/// count cannot trigger a huge allocation before the data runs out.
const PREALLOC_LIMIT: usize = 1 << 16;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), BackendError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), BackendError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), BackendError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i32.
pub fn write_i32_le(w: &mut dyn Write, v: i32) -> Result<(), BackendError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f32.
pub fn write_f32_le(w: &mut dyn Write, v: f32) -> Result<(), BackendError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), BackendError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string (u32 length + bytes).
pub fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), BackendError> {
    write_u32_le(w, len_u32(s.len(), "string")?)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, BackendError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, BackendError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, BackendError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian i32.
pub fn read_i32_le(r: &mut dyn Read) -> Result<i32, BackendError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Read a little-endian f32.
pub fn read_f32_le(r: &mut dyn Read) -> Result<f32, BackendError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, BackendError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, BackendError> {
    let len = read_u32_le(r)? as usize;
    let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    Read::take(&mut *r, len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(BackendError::Malformed {
            detail: format!("truncated string: got {} of {len} bytes", buf.len()),
        });
    }
    String::from_utf8(buf).map_err(|e| BackendError::Malformed {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

fn len_u32(len: usize, what: &str) -> Result<u32, BackendError> {
    u32::try_from(len).map_err(|_| BackendError::Malformed {
        detail: format!("{what} length {len} exceeds u32::MAX"),
    })
}

// ── Dataset encode/decode ───────────────────────────────────────

/// Encode a whole dataset, header included.
pub fn encode_dataset(w: &mut dyn Write, dataset: &Dataset) -> Result<(), BackendError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_u32_le(w, len_u32(dataset.len(), "variable count")?)?;

    for (name, var) in dataset.iter() {
        encode_variable(w, name, var)?;
    }
    Ok(())
}

fn encode_variable(w: &mut dyn Write, name: &str, var: &Variable) -> Result<(), BackendError> {
    write_length_prefixed_str(w, name)?;
    write_u8(
        w,
        match var.kind() {
            DataKind::Int => KIND_INT,
            DataKind::Real => KIND_REAL,
        },
    )?;
    write_u8(
        w,
        match var.persistence() {
            Persistence::Fixed => PERSISTENCE_FIXED,
            Persistence::Grow => PERSISTENCE_GROW,
        },
    )?;
    write_u8(
        w,
        if var.is_low_precision() {
            PRECISION_SINGLE
        } else {
            PRECISION_DOUBLE
        },
    )?;

    let rank = u8::try_from(var.dims().len()).map_err(|_| BackendError::Malformed {
        detail: format!("variable '{name}' has rank {} > 255", var.dims().len()),
    })?;
    write_u8(w, rank)?;
    for &d in var.dims() {
        write_u64_le(w, d as u64)?;
    }

    write_u32_le(w, len_u32(var.record_count(), "record count")?)?;
    for record in var.records() {
        for &v in record {
            match (var.kind(), var.is_low_precision()) {
                (DataKind::Int, _) => write_i32_le(w, v as i32)?,
                (DataKind::Real, true) => write_f32_le(w, v as f32)?,
                (DataKind::Real, false) => write_f64_le(w, v)?,
            }
        }
    }
    Ok(())
}

/// Decode and validate a whole dataset.
pub fn decode_dataset(r: &mut dyn Read) -> Result<Dataset, BackendError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(BackendError::InvalidMagic);
    }

    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(BackendError::UnsupportedVersion { found: version });
    }

    let count = read_u32_le(r)?;
    let mut dataset = Dataset::new();
    for _ in 0..count {
        let (name, var) = decode_variable(r)?;
        if dataset.contains(&name) {
            return Err(BackendError::Malformed {
                detail: format!("duplicate variable '{name}'"),
            });
        }
        dataset.insert(name, var);
    }
    Ok(dataset)
}

fn decode_variable(r: &mut dyn Read) -> Result<(String, Variable), BackendError> {
    let name = read_length_prefixed_str(r)?;

    let kind = match read_u8(r)? {
        KIND_INT => DataKind::Int,
        KIND_REAL => DataKind::Real,
        tag => {
            return Err(BackendError::Malformed {
                detail: format!("variable '{name}': invalid kind tag {tag}"),
            })
        }
    };
    let persistence = match read_u8(r)? {
        PERSISTENCE_FIXED => Persistence::Fixed,
        PERSISTENCE_GROW => Persistence::Grow,
        tag => {
            return Err(BackendError::Malformed {
                detail: format!("variable '{name}': invalid persistence tag {tag}"),
            })
        }
    };
    let low_precision = match read_u8(r)? {
        PRECISION_DOUBLE => false,
        PRECISION_SINGLE => true,
        tag => {
            return Err(BackendError::Malformed {
                detail: format!("variable '{name}': invalid precision tag {tag}"),
            })
        }
    };

    let rank = read_u8(r)?;
    let mut dims = Dims::new();
    let mut elements: usize = 1;
    for _ in 0..rank {
        let d = read_u64_le(r)?;
        let extent = usize::try_from(d).map_err(|_| BackendError::Malformed {
            detail: format!("variable '{name}': extent {d} does not fit in usize"),
        })?;
        if extent == 0 {
            return Err(BackendError::Malformed {
                detail: format!("variable '{name}': zero extent"),
            });
        }
        elements = elements.checked_mul(extent).ok_or_else(|| BackendError::Malformed {
            detail: format!("variable '{name}': element count overflows"),
        })?;
        dims.push(extent);
    }

    let records = read_u32_le(r)? as usize;
    if persistence == Persistence::Fixed && records != 1 {
        return Err(BackendError::Malformed {
            detail: format!("fixed variable '{name}' has {records} records"),
        });
    }

    let mut var = Variable::new(kind, dims, persistence, low_precision);
    for _ in 0..records {
        let mut values = Vec::with_capacity(elements.min(PREALLOC_LIMIT));
        for _ in 0..elements {
            let v = match (kind, low_precision) {
                (DataKind::Int, _) => read_i32_le(r)? as f64,
                (DataKind::Real, true) => read_f32_le(r)? as f64,
                (DataKind::Real, false) => read_f64_le(r)?,
            };
            values.push(v);
        }
        var.push_record(values);
    }
    Ok((name, var))
}
