//! Checksum gate: decides whether a source still matches its stored digest.

use crate::error::GateError;
use md5::digest::{Digest, FixedOutputReset};
use std::io::{self, Read, Write};

/// Lowercase hex of the hasher's current state. Leaves the hasher reset.
pub fn finalize_hex<D>(hasher: &mut D) -> String
where
    D: Digest + FixedOutputReset,
{
    hex::encode(Digest::finalize_reset(hasher))
}

/// Hash `source` from its current position to the end and compare the hex
/// digest with the full content of `sidecar`.
///
/// `source` must be positioned at its start and has to be rewound by the
/// caller before it is read again. `hasher` is always left reset so the same
/// instance can accumulate the compression pass.
///
/// Returns the computed digest together with the match result.
pub fn checksum_gate<S, C, D>(
    source: &mut S,
    sidecar: &mut C,
    hasher: &mut D,
) -> Result<(bool, String), GateError>
where
    S: Read + ?Sized,
    C: Read + ?Sized,
    D: Digest + FixedOutputReset + Write,
{
    if let Err(e) = io::copy(source, hasher) {
        Digest::reset(hasher);
        return Err(GateError::Source(e));
    }
    let digest = finalize_hex(hasher);

    let mut stored = Vec::new();
    sidecar.read_to_end(&mut stored).map_err(GateError::Sidecar)?;

    Ok((digest.as_bytes() == stored.as_slice(), digest))
}

/// [`checksum_gate`] without the digest.
pub fn checksum_matches<S, C, D>(source: &mut S, sidecar: &mut C, hasher: &mut D) -> Result<bool, GateError>
where
    S: Read + ?Sized,
    C: Read + ?Sized,
    D: Digest + FixedOutputReset + Write,
{
    checksum_gate(source, sidecar, hasher).map(|(matched, _)| matched)
}
