//! Binary layout of an optimizer checkpoint.
//!
//! All integers and floats are little endian:
//!
//! ```text
//! version: u32 | kind: u32 | samples_passed: u64 | tensors: u32 | (len: u64 | len * f32)*
//! ```
//!
//! The decoder only accepts the versions listed here, any change to the layout must bump
//! `STATE_VERSION`.

use bytes::{Buf, BufMut};

use crate::error::{OptimizerErr, Result};

/// Current checkpoint format version.
pub const STATE_VERSION: u32 = 1;

const HEADER_SIZE: usize =
    size_of::<u32>() + size_of::<u32>() + size_of::<u64>() + size_of::<u32>();
const LEN_SIZE: usize = size_of::<u64>();
const F32_SIZE: usize = size_of::<f32>();

/// A decoded checkpoint, owning copies of the auxiliary tensors.
#[derive(Debug, PartialEq)]
pub struct State {
    pub kind: u32,
    pub samples_passed: u64,
    pub tensors: Vec<Vec<f32>>,
}

/// Writes a checkpoint.
///
/// # Arguments
/// * `kind` - The tag of the update rule that owns the tensors.
/// * `samples_passed` - The optimizer's sample counter.
/// * `tensors` - The auxiliary tensors in the rule's order.
///
/// # Returns
/// The encoded checkpoint.
pub fn encode(kind: u32, samples_passed: u64, tensors: &[&[f32]]) -> Vec<u8> {
    let payload: usize = tensors.iter().map(|t| LEN_SIZE + t.len() * F32_SIZE).sum();
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload);

    buf.put_u32_le(STATE_VERSION);
    buf.put_u32_le(kind);
    buf.put_u64_le(samples_passed);
    buf.put_u32_le(tensors.len() as u32);

    for tensor in tensors {
        buf.put_u64_le(tensor.len() as u64);
        for x in tensor.iter() {
            buf.put_f32_le(*x);
        }
    }

    buf
}

/// Reads a checkpoint without interpreting it's tensors.
///
/// # Arguments
/// * `buf` - The encoded checkpoint.
///
/// # Returns
/// The decoded state or `OptimizerErr::CorruptState` if the blob is truncated, has
/// trailing bytes or an unknown version.
pub fn decode(mut buf: &[u8]) -> Result<State> {
    if buf.remaining() < HEADER_SIZE {
        return corrupt(format!(
            "the given buffer is too small {}, must at least be {HEADER_SIZE} bytes",
            buf.remaining()
        ));
    }

    let version = buf.get_u32_le();
    if version != STATE_VERSION {
        return corrupt(format!("unknown state version {version}"));
    }

    let kind = buf.get_u32_le();
    let samples_passed = buf.get_u64_le();
    let count = buf.get_u32_le() as usize;

    // Every tensor takes at least it's length prefix, this bounds the allocation below.
    if count > buf.remaining() / LEN_SIZE {
        return corrupt(format!("declares {count} tensors in {} bytes", buf.remaining()));
    }

    let mut tensors = Vec::with_capacity(count);
    for i in 0..count {
        if buf.remaining() < LEN_SIZE {
            return corrupt(format!("tensor {i} is missing it's length"));
        }

        let len = buf.get_u64_le();
        let fits = usize::try_from(len)
            .ok()
            .and_then(|len| len.checked_mul(F32_SIZE))
            .is_some_and(|size| size <= buf.remaining());

        if !fits {
            return corrupt(format!(
                "tensor {i} declares {len} values but only {} bytes remain",
                buf.remaining()
            ));
        }

        let tensor: Vec<f32> = (0..len).map(|_| buf.get_f32_le()).collect();
        tensors.push(tensor);
    }

    if buf.has_remaining() {
        return corrupt(format!("{} trailing bytes", buf.remaining()));
    }

    Ok(State {
        kind,
        samples_passed,
        tensors,
    })
}

fn corrupt<T>(msg: String) -> Result<T> {
    Err(OptimizerErr::CorruptState(msg))
}
