//! C entry points over `ParameterOptimizer`.
//!
//! Buffers cross the boundary as pointer + length pairs. The parameter buffer is copied on
//! creation, the caller keeps ownership of every buffer it passes in. Pointers handed back by
//! `optimizer_get_weights` and `optimizer_get_state` stay valid until the next call on the
//! same handle.

use std::{ptr, slice};

use log::warn;

use crate::{ParameterOptimizer, Tensor};

/// Status returned when a handle or a buffer pointer is null.
pub const NULL_POINTER: i32 = -5;

/// An optimizer plus the buffer backing the last state handed out.
pub struct OptimizerHandle {
    optimizer: ParameterOptimizer,
    state: Vec<u8>,
}

/// Builds a slice from a C buffer, a zero length accepts a null pointer.
///
/// # Safety
/// `ptr` must be valid for `len` reads of `T` for the lifetime `'a`.
unsafe fn as_slice<'a, T>(ptr: *const T, len: usize) -> Option<&'a [T]> {
    if len == 0 {
        return Some(&[]);
    }

    if ptr.is_null() {
        return None;
    }

    // SAFETY: Non null, and the caller guarantees `len` valid values.
    Some(unsafe { slice::from_raw_parts(ptr, len) })
}

/// Creates an optimizer, optionally restoring a checkpoint.
///
/// # Arguments
/// * `config`, `config_len` - The JSON encoded configuration.
/// * `param`, `param_len` - The initial parameter values, copied.
/// * `state`, `state_len` - A checkpoint to restore, `state_len == 0` skips the restore.
///
/// # Returns
/// A new handle to release with `optimizer_release`, or null on any error.
///
/// # Safety
/// Every pointer must be valid for reads of it's paired length.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn optimizer_create(
    config: *const u8,
    config_len: usize,
    param: *const f32,
    param_len: usize,
    state: *const u8,
    state_len: usize,
) -> *mut OptimizerHandle {
    // SAFETY: Forwarded from this function's contract.
    let buffers = unsafe {
        (
            as_slice(config, config_len),
            as_slice(param, param_len),
            as_slice(state, state_len),
        )
    };

    let (Some(config), Some(param), Some(state)) = buffers else {
        warn!("optimizer_create received a null buffer");
        return ptr::null_mut();
    };

    let parameter = Tensor::from(param);
    let res = if state.is_empty() {
        ParameterOptimizer::create(config, parameter)
    } else {
        ParameterOptimizer::create_with_state(config, parameter, state)
    };

    match res {
        Ok(optimizer) => Box::into_raw(Box::new(OptimizerHandle {
            optimizer,
            state: Vec::new(),
        })),
        Err(e) => {
            warn!("optimizer_create failed: {e}");
            ptr::null_mut()
        }
    }
}

/// Releases an optimizer created by `optimizer_create`, null is ignored.
///
/// # Safety
/// `handle` must come from `optimizer_create` and not have been released already.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn optimizer_release(handle: *mut OptimizerHandle) {
    if !handle.is_null() {
        // SAFETY: Allocated by `Box::into_raw` in `optimizer_create`.
        drop(unsafe { Box::from_raw(handle) });
    }
}

/// Applies a gradient.
///
/// # Returns
/// `0` on success, the error's code otherwise.
///
/// # Safety
/// `handle` must be live and `grad` valid for `grad_len` reads.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn optimizer_update(
    handle: *mut OptimizerHandle,
    grad: *const f32,
    grad_len: usize,
) -> i32 {
    // SAFETY: Forwarded from this function's contract.
    let (Some(handle), Some(grad)) = (unsafe { handle.as_mut() }, unsafe {
        as_slice(grad, grad_len)
    }) else {
        return NULL_POINTER;
    };

    match handle.optimizer.update(grad) {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}

/// Exposes the current parameter values.
///
/// # Returns
/// The amount of values written behind `out`, or `NULL_POINTER`.
///
/// # Safety
/// `handle` must be live and `out` valid for one write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn optimizer_get_weights(
    handle: *const OptimizerHandle,
    out: *mut *const f32,
) -> i64 {
    // SAFETY: Forwarded from this function's contract.
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        return NULL_POINTER.into();
    };

    if out.is_null() {
        return NULL_POINTER.into();
    }

    let weights = handle.optimizer.weights();
    // SAFETY: Checked non null above, the caller guarantees it's writable.
    unsafe { out.write(weights.as_ptr()) };
    weights.len() as i64
}

/// Serializes the optimizer state into the handle's state buffer.
///
/// # Returns
/// The length of the state written behind `out`, or `NULL_POINTER`.
///
/// # Safety
/// `handle` must be live and `out` valid for one write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn optimizer_get_state(
    handle: *mut OptimizerHandle,
    out: *mut *const u8,
) -> i64 {
    // SAFETY: Forwarded from this function's contract.
    let Some(handle) = (unsafe { handle.as_mut() }) else {
        return NULL_POINTER.into();
    };

    if out.is_null() {
        return NULL_POINTER.into();
    }

    handle.state = handle.optimizer.serialize_state();
    // SAFETY: Checked non null above, the caller guarantees it's writable.
    unsafe { out.write(handle.state.as_ptr()) };
    handle.state.len() as i64
}
