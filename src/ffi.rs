//! FFI bindings for EyeRest Flux
//!
//! This module provides C-compatible functions for calling Flux from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `eyerest_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::PipelineConfig;
use crate::error::ComputeError;
use crate::pipeline::{measure_frame, EyeMetricsProcessor};
use crate::types::LandmarkSet;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Return a JSON result as a C string, or NULL with the last error set
fn json_result(result: Result<String, ComputeError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

fn measure_json(json: &str) -> Result<String, ComputeError> {
    let landmarks: LandmarkSet = serde_json::from_str(json)?;
    let measurement = measure_frame(&landmarks)?;
    Ok(serde_json::to_string(&measurement)?)
}

fn process_json(
    processor: &mut EyeMetricsProcessor,
    json: &str,
    timestamp_ms: f64,
) -> Result<String, ComputeError> {
    let landmarks: Option<LandmarkSet> = serde_json::from_str(json)?;
    match landmarks {
        Some(landmarks) => {
            let record = processor.process(&landmarks, timestamp_ms)?;
            Ok(serde_json::to_string(&record)?)
        }
        None => Ok("null".to_string()),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Measure one landmark set (JSON array of points) and return the measurement JSON.
///
/// # Safety
/// - `landmarks_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `eyerest_free_string`.
/// - Returns NULL on error; call `eyerest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn eyerest_measure_frame(landmarks_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json = match cstr_to_string(landmarks_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid landmarks string pointer");
            return ptr::null_mut();
        }
    };

    json_result(measure_json(&json))
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to an EyeMetricsProcessor
pub struct EyeRestProcessorHandle {
    processor: EyeMetricsProcessor,
}

/// Create a processor from a JSON configuration (NULL for defaults).
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Must be freed with `eyerest_processor_free`.
/// - Returns NULL on error; call `eyerest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn eyerest_processor_new(
    config_json: *const c_char,
) -> *mut EyeRestProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        PipelineConfig::default()
    } else {
        let json = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match PipelineConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match EyeMetricsProcessor::new(config) {
        Ok(processor) => Box::into_raw(Box::new(EyeRestProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `eyerest_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn eyerest_processor_free(processor: *mut EyeRestProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Start a clean session at `now_ms`.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `eyerest_processor_new`.
/// - Returns 0 on success, -1 on a NULL processor.
#[no_mangle]
pub unsafe extern "C" fn eyerest_processor_reset(
    processor: *mut EyeRestProcessorHandle,
    now_ms: f64,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    (*processor).processor.reset(now_ms);
    0
}

/// Process one frame's landmarks and return the metrics record JSON.
///
/// `landmarks_json` is a JSON array of points, or the literal `null` when no
/// face was detected; in that case the returned string is also `null`.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `eyerest_processor_new`.
/// - `landmarks_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `eyerest_free_string`.
/// - Returns NULL on error; call `eyerest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn eyerest_processor_process(
    processor: *mut EyeRestProcessorHandle,
    landmarks_json: *const c_char,
    timestamp_ms: f64,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let json = match cstr_to_string(landmarks_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid landmarks string pointer");
            return ptr::null_mut();
        }
    };

    json_result(process_json(&mut handle.processor, &json, timestamp_ms))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Flux functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Flux function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn eyerest_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Flux function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn eyerest_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn eyerest_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
