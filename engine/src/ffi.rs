//! FFI layer for embedding the engine in a non-Rust host.
//!
//! All data crosses the boundary as JSON strings.
//!
//! # Memory Management
//!
//! - Strings returned by `cartform_*` functions are allocated by Rust
//! - Caller must free them with `cartform_string_free`
//!
//! # Error Handling
//!
//! Functions return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure

use crate::expand::ExpandPolicy;
use crate::transform::{CartTransform, FunctionInput};
use crate::Error;
use std::ffi::{c_char, CStr, CString};

/// Result wrapper for FFI responses.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum FfiResult<T: serde::Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: serde::Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn err(message: impl Into<String>) -> Self {
        FfiResult::Err {
            error: message.into(),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `cartform_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => {
            // String contained null bytes - return error JSON
            let error = CString::new(r#"{"error":"string contained null bytes"}"#).unwrap();
            error.into_raw()
        }
    }
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn run_transform(input_json: &str, policy: ExpandPolicy) -> String {
    let input: FunctionInput = match serde_json::from_str(input_json) {
        Ok(input) => input,
        Err(e) => {
            return FfiResult::<()>::err(Error::InvalidInput(e.to_string()).to_string()).to_json()
        }
    };

    match CartTransform::with_expand_policy(policy).run(&input.cart) {
        Ok(result) => FfiResult::ok(result).to_json(),
        Err(e) => FfiResult::<()>::err(e.to_string()).to_json(),
    }
}

/// Run the cart transform with the default expand policy.
///
/// # Arguments
/// - `input_json`: JSON string of `{"cart": {"lines": [...]}}`
///
/// # Returns
/// JSON string: `{"ok": FunctionResult}` or `{"error": "message"}`
///
/// # Safety
/// - `input_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `cartform_string_free`
#[no_mangle]
pub unsafe extern "C" fn cartform_run(input_json: *const c_char) -> *mut c_char {
    let input_str = match from_c_string(input_json) {
        Some(s) => s,
        None => return to_c_string(FfiResult::<()>::err("invalid input JSON").to_json()),
    };

    to_c_string(run_transform(&input_str, ExpandPolicy::default()))
}

/// Run the cart transform with an explicit expand policy.
///
/// # Arguments
/// - `input_json`: JSON string of `{"cart": {"lines": [...]}}`
/// - `scale_by_line_quantity`: 0 for per-parent-unit quantities (default),
///   non-zero to multiply component quantities by the line quantity
///
/// # Returns
/// JSON string: `{"ok": FunctionResult}` or `{"error": "message"}`
///
/// # Safety
/// - `input_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `cartform_string_free`
#[no_mangle]
pub unsafe extern "C" fn cartform_run_with_policy(
    input_json: *const c_char,
    scale_by_line_quantity: i32,
) -> *mut c_char {
    let input_str = match from_c_string(input_json) {
        Some(s) => s,
        None => return to_c_string(FfiResult::<()>::err("invalid input JSON").to_json()),
    };

    let policy = if scale_by_line_quantity != 0 {
        ExpandPolicy::ScaleByLineQuantity
    } else {
        ExpandPolicy::PerParentUnit
    };

    to_c_string(run_transform(&input_str, policy))
}

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `cartform_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn cartform_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get the engine version.
///
/// # Returns
/// Static string pointer (do not free)
#[no_mangle]
pub extern "C" fn cartform_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
