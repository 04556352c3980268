//! C-FFI layer for SGF, used by Go (cgo) and other FFI consumers.
//!
//! No format logic lives here. All calls delegate to `sgf-core`.
//!
//! # Memory
//!
//! Every non-null `*mut c_char` handed out is allocated via `CString`
//! and must be released with `sgf_free_string()`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use sgf_core::{Game, PropertySchema};

/// Outcome of an FFI call.
/// Exactly one of `result` and `error` is non-null.
#[repr(C)]
pub struct SgfResult {
    pub result: *mut c_char,
    pub error: *mut c_char,
}

impl SgfResult {
    fn ok(value: String) -> Self {
        SgfResult {
            result: into_c_string(value),
            error: std::ptr::null_mut(),
        }
    }

    fn err(message: String) -> Self {
        SgfResult {
            result: std::ptr::null_mut(),
            error: into_c_string(message),
        }
    }
}

/// Interior NUL bytes cannot cross the boundary; they are dropped.
fn into_c_string(value: String) -> *mut c_char {
    let bytes: Vec<u8> = value.into_bytes().into_iter().filter(|&b| b != 0).collect();
    CString::new(bytes).unwrap_or_default().into_raw()
}

/// Returns None if the pointer is null or not valid UTF-8.
unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Parse SGF text with the Go schema and return the syntax tree as JSON.
///
/// # Safety
/// `text` must be a valid null-terminated UTF-8 C string.
/// The caller must free the returned strings with `sgf_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn sgf_parse(text: *const c_char) -> SgfResult {
    let Some(text) = cstr_to_str(text) else {
        return SgfResult::err("null or invalid UTF-8 input".into());
    };

    match sgf_core::parser::parse_text(text, &sgf_core::go::Go::schema()) {
        Ok(collection) => match serde_json::to_string_pretty(&collection) {
            Ok(json) => SgfResult::ok(json),
            Err(e) => SgfResult::err(format!("Serialization error: {}", e)),
        },
        Err(e) => SgfResult::err(e.to_string()),
    }
}

/// Normalize SGF text to canonical form.
///
/// # Safety
/// `text` must be a valid null-terminated UTF-8 C string.
/// The caller must free the returned strings with `sgf_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn sgf_normalize(text: *const c_char) -> SgfResult {
    let Some(text) = cstr_to_str(text) else {
        return SgfResult::err("null or invalid UTF-8 input".into());
    };

    match sgf_core::normalizer::normalize(text) {
        Ok(normalized) => SgfResult::ok(normalized),
        Err(e) => SgfResult::err(e.to_string()),
    }
}

/// SHA-256 of the canonical form, as lowercase hex.
///
/// # Safety
/// `text` must be a valid null-terminated UTF-8 C string.
/// The caller must free the returned strings with `sgf_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn sgf_canonical_hash(text: *const c_char) -> SgfResult {
    let Some(text) = cstr_to_str(text) else {
        return SgfResult::err("null or invalid UTF-8 input".into());
    };

    match sgf_core::parser::parse_text(text, &PropertySchema::general()) {
        Ok(collection) => SgfResult::ok(sgf_core::normalizer::compute_canonical_hash(&collection)),
        Err(e) => SgfResult::err(e.to_string()),
    }
}

/// Free a string previously returned by an SGF FFI function.
///
/// # Safety
/// `ptr` must be a pointer previously returned by an SGF FFI function,
/// or null (in which case this is a no-op).
#[no_mangle]
pub unsafe extern "C" fn sgf_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}
