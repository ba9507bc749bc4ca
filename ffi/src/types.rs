//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type in a C-compatible shape: `*mut c_char`
//! instead of `String` and enums with explicit discriminants. Conversion
//! helpers live here to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use rest_plugin_core::{ExecuteError, Hook, RestApiPlugin};

/// Opaque handle to a `RestApiPlugin`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiRestPlugin {
    pub(crate) inner: RestApiPlugin,
}

/// Host lifecycle hook as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHook {
    PostPrompt = 0,
    OnResponse = 1,
    OnPlanning = 2,
    PostPlanning = 3,
    PreInstruction = 4,
    OnInstruction = 5,
    PostInstruction = 6,
    PreCommand = 7,
    PostCommand = 8,
    ChatCompletion = 9,
}

impl From<FfiHook> for Hook {
    fn from(h: FfiHook) -> Self {
        match h {
            FfiHook::PostPrompt => Hook::PostPrompt,
            FfiHook::OnResponse => Hook::OnResponse,
            FfiHook::OnPlanning => Hook::OnPlanning,
            FfiHook::PostPlanning => Hook::PostPlanning,
            FfiHook::PreInstruction => Hook::PreInstruction,
            FfiHook::OnInstruction => Hook::OnInstruction,
            FfiHook::PostInstruction => Hook::PostInstruction,
            FfiHook::PreCommand => Hook::PreCommand,
            FfiHook::PostCommand => Hook::PostCommand,
            FfiHook::ChatCompletion => Hook::ChatCompletion,
        }
    }
}

/// Error codes returned in `FfiExecuteResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidMethod = 1,
    MalformedHeaders = 2,
    MalformedBody = 3,
    Transport = 4,
    Panic = 5,
    NullArg = 6,
    Command = 7,
}

/// Result envelope for `rest_plugin_execute`.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `output`
/// holds the text for the agent (envelope JSON or failure report).
/// On failure `output` is null and `error_message` describes the problem.
#[repr(C)]
pub struct FfiExecuteResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub output: *mut c_char,
}

impl FfiExecuteResult {
    pub(crate) fn ok(output: String) -> *mut Self {
        Box::into_raw(Box::new(FfiExecuteResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            output: into_c_string(output),
        }))
    }

    pub(crate) fn from_error(err: ExecuteError) -> *mut Self {
        let error_code = match &err {
            ExecuteError::InvalidMethod(_) => FfiErrorCode::InvalidMethod,
            ExecuteError::MalformedHeaders(_) => FfiErrorCode::MalformedHeaders,
            ExecuteError::MalformedBody(_) => FfiErrorCode::MalformedBody,
            ExecuteError::Transport(_) => FfiErrorCode::Transport,
            ExecuteError::MissingArgument(_) | ExecuteError::UnknownCommand(_) => {
                FfiErrorCode::Command
            }
        };
        Self::error(error_code, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg.to_string())
    }

    fn error(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiExecuteResult {
            error_code,
            error_message: into_c_string(msg),
            output: std::ptr::null_mut(),
        }))
    }
}

/// Hand a Rust string to C. Interior NUL bytes are dropped.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}
