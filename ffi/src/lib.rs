//! C-ABI wrapper around `rest-plugin-core`.
//!
//! # Overview
//! Exposes the REST API plugin through `extern "C"` functions so a host
//! written in any language with a C FFI can load it, query which hooks it
//! handles, and run the `send_rest_request` command.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `rest_plugin_execute` mirrors `RequestExecutor::execute` 1:1; null
//!   `headers`/`body` mean "absent".
//! - The C caller owns all returned pointers and must call the matching
//!   `rest_plugin_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Once;

use rest_plugin_core::{Plugin, RestApiPlugin};
use tracing_subscriber::EnvFilter;

use types::*;

static LOGGING: Once = Once::new();

// ---------------------------------------------------------------------------
// Plugin lifecycle
// ---------------------------------------------------------------------------

/// Install a `tracing` subscriber that writes to stderr, filtered by
/// `RUST_LOG`. Calling it more than once is harmless.
#[unsafe(no_mangle)]
pub extern "C" fn rest_plugin_init_logging() {
    let _ = catch_unwind(|| {
        LOGGING.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                )
                .with_writer(std::io::stderr)
                .try_init();
        });
    });
}

/// Create a plugin whose transport is configured from the environment.
///
/// Returns null if the configuration is invalid or an internal panic occurs.
/// The caller must free the returned pointer with `rest_plugin_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_plugin_new() -> *mut FfiRestPlugin {
    catch_unwind(|| match RestApiPlugin::from_env() {
        Ok(plugin) => Box::into_raw(Box::new(FfiRestPlugin { inner: plugin })),
        Err(err) => {
            tracing::error!(%err, "invalid plugin configuration");
            std::ptr::null_mut()
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a plugin created by `rest_plugin_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_plugin_free(plugin: *mut FfiRestPlugin) {
    if !plugin.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(plugin) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Metadata and hooks
// ---------------------------------------------------------------------------

/// Plugin name as a newly allocated C string, or null if `plugin` is null.
/// Free with `rest_plugin_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_plugin_name(plugin: *const FfiRestPlugin) -> *mut c_char {
    metadata(plugin, |p| p.name().to_string())
}

/// Plugin version as a newly allocated C string, or null if `plugin` is null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_plugin_version(plugin: *const FfiRestPlugin) -> *mut c_char {
    metadata(plugin, |p| p.version().to_string())
}

/// Plugin description as a newly allocated C string, or null if `plugin` is null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_plugin_description(plugin: *const FfiRestPlugin) -> *mut c_char {
    metadata(plugin, |p| p.description().to_string())
}

fn metadata(plugin: *const FfiRestPlugin, field: fn(&RestApiPlugin) -> String) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if plugin.is_null() {
            return std::ptr::null_mut();
        }
        let plugin = unsafe { &*plugin };
        into_c_string(field(&plugin.inner))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Whether the plugin handles `hook`. False for a null plugin.
#[unsafe(no_mangle)]
pub extern "C" fn rest_plugin_can_handle(plugin: *const FfiRestPlugin, hook: FfiHook) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if plugin.is_null() {
            return false;
        }
        let plugin = unsafe { &*plugin };
        plugin.inner.can_handle(hook.into())
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Execute
// ---------------------------------------------------------------------------

/// Read an optional C string. Null means absent; invalid UTF-8 is replaced.
fn optional_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Send one HTTP request and return the text for the agent.
///
/// `method` and `url` are required. `headers` (JSON object) and `body`
/// (any JSON value) may be null. Blocks until the response arrives.
/// The caller must free the result with `rest_plugin_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_plugin_execute(
    plugin: *const FfiRestPlugin,
    method: *const c_char,
    url: *const c_char,
    headers: *const c_char,
    body: *const c_char,
) -> *mut FfiExecuteResult {
    catch_unwind(AssertUnwindSafe(|| {
        if plugin.is_null() {
            return FfiExecuteResult::null_arg("plugin");
        }
        let Some(method) = optional_str(method) else {
            return FfiExecuteResult::null_arg("method");
        };
        let Some(url) = optional_str(url) else {
            return FfiExecuteResult::null_arg("url");
        };
        let headers = optional_str(headers);
        let body = optional_str(body);

        let plugin = unsafe { &*plugin };
        match plugin
            .inner
            .executor()
            .execute(&method, &url, headers.as_deref(), body.as_deref())
        {
            Ok(output) => FfiExecuteResult::ok(output),
            Err(e) => FfiExecuteResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiExecuteResult::panic("panic in rest_plugin_execute"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiExecuteResult` returned by `rest_plugin_execute`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_plugin_free_result(result: *mut FfiExecuteResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.output.is_null() {
            drop(unsafe { CString::from_raw(result.output) });
        }
    }));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_plugin_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
