// FFI bindings for C/C++/C#
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

use crate::check_json;

/// Run a JSON check request and return the JSON report
///
/// Return codes: 0 ok, -1 null pointer, -2 invalid UTF-8,
/// -3 request parse or validation failure, -4 report serialization failure.
///
/// # Safety
/// - request must be a valid null-terminated UTF-8 string
/// - report_out receives a string that must be freed with bxc_free_string
#[no_mangle]
pub unsafe extern "C" fn bxc_check_json(
    request: *const c_char,
    report_out: *mut *mut c_char,
) -> c_int {
    if request.is_null() || report_out.is_null() {
        return -1;
    }

    let request = match CStr::from_ptr(request).to_str() {
        Ok(s) => s,
        Err(_) => return -2,
    };

    let report = match check_json(request) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("check request failed: {e}");
            return -3;
        }
    };

    let json = match serde_json::to_string(&report).map(CString::new) {
        Ok(Ok(s)) => s,
        _ => return -4,
    };

    *report_out = json.into_raw();
    0
}

/// Free a string returned from bxc_check_json
///
/// # Safety
/// s must be a pointer returned from bxc_check_json, freed at most once
#[no_mangle]
pub unsafe extern "C" fn bxc_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get library version
#[no_mangle]
pub extern "C" fn bxc_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_request_through_c_strings() {
        let request = CString::new(
            r#"{
                "components": [{"id": "c1", "bbox": {"x": 0, "y": 0, "width": 100, "height": 100}, "label": "card"}],
                "detections": [
                    {"id": 1, "bbox": {"x": 10, "y": 10, "width": 50, "height": 50}, "label": "card", "score": 0.9},
                    {"id": 2, "bbox": {"x": 500, "y": 500, "width": 20, "height": 20}, "label": "icon", "score": 0.8}
                ]
            }"#,
        )
        .unwrap();

        let mut out: *mut c_char = std::ptr::null_mut();
        let code = unsafe { bxc_check_json(request.as_ptr(), &mut out) };
        assert_eq!(code, 0);
        assert!(!out.is_null());

        let report: serde_json::Value =
            serde_json::from_str(unsafe { CStr::from_ptr(out) }.to_str().unwrap()).unwrap();
        unsafe { bxc_free_string(out) };

        assert_eq!(report["summary"]["matched_entries"], 1);
        assert_eq!(report["corrections"][0]["id"], 2);
    }

    #[test]
    fn reports_error_codes() {
        let mut out: *mut c_char = std::ptr::null_mut();
        assert_eq!(unsafe { bxc_check_json(std::ptr::null(), &mut out) }, -1);

        let bad = CString::new("{not json").unwrap();
        assert_eq!(unsafe { bxc_check_json(bad.as_ptr(), &mut out) }, -3);
        assert!(out.is_null());
    }

    #[test]
    fn version_is_nul_terminated() {
        let v = unsafe { CStr::from_ptr(bxc_version()) };
        assert_eq!(v.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}
