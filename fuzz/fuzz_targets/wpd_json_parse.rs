//! Fuzz target for wpd.json parsing.
//!
//! Any input that parses must also resolve (or fail) and serialize without
//! panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wpdkit::calibration::resolve;
use wpdkit::wpd::io_json::{from_wpd_slice, to_wpd_vec};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(doc) = from_wpd_slice(data) {
        let _ = resolve(&doc);
        let _ = to_wpd_vec(&doc);
    }
});
