//! Fuzz target for TRON address decoding.
//!
//! Feeds arbitrary strings through format validation, Base58Check decoding,
//! and the hex conversion helpers. None of them may panic, and anything that
//! decodes must re-encode to the same address.
//!
//! # Running
//!
//! ```bash
//! cargo +nightly fuzz run address_decode
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use tronpay_crypto::address::{
    address_to_hex, hex_to_address, validate_address, verify_address_checksum,
};

fuzz_target!(|data: &[u8]| {
    let Ok(candidate) = std::str::from_utf8(data) else {
        return;
    };

    let well_formed = validate_address(candidate);

    if let Ok(hex) = address_to_hex(candidate) {
        assert!(well_formed, "checksum passed but format check failed: {candidate}");
        let round_trip = hex_to_address(&hex).expect("decoded payload must re-encode");
        assert_eq!(round_trip, candidate);
    }

    let _ = verify_address_checksum(candidate);
    let _ = hex_to_address(candidate);
});
