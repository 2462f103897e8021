#![no_main]

use bytes::Bytes;
use hrana_protocol::{PipelineResponse, WireMessage};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must survive a re-encode and decode again.
    if let Ok(response) = PipelineResponse::decode(Bytes::copy_from_slice(data)) {
        let encoded = response.encode();
        let _ = PipelineResponse::decode(encoded);
    }
});
