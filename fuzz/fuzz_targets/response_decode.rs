#![no_main]

use libfuzzer_sys::fuzz_target;
use message::ServerResponse;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let response = ServerResponse::decode(&text);
    let _ = response.is_success();
    let _ = response.winners_count();
    let _ = response.to_string();
});
