#![no_main]
use libfuzzer_sys::fuzz_target;
use meterstream::Dashboard;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Decoding must never panic, whatever the shape
    let _ = meterstream::wire::decode_frame(text);

    // Neither may merging whatever decoded, including the derived rows
    let mut dashboard = Dashboard::new();
    if dashboard.apply_frame(text).is_ok() {
        let snapshot = dashboard.state();
        for device in snapshot.readings.keys() {
            let _ = snapshot.rows(device);
        }
    }
});
