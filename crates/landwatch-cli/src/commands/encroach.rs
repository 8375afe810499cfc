use landwatch_enforce::types::EncroachmentCheck;
use landwatch_geometry::GeometryEngine;
use landwatch_output::OutputFormatter;

/// Run `landwatch encroach <approved> <detected>` -- geometry only, no
/// workspace needed. Exits 1 when the footprint encroaches.
pub fn run(formatter: &dyn OutputFormatter, approved: &str, detected: &str, parcel_id: &str) -> i32 {
    let engine = GeometryEngine::new();
    let mut shapes = Vec::with_capacity(2);
    for path in [approved, detected] {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("landwatch encroach: failed to read {}: {}", path, e);
                return 2;
            }
        };
        match engine.parse(&text) {
            Ok(shape) => shapes.push(shape),
            Err(e) => {
                eprintln!("landwatch encroach: {}: {}", path, e);
                return 2;
            }
        }
    }

    match EncroachmentCheck::measure(&engine, parcel_id, &shapes[0], &shapes[1]) {
        Ok(check) => {
            print!("{}", formatter.format_encroachment(&check));
            if check.encroachment.detected {
                1
            } else {
                0
            }
        }
        Err(e) => {
            eprintln!("landwatch encroach: {}", e);
            2
        }
    }
}
