use criterion::{black_box, criterion_group, criterion_main, Criterion};
use netatmo_public::{normalize, RawResponse};
use serde_json::{json, Value};

fn synthetic_response(stations: usize) -> RawResponse {
    let body: Vec<Value> = (0..stations)
        .map(|i| {
            let ts = 1536149000 + i as i64;
            json!({
                "_id": format!("70:ee:50:{:02x}:{:02x}:00", i / 256, i % 256),
                "place": {
                    "location": [10.0 + i as f64 * 0.001, 56.0],
                    "altitude": 30,
                    "timezone": "Europe/Copenhagen"
                },
                "measures": {
                    "outdoor": {"res": {ts.to_string(): [18.5, 71]}, "type": ["temperature", "humidity"]},
                    "indoor": {"res": {ts.to_string(): [1012.4]}, "type": ["pressure"]},
                    "rain": {"rain_60min": 0.1, "rain_24h": 2.3, "rain_live": 0, "rain_timeutc": ts}
                }
            })
        })
        .collect();
    RawResponse::new(json!({"status": "ok", "body": body}))
}

fn bench_normalize(c: &mut Criterion) {
    let raw = synthetic_response(2_000);
    c.bench_function("normalize", |b| b.iter(|| normalize(black_box(&raw), false)));
    c.bench_function("normalize_convert", |b| {
        b.iter(|| normalize(black_box(&raw), true))
    });
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
