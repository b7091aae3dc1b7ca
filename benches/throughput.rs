use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use adiflog::core::{
    parser::{AdifParser, ParserConfig},
    stream::StreamParser,
};

fn log_text(n: usize) -> String {
    let mut out = String::from("Generated log\n<adif_ver:5>3.1.4 <programid:7>adiflog <eoh>\n");
    for i in 0..n {
        out.push_str(&format!(
            "<call:6>K{:05} <qso_date:8>20240315 <time_on:6>1{:05} <band:3>20m <freq:7>14.0{:03} \
             <mode:2>CW <dxcc:3>291 <cqz:1>5 <ituz:1>8 <tx_pwr:3>100 <comment:9>tnx &lt;73 <eor>\n",
            i % 100_000,
            i % 60,
            i % 1000,
        ));
    }
    out
}

fn bench_whole_buffer(c: &mut Criterion) {
    let text = log_text(20_000);
    c.bench_function("parse_20k_records", |b| {
        b.iter(|| {
            let recs = AdifParser::new().parse(&text).expect("parse");
            assert_eq!(recs.len(), 20_000);
        });
    });
}

fn bench_chunked(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_chunk_size");
    let text = log_text(5_000);

    for size in [64usize, 1024usize, 16 * 1024usize] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut stream = StreamParser::new(ParserConfig::default());
                for chunk in text.as_bytes().chunks(size) {
                    stream
                        .feed(std::str::from_utf8(chunk).expect("ascii"))
                        .expect("feed");
                }
                stream.finish().expect("finish")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_whole_buffer, bench_chunked);
criterion_main!(benches);
