use std::hint::black_box;
use bencher::response_bodies;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nano_http::codec::ResponseEncoder;
use nano_http::protocol::Response;
use bytes::BytesMut;
use tokio_util::codec::Encoder;

fn benchmark_response_encoder(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("response_encoder");

    for (name, body) in response_bodies() {
        let mut response = Response::new();
        response.set_body(&body);

        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &response, |b, response| {
            let mut encoder = ResponseEncoder::new();
            let mut dst = BytesMut::with_capacity(body.len() + 128);
            b.iter(|| {
                dst.clear();
                encoder.encode(response, &mut dst).expect("encoding into memory can't fail");
                black_box(&dst);
            });
        });
    }

    group.finish();
}

criterion_group!(encoder, benchmark_response_encoder);
criterion_main!(encoder);
