use criterion::{black_box, criterion_group, criterion_main, Criterion};

use abikit::abi::{decode, encode};
use abikit::{Abi, Param, ParamType, Query, ResolveOptions, Value};

const DECLARATIONS: &[&str] = &[
    "function safeTransferFrom(address from, address to, uint256 tokenId)",
    "function safeTransferFrom(address from, address to, uint256 tokenId, bytes data)",
    "function lookup(address key)",
    "function lookup(bytes20 key)",
];

fn order_params() -> Vec<Param> {
    let line = ParamType::Tuple(vec![
        Param::new("sku", ParamType::FixedBytes(8)),
        Param::new("quantity", ParamType::Uint(32)),
        Param::new("note", ParamType::String),
    ]);
    vec![
        Param::new("buyer", ParamType::Address),
        Param::new("lines", ParamType::Array(Box::new(line))),
        Param::new("total", ParamType::Uint(256)),
    ]
}

fn order_values() -> Vec<Value> {
    let line = |n: u64| {
        Value::Tuple(vec![
            Value::bytes(n.to_be_bytes().to_vec()),
            Value::from(n),
            Value::from(format!("line item {}", n)),
        ])
    };
    vec![
        Value::from("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d"),
        Value::Array((0..16).map(line).collect()),
        Value::uint(1_000_000),
    ]
}

fn encode_bench(c: &mut Criterion) {
    let params = order_params();
    let values = order_values();
    c.bench_function("encode_nested_order", |b| {
        b.iter(|| encode(black_box(&params), black_box(&values)).unwrap())
    });
}

fn decode_bench(c: &mut Criterion) {
    let params = order_params();
    let data = encode(&params, &order_values()).unwrap();
    c.bench_function("decode_nested_order", |b| {
        b.iter(|| decode(black_box(&params), black_box(&data)).unwrap())
    });
}

fn resolve_bench(c: &mut Criterion) {
    let abi = Abi::parse_human_readable(DECLARATIONS).unwrap();
    let args = [
        Value::from("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d"),
        Value::from("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"),
        Value::uint(7),
        Value::from("0xcafe"),
    ];
    c.bench_function("resolve_overload", |b| {
        b.iter(|| {
            let query = Query::NameWithArgs {
                name: "safeTransferFrom",
                args: black_box(&args),
            };
            abi.resolve(&query, ResolveOptions::default()).unwrap()
        })
    });
}

criterion_group! {
    name = codec_benches;
    config = Criterion::default();
    targets = encode_bench, decode_bench, resolve_bench
}

criterion_main!(codec_benches);
