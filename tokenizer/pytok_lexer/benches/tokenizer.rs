use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use pytok_lexer::{tokenize, SourceBuffer};

fn generate_script(functions: usize) -> String {
    let mut content = String::new();
    for i in 0..functions {
        content.push_str(&format!(
            "# handler number {0}\n\
             def handler_{0}(payload, retries={1}):\n\
             \x20   total = 0\n\
             \x20   for item in payload:\n\
             \x20       total += item ** 2\n\
             \x20   if total > {2}:\n\
             \x20       return 'overflow %d' % total\n\
             \x20   return total\n\n",
            i,
            i % 5,
            1000 + i
        ));
    }
    content
}

fn bench_tokenize(c: &mut Criterion) {
    let source = generate_script(500);
    let mut group = c.benchmark_group("tokenize");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("full_stream", |b| {
        b.iter(|| tokenize(&source).unwrap().len())
    });
    group.finish();
}

fn bench_transforms(c: &mut Criterion) {
    let source = generate_script(500);
    let buffer = SourceBuffer::from_source(&source).unwrap();
    let mut group = c.benchmark_group("transforms");
    group.bench_function("scrubbed", |b| b.iter(|| buffer.scrubbed().unwrap().len()));
    group.bench_function("delex", |b| b.iter(|| buffer.delex().len()));
    group.bench_function("corpus", |b| b.iter(|| buffer.corpus().len()));
    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_transforms);
criterion_main!(benches);
