// Use codspeed-criterion-compat when running on CodSpeed (CI), real criterion otherwise (for flamegraphs)
#[cfg(codspeed)]
use codspeed_criterion_compat::{Bencher, Criterion, black_box, criterion_group, criterion_main};
#[cfg(not(codspeed))]
use criterion::{Bencher, Criterion, black_box, criterion_group, criterion_main};
use whorl::{Builtins, Object, ResourceLimits, Runtime};

/// Builds `enumerate(map(add, repeat(left), right))` over `len` ints and drains it.
///
/// The pipeline is rebuilt for every iteration so the measured time covers
/// construction as well as stepping.
fn run_pipeline(bench: &mut Bencher, len: i64) {
    let expected = usize::try_from(len).unwrap();
    bench.iter(|| {
        let mut rt = Runtime::default();
        let add = rt.builtin(Builtins::Add);
        let left = rt.load(Object::from(vec![1_i64, 2, 3])).unwrap();
        let right = rt.load(Object::List((0..len).map(Object::Int).collect())).unwrap();
        let cycled = rt.repeat(&left).unwrap();
        let sums = rt.map(&add, &[&cycled, &right]).unwrap();
        let pairs = rt.enumerate(&sums, 0).unwrap();

        let mut count = 0;
        while let Some(pair) = rt.next(&pairs).unwrap() {
            black_box(pair);
            count += 1;
        }
        assert_eq!(count, expected);
    });
}

/// Same pipeline with a collection before every allocation.
///
/// Measures the cost of mark-sweep with the adapters' scoped roots in place.
fn run_pipeline_gc_every_allocation(bench: &mut Bencher, len: i64) {
    bench.iter(|| {
        let mut rt = Runtime::with_limits(ResourceLimits::new().gc_interval(1));
        let pack = rt.builtin(Builtins::Pack);
        let left = rt.load(Object::from("abc")).unwrap();
        let right = rt.load(Object::List((0..len).map(Object::Int).collect())).unwrap();
        let cycled = rt.repeat(&left).unwrap();
        let packed = rt.map(&pack, &[&cycled, &right]).unwrap();

        while let Some(item) = rt.next(&packed).unwrap() {
            black_box(item);
        }
    });
}

/// Drains a long str through `list(repeat(..))` bounded by `map`.
fn run_list_builtin(bench: &mut Bencher, len: i64) {
    bench.iter(|| {
        let mut rt = Runtime::default();
        let list = rt.builtin(Builtins::List);
        let add = rt.builtin(Builtins::Add);
        let letters = rt.load(Object::from("xyz")).unwrap();
        let counts = rt.load(Object::List((0..len).map(|_| Object::from("!")).collect())).unwrap();
        let cycled = rt.repeat(&letters).unwrap();
        let joined = rt.map(&add, &[&cycled, &counts]).unwrap();
        let drained = rt.call(&list, &[&joined], &[]).unwrap();
        black_box(rt.get(&drained));
    });
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("pipeline_100", |b| run_pipeline(b, 100));
    c.bench_function("pipeline_10000", |b| run_pipeline(b, 10_000));
    c.bench_function("pipeline_gc_every_allocation_100", |b| {
        run_pipeline_gc_every_allocation(b, 100);
    });
    c.bench_function("list_builtin_1000", |b| run_list_builtin(b, 1000));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
