//! Benchmark: per-box stencil kernels
//!
//! Measures operator application and one red-black sweep on cubic boxes of
//! growing size.
//!
//! Run with:
//!   cargo bench -p math-mlmg --bench kernels

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use math_mlmg::{BoundaryCoupling, Fab, IndexBox, abec_adotx, abec_gsrb};
use std::time::Duration;

struct BoxData {
    bx: IndexBox<3>,
    x: Fab<f64, 3>,
    y: Fab<f64, 3>,
    rhs: Fab<f64, 3>,
    a: Fab<f64, 3>,
    b: [Fab<f64, 3>; 3],
    coupling: BoundaryCoupling<3>,
}

fn box_data(n: i32) -> BoxData {
    let bx = IndexBox::from_size([n, n, n]);
    let mut x = Fab::new(bx.grow(1), 1, 0.0);
    for iv in bx.grow(1).cells() {
        let v = ((iv[0] * 31 + iv[1] * 17 + iv[2] * 7) % 13) as f64 / 13.0;
        x.set(iv, 0, v);
    }
    BoxData {
        bx,
        x,
        y: Fab::new(bx, 1, 0.0),
        rhs: Fab::new(bx, 1, 1.0),
        a: Fab::new(bx, 1, 1.0),
        b: std::array::from_fn(|d| Fab::new(bx.surrounding_nodes(d), 1, 1.0)),
        coupling: BoundaryCoupling::inactive(bx),
    }
}

fn bench_adotx(c: &mut Criterion) {
    let mut group = c.benchmark_group("abec_adotx_3d");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for &n in &[8, 16, 32] {
        let mut data = box_data(n);
        group.throughput(Throughput::Elements(data.bx.num_pts() as u64));

        group.bench_with_input(BenchmarkId::new("cells", n), &n, |bench, _| {
            let b = [data.b[0].view(), data.b[1].view(), data.b[2].view()];
            bench.iter(|| {
                abec_adotx(
                    &data.bx,
                    &mut data.y.view_mut(),
                    &data.x.view(),
                    &data.a.view(),
                    &b,
                    [1.0; 3],
                    1.0,
                    1.0,
                );
                black_box(data.y.get(data.bx.lo, 0))
            });
        });
    }

    group.finish();
}

fn bench_gsrb(c: &mut Criterion) {
    let mut group = c.benchmark_group("abec_gsrb_3d");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for &n in &[8, 16, 32] {
        let mut data = box_data(n);
        group.throughput(Throughput::Elements(data.bx.num_pts() as u64));

        group.bench_with_input(BenchmarkId::new("sweep", n), &n, |bench, _| {
            let b = [data.b[0].view(), data.b[1].view(), data.b[2].view()];
            let couplings = data.coupling.views();
            bench.iter(|| {
                for redblack in [0, 1] {
                    abec_gsrb(
                        &data.bx,
                        &mut data.x.view_mut(),
                        &data.rhs.view(),
                        1.0,
                        [1.0; 3],
                        &data.a.view(),
                        &b,
                        &couplings,
                        &data.bx,
                        1,
                        redblack,
                    );
                }
                black_box(data.x.get(data.bx.lo, 0))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_adotx, bench_gsrb);
criterion_main!(benches);
