use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn get_input() -> Vec<u8> {
    let mut data = Vec::with_capacity(64 * 1024);
    for i in 0..4096u32 {
        data.extend_from_slice(format!("node_{:04}:{:08x};", i % 97, i.wrapping_mul(2_654_435_761)).as_bytes());
    }
    data
}

pub mod yaz0 {
    use divan::Bencher;
    use gcn_compression::yaz0;

    #[divan::bench(sample_count = 10)]
    fn compress(bencher: Bencher) {
        bencher
            .with_inputs(super::get_input)
            .bench_refs(|data| divan::black_box(yaz0::compress(data).unwrap()));
    }

    #[divan::bench]
    fn decompress(bencher: Bencher) {
        bencher
            .with_inputs(|| yaz0::compress(&super::get_input()).unwrap())
            .bench_refs(|data| divan::black_box(yaz0::decompress(data).unwrap()));
    }
}

pub mod yay0 {
    use divan::Bencher;
    use gcn_compression::yay0;

    #[divan::bench(sample_count = 10)]
    fn compress(bencher: Bencher) {
        bencher
            .with_inputs(super::get_input)
            .bench_refs(|data| divan::black_box(yay0::compress(data).unwrap()));
    }

    #[divan::bench]
    fn decompress(bencher: Bencher) {
        bencher
            .with_inputs(|| yay0::compress(&super::get_input()).unwrap())
            .bench_refs(|data| divan::black_box(yay0::decompress(data).unwrap()));
    }
}
