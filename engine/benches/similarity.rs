// Copyright (C) 2020 Kevin Del Castillo Ramírez
//
// This file is part of movie-ratings.
//
// movie-ratings is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// movie-ratings is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with movie-ratings.  If not, see <http://www.gnu.org/licenses/>.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use engine::similarity::pearson_correlation;
use rand::{thread_rng, Rng};
use std::collections::HashMap;

fn generate_records(size: i32) -> (HashMap<i32, f64>, HashMap<i32, f64>) {
    let mut rng = thread_rng();

    let mut a = HashMap::new();
    let mut b = HashMap::new();

    for i in 0..size {
        a.insert(i, rng.gen_range(1., 5.));

        // Only part of the movies are shared
        if i > (0.3 * size as f64) as i32 {
            b.insert(i, rng.gen_range(1., 5.));
        }
    }

    (a, b)
}

fn pearson_1000(c: &mut Criterion) {
    let (a, b) = generate_records(1000);

    c.bench_function("pearson 1000", |bench| {
        bench.iter(|| pearson_correlation(black_box(&a), black_box(&b)))
    });
}

fn pearson_10_000(c: &mut Criterion) {
    let (a, b) = generate_records(10_000);

    c.bench_function("pearson 10000", |bench| {
        bench.iter(|| pearson_correlation(black_box(&a), black_box(&b)))
    });
}

criterion_group! {
    name = similarity;
    config = Criterion::default();
    targets = pearson_1000, pearson_10_000
}

criterion_main!(similarity);
