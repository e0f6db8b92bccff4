//! Benchmarks comparing the loading strategies and the row fold.
//!
//! The fold benchmark always runs. The storage-backed comparison of
//! eager vs explicit vs raw loading needs a live database and is gated
//! on `DATABASE_URL`; without it only the in-memory benchmarks execute.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::arithmetic_side_effects,
    clippy::missing_docs_in_private_items
)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use crediario_db::rows::{ClienteEmprestimoRow, fold_clientes};
use crediario_db::{EagerLoader, ExplicitLoader, PostgresPool, RawSqlStore};
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

fn join_rows(clients: i32, loans_per_client: i32) -> Vec<ClienteEmprestimoRow> {
    let mut rows = Vec::new();
    for c in 1..=clients {
        if loans_per_client == 0 {
            rows.push(row(c, None));
            continue;
        }
        for l in 1..=loans_per_client {
            rows.push(row(c, Some(c * 1000 + l)));
        }
    }
    rows
}

fn row(cliente: i32, emprestimo: Option<i32>) -> ClienteEmprestimoRow {
    ClienteEmprestimoRow {
        id: cliente,
        nome: format!("Cliente {cliente}"),
        cpf: "12345678900".to_owned(),
        emprestimo_id: emprestimo,
        valor: emprestimo.map(|_| Decimal::new(100_000, 2)),
        parcelas: emprestimo.map(|_| 12),
        taxa_juros: emprestimo.map(|_| Decimal::new(25, 1)),
        emprestimo_cliente_id: emprestimo.map(|_| cliente),
    }
}

fn bench_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("fold_clientes");
    for &(clients, loans) in &[(10, 5), (100, 5), (1000, 3)] {
        let rows = join_rows(clients, loans);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{clients}x{loans}")),
            &rows,
            |b, rows| {
                b.iter(|| black_box(fold_clientes(black_box(rows.clone()))));
            },
        );
    }
    group.finish();
}

fn bench_strategies(c: &mut Criterion) {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping storage-backed strategy benchmarks");
        return;
    };

    let rt = Runtime::new().expect("tokio runtime");
    let pool = rt
        .block_on(async {
            let pg = PostgresPool::connect_url(&url).await?;
            pg.run_migrations().await?;
            Ok::<_, crediario_db::DbError>(pg.pool().clone())
        })
        .expect("database setup failed");

    let eager = EagerLoader::new(pool.clone());
    let explicit = ExplicitLoader::new(pool.clone());
    let raw = RawSqlStore::new(pool);

    let mut group = c.benchmark_group("clientes_com_emprestimos");
    group.bench_function("eager_join", |b| {
        b.iter(|| {
            let clientes = rt
                .block_on(eager.clientes_com_emprestimos())
                .expect("eager load failed");
            black_box(clientes)
        });
    });
    group.bench_function("explicit_n_plus_one", |b| {
        b.iter(|| {
            let clientes = rt
                .block_on(explicit.clientes_com_emprestimos())
                .expect("explicit load failed");
            black_box(clientes)
        });
    });
    group.bench_function("raw_join", |b| {
        b.iter(|| {
            let clientes = rt
                .block_on(raw.clientes_com_emprestimos())
                .expect("raw load failed");
            black_box(clientes)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_fold, bench_strategies);
criterion_main!(benches);
