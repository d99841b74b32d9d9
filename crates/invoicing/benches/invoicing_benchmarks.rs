use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{NaiveDate, Utc};
use facturier_core::{ClientId, InvoiceId, LineItemId};
use facturier_invoicing::{
    DiscountType, DocumentType, Invoice, InvoiceRepository, InvoiceStatus, LineItem, SplitShare,
    calculate_totals, split_invoice,
};
use facturier_parties::{Client, Company};

fn items(count: usize) -> Vec<LineItem> {
    (0..count)
        .map(|i| {
            let discount = if i % 2 == 0 {
                DiscountType::Percentage
            } else {
                DiscountType::FixedAmount
            };
            LineItem::new(
                LineItemId::from(i.to_string()),
                format!("Article {i}"),
                1.0 + (i % 7) as f64,
                12.5 * (1 + i % 13) as f64,
                20.0,
            )
            .with_discount(5.0, discount)
        })
        .collect()
}

fn invoice(id: &str, items: Vec<LineItem>) -> Invoice {
    let now = Utc::now();
    Invoice {
        id: InvoiceId::from(id),
        document_type: DocumentType::Invoice,
        number: "FA0001".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        due_date: None,
        client: Client::new(ClientId::from("c"), "Bench SARL", "bench@test.fr"),
        company: Company::default(),
        totals: calculate_totals(&items),
        items,
        signature: None,
        notes: String::new(),
        terms: String::new(),
        status: InvoiceStatus::Sent,
        created_at: now,
        updated_at: now,
    }
}

fn bench_calculate_totals(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_totals");
    for count in [1usize, 10, 100, 1_000] {
        let lines = items(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &lines, |b, lines| {
            b.iter(|| calculate_totals(black_box(lines)))
        });
    }
    group.finish();
}

fn bench_split_invoice(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_invoice");
    for shares in [2usize, 5, 10] {
        let parent = invoice("p", items(50));
        let total = parent.totals.total_ttc;
        let split: Vec<SplitShare> = (0..shares)
            .map(|_| SplitShare::new(100.0 / shares as f64, total / shares as f64))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(shares), &split, |b, split| {
            b.iter_batched(
                || {
                    let mut repo = InvoiceRepository::new();
                    let _ = repo.add_invoice(parent.clone());
                    repo
                },
                |mut repo| split_invoice(&mut repo, &InvoiceId::from("p"), black_box(split)),
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_calculate_totals, bench_split_invoice);
criterion_main!(benches);
