use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlgraft::{
    DialectDescriptor, EntityDef, EntityModel, Filter, JoinPair, Multiplicity, NavigationDef,
    PropertyDef, QueryRequest, ResultRow, ValueType, compile, materialize,
};

/// A root entity with `n` one-to-many children, each carrying a key and one
/// scalar column.
fn wide_model(n: usize) -> EntityModel {
    let mut root = EntityDef::new("Root", "ROOT")
        .with_key(&["Id"])
        .with_property(PropertyDef::new("Id", "ID", ValueType::Int))
        .with_property(PropertyDef::new("Name", "NAME", ValueType::Text));
    for i in 0..n {
        root = root.with_navigation(NavigationDef::new(
            format!("Nav{i}"),
            format!("Child{i}"),
            vec![JoinPair::new("ID", "ROOT_ID")],
            Multiplicity::OneToMany,
        ));
    }

    let mut model = EntityModel::new(1).with_entity(root);
    for i in 0..n {
        model = model.with_entity(
            EntityDef::new(format!("Child{i}"), format!("CHILD_{i}"))
                .with_key(&["Id"])
                .with_property(PropertyDef::new("Id", "ID", ValueType::Int))
                .with_property(PropertyDef::new("Value", "VALUE", ValueType::Decimal)),
        );
    }
    model
}

fn bench_compile_expands(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/expands");
    let dialect = DialectDescriptor::postgres();

    for n in [1, 4, 8, 16] {
        let model = wide_model(n);
        let mut request = QueryRequest::new("Root");
        for i in 0..n {
            request = request.expand(&format!("Nav{i}")).unwrap();
        }
        group.bench_with_input(BenchmarkId::from_parameter(n), &request, |b, request| {
            b.iter(|| black_box(compile(&model, request, &dialect).unwrap()));
        });
    }

    group.finish();
}

fn bench_compile_filter_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/filter_width");
    let dialect = DialectDescriptor::postgres();
    let model = wide_model(1);

    for n in [1, 5, 10, 50] {
        let filter = Filter::and((0..n).map(|i| Filter::eq("Name", format!("name{i}"))).collect());
        let request = QueryRequest::new("Root").filter(filter);
        group.bench_with_input(BenchmarkId::from_parameter(n), &request, |b, request| {
            b.iter(|| black_box(compile(&model, request, &dialect).unwrap()));
        });
    }

    group.finish();
}

fn bench_materialize_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize/rows");
    let model = wide_model(1);
    let request = QueryRequest::new("Root").expand("Nav0").unwrap();
    let plan = compile(&model, &request, &DialectDescriptor::postgres()).unwrap().plan;

    for n in [10, 100, 1000] {
        // Ten children per root, roots repeating every ten rows.
        let rows: Vec<ResultRow> = (0..n)
            .map(|i| {
                ResultRow::new()
                    .with("ID_T0", (i / 10) as i64)
                    .with("NAME_T0", "root")
                    .with("ID_T1", i as i64)
                    .with("VALUE_T1", 5_i64)
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| black_box(materialize(&plan, rows).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compile_expands,
    bench_compile_filter_width,
    bench_materialize_rows
);
criterion_main!(benches);
