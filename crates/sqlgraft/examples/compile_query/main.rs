//! Example compiling one entity query for several dialects and folding
//! fake result rows back into entity graphs.
//!
//! Run with:
//!   cargo run --example compile_query -p sqlgraft

use sqlgraft::{
    DialectDescriptor, EntityDef, EntityModel, Filter, GraftResult, JoinPair, ModelHandle,
    Multiplicity, NavigationDef, PropertyDef, QueryRequest, ResultRow, ValueType, compile,
    compile_count, materialize,
};

fn shop_model() -> EntityModel {
    EntityModel::new(1)
        .with_entity(
            EntityDef::new("Orders", "ORDERS")
                .with_key(&["Id"])
                .with_property(PropertyDef::new("Id", "ID", ValueType::Int))
                .with_property(PropertyDef::new("Price", "PRICE", ValueType::Decimal))
                .with_property(PropertyDef::new("Status", "STATUS", ValueType::Text))
                .with_navigation(NavigationDef::new(
                    "OrderItems",
                    "OrderItems",
                    vec![JoinPair::new("ID", "ORDER_ID")],
                    Multiplicity::OneToMany,
                )),
        )
        .with_entity(
            EntityDef::new("OrderItems", "ORDER_ITEMS")
                .with_key(&["Id"])
                .with_property(PropertyDef::new("Id", "ID", ValueType::Int))
                .with_property(PropertyDef::new("Sku", "SKU", ValueType::Text)),
        )
}

fn main() -> GraftResult<()> {
    // The handle owns the model; compilations capture a snapshot so a
    // concurrent reload never tears a query.
    let handle = ModelHandle::new(shop_model())?;
    let model = handle.snapshot();

    let request = QueryRequest::new("Orders")
        .expand("OrderItems")?
        .filter(Filter::gt("Price", 100_i64))
        .order_by_desc("Price")
        .top(10)
        .skip(20);

    for dialect in [
        DialectDescriptor::postgres(),
        DialectDescriptor::mysql(),
        DialectDescriptor::oracle(),
        DialectDescriptor::derby(),
    ] {
        let compiled = compile(&model, &request, &dialect)?;
        println!("-- {}", dialect.name());
        println!("{}", compiled.sql);
        println!("params = {:?}\n", compiled.params);
    }

    let count = compile_count(&model, &request, &DialectDescriptor::postgres())?;
    println!("-- count query\n{}\nparams = {:?}\n", count.sql, count.params);

    // Execution is external; feed the materializer rows as a driver would.
    let compiled = compile(&model, &request, &DialectDescriptor::postgres())?;
    let rows = vec![
        ResultRow::new()
            .with("ID_T0", 1_i64)
            .with("PRICE_T0", 150_i64)
            .with("STATUS_T0", "open")
            .with("ID_T1", 10_i64)
            .with("SKU_T1", "A-1"),
        ResultRow::new()
            .with("ID_T0", 1_i64)
            .with("PRICE_T0", 150_i64)
            .with("STATUS_T0", "open")
            .with("ID_T1", 11_i64)
            .with("SKU_T1", "A-2"),
    ];
    let graphs = materialize(&compiled.plan, &rows)?;
    println!(
        "materialized {} root(s); first has {} item(s)",
        graphs.len(),
        graphs[0].children["OrderItems"].len()
    );

    Ok(())
}
