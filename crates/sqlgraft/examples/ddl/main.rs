//! Example rendering schema DDL from structural definitions.
//!
//! Run with:
//!   cargo run --example ddl -p sqlgraft

use sqlgraft::{
    ColumnDef, CreateIndexBuilder, CreateSequenceBuilder, CreateTableBuilder, CreateViewBuilder,
    DialectDescriptor, ForeignKeyDef, GraftError, GraftResult, IndexDef, SelectBuilder,
    SequenceDef, SqlBuilder, TableDef,
};

fn order_table() -> TableDef {
    TableDef::new("ORDERS")
        .with_column(ColumnDef::new("ID", "BIGINT").not_null())
        .with_column(ColumnDef::new("CUSTOMER_ID", "BIGINT").not_null())
        .with_column(ColumnDef::new("PRICE", "DECIMAL(12,2)"))
        .with_column(ColumnDef::new("STATUS", "VARCHAR(16)").with_default("'open'"))
        .with_primary_key(&["ID"])
        .with_foreign_key(ForeignKeyDef::new(
            "FK_ORDERS_CUSTOMER",
            &["CUSTOMER_ID"],
            "CUSTOMERS",
            &["ID"],
        ))
}

fn main() -> GraftResult<()> {
    let dialects = [
        DialectDescriptor::postgres(),
        DialectDescriptor::mysql(),
        DialectDescriptor::oracle(),
    ];

    for dialect in &dialects {
        println!("==== {} ====", dialect.name());

        let table = CreateTableBuilder::from_def(&order_table())?;
        println!("{}", table.render(dialect)?);

        let index = CreateIndexBuilder::from_def(
            &IndexDef::new("IX_ORDERS_STATUS", "ORDERS", &["STATUS"]).unique(),
        )?;
        println!("{}", index.render(dialect)?);

        let view = CreateViewBuilder::new("OPEN_ORDERS")?.as_select(
            SelectBuilder::new()
                .column("ID")?
                .column("PRICE")?
                .column("STATUS")?
                .from("ORDERS")?,
        );
        println!("{}", view.render(dialect)?);

        // Sequences are capability-gated; MySQL has none.
        let sequence = CreateSequenceBuilder::from_def(
            &SequenceDef::new("ORDER_SEQ").with_start(1000).with_increment(1),
        )?;
        match sequence.render(dialect) {
            Ok(sql) => println!("{sql}"),
            Err(GraftError::UnsupportedFeature { dialect, feature }) => {
                println!("-- skipped: {dialect} has no {feature}");
            }
            Err(other) => return Err(other),
        }

        println!();
    }

    Ok(())
}
