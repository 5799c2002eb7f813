use salesdesk::{business_schema, Db, Record, Value};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salesdesk=debug".into()),
        )
        .init();

    let db = Db::builder()
        .catalog(business_schema())
        .connect("sqlite::memory:")?;

    // Seed a product, then let the engine fill in everything else.
    let product: Record = [
        ("product_id", Value::from("PROD001")),
        ("name", Value::from("Laser Cutter")),
        ("unit_price", Value::from(1499.0)),
        ("tax_rate", Value::from(18.0)),
    ]
    .into_iter()
    .collect();
    db.insert("products", &product)?;

    let order = db.create_default("orders")?;
    println!("order:    {order:?}");

    let item = db.create_default("order_items")?;
    println!("line:     {item:?}");

    let invoice = db.create_default("invoices")?;
    println!("invoice:  {invoice:?}");

    db.update(
        "orders",
        &[("order_id", order.get("order_id").cloned().unwrap_or_default())]
            .into_iter()
            .collect(),
        &[("status", Value::from("Confirmed"))].into_iter().collect(),
    )?;

    for row in db.list("orders")? {
        println!("listed:   {row:?}");
    }
    Ok(())
}
