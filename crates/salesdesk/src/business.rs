use salesdesk_core::schema::{Catalog, Column};

/// The sales back-office schema: customers, products, quotations,
/// orders, order line items, invoices and payments.
///
/// The catalog can never fail to build; the declarations below are
/// checked by the same validation any caller-supplied schema goes
/// through.
pub fn business_schema() -> Catalog {
    let mut builder = Catalog::builder();

    builder
        .table("customers")
        .id_prefix("CUST")
        .column(Column::text("customer_id"))
        .column(Column::text("name").not_null())
        .column(Column::text("email").default_value(""))
        .column(Column::text("phone").default_value(""))
        .column(Column::text("address").default_value(""))
        .primary_key(["customer_id"]);

    builder
        .table("products")
        .id_prefix("PROD")
        .column(Column::text("product_id"))
        .column(Column::text("name").not_null())
        .column(Column::text("description").default_value(""))
        .column(Column::real("unit_price").not_null().default_value(0.0))
        .column(Column::real("tax_rate").not_null().default_value(18.0))
        .primary_key(["product_id"]);

    builder
        .table("quotations")
        .id_prefix("QUO")
        .column(Column::text("quotation_id"))
        .column(Column::text("customer_id").not_null())
        .column(Column::text("product_id").not_null())
        .column(Column::integer("quantity").not_null().default_value(1))
        .column(Column::real("discount").not_null().default_value(0.0))
        .column(Column::date("quotation_date").not_null().default_today_plus(0))
        .primary_key(["quotation_id"])
        .foreign_key("customer_id", "customers", "customer_id")
        .foreign_key("product_id", "products", "product_id");

    builder
        .table("orders")
        .id_prefix("ORD")
        .column(Column::text("order_id"))
        // an order may exist without a prior quotation
        .column(Column::text("quotation_id"))
        .column(Column::text("customer_id").not_null())
        .column(Column::date("order_date").not_null().default_today_plus(0))
        .column(Column::text("status").not_null().default_value("Pending"))
        .primary_key(["order_id"])
        .foreign_key("quotation_id", "quotations", "quotation_id")
        .foreign_key("customer_id", "customers", "customer_id");

    builder
        .table("order_items")
        .column(Column::text("order_id"))
        .column(Column::integer("line_no"))
        .column(Column::text("product_id").not_null())
        .column(Column::integer("quantity").not_null().default_value(1))
        .column(
            Column::real("unit_price")
                .not_null()
                .default_from_parent("products", "unit_price"),
        )
        .primary_key(["order_id", "line_no"])
        .foreign_key("order_id", "orders", "order_id")
        .foreign_key("product_id", "products", "product_id");

    builder
        .table("invoices")
        .id_prefix("INV")
        .column(Column::text("invoice_id"))
        .column(Column::text("order_id").not_null())
        .column(Column::date("invoice_date").not_null().default_today_plus(0))
        .column(Column::date("due_date").not_null().default_today_plus(14))
        .column(Column::real("amount").not_null().default_value(0.0))
        .primary_key(["invoice_id"])
        .foreign_key("order_id", "orders", "order_id");

    builder
        .table("payments")
        .id_prefix("PAY")
        .column(Column::text("payment_id"))
        .column(Column::text("invoice_id").not_null())
        .column(Column::date("payment_date").not_null().default_today_plus(0))
        .column(Column::real("amount").not_null().default_value(0.0))
        .column(Column::text("method").not_null().default_value("UPI"))
        .primary_key(["payment_id"])
        .foreign_key("invoice_id", "invoices", "invoice_id");

    match builder.build() {
        Ok(catalog) => catalog,
        Err(err) => unreachable!("the built-in schema is valid: {err}"),
    }
}
