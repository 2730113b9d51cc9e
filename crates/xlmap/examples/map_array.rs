//! Example: Expose a function over records as an array function

use xlmap::prelude::*;

#[derive(Debug, Default, Clone)]
struct Order {
    customer: String,
    amount: f64,
}

impl Record for Order {
    fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
        builder
            .property("Customer", |o| o.customer.clone(), |o, v| o.customer = v)
            .property("Amount", |o| o.amount, |o, v| o.amount = v)
            .with_default()
    }
}

#[derive(Debug, Default, Clone)]
struct Total {
    customer: String,
    total: f64,
    orders: i32,
}

impl Record for Total {
    fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
        builder
            .property("Customer", |t| t.customer.clone(), |t, v| t.customer = v)
            .property("Total", |t| t.total, |t, v| t.total = v)
            .property("Orders", |t| t.orders, |t, v| t.orders = v)
            .with_default()
    }
}

fn totals(orders: Vec<Order>) -> Vec<Total> {
    let mut totals: Vec<Total> = Vec::new();
    for order in orders {
        match totals.iter_mut().find(|t| t.customer == order.customer) {
            Some(total) => {
                total.total += order.amount;
                total.orders += 1;
            }
            None => totals.push(Total {
                customer: order.customer,
                total: order.amount,
                orders: 1,
            }),
        }
    }
    totals
}

fn main() -> Result<()> {
    let registration =
        FunctionRegistration::new("ORDER.TOTALS", Callable::map_records("Totals", totals))
            .with_array_mapping()
            .with_category("Orders");

    let registrations: Vec<_> = vec![registration]
        .into_iter()
        .process_map_array_functions()
        .collect();
    let registration = &registrations[0];

    println!("{}", registration.function_attributes.description);
    for parameter in &registration.parameter_registrations {
        println!(
            "  {}: {}",
            parameter.attributes.name, parameter.attributes.description
        );
    }

    // Columns may come in any order and case
    let input = CellArray::from_rows(vec![
        vec![CellValue::from("amount"), CellValue::from("CUSTOMER")],
        vec![CellValue::from(120.0), CellValue::from("Contoso")],
        vec![CellValue::from(80.5), CellValue::from("Fabrikam")],
        vec![CellValue::from(30.0), CellValue::from("Contoso")],
    ])?;

    let output = registration
        .callable
        .invoke(vec![Value::Array(input)])?
        .into_array()?;

    for row in output.rows() {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        println!("{}", cells.join("\t"));
    }

    Ok(())
}
